//! 编译驱动
//!
//! 一次编译依次执行：附加版本需求、解析引用（含依赖库门控）、运行声明
//! 检查器。存在错误级诊断时编译失败，否则把源码声明序列化为模块元数据
//! 并写入存储。

use thiserror::Error;
use tracing::{debug, info};

use crate::frontend::checkers::{CheckerContext, CheckerRegistry};
use crate::frontend::descriptor::DescriptorTable;
use crate::frontend::name::FqName;
use crate::frontend::resolve::{attach_requirements, ReferenceResolver};
use crate::frontend::tree::Node;
use crate::metadata::gate::LanguageVersionSettings;
use crate::metadata::module::{write_module, ModuleHandle, ModuleMetadata};
use crate::metadata::serializer::{import_module, MetadataSerializer};
use crate::metadata::store::{load_module, ModuleStore};
use crate::metadata::{DecodeError, EncodeError, LoadError, StoreError};
use crate::util::config::LingxiConfig;
use crate::util::diagnostic::{Diagnostic, DiagnosticSink, Severity};

/// 编译器
pub struct Compiler {
    settings: LanguageVersionSettings,
    registry: CheckerRegistry,
    imports: Vec<FqName>,
}

impl Compiler {
    pub fn new(
        settings: LanguageVersionSettings,
        registry: CheckerRegistry,
    ) -> Self {
        Self {
            settings,
            registry,
            imports: Vec::new(),
        }
    }

    /// 按配置创建，注册内置检查器
    pub fn from_config(config: &LingxiConfig) -> Self {
        Self::new(
            config.language_settings(),
            CheckerRegistry::with_defaults(config.checker_config()),
        )
    }

    pub fn settings(&self) -> &LanguageVersionSettings {
        &self.settings
    }

    pub fn registry_mut(&mut self) -> &mut CheckerRegistry {
        &mut self.registry
    }

    /// 添加名字解析的导入作用域
    pub fn import(
        &mut self,
        scope: FqName,
    ) {
        if !self.imports.contains(&scope) {
            self.imports.push(scope);
        }
    }

    /// 加载依赖模块，把其声明以库来源登记到描述符表
    pub fn load_dependency(
        &mut self,
        store: &dyn ModuleStore,
        location: &str,
        descriptors: &mut DescriptorTable,
    ) -> Result<ModuleHandle, CompileError> {
        let handle = load_module(store, location)?;
        let symbols = import_module(&handle, descriptors)?;
        debug!(location, declarations = symbols.len(), "dependency loaded");
        Ok(handle)
    }

    /// 编译 `files` 并把元数据写入 `store` 的 `location`
    pub fn compile(
        &self,
        files: &mut [Node],
        descriptors: &mut DescriptorTable,
        store: &dyn ModuleStore,
        location: &str,
    ) -> Result<CompiledModule, CompileError> {
        info!(location, files = files.len(), "compiling module");

        for file in files.iter() {
            attach_requirements(file, descriptors);
        }

        let sink = DiagnosticSink::new();
        let descriptors = &*descriptors;
        let mut resolver = self
            .imports
            .iter()
            .cloned()
            .fold(ReferenceResolver::new(descriptors, &self.settings, &sink), |r, scope| {
                r.import(scope)
            });
        for file in files.iter_mut() {
            resolver.resolve_file(file);
        }

        let context = CheckerContext::new(&sink, descriptors, &self.settings);
        let checked = self.registry.run(files, &context);

        let diagnostics = sink.finish();
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        if errors > 0 {
            info!(location, errors, "compilation failed");
            return Err(CompileError::Diagnostics(diagnostics));
        }

        let metadata = MetadataSerializer::new()
            .serialize_table(descriptors)?
            .finish();
        let bytes = write_module(&metadata)?;
        store.write(location, &bytes)?;

        info!(
            location,
            declarations = checked,
            records = metadata.records.len(),
            bytes = bytes.len(),
            warnings = diagnostics.len(),
            "module compiled"
        );
        Ok(CompiledModule {
            location: location.to_string(),
            metadata,
            diagnostics,
        })
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::from_config(&LingxiConfig::default())
    }
}

/// 编译结果
#[derive(Debug, Clone)]
pub struct CompiledModule {
    pub location: String,
    pub metadata: ModuleMetadata,
    /// 非错误级诊断
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledModule {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

/// 编译错误
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("compilation failed with {} error(s)", count_errors(.0))]
    Diagnostics(Vec<Diagnostic>),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("dependency metadata is corrupt: {0}")]
    Decode(#[from] DecodeError),

    #[error("module metadata cannot be encoded: {0}")]
    Encode(#[from] EncodeError),
}

fn count_errors(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}

impl CompileError {
    /// 全部诊断（含警告）；非诊断错误返回空切片
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileError::Diagnostics(diagnostics) => diagnostics,
            _ => &[],
        }
    }
}
