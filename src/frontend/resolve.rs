//! 解析阶段的两个遍历
//!
//! - [`attach_requirements`]：把 `@RequireVersion` 注解转换为版本需求并附加到
//!   描述符；类上的需求由其中嵌套的全部声明继承
//! - [`ReferenceResolver`]：把能唯一解析的 `NamedReference` 替换为
//!   `ResolvedNamedReference`；引用依赖库声明时施加版本门控
//!
//! ```text
//! @RequireVersion("1.1", level = "WARNING", versionKind = "API_VERSION", errorCode = 42)
//! ```

use thiserror::Error;
use tracing::{debug, trace};

use crate::frontend::descriptor::{DescriptorTable, Origin, SymbolId};
use crate::frontend::name::FqName;
use crate::frontend::tree::{
    Annotation, ConstValue, NamedReference, Node, ResolvedNamedReference, Visitor,
};
use crate::metadata::gate::{evaluate, requirement_diagnostic, GateState, LanguageVersionSettings};
use crate::metadata::requirement::{
    ParseVersionError, RequirementLevel, VersionKind, VersionRequirement, VersionRequirements,
};
use crate::util::diagnostic::DiagnosticSink;

/// 版本需求注解名
pub const REQUIRE_VERSION: &str = "RequireVersion";

/// 注解无法转换为版本需求
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementError {
    #[error("missing version argument")]
    MissingVersion,

    #[error(transparent)]
    InvalidVersion(#[from] ParseVersionError),

    #[error("unknown level '{0}', expected WARNING, ERROR or HIDDEN")]
    UnknownLevel(String),

    #[error("unknown version kind '{0}', expected LANGUAGE_VERSION, COMPILER_VERSION or API_VERSION")]
    UnknownKind(String),

    #[error("error code must be a non-negative 32-bit integer, found {0}")]
    InvalidErrorCode(i64),

    #[error("argument '{argument}' expects a {expected} constant")]
    WrongType {
        argument: String,
        expected: &'static str,
    },

    #[error("unknown argument '{0}'")]
    UnknownArgument(String),

    #[error("argument '{0}' is given more than once")]
    DuplicateArgument(String),
}

pub fn is_require_version(annotation: &Annotation) -> bool {
    annotation.name == REQUIRE_VERSION
}

fn string_argument(
    argument: &str,
    node: &Node,
) -> Result<String, RequirementError> {
    match node.as_const().map(|c| &c.value) {
        Some(ConstValue::String(text)) => Ok(text.clone()),
        _ => Err(RequirementError::WrongType {
            argument: argument.to_string(),
            expected: "string",
        }),
    }
}

fn set_once<T>(
    slot: &mut Option<T>,
    argument: &str,
    value: T,
) -> Result<(), RequirementError> {
    if slot.is_some() {
        return Err(RequirementError::DuplicateArgument(argument.to_string()));
    }
    *slot = Some(value);
    Ok(())
}

/// 把 `@RequireVersion` 注解转换为版本需求
///
/// 第一个位置实参（或具名实参 `version`）是版本字符串；`level` 缺省为
/// ERROR，`versionKind` 缺省为 LANGUAGE_VERSION，`message`、`errorCode`
/// 缺省为空。
pub fn requirement_from_annotation(
    annotation: &Annotation,
) -> Result<VersionRequirement, RequirementError> {
    let mut version = None;
    let mut level = None;
    let mut kind = None;
    let mut message = None;
    let mut error_code = None;

    for argument in &annotation.arguments {
        let Some(named) = argument.as_named_argument() else {
            let text = string_argument("version", argument)?;
            set_once(&mut version, "version", text)?;
            continue;
        };
        let name = named.name.as_str();
        let value = named.expression.as_ref();
        match name {
            "version" => set_once(&mut version, name, string_argument(name, value)?)?,
            "message" => set_once(&mut message, name, string_argument(name, value)?)?,
            "level" => {
                let text = string_argument(name, value)?;
                let parsed =
                    RequirementLevel::parse(&text).ok_or(RequirementError::UnknownLevel(text))?;
                set_once(&mut level, name, parsed)?;
            }
            "versionKind" => {
                let text = string_argument(name, value)?;
                let parsed = VersionKind::parse(&text).ok_or(RequirementError::UnknownKind(text))?;
                set_once(&mut kind, name, parsed)?;
            }
            "errorCode" => {
                let code = match value.as_const().map(|c| &c.value) {
                    Some(ConstValue::Int(code)) => *code,
                    _ => {
                        return Err(RequirementError::WrongType {
                            argument: name.to_string(),
                            expected: "integer",
                        })
                    }
                };
                let code = u32::try_from(code).map_err(|_| RequirementError::InvalidErrorCode(code))?;
                set_once(&mut error_code, name, code)?;
            }
            other => return Err(RequirementError::UnknownArgument(other.to_string())),
        }
    }

    let version = version.ok_or(RequirementError::MissingVersion)?.parse()?;
    Ok(VersionRequirement {
        kind: kind.unwrap_or(VersionKind::LanguageVersion),
        version,
        level: level.unwrap_or(RequirementLevel::Error),
        message,
        error_code,
    })
}

/// 声明自身注解上的合法需求；非法注解由检查器报告
fn own_requirements(declaration: &Node) -> VersionRequirements {
    let Ok(annotations) = declaration.annotations() else {
        return VersionRequirements::new();
    };
    annotations
        .iter()
        .filter_map(Node::as_annotation)
        .filter(|a| is_require_version(a))
        .filter_map(|a| requirement_from_annotation(a).ok())
        .collect()
}

/// 需求附加遍历；数据参数为从外层类继承的需求
struct RequirementAttacher<'d> {
    descriptors: &'d mut DescriptorTable,
    attached: usize,
}

impl<'t, 'd> Visitor<'t, VersionRequirements> for RequirementAttacher<'d> {
    type Output = ();

    fn visit_element(
        &mut self,
        element: &'t Node,
        inherited: VersionRequirements,
    ) {
        element.accept_children(self, inherited);
    }

    fn visit_declaration(
        &mut self,
        element: &'t Node,
        inherited: VersionRequirements,
    ) {
        let own = own_requirements(element);
        if let Some(descriptor) = element.symbol().and_then(|s| self.descriptors.get_mut(s)) {
            for requirement in inherited.iter().chain(own.iter()) {
                if descriptor.add_requirement(requirement.clone()) {
                    self.attached += 1;
                }
            }
        }

        if element.as_class().is_some() {
            let mut nested = inherited;
            nested.extend(own);
            element.accept_children(self, nested);
        } else {
            element.accept_children(self, inherited);
        }
    }
}

/// 把文件中的版本需求附加到描述符，返回新附加的需求数
pub fn attach_requirements(
    file: &Node,
    descriptors: &mut DescriptorTable,
) -> usize {
    let mut attacher = RequirementAttacher {
        descriptors,
        attached: 0,
    };
    file.accept(&mut attacher, VersionRequirements::new());
    debug!(attached = attacher.attached, "version requirements attached");
    attacher.attached
}

/// 名字引用解析
///
/// 作用域由内向外：外层类、文件包、导入。第一个有候选的作用域决定结果，
/// 多个候选（重载）时保持未解析。
pub struct ReferenceResolver<'a> {
    descriptors: &'a DescriptorTable,
    settings: &'a LanguageVersionSettings,
    sink: &'a DiagnosticSink,
    imports: Vec<FqName>,
    /// 正在解析的文件名，用作诊断锚点
    file: Option<String>,
    resolved: usize,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(
        descriptors: &'a DescriptorTable,
        settings: &'a LanguageVersionSettings,
        sink: &'a DiagnosticSink,
    ) -> Self {
        Self {
            descriptors,
            settings,
            sink,
            imports: Vec::new(),
            file: None,
            resolved: 0,
        }
    }

    /// 添加导入作用域（包或类的全限定名）
    pub fn import(
        mut self,
        scope: FqName,
    ) -> Self {
        self.imports.push(scope);
        self
    }

    /// 累计解析的引用数
    pub fn resolved(&self) -> usize {
        self.resolved
    }

    /// 解析 `file` 中的全部引用
    pub fn resolve_file(
        &mut self,
        file: &mut Node,
    ) {
        let before = self.resolved;
        let mut scopes = Vec::new();
        self.resolve_in(file, &mut scopes);
        debug!(resolved = self.resolved - before, "references resolved");
    }

    fn resolve_in(
        &mut self,
        node: &mut Node,
        scopes: &mut Vec<FqName>,
    ) {
        let scope = match &*node {
            Node::File(file) => {
                self.file = Some(file.name.clone());
                Some(file.package.clone())
            }
            Node::Class(class) => self.descriptors.get(class.symbol).map(|d| d.fq_name.clone()),
            _ => None,
        };
        let pushed = scope.is_some();
        scopes.extend(scope);

        node.transform_children(&mut |child| {
            let resolved = match &*child {
                Node::NamedReference(reference) => self
                    .resolve_name(reference, scopes)
                    .map(|symbol| ResolvedNamedReference::new(reference.clone(), symbol)),
                _ => None,
            };
            match resolved {
                Some(resolved) => *child = resolved.into(),
                None => self.resolve_in(child, scopes),
            }
        });

        if pushed {
            scopes.pop();
        }
    }

    fn candidates(
        &self,
        reference: &NamedReference,
        scopes: &[FqName],
    ) -> &'a [SymbolId] {
        scopes
            .iter()
            .rev()
            .chain(self.imports.iter())
            .map(|scope| self.descriptors.lookup(&scope.child(reference.name.clone())))
            .find(|symbols| !symbols.is_empty())
            .unwrap_or_default()
    }

    fn resolve_name(
        &mut self,
        reference: &NamedReference,
        scopes: &[FqName],
    ) -> Option<SymbolId> {
        let [symbol] = self.candidates(reference, scopes) else {
            trace!(name = %reference.name, "reference left unresolved");
            return None;
        };
        let symbol = *symbol;
        if self.gate(reference, symbol) == GateState::Rejected {
            return None;
        }
        self.resolved += 1;
        Some(symbol)
    }

    /// 依赖库声明的版本门控，诊断锚定在引用处
    fn gate(
        &self,
        reference: &NamedReference,
        symbol: SymbolId,
    ) -> GateState {
        let Some(descriptor) = self.descriptors.get(symbol) else {
            return GateState::Allowed;
        };
        if descriptor.origin != Origin::Library {
            return GateState::Allowed;
        }
        let declaration = descriptor.fq_name.to_string();
        let mut state = GateState::Allowed;
        for requirement in &descriptor.requirements {
            let verdict = evaluate(requirement, self.settings);
            if let Some(diagnostic) =
                requirement_diagnostic(&declaration, requirement, verdict, Some(reference.span))
            {
                let diagnostic = match &self.file {
                    Some(file) => diagnostic.in_file(file),
                    None => diagnostic,
                };
                self.sink.report(diagnostic);
            }
            state = state.most_restrictive(verdict);
        }
        state
    }
}
