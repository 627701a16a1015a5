//! 声明检查器
//!
//! 检查器以声明为单位运行：注册表先遍历程序树收集源码声明
//! （按符号去重，库声明跳过），再把每个声明交给每个启用的检查器。
//! 诊断统一通过 [`CheckerContext::report`] 报告到去重收集器
//! [`DiagnosticSink`]，上下文为每个声明标记其所在文件。同一
//! (诊断码, 文件, 位置) 只保留一条，所以并行与顺序执行得到相同结果。

pub mod require_version;
pub mod use_site_target;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{debug, warn};

pub use require_version::RequireVersionChecker;
pub use use_site_target::UselessUseSiteTargetChecker;

use crate::frontend::descriptor::{Descriptor, DescriptorTable, SymbolId};
use crate::frontend::tree::{File, Node, Visitor};
use crate::metadata::gate::LanguageVersionSettings;
use crate::util::diagnostic::{Diagnostic, DiagnosticSink};

/// 声明检查器
pub trait DeclarationChecker: Send + Sync {
    /// 注册名，同名检查器只注册一次
    fn name(&self) -> &'static str;

    fn check(
        &self,
        declaration: &Node,
        descriptor: &Descriptor,
        context: &CheckerContext<'_>,
    );
}

/// 检查上下文：所有依赖显式传入
#[derive(Clone, Copy)]
pub struct CheckerContext<'a> {
    pub sink: &'a DiagnosticSink,
    pub descriptors: &'a DescriptorTable,
    pub settings: &'a LanguageVersionSettings,
    /// 当前声明所在文件，由注册表按所属 `File` 节点填入
    pub file: Option<&'a str>,
}

impl<'a> CheckerContext<'a> {
    pub fn new(
        sink: &'a DiagnosticSink,
        descriptors: &'a DescriptorTable,
        settings: &'a LanguageVersionSettings,
    ) -> Self {
        Self {
            sink,
            descriptors,
            settings,
            file: None,
        }
    }

    /// 同一上下文，锚定到文件 `file`
    pub fn in_file(
        &self,
        file: &'a str,
    ) -> Self {
        Self {
            file: Some(file),
            ..*self
        }
    }

    /// 报告诊断，标记当前文件；重复时返回 `false`
    pub fn report(
        &self,
        diagnostic: Diagnostic,
    ) -> bool {
        let diagnostic = match self.file {
            Some(file) => diagnostic.in_file(file),
            None => diagnostic,
        };
        self.sink.report(diagnostic)
    }
}

/// 注册表设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    /// 在声明之间并行
    pub parallel: bool,
    /// 跳过的检查器名
    pub disabled: Vec<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            disabled: Vec::new(),
        }
    }
}

/// 检查器注册表
pub struct CheckerRegistry {
    checkers: Vec<Box<dyn DeclarationChecker>>,
    config: CheckerConfig,
}

impl CheckerRegistry {
    pub fn new(config: CheckerConfig) -> Self {
        Self {
            checkers: Vec::new(),
            config,
        }
    }

    /// 注册内置检查器
    pub fn with_defaults(config: CheckerConfig) -> Self {
        let mut registry = Self::new(config);
        registry.register(UselessUseSiteTargetChecker);
        registry.register(RequireVersionChecker);
        registry
    }

    /// 注册检查器；同名检查器已存在时忽略并返回 `false`
    pub fn register(
        &mut self,
        checker: impl DeclarationChecker + 'static,
    ) -> bool {
        let name = checker.name();
        if self.checkers.iter().any(|c| c.name() == name) {
            warn!(checker = name, "checker already registered, ignoring");
            return false;
        }
        self.checkers.push(Box::new(checker));
        true
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// 已注册检查器的名字，按注册顺序
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checkers.iter().map(|c| c.name())
    }

    fn enabled(&self) -> Vec<&dyn DeclarationChecker> {
        self.checkers
            .iter()
            .filter(|c| !self.config.disabled.iter().any(|d| d == c.name()))
            .map(|c| &**c)
            .collect()
    }

    /// 对 `files` 中的全部源码声明运行检查器，返回检查的声明数
    pub fn run(
        &self,
        files: &[Node],
        context: &CheckerContext<'_>,
    ) -> usize {
        let checkers = self.enabled();
        let mut collector = DeclarationCollector::new(context.descriptors);
        for file in files {
            file.accept(&mut collector, ());
        }
        let declarations = collector.finish();

        let check = |declaration: &Collected<'_>| {
            let context = match declaration.file {
                Some(file) => context.in_file(file),
                None => *context,
            };
            for checker in &checkers {
                checker.check(declaration.node, declaration.descriptor, &context);
            }
        };
        if self.config.parallel {
            declarations.par_iter().for_each(check);
        } else {
            declarations.iter().for_each(check);
        }

        debug!(
            declarations = declarations.len(),
            checkers = checkers.len(),
            parallel = self.config.parallel,
            "declaration checkers finished"
        );
        declarations.len()
    }
}

impl Default for CheckerRegistry {
    fn default() -> Self {
        Self::with_defaults(CheckerConfig::default())
    }
}

/// 收集到的源码声明及其所在文件
struct Collected<'t> {
    file: Option<&'t str>,
    node: &'t Node,
    descriptor: &'t Descriptor,
}

/// 按树顺序收集源码声明，每个符号只收集一次
struct DeclarationCollector<'t> {
    descriptors: &'t DescriptorTable,
    file: Option<&'t str>,
    seen: HashSet<SymbolId>,
    declarations: Vec<Collected<'t>>,
}

impl<'t> DeclarationCollector<'t> {
    fn new(descriptors: &'t DescriptorTable) -> Self {
        Self {
            descriptors,
            file: None,
            seen: HashSet::new(),
            declarations: Vec::new(),
        }
    }

    fn finish(self) -> Vec<Collected<'t>> {
        self.declarations
    }
}

impl<'t> Visitor<'t, ()> for DeclarationCollector<'t> {
    type Output = ();

    fn visit_element(
        &mut self,
        element: &'t Node,
        data: (),
    ) {
        element.accept_children(self, data);
    }

    fn visit_file(
        &mut self,
        element: &'t Node,
        file: &'t File,
        data: (),
    ) {
        let outer = self.file.replace(&file.name);
        element.accept_children(self, data);
        self.file = outer;
    }

    fn visit_declaration(
        &mut self,
        element: &'t Node,
        data: (),
    ) {
        if let Some(descriptor) = element.symbol().and_then(|s| self.descriptors.get(s)) {
            if descriptor.is_source() && self.seen.insert(descriptor.symbol) {
                self.declarations.push(Collected {
                    file: self.file,
                    node: element,
                    descriptor,
                });
            }
        }
        element.accept_children(self, data);
    }
}
