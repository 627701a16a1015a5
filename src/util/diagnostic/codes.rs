//! 诊断码注册表
//!
//! 每个 [`DiagnosticFactory`] 描述一种诊断：诊断码、默认严重级别和消息模板。
//! 工厂以 `static` 形式存在，地址稳定，可以作为去重键的一部分。

use once_cell::sync::Lazy;

use super::{Diagnostic, Severity};
use crate::util::span::Span;

/// 诊断类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCategory {
    /// L1xxx: 声明检查
    Declaration,
    /// L2xxx: 版本要求
    VersionRequirement,
    /// L8xxx: 内部错误
    Internal,
}

impl std::fmt::Display for DiagnosticCategory {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            DiagnosticCategory::Declaration => write!(f, "Declaration"),
            DiagnosticCategory::VersionRequirement => write!(f, "Version Requirement"),
            DiagnosticCategory::Internal => write!(f, "Internal"),
        }
    }
}

/// 诊断工厂
#[derive(Debug)]
pub struct DiagnosticFactory {
    /// 诊断码，如 "L1001"
    pub code: &'static str,
    /// 可读名称
    pub name: &'static str,
    pub category: DiagnosticCategory,
    pub severity: Severity,
    /// 消息模板，支持 {param} 占位符
    pub message_template: &'static str,
    /// 帮助模板，可能为空
    pub help_template: &'static str,
}

pub static ANNOTATION_TARGET_ON_NON_EXISTENT_DECLARATION: DiagnosticFactory = DiagnosticFactory {
    code: "L1001",
    name: "ANNOTATION_TARGET_ON_NON_EXISTENT_DECLARATION",
    category: DiagnosticCategory::Declaration,
    severity: Severity::Warning,
    message_template: "'@{target}:' annotation has no effect: private {declaration} '{name}' has no generated {accessor}",
    help_template: "remove the '{target}:' use-site target or make the declaration non-private",
};

pub static MALFORMED_VERSION_REQUIREMENT: DiagnosticFactory = DiagnosticFactory {
    code: "L1002",
    name: "MALFORMED_VERSION_REQUIREMENT",
    category: DiagnosticCategory::Declaration,
    severity: Severity::Error,
    message_template: "invalid @{annotation} annotation: {reason}",
    help_template: "",
};

pub static VERSION_REQUIREMENT_WARNING: DiagnosticFactory = DiagnosticFactory {
    code: "L2001",
    name: "VERSION_REQUIREMENT_WARNING",
    category: DiagnosticCategory::VersionRequirement,
    severity: Severity::Warning,
    message_template: "'{declaration}' {details}",
    help_template: "",
};

pub static VERSION_REQUIREMENT_ERROR: DiagnosticFactory = DiagnosticFactory {
    code: "L2002",
    name: "VERSION_REQUIREMENT_ERROR",
    category: DiagnosticCategory::VersionRequirement,
    severity: Severity::Error,
    message_template: "'{declaration}' {details}",
    help_template: "",
};

pub static HIDDEN_DECLARATION: DiagnosticFactory = DiagnosticFactory {
    code: "L2003",
    name: "HIDDEN_DECLARATION",
    category: DiagnosticCategory::VersionRequirement,
    severity: Severity::Error,
    message_template: "'{declaration}' is hidden and cannot be referenced: {details}",
    help_template: "",
};

pub static INTERNAL_DIAGNOSTIC_ERROR: DiagnosticFactory = DiagnosticFactory {
    code: "L8001",
    name: "INTERNAL_DIAGNOSTIC_ERROR",
    category: DiagnosticCategory::Internal,
    severity: Severity::Error,
    message_template: "internal diagnostic error: missing template parameter(s) for '{code}': {missing}",
    help_template: "please report this issue",
};

/// 完整的诊断码注册表
static FACTORIES: Lazy<Vec<&'static DiagnosticFactory>> = Lazy::new(|| {
    vec![
        &ANNOTATION_TARGET_ON_NON_EXISTENT_DECLARATION,
        &MALFORMED_VERSION_REQUIREMENT,
        &VERSION_REQUIREMENT_WARNING,
        &VERSION_REQUIREMENT_ERROR,
        &HIDDEN_DECLARATION,
        &INTERNAL_DIAGNOSTIC_ERROR,
    ]
});

impl DiagnosticFactory {
    /// 根据诊断码查找
    pub fn find(code: &str) -> Option<&'static Self> {
        FACTORIES.iter().copied().find(|f| f.code == code)
    }

    /// 获取所有工厂
    pub fn all() -> &'static [&'static Self] {
        &FACTORIES
    }

    pub fn by_category(category: DiagnosticCategory) -> impl Iterator<Item = &'static Self> {
        FACTORIES
            .iter()
            .copied()
            .filter(move |f| f.category == category)
    }

    /// 创建构建器
    pub fn builder(&'static self) -> DiagnosticBuilder {
        DiagnosticBuilder::new(self)
    }

    /// 在 `span` 处创建构建器
    pub fn on(
        &'static self,
        span: Span,
    ) -> DiagnosticBuilder {
        DiagnosticBuilder::new(self).at(span)
    }
}

/// 诊断构建器（支持模板参数）
#[derive(Debug, Clone)]
pub struct DiagnosticBuilder {
    factory: &'static DiagnosticFactory,
    severity: Severity,
    params: Vec<(&'static str, String)>,
    span: Option<Span>,
    related: Vec<Diagnostic>,
}

impl DiagnosticBuilder {
    pub fn new(factory: &'static DiagnosticFactory) -> Self {
        Self {
            factory,
            severity: factory.severity,
            params: Vec::new(),
            span: None,
            related: Vec::new(),
        }
    }

    /// 添加模板参数
    pub fn param(
        mut self,
        key: &'static str,
        value: impl ToString,
    ) -> Self {
        self.params.push((key, value.to_string()));
        self
    }

    /// 设置位置
    #[inline]
    pub fn at(
        mut self,
        span: Span,
    ) -> Self {
        self.span = Some(span);
        self
    }

    /// 覆盖工厂的默认严重级别
    #[inline]
    pub fn severity(
        mut self,
        severity: Severity,
    ) -> Self {
        self.severity = severity;
        self
    }

    /// 添加相关诊断
    #[inline]
    pub fn with_related(
        mut self,
        related: Vec<Diagnostic>,
    ) -> Self {
        self.related = related;
        self
    }

    /// 构建 Diagnostic
    ///
    /// 模板缺少参数时，debug 构建直接 panic；release 构建回落为 L8001。
    pub fn build(self) -> Diagnostic {
        let missing = self.missing_params();
        if !missing.is_empty() {
            if cfg!(debug_assertions) {
                panic!(
                    "Missing parameter(s) {:?} for diagnostic '{}'",
                    missing, self.factory.code
                );
            }
            let message = render(
                INTERNAL_DIAGNOSTIC_ERROR.message_template,
                &[
                    ("code", self.factory.code.to_string()),
                    ("missing", missing.join(", ")),
                ],
            );
            let mut diagnostic = Diagnostic::new(
                Severity::Error,
                INTERNAL_DIAGNOSTIC_ERROR.code,
                message,
                self.span,
            );
            diagnostic.help = INTERNAL_DIAGNOSTIC_ERROR.help_template.to_string();
            return diagnostic;
        }

        let message = render(self.factory.message_template, &self.params);
        let mut diagnostic = Diagnostic::new(self.severity, self.factory.code, message, self.span);
        diagnostic.help = render(self.factory.help_template, &self.params);
        diagnostic.related = self.related;
        diagnostic
    }

    fn missing_params(&self) -> Vec<String> {
        placeholders(self.factory.message_template)
            .chain(placeholders(self.factory.help_template))
            .filter(|key| !self.params.iter().any(|(k, _)| k == key))
            .map(str::to_string)
            .collect()
    }
}

/// 模板中的 `{key}` 占位符
fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    template.split('{').skip(1).filter_map(|rest| {
        let end = rest.find('}')?;
        let key = &rest[..end];
        (!key.is_empty()).then_some(key)
    })
}

/// 用参数替换模板占位符
fn render(
    template: &str,
    params: &[(&'static str, String)],
) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match params.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => output.push_str(value),
                    None => {
                        output.push('{');
                        output.push_str(key);
                        output.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                output.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    output.push_str(rest);
    output
}
