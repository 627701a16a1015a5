//! 诊断数据结构
//!
//! `Diagnostic` 的 `message` 在构建时已渲染完成。只能通过
//! [`DiagnosticFactory`](super::DiagnosticFactory) 的构建器创建，所有诊断码
//! 都必须在注册表中登记。

use std::sync::Arc;

use crate::util::span::Span;

/// 诊断严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// 获取严重级别对应的数字值
    pub fn as_u8(&self) -> u8 {
        match self {
            Severity::Error => 4,
            Severity::Warning => 3,
            Severity::Info => 2,
            Severity::Hint => 1,
        }
    }

    /// 检查是否为错误级别
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// 诊断去重键：诊断码 + 锚点（所在文件与位置）
///
/// 字段顺序即输出顺序：文件、位置、诊断码。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagnosticKey {
    pub file: Option<Arc<str>>,
    pub anchor: Option<Span>,
    pub code: &'static str,
}

/// 诊断信息（message 已渲染完成）
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 严重级别
    pub severity: Severity,
    /// 诊断码
    pub code: &'static str,
    /// 完整消息
    pub message: String,
    /// 帮助信息，可能为空
    pub help: String,
    /// 锚点所在文件
    pub file: Option<Arc<str>>,
    /// 锚点位置
    pub span: Option<Span>,
    /// 相关诊断
    pub related: Vec<Diagnostic>,
}

impl Diagnostic {
    /// 仅由构建器调用
    pub(crate) fn new(
        severity: Severity,
        code: &'static str,
        message: String,
        span: Option<Span>,
    ) -> Self {
        Self {
            severity,
            code,
            message,
            help: String::new(),
            file: None,
            span,
            related: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }

    /// 标记锚点所在文件；已有文件时不覆盖
    pub fn in_file(
        mut self,
        file: &str,
    ) -> Self {
        if self.file.is_none() {
            self.file = Some(Arc::from(file));
        }
        self
    }

    /// 去重键
    pub fn key(&self) -> DiagnosticKey {
        DiagnosticKey {
            file: self.file.clone(),
            anchor: self.span,
            code: self.code,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}
