//! JSON 诊断渲染器
//!
//! 输出符合 Language Server Protocol (LSP) `Diagnostic` 结构的 JSON

use serde::{Deserialize, Serialize};

use crate::util::diagnostic::{Diagnostic, Severity};
use crate::util::span::Span;

/// LSP 诊断严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LspDiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl Serialize for LspDiagnosticSeverity {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for LspDiagnosticSeverity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(Self::Error),
            2 => Ok(Self::Warning),
            3 => Ok(Self::Information),
            4 => Ok(Self::Hint),
            other => Err(serde::de::Error::custom(format!(
                "invalid LSP severity {}",
                other
            ))),
        }
    }
}

impl From<Severity> for LspDiagnosticSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => LspDiagnosticSeverity::Error,
            Severity::Warning => LspDiagnosticSeverity::Warning,
            Severity::Info => LspDiagnosticSeverity::Information,
            Severity::Hint => LspDiagnosticSeverity::Hint,
        }
    }
}

/// LSP 位置（0 起始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspPosition {
    pub line: u32,
    pub character: u32,
}

/// LSP 位置范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspRange {
    pub start: LspPosition,
    pub end: LspPosition,
}

/// LSP 相关诊断信息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspRelatedInformation {
    pub range: LspRange,
    pub message: String,
}

/// LSP 诊断结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspDiagnostic {
    pub range: LspRange,
    pub severity: Option<LspDiagnosticSeverity>,
    pub code: Option<String>,
    pub source: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_information: Option<Vec<LspRelatedInformation>>,
}

/// JSON 诊断渲染器
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEmitter;

impl JsonEmitter {
    /// 渲染诊断为 JSON 字符串
    pub fn render(diagnostic: &Diagnostic) -> String {
        serde_json::to_string_pretty(&Self::to_lsp_diagnostic(diagnostic))
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// 渲染多个诊断为 JSON 数组
    pub fn render_all<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>) -> String {
        let lsp: Vec<LspDiagnostic> = diagnostics
            .into_iter()
            .map(Self::to_lsp_diagnostic)
            .collect();
        serde_json::to_string_pretty(&lsp).unwrap_or_else(|_| "[]".to_string())
    }

    /// 转换为 LSP 诊断结构
    pub fn to_lsp_diagnostic(diagnostic: &Diagnostic) -> LspDiagnostic {
        let related: Vec<LspRelatedInformation> = diagnostic
            .related
            .iter()
            .map(|r| LspRelatedInformation {
                range: Self::span_to_range(r.span.as_ref()),
                message: r.message.clone(),
            })
            .collect();
        LspDiagnostic {
            range: Self::span_to_range(diagnostic.span.as_ref()),
            severity: Some(diagnostic.severity.into()),
            code: Some(diagnostic.code.to_string()),
            source: crate::NAME.to_string(),
            message: diagnostic.message.clone(),
            related_information: (!related.is_empty()).then_some(related),
        }
    }

    /// 1 起始的 Span 转换为 0 起始的 LSP Range
    fn span_to_range(span: Option<&Span>) -> LspRange {
        let convert = |line: usize, column: usize| LspPosition {
            line: line.saturating_sub(1) as u32,
            character: column.saturating_sub(1) as u32,
        };
        match span {
            Some(s) if !s.is_dummy() => LspRange {
                start: convert(s.start.line, s.start.column),
                end: convert(s.end.line, s.end.column),
            },
            _ => LspRange {
                start: convert(0, 0),
                end: convert(0, 0),
            },
        }
    }
}
