//! 版本门控
//!
//! 使用方加载模块时，每个声明从 `Unchecked` 出发，根据其版本需求
//! 转移到终态之一：
//!
//! ```text
//!              ┌─> Allowed   使用方版本满足需求，或该能力轴未被跟踪
//! Unchecked ───┼─> Warned    版本不足且级别为 WARNING
//!              └─> Rejected  版本不足且级别为 ERROR，或级别为 HIDDEN
//! ```
//!
//! 一个声明有多条需求时取最严格的终态（`Rejected > Warned > Allowed`）。

use std::fmt;

use once_cell::sync::Lazy;

use super::codec;
use super::requirement::{RequirementLevel, Version, VersionKind, VersionRequirement};
use super::DecodeError;
use crate::util::diagnostic::codes::{
    HIDDEN_DECLARATION, VERSION_REQUIREMENT_ERROR, VERSION_REQUIREMENT_WARNING,
};
use crate::util::diagnostic::Diagnostic;
use crate::util::span::Span;

/// 未配置时使用的语言版本
pub const CURRENT_LANGUAGE_VERSION: Version = Version::new(1, 2);

/// 当前编译器版本，取自包版本号
pub static COMPILER_VERSION: Lazy<Version> =
    Lazy::new(|| crate::VERSION.parse().unwrap_or_default());

/// 使用方的版本配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageVersionSettings {
    pub language_version: Version,
    /// `None` 表示不跟踪 API 版本
    pub api_version: Option<Version>,
    pub compiler_version: Version,
}

impl Default for LanguageVersionSettings {
    fn default() -> Self {
        Self::new(CURRENT_LANGUAGE_VERSION)
    }
}

impl LanguageVersionSettings {
    pub fn new(language_version: Version) -> Self {
        Self {
            language_version,
            api_version: None,
            compiler_version: *COMPILER_VERSION,
        }
    }

    pub fn with_api_version(
        mut self,
        api_version: Version,
    ) -> Self {
        self.api_version = Some(api_version);
        self
    }

    pub fn with_compiler_version(
        mut self,
        compiler_version: Version,
    ) -> Self {
        self.compiler_version = compiler_version;
        self
    }

    /// 与 `kind` 对应的使用方版本；未跟踪的轴返回 `None`
    pub fn tracked_version(
        &self,
        kind: VersionKind,
    ) -> Option<Version> {
        match kind {
            VersionKind::LanguageVersion => Some(self.language_version),
            VersionKind::CompilerVersion => Some(self.compiler_version),
            VersionKind::ApiVersion => self.api_version,
        }
    }
}

/// 门控状态，按严格程度排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum GateState {
    #[default]
    Unchecked,
    Allowed,
    Warned,
    Rejected,
}

impl GateState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GateState::Unchecked)
    }

    /// 声明是否可以被使用（`Warned` 仍可使用）
    pub fn is_usable(&self) -> bool {
        matches!(self, GateState::Allowed | GateState::Warned)
    }

    /// 两个状态中更严格的一个
    pub fn most_restrictive(
        self,
        other: GateState,
    ) -> GateState {
        self.max(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Unchecked => "unchecked",
            GateState::Allowed => "allowed",
            GateState::Warned => "warned",
            GateState::Rejected => "rejected",
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 对单条需求求终态
pub fn evaluate(
    requirement: &VersionRequirement,
    settings: &LanguageVersionSettings,
) -> GateState {
    transition(
        requirement.kind,
        &requirement.version,
        requirement.level,
        settings,
    )
}

/// 直接在编码后的需求上求终态，只读取 kind、level 和 version
pub fn evaluate_encoded(
    bytes: &[u8],
    settings: &LanguageVersionSettings,
) -> Result<GateState, DecodeError> {
    let level = codec::level_of(bytes)?;
    let kind = codec::version_kind_of(bytes)?;
    if level == RequirementLevel::Hidden {
        return Ok(GateState::Rejected);
    }
    if settings.tracked_version(kind).is_none() {
        return Ok(GateState::Allowed);
    }
    let version = codec::version_of(bytes)?;
    Ok(transition(kind, &version, level, settings))
}

/// 多条需求取最严格的终态；没有需求时为 `Allowed`
pub fn evaluate_all<'a>(
    requirements: impl IntoIterator<Item = &'a VersionRequirement>,
    settings: &LanguageVersionSettings,
) -> GateState {
    requirements
        .into_iter()
        .map(|r| evaluate(r, settings))
        .fold(GateState::Allowed, GateState::most_restrictive)
}

fn transition(
    kind: VersionKind,
    version: &Version,
    level: RequirementLevel,
    settings: &LanguageVersionSettings,
) -> GateState {
    if level == RequirementLevel::Hidden {
        return GateState::Rejected;
    }
    let Some(current) = settings.tracked_version(kind) else {
        return GateState::Allowed;
    };
    if current.satisfies(version) {
        return GateState::Allowed;
    }
    match level {
        RequirementLevel::Warning => GateState::Warned,
        RequirementLevel::Error | RequirementLevel::Hidden => GateState::Rejected,
    }
}

/// 需求的可读描述：优先使用需求自带的消息，附带错误码
pub fn describe_requirement(requirement: &VersionRequirement) -> String {
    let mut details = match &requirement.message {
        Some(message) => message.clone(),
        None => format!(
            "requires {} {} or newer",
            requirement.kind.describe(),
            requirement.version
        ),
    };
    if let Some(code) = requirement.error_code {
        details.push_str(&format!(" (error code {})", code));
    }
    details
}

/// 为非 `Allowed` 的终态生成诊断
pub fn requirement_diagnostic(
    declaration: &str,
    requirement: &VersionRequirement,
    state: GateState,
    anchor: Option<Span>,
) -> Option<Diagnostic> {
    let factory = match (state, requirement.level) {
        (GateState::Rejected, RequirementLevel::Hidden) => &HIDDEN_DECLARATION,
        (GateState::Rejected, _) => &VERSION_REQUIREMENT_ERROR,
        (GateState::Warned, _) => &VERSION_REQUIREMENT_WARNING,
        (GateState::Unchecked | GateState::Allowed, _) => return None,
    };
    let mut builder = factory
        .builder()
        .param("declaration", declaration)
        .param("details", describe_requirement(requirement));
    if let Some(span) = anchor {
        builder = builder.at(span);
    }
    Some(builder.build())
}

/// 单个声明的门控
///
/// 逐条施加需求，状态只会变得更严格；每条未通过的需求都会留下诊断。
#[derive(Debug, Default)]
pub struct DeclarationGate {
    state: GateState,
    diagnostics: Vec<Diagnostic>,
}

impl DeclarationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// 施加一条需求，返回这条需求自身的终态
    pub fn apply(
        &mut self,
        declaration: &str,
        requirement: &VersionRequirement,
        settings: &LanguageVersionSettings,
    ) -> GateState {
        let state = evaluate(requirement, settings);
        if let Some(diagnostic) = requirement_diagnostic(declaration, requirement, state, None) {
            self.diagnostics.push(diagnostic);
        }
        self.state = self.state.most_restrictive(state);
        state
    }

    /// 结束门控；未施加任何需求时为 `Allowed`
    pub fn finish(self) -> (GateState, Vec<Diagnostic>) {
        let state = match self.state {
            GateState::Unchecked => GateState::Allowed,
            state => state,
        };
        (state, self.diagnostics)
    }
}
