//! 版本需求模型
//!
//! 描述声明对工具链能力的最低版本要求：
//!
//! | 字段 | 含义 |
//! |------|------|
//! | `kind` | 被门控的能力轴（语言版本 / 编译器版本 / API 版本） |
//! | `version` | 最低版本 |
//! | `level` | 不满足时的处理级别 |
//! | `message` | 可选的说明文字 |
//! | `error_code` | 可选的兼容性规则编号，缺省表示通用版本门 |
//!
//! 需求在解析阶段创建，写入模块元数据后不再修改。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// 版本号 `major.minor[.patch]`
///
/// `patch` 缺省为 0，显示时省略为零的 patch。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// 创建 `major.minor` 版本
    pub const fn new(
        major: u32,
        minor: u32,
    ) -> Self {
        Self {
            major,
            minor,
            patch: 0,
        }
    }

    /// 创建带 patch 的版本
    pub const fn with_patch(
        major: u32,
        minor: u32,
        patch: u32,
    ) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// 是否满足 `required`（`self >= required`）
    #[inline]
    pub fn satisfies(
        &self,
        required: &Version,
    ) -> bool {
        self >= required
    }
}

impl fmt::Display for Version {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

/// 版本字符串解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version '{0}': expected MAJOR.MINOR or MAJOR.MINOR.PATCH")]
pub struct ParseVersionError(pub String);

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError(s.to_string());
        let parts = s
            .trim()
            .split('.')
            .map(|p| {
                if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(err());
                }
                p.parse::<u32>().map_err(|_| err())
            })
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [major, minor] => Ok(Version::new(*major, *minor)),
            [major, minor, patch] => Ok(Version::with_patch(*major, *minor, *patch)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Version {
    type Error = ParseVersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

/// 被门控的能力轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionKind {
    LanguageVersion,
    CompilerVersion,
    ApiVersion,
}

impl VersionKind {
    /// 全部取值，按编码顺序
    pub const ALL: [VersionKind; 3] = [
        VersionKind::LanguageVersion,
        VersionKind::CompilerVersion,
        VersionKind::ApiVersion,
    ];

    /// 元数据中的编码值
    pub fn as_u8(&self) -> u8 {
        match self {
            VersionKind::LanguageVersion => 0,
            VersionKind::CompilerVersion => 1,
            VersionKind::ApiVersion => 2,
        }
    }

    /// 从编码值还原
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// 注解参数中的名字，如 `LANGUAGE_VERSION`
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionKind::LanguageVersion => "LANGUAGE_VERSION",
            VersionKind::CompilerVersion => "COMPILER_VERSION",
            VersionKind::ApiVersion => "API_VERSION",
        }
    }

    /// 人类可读的描述
    pub fn describe(&self) -> &'static str {
        match self {
            VersionKind::LanguageVersion => "language version",
            VersionKind::CompilerVersion => "compiler version",
            VersionKind::ApiVersion => "API version",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for VersionKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 不满足需求时的处理级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequirementLevel {
    /// 允许使用，但给出警告
    Warning,
    /// 禁止使用
    Error,
    /// 对任何使用方都不可见
    Hidden,
}

impl RequirementLevel {
    pub const ALL: [RequirementLevel; 3] = [
        RequirementLevel::Warning,
        RequirementLevel::Error,
        RequirementLevel::Hidden,
    ];

    pub fn as_u8(&self) -> u8 {
        match self {
            RequirementLevel::Warning => 0,
            RequirementLevel::Error => 1,
            RequirementLevel::Hidden => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementLevel::Warning => "WARNING",
            RequirementLevel::Error => "ERROR",
            RequirementLevel::Hidden => "HIDDEN",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == name)
    }
}

impl fmt::Display for RequirementLevel {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 版本需求
///
/// `error_code` 与 `level` 相互独立，两者可以任意组合。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRequirement {
    pub kind: VersionKind,
    pub version: Version,
    pub level: RequirementLevel,
    pub message: Option<String>,
    pub error_code: Option<u32>,
}

impl VersionRequirement {
    /// 创建语言版本需求（ERROR 级别，无消息、无错误码）
    pub fn language(version: Version) -> Self {
        Self {
            kind: VersionKind::LanguageVersion,
            version,
            level: RequirementLevel::Error,
            message: None,
            error_code: None,
        }
    }

    pub fn with_kind(
        mut self,
        kind: VersionKind,
    ) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_level(
        mut self,
        level: RequirementLevel,
    ) -> Self {
        self.level = level;
        self
    }

    pub fn with_message(
        mut self,
        message: impl Into<String>,
    ) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_error_code(
        mut self,
        code: u32,
    ) -> Self {
        self.error_code = Some(code);
        self
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} >= {} ({})", self.kind, self.version, self.level)?;
        if let Some(code) = self.error_code {
            write!(f, " code={}", code)?;
        }
        if let Some(message) = &self.message {
            write!(f, " \"{}\"", message)?;
        }
        Ok(())
    }
}

/// 一个声明上的需求集合（有序，通常只有一条）
pub type VersionRequirements = SmallVec<[VersionRequirement; 1]>;
