//! 元数据错误类型
//!
//! 解码失败永远是硬错误：静默回落到默认值会让版本门失效。

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// 字节解码错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of data at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("variable-width integer at offset {offset} does not fit in 32 bits")]
    VarintOverflow { offset: usize },

    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("{remaining} trailing byte(s) after record at offset {offset}")]
    TrailingBytes { offset: usize, remaining: usize },

    #[error("unknown presence flags 0x{flags:02x} in version requirement")]
    UnknownFlags { flags: u8 },

    #[error("invalid version kind tag {0}")]
    InvalidVersionKind(u8),

    #[error("invalid requirement level tag {0}")]
    InvalidLevel(u8),

    #[error("invalid declaration tag {0}")]
    InvalidDeclarationTag(u8),

    #[error("invalid visibility tag {0}")]
    InvalidVisibility(u8),

    #[error("invalid class kind tag {0}")]
    InvalidClassKind(u8),

    #[error("invalid module magic bytes")]
    InvalidMagic,

    #[error("unsupported metadata format version {0}")]
    UnsupportedFormat(u16),

    #[error("unknown module flags 0x{0:04x}")]
    UnknownModuleFlags(u16),

    #[error("invalid name segment '{0}' in identity path")]
    InvalidName(String),

    #[error("empty identity path in declaration record")]
    EmptyPath,
}

/// 字节编码错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("length {len} does not fit in a 32-bit length prefix")]
    LengthOverflow { len: usize },
}

/// 模块存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("module not found at '{0}'")]
    NotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 模块加载错误
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("malformed module metadata in '{location}': {source}")]
    Malformed {
        location: String,
        #[source]
        source: DecodeError,
    },
}

/// 按全限定名查找声明的错误
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("declaration not found: '{segment}' in '{scope}'")]
    NotFound { segment: String, scope: String },

    #[error("ambiguous declaration: '{segment}' in '{scope}' matches {count} declarations")]
    Ambiguous {
        segment: String,
        scope: String,
        count: usize,
    },

    #[error("empty qualified name")]
    EmptyName,

    #[error("{}", .0.message)]
    Rejected(Box<Diagnostic>),

    #[error(transparent)]
    Corrupt(#[from] DecodeError),
}
