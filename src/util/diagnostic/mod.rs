//! 统一诊断系统
//!
//! # 模块结构
//!
//! - [`error`] - 诊断数据结构 (Diagnostic, Severity)
//! - [`codes`] - 诊断码注册表与构建器
//! - [`sink`] - 去重收集器
//! - [`emitter`] - 文本与 JSON 输出
//!
//! # 示例
//!
//! ```ignore
//! use lingxi::util::diagnostic::{codes::MALFORMED_VERSION_REQUIREMENT, DiagnosticSink};
//!
//! let sink = DiagnosticSink::new();
//! sink.report(
//!     MALFORMED_VERSION_REQUIREMENT
//!         .on(span)
//!         .param("annotation", "RequireVersion")
//!         .param("reason", "missing version")
//!         .build(),
//! );
//! ```

pub mod codes;
pub mod emitter;
pub mod error;
pub mod sink;

pub use codes::{DiagnosticBuilder, DiagnosticCategory, DiagnosticFactory};
pub use emitter::{EmitterConfig, JsonEmitter, TextEmitter};
pub use error::{Diagnostic, DiagnosticKey, Severity};
pub use sink::DiagnosticSink;
