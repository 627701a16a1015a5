//! Lingxi (灵犀) semantic core
//!
//! The resolved-program tree, declaration checkers and the module metadata
//! layer that carries `@RequireVersion` requirements from a compiled library
//! to the modules that consume it.
//!
//! # Example
//!
//! ```no_run
//! use lingxi::metadata::{load_module, DirectoryModuleStore, LanguageVersionSettings, Version};
//!
//! fn main() -> lingxi::Result<()> {
//!     let store = DirectoryModuleStore::new("target/modules");
//!     let module = load_module(&store, "lib")?;
//!     let settings = LanguageVersionSettings::new(Version::new(1, 1));
//!     let visible = module.resolve_visible("test.Outer.Inner.f", &settings)?;
//!     println!("{} -> {}", visible.record.path, visible.state);
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/lingxi")]
#![warn(rust_2018_idioms)]

// Public modules
pub mod frontend;
pub mod metadata;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};

/// Compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tool name, used as the diagnostic source
pub const NAME: &str = "lingxi";
