//! 模块元数据
//!
//! - [`requirement`] - 版本需求模型
//! - [`codec`] - 单条需求的二进制编解码
//! - [`module`] - 模块文件格式与按路径查找
//! - [`gate`] - 加载时的版本门控
//! - [`store`] - 模块存储与加载
//! - [`serializer`] - 描述符与元数据之间的转换

pub mod bytes;
pub mod codec;
pub mod error;
pub mod gate;
pub mod module;
pub mod requirement;
pub mod serializer;
pub mod store;


pub use error::{DecodeError, EncodeError, LoadError, LookupError, StoreError};
pub use gate::{GateState, LanguageVersionSettings};
pub use module::{DeclarationRecord, ModuleHandle, ModuleMetadata};
pub use requirement::{
    RequirementLevel, Version, VersionKind, VersionRequirement, VersionRequirements,
};
pub use store::{load_module, DirectoryModuleStore, MemoryModuleStore, ModuleStore};
