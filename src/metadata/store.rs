//! 模块存储
//!
//! 编译产物以字节形式写入存储，加载时再解码并校验。内存存储用于测试，
//! 目录存储在每个位置目录下保存一个 `module.lxm` 文件。

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, info};

use super::module::{read_module, ModuleHandle};
use super::{LoadError, StoreError};

/// 目录存储中的元数据文件名
pub const MODULE_FILE_NAME: &str = "module.lxm";

/// 模块存储
pub trait ModuleStore: Send + Sync {
    fn write(
        &self,
        location: &str,
        bytes: &[u8],
    ) -> Result<(), StoreError>;

    fn read(
        &self,
        location: &str,
    ) -> Result<Vec<u8>, StoreError>;

    fn contains(
        &self,
        location: &str,
    ) -> bool {
        self.read(location).is_ok()
    }
}

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryModuleStore {
    modules: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryModuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }

    /// 直接改写已存储的字节，用于构造损坏数据
    pub fn update(
        &self,
        location: &str,
        f: impl FnOnce(&mut Vec<u8>),
    ) -> Result<(), StoreError> {
        let mut modules = self.modules.write();
        let bytes = modules
            .get_mut(location)
            .ok_or_else(|| StoreError::NotFound(location.to_string()))?;
        f(bytes);
        Ok(())
    }
}

impl ModuleStore for MemoryModuleStore {
    fn write(
        &self,
        location: &str,
        bytes: &[u8],
    ) -> Result<(), StoreError> {
        self.modules
            .write()
            .insert(location.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(
        &self,
        location: &str,
    ) -> Result<Vec<u8>, StoreError> {
        self.modules
            .read()
            .get(location)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(location.to_string()))
    }

    fn contains(
        &self,
        location: &str,
    ) -> bool {
        self.modules.read().contains_key(location)
    }
}

/// 目录存储：`<root>/<location>/module.lxm`
#[derive(Debug, Clone)]
pub struct DirectoryModuleStore {
    root: PathBuf,
}

impl DirectoryModuleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 位置对应的元数据文件路径
    pub fn module_path(
        &self,
        location: &str,
    ) -> PathBuf {
        self.root.join(location).join(MODULE_FILE_NAME)
    }
}

impl ModuleStore for DirectoryModuleStore {
    fn write(
        &self,
        location: &str,
        bytes: &[u8],
    ) -> Result<(), StoreError> {
        let path = self.module_path(location);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, bytes).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "module written");
        Ok(())
    }

    fn read(
        &self,
        location: &str,
    ) -> Result<Vec<u8>, StoreError> {
        let path = self.module_path(location);
        fs::read(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(path.display().to_string())
            } else {
                StoreError::Io { path, source }
            }
        })
    }

    fn contains(
        &self,
        location: &str,
    ) -> bool {
        self.module_path(location).is_file()
    }
}

/// 从存储加载模块并校验全部记录
pub fn load_module(
    store: &dyn ModuleStore,
    location: &str,
) -> Result<ModuleHandle, LoadError> {
    let bytes = store.read(location)?;
    let metadata = read_module(&bytes).map_err(|source| LoadError::Malformed {
        location: location.to_string(),
        source,
    })?;
    info!(
        location,
        records = metadata.records.len(),
        "module loaded"
    );
    Ok(ModuleHandle::new(location, metadata))
}
