//! 描述符与模块元数据之间的转换
//!
//! 写出时只保留源码中的成员声明（值参数不进入元数据）；读入时把记录登记为
//! `Library` 来源的描述符，容器按路径前缀重新关联。

use std::collections::HashMap;

use tracing::debug;

use super::module::{DeclarationRecord, ModuleHandle, ModuleMetadata};
use super::{DecodeError, EncodeError};
use crate::frontend::descriptor::{DescriptorTable, Origin, SymbolId};
use crate::frontend::name::FqName;

/// 元数据序列化器
#[derive(Debug, Default)]
pub struct MetadataSerializer {
    records: Vec<DeclarationRecord>,
}

impl MetadataSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按声明顺序收集表中全部源码成员
    pub fn serialize_table(
        mut self,
        descriptors: &DescriptorTable,
    ) -> Result<Self, EncodeError> {
        for descriptor in descriptors.iter() {
            if !descriptor.is_source() || !descriptor.kind.is_member() {
                continue;
            }
            let mut record = DeclarationRecord::new(
                descriptor.fq_name.clone(),
                descriptor.kind,
                descriptor.visibility,
            );
            for requirement in &descriptor.requirements {
                record.push_requirement(requirement)?;
            }
            self.records.push(record);
        }
        Ok(self)
    }

    pub fn finish(self) -> ModuleMetadata {
        debug!(records = self.records.len(), "metadata serialized");
        ModuleMetadata::new(self.records)
    }
}

/// 把已加载模块的记录登记到描述符表，返回新符号（与记录顺序一致）
pub fn import_module(
    handle: &ModuleHandle,
    descriptors: &mut DescriptorTable,
) -> Result<Vec<SymbolId>, DecodeError> {
    let mut containers: HashMap<FqName, SymbolId> = HashMap::new();
    let mut symbols = Vec::with_capacity(handle.records().len());
    for record in handle.records() {
        let container = record
            .path
            .parent()
            .and_then(|parent| containers.get(&parent).copied());
        let symbol = descriptors.declare_with_origin(
            record.path.clone(),
            record.kind,
            record.visibility,
            container,
            Origin::Library,
        );
        if let Some(descriptor) = descriptors.get_mut(symbol) {
            for requirement in record.decode_requirements()? {
                descriptor.add_requirement(requirement);
            }
        }
        if record.kind.is_container() {
            containers.insert(record.path.clone(), symbol);
        }
        symbols.push(symbol);
    }
    debug!(
        location = handle.location(),
        imported = symbols.len(),
        "module imported into descriptor table"
    );
    Ok(symbols)
}
