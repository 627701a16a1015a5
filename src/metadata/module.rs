//! 模块元数据文件与查找
//!
//! 文件布局：
//!
//! ```text
//! magic "LXMD"
//! format_version:u16 LE   flags:u16 LE
//! record_count:leb128
//! record*                 每条记录整体以 leb128 长度为前缀
//!
//! record:
//!   path        leb128 段数 + 每段长度前缀 UTF-8
//!   tag:u8      0 = class, 1 = constructor, 2 = function, 3 = property, 4 = value parameter
//!   visibility:u8
//!   kind 特有字段   class: class_kind:u8; constructor/function: arity:leb128; property: mutable:u8
//!   requirement_count:leb128
//!   requirement*    每条以 leb128 长度为前缀，内容见 [`codec`]
//! ```
//!
//! 读取时对每条需求做结构校验，任何损坏都是硬错误。需求以编码形式保存在
//! 记录中，门控只读取其固定头部。

use std::collections::{HashMap, HashSet};
use std::fmt;

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::bytes::{ByteReader, ByteWriter};
use super::codec;
use super::gate::{self, DeclarationGate, GateState, LanguageVersionSettings};
use super::requirement::{
    RequirementLevel, Version, VersionKind, VersionRequirement, VersionRequirements,
};
use super::{DecodeError, EncodeError, LookupError};
use crate::frontend::descriptor::{ClassKind, DeclarationKind, Visibility};
use crate::frontend::name::{FqName, Name, INIT};
use crate::util::diagnostic::Diagnostic;

pub const MAGIC: [u8; 4] = *b"LXMD";
pub const FORMAT_VERSION: u16 = 1;
const KNOWN_MODULE_FLAGS: u16 = 0;

const TAG_CLASS: u8 = 0;
const TAG_CONSTRUCTOR: u8 = 1;
const TAG_FUNCTION: u8 = 2;
const TAG_PROPERTY: u8 = 3;
const TAG_VALUE_PARAMETER: u8 = 4;

/// 已校验的编码需求
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncodedRequirement(Box<[u8]>);

impl EncodedRequirement {
    pub fn encode(requirement: &VersionRequirement) -> Result<Self, EncodeError> {
        Ok(Self(codec::encode(requirement)?.into_boxed_slice()))
    }

    /// 校验后接收外部字节
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        codec::validate(bytes)?;
        Ok(Self(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn decode(&self) -> Result<VersionRequirement, DecodeError> {
        codec::decode(&self.0)
    }

    pub fn kind(&self) -> Result<VersionKind, DecodeError> {
        codec::version_kind_of(&self.0)
    }

    pub fn level(&self) -> Result<RequirementLevel, DecodeError> {
        codec::level_of(&self.0)
    }

    pub fn version(&self) -> Result<Version, DecodeError> {
        codec::version_of(&self.0)
    }

    /// 在编码形式上求门控终态
    pub fn evaluate(
        &self,
        settings: &LanguageVersionSettings,
    ) -> Result<GateState, DecodeError> {
        gate::evaluate_encoded(&self.0, settings)
    }
}

impl fmt::Debug for EncodedRequirement {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.decode() {
            Ok(requirement) => write!(f, "EncodedRequirement({})", requirement),
            Err(_) => write!(f, "EncodedRequirement({:02x?})", &self.0),
        }
    }
}

/// 一条声明记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationRecord {
    pub path: FqName,
    pub kind: DeclarationKind,
    pub visibility: Visibility,
    pub requirements: Vec<EncodedRequirement>,
}

impl DeclarationRecord {
    pub fn new(
        path: FqName,
        kind: DeclarationKind,
        visibility: Visibility,
    ) -> Self {
        Self {
            path,
            kind,
            visibility,
            requirements: Vec::new(),
        }
    }

    pub fn with_requirement(
        mut self,
        requirement: &VersionRequirement,
    ) -> Result<Self, EncodeError> {
        self.push_requirement(requirement)?;
        Ok(self)
    }

    pub fn push_requirement(
        &mut self,
        requirement: &VersionRequirement,
    ) -> Result<(), EncodeError> {
        self.requirements
            .push(EncodedRequirement::encode(requirement)?);
        Ok(())
    }

    pub fn name(&self) -> Option<&Name> {
        self.path.short_name()
    }

    /// 完整解码全部需求
    pub fn decode_requirements(&self) -> Result<VersionRequirements, DecodeError> {
        self.requirements
            .iter()
            .map(EncodedRequirement::decode)
            .collect()
    }
}

/// 模块元数据
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleMetadata {
    pub records: Vec<DeclarationRecord>,
}

impl ModuleMetadata {
    pub fn new(records: Vec<DeclarationRecord>) -> Self {
        Self { records }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        write_module(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        read_module(bytes)
    }
}

/// 序列化模块元数据
pub fn write_module(metadata: &ModuleMetadata) -> Result<Vec<u8>, EncodeError> {
    let mut writer = ByteWriter::with_capacity(16 + metadata.records.len() * 24);
    writer.raw(&MAGIC);
    writer.u16_le(FORMAT_VERSION);
    writer.u16_le(KNOWN_MODULE_FLAGS);
    writer.length(metadata.records.len())?;
    for record in &metadata.records {
        let mut body = ByteWriter::new();
        write_record(record, &mut body)?;
        writer.bytes(&body.finish())?;
    }
    Ok(writer.finish())
}

fn write_record(
    record: &DeclarationRecord,
    writer: &mut ByteWriter,
) -> Result<(), EncodeError> {
    writer.length(record.path.len())?;
    for segment in record.path.segments() {
        writer.str(segment.as_str())?;
    }
    match record.kind {
        DeclarationKind::Class(class_kind) => {
            writer.u8(TAG_CLASS);
            writer.u8(record.visibility.as_u8());
            writer.u8(class_kind.as_u8());
        }
        DeclarationKind::Constructor { arity } => {
            writer.u8(TAG_CONSTRUCTOR);
            writer.u8(record.visibility.as_u8());
            writer.varint(arity);
        }
        DeclarationKind::Function { arity } => {
            writer.u8(TAG_FUNCTION);
            writer.u8(record.visibility.as_u8());
            writer.varint(arity);
        }
        DeclarationKind::Property { mutable } => {
            writer.u8(TAG_PROPERTY);
            writer.u8(record.visibility.as_u8());
            writer.u8(mutable as u8);
        }
        DeclarationKind::ValueParameter => {
            writer.u8(TAG_VALUE_PARAMETER);
            writer.u8(record.visibility.as_u8());
        }
    }
    writer.length(record.requirements.len())?;
    for requirement in &record.requirements {
        writer.bytes(requirement.as_bytes())?;
    }
    Ok(())
}

/// 反序列化模块元数据
pub fn read_module(bytes: &[u8]) -> Result<ModuleMetadata, DecodeError> {
    let mut reader = ByteReader::new(bytes);
    if reader.take(MAGIC.len())? != MAGIC {
        return Err(DecodeError::InvalidMagic);
    }
    let format_version = reader.u16_le()?;
    if format_version != FORMAT_VERSION {
        return Err(DecodeError::UnsupportedFormat(format_version));
    }
    let flags = reader.u16_le()?;
    if flags & !KNOWN_MODULE_FLAGS != 0 {
        return Err(DecodeError::UnknownModuleFlags(flags));
    }
    let count = reader.varint()? as usize;
    // 每条记录至少 1 字节长度前缀，用剩余长度限制预分配
    let mut records = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        let body = reader.bytes()?;
        let mut record_reader = ByteReader::new(body);
        records.push(read_record(&mut record_reader)?);
        record_reader.expect_end()?;
    }
    reader.expect_end()?;
    Ok(ModuleMetadata { records })
}

fn read_record(reader: &mut ByteReader<'_>) -> Result<DeclarationRecord, DecodeError> {
    let segment_count = reader.varint()? as usize;
    if segment_count == 0 {
        return Err(DecodeError::EmptyPath);
    }
    let mut segments = Vec::with_capacity(segment_count.min(reader.remaining()));
    for _ in 0..segment_count {
        let text = reader.str()?;
        let name = Name::parse(text).ok_or_else(|| DecodeError::InvalidName(text.to_string()))?;
        segments.push(name);
    }

    let tag = reader.u8()?;
    let visibility_tag = reader.u8()?;
    let visibility =
        Visibility::from_u8(visibility_tag).ok_or(DecodeError::InvalidVisibility(visibility_tag))?;
    let kind = match tag {
        TAG_CLASS => {
            let class_tag = reader.u8()?;
            DeclarationKind::Class(
                ClassKind::from_u8(class_tag).ok_or(DecodeError::InvalidClassKind(class_tag))?,
            )
        }
        TAG_CONSTRUCTOR => DeclarationKind::Constructor {
            arity: reader.varint()?,
        },
        TAG_FUNCTION => DeclarationKind::Function {
            arity: reader.varint()?,
        },
        TAG_PROPERTY => DeclarationKind::Property {
            mutable: reader.u8()? != 0,
        },
        TAG_VALUE_PARAMETER => DeclarationKind::ValueParameter,
        other => return Err(DecodeError::InvalidDeclarationTag(other)),
    };

    let requirement_count = reader.varint()? as usize;
    let mut requirements = Vec::with_capacity(requirement_count.min(reader.remaining()));
    for _ in 0..requirement_count {
        requirements.push(EncodedRequirement::from_bytes(reader.bytes()?)?);
    }

    Ok(DeclarationRecord {
        path: FqName::from_segments(segments),
        kind,
        visibility,
        requirements,
    })
}

/// 单条记录的门控结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnforcementEntry {
    pub path: FqName,
    pub kind: DeclarationKind,
    pub state: GateState,
}

/// 整个模块的门控结果
#[derive(Debug, Clone, Default)]
pub struct EnforcementReport {
    /// 与记录顺序一致
    pub entries: Vec<EnforcementEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

impl EnforcementReport {
    /// 同一路径（重载）取最严格的状态
    pub fn state_of(
        &self,
        path: &FqName,
    ) -> Option<GateState> {
        self.entries
            .iter()
            .filter(|e| &e.path == path)
            .map(|e| e.state)
            .reduce(GateState::most_restrictive)
    }

    pub fn count(
        &self,
        state: GateState,
    ) -> usize {
        self.entries.iter().filter(|e| e.state == state).count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// 通过门控后可见的声明
#[derive(Debug, Clone)]
pub struct VisibleDeclaration<'a> {
    pub record: &'a DeclarationRecord,
    pub state: GateState,
    /// `Warned` 时的警告
    pub warnings: Vec<Diagnostic>,
}

/// 已加载的模块
#[derive(Debug, Clone)]
pub struct ModuleHandle {
    location: String,
    metadata: ModuleMetadata,
    by_path: HashMap<FqName, SmallVec<[usize; 1]>>,
    /// 不是记录本身、但是某条记录路径前缀的路径（包）
    packages: HashSet<FqName>,
}

impl ModuleHandle {
    pub fn new(
        location: impl Into<String>,
        metadata: ModuleMetadata,
    ) -> Self {
        let mut by_path: HashMap<FqName, SmallVec<[usize; 1]>> = HashMap::new();
        for (index, record) in metadata.records.iter().enumerate() {
            by_path.entry(record.path.clone()).or_default().push(index);
        }
        let mut packages = HashSet::new();
        for record in &metadata.records {
            let mut prefix = record.path.parent();
            while let Some(path) = prefix {
                if path.is_root() || by_path.contains_key(&path) {
                    break;
                }
                prefix = path.parent();
                packages.insert(path);
            }
        }
        Self {
            location: location.into(),
            metadata,
            by_path,
            packages,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn metadata(&self) -> &ModuleMetadata {
        &self.metadata
    }

    pub fn records(&self) -> &[DeclarationRecord] {
        &self.metadata.records
    }

    /// 路径完全相同的所有记录
    pub fn records_at(
        &self,
        path: &FqName,
    ) -> impl Iterator<Item = &DeclarationRecord> + '_ {
        self.by_path
            .get(path)
            .into_iter()
            .flatten()
            .map(move |&index| &self.metadata.records[index])
    }

    /// 按点分路径查找唯一声明，`<init>` 表示构造器
    pub fn find_unambiguous(
        &self,
        fq_name: &str,
    ) -> Result<&DeclarationRecord, LookupError> {
        let path = FqName::parse(fq_name).ok_or_else(|| LookupError::NotFound {
            segment: fq_name.to_string(),
            scope: FqName::root().to_string(),
        })?;
        self.find_unambiguous_path(&path)
    }

    pub fn find_unambiguous_path(
        &self,
        path: &FqName,
    ) -> Result<&DeclarationRecord, LookupError> {
        if path.is_root() {
            return Err(LookupError::EmptyName);
        }
        let mut scope = FqName::root();
        let mut found: Option<&DeclarationRecord> = None;
        for segment in path.segments() {
            let candidate = scope.child(segment.clone());
            let matches = self.matching(found, &candidate, segment);
            match matches.as_slice() {
                [] if found.is_none() && self.packages.contains(&candidate) => {
                    trace!(package = %candidate, "entering package scope");
                }
                [] => {
                    return Err(LookupError::NotFound {
                        segment: segment.to_string(),
                        scope: scope.to_string(),
                    })
                }
                [record] => found = Some(*record),
                many => {
                    return Err(LookupError::Ambiguous {
                        segment: segment.to_string(),
                        scope: scope.to_string(),
                        count: many.len(),
                    })
                }
            }
            scope = candidate;
        }
        found.ok_or_else(|| LookupError::NotFound {
            segment: path.to_string(),
            scope: FqName::root().to_string(),
        })
    }

    /// 作用域中名为 `segment` 的记录；`<init>` 只匹配类的构造器
    fn matching(
        &self,
        scope: Option<&DeclarationRecord>,
        candidate: &FqName,
        segment: &Name,
    ) -> SmallVec<[&DeclarationRecord; 2]> {
        if *segment == INIT {
            let in_class = scope.is_some_and(|record| record.kind.is_container());
            if !in_class {
                return SmallVec::new();
            }
            return self
                .records_at(candidate)
                .filter(|record| matches!(record.kind, DeclarationKind::Constructor { .. }))
                .collect();
        }
        self.records_at(candidate).collect()
    }

    /// 查找并施加门控；`Rejected` 的声明视为不存在
    pub fn resolve_visible(
        &self,
        fq_name: &str,
        settings: &LanguageVersionSettings,
    ) -> Result<VisibleDeclaration<'_>, LookupError> {
        let record = self.find_unambiguous(fq_name)?;
        let declaration = record.path.to_string();
        let mut gate = DeclarationGate::new();
        for requirement in record.decode_requirements()? {
            gate.apply(&declaration, &requirement, settings);
        }
        let (state, diagnostics) = gate.finish();
        if state == GateState::Rejected {
            debug!(declaration = %declaration, "declaration rejected by version gate");
            return match diagnostics.into_iter().find(Diagnostic::is_error) {
                Some(diagnostic) => Err(LookupError::Rejected(Box::new(diagnostic))),
                None => Err(LookupError::NotFound {
                    segment: declaration,
                    scope: self.location.clone(),
                }),
            };
        }
        Ok(VisibleDeclaration {
            record,
            state,
            warnings: diagnostics,
        })
    }

    /// 对每条记录求门控终态；拒绝不会中断，诊断汇总返回
    pub fn enforce(
        &self,
        settings: &LanguageVersionSettings,
    ) -> Result<EnforcementReport, DecodeError> {
        let mut report = EnforcementReport::default();
        for record in &self.metadata.records {
            let mut state = GateState::Allowed;
            for encoded in &record.requirements {
                let requirement_state = encoded.evaluate(settings)?;
                if requirement_state != GateState::Allowed {
                    let requirement = encoded.decode()?;
                    report.diagnostics.extend(gate::requirement_diagnostic(
                        &record.path.to_string(),
                        &requirement,
                        requirement_state,
                        None,
                    ));
                }
                state = state.most_restrictive(requirement_state);
            }
            report.entries.push(EnforcementEntry {
                path: record.path.clone(),
                kind: record.kind,
                state,
            });
        }
        debug!(
            location = %self.location,
            records = report.entries.len(),
            rejected = report.count(GateState::Rejected),
            warned = report.count(GateState::Warned),
            "module enforcement finished"
        );
        Ok(report)
    }
}
