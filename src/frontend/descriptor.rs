//! 解析后的声明描述符
//!
//! 树节点只持有 [`SymbolId`]，描述符通过 [`DescriptorTable`] 查找，
//! 不构成所有权关系。

use std::collections::HashMap;
use std::fmt;

use crate::frontend::name::{FqName, Name};
use crate::metadata::requirement::{VersionRequirement, VersionRequirements};

/// 符号编号（非拥有的反向引用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl fmt::Display for SymbolId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Internal,
    Protected,
    Private,
}

impl Visibility {
    pub fn is_private(&self) -> bool {
        matches!(self, Visibility::Private)
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Visibility::Public => 0,
            Visibility::Internal => 1,
            Visibility::Protected => 2,
            Visibility::Private => 3,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Visibility::Public),
            1 => Some(Visibility::Internal),
            2 => Some(Visibility::Protected),
            3 => Some(Visibility::Private),
            _ => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let text = match self {
            Visibility::Public => "public",
            Visibility::Internal => "internal",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        };
        f.write_str(text)
    }
}

/// 类的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Object,
    CompanionObject,
    Enum,
}

impl ClassKind {
    pub fn as_u8(&self) -> u8 {
        match self {
            ClassKind::Class => 0,
            ClassKind::Interface => 1,
            ClassKind::Object => 2,
            ClassKind::CompanionObject => 3,
            ClassKind::Enum => 4,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ClassKind::Class),
            1 => Some(ClassKind::Interface),
            2 => Some(ClassKind::Object),
            3 => Some(ClassKind::CompanionObject),
            4 => Some(ClassKind::Enum),
            _ => None,
        }
    }
}

/// 声明种类及其特有字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Class(ClassKind),
    Constructor { arity: u32 },
    Function { arity: u32 },
    Property { mutable: bool },
    ValueParameter,
}

impl DeclarationKind {
    /// 是否为成员（可以有可见性修饰的类成员或顶层成员）
    pub fn is_member(&self) -> bool {
        !matches!(self, DeclarationKind::ValueParameter)
    }

    pub fn is_container(&self) -> bool {
        matches!(self, DeclarationKind::Class(_))
    }

    pub fn describe(&self) -> &'static str {
        match self {
            DeclarationKind::Class(_) => "class",
            DeclarationKind::Constructor { .. } => "constructor",
            DeclarationKind::Function { .. } => "function",
            DeclarationKind::Property { .. } => "property",
            DeclarationKind::ValueParameter => "value parameter",
        }
    }
}

/// 声明来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// 当前编译的源码
    Source,
    /// 依赖库（从模块元数据加载）
    Library,
}

/// 声明描述符
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub symbol: SymbolId,
    pub fq_name: FqName,
    pub kind: DeclarationKind,
    pub visibility: Visibility,
    pub origin: Origin,
    /// 所属容器（类）；顶层声明为 `None`
    pub container: Option<SymbolId>,
    /// 解析阶段附加的版本需求
    pub requirements: VersionRequirements,
}

impl Descriptor {
    pub fn name(&self) -> Option<&Name> {
        self.fq_name.short_name()
    }

    pub fn is_source(&self) -> bool {
        self.origin == Origin::Source
    }

    /// 追加需求，重复的需求会被忽略
    pub fn add_requirement(
        &mut self,
        requirement: VersionRequirement,
    ) -> bool {
        if self.requirements.contains(&requirement) {
            return false;
        }
        self.requirements.push(requirement);
        true
    }
}

/// 描述符表
///
/// 由解析阶段单线程填充；检查阶段只读共享。
#[derive(Debug, Default, Clone)]
pub struct DescriptorTable {
    descriptors: Vec<Descriptor>,
    by_name: HashMap<FqName, Vec<SymbolId>>,
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明一个新符号，返回其编号
    pub fn declare(
        &mut self,
        fq_name: FqName,
        kind: DeclarationKind,
        visibility: Visibility,
        container: Option<SymbolId>,
    ) -> SymbolId {
        self.declare_with_origin(fq_name, kind, visibility, container, Origin::Source)
    }

    pub fn declare_with_origin(
        &mut self,
        fq_name: FqName,
        kind: DeclarationKind,
        visibility: Visibility,
        container: Option<SymbolId>,
        origin: Origin,
    ) -> SymbolId {
        let symbol = SymbolId(self.descriptors.len() as u32);
        self.by_name
            .entry(fq_name.clone())
            .or_default()
            .push(symbol);
        self.descriptors.push(Descriptor {
            symbol,
            fq_name,
            kind,
            visibility,
            origin,
            container,
            requirements: VersionRequirements::new(),
        });
        symbol
    }

    pub fn get(
        &self,
        symbol: SymbolId,
    ) -> Option<&Descriptor> {
        self.descriptors.get(symbol.0 as usize)
    }

    pub fn get_mut(
        &mut self,
        symbol: SymbolId,
    ) -> Option<&mut Descriptor> {
        self.descriptors.get_mut(symbol.0 as usize)
    }

    /// 按全限定名查找所有符号（重载时可能有多个）
    pub fn lookup(
        &self,
        fq_name: &FqName,
    ) -> &[SymbolId] {
        self.by_name
            .get(fq_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> + '_ {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
