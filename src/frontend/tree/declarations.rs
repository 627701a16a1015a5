//! 声明节点
//!
//! 声明节点通过 `symbol` 关联到描述符表，注解以 `Node::Annotation`
//! 子节点的形式保存。

use std::fmt;

use crate::frontend::descriptor::SymbolId;
use crate::frontend::name::{FqName, Name};
use crate::util::span::Span;
use crate::util::Spanned;

use super::Node;

/// 源文件
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub span: Span,
    pub name: String,
    pub package: FqName,
    pub declarations: Vec<Node>,
}

/// 类、接口、object
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub span: Span,
    pub symbol: SymbolId,
    pub name: Name,
    pub annotations: Vec<Node>,
    pub declarations: Vec<Node>,
}

/// 函数类声明的公共形状
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionShape {
    pub span: Span,
    pub symbol: SymbolId,
    pub annotations: Vec<Node>,
    pub parameters: Vec<Node>,
    pub body: Option<Box<Node>>,
}

impl FunctionShape {
    pub(super) fn walk_children<'t>(
        &'t self,
        f: &mut dyn FnMut(&'t Node),
    ) {
        self.annotations.iter().for_each(&mut *f);
        self.parameters.iter().for_each(&mut *f);
        if let Some(body) = &self.body {
            f(body);
        }
    }

    pub(super) fn walk_children_mut(
        &mut self,
        f: &mut dyn FnMut(&mut Node),
    ) {
        self.annotations.iter_mut().for_each(&mut *f);
        self.parameters.iter_mut().for_each(&mut *f);
        if let Some(body) = &mut self.body {
            f(body);
        }
    }
}

/// 具名函数
#[derive(Debug, Clone, PartialEq)]
pub struct NamedFunction {
    pub name: Name,
    pub function: FunctionShape,
}

/// 构造器
#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    /// 委托调用 `this(...)` / `super(...)`
    pub delegated_call: Option<Box<Node>>,
    pub function: FunctionShape,
}

/// 属性
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub span: Span,
    pub symbol: SymbolId,
    pub name: Name,
    pub annotations: Vec<Node>,
    pub initializer: Option<Box<Node>>,
}

/// 值参数
#[derive(Debug, Clone, PartialEq)]
pub struct ValueParameter {
    pub span: Span,
    pub symbol: SymbolId,
    /// 主构造器中 `val`/`var` 参数同时声明的属性
    pub property: Option<SymbolId>,
    pub name: Name,
    pub annotations: Vec<Node>,
    pub default_value: Option<Box<Node>>,
}

/// 注解使用点目标，如 `@get:Ann` 中的 `get`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UseSiteTarget {
    Field,
    File,
    Property,
    PropertyGetter,
    PropertySetter,
    Receiver,
    ConstructorParameter,
    SetterParameter,
    PropertyDelegateField,
}

impl UseSiteTarget {
    /// 源码中的关键字
    pub fn keyword(&self) -> &'static str {
        match self {
            UseSiteTarget::Field => "field",
            UseSiteTarget::File => "file",
            UseSiteTarget::Property => "property",
            UseSiteTarget::PropertyGetter => "get",
            UseSiteTarget::PropertySetter => "set",
            UseSiteTarget::Receiver => "receiver",
            UseSiteTarget::ConstructorParameter => "param",
            UseSiteTarget::SetterParameter => "setparam",
            UseSiteTarget::PropertyDelegateField => "delegate",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let target = match keyword {
            "field" => UseSiteTarget::Field,
            "file" => UseSiteTarget::File,
            "property" => UseSiteTarget::Property,
            "get" => UseSiteTarget::PropertyGetter,
            "set" => UseSiteTarget::PropertySetter,
            "receiver" => UseSiteTarget::Receiver,
            "param" => UseSiteTarget::ConstructorParameter,
            "setparam" => UseSiteTarget::SetterParameter,
            "delegate" => UseSiteTarget::PropertyDelegateField,
            _ => return None,
        };
        Some(target)
    }
}

impl fmt::Display for UseSiteTarget {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// 注解 `@target:Name(arguments)`
///
/// 使用点目标只是一个带位置的记号，不是子节点。
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub span: Span,
    pub name: Name,
    pub use_site_target: Option<Spanned<UseSiteTarget>>,
    pub arguments: Vec<Node>,
}
