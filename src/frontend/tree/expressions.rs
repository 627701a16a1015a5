//! 表达式节点
//!
//! 调用类节点共享 [`CallShape`]（参数列表），细化的调用节点通过组合
//! 内嵌它，并在遍历时先访问自身槽位，再委托给 `CallShape`。

use std::fmt;

use crate::frontend::name::Name;
use crate::util::span::Span;

use super::Node;

/// 常量值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstValue {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
}

impl fmt::Display for ConstValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ConstValue::Null => f.write_str("null"),
            ConstValue::Bool(b) => write!(f, "{}", b),
            ConstValue::Int(n) => write!(f, "{}", n),
            ConstValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// 常量表达式（终端节点）
#[derive(Debug, Clone, PartialEq)]
pub struct Const {
    pub span: Span,
    pub value: ConstValue,
}

/// 语句块
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub span: Span,
    pub statements: Vec<Node>,
}

/// return 表达式
#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub span: Span,
    pub result: Box<Node>,
}

/// 具名实参 `name = expression`
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArgument {
    pub span: Span,
    pub name: Name,
    pub expression: Box<Node>,
}

/// 调用的公共形状：参数列表
#[derive(Debug, Clone, PartialEq)]
pub struct CallShape {
    pub span: Span,
    pub arguments: Vec<Node>,
}

impl CallShape {
    pub fn new(
        arguments: Vec<Node>,
        span: Span,
    ) -> Self {
        Self { span, arguments }
    }

    pub(super) fn walk_children<'t>(
        &'t self,
        f: &mut dyn FnMut(&'t Node),
    ) {
        for argument in &self.arguments {
            f(argument);
        }
    }

    pub(super) fn walk_children_mut(
        &mut self,
        f: &mut dyn FnMut(&mut Node),
    ) {
        for argument in &mut self.arguments {
            f(argument);
        }
    }
}

/// 函数调用 `callee(arguments)`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// 被调用者引用（`NamedReference` 或 `ResolvedNamedReference`）
    pub callee_reference: Box<Node>,
    pub call: CallShape,
}

/// 数组读取 `array[arguments]`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayGetCall {
    pub array: Box<Node>,
    pub call: CallShape,
}

/// 数组写入 `array[arguments] = value`
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySetCall {
    pub array: Box<Node>,
    pub value: Box<Node>,
    pub call: CallShape,
}

/// 限定访问 `receiver.callee`
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedAccess {
    pub span: Span,
    pub receiver: Option<Box<Node>>,
    pub callee_reference: Box<Node>,
}
