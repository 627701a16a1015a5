//! 程序树
//!
//! 已解析（或部分解析）程序的多态节点模型。
//!
//! # 设计
//!
//! - 节点是封闭的和类型 [`Node`]，每个变体有固定的子节点槽位
//! - 细化变体通过组合内嵌基础形状（[`CallShape`]、[`FunctionShape`]、
//!   [`NamedReference`]），遍历时先访问自身槽位，再委托给基础形状
//! - 双重分派见 [`visitor`]：`accept` 路由到变体专属的访问方法，
//!   默认实现逐级回落到更一般的方法
//! - 父节点独占子节点；对声明的反向引用只是 [`SymbolId`]
//!
//! 子节点顺序固定且稳定，诊断排序与打印都依赖它。

pub mod declarations;
pub mod expressions;
pub mod references;
pub mod visitor;


use std::fmt;

use thiserror::Error;

pub use declarations::{
    Annotation, Class, Constructor, File, FunctionShape, NamedFunction, Property, UseSiteTarget,
    ValueParameter,
};
pub use expressions::{
    ArrayGetCall, ArraySetCall, Block, CallShape, Const, ConstValue, FunctionCall,
    NamedArgument, QualifiedAccess, Return,
};
pub use references::{NamedReference, ResolvedNamedReference};
pub use visitor::Visitor;

use crate::frontend::descriptor::SymbolId;
use crate::util::span::Span;

/// 节点种类标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Class,
    NamedFunction,
    Constructor,
    Property,
    ValueParameter,
    Annotation,
    Const,
    Block,
    Return,
    NamedArgument,
    Call,
    FunctionCall,
    ArrayGetCall,
    ArraySetCall,
    QualifiedAccess,
    NamedReference,
    ResolvedNamedReference,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "File",
            NodeKind::Class => "Class",
            NodeKind::NamedFunction => "NamedFunction",
            NodeKind::Constructor => "Constructor",
            NodeKind::Property => "Property",
            NodeKind::ValueParameter => "ValueParameter",
            NodeKind::Annotation => "Annotation",
            NodeKind::Const => "Const",
            NodeKind::Block => "Block",
            NodeKind::Return => "Return",
            NodeKind::NamedArgument => "NamedArgument",
            NodeKind::Call => "Call",
            NodeKind::FunctionCall => "FunctionCall",
            NodeKind::ArrayGetCall => "ArrayGetCall",
            NodeKind::ArraySetCall => "ArraySetCall",
            NodeKind::QualifiedAccess => "QualifiedAccess",
            NodeKind::NamedReference => "NamedReference",
            NodeKind::ResolvedNamedReference => "ResolvedNamedReference",
        }
    }

    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::Class
                | NodeKind::NamedFunction
                | NodeKind::Constructor
                | NodeKind::Property
                | NodeKind::ValueParameter
        )
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            NodeKind::NamedReference | NodeKind::ResolvedNamedReference
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 结构性错误：程序错误，不作为用户诊断
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("structural tree error: expected {expected} node, found {found}")]
    WrongVariant { expected: NodeKind, found: NodeKind },

    #[error("structural tree error: {kind} node has no '{slot}' slot")]
    MissingSlot { kind: NodeKind, slot: &'static str },
}

/// 程序树节点
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    File(File),
    Class(Class),
    NamedFunction(NamedFunction),
    Constructor(Constructor),
    Property(Property),
    ValueParameter(ValueParameter),
    Annotation(Annotation),
    Const(Const),
    Block(Block),
    Return(Return),
    NamedArgument(NamedArgument),
    Call(CallShape),
    FunctionCall(FunctionCall),
    ArrayGetCall(ArrayGetCall),
    ArraySetCall(ArraySetCall),
    QualifiedAccess(QualifiedAccess),
    NamedReference(NamedReference),
    ResolvedNamedReference(ResolvedNamedReference),
}

/// 为每个变体生成 `as_*` / `try_as_*` / `expect_*` 访问器
macro_rules! node_accessors {
    ($($variant:ident => $ty:ty, $as_fn:ident, $try_fn:ident, $expect_fn:ident;)*) => {
        impl Node {
            $(
                #[inline]
                pub fn $as_fn(&self) -> Option<&$ty> {
                    match self {
                        Node::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                pub fn $try_fn(&self) -> Result<&$ty, StructuralError> {
                    self.$as_fn().ok_or(StructuralError::WrongVariant {
                        expected: NodeKind::$variant,
                        found: self.kind(),
                    })
                }

                /// 变体不符是程序错误，直接 panic
                #[track_caller]
                pub fn $expect_fn(&self) -> &$ty {
                    match self.$try_fn() {
                        Ok(inner) => inner,
                        Err(err) => panic!("{}", err),
                    }
                }
            )*
        }
    };
}

node_accessors! {
    File => File, as_file, try_as_file, expect_file;
    Class => Class, as_class, try_as_class, expect_class;
    NamedFunction => NamedFunction, as_named_function, try_as_named_function, expect_named_function;
    Constructor => Constructor, as_constructor, try_as_constructor, expect_constructor;
    Property => Property, as_property, try_as_property, expect_property;
    ValueParameter => ValueParameter, as_value_parameter, try_as_value_parameter, expect_value_parameter;
    Annotation => Annotation, as_annotation, try_as_annotation, expect_annotation;
    Const => Const, as_const, try_as_const, expect_const;
    Block => Block, as_block, try_as_block, expect_block;
    Return => Return, as_return, try_as_return, expect_return;
    NamedArgument => NamedArgument, as_named_argument, try_as_named_argument, expect_named_argument;
    Call => CallShape, as_call, try_as_call, expect_call;
    FunctionCall => FunctionCall, as_function_call, try_as_function_call, expect_function_call;
    ArrayGetCall => ArrayGetCall, as_array_get_call, try_as_array_get_call, expect_array_get_call;
    ArraySetCall => ArraySetCall, as_array_set_call, try_as_array_set_call, expect_array_set_call;
    QualifiedAccess => QualifiedAccess, as_qualified_access, try_as_qualified_access, expect_qualified_access;
    NamedReference => NamedReference, as_named_reference, try_as_named_reference, expect_named_reference;
    ResolvedNamedReference => ResolvedNamedReference, as_resolved_named_reference, try_as_resolved_named_reference, expect_resolved_named_reference;
}

impl Node {
    /// 节点种类标签
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::File(_) => NodeKind::File,
            Node::Class(_) => NodeKind::Class,
            Node::NamedFunction(_) => NodeKind::NamedFunction,
            Node::Constructor(_) => NodeKind::Constructor,
            Node::Property(_) => NodeKind::Property,
            Node::ValueParameter(_) => NodeKind::ValueParameter,
            Node::Annotation(_) => NodeKind::Annotation,
            Node::Const(_) => NodeKind::Const,
            Node::Block(_) => NodeKind::Block,
            Node::Return(_) => NodeKind::Return,
            Node::NamedArgument(_) => NodeKind::NamedArgument,
            Node::Call(_) => NodeKind::Call,
            Node::FunctionCall(_) => NodeKind::FunctionCall,
            Node::ArrayGetCall(_) => NodeKind::ArrayGetCall,
            Node::ArraySetCall(_) => NodeKind::ArraySetCall,
            Node::QualifiedAccess(_) => NodeKind::QualifiedAccess,
            Node::NamedReference(_) => NodeKind::NamedReference,
            Node::ResolvedNamedReference(_) => NodeKind::ResolvedNamedReference,
        }
    }

    /// 源码位置
    pub fn span(&self) -> Span {
        match self {
            Node::File(n) => n.span,
            Node::Class(n) => n.span,
            Node::NamedFunction(n) => n.function.span,
            Node::Constructor(n) => n.function.span,
            Node::Property(n) => n.span,
            Node::ValueParameter(n) => n.span,
            Node::Annotation(n) => n.span,
            Node::Const(n) => n.span,
            Node::Block(n) => n.span,
            Node::Return(n) => n.span,
            Node::NamedArgument(n) => n.span,
            Node::Call(n) => n.span,
            Node::FunctionCall(n) => n.call.span,
            Node::ArrayGetCall(n) => n.call.span,
            Node::ArraySetCall(n) => n.call.span,
            Node::QualifiedAccess(n) => n.span,
            Node::NamedReference(n) => n.span,
            Node::ResolvedNamedReference(n) => n.reference.span,
        }
    }

    /// 声明节点对应的符号；非声明节点返回 `None`
    pub fn symbol(&self) -> Option<SymbolId> {
        match self {
            Node::Class(n) => Some(n.symbol),
            Node::NamedFunction(n) => Some(n.function.symbol),
            Node::Constructor(n) => Some(n.function.symbol),
            Node::Property(n) => Some(n.symbol),
            Node::ValueParameter(n) => Some(n.symbol),
            _ => None,
        }
    }

    /// 声明上的注解子节点
    pub fn annotations(&self) -> Result<&[Node], StructuralError> {
        match self {
            Node::Class(n) => Ok(&n.annotations),
            Node::NamedFunction(n) => Ok(&n.function.annotations),
            Node::Constructor(n) => Ok(&n.function.annotations),
            Node::Property(n) => Ok(&n.annotations),
            Node::ValueParameter(n) => Ok(&n.annotations),
            _ => Err(StructuralError::MissingSlot {
                kind: self.kind(),
                slot: "annotations",
            }),
        }
    }

    /// 按声明顺序访问每个子节点
    ///
    /// 这是所有遍历（`accept_children`、`children`）的唯一来源。
    pub fn walk_children<'t>(
        &'t self,
        f: &mut dyn FnMut(&'t Node),
    ) {
        match self {
            Node::File(n) => n.declarations.iter().for_each(f),
            Node::Class(n) => {
                n.annotations.iter().for_each(&mut *f);
                n.declarations.iter().for_each(f);
            }
            Node::NamedFunction(n) => n.function.walk_children(f),
            Node::Constructor(n) => {
                if let Some(call) = &n.delegated_call {
                    f(call);
                }
                n.function.walk_children(f);
            }
            Node::Property(n) => {
                n.annotations.iter().for_each(&mut *f);
                if let Some(initializer) = &n.initializer {
                    f(initializer);
                }
            }
            Node::ValueParameter(n) => {
                n.annotations.iter().for_each(&mut *f);
                if let Some(default) = &n.default_value {
                    f(default);
                }
            }
            Node::Annotation(n) => n.arguments.iter().for_each(f),
            Node::Block(n) => n.statements.iter().for_each(f),
            Node::Return(n) => f(&n.result),
            Node::NamedArgument(n) => f(&n.expression),
            Node::Call(n) => n.walk_children(f),
            Node::FunctionCall(n) => {
                f(&n.callee_reference);
                n.call.walk_children(f);
            }
            Node::ArrayGetCall(n) => {
                f(&n.array);
                n.call.walk_children(f);
            }
            Node::ArraySetCall(n) => {
                f(&n.array);
                f(&n.value);
                n.call.walk_children(f);
            }
            Node::QualifiedAccess(n) => {
                if let Some(receiver) = &n.receiver {
                    f(receiver);
                }
                f(&n.callee_reference);
            }
            Node::Const(_) | Node::NamedReference(_) | Node::ResolvedNamedReference(_) => {}
        }
    }

    /// 与 [`Node::walk_children`] 顺序一致的可变遍历
    pub fn walk_children_mut(
        &mut self,
        f: &mut dyn FnMut(&mut Node),
    ) {
        match self {
            Node::File(n) => n.declarations.iter_mut().for_each(f),
            Node::Class(n) => {
                n.annotations.iter_mut().for_each(&mut *f);
                n.declarations.iter_mut().for_each(f);
            }
            Node::NamedFunction(n) => n.function.walk_children_mut(f),
            Node::Constructor(n) => {
                if let Some(call) = &mut n.delegated_call {
                    f(call);
                }
                n.function.walk_children_mut(f);
            }
            Node::Property(n) => {
                n.annotations.iter_mut().for_each(&mut *f);
                if let Some(initializer) = &mut n.initializer {
                    f(initializer);
                }
            }
            Node::ValueParameter(n) => {
                n.annotations.iter_mut().for_each(&mut *f);
                if let Some(default) = &mut n.default_value {
                    f(default);
                }
            }
            Node::Annotation(n) => n.arguments.iter_mut().for_each(f),
            Node::Block(n) => n.statements.iter_mut().for_each(f),
            Node::Return(n) => f(&mut n.result),
            Node::NamedArgument(n) => f(&mut n.expression),
            Node::Call(n) => n.walk_children_mut(f),
            Node::FunctionCall(n) => {
                f(&mut n.callee_reference);
                n.call.walk_children_mut(f);
            }
            Node::ArrayGetCall(n) => {
                f(&mut n.array);
                n.call.walk_children_mut(f);
            }
            Node::ArraySetCall(n) => {
                f(&mut n.array);
                f(&mut n.value);
                n.call.walk_children_mut(f);
            }
            Node::QualifiedAccess(n) => {
                if let Some(receiver) = &mut n.receiver {
                    f(receiver);
                }
                f(&mut n.callee_reference);
            }
            Node::Const(_) | Node::NamedReference(_) | Node::ResolvedNamedReference(_) => {}
        }
    }

    /// 直接子节点列表
    pub fn children(&self) -> Vec<&Node> {
        let mut children = Vec::new();
        self.walk_children(&mut |child| children.push(child));
        children
    }

    /// 在子节点位置上做受控替换
    ///
    /// `f` 对每个直接子节点调用一次，可以用 `std::mem::replace`
    /// 把子树换成新节点。
    pub fn transform_children(
        &mut self,
        f: &mut dyn FnMut(&mut Node),
    ) {
        self.walk_children_mut(f);
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Node {
                fn from(inner: $ty) -> Self {
                    Node::$variant(inner)
                }
            }
        )*
    };
}

impl_from_variant! {
    File => File,
    Class => Class,
    NamedFunction => NamedFunction,
    Constructor => Constructor,
    Property => Property,
    ValueParameter => ValueParameter,
    Annotation => Annotation,
    Const => Const,
    Block => Block,
    Return => Return,
    NamedArgument => NamedArgument,
    Call => CallShape,
    FunctionCall => FunctionCall,
    ArrayGetCall => ArrayGetCall,
    ArraySetCall => ArraySetCall,
    QualifiedAccess => QualifiedAccess,
    NamedReference => NamedReference,
    ResolvedNamedReference => ResolvedNamedReference,
}
