//! 双重分派访问者
//!
//! [`Node::accept`] 按节点变体路由到对应的 `visit_*` 方法。每个方法的
//! 默认实现回落到更一般的方法：
//!
//! ```text
//! visit_array_get_call ─┐
//! visit_array_set_call ─┼─> visit_call ─> visit_expression ─> visit_element
//! visit_function_call ──┘
//! visit_resolved_named_reference ─> visit_named_reference ─> visit_reference ─> visit_element
//! visit_named_function ─┬─> visit_function ─> visit_declaration ─> visit_element
//! visit_constructor ────┘
//! ```
//!
//! 只有 `visit_element` 必须实现。每个方法同时收到节点本身（`element`）
//! 和已经解构出的变体（或其基础形状），回落时不会丢失类型信息。
//!
//! 新增变体时 `accept` 中的 `match` 无法通过编译，直到补上分派。

use super::*;

/// 程序树访问者
///
/// `'t` 为树的生命周期，访问者可以保存节点引用。
pub trait Visitor<'t, D> {
    type Output;

    /// 所有回落链的终点
    fn visit_element(
        &mut self,
        element: &'t Node,
        data: D,
    ) -> Self::Output;

    // === 声明 ===

    fn visit_file(
        &mut self,
        element: &'t Node,
        _file: &'t File,
        data: D,
    ) -> Self::Output {
        self.visit_element(element, data)
    }

    fn visit_declaration(
        &mut self,
        element: &'t Node,
        data: D,
    ) -> Self::Output {
        self.visit_element(element, data)
    }

    fn visit_class(
        &mut self,
        element: &'t Node,
        _class: &'t Class,
        data: D,
    ) -> Self::Output {
        self.visit_declaration(element, data)
    }

    fn visit_function(
        &mut self,
        element: &'t Node,
        _function: &'t FunctionShape,
        data: D,
    ) -> Self::Output {
        self.visit_declaration(element, data)
    }

    fn visit_named_function(
        &mut self,
        element: &'t Node,
        function: &'t NamedFunction,
        data: D,
    ) -> Self::Output {
        self.visit_function(element, &function.function, data)
    }

    fn visit_constructor(
        &mut self,
        element: &'t Node,
        constructor: &'t Constructor,
        data: D,
    ) -> Self::Output {
        self.visit_function(element, &constructor.function, data)
    }

    fn visit_property(
        &mut self,
        element: &'t Node,
        _property: &'t Property,
        data: D,
    ) -> Self::Output {
        self.visit_declaration(element, data)
    }

    fn visit_value_parameter(
        &mut self,
        element: &'t Node,
        _parameter: &'t ValueParameter,
        data: D,
    ) -> Self::Output {
        self.visit_declaration(element, data)
    }

    fn visit_annotation(
        &mut self,
        element: &'t Node,
        _annotation: &'t Annotation,
        data: D,
    ) -> Self::Output {
        self.visit_element(element, data)
    }

    // === 表达式 ===

    fn visit_expression(
        &mut self,
        element: &'t Node,
        data: D,
    ) -> Self::Output {
        self.visit_element(element, data)
    }

    fn visit_const(
        &mut self,
        element: &'t Node,
        _constant: &'t Const,
        data: D,
    ) -> Self::Output {
        self.visit_expression(element, data)
    }

    fn visit_block(
        &mut self,
        element: &'t Node,
        _block: &'t Block,
        data: D,
    ) -> Self::Output {
        self.visit_expression(element, data)
    }

    fn visit_return(
        &mut self,
        element: &'t Node,
        _ret: &'t Return,
        data: D,
    ) -> Self::Output {
        self.visit_expression(element, data)
    }

    fn visit_named_argument(
        &mut self,
        element: &'t Node,
        _argument: &'t NamedArgument,
        data: D,
    ) -> Self::Output {
        self.visit_expression(element, data)
    }

    fn visit_call(
        &mut self,
        element: &'t Node,
        _call: &'t CallShape,
        data: D,
    ) -> Self::Output {
        self.visit_expression(element, data)
    }

    fn visit_function_call(
        &mut self,
        element: &'t Node,
        call: &'t FunctionCall,
        data: D,
    ) -> Self::Output {
        self.visit_call(element, &call.call, data)
    }

    fn visit_array_get_call(
        &mut self,
        element: &'t Node,
        call: &'t ArrayGetCall,
        data: D,
    ) -> Self::Output {
        self.visit_call(element, &call.call, data)
    }

    fn visit_array_set_call(
        &mut self,
        element: &'t Node,
        call: &'t ArraySetCall,
        data: D,
    ) -> Self::Output {
        self.visit_call(element, &call.call, data)
    }

    fn visit_qualified_access(
        &mut self,
        element: &'t Node,
        _access: &'t QualifiedAccess,
        data: D,
    ) -> Self::Output {
        self.visit_expression(element, data)
    }

    // === 引用 ===

    fn visit_reference(
        &mut self,
        element: &'t Node,
        data: D,
    ) -> Self::Output {
        self.visit_element(element, data)
    }

    fn visit_named_reference(
        &mut self,
        element: &'t Node,
        _reference: &'t NamedReference,
        data: D,
    ) -> Self::Output {
        self.visit_reference(element, data)
    }

    fn visit_resolved_named_reference(
        &mut self,
        element: &'t Node,
        reference: &'t ResolvedNamedReference,
        data: D,
    ) -> Self::Output {
        self.visit_named_reference(element, &reference.reference, data)
    }
}

impl Node {
    /// 双重分派：调用与本变体对应的访问方法
    pub fn accept<'t, V, D>(
        &'t self,
        visitor: &mut V,
        data: D,
    ) -> V::Output
    where
        V: Visitor<'t, D> + ?Sized,
    {
        match self {
            Node::File(n) => visitor.visit_file(self, n, data),
            Node::Class(n) => visitor.visit_class(self, n, data),
            Node::NamedFunction(n) => visitor.visit_named_function(self, n, data),
            Node::Constructor(n) => visitor.visit_constructor(self, n, data),
            Node::Property(n) => visitor.visit_property(self, n, data),
            Node::ValueParameter(n) => visitor.visit_value_parameter(self, n, data),
            Node::Annotation(n) => visitor.visit_annotation(self, n, data),
            Node::Const(n) => visitor.visit_const(self, n, data),
            Node::Block(n) => visitor.visit_block(self, n, data),
            Node::Return(n) => visitor.visit_return(self, n, data),
            Node::NamedArgument(n) => visitor.visit_named_argument(self, n, data),
            Node::Call(n) => visitor.visit_call(self, n, data),
            Node::FunctionCall(n) => visitor.visit_function_call(self, n, data),
            Node::ArrayGetCall(n) => visitor.visit_array_get_call(self, n, data),
            Node::ArraySetCall(n) => visitor.visit_array_set_call(self, n, data),
            Node::QualifiedAccess(n) => visitor.visit_qualified_access(self, n, data),
            Node::NamedReference(n) => visitor.visit_named_reference(self, n, data),
            Node::ResolvedNamedReference(n) => {
                visitor.visit_resolved_named_reference(self, n, data)
            }
        }
    }

    /// 按声明顺序对每个子节点调用 `accept`，丢弃返回值
    pub fn accept_children<'t, V, D>(
        &'t self,
        visitor: &mut V,
        data: D,
    ) where
        V: Visitor<'t, D> + ?Sized,
        D: Clone,
    {
        self.walk_children(&mut |child| {
            child.accept(visitor, data.clone());
        });
    }
}
