//! 引用节点
//!
//! 引用节点都没有子节点。已解析引用只保存符号编号，
//! 目标声明通过描述符表查找。

use crate::frontend::descriptor::SymbolId;
use crate::frontend::name::Name;
use crate::util::span::Span;

/// 按名字引用（未解析）
#[derive(Debug, Clone, PartialEq)]
pub struct NamedReference {
    pub span: Span,
    pub name: Name,
}

impl NamedReference {
    pub fn new(
        name: Name,
        span: Span,
    ) -> Self {
        Self { span, name }
    }
}

/// 已解析的名字引用
///
/// 细化 [`NamedReference`]：共享 `name`，额外携带解析到的符号。
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNamedReference {
    pub reference: NamedReference,
    pub symbol: SymbolId,
}

impl ResolvedNamedReference {
    pub fn new(
        reference: NamedReference,
        symbol: SymbolId,
    ) -> Self {
        Self { reference, symbol }
    }

    #[inline]
    pub fn name(&self) -> &Name {
        &self.reference.name
    }
}
