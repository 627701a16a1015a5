//! 名字原子与全限定名
//!
//! `Name` 是不可变的名字原子，克隆代价为一次引用计数。
//! 特殊名字用尖括号包裹，例如构造器 `<init>`。

use std::fmt;
use std::sync::Arc;

/// 构造器的特殊名字
pub const INIT: &str = "<init>";

/// 名字原子
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Arc<str>);

impl Name {
    /// 普通标识符
    pub fn identifier(text: &str) -> Self {
        debug_assert!(
            is_identifier(text),
            "'{}' is not a valid identifier",
            text
        );
        Self(Arc::from(text))
    }

    /// 特殊名字，如 `<init>`
    pub fn special(text: &str) -> Self {
        debug_assert!(is_special(text), "'{}' is not a special name", text);
        Self(Arc::from(text))
    }

    /// 按文本自动区分普通/特殊名字，非法文本返回 `None`
    pub fn parse(text: &str) -> Option<Self> {
        if is_identifier(text) || is_special(text) {
            Some(Self(Arc::from(text)))
        } else {
            None
        }
    }

    pub fn init() -> Self {
        Self::special(INIT)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_special(&self) -> bool {
        is_special(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Name {
    fn eq(
        &self,
        other: &str,
    ) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(
        &self,
        other: &&str,
    ) -> bool {
        &*self.0 == *other
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first == '_' || unicode_ident::is_xid_start(first) => {
            chars.all(unicode_ident::is_xid_continue)
        }
        _ => false,
    }
}

fn is_special(text: &str) -> bool {
    text.len() > 2
        && text.starts_with('<')
        && text.ends_with('>')
        && !text[1..text.len() - 1].contains(['<', '>', '.'])
}

/// 全限定名（标识路径），如 `test.Outer.Inner.<init>`
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FqName {
    segments: Vec<Name>,
}

impl FqName {
    /// 根路径
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Name>) -> Self {
        Self { segments }
    }

    /// 解析点分路径，任何非法片段都返回 `None`
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() {
            return Some(Self::root());
        }
        text.split('.')
            .map(Name::parse)
            .collect::<Option<Vec<_>>>()
            .map(Self::from_segments)
    }

    /// 追加一个子名字
    pub fn child(
        &self,
        name: Name,
    ) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(name);
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.to_vec(),
        })
    }

    pub fn short_name(&self) -> Option<&Name> {
        self.segments.last()
    }

    pub fn segments(&self) -> &[Name] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for FqName {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment.as_str())?;
        }
        Ok(())
    }
}

impl fmt::Debug for FqName {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "FqName({})", self)
    }
}
