//! 无效使用点目标检查
//!
//! 私有属性不生成访问器，`@get:`、`@set:`、`@setparam:` 注解因此没有
//! 落点。主构造器中的 `private val` 参数按其声明的属性处理；普通参数
//! 不是成员，不检查。

use crate::frontend::descriptor::Descriptor;
use crate::frontend::tree::{Node, UseSiteTarget};
use crate::util::diagnostic::codes::ANNOTATION_TARGET_ON_NON_EXISTENT_DECLARATION;

use super::{CheckerContext, DeclarationChecker};

/// 私有属性/参数上的无效 get/set/setparam 目标
#[derive(Debug, Default, Clone, Copy)]
pub struct UselessUseSiteTargetChecker;

impl UselessUseSiteTargetChecker {
    pub const NAME: &'static str = "useless-use-site-target";

    fn accessor(target: UseSiteTarget) -> Option<&'static str> {
        match target {
            UseSiteTarget::PropertyGetter => Some("getter"),
            UseSiteTarget::PropertySetter => Some("setter"),
            UseSiteTarget::SetterParameter => Some("setter parameter"),
            _ => None,
        }
    }
}

impl DeclarationChecker for UselessUseSiteTargetChecker {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(
        &self,
        declaration: &Node,
        descriptor: &Descriptor,
        context: &CheckerContext<'_>,
    ) {
        let member = match declaration {
            Node::Property(_) => descriptor,
            Node::ValueParameter(parameter) => {
                match parameter.property.and_then(|p| context.descriptors.get(p)) {
                    Some(property) => property,
                    None => return,
                }
            }
            _ => return,
        };
        if !member.kind.is_member() || !member.visibility.is_private() {
            return;
        }
        let Ok(annotations) = declaration.annotations() else {
            return;
        };

        for annotation in annotations.iter().filter_map(Node::as_annotation) {
            let Some(target) = annotation.use_site_target else {
                continue;
            };
            let Some(accessor) = Self::accessor(target.value) else {
                continue;
            };
            let name = member
                .name()
                .map(|n| n.to_string())
                .unwrap_or_default();
            context.report(
                ANNOTATION_TARGET_ON_NON_EXISTENT_DECLARATION
                    .on(target.span)
                    .param("target", target.value.keyword())
                    .param("declaration", member.kind.describe())
                    .param("name", name)
                    .param("accessor", accessor)
                    .build(),
            );
        }
    }
}
