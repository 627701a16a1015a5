//! `@RequireVersion` 注解检查

use crate::frontend::descriptor::Descriptor;
use crate::frontend::resolve::{is_require_version, requirement_from_annotation, REQUIRE_VERSION};
use crate::frontend::tree::Node;
use crate::util::diagnostic::codes::MALFORMED_VERSION_REQUIREMENT;

use super::{CheckerContext, DeclarationChecker};

/// 报告无法转换为版本需求的 `@RequireVersion` 注解
#[derive(Debug, Default, Clone, Copy)]
pub struct RequireVersionChecker;

impl RequireVersionChecker {
    pub const NAME: &'static str = "require-version";
}

impl DeclarationChecker for RequireVersionChecker {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(
        &self,
        declaration: &Node,
        _descriptor: &Descriptor,
        context: &CheckerContext<'_>,
    ) {
        let Ok(annotations) = declaration.annotations() else {
            return;
        };
        for annotation in annotations
            .iter()
            .filter_map(Node::as_annotation)
            .filter(|a| is_require_version(a))
        {
            if let Err(err) = requirement_from_annotation(annotation) {
                context.report(
                    MALFORMED_VERSION_REQUIREMENT
                        .on(annotation.span)
                        .param("annotation", REQUIRE_VERSION)
                        .param("reason", err)
                        .build(),
                );
            }
        }
    }
}
