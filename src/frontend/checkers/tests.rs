//! 检查器注册表与内置检查器测试

use super::*;
use crate::frontend::descriptor::{ClassKind, DeclarationKind, Origin, Visibility};
use crate::frontend::name::{FqName, Name};
use crate::frontend::resolve::REQUIRE_VERSION;
use crate::frontend::tree::{
    Annotation, Class, Const, ConstValue, Constructor, File, FunctionShape, Property,
    UseSiteTarget, ValueParameter,
};
use crate::util::diagnostic::codes::{
    ANNOTATION_TARGET_ON_NON_EXISTENT_DECLARATION, MALFORMED_VERSION_REQUIREMENT,
};
use crate::util::diagnostic::Diagnostic;
use crate::util::span::{Position, Span};
use crate::util::Spanned;

fn span(
    line: usize,
    column: usize,
) -> Span {
    Span::new(Position::new(line, column), Position::new(line, column + 3))
}

fn fq(text: &str) -> FqName {
    FqName::parse(text).unwrap()
}

fn targeted(
    target: UseSiteTarget,
    line: usize,
) -> Node {
    Annotation {
        span: span(line, 1),
        name: Name::identifier("Ann"),
        use_site_target: Some(Spanned::new(target, span(line, 2))),
        arguments: Vec::new(),
    }
    .into()
}

fn property(
    symbol: SymbolId,
    name: &str,
    line: usize,
    annotations: Vec<Node>,
) -> Node {
    Property {
        span: span(line, 1),
        symbol,
        name: Name::identifier(name),
        annotations,
        initializer: None,
    }
    .into()
}

fn file(declarations: Vec<Node>) -> Node {
    named_file("test.lx", declarations)
}

fn named_file(
    name: &str,
    declarations: Vec<Node>,
) -> Node {
    File {
        span: span(1, 1),
        name: name.to_string(),
        package: fq("test"),
        declarations,
    }
    .into()
}

fn class(
    symbol: SymbolId,
    declarations: Vec<Node>,
) -> Node {
    Class {
        span: span(1, 1),
        symbol,
        name: Name::identifier("A"),
        annotations: Vec::new(),
        declarations,
    }
    .into()
}

struct Fixture {
    table: DescriptorTable,
    class: SymbolId,
}

impl Fixture {
    fn new() -> Self {
        let mut table = DescriptorTable::new();
        let class = table.declare(
            fq("test.A"),
            DeclarationKind::Class(ClassKind::Class),
            Visibility::Public,
            None,
        );
        Self { table, class }
    }

    fn property(
        &mut self,
        name: &str,
        visibility: Visibility,
    ) -> SymbolId {
        self.table.declare(
            fq(&format!("test.A.{}", name)),
            DeclarationKind::Property { mutable: true },
            visibility,
            Some(self.class),
        )
    }

    fn run(
        &self,
        registry: &CheckerRegistry,
        files: &[Node],
    ) -> Vec<Diagnostic> {
        let sink = DiagnosticSink::new();
        let settings = LanguageVersionSettings::default();
        let context = CheckerContext::new(&sink, &self.table, &settings);
        registry.run(files, &context);
        sink.finish()
    }
}

fn sequential() -> CheckerConfig {
    CheckerConfig {
        parallel: false,
        disabled: Vec::new(),
    }
}

#[test]
fn test_private_property_targets() {
    let mut fixture = Fixture::new();
    let hidden = fixture.property("x", Visibility::Private);
    let files = vec![file(vec![class(
        fixture.class,
        vec![property(
            hidden,
            "x",
            2,
            vec![
                targeted(UseSiteTarget::PropertyGetter, 2),
                targeted(UseSiteTarget::PropertySetter, 3),
                targeted(UseSiteTarget::SetterParameter, 4),
                targeted(UseSiteTarget::Field, 5),
                targeted(UseSiteTarget::Property, 6),
            ],
        )],
    )])];

    let diagnostics = fixture.run(&CheckerRegistry::default(), &files);
    assert_eq!(diagnostics.len(), 3);
    for (diagnostic, line) in diagnostics.iter().zip(2..) {
        assert_eq!(diagnostic.code, ANNOTATION_TARGET_ON_NON_EXISTENT_DECLARATION.code);
        assert_eq!(diagnostic.span, Some(span(line, 2)));
    }
    assert_eq!(
        diagnostics[0].message,
        "'@get:' annotation has no effect: private property 'x' has no generated getter"
    );
    assert!(diagnostics[2].message.starts_with("'@setparam:'"));
}

#[test]
fn test_non_private_property_is_ignored() {
    let mut fixture = Fixture::new();
    let mut declarations = Vec::new();
    for (i, visibility) in [Visibility::Public, Visibility::Internal, Visibility::Protected]
        .into_iter()
        .enumerate()
    {
        let name = format!("p{}", i);
        let symbol = fixture.property(&name, visibility);
        declarations.push(property(
            symbol,
            &name,
            i + 2,
            vec![targeted(UseSiteTarget::PropertyGetter, i + 2)],
        ));
    }
    let files = vec![file(vec![class(fixture.class, declarations)])];
    assert!(fixture.run(&CheckerRegistry::default(), &files).is_empty());
}

#[test]
fn test_constructor_parameters() {
    let mut fixture = Fixture::new();
    let constructor = fixture.table.declare(
        fq("test.A.<init>"),
        DeclarationKind::Constructor { arity: 2 },
        Visibility::Public,
        Some(fixture.class),
    );
    let backing = fixture.property("x", Visibility::Private);
    let declared = fixture.table.declare(
        fq("test.A.<init>.x"),
        DeclarationKind::ValueParameter,
        Visibility::Public,
        Some(constructor),
    );
    let plain = fixture.table.declare(
        fq("test.A.<init>.y"),
        DeclarationKind::ValueParameter,
        Visibility::Public,
        Some(constructor),
    );
    let parameter = |symbol, property, name: &str, line| -> Node {
        ValueParameter {
            span: span(line, 1),
            symbol,
            property,
            name: Name::identifier(name),
            annotations: vec![targeted(UseSiteTarget::PropertySetter, line)],
            default_value: None,
        }
        .into()
    };
    let files = vec![file(vec![class(
        fixture.class,
        vec![Constructor {
            delegated_call: None,
            function: FunctionShape {
                span: span(2, 1),
                symbol: constructor,
                annotations: Vec::new(),
                parameters: vec![
                    parameter(declared, Some(backing), "x", 3),
                    parameter(plain, None, "y", 4),
                ],
                body: None,
            },
        }
        .into()],
    )])];

    let diagnostics = fixture.run(&CheckerRegistry::default(), &files);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].span, Some(span(3, 2)));
    assert!(diagnostics[0].message.contains("private property 'x'"));
}

/// 与内置检查器在同一锚点报告同一诊断
struct EchoChecker;

impl DeclarationChecker for EchoChecker {
    fn name(&self) -> &'static str {
        "echo"
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
        for annotation in annotations.iter().filter_map(Node::as_annotation) {
            if let Some(target) = annotation.use_site_target {
                context.report(
                    ANNOTATION_TARGET_ON_NON_EXISTENT_DECLARATION
                        .on(target.span)
                        .param("target", "echo")
                        .param("declaration", "property")
                        .param("name", "echo")
                        .param("accessor", "echo")
                        .build(),
                );
            }
        }
    }
}

#[test]
fn test_duplicate_reports_are_deduplicated() {
    let mut fixture = Fixture::new();
    let x = fixture.property("x", Visibility::Private);
    let files = vec![file(vec![class(
        fixture.class,
        vec![property(
            x,
            "x",
            2,
            vec![targeted(UseSiteTarget::PropertyGetter, 2)],
        )],
    )])];

    let mut registry = CheckerRegistry::new(sequential());
    assert!(registry.register(UselessUseSiteTargetChecker));
    assert!(registry.register(EchoChecker));
    assert!(!registry.register(UselessUseSiteTargetChecker));
    assert_eq!(
        registry.names().collect::<Vec<_>>(),
        vec![UselessUseSiteTargetChecker::NAME, "echo"]
    );

    let diagnostics = fixture.run(&registry, &files);
    assert_eq!(diagnostics.len(), 1);
    // 先注册的检查器先报告
    assert!(diagnostics[0].message.starts_with("'@get:'"));
}

#[test]
fn test_declarations_checked_once() {
    let mut fixture = Fixture::new();
    let x = fixture.property("x", Visibility::Private);
    let node = property(x, "x", 2, vec![targeted(UseSiteTarget::PropertyGetter, 2)]);
    // 同一声明出现在两个文件中
    let files = vec![
        file(vec![class(fixture.class, vec![node.clone()])]),
        file(vec![node]),
    ];
    let sink = DiagnosticSink::new();
    let settings = LanguageVersionSettings::default();
    let context = CheckerContext::new(&sink, &fixture.table, &settings);
    assert_eq!(CheckerRegistry::new(sequential()).run(&files, &context), 2);
}

#[test]
fn test_same_position_in_two_files() {
    let mut fixture = Fixture::new();
    let a = fixture.property("a", Visibility::Private);
    let b = fixture.property("b", Visibility::Private);
    // 两个文件中 `@get:` 都位于第 2 行第 2 列
    let files = vec![
        named_file(
            "b.lx",
            vec![property(b, "b", 2, vec![targeted(UseSiteTarget::PropertyGetter, 2)])],
        ),
        named_file(
            "a.lx",
            vec![property(a, "a", 2, vec![targeted(UseSiteTarget::PropertyGetter, 2)])],
        ),
    ];

    for registry in [
        CheckerRegistry::with_defaults(sequential()),
        CheckerRegistry::default(),
    ] {
        let diagnostics = fixture.run(&registry, &files);
        assert_eq!(diagnostics.len(), 2);
        let anchors: Vec<(&str, Option<Span>)> = diagnostics
            .iter()
            .map(|d| (d.file.as_deref().unwrap(), d.span))
            .collect();
        assert_eq!(
            anchors,
            vec![("a.lx", Some(span(2, 2))), ("b.lx", Some(span(2, 2)))]
        );
        assert!(diagnostics[0].message.contains("private property 'a'"));
        assert!(diagnostics[1].message.contains("private property 'b'"));
    }
}

#[test]
fn test_library_declarations_are_skipped() {
    let mut fixture = Fixture::new();
    let library = fixture.table.declare_with_origin(
        fq("lib.x"),
        DeclarationKind::Property { mutable: false },
        Visibility::Private,
        None,
        Origin::Library,
    );
    let files = vec![file(vec![property(
        library,
        "x",
        2,
        vec![targeted(UseSiteTarget::PropertyGetter, 2)],
    )])];
    assert!(fixture.run(&CheckerRegistry::default(), &files).is_empty());
}

#[test]
fn test_parallel_matches_sequential() {
    let mut fixture = Fixture::new();
    let mut declarations = Vec::new();
    for i in 0..64 {
        let name = format!("p{}", i);
        let visibility = if i % 3 == 0 {
            Visibility::Public
        } else {
            Visibility::Private
        };
        let symbol = fixture.property(&name, visibility);
        declarations.push(property(
            symbol,
            &name,
            i + 2,
            vec![
                targeted(UseSiteTarget::PropertyGetter, 2 * i + 2),
                targeted(UseSiteTarget::SetterParameter, 2 * i + 3),
            ],
        ));
    }
    let files = vec![file(vec![class(fixture.class, declarations)])];

    let parallel = fixture.run(&CheckerRegistry::default(), &files);
    let sequential = fixture.run(&CheckerRegistry::with_defaults(sequential()), &files);
    assert_eq!(parallel.len(), 84);
    assert_eq!(parallel, sequential);
}

fn require(arguments: Vec<Node>) -> Node {
    Annotation {
        span: span(2, 1),
        name: Name::identifier(REQUIRE_VERSION),
        use_site_target: None,
        arguments,
    }
    .into()
}

#[test]
fn test_malformed_require_version() {
    let mut fixture = Fixture::new();
    let x = fixture.property("x", Visibility::Public);
    let version = |text: &str| -> Node {
        Const {
            span: span(2, 10),
            value: ConstValue::String(text.to_string()),
        }
        .into()
    };
    let files = vec![file(vec![
        property(x, "x", 2, vec![require(vec![version("1.x")])]),
    ])];

    let diagnostics = fixture.run(&CheckerRegistry::default(), &files);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, MALFORMED_VERSION_REQUIREMENT.code);
    assert!(diagnostics[0].is_error());
    assert!(diagnostics[0].message.starts_with("invalid @RequireVersion annotation: "));

    let disabled = CheckerConfig {
        parallel: false,
        disabled: vec![RequireVersionChecker::NAME.to_string()],
    };
    assert!(fixture
        .run(&CheckerRegistry::with_defaults(disabled), &files)
        .is_empty());
}
