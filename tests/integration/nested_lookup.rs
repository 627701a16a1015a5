//! Requirements on nested class members survive compile and load

use lingxi::frontend::descriptor::{ClassKind, Visibility};
use lingxi::frontend::Compiler;
use lingxi::metadata::{
    load_module, LookupError, MemoryModuleStore, ModuleHandle, RequirementLevel, Version,
    VersionKind, VersionRequirement,
};

use crate::support::{require_version, SourceBuilder};

/// ```text
/// package test
///
/// @RequireVersion("1.1")
/// class Outer {
///     class Inner {
///         class Deep {
///             constructor()
///             fun f(p)
///             val x
///             var s
///             fun g()
///             fun g(a)
///         }
///     }
///     companion object
/// }
/// ```
fn compile_nested() -> ModuleHandle {
    let mut source = SourceBuilder::new();
    let outer = source.class(
        "test.Outer",
        ClassKind::Class,
        None,
        vec![require_version("1.1", &[])],
        |source, outer| {
            let inner = source.class(
                "test.Outer.Inner",
                ClassKind::Class,
                Some(outer),
                Vec::new(),
                |source, inner| {
                    vec![source.class(
                        "test.Outer.Inner.Deep",
                        ClassKind::Class,
                        Some(inner),
                        Vec::new(),
                        |source, deep| {
                            vec![
                                source.constructor("test.Outer.Inner.Deep", deep),
                                source.function(
                                    "test.Outer.Inner.Deep.f",
                                    Some(deep),
                                    &["p"],
                                    Vec::new(),
                                    None,
                                ),
                                source.property(
                                    "test.Outer.Inner.Deep.x",
                                    false,
                                    Visibility::Public,
                                    Some(deep),
                                    Vec::new(),
                                ),
                                source.property(
                                    "test.Outer.Inner.Deep.s",
                                    true,
                                    Visibility::Public,
                                    Some(deep),
                                    Vec::new(),
                                ),
                                source.function(
                                    "test.Outer.Inner.Deep.g",
                                    Some(deep),
                                    &[],
                                    Vec::new(),
                                    None,
                                ),
                                source.function(
                                    "test.Outer.Inner.Deep.g",
                                    Some(deep),
                                    &["a"],
                                    Vec::new(),
                                    None,
                                ),
                            ]
                        },
                    )]
                },
            );
            let companion = source.class(
                "test.Outer.Companion",
                ClassKind::CompanionObject,
                Some(outer),
                Vec::new(),
                |_, _| Vec::new(),
            );
            vec![inner, companion]
        },
    );
    let mut files = vec![source.file("test", vec![outer])];

    let store = MemoryModuleStore::new();
    Compiler::default()
        .compile(&mut files, &mut source.table, &store, "nested")
        .unwrap();
    load_module(&store, "nested").unwrap()
}

#[test]
fn test_nested_members_carry_requirement() {
    let module = compile_nested();
    let expected = VersionRequirement {
        kind: VersionKind::LanguageVersion,
        version: Version::new(1, 1),
        level: RequirementLevel::Error,
        message: None,
        error_code: None,
    };

    for name in [
        "test.Outer",
        "test.Outer.Inner",
        "test.Outer.Inner.Deep",
        "test.Outer.Inner.Deep.<init>",
        "test.Outer.Inner.Deep.f",
        "test.Outer.Inner.Deep.x",
        "test.Outer.Inner.Deep.s",
        "test.Outer.Companion",
    ] {
        let record = module
            .find_unambiguous(name)
            .unwrap_or_else(|err| panic!("{}: {}", name, err));
        let requirements = record.decode_requirements().unwrap();
        assert_eq!(requirements.as_slice(), &[expected.clone()], "{}", name);

        let encoded = &record.requirements[0];
        assert_eq!(encoded.version(), Ok(Version::new(1, 1)));
        assert_eq!(encoded.level(), Ok(RequirementLevel::Error));
        assert_eq!(encoded.kind(), Ok(VersionKind::LanguageVersion));
    }
}

#[test]
fn test_constructor_and_parameters() {
    let module = compile_nested();

    // `<init>` only names constructors inside a class
    assert!(matches!(
        module.find_unambiguous("test.<init>"),
        Err(LookupError::NotFound { .. })
    ));
    // Value parameters are not part of the module metadata
    match module.find_unambiguous("test.Outer.Inner.Deep.f.p") {
        Err(LookupError::NotFound { segment, scope }) => {
            assert_eq!(segment, "p");
            assert_eq!(scope, "test.Outer.Inner.Deep.f");
        }
        other => panic!("unexpected {:?}", other.map(|r| r.path.to_string())),
    }
}

#[test]
fn test_overloads_are_ambiguous() {
    let module = compile_nested();
    match module.find_unambiguous("test.Outer.Inner.Deep.g") {
        Err(LookupError::Ambiguous { segment, count, .. }) => {
            assert_eq!(segment, "g");
            assert_eq!(count, 2);
        }
        other => panic!("unexpected {:?}", other.map(|r| r.path.to_string())),
    }
    assert!(matches!(
        module.find_unambiguous("test.Outer.Missing"),
        Err(LookupError::NotFound { .. })
    ));
    assert!(matches!(module.find_unambiguous(""), Err(LookupError::EmptyName)));
}
