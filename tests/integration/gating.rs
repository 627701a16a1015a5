//! Version gating of library declarations, at load time and from a consumer

use lingxi::frontend::compiler::CompileError;
use lingxi::frontend::descriptor::DescriptorTable;
use lingxi::frontend::Compiler;
use lingxi::metadata::gate::COMPILER_VERSION;
use lingxi::metadata::{
    load_module, GateState, LanguageVersionSettings, LookupError, MemoryModuleStore,
    ModuleHandle, ModuleStore, Version,
};
use lingxi::util::config::LingxiConfig;
use lingxi::util::diagnostic::codes::{
    HIDDEN_DECLARATION, VERSION_REQUIREMENT_ERROR, VERSION_REQUIREMENT_WARNING,
};

use crate::support::{fq, require_version, SourceBuilder};

/// ```text
/// package lib
///
/// @RequireVersion("1.1") fun f()
/// @RequireVersion("1.3", level = "WARNING", message = "preview API") fun w()
/// @RequireVersion("1.0", level = "HIDDEN") fun h()
/// @RequireVersion("2.0", versionKind = "API_VERSION", errorCode = 7) fun api()
/// @RequireVersion("99.0", versionKind = "COMPILER_VERSION") fun future()
/// fun plain()
/// ```
fn compile_library(store: &dyn ModuleStore) {
    let mut source = SourceBuilder::new();
    let declarations = vec![
        source.function("lib.f", None, &[], vec![require_version("1.1", &[])], None),
        source.function(
            "lib.w",
            None,
            &[],
            vec![require_version(
                "1.3",
                &[("level", "WARNING"), ("message", "preview API")],
            )],
            None,
        ),
        source.function(
            "lib.h",
            None,
            &[],
            vec![require_version("1.0", &[("level", "HIDDEN")])],
            None,
        ),
        source.function(
            "lib.api",
            None,
            &[],
            vec![require_version(
                "2.0",
                &[("versionKind", "API_VERSION"), ("errorCode", "7")],
            )],
            None,
        ),
        source.function(
            "lib.future",
            None,
            &[],
            vec![require_version("99.0", &[("versionKind", "COMPILER_VERSION")])],
            None,
        ),
        source.function("lib.plain", None, &[], Vec::new(), None),
    ];
    let mut files = vec![source.file("lib", declarations)];
    Compiler::default()
        .compile(&mut files, &mut source.table, store, "lib")
        .unwrap();
}

fn library() -> ModuleHandle {
    let store = MemoryModuleStore::new();
    compile_library(&store);
    load_module(&store, "lib").unwrap()
}

fn at(version: &str) -> LanguageVersionSettings {
    LanguageVersionSettings::new(version.parse().unwrap())
}

#[test]
fn test_language_version_requirement() {
    let module = library();

    match module.resolve_visible("lib.f", &at("1.0")) {
        Err(LookupError::Rejected(diagnostic)) => {
            assert_eq!(diagnostic.code, VERSION_REQUIREMENT_ERROR.code);
            assert_eq!(
                diagnostic.message,
                "'lib.f' requires language version 1.1 or newer"
            );
        }
        other => panic!("unexpected {:?}", other.map(|v| v.state)),
    }
    for version in ["1.1", "1.2"] {
        let visible = module.resolve_visible("lib.f", &at(version)).unwrap();
        assert_eq!(visible.state, GateState::Allowed);
        assert!(visible.warnings.is_empty());
    }
}

#[test]
fn test_warning_and_hidden_levels() {
    let module = library();

    let visible = module.resolve_visible("lib.w", &at("1.2")).unwrap();
    assert_eq!(visible.state, GateState::Warned);
    assert_eq!(visible.warnings.len(), 1);
    assert_eq!(visible.warnings[0].code, VERSION_REQUIREMENT_WARNING.code);
    assert_eq!(visible.warnings[0].message, "'lib.w' preview API");

    // HIDDEN rejects whatever the consumer version is
    for version in ["0.9", "1.0", "5.0"] {
        assert!(matches!(
            module.resolve_visible("lib.h", &at(version)),
            Err(LookupError::Rejected(d)) if d.code == HIDDEN_DECLARATION.code
        ));
    }
}

#[test]
fn test_untracked_axes_are_allowed() {
    let module = library();

    // API version tracking is off unless configured
    let visible = module.resolve_visible("lib.api", &at("1.0")).unwrap();
    assert_eq!(visible.state, GateState::Allowed);

    let tracked = at("1.0").with_api_version(Version::new(1, 5));
    match module.resolve_visible("lib.api", &tracked) {
        Err(LookupError::Rejected(diagnostic)) => {
            assert!(diagnostic.message.ends_with("(error code 7)"));
        }
        other => panic!("unexpected {:?}", other.map(|v| v.state)),
    }

    let compiler = at("1.2").with_compiler_version(*COMPILER_VERSION);
    assert!(module.resolve_visible("lib.future", &compiler).is_err());
}

#[test]
fn test_enforcement_report() {
    let module = library();
    let report = module.enforce(&at("1.0")).unwrap();

    assert_eq!(report.state_of(&fq("lib.f")), Some(GateState::Rejected));
    assert_eq!(report.state_of(&fq("lib.w")), Some(GateState::Warned));
    assert_eq!(report.state_of(&fq("lib.h")), Some(GateState::Rejected));
    assert_eq!(report.state_of(&fq("lib.api")), Some(GateState::Allowed));
    assert_eq!(report.state_of(&fq("lib.future")), Some(GateState::Rejected));
    assert_eq!(report.state_of(&fq("lib.plain")), Some(GateState::Allowed));
    assert_eq!(report.count(GateState::Rejected), 3);
    assert!(report.has_errors());
}

/// ```text
/// package app
///
/// fun main() { f(); w() }
/// ```
fn compile_consumer(config: &LingxiConfig) -> Result<Vec<&'static str>, CompileError> {
    let store = MemoryModuleStore::new();
    compile_library(&store);

    let mut compiler = Compiler::from_config(config);
    let mut table = DescriptorTable::new();
    compiler
        .load_dependency(&store, "lib", &mut table)
        .unwrap();
    compiler.import(fq("lib"));

    let mut source = SourceBuilder::with_table(table);
    let body = lingxi::frontend::tree::Block {
        span: source.span(),
        statements: vec![source.call("f"), source.call("w")],
    };
    let main = source.function("app.main", None, &[], Vec::new(), Some(body.into()));
    let mut files = vec![source.file("app", vec![main])];

    let compiled = compiler.compile(&mut files, &mut source.table, &store, "app")?;
    Ok(compiled.diagnostics.iter().map(|d| d.code).collect())
}

#[test]
fn test_consumer_compilation_is_gated() {
    let mut config = LingxiConfig::default();

    config.language.version = Version::new(1, 0);
    match compile_consumer(&config) {
        Err(CompileError::Diagnostics(diagnostics)) => {
            let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
            assert_eq!(
                codes,
                vec![VERSION_REQUIREMENT_ERROR.code, VERSION_REQUIREMENT_WARNING.code]
            );
        }
        other => panic!("unexpected {:?}", other),
    }

    config.language.version = Version::new(1, 2);
    assert_eq!(
        compile_consumer(&config).unwrap(),
        vec![VERSION_REQUIREMENT_WARNING.code]
    );

    config.language.version = Version::new(1, 3);
    assert!(compile_consumer(&config).unwrap().is_empty());
}
