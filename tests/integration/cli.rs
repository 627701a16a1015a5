//! Integration tests for the `lingxi` binary

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use lingxi::frontend::descriptor::{ClassKind, DeclarationKind, Visibility};
use lingxi::metadata::module::{write_module, DeclarationRecord, ModuleMetadata};
use lingxi::metadata::{RequirementLevel, Version, VersionRequirement};
use tempfile::TempDir;

use crate::support::fq;

/// Writes a small module file and returns its path
fn create_module(dir: &TempDir) -> PathBuf {
    let metadata = ModuleMetadata::new(vec![
        DeclarationRecord::new(
            fq("test.A"),
            DeclarationKind::Class(ClassKind::Class),
            Visibility::Public,
        ),
        DeclarationRecord::new(
            fq("test.A.<init>"),
            DeclarationKind::Constructor { arity: 0 },
            Visibility::Public,
        ),
        DeclarationRecord::new(
            fq("test.A.f"),
            DeclarationKind::Function { arity: 0 },
            Visibility::Public,
        )
        .with_requirement(&VersionRequirement::language(Version::new(1, 1)))
        .unwrap(),
        DeclarationRecord::new(
            fq("test.A.f"),
            DeclarationKind::Function { arity: 1 },
            Visibility::Public,
        ),
        DeclarationRecord::new(
            fq("test.A.w"),
            DeclarationKind::Function { arity: 0 },
            Visibility::Public,
        )
        .with_requirement(
            &VersionRequirement::language(Version::new(1, 3))
                .with_level(RequirementLevel::Warning),
        )
        .unwrap(),
    ]);
    let path = dir.path().join("module.lxm");
    fs::write(&path, write_module(&metadata).unwrap()).unwrap();
    path
}

fn lingxi(
    dir: &Path,
    args: &[&str],
) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lingxi"))
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_dump() {
    let dir = TempDir::new().unwrap();
    let file = create_module(&dir);
    let output = lingxi(dir.path(), &["dump", file.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(5 records)"));
    assert!(stdout.contains("public constructor test.A.<init>"));
    assert!(stdout.contains("LANGUAGE_VERSION >= 1.1 (ERROR)"));
}

#[test]
fn test_lookup() {
    let dir = TempDir::new().unwrap();
    let file = create_module(&dir);

    let output = lingxi(dir.path(), &["lookup", file.to_str().unwrap(), "test.A.<init>"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("constructor test.A.<init>"));

    let output = lingxi(dir.path(), &["lookup", file.to_str().unwrap(), "test.A.f"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ambiguous declaration"));
}

#[test]
fn test_gate_text() {
    let dir = TempDir::new().unwrap();
    let file = create_module(&dir);

    let output = lingxi(
        dir.path(),
        &["gate", file.to_str().unwrap(), "--language-version", "1.0"],
    );
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rejected"));
    assert!(stdout.contains("requires language version 1.1 or newer"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 declaration(s) rejected"));

    let output = lingxi(
        dir.path(),
        &["gate", file.to_str().unwrap(), "--language-version", "1.3"],
    );
    assert!(output.status.success());
}

#[test]
fn test_gate_json_uses_config() {
    let dir = TempDir::new().unwrap();
    let file = create_module(&dir);
    fs::write(dir.path().join("lingxi.toml"), "[language]\nversion = \"1.2\"\n").unwrap();

    let output = lingxi(
        dir.path(),
        &["gate", file.to_str().unwrap(), "--format", "json"],
    );
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["languageVersion"], "1.2");
    assert_eq!(json["entries"].as_array().unwrap().len(), 5);
    let diagnostics = json["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["code"], "L2001");
    assert_eq!(diagnostics[0]["severity"], 2);
}
