//! Directory-backed module store: compile, load, and corruption handling

use std::fs;

use lingxi::frontend::descriptor::Visibility;
use lingxi::frontend::Compiler;
use lingxi::metadata::store::MODULE_FILE_NAME;
use lingxi::metadata::{load_module, DecodeError, DirectoryModuleStore, LoadError, StoreError};
use tempfile::TempDir;

use crate::support::{require_version, SourceBuilder};

fn compile_into(store: &DirectoryModuleStore) {
    let mut source = SourceBuilder::new();
    let declarations = vec![
        source.property(
            "pkg.version",
            false,
            Visibility::Public,
            None,
            vec![require_version("1.1", &[("errorCode", "3")])],
        ),
        source.function("pkg.run", None, &["args"], Vec::new(), None),
    ];
    let mut files = vec![source.file("pkg", declarations)];
    Compiler::default()
        .compile(&mut files, &mut source.table, store, "pkg")
        .unwrap();
}

#[test]
fn test_compile_then_load_from_directory() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryModuleStore::new(dir.path());
    compile_into(&store);

    assert!(dir.path().join("pkg").join(MODULE_FILE_NAME).is_file());
    let module = load_module(&store, "pkg").unwrap();
    assert_eq!(module.records().len(), 2);

    let version = module.find_unambiguous("pkg.version").unwrap();
    let requirements = version.decode_requirements().unwrap();
    assert_eq!(requirements[0].error_code, Some(3));
    assert!(module
        .find_unambiguous("pkg.run")
        .unwrap()
        .requirements
        .is_empty());
}

#[test]
fn test_missing_location() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryModuleStore::new(dir.path());
    assert!(matches!(
        load_module(&store, "absent"),
        Err(LoadError::Store(StoreError::NotFound(_)))
    ));
}

#[test]
fn test_corrupt_file_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryModuleStore::new(dir.path());
    compile_into(&store);
    let path = store.module_path("pkg");

    let mut bytes = fs::read(&path).unwrap();
    bytes[0] = b'X';
    fs::write(&path, &bytes).unwrap();
    assert!(matches!(
        load_module(&store, "pkg"),
        Err(LoadError::Malformed {
            source: DecodeError::InvalidMagic,
            ..
        })
    ));

    bytes[0] = b'L';
    bytes.push(0);
    fs::write(&path, &bytes).unwrap();
    assert!(matches!(
        load_module(&store, "pkg"),
        Err(LoadError::Malformed {
            source: DecodeError::TrailingBytes { .. },
            ..
        })
    ));
}
