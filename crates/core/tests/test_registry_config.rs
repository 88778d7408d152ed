//! Loading tag registries from disk

use nanbox_core::{BoxError, BoxedValue, ConfigError, RegistryError, Tag, TagRegistry};
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_registry_file() {
    let file = write_config(
        r#"
[[variant]]
tag = 5
name = "string"

[[variant]]
tag = 6
name = "array"

[[variant]]
tag = 7
name = "closure"
"#,
    );

    let registry = TagRegistry::load(file.path()).unwrap();
    assert_eq!(registry.len(), 8);
    assert_eq!(registry.tag_of("array").map(Tag::get), Some(0x6));

    let string = BoxedValue::from_tagged(0x5, 0x7f00_0000_0010, false).unwrap();
    assert_eq!(registry.describe(string), "string");
    assert_eq!(registry.describe(BoxedValue::null()), "null");
    assert_eq!(registry.free_tags().count(), 7);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tags.toml");

    match TagRegistry::load(&path) {
        Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected Io error, got {:?}", other),
    }
}

#[test]
fn test_load_rejects_duplicate_tag() {
    let file = write_config(
        r#"
[[variant]]
tag = 8
name = "string"

[[variant]]
tag = 8
name = "symbol"
"#,
    );

    let err = TagRegistry::load(file.path()).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Registry(RegistryError::DuplicateTag { .. })
    ));
    assert!(err.to_string().contains("already assigned to 'string'"));
}

#[test]
fn test_load_rejects_reserved_float_tag() {
    let file = write_config("[[variant]]\ntag = 15\nname = \"double\"\n");

    let err = TagRegistry::load(file.path()).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Registry(RegistryError::Tag(BoxError::InvalidTag(0xF)))
    ));
}

#[test]
fn test_load_empty_file_gives_reference_variants() {
    let file = write_config("");
    let registry = TagRegistry::load(file.path()).unwrap();
    assert_eq!(registry, TagRegistry::new());
}
