//! Tag Registry
//!
//! The codec only gives meaning to tags `0x0..=0x4`. An embedding VM names the
//! rest of its object model (strings, arrays, closures, ...) in a
//! [`TagRegistry`], either in code or from a TOML file:
//!
//! ```toml
//! # keep pointer/int/false/true/null registered (default: true)
//! reference_variants = true
//!
//! [[variant]]
//! tag = 5
//! name = "string"
//!
//! [[variant]]
//! tag = 6
//! name = "array"
//! ```
//!
//! # Example
//!
//! ```rust
//! use nanbox_core::{BoxedValue, TagRegistry};
//!
//! let registry = TagRegistry::new().with_variant(0x5, "string")?;
//! let value = BoxedValue::from_tagged(0x5, 0x1000, false)?;
//! assert_eq!(registry.describe(value), "string");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::BoxError;
use crate::tag::Tag;
use crate::value::BoxedValue;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Tag(#[from] BoxError),

    #[error("DuplicateTag: tag {tag} is already assigned to '{existing}'")]
    DuplicateTag { tag: Tag, existing: String },

    #[error("DuplicateName: variant name '{name}' is already bound to tag {tag}")]
    DuplicateName { name: String, tag: Tag },

    #[error("EmptyName: variant names must not be empty")]
    EmptyName,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read tag registry {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tag registry: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid tag registry: {0}")]
    Registry(#[from] RegistryError),
}

/// On-disk form of a registry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    #[serde(default = "default_reference_variants")]
    reference_variants: bool,
    #[serde(default, rename = "variant")]
    variants: Vec<VariantEntry>,
}

fn default_reference_variants() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct VariantEntry {
    tag: u8,
    name: String,
}

/// Mapping from tag value to variant name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRegistry {
    names: BTreeMap<Tag, String>,
}

impl TagRegistry {
    /// A registry holding the reference variants
    pub fn new() -> Self {
        let names = Tag::REFERENCE
            .iter()
            .filter_map(|&tag| tag.reference_name().map(|name| (tag, name.to_string())))
            .collect();
        TagRegistry { names }
    }

    /// A registry with nothing assigned
    pub fn empty() -> Self {
        TagRegistry::default()
    }

    /// Assign `name` to `tag`
    pub fn register(&mut self, tag: u8, name: impl Into<String>) -> Result<Tag, RegistryError> {
        let tag = Tag::new(tag)?;
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if let Some(existing) = self.names.get(&tag) {
            return Err(RegistryError::DuplicateTag {
                tag,
                existing: existing.clone(),
            });
        }
        if let Some(bound) = self.tag_of(&name) {
            return Err(RegistryError::DuplicateName { name, tag: bound });
        }
        debug!(%tag, %name, "registered variant");
        self.names.insert(tag, name);
        Ok(tag)
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_variant(mut self, tag: u8, name: impl Into<String>) -> Result<Self, RegistryError> {
        self.register(tag, name)?;
        Ok(self)
    }

    pub fn name_of(&self, tag: Tag) -> Option<&str> {
        self.names.get(&tag).map(String::as_str)
    }

    pub fn tag_of(&self, name: &str) -> Option<Tag> {
        self.names
            .iter()
            .find_map(|(tag, bound)| (bound == name).then_some(*tag))
    }

    /// Registered variants in tag order
    pub fn iter(&self) -> impl Iterator<Item = (Tag, &str)> {
        self.names.iter().map(|(tag, name)| (*tag, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Consumer tags nobody has claimed yet
    pub fn free_tags(&self) -> impl Iterator<Item = Tag> + '_ {
        Tag::custom().filter(|tag| !self.names.contains_key(tag))
    }

    /// Human-readable variant name of a value
    pub fn describe(&self, value: BoxedValue) -> &str {
        match value.tag() {
            None => "float",
            Some(tag) => self.name_of(tag).unwrap_or("unknown"),
        }
    }

    /// Parse a registry from TOML
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: RegistryFile = toml::from_str(content)?;
        let mut registry = if file.reference_variants {
            TagRegistry::new()
        } else {
            TagRegistry::empty()
        };
        for entry in file.variants {
            registry.register(entry.tag, entry.name)?;
        }
        Ok(registry)
    }

    /// Load a registry from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            variants = registry.len(),
            "loaded tag registry"
        );
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_reference_variants() {
        let registry = TagRegistry::new();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.name_of(Tag::POINTER), Some("pointer"));
        assert_eq!(registry.name_of(Tag::NULL), Some("null"));
        assert_eq!(registry.tag_of("int"), Some(Tag::INT));
        assert_eq!(registry.tag_of("true"), Some(Tag::TRUE));
        assert_eq!(registry.free_tags().count(), 10);
    }

    #[test]
    fn test_register_custom_variant() {
        let mut registry = TagRegistry::new();
        let tag = registry.register(0x5, "string").unwrap();
        assert_eq!(tag, Tag::FIRST_CUSTOM);
        assert_eq!(registry.name_of(tag), Some("string"));
        assert!(registry.free_tags().all(|t| t != tag));
    }

    #[test]
    fn test_register_rejects_float_tag() {
        let mut registry = TagRegistry::empty();
        assert_eq!(
            registry.register(0xF, "nan"),
            Err(RegistryError::Tag(BoxError::InvalidTag(0xF)))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = TagRegistry::new();
        assert_eq!(
            registry.register(0x1, "integer"),
            Err(RegistryError::DuplicateTag {
                tag: Tag::INT,
                existing: "int".to_string(),
            })
        );
        assert_eq!(
            registry.register(0x9, "false"),
            Err(RegistryError::DuplicateName {
                name: "false".to_string(),
                tag: Tag::FALSE,
            })
        );
        assert_eq!(registry.register(0x9, "  "), Err(RegistryError::EmptyName));
    }

    #[test]
    fn test_describe() {
        let registry = TagRegistry::new().with_variant(0x6, "closure").unwrap();
        assert_eq!(registry.describe(BoxedValue::from_float(1.0)), "float");
        assert_eq!(registry.describe(BoxedValue::from_bool(true)), "true");
        assert_eq!(registry.describe(BoxedValue::null()), "null");
        let closure = BoxedValue::from_tagged(0x6, 0x40, false).unwrap();
        assert_eq!(registry.describe(closure), "closure");
        let stray = BoxedValue::from_tagged(0x7, 0, false).unwrap();
        assert_eq!(registry.describe(stray), "unknown");
    }

    #[test]
    fn test_from_toml_str() {
        let registry = TagRegistry::from_toml_str(
            r#"
            [[variant]]
            tag = 5
            name = "string"

            [[variant]]
            tag = 14
            name = "symbol"
            "#,
        )
        .unwrap();
        assert_eq!(registry.len(), 7);
        assert_eq!(registry.tag_of("symbol"), Some(Tag::MAX));
        let names: Vec<&str> = registry.iter().map(|(_, name)| name).collect();
        assert_eq!(
            names,
            ["pointer", "int", "false", "true", "null", "string", "symbol"]
        );
    }

    #[test]
    fn test_from_toml_without_reference_variants() {
        let registry = TagRegistry::from_toml_str(
            r#"
            reference_variants = false

            [[variant]]
            tag = 1
            name = "fixnum"
            "#,
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.name_of(Tag::INT), Some("fixnum"));
        assert_eq!(registry.name_of(Tag::POINTER), None);
    }

    #[test]
    fn test_from_toml_errors() {
        let err = TagRegistry::from_toml_str("[[variant]]\ntag = 15\nname = \"x\"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Registry(RegistryError::Tag(BoxError::InvalidTag(15)))
        ));

        let err = TagRegistry::from_toml_str("[[variant]]\ntag = 300\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = TagRegistry::from_toml_str("colour = \"blue\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
