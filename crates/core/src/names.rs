//! Translation between in-memory variant names and wire names.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;

/// A case conversion applied to every variant name that has no explicit rename.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameConversion {
    /// `fooBar`
    CamelCase,
    /// `FooBar`
    PascalCase,
    /// `foo_bar`
    SnakeCase,
    /// `foo-bar`
    DashCase,
    /// `FOO_BAR`
    ConstCase,
    /// `foo.bar`
    DotCase,
    /// `foo bar`
    SeparateWords,
    /// `foo/bar`
    SlashCase,
    /// `foo\bar`
    BackslashCase,
    /// A caller-supplied conversion. Not available from definition files.
    #[serde(skip)]
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl NameConversion {
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        NameConversion::Custom(Arc::new(f))
    }

    pub fn apply(&self, name: &str) -> String {
        match self {
            NameConversion::CamelCase => name.to_lower_camel_case(),
            NameConversion::PascalCase => name.to_upper_camel_case(),
            NameConversion::SnakeCase => name.to_snake_case(),
            NameConversion::DashCase => name.to_kebab_case(),
            NameConversion::ConstCase => name.to_shouty_snake_case(),
            NameConversion::DotCase => name.to_snake_case().replace('_', "."),
            NameConversion::SeparateWords => name.to_snake_case().replace('_', " "),
            NameConversion::SlashCase => name.to_snake_case().replace('_', "/"),
            NameConversion::BackslashCase => name.to_snake_case().replace('_', "\\"),
            NameConversion::Custom(f) => f(name),
        }
    }
}

impl fmt::Debug for NameConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameConversion::CamelCase => f.write_str("CamelCase"),
            NameConversion::PascalCase => f.write_str("PascalCase"),
            NameConversion::SnakeCase => f.write_str("SnakeCase"),
            NameConversion::DashCase => f.write_str("DashCase"),
            NameConversion::ConstCase => f.write_str("ConstCase"),
            NameConversion::DotCase => f.write_str("DotCase"),
            NameConversion::SeparateWords => f.write_str("SeparateWords"),
            NameConversion::SlashCase => f.write_str("SlashCase"),
            NameConversion::BackslashCase => f.write_str("BackslashCase"),
            NameConversion::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Bidirectional, injective `variant name <-> wire name` map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMap {
    to_wire: HashMap<String, String>,
    from_wire: HashMap<String, String>,
}

impl NameMap {
    /// Build the map from `(variant, explicit rename)` pairs in declaration order.
    ///
    /// Each variant's wire name is its explicit rename if present, else the
    /// conversion applied to its name, else the name itself. Two variants
    /// landing on the same wire name is an error.
    pub fn build<'a>(
        enum_name: &str,
        variants: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
        conversion: Option<&NameConversion>,
    ) -> Result<Self, DefinitionError> {
        let mut map = NameMap::default();
        for (name, rename) in variants {
            let wire = match (rename, conversion) {
                (Some(rename), _) => rename.to_string(),
                (None, Some(conversion)) => conversion.apply(name),
                (None, None) => name.to_string(),
            };
            if let Some(existing) = map.from_wire.get(&wire) {
                if existing != name {
                    return Err(DefinitionError::AmbiguousRename {
                        enum_name: enum_name.to_string(),
                        wire_name: wire,
                        first: existing.clone(),
                        second: name.to_string(),
                    });
                }
            }
            tracing::trace!(enum_name, variant = name, wire = %wire, "resolved wire name");
            map.from_wire.insert(wire.clone(), name.to_string());
            map.to_wire.insert(name.to_string(), wire);
        }
        Ok(map)
    }

    /// Wire name of a variant, falling back to the name itself.
    pub fn serialize_name<'a>(&'a self, variant: &'a str) -> &'a str {
        self.to_wire.get(variant).map(String::as_str).unwrap_or(variant)
    }

    /// Variant name for a wire name, if any variant uses it.
    pub fn deserialize_name(&self, wire: &str) -> Option<&str> {
        self.from_wire.get(wire).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.to_wire.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_wire.is_empty()
    }
}
