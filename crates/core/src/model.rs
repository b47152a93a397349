//! Enum definitions and their immutable, defined form.
//!
//! An [`EnumDef`] is the declaration: a name, an ordered list of variants,
//! a tagging strategy and naming options. [`EnumType::define`] checks it and
//! produces the immutable [`EnumType`] every value of that enum shares.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;
use crate::names::{NameConversion, NameMap};
use crate::payload::PayloadType;
use crate::tagging::{Tagging, TaggingStrategy};

/// What a variant carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// Nothing; the variant is a bare tag.
    #[default]
    None,
    /// A primitive or structured value.
    Primitive(PayloadType),
    /// A value of another enum, referenced by name. May name the enclosing enum.
    NestedEnum(String),
}

impl PayloadKind {
    pub fn is_none(&self) -> bool {
        matches!(self, PayloadKind::None)
    }
}

/// Declaration of one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "PayloadKind::is_none")]
    pub payload: PayloadKind,
    /// Explicit wire name; takes priority over the enum's name conversion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
}

impl VariantDef {
    pub fn unit(name: impl Into<String>) -> Self {
        VariantDef {
            name: name.into(),
            payload: PayloadKind::None,
            rename: None,
        }
    }

    pub fn with(name: impl Into<String>, payload: impl Into<PayloadType>) -> Self {
        VariantDef {
            name: name.into(),
            payload: PayloadKind::Primitive(payload.into()),
            rename: None,
        }
    }

    pub fn nested(name: impl Into<String>, target: impl Into<String>) -> Self {
        VariantDef {
            name: name.into(),
            payload: PayloadKind::NestedEnum(target.into()),
            rename: None,
        }
    }

    pub fn renamed(mut self, wire_name: impl Into<String>) -> Self {
        self.rename = Some(wire_name.into());
        self
    }
}

/// Declaration of an enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    #[serde(default)]
    pub variants: Vec<VariantDef>,
    #[serde(default)]
    pub tagging: Tagging,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_conversion: Option<NameConversion>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>) -> Self {
        EnumDef {
            name: name.into(),
            variants: Vec::new(),
            tagging: Tagging::default(),
            name_conversion: None,
        }
    }

    pub fn variant(mut self, variant: VariantDef) -> Self {
        self.variants.push(variant);
        self
    }

    /// Shorthand for a payload-less variant.
    pub fn unit(self, name: impl Into<String>) -> Self {
        self.variant(VariantDef::unit(name))
    }

    /// Shorthand for a variant carrying a primitive or structured payload.
    pub fn with(self, name: impl Into<String>, payload: impl Into<PayloadType>) -> Self {
        self.variant(VariantDef::with(name, payload))
    }

    /// Shorthand for a variant carrying a value of another (or this) enum.
    pub fn nested(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.variant(VariantDef::nested(name, target))
    }

    pub fn tagging(mut self, tagging: Tagging) -> Self {
        self.tagging = tagging;
        self
    }

    pub fn name_conversion(mut self, conversion: NameConversion) -> Self {
        self.name_conversion = Some(conversion);
        self
    }
}

/// One case of a defined enum. Shared by every value of that case.
#[derive(Debug, PartialEq, Eq)]
pub struct Variant {
    owner: Arc<str>,
    index: usize,
    name: String,
    wire_name: String,
    payload: PayloadKind,
}

impl Variant {
    /// Name of the enum this variant belongs to.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Position in declaration order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    pub fn payload(&self) -> &PayloadKind {
        &self.payload
    }

    pub fn is_unit(&self) -> bool {
        self.payload.is_none()
    }
}

/// A defined enum: a closed, ordered set of variants bound to one tagging strategy.
#[derive(Debug)]
pub struct EnumType {
    name: Arc<str>,
    variants: Vec<Arc<Variant>>,
    by_name: HashMap<String, usize>,
    by_wire: HashMap<String, usize>,
    names: NameMap,
    tagging: Tagging,
    strategy: Box<dyn TaggingStrategy>,
}

impl EnumType {
    /// Check a declaration and freeze it.
    ///
    /// Fails on duplicate variant names, on wire-name collisions and on an
    /// unusable tagging configuration. References to nested enums are only
    /// resolved later, by the registry.
    pub fn define(def: EnumDef) -> Result<Self, DefinitionError> {
        let EnumDef {
            name,
            variants: defs,
            tagging,
            name_conversion,
        } = def;

        let mut by_name = HashMap::with_capacity(defs.len());
        for (index, variant) in defs.iter().enumerate() {
            if by_name.insert(variant.name.clone(), index).is_some() {
                return Err(DefinitionError::DuplicateVariantName {
                    enum_name: name.clone(),
                    variant: variant.name.clone(),
                });
            }
        }

        let names = NameMap::build(
            &name,
            defs.iter()
                .map(|v| (v.name.as_str(), v.rename.as_deref())),
            name_conversion.as_ref(),
        )?;

        tagging.check(&name)?;

        let owner: Arc<str> = Arc::from(name.as_str());
        let mut by_wire = HashMap::with_capacity(defs.len());
        let variants = defs
            .into_iter()
            .enumerate()
            .map(|(index, def)| {
                let wire_name = names.serialize_name(&def.name).to_string();
                by_wire.insert(wire_name.clone(), index);
                Arc::new(Variant {
                    owner: Arc::clone(&owner),
                    index,
                    name: def.name,
                    wire_name,
                    payload: def.payload,
                })
            })
            .collect();

        tracing::debug!(enum_name = %owner, ?tagging, "defined enum");

        Ok(EnumType {
            name: owner,
            variants,
            by_name,
            by_wire,
            names,
            strategy: tagging.strategy(),
            tagging,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[Arc<Variant>] {
        &self.variants
    }

    /// Look a variant up by its in-memory name.
    pub fn resolve(&self, name: &str) -> Option<&Arc<Variant>> {
        self.by_name.get(name).map(|&i| &self.variants[i])
    }

    /// Look a variant up by its wire name.
    pub fn resolve_wire(&self, wire: &str) -> Option<&Arc<Variant>> {
        self.by_wire.get(wire).map(|&i| &self.variants[i])
    }

    pub fn names(&self) -> &NameMap {
        &self.names
    }

    pub fn tagging(&self) -> &Tagging {
        &self.tagging
    }

    pub(crate) fn strategy(&self) -> &dyn TaggingStrategy {
        self.strategy.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::RecordType;

    fn shape() -> EnumDef {
        EnumDef::new("Shape")
            .with(
                "Circle",
                RecordType::new().field("radius", PayloadType::Number),
            )
            .unit("Empty")
            .nested("Group", "Shape")
    }

    #[test]
    fn test_define_keeps_declaration_order() {
        let ty = EnumType::define(shape()).unwrap();
        let names: Vec<_> = ty.variants().iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["Circle", "Empty", "Group"]);
        for (i, v) in ty.variants().iter().enumerate() {
            assert_eq!(v.index(), i);
            assert_eq!(v.owner(), "Shape");
        }
    }

    #[test]
    fn test_resolve() {
        let ty = EnumType::define(shape().name_conversion(NameConversion::SnakeCase)).unwrap();
        assert_eq!(ty.resolve("Empty").unwrap().wire_name(), "empty");
        assert_eq!(ty.resolve_wire("circle").unwrap().name(), "Circle");
        assert!(ty.resolve("empty").is_none());
        assert!(ty.resolve_wire("Circle").is_none());
        assert!(ty.resolve("Group").unwrap().payload() == &PayloadKind::NestedEnum("Shape".into()));
    }

    #[test]
    fn test_duplicate_variant_name() {
        let err = EnumType::define(shape().unit("Empty")).unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DuplicateVariantName {
                enum_name: "Shape".to_string(),
                variant: "Empty".to_string(),
            }
        );
    }

    #[test]
    fn test_ambiguous_rename_rejected_at_definition() {
        let def = EnumDef::new("Color")
            .variant(VariantDef::unit("Red").renamed("c"))
            .variant(VariantDef::unit("Blue").renamed("c"));
        let err = EnumType::define(def).unwrap_err();
        assert!(matches!(err, DefinitionError::AmbiguousRename { .. }));
    }

    #[test]
    fn test_invalid_tagging_rejected_at_definition() {
        let def = shape().tagging(Tagging::adjacent("t", "t"));
        let err = EnumType::define(def).unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidTagging { .. }));
    }

    #[test]
    fn test_enum_def_from_json() {
        let def: EnumDef = serde_json::from_value(serde_json::json!({
            "name": "Shape",
            "tagging": {"internal": {"tag": "type"}},
            "name_conversion": "snake_case",
            "variants": [
                {"name": "Circle", "payload": {"primitive": {"record": {"fields": [
                    {"name": "radius", "type": "number"}
                ]}}}},
                {"name": "Empty", "rename": "nothing"},
                {"name": "Group", "payload": {"nested_enum": "Shape"}}
            ]
        }))
        .unwrap();
        assert_eq!(def.tagging, Tagging::internal("type"));
        assert_eq!(def.variants[1].rename.as_deref(), Some("nothing"));
        assert!(def.variants[1].payload.is_none());

        let ty = EnumType::define(def).unwrap();
        assert_eq!(ty.resolve("Empty").unwrap().wire_name(), "nothing");
        assert_eq!(ty.resolve("Group").unwrap().wire_name(), "group");
    }
}
