//! Tagging strategies: how a variant's identity and payload are laid out on the wire.
//!
//! Every strategy implements the same contract: describe the wire shape as a
//! JSON Schema, parse a wire value into an [`EnumValue`], and serialize an
//! [`EnumValue`] back. Strategies hold nothing but their configured field
//! names; everything else comes from the [`Context`].

mod adjacent;
mod external;
mod internal;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{json_kind, DefinitionError, ParseError};
use crate::model::{EnumType, PayloadKind, Variant};
use crate::payload::PayloadType;
use crate::registry::Registry;
use crate::value::EnumValue;

pub(crate) use adjacent::AdjacentlyTagged;
pub(crate) use external::ExternallyTagged;
pub(crate) use internal::InternallyTagged;

/// Wire convention chosen for an enum at definition time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tagging {
    /// `{"Variant": payload}`, or `"Variant"` without a payload.
    #[default]
    Nested,
    /// Same wire shape as [`Tagging::Nested`].
    External,
    /// `{"<tag>": "Variant", ...payload fields}`.
    Internal { tag: String },
    /// Internally tagged with the discriminator defaulting to `"key"`.
    Discriminant {
        #[serde(default = "default_key")]
        tag: String,
    },
    /// `{"<variant>": "Variant", "<content>": payload}`.
    Adjacent { variant: String, content: String },
    /// Adjacently tagged with `(key, value)` field names; the value is required
    /// for variants that carry a payload.
    Separated {
        #[serde(default = "default_key")]
        key: String,
        #[serde(default = "default_value")]
        value: String,
    },
}

fn default_key() -> String {
    "key".to_string()
}

fn default_value() -> String {
    "value".to_string()
}

impl Tagging {
    pub fn internal(tag: impl Into<String>) -> Self {
        Tagging::Internal { tag: tag.into() }
    }

    pub fn discriminant(tag: impl Into<String>) -> Self {
        Tagging::Discriminant { tag: tag.into() }
    }

    pub fn adjacent(variant: impl Into<String>, content: impl Into<String>) -> Self {
        Tagging::Adjacent {
            variant: variant.into(),
            content: content.into(),
        }
    }

    pub fn separated(key: impl Into<String>, value: impl Into<String>) -> Self {
        Tagging::Separated {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Field names this tagging reserves in the wire object.
    pub fn reserved_fields(&self) -> Vec<&str> {
        match self {
            Tagging::Nested | Tagging::External => Vec::new(),
            Tagging::Internal { tag } | Tagging::Discriminant { tag } => vec![tag.as_str()],
            Tagging::Adjacent { variant, content } => vec![variant.as_str(), content.as_str()],
            Tagging::Separated { key, value } => vec![key.as_str(), value.as_str()],
        }
    }

    pub(crate) fn check(&self, enum_name: &str) -> Result<(), DefinitionError> {
        let fields = self.reserved_fields();
        let invalid = |reason: String| DefinitionError::InvalidTagging {
            enum_name: enum_name.to_string(),
            reason,
        };
        if fields.iter().any(|f| f.is_empty()) {
            return Err(invalid("field names must not be empty".to_string()));
        }
        if let [first, second] = fields.as_slice() {
            if first == second {
                return Err(invalid(format!(
                    "tag and content fields are both named '{}'",
                    first
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn strategy(&self) -> Box<dyn TaggingStrategy> {
        match self {
            Tagging::Nested | Tagging::External => Box::new(ExternallyTagged),
            Tagging::Internal { tag } | Tagging::Discriminant { tag } => {
                Box::new(InternallyTagged::new(tag))
            }
            Tagging::Adjacent { variant, content } => {
                Box::new(AdjacentlyTagged::new(variant, content, false))
            }
            Tagging::Separated { key, value } => Box::new(AdjacentlyTagged::new(key, value, true)),
        }
    }
}

/// The schema / parse / serialize contract shared by all strategies.
pub(crate) trait TaggingStrategy: fmt::Debug + Send + Sync {
    /// Reject payloads this wire shape cannot carry. Runs once, at registry build.
    fn check_payloads(&self, _cx: &Context<'_>) -> Result<(), DefinitionError> {
        Ok(())
    }

    /// JSON Schema of the wire form. Nested enums are referenced through `$defs`.
    fn schema(&self, cx: &Context<'_>) -> Value;

    /// Schema of the wire form when its fields share an object with an outer
    /// tag. Leaves the object open; the outer schema closes it with
    /// `unevaluatedProperties`. Only asked of enums that passed the outer
    /// strategy's `check_payloads`.
    fn flattened_schema(&self, cx: &Context<'_>) -> Value {
        self.schema(cx)
    }

    /// Schema a primitive payload is validated against when a value is built.
    fn payload_validator_schema(&self, ty: &PayloadType) -> Value {
        ty.json_schema()
    }

    fn parse(&self, cx: &Context<'_>, input: &Value) -> Result<EnumValue, ParseError>;

    fn serialize(&self, value: &EnumValue) -> Value;

    /// Whether every wire value of this enum is a JSON object.
    fn always_object(&self, cx: &Context<'_>) -> bool;

    /// Whether this enum may write `field` as a top-level key of its wire object.
    ///
    /// `seen` holds the nested enums already visited on this walk.
    fn claims_field(&self, cx: &Context<'_>, field: &str, seen: &mut HashSet<String>) -> bool;
}

/// Everything a strategy needs to know about the enum it is working on.
pub(crate) struct Context<'a> {
    pub(crate) registry: &'a Registry,
    pub(crate) enum_type: &'a Arc<EnumType>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(registry: &'a Registry, enum_type: &'a Arc<EnumType>) -> Self {
        Context {
            registry,
            enum_type,
        }
    }

    pub(crate) fn enum_name(&self) -> &'a str {
        self.enum_type.name()
    }

    pub(crate) fn variants(&self) -> &'a [Arc<Variant>] {
        self.enum_type.variants()
    }

    /// Resolve a wire tag to its variant.
    pub(crate) fn variant_for_tag(&self, tag: &str) -> Result<&'a Arc<Variant>, ParseError> {
        self.enum_type
            .resolve_wire(tag)
            .ok_or_else(|| ParseError::UnknownVariantTag {
                enum_name: self.enum_name().to_string(),
                tag: tag.to_string(),
            })
    }

    /// Build a value of `variant` from its raw wire payload.
    pub(crate) fn construct(
        &self,
        variant: &Arc<Variant>,
        raw: Option<&Value>,
    ) -> Result<EnumValue, ParseError> {
        self.registry.construct_variant(self.enum_type, variant, raw)
    }

    /// Schema fragment for a variant's payload, or `None` for a bare tag.
    pub(crate) fn payload_schema(&self, variant: &Variant) -> Option<Value> {
        match variant.payload() {
            PayloadKind::None => None,
            PayloadKind::Primitive(ty) => Some(ty.json_schema()),
            PayloadKind::NestedEnum(target) => Some(json!({ "$ref": definition_ref(target) })),
        }
    }

    /// Context for another registered enum.
    pub(crate) fn enum_context(&self, name: &str) -> Option<Context<'a>> {
        self.registry
            .enum_arc(name)
            .map(|enum_type| Context::new(self.registry, enum_type))
    }

    /// Whether the nested enum `target` may write `field` at the top level.
    /// An enum already on the walk contributes nothing new.
    pub(crate) fn nested_claims(
        &self,
        target: &str,
        field: &str,
        seen: &mut HashSet<String>,
    ) -> bool {
        if !seen.insert(target.to_string()) {
            return false;
        }
        match self.enum_context(target) {
            Some(inner) => inner.enum_type.strategy().claims_field(&inner, field, seen),
            None => false,
        }
    }

    /// Open schema of the nested enum `target`, for merging next to a tag.
    pub(crate) fn flattened_schema(&self, target: &str) -> Value {
        match self.enum_context(target) {
            Some(inner) => inner.enum_type.strategy().flattened_schema(&inner),
            None => json!({ "$ref": definition_ref(target) }),
        }
    }

    pub(crate) fn unexpected(&self, expected: &'static str, found: &Value) -> ParseError {
        ParseError::UnexpectedShape {
            enum_name: self.enum_name().to_string(),
            expected,
            found: json_kind(found),
        }
    }
}

/// `$ref` pointer to an enum's entry in a schema document's `$defs`.
pub(crate) fn definition_ref(enum_name: &str) -> String {
    format!("#/$defs/{}", enum_name.replace('~', "~0").replace('/', "~1"))
}
