use std::collections::HashSet;

use serde_json::{json, Map, Value};

use super::{Context, TaggingStrategy};
use crate::error::ParseError;
use crate::value::EnumValue;

/// `{"Variant": payload}` for variants with a payload, `"Variant"` otherwise.
///
/// Backs both the nested and the externally-tagged configurations.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ExternallyTagged;

impl TaggingStrategy for ExternallyTagged {
    fn schema(&self, cx: &Context<'_>) -> Value {
        let mut properties = Map::new();
        let mut bare = Vec::new();
        for variant in cx.variants() {
            let wire = variant.wire_name().to_string();
            match cx.payload_schema(variant) {
                Some(schema) => {
                    properties.insert(wire, schema);
                }
                None => {
                    properties.insert(wire.clone(), json!({"type": "null"}));
                    bare.push(Value::String(wire));
                }
            }
        }

        let mut choices = vec![json!({
            "type": "object",
            "properties": properties,
            "minProperties": 1,
            "maxProperties": 1,
            "additionalProperties": false
        })];
        if !bare.is_empty() {
            choices.push(json!({"type": "string", "enum": bare}));
        }
        json!({ "anyOf": choices })
    }

    fn parse(&self, cx: &Context<'_>, input: &Value) -> Result<EnumValue, ParseError> {
        let (tag, content) = match input {
            Value::String(tag) => (tag.as_str(), None),
            // Only the first key counts; well-formed input has exactly one.
            Value::Object(map) => match map.iter().next() {
                Some((tag, content)) => (tag.as_str(), Some(content)),
                None => return Err(cx.unexpected("an object with one variant key", input)),
            },
            other => return Err(cx.unexpected("a string or an object", other)),
        };
        let variant = cx.variant_for_tag(tag)?;
        cx.construct(variant, content)
    }

    fn serialize(&self, value: &EnumValue) -> Value {
        let wire = value.wire_name().to_string();
        match value.payload() {
            None => Value::String(wire),
            Some(payload) => {
                let mut map = Map::new();
                map.insert(wire, payload.to_wire());
                Value::Object(map)
            }
        }
    }

    fn always_object(&self, cx: &Context<'_>) -> bool {
        cx.variants().iter().all(|v| !v.is_unit())
    }

    fn flattened_schema(&self, cx: &Context<'_>) -> Value {
        let mut properties = Map::new();
        let mut choices = Vec::new();
        for variant in cx.variants() {
            let wire = variant.wire_name().to_string();
            let schema = cx
                .payload_schema(variant)
                .unwrap_or_else(|| json!({"type": "null"}));
            properties.insert(wire.clone(), schema);
            choices.push(json!({ "required": [wire] }));
        }
        json!({
            "type": "object",
            "properties": properties,
            "oneOf": choices
        })
    }

    // Payloads live under the variant key, so only wire names reach the top level.
    fn claims_field(&self, cx: &Context<'_>, field: &str, _seen: &mut HashSet<String>) -> bool {
        cx.variants().iter().any(|v| v.wire_name() == field)
    }
}
