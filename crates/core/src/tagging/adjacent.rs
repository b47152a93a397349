use std::collections::HashSet;

use serde_json::{json, Map, Value};

use super::{Context, TaggingStrategy};
use crate::error::ParseError;
use crate::value::EnumValue;

/// `{"<variant>": "Variant", "<content>": payload}`; the content field is
/// left out for variants without a payload.
///
/// Backs both adjacent tagging and the `(key, value)` separated form. The
/// only difference is whether the schema requires the content field.
#[derive(Debug, Clone)]
pub(crate) struct AdjacentlyTagged {
    variant: String,
    content: String,
    content_required: bool,
}

impl AdjacentlyTagged {
    pub(crate) fn new(
        variant: impl Into<String>,
        content: impl Into<String>,
        content_required: bool,
    ) -> Self {
        AdjacentlyTagged {
            variant: variant.into(),
            content: content.into(),
            content_required,
        }
    }
}

impl TaggingStrategy for AdjacentlyTagged {
    fn schema(&self, cx: &Context<'_>) -> Value {
        let choices: Vec<Value> = cx
            .variants()
            .iter()
            .map(|variant| {
                let mut properties = Map::new();
                properties.insert(
                    self.variant.clone(),
                    json!({ "const": variant.wire_name() }),
                );
                let mut required = vec![self.variant.clone()];
                match cx.payload_schema(variant) {
                    Some(schema) => {
                        properties.insert(self.content.clone(), schema);
                        if self.content_required {
                            required.push(self.content.clone());
                        }
                    }
                    None => {
                        properties.insert(self.content.clone(), json!({"type": "null"}));
                    }
                }
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required
                })
            })
            .collect();
        json!({ "oneOf": choices })
    }

    fn parse(&self, cx: &Context<'_>, input: &Value) -> Result<EnumValue, ParseError> {
        let Value::Object(map) = input else {
            return Err(cx.unexpected("an object", input));
        };
        let tag = map
            .get(&self.variant)
            .ok_or_else(|| ParseError::MissingDiscriminator {
                enum_name: cx.enum_name().to_string(),
                field: self.variant.clone(),
            })?;
        let Value::String(tag) = tag else {
            return Err(cx.unexpected("a string variant field", tag));
        };
        let variant = cx.variant_for_tag(tag)?;
        cx.construct(variant, map.get(&self.content))
    }

    fn serialize(&self, value: &EnumValue) -> Value {
        let mut map = Map::new();
        map.insert(
            self.variant.clone(),
            Value::String(value.wire_name().to_string()),
        );
        if let Some(payload) = value.payload() {
            map.insert(self.content.clone(), payload.to_wire());
        }
        Value::Object(map)
    }

    fn always_object(&self, _cx: &Context<'_>) -> bool {
        true
    }

    fn claims_field(&self, _cx: &Context<'_>, field: &str, _seen: &mut HashSet<String>) -> bool {
        field == self.variant || field == self.content
    }
}
