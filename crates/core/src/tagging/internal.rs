use std::collections::HashSet;

use serde_json::{json, Map, Value};

use super::{Context, TaggingStrategy};
use crate::error::{DefinitionError, ParseError};
use crate::model::{PayloadKind, Variant};
use crate::payload::PayloadType;
use crate::value::{EnumValue, Payload};

/// `{"<tag>": "Variant", ...payload fields}`.
///
/// The payload's fields share one object with the tag, so only object-shaped
/// payloads are allowed: records, maps, and nested enums that always
/// serialize to an object and never write the tag field themselves. Record
/// and map payloads are refused at construction if they carry the tag key.
#[derive(Debug, Clone)]
pub(crate) struct InternallyTagged {
    tag: String,
}

impl InternallyTagged {
    pub(crate) fn new(tag: impl Into<String>) -> Self {
        InternallyTagged { tag: tag.into() }
    }

    fn unsupported(&self, cx: &Context<'_>, variant: &Variant, reason: String) -> DefinitionError {
        DefinitionError::UnsupportedPayloadShape {
            enum_name: cx.enum_name().to_string(),
            variant: variant.name().to_string(),
            reason,
        }
    }

    /// Schema of one variant. A closed schema rejects fields outside the
    /// variant; an open one leaves that to an enclosing schema.
    fn variant_schema(&self, cx: &Context<'_>, variant: &Variant, closed: bool) -> Value {
        let mut properties = Map::new();
        properties.insert(self.tag.clone(), json!({ "const": variant.wire_name() }));
        let mut required = vec![self.tag.clone()];
        let mut rest = Map::new();

        match variant.payload() {
            PayloadKind::None => {
                if closed {
                    rest.insert("additionalProperties".to_string(), json!(false));
                }
            }
            PayloadKind::Primitive(ty) => match ty.flat_fields() {
                Some(flat) => {
                    properties.extend(flat.properties);
                    required.extend(flat.required);
                    if closed {
                        rest.insert("additionalProperties".to_string(), flat.additional);
                    }
                }
                None => return json!(false),
            },
            PayloadKind::NestedEnum(target) => {
                rest.insert("allOf".to_string(), json!([cx.flattened_schema(target)]));
                if closed {
                    rest.insert("unevaluatedProperties".to_string(), json!(false));
                }
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), json!(required));
        schema.extend(rest);
        Value::Object(schema)
    }

    fn variants_schema(&self, cx: &Context<'_>, closed: bool) -> Value {
        let choices: Vec<Value> = cx
            .variants()
            .iter()
            .map(|variant| self.variant_schema(cx, variant, closed))
            .collect();
        json!({
            "type": "object",
            "required": [self.tag],
            "oneOf": choices
        })
    }
}

impl TaggingStrategy for InternallyTagged {
    fn check_payloads(&self, cx: &Context<'_>) -> Result<(), DefinitionError> {
        for variant in cx.variants() {
            match variant.payload() {
                PayloadKind::None => {}
                PayloadKind::Primitive(ty) => match ty.flat_fields() {
                    Some(flat) if flat.properties.contains_key(&self.tag) => {
                        return Err(self.unsupported(
                            cx,
                            variant,
                            format!("record field '{}' collides with the tag field", self.tag),
                        ));
                    }
                    Some(_) => {}
                    None => {
                        return Err(self.unsupported(
                            cx,
                            variant,
                            format!(
                                "{} payload cannot be flattened next to tag '{}'; use a record or a map",
                                ty.kind_name(),
                                self.tag
                            ),
                        ));
                    }
                },
                PayloadKind::NestedEnum(target) => {
                    let Some(inner) = cx.enum_context(target) else {
                        // Unknown references are reported by the registry before this runs.
                        continue;
                    };
                    if !inner.enum_type.strategy().always_object(&inner) {
                        return Err(self.unsupported(
                            cx,
                            variant,
                            format!("enum '{}' does not always serialize to an object", target),
                        ));
                    }
                    if cx.nested_claims(target, &self.tag, &mut HashSet::new()) {
                        return Err(self.unsupported(
                            cx,
                            variant,
                            format!(
                                "enum '{}' may write the field '{}' at the top level",
                                target, self.tag
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn schema(&self, cx: &Context<'_>) -> Value {
        self.variants_schema(cx, true)
    }

    fn flattened_schema(&self, cx: &Context<'_>) -> Value {
        self.variants_schema(cx, false)
    }

    fn payload_validator_schema(&self, ty: &PayloadType) -> Value {
        if ty.flat_fields().is_none() {
            return ty.json_schema();
        }
        json!({
            "allOf": [
                ty.json_schema(),
                { "propertyNames": { "not": { "const": self.tag } } }
            ]
        })
    }

    fn parse(&self, cx: &Context<'_>, input: &Value) -> Result<EnumValue, ParseError> {
        let Value::Object(map) = input else {
            return Err(cx.unexpected("an object", input));
        };
        let tag = map
            .get(&self.tag)
            .ok_or_else(|| ParseError::MissingDiscriminator {
                enum_name: cx.enum_name().to_string(),
                field: self.tag.clone(),
            })?;
        let Value::String(tag) = tag else {
            return Err(cx.unexpected("a string discriminator", tag));
        };
        let variant = cx.variant_for_tag(tag)?;

        let rest: Map<String, Value> = map
            .iter()
            .filter(|(key, _)| **key != self.tag)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if rest.is_empty() && variant.is_unit() {
            cx.construct(variant, None)
        } else {
            cx.construct(variant, Some(&Value::Object(rest)))
        }
    }

    fn serialize(&self, value: &EnumValue) -> Value {
        let mut map = Map::new();
        map.insert(self.tag.clone(), Value::String(value.wire_name().to_string()));
        let fields = match value.payload() {
            None => return Value::Object(map),
            Some(Payload::Value(fields)) => fields.clone(),
            Some(Payload::Enum(inner)) => inner.to_wire(),
        };
        // Construction and registry build keep the tag out of every payload.
        match fields {
            Value::Object(fields) => {
                for (key, field) in fields {
                    if key == self.tag {
                        tracing::error!(
                            enum_name = value.enum_name(),
                            variant = value.variant_name(),
                            field = %key,
                            "payload carries the tag field"
                        );
                        continue;
                    }
                    map.insert(key, field);
                }
            }
            other => {
                tracing::error!(
                    enum_name = value.enum_name(),
                    variant = value.variant_name(),
                    found = %other,
                    "non-object payload under internal tagging"
                );
            }
        }
        Value::Object(map)
    }

    fn always_object(&self, _cx: &Context<'_>) -> bool {
        true
    }

    fn claims_field(&self, cx: &Context<'_>, field: &str, seen: &mut HashSet<String>) -> bool {
        if field == self.tag {
            return true;
        }
        cx.variants().iter().any(|v| match v.payload() {
            PayloadKind::None => false,
            // Maps and records with additional fields may carry any key.
            PayloadKind::Primitive(ty) => ty.flat_fields().is_some_and(|flat| {
                flat.properties.contains_key(field) || flat.additional != Value::Bool(false)
            }),
            PayloadKind::NestedEnum(target) => cx.nested_claims(target, field, seen),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::error::{DefinitionError, ParseError};
    use crate::model::EnumDef;
    use crate::payload::{PayloadType, RecordType};
    use crate::registry::Registry;
    use crate::tagging::Tagging;

    fn event() -> EnumDef {
        EnumDef::new("Event")
            .with(
                "Foo",
                RecordType::new()
                    .field("a", PayloadType::Integer)
                    .field("b", PayloadType::String),
            )
            .with("Labels", PayloadType::map(PayloadType::String))
            .with(
                "Settings",
                RecordType::new().optional_field("verbose", PayloadType::Bool),
            )
            .unit("Stop")
            .tagging(Tagging::internal("type"))
    }

    fn build(defs: Vec<EnumDef>) -> Result<Registry, DefinitionError> {
        let mut builder = Registry::builder();
        for def in defs {
            builder.define(def)?;
        }
        builder.build()
    }

    #[test]
    fn test_flattens_record_fields_next_to_tag() {
        let registry = build(vec![event()]).unwrap();
        let value = registry
            .construct("Event", "Foo", json!({"a": 1, "b": "x"}))
            .unwrap();
        let wire = value.to_wire();
        assert_eq!(wire, json!({"type": "Foo", "a": 1, "b": "x"}));
        assert_eq!(
            wire.as_object().unwrap().keys().next().map(String::as_str),
            Some("type")
        );
        assert_eq!(registry.parse("Event", &wire).unwrap(), value);
    }

    #[test]
    fn test_missing_discriminator() {
        let registry = build(vec![event()]).unwrap();
        let err = registry
            .parse("Event", &json!({"a": 1, "b": "x"}))
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingDiscriminator {
                enum_name: "Event".to_string(),
                field: "type".to_string(),
            }
        );
    }

    #[test]
    fn test_unit_variant_is_tag_only() {
        let registry = build(vec![event()]).unwrap();
        let stop = registry.handle("Event").unwrap().unit("Stop").unwrap();
        assert_eq!(stop.to_wire(), json!({"type": "Stop"}));
        assert_eq!(registry.parse("Event", &json!({"type": "Stop"})).unwrap(), stop);

        let err = registry
            .parse("Event", &json!({"type": "Stop", "extra": 1}))
            .unwrap_err();
        assert!(matches!(err, ParseError::PayloadValidationFailed { .. }));
    }

    #[test]
    fn test_remainder_is_validated_against_variant() {
        let registry = build(vec![event()]).unwrap();
        let err = registry
            .parse("Event", &json!({"type": "Foo", "a": "not a number", "b": "x"}))
            .unwrap_err();
        match err {
            ParseError::PayloadValidationFailed { variant, .. } => assert_eq!(variant, "Foo"),
            other => panic!("expected PayloadValidationFailed, got {:?}", other),
        }

        let err = registry
            .parse("Event", &json!({"type": "Foo", "a": 1}))
            .unwrap_err();
        assert!(matches!(err, ParseError::PayloadValidationFailed { .. }));
    }

    #[test]
    fn test_empty_remainder_for_all_optional_record() {
        let registry = build(vec![event()]).unwrap();
        let value = registry.parse("Event", &json!({"type": "Settings"})).unwrap();
        assert_eq!(value.value(), Some(&json!({})));
        assert_eq!(value.to_wire(), json!({"type": "Settings"}));
    }

    #[test]
    fn test_map_payload() {
        let registry = build(vec![event()]).unwrap();
        let wire = json!({"type": "Labels", "env": "prod", "team": "core"});
        let value = registry.parse("Event", &wire).unwrap();
        assert_eq!(value.value(), Some(&json!({"env": "prod", "team": "core"})));
        assert_eq!(value.to_wire(), wire);
    }

    #[test]
    fn test_non_string_tag() {
        let registry = build(vec![event()]).unwrap();
        let err = registry.parse("Event", &json!({"type": 3})).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedShape { .. }));
        let err = registry.parse("Event", &json!("Stop")).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedShape { .. }));
    }

    #[test]
    fn test_primitive_payload_is_rejected() {
        let def = EnumDef::new("Bad")
            .with("Count", PayloadType::Integer)
            .tagging(Tagging::internal("type"));
        match build(vec![def]).unwrap_err() {
            DefinitionError::UnsupportedPayloadShape { variant, .. } => {
                assert_eq!(variant, "Count")
            }
            other => panic!("expected UnsupportedPayloadShape, got {:?}", other),
        }
    }

    #[test]
    fn test_field_named_like_tag_is_rejected() {
        let def = EnumDef::new("Bad")
            .with("Item", RecordType::new().field("kind", PayloadType::String))
            .tagging(Tagging::discriminant("kind"));
        let err = build(vec![def]).unwrap_err();
        assert!(matches!(err, DefinitionError::UnsupportedPayloadShape { .. }));
    }

    #[test]
    fn test_nested_object_enum_is_flattened() {
        let inner = EnumDef::new("Action")
            .with("Push", RecordType::new().field("n", PayloadType::Integer))
            .unit("Pop")
            .tagging(Tagging::internal("op"));
        let outer = EnumDef::new("Command")
            .nested("Run", "Action")
            .unit("Halt")
            .tagging(Tagging::internal("type"));
        let registry = build(vec![outer, inner]).unwrap();

        let wire = json!({"type": "Run", "op": "Push", "n": 2});
        let value = registry.parse("Command", &wire).unwrap();
        let inner = value.nested().unwrap();
        assert!(inner.is("Push"));
        assert_eq!(inner.value(), Some(&json!({"n": 2})));
        assert_eq!(value.to_wire(), wire);

        let err = registry.parse("Command", &json!({"type": "Run"})).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingDiscriminator {
                enum_name: "Action".to_string(),
                field: "op".to_string(),
            }
        );
    }

    #[test]
    fn test_nested_enum_sharing_tag_is_rejected() {
        let def = EnumDef::new("Tree")
            .nested("Node", "Tree")
            .unit("Leaf")
            .tagging(Tagging::internal("type"));
        let err = build(vec![def]).unwrap_err();
        assert!(matches!(err, DefinitionError::UnsupportedPayloadShape { .. }));
    }

    #[test]
    fn test_nested_enum_with_bare_variants_is_rejected() {
        let inner = EnumDef::new("Color").unit("Red").unit("Blue");
        let outer = EnumDef::new("Paint")
            .nested("Solid", "Color")
            .tagging(Tagging::internal("type"));
        let err = build(vec![inner, outer]).unwrap_err();
        match err {
            DefinitionError::UnsupportedPayloadShape { enum_name, .. } => {
                assert_eq!(enum_name, "Paint")
            }
            other => panic!("expected UnsupportedPayloadShape, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_is_keyed_on_tag() {
        let registry = build(vec![event()]).unwrap();
        let schema = registry.schema("Event").unwrap();
        let body = &schema["$defs"]["Event"];
        assert_eq!(body["required"], json!(["type"]));
        let choices = body["oneOf"].as_array().unwrap();
        assert_eq!(choices.len(), 4);
        assert_eq!(choices[0]["properties"]["type"], json!({"const": "Foo"}));
        assert_eq!(choices[0]["properties"]["a"], json!({"type": "integer"}));
        assert_eq!(choices[0]["required"], json!(["type", "a", "b"]));
        assert_eq!(choices[3]["additionalProperties"], json!(false));
    }

    #[test]
    fn test_open_payload_carrying_tag_is_rejected_at_construction() {
        let open_record = EnumDef::new("Note")
            .with(
                "Body",
                RecordType::new()
                    .field("text", PayloadType::String)
                    .allow_additional_fields(),
            )
            .tagging(Tagging::internal("type"));
        let registry = build(vec![event(), open_record]).unwrap();

        let err = registry
            .construct("Event", "Labels", json!({"type": "x", "env": "prod"}))
            .unwrap_err();
        match err {
            ParseError::PayloadValidationFailed { enum_name, variant, .. } => {
                assert_eq!(enum_name, "Event");
                assert_eq!(variant, "Labels");
            }
            other => panic!("expected PayloadValidationFailed, got {:?}", other),
        }

        let err = registry
            .construct("Note", "Body", json!({"text": "hi", "type": "memo"}))
            .unwrap_err();
        assert!(matches!(err, ParseError::PayloadValidationFailed { .. }));

        let note = registry
            .construct("Note", "Body", json!({"text": "hi", "mood": "ok"}))
            .unwrap();
        assert_eq!(registry.parse("Note", &note.to_wire()).unwrap(), note);
    }

    #[test]
    fn test_tag_shared_with_deeper_nested_enum_is_rejected() {
        let outer = EnumDef::new("Outer")
            .nested("Wrap", "Middle")
            .tagging(Tagging::internal("type"));
        let middle = EnumDef::new("Middle")
            .nested("Inner", "Leaf")
            .tagging(Tagging::internal("op"));
        let leaf = EnumDef::new("Leaf")
            .with("Push", RecordType::new().field("n", PayloadType::Integer))
            .tagging(Tagging::internal("type"));
        match build(vec![outer, middle, leaf]).unwrap_err() {
            DefinitionError::UnsupportedPayloadShape { enum_name, variant, .. } => {
                assert_eq!(enum_name, "Outer");
                assert_eq!(variant, "Wrap");
            }
            other => panic!("expected UnsupportedPayloadShape, got {:?}", other),
        }
    }

    #[test]
    fn test_mutually_nested_enums_sharing_a_path_are_rejected() {
        let a = EnumDef::new("A")
            .nested("ToB", "B")
            .with("Stop", RecordType::new())
            .tagging(Tagging::internal("type"));
        let b = EnumDef::new("B")
            .nested("ToA", "A")
            .tagging(Tagging::internal("op"));
        let err = build(vec![a, b]).unwrap_err();
        assert!(matches!(err, DefinitionError::UnsupportedPayloadShape { .. }));
    }

    #[test]
    fn test_nested_enum_with_open_payload_is_rejected() {
        let inner = EnumDef::new("Meta")
            .with("Tags", PayloadType::map(PayloadType::String))
            .tagging(Tagging::internal("op"));
        let outer = EnumDef::new("Doc")
            .nested("Annotated", "Meta")
            .tagging(Tagging::internal("type"));
        let err = build(vec![inner, outer]).unwrap_err();
        assert!(matches!(err, DefinitionError::UnsupportedPayloadShape { .. }));
    }

    #[test]
    fn test_nested_variant_schema_checks_flattened_fields() {
        let inner = EnumDef::new("Action")
            .with("Push", RecordType::new().field("n", PayloadType::Integer))
            .unit("Pop")
            .tagging(Tagging::internal("op"));
        let outer = EnumDef::new("Command")
            .nested("Run", "Action")
            .unit("Halt")
            .tagging(Tagging::internal("type"));
        let registry = build(vec![outer, inner]).unwrap();
        let handle = registry.handle("Command").unwrap();

        handle
            .validate(&json!({"type": "Run", "op": "Push", "n": 2}))
            .unwrap();
        handle.validate(&json!({"type": "Run", "op": "Pop"})).unwrap();
        handle.validate(&json!({"type": "Halt"})).unwrap();
        for wire in [
            json!({"type": "Run", "op": "Push", "n": 2, "extra": true}),
            json!({"type": "Run", "op": "Push"}),
            json!({"type": "Run", "op": "Push", "n": "two"}),
            json!({"type": "Run", "op": "Jump"}),
            json!({"type": "Run"}),
        ] {
            match handle.validate(&wire) {
                Err(ParseError::SchemaViolation { .. }) => {}
                other => panic!("expected SchemaViolation for {}, got {:?}", wire, other),
            }
        }
    }
}
