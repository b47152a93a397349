//! Payload type descriptions and their JSON Schema rendering.
//!
//! A [`PayloadType`] describes the shape of the value a variant carries.
//! It is what the registry hands to the validator: every payload type
//! renders to a self-contained JSON Schema fragment.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Shape of a primitive or structured payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadType {
    /// Any JSON value.
    Any,
    Null,
    Bool,
    Integer,
    Number,
    String,
    /// A homogeneous array.
    List(Box<PayloadType>),
    /// An object with arbitrary string keys and values of one type.
    Map(Box<PayloadType>),
    /// An object with named fields.
    Record(RecordType),
    /// The inner type or `null`.
    Optional(Box<PayloadType>),
}

/// A record: an object with a fixed list of named fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordType {
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Accept fields that are not listed in `fields`.
    #[serde(default)]
    pub additional_fields: bool,
}

/// One field of a [`RecordType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: PayloadType,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// Field layout of an object-shaped payload, ready to be merged next to a tag field.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FlatFields {
    pub properties: Map<String, Value>,
    pub required: Vec<String>,
    /// Value for `additionalProperties`: a boolean or a schema.
    pub additional: Value,
}

impl PayloadType {
    pub fn list(item: PayloadType) -> Self {
        PayloadType::List(Box::new(item))
    }

    pub fn map(value: PayloadType) -> Self {
        PayloadType::Map(Box::new(value))
    }

    pub fn optional(inner: PayloadType) -> Self {
        PayloadType::Optional(Box::new(inner))
    }

    /// Short name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PayloadType::Any => "any",
            PayloadType::Null => "null",
            PayloadType::Bool => "bool",
            PayloadType::Integer => "integer",
            PayloadType::Number => "number",
            PayloadType::String => "string",
            PayloadType::List(_) => "list",
            PayloadType::Map(_) => "map",
            PayloadType::Record(_) => "record",
            PayloadType::Optional(_) => "optional",
        }
    }

    /// Render as a JSON Schema fragment.
    pub fn json_schema(&self) -> Value {
        match self {
            PayloadType::Any => json!({}),
            PayloadType::Null => json!({"type": "null"}),
            PayloadType::Bool => json!({"type": "boolean"}),
            PayloadType::Integer => json!({"type": "integer"}),
            PayloadType::Number => json!({"type": "number"}),
            PayloadType::String => json!({"type": "string"}),
            PayloadType::List(item) => json!({"type": "array", "items": item.json_schema()}),
            PayloadType::Map(value) => {
                json!({"type": "object", "additionalProperties": value.json_schema()})
            }
            PayloadType::Record(record) => record.json_schema(),
            PayloadType::Optional(inner) => {
                json!({"anyOf": [inner.json_schema(), {"type": "null"}]})
            }
        }
    }

    /// Fields to flatten into a surrounding object, or `None` if this
    /// payload is not object-shaped.
    pub(crate) fn flat_fields(&self) -> Option<FlatFields> {
        match self {
            PayloadType::Record(record) => Some(FlatFields {
                properties: record.properties(),
                required: record.required(),
                additional: Value::Bool(record.additional_fields),
            }),
            PayloadType::Map(value) => Some(FlatFields {
                properties: Map::new(),
                required: Vec::new(),
                additional: value.json_schema(),
            }),
            _ => None,
        }
    }
}

impl From<RecordType> for PayloadType {
    fn from(record: RecordType) -> Self {
        PayloadType::Record(record)
    }
}

impl RecordType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field.
    pub fn field(mut self, name: impl Into<String>, ty: PayloadType) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            ty,
            required: true,
        });
        self
    }

    /// Add a field that may be absent.
    pub fn optional_field(mut self, name: impl Into<String>, ty: PayloadType) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            ty,
            required: false,
        });
        self
    }

    pub fn allow_additional_fields(mut self) -> Self {
        self.additional_fields = true;
        self
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    fn properties(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.ty.json_schema()))
            .collect()
    }

    fn required(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn json_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(self.properties()));
        let required = self.required();
        if !required.is_empty() {
            schema.insert("required".to_string(), json!(required));
        }
        schema.insert(
            "additionalProperties".to_string(),
            Value::Bool(self.additional_fields),
        );
        Value::Object(schema)
    }
}
