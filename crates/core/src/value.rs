//! Enum values: one variant plus its payload.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::model::{EnumType, Variant};

/// What an [`EnumValue`] carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A validated primitive or structured value.
    Value(Value),
    /// A value of a nested enum.
    Enum(Box<EnumValue>),
}

impl Payload {
    /// Wire form of the payload alone.
    pub fn to_wire(&self) -> Value {
        match self {
            Payload::Value(value) => value.clone(),
            Payload::Enum(inner) => inner.to_wire(),
        }
    }
}

/// A value of a defined enum.
///
/// Values are built by a [`Registry`](crate::Registry), which validates the
/// payload against the variant's declared type. They are immutable and carry
/// their enum type, so they serialize without a registry at hand.
#[derive(Clone)]
pub struct EnumValue {
    enum_type: Arc<EnumType>,
    variant: Arc<Variant>,
    payload: Option<Payload>,
}

impl EnumValue {
    pub(crate) fn new(enum_type: Arc<EnumType>, variant: Arc<Variant>, payload: Option<Payload>) -> Self {
        EnumValue {
            enum_type,
            variant,
            payload,
        }
    }

    pub fn enum_type(&self) -> &Arc<EnumType> {
        &self.enum_type
    }

    pub fn enum_name(&self) -> &str {
        self.enum_type.name()
    }

    pub fn variant(&self) -> &Arc<Variant> {
        &self.variant
    }

    pub fn variant_name(&self) -> &str {
        self.variant.name()
    }

    pub fn wire_name(&self) -> &str {
        self.variant.wire_name()
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// The primitive payload, if this variant carries one.
    pub fn value(&self) -> Option<&Value> {
        match &self.payload {
            Some(Payload::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// The nested enum value, if this variant carries one.
    pub fn nested(&self) -> Option<&EnumValue> {
        match &self.payload {
            Some(Payload::Enum(inner)) => Some(inner),
            _ => None,
        }
    }

    /// Whether this value is of the variant named `variant`.
    pub fn is(&self, variant: &str) -> bool {
        self.variant.name() == variant
    }

    /// Serialize through the enum's tagging strategy.
    pub fn to_wire(&self) -> Value {
        self.enum_type.strategy().serialize(self)
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.enum_type.name() == other.enum_type.name()
            && self.variant.index() == other.variant.index()
            && self.payload == other.payload
    }
}

impl fmt::Debug for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.enum_name(), self.variant_name())?;
        match &self.payload {
            None => {}
            Some(Payload::Value(value)) => write!(f, "{}", value)?,
            Some(Payload::Enum(inner)) => write!(f, "{:?}", inner)?,
        }
        f.write_str(")")
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Serialize for EnumValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}
