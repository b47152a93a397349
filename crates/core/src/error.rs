/// Errors raised once, when an enum is defined or a registry is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// Two variants of the same enum share a name.
    #[error("{enum_name}: variant '{variant}' is declared more than once")]
    DuplicateVariantName { enum_name: String, variant: String },

    /// Two variants resolve to the same wire name.
    #[error("{enum_name}: variants '{first}' and '{second}' are both renamed to '{wire_name}'")]
    AmbiguousRename {
        enum_name: String,
        wire_name: String,
        first: String,
        second: String,
    },

    /// The variant's payload cannot be carried by the enum's tagging strategy.
    #[error("{enum_name}.{variant}: unsupported payload shape: {reason}")]
    UnsupportedPayloadShape {
        enum_name: String,
        variant: String,
        reason: String,
    },

    /// The tagging configuration itself is unusable.
    #[error("{enum_name}: invalid tagging: {reason}")]
    InvalidTagging { enum_name: String, reason: String },

    /// An enum with this name is already registered.
    #[error("enum '{enum_name}' is defined more than once")]
    DuplicateEnum { enum_name: String },

    /// A nested-enum payload names an enum that was never defined.
    #[error("{enum_name}.{variant}: payload refers to unknown enum '{target}'")]
    UnknownEnumReference {
        enum_name: String,
        variant: String,
        target: String,
    },

    /// The validator refused to compile a generated schema.
    #[error("{enum_name}: schema for '{variant}' failed to compile: {message}")]
    InvalidPayloadSchema {
        enum_name: String,
        variant: String,
        message: String,
    },
}

/// Errors surfaced while turning wire values into enum values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The tag or key does not name any variant.
    #[error("{enum_name}: unknown variant tag '{tag}'")]
    UnknownVariantTag { enum_name: String, tag: String },

    /// No variant with this in-memory name.
    #[error("{enum_name}: no variant named '{variant}'")]
    UnknownVariant { enum_name: String, variant: String },

    /// The discriminator field is absent from the wire object.
    #[error("{enum_name}: missing discriminator field '{field}'")]
    MissingDiscriminator { enum_name: String, field: String },

    /// The payload was rejected by the validator. Messages are kept verbatim.
    #[error("{enum_name}.{variant}: payload validation failed: {}", .errors.join("; "))]
    PayloadValidationFailed {
        enum_name: String,
        variant: String,
        errors: Vec<String>,
    },

    /// The wire value has the wrong JSON kind for the strategy.
    #[error("{enum_name}: expected {expected}, found {found}")]
    UnexpectedShape {
        enum_name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A whole wire document does not match the enum's exported schema.
    #[error("{enum_name}: document does not match schema: {}", .errors.join("; "))]
    SchemaViolation {
        enum_name: String,
        errors: Vec<String>,
    },

    /// No enum with this name is registered.
    #[error("unknown enum '{name}'")]
    UnknownEnum { name: String },
}

/// Name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
