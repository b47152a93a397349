//! typenum-core: type-containing enumerations.
//!
//! An enum is a closed, ordered set of named variants, each optionally
//! carrying a typed payload. Every enum is bound to one tagging strategy that
//! decides its wire form:
//!
//! - nested / externally tagged: `{"Circle": {...}}` or `"Empty"`
//! - internally tagged / discriminant: `{"type": "Circle", "radius": 1.0}`
//! - adjacently tagged / separated: `{"t": "Circle", "c": {...}}`
//!
//! # Public API
//!
//! - [`EnumDef`], [`VariantDef`] -- declare an enum
//! - [`Registry`] -- define enums, then parse, construct and serialize values
//! - [`EnumHandle`] -- one registered enum
//! - [`EnumValue`] -- a value: variant plus payload
//! - [`Tagging`], [`NameConversion`] -- wire conventions
//!
//! ```
//! use serde_json::json;
//! use typenum_core::{EnumDef, PayloadType, RecordType, Registry, Tagging};
//!
//! let mut builder = Registry::builder();
//! builder
//!     .define(
//!         EnumDef::new("Shape")
//!             .with("Circle", RecordType::new().field("radius", PayloadType::Number))
//!             .unit("Empty")
//!             .tagging(Tagging::internal("type")),
//!     )
//!     .unwrap();
//! let registry = builder.build().unwrap();
//!
//! let value = registry
//!     .parse("Shape", &json!({"type": "Circle", "radius": 2.0}))
//!     .unwrap();
//! assert!(value.is("Circle"));
//! assert_eq!(value.to_wire(), json!({"type": "Circle", "radius": 2.0}));
//! ```

pub mod error;
pub mod model;
pub mod names;
pub mod payload;
pub mod registry;
pub mod tagging;
pub mod value;

// ── Convenience re-exports ───────────────────────────────────────────

pub use error::{DefinitionError, ParseError};
pub use model::{EnumDef, EnumType, PayloadKind, Variant, VariantDef};
pub use names::{NameConversion, NameMap};
pub use payload::{FieldDef, PayloadType, RecordType};
pub use registry::{EnumHandle, Registry, RegistryBuilder, SCHEMA_DIALECT};
pub use tagging::Tagging;
pub use value::{EnumValue, Payload};
