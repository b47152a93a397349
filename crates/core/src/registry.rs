//! The registry: defined enums, their schemas and compiled payload validators.
//!
//! Enums are declared on a [`RegistryBuilder`]; [`RegistryBuilder::build`] is
//! the one-time initialization step that resolves nested-enum references,
//! checks payload shapes against each tagging strategy, builds every schema
//! and compiles the validators. The built [`Registry`] is immutable and can
//! be shared across threads.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::error::{DefinitionError, ParseError};
use crate::model::{EnumDef, EnumType, PayloadKind, Variant};
use crate::tagging::{definition_ref, Context};
use crate::value::{EnumValue, Payload};

/// JSON Schema dialect of exported schema documents.
pub const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Collects enum definitions before the registry is built.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    enums: Vec<EnumType>,
    index: HashMap<String, usize>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define an enum. Definition errors surface here, before any value exists.
    pub fn define(&mut self, def: EnumDef) -> Result<&mut Self, DefinitionError> {
        if self.index.contains_key(&def.name) {
            return Err(DefinitionError::DuplicateEnum {
                enum_name: def.name,
            });
        }
        let enum_type = EnumType::define(def)?;
        self.index
            .insert(enum_type.name().to_string(), self.enums.len());
        self.enums.push(enum_type);
        Ok(self)
    }

    /// Resolve references, check payload shapes, build schemas and validators.
    pub fn build(self) -> Result<Registry, DefinitionError> {
        let mut registry = Registry {
            enums: self.enums.into_iter().map(Arc::new).collect(),
            index: self.index,
            schemas: Vec::new(),
            validators: Vec::new(),
        };

        for enum_type in &registry.enums {
            for variant in enum_type.variants() {
                if let PayloadKind::NestedEnum(target) = variant.payload() {
                    if !registry.index.contains_key(target) {
                        return Err(DefinitionError::UnknownEnumReference {
                            enum_name: enum_type.name().to_string(),
                            variant: variant.name().to_string(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }

        for enum_type in &registry.enums {
            let cx = Context::new(&registry, enum_type);
            enum_type.strategy().check_payloads(&cx)?;
        }

        let schemas: Vec<Value> = registry
            .enums
            .iter()
            .map(|enum_type| {
                let cx = Context::new(&registry, enum_type);
                enum_type.strategy().schema(&cx)
            })
            .collect();
        registry.schemas = schemas;

        let validators = registry
            .enums
            .iter()
            .map(|enum_type| registry.compile(enum_type))
            .collect::<Result<Vec<_>, _>>()?;
        registry.validators = validators;

        tracing::debug!(enums = registry.enums.len(), "registry built");
        Ok(registry)
    }
}

/// Compiled validators of one enum.
struct Validators {
    /// Whole wire documents.
    document: jsonschema::Validator,
    /// Primitive payloads, indexed by variant position.
    payloads: Vec<Option<jsonschema::Validator>>,
}

/// A set of defined enums, ready to parse and serialize.
pub struct Registry {
    enums: Vec<Arc<EnumType>>,
    index: HashMap<String, usize>,
    schemas: Vec<Value>,
    validators: Vec<Validators>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Handle to a registered enum.
    pub fn get(&self, name: &str) -> Option<EnumHandle<'_>> {
        self.index.get(name).map(|&index| EnumHandle {
            registry: self,
            index,
        })
    }

    /// Like [`Registry::get`], failing with [`ParseError::UnknownEnum`].
    pub fn handle(&self, name: &str) -> Result<EnumHandle<'_>, ParseError> {
        self.get(name).ok_or_else(|| ParseError::UnknownEnum {
            name: name.to_string(),
        })
    }

    /// All registered enums, in definition order.
    pub fn enums(&self) -> impl Iterator<Item = EnumHandle<'_>> + '_ {
        (0..self.enums.len()).map(move |index| EnumHandle {
            registry: self,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }

    pub fn parse(&self, enum_name: &str, wire: &Value) -> Result<EnumValue, ParseError> {
        self.handle(enum_name)?.parse(wire)
    }

    pub fn construct(
        &self,
        enum_name: &str,
        variant: &str,
        raw: Value,
    ) -> Result<EnumValue, ParseError> {
        self.handle(enum_name)?.construct(variant, raw)
    }

    pub fn serialize(&self, value: &EnumValue) -> Value {
        value.to_wire()
    }

    /// Complete JSON Schema document for an enum.
    pub fn schema(&self, enum_name: &str) -> Option<Value> {
        self.get(enum_name).map(|handle| handle.schema())
    }

    /// Re-express a value as the same-named variant of another enum.
    ///
    /// Payloads are revalidated against the target's declared types and
    /// nested enum values are rebound recursively. This is how a value moves
    /// between two enums that differ only in tagging or naming.
    pub fn rebind(&self, value: &EnumValue, target: &str) -> Result<EnumValue, ParseError> {
        let handle = self.handle(target)?;
        let variant = handle.resolve(value.variant_name())?;
        match (value.payload(), variant.payload()) {
            (Some(Payload::Enum(inner)), PayloadKind::NestedEnum(inner_target)) => {
                let inner = self.rebind(inner, inner_target)?;
                Ok(EnumValue::new(
                    Arc::clone(handle.enum_type()),
                    Arc::clone(variant),
                    Some(Payload::Enum(Box::new(inner))),
                ))
            }
            (payload, _) => {
                let raw = payload.map(Payload::to_wire);
                self.construct_variant(handle.enum_type(), variant, raw.as_ref())
            }
        }
    }

    pub(crate) fn enum_arc(&self, name: &str) -> Option<&Arc<EnumType>> {
        self.index.get(name).map(|&i| &self.enums[i])
    }

    /// Build a value of `variant` from a raw wire payload.
    ///
    /// Primitive payloads go through the variant's compiled validator; nested
    /// enum payloads are parsed by the nested enum's own strategy.
    pub(crate) fn construct_variant(
        &self,
        enum_type: &Arc<EnumType>,
        variant: &Arc<Variant>,
        raw: Option<&Value>,
    ) -> Result<EnumValue, ParseError> {
        let payload = match variant.payload() {
            PayloadKind::None => match raw {
                None | Some(Value::Null) => None,
                Some(_) => {
                    return Err(ParseError::PayloadValidationFailed {
                        enum_name: enum_type.name().to_string(),
                        variant: variant.name().to_string(),
                        errors: vec!["variant takes no payload".to_string()],
                    });
                }
            },
            PayloadKind::Primitive(_) => {
                let raw = raw.unwrap_or(&Value::Null);
                let validator = self
                    .index
                    .get(enum_type.name())
                    .and_then(|&i| self.validators.get(i))
                    .and_then(|v| v.payloads.get(variant.index()))
                    .and_then(Option::as_ref)
                    .ok_or_else(|| ParseError::UnknownEnum {
                        name: enum_type.name().to_string(),
                    })?;
                let errors: Vec<String> = validator
                    .iter_errors(raw)
                    .map(|e| e.to_string())
                    .collect();
                if !errors.is_empty() {
                    return Err(ParseError::PayloadValidationFailed {
                        enum_name: enum_type.name().to_string(),
                        variant: variant.name().to_string(),
                        errors,
                    });
                }
                Some(Payload::Value(raw.clone()))
            }
            PayloadKind::NestedEnum(target) => {
                let inner = self.handle(target)?.parse(raw.unwrap_or(&Value::Null))?;
                Some(Payload::Enum(Box::new(inner)))
            }
        };
        tracing::trace!(
            enum_name = enum_type.name(),
            variant = variant.name(),
            "constructed value"
        );
        Ok(EnumValue::new(
            Arc::clone(enum_type),
            Arc::clone(variant),
            payload,
        ))
    }

    /// Schema document for `root` with `$defs` for every enum reachable from it.
    fn document(&self, root: usize) -> Value {
        let mut defs = Map::new();
        let mut queue = VecDeque::from([root]);
        while let Some(index) = queue.pop_front() {
            let enum_type = &self.enums[index];
            if defs.contains_key(enum_type.name()) {
                continue;
            }
            defs.insert(enum_type.name().to_string(), self.schemas[index].clone());
            for variant in enum_type.variants() {
                if let PayloadKind::NestedEnum(target) = variant.payload() {
                    if let Some(&next) = self.index.get(target) {
                        queue.push_back(next);
                    }
                }
            }
        }
        json!({
            "$schema": SCHEMA_DIALECT,
            "$ref": definition_ref(self.enums[root].name()),
            "$defs": defs
        })
    }

    fn compile(&self, enum_type: &Arc<EnumType>) -> Result<Validators, DefinitionError> {
        let compile = |label: &str, schema: &Value| {
            jsonschema::validator_for(schema).map_err(|e| DefinitionError::InvalidPayloadSchema {
                enum_name: enum_type.name().to_string(),
                variant: label.to_string(),
                message: e.to_string(),
            })
        };

        let payloads = enum_type
            .variants()
            .iter()
            .map(|variant| match variant.payload() {
                PayloadKind::Primitive(ty) => {
                    let schema = enum_type.strategy().payload_validator_schema(ty);
                    compile(variant.name(), &schema).map(Some)
                }
                _ => Ok(None),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let index = self.index[enum_type.name()];
        let document = compile(enum_type.name(), &self.document(index))?;
        tracing::debug!(enum_name = enum_type.name(), "compiled validators");

        Ok(Validators { document, payloads })
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field(
                "enums",
                &self.enums.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// A registered enum, borrowed from its registry.
#[derive(Clone, Copy)]
pub struct EnumHandle<'r> {
    registry: &'r Registry,
    index: usize,
}

impl<'r> EnumHandle<'r> {
    pub fn name(&self) -> &'r str {
        self.enum_type().name()
    }

    pub fn enum_type(&self) -> &'r Arc<EnumType> {
        &self.registry.enums[self.index]
    }

    pub fn variants(&self) -> &'r [Arc<Variant>] {
        self.enum_type().variants()
    }

    /// Look a variant up by its in-memory name.
    pub fn resolve(&self, variant: &str) -> Result<&'r Arc<Variant>, ParseError> {
        self.enum_type()
            .resolve(variant)
            .ok_or_else(|| ParseError::UnknownVariant {
                enum_name: self.name().to_string(),
                variant: variant.to_string(),
            })
    }

    /// Build a value of `variant` from a raw payload (`null` for bare variants).
    pub fn construct(&self, variant: &str, raw: Value) -> Result<EnumValue, ParseError> {
        let variant = self.resolve(variant)?;
        self.registry
            .construct_variant(self.enum_type(), variant, Some(&raw))
    }

    /// Build a value of a payload-less variant.
    pub fn unit(&self, variant: &str) -> Result<EnumValue, ParseError> {
        let variant = self.resolve(variant)?;
        self.registry
            .construct_variant(self.enum_type(), variant, None)
    }

    /// Build a value of a nested-enum variant from an existing value.
    pub fn wrap(&self, variant: &str, inner: EnumValue) -> Result<EnumValue, ParseError> {
        let variant = self.resolve(variant)?;
        let expected = match variant.payload() {
            PayloadKind::NestedEnum(target) => self.registry.enum_arc(target),
            _ => None,
        };
        match expected {
            Some(expected) if Arc::ptr_eq(expected, inner.enum_type()) => Ok(EnumValue::new(
                Arc::clone(self.enum_type()),
                Arc::clone(variant),
                Some(Payload::Enum(Box::new(inner))),
            )),
            _ => Err(ParseError::PayloadValidationFailed {
                enum_name: self.name().to_string(),
                variant: variant.name().to_string(),
                errors: vec![format!(
                    "cannot carry a value of enum '{}'",
                    inner.enum_name()
                )],
            }),
        }
    }

    /// Parse a wire value through the enum's tagging strategy.
    pub fn parse(&self, wire: &Value) -> Result<EnumValue, ParseError> {
        let enum_type = self.enum_type();
        let cx = Context::new(self.registry, enum_type);
        enum_type.strategy().parse(&cx, wire)
    }

    pub fn serialize(&self, value: &EnumValue) -> Value {
        value.to_wire()
    }

    /// Complete JSON Schema document of the wire form.
    pub fn schema(&self) -> Value {
        self.registry.document(self.index)
    }

    /// Check a wire document against the exported schema without constructing a value.
    pub fn validate(&self, wire: &Value) -> Result<(), ParseError> {
        let validator = &self.registry.validators[self.index].document;
        let errors: Vec<String> = validator.iter_errors(wire).map(|e| e.to_string()).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ParseError::SchemaViolation {
                enum_name: self.name().to_string(),
                errors,
            })
        }
    }
}

impl fmt::Debug for EnumHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnumHandle").field(&self.name()).finish()
    }
}
