use std::path::Path;
use std::process;

use serde_json::json;
use typenum_core::{EnumValue, Payload};

use super::{registry_or_exit, wire_or_exit};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_parse(
    definitions: &Path,
    enum_name: &str,
    input: &Path,
    output: OutputFormat,
    quiet: bool,
) {
    let registry = registry_or_exit(definitions, output, quiet);
    let wire = wire_or_exit(input, output, quiet);

    let value = match registry.parse(enum_name, &wire) {
        Ok(value) => value,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => println!("{}", describe(&value)),
    }
}

/// Structured view of a value: in-memory names, with nested values expanded.
fn describe(value: &EnumValue) -> serde_json::Value {
    let payload = match value.payload() {
        None => serde_json::Value::Null,
        Some(Payload::Value(v)) => v.clone(),
        Some(Payload::Enum(inner)) => describe(inner),
    };
    json!({
        "enum": value.enum_name(),
        "variant": value.variant_name(),
        "wire_name": value.wire_name(),
        "payload": payload
    })
}
