use std::path::Path;
use std::process;

use serde_json::{Map, Value};

use super::{print_json, registry_or_exit};
use crate::{report_error, OutputFormat};

/// Print one enum's schema document, or a map of every enum's document.
///
/// The output is JSON regardless of `--output`.
pub(crate) fn cmd_schema(
    definitions: &Path,
    enum_name: Option<&str>,
    output: OutputFormat,
    quiet: bool,
) {
    let registry = registry_or_exit(definitions, output, quiet);
    let schema = match enum_name {
        Some(name) => match registry.schema(name) {
            Some(schema) => schema,
            None => {
                report_error(&format!("unknown enum '{}'", name), output, quiet);
                process::exit(1);
            }
        },
        None => {
            let all: Map<String, Value> = registry
                .enums()
                .map(|handle| (handle.name().to_string(), handle.schema()))
                .collect();
            Value::Object(all)
        }
    };
    print_json(&schema);
}
