pub(crate) mod check;
pub(crate) mod convert;
pub(crate) mod parse;
pub(crate) mod schema;
pub(crate) mod validate;

use std::path::Path;
use std::process;

use typenum_core::Registry;

use crate::{definition, report_error, OutputFormat};

/// Load the registry or report the failure and exit.
pub(crate) fn registry_or_exit(path: &Path, output: OutputFormat, quiet: bool) -> Registry {
    match definition::load_registry(path) {
        Ok(registry) => registry,
        Err(e) => {
            report_error(&format!("{:#}", e), output, quiet);
            process::exit(1);
        }
    }
}

/// Read a wire value or report the failure and exit.
pub(crate) fn wire_or_exit(path: &Path, output: OutputFormat, quiet: bool) -> serde_json::Value {
    match definition::read_wire(path) {
        Ok(wire) => wire,
        Err(e) => {
            report_error(&format!("{:#}", e), output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn print_json(value: &serde_json::Value) {
    let pretty =
        serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("serialization error: {}", e));
    println!("{}", pretty);
}
