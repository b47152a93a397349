use std::path::Path;
use std::process;

use typenum_core::ParseError;

use super::{registry_or_exit, wire_or_exit};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_validate(
    definitions: &Path,
    enum_name: &str,
    input: &Path,
    output: OutputFormat,
    quiet: bool,
) {
    let registry = registry_or_exit(definitions, output, quiet);
    let wire = wire_or_exit(input, output, quiet);

    let handle = match registry.handle(enum_name) {
        Ok(handle) => handle,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    match handle.validate(&wire) {
        Ok(()) => {
            if !quiet {
                match output {
                    OutputFormat::Text => println!("valid"),
                    OutputFormat::Json => println!("{{\"valid\": true}}"),
                }
            }
        }
        Err(ParseError::SchemaViolation { errors, .. }) => {
            match output {
                OutputFormat::Text => {
                    if !quiet {
                        eprintln!("invalid {}", enum_name);
                        for err in &errors {
                            eprintln!("  - {}", err);
                        }
                    }
                }
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "valid": false,
                        "enum": enum_name,
                        "errors": errors
                    });
                    eprintln!(
                        "{}",
                        serde_json::to_string_pretty(&json).unwrap_or_default()
                    );
                }
            }
            process::exit(1);
        }
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    }
}
