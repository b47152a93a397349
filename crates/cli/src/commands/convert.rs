use std::path::Path;
use std::process;

use super::{print_json, registry_or_exit, wire_or_exit};
use crate::{report_error, OutputFormat};

/// Parse `input` as `from`, rebind it to `to` and print the new wire form.
pub(crate) fn cmd_convert(
    definitions: &Path,
    from: &str,
    to: &str,
    input: &Path,
    output: OutputFormat,
    quiet: bool,
) {
    let registry = registry_or_exit(definitions, output, quiet);
    let wire = wire_or_exit(input, output, quiet);

    let converted = registry
        .parse(from, &wire)
        .and_then(|value| registry.rebind(&value, to));
    match converted {
        Ok(value) => {
            tracing::debug!(from, to, variant = value.variant_name(), "converted");
            print_json(&registry.serialize(&value));
        }
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    }
}
