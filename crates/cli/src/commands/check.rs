use std::path::Path;

use serde_json::json;

use super::registry_or_exit;
use crate::OutputFormat;

pub(crate) fn cmd_check(definitions: &Path, output: OutputFormat, quiet: bool) {
    let registry = registry_or_exit(definitions, output, quiet);
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => {
            for handle in registry.enums() {
                let tagging = handle.enum_type().tagging();
                println!(
                    "{}: {} variant(s), {:?}",
                    handle.name(),
                    handle.variants().len(),
                    tagging
                );
            }
            println!("ok: {} enum(s)", registry.len());
        }
        OutputFormat::Json => {
            let enums: Vec<_> = registry
                .enums()
                .map(|handle| {
                    json!({
                        "name": handle.name(),
                        "tagging": handle.enum_type().tagging(),
                        "variants": handle
                            .variants()
                            .iter()
                            .map(|v| json!({"name": v.name(), "wire_name": v.wire_name()}))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            println!("{}", json!({ "valid": true, "enums": enums }));
        }
    }
}
