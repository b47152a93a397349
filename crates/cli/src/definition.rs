//! Definition files: a list of enum definitions in TOML or JSON.

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;
use serde_json::Value;
use typenum_core::{EnumDef, Registry};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DefinitionFile {
    #[serde(default)]
    pub(crate) enums: Vec<EnumDef>,
}

impl DefinitionFile {
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("error reading file '{}'", path.display()))?;
        let file: DefinitionFile = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&src)
                .with_context(|| format!("error parsing TOML in '{}'", path.display()))?,
            Some("json") => serde_json::from_str(&src)
                .with_context(|| format!("error parsing JSON in '{}'", path.display()))?,
            _ => bail!(
                "unsupported definition file '{}': expected a .toml or .json extension",
                path.display()
            ),
        };
        Ok(file)
    }

    pub(crate) fn into_registry(self) -> anyhow::Result<Registry> {
        let mut builder = Registry::builder();
        for def in self.enums {
            builder.define(def)?;
        }
        Ok(builder.build()?)
    }
}

/// Load and build the registry described by a definition file.
pub(crate) fn load_registry(path: &Path) -> anyhow::Result<Registry> {
    let registry = DefinitionFile::load(path)?.into_registry()?;
    tracing::debug!(path = %path.display(), enums = registry.len(), "loaded definitions");
    Ok(registry)
}

/// Read a JSON wire value from a file, or from stdin when the path is `-`.
pub(crate) fn read_wire(path: &Path) -> anyhow::Result<Value> {
    let src = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("error reading stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("error reading file '{}'", path.display()))?
    };
    serde_json::from_str(&src)
        .with_context(|| format!("error parsing JSON in '{}'", path.display()))
}
