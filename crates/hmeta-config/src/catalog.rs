//! Declared-table catalogs.
//!
//! A catalog is a YAML (or JSON) document with a top-level `tables` list of
//! [`DeclaredTable`] entries, in the order they should be tracked:
//!
//! ```yaml
//! tables:
//!   - table: { schema: storage, name: buckets }
//!     configuration:
//!       custom_name: buckets
//!       custom_column_names: { created_at: createdAt }
//!     array_relationships:
//!       - name: files
//!         using:
//!           foreign_key_constraint_on:
//!             table: { schema: storage, name: files }
//!             columns: [bucket_id]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use hmeta_schemas::DeclaredTable;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Yaml,
    Json,
}

impl CatalogFormat {
    /// `.json` is JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => CatalogFormat::Json,
            _ => CatalogFormat::Yaml,
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tables: Vec<DeclaredTable>,
}

/// Parse a catalog document. Entries without a `source` get `default_source`.
pub fn parse_declared_tables(
    raw: &str,
    format: CatalogFormat,
    default_source: &str,
) -> Result<Vec<DeclaredTable>> {
    let file: CatalogFile = match format {
        CatalogFormat::Yaml => serde_yaml::from_str(raw).context("parse catalog yaml")?,
        CatalogFormat::Json => serde_json::from_str(raw).context("parse catalog json")?,
    };

    let mut tables = file.tables;
    for (idx, t) in tables.iter_mut().enumerate() {
        if t.table.schema.trim().is_empty() || t.table.name.trim().is_empty() {
            bail!("catalog entry {idx} has an empty table schema or name");
        }
        if t.source.trim().is_empty() {
            t.source = default_source.to_string();
        }
    }

    Ok(tables)
}

/// Read and parse a catalog file.
pub fn load_declared_tables(path: &Path, default_source: &str) -> Result<Vec<DeclaredTable>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read catalog: {}", path.display()))?;
    parse_declared_tables(&raw, CatalogFormat::from_path(path), default_source)
        .with_context(|| format!("load catalog: {}", path.display()))
}
