//! Snapshot projection: `export_metadata` wire format to per-table snapshot.
//!
//! Only the envelope (`metadata.sources[].name`) is decoded up front. Table
//! entries stay raw JSON until their source is known to be the configured
//! one, so sources of other kinds (with differently shaped table ids) never
//! reach the typed decoder. Within the configured source each entry decodes
//! on its own: an unreadable entry is skipped and reported, not fatal.
//! Configuration blocks are kept raw and parsed later, per table.
//!
//! Unknown fields are ignored (`deny_unknown_fields` is NOT set) so gateway
//! additions do not break decoding.

use std::collections::BTreeMap;

use hmeta_schemas::{null_as_default, ArrayRelationship, Configuration, ObjectRelationship, Table};
use serde::Deserialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Raw wire-level structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: RawExportMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExportMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<RawExportSource>,
}

/// One source. `tables` is left undecoded; see [`RawExportTable::decode`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExportSource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub tables: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawExportTable {
    pub table: Table,
    #[serde(default)]
    pub configuration: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub object_relationships: Vec<ObjectRelationship>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub array_relationships: Vec<ArrayRelationship>,
}

impl RawExportTable {
    pub fn decode(entry: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(entry)
    }
}

/// A table entry of the configured source that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Position in the source's `tables` list.
    pub index: usize,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// What the gateway currently holds for one tracked table.
///
/// `configuration` is `None` for a tracked-but-uncustomized table. That is a
/// valid state, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExistingTableSnapshot {
    pub configuration: Option<Value>,
    pub object_relationships: Vec<ObjectRelationship>,
    pub array_relationships: Vec<ArrayRelationship>,
}

impl ExistingTableSnapshot {
    /// Parse the stored configuration. `Ok(None)` when there is none.
    pub fn parse_configuration(&self) -> Result<Option<Configuration>, serde_json::Error> {
        self.configuration
            .as_ref()
            .map(|raw| Configuration::deserialize(raw))
            .transpose()
    }
}

/// Tracked tables of one source, keyed by table identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataSnapshot {
    pub tables: BTreeMap<Table, ExistingTableSnapshot>,
    /// Entries of the source that were present but unreadable. Their tables
    /// behave as if absent from the snapshot.
    pub skipped: Vec<SkippedEntry>,
}

impl MetadataSnapshot {
    /// Empty baseline: every table behaves as "not previously customized".
    pub fn empty() -> Self {
        Self::default()
    }

    /// Keep only tables of `source`. A repeated source name overwrites
    /// earlier entries for the same table.
    pub fn project(raw: RawExport, source: &str) -> Self {
        let mut snapshot = Self::default();

        for src in raw.metadata.sources {
            if src.name != source {
                continue;
            }
            let entries = match src.tables {
                Value::Array(entries) => entries,
                Value::Null => continue,
                other => {
                    snapshot.skipped.push(SkippedEntry {
                        index: 0,
                        reason: format!("tables is not a list: {other}"),
                    });
                    continue;
                }
            };

            for (index, entry) in entries.iter().enumerate() {
                match RawExportTable::decode(entry) {
                    Ok(t) => {
                        snapshot.tables.insert(
                            t.table,
                            ExistingTableSnapshot {
                                configuration: t.configuration.filter(|v| !v.is_null()),
                                object_relationships: t.object_relationships,
                                array_relationships: t.array_relationships,
                            },
                        );
                    }
                    Err(e) => snapshot.skipped.push(SkippedEntry {
                        index,
                        reason: e.to_string(),
                    }),
                }
            }
        }

        snapshot
    }

    pub fn get(&self, table: &Table) -> Option<&ExistingTableSnapshot> {
        self.tables.get(table)
    }

    pub fn is_tracked(&self, table: &Table) -> bool {
        self.tables.contains_key(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Decode an `export_metadata` response body and project it onto `source`.
pub fn decode_export(body: &[u8], source: &str) -> Result<MetadataSnapshot, serde_json::Error> {
    let raw: RawExport = serde_json::from_slice(body)?;
    Ok(MetadataSnapshot::project(raw, source))
}
