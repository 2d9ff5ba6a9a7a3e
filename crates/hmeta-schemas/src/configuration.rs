//! Table customization with open JSON objects.
//!
//! The gateway keeps adding fields to its customization objects. Anything this
//! crate does not model lands in `additional_properties` on decode and is
//! written back verbatim on encode, so a read-modify-write cycle never drops
//! settings owned by someone else.
//!
//! Known fields and bag keys are disjoint after decode. On encode a bag entry
//! that collides with a known key is skipped: the typed field wins.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::null_as_default;

const CONFIGURATION_KNOWN_KEYS: &[&str] =
    &["custom_name", "custom_root_fields", "custom_column_names"];

const CUSTOM_ROOT_FIELDS_KNOWN_KEYS: &[&str] = &[
    "select",
    "select_by_pk",
    "select_aggregate",
    "insert",
    "insert_one",
    "update",
    "update_by_pk",
    "delete",
    "delete_by_pk",
];

fn write_additional<M: SerializeMap>(
    map: &mut M,
    additional: &Map<String, Value>,
    known: &[&str],
) -> Result<(), M::Error> {
    for (key, value) in additional {
        if !known.contains(&key.as_str()) {
            map.serialize_entry(key, value)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CustomRootFields
// ---------------------------------------------------------------------------

/// Overrides for the generated root field names of a tracked table.
///
/// `None` means "let the gateway generate it" and is omitted on the wire.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "CustomRootFieldsWire")]
pub struct CustomRootFields {
    pub select: Option<String>,
    pub select_by_pk: Option<String>,
    pub select_aggregate: Option<String>,
    pub insert: Option<String>,
    pub insert_one: Option<String>,
    pub update: Option<String>,
    pub update_by_pk: Option<String>,
    pub delete: Option<String>,
    pub delete_by_pk: Option<String>,

    /// Fields the gateway returned that are not modelled above.
    pub additional_properties: Map<String, Value>,
}

#[derive(Deserialize)]
struct CustomRootFieldsWire {
    #[serde(default)]
    select: Option<String>,
    #[serde(default)]
    select_by_pk: Option<String>,
    #[serde(default)]
    select_aggregate: Option<String>,
    #[serde(default)]
    insert: Option<String>,
    #[serde(default)]
    insert_one: Option<String>,
    #[serde(default)]
    update: Option<String>,
    #[serde(default)]
    update_by_pk: Option<String>,
    #[serde(default)]
    delete: Option<String>,
    #[serde(default)]
    delete_by_pk: Option<String>,
    #[serde(flatten)]
    additional_properties: Map<String, Value>,
}

impl From<CustomRootFieldsWire> for CustomRootFields {
    fn from(w: CustomRootFieldsWire) -> Self {
        Self {
            select: w.select,
            select_by_pk: w.select_by_pk,
            select_aggregate: w.select_aggregate,
            insert: w.insert,
            insert_one: w.insert_one,
            update: w.update,
            update_by_pk: w.update_by_pk,
            delete: w.delete,
            delete_by_pk: w.delete_by_pk,
            additional_properties: w.additional_properties,
        }
    }
}

impl CustomRootFields {
    /// The conventional naming scheme: plural `select`, singular `select_by_pk`,
    /// and `insert`/`update`/`delete` prefixes in camelCase.
    pub fn conventional(singular: &str, plural: &str) -> Self {
        let upper = |s: &str| {
            let mut chars = s.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        };
        let (one, many) = (upper(singular), upper(plural));

        Self {
            select: Some(plural.to_string()),
            select_by_pk: Some(singular.to_string()),
            select_aggregate: Some(format!("{plural}Aggregate")),
            insert: Some(format!("insert{many}")),
            insert_one: Some(format!("insert{one}")),
            update: Some(format!("update{many}")),
            update_by_pk: Some(format!("update{one}")),
            delete: Some(format!("delete{many}")),
            delete_by_pk: Some(format!("delete{one}")),
            additional_properties: Map::new(),
        }
    }

    fn known(&self) -> [(&'static str, &Option<String>); 9] {
        [
            ("select", &self.select),
            ("select_by_pk", &self.select_by_pk),
            ("select_aggregate", &self.select_aggregate),
            ("insert", &self.insert),
            ("insert_one", &self.insert_one),
            ("update", &self.update),
            ("update_by_pk", &self.update_by_pk),
            ("delete", &self.delete),
            ("delete_by_pk", &self.delete_by_pk),
        ]
    }
}

impl Serialize for CustomRootFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.known() {
            if let Some(v) = value {
                map.serialize_entry(key, v)?;
            }
        }
        write_additional(
            &mut map,
            &self.additional_properties,
            CUSTOM_ROOT_FIELDS_KNOWN_KEYS,
        )?;
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Customization of a tracked table: display name, root field names and
/// column renames.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "ConfigurationWire")]
pub struct Configuration {
    pub custom_name: Option<String>,
    pub custom_root_fields: CustomRootFields,
    pub custom_column_names: BTreeMap<String, String>,

    /// Fields the gateway returned that are not modelled above
    /// (`column_config`, `comment`, ...).
    pub additional_properties: Map<String, Value>,
}

#[derive(Deserialize)]
struct ConfigurationWire {
    #[serde(default)]
    custom_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    custom_root_fields: CustomRootFields,
    #[serde(default, deserialize_with = "null_as_default")]
    custom_column_names: BTreeMap<String, String>,
    #[serde(flatten)]
    additional_properties: Map<String, Value>,
}

impl From<ConfigurationWire> for Configuration {
    fn from(w: ConfigurationWire) -> Self {
        Self {
            custom_name: w.custom_name,
            custom_root_fields: w.custom_root_fields,
            custom_column_names: w.custom_column_names,
            additional_properties: w.additional_properties,
        }
    }
}

impl Configuration {
    pub fn with_custom_name(mut self, name: impl Into<String>) -> Self {
        self.custom_name = Some(name.into());
        self
    }

    pub fn with_root_fields(mut self, fields: CustomRootFields) -> Self {
        self.custom_root_fields = fields;
        self
    }

    pub fn with_column(mut self, column: impl Into<String>, exposed: impl Into<String>) -> Self {
        self.custom_column_names.insert(column.into(), exposed.into());
        self
    }
}

impl Serialize for Configuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(name) = &self.custom_name {
            map.serialize_entry("custom_name", name)?;
        }
        map.serialize_entry("custom_root_fields", &self.custom_root_fields)?;
        map.serialize_entry("custom_column_names", &self.custom_column_names)?;
        write_additional(
            &mut map,
            &self.additional_properties,
            CONFIGURATION_KNOWN_KEYS,
        )?;
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
