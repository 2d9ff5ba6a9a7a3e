//! Request envelopes for the metadata endpoint.
//!
//! Every request is a JSON object tagged by `type`. The variants below are
//! the complete set this workspace sends.

use serde::Serialize;

use crate::{
    ArrayRelationship, ArrayRelationshipUsing, Configuration, DeclaredTable, ObjectRelationship,
    Table,
};

/// Metadata format requested from `export_metadata`.
pub const EXPORT_METADATA_VERSION: u32 = 2;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrackTableArgs {
    pub source: String,
    pub table: Table,
    pub configuration: Configuration,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub object_relationships: Vec<ObjectRelationship>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub array_relationships: Vec<ArrayRelationship>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SetTableCustomizationArgs {
    pub source: String,
    pub table: Table,
    pub configuration: Configuration,
}

/// Object relationship `using` clause with columns already normalized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ObjectRelationshipColumns {
    pub foreign_key_constraint_on: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreateObjectRelationshipArgs {
    pub table: Table,
    pub name: String,
    pub source: String,
    pub using: ObjectRelationshipColumns,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreateArrayRelationshipArgs {
    pub table: Table,
    pub name: String,
    pub source: String,
    pub using: ArrayRelationshipUsing,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetadataRequest {
    ExportMetadata {
        version: u32,
    },
    PgTrackTable {
        args: TrackTableArgs,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        is_enum: bool,
    },
    PgSetTableCustomization {
        args: SetTableCustomizationArgs,
    },
    PgCreateObjectRelationship {
        args: CreateObjectRelationshipArgs,
    },
    PgCreateArrayRelationship {
        args: CreateArrayRelationshipArgs,
    },
}

impl MetadataRequest {
    pub fn export_metadata() -> Self {
        MetadataRequest::ExportMetadata {
            version: EXPORT_METADATA_VERSION,
        }
    }

    /// Track request carrying the full desired state of `declared`.
    pub fn track_table(declared: &DeclaredTable) -> Self {
        MetadataRequest::PgTrackTable {
            args: TrackTableArgs {
                source: declared.source.clone(),
                table: declared.table.clone(),
                configuration: declared.configuration.clone(),
                object_relationships: declared.object_relationships.clone(),
                array_relationships: declared.array_relationships.clone(),
            },
            is_enum: declared.is_enum,
        }
    }

    pub fn set_table_customization(
        source: &str,
        table: &Table,
        configuration: Configuration,
    ) -> Self {
        MetadataRequest::PgSetTableCustomization {
            args: SetTableCustomizationArgs {
                source: source.to_string(),
                table: table.clone(),
                configuration,
            },
        }
    }

    pub fn create_object_relationship(source: &str, table: &Table, rel: &ObjectRelationship) -> Self {
        MetadataRequest::PgCreateObjectRelationship {
            args: CreateObjectRelationshipArgs {
                table: table.clone(),
                name: rel.name.clone(),
                source: source.to_string(),
                using: ObjectRelationshipColumns {
                    foreign_key_constraint_on: rel.using.foreign_key_constraint_on.columns(),
                },
            },
        }
    }

    pub fn create_array_relationship(source: &str, table: &Table, rel: &ArrayRelationship) -> Self {
        MetadataRequest::PgCreateArrayRelationship {
            args: CreateArrayRelationshipArgs {
                table: table.clone(),
                name: rel.name.clone(),
                source: source.to_string(),
                using: rel.using.clone(),
            },
        }
    }

    /// Wire `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            MetadataRequest::ExportMetadata { .. } => "export_metadata",
            MetadataRequest::PgTrackTable { .. } => "pg_track_table",
            MetadataRequest::PgSetTableCustomization { .. } => "pg_set_table_customization",
            MetadataRequest::PgCreateObjectRelationship { .. } => "pg_create_object_relationship",
            MetadataRequest::PgCreateArrayRelationship { .. } => "pg_create_array_relationship",
        }
    }
}
