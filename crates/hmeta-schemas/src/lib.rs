//! hmeta-schemas
//!
//! Shared data model for the gateway metadata API: table identities,
//! table customization, relationship declarations, and the request envelopes
//! sent to the metadata endpoint.
//!
//! Pure types and serde glue. No IO.

mod configuration;
mod relationship;
mod request;
mod serde_util;
mod table;

pub use configuration::{Configuration, CustomRootFields};
pub use relationship::{
    ArrayRelationship, ArrayRelationshipUsing, ForeignKeyColumns, Named, ObjectRelationship,
    ObjectRelationshipUsing, RelationshipKind, RemoteForeignKey,
};
pub use request::{
    CreateArrayRelationshipArgs, CreateObjectRelationshipArgs, MetadataRequest,
    ObjectRelationshipColumns, SetTableCustomizationArgs, TrackTableArgs,
    EXPORT_METADATA_VERSION,
};
pub use serde_util::null_as_default;
pub use table::{DeclaredTable, Table};
