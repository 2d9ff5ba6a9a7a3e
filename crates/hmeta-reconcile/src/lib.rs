//! hmeta-reconcile
//!
//! Pure half of the reconciliation engine:
//! - projection of an `export_metadata` response into a per-table snapshot
//! - merge of desired customization and relationships with existing ones
//! - per-table plans (what to send for customization, which relationships
//!   to create)
//!
//! Merge policy: known fields come from the desired side; fields this
//! workspace does not model come from the existing side; relationships are a
//! union by name with desired entries first.
//!
//! Deterministic, pure logic. No IO. No gateway calls.

mod merge;
mod plan;
mod snapshot;

pub use merge::{
    merge_array_relationships, merge_configuration, merge_custom_root_fields,
    merge_object_relationships, merge_relationships,
};
pub use plan::{
    customization_plan, relationship_plan, CustomizationPlan, MergeOutcome, RelationshipPlan,
};
pub use snapshot::{
    decode_export, ExistingTableSnapshot, MetadataSnapshot, RawExport, RawExportMetadata,
    RawExportSource, RawExportTable, SkippedEntry,
};
