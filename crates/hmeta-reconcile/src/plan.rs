//! Per-table plans computed from a declared table and its snapshot entry.

use std::collections::HashSet;

use hmeta_schemas::{ArrayRelationship, Configuration, DeclaredTable, Named, ObjectRelationship};

use crate::{merge_array_relationships, merge_configuration, merge_object_relationships};
use crate::ExistingTableSnapshot;

/// How the customization payload was derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No stored configuration to merge with; desired is sent as-is.
    NoBaseline,
    /// Desired merged over the stored configuration.
    Merged,
    /// The stored configuration did not parse; desired is sent unmerged.
    Unparseable(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CustomizationPlan {
    pub configuration: Configuration,
    pub outcome: MergeOutcome,
}

/// Configuration to send for an already-tracked table.
pub fn customization_plan(
    desired: &DeclaredTable,
    existing: Option<&ExistingTableSnapshot>,
) -> CustomizationPlan {
    let parsed = existing.map(ExistingTableSnapshot::parse_configuration);

    match parsed {
        Some(Ok(Some(stored))) => CustomizationPlan {
            configuration: merge_configuration(&stored, &desired.configuration),
            outcome: MergeOutcome::Merged,
        },
        Some(Err(e)) => CustomizationPlan {
            configuration: desired.configuration.clone(),
            outcome: MergeOutcome::Unparseable(e.to_string()),
        },
        None | Some(Ok(None)) => CustomizationPlan {
            configuration: desired.configuration.clone(),
            outcome: MergeOutcome::NoBaseline,
        },
    }
}

/// Relationships that must be created, in send order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RelationshipPlan {
    pub object: Vec<ObjectRelationship>,
    pub array: Vec<ArrayRelationship>,
}

impl RelationshipPlan {
    pub fn is_empty(&self) -> bool {
        self.object.is_empty() && self.array.is_empty()
    }

    pub fn len(&self) -> usize {
        self.object.len() + self.array.len()
    }
}

fn not_yet_present<R: Named + Clone>(existing: &[R], merged: Vec<R>) -> Vec<R> {
    let present: HashSet<&str> = existing.iter().map(Named::name).collect();
    merged
        .into_iter()
        .filter(|r| !present.contains(r.name()))
        .collect()
}

/// Every merged relationship whose name is absent from the snapshot.
///
/// Presence is decided by name only: an existing relationship with the same
/// name but a different foreign key is left alone.
pub fn relationship_plan(
    desired: &DeclaredTable,
    existing: Option<&ExistingTableSnapshot>,
) -> RelationshipPlan {
    let (existing_object, existing_array) = match existing {
        Some(e) => (
            e.object_relationships.as_slice(),
            e.array_relationships.as_slice(),
        ),
        None => (&[][..], &[][..]),
    };

    let object = merge_object_relationships(existing_object, &desired.object_relationships);
    let array = merge_array_relationships(existing_array, &desired.array_relationships);

    RelationshipPlan {
        object: not_yet_present(existing_object, object),
        array: not_yet_present(existing_array, array),
    }
}
