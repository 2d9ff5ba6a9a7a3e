use std::collections::HashSet;

use hmeta_schemas::{ArrayRelationship, Configuration, CustomRootFields, Named, ObjectRelationship};
use serde_json::{Map, Value};

/// Every stored entry as-is; desired entries only fill keys the gateway does
/// not already hold. Unmodelled fields belong to whoever stored them.
fn merge_additional(existing: &Map<String, Value>, desired: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = existing.clone();
    for (k, v) in desired {
        merged.entry(k.clone()).or_insert_with(|| v.clone());
    }
    merged
}

/// Known root fields from `desired`, unknown ones from `existing`.
pub fn merge_custom_root_fields(
    existing: &CustomRootFields,
    desired: &CustomRootFields,
) -> CustomRootFields {
    CustomRootFields {
        additional_properties: merge_additional(
            &existing.additional_properties,
            &desired.additional_properties,
        ),
        ..desired.clone()
    }
}

/// Known fields from `desired` (a one-way overwrite, not a per-field
/// resolution); unknown fields from `existing`, at both nesting levels.
pub fn merge_configuration(existing: &Configuration, desired: &Configuration) -> Configuration {
    Configuration {
        custom_name: desired.custom_name.clone(),
        custom_root_fields: merge_custom_root_fields(
            &existing.custom_root_fields,
            &desired.custom_root_fields,
        ),
        custom_column_names: desired.custom_column_names.clone(),
        additional_properties: merge_additional(
            &existing.additional_properties,
            &desired.additional_properties,
        ),
    }
}

/// Union by name: `desired` in order, then every `existing` entry whose name
/// `desired` does not mention, in order. No entry is modified.
pub fn merge_relationships<R: Named + Clone>(existing: &[R], desired: &[R]) -> Vec<R> {
    let seen: HashSet<&str> = desired.iter().map(Named::name).collect();

    desired
        .iter()
        .cloned()
        .chain(
            existing
                .iter()
                .filter(|r| !seen.contains(r.name()))
                .cloned(),
        )
        .collect()
}

pub fn merge_object_relationships(
    existing: &[ObjectRelationship],
    desired: &[ObjectRelationship],
) -> Vec<ObjectRelationship> {
    merge_relationships(existing, desired)
}

pub fn merge_array_relationships(
    existing: &[ArrayRelationship],
    desired: &[ArrayRelationship],
) -> Vec<ArrayRelationship> {
    merge_relationships(existing, desired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmeta_schemas::{ForeignKeyColumns, Table};
    use serde_json::json;

    fn obj(name: &str, col: &str) -> ObjectRelationship {
        ObjectRelationship::new(name, ForeignKeyColumns::single(col))
    }

    fn arr(name: &str, table: &str) -> ArrayRelationship {
        ArrayRelationship::new(name, Table::new("public", table), ["parent_id"])
    }

    fn names<R: Named>(rels: &[R]) -> Vec<&str> {
        rels.iter().map(Named::name).collect()
    }

    #[test]
    fn desired_known_fields_win_and_unknown_survive() {
        let existing: Configuration = serde_json::from_value(json!({
            "custom_name": "old",
            "comment": "x"
        }))
        .unwrap();
        let desired = Configuration::default().with_custom_name("new");

        let merged = merge_configuration(&existing, &desired);

        assert_eq!(merged.custom_name.as_deref(), Some("new"));
        assert_eq!(merged.additional_properties["comment"], json!("x"));
        assert_eq!(merged.additional_properties.len(), 1);
    }

    #[test]
    fn stored_unknown_field_wins_over_desired_on_collision() {
        let existing: Configuration = serde_json::from_value(json!({
            "custom_name": "old",
            "comment": "theirs"
        }))
        .unwrap();
        let desired: Configuration = serde_json::from_value(json!({
            "custom_name": "new",
            "comment": "mine",
            "column_config": {"id": {"comment": "pk"}},
            "custom_root_fields": {"select": "items", "select_stream": "mine"}
        }))
        .unwrap();
        let existing = Configuration {
            custom_root_fields: serde_json::from_value(
                json!({"select": "old", "select_stream": "theirs"}),
            )
            .unwrap(),
            ..existing
        };

        let merged = merge_configuration(&existing, &desired);

        assert_eq!(merged.custom_name.as_deref(), Some("new"));
        assert_eq!(merged.additional_properties["comment"], json!("theirs"));
        // Keys the gateway does not hold are still sent.
        assert_eq!(
            merged.additional_properties["column_config"],
            json!({"id": {"comment": "pk"}})
        );
        assert_eq!(merged.custom_root_fields.select.as_deref(), Some("items"));
        assert_eq!(
            merged.custom_root_fields.additional_properties["select_stream"],
            json!("theirs")
        );
    }

    #[test]
    fn desired_overwrites_even_when_it_clears_a_field() {
        let existing = Configuration::default()
            .with_custom_name("old")
            .with_column("id", "legacyId");
        let desired = Configuration::default();

        let merged = merge_configuration(&existing, &desired);
        assert_eq!(merged.custom_name, None);
        assert!(merged.custom_column_names.is_empty());
    }

    #[test]
    fn root_field_bag_is_merged_one_level_down() {
        let existing: Configuration = serde_json::from_value(json!({
            "custom_root_fields": {"select": "oldSelect", "select_stream": "stream"},
            "column_config": {"id": {"comment": "pk"}}
        }))
        .unwrap();
        let desired = Configuration::default().with_root_fields(CustomRootFields {
            select: Some("files".to_string()),
            ..CustomRootFields::default()
        });

        let merged = merge_configuration(&existing, &desired);

        assert_eq!(merged.custom_root_fields.select.as_deref(), Some("files"));
        assert_eq!(
            merged.custom_root_fields.additional_properties["select_stream"],
            json!("stream")
        );
        assert_eq!(
            merged.additional_properties["column_config"],
            json!({"id": {"comment": "pk"}})
        );
    }

    #[test]
    fn no_existing_extras_leaves_bags_empty() {
        let existing = Configuration::default().with_custom_name("old");
        let desired = Configuration::default()
            .with_custom_name("new")
            .with_column("id", "id");

        let merged = merge_configuration(&existing, &desired);

        assert_eq!(merged, desired);
        assert!(merged.additional_properties.is_empty());
        assert!(merged.custom_root_fields.additional_properties.is_empty());
    }

    #[test]
    fn merge_custom_root_fields_direct() {
        let existing: CustomRootFields =
            serde_json::from_value(json!({"select": "a", "future": 42})).unwrap();
        let desired = CustomRootFields {
            select: Some("b".to_string()),
            ..CustomRootFields::default()
        };

        let merged = merge_custom_root_fields(&existing, &desired);
        assert_eq!(merged.select.as_deref(), Some("b"));
        assert_eq!(merged.additional_properties["future"], json!(42));
    }

    #[test]
    fn relationship_union_keeps_desired_first() {
        let existing = vec![obj("A", "a_old"), obj("B", "b_id")];
        let desired = vec![obj("A", "a_id"), obj("C", "c_id")];

        let merged = merge_object_relationships(&existing, &desired);

        assert_eq!(names(&merged), vec!["A", "C", "B"]);
        // A comes from desired, untouched by the existing entry.
        assert_eq!(
            merged[0].using.foreign_key_constraint_on.columns(),
            vec!["a_id"]
        );
        assert_eq!(merged[2], existing[1]);
    }

    #[test]
    fn relationship_union_with_no_existing_is_desired() {
        let desired = vec![arr("children", "children"), arr("files", "files")];
        assert_eq!(merge_array_relationships(&[], &desired), desired);
    }

    #[test]
    fn relationship_union_with_no_desired_is_existing() {
        let existing = vec![arr("x", "x"), arr("y", "y")];
        assert_eq!(merge_array_relationships(&existing, &[]), existing);
    }
}
