//! Scenario: Tracked Table Merges Customization
//!
//! # Invariants under test
//!
//! 1. An `already-tracked` answer is not a failure: the table is customized
//!    instead, with desired known fields over the stored configuration.
//! 2. Fields the gateway stored that are not modelled (at the configuration
//!    level and inside `custom_root_fields`) survive the update.
//! 3. A stored configuration that does not parse is replaced by the desired
//!    one and counted, without failing the run.
//! 4. A tracked table with no stored configuration gets the desired one.

use hmeta_runtime::Reconciler;
use hmeta_testkit::fixtures::{self, SOURCE};
use hmeta_testkit::ScriptedGateway;
use serde_json::{json, Value};

fn customization_request(gw: &ScriptedGateway) -> Value {
    gw.requests()
        .into_iter()
        .find(|r| r["type"] == "pg_set_table_customization")
        .unwrap()
}

#[tokio::test]
async fn stored_extras_survive_customization() {
    let gw = ScriptedGateway::new().with_tracked_table(
        SOURCE,
        fixtures::files(),
        Some(json!({
            "custom_name": "legacyFiles",
            "custom_root_fields": {
                "select": "legacyFiles",
                "select_stream": "filesStream"
            },
            "custom_column_names": {"legacy_col": "legacyCol"},
            "column_config": {"legacy_col": {"comment": "kept"}},
            "comment": "owned by someone else"
        })),
        vec![fixtures::raw_object_relationship("bucket", "bucket_id")],
        vec![],
    );
    let reconciler = Reconciler::new(gw.clone(), SOURCE);
    let catalog = vec![fixtures::storage_catalog(SOURCE).remove(1)];

    let report = reconciler.converge(&catalog).await.unwrap();

    assert_eq!(
        gw.request_types(),
        vec![
            "export_metadata",
            "pg_track_table",
            "pg_set_table_customization",
        ]
    );
    assert_eq!(report.baseline_tables, 1);
    assert_eq!(report.tables_tracked, 0);
    assert_eq!(report.tables_already_tracked, 1);
    assert_eq!(report.tables_customized, 1);
    assert_eq!(report.relationships_created, 0);

    let sent = customization_request(&gw);
    assert_eq!(sent["args"]["source"], json!(SOURCE));
    assert_eq!(
        sent["args"]["table"],
        json!({"schema": "storage", "name": "files"})
    );

    let cfg = gw.configuration_of(SOURCE, &fixtures::files()).unwrap();
    assert_eq!(cfg, sent["args"]["configuration"]);

    // Desired known fields win.
    assert_eq!(cfg["custom_name"], json!("files"));
    assert_eq!(cfg["custom_root_fields"]["select"], json!("files"));
    assert_eq!(cfg["custom_root_fields"]["delete_by_pk"], json!("deleteFile"));
    assert_eq!(cfg["custom_column_names"]["bucket_id"], json!("bucketId"));
    assert!(cfg["custom_column_names"].get("legacy_col").is_none());

    // Unmodelled fields are carried over.
    assert_eq!(cfg["custom_root_fields"]["select_stream"], json!("filesStream"));
    assert_eq!(cfg["column_config"], json!({"legacy_col": {"comment": "kept"}}));
    assert_eq!(cfg["comment"], json!("owned by someone else"));
}

#[tokio::test]
async fn unparseable_stored_configuration_is_overwritten() {
    let gw = ScriptedGateway::new().with_tracked_table(
        SOURCE,
        fixtures::files(),
        Some(json!({"custom_root_fields": "not an object", "comment": "lost"})),
        vec![],
        vec![],
    );
    let reconciler = Reconciler::new(gw.clone(), SOURCE);
    let catalog = vec![fixtures::storage_catalog(SOURCE).remove(1)];

    let report = reconciler.converge(&catalog).await.unwrap();

    assert_eq!(report.unparseable_configurations, 1);
    assert_eq!(report.tables_customized, 1);

    let cfg = gw.configuration_of(SOURCE, &fixtures::files()).unwrap();
    assert_eq!(cfg, serde_json::to_value(&catalog[0].configuration).unwrap());
    assert!(cfg.get("comment").is_none());

    // The relationship is still created afterwards.
    assert_eq!(report.relationships_created, 1);
    let (object, _) = gw.relationship_names(SOURCE, &fixtures::files());
    assert_eq!(object, vec!["bucket"]);
}

#[tokio::test]
async fn tracked_table_without_configuration_gets_desired() {
    let gw = ScriptedGateway::new().with_tracked_table(
        SOURCE,
        fixtures::virus(),
        None,
        vec![],
        vec![],
    );
    let reconciler = Reconciler::new(gw.clone(), SOURCE);
    let catalog = vec![fixtures::storage_catalog(SOURCE).remove(2)];

    let report = reconciler.converge(&catalog).await.unwrap();

    assert_eq!(report.unparseable_configurations, 0);
    assert_eq!(report.tables_customized, 1);
    assert_eq!(
        customization_request(&gw)["args"]["configuration"],
        serde_json::to_value(&catalog[0].configuration).unwrap()
    );
}

#[tokio::test]
async fn other_sources_do_not_form_the_baseline() {
    // Same table tracked in another source with extras; the target source
    // has it tracked with no configuration.
    let gw = ScriptedGateway::new()
        .with_tracked_table(
            "analytics",
            fixtures::files(),
            Some(json!({"comment": "analytics only"})),
            vec![],
            vec![],
        )
        .with_tracked_table(SOURCE, fixtures::files(), None, vec![], vec![]);
    let reconciler = Reconciler::new(gw.clone(), SOURCE);
    let catalog = vec![fixtures::storage_catalog(SOURCE).remove(1)];

    let report = reconciler.converge(&catalog).await.unwrap();

    assert_eq!(report.baseline_tables, 1);
    let cfg = gw.configuration_of(SOURCE, &fixtures::files()).unwrap();
    assert!(cfg.get("comment").is_none());
    assert_eq!(
        gw.configuration_of("analytics", &fixtures::files()).unwrap(),
        json!({"comment": "analytics only"})
    );
}
