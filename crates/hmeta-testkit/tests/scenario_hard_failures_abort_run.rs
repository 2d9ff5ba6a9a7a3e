//! Scenario: Hard Failures Abort Run
//!
//! # Invariants under test
//!
//! 1. A track failure other than `already-tracked` stops the run: no later
//!    table is tracked and no relationship is created.
//! 2. A customization failure stops the run the same way.
//! 3. A relationship failure other than `already-exists` stops the run and
//!    names the table, the relationship kind and the relationship name.
//! 4. Work done before the failure is not rolled back.

use hmeta_runtime::{ConvergeError, Phase, Reconciler};
use hmeta_schemas::RelationshipKind;
use hmeta_testkit::fixtures::{self, SOURCE};
use hmeta_testkit::{Rule, ScriptedGateway};
use hmeta_transport::TransportError;
use serde_json::json;

#[tokio::test]
async fn track_failure_stops_everything_after_it() {
    let gw = ScriptedGateway::new().with_rule(
        Rule::on("pg_track_table")
            .for_table(fixtures::files())
            .respond(
                400,
                json!({
                    "path": "$.args",
                    "error": "no such table/view exists in source: \"storage.files\"",
                    "code": "not-exists"
                }),
            ),
    );
    let reconciler = Reconciler::new(gw.clone(), SOURCE);

    let err = reconciler
        .converge(&fixtures::storage_catalog(SOURCE))
        .await
        .unwrap_err();

    assert_eq!(
        gw.request_types(),
        vec!["export_metadata", "pg_track_table", "pg_track_table"]
    );
    assert_eq!(err.phase(), Some(Phase::Track));
    assert_eq!(err.table(), Some(&fixtures::files()));
    assert!(matches!(
        err.transport_error(),
        Some(TransportError::Gateway { status: 400, .. })
    ));
    assert!(err.to_string().contains("storage.files"));

    // buckets was tracked before the failure and stays tracked.
    assert!(gw.is_tracked(SOURCE, &fixtures::buckets()));
    assert!(!gw.is_tracked(SOURCE, &fixtures::virus()));
}

#[tokio::test]
async fn unstructured_track_failure_keeps_status_and_body() {
    let gw = ScriptedGateway::new().with_rule(
        Rule::on("pg_track_table").respond_raw(502, "<html>bad gateway</html>"),
    );
    let reconciler = Reconciler::new(gw.clone(), SOURCE);

    let err = reconciler
        .converge(&fixtures::storage_catalog(SOURCE))
        .await
        .unwrap_err();

    assert_eq!(err.table(), Some(&fixtures::buckets()));
    assert_eq!(
        err.transport_error(),
        Some(&TransportError::Unexpected {
            status: 502,
            body: "<html>bad gateway</html>".to_string(),
        })
    );
}

#[tokio::test]
async fn customization_failure_stops_run() {
    let gw = ScriptedGateway::new()
        .with_tracked_table(SOURCE, fixtures::buckets(), None, vec![], vec![])
        .with_rule(Rule::on("pg_set_table_customization").respond(
            400,
            json!({"path": "$.args", "error": "invalid configuration", "code": "invalid-configuration"}),
        ));
    let reconciler = Reconciler::new(gw.clone(), SOURCE);

    let err = reconciler
        .converge(&fixtures::storage_catalog(SOURCE))
        .await
        .unwrap_err();

    assert_eq!(err.phase(), Some(Phase::Customize));
    assert_eq!(err.table(), Some(&fixtures::buckets()));
    assert_eq!(
        gw.request_types(),
        vec![
            "export_metadata",
            "pg_track_table",
            "pg_set_table_customization",
        ]
    );
}

#[tokio::test]
async fn relationship_failure_names_table_and_relationship() {
    let gw = ScriptedGateway::new().with_rule(
        Rule::on("pg_create_object_relationship")
            .for_relationship("bucket")
            .respond(
                400,
                json!({
                    "path": "$.args.using",
                    "error": "no foreign constraint exists on the given column",
                    "code": "constraint-error"
                }),
            ),
    );
    let reconciler = Reconciler::new(gw.clone(), SOURCE);

    let err = reconciler
        .converge(&fixtures::storage_catalog(SOURCE))
        .await
        .unwrap_err();

    match &err {
        ConvergeError::CreateRelationship {
            table, kind, name, ..
        } => {
            assert_eq!(table, &fixtures::files());
            assert_eq!(*kind, RelationshipKind::Object);
            assert_eq!(name, "bucket");
        }
        other => panic!("unexpected error: {other}"),
    }
    let msg = err.to_string();
    assert!(msg.contains("bucket"));
    assert!(msg.contains("storage.files"));

    // All tables were tracked; the virus relationship was never attempted.
    assert_eq!(
        gw.request_types(),
        vec![
            "export_metadata",
            "pg_track_table",
            "pg_track_table",
            "pg_track_table",
            "pg_create_array_relationship",
            "pg_create_object_relationship",
        ]
    );
    let (object, _) = gw.relationship_names(SOURCE, &fixtures::virus());
    assert!(object.is_empty());
}
