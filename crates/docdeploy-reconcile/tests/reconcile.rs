use std::fs;
use std::sync::Arc;

use docdeploy_client::{ClientError, DynClient};
use docdeploy_client_memory::{ClientCall, ClientOperation, InMemoryClient};
use docdeploy_core::{IndexingMode, Schema};
use docdeploy_reconcile::{
    ContentResolver, Decision, FsContentResolver, ReconcileError, ReconcileMode, Reconciler,
    ResolveError, ResourceKind, StaticContentResolver,
};

const ONE_OF_EACH: &str = r#"{
    "Databases": [
        {
            "DatabaseName": "D1",
            "Collections": [
                {
                    "CollectionName": "C1",
                    "PartitionKey": "/pk",
                    "OfferThroughput": 400,
                    "IndexingPolicy": {
                        "automatic": true,
                        "indexingMode": "consistent",
                        "includedPaths": [
                            {"path": "/*", "indexes": [
                                {"kind": "Range", "dataType": "String", "precision": -1}
                            ]}
                        ],
                        "excludedPaths": []
                    },
                    "StoredProcedures": [{"StoredProcedureName": "SP1"}]
                }
            ]
        }
    ]
}"#;

fn schema() -> Schema {
    Schema::from_json_str(ONE_OF_EACH).expect("valid schema")
}

fn reconciler(client: &Arc<InMemoryClient>, resolver: impl ContentResolver + 'static) -> Reconciler {
    let client: DynClient = client.clone();
    Reconciler::new(client, Arc::new(resolver))
}

fn seed_all(client: &InMemoryClient, body: &str) {
    client.seed_database("D1");
    client.seed_collection("D1", "C1", "/pk");
    client.seed_stored_procedure("D1", "C1", "SP1", body);
}

#[tokio::test]
async fn test_creates_everything_on_empty_account() {
    let client = Arc::new(InMemoryClient::new());
    let resolver = StaticContentResolver::new().with_body("SP1", "function(){}");

    let report = reconciler(&client, resolver)
        .reconcile(&schema())
        .await
        .expect("reconcile");

    let mutations = client.mutating_calls().await;
    assert_eq!(mutations.len(), 3);
    assert_eq!(
        mutations[0],
        ClientCall::CreateDatabase {
            database: "D1".into()
        }
    );
    match &mutations[1] {
        ClientCall::CreateCollection { database, spec } => {
            assert_eq!(database, "D1");
            assert_eq!(spec.id, "C1");
            assert_eq!(spec.offer_throughput, 400);
            assert!(spec.partition_key.is_single_path("/pk"));
            assert_eq!(spec.indexing_policy.indexing_mode, IndexingMode::Consistent);
            assert_eq!(spec.indexing_policy.included_paths[0].path, "/*");
            assert_eq!(
                spec.indexing_policy.included_paths[0].indexes[0].precision,
                Some(-1)
            );
        }
        other => panic!("expected collection create, got {other:?}"),
    }
    match &mutations[2] {
        ClientCall::CreateStoredProcedure {
            database,
            collection,
            spec,
        } => {
            assert_eq!((database.as_str(), collection.as_str()), ("D1", "C1"));
            assert_eq!(spec.id, "SP1");
            assert_eq!(spec.body, "function(){}");
        }
        other => panic!("expected stored procedure create, got {other:?}"),
    }

    assert_eq!(report.created(), 3);
    assert_eq!(
        report.actions.iter().map(|a| a.kind).collect::<Vec<_>>(),
        vec![
            ResourceKind::Database,
            ResourceKind::Collection,
            ResourceKind::StoredProcedure
        ]
    );
    assert_eq!(client.collection("D1", "C1").unwrap().offer_throughput, Some(400));
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let client = Arc::new(InMemoryClient::new());
    let resolver = StaticContentResolver::new().with_body("SP1", "function(){}");
    let reconciler = reconciler(&client, resolver);

    reconciler.reconcile(&schema()).await.expect("first run");
    client.clear_calls().await;

    let report = reconciler.reconcile(&schema()).await.expect("second run");
    assert!(client.mutating_calls().await.is_empty());
    assert!(report.is_noop());
    assert_eq!(report.unchanged(), 3);
}

#[tokio::test]
async fn test_changed_body_issues_single_update() {
    let client = Arc::new(InMemoryClient::new());
    seed_all(&client, "function(){}");
    let resolver = StaticContentResolver::new().with_body("SP1", "function(x,y){}");

    let report = reconciler(&client, resolver)
        .reconcile(&schema())
        .await
        .expect("reconcile");

    let mutations = client.mutating_calls().await;
    assert_eq!(mutations.len(), 1);
    match &mutations[0] {
        ClientCall::UpdateStoredProcedure { spec, .. } => {
            assert_eq!(spec.id, "SP1");
            assert_eq!(spec.body, "function(x,y){}");
        }
        other => panic!("expected update, got {other:?}"),
    }
    assert_eq!(report.updated(), 1);
    assert_eq!(
        client.stored_procedure_body("D1", "C1", "SP1").as_deref(),
        Some("function(x,y){}")
    );
}

#[tokio::test]
async fn test_matching_body_modulo_line_endings_is_noop() {
    let client = Arc::new(InMemoryClient::new());
    seed_all(&client, "function () {\n  return 1;\n}\n");
    let resolver =
        StaticContentResolver::new().with_body("SP1", "function () {\r\n  return 1;\r\n}\r\n");

    let report = reconciler(&client, resolver)
        .reconcile(&schema())
        .await
        .expect("reconcile");

    assert!(client.mutating_calls().await.is_empty());
    let sp = report.actions.last().unwrap();
    assert_eq!(sp.path, "dbs/D1/colls/C1/sprocs/SP1");
    assert_eq!(sp.decision, Decision::Unchanged);
}

#[tokio::test]
async fn test_existing_collection_is_never_modified() {
    let client = Arc::new(InMemoryClient::new());
    client.seed_database("D1");
    client.seed_collection("D1", "C1", "/otherKey");
    client.seed_stored_procedure("D1", "C1", "SP1", "function(){}");
    let resolver = StaticContentResolver::new().with_body("SP1", "function(){}");

    reconciler(&client, resolver)
        .reconcile(&schema())
        .await
        .expect("reconcile");

    assert!(client.mutating_calls().await.is_empty());
    let entry = client.collection("D1", "C1").unwrap();
    assert!(entry.resource.partition_key.is_single_path("/otherKey"));
}

#[tokio::test]
async fn test_ambiguous_content_aborts_before_procedure_and_later_siblings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("SP1.js"), "function(){}").unwrap();
    fs::write(dir.path().join("SP1.old.js"), "function(){ /* old */ }").unwrap();
    fs::write(dir.path().join("SP2.js"), "function(){}").unwrap();

    let schema = Schema::from_json_str(
        r#"{"Databases": [
            {"DatabaseName": "D1", "Collections": [
                {"CollectionName": "C1", "PartitionKey": "/pk", "OfferThroughput": 400,
                 "StoredProcedures": [{"StoredProcedureName": "SP1"}, {"StoredProcedureName": "SP2"}]}
            ]},
            {"DatabaseName": "D2"}
        ]}"#,
    )
    .unwrap();

    let client = Arc::new(InMemoryClient::new());
    let err = reconciler(&client, FsContentResolver::new(dir.path()))
        .reconcile(&schema)
        .await
        .expect_err("ambiguous content must abort");

    match err {
        ReconcileError::Resolve {
            path,
            source: ResolveError::AmbiguousContent { matches, .. },
        } => {
            assert_eq!(path, "dbs/D1/colls/C1/sprocs/SP1");
            assert_eq!(matches.len(), 2);
        }
        other => panic!("expected ambiguous content, got {other:?}"),
    }

    let calls = client.calls().await;
    assert!(!calls.iter().any(|c| matches!(
        c.operation(),
        ClientOperation::GetStoredProcedure
            | ClientOperation::CreateStoredProcedure
            | ClientOperation::UpdateStoredProcedure
    )));
    assert!(!calls.iter().any(|c| c.database() == Some("D2")));
    // Earlier siblings stay applied.
    assert!(client.has_database("D1"));
    assert!(client.collection("D1", "C1").is_some());
}

#[tokio::test]
async fn test_missing_content_aborts() {
    let client = Arc::new(InMemoryClient::new());
    let err = reconciler(&client, StaticContentResolver::new())
        .reconcile(&schema())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::Resolve {
            source: ResolveError::ContentNotFound { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_missing_account_aborts_before_any_resource_call() {
    let client = Arc::new(InMemoryClient::without_account());
    let resolver = StaticContentResolver::new().with_body("SP1", "function(){}");

    let err = reconciler(&client, resolver)
        .reconcile(&schema())
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::AccountNotFound { .. }));
    assert_eq!(client.calls().await, vec![ClientCall::GetAccount]);
}

#[tokio::test]
async fn test_lookup_transport_failure_is_not_treated_as_absent() {
    let client = Arc::new(InMemoryClient::new());
    client.seed_database("D1");
    client.fail_on(ClientOperation::GetCollection, "dbs/D1/colls/C1");
    let resolver = StaticContentResolver::new().with_body("SP1", "function(){}");

    let err = reconciler(&client, resolver)
        .reconcile(&schema())
        .await
        .unwrap_err();

    match err {
        ReconcileError::Lookup { path, source } => {
            assert_eq!(path, "dbs/D1/colls/C1");
            assert!(matches!(source, ClientError::Connection { .. }));
        }
        other => panic!("expected lookup error, got {other:?}"),
    }
    assert!(client.mutating_calls().await.is_empty());
}

#[tokio::test]
async fn test_create_failure_aborts_with_create_error() {
    let client = Arc::new(InMemoryClient::new());
    client.fail_on(ClientOperation::CreateDatabase, "dbs/D1");
    let resolver = StaticContentResolver::new().with_body("SP1", "function(){}");

    let err = reconciler(&client, resolver)
        .reconcile(&schema())
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::Create { ref path, .. } if path == "dbs/D1"));
    assert!(
        !client
            .calls()
            .await
            .iter()
            .any(|c| c.operation() == ClientOperation::GetCollection)
    );
}

#[tokio::test]
async fn test_dry_run_reports_without_mutating() {
    let client = Arc::new(InMemoryClient::new());
    let resolver = StaticContentResolver::new().with_body("SP1", "function(){}");

    let report = reconciler(&client, resolver)
        .with_mode(ReconcileMode::DryRun)
        .reconcile(&schema())
        .await
        .expect("dry run");

    assert!(client.mutating_calls().await.is_empty());
    assert_eq!(report.mode, ReconcileMode::DryRun);
    assert_eq!(report.created(), 3);
    // Children of a pending database are not looked up.
    assert!(
        !client
            .calls()
            .await
            .iter()
            .any(|c| c.operation() == ClientOperation::GetCollection)
    );
}

#[tokio::test]
async fn test_dry_run_matches_apply_decisions() {
    let client = Arc::new(InMemoryClient::new());
    seed_all(&client, "function(){}");
    let body = "function(a){}";

    let planned = reconciler(&client, StaticContentResolver::new().with_body("SP1", body))
        .with_mode(ReconcileMode::DryRun)
        .reconcile(&schema())
        .await
        .unwrap();
    assert!(client.mutating_calls().await.is_empty());

    let applied = reconciler(&client, StaticContentResolver::new().with_body("SP1", body))
        .reconcile(&schema())
        .await
        .unwrap();

    assert_eq!(planned.actions, applied.actions);
    assert_eq!(applied.updated(), 1);
}

#[tokio::test]
async fn test_report_serializes_for_machine_output() {
    let client = Arc::new(InMemoryClient::new());
    let resolver = StaticContentResolver::new().with_body("SP1", "function(){}");
    let report = reconciler(&client, resolver)
        .reconcile(&schema())
        .await
        .unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["mode"], "apply");
    assert_eq!(value["actions"][0]["kind"], "database");
    assert_eq!(value["actions"][0]["decision"], "create");
    assert_eq!(value["actions"][2]["path"], "dbs/D1/colls/C1/sprocs/SP1");
}

fn created_path(call: &ClientCall) -> String {
    match call {
        ClientCall::CreateDatabase { database } => database.clone(),
        ClientCall::CreateCollection { database, spec } => format!("{database}/{}", spec.id),
        ClientCall::CreateStoredProcedure {
            database,
            collection,
            spec,
        } => format!("{database}/{collection}/{}", spec.id),
        other => panic!("unexpected mutating call {other:?}"),
    }
}

#[tokio::test]
async fn test_creates_follow_document_order() {
    let collection = |name: &str| {
        format!(
            r#"{{
                "CollectionName": "{name}",
                "PartitionKey": "/pk",
                "OfferThroughput": 400,
                "StoredProcedures": [
                    {{"StoredProcedureName": "SP1"}},
                    {{"StoredProcedureName": "SP2"}}
                ]
            }}"#
        )
    };
    // D2 comes first in the document to rule out sorted traversal.
    let json = format!(
        r#"{{"Databases": [
            {{"DatabaseName": "D2", "Collections": [{}, {}]}},
            {{"DatabaseName": "D1", "Collections": [{}, {}]}}
        ]}}"#,
        collection("C2"),
        collection("C1"),
        collection("C1"),
        collection("C2"),
    );
    let schema = Schema::from_json_str(&json).expect("valid schema");

    let client = Arc::new(InMemoryClient::new());
    let resolver = StaticContentResolver::new()
        .with_body("SP1", "function(){}")
        .with_body("SP2", "function(){ return 2; }");
    let report = reconciler(&client, resolver)
        .reconcile(&schema)
        .await
        .expect("reconcile");

    let created: Vec<String> = client
        .mutating_calls()
        .await
        .iter()
        .map(created_path)
        .collect();
    assert_eq!(
        created,
        vec![
            "D2",
            "D2/C2",
            "D2/C2/SP1",
            "D2/C2/SP2",
            "D2/C1",
            "D2/C1/SP1",
            "D2/C1/SP2",
            "D1",
            "D1/C1",
            "D1/C1/SP1",
            "D1/C1/SP2",
            "D1/C2",
            "D1/C2/SP1",
            "D1/C2/SP2",
        ]
    );

    let reported: Vec<&str> = report.actions.iter().map(|a| a.path.as_str()).collect();
    assert_eq!(reported.len(), 14);
    assert_eq!(reported[0], "dbs/D2");
    assert_eq!(reported[1], "dbs/D2/colls/C2");
    assert_eq!(reported[2], "dbs/D2/colls/C2/sprocs/SP1");
    assert_eq!(reported[7], "dbs/D1");
    assert_eq!(report.created(), 14);
}
