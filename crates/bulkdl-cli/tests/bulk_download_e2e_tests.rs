//! End-to-end tests for the bulk download flow
//!
//! These tests drive a dialog session against a mock platform:
//! - Federated validation of consensus genome workflow runs
//! - Sample metadata saved locally without the generic endpoint
//! - Heatmap link presets for BIOM selections
//! - Server error messages surfaced on creation

use bulkdl_cli::api::ApiClient;
use bulkdl_cli::commands::open_dialog;
use bulkdl_cli::config::Config;
use bulkdl_cli::dialog::{BulkDownloadDialog, CreateStatus, DialogPhase};
use bulkdl_cli::dispatcher::{CreationDispatcher, CreationOutcome, DEFAULT_CREATION_ERROR};
use bulkdl_cli::fields::{FieldValue, ThresholdFilter};
use bulkdl_cli::selection::{EntitySelection, SelectedObject};
use bulkdl_cli::sinks::{FileCsvSink, RecordingAnalytics};
use bulkdl_common::{EntityId, WorkflowEntity, WorkflowKind};
use serde_json::json;
use wiremock::{
    matchers::{body_json, body_string_contains, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Helper to create a catalog response
fn catalog_response() -> serde_json::Value {
    json!([
        {
            "type": "sample_metadata",
            "display_name": "Sample Metadata",
            "category": "reports"
        },
        {
            "type": "biom_format",
            "display_name": "Combined Microbiome File",
            "category": "reports",
            "fields": [
                { "type": "filter_by", "display_name": "Filter By" },
                { "type": "metric", "display_name": "Metric" }
            ]
        },
        {
            "type": "contig_summary_report",
            "display_name": "Contig Summary Reports",
            "category": "reports"
        }
    ])
}

/// Mount the catalog, background and metric endpoints for `workflow`
async fn mount_catalogs(server: &MockServer, workflow: &str, catalog: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/bulk_downloads/types.json"))
        .and(query_param("workflow", workflow))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bulk_downloads/metrics.json"))
        .and(query_param("workflow", workflow))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "text": "NT rPM", "value": "NT.rpm" },
            { "text": "NT Z Score", "value": "NT.zscore" }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/backgrounds.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "backgrounds": [{ "id": 26, "name": "Default background", "mass_normalized": false }]
        })))
        .mount(server)
        .await;
}

/// Mount the legacy sample endpoints for two valid samples
async fn mount_sample_validation(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/samples/validate_sample_ids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "validIds": [1, 2],
            "invalidSampleNames": [],
            "error": null
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/samples/uploaded_by_current_user"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "uploaded_by_current_user": true })),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/samples/user_is_collaborator.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "user_is_collaborator": true })),
        )
        .mount(server)
        .await;
}

fn sample_selection() -> EntitySelection {
    EntitySelection::new(WorkflowKind::ShortReadMngs, WorkflowEntity::Samples)
        .with_objects([
            SelectedObject::new("1", "1", "sample one"),
            SelectedObject::new("2", "2", "sample two"),
        ])
        .with_current_user(Some(42))
}

async fn loaded_sample_dialog(server: &MockServer) -> (ApiClient, BulkDownloadDialog) {
    mount_catalogs(server, "short-read-mngs", catalog_response()).await;
    mount_sample_validation(server).await;

    let client = ApiClient::new(server.uri()).unwrap();
    let mut dialog = BulkDownloadDialog::new(sample_selection());
    assert_eq!(dialog.load(&client).await, &DialogPhase::Ready);
    (client, dialog)
}

// ============================================================================
// Validation Tests
// ============================================================================

#[tokio::test]
async fn test_background_availability_failure_keeps_dialog() {
    let server = MockServer::start().await;
    mount_catalogs(&server, "short-read-mngs", catalog_response()).await;
    mount_sample_validation(&server).await;

    Mock::given(method("POST"))
        .and(path("/samples/enable_mass_normalized_backgrounds.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();
    let dialog = open_dialog(&Config::default(), &client, sample_selection())
        .await
        .unwrap();

    assert_eq!(dialog.phase(), &DialogPhase::Ready);
    assert_eq!(dialog.mass_normalized_available(), None);
    assert_eq!(dialog.valid_ids(), [EntityId::new("1"), EntityId::new("2")]);
}

#[tokio::test]
async fn test_consensus_genome_runs_validated_through_federated_query() {
    let server = MockServer::start().await;
    mount_catalogs(&server, "consensus-genome", json!([])).await;

    Mock::given(method("POST"))
        .and(path("/graphqlfed"))
        .and(body_string_contains("fedWorkflowRuns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "fedWorkflowRuns": [
                    { "id": "run1", "ownerUserId": 42, "status": "SUCCEEDED" },
                    { "id": "run2", "ownerUserId": 42, "status": "FAILED" }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/workflow_runs/created_by_current_user"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "created_by_current_user": true })),
        )
        .mount(&server)
        .await;

    // collaborator status is never asked for workflow runs
    Mock::given(method("POST"))
        .and(path("/samples/user_is_collaborator.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let selection = EntitySelection::new(WorkflowKind::ConsensusGenome, WorkflowEntity::WorkflowRuns)
        .with_objects([
            SelectedObject::new("run1", "10", "sample one"),
            SelectedObject::new("run2", "20", "sample two"),
        ])
        .with_current_user(Some(42));

    let client = ApiClient::new(server.uri()).unwrap();
    let mut dialog = BulkDownloadDialog::new(selection);
    assert_eq!(dialog.load(&client).await, &DialogPhase::Ready);

    assert_eq!(dialog.valid_ids(), [EntityId::new("run1")]);
    assert_eq!(dialog.invalid_sample_names(), vec!["sample two"]);
    assert!(dialog.permissions().uploaded_all_objects);
    assert!(!dialog.permissions().collaborator_on_all_samples);
}

#[tokio::test]
async fn test_load_failure_applies_nothing() {
    let server = MockServer::start().await;
    mount_sample_validation(&server).await;

    Mock::given(method("GET"))
        .and(path("/bulk_downloads/types.json"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "catalog unavailable" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bulk_downloads/metrics.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/backgrounds.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "backgrounds": [] })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();
    let mut dialog = BulkDownloadDialog::new(sample_selection());

    assert_eq!(
        dialog.load(&client).await,
        &DialogPhase::Failed("catalog unavailable".to_string())
    );
    assert!(dialog.options().is_none());
    assert!(dialog.valid_ids().is_empty());
}

// ============================================================================
// Creation Tests
// ============================================================================

#[tokio::test]
async fn test_sample_metadata_saved_without_generic_creation() {
    let server = MockServer::start().await;
    let (client, mut dialog) = loaded_sample_dialog(&server).await;

    Mock::given(method("POST"))
        .and(path("/bulk_downloads/sample_metadata"))
        .and(body_json(json!({ "sampleIds": ["1", "2"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sample_metadata": [
                ["sample_name", "host", "collection_date"],
                ["sample one", "Human", null],
                ["sample two", "Mosquito", "2024-03"]
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/bulk_downloads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let csv = FileCsvSink::new(dir.path());
    let analytics = RecordingAnalytics::new();
    let dispatcher = CreationDispatcher::new(&client, &csv, &analytics);

    dialog.select_download_type("sample_metadata").unwrap();
    let status = dialog.submit(&dispatcher).await.clone();

    let expected = dir.path().join("sample_metadata.csv");
    assert_eq!(
        status,
        CreateStatus::Success(CreationOutcome::Saved {
            path: expected.clone()
        })
    );

    let content = std::fs::read_to_string(&expected).unwrap();
    assert_eq!(
        content,
        "sample_name,host,collection_date\nsample one,Human,\nsample two,Mosquito,2024-03\n"
    );
    assert!(analytics.events().is_empty());
}

#[tokio::test]
async fn test_generic_creation_error_shows_server_message() {
    let server = MockServer::start().await;
    let (client, mut dialog) = loaded_sample_dialog(&server).await;

    Mock::given(method("POST"))
        .and(path("/bulk_downloads"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "error": "quota exceeded" })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let csv = FileCsvSink::new(dir.path());
    let analytics = RecordingAnalytics::new();
    let dispatcher = CreationDispatcher::new(&client, &csv, &analytics);

    dialog.select_download_type("contig_summary_report").unwrap();
    let status = dialog.submit(&dispatcher).await.clone();

    assert_eq!(status, CreateStatus::Error("quota exceeded".to_string()));
    assert_ne!(status, CreateStatus::Error(DEFAULT_CREATION_ERROR.to_string()));
    assert!(analytics.events().is_empty());

    // picking another type clears the error
    dialog.select_download_type("sample_metadata").unwrap();
    assert_eq!(dialog.create_status(), &CreateStatus::Idle);
}

#[tokio::test]
async fn test_generic_creation_posts_assembled_request() {
    let server = MockServer::start().await;
    let (client, mut dialog) = loaded_sample_dialog(&server).await;

    Mock::given(method("POST"))
        .and(path("/bulk_downloads"))
        .and(body_json(json!({
            "downloadType": "contig_summary_report",
            "fields": {},
            "validObjectIds": ["1", "2"],
            "workflow": "short-read-mngs",
            "workflowEntity": "Samples"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let csv = FileCsvSink::new(dir.path());
    let analytics = RecordingAnalytics::new();
    let dispatcher = CreationDispatcher::new(&client, &csv, &analytics);

    dialog.select_download_type("contig_summary_report").unwrap();
    assert_eq!(
        dialog.submit(&dispatcher).await,
        &CreateStatus::Success(CreationOutcome::GenerationStarted { download_id: None })
    );

    let events = analytics.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].sample_ids, Some(vec!["1".to_string(), "2".to_string()]));
    assert_eq!(events[0].workflow_run_ids, None);
}

// ============================================================================
// Heatmap Tests
// ============================================================================

#[tokio::test]
async fn test_heatmap_presets_for_filters_and_sortable_metric() {
    let server = MockServer::start().await;
    let (client, mut dialog) = loaded_sample_dialog(&server).await;

    dialog.select_field(
        "biom_format",
        "filter_by",
        Some(FieldValue::ThresholdFilters(vec![ThresholdFilter::new(
            "NT_rpm", ">=", "10",
        )])),
        None,
    );
    dialog.select_field(
        "biom_format",
        "metric",
        Some(FieldValue::from("NT.rpm")),
        Some("NT rPM".to_string()),
    );

    let url = dialog.heatmap_url(client.base_url());
    assert!(url.starts_with(&format!("{}/visualizations/heatmap?", server.uri())));
    assert!(url.contains("presets[]=thresholdFilters"));
    assert!(url.contains("presets[]=metric"));
    assert!(url.contains("sampleIds[]=1&sampleIds[]=2"));
    assert!(url.contains("metric=true"));
}
