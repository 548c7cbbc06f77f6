//! End-to-end workflow tests against a mock backend.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parsepilot_client::{ApiClient, ExportFormat, PollSettings, ScrapeProgress};
use parsepilot_core::Stage;
use parsepilot_workflow::{Workflow, WorkflowError};

fn fast_settings() -> PollSettings {
    PollSettings::new(Duration::from_millis(5))
}

async fn start_workflow(server: &MockServer) -> Workflow {
    let api = ApiClient::new(Url::parse(&server.uri()).expect("mock server uri"));
    Workflow::start(
        api,
        fast_settings(),
        Url::parse("https://shop.example/catalog").expect("source url"),
        true,
    )
    .await
    .expect("analysis start ok")
}

// ----------------------------------------------------------------------
// Backend fixtures
// ----------------------------------------------------------------------

async fn mount_analysis_start(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/analyze/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t-1"})))
        .mount(server)
        .await;
}

/// Analysis polls PENDING once, then SUCCESS with session `s-1`.
async fn mount_analysis_success(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/analyze/status/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t-1",
            "status": "PENDING"
        })))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/analyze/status/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t-1",
            "status": "SUCCESS",
            "session_id": "s-1"
        })))
        .mount(server)
        .await;
}

async fn mount_candidates(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/analyze/candidates/s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "s-1",
            "candidates": [
                {"id": 1, "container_selector": "li.row", "count": 5},
                {"id": 2, "container_selector": "div.card", "count": 12}
            ]
        })))
        .mount(server)
        .await;
}

/// Accepts the container choice and serves the three-field set for it.
async fn mount_container_selection(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/analyze/select-container"))
        .and(body_json(json!({
            "session_id": "s-1",
            "container_selector": "div.card"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/analyze/fields/s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "s-1",
            "fields": [
                {"name": "title", "selector": "h2", "type": "text"},
                {"name": "price", "selector": ".price", "type": "number"},
                {"name": "link", "selector": "a", "type": "link", "attribute": "href"}
            ]
        })))
        .mount(server)
        .await;
}

async fn workflow_at_candidate_selection(server: &MockServer) -> Workflow {
    mount_analysis_start(server).await;
    mount_analysis_success(server).await;
    mount_candidates(server).await;

    let mut workflow = start_workflow(server).await;
    workflow.await_analysis().await.expect("analysis ok");
    assert_eq!(workflow.session().stage(), Stage::CandidateSelection);
    workflow
}

async fn workflow_at_field_selection(server: &MockServer) -> Workflow {
    mount_container_selection(server).await;
    let mut workflow = workflow_at_candidate_selection(server).await;
    workflow.select_candidate(2).await.expect("selection ok");
    assert_eq!(workflow.session().stage(), Stage::FieldSelection);
    workflow
}

// ----------------------------------------------------------------------
// Happy path
// ----------------------------------------------------------------------

#[tokio::test]
async fn full_wizard_reaches_results_ready() {
    let server = MockServer::start().await;
    let mut workflow = workflow_at_field_selection(&server).await;

    // Exclude the price column; the saved config must carry exactly the
    // remaining fields, in server order.
    workflow.set_field_included(".price", false).expect("edit ok");
    Mock::given(method("POST"))
        .and(path("/configs/"))
        .and(body_json(json!({
            "domain": "shop.example",
            "url_pattern": "https://shop.example/catalog?page={page}",
            "config": {
                "container_selector": "div.card",
                "fields": [
                    {"name": "title", "selector": "h2", "type": "text"},
                    {"name": "link", "selector": "a", "type": "link", "attribute": "href"}
                ]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "domain": "shop.example",
            "url_pattern": "https://shop.example/catalog?page={page}",
            "config": {
                "container_selector": "div.card",
                "fields": [
                    {"name": "title", "selector": "h2", "type": "text"},
                    {"name": "link", "selector": "a", "type": "link", "attribute": "href"}
                ]
            },
            "created_at": "2024-05-01T12:30:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    workflow
        .save_config(Some("https://shop.example/catalog?page={page}".to_string()))
        .await
        .expect("save ok");
    assert_eq!(workflow.session().stage(), Stage::ConfigSaved);

    // No explicit start URL: the workflow prefills page 1 from the pattern.
    Mock::given(method("POST"))
        .and(path("/scrape/start"))
        .and(body_json(json!({
            "config_id": 7,
            "start_url": "https://shop.example/catalog?page=1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t-2"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/scrape/status/t-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t-2",
            "status": "PROCESSING",
            "pages_processed": 1,
            "items_count": 10
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/scrape/status/t-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t-2",
            "status": "SUCCESS",
            "pages_processed": 1,
            "items_count": 2
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/scrape/result/t-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t-2",
            "data": [
                {"title": "Alpha", "link": "https://shop.example/p/1"},
                {"title": "Beta", "link": "https://shop.example/p/2"}
            ],
            "total_items": 2
        })))
        .mount(&server)
        .await;

    workflow.start_scrape(None, None).await.expect("scrape start ok");
    assert_eq!(workflow.session().stage(), Stage::ScrapeRunning);

    let mut seen = Vec::new();
    workflow
        .await_scrape(|progress| seen.push(progress))
        .await
        .expect("scrape ok");

    assert_eq!(workflow.session().stage(), Stage::ResultsReady);
    assert_eq!(
        seen,
        vec![ScrapeProgress {
            pages_processed: Some(1),
            items_count: Some(10)
        }]
    );
    let result = workflow.result().expect("result present");
    assert_eq!(result.total_items, 2);
    assert_eq!(result.data[0]["title"], "Alpha");
    assert_eq!(result.data[1]["title"], "Beta");
}

#[tokio::test]
async fn export_downloads_after_results() {
    let server = MockServer::start().await;
    let mut workflow = workflow_at_field_selection(&server).await;

    Mock::given(method("POST"))
        .and(path("/configs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "domain": "shop.example",
            "config": {"container_selector": "div.card", "fields": []},
            "created_at": "2024-05-01T12:30:00Z"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/scrape/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t-2"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/scrape/status/t-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t-2",
            "status": "SUCCESS"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/scrape/result/t-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t-2",
            "data": [],
            "total_items": 0
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/scrape/export/t-2"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"[]".to_vec(), "application/json"))
        .mount(&server)
        .await;

    workflow.save_config(None).await.expect("save ok");
    workflow
        .start_scrape(Some("https://shop.example/catalog".to_string()), None)
        .await
        .expect("scrape start ok");
    workflow.await_scrape(|_| {}).await.expect("scrape ok");

    let payload = workflow.export(ExportFormat::Json).await.expect("export ok");
    assert_eq!(payload.bytes, b"[]");
    assert_eq!(payload.content_type.as_deref(), Some("application/json"));
    // Export is read-only: the session stays terminal-successful.
    assert_eq!(workflow.session().stage(), Stage::ResultsReady);
}

// ----------------------------------------------------------------------
// Fatal failures
// ----------------------------------------------------------------------

#[tokio::test]
async fn scrape_failure_fails_session_and_never_fetches_result() {
    let server = MockServer::start().await;
    let mut workflow = workflow_at_field_selection(&server).await;

    Mock::given(method("POST"))
        .and(path("/configs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "domain": "shop.example",
            "config": {"container_selector": "div.card", "fields": []},
            "created_at": "2024-05-01T12:30:00Z"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/scrape/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t-2"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/scrape/status/t-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t-2",
            "status": "FAILURE",
            "error": "blocked"
        })))
        .mount(&server)
        .await;
    // A failed run has no result to fetch.
    Mock::given(method("GET"))
        .and(path("/scrape/result/t-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t-2",
            "data": [],
            "total_items": 0
        })))
        .expect(0)
        .mount(&server)
        .await;

    workflow.save_config(None).await.expect("save ok");
    workflow
        .start_scrape(Some("https://shop.example/catalog".to_string()), None)
        .await
        .expect("scrape start ok");

    let err = workflow.await_scrape(|_| {}).await.expect_err("must fail");
    assert!(matches!(err, WorkflowError::TaskFailure(message) if message == "blocked"));
    assert_eq!(workflow.session().stage(), Stage::Failed);
    assert_eq!(workflow.session().error(), Some("blocked"));
}

#[tokio::test]
async fn analysis_failure_fails_session_without_touching_candidates() {
    let server = MockServer::start().await;
    mount_analysis_start(&server).await;
    Mock::given(method("GET"))
        .and(path("/analyze/status/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t-1",
            "status": "FAILURE",
            "error": "page unreachable"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/analyze/candidates/s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "s-1",
            "candidates": []
        })))
        .expect(0)
        .mount(&server)
        .await;

    let mut workflow = start_workflow(&server).await;
    let err = workflow.await_analysis().await.expect_err("must fail");

    assert!(matches!(err, WorkflowError::TaskFailure(message) if message == "page unreachable"));
    assert_eq!(workflow.session().stage(), Stage::Failed);
    assert_eq!(workflow.session().error(), Some("page unreachable"));
    assert!(workflow.session().session_id().is_none());
}

#[tokio::test]
async fn transport_error_during_status_poll_is_fatal() {
    let server = MockServer::start().await;
    mount_analysis_start(&server).await;
    Mock::given(method("GET"))
        .and(path("/analyze/status/t-1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut workflow = start_workflow(&server).await;
    let err = workflow.await_analysis().await.expect_err("must fail");

    assert!(matches!(err, WorkflowError::Transport(_)));
    assert!(!err.is_recoverable());
    assert_eq!(workflow.session().stage(), Stage::Failed);
    assert!(workflow.session().error().is_some());
}

// ----------------------------------------------------------------------
// Recoverable errors
// ----------------------------------------------------------------------

#[tokio::test]
async fn unknown_candidate_is_recoverable() {
    let server = MockServer::start().await;
    mount_container_selection(&server).await;
    let mut workflow = workflow_at_candidate_selection(&server).await;

    let err = workflow.select_candidate(99).await.expect_err("unknown id");
    assert!(matches!(err, WorkflowError::Selection(_)));
    assert!(err.is_recoverable());
    assert_eq!(workflow.session().stage(), Stage::CandidateSelection);
    assert_eq!(workflow.session().candidates().len(), 2);

    // The same session accepts a corrected choice.
    workflow.select_candidate(2).await.expect("retry ok");
    assert_eq!(workflow.session().stage(), Stage::FieldSelection);
    assert_eq!(workflow.session().chosen_selector(), Some("div.card"));
}

#[tokio::test]
async fn all_excluded_selection_is_recoverable() {
    let server = MockServer::start().await;
    let mut workflow = workflow_at_field_selection(&server).await;
    // Only the successful save may reach the backend.
    Mock::given(method("POST"))
        .and(path("/configs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9,
            "domain": "shop.example",
            "config": {"container_selector": "div.card", "fields": []},
            "created_at": "2024-05-01T12:30:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    workflow.set_field_included("h2", false).expect("edit ok");
    workflow.set_field_included(".price", false).expect("edit ok");
    workflow.set_field_included("a", false).expect("edit ok");

    let err = workflow.save_config(None).await.expect_err("empty selection");
    assert!(matches!(err, WorkflowError::Selection(_)));
    assert!(err.is_recoverable());
    assert_eq!(workflow.session().stage(), Stage::FieldSelection);

    workflow.set_field_included("h2", true).expect("edit ok");
    workflow.save_config(None).await.expect("save ok");
    assert_eq!(workflow.session().stage(), Stage::ConfigSaved);
}

#[tokio::test]
async fn start_scrape_without_pattern_needs_explicit_url() {
    let server = MockServer::start().await;
    let mut workflow = workflow_at_field_selection(&server).await;
    // Saved without a URL pattern, so there is nothing to prefill from.
    Mock::given(method("POST"))
        .and(path("/configs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4,
            "domain": "shop.example",
            "config": {"container_selector": "div.card", "fields": []},
            "created_at": "2024-05-01T12:30:00Z"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/scrape/start"))
        .and(body_json(json!({
            "config_id": 4,
            "start_url": "https://shop.example/catalog",
            "max_pages": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t-2"})))
        .expect(1)
        .mount(&server)
        .await;

    workflow.save_config(None).await.expect("save ok");

    let err = workflow.start_scrape(None, None).await.expect_err("no url");
    assert!(matches!(err, WorkflowError::Validation(_)));
    assert!(err.is_recoverable());
    assert_eq!(workflow.session().stage(), Stage::ConfigSaved);

    workflow
        .start_scrape(Some("https://shop.example/catalog".to_string()), Some(3))
        .await
        .expect("scrape start ok");
    assert_eq!(workflow.session().stage(), Stage::ScrapeRunning);
}

// ----------------------------------------------------------------------
// Ordering guards
// ----------------------------------------------------------------------

#[tokio::test]
async fn operations_out_of_order_are_rejected() {
    let server = MockServer::start().await;
    mount_analysis_start(&server).await;

    let mut workflow = start_workflow(&server).await;

    let err = workflow.select_candidate(1).await.expect_err("too early");
    assert!(matches!(
        err,
        WorkflowError::WrongStage {
            stage: Stage::AnalyzePending
        }
    ));
    assert!(err.is_recoverable());
    assert!(workflow.save_config(None).await.is_err());
    assert!(workflow.start_scrape(None, None).await.is_err());
    assert!(workflow.await_scrape(|_| {}).await.is_err());
    assert!(workflow.export(ExportFormat::Json).await.is_err());
    assert!(workflow.result().is_err());

    // Rejected calls leave the session where it was.
    assert_eq!(workflow.session().stage(), Stage::AnalyzePending);
}

#[tokio::test]
async fn overlay_edits_rejected_outside_field_selection() {
    let server = MockServer::start().await;
    mount_analysis_start(&server).await;

    let mut workflow = start_workflow(&server).await;
    let err = workflow
        .set_field_included("h2", false)
        .expect_err("too early");
    assert!(err.is_recoverable());
    assert!(workflow.rename_field("h2", "Title").is_err());
    assert!(workflow.override_field_selector("h2", "h2.name").is_err());
}
