//! HTTP API over the mock source.

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::Router;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use command_center::config::Config;
use command_center::server::build_router;
use command_center_core::models::{Activity, Agent, AgentDetail, Note, SquadOverview};
use command_center_core::source::mock::MockDataSource;
use command_center_core::source::DataSource;

fn mock_at_noon() -> MockDataSource {
    MockDataSource::at(Utc.with_ymd_and_hms(2026, 2, 2, 12, 0, 0).unwrap())
}

async fn spawn_api() -> String {
    let app = build_router(&Config::minimal(), Arc::new(mock_at_noon()))
        .await
        .unwrap();
    serve(app).await
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn get_json(url: &str) -> (u16, serde_json::Value) {
    let resp = reqwest::get(url).await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn test_health() {
    let base = spawn_api().await;
    let (status, body) = get_json(&format!("{}/health", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["source"], "mock");
    assert_eq!(body["items"], 37);
}

#[tokio::test]
async fn test_search_ranked() {
    let base = spawn_api().await;
    let (status, body) = get_json(&format!("{}/search?q=dealership%20dashboard&limit=3", base)).await;
    assert_eq!(status, 200);
    let results = body["results"].as_array().unwrap();
    assert!(!results.is_empty() && results.len() <= 3);
    assert_eq!(body["total"], results.len());
    let scores: Vec<u64> = results.iter().map(|r| r["score"].as_u64().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_search_blank_is_empty() {
    let base = spawn_api().await;
    let (status, body) = get_json(&format!("{}/search?q=", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_search_grouped_with_types() {
    let base = spawn_api().await;
    let (status, body) = get_json(&format!("{}/search?q=ga4&types=note,memory&grouped=true", base)).await;
    assert_eq!(status, 200);
    assert!(body["grouped"]["agents"].as_array().unwrap().is_empty());
    assert!(body["grouped"]["dailyNotes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_bad_type_envelope() {
    let base = spawn_api().await;
    let (status, body) = get_json(&format!("{}/search?q=ga4&types=tweet", base)).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(body["error"]["message"].as_str().unwrap().contains("tweet"));
}

#[tokio::test]
async fn test_search_zero_limit_rejected() {
    let base = spawn_api().await;
    let (status, body) = get_json(&format!("{}/search?q=ga4&limit=0", base)).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_agents_and_detail() {
    let base = spawn_api().await;
    let (status, body) = get_json(&format!("{}/agents", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["agents"].as_array().unwrap().len(), 5);
    assert_eq!(body["counts"]["blocked"], 1);

    let (status, body) = get_json(&format!("{}/agents/intel", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["agent"]["id"], "intel");
    assert!(body["parsed"]["blockers"].is_array());
}

#[tokio::test]
async fn test_unknown_agent_404_envelope() {
    let base = spawn_api().await;
    let (status, body) = get_json(&format!("{}/agents/zed", base)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["message"], "no agent with id: zed");
}

#[tokio::test]
async fn test_notes_and_activity() {
    let base = spawn_api().await;
    let (status, body) = get_json(&format!("{}/notes", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["columns"].as_array().unwrap().len(), 4);

    let (status, body) = get_json(&format!("{}/activity?limit=4", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["activity"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_reindex() {
    let base = spawn_api().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/reindex", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["items"], 37);
}

async fn post_json(url: &str, body: serde_json::Value) -> (u16, serde_json::Value) {
    let resp = reqwest::Client::new().post(url).json(&body).send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

fn column_ids(board: &serde_json::Value, column: &str) -> Vec<String> {
    board["columns"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["column"] == column)
        .unwrap()["notes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_move_note_persists_for_session() {
    let base = spawn_api().await;

    let (status, body) = post_json(
        &format!("{}/notes/1/move", base),
        serde_json::json!({ "column": "done" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(column_ids(&body, "done"), vec!["1"]);
    assert!(!column_ids(&body, "inbox").contains(&"1".to_string()));

    let (_, board) = get_json(&format!("{}/notes", base)).await;
    assert_eq!(column_ids(&board, "done"), vec!["1"]);

    // A later move of the same note wins.
    let (status, body) = post_json(
        &format!("{}/notes/1/move", base),
        serde_json::json!({ "column": "Action" }),
    )
    .await;
    assert_eq!(status, 200);
    assert!(column_ids(&body, "done").is_empty());
    assert!(column_ids(&body, "action").contains(&"1".to_string()));
}

#[tokio::test]
async fn test_move_note_errors() {
    let base = spawn_api().await;

    let (status, body) = post_json(
        &format!("{}/notes/1/move", base),
        serde_json::json!({ "column": "later" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = post_json(
        &format!("{}/notes/nope/move", base),
        serde_json::json!({ "column": "done" }),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["message"], "no note with id: nope");
}

#[tokio::test]
async fn test_tasks_priority_and_board() {
    let base = spawn_api().await;

    let (status, body) = get_json(&format!("{}/tasks", base)).await;
    assert_eq!(status, 200);
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 7);
    assert_eq!(tasks[0]["id"], "task-3");
    assert_eq!(tasks[0]["status"], "blocked");
    assert_eq!(tasks[6]["status"], "done");

    let (status, body) = get_json(&format!("{}/tasks?agent=murphie&board=true", base)).await;
    assert_eq!(status, 200);
    let columns = body["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 6);
    let total: usize = columns
        .iter()
        .map(|c| c["tasks"].as_array().unwrap().len())
        .sum();
    assert_eq!(total, 2);

    let (status, body) = get_json(&format!("{}/tasks?status=someday", base)).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "bad_request");
}

/// Mock data whose activity feed and squad overview always fail, and whose
/// notes fail once `down` is set.
struct UnreliableSource {
    inner: MockDataSource,
    down: Arc<AtomicBool>,
}

#[async_trait]
impl DataSource for UnreliableSource {
    fn name(&self) -> &str {
        "unreliable"
    }

    async fn agents(&self) -> Result<Vec<Agent>> {
        self.inner.agents().await
    }

    async fn notes(&self) -> Result<Vec<Note>> {
        if self.down.load(Ordering::SeqCst) {
            bail!("contents API returned 503 for notes/voice");
        }
        self.inner.notes().await
    }

    async fn activity(&self) -> Result<Vec<Activity>> {
        bail!("contents API returned 503 for memory/daily")
    }

    async fn agent_detail(&self, agent_id: &str) -> Result<Option<AgentDetail>> {
        self.inner.agent_detail(agent_id).await
    }

    async fn squad_overview(&self) -> Result<SquadOverview> {
        bail!("contents API returned 503 for agents")
    }

    async fn memory(&self) -> Result<Option<String>> {
        self.inner.memory().await
    }
}

async fn spawn_unreliable_api() -> (String, Arc<AtomicBool>) {
    let down = Arc::new(AtomicBool::new(false));
    let source = UnreliableSource {
        inner: mock_at_noon(),
        down: Arc::clone(&down),
    };
    let app = build_router(&Config::minimal(), Arc::new(source))
        .await
        .unwrap();
    (serve(app).await, down)
}

#[tokio::test]
async fn test_source_failure_is_502_envelope() {
    let (base, _down) = spawn_unreliable_api().await;

    let (status, body) = get_json(&format!("{}/activity", base)).await;
    assert_eq!(status, 502);
    assert_eq!(body["error"]["code"], "source_error");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("memory/daily"));

    let (status, body) = get_json(&format!("{}/agents", base)).await;
    assert_eq!(status, 502);
    assert_eq!(body["error"]["code"], "source_error");

    // Search runs on the index snapshot and is unaffected.
    let (status, body) = get_json(&format!("{}/search?q=ga4", base)).await;
    assert_eq!(status, 200);
    assert!(body["total"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_failed_reindex_keeps_previous_index() {
    let (base, down) = spawn_unreliable_api().await;
    down.store(true, Ordering::SeqCst);

    let resp = reqwest::Client::new()
        .post(format!("{}/reindex", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "source_error");

    let (status, body) = get_json(&format!("{}/health", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["items"], 37);
}
