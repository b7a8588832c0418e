use anyhow::Context as _;
use axum::Router;
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use dao3_test_support::{McpStdioSession, tool_call_is_error, tool_call_text};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::process::Command;
use tokio::sync::oneshot;

const TIMEOUT: Duration = Duration::from_secs(10);

fn find_header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn echo(uri: Uri, headers: HeaderMap) -> axum::Json<Value> {
    axum::Json(json!({
        "path": uri.path(),
        "query": uri.query().unwrap_or(""),
        "authorization": find_header(&headers, "authorization"),
        "userAgent": find_header(&headers, "user-agent"),
        "xDaoUa": find_header(&headers, "x-dao-ua"),
    }))
}

async fn profile(Path(user_id): Path<String>, uri: Uri, headers: HeaderMap) -> Response {
    if user_id == "broken" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    echo(uri, headers).await.into_response()
}

/// Fake Dao3 API: echoes every request, except `/user/profile/broken` which answers 500.
async fn spawn_upstream() -> anyhow::Result<(String, oneshot::Sender<()>)> {
    let app = Router::new()
        .route("/user/profile/{id}", get(profile))
        .route("/{*path}", get(echo));
    let listener = TcpListener::bind("127.0.0.1:0").await.context("bind")?;
    let addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = shutdown_rx.await;
    });
    tokio::spawn(async move { server.await });

    Ok((format!("http://{addr}"), shutdown_tx))
}

async fn connect(base_url: &str) -> anyhow::Result<McpStdioSession> {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dao3-statistics-mcp"));
    cmd.arg("--base-url")
        .arg(base_url)
        .arg("--log-level")
        .arg("warn")
        .env_remove("RUST_LOG");
    McpStdioSession::spawn(cmd, TIMEOUT).await
}

async fn call_tool(
    session: &mut McpStdioSession,
    id: u64,
    name: &str,
    arguments: Value,
) -> anyhow::Result<Value> {
    session
        .request(
            id,
            "tools/call",
            json!({"name": name, "arguments": arguments}),
            TIMEOUT,
        )
        .await
}

#[tokio::test]
async fn tools_list_exposes_every_operation() -> anyhow::Result<()> {
    let (base_url, shutdown) = spawn_upstream().await?;
    let mut session = connect(&base_url).await?;

    let msg = session
        .request(1, "tools/list", json!({}), TIMEOUT)
        .await?;
    let tools = msg["result"]["tools"]
        .as_array()
        .context("tools/list result.tools")?;
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    assert_eq!(
        names,
        vec![
            "getUserProfile",
            "getMapInfo",
            "getMapCommentList",
            "getMapReleaseInfo",
            "getMapList",
            "getCommentList",
            "getMapStatList",
            "getMapPlayerStatList",
            "getMapPlayerRetention",
            "getMapPlayerBehavior",
        ]
    );

    let map_list = tools
        .iter()
        .find(|t| t["name"] == "getMapList")
        .context("getMapList listed")?;
    assert_eq!(map_list["inputSchema"]["properties"]["keyword"]["type"], "string");
    assert_eq!(map_list["inputSchema"]["properties"]["limit"]["type"], "number");
    assert_eq!(map_list["annotations"]["readOnlyHint"], true);

    let _ = shutdown.send(());
    Ok(())
}

#[tokio::test]
async fn public_tool_forwards_rendered_path() -> anyhow::Result<()> {
    let (base_url, shutdown) = spawn_upstream().await?;
    let mut session = connect(&base_url).await?;

    let msg = call_tool(
        &mut session,
        2,
        "getMapList",
        json!({"offset": 0, "limit": 10, "keyword": "castle", "orderBy": 1}),
    )
    .await?;
    assert!(!tool_call_is_error(&msg), "unexpected error: {msg}");

    let body: Value = serde_json::from_str(tool_call_text(&msg)?)?;
    assert_eq!(body["path"], "/map/tab/maps");
    assert_eq!(body["query"], "offset=0&limit=10&keyword=castle&orderBy=1");
    assert_eq!(body["authorization"], Value::Null);

    let _ = shutdown.send(());
    Ok(())
}

#[tokio::test]
async fn authenticated_tool_sends_credential_headers() -> anyhow::Result<()> {
    let (base_url, shutdown) = spawn_upstream().await?;
    let mut session = connect(&base_url).await?;

    let msg = call_tool(
        &mut session,
        3,
        "getCommentList",
        json!({"offset": 0, "limit": 20, "token": "tok-123", "userAgent": "DaoClient/2"}),
    )
    .await?;
    assert!(!tool_call_is_error(&msg), "unexpected error: {msg}");

    let body: Value = serde_json::from_str(tool_call_text(&msg)?)?;
    assert_eq!(body["path"], "/msg/comment");
    assert_eq!(body["query"], "offset=0&limit=20");
    assert_eq!(body["authorization"], "tok-123");
    assert_eq!(body["userAgent"], "DaoClient/2");
    assert_eq!(body["xDaoUa"], "DaoClient/2");

    let _ = shutdown.send(());
    Ok(())
}

#[tokio::test]
async fn upstream_failure_is_an_error_envelope() -> anyhow::Result<()> {
    let (base_url, shutdown) = spawn_upstream().await?;
    let mut session = connect(&base_url).await?;

    let msg = call_tool(&mut session, 4, "getUserProfile", json!({"userId": "broken"})).await?;
    assert!(tool_call_is_error(&msg), "expected isError: {msg}");

    let payload: Value = serde_json::from_str(tool_call_text(&msg)?)?;
    assert_eq!(
        payload,
        json!({
            "error": "API请求失败",
            "endpoint": "/user/profile/broken",
            "message": "Request failed with status code 500",
        })
    );

    let _ = shutdown.send(());
    Ok(())
}

#[tokio::test]
async fn missing_argument_is_reported_by_field() -> anyhow::Result<()> {
    let (base_url, shutdown) = spawn_upstream().await?;
    let mut session = connect(&base_url).await?;

    let msg = call_tool(
        &mut session,
        5,
        "getMapStatList",
        json!({"startTime": "2025-03-29", "endTime": "2025-04-04", "token": "t"}),
    )
    .await?;
    assert!(tool_call_is_error(&msg), "expected isError: {msg}");

    let payload: Value = serde_json::from_str(tool_call_text(&msg)?)?;
    assert_eq!(payload["error"], "参数校验失败");
    assert_eq!(payload["field"], "userAgent");

    let _ = shutdown.send(());
    Ok(())
}

#[tokio::test]
async fn unknown_tool_is_a_jsonrpc_error() -> anyhow::Result<()> {
    let (base_url, shutdown) = spawn_upstream().await?;
    let mut session = connect(&base_url).await?;

    let msg = call_tool(&mut session, 6, "deleteEverything", json!({})).await?;
    assert!(msg.get("error").is_some(), "expected JSON-RPC error: {msg}");

    let _ = shutdown.send(());
    Ok(())
}
