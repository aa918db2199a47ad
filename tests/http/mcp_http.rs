use axum::body::Body;
use axum::http::{Request, StatusCode};
use dicom_mcp::adapters::http::router::build_router;
use dicom_mcp::config::Config;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for Router::oneshot

const NODES: &str = r#"
nodes:
  orthanc:
    ae_title: ORTHANC
    ip: 127.0.0.1
    port: 4242
    description: Local Orthanc
local_ae_titles:
  - name: default
    ae_title: MCP_DICOM
"#;

fn app(dir: &std::path::Path) -> axum::Router {
    std::fs::write(dir.join("nodes.yaml"), NODES).expect("write nodes file");
    let toml = r#"
        [server]
        id = "http-test"
        bind_address = "127.0.0.1"
        bind_port = 8080

        [directory]
        nodes_file = "nodes.yaml"
    "#;
    let mut config: Config = toml::from_str(toml).expect("TOML parse error");
    config.base_dir = Some(dir.to_path_buf());
    config.validate().expect("valid config");

    build_router(Arc::new(dicom_mcp::build_server(&config)))
}

async fn post(app: axum::Router, body: String) -> (StatusCode, Option<Value>) {
    let response = app
        .oneshot(
            Request::builder()
                .uri("/mcp")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .expect("router handled request");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    let json = if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes).expect("JSON body"))
    };
    (status, json)
}

async fn rpc(app: axum::Router, message: Value) -> Value {
    let (status, body) = post(app, message.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    body.expect("JSON-RPC response")
}

#[tokio::test]
async fn initialize_and_list_tools() {
    let dir = tempfile::tempdir().unwrap();

    let resp = rpc(
        app(dir.path()),
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize",
               "params": {"protocolVersion": "2025-03-26", "capabilities": {},
                          "clientInfo": {"name": "http-test-client", "version": "0.0.1"}}}),
    )
    .await;
    assert_eq!(resp["id"], 1);
    assert_eq!(resp["result"]["protocolVersion"], "2025-03-26");
    assert_eq!(resp["result"]["serverInfo"]["name"], "http-test");

    let resp = rpc(app(dir.path()), json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
    let names: Vec<&str> = resp["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["list_dicom_nodes", "dicom_cecho_by_name", "dicom_cecho"]);
    assert_eq!(
        resp["result"]["tools"][1]["inputSchema"]["required"],
        json!(["node_name"])
    );
}

#[tokio::test]
async fn list_dicom_nodes_over_http() {
    let dir = tempfile::tempdir().unwrap();

    let resp = rpc(
        app(dir.path()),
        json!({"jsonrpc": "2.0", "id": "list", "method": "tools/call",
               "params": {"name": "list_dicom_nodes", "arguments": {}}}),
    )
    .await;

    let result = &resp["result"];
    assert_eq!(result["isError"], false);
    assert_eq!(
        result["structuredContent"],
        json!({
            "nodes": [{
                "name": "orthanc",
                "ae_title": "ORTHANC",
                "ip": "127.0.0.1",
                "port": 4242,
                "description": "Local Orthanc"
            }],
            "local_ae_titles": [{
                "name": "default",
                "ae_title": "MCP_DICOM",
                "description": ""
            }]
        })
    );
    let text: Value = serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(text, result["structuredContent"]);
}

#[tokio::test]
async fn protocol_errors() {
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = post(app(dir.path()), "{broken".to_string()).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);

    let resp = rpc(app(dir.path()), json!({"jsonrpc": "2.0", "id": 7, "method": "prompts/list"})).await;
    assert_eq!(resp["error"]["code"], -32601);

    let resp = rpc(
        app(dir.path()),
        json!({"jsonrpc": "2.0", "id": 8, "method": "tools/call",
               "params": {"name": "dicom_cmove", "arguments": {}}}),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32602);

    let resp = rpc(
        app(dir.path()),
        json!({"jsonrpc": "2.0", "id": 9, "method": "tools/call",
               "params": {"name": "dicom_cecho", "arguments": {"ip": "127.0.0.1"}}}),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32602);
}

#[tokio::test]
async fn notification_is_accepted_without_body() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = post(
        app(dir.path()),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body.is_none());

    // An explicit null id is a request, not a notification
    let resp = rpc(app(dir.path()), json!({"jsonrpc": "2.0", "id": null, "method": "ping"})).await;
    assert_eq!(resp["id"], Value::Null);
    assert_eq!(resp["result"], json!({}));
}

#[tokio::test]
async fn health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(dir.path())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
