use bridge_core::mock::MockTransport;
use bridge_core::{HttpResponse, McpServer};
use linkedin_mcp::{LinkedInClient, LinkedInConfig, LinkedInTools};
use serde_json::{json, Value};
use std::sync::Arc;

fn request(method: &str, params: Option<Value>) -> String {
    let req = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params
    });
    serde_json::to_string(&req).unwrap()
}

fn tool_call(name: &str, arguments: Value) -> String {
    request(
        "tools/call",
        Some(json!({
            "name": name,
            "arguments": arguments
        })),
    )
}

fn parse_response(response: &str) -> Value {
    serde_json::from_str(response).unwrap()
}

fn get_text_content(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or("")
}

fn reply_body(response: &Value) -> Value {
    serde_json::from_str(get_text_content(response)).unwrap()
}

fn server(dry_run: bool) -> (McpServer<LinkedInTools>, Arc<MockTransport>) {
    let mock = Arc::new(MockTransport::new());
    let client = LinkedInClient::with_transport(
        LinkedInConfig {
            access_token: "li-token".to_string(),
            person_urn: "urn:li:person:abc".to_string(),
            dry_run,
        },
        mock.clone(),
    );
    (McpServer::new(LinkedInTools::new(client)), mock)
}

fn call(server: &mut McpServer<LinkedInTools>, name: &str, arguments: Value) -> Value {
    parse_response(&server.handle_request(&tool_call(name, arguments)).unwrap())
}

#[test]
fn test_tools_list() {
    let (mut server, _) = server(true);
    let resp = parse_response(&server.handle_request(&request("tools/list", None)).unwrap());
    let tools = resp["result"]["tools"].as_array().unwrap();

    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0]["name"], "post_to_linkedin");
    let schema = &tools[0]["inputSchema"];
    assert_eq!(schema["properties"]["commentary"]["maxLength"], 3000);
    assert_eq!(
        schema["properties"]["visibility"]["enum"],
        json!(["PUBLIC", "CONNECTIONS", "LOGGED_IN"])
    );
    assert_eq!(schema["properties"]["visibility"]["default"], "PUBLIC");
    assert_eq!(tools[1]["name"], "verify_linkedin_connection");
}

#[test]
fn test_dry_run_post_defaults_visibility() {
    let (mut server, mock) = server(true);
    let resp = call(&mut server, "post_to_linkedin", json!({ "commentary": "Hello LinkedIn" }));

    assert!(resp["result"]["isError"].is_null());
    let body = reply_body(&resp);
    assert_eq!(body["success"], true);
    assert_eq!(body["visibility"], "PUBLIC");
    assert_eq!(body["characterCount"], 14);
    assert!(body["postId"].as_str().unwrap().starts_with("dry-run-"));
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn test_overlong_commentary_rejected_before_client() {
    let (mut server, mock) = server(false);
    let resp = call(
        &mut server,
        "post_to_linkedin",
        json!({ "commentary": "a".repeat(3001) }),
    );

    assert_eq!(resp["result"]["isError"], true);
    let body = reply_body(&resp);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("commentary"));
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn test_bad_visibility_rejected() {
    let (mut server, mock) = server(false);
    let resp = call(
        &mut server,
        "post_to_linkedin",
        json!({ "commentary": "hi", "visibility": "FRIENDS" }),
    );
    assert_eq!(resp["result"]["isError"], true);
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn test_live_post() {
    let (mut server, mock) = server(false);
    mock.push_response(HttpResponse::new(201, "{}").with_header("x-restli-id", "urn:li:share:77"));

    let resp = call(
        &mut server,
        "post_to_linkedin",
        json!({ "commentary": "Launch", "visibility": "CONNECTIONS" }),
    );
    let body = reply_body(&resp);

    assert_eq!(body["postId"], "urn:li:share:77");
    assert_eq!(body["postUrl"], "https://www.linkedin.com/feed/update/urn:li:share:77");
    assert_eq!(body["message"], "Post successfully published to LinkedIn");
    assert_eq!(mock.request_count(), 1);
}

#[test]
fn test_live_post_vendor_error() {
    let (mut server, mock) = server(false);
    mock.push_json(422, json!({ "message": "Duplicate post" }));

    let resp = call(&mut server, "post_to_linkedin", json!({ "commentary": "again" }));

    assert_eq!(resp["result"]["isError"], true);
    let error = reply_body(&resp)["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("LinkedIn API error: 422 - "));
    assert!(error.contains("Duplicate post"));
}

#[test]
fn test_verify_connection() {
    let (mut server, mock) = server(false);
    mock.push_json(200, json!({ "sub": "abc", "name": "Ada Lovelace", "email": "ada@example.com" }));

    let resp = call(&mut server, "verify_linkedin_connection", json!({}));
    let body = reply_body(&resp);
    assert_eq!(body["connected"], true);
    assert_eq!(body["profile"]["name"], "Ada Lovelace");
    assert_eq!(body["mode"], "LIVE");
    assert_eq!(mock.request_count(), 1);

    mock.push_json(401, json!({ "message": "expired" }));
    let resp = call(&mut server, "verify_linkedin_connection", json!({}));
    assert_eq!(resp["result"]["isError"], true);
    assert_eq!(reply_body(&resp)["connected"], false);
}

#[test]
fn test_unknown_tool() {
    let (mut server, mock) = server(false);
    let resp = call(&mut server, "frobnicate", json!({}));

    assert_eq!(resp["result"]["isError"], true);
    assert_eq!(reply_body(&resp)["error"], "Unknown tool: frobnicate");
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn test_unknown_method() {
    let (mut server, _) = server(true);
    let resp = parse_response(&server.handle_request(&request("resources/list", None)).unwrap());
    assert_eq!(resp["error"]["code"], -32601);
}
