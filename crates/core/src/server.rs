use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

use crate::tools::{Dispatcher, ToolHandler};
use crate::transport::{
    JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, PARSE_ERROR,
};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const PROTOCOL_VERSION: &str = "2024-11-05";

pub struct McpServer<H> {
    dispatcher: Dispatcher<H>,
    initialized: bool,
}

impl<H: ToolHandler> McpServer<H> {
    pub fn new(handler: H) -> Self {
        Self {
            dispatcher: Dispatcher::new(handler),
            initialized: false,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<H> {
        &self.dispatcher
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn handle_request(&mut self, input: &str) -> Option<String> {
        let request: JsonRpcRequest = match serde_json::from_str(input) {
            Ok(r) => r,
            Err(_) => {
                let resp = JsonRpcResponse::error(None, PARSE_ERROR, "Parse error");
                return Some(encode(&resp));
            }
        };

        if request.jsonrpc.as_deref().is_some_and(|v| v != "2.0") {
            let resp = JsonRpcResponse::error(request.id, INVALID_REQUEST, "Invalid Request");
            return Some(encode(&resp));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(&request),
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                return None;
            }
            _ if request.is_notification() => {
                debug!(method = %request.method, "ignoring notification");
                return None;
            }
            "tools/list" => self.handle_tools_list(&request),
            "tools/call" => self.handle_tools_call(&request),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        Some(encode(&response))
    }

    fn handle_initialize(&mut self, request: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(
            request.id.clone(),
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": self.dispatcher.handler().server_name(),
                    "version": SERVER_VERSION
                }
            }),
        )
    }

    fn handle_tools_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let tools = self.dispatcher.list_tools();
        JsonRpcResponse::success(request.id.clone(), json!({ "tools": tools }))
    }

    fn handle_tools_call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let params = match &request.params {
            Some(p) => p,
            None => {
                return JsonRpcResponse::error(request.id.clone(), INVALID_PARAMS, "Missing params")
            }
        };

        let name = match params.get("name").and_then(|v| v.as_str()) {
            Some(n) => n,
            None => {
                return JsonRpcResponse::error(
                    request.id.clone(),
                    INVALID_PARAMS,
                    "Missing tool name",
                )
            }
        };

        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
        let reply = self.dispatcher.dispatch(name, arguments);
        JsonRpcResponse::success(request.id.clone(), reply.to_value())
    }
}

fn encode(response: &JsonRpcResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        format!(
            r#"{{"jsonrpc":"2.0","id":null,"error":{{"code":{},"message":"{}"}}}}"#,
            INTERNAL_ERROR,
            e.to_string().replace('"', "'")
        )
    })
}

/// Serve newline-delimited JSON-RPC until the reader reaches EOF.
///
/// A line that is not UTF-8 gets a parse error and the loop carries on;
/// only a failed read or write ends it early.
pub fn serve<H, R, W>(server: &mut McpServer<H>, mut input: R, mut output: W) -> io::Result<()>
where
    H: ToolHandler,
    R: BufRead,
    W: Write,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let reply = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => server.handle_request(line.trim()),
            Err(e) => {
                warn!(error = %e, "discarding line that is not UTF-8");
                Some(encode(&JsonRpcResponse::error(None, PARSE_ERROR, "Parse error")))
            }
        };

        if let Some(resp) = reply {
            writeln!(output, "{}", resp)?;
            output.flush()?;
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}

pub fn run_stdio<H: ToolHandler>(handler: H) -> io::Result<()> {
    let mut server = McpServer::new(handler);
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(&mut server, stdin.lock(), stdout.lock())
}
