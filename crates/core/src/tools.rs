use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::ToolSpec;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// The result envelope of one `tools/call`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolReply {
    pub text: String,
    pub is_error: bool,
}

impl ToolReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    pub fn json(value: &Value) -> Self {
        Self::text(pretty(value))
    }

    pub fn json_error(value: &Value) -> Self {
        Self::error(pretty(value))
    }

    pub fn to_value(&self) -> Value {
        let mut value = json!({
            "content": [{
                "type": "text",
                "text": self.text
            }]
        });
        if self.is_error {
            value["isError"] = json!(true);
        }
        value
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// One adapter's tool surface: its catalogue and how to run a tool.
///
/// `invoke` only ever sees arguments that already passed the matching
/// [`ToolSpec`]; absent arguments arrive as an empty object.
pub trait ToolHandler {
    fn server_name(&self) -> &'static str;

    fn specs(&self) -> Vec<ToolSpec>;

    fn invoke(&self, name: &str, arguments: Value) -> Result<ToolReply>;

    fn error_reply(&self, error: &Error) -> ToolReply {
        ToolReply::error(format!("Error: {}", error))
    }
}

pub struct Dispatcher<H> {
    handler: H,
    specs: Vec<ToolSpec>,
}

impl<H: ToolHandler> Dispatcher<H> {
    pub fn new(handler: H) -> Self {
        let specs = handler.specs();
        Self { handler, specs }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.specs.iter().map(ToolSpec::definition).collect()
    }

    /// Never fails: every error after lookup becomes a flagged reply.
    pub fn dispatch(&self, name: &str, arguments: Value) -> ToolReply {
        match self.try_dispatch(name, arguments) {
            Ok(reply) => reply,
            Err(e) => {
                debug!(tool = name, error = %e, "tool call failed");
                self.handler.error_reply(&e)
            }
        }
    }

    fn try_dispatch(&self, name: &str, arguments: Value) -> Result<ToolReply> {
        let spec = self
            .specs
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;

        let arguments = spec.validate(arguments)?;
        debug!(tool = name, "dispatching");
        self.handler.invoke(name, arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use std::cell::Cell;

    #[derive(Deserialize, JsonSchema)]
    struct EchoArgs {
        #[schemars(length(max = 5))]
        text: String,
    }

    struct Echo {
        calls: Cell<usize>,
    }

    impl ToolHandler for Echo {
        fn server_name(&self) -> &'static str {
            "echo"
        }

        fn specs(&self) -> Vec<ToolSpec> {
            vec![ToolSpec::new::<EchoArgs>("echo", "Echo text back")]
        }

        fn invoke(&self, _name: &str, arguments: Value) -> Result<ToolReply> {
            self.calls.set(self.calls.get() + 1);
            let args: EchoArgs = crate::schema::parse_args(arguments)?;
            match args.text.as_str() {
                "boom" => Err(Error::transport("vendor exploded")),
                text => Ok(ToolReply::text(text)),
            }
        }
    }

    fn dispatcher() -> Dispatcher<Echo> {
        Dispatcher::new(Echo {
            calls: Cell::new(0),
        })
    }

    #[test]
    fn listing_is_stable() {
        let d = dispatcher();
        let a = serde_json::to_value(d.list_tools()).unwrap();
        let b = serde_json::to_value(d.list_tools()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0]["name"], "echo");
        assert!(a[0]["inputSchema"].is_object());
    }

    #[test]
    fn unknown_tool_is_flagged_without_invoking() {
        let d = dispatcher();
        let reply = d.dispatch("frobnicate", json!({}));
        assert!(reply.is_error);
        assert_eq!(reply.text, "Error: Unknown tool: frobnicate");
        assert_eq!(d.handler().calls.get(), 0);
    }

    #[test]
    fn validation_failure_never_invokes() {
        let d = dispatcher();
        let reply = d.dispatch("echo", json!({ "text": "too long" }));
        assert!(reply.is_error);
        assert!(reply.text.contains("`text`"));
        assert_eq!(d.handler().calls.get(), 0);
    }

    #[test]
    fn handler_errors_become_flagged_replies() {
        let d = dispatcher();
        let reply = d.dispatch("echo", json!({ "text": "boom" }));
        assert!(reply.is_error);
        assert!(reply.text.contains("vendor exploded"));
        assert_eq!(d.handler().calls.get(), 1);
    }

    #[test]
    fn reply_envelope_shape() {
        let ok = ToolReply::text("hi").to_value();
        assert_eq!(ok["content"][0]["type"], "text");
        assert_eq!(ok["content"][0]["text"], "hi");
        assert!(ok.get("isError").is_none());

        let err = ToolReply::error("bad").to_value();
        assert_eq!(err["isError"], true);
    }
}
