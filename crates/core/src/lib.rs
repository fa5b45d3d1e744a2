pub mod config;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod schema;
pub mod server;
pub mod simulate;
pub mod tools;
pub mod transport;

pub use config::{init_logging, load_dotenv, parse_flag, RuntimeFlags};
pub use error::{Error, Result};
pub use http::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
pub use schema::{input_schema, parse_args, NoArguments, ToolSpec};
pub use server::{run_stdio, serve, McpServer};
pub use simulate::{now_rfc3339, synthetic_id, today, Mode, Simulation};
pub use tools::{Dispatcher, ToolDefinition, ToolHandler, ToolReply};
