use clap::{ArgAction, Args};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Flags every bridge shares. Each one also reads its environment variable.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct RuntimeFlags {
    #[arg(
        long,
        env = "DRY_RUN",
        default_value = "false",
        value_parser = parse_flag,
        action = ArgAction::Set,
        help = "Simulate vendor calls instead of hitting the network"
    )]
    pub dry_run: bool,

    #[arg(
        long,
        env = "DEBUG",
        default_value = "false",
        value_parser = parse_flag,
        action = ArgAction::Set,
        help = "Verbose diagnostics on stderr"
    )]
    pub debug: bool,
}

/// Only the literal `true` switches a flag on.
pub fn parse_flag(value: &str) -> Result<bool, String> {
    Ok(value == "true")
}

/// Pull `.env` into the process environment if one exists.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded .env");
    }
}

/// Logs go to stderr; stdout carries the protocol.
pub fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
