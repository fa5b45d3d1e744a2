use anyhow::{Context, Result};
use bridge_core::{init_logging, load_dotenv, run_stdio, RuntimeFlags};
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use tracing::info;

use odoo_mcp::{OdooClient, OdooConfig, OdooTools};

#[derive(Parser)]
#[command(name = "odoo-mcp-server")]
#[command(about = "MCP server for Odoo invoicing, expenses and partners", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the Odoo instance, e.g. https://mycompany.odoo.com
    #[arg(long, env = "ODOO_URL", value_parser = NonEmptyStringValueParser::new())]
    url: String,

    /// Database name
    #[arg(long, env = "ODOO_DB", value_parser = NonEmptyStringValueParser::new())]
    db: String,

    /// Login of the API user
    #[arg(long, env = "ODOO_USERNAME", value_parser = NonEmptyStringValueParser::new())]
    username: String,

    /// Password or API key of the API user
    #[arg(
        long,
        env = "ODOO_PASSWORD",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    password: String,

    #[command(flatten)]
    flags: RuntimeFlags,
}

fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();
    init_logging(cli.flags.debug);

    info!(
        mode = if cli.flags.dry_run { "DRY RUN (no actual Odoo operations)" } else { "LIVE" },
        server = %cli.url,
        database = %cli.db,
        "odoo-mcp-server running on stdio"
    );

    let client = OdooClient::new(OdooConfig {
        url: cli.url,
        db: cli.db,
        username: cli.username,
        password: cli.password,
        dry_run: cli.flags.dry_run,
    })
    .context("invalid Odoo configuration")?;

    run_stdio(OdooTools::new(client)).context("stdio transport failed")
}
