use anyhow::{Context, Result};
use bridge_core::{init_logging, load_dotenv, run_stdio, RuntimeFlags};
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use tracing::info;

use facebook_mcp::{FacebookClient, FacebookConfig, FacebookTools, DEFAULT_API_VERSION};

#[derive(Parser)]
#[command(name = "facebook-mcp-server")]
#[command(about = "MCP server for Facebook posting and page analytics", long_about = None)]
#[command(version)]
struct Cli {
    /// Graph API access token (user or page)
    #[arg(
        long,
        env = "FACEBOOK_ACCESS_TOKEN",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    access_token: String,

    /// Graph API version
    #[arg(long, env = "FACEBOOK_API_VERSION", default_value = DEFAULT_API_VERSION)]
    api_version: String,

    /// Page to publish to; posts go to the token's profile when unset
    #[arg(long, env = "FACEBOOK_PAGE_ID")]
    page_id: Option<String>,

    #[command(flatten)]
    flags: RuntimeFlags,
}

fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();
    init_logging(cli.flags.debug);

    info!(
        mode = if cli.flags.dry_run { "DRY RUN" } else { "LIVE" },
        api_version = %cli.api_version,
        "facebook-mcp-server starting"
    );

    let client = FacebookClient::new(FacebookConfig {
        access_token: cli.access_token,
        api_version: cli.api_version,
        page_id: cli.page_id,
        dry_run: cli.flags.dry_run,
    })
    .context("failed to initialise Facebook client")?;

    run_stdio(FacebookTools::new(client)).context("stdio transport failed")
}
