use anyhow::{Context, Result};
use bridge_core::{init_logging, load_dotenv, run_stdio, RuntimeFlags};
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use tracing::info;

use linkedin_mcp::{LinkedInClient, LinkedInConfig, LinkedInTools};

#[derive(Parser)]
#[command(name = "linkedin-mcp-server")]
#[command(about = "MCP server for publishing LinkedIn posts", long_about = None)]
#[command(version)]
struct Cli {
    /// OAuth access token with the w_member_social scope
    #[arg(
        long,
        env = "LINKEDIN_ACCESS_TOKEN",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    access_token: String,

    /// Author of every post, e.g. urn:li:person:YOUR_ID
    #[arg(long, env = "LINKEDIN_PERSON_URN", value_parser = NonEmptyStringValueParser::new())]
    person_urn: String,

    #[command(flatten)]
    flags: RuntimeFlags,
}

fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();
    init_logging(cli.flags.debug);

    info!(
        mode = if cli.flags.dry_run { "DRY RUN (no actual posting)" } else { "LIVE" },
        "linkedin-mcp-server running on stdio"
    );

    let client = LinkedInClient::new(LinkedInConfig {
        access_token: cli.access_token,
        person_urn: cli.person_urn,
        dry_run: cli.flags.dry_run,
    })
    .context("failed to initialise LinkedIn client")?;

    run_stdio(LinkedInTools::new(client)).context("stdio transport failed")
}
