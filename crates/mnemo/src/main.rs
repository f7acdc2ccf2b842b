use anyhow::Result;
use clap::Parser;

mod cli;
mod mcp_server;
mod memory_cmd;

use cli::{Cli, Commands, ConfigCommands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (output to stderr, initialize only once)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Save {
            content,
            file,
            title,
            tags,
            conversation_id,
            json,
        } => {
            memory_cmd::handle_save(content, file, title, tags, conversation_id, json).await?;
        }
        Commands::Get { id, full, json } => {
            memory_cmd::handle_get(&id, full, json).await?;
        }
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show { json } => {
                memory_cmd::handle_config_show(json)?;
            }
        },
        Commands::McpServer => {
            mcp_server::run_mcp_server().await?;
        }
    }

    Ok(())
}
