use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mnemo")]
#[command(about = "Conversation persistence for a remote memory store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save a conversation transcript, chunking oversized content
    Save {
        /// Transcript text; reads from stdin if omitted and no --file given
        content: Option<String>,

        /// Read the transcript from a file instead of the argument or stdin
        #[arg(short, long)]
        file: Option<String>,

        /// Record title; also seeds the living-document key when no
        /// conversation id is given
        #[arg(short, long)]
        title: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        /// Stable living-document key; repeated saves with the same key
        /// update one record instead of creating duplicates
        #[arg(short, long)]
        conversation_id: Option<String>,

        /// Emit the save outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Retrieve a record, reassembling chunked sessions
    Get {
        /// Record id as assigned by the store
        id: String,

        /// Print the full reassembled transcript instead of a summary
        #[arg(long)]
        full: bool,

        /// Emit the recall result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show/manage configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },

    /// Run as an MCP server on stdio
    McpServer,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (api key redacted)
    Show {
        /// Emit as JSON
        #[arg(long)]
        json: bool,
    },
}
