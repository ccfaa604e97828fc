//! memolab: conversational memory labs over a locally running model

mod chat;
mod eval;
mod session;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "memolab",
    version,
    about = "Hybrid conversational memory over a local ollama model"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    opts: SessionOpts,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat with persistent hybrid memory (the default).
    Chat,
    /// Run the recall, update, and forget checks against the live model.
    Eval,
}

#[derive(Args, Clone)]
pub struct SessionOpts {
    /// Model name passed to `ollama run`.
    #[arg(long, default_value_t = default_model())]
    pub model: String,

    /// Ollama executable to spawn.
    #[arg(long, default_value = "ollama")]
    pub ollama_bin: String,

    /// Where the chat memory is persisted.
    #[arg(long, default_value = "memory.json")]
    pub memory_file: PathBuf,

    /// Buffered user/assistant pairs tolerated before compaction.
    #[arg(long, default_value_t = 3)]
    pub buffer_pairs: usize,

    /// Seconds to wait for the model before giving up.
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "gemma3".to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => chat::run(cli.opts).await,
        Command::Eval => eval::run(cli.opts).await,
    }
}
