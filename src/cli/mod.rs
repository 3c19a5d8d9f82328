//! Command-line interface: a local REPL chat loop and a state inspector.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::domain::models::Config;
use crate::domain::ports::{StateRepository, TelemetrySink};
use crate::infrastructure::{
    ConfigLoader, HttpGenerationClient, JsonFileStateRepository, TracingTelemetrySink,
};
use crate::services::{ContentDispatcher, SessionStore, TurnController};

#[derive(Parser)]
#[command(name = "stoa", about = "Guided-reflection dialogue engine", version)]
pub struct Cli {
    /// Path to a config file, overriding the hierarchical lookup.
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive conversation.
    Chat(ChatArgs),
    /// Inspect persisted session state.
    State(StateArgs),
}

#[derive(clap::Args)]
pub struct ChatArgs {
    /// Conversation identity; separate ids keep separate state.
    #[arg(long, default_value = "local")]
    pub conversation: String,
}

#[derive(clap::Args)]
pub struct StateArgs {
    /// Show only this conversation.
    #[arg(long)]
    pub conversation: Option<String>,
}

fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

async fn build_controller(config: &Config) -> Result<TurnController> {
    let generation = Arc::new(
        HttpGenerationClient::new(config.generation.clone())
            .context("building generation client")?,
    );
    let repository: Arc<dyn StateRepository> =
        Arc::new(JsonFileStateRepository::new(&config.state.path));
    let telemetry: Arc<dyn TelemetrySink> = Arc::new(TracingTelemetrySink);

    let store = Arc::new(SessionStore::new());
    let persisted = repository
        .load()
        .await
        .context("loading persisted session state")?;
    if !persisted.is_empty() {
        info!(sessions = persisted.len(), "hydrating persisted sessions");
        store.hydrate(persisted).await;
    }

    let dispatcher = ContentDispatcher::new(generation, config.thresholds.clone());
    Ok(TurnController::new(
        store,
        dispatcher,
        repository,
        telemetry,
        config.thresholds.clone(),
    ))
}

/// `stoa chat`: blocking line-oriented REPL on stdin/stdout.
pub async fn chat(args: ChatArgs, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let controller = build_controller(&config).await?;

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    println!("stoa — type your message; empty line + Ctrl-D (or \"/quit\") to leave.");

    let mut line = String::new();
    loop {
        write!(stdout, "> ").context("writing prompt")?;
        stdout.flush().context("flushing prompt")?;

        line.clear();
        let read = stdin.lock().read_line(&mut line).context("reading input")?;
        if read == 0 {
            break;
        }
        let input = line.trim();
        if input == "/quit" || input == "/exit" {
            break;
        }

        let reply = controller.process_turn(&args.conversation, input).await;
        println!("\n{}\n", reply.text);
    }

    Ok(())
}

/// `stoa state`: print persisted session state as JSON.
pub async fn state(args: StateArgs, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let repository = JsonFileStateRepository::new(&config.state.path);
    let map = repository
        .load()
        .await
        .context("loading persisted session state")?;

    match args.conversation {
        Some(id) => match map.get(&id) {
            Some(state) => println!("{}", serde_json::to_string_pretty(state)?),
            None => println!("no state for conversation '{id}'"),
        },
        None => println!("{}", serde_json::to_string_pretty(&map)?),
    }
    Ok(())
}
