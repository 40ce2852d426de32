//! chatgate - chat command router host.
//!
//! Reads chat lines from stdin as `<name>[:<roles>] <text>` and prints the
//! router's chat output to stdout. Role letters: `b` broadcaster,
//! `m` moderator, `s` subscriber, `v` VIP. A line `#played <title> [version]`
//! records a played song for the `/current` and `/prev` switches.

use chatgate::config::Config;
use chatgate::handlers::builtin::{register_builtins, register_config_commands};
use chatgate::history::MemoryHistory;
use chatgate::history::memory::PlayedSong;
use chatgate::lists::MemoryUserLists;
use chatgate::{ChatSink, ChatUser, CmdFlags, CommandRegistry, Router, metrics};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// How long to wait for queued chat output on shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Parse `<name>[:<roles>] <text>` into the sender and the chat text.
fn parse_input_line(line: &str) -> Option<(ChatUser, &str)> {
    let (who, text) = line.split_once(' ').unwrap_or((line, ""));
    let (name, roles) = who.split_once(':').unwrap_or((who, ""));
    if name.is_empty() {
        return None;
    }

    let mut user = ChatUser::viewer(name);
    for role in roles.chars() {
        match role.to_ascii_lowercase() {
            'b' => user.is_broadcaster = true,
            'm' => user.is_moderator = true,
            's' => user.is_subscriber = true,
            'v' => user.is_vip = true,
            other => warn!(role = %other, "Unknown role letter ignored"),
        }
    }
    Some((user, text))
}

/// Parse `#played <title> [version]`.
fn parse_played(line: &str) -> Option<PlayedSong> {
    let rest = line.strip_prefix("#played ")?.trim();
    if rest.is_empty() {
        return None;
    }
    let (title, version) = match rest.rsplit_once(' ') {
        Some((title, version)) if version.chars().next().is_some_and(|c| c.is_ascii_digit()) => {
            (title.to_string(), Some(version.to_string()))
        }
        _ => (rest.to_string(), None),
    };
    Some(PlayedSong { title, version })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    metrics::init();

    // Load configuration
    let explicit_path = std::env::args().nth(1);
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| "config.toml".to_string());

    let config = if explicit_path.is_some() || Path::new(&config_path).exists() {
        Config::load(&config_path).map_err(|e| {
            error!(path = %config_path, error = %e, "Failed to load config");
            e
        })?
    } else {
        warn!(path = %config_path, "No config file, using defaults");
        Config::default()
    };

    info!(bot = %config.bot.name, "Starting chatgate");

    // Build the registry
    let mut registry = CommandRegistry::new();
    register_builtins(&mut registry)?;
    register_config_commands(&mut registry, &config.commands)?;
    info!(commands = registry.len(), "Commands registered");

    let lists = match &config.lists.dir {
        Some(dir) => MemoryUserLists::load_dir(dir),
        None => MemoryUserLists::new(),
    };
    let history = Arc::new(MemoryHistory::default());
    let router = Router::from_config(registry, &config, Arc::new(lists), history.clone());

    // Chat output writer
    let (tx, mut rx) = mpsc::channel::<String>(config.bot.output_buffer.max(1));
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            println!("{msg}");
        }
    });
    let sink = ChatSink::Direct(tx);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!(error = %e, "Failed to read stdin");
                        break;
                    }
                };

                if let Some(song) = parse_played(&line) {
                    info!(title = %song.title, version = ?song.version, "Song played");
                    history.push(song);
                    continue;
                }

                if let Some((user, text)) = parse_input_line(&line) {
                    router.dispatch(&user, text, CmdFlags::empty(), "", &sink).await;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    for (command, uses) in router.registry().command_stats() {
        info!(command = %command, uses, "Command usage");
    }

    drop(sink);
    drop(router);
    if tokio::time::timeout(DRAIN_TIMEOUT, writer).await.is_err() {
        warn!("Chat output still pending at shutdown");
    }

    info!("Shutting down");
    Ok(())
}
