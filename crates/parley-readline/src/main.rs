mod commands;
mod logging;

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::Local;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc;

use commands::{COMMANDS, Command};
use parley_core::session::{Message, RejectReason, Sender, SessionEvent};
use parley_core::{ConnectivityMonitor, Session, SubmitOutcome};
use parley_infrastructure::{
    ConfigService, FileKeyValueStore, KeyValueHistoryRepository, ParleyPaths,
};
use parley_interaction::build_provider;

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|(name, _)| name.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

fn print_bot(message: &Message) {
    for line in message.content.lines() {
        println!("{}", line.bright_blue());
    }
}

/// Renders session events on the terminal until the session is dropped.
async fn render_events(mut events: mpsc::UnboundedReceiver<SessionEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::MessageAppended { message } if message.sender == Sender::Bot => {
                print_bot(&message);
            }
            // The REPL already echoes what the user typed
            SessionEvent::MessageAppended { .. } => {}
            SessionEvent::TypingStarted => {
                println!("{}", "bot is typing…".bright_black().italic());
            }
            SessionEvent::TypingStopped => {}
            SessionEvent::InputEnabledChanged { enabled } => {
                tracing::debug!(enabled, "Input enablement changed");
            }
            SessionEvent::HistoryUpdated { entries } => {
                tracing::debug!("History now holds {} entries", entries.len());
            }
        }
    }
}

async fn print_history(session: &Session) {
    let entries = session.history().await;
    if entries.is_empty() {
        println!("{}", "No history yet.".bright_black());
        return;
    }
    for (i, entry) in entries.iter().enumerate() {
        let when = entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        println!(
            "{} {} {}",
            format!("{:>2}.", i + 1).bright_black(),
            entry.preview,
            format!("({})", when).bright_black()
        );
    }
}

async fn print_status(session: &Session) {
    let state = session.snapshot();
    let connectivity = if state.is_online() {
        "online".green()
    } else {
        "offline".red()
    };
    println!("connectivity: {}", connectivity);
    println!("phase:        {:?}", state.phase());
    println!("input:        {}", if state.input_enabled() { "enabled" } else { "disabled" });
    println!("messages:     {}", state.transcript().len());
    println!("history:      {}", session.history().await.len());
}

fn print_help() {
    println!("{}", "Type a message to chat. Commands:".bright_black());
    for (name, description) in COMMANDS {
        println!("  {:<16} {}", name.bright_cyan(), description.bright_black());
    }
}

/// The main entry point for the parley readline REPL.
///
/// Sets up logging, configuration, history storage, the response provider
/// and the session, then reads lines until `/quit`. Plain lines are submitted
/// on a background task so the prompt stays responsive while a reply is
/// pending; the session itself refuses overlapping submissions.
#[tokio::main]
async fn main() -> Result<()> {
    // ===== Backend Initialization =====
    let paths = ParleyPaths::resolve()?;
    paths
        .ensure_dirs()
        .with_context(|| format!("Failed to create {}", paths.data_dir().display()))?;
    let _log_guard = logging::init(&paths.logs_dir());

    let config = ConfigService::new(&paths).get_config();
    tracing::info!("parley starting (config: {})", paths.config_file().display());

    let storage_dir = config
        .storage
        .dir
        .clone()
        .unwrap_or_else(|| paths.storage_dir());
    let repository = Arc::new(
        KeyValueHistoryRepository::new(FileKeyValueStore::new(storage_dir)).with_bounds(
            config.session.history_capacity,
            config.session.preview_chars,
        ),
    );
    let provider =
        build_provider(&config.provider).context("Invalid [provider] configuration")?;

    let monitor = ConnectivityMonitor::new(true);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let session = Arc::new(
        Session::open(repository, &monitor, provider, config.session.clone())
            .await
            .with_events(event_tx),
    );

    monitor.register(session.clone());
    let renderer = tokio::spawn(render_events(event_rx));

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Parley ===".bright_magenta().bold());
    println!("{}", "Type a message, '/help' for commands, or '/quit' to exit.".bright_black());
    println!();
    for message in session.transcript() {
        print_bot(&message);
    }

    // Text put back into the input by /recall
    let mut initial: Option<String> = None;

    // ===== Main REPL Loop =====
    loop {
        let readline = match initial.take() {
            Some(text) => rl.readline_with_initial(">> ", (text.as_str(), "")),
            None => rl.readline(">> "),
        };

        let line = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        let Some(command) = commands::parse(&line) else {
            continue;
        };
        let _ = rl.add_history_entry(line.trim());

        match command {
            Command::Submit(text) => {
                println!("{}", format!("> {}", text).green());
                let session = Arc::clone(&session);
                tokio::spawn(async move {
                    if let SubmitOutcome::Rejected(RejectReason::Busy) = session.submit(&text).await
                    {
                        println!("{}", "Still waiting for the previous reply.".yellow());
                    }
                });
            }
            Command::History => print_history(&session).await,
            Command::Recall(n) => {
                let entries = session.history().await;
                match entries.get(n - 1) {
                    Some(entry) => initial = session.recall_history(entry.id).await,
                    None => println!(
                        "{}",
                        format!("No history entry {} (have {}).", n, entries.len()).yellow()
                    ),
                }
            }
            Command::ClearHistory => {
                let answer = rl.readline("Clear all history? [y/N] ").unwrap_or_default();
                if commands::is_yes(&answer) {
                    session.clear_history().await;
                    println!("{}", "History cleared.".bright_green());
                } else {
                    println!("{}", "Kept history.".bright_black());
                }
            }
            Command::Offline => {
                if monitor.set_online(false) {
                    println!("{}", "Connection lost (simulated).".yellow());
                }
            }
            Command::Online => {
                if monitor.set_online(true) {
                    println!("{}", "Back online.".bright_green());
                }
            }
            Command::Status => print_status(&session).await,
            Command::Help => print_help(),
            Command::Quit => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Command::Usage(usage) => println!("{}", format!("Usage: {}", usage).yellow()),
            Command::Unknown(name) => {
                println!("{}", format!("Unknown command {}. Try /help.", name).bright_black());
            }
        }
    }

    tracing::info!("parley shutting down");
    drop(session);
    renderer.abort();

    Ok(())
}
