mod cli;
mod config;
mod server_client;
mod store;
mod terminal;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use pitchsense_analytics::{tips_for, AggregateStats};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command, ThemeArg};
use crate::config::CliConfig;
use crate::server_client::ServerClient;
use crate::store::{ClientStore, Theme};
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let config = CliConfig::load(args.config.as_deref())
        .context("failed to load configuration")?;
    let state_path = config.resolve_state_path(args.state.as_deref())?;
    let mut store = ClientStore::open(&state_path)
        .with_context(|| format!("failed to open state: {}", state_path.display()))?;
    debug!(state = %store.path().display(), "Client state loaded");
    let terminal = Terminal::new(store.theme());

    match args.command {
        Command::Evaluate { text, file } => {
            let transcript = read_transcript(text, file)?;
            let client = ServerClient::new(&config.resolve_server_url(args.server.as_deref()));
            info!(server = client.base_url(), "Evaluating transcript");

            let outcome = {
                let _spinner = terminal.start_spinner("Evaluating...");
                client.evaluate(&transcript).await
            };

            match outcome {
                Ok(result) => {
                    let entry = store
                        .record(&transcript, result)
                        .context("failed to save evaluation")?;
                    terminal.print_result(&entry.result)?;
                    terminal.print_info(&format!("Saved as #{}", entry.id))?;
                }
                Err(e) => {
                    terminal.print_failure(&e)?;
                    std::process::exit(1);
                }
            }
        }

        Command::History => terminal.print_history(store.history().all())?,

        Command::Show { id } => match store.history().get(id) {
            Some(entry) => terminal.print_entry(entry)?,
            None => bail!("no evaluation with id {id} in history"),
        },

        Command::Stats => {
            let stats = AggregateStats::from_entries(store.history().all());
            terminal.print_stats(&stats, &tips_for(&stats))?;
        }

        Command::Export { output } => {
            store.export_history(&output)?;
            terminal.print_info(&format!(
                "Exported {} evaluations to {}",
                store.history().len(),
                output.display()
            ))?;
        }

        Command::Clear { yes } => {
            if store.history().is_empty() {
                terminal.print_info("History is already empty.")?;
            } else if yes || terminal.confirm("Delete all stored evaluations?")? {
                store.clear_history()?;
                terminal.print_info("History cleared.")?;
            } else {
                terminal.print_info("Nothing deleted.")?;
            }
        }

        Command::Theme { mode } => {
            let current = store.theme();
            let next = match mode {
                None => current,
                Some(ThemeArg::Light) => Theme::Light,
                Some(ThemeArg::Dark) => Theme::Dark,
                Some(ThemeArg::Toggle) => current.toggled(),
            };
            if next != current {
                store.set_theme(next)?;
                debug!(from = current.as_str(), to = next.as_str(), "Theme changed");
            }
            Terminal::new(next).print_info(&format!("Theme: {}", next.as_str()))?;
        }
    }

    Ok(())
}

/// Transcript from the argument, a file, or stdin, in that order.
fn read_transcript(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read transcript: {}", path.display()));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read transcript from stdin")?;
    Ok(buf)
}
