use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Evaluate pitch transcripts with an LLM and track recent results.
///
/// Talks to a running `pitchsense-server` and keeps the last five
/// evaluations, plus the theme preference, in a local state file.
#[derive(Parser, Debug)]
#[command(name = "pitchsense", version, about = "Evaluate pitch transcripts with an LLM")]
pub struct CliArgs {
    /// Server URL (overrides PITCHSENSE_SERVER_URL and the config file)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Path to config file (default: ~/.config/pitchsense/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Path to the state file holding theme and history
    #[arg(long, global = true)]
    pub state: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a transcript given inline, from a file, or on stdin
    Evaluate {
        /// Transcript text
        text: Option<String>,
        /// Read the transcript from this file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
    /// List recent evaluations, most recent first
    History,
    /// Show the transcript and full result of a past evaluation
    Show { id: u64 },
    /// Summary statistics and improvement tips over the history
    Stats,
    /// Write the full history as a JSON document
    Export {
        #[arg(short, long, default_value = "pitchsense-history.json")]
        output: PathBuf,
    },
    /// Delete all stored evaluations
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show or change the colour theme
    Theme { mode: Option<ThemeArg> },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeArg {
    Light,
    Dark,
    Toggle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn parses_global_server_after_subcommand() {
        let args = CliArgs::parse_from(["pitchsense", "stats", "--server", "http://h:1"]);
        assert_eq!(args.server.as_deref(), Some("http://h:1"));
        assert!(matches!(args.command, Command::Stats));
    }

    #[test]
    fn export_has_default_output() {
        let args = CliArgs::parse_from(["pitchsense", "export"]);
        match args.command {
            Command::Export { output } => assert_eq!(output, PathBuf::from("pitchsense-history.json")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn text_and_file_conflict() {
        let res = CliArgs::try_parse_from(["pitchsense", "evaluate", "hi", "--file", "x.txt"]);
        assert!(res.is_err());
    }
}
