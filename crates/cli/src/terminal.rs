use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use pitchsense_analytics::{AggregateStats, HistoryEntry};
use pitchsense_core::{Category, EvaluationResult};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::server_client::ClientError;
use crate::store::Theme;

/// Colour scheme for terminal output, one per theme.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Palette {
    header: Color,
    score: Color,
    text: Color,
    accent: Color,
    error: Color,
    dim: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                header: Color::DarkMagenta,
                score: Color::DarkGreen,
                text: Color::Black,
                accent: Color::DarkBlue,
                error: Color::DarkRed,
                dim: Color::DarkGrey,
            },
            Theme::Dark => Self {
                header: Color::Magenta,
                score: Color::Green,
                text: Color::White,
                accent: Color::Cyan,
                error: Color::Red,
                dim: Color::Grey,
            },
        }
    }
}

fn fmt_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{s:.2}"),
        None => "-".to_string(),
    }
}

/// Histogram bar; one block per entry.
fn bar(count: usize) -> String {
    "#".repeat(count)
}

/// Writes all user-facing output in the colours of the active theme.
pub struct Terminal {
    colors: Palette,
}

impl Terminal {
    pub fn new(theme: Theme) -> Self {
        Self {
            colors: Palette::for_theme(theme),
        }
    }

    /// Print a successful evaluation.
    pub fn print_result(&self, result: &EvaluationResult) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(self.colors.header),
            Print("Score: "),
            SetForegroundColor(self.colors.score),
            Print(format!("{}\n", fmt_score(result.score))),
            ResetColor,
        )?;

        if result.category_scores.is_some() {
            for category in Category::ALL {
                execute!(
                    stdout,
                    SetForegroundColor(self.colors.dim),
                    Print(format!("  {:<10} ", category.as_str())),
                    SetForegroundColor(self.colors.text),
                    Print(format!("{}\n", fmt_score(result.category(category)))),
                    ResetColor,
                )?;
            }
        }

        if let Some(insights) = &result.insights {
            execute!(
                stdout,
                SetForegroundColor(self.colors.header),
                Print("Insights:\n"),
                ResetColor,
            )?;
            for insight in insights {
                execute!(
                    stdout,
                    SetForegroundColor(self.colors.accent),
                    Print("  - "),
                    SetForegroundColor(self.colors.text),
                    Print(format!("{insight}\n")),
                    ResetColor,
                )?;
            }
        }

        if let Some(verdict) = &result.verdict {
            execute!(
                stdout,
                SetForegroundColor(self.colors.header),
                Print("Verdict: "),
                SetForegroundColor(self.colors.text),
                Print(format!("{verdict}\n")),
                ResetColor,
            )?;
        }

        stdout.flush()?;
        Ok(())
    }

    /// Print a failed evaluation with whatever diagnostics the server sent.
    pub fn print_failure(&self, err: &ClientError) -> Result<()> {
        self.print_error(&err.to_string())?;

        let ClientError::Evaluation(resp) = err else {
            return Ok(());
        };

        let mut stdout = io::stdout();
        if let Some(issues) = &resp.schema_issues {
            execute!(
                stdout,
                SetForegroundColor(self.colors.header),
                Print("Schema issues:\n"),
                ResetColor,
            )?;
            for issue in issues {
                execute!(
                    stdout,
                    SetForegroundColor(self.colors.error),
                    Print(format!("  - {}\n", issue.message)),
                    ResetColor,
                )?;
            }
        }

        if let Some(parsed) = &resp.parsed_json {
            let pretty = serde_json::to_string_pretty(parsed)?;
            execute!(
                stdout,
                SetForegroundColor(self.colors.header),
                Print("Parsed JSON:\n"),
                SetForegroundColor(self.colors.dim),
                Print(format!("{pretty}\n")),
                ResetColor,
            )?;
        }

        if let Some(raw) = &resp.model_output {
            execute!(
                stdout,
                SetForegroundColor(self.colors.header),
                Print("Raw model output:\n"),
                SetForegroundColor(self.colors.dim),
                Print(format!("{raw}\n")),
                ResetColor,
            )?;
        }

        stdout.flush()?;
        Ok(())
    }

    /// Print the history listing, most recent first.
    pub fn print_history(&self, entries: &[HistoryEntry]) -> Result<()> {
        let mut stdout = io::stdout();
        if entries.is_empty() {
            return self.print_info("No evaluations yet.");
        }

        execute!(
            stdout,
            SetForegroundColor(self.colors.header),
            Print("Recent evaluations:\n"),
            SetForegroundColor(self.colors.dim),
            Print(format!("{:<15} {:<6} {:<17} {}\n", "ID", "SCORE", "WHEN", "TRANSCRIPT")),
            Print(format!("{}\n", "-".repeat(80))),
            ResetColor,
        )?;

        for e in entries {
            execute!(
                stdout,
                SetForegroundColor(self.colors.dim),
                Print(format!("{:<15} ", e.id)),
                SetForegroundColor(self.colors.score),
                Print(format!("{:<6} ", fmt_score(e.score))),
                SetForegroundColor(self.colors.dim),
                Print(format!("{:<17} ", e.created_at.format("%Y-%m-%d %H:%M"))),
                SetForegroundColor(self.colors.text),
                Print(format!("{}\n", e.snippet)),
                ResetColor,
            )?;
        }

        stdout.flush()?;
        Ok(())
    }

    /// Print one stored evaluation in full.
    pub fn print_entry(&self, entry: &HistoryEntry) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(self.colors.dim),
            Print(format!(
                "#{} evaluated {}\n",
                entry.id,
                entry.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            )),
            SetForegroundColor(self.colors.header),
            Print("Transcript:\n"),
            SetForegroundColor(self.colors.text),
            Print(format!("{}\n\n", entry.transcript)),
            ResetColor,
        )?;
        stdout.flush()?;
        self.print_result(&entry.result)
    }

    /// Print aggregate statistics followed by improvement tips.
    pub fn print_stats(&self, stats: &AggregateStats, tips: &[&str]) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(self.colors.header),
            Print("Evaluations: "),
            SetForegroundColor(self.colors.text),
            Print(format!("{}\n", stats.count)),
            SetForegroundColor(self.colors.header),
            Print("Average:     "),
            SetForegroundColor(self.colors.score),
            Print(format!("{:.2}\n", stats.average_score)),
            SetForegroundColor(self.colors.header),
            Print("Best:        "),
            SetForegroundColor(self.colors.score),
            Print(format!("{:.2}\n", stats.best_score)),
            SetForegroundColor(self.colors.header),
            Print("Categories:\n"),
            ResetColor,
        )?;

        for category in Category::ALL {
            execute!(
                stdout,
                SetForegroundColor(self.colors.dim),
                Print(format!("  {:<10} ", category.as_str())),
                SetForegroundColor(self.colors.text),
                Print(format!("{:.2}\n", stats.category_averages.get(category))),
                ResetColor,
            )?;
        }

        execute!(
            stdout,
            SetForegroundColor(self.colors.header),
            Print("Distribution:\n"),
            ResetColor,
        )?;
        for bucket in &stats.distribution {
            execute!(
                stdout,
                SetForegroundColor(self.colors.dim),
                Print(format!("  {:<8} {:>2} ", bucket.label, bucket.count)),
                SetForegroundColor(self.colors.accent),
                Print(format!("{}\n", bar(bucket.count))),
                ResetColor,
            )?;
        }

        execute!(
            stdout,
            SetForegroundColor(self.colors.header),
            Print("Tips:\n"),
            ResetColor,
        )?;
        for tip in tips {
            execute!(
                stdout,
                SetForegroundColor(self.colors.accent),
                Print("  * "),
                SetForegroundColor(self.colors.text),
                Print(format!("{tip}\n")),
                ResetColor,
            )?;
        }

        stdout.flush()?;
        Ok(())
    }

    /// Ask a yes/no question; anything but an explicit yes is a no.
    pub fn confirm(&self, question: &str) -> Result<bool> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(self.colors.accent),
            Print(format!("{question} [y/N] ")),
            ResetColor,
        )?;
        stdout.flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let trimmed = input.trim().to_lowercase();

        Ok(trimmed == "y" || trimmed == "yes")
    }

    /// Show a waiting indicator on stderr until the handle is dropped.
    pub fn start_spinner(&self, message: &str) -> SpinnerHandle {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let dim = self.colors.dim;
        let message = message.to_string();

        let handle = std::thread::spawn(move || {
            let frames = ['|', '/', '-', '\\'];
            let mut i = 0;
            while running_clone.load(Ordering::SeqCst) {
                let mut stderr = io::stderr();
                execute!(
                    stderr,
                    SetForegroundColor(dim),
                    Print(format!("\r{} {}", frames[i % frames.len()], message)),
                    ResetColor,
                )
                .ok();
                i += 1;
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
            let mut stderr = io::stderr();
            execute!(stderr, Print(format!("\r{}\r", " ".repeat(message.len() + 2)))).ok();
        });

        SpinnerHandle {
            running,
            thread: Some(handle),
        }
    }

    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(self.colors.error),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(self.colors.dim),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Handle to a running spinner. Dropping it stops and clears the line.
pub struct SpinnerHandle {
    running: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl Drop for SpinnerHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
    }
}
