//! Persisted client state: colour theme and evaluation history.
//!
//! The whole snapshot is rewritten after every mutation, so a crash never
//! loses more than the command that was running.

use anyhow::{Context, Result};
use chrono::Utc;
use pitchsense_analytics::{HistoryEntry, HistoryStore};
use pitchsense_core::EvaluationResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Serialize)]
struct Snapshot<'a> {
    theme: Theme,
    history: &'a [HistoryEntry],
}

pub struct ClientStore {
    path: PathBuf,
    theme: Theme,
    history: HistoryStore,
}

impl ClientStore {
    /// Load the snapshot at `path`, or start empty if there is none.
    ///
    /// Theme and history are read independently: a corrupt history is
    /// dropped with a warning and does not cost the theme preference.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            debug!(?path, "No state file, starting empty");
            return Ok(Self {
                path,
                theme: Theme::default(),
                history: HistoryStore::new(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read state: {}", path.display()))?;

        let doc: Value = match serde_json::from_str(&content) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(?path, error = %e, "State file is not valid JSON, ignoring it");
                Value::Null
            }
        };

        let theme: Theme = doc
            .get("theme")
            .and_then(|t| serde_json::from_value(t.clone()).ok())
            .unwrap_or_default();

        let history = match doc.get("history") {
            None | Some(Value::Null) => HistoryStore::new(),
            Some(raw) => match serde_json::from_value::<Vec<HistoryEntry>>(raw.clone()) {
                Ok(entries) => HistoryStore::from_entries(entries),
                Err(e) => {
                    warn!(error = %e, "Stored history is unreadable, starting empty");
                    HistoryStore::new()
                }
            },
        };

        debug!(?path, entries = history.len(), theme = theme.as_str(), "Loaded state");
        Ok(Self {
            path,
            theme,
            history,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.theme = theme;
        self.flush()
    }

    /// Record a successful evaluation and persist it.
    pub fn record(&mut self, transcript: &str, result: EvaluationResult) -> Result<HistoryEntry> {
        let entry = self
            .history
            .record_result(transcript, result, Utc::now())
            .clone();
        self.flush()?;
        Ok(entry)
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.history.clear();
        self.flush()
    }

    /// Write the full history, most recent first, as pretty JSON.
    pub fn export_history(&self, out: &Path) -> Result<()> {
        let json = self
            .history
            .to_json_pretty()
            .context("failed to serialize history")?;
        std::fs::write(out, json)
            .with_context(|| format!("failed to write export: {}", out.display()))
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create state dir: {}", parent.display()))?;
        }
        let snapshot = Snapshot {
            theme: self.theme,
            history: self.history.all(),
        };
        let json = serde_json::to_string_pretty(&snapshot).context("failed to serialize state")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write state: {}", self.path.display()))?;
        debug!(path = ?self.path, entries = self.history.len(), "State saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchsense_analytics::HISTORY_CAPACITY;

    fn result(score: f64) -> EvaluationResult {
        EvaluationResult {
            score: Some(score),
            verdict: Some("ok".into()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ClientStore::open(dir.path().join("state.json")).unwrap();
        assert_eq!(store.theme(), Theme::Light);
        assert!(store.history().is_empty());
    }

    #[test]
    fn mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("state.json");

        let mut store = ClientStore::open(&path).unwrap();
        store.set_theme(Theme::Dark).unwrap();
        let entry = store.record("my first pitch", result(0.6)).unwrap();

        let reopened = ClientStore::open(&path).unwrap();
        assert_eq!(reopened.theme(), Theme::Dark);
        assert_eq!(reopened.history().len(), 1);
        assert_eq!(reopened.history().get(entry.id), Some(&entry));
    }

    #[test]
    fn cap_is_applied_before_saving() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut store = ClientStore::open(&path).unwrap();
        for i in 0..7 {
            store.record(&format!("pitch {i}"), result(0.1 * i as f64)).unwrap();
        }

        let reopened = ClientStore::open(&path).unwrap();
        assert_eq!(reopened.history().len(), HISTORY_CAPACITY);
        assert_eq!(reopened.history().all()[0].transcript, "pitch 6");
    }

    #[test]
    fn clear_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut store = ClientStore::open(&path).unwrap();
        store.record("a", result(0.5)).unwrap();
        store.clear_history().unwrap();

        assert!(ClientStore::open(&path).unwrap().history().is_empty());
    }

    #[test]
    fn corrupt_history_keeps_theme() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"theme":"dark","history":"garbage"}"#).unwrap();

        let store = ClientStore::open(&path).unwrap();
        assert_eq!(store.theme(), Theme::Dark);
        assert!(store.history().is_empty());
    }

    #[test]
    fn unparseable_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json {").unwrap();

        let store = ClientStore::open(&path).unwrap();
        assert_eq!(store.theme(), Theme::Light);
        assert!(store.history().is_empty());
    }

    #[test]
    fn export_writes_history_array() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ClientStore::open(dir.path().join("state.json")).unwrap();
        store.record("one", result(0.3)).unwrap();
        store.record("two", result(0.7)).unwrap();

        let out = dir.path().join("export.json");
        store.export_history(&out).unwrap();

        let exported: Vec<HistoryEntry> =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(exported.len(), 2);
        assert_eq!(exported[0].transcript, "two");
    }

    #[test]
    fn theme_toggles() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
