use chrono::{DateTime, Utc};
use pitchsense_core::{EvaluationResult, PitchError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum number of entries kept; older ones are evicted from the tail.
pub const HISTORY_CAPACITY: usize = 5;

/// Visible characters of the transcript kept in a snippet.
const SNIPPET_CHARS: usize = 40;

/// One past evaluation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub snippet: String,
    pub transcript: String,
    pub result: EvaluationResult,
}

impl HistoryEntry {
    pub fn new(
        id: u64,
        transcript: impl Into<String>,
        result: EvaluationResult,
        created_at: DateTime<Utc>,
    ) -> Self {
        let transcript = transcript.into();
        Self {
            id,
            score: result.score,
            created_at,
            snippet: snippet(&transcript),
            transcript,
            result,
        }
    }
}

/// Short single-line preview of a transcript.
///
/// Takes the first 40 characters, collapses each whitespace run to a single
/// space and appends `...` when the transcript was longer.
pub fn snippet(transcript: &str) -> String {
    let truncated = transcript.chars().count() > SNIPPET_CHARS;
    let head: String = transcript.chars().take(SNIPPET_CHARS).collect();

    let mut out = String::with_capacity(head.len() + 3);
    let mut in_space = false;
    for c in head.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }

    if truncated {
        out.push_str("...");
    }
    out
}

/// Most-recent-first log of evaluations, capped at [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    last_id: u64,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from a persisted snapshot, which is already most-recent-first.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_CAPACITY);
        let last_id = entries.iter().map(|e| e.id).max().unwrap_or(0);
        Self { entries, last_id }
    }

    /// Parse a snapshot produced by [`HistoryStore::to_json_pretty`].
    pub fn from_json(json: &str) -> Result<Self, PitchError> {
        let entries: Vec<HistoryEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    pub fn to_json_pretty(&self) -> Result<String, PitchError> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Insert at the head, evicting anything past the cap.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.last_id = self.last_id.max(entry.id);
        self.entries.insert(0, entry);
        if self.entries.len() > HISTORY_CAPACITY {
            let evicted = self.entries.split_off(HISTORY_CAPACITY);
            debug!(evicted = evicted.len(), "history cap reached");
        }
    }

    /// Build and record an entry for a fresh result, returning the stored entry.
    ///
    /// The id is the wall-clock time in milliseconds, bumped past the last
    /// issued id when the clock has not moved forward.
    pub fn record_result(
        &mut self,
        transcript: &str,
        result: EvaluationResult,
        now: DateTime<Utc>,
    ) -> &HistoryEntry {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = millis.max(self.last_id.saturating_add(1));
        self.record(HistoryEntry::new(id, transcript, result, now));
        &self.entries[0]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn all(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: u64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
