//! Replay records, the output dataset and filtering over it

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::log_parser::TeamsByPlayer;

/// One replay waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayJob {
    pub tournament: String,
    pub thread_url: String,
    pub replay: String,
}

impl ReplayJob {
    /// Where the replay's raw protocol log lives
    pub fn log_url(&self) -> String {
        format!("{}.log", self.replay)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub tournament: String,
    pub thread_url: String,
    pub link: String,
    pub teams: TeamsByPlayer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

/// All scraped replays, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<ReplayRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ReplayRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ReplayRecord] {
        &self.records
    }

    /// Write as compact JSON, replacing any existing file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let dataset = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(dataset)
    }

    /// Records matching every set criterion
    pub fn filter(&self, filter: &RecordFilter) -> Vec<&ReplayRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }

    /// Distinct tournament names, sorted
    pub fn tournaments(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .records
            .iter()
            .map(|r| r.tournament.as_str())
            .filter(|t| !t.is_empty())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

impl From<Vec<ReplayRecord>> for Dataset {
    fn from(records: Vec<ReplayRecord>) -> Self {
        Self { records }
    }
}

/// Species name without gender or other suffixes: `"Froslass, F"` -> `"Froslass"`
pub fn species_name(token: &str) -> &str {
    token.split(',').next().unwrap_or(token).trim()
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Narrow a dataset by tournament, player name and species.
///
/// Tournament must match exactly. Player and species are trimmed,
/// case-insensitive substring matches; species compare against cleaned names.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub tournament: Option<String>,
    pub player: Option<String>,
    pub species: Option<String>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.tournament.is_none() && self.player.is_none() && self.species.is_none()
    }

    pub fn matches(&self, record: &ReplayRecord) -> bool {
        if let Some(ref tournament) = self.tournament {
            if &record.tournament != tournament {
                return false;
            }
        }

        if let Some(player) = self.player.as_deref().map(normalize) {
            if !player.is_empty()
                && !record
                    .teams
                    .values()
                    .any(|t| normalize(&t.name).contains(&player))
            {
                return false;
            }
        }

        if let Some(species) = self.species.as_deref().map(normalize) {
            if !species.is_empty()
                && !record
                    .teams
                    .values()
                    .flat_map(|t| &t.team)
                    .any(|mon| normalize(species_name(mon)).contains(&species))
            {
                return false;
            }
        }

        true
    }
}
