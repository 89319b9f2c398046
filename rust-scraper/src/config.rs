//! Configuration loading and management

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default = "default_tournaments")]
    pub tournaments: Vec<ThreadGroup>,
}

/// HTTP and politeness settings shared by discovery and replay fetching
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub rate_limit_per_second: u32,
    /// Pause between thread pages
    pub page_delay_ms: u64,
    /// Pause after each replay log fetch
    pub replay_delay_ms: u64,
    /// An anchor is a replay link when its href contains one of these
    pub replay_hosts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
}

/// A tournament and the forum threads its replays are posted in
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThreadGroup {
    pub name: String,
    pub threads: Vec<String>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            output: OutputConfig::default(),
            tournaments: default_tournaments(),
        }
    }
}

impl ScraperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn replay_delay(&self) -> Duration {
        Duration::from_millis(self.replay_delay_ms)
    }

    pub fn rate_limit(&self) -> Result<NonZeroU32> {
        NonZeroU32::new(self.rate_limit_per_second)
            .ok_or_else(|| anyhow!("rate_limit_per_second must be greater than zero"))
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            timeout_seconds: 20,
            rate_limit_per_second: 4,
            page_delay_ms: 250,
            replay_delay_ms: 150,
            replay_hosts: vec![
                "https://replay.pokemonshowdown.com/smogtours-gen9zu".to_string(),
                "https://replay.pokemonshowdown.com/gen9zu".to_string(),
            ],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("test.json"),
        }
    }
}

fn group(name: &str, threads: &[&str]) -> ThreadGroup {
    ThreadGroup {
        name: name.to_string(),
        threads: threads.iter().map(|t| t.to_string()).collect(),
    }
}

/// Tournaments scraped when no config file is given
fn default_tournaments() -> Vec<ThreadGroup> {
    vec![
        group(
            "ZU CIRCUIT",
            &[
                "https://www.smogon.com/forums/threads/2025-zu-circuit-championship-round-of-16-300-prize-pool.3775270/",
                "https://www.smogon.com/forums/threads/2025-zu-circuit-championship-quarterfinals-300-prize-pool.3775582/",
                "https://www.smogon.com/forums/threads/2025-zu-circuit-championship-semifinals-300-prize-pool.3775834/",
                "https://www.smogon.com/forums/threads/2025-zu-circuit-championship-finals-300-prize-pool-won-by-diegoyuhhi-again.3776340/",
            ],
        ),
        group(
            "ZU OPEN",
            &[
                "https://www.smogon.com/forums/threads/zu-open-round-1.3776292/",
                "https://www.smogon.com/forums/threads/zu-open-round-2.3776635/",
            ],
        ),
        group(
            "USA v WORLD",
            &["https://www.smogon.com/forums/threads/usa-vs-world-won-by-world.3775385/"],
        ),
        group(
            "ZUCL",
            &[
                "https://www.smogon.com/forums/threads/zucl-i-week-one.3776901/",
                "https://www.smogon.com/forums/threads/zucl-i-week-two.3777238/",
            ],
        ),
    ]
}
