//! Replay Scraper Library
//!
//! Collects team compositions from tournament replays: replay links are
//! discovered in Smogon forum threads and each replay's Showdown log is parsed
//! into per-player teams.

pub mod config;
pub mod dataset;
pub mod discovery;
pub mod fetch;
pub mod log_parser;
pub mod pipeline;
pub mod stats;

pub use config::Config;
pub use dataset::{Dataset, RecordFilter, ReplayJob, ReplayRecord};
pub use fetch::{Fetcher, HttpFetcher};
pub use log_parser::{parse_log, parse_winner, PlayerTeam, Team, TeamsByPlayer};
pub use pipeline::Pipeline;
