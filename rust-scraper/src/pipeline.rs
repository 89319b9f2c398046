//! Scrape run: thread discovery -> replay jobs -> replay logs -> dataset

use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{Config, ThreadGroup};
use crate::dataset::{Dataset, ReplayJob, ReplayRecord};
use crate::discovery::discover;
use crate::fetch::Fetcher;
use crate::log_parser::{parse_log, parse_winner};

/// Drives a full scrape with a given fetcher
pub struct Pipeline<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
    replay_hosts: Vec<String>,
    page_delay: Duration,
    replay_delay: Duration,
}

/// Counts from a finished run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub threads: usize,
    pub jobs: usize,
    pub records: usize,
    pub skipped: usize,
}

impl<'a, F: Fetcher + ?Sized> Pipeline<'a, F> {
    pub fn new(config: &Config, fetcher: &'a F) -> Self {
        Self {
            fetcher,
            replay_hosts: config.scraper.replay_hosts.clone(),
            page_delay: config.scraper.page_delay(),
            replay_delay: config.scraper.replay_delay(),
        }
    }

    /// Skip all politeness pauses
    pub fn without_delays(mut self) -> Self {
        self.page_delay = Duration::ZERO;
        self.replay_delay = Duration::ZERO;
        self
    }

    /// Discover replays in every thread, oldest first.
    ///
    /// Threads list newest replays first, so the combined job list is
    /// reversed once as a whole (which also reverses tournament order).
    pub async fn collect_jobs(&self, groups: &[ThreadGroup]) -> Vec<ReplayJob> {
        let mut jobs = Vec::new();

        for group in groups {
            for thread_url in &group.threads {
                info!("Scraping {}: {}", group.name, thread_url);
                let links =
                    discover(thread_url, self.fetcher, &self.replay_hosts, self.page_delay).await;
                debug!("{} replays in {}", links.len(), thread_url);

                jobs.extend(links.into_iter().map(|replay| ReplayJob {
                    tournament: group.name.clone(),
                    thread_url: thread_url.clone(),
                    replay,
                }));
            }
        }

        info!("Found {} total replay links", jobs.len());

        jobs.reverse();
        jobs
    }

    /// Fetch and parse one replay. `None` when its log can't be fetched.
    pub async fn fetch_record(&self, job: &ReplayJob) -> Option<ReplayRecord> {
        let log = match self.fetcher.fetch(&job.log_url()).await {
            Ok(log) => log,
            Err(e) => {
                debug!("Skipping {}: {}", job.replay, e);
                return None;
            }
        };

        Some(ReplayRecord {
            tournament: job.tournament.clone(),
            thread_url: job.thread_url.clone(),
            link: job.replay.clone(),
            teams: parse_log(&log),
            winner: parse_winner(&log),
        })
    }

    /// Fetch every job's replay log into a dataset, in job order
    pub async fn fetch_teams(&self, jobs: &[ReplayJob]) -> (Dataset, usize) {
        let mut dataset = Dataset::new();
        let mut skipped = 0;

        for (i, job) in jobs.iter().enumerate() {
            match self.fetch_record(job).await {
                Some(record) => dataset.push(record),
                None => skipped += 1,
            }

            if (i + 1) % 25 == 0 {
                info!("Fetching teams.. {}/{}", i + 1, jobs.len());
            }

            if !self.replay_delay.is_zero() {
                tokio::time::sleep(self.replay_delay).await;
            }
        }

        (dataset, skipped)
    }

    /// Discover and fetch everything, without writing anything
    pub async fn scrape(&self, groups: &[ThreadGroup]) -> (Dataset, RunStats) {
        let jobs = self.collect_jobs(groups).await;
        let (dataset, skipped) = self.fetch_teams(&jobs).await;

        let stats = RunStats {
            threads: groups.iter().map(|g| g.threads.len()).sum(),
            jobs: jobs.len(),
            records: dataset.len(),
            skipped,
        };

        (dataset, stats)
    }
}

/// Full run: scrape the configured tournaments and write the dataset once
pub async fn run<F: Fetcher + ?Sized>(config: &Config, fetcher: &F) -> Result<RunStats> {
    let pipeline = Pipeline::new(config, fetcher);
    let (dataset, stats) = pipeline.scrape(&config.tournaments).await;

    dataset.save(&config.output.path)?;
    info!(
        "Wrote {} replays to {} ({} skipped)",
        dataset.len(),
        config.output.path.display(),
        stats.skipped
    );

    Ok(stats)
}
