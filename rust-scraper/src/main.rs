//! Replay Scraper
//!
//! Scrapes Smogon tournament threads for Showdown replays and records each
//! player's team.
//!
//! Usage:
//!   replay-scraper                       # Scrape the built-in tournaments
//!   replay-scraper --config my.toml      # Scrape tournaments from a config file
//!   replay-scraper --stats --pokemon froslass
//!   replay-scraper --list                # Show configured threads

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use replay_scraper::stats::UsageStats;
use replay_scraper::{pipeline, Config, Dataset, HttpFetcher, RecordFilter};

/// Command-line arguments
struct Args {
    /// TOML config file (built-in tournaments when absent)
    config: Option<PathBuf>,
    /// Output path override
    out: Option<PathBuf>,
    /// Print usage stats of an existing dataset instead of scraping
    stats: bool,
    /// Dataset to read in stats mode
    input: Option<PathBuf>,
    tournament: Option<String>,
    player: Option<String>,
    pokemon: Option<String>,
    /// Rows shown in the stats report
    top: usize,
    /// Print configured tournaments and threads
    list: bool,
    verbose: bool,
    /// Show help
    help: bool,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut result = Args {
            config: None,
            out: None,
            stats: false,
            input: None,
            tournament: None,
            player: None,
            pokemon: None,
            top: 50,
            list: false,
            verbose: false,
            help: false,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--stats" | "-s" => result.stats = true,
                "--list" | "-l" => result.list = true,
                "--verbose" | "-v" => result.verbose = true,
                "--config" | "-c" => {
                    i += 1;
                    if i < args.len() {
                        result.config = Some(PathBuf::from(&args[i]));
                    }
                }
                "--out" | "-o" => {
                    i += 1;
                    if i < args.len() {
                        result.out = Some(PathBuf::from(&args[i]));
                    }
                }
                "--input" | "-i" => {
                    i += 1;
                    if i < args.len() {
                        result.input = Some(PathBuf::from(&args[i]));
                    }
                }
                "--tournament" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        result.tournament = Some(args[i].clone());
                    }
                }
                "--player" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        result.player = Some(args[i].clone());
                    }
                }
                "--pokemon" | "-m" => {
                    i += 1;
                    if i < args.len() {
                        result.pokemon = Some(args[i].clone());
                    }
                }
                "--top" | "-n" => {
                    i += 1;
                    if i < args.len() {
                        result.top = args[i].parse().unwrap_or(50);
                    }
                }
                "--help" | "-h" => result.help = true,
                _ => {}
            }
            i += 1;
        }

        result
    }

    fn print_help() {
        println!("Replay Scraper - tournament team data from Smogon threads and Showdown replays\n");
        println!("USAGE:");
        println!("  replay-scraper [OPTIONS]\n");
        println!("MODES:");
        println!("  (default)           Scrape threads and write the dataset");
        println!("  --stats, -s         Print species usage for an existing dataset");
        println!("  --list, -l          Print configured tournaments and threads\n");
        println!("SCRAPE OPTIONS:");
        println!("  --config, -c FILE   TOML config (default: built-in tournaments)");
        println!("  --out, -o FILE      Output path (default: test.json)\n");
        println!("STATS OPTIONS:");
        println!("  --input, -i FILE    Dataset to read (default: the output path)");
        println!("  --tournament, -t T  Only this tournament (exact name)");
        println!("  --player, -p P      Only replays with a player name containing P");
        println!("  --pokemon, -m M     Only replays with a species containing M");
        println!("  --top, -n NUM       Rows to show (default: 50)\n");
        println!("OTHER:");
        println!("  --verbose, -v       Debug logging");
        println!("  --help, -h          Show this help message");
    }

    fn filter(&self) -> RecordFilter {
        RecordFilter {
            tournament: self.tournament.clone(),
            player: self.player.clone(),
            species: self.pokemon.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.help {
        Args::print_help();
        return Ok(());
    }

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let mut config = match args.config {
        Some(ref path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        None => Config::default(),
    };
    if let Some(ref out) = args.out {
        config.output.path = out.clone();
    }

    if args.list {
        list_tournaments(&config);
        Ok(())
    } else if args.stats {
        run_stats(&config, &args)
    } else {
        run_scrape(&config).await
    }
}

/// Print the tournaments that would be scraped
fn list_tournaments(config: &Config) {
    for group in &config.tournaments {
        println!("{}", group.name);
        for thread in &group.threads {
            println!("  {}", thread);
        }
    }
}

/// Scrape every configured thread and write the dataset
async fn run_scrape(config: &Config) -> Result<()> {
    info!(
        "Scraping {} tournaments into {}",
        config.tournaments.len(),
        config.output.path.display()
    );

    let fetcher = HttpFetcher::new(&config.scraper)?;
    let stats = pipeline::run(config, &fetcher).await?;

    info!(
        "Scrape complete: {} threads, {} replays found, {} recorded",
        stats.threads, stats.jobs, stats.records
    );

    Ok(())
}

/// Species usage over a previously written dataset
fn run_stats(config: &Config, args: &Args) -> Result<()> {
    let path = args.input.as_ref().unwrap_or(&config.output.path);
    let dataset = Dataset::load(path)?;
    info!("Loaded {} replays from {}", dataset.len(), path.display());

    let filter = args.filter();
    if let Some(ref tournament) = filter.tournament {
        if !dataset.tournaments().contains(&tournament.as_str()) {
            info!("Known tournaments: {}", dataset.tournaments().join(", "));
        }
    }

    let matches = dataset.filter(&filter);
    if matches.is_empty() {
        println!("No matches found.");
        return Ok(());
    }

    if !filter.is_empty() {
        println!("Showing {} of {} replays", matches.len(), dataset.len());
    }

    let stats = UsageStats::compute(matches);
    stats.print_report(args.top);

    Ok(())
}
