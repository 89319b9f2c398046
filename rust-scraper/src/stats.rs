//! Species usage statistics over scraped replays

use std::collections::{BTreeSet, HashMap};

use crate::dataset::{species_name, ReplayRecord};
use crate::log_parser::TEAM_SIZE;

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesRow {
    pub species: String,
    /// Team slots: one per team the species is on
    pub uses: usize,
    /// Replays where either side brought it
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
}

impl SpeciesRow {
    fn new(species: &str) -> Self {
        Self {
            species: species.to_string(),
            uses: 0,
            games: 0,
            wins: 0,
            losses: 0,
        }
    }

    /// Percent of uses that won, if any use had a known result
    pub fn win_rate(&self) -> Option<f64> {
        let decided = self.wins + self.losses;
        if self.uses == 0 || decided == 0 {
            None
        } else {
            Some(self.wins as f64 * 100.0 / self.uses as f64)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UsageStats {
    pub rows: Vec<SpeciesRow>,
    pub total_uses: usize,
    pub total_games: usize,
    /// Whether any replay had a winner recorded
    pub has_results: bool,
}

impl UsageStats {
    /// Tally species over the given replays.
    ///
    /// A team counts each species once among its first six cleaned entries.
    /// Wins and losses are only counted for replays with a known winner; a
    /// mirror match counts one of each.
    pub fn compute<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ReplayRecord>,
    {
        let mut by_species: HashMap<String, SpeciesRow> = HashMap::new();
        let mut stats = UsageStats::default();

        for record in records {
            stats.total_games += 1;
            let winner = record.winner.as_deref().map(|w| w.trim().to_lowercase());
            stats.has_results |= winner.is_some();

            let mut present = BTreeSet::new();

            for player in record.teams.values() {
                let is_winner = winner
                    .as_deref()
                    .is_some_and(|w| player.name.trim().to_lowercase() == w);

                let mut roster: Vec<&str> = Vec::new();
                let cleaned = player
                    .team
                    .iter()
                    .map(|m| species_name(m))
                    .filter(|m| !m.is_empty())
                    .take(TEAM_SIZE);
                for mon in cleaned {
                    if !roster.contains(&mon) {
                        roster.push(mon);
                    }
                }

                for mon in roster {
                    stats.total_uses += 1;
                    let row = by_species
                        .entry(mon.to_string())
                        .or_insert_with(|| SpeciesRow::new(mon));
                    row.uses += 1;
                    if winner.is_some() {
                        if is_winner {
                            row.wins += 1;
                        } else {
                            row.losses += 1;
                        }
                    }
                    present.insert(mon);
                }
            }

            for mon in present {
                if let Some(row) = by_species.get_mut(mon) {
                    row.games += 1;
                }
            }
        }

        let mut rows: Vec<SpeciesRow> = by_species.into_values().collect();
        rows.sort_by(|a, b| {
            b.uses
                .cmp(&a.uses)
                .then_with(|| {
                    let aw = a.win_rate().unwrap_or(-1.0);
                    let bw = b.win_rate().unwrap_or(-1.0);
                    bw.total_cmp(&aw)
                })
                .then_with(|| a.species.cmp(&b.species))
        });
        stats.rows = rows;

        stats
    }

    pub fn usage_pct(&self, row: &SpeciesRow) -> f64 {
        percent(row.uses, self.total_uses)
    }

    pub fn games_pct(&self, row: &SpeciesRow) -> f64 {
        percent(row.games, self.total_games)
    }

    pub fn print_report(&self, top: usize) {
        println!("\n{}", "=".repeat(86));
        println!("SPECIES USAGE");
        println!("{}", "=".repeat(86));
        println!("Games: {}  Team-slot uses: {}", self.total_games, self.total_uses);
        if !self.has_results {
            println!("Win rate unavailable (no winners recorded)");
        }
        println!(
            "\n{:<24} {:>6} {:>9} {:>6} {:>9} {:>6} {:>6} {:>8}",
            "Species", "Uses", "Usage%", "Games", "Games%", "Wins", "Losses", "Winrate"
        );
        for row in self.rows.iter().take(top) {
            let win_rate = row
                .win_rate()
                .map(|w| format!("{:.1}%", w))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<24} {:>6} {:>8.2}% {:>6} {:>8.2}% {:>6} {:>6} {:>8}",
                row.species,
                row.uses,
                self.usage_pct(row),
                row.games,
                self.games_pct(row),
                row.wins,
                row.losses,
                win_rate
            );
        }
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_parser::parse_log;

    fn record(log: &str, winner: Option<&str>) -> ReplayRecord {
        ReplayRecord {
            tournament: "ZU OPEN".to_string(),
            thread_url: "https://www.smogon.com/forums/threads/t.1/".to_string(),
            link: "https://replay.pokemonshowdown.com/gen9zu-1".to_string(),
            teams: parse_log(log),
            winner: winner.map(str::to_string),
        }
    }

    fn row<'a>(stats: &'a UsageStats, species: &str) -> &'a SpeciesRow {
        stats.rows.iter().find(|r| r.species == species).unwrap()
    }

    #[test]
    fn test_counts_without_winner() {
        let records = [
            record(
                "|player|p1|Alice|\n|player|p2|Bob|\n\
                 |poke|p1|Froslass, F|\n|poke|p1|Onix|\n\
                 |poke|p2|Froslass, M|\n|poke|p2|Arboliva|\n",
                None,
            ),
            record("|player|p1|Carol|\n|poke|p1|Onix|\n", None),
        ];

        let stats = UsageStats::compute(&records);

        assert_eq!(stats.total_games, 2);
        assert_eq!(stats.total_uses, 5);
        assert!(!stats.has_results);

        let froslass = row(&stats, "Froslass");
        assert_eq!((froslass.uses, froslass.games), (2, 1));
        assert_eq!(froslass.win_rate(), None);

        let onix = row(&stats, "Onix");
        assert_eq!((onix.uses, onix.games), (2, 2));
        assert_eq!(stats.games_pct(onix), 100.0);
        assert_eq!(stats.usage_pct(onix), 40.0);

        assert_eq!(stats.rows.last().unwrap().species, "Arboliva");
    }

    #[test]
    fn test_duplicate_species_on_a_team_count_once() {
        let records = [record(
            "|player|p1|Alice|\n|poke|p1|Froslass, F|\n|poke|p1|Froslass, M|\n",
            None,
        )];
        let stats = UsageStats::compute(&records);
        assert_eq!(stats.total_uses, 1);
        assert_eq!(row(&stats, "Froslass").uses, 1);
    }

    #[test]
    fn test_only_first_six_entries_count() {
        let mut log = String::from("|player|p1|Alice|\n");
        for mon in ["F", "E", "D", "C", "B", "A", "Z"] {
            log.push_str(&format!("|poke|p1|{mon}|\n"));
        }
        let stats = UsageStats::compute(&[record(&log, None)]);
        assert_eq!(stats.total_uses, 6);
        assert!(stats.rows.iter().all(|r| r.species != "Z"));
    }

    #[test]
    fn test_wins_and_losses() {
        let records = [
            record(
                "|player|p1|Alice|\n|player|p2|Bob|\n\
                 |poke|p1|Onix|\n|poke|p1|Abra|\n|poke|p2|Onix|\n",
                Some("alice"),
            ),
            record("|player|p1|Alice|\n|player|p2|Bob|\n|poke|p2|Abra|\n", Some("Bob")),
        ];

        let stats = UsageStats::compute(&records);
        assert!(stats.has_results);

        // mirror: one win, one loss
        let onix = row(&stats, "Onix");
        assert_eq!((onix.wins, onix.losses), (1, 1));
        assert_eq!(onix.win_rate(), Some(50.0));

        let abra = row(&stats, "Abra");
        assert_eq!((abra.uses, abra.wins, abra.losses), (2, 2, 0));
        assert_eq!(abra.win_rate(), Some(100.0));

        // equal uses: higher win rate first
        assert_eq!(stats.rows[0].species, "Abra");
        assert_eq!(stats.rows[1].species, "Onix");
    }

    #[test]
    fn test_empty() {
        let records: [ReplayRecord; 0] = [];
        let stats = UsageStats::compute(&records);
        assert!(stats.rows.is_empty());
        assert_eq!(stats.total_games, 0);
    }
}
