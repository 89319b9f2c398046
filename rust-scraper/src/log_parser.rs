//! Replay log parsing
//!
//! Showdown replay logs are line-oriented, `|`-separated protocol transcripts:
//!
//! ```text
//! |player|p1|Alice|266|
//! |poke|p1|Froslass, F|
//! |win|Alice
//! ```
//!
//! Only `player`, `poke` and `win` records matter here; everything else is skipped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A full roster size. Reaching it sorts the team once.
pub const TEAM_SIZE: usize = 6;

/// Player slot id (`p1`, `p2`, ...) -> revealed team
pub type TeamsByPlayer = BTreeMap<String, PlayerTeam>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTeam {
    pub name: String,
    pub team: Team,
}

/// Species tokens revealed for one player, raw as they appear in the log
/// (e.g. `"Froslass, F"`).
///
/// Entries stay in reveal order until the sixth arrives, at which point the
/// list is sorted exactly once. Anything revealed after that is appended
/// unsorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Team(Vec<String>);

impl Team {
    pub fn push(&mut self, species: String) {
        self.0.push(species);
        if self.0.len() == TEAM_SIZE {
            self.0.sort();
        }
    }

    /// True once a full roster has been seen and sorted
    pub fn is_finalized(&self) -> bool {
        self.0.len() >= TEAM_SIZE
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl From<Vec<String>> for Team {
    fn from(entries: Vec<String>) -> Self {
        Self(entries)
    }
}

impl<'a> IntoIterator for &'a Team {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Extract each player's name and team from a replay log.
///
/// Never fails: short or unknown lines are ignored, and `poke` records for a
/// slot with no prior `player` record are dropped.
pub fn parse_log(log: &str) -> TeamsByPlayer {
    let mut teams = TeamsByPlayer::new();

    for line in log.lines() {
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() < 2 {
            continue;
        }

        match fields[1] {
            "player" => {
                let (Some(slot), Some(name)) = (fields.get(2), fields.get(3)) else {
                    continue;
                };
                teams
                    .entry(slot.to_string())
                    .or_insert_with(|| PlayerTeam {
                        name: name.to_string(),
                        team: Team::default(),
                    });
            }
            "poke" => {
                let (Some(slot), Some(species)) = (fields.get(2), fields.get(3)) else {
                    continue;
                };
                if let Some(player) = teams.get_mut(*slot) {
                    player.team.push(species.to_string());
                }
            }
            _ => {}
        }
    }

    teams
}

/// Name from the last `|win|` record, if the battle finished
pub fn parse_winner(log: &str) -> Option<String> {
    log.lines()
        .filter_map(|line| {
            let mut fields = line.split('|');
            fields.next()?;
            if fields.next()? != "win" {
                return None;
            }
            fields.next().map(str::to_string)
        })
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(entries: &[&str]) -> Team {
        Team::from(entries.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_full_team_is_sorted() {
        let log = "\
|j|☆Alice
|player|p1|Alice|266|
|poke|p1|Zapdos|
|poke|p1|Abra, M|
|poke|p1|Magikarp, F|
|poke|p1|Onix|
|poke|p1|Eevee|
|poke|p1|Ditto|
|teampreview
";
        let teams = parse_log(log);
        let p1 = &teams["p1"];
        assert_eq!(p1.name, "Alice");
        assert_eq!(
            p1.team,
            team(&["Abra, M", "Ditto", "Eevee", "Magikarp, F", "Onix", "Zapdos"])
        );
        assert!(p1.team.is_finalized());
    }

    #[test]
    fn test_partial_team_keeps_reveal_order() {
        let log = "|player|p2|Bob|1|\n|poke|p2|Zapdos|\n|poke|p2|Abra|\n|poke|p2|Onix|\n";
        let teams = parse_log(log);
        assert_eq!(teams["p2"].team, team(&["Zapdos", "Abra", "Onix"]));
        assert!(!teams["p2"].team.is_finalized());
    }

    #[test]
    fn test_poke_before_player_is_dropped() {
        let log = "|poke|p2|Zapdos|\n|player|p1|Alice|\n|poke|p1|Abra|\n";
        let teams = parse_log(log);
        assert!(!teams.contains_key("p2"));

        let log = format!("{log}|player|p2|Bob|\n|poke|p2|Onix|\n");
        let teams = parse_log(&log);
        assert_eq!(teams["p2"].team, team(&["Onix"]));
    }

    #[test]
    fn test_repeated_player_keeps_first_name() {
        let log = "|player|p1|Alice|\n|poke|p1|Abra|\n|player|p1|Mallory|\n|poke|p1|Onix|\n";
        let teams = parse_log(log);
        assert_eq!(teams["p1"].name, "Alice");
        assert_eq!(teams["p1"].team, team(&["Abra", "Onix"]));
    }

    #[test]
    fn test_overflow_is_appended_unsorted() {
        let mut log = String::from("|player|p1|Alice|\n");
        for mon in ["F", "E", "D", "C", "B", "A", "0"] {
            log.push_str(&format!("|poke|p1|{mon}|\n"));
        }
        let teams = parse_log(&log);
        assert_eq!(teams["p1"].team, team(&["A", "B", "C", "D", "E", "F", "0"]));
        assert_eq!(teams["p1"].team.len(), 7);
    }

    #[test]
    fn test_sort_is_case_sensitive() {
        let mut log = String::from("|player|p1|Alice|\n");
        for mon in ["abra", "Zapdos", "Onix", "eevee", "Ditto", "Mew"] {
            log.push_str(&format!("|poke|p1|{mon}|\n"));
        }
        let teams = parse_log(&log);
        assert_eq!(
            teams["p1"].team,
            team(&["Ditto", "Mew", "Onix", "Zapdos", "abra", "eevee"])
        );
    }

    #[test]
    fn test_malformed_lines_are_ignored() {
        let log = "\n\
garbage
|
|player
|player|p1
|poke|p1|Abra|
|player|p1|Alice
|poke|p1
|poke|p1|Onix
|move|p1a: Onix|Stealth Rock|
";
        let teams = parse_log(log);
        assert_eq!(teams.len(), 1);
        assert_eq!(teams["p1"].name, "Alice");
        assert_eq!(teams["p1"].team, team(&["Onix"]));
    }

    #[test]
    fn test_empty_log() {
        assert!(parse_log("").is_empty());
        assert_eq!(parse_winner(""), None);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let log = "|player|p1|Alice|\n|player|p2|Bob|\n|poke|p1|Onix|\n|poke|p2|Abra|\n";
        assert_eq!(parse_log(log), parse_log(log));
    }

    #[test]
    fn test_parse_winner() {
        let log = "|player|p1|Alice|\n|turn|12\n|win|Bob\n";
        assert_eq!(parse_winner(log), Some("Bob".to_string()));
        assert_eq!(parse_winner("|player|p1|Alice|\n|tie\n"), None);
        assert_eq!(parse_winner("|win|Alice\n|win|Bob\n"), Some("Bob".to_string()));
    }

    #[test]
    fn test_team_serializes_as_array() {
        let teams = parse_log("|player|p1|Alice|\n|poke|p1|Froslass, F|\n");
        let json = serde_json::to_string(&teams).unwrap();
        assert_eq!(json, r#"{"p1":{"name":"Alice","team":["Froslass, F"]}}"#);
    }
}
