//! Score and standing changes between two rating snapshots
//!
//! The rating service only reports current scores. To show how the
//! tournament moved things, the bot keeps the previous snapshot and compares
//! it with the current one: every player currently rated gets their score,
//! the change against the previous snapshot and the change in leaderboard
//! position.

use std::{cmp::Ordering, collections::HashMap};

use itertools::Itertools;
use serde::Serialize;

use crate::{player::NameKey, ratings::Rating};

/// One player's line in the standings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    /// Player name as reported in the current snapshot
    pub name: String,
    /// Current score
    pub score: f64,
    /// Current score minus previous score (previous counts as 0 when absent)
    pub delta: f64,
    /// Current leaderboard position (1-indexed)
    pub position: usize,
    /// Leaderboard position in the previous snapshot, if the player was in it
    pub previous_position: Option<usize>,
}

impl Standing {
    /// Positions gained since the previous snapshot; negative when dropped
    pub fn positions_gained(&self) -> Option<i64> {
        self.previous_position
            .map(|previous| previous as i64 - self.position as i64)
    }
}

/// Current standings annotated with changes since the previous snapshot
#[derive(Debug, Clone, Default, Serialize)]
pub struct Standings {
    entries: Vec<Standing>,
}

/// Ranks ratings by descending score, ties by name key, first entry per
/// player kept
fn ranked(ratings: &[Rating]) -> Vec<(NameKey, &Rating)> {
    ratings
        .iter()
        .map(|rating| (NameKey::new(&rating.name), rating))
        .unique_by(|(key, _)| key.clone())
        .sorted_by(|(key_a, a), (key_b, b)| match b.score.total_cmp(&a.score) {
            Ordering::Equal => key_a.cmp(key_b),
            other => other,
        })
        .collect_vec()
}

impl Standings {
    /// Compares two rating snapshots
    ///
    /// Players present only in `previous` are left out.
    pub fn compare(previous: &[Rating], current: &[Rating]) -> Self {
        let previous: HashMap<NameKey, (usize, f64)> = ranked(previous)
            .into_iter()
            .enumerate()
            .map(|(i, (key, rating))| (key, (i + 1, rating.score)))
            .collect();

        let entries = ranked(current)
            .into_iter()
            .enumerate()
            .map(|(i, (key, rating))| {
                let before = previous.get(&key);
                Standing {
                    name: rating.name.clone(),
                    score: rating.score,
                    delta: rating.score - before.map_or(0.0, |(_, score)| *score),
                    position: i + 1,
                    previous_position: before.map(|(position, _)| *position),
                }
            })
            .collect();

        Self { entries }
    }

    /// Returns the standings in leaderboard order
    pub fn entries(&self) -> &[Standing] {
        &self.entries
    }

    /// Finds a player's standing, ignoring case and angle brackets
    pub fn get(&self, name: &str) -> Option<&Standing> {
        let key = NameKey::new(name);
        self.entries
            .iter()
            .find(|standing| NameKey::new(&standing.name) == key)
    }

    /// Renders one line per player, e.g. `2. Aino 1520 (+20, ▲1)`
    pub fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|standing| {
                let movement = match standing.positions_gained() {
                    None => "new".to_owned(),
                    Some(0) => "=".to_owned(),
                    Some(gained) if gained > 0 => format!("▲{gained}"),
                    Some(lost) => format!("▼{}", -lost),
                };
                format!(
                    "{}. {} {:.0} ({:+.0}, {movement})",
                    standing.position, standing.name, standing.score, standing.delta
                )
            })
            .join("\n")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn snapshot(entries: &[(&str, f64)]) -> Vec<Rating> {
        entries
            .iter()
            .map(|(name, score)| Rating::new(*name, *score))
            .collect()
    }

    #[test]
    fn test_compare_tracks_delta_and_movement() {
        let previous = snapshot(&[("Aino", 1500.0), ("Eero", 1450.0), ("Liisa", 1400.0)]);
        let current = snapshot(&[("Aino", 1490.0), ("Eero", 1470.0), ("Liisa", 1520.0)]);

        let standings = Standings::compare(&previous, &current);
        let names = standings.entries().iter().map(|s| s.name.as_str()).collect_vec();
        assert_eq!(names, ["Liisa", "Aino", "Eero"]);

        let liisa = standings.get("liisa").unwrap();
        assert_eq!(liisa.position, 1);
        assert_eq!(liisa.previous_position, Some(3));
        assert_eq!(liisa.delta, 120.0);
        assert_eq!(liisa.positions_gained(), Some(2));

        let aino = standings.get("<Aino>").unwrap();
        assert_eq!(aino.delta, -10.0);
        assert_eq!(aino.positions_gained(), Some(-1));
    }

    #[test]
    fn test_new_player_has_no_previous_position() {
        let standings = Standings::compare(&[], &snapshot(&[("Matti", 1300.0)]));
        let matti = &standings.entries()[0];

        assert_eq!(matti.previous_position, None);
        assert_eq!(matti.delta, 1300.0);
        assert_eq!(matti.positions_gained(), None);
    }

    #[test]
    fn test_ties_ordered_by_name() {
        let standings = Standings::compare(&[], &snapshot(&[("eero", 10.0), ("Aino", 10.0)]));
        assert_eq!(standings.entries()[0].name, "Aino");
        assert_eq!(standings.entries()[1].name, "eero");
    }

    #[test]
    fn test_players_only_in_previous_are_dropped() {
        let standings = Standings::compare(&snapshot(&[("Aino", 1.0)]), &snapshot(&[("Eero", 2.0)]));
        assert_eq!(standings.entries().len(), 1);
        assert!(standings.get("Aino").is_none());
    }

    #[test]
    fn test_describe() {
        let previous = snapshot(&[("Aino", 1500.0), ("Eero", 1450.0)]);
        let current = snapshot(&[("Aino", 1490.0), ("Eero", 1510.0), ("Liisa", 1000.0)]);

        assert_eq!(
            Standings::compare(&previous, &current).describe(),
            "1. Eero 1510 (+60, ▲1)\n2. Aino 1490 (-10, ▼1)\n3. Liisa 1000 (+1000, new)"
        );
        assert_eq!(Standings::compare(&previous, &previous).describe().matches('=').count(), 2);
        assert_eq!(Standings::default().describe(), "");
    }
}
