//! Text rendering of formed matches

use itertools::Itertools;

use crate::teams::{Match, Team};

/// Token placed between the two sides of a match
pub const SEPARATOR: &str = "vs";

/// Turns formed matches into a message for the chat
pub trait Presenter {
    /// Renders the matches in formation order
    fn present(&self, matches: &[Match]) -> String;
}

/// Plain text presenter, one block per match
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl Presenter for PlainText {
    fn present(&self, matches: &[Match]) -> String {
        describe(matches)
    }
}

/// Renders matches as `A, B, C (20) vs (21) D, E, F` blocks separated by
/// blank lines
///
/// Averages are rounded to whole numbers. An empty slice renders as an
/// empty string.
pub fn describe(matches: &[Match]) -> String {
    matches.iter().map(describe_match).join("\n\n")
}

fn describe_match(formed: &Match) -> String {
    format!(
        "{} ({}) {SEPARATOR} ({}) {}",
        formed.home.names(),
        rounded_average(&formed.home),
        rounded_average(&formed.away),
        formed.away.names(),
    )
}

fn rounded_average(team: &Team) -> String {
    // Adding 0.0 turns a negative zero into 0.
    let rounded = team.average_score().round_ties_even() + 0.0;
    format!("{rounded:.0}")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use fastrand::Rng;

    use super::*;
    use crate::{
        player::Player,
        teams::{MatchCount, balance_random},
    };

    fn matches(count: u8, scores: &[f64]) -> Vec<Match> {
        let players = scores
            .iter()
            .enumerate()
            .map(|(i, &score)| Player::new(format!("P{i}"), score))
            .collect();
        balance_random(players, MatchCount::try_from(count).unwrap(), &mut Rng::with_seed(4))
    }

    #[test]
    fn test_describe_empty() {
        assert_eq!(describe(&[]), "");
        assert_eq!(PlainText.present(&[]), "");
    }

    #[test]
    fn test_describe_single_match_layout() {
        let formed = matches(1, &[10.0; 6]);
        let text = describe(&formed);

        let expected = format!(
            "{} (10) vs (10) {}",
            formed[0].home.names(),
            formed[0].away.names()
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_describe_rounds_averages() {
        let formed = matches(1, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        assert!(describe(&formed).contains("(1) vs (1)"));

        let formed = matches(1, &[1.2, 1.2, 1.2, 1.2, 1.2, 1.2]);
        assert!(describe(&formed).contains("(1) vs (1)"));
    }

    #[test]
    fn test_describe_small_negative_average_prints_zero() {
        let formed = matches(1, &[-0.9, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let text = describe(&formed);

        assert!(text.contains("(0) vs (0)"), "{text}");
        assert!(!text.contains("-0"), "{text}");
    }

    #[test]
    fn test_describe_keeps_negative_averages() {
        let formed = matches(1, &[-6.0; 6]);
        assert!(describe(&formed).contains("(-6) vs (-6)"));
    }

    #[test]
    fn test_describe_separates_matches_with_blank_line() {
        let formed = matches(2, &[5.0; 12]);
        let text = describe(&formed);
        let blocks = text.split("\n\n").collect_vec();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], describe_match(&formed[0]));
        assert_eq!(blocks[1], describe_match(&formed[1]));
    }
}
