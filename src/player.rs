//! Rated players and name matching
//!
//! Players arrive from the registration roster as plain names and pick up
//! their score from the rating service. Names are compared through a
//! normalised key so that `<Pekka>` on the roster matches `pekka` in the
//! ratings.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A participant with a numeric skill score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Display name, kept exactly as registered
    name: String,
    /// Skill rating; always finite
    score: f64,
}

impl Player {
    /// Creates a new player
    ///
    /// Non-finite scores (NaN or infinities) are stored as 0 so that the
    /// average-gap comparisons used during balancing stay total.
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score: if score.is_finite() { score } else { 0.0 },
        }
    }

    /// Creates a player for whom no rating was found
    pub fn unrated(name: impl Into<String>) -> Self {
        Self::new(name, 0.0)
    }

    /// Returns the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the skill score
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Returns the key used to match this player against external data
    pub fn key(&self) -> NameKey {
        NameKey::new(&self.name)
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.name.fmt(f)
    }
}

/// Case-insensitive lookup key for a player name
///
/// Angle brackets are dropped and surrounding whitespace trimmed before
/// lowercasing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub struct NameKey(String);

impl NameKey {
    /// Builds the key for a raw name
    pub fn new(name: &str) -> Self {
        let stripped: String = name.chars().filter(|c| !matches!(c, '<' | '>')).collect();
        Self(stripped.trim().to_lowercase())
    }

    /// Returns the normalised key text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NameKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
