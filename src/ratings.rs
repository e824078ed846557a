//! Player ratings from the external rating service
//!
//! The rating service answers with a JSON array of `{ "name", "score" }`
//! objects. Scores are decoded leniently: numbers and numeric strings are
//! accepted, anything else counts as 0. Players missing from the ratings are
//! scored 0 as well, so a single unknown name never blocks team balancing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, DisplayFromStr, PickFirst, serde_as};
use thiserror::Error;
use tracing::warn;

use crate::player::{NameKey, Player};

/// Errors that can occur while fetching ratings
#[derive(Error, Debug)]
pub enum Error {
    /// The rating service could not be reached or refused the request
    #[error("rating service unavailable: {0}")]
    Unavailable(String),
    /// The response body was not a JSON array of ratings
    #[error("malformed ratings payload")]
    Payload(#[from] serde_json::Error),
}

/// Wire form of a rating entry, before the score is checked
#[serde_as]
#[derive(Deserialize)]
struct RatingSerde {
    name: String,
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    score: f64,
}

/// A single entry returned by the rating service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RatingSerde")]
pub struct Rating {
    /// Player name as known to the rating service
    pub name: String,
    /// Current skill score; always finite
    pub score: f64,
}

impl Rating {
    /// Creates a rating entry
    ///
    /// Non-finite scores are stored as 0, like any other malformed score.
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score: if score.is_finite() { score } else { 0.0 },
        }
    }
}

impl From<RatingSerde> for Rating {
    fn from(serde: RatingSerde) -> Self {
        Self::new(serde.name, serde.score)
    }
}

/// Source of current player ratings
pub trait RatingProvider {
    /// Fetches every rating the service knows about
    ///
    /// # Errors
    ///
    /// Returns an error when the ratings cannot be fetched or decoded.
    fn ratings(&self) -> Result<Vec<Rating>, Error>;
}

/// Decodes a rating service response body
///
/// # Errors
///
/// Returns `Error::Payload` if the body is not a JSON array of objects with
/// a string `name`.
pub fn parse_ratings(body: &str) -> Result<Vec<Rating>, Error> {
    Ok(serde_json::from_str(body)?)
}

/// Provider backed by a fixed list of ratings
#[derive(Debug, Clone, Default)]
pub struct StaticRatings(Vec<Rating>);

impl StaticRatings {
    /// Creates a provider that always answers with `ratings`
    pub fn new(ratings: Vec<Rating>) -> Self {
        Self(ratings)
    }
}

impl RatingProvider for StaticRatings {
    fn ratings(&self) -> Result<Vec<Rating>, Error> {
        Ok(self.0.clone())
    }
}

/// Provider decoding a response body captured from the rating service
#[derive(Debug, Clone)]
pub struct JsonRatings {
    body: String,
}

impl JsonRatings {
    /// Wraps a raw response body
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl RatingProvider for JsonRatings {
    fn ratings(&self) -> Result<Vec<Rating>, Error> {
        parse_ratings(&self.body)
    }
}

/// Ratings indexed by normalised player name
///
/// When the service lists the same player twice, the first entry wins.
#[derive(Debug, Clone, Default)]
pub struct RatingTable {
    scores: HashMap<NameKey, f64>,
}

impl RatingTable {
    /// Looks up the score for a name, ignoring case and angle brackets
    pub fn score_of(&self, name: &str) -> Option<f64> {
        self.scores.get(&NameKey::new(name)).copied()
    }

    /// Number of distinct rated players
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether no ratings are known
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl FromIterator<Rating> for RatingTable {
    fn from_iter<I: IntoIterator<Item = Rating>>(ratings: I) -> Self {
        let mut scores = HashMap::new();
        for rating in ratings {
            scores.entry(NameKey::new(&rating.name)).or_insert(rating.score);
        }
        Self { scores }
    }
}

/// Attaches current ratings to roster names
///
/// Names without a rating get score 0. If the provider fails, every player
/// gets score 0 and the failure is logged.
pub fn rate_players<I, S>(names: I, provider: &impl RatingProvider) -> Vec<Player>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let table: RatingTable = match provider.ratings() {
        Ok(ratings) => ratings.into_iter().collect(),
        Err(err) => {
            warn!(error = %err, "failed to fetch ratings; scoring every player 0");
            return names
                .into_iter()
                .map(|name| Player::unrated(name.as_ref()))
                .collect();
        }
    };

    names
        .into_iter()
        .map(|name| {
            let name = name.as_ref();
            if let Some(score) = table.score_of(name) {
                Player::new(name, score)
            } else {
                warn!(name, "no rating found; scoring 0");
                Player::unrated(name)
            }
        })
        .collect()
}
