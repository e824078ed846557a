//! Team formation for the disc tournament
//!
//! This module splits a pool of rated players into two-sided matches of
//! three players per side. Teams are formed either fairly, by minimising the
//! gap between the two sides' average scores, or randomly, by drawing
//! consecutive players from a shuffled pool. Each committed match removes its
//! six players from the pool; a run ends when the requested number of matches
//! is reached or fewer than six players remain.

use fastrand::Rng;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    constants::teams::{MATCH_SIZE, MAX_MATCH_COUNT, MIN_MATCH_COUNT, TEAM_SIZE},
    player::Player,
};

/// Errors raised while building balancing requests
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested number of matches is outside the accepted range
    #[error("match count {0} is outside {min}..={max}", min = MIN_MATCH_COUNT, max = MAX_MATCH_COUNT)]
    MatchCountOutOfRange(u8),
}

/// How players are distributed into teams
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
pub enum Mode {
    /// Minimise the average-score gap between the two sides of each match
    #[default]
    #[display("fair")]
    Fair,
    /// Shuffle and split by position, ignoring scores
    #[display("random")]
    Random,
}

/// Number of matches requested for a balancing run, always within 1..=3
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MatchCount(u8);

impl MatchCount {
    /// Returns the count as a `usize`
    pub fn get(self) -> usize {
        usize::from(self.0)
    }
}

impl Default for MatchCount {
    fn default() -> Self {
        Self(crate::constants::teams::DEFAULT_MATCH_COUNT)
    }
}

impl TryFrom<u8> for MatchCount {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (MIN_MATCH_COUNT..=MAX_MATCH_COUNT).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::MatchCountOutOfRange(value))
        }
    }
}

impl From<MatchCount> for u8 {
    fn from(count: MatchCount) -> Self {
        count.0
    }
}

/// Three players playing on the same side
///
/// Member order is kept for display and has no effect on scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team([Player; TEAM_SIZE]);

impl Team {
    /// Returns the members in the order they were drawn
    pub fn players(&self) -> &[Player] {
        &self.0
    }

    /// Mean score of the members
    pub fn average_score(&self) -> f64 {
        average(self.0.iter())
    }

    /// Returns the member names joined with `", "`
    pub fn names(&self) -> String {
        self.0.iter().map(Player::name).join(", ")
    }
}

/// Two disjoint teams facing each other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// First side, listed on the left when presented
    pub home: Team,
    /// Second side, listed on the right when presented
    pub away: Team,
}

impl Match {
    /// Absolute difference between the two sides' average scores
    pub fn score_gap(&self) -> f64 {
        (self.home.average_score() - self.away.average_score()).abs()
    }

    /// Iterates over all six players, home side first
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.home.players().iter().chain(self.away.players())
    }
}

/// A choice of two disjoint three-player groups, as indices into a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    /// Pool indices of the home side
    pub home: [usize; TEAM_SIZE],
    /// Pool indices of the away side
    pub away: [usize; TEAM_SIZE],
}

impl Split {
    fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.home.iter().chain(&self.away).copied()
    }
}

/// Strategy for picking the next fair match out of a pool
///
/// Implementors return the split with the smallest average-score gap they
/// can find, or `None` when the pool cannot hold a match. Returned indices
/// must be distinct and within the pool; splits that are not are discarded
/// and end the run.
pub trait SplitSearch {
    /// Finds the split to commit for the given pool
    fn best_split(&self, pool: &[Player]) -> Option<Split>;
}

/// Exact search over every pair of disjoint three-player groups
///
/// Costs `O(C(n,3) * C(n-3,3))` gap evaluations per match, which is fine for
/// pools of a few dozen players. On equal gaps the first pair in enumeration
/// order wins: home groups in lexicographic index order, and for each of
/// them away groups in lexicographic order over the remaining indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveSearch;

impl SplitSearch for ExhaustiveSearch {
    fn best_split(&self, pool: &[Player]) -> Option<Split> {
        let mut best: Option<(f64, Split)> = None;

        for home in (0..pool.len()).combinations(TEAM_SIZE) {
            let home_average = average(home.iter().map(|&i| &pool[i]));
            let remaining = (0..pool.len()).filter(|i| !home.contains(i));

            for away in remaining.combinations(TEAM_SIZE) {
                let gap = (home_average - average(away.iter().map(|&i| &pool[i]))).abs();

                if best.is_none_or(|(best_gap, _)| gap < best_gap) {
                    best = Some((
                        gap,
                        Split {
                            home: std::array::from_fn(|i| home[i]),
                            away: std::array::from_fn(|i| away[i]),
                        },
                    ));
                }
            }
        }

        best.map(|(_, split)| split)
    }
}

/// Players not yet assigned to a match during one balancing run
#[derive(Debug)]
struct Pool(Vec<Player>);

impl Pool {
    fn shuffled(mut players: Vec<Player>, rng: &mut Rng) -> Self {
        rng.shuffle(&mut players);
        Self(players)
    }

    fn can_form_match(&self) -> bool {
        self.0.len() >= MATCH_SIZE
    }

    /// Removes the players named by `split` and returns them as a match
    ///
    /// The remaining players keep their relative order.
    fn take(&mut self, split: &Split) -> Option<Match> {
        if !split.indices().all_unique() || split.indices().any(|i| i >= self.0.len()) {
            return None;
        }

        let team = |indices: [usize; TEAM_SIZE]| Team(indices.map(|i| self.0[i].clone()));
        let formed = Match {
            home: team(split.home),
            away: team(split.away),
        };

        let mut index = 0;
        self.0.retain(|_| {
            let keep = !split.indices().contains(&index);
            index += 1;
            keep
        });

        Some(formed)
    }
}

/// Forms matches out of a list of rated players
///
/// The balancer is generic over the [`SplitSearch`] used in fair mode so the
/// exact search can be swapped for a cheaper heuristic.
#[derive(Debug, Clone, Default)]
pub struct TeamBalancer<S = ExhaustiveSearch> {
    search: S,
}

impl TeamBalancer {
    /// Creates a balancer using the exhaustive search
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: SplitSearch> TeamBalancer<S> {
    /// Creates a balancer using a custom fair-mode search
    pub fn with_search(search: S) -> Self {
        Self { search }
    }

    /// Forms matches in the given mode
    pub fn balance(
        &self,
        mode: Mode,
        players: Vec<Player>,
        count: MatchCount,
        rng: &mut Rng,
    ) -> Vec<Match> {
        match mode {
            Mode::Fair => self.balance_fair(players, count, rng),
            Mode::Random => self.balance_random(players, count, rng),
        }
    }

    /// Forms up to `count` matches minimising each match's score gap
    ///
    /// Players are shuffled once before the first round. Each round commits
    /// the split chosen by the search over the players still in the pool.
    /// Returns fewer matches than requested, possibly none, when the pool
    /// runs short.
    pub fn balance_fair(
        &self,
        players: Vec<Player>,
        count: MatchCount,
        rng: &mut Rng,
    ) -> Vec<Match> {
        Self::run(Mode::Fair, players, count, rng, |pool| {
            self.search.best_split(pool)
        })
    }

    /// Forms up to `count` matches by position in a shuffled pool
    ///
    /// Each match takes the next six players: the first three play home,
    /// the next three away.
    pub fn balance_random(
        &self,
        players: Vec<Player>,
        count: MatchCount,
        rng: &mut Rng,
    ) -> Vec<Match> {
        Self::run(Mode::Random, players, count, rng, |_| {
            Some(Split {
                home: [0, 1, 2],
                away: [3, 4, 5],
            })
        })
    }

    fn run<F>(
        mode: Mode,
        players: Vec<Player>,
        count: MatchCount,
        rng: &mut Rng,
        choose: F,
    ) -> Vec<Match>
    where
        F: Fn(&[Player]) -> Option<Split>,
    {
        let available = players.len();
        let mut pool = Pool::shuffled(players, rng);
        let mut matches = Vec::with_capacity(count.get());

        while matches.len() < count.get() && pool.can_form_match() {
            let Some(formed) = choose(pool.0.as_slice()).and_then(|split| pool.take(&split)) else {
                break;
            };
            debug!(
                ?mode,
                gap = formed.score_gap(),
                remaining = pool.0.len(),
                "formed match"
            );
            matches.push(formed);
        }

        info!(
            ?mode,
            available,
            requested = count.get(),
            formed = matches.len(),
            "balanced teams"
        );

        matches
    }
}

/// Forms fair matches with the exhaustive search
pub fn balance_fair(players: Vec<Player>, count: MatchCount, rng: &mut Rng) -> Vec<Match> {
    TeamBalancer::new().balance_fair(players, count, rng)
}

/// Forms random matches
pub fn balance_random(players: Vec<Player>, count: MatchCount, rng: &mut Rng) -> Vec<Match> {
    TeamBalancer::new().balance_random(players, count, rng)
}

fn average<'a>(players: impl Iterator<Item = &'a Player>) -> f64 {
    players.map(Player::score).sum::<f64>() / TEAM_SIZE as f64
}
