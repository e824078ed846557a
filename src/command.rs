//! Chat command handlers
//!
//! A [`Bot`] owns the collaborators the commands need (the registration
//! roster, the rating provider and the presenter) and turns command
//! arguments into reply text. Argument validation happens here, before the
//! team balancer is invoked; the balancer itself never sees a bad request.

use fastrand::Rng;
use itertools::Itertools;
use thiserror::Error;
use tracing::info;

use crate::{
    config::Config,
    constants::{command::MAX_TEAMS_ARGUMENTS, teams::MATCH_SIZE},
    presenter::{PlainText, Presenter},
    ratings::{self, Rating, RatingProvider, rate_players},
    roster::{self, RosterStore},
    standings::Standings,
    teams::{ExhaustiveSearch, MatchCount, Mode, SplitSearch, TeamBalancer},
};

/// Errors returned to the user instead of a regular reply
#[derive(Error, Debug)]
pub enum Error {
    /// The match count argument is not a number in the accepted range
    #[error("match count must be 1, 2 or 3, got {0:?}")]
    InvalidMatchCount(String),
    /// The second argument of the teams command is not the random flag
    #[error("unknown option {given:?}, only {expected:?} is accepted")]
    UnknownFlag {
        /// Argument as given
        given: String,
        /// The configured random flag
        expected: String,
    },
    /// More arguments than the command accepts
    #[error("too many arguments")]
    TooManyArguments,
    /// Registration without a name
    #[error("tell me who you are, e.g. /mokille <name>")]
    MissingName,
    /// The roster rejected the request or could not be reached
    #[error(transparent)]
    Roster(#[from] roster::Error),
    /// Current ratings could not be fetched
    #[error(transparent)]
    Ratings(#[from] ratings::Error),
}

/// Parsed arguments of the teams command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamsRequest {
    /// Number of matches to form
    pub count: MatchCount,
    /// Fair or random team formation
    pub mode: Mode,
}

impl TeamsRequest {
    /// Parses `[count] [flag]`
    ///
    /// Without arguments the configured default count and fair mode are
    /// used. The flag, when present, must equal the configured random flag.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidMatchCount` - Count is not 1, 2 or 3
    /// * `Error::UnknownFlag` - Second argument is not the random flag
    /// * `Error::TooManyArguments` - More than two arguments
    pub fn parse<A: AsRef<str>>(args: &[A], config: &Config) -> Result<Self, Error> {
        if args.len() > MAX_TEAMS_ARGUMENTS {
            return Err(Error::TooManyArguments);
        }

        let count = match args.first().map(AsRef::as_ref) {
            None => config.default_match_count(),
            Some(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(|value| MatchCount::try_from(value).ok())
                .ok_or_else(|| Error::InvalidMatchCount(raw.to_owned()))?,
        };

        let mode = match args.get(1).map(AsRef::as_ref) {
            None => Mode::Fair,
            Some(flag) if flag.trim() == config.random_flag => Mode::Random,
            Some(flag) => {
                return Err(Error::UnknownFlag {
                    given: flag.to_owned(),
                    expected: config.random_flag.clone(),
                });
            }
        };

        Ok(Self { count, mode })
    }
}

/// Command handlers bound to their collaborators
#[derive(Debug)]
pub struct Bot<R, P, T = PlainText, S = ExhaustiveSearch> {
    config: Config,
    roster: R,
    ratings: P,
    presenter: T,
    balancer: TeamBalancer<S>,
}

impl<R: RosterStore, P: RatingProvider> Bot<R, P> {
    /// Creates a bot with the plain text presenter and exhaustive balancing
    pub fn new(config: Config, roster: R, ratings: P) -> Self {
        Self {
            config,
            roster,
            ratings,
            presenter: PlainText,
            balancer: TeamBalancer::new(),
        }
    }
}

impl<R, P, T, S> Bot<R, P, T, S>
where
    R: RosterStore,
    P: RatingProvider,
    T: Presenter,
    S: SplitSearch,
{
    /// Replaces the presenter used for team replies
    pub fn with_presenter<U: Presenter>(self, presenter: U) -> Bot<R, P, U, S> {
        Bot {
            config: self.config,
            roster: self.roster,
            ratings: self.ratings,
            presenter,
            balancer: self.balancer,
        }
    }

    /// Replaces the balancer used for fair mode
    pub fn with_balancer<U: SplitSearch>(self, balancer: TeamBalancer<U>) -> Bot<R, P, T, U> {
        Bot {
            config: self.config,
            roster: self.roster,
            ratings: self.ratings,
            presenter: self.presenter,
            balancer,
        }
    }

    /// Returns the roster store
    pub fn roster(&self) -> &R {
        &self.roster
    }

    /// Handles `/teams [count] [flag]`
    ///
    /// Reads the registered names, attaches current ratings and forms the
    /// requested matches. When there are too few players for a single match
    /// the reply says so instead of listing teams.
    ///
    /// # Errors
    ///
    /// Returns an argument error before touching any collaborator, or
    /// `Error::Roster` if the roster cannot be read.
    pub fn teams<A: AsRef<str>>(&self, args: &[A], rng: &mut Rng) -> Result<String, Error> {
        let request = TeamsRequest::parse(args, &self.config)?;
        let names = self.roster.registered_names()?;
        let available = names.len();
        let players = rate_players(names, &self.ratings);

        let matches = self
            .balancer
            .balance(request.mode, players, request.count, rng);

        if matches.is_empty() {
            return Ok(format!(
                "Not enough players for a match: {MATCH_SIZE} needed, {available} registered"
            ));
        }
        Ok(self.presenter.present(&matches))
    }

    /// Handles `/mokille <name...>`
    ///
    /// The arguments are joined with single spaces to form the name.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingName` without arguments, otherwise any
    /// registration error from the roster.
    pub fn register<A: AsRef<str>>(&mut self, args: &[A]) -> Result<String, Error> {
        let name = args.iter().map(AsRef::as_ref).join(" ");
        if name.trim().is_empty() {
            return Err(Error::MissingName);
        }
        let name = roster::register(&mut self.roster, &name)?;
        Ok(format!("You are registered for the cabin trip, {name}"))
    }

    /// Handles `/paid <name...>`
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingName` without arguments, or
    /// `Error::Roster` when the name is not registered.
    pub fn confirm_payment<A: AsRef<str>>(&mut self, args: &[A]) -> Result<String, Error> {
        let name = args.iter().map(AsRef::as_ref).join(" ");
        if name.trim().is_empty() {
            return Err(Error::MissingName);
        }
        let row = roster::confirm_payment(&mut self.roster, &name)?;
        Ok(format!("Payment confirmed for {}", row.name))
    }

    /// Handles `/standings`, comparing current ratings with `previous`
    ///
    /// # Errors
    ///
    /// Returns `Error::Ratings` if the current ratings cannot be fetched.
    pub fn standings(&self, previous: &[Rating]) -> Result<String, Error> {
        let current = self.ratings.ratings()?;
        let standings = Standings::compare(previous, &current);
        info!(players = standings.entries().len(), "computed standings");
        Ok(standings.describe())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{
        player::Player,
        ratings::StaticRatings,
        roster::MemoryRoster,
        teams::{Match, Split},
    };

    const NAMES: [&str; 13] = [
        "Aino", "Eero", "Liisa", "Matti", "Onni", "Helmi", "Väinö", "Kerttu", "Lauri", "Iida",
        "Toivo", "Elsa", "Veikko",
    ];

    fn bot(registered: usize) -> Bot<MemoryRoster, StaticRatings> {
        let mut roster = MemoryRoster::default();
        for name in &NAMES[..registered] {
            roster::register(&mut roster, name).unwrap();
        }
        let ratings = NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| Rating::new(format!("<{name}>"), 1000.0 + 10.0 * i as f64))
            .collect();
        Bot::new(Config::default(), roster, StaticRatings::new(ratings))
    }

    #[test]
    fn test_parse_defaults() {
        let request = TeamsRequest::parse::<&str>(&[], &Config::default()).unwrap();
        assert_eq!(request.count.get(), 3);
        assert_eq!(request.mode, Mode::Fair);
    }

    #[test]
    fn test_parse_count_and_flag() {
        let request = TeamsRequest::parse(&["2", "rand"], &Config::default()).unwrap();
        assert_eq!(request.count.get(), 2);
        assert_eq!(request.mode, Mode::Random);

        let request = TeamsRequest::parse(&["1"], &Config::default()).unwrap();
        assert_eq!(request.count.get(), 1);
        assert_eq!(request.mode, Mode::Fair);
    }

    #[test]
    fn test_parse_rejects_bad_count() {
        for raw in ["0", "4", "-1", "two", "", "256"] {
            assert!(
                matches!(
                    TeamsRequest::parse(&[raw], &Config::default()),
                    Err(Error::InvalidMatchCount(given)) if given == raw
                ),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_unknown_flag_and_extra_arguments() {
        assert!(matches!(
            TeamsRequest::parse(&["2", "fair"], &Config::default()),
            Err(Error::UnknownFlag { given, .. }) if given == "fair"
        ));
        assert!(matches!(
            TeamsRequest::parse(&["2", "rand", "now"], &Config::default()),
            Err(Error::TooManyArguments)
        ));
    }

    #[test]
    fn test_parse_uses_configured_flag_and_default() {
        let config = Config {
            default_match_count: 1,
            random_flag: "random".to_owned(),
            ..Config::default()
        };
        let request = TeamsRequest::parse(&["3", "random"], &config).unwrap();
        assert_eq!(request.mode, Mode::Random);
        assert!(TeamsRequest::parse(&["3", "rand"], &config).is_err());
        assert_eq!(TeamsRequest::parse::<&str>(&[], &config).unwrap().count.get(), 1);
    }

    #[test]
    fn test_teams_forms_capped_matches() {
        let bot = bot(13);
        let reply = bot.teams(&["3"], &mut Rng::with_seed(1)).unwrap();

        assert_eq!(reply.split("\n\n").count(), 2);
        assert_eq!(reply.matches(" vs ").count(), 2);
    }

    #[test]
    fn test_teams_random_mode() {
        let bot = bot(6);
        let reply = bot.teams(&["1", "rand"], &mut Rng::with_seed(8)).unwrap();

        assert_eq!(reply.matches(" vs ").count(), 1);
        for name in &NAMES[..6] {
            assert!(reply.contains(name), "{name} missing from {reply}");
        }
    }

    #[test]
    fn test_teams_fair_mode_uses_ratings() {
        // Scores 1000..=1050 in steps of 10: the closest split is 3070 against 3080.
        let bot = bot(6);
        let reply = bot.teams::<&str>(&[], &mut Rng::with_seed(2)).unwrap();
        assert!(
            reply.contains("(1023) vs (1027)") || reply.contains("(1027) vs (1023)"),
            "{reply}"
        );
    }

    #[test]
    fn test_teams_not_enough_players() {
        let bot = bot(5);
        let reply = bot.teams::<&str>(&[], &mut Rng::with_seed(0)).unwrap();
        assert_eq!(reply, "Not enough players for a match: 6 needed, 5 registered");
    }

    #[test]
    fn test_teams_rejects_arguments_before_balancing() {
        let bot = bot(13);
        assert!(matches!(
            bot.teams(&["9"], &mut Rng::with_seed(0)),
            Err(Error::InvalidMatchCount(_))
        ));
    }

    struct Counting;

    impl Presenter for Counting {
        fn present(&self, matches: &[Match]) -> String {
            matches.len().to_string()
        }
    }

    struct FirstSix;

    impl SplitSearch for FirstSix {
        fn best_split(&self, _pool: &[Player]) -> Option<Split> {
            Some(Split {
                home: [0, 1, 2],
                away: [3, 4, 5],
            })
        }
    }

    #[test]
    fn test_custom_presenter_and_balancer() {
        let bot = bot(12)
            .with_presenter(Counting)
            .with_balancer(TeamBalancer::with_search(FirstSix));

        assert_eq!(bot.teams(&["3"], &mut Rng::with_seed(0)).unwrap(), "2");
    }

    #[test]
    fn test_register_joins_arguments() {
        let mut bot = bot(0);
        let reply = bot.register(&["Aino", "Virtanen"]).unwrap();

        assert_eq!(reply, "You are registered for the cabin trip, Aino Virtanen");
        assert_eq!(
            bot.roster().registered_names().unwrap(),
            vec!["Aino Virtanen".to_owned()]
        );
    }

    #[test]
    fn test_register_errors() {
        let mut bot = bot(1);
        assert!(matches!(bot.register::<&str>(&[]), Err(Error::MissingName)));
        assert!(matches!(
            bot.register(&["aino"]),
            Err(Error::Roster(roster::Error::AlreadyRegistered(name))) if name == "Aino"
        ));
    }

    #[test]
    fn test_confirm_payment() {
        let mut bot = bot(2);
        assert_eq!(bot.confirm_payment(&["eero"]).unwrap(), "Payment confirmed for Eero");
        assert!(bot.roster().rows().unwrap()[1].paid);
        assert!(matches!(
            bot.confirm_payment(&["Matti"]),
            Err(Error::Roster(roster::Error::NotRegistered(_)))
        ));
    }

    #[test]
    fn test_standings() {
        let bot = bot(0);
        let previous = vec![Rating::new("Veikko", 2000.0), Rating::new("<Aino>", 1000.0)];
        let reply = bot.standings(&previous).unwrap();
        let lines = reply.lines().collect_vec();

        assert_eq!(lines.len(), NAMES.len());
        assert_eq!(lines[0], "1. <Veikko> 1120 (-880, =)");
        assert_eq!(lines[12], "13. <Aino> 1000 (+0, ▼11)");
    }
}
