//! Configuration constants for the mökki bot
//!
//! This module contains the fixed limits used by team balancing,
//! the command surface and the registration roster.

/// Team balancing constants
pub mod teams {
    /// Number of players on each side of a match
    pub const TEAM_SIZE: usize = 3;
    /// Number of players consumed by a single match
    pub const MATCH_SIZE: usize = 2 * TEAM_SIZE;
    /// Smallest match count a caller may request
    pub const MIN_MATCH_COUNT: u8 = 1;
    /// Largest match count a caller may request
    pub const MAX_MATCH_COUNT: u8 = 3;
    /// Match count used when the command is given no arguments
    pub const DEFAULT_MATCH_COUNT: u8 = 3;
}

/// Command surface constants
pub mod command {
    /// Second argument selecting random mode over fair mode
    pub const RANDOM_FLAG: &str = "rand";
    /// Maximum number of arguments accepted by the teams command
    pub const MAX_TEAMS_ARGUMENTS: usize = 2;
}

/// Registration roster constants
pub mod roster {
    /// Maximum length of a registered name in bytes
    pub const MAX_NAME_LENGTH: usize = 30;
    /// Number of rows available in the registration sheet
    pub const DEFAULT_CAPACITY: usize = 21;
}
