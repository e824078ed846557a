//! Registration roster for the cabin trip
//!
//! The roster is a fixed block of rows in the organisers' sheet: one row per
//! registered participant, with the name in the first column followed by a
//! payment flag and free-form metadata. This module defines the storage
//! abstraction and an in-memory implementation, and handles name validation
//! and duplicate detection for new registrations.

use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
    config::Config,
    constants::roster::{DEFAULT_CAPACITY, MAX_NAME_LENGTH},
    player::NameKey,
};

/// Errors that can occur while reading or updating the roster
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The name is empty or contains only whitespace
    #[error("name cannot be empty")]
    Empty,
    /// The name exceeds the maximum allowed length
    #[error("name is too long")]
    TooLong,
    /// The name contains inappropriate content
    #[error("name is inappropriate")]
    Sinful,
    /// Someone with the same name is already registered
    #[error("{0} is already registered")]
    AlreadyRegistered(String),
    /// Every row of the roster is taken
    #[error("roster is full")]
    Full,
    /// No row matches the given name
    #[error("{0} is not registered")]
    NotRegistered(String),
    /// The backing store could not be read or written
    #[error("roster unavailable: {0}")]
    Unavailable(String),
}

/// One registration row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    /// Participant name as entered at registration
    pub name: String,
    /// Whether the participant's payment has been confirmed
    #[serde(default)]
    pub paid: bool,
    /// Remaining columns of the row, untouched by the bot
    #[serde(default)]
    pub metadata: Vec<String>,
}

impl RosterRow {
    /// Creates an unpaid row with no metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paid: false,
            metadata: Vec::new(),
        }
    }
}

/// Storage for registration rows
///
/// Rows are returned in sheet order. Implementations own their retry
/// policy; errors returned here are final for the current command.
pub trait RosterStore {
    /// Returns every registered row in order
    ///
    /// # Errors
    ///
    /// Returns `Error::Unavailable` if the store cannot be read.
    fn rows(&self) -> Result<Vec<RosterRow>, Error>;

    /// Appends a row after the last registered one
    ///
    /// # Errors
    ///
    /// Returns `Error::Full` if no row is free, or `Error::Unavailable` if the
    /// store cannot be written.
    fn append(&mut self, row: RosterRow) -> Result<(), Error>;

    /// Replaces the row at `index`
    ///
    /// # Errors
    ///
    /// Returns `Error::Unavailable` if the store cannot be written or the
    /// index is past the last row.
    fn replace(&mut self, index: usize, row: RosterRow) -> Result<(), Error>;

    /// Returns the registered names in order
    ///
    /// # Errors
    ///
    /// Returns `Error::Unavailable` if the store cannot be read.
    fn registered_names(&self) -> Result<Vec<String>, Error> {
        Ok(self.rows()?.into_iter().map(|row| row.name).collect())
    }
}

/// Roster kept in memory with a fixed number of rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRoster {
    rows: Vec<RosterRow>,
    capacity: usize,
}

impl Default for MemoryRoster {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MemoryRoster {
    /// Creates an empty roster holding at most `capacity` rows
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::new(),
            capacity,
        }
    }

    /// Creates an empty roster sized by the configuration
    pub fn from_config(config: &Config) -> Self {
        Self::with_capacity(config.roster_capacity)
    }
}

impl RosterStore for MemoryRoster {
    fn rows(&self) -> Result<Vec<RosterRow>, Error> {
        Ok(self.rows.clone())
    }

    fn append(&mut self, row: RosterRow) -> Result<(), Error> {
        if self.rows.len() >= self.capacity {
            return Err(Error::Full);
        }
        self.rows.push(row);
        Ok(())
    }

    fn replace(&mut self, index: usize, row: RosterRow) -> Result<(), Error> {
        let slot = self
            .rows
            .get_mut(index)
            .ok_or_else(|| Error::Unavailable(format!("no row at index {index}")))?;
        *slot = row;
        Ok(())
    }
}

/// Validates a participant name
///
/// # Returns
///
/// The trimmed name on success.
///
/// # Errors
///
/// * `Error::TooLong` - Name exceeds 30 bytes
/// * `Error::Empty` - Name is empty after trimming whitespace
/// * `Error::Sinful` - Name contains inappropriate content
pub fn validate_name(name: &str) -> Result<&str, Error> {
    if name.len() > MAX_NAME_LENGTH {
        return Err(Error::TooLong);
    }
    let name = rustrict::trim_whitespace(name);
    if name.is_empty() {
        return Err(Error::Empty);
    }
    if name.is_inappropriate() {
        return Err(Error::Sinful);
    }
    Ok(name)
}

fn position_of(rows: &[RosterRow], name: &str) -> Option<usize> {
    let key = NameKey::new(name);
    rows.iter().position(|row| NameKey::new(&row.name) == key)
}

/// Registers a participant
///
/// # Returns
///
/// The name as stored.
///
/// # Errors
///
/// Returns a validation error for unacceptable names,
/// `Error::AlreadyRegistered` if the name is taken, and `Error::Full` when
/// the roster has no free row.
pub fn register(store: &mut impl RosterStore, name: &str) -> Result<String, Error> {
    let name = validate_name(name)?;
    let rows = store.rows()?;
    if let Some(index) = position_of(&rows, name) {
        return Err(Error::AlreadyRegistered(rows[index].name.clone()));
    }
    store.append(RosterRow::new(name))?;
    info!(name, registered = rows.len() + 1, "registered participant");
    Ok(name.to_owned())
}

/// Marks a participant's payment as received
///
/// Confirming an already paid row succeeds without changes.
///
/// # Errors
///
/// Returns `Error::NotRegistered` when no row matches `name`.
pub fn confirm_payment(store: &mut impl RosterStore, name: &str) -> Result<RosterRow, Error> {
    let rows = store.rows()?;
    let index =
        position_of(&rows, name).ok_or_else(|| Error::NotRegistered(name.trim().to_owned()))?;

    let mut row = rows[index].clone();
    if !row.paid {
        row.paid = true;
        store.replace(index, row.clone())?;
        info!(name = %row.name, "payment confirmed");
    }
    Ok(row)
}
