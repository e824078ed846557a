//! # Mökki Bot Library
//!
//! This library provides the back end of the cabin trip chat bot: the
//! registration roster, payment confirmation, rating lookups, standings
//! between rating snapshots and, at its heart, the team balancer that splits
//! registered players into fair three-a-side matches for the disc tournament.
//!
//! The chat platform, the spreadsheet and the rating service stay outside:
//! they are reached through the [`roster::RosterStore`],
//! [`ratings::RatingProvider`] and [`presenter::Presenter`] traits that a
//! host wires into a [`command::Bot`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]

pub mod command;
pub mod config;
pub mod constants;
pub mod player;
pub mod presenter;
pub mod ratings;
pub mod roster;
pub mod standings;
pub mod teams;

pub use command::Bot;
pub use player::Player;
pub use teams::{Match, MatchCount, Mode, Team, TeamBalancer, balance_fair, balance_random};
