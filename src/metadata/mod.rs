//! Remote data sources for reconciliation.
//!
//! - [`provider`] -- the [`CalendarSource`], [`PosterSource`] and
//!   [`SynopsisSource`] traits the engine depends on.
//! - [`providers`] -- HTTP implementations (Jolpica, Wikipedia,
//!   eventartworks.de, TheSportsDB).

pub mod provider;
pub mod providers;

pub use provider::{CalendarSource, PosterSource, SynopsisSource};
