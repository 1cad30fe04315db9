//! Pitwall-Common: shared calendar model, session kinds, and errors.
//!
//! - **Calendar**: [`Season`], [`Round`] and [`SessionDate`]
//! - **Sessions**: [`SessionType`] and its classification precedence
//! - **Layout**: where metadata lives inside a season directory
//! - **Errors**: the reconciliation error taxonomy
//!
//! # Examples
//!
//! ```
//! use pitwall_common::{Round, Season, SessionType};
//!
//! let season = Season::new(2024, vec![Round::new(2024, 1, "Bahrain Grand Prix", "bahrain")]).unwrap();
//! assert_eq!(season.lookup(1).unwrap().race_name, "Bahrain Grand Prix");
//! assert!(season.lookup(2).is_none());
//! assert!(SessionType::Sprint.precedence() < SessionType::Qualifying.precedence());
//! ```

pub mod error;
pub mod paths;
pub mod season;
pub mod session;

pub use error::{Error, Result};
pub use paths::SeasonLayout;
pub use season::{Round, Season, SessionDate};
pub use session::SessionType;
