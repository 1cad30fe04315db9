//! Pitwall - Formula 1 race weekend metadata generator
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod fixtures;
pub mod images;
pub mod metadata;
pub mod nfo;
pub mod rules;
pub mod scanner;
