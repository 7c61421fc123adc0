//! Shared types for the hunt analyzer.
//!
//! Value objects produced by the report parser and consumed by settlement,
//! classification and the timeline aggregator, plus the error taxonomy,
//! command-line settings and display formatting.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{HuntError, ParseError, Result};
