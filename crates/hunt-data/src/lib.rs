//! Report parsing, loot settlement, performance classification and timeline
//! aggregation for hunt analyzer sessions.
//!
//! Every operation here is pure and synchronous over in-memory data. The
//! only file access is the explicit loaders on [`comments::CommentPool`] and
//! [`submission::Roster`].

pub mod aggregator;
pub mod classifier;
pub mod comments;
pub mod lexer;
pub mod parser;
pub mod settlement;
pub mod submission;
pub mod xp_report;

pub use hunt_core as core;
