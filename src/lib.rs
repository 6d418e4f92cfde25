//! LearnTrack - gamified learning progress tracking
//!
//! LearnTrack keeps a local SQLite record of course progress and layers the
//! usual motivation machinery on top: points per lesson, daily streaks, an
//! achievement catalog, a random daily challenge, and a live leaderboard
//! stream over a broadcast channel.
//!
//! [`ProgressTracker`] is the public entry point. Every mutation runs in a
//! single database transaction, so a completion's points, streak bump,
//! achievements, and challenge progress always land together.

pub mod achievements;
pub mod broadcast;
pub mod challenge;
pub mod config;
pub mod coordinator;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod queries;
pub mod seed;
pub mod streak;

pub use coordinator::ProgressTracker;
pub use db::ProgressDb;
pub use error::{Result, TrackerError};
