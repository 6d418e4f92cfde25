//! CLI command implementations

use anyhow::{bail, Result};
use std::path::Path;

use learntrack::{queries, ProgressTracker};

pub mod complete;
pub mod dashboard;
pub mod init;
pub mod leaderboard;
pub mod reset;
pub mod user;

/// Open the tracker on the given path, or the default location
pub fn open_tracker(db_path: Option<&Path>) -> Result<ProgressTracker> {
    match db_path {
        Some(path) => ProgressTracker::with_path(path),
        None => ProgressTracker::new(),
    }
}

/// Resolve a username to its id, failing with a readable message
pub fn resolve_user(tracker: &ProgressTracker, username: &str) -> Result<i64> {
    let conn = tracker.db().conn();
    match queries::user_id_by_name(&conn, username)? {
        Some(id) => Ok(id),
        None => bail!("no such user: {} (try `learntrack add-user {}`)", username, username),
    }
}
