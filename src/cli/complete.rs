//! Complete / uncomplete commands

use anyhow::Result;
use std::path::Path;

use learntrack::models::{CompletionStatus, UncompleteStatus};
use learntrack::notify::ConsoleSink;

use super::{open_tracker, resolve_user};

pub fn complete_command(db_path: Option<&Path>, username: &str, lesson_id: i64) -> Result<()> {
    let tracker = open_tracker(db_path)?;
    let user_id = resolve_user(&tracker, username)?;

    match tracker.mark_complete(user_id, lesson_id, &ConsoleSink)? {
        CompletionStatus::Completed { .. } => {}
        CompletionStatus::AlreadyCompleted => {
            println!("Lesson {} is already completed.", lesson_id);
        }
    }
    Ok(())
}

pub fn uncomplete_command(db_path: Option<&Path>, username: &str, lesson_id: i64) -> Result<()> {
    let tracker = open_tracker(db_path)?;
    let user_id = resolve_user(&tracker, username)?;

    match tracker.unmark_complete(user_id, lesson_id, &ConsoleSink)? {
        UncompleteStatus::Removed { .. } => {}
        UncompleteStatus::NotCompleted => {
            println!("Lesson {} was not completed.", lesson_id);
        }
    }
    Ok(())
}
