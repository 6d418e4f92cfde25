//! Error types for the progress engine
//!
//! "Already completed" / "not completed" are not errors; they are reported
//! through the status enums in [`crate::models`]. Busy/locked storage errors
//! surface through the `Storage` variant and roll the whole transaction back.

/// Error type for progress-tracking operations
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("lesson {0} does not exist")]
    LessonNotFound(i64),

    #[error("user {0} does not exist")]
    UserNotFound(i64),

    #[error("username '{0}' is already taken")]
    DuplicateUser(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
