//! User-facing notification sink
//!
//! Fire-and-forget messages emitted while a completion transaction runs.
//! Background/automated callers pass [`NullSink`]; the CLI prints; tests
//! collect into a [`MemorySink`].

use std::sync::Mutex;

use serde::Serialize;

/// Something the user should be told about
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Notification {
    LessonCompleted {
        title: String,
        points: i64,
        streak: u32,
    },
    LessonUncompleted {
        title: String,
        points: i64,
    },
    AchievementUnlocked {
        title: String,
        points: i64,
    },
    ChallengeCompleted {
        title: String,
        points: i64,
    },
    StreakReset,
    ProgressReset,
}

/// Sink for user-facing notifications. Implementations must not fail;
/// delivery is best-effort.
pub trait NotificationSink: Send + Sync {
    fn send(&self, note: Notification);
}

/// Discards everything (background callers)
pub struct NullSink;

impl NotificationSink for NullSink {
    fn send(&self, _note: Notification) {}
}

/// Prints notifications to stdout (CLI)
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn send(&self, note: Notification) {
        match note {
            Notification::LessonCompleted { title, points, streak } => {
                println!("'{title}' marked as complete! +{points} points. Streak: {streak} day(s)!");
            }
            Notification::LessonUncompleted { title, points } => {
                println!("'{title}' marked as incomplete. (-{points} points)");
            }
            Notification::AchievementUnlocked { title, points } => {
                println!("Achievement unlocked: {title}! (+{points} points)");
            }
            Notification::ChallengeCompleted { title, points } => {
                println!("Daily challenge completed: {title}! (+{points} bonus points)");
            }
            Notification::StreakReset => {
                println!("Your streak was reset due to inactivity. Keep learning daily!");
            }
            Notification::ProgressReset => {
                println!("Your progress has been reset.");
            }
        }
    }
}

/// Collects notifications in memory (tests)
#[derive(Default)]
pub struct MemorySink {
    notes: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notes.lock().expect("sink lock"))
    }
}

impl NotificationSink for MemorySink {
    fn send(&self, note: Notification) {
        self.notes.lock().expect("sink lock").push(note);
    }
}
