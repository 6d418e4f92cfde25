//! Data models for the progress tracker
//!
//! These structures represent the entities stored in and queried from the
//! progress database: course catalog, per-user progress state, and the
//! result/view objects handed back to callers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A user's points profile. One row per user, points never negative.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: String,
    pub total_points: i64,
}

/// Kind of lesson in the course catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LessonKind {
    Lesson,
    Project,
}

impl LessonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lesson => "Lesson",
            Self::Project => "Project",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Lesson" => Some(Self::Lesson),
            "Project" => Some(Self::Project),
            _ => None,
        }
    }
}

/// A section of the course (immutable reference data)
#[derive(Debug, Clone)]
pub struct Section {
    pub id: i64,
    /// Stable identifier used by section-completion achievements
    pub slug: String,
    pub title: String,
    pub position: i64,
}

/// A lesson within a section (immutable reference data)
#[derive(Debug, Clone)]
pub struct Lesson {
    pub id: i64,
    pub section_id: i64,
    pub title: String,
    pub points_value: i64,
    pub kind: LessonKind,
    pub url: Option<String>,
    /// Order within the section, unique per section
    pub position: i64,
}

/// A user's consecutive-day activity streak
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakState {
    pub current: u32,
    /// Monotonically non-decreasing while the streak record lives
    pub longest: u32,
    pub last_activity_date: Option<NaiveDate>,
}

/// Kind of daily challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeKind {
    CompleteNLessons,
    EarnNPoints,
    CompleteProject,
}

impl ChallengeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompleteNLessons => "COMPLETE_N_LESSONS",
            Self::EarnNPoints => "EARN_N_POINTS",
            Self::CompleteProject => "COMPLETE_PROJECT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "COMPLETE_N_LESSONS" => Some(Self::CompleteNLessons),
            "EARN_N_POINTS" => Some(Self::EarnNPoints),
            "COMPLETE_PROJECT" => Some(Self::CompleteProject),
            _ => None,
        }
    }
}

/// A daily challenge catalog entry
#[derive(Debug, Clone)]
pub struct DailyChallenge {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub kind: ChallengeKind,
    pub target_value: i64,
    pub points_reward: i64,
    pub is_active: bool,
}

/// The one active challenge record a user holds for a calendar day.
/// Replaced in place each new day; `challenge == None` means no active
/// challenge types were available at assignment time.
#[derive(Debug, Clone)]
pub struct ChallengeAssignment {
    pub challenge: Option<DailyChallenge>,
    pub assigned_date: NaiveDate,
    pub completed_date: Option<NaiveDate>,
    pub current_progress: i64,
    /// Points baseline snapshotted at assignment, EarnNPoints only
    pub initial_points: Option<i64>,
    /// Lifetime count of completed daily challenges
    pub completed_total: i64,
}

impl ChallengeAssignment {
    pub fn is_completed(&self) -> bool {
        self.completed_date.is_some()
    }
}

/// Result of a mark-complete call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionStatus {
    /// The completion was newly recorded
    Completed {
        points_awarded: i64,
        current_streak: u32,
    },
    /// A completion already existed; nothing changed
    AlreadyCompleted,
}

/// Result of an unmark-complete call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UncompleteStatus {
    /// The completion was removed and its points subtracted (clamped at 0)
    Removed { points_subtracted: i64 },
    /// No completion existed; nothing changed
    NotCompleted,
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub total_points: i64,
}

/// Full leaderboard snapshot published to subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardSnapshot {
    /// All active users, sorted descending by points
    pub entries: Vec<LeaderboardEntry>,
    /// Milliseconds since epoch when the snapshot was taken
    pub generated_at: i64,
}

/// An achievement a user has earned
#[derive(Debug, Clone)]
pub struct AwardedAchievement {
    pub slug: String,
    pub title: String,
    pub points_reward: i64,
    /// Milliseconds since epoch
    pub awarded_at: i64,
}

/// Per-section completion progress for the dashboard
#[derive(Debug, Clone)]
pub struct SectionProgress {
    pub section: Section,
    pub lessons_total: i64,
    pub lessons_completed: i64,
}

/// Everything the dashboard needs in one read
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub username: String,
    pub total_points: i64,
    pub completed_count: i64,
    pub total_lessons: i64,
    /// 0-100, rounded
    pub progress_percent: i64,
    pub streak: StreakState,
    pub challenge: ChallengeAssignment,
    pub sections: Vec<SectionProgress>,
    /// Most recently earned achievements, newest first
    pub recent_achievements: Vec<AwardedAchievement>,
}
