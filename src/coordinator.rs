//! Completion coordination
//!
//! [`ProgressTracker`] is the single entry point for every state mutation:
//! marking and unmarking completions, resetting progress, registering users,
//! and the dashboard read that piggybacks streak decay, challenge assignment,
//! and cumulative achievement checks. Each operation runs inside one
//! `BEGIN IMMEDIATE` transaction so point, streak, achievement, and challenge
//! effects land together or not at all; the leaderboard publish fires only
//! after a successful commit.

use chrono::{DateTime, Local};
use rand::Rng;
use rusqlite::TransactionBehavior;
use tracing::{info, warn};

use crate::achievements::{self, definitions::AchievementSlug, EvalContext, PageView};
use crate::broadcast::StatsBroadcaster;
use crate::challenge::{self, CompletedLessonInfo};
use crate::db::ProgressDb;
use crate::error::{Result, TrackerError};
use crate::models::{CompletionStatus, DashboardView, LeaderboardSnapshot, UncompleteStatus};
use crate::notify::{Notification, NotificationSink};
use crate::queries;
use crate::streak;

/// Central coordinator for progress tracking
#[derive(Clone)]
pub struct ProgressTracker {
    db: ProgressDb,
    broadcaster: StatsBroadcaster,
}

impl ProgressTracker {
    /// Open the tracker on the default database location
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::with_db(ProgressDb::open_default()?))
    }

    /// Open the tracker on a specific database path
    pub fn with_path(path: &std::path::Path) -> anyhow::Result<Self> {
        Ok(Self::with_db(ProgressDb::open(path)?))
    }

    pub fn with_db(db: ProgressDb) -> Self {
        let broadcaster = StatsBroadcaster::new(db.clone());
        Self { db, broadcaster }
    }

    pub fn db(&self) -> &ProgressDb {
        &self.db
    }

    /// The shared leaderboard channel
    pub fn broadcaster(&self) -> &StatsBroadcaster {
        &self.broadcaster
    }

    /// Publish a leaderboard snapshot after a committed change. Delivery is
    /// best-effort: the mutation has already committed, so a failed snapshot
    /// query must not turn a successful operation into an error.
    fn publish_after_commit(&self) {
        if let Err(err) = self.broadcaster.publish() {
            warn!(error = %err, "leaderboard publish failed after commit");
        }
    }

    /// Create a user with their profile and streak rows in one transaction.
    /// This replaces implicit creation hooks: everything a fresh user needs
    /// exists before the call returns.
    pub fn register_user(&self, username: &str) -> Result<i64> {
        let user_id = {
            let mut conn = self.db.conn();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            if queries::user_id_by_name(&tx, username)?.is_some() {
                return Err(TrackerError::DuplicateUser(username.to_string()));
            }

            tx.execute("INSERT INTO users (username) VALUES (?1)", [username])?;
            let user_id = tx.last_insert_rowid();
            tx.execute("INSERT INTO profiles (user_id) VALUES (?1)", [user_id])?;
            tx.execute("INSERT INTO streaks (user_id) VALUES (?1)", [user_id])?;

            tx.commit()?;
            user_id
        };

        info!(username, user_id, "registered user");
        self.publish_after_commit();
        Ok(user_id)
    }

    /// Mark a lesson complete for the user, with all gamification effects.
    pub fn mark_complete(
        &self,
        user_id: i64,
        lesson_id: i64,
        sink: &dyn NotificationSink,
    ) -> Result<CompletionStatus> {
        self.mark_complete_at(user_id, lesson_id, Local::now(), sink)
    }

    /// Like [`Self::mark_complete`] with an explicit completion time.
    pub fn mark_complete_at(
        &self,
        user_id: i64,
        lesson_id: i64,
        now: DateTime<Local>,
        sink: &dyn NotificationSink,
    ) -> Result<CompletionStatus> {
        let today = now.date_naive();

        let (lesson_title, status) = {
            let mut conn = self.db.conn();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let lesson = queries::lesson(&tx, lesson_id)?
                .ok_or(TrackerError::LessonNotFound(lesson_id))?;
            queries::profile(&tx, user_id)?.ok_or(TrackerError::UserNotFound(user_id))?;

            tx.execute(
                r#"INSERT OR IGNORE INTO completions (user_id, lesson_id, completed_at, completed_on)
                   VALUES (?1, ?2, ?3, ?4)"#,
                (
                    user_id,
                    lesson_id,
                    now.timestamp_millis(),
                    streak::date_to_str(today),
                ),
            )?;
            if tx.changes() == 0 {
                // Already completed; nothing to change
                return Ok(CompletionStatus::AlreadyCompleted);
            }

            tx.execute(
                "UPDATE profiles SET total_points = total_points + ?2 WHERE user_id = ?1",
                (user_id, lesson.points_value),
            )?;

            let streak_state = streak::update_streak(&tx, user_id, today)?;

            let ctx = EvalContext {
                completed_lesson: Some(&lesson),
                completed_at: Some(now),
                challenge_completed: false,
                page: None,
                today,
            };
            achievements::evaluate(&tx, user_id, &ctx, sink)?;

            let info = CompletedLessonInfo {
                kind: lesson.kind,
                points_earned: lesson.points_value,
            };
            let challenge_done =
                challenge::update_progress(&tx, user_id, today, Some(&info), lesson.points_value, sink)?;
            if challenge_done {
                let ctx = EvalContext {
                    challenge_completed: true,
                    ..ctx
                };
                achievements::evaluate(&tx, user_id, &ctx, sink)?;
            }

            tx.commit()?;

            (
                lesson.title.clone(),
                CompletionStatus::Completed {
                    points_awarded: lesson.points_value,
                    current_streak: streak_state.current,
                },
            )
        };

        if let CompletionStatus::Completed {
            points_awarded,
            current_streak,
        } = &status
        {
            sink.send(Notification::LessonCompleted {
                title: lesson_title,
                points: *points_awarded,
                streak: *current_streak,
            });
        }
        self.publish_after_commit();
        Ok(status)
    }

    /// Remove a completion, subtracting its points (clamped at zero).
    /// Streaks and achievements earned on the way are deliberately kept.
    pub fn unmark_complete(
        &self,
        user_id: i64,
        lesson_id: i64,
        sink: &dyn NotificationSink,
    ) -> Result<UncompleteStatus> {
        let (lesson_title, points) = {
            let mut conn = self.db.conn();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let lesson = queries::lesson(&tx, lesson_id)?
                .ok_or(TrackerError::LessonNotFound(lesson_id))?;
            queries::profile(&tx, user_id)?.ok_or(TrackerError::UserNotFound(user_id))?;

            tx.execute(
                "DELETE FROM completions WHERE user_id = ?1 AND lesson_id = ?2",
                (user_id, lesson_id),
            )?;
            if tx.changes() == 0 {
                return Ok(UncompleteStatus::NotCompleted);
            }

            tx.execute(
                "UPDATE profiles SET total_points = MAX(0, total_points - ?2) WHERE user_id = ?1",
                (user_id, lesson.points_value),
            )?;

            tx.commit()?;
            (lesson.title.clone(), lesson.points_value)
        };

        sink.send(Notification::LessonUncompleted {
            title: lesson_title,
            points,
        });
        self.publish_after_commit();
        Ok(UncompleteStatus::Removed {
            points_subtracted: points,
        })
    }

    /// Wipe a user's progress: completions, achievements, points, streak,
    /// and today's challenge record. Irreversible.
    pub fn reset_progress(&self, user_id: i64, sink: &dyn NotificationSink) -> Result<()> {
        self.reset_progress_at(user_id, Local::now(), sink)
    }

    pub fn reset_progress_at(
        &self,
        user_id: i64,
        now: DateTime<Local>,
        sink: &dyn NotificationSink,
    ) -> Result<()> {
        {
            let mut conn = self.db.conn();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            queries::profile(&tx, user_id)?.ok_or(TrackerError::UserNotFound(user_id))?;

            tx.execute("DELETE FROM completions WHERE user_id = ?1", [user_id])?;
            tx.execute("DELETE FROM user_achievements WHERE user_id = ?1", [user_id])?;
            tx.execute(
                "UPDATE profiles SET total_points = 0 WHERE user_id = ?1",
                [user_id],
            )?;
            tx.execute(
                r#"UPDATE streaks
                   SET current_streak = 0, longest_streak = 0, last_activity_date = NULL
                   WHERE user_id = ?1"#,
                [user_id],
            )?;
            challenge::invalidate(&tx, user_id, now.date_naive())?;

            tx.commit()?;
        }

        info!(user_id, "progress reset");
        sink.send(Notification::ProgressReset);
        self.publish_after_commit();
        Ok(())
    }

    /// Dashboard read: applies passive streak decay, assigns today's
    /// challenge if due, re-runs cumulative achievement checks, and returns
    /// the assembled view.
    pub fn dashboard(&self, user_id: i64, sink: &dyn NotificationSink) -> Result<DashboardView> {
        self.dashboard_at(user_id, Local::now(), &mut rand::thread_rng(), sink)
    }

    pub fn dashboard_at<R: Rng + ?Sized>(
        &self,
        user_id: i64,
        now: DateTime<Local>,
        rng: &mut R,
        sink: &dyn NotificationSink,
    ) -> Result<DashboardView> {
        let today = now.date_naive();

        let (view, awarded) = {
            let mut conn = self.db.conn();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let profile =
                queries::profile(&tx, user_id)?.ok_or(TrackerError::UserNotFound(user_id))?;

            if streak::apply_decay(&tx, user_id, today)?.is_some() {
                sink.send(Notification::StreakReset);
            }

            let assignment = challenge::assign_new_challenge(&tx, user_id, today, rng)?;
            let awarded =
                achievements::evaluate(&tx, user_id, &EvalContext::cumulative(today), sink)?;

            // Re-read points: the cumulative pass may have awarded rewards
            let profile = queries::profile(&tx, user_id)?.unwrap_or(profile);
            let completed_count = queries::completed_lesson_count(&tx, user_id)?;
            let total_lessons = queries::total_lesson_count(&tx)?;
            let progress_percent = if total_lessons > 0 {
                ((completed_count as f64 / total_lessons as f64) * 100.0).round() as i64
            } else {
                0
            };

            let view = DashboardView {
                username: profile.username,
                total_points: profile.total_points,
                completed_count,
                total_lessons,
                progress_percent,
                streak: streak::get(&tx, user_id)?,
                challenge: assignment,
                sections: queries::section_progress(&tx, user_id)?,
                recent_achievements: queries::earned_achievements(&tx, user_id, Some(5))?,
            };

            tx.commit()?;
            (view, awarded)
        };

        if !awarded.is_empty() {
            self.publish_after_commit();
        }
        Ok(view)
    }

    /// Record that the user viewed a page with a one-time achievement
    /// attached. Returns any achievements newly awarded.
    pub fn record_page_view(
        &self,
        user_id: i64,
        page: PageView,
        sink: &dyn NotificationSink,
    ) -> Result<Vec<AchievementSlug>> {
        let awarded = {
            let mut conn = self.db.conn();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            queries::profile(&tx, user_id)?.ok_or(TrackerError::UserNotFound(user_id))?;

            let ctx = EvalContext {
                page: Some(page),
                ..EvalContext::cumulative(Local::now().date_naive())
            };
            let awarded = achievements::evaluate(&tx, user_id, &ctx, sink)?;
            tx.commit()?;
            awarded
        };

        if !awarded.is_empty() {
            self.publish_after_commit();
        }
        Ok(awarded)
    }

    /// Current leaderboard without subscribing
    pub fn leaderboard(&self) -> Result<LeaderboardSnapshot> {
        self.broadcaster.snapshot()
    }
}
