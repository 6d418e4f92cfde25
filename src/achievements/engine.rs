//! Achievement award engine
//!
//! Every rule is level-triggered and re-evaluated on each relevant event;
//! idempotence comes solely from the per-achievement existence check in
//! [`award_if_unearned`], never from external debouncing. Rules run inside
//! the caller's transaction, after the point/streak updates for the same
//! event, so their queries see the just-updated values.

use chrono::{DateTime, Datelike, Local, NaiveDate, Weekday};
use rusqlite::{Connection, OptionalExtension};
use tracing::warn;

use super::definitions::AchievementSlug;
use crate::error::Result;
use crate::models::{Lesson, LessonKind};
use crate::notify::{Notification, NotificationSink};
use crate::streak;

/// Page a user viewed, for the one-time visit achievements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageView {
    Leaderboard,
    Achievements,
    Reset,
}

/// Context for one evaluation pass
pub struct EvalContext<'a> {
    /// The completion that triggered this pass, if any
    pub completed_lesson: Option<&'a Lesson>,
    /// Timestamp of that completion
    pub completed_at: Option<DateTime<Local>>,
    /// A daily challenge was completed in this same action
    pub challenge_completed: bool,
    /// Page the user just viewed, if this pass comes from a page load
    pub page: Option<PageView>,
    pub today: NaiveDate,
}

impl<'a> EvalContext<'a> {
    /// Cumulative-only pass with no triggering event (dashboard load)
    pub fn cumulative(today: NaiveDate) -> Self {
        Self {
            completed_lesson: None,
            completed_at: None,
            challenge_completed: false,
            page: None,
            today,
        }
    }
}

/// Award an achievement unless the user already has it.
///
/// Unknown slugs (catalog row missing) log a warning and report not-awarded.
/// A newly created award adds the achievement's point reward to the user's
/// profile and emits a notification. Returns whether the award was new.
pub fn award_if_unearned(
    conn: &Connection,
    user_id: i64,
    slug: AchievementSlug,
    now_ms: i64,
    sink: &dyn NotificationSink,
) -> Result<bool> {
    let row = conn
        .query_row(
            "SELECT title, points_reward FROM achievements WHERE slug = ?1",
            [slug.as_str()],
            |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)),
        )
        .optional()?;

    let Some((title, points_reward)) = row else {
        warn!(slug = slug.as_str(), "achievement slug missing from catalog");
        return Ok(false);
    };

    conn.execute(
        "INSERT OR IGNORE INTO user_achievements (user_id, slug, awarded_at) VALUES (?1, ?2, ?3)",
        (user_id, slug.as_str(), now_ms),
    )?;
    if conn.changes() == 0 {
        return Ok(false);
    }

    let updated = conn.execute(
        "UPDATE profiles SET total_points = total_points + ?2 WHERE user_id = ?1",
        (user_id, points_reward),
    )?;
    if updated == 0 {
        warn!(user_id, "profile missing while awarding achievement");
    }

    sink.send(Notification::AchievementUnlocked {
        title,
        points: points_reward,
    });
    Ok(true)
}

/// Run every rule against current state and award whatever is due.
/// Returns the achievements newly awarded in this pass.
pub fn evaluate(
    conn: &Connection,
    user_id: i64,
    ctx: &EvalContext<'_>,
    sink: &dyn NotificationSink,
) -> Result<Vec<AchievementSlug>> {
    let mut due = Vec::new();

    due.extend(completion_rules(conn, user_id, ctx)?);
    due.extend(section_rules(conn, user_id, ctx)?);
    due.extend(streak_rules(conn, user_id)?);
    due.extend(point_rules(conn, user_id)?);
    if ctx.challenge_completed {
        due.extend(challenge_rules(conn, user_id)?);
    }
    if let Some(page) = ctx.page {
        due.push(match page {
            PageView::Leaderboard => AchievementSlug::LeaderboardVisited,
            PageView::Achievements => AchievementSlug::AchievementsVisited,
            PageView::Reset => AchievementSlug::ResetVisited,
        });
    }

    let now_ms = ctx
        .completed_at
        .map(|t| t.timestamp_millis())
        .unwrap_or_else(|| Local::now().timestamp_millis());

    let mut awarded = Vec::new();
    for slug in due {
        if award_if_unearned(conn, user_id, slug, now_ms, sink)? {
            awarded.push(slug);
        }
    }
    Ok(awarded)
}

fn completion_count(conn: &Connection, user_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM completions WHERE user_id = ?1",
        [user_id],
        |r| r.get(0),
    )?)
}

fn completion_rules(
    conn: &Connection,
    user_id: i64,
    ctx: &EvalContext<'_>,
) -> Result<Vec<AchievementSlug>> {
    let mut due = Vec::new();
    let total = completion_count(conn, user_id)?;

    if total == 1 {
        due.push(AchievementSlug::FirstLesson);
    }

    if let Some(lesson) = ctx.completed_lesson {
        if lesson.kind == LessonKind::Project {
            let projects: i64 = conn.query_row(
                r#"SELECT COUNT(*) FROM completions c
                   JOIN lessons l ON l.id = c.lesson_id
                   WHERE c.user_id = ?1 AND l.lesson_type = 'Project'"#,
                [user_id],
                |r| r.get(0),
            )?;
            if projects == 1 {
                due.push(AchievementSlug::FirstProject);
            }
        }

        if let Some(at) = ctx.completed_at {
            if matches!(at.weekday(), Weekday::Sat | Weekday::Sun) {
                due.push(AchievementSlug::WeekendLearner);
            }
        }

        let today_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM completions WHERE user_id = ?1 AND completed_on = ?2",
            (user_id, streak::date_to_str(ctx.today)),
            |r| r.get(0),
        )?;
        if today_count >= 3 {
            due.push(AchievementSlug::LearningSpree);
        }
    }

    let catalog_total: i64 = conn.query_row("SELECT COUNT(*) FROM lessons", [], |r| r.get(0))?;
    if catalog_total > 0 && total >= catalog_total {
        due.push(AchievementSlug::CourseCompleted);
    }

    Ok(due)
}

/// Is every lesson of `section_id` completed by this user?
fn section_complete(conn: &Connection, user_id: i64, section_id: i64) -> Result<bool> {
    let (total, done): (i64, i64) = conn.query_row(
        r#"SELECT COUNT(*),
                  COUNT(c.id)
           FROM lessons l
           LEFT JOIN completions c ON c.lesson_id = l.id AND c.user_id = ?1
           WHERE l.section_id = ?2"#,
        (user_id, section_id),
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    Ok(total > 0 && total == done)
}

fn section_rules(
    conn: &Connection,
    user_id: i64,
    ctx: &EvalContext<'_>,
) -> Result<Vec<AchievementSlug>> {
    let mut due = Vec::new();

    // Named-section achievements are cumulative: checked on every pass for
    // each section that carries a dedicated achievement.
    let mut stmt = conn.prepare("SELECT id, slug FROM sections")?;
    let sections: Vec<(i64, String)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<std::result::Result<_, _>>()?;

    for (section_id, slug) in &sections {
        if let Some(achievement) = AchievementSlug::for_section(slug) {
            if section_complete(conn, user_id, *section_id)? {
                due.push(achievement);
            }
        }
    }

    // Generic "perfect section": only when the just-completed lesson filled
    // out its section. Awardable once total, not once per section.
    if let Some(lesson) = ctx.completed_lesson {
        if section_complete(conn, user_id, lesson.section_id)? {
            due.push(AchievementSlug::PerfectSection);
        }
    }

    Ok(due)
}

fn streak_rules(conn: &Connection, user_id: i64) -> Result<Vec<AchievementSlug>> {
    let state = streak::get(conn, user_id)?;
    let mut due = Vec::new();
    for (threshold, slug) in [
        (3, AchievementSlug::Streak3),
        (7, AchievementSlug::Streak7),
        (30, AchievementSlug::Streak30),
    ] {
        if state.current >= threshold {
            due.push(slug);
        }
    }
    Ok(due)
}

fn point_rules(conn: &Connection, user_id: i64) -> Result<Vec<AchievementSlug>> {
    let points: Option<i64> = conn
        .query_row(
            "SELECT total_points FROM profiles WHERE user_id = ?1",
            [user_id],
            |r| r.get(0),
        )
        .optional()?;
    let Some(points) = points else {
        return Ok(Vec::new());
    };

    let mut due = Vec::new();
    for (threshold, slug) in [
        (100, AchievementSlug::Points100),
        (500, AchievementSlug::Points500),
        (1000, AchievementSlug::Points1000),
    ] {
        if points >= threshold {
            due.push(slug);
        }
    }
    Ok(due)
}

fn challenge_rules(conn: &Connection, user_id: i64) -> Result<Vec<AchievementSlug>> {
    let completed: Option<i64> = conn
        .query_row(
            "SELECT completed_total FROM user_daily_challenges WHERE user_id = ?1",
            [user_id],
            |r| r.get(0),
        )
        .optional()?;
    let completed = completed.unwrap_or(0);

    let mut due = Vec::new();
    if completed >= 1 {
        due.push(AchievementSlug::FirstDailyChallenge);
    }
    if completed >= 5 {
        due.push(AchievementSlug::FiveDailyChallenges);
    }
    Ok(due)
}
