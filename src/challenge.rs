//! Daily challenge assignment and progress
//!
//! Each user holds exactly one challenge record, replaced in place on the
//! first touch of each new calendar day. The day's lifecycle:
//! no record / stale record -> assigned -> in progress -> completed, and the
//! completed state is terminal until the next day.

use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::{Connection, OptionalExtension};
use tracing::warn;

use crate::error::Result;
use crate::models::{ChallengeAssignment, ChallengeKind, DailyChallenge, LessonKind};
use crate::notify::{Notification, NotificationSink};
use crate::streak::{date_to_str, parse_date};

/// What the just-completed lesson contributes to challenge progress
#[derive(Debug, Clone, Copy)]
pub struct CompletedLessonInfo {
    pub kind: LessonKind,
    pub points_earned: i64,
}

fn load_challenge(conn: &Connection, id: i64) -> Result<Option<DailyChallenge>> {
    let row = conn
        .query_row(
            r#"SELECT id, title, description, challenge_type, target_value, points_reward, is_active
               FROM daily_challenges WHERE id = ?1"#,
            [id],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, i64>(4)?,
                    r.get::<_, i64>(5)?,
                    r.get::<_, bool>(6)?,
                ))
            },
        )
        .optional()?;

    Ok(row.and_then(|(id, title, description, kind, target_value, points_reward, is_active)| {
        let kind = ChallengeKind::from_str(&kind)?;
        Some(DailyChallenge {
            id,
            title,
            description,
            kind,
            target_value,
            points_reward,
            is_active,
        })
    }))
}

fn load_assignment(conn: &Connection, user_id: i64) -> Result<Option<ChallengeAssignment>> {
    let row = conn
        .query_row(
            r#"SELECT challenge_id, assigned_date, completed_date, current_progress,
                      initial_points, completed_total
               FROM user_daily_challenges WHERE user_id = ?1"#,
            [user_id],
            |r| {
                Ok((
                    r.get::<_, Option<i64>>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, Option<String>>(2)?,
                    r.get::<_, i64>(3)?,
                    r.get::<_, Option<i64>>(4)?,
                    r.get::<_, i64>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((challenge_id, assigned, completed, progress, initial, total)) = row else {
        return Ok(None);
    };

    let challenge = match challenge_id {
        Some(id) => load_challenge(conn, id)?,
        None => None,
    };

    Ok(Some(ChallengeAssignment {
        challenge,
        assigned_date: parse_date(&assigned).unwrap_or(NaiveDate::MIN),
        completed_date: completed.as_deref().and_then(parse_date),
        current_progress: progress,
        initial_points: initial,
        completed_total: total,
    }))
}

/// Current assignment for the user, whatever its date. None if the user has
/// never been assigned one.
pub fn current_assignment(conn: &Connection, user_id: i64) -> Result<Option<ChallengeAssignment>> {
    load_assignment(conn, user_id)
}

/// Assign a challenge for `today` if the user has none yet, or the existing
/// record is from a previous day. Re-calling on the same day returns the
/// existing record unchanged, completed or not.
pub fn assign_new_challenge<R: Rng + ?Sized>(
    conn: &Connection,
    user_id: i64,
    today: NaiveDate,
    rng: &mut R,
) -> Result<ChallengeAssignment> {
    if let Some(existing) = load_assignment(conn, user_id)? {
        if existing.assigned_date >= today {
            return Ok(existing);
        }
    }

    let mut stmt = conn.prepare("SELECT id FROM daily_challenges WHERE is_active = 1")?;
    let active: Vec<i64> = stmt
        .query_map([], |r| r.get(0))?
        .collect::<std::result::Result<_, _>>()?;

    let selected = match active.choose(rng) {
        Some(id) => load_challenge(conn, *id)?,
        None => {
            warn!(user_id, "no active daily challenges to assign");
            None
        }
    };

    let initial_points: Option<i64> = match &selected {
        Some(c) if c.kind == ChallengeKind::EarnNPoints => {
            let points: Option<i64> = conn
                .query_row(
                    "SELECT total_points FROM profiles WHERE user_id = ?1",
                    [user_id],
                    |r| r.get(0),
                )
                .optional()?;
            if points.is_none() {
                warn!(user_id, "profile missing at challenge assignment");
            }
            Some(points.unwrap_or(0))
        }
        _ => None,
    };

    conn.execute(
        r#"INSERT INTO user_daily_challenges
               (user_id, challenge_id, assigned_date, completed_date, current_progress, initial_points)
           VALUES (?1, ?2, ?3, NULL, 0, ?4)
           ON CONFLICT(user_id) DO UPDATE SET
               challenge_id = ?2, assigned_date = ?3, completed_date = NULL,
               current_progress = 0, initial_points = ?4"#,
        (user_id, selected.as_ref().map(|c| c.id), date_to_str(today), initial_points),
    )?;

    load_assignment(conn, user_id)?
        .ok_or_else(|| rusqlite::Error::QueryReturnedNoRows.into())
}

/// Advance today's challenge from a completion action. No-op when there is
/// no record for today, no challenge assigned, or the challenge is already
/// completed. Returns true when the challenge was newly completed (the
/// reward is paid here, exactly once).
pub fn update_progress(
    conn: &Connection,
    user_id: i64,
    today: NaiveDate,
    lesson: Option<&CompletedLessonInfo>,
    points_earned_in_action: i64,
    sink: &dyn NotificationSink,
) -> Result<bool> {
    let Some(assignment) = load_assignment(conn, user_id)? else {
        return Ok(false);
    };
    if assignment.assigned_date != today || assignment.is_completed() {
        return Ok(false);
    }
    let Some(challenge) = &assignment.challenge else {
        return Ok(false);
    };

    let mut progress = assignment.current_progress;
    match challenge.kind {
        ChallengeKind::CompleteNLessons => {
            if lesson.is_some() {
                progress += 1;
            }
        }
        ChallengeKind::EarnNPoints => {
            let points: i64 = conn
                .query_row(
                    "SELECT total_points FROM profiles WHERE user_id = ?1",
                    [user_id],
                    |r| r.get(0),
                )
                .optional()?
                .unwrap_or(0);
            let gained = points - assignment.initial_points.unwrap_or(0);
            // Never let a transient point loss walk recorded progress back
            if gained > progress || (progress == 0 && gained == 0 && points_earned_in_action > 0) {
                progress = gained.max(0);
            }
        }
        ChallengeKind::CompleteProject => {
            if matches!(lesson, Some(info) if info.kind == LessonKind::Project) {
                // Binary: one project completes it regardless of target
                progress = 1;
            }
        }
    }

    if progress != assignment.current_progress {
        conn.execute(
            "UPDATE user_daily_challenges SET current_progress = ?2 WHERE user_id = ?1",
            (user_id, progress),
        )?;
    }

    if progress < challenge.target_value {
        return Ok(false);
    }

    conn.execute(
        r#"UPDATE user_daily_challenges
           SET completed_date = ?2, completed_total = completed_total + 1
           WHERE user_id = ?1"#,
        (user_id, date_to_str(today)),
    )?;

    let updated = conn.execute(
        "UPDATE profiles SET total_points = total_points + ?2 WHERE user_id = ?1",
        (user_id, challenge.points_reward),
    )?;
    if updated == 0 {
        warn!(user_id, "profile missing while paying challenge reward");
    }

    sink.send(Notification::ChallengeCompleted {
        title: challenge.title.clone(),
        points: challenge.points_reward,
    });
    Ok(true)
}

/// Invalidate the user's challenge record so the next read reassigns:
/// clears the challenge reference and backdates the assignment.
pub fn invalidate(conn: &Connection, user_id: i64, today: NaiveDate) -> Result<()> {
    conn.execute(
        r#"UPDATE user_daily_challenges
           SET challenge_id = NULL, assigned_date = ?2, completed_date = NULL,
               current_progress = 0, initial_points = NULL, completed_total = 0
           WHERE user_id = ?1"#,
        (user_id, date_to_str(today - Duration::days(1))),
    )?;
    Ok(())
}
