//! Read-side queries shared by the dashboard, CLI, and broadcaster

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;
use crate::models::{
    AwardedAchievement, LeaderboardEntry, LeaderboardSnapshot, Lesson, LessonKind, Section,
    SectionProgress, UserProfile,
};

pub fn user_id_by_name(conn: &Connection, username: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row("SELECT id FROM users WHERE username = ?1", [username], |r| r.get(0))
        .optional()?)
}

pub fn profile(conn: &Connection, user_id: i64) -> Result<Option<UserProfile>> {
    Ok(conn
        .query_row(
            r#"SELECT u.id, u.username, p.total_points
               FROM users u JOIN profiles p ON p.user_id = u.id
               WHERE u.id = ?1"#,
            [user_id],
            |r| {
                Ok(UserProfile {
                    user_id: r.get(0)?,
                    username: r.get(1)?,
                    total_points: r.get(2)?,
                })
            },
        )
        .optional()?)
}

pub fn lesson(conn: &Connection, lesson_id: i64) -> Result<Option<Lesson>> {
    let row = conn
        .query_row(
            r#"SELECT id, section_id, title, points_value, lesson_type, url, position
               FROM lessons WHERE id = ?1"#,
            [lesson_id],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, i64>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, i64>(3)?,
                    r.get::<_, String>(4)?,
                    r.get::<_, Option<String>>(5)?,
                    r.get::<_, i64>(6)?,
                ))
            },
        )
        .optional()?;

    Ok(row.and_then(|(id, section_id, title, points_value, kind, url, position)| {
        Some(Lesson {
            id,
            section_id,
            title,
            points_value,
            kind: LessonKind::from_str(&kind)?,
            url,
            position,
        })
    }))
}

pub fn completed_lesson_count(conn: &Connection, user_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM completions WHERE user_id = ?1",
        [user_id],
        |r| r.get(0),
    )?)
}

pub fn total_lesson_count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM lessons", [], |r| r.get(0))?)
}

/// Per-section completion counts for a user, in course order
pub fn section_progress(conn: &Connection, user_id: i64) -> Result<Vec<SectionProgress>> {
    let mut stmt = conn.prepare(
        r#"SELECT s.id, s.slug, s.title, s.position,
                  COUNT(l.id),
                  COUNT(c.id)
           FROM sections s
           LEFT JOIN lessons l ON l.section_id = s.id
           LEFT JOIN completions c ON c.lesson_id = l.id AND c.user_id = ?1
           GROUP BY s.id
           ORDER BY s.position"#,
    )?;
    let rows = stmt.query_map([user_id], |r| {
        Ok(SectionProgress {
            section: Section {
                id: r.get(0)?,
                slug: r.get(1)?,
                title: r.get(2)?,
                position: r.get(3)?,
            },
            lessons_total: r.get(4)?,
            lessons_completed: r.get(5)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<_, _>>()?)
}

/// A user's earned achievements, newest first
pub fn earned_achievements(
    conn: &Connection,
    user_id: i64,
    limit: Option<i64>,
) -> Result<Vec<AwardedAchievement>> {
    let mut stmt = conn.prepare(
        r#"SELECT ua.slug, a.title, a.points_reward, ua.awarded_at
           FROM user_achievements ua
           JOIN achievements a ON a.slug = ua.slug
           WHERE ua.user_id = ?1
           ORDER BY ua.awarded_at DESC
           LIMIT ?2"#,
    )?;
    let rows = stmt.query_map((user_id, limit.unwrap_or(-1)), |r| {
        Ok(AwardedAchievement {
            slug: r.get(0)?,
            title: r.get(1)?,
            points_reward: r.get(2)?,
            awarded_at: r.get(3)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<_, _>>()?)
}

/// Full leaderboard over active users, sorted descending by points
pub fn leaderboard_snapshot(conn: &Connection) -> Result<LeaderboardSnapshot> {
    let mut stmt = conn.prepare(
        r#"SELECT u.username, p.total_points
           FROM profiles p
           JOIN users u ON u.id = p.user_id
           WHERE u.is_active = 1
           ORDER BY p.total_points DESC, u.username ASC"#,
    )?;
    let entries = stmt
        .query_map([], |r| {
            Ok(LeaderboardEntry {
                username: r.get(0)?,
                total_points: r.get(1)?,
            })
        })?
        .collect::<std::result::Result<_, _>>()?;

    Ok(LeaderboardSnapshot {
        entries,
        generated_at: Utc::now().timestamp_millis(),
    })
}
