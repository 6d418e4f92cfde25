//! Daily streak tracking
//!
//! A streak counts consecutive calendar days with at least one completion.
//! `update_streak` runs on each newly created completion (never on removal);
//! `apply_decay` is the passive reset performed opportunistically on reads.

use chrono::{Duration, NaiveDate};
use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;
use crate::models::StreakState;

const DATE_FMT: &str = "%Y-%m-%d";

pub(crate) fn date_to_str(d: NaiveDate) -> String {
    d.format(DATE_FMT).to_string()
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FMT).ok()
}

/// Load a user's streak, creating the row if it does not exist yet.
pub fn get_or_create(conn: &Connection, user_id: i64) -> Result<StreakState> {
    conn.execute(
        "INSERT OR IGNORE INTO streaks (user_id) VALUES (?1)",
        [user_id],
    )?;
    get(conn, user_id)
}

/// Load a user's streak state. Missing row reads as the zero streak.
pub fn get(conn: &Connection, user_id: i64) -> Result<StreakState> {
    let row = conn
        .query_row(
            "SELECT current_streak, longest_streak, last_activity_date FROM streaks WHERE user_id = ?1",
            [user_id],
            |r| {
                Ok((
                    r.get::<_, u32>(0)?,
                    r.get::<_, u32>(1)?,
                    r.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .optional()?;

    Ok(match row {
        Some((current, longest, last)) => StreakState {
            current,
            longest,
            last_activity_date: last.as_deref().and_then(parse_date),
        },
        None => StreakState::default(),
    })
}

/// Advance the streak for activity on `today`.
///
/// Same-day repeats are a no-op; activity the day after the last one extends
/// the streak; anything else (gap, first activity) restarts it at 1.
/// `longest_streak` never decreases.
pub fn update_streak(conn: &Connection, user_id: i64, today: NaiveDate) -> Result<StreakState> {
    let state = get_or_create(conn, user_id)?;

    if state.last_activity_date == Some(today) {
        return Ok(state);
    }

    let current = if state.last_activity_date == Some(today - Duration::days(1)) {
        state.current + 1
    } else {
        1
    };
    let longest = current.max(state.longest);

    conn.execute(
        r#"UPDATE streaks
           SET current_streak = ?2, longest_streak = ?3, last_activity_date = ?4
           WHERE user_id = ?1"#,
        (user_id, current, longest, date_to_str(today)),
    )?;

    Ok(StreakState {
        current,
        longest,
        last_activity_date: Some(today),
    })
}

/// Passive decay check: if the last activity is older than yesterday, reset
/// `current_streak` to 0 without touching `longest_streak` or
/// `last_activity_date`. Returns the reset state when a reset happened.
pub fn apply_decay(conn: &Connection, user_id: i64, today: NaiveDate) -> Result<Option<StreakState>> {
    let state = get_or_create(conn, user_id)?;

    let stale = match state.last_activity_date {
        Some(last) => last < today - Duration::days(1),
        None => false,
    };

    if !stale || state.current == 0 {
        return Ok(None);
    }

    conn.execute(
        "UPDATE streaks SET current_streak = 0 WHERE user_id = ?1",
        [user_id],
    )?;

    Ok(Some(StreakState {
        current: 0,
        ..state
    }))
}
