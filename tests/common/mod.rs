//! Shared helpers for integration tests
#![allow(dead_code)]

use chrono::{DateTime, Local, TimeZone};

use learntrack::models::{ChallengeKind, Lesson, LessonKind};
use learntrack::{queries, seed, ProgressDb, ProgressTracker};

/// In-memory tracker with the seeded catalog and one registered user
pub fn setup_tracker(username: &str) -> (ProgressTracker, i64) {
    let db = ProgressDb::open_in_memory().unwrap();
    {
        let conn = db.conn();
        seed::seed_catalog(&conn).unwrap();
    }
    let tracker = ProgressTracker::with_db(db);
    let user_id = tracker.register_user(username).unwrap();
    (tracker, user_id)
}

/// A fixed local time on the given date (10:00, avoids midnight edges)
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, 10, 0, 0)
        .single()
        .unwrap()
}

pub fn all_lessons(tracker: &ProgressTracker) -> Vec<Lesson> {
    let conn = tracker.db().conn();
    let ids: Vec<i64> = conn
        .prepare("SELECT id FROM lessons ORDER BY id")
        .unwrap()
        .query_map([], |r| r.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    ids.into_iter()
        .map(|id| queries::lesson(&conn, id).unwrap().unwrap())
        .collect()
}

pub fn first_project_lesson(tracker: &ProgressTracker) -> Lesson {
    all_lessons(tracker)
        .into_iter()
        .find(|l| l.kind == LessonKind::Project)
        .unwrap()
}

pub fn lessons_worth(tracker: &ProgressTracker, points: i64) -> Vec<Lesson> {
    all_lessons(tracker)
        .into_iter()
        .filter(|l| l.points_value == points)
        .collect()
}

/// Replace the challenge catalog with a single challenge of the given shape
pub fn keep_only_challenge(tracker: &ProgressTracker, kind: ChallengeKind, target: i64, reward: i64) {
    let conn = tracker.db().conn();
    conn.execute("DELETE FROM daily_challenges", []).unwrap();
    conn.execute(
        r#"INSERT INTO daily_challenges (title, description, challenge_type, target_value, points_reward)
           VALUES ('Test Challenge', 'test', ?1, ?2, ?3)"#,
        (kind.as_str(), target, reward),
    )
    .unwrap();
}
