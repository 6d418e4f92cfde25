//! Integration tests for the dashboard-driven gamification loop:
//! daily challenge assignment and completion, streak decay on load,
//! progress reset, and the live leaderboard stream.

mod common;

use chrono::Duration;
use rand::rngs::StdRng;
use rand::SeedableRng;

use learntrack::achievements::definitions::AchievementSlug;
use learntrack::achievements::PageView;
use learntrack::models::ChallengeKind;
use learntrack::notify::{MemorySink, Notification, NullSink};
use learntrack::queries;
use learntrack::streak;

use common::{at, lessons_worth, setup_tracker};

#[test]
fn test_lesson_count_challenge_completes_and_unlocks_achievement() {
    let (tracker, user_id) = setup_tracker("alice");
    common::keep_only_challenge(&tracker, ChallengeKind::CompleteNLessons, 3, 20);
    let now = at(2026, 3, 2);
    let sink = MemorySink::default();

    let mut rng = StdRng::seed_from_u64(7);
    let view = tracker.dashboard_at(user_id, now, &mut rng, &sink).unwrap();
    assert!(view.challenge.challenge.is_some());
    assert!(!view.challenge.is_completed());

    let lessons = lessons_worth(&tracker, 10);
    for lesson in lessons.iter().take(3) {
        tracker
            .mark_complete_at(user_id, lesson.id, now, &sink)
            .unwrap();
    }

    let rewards = sink
        .take()
        .into_iter()
        .filter(|n| matches!(n, Notification::ChallengeCompleted { .. }))
        .count();
    assert_eq!(rewards, 1);

    let conn = tracker.db().conn();
    let earned = queries::earned_achievements(&conn, user_id, None).unwrap();
    assert!(earned
        .iter()
        .any(|a| a.slug == AchievementSlug::FirstDailyChallenge.as_str()));
}

#[test]
fn test_challenge_replaced_next_day_keeps_lifetime_count() {
    let (tracker, user_id) = setup_tracker("alice");
    common::keep_only_challenge(&tracker, ChallengeKind::CompleteNLessons, 1, 20);
    let sink = NullSink;
    let mut rng = StdRng::seed_from_u64(7);

    let day1 = at(2026, 3, 2);
    tracker.dashboard_at(user_id, day1, &mut rng, &sink).unwrap();
    let lessons = lessons_worth(&tracker, 10);
    tracker
        .mark_complete_at(user_id, lessons[0].id, day1, &sink)
        .unwrap();

    // Next day the record is replaced in place, lifetime counter survives
    let day2 = day1 + Duration::days(1);
    let view = tracker.dashboard_at(user_id, day2, &mut rng, &sink).unwrap();
    assert_eq!(view.challenge.assigned_date, day2.date_naive());
    assert!(!view.challenge.is_completed());
    assert_eq!(view.challenge.completed_total, 1);
    assert_eq!(view.challenge.current_progress, 0);
}

#[test]
fn test_dashboard_applies_streak_decay() {
    let (tracker, user_id) = setup_tracker("alice");
    let day1 = at(2026, 3, 2);
    let lessons = lessons_worth(&tracker, 10);
    tracker
        .mark_complete_at(user_id, lessons[0].id, day1, &NullSink)
        .unwrap();

    // Two days of silence: current resets, longest survives
    let sink = MemorySink::default();
    let mut rng = StdRng::seed_from_u64(7);
    let view = tracker
        .dashboard_at(user_id, day1 + Duration::days(2), &mut rng, &sink)
        .unwrap();
    assert_eq!(view.streak.current, 0);
    assert_eq!(view.streak.longest, 1);
    assert!(sink
        .take()
        .iter()
        .any(|n| matches!(n, Notification::StreakReset)));
}

#[test]
fn test_dashboard_next_day_keeps_streak() {
    let (tracker, user_id) = setup_tracker("alice");
    let day1 = at(2026, 3, 2);
    let lessons = lessons_worth(&tracker, 10);
    tracker
        .mark_complete_at(user_id, lessons[0].id, day1, &NullSink)
        .unwrap();

    // The day after an activity day is not yet a miss
    let mut rng = StdRng::seed_from_u64(7);
    let view = tracker
        .dashboard_at(user_id, day1 + Duration::days(1), &mut rng, &NullSink)
        .unwrap();
    assert_eq!(view.streak.current, 1);
}

#[test]
fn test_reset_wipes_progress_and_challenge_reassigns() {
    let (tracker, user_id) = setup_tracker("alice");
    let now = at(2026, 3, 2);
    let sink = NullSink;
    let mut rng = StdRng::seed_from_u64(7);

    tracker.dashboard_at(user_id, now, &mut rng, &sink).unwrap();
    let lessons = lessons_worth(&tracker, 10);
    for lesson in lessons.iter().take(3) {
        tracker
            .mark_complete_at(user_id, lesson.id, now, &sink)
            .unwrap();
    }

    tracker.reset_progress_at(user_id, now, &sink).unwrap();

    {
        let conn = tracker.db().conn();
        let profile = queries::profile(&conn, user_id).unwrap().unwrap();
        assert_eq!(profile.total_points, 0);
        assert_eq!(queries::completed_lesson_count(&conn, user_id).unwrap(), 0);
        assert!(queries::earned_achievements(&conn, user_id, None)
            .unwrap()
            .is_empty());
        let streak = streak::get(&conn, user_id).unwrap();
        assert_eq!(streak.current, 0);
        assert_eq!(streak.longest, 0);
        assert!(streak.last_activity_date.is_none());
    }

    // The next dashboard load hands out a fresh challenge for today
    let view = tracker.dashboard_at(user_id, now, &mut rng, &sink).unwrap();
    assert!(view.challenge.challenge.is_some());
    assert_eq!(view.challenge.assigned_date, now.date_naive());
    assert_eq!(view.challenge.current_progress, 0);
    assert_eq!(view.challenge.completed_total, 0);
}

#[test]
fn test_point_milestone_awarded_on_crossing() {
    let (tracker, user_id) = setup_tracker("alice");
    let now = at(2026, 3, 2);

    let mut total = 0;
    for lesson in common::all_lessons(&tracker) {
        if total >= 100 {
            break;
        }
        tracker
            .mark_complete_at(user_id, lesson.id, now, &NullSink)
            .unwrap();
        total += lesson.points_value;
    }

    let conn = tracker.db().conn();
    let earned = queries::earned_achievements(&conn, user_id, None).unwrap();
    assert!(earned
        .iter()
        .any(|a| a.slug == AchievementSlug::Points100.as_str()));
}

#[tokio::test]
async fn test_leaderboard_stream_reflects_completions() {
    let (tracker, _alice) = setup_tracker("alice");
    let bob = tracker.register_user("bob").unwrap();
    let now = at(2026, 3, 2);

    let (initial, mut rx) = tracker.broadcaster().subscribe().unwrap();
    assert_eq!(initial.entries.len(), 2);
    assert_eq!(initial.entries[0].total_points, 0);

    let project = common::first_project_lesson(&tracker);
    tracker
        .mark_complete_at(bob, project.id, now, &NullSink)
        .unwrap();

    let update = rx.recv().await.unwrap();
    assert_eq!(update.entries[0].username, "bob");
    assert!(update.entries[0].total_points >= project.points_value);
    assert_eq!(update.entries[1].username, "alice");
}

#[test]
fn test_page_view_awards_visit_achievement_once() {
    let (tracker, user_id) = setup_tracker("alice");

    let awarded = tracker
        .record_page_view(user_id, PageView::Leaderboard, &NullSink)
        .unwrap();
    assert_eq!(awarded, vec![AchievementSlug::LeaderboardVisited]);

    // Repeat views award nothing new
    let again = tracker
        .record_page_view(user_id, PageView::Leaderboard, &NullSink)
        .unwrap();
    assert!(again.is_empty());

    let conn = tracker.db().conn();
    let earned = queries::earned_achievements(&conn, user_id, None).unwrap();
    assert_eq!(earned.len(), 1);
    assert_eq!(earned[0].slug, AchievementSlug::LeaderboardVisited.as_str());
}

#[test]
fn test_publish_failure_does_not_fail_committed_mutation() {
    let (tracker, user_id) = setup_tracker("alice");
    // Break the snapshot query only: the mutation path never reads is_active
    tracker
        .db()
        .conn()
        .execute("ALTER TABLE users DROP COLUMN is_active", [])
        .unwrap();

    let lessons = lessons_worth(&tracker, 10);
    let status = tracker
        .mark_complete_at(user_id, lessons[0].id, at(2026, 3, 2), &NullSink)
        .unwrap();
    assert!(matches!(
        status,
        learntrack::models::CompletionStatus::Completed { .. }
    ));

    // The completion itself committed
    let conn = tracker.db().conn();
    assert_eq!(queries::completed_lesson_count(&conn, user_id).unwrap(), 1);
}

#[test]
fn test_duplicate_user_rejected() {
    let (tracker, _alice) = setup_tracker("alice");
    let err = tracker.register_user("alice").unwrap_err();
    assert!(matches!(err, learntrack::TrackerError::DuplicateUser(_)));
}

#[test]
fn test_unknown_lesson_and_user_errors() {
    let (tracker, user_id) = setup_tracker("alice");
    let now = at(2026, 3, 2);

    let err = tracker
        .mark_complete_at(user_id, 9999, now, &NullSink)
        .unwrap_err();
    assert!(matches!(err, learntrack::TrackerError::LessonNotFound(9999)));

    let err = tracker
        .mark_complete_at(404, 1, now, &NullSink)
        .unwrap_err();
    assert!(matches!(err, learntrack::TrackerError::UserNotFound(404)));
}
