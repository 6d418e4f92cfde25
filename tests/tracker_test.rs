//! End-to-end tests over the full completion pipeline.
//!
//! These tests verify that:
//! 1. A first project completion awards its points plus first-lesson and
//!    first-project achievement rewards in one transaction
//! 2. Uncompleting restores the pre-completion point total and keeps
//!    earned achievements
//! 3. Consecutive-day completions extend the streak
//! 4. An EARN_N_POINTS challenge pays its reward exactly once
//! 5. Reset wipes everything and the next dashboard reassigns a challenge

mod common;

use chrono::Duration;
use rand::rngs::StdRng;
use rand::SeedableRng;

use learntrack::achievements::definitions::{AchievementDef, AchievementSlug};
use learntrack::models::{ChallengeKind, CompletionStatus, UncompleteStatus};
use learntrack::notify::{MemorySink, Notification, NullSink};
use learntrack::queries;

use common::{at, first_project_lesson, lessons_worth, setup_tracker};

#[test]
fn test_first_project_completion_awards_points_and_achievements() {
    let (tracker, user_id) = setup_tracker("alice");
    let sink = MemorySink::default();
    let now = at(2026, 3, 2);

    let project = first_project_lesson(&tracker);
    let status = tracker
        .mark_complete_at(user_id, project.id, now, &sink)
        .unwrap();

    let (points_awarded, current_streak) = match status {
        CompletionStatus::Completed {
            points_awarded,
            current_streak,
        } => (points_awarded, current_streak),
        other => panic!("expected Completed, got {:?}", other),
    };
    assert_eq!(points_awarded, project.points_value);
    assert_eq!(current_streak, 1);

    let conn = tracker.db().conn();
    let earned = queries::earned_achievements(&conn, user_id, None).unwrap();
    let slugs: Vec<&str> = earned.iter().map(|a| a.slug.as_str()).collect();
    assert!(slugs.contains(&AchievementSlug::FirstLesson.as_str()));
    assert!(slugs.contains(&AchievementSlug::FirstProject.as_str()));

    // Lesson points plus both achievement rewards
    let first_lesson_reward = AchievementDef::get(AchievementSlug::FirstLesson).points_reward;
    let first_project_reward = AchievementDef::get(AchievementSlug::FirstProject).points_reward;
    let profile = queries::profile(&conn, user_id).unwrap().unwrap();
    assert_eq!(
        profile.total_points,
        project.points_value + first_lesson_reward + first_project_reward
    );
}

#[test]
fn test_mark_complete_is_idempotent() {
    let (tracker, user_id) = setup_tracker("alice");
    let now = at(2026, 3, 2);
    let project = first_project_lesson(&tracker);

    tracker
        .mark_complete_at(user_id, project.id, now, &NullSink)
        .unwrap();
    let points_after_first = {
        let conn = tracker.db().conn();
        queries::profile(&conn, user_id).unwrap().unwrap().total_points
    };

    let second = tracker
        .mark_complete_at(user_id, project.id, now, &NullSink)
        .unwrap();
    assert!(matches!(second, CompletionStatus::AlreadyCompleted));

    let conn = tracker.db().conn();
    let profile = queries::profile(&conn, user_id).unwrap().unwrap();
    assert_eq!(profile.total_points, points_after_first);
    assert_eq!(queries::completed_lesson_count(&conn, user_id).unwrap(), 1);
}

#[test]
fn test_uncomplete_restores_points_and_keeps_achievements() {
    let (tracker, user_id) = setup_tracker("alice");
    let now = at(2026, 3, 2);
    let lesson = lessons_worth(&tracker, 10)[0].clone();

    tracker
        .mark_complete_at(user_id, lesson.id, now, &NullSink)
        .unwrap();
    let earned_before = {
        let conn = tracker.db().conn();
        queries::earned_achievements(&conn, user_id, None).unwrap().len()
    };
    assert!(earned_before >= 1);

    let removed = tracker
        .unmark_complete(user_id, lesson.id, &NullSink)
        .unwrap();
    assert!(matches!(
        removed,
        UncompleteStatus::Removed { points_subtracted } if points_subtracted == 10
    ));

    let conn = tracker.db().conn();
    let profile = queries::profile(&conn, user_id).unwrap().unwrap();
    // Back to the pre-completion total: achievement rewards remain
    let reward = AchievementDef::get(AchievementSlug::FirstLesson).points_reward;
    assert_eq!(profile.total_points, reward);
    assert_eq!(
        queries::earned_achievements(&conn, user_id, None).unwrap().len(),
        earned_before
    );
    assert_eq!(queries::completed_lesson_count(&conn, user_id).unwrap(), 0);
}

#[test]
fn test_uncomplete_clamps_at_zero() {
    let (tracker, user_id) = setup_tracker("alice");
    let now = at(2026, 3, 2);
    let lesson = lessons_worth(&tracker, 10)[0].clone();

    tracker
        .mark_complete_at(user_id, lesson.id, now, &NullSink)
        .unwrap();
    // Drain points below the lesson value
    tracker
        .db()
        .conn()
        .execute("UPDATE profiles SET total_points = 3 WHERE user_id = ?1", [user_id])
        .unwrap();

    tracker
        .unmark_complete(user_id, lesson.id, &NullSink)
        .unwrap();

    let conn = tracker.db().conn();
    let profile = queries::profile(&conn, user_id).unwrap().unwrap();
    assert_eq!(profile.total_points, 0);
}

#[test]
fn test_consecutive_days_extend_streak() {
    let (tracker, user_id) = setup_tracker("alice");
    let lessons = lessons_worth(&tracker, 10);
    let day1 = at(2026, 3, 2);

    for (i, lesson) in lessons.iter().take(3).enumerate() {
        let status = tracker
            .mark_complete_at(user_id, lesson.id, day1 + Duration::days(i as i64), &NullSink)
            .unwrap();
        if let CompletionStatus::Completed { current_streak, .. } = status {
            assert_eq!(current_streak, (i + 1) as u32);
        }
    }

    let conn = tracker.db().conn();
    let streak = learntrack::streak::get(&conn, user_id).unwrap();
    assert_eq!(streak.current, 3);
    assert_eq!(streak.longest, 3);
}

#[test]
fn test_missed_day_resets_streak_on_next_completion() {
    let (tracker, user_id) = setup_tracker("alice");
    let lessons = lessons_worth(&tracker, 10);

    tracker
        .mark_complete_at(user_id, lessons[0].id, at(2026, 3, 2), &NullSink)
        .unwrap();
    tracker
        .mark_complete_at(user_id, lessons[1].id, at(2026, 3, 3), &NullSink)
        .unwrap();
    // Skip March 4th
    let status = tracker
        .mark_complete_at(user_id, lessons[2].id, at(2026, 3, 5), &NullSink)
        .unwrap();

    assert!(matches!(
        status,
        CompletionStatus::Completed { current_streak: 1, .. }
    ));
    let conn = tracker.db().conn();
    let streak = learntrack::streak::get(&conn, user_id).unwrap();
    assert_eq!(streak.current, 1);
    assert_eq!(streak.longest, 2);
}

#[test]
fn test_weekend_completion_awards_weekend_learner() {
    let (tracker, user_id) = setup_tracker("alice");
    let lessons = lessons_worth(&tracker, 10);

    // 2026-03-07 is a Saturday
    tracker
        .mark_complete_at(user_id, lessons[0].id, at(2026, 3, 7), &NullSink)
        .unwrap();

    let conn = tracker.db().conn();
    let earned = queries::earned_achievements(&conn, user_id, None).unwrap();
    assert!(earned
        .iter()
        .any(|a| a.slug == AchievementSlug::WeekendLearner.as_str()));
}

#[test]
fn test_weekday_completion_does_not_award_weekend_learner() {
    let (tracker, user_id) = setup_tracker("alice");
    let lessons = lessons_worth(&tracker, 10);

    // 2026-03-02 is a Monday
    tracker
        .mark_complete_at(user_id, lessons[0].id, at(2026, 3, 2), &NullSink)
        .unwrap();

    let conn = tracker.db().conn();
    let earned = queries::earned_achievements(&conn, user_id, None).unwrap();
    assert!(!earned
        .iter()
        .any(|a| a.slug == AchievementSlug::WeekendLearner.as_str()));
}

#[test]
fn test_third_same_day_completion_awards_learning_spree() {
    let (tracker, user_id) = setup_tracker("alice");
    let now = at(2026, 3, 2);
    let lessons = lessons_worth(&tracker, 10);
    let spree = AchievementSlug::LearningSpree.as_str();

    for lesson in lessons.iter().take(2) {
        tracker
            .mark_complete_at(user_id, lesson.id, now, &NullSink)
            .unwrap();
    }
    {
        let conn = tracker.db().conn();
        let earned = queries::earned_achievements(&conn, user_id, None).unwrap();
        assert!(!earned.iter().any(|a| a.slug == spree));
    }

    tracker
        .mark_complete_at(user_id, lessons[2].id, now, &NullSink)
        .unwrap();
    let conn = tracker.db().conn();
    let earned = queries::earned_achievements(&conn, user_id, None).unwrap();
    assert!(earned.iter().any(|a| a.slug == spree));
}

#[test]
fn test_full_catalog_awards_course_completed() {
    let (tracker, user_id) = setup_tracker("alice");
    let now = at(2026, 3, 2);
    let done = AchievementSlug::CourseCompleted.as_str();

    let lessons = common::all_lessons(&tracker);
    for lesson in &lessons[..lessons.len() - 1] {
        tracker
            .mark_complete_at(user_id, lesson.id, now, &NullSink)
            .unwrap();
    }
    {
        let conn = tracker.db().conn();
        let earned = queries::earned_achievements(&conn, user_id, None).unwrap();
        assert!(!earned.iter().any(|a| a.slug == done));
    }

    tracker
        .mark_complete_at(user_id, lessons[lessons.len() - 1].id, now, &NullSink)
        .unwrap();
    let conn = tracker.db().conn();
    let earned = queries::earned_achievements(&conn, user_id, None).unwrap();
    assert!(earned.iter().any(|a| a.slug == done));
}

#[test]
fn test_earn_points_challenge_pays_reward_exactly_once() {
    let (tracker, user_id) = setup_tracker("alice");
    common::keep_only_challenge(&tracker, ChallengeKind::EarnNPoints, 50, 25);

    let now = at(2026, 3, 2);
    let sink = MemorySink::default();

    // Dashboard load assigns the challenge with the current point baseline
    let mut rng = StdRng::seed_from_u64(7);
    let view = tracker.dashboard_at(user_id, now, &mut rng, &sink).unwrap();
    assert!(view.challenge.challenge.is_some());

    // Complete lessons until 50+ points have been gained since assignment
    let mut gained = 0;
    let mut completions = 0;
    for lesson in common::all_lessons(&tracker) {
        if gained >= 50 {
            break;
        }
        tracker
            .mark_complete_at(user_id, lesson.id, now, &sink)
            .unwrap();
        gained += lesson.points_value;
        completions += 1;
    }
    assert!(completions >= 2);

    let rewards = sink
        .take()
        .into_iter()
        .filter(|n| matches!(n, Notification::ChallengeCompleted { .. }))
        .count();
    assert_eq!(rewards, 1);

    // Further completions the same day do not pay again
    for lesson in common::all_lessons(&tracker).into_iter().skip(completions).take(2) {
        tracker
            .mark_complete_at(user_id, lesson.id, now, &sink)
            .unwrap();
    }
    let repeat_rewards = sink
        .take()
        .into_iter()
        .filter(|n| matches!(n, Notification::ChallengeCompleted { .. }))
        .count();
    assert_eq!(repeat_rewards, 0);
}
