//! Dashboard command

use anyhow::Result;
use std::path::Path;

use learntrack::achievements::PageView;
use learntrack::notify::ConsoleSink;

use super::{open_tracker, resolve_user};

pub fn dashboard_command(db_path: Option<&Path>, username: &str) -> Result<()> {
    let tracker = open_tracker(db_path)?;
    let user_id = resolve_user(&tracker, username)?;

    // The dashboard doubles as the achievements page
    tracker.record_page_view(user_id, PageView::Achievements, &ConsoleSink)?;
    let view = tracker.dashboard(user_id, &ConsoleSink)?;

    println!("\n{} - {} points", view.username, view.total_points);
    println!(
        "Progress: {}/{} lessons ({}%)",
        view.completed_count, view.total_lessons, view.progress_percent
    );
    println!(
        "Streak: {} day(s) (longest {})",
        view.streak.current, view.streak.longest
    );

    match &view.challenge.challenge {
        Some(challenge) => {
            let status = if view.challenge.is_completed() {
                "done".to_string()
            } else {
                format!("{}/{}", view.challenge.current_progress, challenge.target_value)
            };
            println!(
                "Today's challenge: {} [{}] (+{} pts)",
                challenge.title, status, challenge.points_reward
            );
        }
        None => println!("Today's challenge: none available"),
    }

    println!("\nSections:");
    for sp in &view.sections {
        println!(
            "  {:<24} {:>2}/{:<2}",
            sp.section.title, sp.lessons_completed, sp.lessons_total
        );
    }

    if !view.recent_achievements.is_empty() {
        println!("\nRecent achievements:");
        for a in &view.recent_achievements {
            println!("  {} (+{} pts)", a.title, a.points_reward);
        }
    }

    Ok(())
}
