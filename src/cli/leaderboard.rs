//! Leaderboard commands: one-shot print and live watch

use anyhow::Result;
use std::path::Path;

use learntrack::achievements::PageView;
use learntrack::models::LeaderboardSnapshot;
use learntrack::notify::ConsoleSink;

use super::{open_tracker, resolve_user};

fn print_snapshot(snapshot: &LeaderboardSnapshot) {
    if snapshot.entries.is_empty() {
        println!("No users yet.");
        return;
    }
    for (rank, entry) in snapshot.entries.iter().enumerate() {
        println!("  {:>2}. {:<20} {:>6} pts", rank + 1, entry.username, entry.total_points);
    }
}

pub fn leaderboard_command(db_path: Option<&Path>, json: bool, user: Option<&str>) -> Result<()> {
    let tracker = open_tracker(db_path)?;

    // Viewing the leaderboard counts toward its visit achievement
    if let Some(username) = user {
        let user_id = resolve_user(&tracker, username)?;
        tracker.record_page_view(user_id, PageView::Leaderboard, &ConsoleSink)?;
    }

    let snapshot = tracker.leaderboard()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }
    Ok(())
}

/// Print the current leaderboard, then every update published in this
/// process until interrupted.
pub async fn watch_command(db_path: Option<&Path>) -> Result<()> {
    let tracker = open_tracker(db_path)?;
    let (initial, mut rx) = tracker.broadcaster().subscribe()?;

    println!("Leaderboard (live, Ctrl-C to stop):");
    print_snapshot(&initial);

    loop {
        tokio::select! {
            update = rx.recv() => {
                match update {
                    Ok(snapshot) => {
                        println!("---");
                        print_snapshot(&snapshot);
                    }
                    // Lagged: skip to the most recent snapshot
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
