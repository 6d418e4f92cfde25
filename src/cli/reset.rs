//! Reset command

use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::path::Path;

use learntrack::achievements::PageView;
use learntrack::notify::ConsoleSink;

use super::{open_tracker, resolve_user};

pub fn reset_command(db_path: Option<&Path>, username: &str, yes: bool) -> Result<()> {
    let tracker = open_tracker(db_path)?;
    let user_id = resolve_user(&tracker, username)?;

    // Visiting the reset flow earns its achievement even when aborted
    tracker.record_page_view(user_id, PageView::Reset, &ConsoleSink)?;

    if !yes {
        print!(
            "This erases ALL progress for {} (completions, points, streak, achievements). Type '{}' to confirm: ",
            username, username
        );
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        if line.trim() != username {
            println!("Aborted.");
            return Ok(());
        }
    }

    tracker.reset_progress(user_id, &ConsoleSink)?;
    println!("Progress reset for {}.", username);
    Ok(())
}
