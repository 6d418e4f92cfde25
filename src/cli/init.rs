//! Init command implementation

use anyhow::Result;
use std::path::Path;

use super::open_tracker;

/// Create the database and seed the course catalog
pub fn init_command(db_path: Option<&Path>) -> Result<()> {
    let tracker = open_tracker(db_path)?;
    {
        let conn = tracker.db().conn();
        learntrack::seed::seed_catalog(&conn)?;
    }

    let conn = tracker.db().conn();
    let lessons = learntrack::queries::total_lesson_count(&conn)?;
    println!("Database ready: {} lessons in the catalog.", lessons);
    println!("Next: `learntrack add-user <name>` to get started.");
    Ok(())
}
