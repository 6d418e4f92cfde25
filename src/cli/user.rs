//! User registration command

use anyhow::Result;
use std::path::Path;

use super::open_tracker;

pub fn add_user_command(db_path: Option<&Path>, username: &str) -> Result<()> {
    let tracker = open_tracker(db_path)?;
    let user_id = tracker.register_user(username)?;
    println!("Registered {} (id {}).", username, user_id);
    Ok(())
}
