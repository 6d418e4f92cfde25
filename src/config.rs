//! Data directory resolution

use std::path::PathBuf;

/// Directory holding the progress database (`~/.learntrack`)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".learntrack")
}
