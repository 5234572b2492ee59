use std::path::PathBuf;

use anyhow::{anyhow, Result};

/// Expands a leading `~/` into the current user's home directory. A `~`
/// anywhere else in the path is left alone.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs_next::home_dir().ok_or_else(|| anyhow!("failed to find home dir."))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}
