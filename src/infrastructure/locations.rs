use anyhow::{anyhow, Result};
use directories::BaseDirs;
use std::path::{Path, PathBuf};

pub const BOOKMARKS_FILE_NAME: &str = "bookmarks.xml";

/// `<local data dir>/Atlassian/SourceTree`, e.g. `%LOCALAPPDATA%\Atlassian\SourceTree`
/// on Windows or `~/.local/share/Atlassian/SourceTree` on Linux.
pub fn host_data_dir() -> Result<PathBuf> {
    let dirs = BaseDirs::new().ok_or_else(|| anyhow!("no home directory for the current user"))?;
    Ok(dirs.data_local_dir().join("Atlassian").join("SourceTree"))
}

pub fn bookmarks_path(data_dir: &Path) -> PathBuf {
    data_dir.join(BOOKMARKS_FILE_NAME)
}
