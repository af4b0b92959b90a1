use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Every way a run can fail. Each variant is one pipeline step and its
/// message is what the user sees.
#[derive(Debug, Error)]
pub enum SortError {
    #[error("Unable to locate {}. Make sure SourceTree is installed.", .0.display())]
    HostNotInstalled(PathBuf),

    #[error("Unable to locate {}. Did you create bookmarks?", .0.display())]
    BookmarksNotFound(PathBuf),

    #[error("Unable to close SourceTree because: {reason}")]
    HostNotClosed { reason: String },

    #[error("Unable to load the bookmarks because: {cause}")]
    Load { cause: String },

    #[error("Unable to sort nodes because: {cause}")]
    Sort { cause: String },

    #[error("Unable to create backup of existing bookmarks.xml because: {cause}")]
    Backup { cause: String },

    #[error("Unable to save bookmarks because: {cause}")]
    Save { cause: String },
}

impl SortError {
    pub fn close_timeout(pid: u32, wait: Duration) -> Self {
        Self::HostNotClosed {
            reason: format!("process {pid} exceeded the {}s timeout", wait.as_secs()),
        }
    }

    pub fn load(cause: impl std::fmt::Display) -> Self {
        Self::Load {
            cause: format!("{cause:#}"),
        }
    }

    pub fn sort(cause: impl std::fmt::Display) -> Self {
        Self::Sort {
            cause: cause.to_string(),
        }
    }

    pub fn backup(cause: impl std::fmt::Display) -> Self {
        Self::Backup {
            cause: format!("{cause:#}"),
        }
    }

    pub fn save(cause: impl std::fmt::Display) -> Self {
        Self::Save {
            cause: format!("{cause:#}"),
        }
    }
}
