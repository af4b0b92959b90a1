use crate::infrastructure::locations::host_data_dir;
use crate::usecase::sort_bookmarks::{SortJob, DEFAULT_PROCESS_NAME};
use anyhow::Result;
use std::env;
use std::path::PathBuf;

pub const DATA_DIR_VAR: &str = "SOURCETREE_DATA_DIR";
pub const PROCESS_NAME_VAR: &str = "SOURCETREE_PROCESS_NAME";
pub const ASSUME_YES_VAR: &str = "SOURCETREE_SORT_ASSUME_YES";
pub const EMIT_EVENTS_VAR: &str = "SOURCETREE_SORT_EMIT_EVENTS";

/// Run settings. Every field defaults to the behavior of a plain run
/// against the installed SourceTree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: Option<PathBuf>,
    pub process_name: String,
    pub assume_yes: bool,
    pub emit_events: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            process_name: DEFAULT_PROCESS_NAME.to_string(),
            assume_yes: false,
            emit_events: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            data_dir: non_empty(DATA_DIR_VAR).map(PathBuf::from),
            process_name: non_empty(PROCESS_NAME_VAR)
                .unwrap_or_else(|| DEFAULT_PROCESS_NAME.to_string()),
            assume_yes: non_empty(ASSUME_YES_VAR).is_some_and(|v| is_truthy(&v)),
            emit_events: non_empty(EMIT_EVENTS_VAR).is_some_and(|v| is_truthy(&v)),
        }
    }

    pub fn job(&self) -> Result<SortJob> {
        let data_dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => host_data_dir()?,
        };
        let mut job = SortJob::new(data_dir);
        job.process_name = self.process_name.clone();
        Ok(job)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
