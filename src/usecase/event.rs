use crate::usecase::stats::SortStats;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SortEvent {
    PhaseStarted { name: String },
    PhaseFinished { name: String },

    HostCloseRequested { pid: u32 },

    BackupCreated { path: String },

    Finished { stats: SortStats },
}
