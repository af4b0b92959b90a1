use crate::domain::sort::ForestStats;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SortStats {
    pub folders: usize,
    pub entries: usize,
    pub max_depth: usize,
    pub sorted_levels: usize,
    pub host_processes_closed: usize,
}

impl SortStats {
    pub fn from_forest(forest: ForestStats, host_processes_closed: usize) -> Self {
        Self {
            folders: forest.folders,
            entries: forest.entries,
            max_depth: forest.max_depth,
            sorted_levels: forest.sorted_levels,
            host_processes_closed,
        }
    }
}
