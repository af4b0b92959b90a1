use crate::domain::model::Node;
use thiserror::Error;

/// Raised when a sibling list contains a node without a name, since such a
/// node has no place in a name ordering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("node at {location} has no name")]
pub struct UnnamedNodeError {
    pub location: String,
}

/// Sorts every sibling list of the forest by name, in place.
///
/// Names compare ordinally (byte order), so `"Apple"` sorts before `"apple"`.
/// The sort is stable. A `None` forest, an empty forest and `None` children
/// are left exactly as they are.
pub fn sort_forest(nodes: Option<&mut Vec<Node>>) -> Result<(), UnnamedNodeError> {
    sort_level(nodes, "")
}

fn sort_level(nodes: Option<&mut Vec<Node>>, parent: &str) -> Result<(), UnnamedNodeError> {
    let Some(nodes) = nodes else {
        return Ok(());
    };
    if nodes.is_empty() {
        return Ok(());
    }

    if let Some(idx) = nodes.iter().position(|n| n.name.is_none()) {
        return Err(UnnamedNodeError {
            location: format!("{parent}/[{idx}]"),
        });
    }

    nodes.sort_by(|a, b| a.name.cmp(&b.name));

    for node in nodes.iter_mut() {
        let here = format!("{parent}/{}", node.name.as_deref().unwrap_or_default());
        sort_level(node.children.as_mut(), &here)?;
    }
    Ok(())
}

/// True when every sibling list, at every depth, is non-decreasing by name.
pub fn is_sorted_forest(nodes: &[Node]) -> bool {
    nodes.windows(2).all(|w| w[0].name <= w[1].name)
        && nodes.iter().all(|n| is_sorted_forest(n.children()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForestStats {
    pub folders: usize,
    pub entries: usize,
    pub max_depth: usize,
    /// Non-empty sibling lists, i.e. the levels the sort touches.
    pub sorted_levels: usize,
}

pub fn forest_stats(nodes: &[Node]) -> ForestStats {
    let mut stats = ForestStats::default();
    collect_stats(nodes, 1, &mut stats);
    stats
}

fn collect_stats(nodes: &[Node], depth: usize, stats: &mut ForestStats) {
    if nodes.is_empty() {
        return;
    }
    stats.sorted_levels += 1;
    stats.max_depth = stats.max_depth.max(depth);
    for node in nodes {
        if node.is_folder() {
            stats.folders += 1;
        } else {
            stats.entries += 1;
        }
        collect_stats(node.children(), depth + 1, stats);
    }
}
