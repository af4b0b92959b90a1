#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A bookmarked repository.
    Entry {
        path: Option<String>,
        repo_type: Option<String>,
    },
    /// A named group of other nodes.
    Folder,
}

/// One element of the bookmark forest.
///
/// `name` and `children` are optional because the document may carry null
/// values for both. A null `children` list is kept distinct from an empty one
/// so a rewrite reproduces what was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub level: i32,
    pub is_expanded: bool,
    pub is_leaf: bool,
    pub name: Option<String>,
    pub children: Option<Vec<Node>>,
    pub kind: NodeKind,
}

pub type Forest = Vec<Node>;

pub const ENTRY_TAG: &str = "BookmarkNode";
pub const FOLDER_TAG: &str = "BookmarkFolderNode";

impl Node {
    pub fn entry(name: &str, path: &str, repo_type: &str) -> Self {
        Self {
            level: 0,
            is_expanded: false,
            is_leaf: true,
            name: Some(name.to_string()),
            children: Some(Vec::new()),
            kind: NodeKind::Entry {
                path: Some(path.to_string()),
                repo_type: Some(repo_type.to_string()),
            },
        }
    }

    pub fn folder(name: &str, children: Vec<Node>) -> Self {
        Self {
            level: 0,
            is_expanded: false,
            is_leaf: false,
            name: Some(name.to_string()),
            children: Some(children),
            kind: NodeKind::Folder,
        }
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    pub fn with_expanded(mut self, is_expanded: bool) -> Self {
        self.is_expanded = is_expanded;
        self
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder)
    }

    pub fn is_entry(&self) -> bool {
        matches!(self.kind, NodeKind::Entry { .. })
    }

    /// Type tag used for this variant in the bookmarks document.
    pub fn variant_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Entry { .. } => ENTRY_TAG,
            NodeKind::Folder => FOLDER_TAG,
        }
    }

    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_variant_and_leaf_flag() {
        let entry = Node::entry("repo", "/src/repo", "Git");
        assert!(entry.is_entry());
        assert!(entry.is_leaf);
        assert_eq!(entry.variant_name(), "BookmarkNode");
        assert_eq!(entry.children, Some(vec![]));

        let folder = Node::folder("Work", vec![entry.clone()]);
        assert!(folder.is_folder());
        assert!(!folder.is_leaf);
        assert_eq!(folder.variant_name(), "BookmarkFolderNode");
        assert_eq!(folder.children().len(), 1);
    }

    #[test]
    fn children_accessor_treats_null_as_empty() {
        let node = Node {
            children: None,
            ..Node::folder("x", vec![])
        };
        assert!(node.children().is_empty());
        assert_eq!(node.children, None);
    }

    #[test]
    fn builders_only_touch_their_field() {
        let node = Node::entry("a", "/a", "Hg").with_level(3).with_expanded(true);
        assert_eq!(node.level, 3);
        assert!(node.is_expanded);
        assert_eq!(
            node.kind,
            NodeKind::Entry {
                path: Some("/a".to_string()),
                repo_type: Some("Hg".to_string()),
            }
        );
    }
}
