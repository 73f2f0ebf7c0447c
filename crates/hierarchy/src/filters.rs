use remass_domain::{DirEntry, Filesystem, NodeId};

/// 列出条目时的过滤条件
#[derive(Debug, Clone)]
pub struct EntryFilters {
    /// 显示名需包含的子串（区分大小写）
    pub search: Option<String>,
    pub include_trash: bool,
    /// 相对根的最大层级，根的子条目为 1
    pub max_depth: Option<usize>,
}

impl Default for EntryFilters {
    fn default() -> Self {
        Self {
            search: None,
            include_trash: true,
            max_depth: None,
        }
    }
}

fn depth_and_top(fs: &Filesystem, node: NodeId) -> (usize, NodeId) {
    let mut depth = 0;
    let mut top = node;
    let mut current = fs.node(node).parent;
    while let Some(p) = current {
        depth += 1;
        top = p;
        current = fs.node(p).parent;
    }
    (depth, top)
}

impl EntryFilters {
    pub fn searching(needle: impl Into<String>) -> Self {
        Self {
            search: Some(needle.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, fs: &Filesystem, node: NodeId) -> bool {
        if node == fs.root() || node == fs.trash() {
            return false;
        }
        let entry = fs.node(node);
        if let Some(needle) = &self.search {
            if !entry.visible_name.contains(needle.as_str()) {
                return false;
            }
        }
        let (depth, top) = depth_and_top(fs, node);
        if !self.include_trash && top == fs.trash() {
            return false;
        }
        self.max_depth.map_or(true, |max| depth <= max)
    }

    /// 满足条件的条目，按层级路径排序
    pub fn select<'a>(&self, fs: &'a Filesystem) -> Vec<(NodeId, &'a DirEntry)> {
        let mut hits: Vec<_> = fs.iter().filter(|(n, _)| self.matches(fs, *n)).collect();
        hits.sort_by_cached_key(|(n, _)| fs.hierarchy_name(*n));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_filesystem;

    fn sample() -> Filesystem {
        build_filesystem(vec![
            DirEntry::collection("c1", "Work", 1, None),
            DirEntry::document("d1", "Work notes", 1, Some("c1".into()), 0),
            DirEntry::document("d2", "Old notes", 1, Some("trash".into()), 0),
            DirEntry::document("d3", "Diary", 1, None, 0),
        ])
        .unwrap()
    }

    #[test]
    fn test_default_keeps_everything_but_roots() {
        let fs = sample();
        assert_eq!(EntryFilters::default().select(&fs).len(), 4);
    }

    #[test]
    fn test_search_and_trash() {
        let fs = sample();
        let ids = |f: &EntryFilters| f.select(&fs).into_iter().map(|(_, e)| e.id.clone()).collect::<Vec<_>>();
        let mut f = EntryFilters::searching("notes");
        assert_eq!(ids(&f), vec!["d1".to_string(), "d2".to_string()]);
        f.include_trash = false;
        assert_eq!(ids(&f), vec!["d1".to_string()]);
    }

    #[test]
    fn test_max_depth() {
        let fs = sample();
        let f = EntryFilters {
            max_depth: Some(1),
            ..EntryFilters::default()
        };
        let ids: Vec<_> = f.select(&fs).into_iter().map(|(_, e)| e.id.as_str()).collect();
        assert!(!ids.contains(&"d1"));
        assert!(ids.contains(&"c1"));
    }
}
