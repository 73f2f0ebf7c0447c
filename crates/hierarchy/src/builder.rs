use remass_common::{RemassError, RemassResult};
use remass_domain::{DirEntry, Filesystem, NodeId, TRASH_ID};

/// 由一次快照中的全部条目构建文档树。
///
/// 条目顺序没有意义：子条目可能先于所属集合出现，所以分两遍处理。
/// 第一遍登记所有条目并直接挂载位于根或回收站下的条目，其余放入待处理列表；
/// 第二遍逐个解析待处理条目的上级。找不到上级说明快照不完整，整个快照作废。
pub fn build_filesystem<I>(entries: I) -> RemassResult<Filesystem>
where
    I: IntoIterator<Item = DirEntry>,
{
    let mut fs = Filesystem::new();
    let mut pending: Vec<(NodeId, String)> = Vec::new();

    for entry in entries {
        let parent_id = entry.parent_id.clone();
        let node = fs.insert(entry)?;
        match parent_id {
            None => fs.attach(fs.root(), node)?,
            Some(p) if p == TRASH_ID => fs.attach(fs.trash(), node)?,
            Some(p) => pending.push((node, p)),
        }
    }

    log::debug!(
        "{} entries registered, {} waiting for their parent",
        fs.len() - 2,
        pending.len()
    );

    for (node, parent_id) in pending {
        let parent = fs.node_id(&parent_id).ok_or_else(|| RemassError::OrphanedEntry {
            child: fs.node(node).id.clone(),
            parent: parent_id.clone(),
        })?;
        fs.attach(parent, node)?;
    }

    fs.sort();
    Ok(fs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use remass_domain::{DirentKind, ROOT_ID};

    fn doc(id: &str, name: &str, parent: Option<&str>) -> DirEntry {
        DirEntry::document(id, name, 1, parent.map(String::from), 0)
    }

    fn col(id: &str, name: &str, parent: Option<&str>) -> DirEntry {
        DirEntry::collection(id, name, 1, parent.map(String::from))
    }

    #[test]
    fn test_child_before_parent() {
        let fs = build_filesystem(vec![
            doc("d1", "Notes", Some("c2")),
            col("c2", "Inner", Some("c1")),
            col("c1", "Work", None),
        ])
        .unwrap();
        let d1 = fs.node_id("d1").unwrap();
        assert_eq!(fs.hierarchy_name(d1), "My Files/Work/Inner/Notes");
    }

    #[test]
    fn test_trash_and_empty_parent() {
        let fs = build_filesystem(vec![
            doc("a", "A", Some("trash")),
            doc("b", "B", Some("")),
        ])
        .unwrap();
        let trash: Vec<_> = fs.children(fs.trash()).map(|e| e.id.as_str()).collect();
        let root: Vec<_> = fs.children(fs.root()).map(|e| e.id.as_str()).collect();
        assert_eq!(trash, vec!["a"]);
        assert_eq!(root, vec!["b"]);
    }

    #[test]
    fn test_explicit_root_parent() {
        let fs = build_filesystem(vec![doc("a", "A", Some(ROOT_ID))]).unwrap();
        assert_eq!(fs.parent_of(fs.node_id("a").unwrap()).unwrap().id, ROOT_ID);
    }

    #[test]
    fn test_orphan_names_both_ids() {
        let err = build_filesystem(vec![col("c1", "Work", None), doc("d1", "Lost", Some("gone"))]).unwrap_err();
        match err {
            RemassError::OrphanedEntry { child, parent } => {
                assert_eq!(child, "d1");
                assert_eq!(parent, "gone");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_is_fatal() {
        let err = build_filesystem(vec![doc("x", "A", None), doc("x", "B", None)]).unwrap_err();
        assert!(err.is_integrity());
    }

    #[test]
    fn test_document_as_parent_rejected() {
        let err = build_filesystem(vec![doc("d", "A", None), doc("e", "B", Some("d"))]).unwrap_err();
        assert!(matches!(err, RemassError::InvalidMetadata { .. }));
    }

    #[test]
    fn test_sorted_after_build() {
        let fs = build_filesystem(vec![
            doc("d2", "beta", None),
            doc("d1", "Alpha", None),
            col("c1", "zeta", None),
            doc("d3", "alpha", Some("c1")),
            col("c2", "Beta", Some("c1")),
        ])
        .unwrap();
        let names: Vec<_> = fs.children(fs.root()).map(|e| e.visible_name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "Alpha", "beta"]);
        let c1 = fs.node_id("c1").unwrap();
        let names: Vec<_> = fs.children(c1).map(|e| e.visible_name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "alpha"]);
        assert!(matches!(fs.node(c1).kind, DirentKind::Collection { .. }));
    }
}
