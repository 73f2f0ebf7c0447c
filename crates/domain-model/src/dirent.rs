use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// 固定的根目录与回收站 id
pub const ROOT_ID: &str = "root";
pub const TRASH_ID: &str = "trash";

/// 元数据 `type` 字段的取值
pub const DOCUMENT_TYPE: &str = "DocumentType";
pub const COLLECTION_TYPE: &str = "CollectionType";
pub const LINK_TYPE: &str = "Link";

/// 条目在 [`crate::Filesystem`] 中的位置，只由文档树分配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

/// 设备同步过来的标志位，本工具只用于展示与过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirentFlags {
    pub deleted: bool,
    pub metadata_modified: bool,
    pub modified: bool,
    pub pinned: bool,
    pub synced: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DirentKind {
    Document { last_opened_page: u32 },
    /// 子条目归该集合独占，顺序即展示顺序
    Collection { children: Vec<NodeId> },
    /// 仅用于界面中「返回上一级」的导航项
    Link { target: NodeId },
}

/// 文档库中的一个条目（文档、集合或导航链接）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirEntry {
    pub id: String,
    pub visible_name: String,
    pub version: i64,
    /// 毫秒时间戳；合成的根节点没有
    #[serde(default)]
    pub last_modified: Option<u64>,
    #[serde(default)]
    pub flags: DirentFlags,
    /// None 表示挂在根目录下
    #[serde(default)]
    pub parent_id: Option<String>,
    /// 所属集合的反向引用，只由层级构建器设置，不代表所有权
    #[serde(default)]
    pub parent: Option<NodeId>,
    pub kind: DirentKind,
}

fn normalize_parent_id(parent_id: Option<String>) -> Option<String> {
    parent_id.filter(|p| !p.is_empty())
}

impl DirEntry {
    pub fn document(
        id: impl Into<String>,
        visible_name: impl Into<String>,
        version: i64,
        parent_id: Option<String>,
        last_opened_page: u32,
    ) -> Self {
        Self {
            id: id.into(),
            visible_name: visible_name.into(),
            version,
            last_modified: None,
            flags: DirentFlags::default(),
            parent_id: normalize_parent_id(parent_id),
            parent: None,
            kind: DirentKind::Document { last_opened_page },
        }
    }

    pub fn collection(
        id: impl Into<String>,
        visible_name: impl Into<String>,
        version: i64,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            visible_name: visible_name.into(),
            version,
            last_modified: None,
            flags: DirentFlags::default(),
            parent_id: normalize_parent_id(parent_id),
            parent: None,
            kind: DirentKind::Collection { children: Vec::new() },
        }
    }

    /// 指向 `target` 的「..」导航项，不进入索引
    pub fn link(target: NodeId, target_id: &str) -> Self {
        Self {
            id: format!("{}..", target_id),
            visible_name: "..".to_string(),
            version: -1,
            last_modified: None,
            flags: DirentFlags::default(),
            parent_id: None,
            parent: None,
            kind: DirentKind::Link { target },
        }
    }

    pub fn with_last_modified(mut self, millis: u64) -> Self {
        self.last_modified = Some(millis);
        self
    }

    pub fn with_flags(mut self, flags: DirentFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_document(&self) -> bool {
        matches!(self.kind, DirentKind::Document { .. })
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, DirentKind::Collection { .. })
    }

    pub fn dirent_type(&self) -> &'static str {
        match self.kind {
            DirentKind::Document { .. } => DOCUMENT_TYPE,
            DirentKind::Collection { .. } => COLLECTION_TYPE,
            DirentKind::Link { .. } => LINK_TYPE,
        }
    }

    /// 集合的子条目；其他类型为空
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            DirentKind::Collection { children } => children,
            _ => &[],
        }
    }
}

/// 同级条目的排序：集合与链接在前、文档在后，组内按显示名（区分大小写）排序
pub fn sibling_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    match (a.is_document(), b.is_document()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => a.visible_name.cmp(&b.visible_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_parent_means_root() {
        let d = DirEntry::document("d", "Doc", 1, Some(String::new()), 0);
        assert_eq!(d.parent_id, None);
        let c = DirEntry::collection("c", "Col", 1, Some("p".into()));
        assert_eq!(c.parent_id.as_deref(), Some("p"));
    }

    #[test]
    fn test_collections_before_documents() {
        let doc = DirEntry::document("d", "Aardvark", 1, None, 0);
        let col = DirEntry::collection("c", "Zebra", 1, None);
        let link = DirEntry::link(NodeId(0), "root");
        assert_eq!(sibling_order(&col, &doc), Ordering::Less);
        assert_eq!(sibling_order(&doc, &col), Ordering::Greater);
        assert_eq!(sibling_order(&link, &doc), Ordering::Less);
        assert_eq!(sibling_order(&link, &col), Ordering::Less);
    }

    #[test]
    fn test_names_compare_case_sensitive() {
        let upper = DirEntry::document("1", "Zeta", 1, None, 0);
        let lower = DirEntry::document("2", "alpha", 1, None, 0);
        assert_eq!(sibling_order(&upper, &lower), Ordering::Less);
    }
}
