use std::collections::HashMap;

use remass_common::{RemassError, RemassResult};
use serde::{Deserialize, Serialize};

use crate::dirent::{sibling_order, DirEntry, DirentKind, NodeId, ROOT_ID, TRASH_ID};

/// 一次快照对应的文档树。
///
/// 所有条目存放在 `nodes` 中，集合通过 [`NodeId`] 列表持有子条目，
/// 子条目的 `parent` 字段只是指回所属集合的弱引用。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filesystem {
    nodes: Vec<DirEntry>,
    index: HashMap<String, NodeId>,
    root: NodeId,
    trash: NodeId,
}

impl Default for Filesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem {
    /// 只含「My Files」与「Trash」两个根的空树
    pub fn new() -> Self {
        let mut fs = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            root: NodeId(0),
            trash: NodeId(1),
        };
        fs.push(DirEntry::collection(ROOT_ID, "My Files", -1, None));
        fs.push(DirEntry::collection(TRASH_ID, "Trash", -1, None));
        fs
    }

    fn push(&mut self, entry: DirEntry) -> NodeId {
        let node = NodeId(self.nodes.len());
        self.index.insert(entry.id.clone(), node);
        self.nodes.push(entry);
        node
    }

    /// 登记条目（尚未挂到任何集合）；id 重复视为完整性错误
    pub fn insert(&mut self, entry: DirEntry) -> RemassResult<NodeId> {
        if self.index.contains_key(&entry.id) {
            return Err(RemassError::DuplicateId(entry.id));
        }
        Ok(self.push(entry))
    }

    /// 把 `child` 追加到集合 `parent` 的子条目末尾并设置反向引用
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> RemassResult<()> {
        match &mut self.nodes[parent.0].kind {
            DirentKind::Collection { children } => children.push(child),
            _ => {
                return Err(RemassError::InvalidMetadata {
                    id: self.nodes[child.0].id.clone(),
                    reason: format!("parent '{}' is not a collection", self.nodes[parent.0].id),
                })
            }
        }
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// 对两个根下的所有集合递归排序（显式栈，不受层级深度限制）
    pub fn sort(&mut self) {
        let mut stack = vec![self.root, self.trash];
        while let Some(node) = stack.pop() {
            let mut children = match &mut self.nodes[node.0].kind {
                DirentKind::Collection { children } => std::mem::take(children),
                _ => continue,
            };
            children.sort_by(|a, b| sibling_order(&self.nodes[a.0], &self.nodes[b.0]));
            stack.extend(children.iter().copied().filter(|c| self.nodes[c.0].is_collection()));
            if let DirentKind::Collection { children: slot } = &mut self.nodes[node.0].kind {
                *slot = children;
            }
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn trash(&self) -> NodeId {
        self.trash
    }

    pub fn node(&self, node: NodeId) -> &DirEntry {
        &self.nodes[node.0]
    }

    pub fn node_id(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&DirEntry> {
        self.node_id(id).map(|n| self.node(n))
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = &DirEntry> + '_ {
        self.nodes[node.0].children().iter().map(move |c| &self.nodes[c.0])
    }

    pub fn parent_of(&self, node: NodeId) -> Option<&DirEntry> {
        self.nodes[node.0].parent.map(|p| self.node(p))
    }

    /// 从根开始以 `/` 连接的显示名路径，如 `My Files/Work/Notes`
    pub fn hierarchy_name(&self, node: NodeId) -> String {
        let mut names = vec![self.nodes[node.0].visible_name.as_str()];
        let mut current = self.nodes[node.0].parent;
        while let Some(p) = current {
            names.push(self.nodes[p.0].visible_name.as_str());
            current = self.nodes[p.0].parent;
        }
        names.reverse();
        names.join("/")
    }

    /// 条目数（含两个根）
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 2
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &DirEntry)> + '_ {
        self.nodes.iter().enumerate().map(|(i, e)| (NodeId(i), e))
    }

    /// 浏览集合时的条目列表：有上级时「..」链接总在第一行，其后是已排序的子条目
    pub fn listing(&self, node: NodeId) -> Vec<DirEntry> {
        let mut items: Vec<DirEntry> = self.children(node).cloned().collect();
        if let Some(parent) = self.nodes[node.0].parent {
            items.insert(0, DirEntry::link(parent, &self.nodes[parent.0].id));
        }
        items
    }
}
