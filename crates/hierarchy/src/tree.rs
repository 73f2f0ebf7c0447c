use std::fmt::Write;

use remass_domain::{Filesystem, NodeId};

/// 以缩进形式渲染 `start` 及其所有下级（深度优先，按已排序的子条目顺序）。
/// 每行末尾是条目 id，可直接用于 `fetch` 与 `list --in`。
pub fn render_tree(fs: &Filesystem, start: NodeId) -> String {
    let mut out = String::new();
    let mut stack = vec![(start, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        let entry = fs.node(node);
        let tag = if entry.is_collection() { "[directory]" } else { "[file]" };
        let _ = writeln!(out, "{}{} {}: {}", "  ".repeat(depth), tag, entry.visible_name, entry.id);
        stack.extend(entry.children().iter().rev().map(|c| (*c, depth + 1)));
    }
    out
}

/// 依次渲染「My Files」与「Trash」
pub fn render_filesystem(fs: &Filesystem) -> String {
    let mut out = render_tree(fs, fs.root());
    out.push_str(&render_tree(fs, fs.trash()));
    out
}
