use std::io::Write;

use remass_common::{RemassError, RemassResult};
use remass_domain::{DirentKind, Filesystem};
use remass_hierarchy::{render_filesystem, EntryFilters};

/// 每行一个条目：`<id>  <层级路径>`
pub fn print_list<W: Write>(fs: &Filesystem, filters: &EntryFilters, out: &mut W) -> RemassResult<()> {
    let hits = filters.select(fs);
    for (node, entry) in &hits {
        writeln!(out, "{}  {}", entry.id, fs.hierarchy_name(*node))?;
    }
    log::info!("{} of {} entries listed", hits.len(), fs.len() - 2);
    Ok(())
}

/// 浏览一个集合：有上级时第一行是指向上级的 `..`
pub fn print_collection<W: Write>(fs: &Filesystem, id: &str, out: &mut W) -> RemassResult<()> {
    let node = fs
        .node_id(id)
        .filter(|n| fs.node(*n).is_collection())
        .ok_or_else(|| RemassError::InvalidPath(format!("no collection with id '{}'", id)))?;
    for entry in fs.listing(node) {
        let shown_id = match entry.kind {
            DirentKind::Link { target } => fs.node(target).id.as_str(),
            _ => entry.id.as_str(),
        };
        writeln!(out, "{:<14} {:<38} {}", entry.dirent_type(), shown_id, entry.visible_name)?;
    }
    Ok(())
}

pub fn print_tree<W: Write>(fs: &Filesystem, out: &mut W) -> RemassResult<()> {
    out.write_all(render_filesystem(fs).as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use remass_domain::DirEntry;
    use remass_hierarchy::build_filesystem;

    #[test]
    fn list_with_search() {
        let fs = build_filesystem(vec![
            DirEntry::collection("c1", "Work", 1, None),
            DirEntry::document("d1", "Meeting notes", 1, Some("c1".into()), 0),
            DirEntry::document("d2", "Diary", 1, None, 0),
        ])
        .unwrap();
        let mut out = Vec::new();
        print_list(&fs, &EntryFilters::searching("notes"), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "d1  My Files/Work/Meeting notes\n");

        let mut out = Vec::new();
        print_collection(&fs, "c1", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Link") && lines[0].ends_with(".."));
        assert!(lines[0].contains("root"));
        assert!(lines[1].ends_with("Meeting notes"));
        assert!(print_collection(&fs, "d1", &mut Vec::new()).is_err());
    }
}
