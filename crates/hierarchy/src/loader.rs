//! 读取一次快照的全部元数据记录：本地备份目录或设备上的文档目录。

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use remass_common::{RemassError, RemassResult};
use remass_domain::{id_from_metadata_filename, parse_metadata, DirEntry, Filesystem};
use remass_remote::{remote_join, OpenMode, RemoteSession, REMOTE_XOCHITL_DIR};

use crate::builder::build_filesystem;

pub type ProgressCb<'a> = &'a (dyn Fn(usize, usize) + Sync);

fn metadata_files(dir: &Path) -> RemassResult<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Err(RemassError::InvalidPath(format!("not a directory: {}", dir.display())));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(id) = name.to_str().and_then(id_from_metadata_filename) else {
            continue;
        };
        files.push((id.to_string(), entry.path()));
    }
    Ok(files)
}

/// 解析本地目录中的所有 `*.metadata` 文件（并行）
pub fn load_local_entries(dir: &Path) -> RemassResult<Vec<DirEntry>> {
    let files = metadata_files(dir)?;
    log::debug!("Parsing {} metadata files in '{}'", files.len(), dir.display());
    files
        .par_iter()
        .map(|(id, path)| {
            let json = fs::read_to_string(path)
                .map_err(|e| RemassError::transfer("read", path.display().to_string(), e))?;
            parse_metadata(id, &json)
        })
        .collect()
}

pub fn load_local_filesystem(dir: &Path) -> RemassResult<Filesystem> {
    build_filesystem(load_local_entries(dir)?)
}

/// 逐个读取设备文档目录中的 `*.metadata` 文件；会话不可并发使用，所以顺序执行
pub fn load_remote_entries<S: RemoteSession + ?Sized>(
    session: &S,
    progress: Option<ProgressCb<'_>>,
) -> RemassResult<Vec<DirEntry>> {
    let listing = session
        .list_dir(REMOTE_XOCHITL_DIR)
        .map_err(|e| RemassError::transfer("list", REMOTE_XOCHITL_DIR, e))?;
    let ids: Vec<&str> = listing
        .iter()
        .filter(|e| e.is_regular_file)
        .filter_map(|e| id_from_metadata_filename(&e.name))
        .collect();

    let mut entries = Vec::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        let path = remote_join(REMOTE_XOCHITL_DIR, &format!("{}.metadata", id));
        let mut json = String::new();
        session
            .open_file(&path, OpenMode::Read)
            .and_then(|mut handle| handle.read_to_string(&mut json))
            .map_err(|e| RemassError::transfer("read", path.as_str(), e))?;
        entries.push(parse_metadata(id, &json)?);
        if let Some(cb) = progress {
            cb(i + 1, ids.len());
        }
    }
    Ok(entries)
}

pub fn load_remote_filesystem<S: RemoteSession + ?Sized>(
    session: &S,
    progress: Option<ProgressCb<'_>>,
) -> RemassResult<Filesystem> {
    build_filesystem(load_remote_entries(session, progress)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use remass_remote::MemorySession;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(name: &str, kind: &str, parent: &str) -> String {
        format!(
            r#"{{"deleted":false,"lastModified":"1600000000000","lastOpenedPage":0,
            "metadatamodified":false,"modified":false,"parent":"{}","pinned":false,
            "synced":true,"type":"{}","version":1,"visibleName":"{}"}}"#,
            parent, kind, name
        )
    }

    #[test]
    fn test_local_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("c1.metadata"), record("Work", "CollectionType", "")).unwrap();
        fs::write(dir.path().join("d1.metadata"), record("Notes", "DocumentType", "c1")).unwrap();
        fs::write(dir.path().join("d1.content"), "{}").unwrap();
        fs::create_dir(dir.path().join("d1")).unwrap();

        let tree = load_local_filesystem(dir.path()).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.hierarchy_name(tree.node_id("d1").unwrap()), "My Files/Work/Notes");
    }

    #[test]
    fn test_local_bad_record_names_id() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.metadata"), record("X", "FolderType", "")).unwrap();
        let err = load_local_filesystem(dir.path()).unwrap_err();
        assert!(matches!(err, RemassError::UnknownDirentType { id, .. } if id == "bad"));
    }

    #[test]
    fn test_local_missing_dir() {
        let err = load_local_filesystem(Path::new("/nonexistent_remass_dir")).unwrap_err();
        assert!(matches!(err, RemassError::InvalidPath(_)));
    }

    #[test]
    fn test_remote_listing() {
        let base = REMOTE_XOCHITL_DIR;
        let s = MemorySession::new()
            .with_file(&format!("{}/c1.metadata", base), record("Work", "CollectionType", ""))
            .with_file(&format!("{}/d1.metadata", base), record("Notes", "DocumentType", "c1"))
            .with_file(&format!("{}/d1.content", base), "{}")
            .with_file(&format!("{}/d1/page.rm", base), "");
        let calls = AtomicUsize::new(0);
        let cb = |_done: usize, total: usize| {
            assert_eq!(total, 2);
            calls.fetch_add(1, Ordering::SeqCst);
        };
        let tree = load_remote_filesystem(&s, Some(&cb)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(tree.get("d1").unwrap().is_document());
        assert_eq!(s.open_handles(), 0);
    }
}
