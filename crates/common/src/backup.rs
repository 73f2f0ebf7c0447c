//! 本地备份文件命名：同一目录下按逻辑文件名递增编号，
//! 如 `templates.json` 的备份依次为 `templates.json.1`、`templates.json.2`……

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RemassResult;

/// 解析 `<name>.<N>` 形式的文件名，返回编号 N
fn backup_number(candidate: &str, name: &str) -> Option<u64> {
    let suffix = candidate.strip_prefix(name)?.strip_prefix('.')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// 目录中该逻辑文件名已存在的最大备份编号；目录不存在或无备份时为 None
fn latest_backup_number(name: &str, dir: &Path) -> RemassResult<Option<u64>> {
    if !dir.exists() {
        return Ok(None);
    }
    let mut latest = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(filename) = entry.file_name().to_str() {
            if let Some(n) = backup_number(filename, name) {
                latest = latest.max(Some(n));
            }
        }
    }
    Ok(latest)
}

/// 最新的备份文件路径；没有任何备份时返回 None 而非报错
pub fn latest_backup_filename(name: &str, dir: &Path) -> RemassResult<Option<PathBuf>> {
    Ok(latest_backup_number(name, dir)?.map(|n| dir.join(format!("{}.{}", name, n))))
}

/// 下一个不冲突的备份文件路径（必要时创建目录）
pub fn next_backup_filename(name: &str, dir: &Path) -> RemassResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let next = latest_backup_number(name, dir)?.map_or(1, |n| n + 1);
    Ok(dir.join(format!("{}.{}", name, next)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_without_backups_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(latest_backup_filename("templates.json", dir.path()).unwrap().is_none());
        assert!(latest_backup_filename("templates.json", &dir.path().join("missing"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_numbering_increases() {
        let dir = tempfile::tempdir().unwrap();
        let first = next_backup_filename("templates.json", dir.path()).unwrap();
        assert_eq!(first, dir.path().join("templates.json.1"));
        fs::write(&first, "{}").unwrap();

        let second = next_backup_filename("templates.json", dir.path()).unwrap();
        assert_eq!(second, dir.path().join("templates.json.2"));
        fs::write(&second, "{}").unwrap();

        let latest = latest_backup_filename("templates.json", dir.path()).unwrap();
        assert_eq!(latest, Some(second));
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        let dir = tempfile::tempdir().unwrap();
        for n in [2, 10, 9] {
            fs::write(dir.path().join(format!("suspended.png.{}", n)), b"x").unwrap();
        }
        // 其他逻辑名与非数字后缀不参与编号
        fs::write(dir.path().join("suspended.png.old"), b"x").unwrap();
        fs::write(dir.path().join("poweroff.png.42"), b"x").unwrap();

        let latest = latest_backup_filename("suspended.png", dir.path()).unwrap();
        assert_eq!(latest, Some(dir.path().join("suspended.png.10")));
        let next = next_backup_filename("suspended.png", dir.path()).unwrap();
        assert_eq!(next, dir.path().join("suspended.png.11"));
    }
}
