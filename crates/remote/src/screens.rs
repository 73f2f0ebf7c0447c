//! 设备的启动 / 休眠等画面（`/usr/share/remarkable/<name>.png`）。

use std::path::{Path, PathBuf};

use remass_common::{next_backup_filename, RemassError, RemassResult};

use crate::guard::guarded_upload;
use crate::session::{remote_join, RemoteSession};

pub const RM_SCREEN_DIR: &str = "/usr/share/remarkable";

/// 可替换的画面名称
pub const SCREEN_NAMES: [&str; 6] = [
    "suspended",
    "poweroff",
    "starting",
    "rebooting",
    "batteryempty",
    "overheating",
];

pub fn is_known_screen(name: &str) -> bool {
    SCREEN_NAMES.contains(&name)
}

fn check_name(name: &str) -> RemassResult<()> {
    if !is_known_screen(name) {
        return Err(RemassError::Config(format!(
            "unknown screen '{}', expected one of: {}",
            name,
            SCREEN_NAMES.join(", ")
        )));
    }
    Ok(())
}

pub fn remote_screen_path(name: &str) -> String {
    remote_join(RM_SCREEN_DIR, &format!("{}.png", name))
}

/// 把设备上的画面下载为 `<backup_dir>/<name>.png.<N>`
pub fn backup_screen<S: RemoteSession + ?Sized>(
    session: &S,
    name: &str,
    backup_dir: &Path,
) -> RemassResult<PathBuf> {
    check_name(name)?;
    let remote = remote_screen_path(name);
    let local = next_backup_filename(&format!("{}.png", name), backup_dir)?;
    session
        .download_file(&remote, &local)
        .map_err(|e| RemassError::transfer("download", remote.as_str(), e))?;
    log::info!("Backed up screen '{}' to '{}'", name, local.display());
    Ok(local)
}

/// 替换设备上的画面；空间不足时不传输
pub fn upload_screen<S: RemoteSession + ?Sized>(session: &S, name: &str, local: &Path) -> RemassResult<()> {
    check_name(name)?;
    if !local.is_file() {
        return Err(RemassError::InvalidPath(local.display().to_string()));
    }
    guarded_upload(session, local, &remote_screen_path(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySession;
    use std::fs;

    #[test]
    fn test_backup_numbering() {
        let dir = tempfile::tempdir().unwrap();
        let s = MemorySession::new().with_file("/usr/share/remarkable/suspended.png", vec![1u8, 2]);
        let first = backup_screen(&s, "suspended", dir.path()).unwrap();
        let second = backup_screen(&s, "suspended", dir.path()).unwrap();
        assert_ne!(first, second);
        assert_eq!(fs::read(&second).unwrap(), vec![1u8, 2]);
    }

    #[test]
    fn test_unknown_screen_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let s = MemorySession::new();
        assert!(matches!(backup_screen(&s, "desktop", dir.path()), Err(RemassError::Config(_))));
        assert!(s.events().is_empty());
    }

    #[test]
    fn test_upload_screen_guarded() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("custom.png");
        fs::write(&local, vec![0u8; 4096]).unwrap();
        let s = MemorySession::new().with_response("df ", "500");
        let err = upload_screen(&s, "poweroff", &local).unwrap_err();
        assert!(err.is_soft());
        assert!(s.uploads().is_empty());

        let s = MemorySession::new().with_response("df ", "90000");
        upload_screen(&s, "poweroff", &local).unwrap();
        assert_eq!(s.uploads(), vec!["/usr/share/remarkable/poweroff.png".to_string()]);
    }
}
