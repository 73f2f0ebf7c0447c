//! 上传前的磁盘空间检查。平板根分区很小，上传后必须至少保留
//! [`MIN_FREE_SPACE_KB`] 的剩余空间。

use std::fs;
use std::path::Path;

use remass_common::{RemassError, RemassResult};

use crate::session::{remote_parent, shell_quote, RemoteSession};

/// 上传后分区上至少保留的空间（KB）
pub const MIN_FREE_SPACE_KB: u64 = 1024;

/// 按 1 KB 向上取整
pub fn required_kb(size_bytes: u64) -> u64 {
    size_bytes.div_ceil(1024)
}

/// 目标路径所在分区的剩余空间（KB）。
/// 目标文件可能尚不存在，所以查询它的父目录。
pub fn free_space_kb<S: RemoteSession + ?Sized>(session: &S, location: &str) -> RemassResult<u64> {
    let command = format!(
        "df {} | tail -n1 | awk '{{print $4}}'",
        shell_quote(remote_parent(location))
    );
    let output = session
        .run_command(&command)
        .map_err(|e| RemassError::transfer("df", location, e))?;
    output.trim().parse().map_err(|_| RemassError::FreeSpaceUnknown {
        location: location.to_string(),
        output: output.trim().to_string(),
    })
}

/// 纯粹的空间判断：`required + 保留空间 >= 可用空间` 时拒绝
pub fn check_free_space(
    source: &Path,
    destination: &str,
    size_bytes: u64,
    available_kb: u64,
) -> RemassResult<()> {
    let required = required_kb(size_bytes);
    if required + MIN_FREE_SPACE_KB >= available_kb {
        return Err(RemassError::NotEnoughDiskSpace {
            source_path: source.display().to_string(),
            destination: destination.to_string(),
            required_kb: required,
            available_kb,
        });
    }
    Ok(())
}

/// 查询设备剩余空间并检查本地文件能否上传到 `remote`
pub fn ensure_upload_space<S: RemoteSession + ?Sized>(session: &S, local: &Path, remote: &str) -> RemassResult<()> {
    let size = fs::metadata(local)
        .map_err(|e| RemassError::InvalidPath(format!("{}: {}", local.display(), e)))?
        .len();
    let available = free_space_kb(session, remote)?;
    check_free_space(local, remote, size, available)
}

/// 先检查空间再上传；空间不足时不会传输任何字节
pub fn guarded_upload<S: RemoteSession + ?Sized>(session: &S, local: &Path, remote: &str) -> RemassResult<()> {
    ensure_upload_space(session, local, remote)?;
    session
        .upload_file(local, remote)
        .map_err(|e| RemassError::transfer("upload", remote, e))?;
    log::info!("Uploaded '{}' to '{}'", local.display(), remote);
    Ok(())
}
