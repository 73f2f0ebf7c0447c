use std::io::Write;
use std::path::Path;

use remass_common::{RemassError, RemassResult};
use remass_remote::{ensure_upload_space, guarded_upload, RemoteSession};

/// 任意文件上传；演练模式下只做空间检查
pub fn upload<S, W>(session: &S, local: &Path, remote: &str, dry_run: bool, out: &mut W) -> RemassResult<()>
where
    S: RemoteSession + ?Sized,
    W: Write,
{
    if !local.is_file() {
        return Err(RemassError::InvalidPath(local.display().to_string()));
    }
    if dry_run {
        ensure_upload_space(session, local, remote)?;
        writeln!(out, "would upload {} -> {}", local.display(), remote)?;
        return Ok(());
    }
    guarded_upload(session, local, remote)?;
    writeln!(out, "uploaded {} -> {}", local.display(), remote)?;
    Ok(())
}
