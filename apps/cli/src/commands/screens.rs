use std::io::Write;

use remass_common::{AppConfig, RemassResult};
use remass_remote::screens::{backup_screen, remote_screen_path, upload_screen, SCREEN_NAMES};
use remass_remote::{ensure_upload_space, RemoteSession, TabletConnection};

use crate::cli::ScreensCommand;

pub fn run<S, W, C>(cmd: ScreensCommand, config: &AppConfig, dry_run: bool, out: &mut W, connect: C) -> RemassResult<()>
where
    S: RemoteSession,
    W: Write,
    C: FnOnce() -> RemassResult<TabletConnection<S>>,
{
    match cmd {
        ScreensCommand::List => {
            for name in SCREEN_NAMES {
                writeln!(out, "{:<14} {}", name, remote_screen_path(name))?;
            }
        }
        ScreensCommand::Backup { name } => {
            let conn = connect()?;
            let session = conn.acquire()?;
            let saved = backup_screen(&*session, &name, &config.screen_backup_dir())?;
            writeln!(out, "saved {}", saved.display())?;
        }
        ScreensCommand::Upload { name, file } => {
            let conn = connect()?;
            let session = conn.acquire()?;
            if dry_run {
                ensure_upload_space(&*session, &file, &remote_screen_path(&name))?;
                writeln!(out, "would upload {} -> {}", file.display(), remote_screen_path(&name))?;
            } else {
                upload_screen(&*session, &name, &file)?;
                writeln!(out, "uploaded {} -> {}", file.display(), remote_screen_path(&name))?;
            }
        }
    }
    Ok(())
}
