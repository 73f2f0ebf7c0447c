pub mod device;
pub mod fetch;
pub mod listing;
pub mod screens;
pub mod templates;
pub mod upload;

use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use remass_common::{default_config_path, AppConfig, RemassError, RemassResult};
use remass_domain::Filesystem;
use remass_hierarchy::{load_local_filesystem, load_remote_filesystem, EntryFilters};
use remass_remote::{LocalFileSource, OpenSshSession, RemoteFileSource, RemoteSession, TabletConnection};

use crate::cli::{Cli, Command};

fn connect(config: &AppConfig) -> RemassResult<TabletConnection<OpenSshSession>> {
    let session = OpenSshSession::connect(&config.connection)
        .map_err(|e| RemassError::transfer("connect", config.connection.host.as_str(), e))?;
    log::info!("Connected to {}", session.host());
    Ok(TabletConnection::new(session))
}

/// 在后台线程中独占会话执行 `job`；期间前台只等待并输出进度点
pub fn run_on_worker<S, T, F>(conn: &TabletConnection<S>, job: F) -> RemassResult<T>
where
    S: RemoteSession + Sync,
    T: Send,
    F: FnOnce(&S) -> RemassResult<T> + Send,
{
    let guard = conn.acquire()?;
    thread::scope(|scope| {
        let handle = scope.spawn(move || job(&*guard));
        while !handle.is_finished() {
            eprint!(".");
            let _ = io::stderr().flush();
            thread::sleep(Duration::from_millis(300));
        }
        eprintln!();
        handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    })
}

fn load_snapshot(config: &AppConfig, backup: Option<&Path>) -> RemassResult<Filesystem> {
    match backup {
        Some(dir) => load_local_filesystem(dir),
        None => {
            let conn = connect(config)?;
            let progress = |done: usize, total: usize| log::debug!("metadata {}/{}", done, total);
            run_on_worker(&conn, |session| load_remote_filesystem(session, Some(&progress)))
        }
    }
}

pub fn run(cli: Cli, config: AppConfig) -> RemassResult<()> {
    let dry_run = cli.dry_run || config.dry_run;
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.cmd {
        Command::List {
            search,
            backup,
            no_trash,
            depth,
            collection,
        } => {
            let fs = load_snapshot(&config, backup.as_deref())?;
            if let Some(id) = collection {
                return listing::print_collection(&fs, &id, &mut out);
            }
            let filters = EntryFilters {
                search,
                include_trash: !no_trash,
                max_depth: depth,
            };
            listing::print_list(&fs, &filters, &mut out)
        }
        Command::Tree { backup } => {
            let fs = load_snapshot(&config, backup.as_deref())?;
            listing::print_tree(&fs, &mut out)
        }
        Command::Fetch {
            id,
            template,
            output,
            backup,
        } => {
            let output = output.unwrap_or_else(|| fetch::default_output(&config, &id, &template));
            match backup {
                Some(dir) => fetch::fetch(&LocalFileSource::new(dir, &id), &id, &template, &output, &mut out),
                None => {
                    let conn = connect(&config)?;
                    let session = conn.acquire()?;
                    let source = RemoteFileSource::new(&*session, &id);
                    fetch::fetch(&source, &id, &template, &output, &mut out)
                }
            }
        }
        Command::Templates { cmd } => templates::run(cmd, &config, dry_run, &mut out, || connect(&config)),
        Command::Device { cmd } => {
            let conn = connect(&config)?;
            let session = conn.acquire()?;
            device::run(cmd, &*session, dry_run, &mut out)
        }
        Command::Screens { cmd } => screens::run(cmd, &config, dry_run, &mut out, || connect(&config)),
        Command::Upload { local, remote } => {
            let conn = connect(&config)?;
            let session = conn.acquire()?;
            upload::upload(&*session, &local, &remote, dry_run, &mut out)
        }
        Command::Config { save } => {
            if save {
                config.save(&config_path)?;
                writeln!(out, "saved {}", config_path.display())?;
            } else {
                writeln!(out, "# {}", config_path.display())?;
                out.write_all(config.to_toml()?.as_bytes())?;
            }
            Ok(())
        }
    }
}
