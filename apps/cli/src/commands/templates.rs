use std::io::Write;

use remass_common::{latest_backup_filename, AppConfig, RemassResult};
use remass_domain::{ChangeKind, SyncPlan, SyncRequest, UploadAction};
use remass_remote::{RemoteSession, TabletConnection};
use remass_templates::{
    backedup_templates, display_names, uploadable_templates, SyncReport, TemplateOrganizer, REGISTRY_FILENAME,
    RM_TEMPLATE_JSON_PATH,
};

use super::run_on_worker;
use crate::cli::TemplatesCommand;

fn print_names<W: Write>(names: &[String], out: &mut W) -> RemassResult<()> {
    for name in names {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

fn print_plan<W: Write>(plan: &SyncPlan, queue: &[UploadAction], out: &mut W) -> RemassResult<()> {
    for change in &plan.changes {
        let verb = match change.kind {
            ChangeKind::Added => "add",
            ChangeKind::Replaced => "replace",
        };
        writeln!(out, "{:<8} {}", verb, change.descriptor.display_name())?;
    }
    for identity in &plan.disabled {
        writeln!(out, "{:<8} {}", "disable", identity)?;
    }
    for skipped in &plan.skipped {
        writeln!(out, "{:<8} {} ({:?})", "skip", skipped.descriptor.display_name(), skipped.reason)?;
    }
    for action in queue {
        writeln!(out, "upload   {} -> {}", action.local.display(), action.remote)?;
    }
    Ok(())
}

fn print_report<W: Write>(report: &SyncReport, out: &mut W) -> RemassResult<()> {
    if let Some(backup) = &report.backup {
        writeln!(out, "backup   {}", backup.display())?;
    }
    print_plan(&report.plan, &report.uploaded, out)?;
    if report.is_noop() {
        writeln!(out, "nothing to synchronize")?;
    } else if !report.registry_changed() {
        writeln!(out, "registry unchanged")?;
    }
    Ok(())
}

pub fn run<S, W, C>(cmd: TemplatesCommand, config: &AppConfig, dry_run: bool, out: &mut W, connect: C) -> RemassResult<()>
where
    S: RemoteSession + Sync,
    W: Write,
    C: FnOnce() -> RemassResult<TabletConnection<S>>,
{
    let template_dir = config.template_dir();
    let backup_dir = config.template_backup_dir();

    match cmd {
        TemplatesCommand::Local => print_names(&display_names(&uploadable_templates(&template_dir)?), out),
        TemplatesCommand::Backup => print_names(&display_names(&backedup_templates(&backup_dir)?), out),
        TemplatesCommand::Remote => {
            let conn = connect()?;
            let session = conn.acquire()?;
            let organizer = TemplateOrganizer::from_config(&*session, config);
            print_names(&display_names(&organizer.load_remote_templates()?), out)
        }
        TemplatesCommand::Sync {
            add,
            disable,
            replace,
            no_backup,
        } => {
            let conn = connect()?;
            let request = {
                let session = conn.acquire()?;
                let organizer = TemplateOrganizer::from_config(&*session, config);
                SyncRequest {
                    add: organizer.select_uploadable(&add)?,
                    disable: if disable.is_empty() {
                        Vec::new()
                    } else {
                        organizer.select_installed(&disable)?
                    },
                    replace,
                    backup_first: !no_backup,
                }
            };
            if dry_run {
                let session = conn.acquire()?;
                let plan = TemplateOrganizer::from_config(&*session, config).plan(&request)?;
                let queue = if request.is_empty() {
                    Vec::new()
                } else {
                    plan.upload_queue(REGISTRY_FILENAME, RM_TEMPLATE_JSON_PATH)
                };
                return print_plan(&plan, &queue, out);
            }
            let report = run_on_worker(&conn, |session| {
                TemplateOrganizer::from_config(session, config).synchronize(&request)
            })?;
            print_report(&report, out)
        }
        TemplatesCommand::Restore => {
            if dry_run {
                match latest_backup_filename(REGISTRY_FILENAME, &backup_dir)? {
                    Some(path) => writeln!(out, "would restore {} -> {}", path.display(), RM_TEMPLATE_JSON_PATH)?,
                    None => writeln!(out, "no registry backup in {}", backup_dir.display())?,
                }
                return Ok(());
            }
            let conn = connect()?;
            let session = conn.acquire()?;
            let restored = TemplateOrganizer::from_config(&*session, config).restore_latest_backup()?;
            writeln!(out, "restored {}", restored.display())?;
            Ok(())
        }
    }
}
