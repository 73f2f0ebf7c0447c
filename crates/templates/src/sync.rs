//! 执行模板同步：下载注册表、备份、上传资源、最后上传注册表并重启界面。

use std::fs;
use std::path::{Path, PathBuf};

use remass_common::{next_backup_filename, RemassResult};
use remass_domain::{SkipReason, SkippedTemplate, SyncPlan, SyncRequest, TemplateChange, UploadAction};
use remass_remote::{device, guarded_upload, RemoteSession};

use crate::organizer::TemplateOrganizer;
use crate::planner::plan_sync;
use crate::{REGISTRY_FILENAME, RM_TEMPLATE_JSON_PATH};

/// 一次同步的结果
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// 实际生效的新增 / 替换 / 停用，以及所有被跳过的候选
    pub plan: SyncPlan,
    /// 修改前保存的注册表备份
    pub backup: Option<PathBuf>,
    /// 按顺序实际上传到设备的文件
    pub uploaded: Vec<UploadAction>,
    pub registry_uploaded: bool,
}

impl SyncReport {
    /// 请求为空，设备未被访问
    pub fn is_noop(&self) -> bool {
        !self.registry_uploaded
    }

    pub fn registry_changed(&self) -> bool {
        !self.plan.changes.is_empty() || !self.plan.disabled.is_empty()
    }
}

impl<'s, S: RemoteSession + ?Sized> TemplateOrganizer<'s, S> {
    /// 只计算计划，不修改设备上的任何文件
    pub fn plan(&self, request: &SyncRequest) -> RemassResult<SyncPlan> {
        if request.is_empty() {
            return Ok(SyncPlan::default());
        }
        let tmp = tempfile::tempdir()?;
        let (_, registry) = self.download_registry(tmp.path())?;
        Ok(plan_sync(&registry, request, &self.template_dir, Path::is_file))
    }

    /// 上传一个候选的两个资源。空间不足时返回 Ok(false)，其余失败直接返回错误
    fn upload_assets(&self, change: &TemplateChange, report: &mut SyncReport) -> RemassResult<bool> {
        for asset in &change.assets {
            match guarded_upload(self.session, &asset.local, &asset.remote) {
                Ok(()) => report.uploaded.push(asset.clone()),
                Err(e) if e.is_soft() => {
                    log::warn!("Skipping template '{}': {}", change.descriptor.name, e);
                    report.plan.skipped.push(SkippedTemplate {
                        descriptor: change.descriptor.clone(),
                        reason: SkipReason::NotEnoughDiskSpace { message: e.to_string() },
                    });
                    return Ok(false);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }

    pub fn synchronize(&self, request: &SyncRequest) -> RemassResult<SyncReport> {
        let mut report = SyncReport::default();
        if request.is_empty() {
            log::info!("No templates to add or disable");
            return Ok(report);
        }

        let tmp = tempfile::tempdir()?;
        let (registry_local, mut registry) = self.download_registry(tmp.path())?;

        if request.backup_first {
            let backup = next_backup_filename(REGISTRY_FILENAME, &self.backup_dir)?;
            fs::copy(&registry_local, &backup)?;
            log::info!("Backed up device registry to '{}'", backup.display());
            report.backup = Some(backup);
        }

        let plan = plan_sync(&registry, request, &self.template_dir, Path::is_file);
        report.plan.skipped = plan.skipped.clone();

        for change in &plan.changes {
            if !self.upload_assets(change, &mut report)? {
                continue;
            }
            SyncPlan::apply_change(&mut registry, change);
            // 备份目录保留 SVG，以后恢复注册表时资源仍然可用
            if let Some(name) = change.vector_asset.file_name() {
                fs::create_dir_all(&self.backup_dir)?;
                fs::copy(&change.vector_asset, self.backup_dir.join(name))?;
            }
            report.plan.changes.push(change.clone());
        }

        report.plan.disabled = plan.disabled.clone();
        plan.apply_disabled(&mut registry);

        // 注册表总是最后上传，即使本次没有条目变化
        registry.save(&registry_local)?;
        guarded_upload(self.session, &registry_local, RM_TEMPLATE_JSON_PATH)?;
        report
            .uploaded
            .push(UploadAction::new(registry_local, RM_TEMPLATE_JSON_PATH));
        report.registry_uploaded = true;

        device::restart_ui(self.session)?;
        log::info!(
            "Template sync finished: {} added or replaced, {} disabled, {} skipped",
            report.plan.changes.len(),
            report.plan.disabled.len(),
            report.plan.skipped.len()
        );
        Ok(report)
    }
}
