//! 模板的三个来源：设备上已安装的、最近一次备份的、本地可上传的。

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use remass_common::{latest_backup_filename, AppConfig, RemassError, RemassResult};
use remass_domain::{parse_template_bundle, TemplateDescriptor, TemplateRegistry};
use remass_remote::{device, guarded_upload, RemoteSession};

use crate::{REGISTRY_FILENAME, RM_TEMPLATE_JSON_PATH, TEMPLATE_BUNDLE_SUFFIX};

pub struct TemplateOrganizer<'s, S: RemoteSession + ?Sized> {
    pub(crate) session: &'s S,
    pub(crate) template_dir: PathBuf,
    pub(crate) backup_dir: PathBuf,
}

/// 排序去重后的展示名，如 `Grid Landscape`
pub fn display_names(templates: &[TemplateDescriptor]) -> Vec<String> {
    templates
        .iter()
        .map(TemplateDescriptor::display_name)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 最近一次备份的注册表中的模板；没有备份时为空
pub fn backedup_templates(backup_dir: &Path) -> RemassResult<Vec<TemplateDescriptor>> {
    match latest_backup_filename(REGISTRY_FILENAME, backup_dir)? {
        Some(path) => Ok(TemplateRegistry::load(&path)?.templates),
        None => Ok(Vec::new()),
    }
}

/// 本地模板目录中 `*.inc.json` 列出的、SVG 与 PNG 都齐全的模板
pub fn uploadable_templates(template_dir: &Path) -> RemassResult<Vec<TemplateDescriptor>> {
    if !template_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut bundles: Vec<PathBuf> = fs::read_dir(template_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(TEMPLATE_BUNDLE_SUFFIX))
        })
        .collect();
    bundles.sort();

    let mut templates = Vec::new();
    for bundle in bundles {
        let json = fs::read_to_string(&bundle)?;
        let descriptors = parse_template_bundle(&json)
            .map_err(|e| RemassError::InvalidTemplate(format!("{}: {}", bundle.display(), e)))?;
        for descriptor in descriptors {
            let missing = [descriptor.svg_filename(), descriptor.png_filename()]
                .into_iter()
                .find(|name| !template_dir.join(name).is_file());
            match missing {
                Some(name) => log::warn!(
                    "{}",
                    RemassError::TemplateAssetIncomplete {
                        filename: descriptor.filename.clone(),
                        missing: name,
                    }
                ),
                None => templates.push(descriptor),
            }
        }
    }
    Ok(templates)
}

impl<'s, S: RemoteSession + ?Sized> TemplateOrganizer<'s, S> {
    pub fn new(session: &'s S, template_dir: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            session,
            template_dir: template_dir.into(),
            backup_dir: backup_dir.into(),
        }
    }

    pub fn from_config(session: &'s S, config: &AppConfig) -> Self {
        Self::new(session, config.template_dir(), config.template_backup_dir())
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// 把设备上的注册表下载到 `dir` 中并解析
    pub(crate) fn download_registry(&self, dir: &Path) -> RemassResult<(PathBuf, TemplateRegistry)> {
        let local = dir.join(REGISTRY_FILENAME);
        self.session
            .download_file(RM_TEMPLATE_JSON_PATH, &local)
            .map_err(|e| RemassError::transfer("download", RM_TEMPLATE_JSON_PATH, e))?;
        let registry = TemplateRegistry::load(&local)?;
        log::debug!("Device registry lists {} templates", registry.templates.len());
        Ok((local, registry))
    }

    pub fn load_remote_templates(&self) -> RemassResult<Vec<TemplateDescriptor>> {
        let tmp = tempfile::tempdir()?;
        let (_, registry) = self.download_registry(tmp.path())?;
        Ok(registry.templates)
    }

    pub fn load_backedup_templates(&self) -> RemassResult<Vec<TemplateDescriptor>> {
        backedup_templates(&self.backup_dir)
    }

    pub fn load_uploadable_templates(&self) -> RemassResult<Vec<TemplateDescriptor>> {
        uploadable_templates(&self.template_dir)
    }

    /// 按展示名从可上传模板中选取；未知名称报错
    pub fn select_uploadable(&self, names: &[String]) -> RemassResult<Vec<TemplateDescriptor>> {
        let available = self.load_uploadable_templates()?;
        select_by_display_name(&available, names)
    }

    /// 按展示名从已安装模板中选取
    pub fn select_installed(&self, names: &[String]) -> RemassResult<Vec<TemplateDescriptor>> {
        let installed = self.load_remote_templates()?;
        select_by_display_name(&installed, names)
    }

    /// 把最近一次备份的注册表传回设备并重启界面
    pub fn restore_latest_backup(&self) -> RemassResult<PathBuf> {
        let backup = latest_backup_filename(REGISTRY_FILENAME, &self.backup_dir)?.ok_or_else(|| {
            RemassError::Config(format!(
                "no template registry backup in '{}'",
                self.backup_dir.display()
            ))
        })?;
        // 上传前确认备份本身可以解析
        TemplateRegistry::load(&backup)?;
        guarded_upload(self.session, &backup, RM_TEMPLATE_JSON_PATH)?;
        device::restart_ui(self.session)?;
        log::info!("Restored template registry from '{}'", backup.display());
        Ok(backup)
    }
}

fn select_by_display_name(templates: &[TemplateDescriptor], names: &[String]) -> RemassResult<Vec<TemplateDescriptor>> {
    names
        .iter()
        .map(|name| {
            templates
                .iter()
                .find(|t| &t.display_name() == name || &t.name == name)
                .cloned()
                .ok_or_else(|| RemassError::InvalidTemplate(format!("unknown template '{}'", name)))
        })
        .collect()
}
