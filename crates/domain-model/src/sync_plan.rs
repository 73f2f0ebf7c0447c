use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::action::UploadAction;
use crate::template::{TemplateDescriptor, TemplateIdentity, TemplateRegistry};

/// 一次模板同步请求
#[derive(Debug, Clone, Default)]
pub struct SyncRequest {
    pub add: Vec<TemplateDescriptor>,
    pub disable: Vec<TemplateDescriptor>,
    /// 已安装的同名同方向模板是否被覆盖
    pub replace: bool,
    /// 修改前先把设备上的注册表备份到本地
    pub backup_first: bool,
}

impl SyncRequest {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.disable.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Replaced,
}

/// 计划中的一条新增 / 替换，以及它需要上传的两个资源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateChange {
    pub descriptor: TemplateDescriptor,
    pub kind: ChangeKind,
    /// 依次为 SVG 与 PNG
    pub assets: Vec<UploadAction>,
    /// 同步成功后复制到本地备份目录的 SVG
    pub vector_asset: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    /// 已安装且未要求替换
    AlreadyInstalled,
    /// 本地缺少 SVG 或 PNG
    AssetsIncomplete { missing: PathBuf },
    /// 上传资源前的磁盘空间检查未通过
    NotEnoughDiskSpace { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTemplate {
    pub descriptor: TemplateDescriptor,
    pub reason: SkipReason,
}

/// 模板注册表的差异：先新增 / 替换，再停用
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncPlan {
    pub changes: Vec<TemplateChange>,
    pub disabled: Vec<TemplateIdentity>,
    pub skipped: Vec<SkippedTemplate>,
}

impl SyncPlan {
    /// 把一条新增 / 替换写入注册表
    pub fn apply_change(registry: &mut TemplateRegistry, change: &TemplateChange) {
        registry.upsert(change.descriptor.clone());
    }

    /// 停用只删除注册表条目，设备上的资源文件保留
    pub fn apply_disabled(&self, registry: &mut TemplateRegistry) {
        for identity in &self.disabled {
            registry.remove(identity);
        }
    }

    /// 把整个计划应用到注册表
    pub fn apply_to(&self, registry: &mut TemplateRegistry) {
        for change in &self.changes {
            Self::apply_change(registry, change);
        }
        self.apply_disabled(registry);
    }

    /// 上传队列：所有资源在前，注册表最后一个上传，
    /// 设备上不会出现引用了尚未上传资源的注册表
    pub fn upload_queue(&self, registry_local: impl Into<PathBuf>, registry_remote: &str) -> Vec<UploadAction> {
        let mut queue: Vec<UploadAction> = self
            .changes
            .iter()
            .flat_map(|c| c.assets.iter().cloned())
            .collect();
        queue.push(UploadAction::new(registry_local, registry_remote));
        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::identity_of;

    fn change(name: &str, kind: ChangeKind) -> TemplateChange {
        let d = TemplateDescriptor::new(name, name.to_lowercase(), None);
        TemplateChange {
            assets: vec![
                UploadAction::new(format!("/local/{}", d.svg_filename()), format!("/remote/{}", d.svg_filename())),
                UploadAction::new(format!("/local/{}", d.png_filename()), format!("/remote/{}", d.png_filename())),
            ],
            vector_asset: PathBuf::from(format!("/local/{}", d.svg_filename())),
            descriptor: d,
            kind,
        }
    }

    #[test]
    fn test_registry_uploaded_last() {
        let plan = SyncPlan {
            changes: vec![change("Dots", ChangeKind::Added), change("Lines", ChangeKind::Replaced)],
            ..SyncPlan::default()
        };
        let queue = plan.upload_queue("/tmp/templates.json", "/remote/templates.json");
        assert_eq!(queue.len(), 5);
        assert_eq!(queue[0].remote, "/remote/dots.svg");
        assert_eq!(queue[1].remote, "/remote/dots.png");
        assert_eq!(queue.last().unwrap().remote, "/remote/templates.json");
    }

    #[test]
    fn test_disable_applies_after_add() {
        let dots = change("Dots", ChangeKind::Added);
        let plan = SyncPlan {
            disabled: vec![identity_of(&dots.descriptor)],
            changes: vec![dots],
            ..SyncPlan::default()
        };
        let mut registry = TemplateRegistry::default();
        plan.apply_to(&mut registry);
        assert!(registry.templates.is_empty());
    }
}
