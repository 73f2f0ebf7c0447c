//! 由注册表与同步请求计算同步计划，不涉及任何 I/O（资源是否存在由调用方判断）。

use std::collections::HashSet;
use std::path::Path;

use remass_common::RemassError;
use remass_domain::{
    identity_of, ChangeKind, SkipReason, SkippedTemplate, SyncPlan, SyncRequest, TemplateChange,
    TemplateDescriptor, TemplateRegistry, UploadAction,
};
use remass_remote::remote_join;

use crate::RM_TEMPLATE_PATH;

/// 本地模板目录中的 SVG / PNG 资源及其在设备上的目标路径
fn asset_actions(template_dir: &Path, descriptor: &TemplateDescriptor) -> [UploadAction; 2] {
    [descriptor.svg_filename(), descriptor.png_filename()].map(|name| {
        let remote = remote_join(RM_TEMPLATE_PATH, &name);
        UploadAction::new(template_dir.join(name), remote)
    })
}

/// 计算同步计划。
///
/// 候选模板按顺序处理，每处理一个就更新「已安装」集合，
/// 所以同一批次中身份相同的两个候选，后者按「已安装」处理。
pub fn plan_sync<F>(
    registry: &TemplateRegistry,
    request: &SyncRequest,
    template_dir: &Path,
    asset_exists: F,
) -> SyncPlan
where
    F: Fn(&Path) -> bool,
{
    let mut installed: HashSet<_> = registry.templates.iter().map(identity_of).collect();
    let mut plan = SyncPlan::default();

    for candidate in &request.add {
        let assets = asset_actions(template_dir, candidate);
        if let Some(missing) = assets.iter().find(|a| !asset_exists(a.local.as_path())) {
            log::warn!(
                "{}",
                RemassError::TemplateAssetIncomplete {
                    filename: candidate.filename.clone(),
                    missing: missing.local.display().to_string(),
                }
            );
            plan.skipped.push(SkippedTemplate {
                descriptor: candidate.clone(),
                reason: SkipReason::AssetsIncomplete {
                    missing: missing.local.clone(),
                },
            });
            continue;
        }

        let identity = identity_of(candidate);
        let kind = if installed.contains(&identity) {
            if !request.replace {
                log::info!("Template '{}' is already installed, skipping", identity);
                plan.skipped.push(SkippedTemplate {
                    descriptor: candidate.clone(),
                    reason: SkipReason::AlreadyInstalled,
                });
                continue;
            }
            ChangeKind::Replaced
        } else {
            installed.insert(identity);
            ChangeKind::Added
        };

        let [svg, png] = assets;
        plan.changes.push(TemplateChange {
            descriptor: candidate.clone(),
            kind,
            vector_asset: svg.local.clone(),
            assets: vec![svg, png],
        });
    }

    for candidate in &request.disable {
        let identity = identity_of(candidate);
        if installed.remove(&identity) {
            plan.disabled.push(identity);
        } else {
            log::debug!("Template '{}' is not installed, nothing to disable", identity);
        }
    }

    plan
}
