pub mod planner;
pub mod organizer;
pub mod sync;

pub use planner::plan_sync;
pub use organizer::{backedup_templates, display_names, uploadable_templates, TemplateOrganizer};
pub use sync::SyncReport;

/// 设备上模板资源所在目录
pub const RM_TEMPLATE_PATH: &str = "/usr/share/remarkable/templates";
/// 设备上的模板注册表
pub const RM_TEMPLATE_JSON_PATH: &str = "/usr/share/remarkable/templates/templates.json";
/// 注册表的本地文件名（也是备份的逻辑名）
pub const REGISTRY_FILENAME: &str = "templates.json";
/// 本地模板目录中描述一组模板的文件后缀
pub const TEMPLATE_BUNDLE_SUFFIX: &str = ".inc.json";
