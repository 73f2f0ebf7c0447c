use std::fs;
use std::path::Path;

use remass_common::{RemassError, RemassResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 设备 `templates.json` 中的一条模板描述，未知字段原样保留
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    pub name: String,
    /// 资源文件的基础名（不含 .svg / .png 扩展名）
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landscape: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 判断两条描述是否为「同一个」模板的依据：名称 + 方向。
/// 其余字段不参与比较，所以同名同方向但内容不同的模板会互相覆盖。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateIdentity {
    pub name: String,
    pub landscape: bool,
}

pub fn identity_of(descriptor: &TemplateDescriptor) -> TemplateIdentity {
    TemplateIdentity {
        name: descriptor.name.clone(),
        landscape: descriptor.landscape.unwrap_or(false),
    }
}

impl TemplateDescriptor {
    pub fn new(name: impl Into<String>, filename: impl Into<String>, landscape: Option<bool>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            landscape,
            extra: Map::new(),
        }
    }

    pub fn identity(&self) -> TemplateIdentity {
        identity_of(self)
    }

    /// 展示用名称，如 `Grid Landscape`；没有方向字段时只显示名称
    pub fn display_name(&self) -> String {
        match self.landscape {
            Some(true) => format!("{} Landscape", self.name),
            Some(false) => format!("{} Portrait", self.name),
            None => self.name.clone(),
        }
    }

    pub fn svg_filename(&self) -> String {
        format!("{}.svg", self.filename)
    }

    pub fn png_filename(&self) -> String {
        format!("{}.png", self.filename)
    }
}

impl std::fmt::Display for TemplateIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let orientation = if self.landscape { "Landscape" } else { "Portrait" };
        write!(f, "{} {}", self.name, orientation)
    }
}

/// 设备模板注册表 `templates.json`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateRegistry {
    pub templates: Vec<TemplateDescriptor>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TemplateRegistry {
    pub fn from_json(json: &str) -> RemassResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> RemassResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| RemassError::InvalidPath(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn to_json_pretty(&self) -> RemassResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> RemassResult<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// 删除所有同一身份的条目，返回删除数量
    pub fn remove(&mut self, identity: &TemplateIdentity) -> usize {
        let before = self.templates.len();
        self.templates.retain(|t| &identity_of(t) != identity);
        before - self.templates.len()
    }

    /// 以新描述替换同一身份的旧条目（没有旧条目时直接追加）
    pub fn upsert(&mut self, descriptor: TemplateDescriptor) {
        self.remove(&identity_of(&descriptor));
        self.templates.push(descriptor);
    }
}

/// 解析本地 `*.inc.json`：一个模板描述数组
pub fn parse_template_bundle(json: &str) -> RemassResult<Vec<TemplateDescriptor>> {
    serde_json::from_str(json)
        .map_err(|e| RemassError::InvalidTemplate(format!("invalid template bundle: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"{
        "templates": [
            {"name": "Blank", "filename": "Blank", "iconCode": "", "categories": ["Creative"]},
            {"name": "Grid", "filename": "P Grid medium", "landscape": false, "iconCode": ""},
            {"name": "Grid", "filename": "LS Grid medium", "landscape": true, "iconCode": ""}
        ],
        "version": 2
    }"#;

    #[test]
    fn test_missing_landscape_equals_portrait() {
        let a = TemplateDescriptor::new("Dots", "dots", None);
        let b = TemplateDescriptor::new("Dots", "dots-other", Some(false));
        let c = TemplateDescriptor::new("Dots", "dots", Some(true));
        assert_eq!(identity_of(&a), identity_of(&b));
        assert_ne!(identity_of(&a), identity_of(&c));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(TemplateDescriptor::new("Grid", "g", Some(true)).display_name(), "Grid Landscape");
        assert_eq!(TemplateDescriptor::new("Grid", "g", Some(false)).display_name(), "Grid Portrait");
        assert_eq!(TemplateDescriptor::new("Grid", "g", None).display_name(), "Grid");
    }

    #[test]
    fn test_registry_preserves_unknown_fields() {
        let reg = TemplateRegistry::from_json(REGISTRY).unwrap();
        assert_eq!(reg.templates.len(), 3);
        assert_eq!(reg.extra.get("version"), Some(&Value::from(2)));
        let json = reg.to_json_pretty().unwrap();
        let again = TemplateRegistry::from_json(&json).unwrap();
        assert_eq!(again, reg);
        assert!(json.contains("iconCode"));
        assert!(json.contains("Creative"));
    }

    #[test]
    fn test_remove_and_upsert_by_identity() {
        let mut reg = TemplateRegistry::from_json(REGISTRY).unwrap();
        let portrait = TemplateIdentity { name: "Grid".into(), landscape: false };

        let mut new_grid = TemplateDescriptor::new("Grid", "My Grid", None);
        new_grid.extra.insert("iconCode".into(), Value::from("x"));
        reg.upsert(new_grid.clone());
        assert_eq!(reg.templates.len(), 3);
        let grids: Vec<_> = reg.templates.iter().filter(|t| identity_of(t) == portrait).collect();
        assert_eq!(grids, vec![&new_grid]);
        assert_eq!(reg.templates.last(), Some(&new_grid));

        assert_eq!(reg.remove(&portrait), 1);
        assert_eq!(reg.remove(&portrait), 0);
    }

    #[test]
    fn test_parse_bundle() {
        let bundle = r#"[{"name": "Lines", "filename": "lines", "landscape": true}]"#;
        let tpls = parse_template_bundle(bundle).unwrap();
        assert_eq!(tpls[0].identity().to_string(), "Lines Landscape");
        assert!(parse_template_bundle("{}").is_err());
    }
}
