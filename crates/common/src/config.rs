use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RemassError, RemassResult};

pub const APP_NAME: &str = "remass";
pub const CONFIG_FILENAME: &str = "remass.toml";

/// 平板 SSH 连接参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    /// 主地址连接超时时尝试的备用地址（如 WiFi IP）
    pub host_fallback: Option<String>,
    pub user: String,
    pub port: u16,
    pub timeout_secs: u64,
    pub keyfile: Option<PathBuf>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "10.11.99.1".to_string(),
            host_fallback: None,
            user: "root".to_string(),
            port: 22,
            timeout_secs: 2,
            keyfile: None,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 本地应用目录，模板、备份与导出文件均位于其下
    pub app_dir: PathBuf,
    pub dry_run: bool,
    pub connection: ConnectionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_dir: default_app_dir(),
            dry_run: false,
            connection: ConnectionConfig::default(),
        }
    }
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_app_dir() -> PathBuf {
    home_dir().join(format!(".{}", APP_NAME))
}

/// 默认配置文件路径：~/.config/remass/remass.toml
pub fn default_config_path() -> PathBuf {
    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"));
    config_home.join(APP_NAME).join(CONFIG_FILENAME)
}

impl AppConfig {
    /// 读取 TOML 配置；文件不存在时返回默认配置。
    /// 文件中缺失的字段沿用默认值。
    pub fn load(path: &Path) -> RemassResult<Self> {
        if !path.exists() {
            log::debug!("No configuration at '{}', using defaults", path.display());
            return Ok(Self::default());
        }
        warn_if_shared(path)?;
        let text = fs::read_to_string(path)?;
        let cfg: AppConfig = toml::from_str(&text)
            .map_err(|e| RemassError::Config(format!("{}: {}", path.display(), e)))?;
        log::info!("Loaded configuration from '{}'", path.display());
        Ok(cfg)
    }

    pub fn to_toml(&self) -> RemassResult<String> {
        toml::to_string_pretty(self).map_err(|e| RemassError::Config(e.to_string()))
    }

    /// 保存配置，文件权限限制为仅当前用户可读写
    pub fn save(&self, path: &Path) -> RemassResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                log::info!("Creating directory structure '{}'", parent.display());
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_toml()?)?;
        restrict_permissions(path)?;
        log::info!("Saved configuration to '{}'", path.display());
        Ok(())
    }

    pub fn template_dir(&self) -> PathBuf {
        self.app_dir.join("templates")
    }

    pub fn template_backup_dir(&self) -> PathBuf {
        self.app_dir.join("backups").join("templates")
    }

    pub fn screen_dir(&self) -> PathBuf {
        self.app_dir.join("screens")
    }

    pub fn screen_backup_dir(&self) -> PathBuf {
        self.app_dir.join("backups").join("screens")
    }

    pub fn export_dir(&self) -> PathBuf {
        self.app_dir.join("exports")
    }

    /// 创建所有本地工作目录
    pub fn ensure_dirs(&self) -> RemassResult<()> {
        for dir in [
            self.template_dir(),
            self.template_backup_dir(),
            self.screen_dir(),
            self.screen_backup_dir(),
            self.export_dir(),
        ] {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn warn_if_shared(path: &Path) -> RemassResult<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(path)?.permissions().mode();
    if mode & 0o006 != 0 {
        log::warn!(
            "Configuration file '{}' is accessible by other users (permissions: {:o}). \
             You are strongly encouraged to adjust them: `chmod 600 {}`",
            path.display(),
            mode & 0o777,
            path.display()
        );
    }
    Ok(())
}

#[cfg(not(unix))]
fn warn_if_shared(_path: &Path) -> RemassResult<()> {
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> RemassResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> RemassResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load(&dir.path().join("none.toml")).unwrap();
        assert_eq!(cfg.connection, ConnectionConfig::default());
        assert!(!cfg.dry_run);
    }

    #[test]
    fn test_partial_file_overlays_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "[connection]\nhost = \"192.168.0.17\"\n").unwrap();
        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.connection.host, "192.168.0.17");
        assert_eq!(cfg.connection.user, "root");
        assert_eq!(cfg.connection.port, 22);
    }

    #[test]
    fn test_save_roundtrip_and_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILENAME);
        let mut cfg = AppConfig::default();
        cfg.app_dir = dir.path().join("app");
        cfg.connection.keyfile = Some(PathBuf::from("/home/u/.ssh/id_rm"));
        cfg.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "connection = [").unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, RemassError::Config(_)));
    }

    #[test]
    fn test_ensure_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig {
            app_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        cfg.ensure_dirs().unwrap();
        assert!(cfg.template_backup_dir().is_dir());
        assert!(cfg.export_dir().is_dir());
    }
}
