use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// reMarkable 平板的文档与模板管理工具
#[derive(Parser, Debug)]
#[command(name = "remass", version, about = "Manage documents, templates and screens of a reMarkable tablet")]
pub struct Cli {
    /// 配置文件路径（默认 ~/.config/remass/remass.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 覆盖配置中的本地数据目录
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// 只显示将要执行的传输，不修改设备
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// 日志详细程度，可重复（-v / -vv / -vvv）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 列出文档与文件夹（id 与层级路径）
    List {
        #[arg(long)]
        search: Option<String>,
        /// 读取本地备份目录而不是设备
        #[arg(long)]
        backup: Option<PathBuf>,
        /// 不显示回收站中的条目
        #[arg(long)]
        no_trash: bool,
        /// 只列出不超过该层级的条目（根的子条目为 1）
        #[arg(long)]
        depth: Option<usize>,
        /// 只浏览该集合的直接子条目
        #[arg(long = "in", value_name = "ID")]
        collection: Option<String>,
    },
    /// 以树形显示文档层级
    Tree {
        #[arg(long)]
        backup: Option<PathBuf>,
    },
    /// 下载文档的单个文件，TEMPLATE 中的 {ID} 会被替换为文档 id
    Fetch {
        id: String,
        template: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 从本地备份目录读取而不是设备
        #[arg(long)]
        backup: Option<PathBuf>,
    },
    /// 模板管理
    Templates {
        #[command(subcommand)]
        cmd: TemplatesCommand,
    },
    /// 设备信息与控制
    Device {
        #[command(subcommand)]
        cmd: DeviceCommand,
    },
    /// 启动 / 休眠画面
    Screens {
        #[command(subcommand)]
        cmd: ScreensCommand,
    },
    /// 检查剩余空间后上传任意文件
    Upload { local: PathBuf, remote: String },
    /// 显示生效的配置
    Config {
        /// 写入配置文件（权限 0600）
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplatesCommand {
    /// 设备上已安装的模板
    Remote,
    /// 最近一次备份的注册表中的模板
    Backup,
    /// 本地可上传的模板
    Local,
    /// 新增 / 替换 / 停用模板
    Sync {
        /// 要上传的本地模板（展示名，可重复）
        #[arg(long = "add")]
        add: Vec<String>,
        /// 要停用的已安装模板（展示名，可重复）
        #[arg(long = "disable")]
        disable: Vec<String>,
        /// 覆盖同名同方向的已安装模板
        #[arg(long)]
        replace: bool,
        /// 修改前不备份设备上的注册表
        #[arg(long)]
        no_backup: bool,
    },
    /// 恢复最近一次备份的注册表
    Restore,
}

#[derive(Subcommand, Debug)]
pub enum DeviceCommand {
    Info,
    RestartUi,
    Reboot,
    Hostname { name: String },
    Timezone { timezone: String },
}

#[derive(Subcommand, Debug)]
pub enum ScreensCommand {
    /// 列出可替换的画面
    List,
    Backup { name: String },
    Upload { name: String, file: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sync() {
        let cli = Cli::parse_from([
            "remass", "-vv", "templates", "sync", "--add", "Dots", "--add", "Hex Landscape", "--replace",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.cmd {
            Command::Templates {
                cmd: TemplatesCommand::Sync { add, disable, replace, no_backup },
            } => {
                assert_eq!(add, vec!["Dots".to_string(), "Hex Landscape".to_string()]);
                assert!(disable.is_empty());
                assert!(replace);
                assert!(!no_backup);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["remass", "list", "--search", "Notes", "--dir", "/tmp/rm", "--dry-run"]);
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/rm")));
        assert!(cli.dry_run);
        assert!(matches!(cli.cmd, Command::List { search: Some(ref s), .. } if s == "Notes"));
    }

    #[test]
    fn parse_device_hostname() {
        let cli = Cli::parse_from(["remass", "device", "hostname", "my-tablet"]);
        assert!(matches!(cli.cmd, Command::Device { cmd: DeviceCommand::Hostname { ref name } } if name == "my-tablet"));
    }

    #[test]
    fn parse_list_browse() {
        let cli = Cli::parse_from(["remass", "list", "--in", "c1", "--depth", "2"]);
        match cli.cmd {
            Command::List { collection, depth, .. } => {
                assert_eq!(collection.as_deref(), Some("c1"));
                assert_eq!(depth, Some(2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
