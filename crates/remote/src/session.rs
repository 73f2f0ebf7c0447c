//! 与平板之间的远程会话接口。
//!
//! 会话本身（认证、密钥、重连）不属于本 crate 的职责，这里只约定核心逻辑
//! 需要的几个阻塞调用。所有方法返回 `io::Result`，由调用方转换成带上下文的
//! [`remass_common::RemassError::Transfer`]。同一会话不能被多个线程同时使用，
//! 见 [`crate::TabletConnection`]。

use std::io::{self, Read, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
}

/// 远程目录中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDirEntry {
    pub name: String,
    pub is_regular_file: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteStat {
    pub size: u64,
}

/// 打开的远程文件，Drop 时释放远程句柄
pub trait RemoteHandle: Read + Write {
    /// 预读提示；不支持时返回 `ErrorKind::Unsupported`，调用方不应视为失败
    fn prefetch(&mut self, _size: Option<u64>) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "prefetch not supported"))
    }
}

pub trait RemoteSession {
    /// 执行远程命令并返回标准输出
    fn run_command(&self, command: &str) -> io::Result<String>;

    fn open_file(&self, path: &str, mode: OpenMode) -> io::Result<Box<dyn RemoteHandle + '_>>;

    fn list_dir(&self, path: &str) -> io::Result<Vec<RemoteDirEntry>>;

    /// 文件不存在时返回 `ErrorKind::NotFound`
    fn stat(&self, path: &str) -> io::Result<RemoteStat>;

    fn upload_file(&self, local: &Path, remote: &str) -> io::Result<()>;

    fn download_file(&self, remote: &str, local: &Path) -> io::Result<()>;
}

impl<S: RemoteSession + ?Sized> RemoteSession for &S {
    fn run_command(&self, command: &str) -> io::Result<String> {
        (**self).run_command(command)
    }

    fn open_file(&self, path: &str, mode: OpenMode) -> io::Result<Box<dyn RemoteHandle + '_>> {
        (**self).open_file(path, mode)
    }

    fn list_dir(&self, path: &str) -> io::Result<Vec<RemoteDirEntry>> {
        (**self).list_dir(path)
    }

    fn stat(&self, path: &str) -> io::Result<RemoteStat> {
        (**self).stat(path)
    }

    fn upload_file(&self, local: &Path, remote: &str) -> io::Result<()> {
        (**self).upload_file(local, remote)
    }

    fn download_file(&self, remote: &str, local: &Path) -> io::Result<()> {
        (**self).download_file(remote, local)
    }
}

/// 供 shell 命令使用的单引号转义
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// 远程（POSIX）路径的父目录
pub fn remote_parent(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => "/",
        Some(i) => &trimmed[..i],
        None => ".",
    }
}

/// 连接远程目录与文件名
pub fn remote_join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain"), "'plain'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_remote_parent() {
        assert_eq!(remote_parent("/usr/share/remarkable/templates/a.svg"), "/usr/share/remarkable/templates");
        assert_eq!(remote_parent("/a"), "/");
        assert_eq!(remote_parent("a.svg"), ".");
        assert_eq!(remote_parent("/usr/share/"), "/usr");
    }

    #[test]
    fn test_remote_join() {
        assert_eq!(remote_join("/usr/share", "x.png"), "/usr/share/x.png");
        assert_eq!(remote_join("/", "x.png"), "/x.png");
    }
}
