//! 内存中的平板会话：离线演练与测试使用。
//! 命令输出按前缀预设，所有命令与传输按顺序记录。

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::session::{OpenMode, RemoteDirEntry, RemoteHandle, RemoteSession, RemoteStat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Command(String),
    Upload { local: PathBuf, remote: String },
    Download { remote: String, local: PathBuf },
}

#[derive(Debug, Default)]
pub struct MemorySession {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    responses: Mutex<Vec<(String, String)>>,
    events: Mutex<Vec<SessionEvent>>,
    open_handles: AtomicUsize,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{}: No such file", path))
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.put_file(path, content);
        self
    }

    /// 以 `prefix` 开头的命令返回 `output`；先登记的优先
    pub fn with_response(self, prefix: &str, output: &str) -> Self {
        lock(&self.responses).push((prefix.to_string(), output.to_string()));
        self
    }

    pub fn put_file(&self, path: &str, content: impl Into<Vec<u8>>) {
        lock(&self.files).insert(path.to_string(), content.into());
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        lock(&self.files).get(path).cloned()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        lock(&self.events).clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::Command(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// 按上传顺序排列的远程目标路径
    pub fn uploads(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::Upload { remote, .. } => Some(remote),
                _ => None,
            })
            .collect()
    }

    /// 尚未释放的文件句柄数
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    fn record(&self, event: SessionEvent) {
        lock(&self.events).push(event);
    }
}

struct MemoryHandle<'a> {
    session: &'a MemorySession,
    path: String,
    mode: OpenMode,
    buf: Cursor<Vec<u8>>,
}

impl Read for MemoryHandle<'_> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.buf.read(out)
    }
}

impl Write for MemoryHandle<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.mode != OpenMode::Write {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "file opened for reading"));
        }
        self.buf.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.mode == OpenMode::Write {
            self.session.put_file(&self.path, self.buf.get_ref().clone());
        }
        Ok(())
    }
}

impl RemoteHandle for MemoryHandle<'_> {
    fn prefetch(&mut self, _size: Option<u64>) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for MemoryHandle<'_> {
    fn drop(&mut self) {
        let _ = self.flush();
        self.session.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RemoteSession for MemorySession {
    fn run_command(&self, command: &str) -> io::Result<String> {
        self.record(SessionEvent::Command(command.to_string()));
        lock(&self.responses)
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, format!("unexpected command: {}", command)))
    }

    fn open_file(&self, path: &str, mode: OpenMode) -> io::Result<Box<dyn RemoteHandle + '_>> {
        let content = match mode {
            OpenMode::Read => self.file(path).ok_or_else(|| not_found(path))?,
            OpenMode::Write => Vec::new(),
        };
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryHandle {
            session: self,
            path: path.to_string(),
            mode,
            buf: Cursor::new(content),
        }))
    }

    fn list_dir(&self, path: &str) -> io::Result<Vec<RemoteDirEntry>> {
        let dir = path.trim_end_matches('/');
        let prefix = format!("{}/", dir);
        let files = lock(&self.files);
        let mut entries: Vec<RemoteDirEntry> = Vec::new();
        for key in files.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            let (name, is_regular_file) = match rest.split_once('/') {
                Some((sub, _)) => (sub, false),
                None => (rest, true),
            };
            if !entries.iter().any(|e| e.name == name) {
                entries.push(RemoteDirEntry {
                    name: name.to_string(),
                    is_regular_file,
                });
            }
        }
        // 内存中没有空目录：无任何子项即视为不存在
        if entries.is_empty() {
            return Err(not_found(path));
        }
        Ok(entries)
    }

    fn stat(&self, path: &str) -> io::Result<RemoteStat> {
        self.file(path)
            .map(|c| RemoteStat { size: c.len() as u64 })
            .ok_or_else(|| not_found(path))
    }

    fn upload_file(&self, local: &Path, remote: &str) -> io::Result<()> {
        let content = fs::read(local)?;
        self.put_file(remote, content);
        self.record(SessionEvent::Upload {
            local: local.to_path_buf(),
            remote: remote.to_string(),
        });
        Ok(())
    }

    fn download_file(&self, remote: &str, local: &Path) -> io::Result<()> {
        let content = self.file(remote).ok_or_else(|| not_found(remote))?;
        fs::write(local, content)?;
        self.record(SessionEvent::Download {
            remote: remote.to_string(),
            local: local.to_path_buf(),
        });
        Ok(())
    }
}
