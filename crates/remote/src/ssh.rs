//! 基于系统 OpenSSH 客户端（`ssh` / `scp`）的会话实现。
//!
//! 只支持密钥或 ssh-agent 认证：所有调用都以 `BatchMode=yes` 运行，
//! 不会在终端上交互式地询问密码。

use std::io::{self, Cursor, Read, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};

use remass_common::ConnectionConfig;

use crate::session::{shell_quote, OpenMode, RemoteDirEntry, RemoteHandle, RemoteSession, RemoteStat};

#[derive(Debug, Clone)]
pub struct OpenSshSession {
    host: String,
    config: ConnectionConfig,
}

fn command_failed(what: &str, output: &Output) -> io::Error {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let kind = if stderr.contains("No such file") {
        io::ErrorKind::NotFound
    } else if stderr.contains("Permission denied") {
        io::ErrorKind::PermissionDenied
    } else if stderr.contains("timed out") {
        io::ErrorKind::TimedOut
    } else {
        io::ErrorKind::Other
    };
    io::Error::new(kind, format!("{} failed ({}): {}", what, output.status, stderr.trim()))
}

impl OpenSshSession {
    /// 连接主地址；超时且配置了备用地址时改用备用地址
    pub fn connect(config: &ConnectionConfig) -> io::Result<Self> {
        let session = Self {
            host: config.host.clone(),
            config: config.clone(),
        };
        match session.run_command("true") {
            Ok(_) => Ok(session),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => match &config.host_fallback {
                Some(fallback) => {
                    log::info!("Connection to {} timed out, trying {}", config.host, fallback);
                    let session = Self {
                        host: fallback.clone(),
                        config: config.clone(),
                    };
                    session.run_command("true")?;
                    Ok(session)
                }
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn destination(&self) -> String {
        format!("{}@{}", self.config.user, self.host)
    }

    fn common_options(&self, cmd: &mut Command) {
        cmd.arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg(format!("ConnectTimeout={}", self.config.timeout_secs))
            .arg("-o")
            .arg("StrictHostKeyChecking=accept-new");
        if let Some(key) = &self.config.keyfile {
            cmd.arg("-i").arg(key);
        }
    }

    fn ssh(&self) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-p").arg(self.config.port.to_string());
        self.common_options(&mut cmd);
        cmd.arg(self.destination()).arg("--");
        cmd
    }

    fn scp(&self) -> Command {
        let mut cmd = Command::new("scp");
        cmd.arg("-q").arg("-P").arg(self.config.port.to_string());
        self.common_options(&mut cmd);
        cmd
    }

    fn remote_spec(&self, path: &str) -> String {
        format!("{}:{}", self.destination(), path)
    }

    fn run_raw(&self, command: &str, stdin: Option<&[u8]>) -> io::Result<Vec<u8>> {
        log::debug!("[{}] $ {}", self.host, command);
        let mut cmd = self.ssh();
        cmd.arg(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() });
        let mut child = cmd.spawn()?;
        if let (Some(data), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(data)?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(command_failed(command, &output));
        }
        Ok(output.stdout)
    }
}

/// 读取时一次性取回整个文件；写入时先缓存，flush 或 Drop 时写回设备
struct SshHandle<'a> {
    session: &'a OpenSshSession,
    path: String,
    mode: OpenMode,
    buf: Cursor<Vec<u8>>,
    dirty: bool,
}

impl Read for SshHandle<'_> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.buf.read(out)
    }
}

impl Write for SshHandle<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.mode != OpenMode::Write {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "file opened for reading"));
        }
        self.dirty = true;
        self.buf.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.dirty {
            let command = format!("cat > {}", shell_quote(&self.path));
            self.session.run_raw(&command, Some(self.buf.get_ref()))?;
            self.dirty = false;
        }
        Ok(())
    }
}

impl RemoteHandle for SshHandle<'_> {}

impl Drop for SshHandle<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            log::error!("Failed to write back '{}': {}", self.path, e);
        }
    }
}

impl RemoteSession for OpenSshSession {
    fn run_command(&self, command: &str) -> io::Result<String> {
        let stdout = self.run_raw(command, None)?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    fn open_file(&self, path: &str, mode: OpenMode) -> io::Result<Box<dyn RemoteHandle + '_>> {
        let content = match mode {
            OpenMode::Read => self.run_raw(&format!("cat {}", shell_quote(path)), None)?,
            OpenMode::Write => Vec::new(),
        };
        Ok(Box::new(SshHandle {
            session: self,
            path: path.to_string(),
            mode,
            buf: Cursor::new(content),
            // 以写方式打开即截断，即使没有写入也要在关闭时创建空文件
            dirty: mode == OpenMode::Write,
        }))
    }

    fn list_dir(&self, path: &str) -> io::Result<Vec<RemoteDirEntry>> {
        // -p 在目录名后追加 '/'
        let listing = self.run_command(&format!("ls -1Ap {}", shell_quote(path)))?;
        Ok(listing
            .lines()
            .filter(|l| !l.is_empty())
            .map(|l| match l.strip_suffix('/') {
                Some(dir) => RemoteDirEntry {
                    name: dir.to_string(),
                    is_regular_file: false,
                },
                None => RemoteDirEntry {
                    name: l.to_string(),
                    is_regular_file: true,
                },
            })
            .collect())
    }

    fn stat(&self, path: &str) -> io::Result<RemoteStat> {
        let out = self.run_command(&format!("stat -c %s {}", shell_quote(path)))?;
        let size = out
            .trim()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("stat '{}': {}", out.trim(), e)))?;
        Ok(RemoteStat { size })
    }

    fn upload_file(&self, local: &Path, remote: &str) -> io::Result<()> {
        log::debug!("[{}] upload {} -> {}", self.host, local.display(), remote);
        let output = self.scp().arg(local).arg(self.remote_spec(remote)).output()?;
        if !output.status.success() {
            return Err(command_failed("scp upload", &output));
        }
        Ok(())
    }

    fn download_file(&self, remote: &str, local: &Path) -> io::Result<()> {
        log::debug!("[{}] download {} -> {}", self.host, remote, local.display());
        let output = self.scp().arg(self.remote_spec(remote)).arg(local).output()?;
        if !output.status.success() {
            return Err(command_failed("scp download", &output));
        }
        Ok(())
    }
}
