//! 文档渲染器读取文档文件的数据源。
//!
//! 渲染器期望文本类文件（.content、.pagedata 等）以字符串形式读取，
//! 而远程会话只提供字节流，[`RemoteFileSource`] 按扩展名决定是否解码。
//! [`LocalFileSource`] 对本地备份目录提供同样的接口。

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use remass_common::{RemassError, RemassResult};

use crate::session::{remote_join, OpenMode, RemoteHandle, RemoteSession};

/// 设备上存放文档的目录
pub const REMOTE_XOCHITL_DIR: &str = "/home/root/.local/share/remarkable/xochitl";

/// 文件名模板中代表文档 id 的占位符
pub const ID_PLACEHOLDER: &str = "{ID}";

const TEXT_EXTENSIONS: [&str; 4] = [".json", ".content", ".pagedata", ".bookm"];

/// 设备特有的文本格式（配置、描述、页面布局、书签）
pub fn is_text_file(filename: &str) -> bool {
    TEXT_EXTENSIONS.iter().any(|ext| filename.ends_with(ext))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl FileContent {
    pub fn len(&self) -> usize {
        match self {
            FileContent::Text(s) => s.len(),
            FileContent::Bytes(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            FileContent::Text(s) => s.into_bytes(),
            FileContent::Bytes(b) => b,
        }
    }
}

/// 渲染器使用的数据源接口
pub trait DocumentSource {
    type File: DocumentFile;

    fn open(&self, name: &str) -> RemassResult<Self::File>;

    fn exists(&self, name: &str) -> RemassResult<bool>;
}

pub trait DocumentFile {
    /// 读取至多 `size` 字节（None 表示读到末尾）
    fn read(&mut self, size: Option<usize>) -> RemassResult<FileContent>;
}

fn read_chunk<R: Read + ?Sized>(reader: &mut R, size: Option<usize>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    match size {
        Some(n) => {
            <&mut R as Read>::take(reader, n as u64).read_to_end(&mut buf)?;
        }
        None => {
            reader.read_to_end(&mut buf)?;
        }
    }
    Ok(buf)
}

fn decode(buf: Vec<u8>, text: bool, path: &str) -> RemassResult<FileContent> {
    if !text {
        return Ok(FileContent::Bytes(buf));
    }
    String::from_utf8(buf).map(FileContent::Text).map_err(|e| {
        RemassError::transfer("decode", path, io::Error::new(io::ErrorKind::InvalidData, e))
    })
}

fn format_name(name: &str, doc_id: &str) -> String {
    name.replace(ID_PLACEHOLDER, doc_id)
}

/// 设备上某个文档的文件
pub struct RemoteFileSource<'s, S: RemoteSession + ?Sized> {
    session: &'s S,
    base_dir: String,
    doc_id: String,
}

impl<'s, S: RemoteSession + ?Sized> RemoteFileSource<'s, S> {
    pub fn new(session: &'s S, doc_id: impl Into<String>) -> Self {
        Self::with_base_dir(session, REMOTE_XOCHITL_DIR, doc_id)
    }

    pub fn with_base_dir(session: &'s S, base_dir: impl Into<String>, doc_id: impl Into<String>) -> Self {
        Self {
            session,
            base_dir: base_dir.into(),
            doc_id: doc_id.into(),
        }
    }

    /// 把 `{ID}.content` 之类的模板解析为完整的远程路径
    pub fn resolve(&self, name: &str) -> String {
        remote_join(&self.base_dir, &format_name(name, &self.doc_id))
    }

    pub fn open_with_mode(&self, name: &str, mode: OpenMode) -> RemassResult<RemoteFile<'s>> {
        let path = self.resolve(name);
        let mut handle = self
            .session
            .open_file(&path, mode)
            .map_err(|e| RemassError::transfer("open", path.as_str(), e))?;
        // 预读只是优化，不支持或失败都不影响后续读取
        if let Err(e) = handle.prefetch(None) {
            log::debug!("prefetch unavailable for '{}': {}", path, e);
        }
        Ok(RemoteFile {
            decode: is_text_file(&path),
            handle,
            path,
        })
    }
}

impl<'s, S: RemoteSession + ?Sized> DocumentSource for RemoteFileSource<'s, S> {
    type File = RemoteFile<'s>;

    fn open(&self, name: &str) -> RemassResult<RemoteFile<'s>> {
        self.open_with_mode(name, OpenMode::Read)
    }

    fn exists(&self, name: &str) -> RemassResult<bool> {
        let path = self.resolve(name);
        match self.session.stat(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(RemassError::transfer("stat", path, e)),
        }
    }
}

/// 打开的远程文件；远程句柄随本对象一起释放
pub struct RemoteFile<'s> {
    handle: Box<dyn RemoteHandle + 's>,
    path: String,
    decode: bool,
}

impl RemoteFile<'_> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_text(&self) -> bool {
        self.decode
    }
}

impl DocumentFile for RemoteFile<'_> {
    fn read(&mut self, size: Option<usize>) -> RemassResult<FileContent> {
        let buf = read_chunk(self.handle.as_mut(), size)
            .map_err(|e| RemassError::transfer("read", self.path.as_str(), e))?;
        decode(buf, self.decode, &self.path)
    }
}

/// 本地备份目录中某个文档的文件
#[derive(Debug, Clone)]
pub struct LocalFileSource {
    base_dir: PathBuf,
    doc_id: String,
}

impl LocalFileSource {
    pub fn new(base_dir: impl Into<PathBuf>, doc_id: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            doc_id: doc_id.into(),
        }
    }

    pub fn resolve(&self, name: &str) -> PathBuf {
        self.base_dir.join(format_name(name, &self.doc_id))
    }
}

pub struct LocalFile {
    file: File,
    path: String,
    decode: bool,
}

impl DocumentSource for LocalFileSource {
    type File = LocalFile;

    fn open(&self, name: &str) -> RemassResult<LocalFile> {
        let path = self.resolve(name);
        let display = path.display().to_string();
        let file = File::open(&path).map_err(|e| RemassError::transfer("open", display.as_str(), e))?;
        Ok(LocalFile {
            file,
            decode: is_text_file(&display),
            path: display,
        })
    }

    fn exists(&self, name: &str) -> RemassResult<bool> {
        Ok(self.resolve(name).exists())
    }
}

impl DocumentFile for LocalFile {
    fn read(&mut self, size: Option<usize>) -> RemassResult<FileContent> {
        let buf = read_chunk(&mut self.file, size)
            .map_err(|e| RemassError::transfer("read", self.path.as_str(), e))?;
        decode(buf, self.decode, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySession;

    const DOC: &str = "f3c8a1e2-955";

    fn session() -> MemorySession {
        MemorySession::new()
            .with_file(&format!("{}/{}.content", REMOTE_XOCHITL_DIR, DOC), r#"{"pageCount": 2}"#)
            .with_file(&format!("{}/{}.pdf", REMOTE_XOCHITL_DIR, DOC), vec![0x25, 0x50, 0xff, 0x00])
    }

    #[test]
    fn test_text_extensions() {
        assert!(is_text_file("a.content"));
        assert!(is_text_file("a.pagedata"));
        assert!(is_text_file("a.bookm"));
        assert!(is_text_file("templates.json"));
        assert!(!is_text_file("a.pdf"));
        assert!(!is_text_file("a/0.rm"));
    }

    #[test]
    fn test_content_read_as_text() {
        let s = session();
        let src = RemoteFileSource::new(&s, DOC);
        let mut f = src.open("{ID}.content").unwrap();
        assert!(f.path().ends_with("f3c8a1e2-955.content"));
        assert_eq!(f.read(None).unwrap(), FileContent::Text(r#"{"pageCount": 2}"#.to_string()));
    }

    #[test]
    fn test_pdf_read_as_bytes() {
        let s = session();
        let src = RemoteFileSource::new(&s, DOC);
        let mut f = src.open("{ID}.pdf").unwrap();
        assert!(!f.is_text());
        assert_eq!(f.read(Some(2)).unwrap(), FileContent::Bytes(vec![0x25, 0x50]));
        assert_eq!(f.read(None).unwrap(), FileContent::Bytes(vec![0xff, 0x00]));
    }

    #[test]
    fn test_exists() {
        let s = session();
        let src = RemoteFileSource::new(&s, DOC);
        assert!(src.exists("{ID}.content").unwrap());
        assert!(!src.exists("{ID}.epub").unwrap());
    }

    #[test]
    fn test_handle_released_on_all_paths() {
        let s = session();
        let src = RemoteFileSource::new(&s, DOC);
        {
            let mut f = src.open("{ID}.content").unwrap();
            let _ = f.read(None).unwrap();
            assert_eq!(s.open_handles(), 1);
        }
        assert_eq!(s.open_handles(), 0);

        // 解码失败也会释放句柄
        s.put_file(&format!("{}/{}.pagedata", REMOTE_XOCHITL_DIR, DOC), vec![0xff, 0xfe]);
        let result = src.open("{ID}.pagedata").and_then(|mut f| f.read(None));
        assert!(result.is_err());
        assert_eq!(s.open_handles(), 0);

        assert!(src.open("{ID}.missing").is_err());
        assert_eq!(s.open_handles(), 0);
    }

    #[test]
    fn test_local_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("abc.content"), "{}").unwrap();
        std::fs::write(dir.path().join("abc.pdf"), [1u8, 2, 3]).unwrap();
        let src = LocalFileSource::new(dir.path(), "abc");
        assert!(src.exists("{ID}.content").unwrap());
        assert!(!src.exists("{ID}.epub").unwrap());
        assert_eq!(src.open("{ID}.content").unwrap().read(None).unwrap(), FileContent::Text("{}".into()));
        assert_eq!(src.open("{ID}.pdf").unwrap().read(None).unwrap(), FileContent::Bytes(vec![1, 2, 3]));
    }
}
