use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use remass_common::{safe_filename, AppConfig, RemassError, RemassResult};
use remass_remote::{DocumentFile, DocumentSource, FileContent, ID_PLACEHOLDER};

/// 未指定输出路径时保存到导出目录
pub fn default_output(config: &AppConfig, id: &str, template: &str) -> PathBuf {
    config
        .export_dir()
        .join(safe_filename(&template.replace(ID_PLACEHOLDER, id)))
}

/// 读取文档的单个文件并保存到 `output`
pub fn fetch<D, W>(source: &D, id: &str, template: &str, output: &Path, out: &mut W) -> RemassResult<()>
where
    D: DocumentSource,
    W: Write,
{
    let name = template.replace(ID_PLACEHOLDER, id);
    if !source.exists(template)? {
        return Err(RemassError::InvalidPath(format!("'{}' does not exist", name)));
    }
    let content = source.open(template)?.read(None)?;
    let kind = match content {
        FileContent::Text(_) => "text",
        FileContent::Bytes(_) => "binary",
    };
    let size = content.len();
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(output, content.into_bytes())?;
    writeln!(out, "{} ({} bytes, {}) -> {}", name, size, kind, output.display())?;
    Ok(())
}
