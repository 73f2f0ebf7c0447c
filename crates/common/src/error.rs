use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemassError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 子条目引用了快照中不存在的父条目（快照不完整）
    #[error("Integrity error: parent '{parent}' of entry '{child}' is not part of the snapshot")]
    OrphanedEntry { child: String, parent: String },

    #[error("Integrity error: duplicate entry id '{0}'")]
    DuplicateId(String),

    #[error("Integrity error: entry '{id}' has unsupported type '{type_tag}'")]
    UnknownDirentType { id: String, type_tag: String },

    #[error("Integrity error: invalid metadata for entry '{id}': {reason}")]
    InvalidMetadata { id: String, reason: String },

    #[error(
        "Not enough disk space: uploading '{source_path}' ({required_kb} KB) to '{destination}' \
         would leave less than the reserved space on the partition (free: {available_kb} KB)"
    )]
    NotEnoughDiskSpace {
        source_path: String,
        destination: String,
        required_kb: u64,
        available_kb: u64,
    },

    #[error("Not enough disk space: cannot determine free space for '{location}' (df output: '{output}')")]
    FreeSpaceUnknown { location: String, output: String },

    #[error("Transfer error: {operation} '{path}' failed: {source}")]
    Transfer {
        operation: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 软错误：模板缺少 SVG 或 PNG 资源，仅跳过该模板
    #[error("Template '{filename}' is incomplete, missing asset '{missing}'")]
    TemplateAssetIncomplete { filename: String, missing: String },

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Session is busy with another operation")]
    SessionBusy,

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RemassError {
    pub fn transfer(operation: &'static str, path: impl Into<String>, source: std::io::Error) -> Self {
        RemassError::Transfer {
            operation,
            path: path.into(),
            source,
        }
    }

    /// 是否为使整个快照不可用的完整性错误
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            RemassError::OrphanedEntry { .. }
                | RemassError::DuplicateId(_)
                | RemassError::UnknownDirentType { .. }
                | RemassError::InvalidMetadata { .. }
        )
    }

    /// 磁盘空间与资源缺失类错误只需提示，批处理的其余部分可继续
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            RemassError::NotEnoughDiskSpace { .. }
                | RemassError::FreeSpaceUnknown { .. }
                | RemassError::TemplateAssetIncomplete { .. }
        )
    }
}

pub type RemassResult<T> = Result<T, RemassError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orphan_message_names_both_ids() {
        let err = RemassError::OrphanedEntry {
            child: "c-1".into(),
            parent: "p-9".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("c-1"));
        assert!(msg.contains("p-9"));
        assert!(err.is_integrity());
        assert!(!err.is_soft());
    }

    #[test]
    fn test_disk_space_is_soft() {
        let err = RemassError::NotEnoughDiskSpace {
            source_path: "a.png".into(),
            destination: "/usr/share/remarkable/a.png".into(),
            required_kb: 2000,
            available_kb: 2900,
        };
        assert!(err.is_soft());
        assert!(err.to_string().contains("2900"));
    }
}
