use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 一次本地 → 设备的文件传输
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAction {
    pub local: PathBuf,
    pub remote: String,
}

impl UploadAction {
    pub fn new(local: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            remote: remote.into(),
        }
    }
}
