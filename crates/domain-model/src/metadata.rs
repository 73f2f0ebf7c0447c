//! 解析设备上每个条目的 `<id>.metadata` JSON 文件。

use remass_common::{RemassError, RemassResult};
use serde::{Deserialize, Deserializer};

use crate::dirent::{DirEntry, DirentFlags, COLLECTION_TYPE, DOCUMENT_TYPE};

pub const METADATA_EXTENSION: &str = ".metadata";

/// 设备写入的毫秒时间戳有时是数字，有时是字符串
#[derive(Deserialize)]
#[serde(untagged)]
enum Millis {
    Number(u64),
    Text(String),
}

fn de_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match Millis::deserialize(deserializer)? {
        Millis::Number(n) => Ok(n),
        Millis::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataRecord {
    visible_name: String,
    version: i64,
    #[serde(deserialize_with = "de_millis")]
    last_modified: u64,
    deleted: bool,
    pinned: bool,
    synced: bool,
    #[serde(rename = "metadatamodified")]
    metadata_modified: bool,
    modified: bool,
    #[serde(default)]
    parent: Option<String>,
    #[serde(rename = "type")]
    type_tag: String,
    #[serde(default)]
    last_opened_page: Option<u32>,
}

/// 从元数据文件名中取出条目 id（`<id>.metadata`），其他文件返回 None
pub fn id_from_metadata_filename(filename: &str) -> Option<&str> {
    filename
        .strip_suffix(METADATA_EXTENSION)
        .filter(|id| !id.is_empty())
}

/// 把一条元数据记录解析为文档或集合
pub fn parse_metadata(id: &str, json: &str) -> RemassResult<DirEntry> {
    let record: MetadataRecord =
        serde_json::from_str(json).map_err(|e| RemassError::InvalidMetadata {
            id: id.to_string(),
            reason: e.to_string(),
        })?;

    let flags = DirentFlags {
        deleted: record.deleted,
        metadata_modified: record.metadata_modified,
        modified: record.modified,
        pinned: record.pinned,
        synced: record.synced,
    };

    let entry = match record.type_tag.as_str() {
        DOCUMENT_TYPE => {
            let page = record
                .last_opened_page
                .ok_or_else(|| RemassError::InvalidMetadata {
                    id: id.to_string(),
                    reason: "missing field `lastOpenedPage`".to_string(),
                })?;
            DirEntry::document(id, record.visible_name, record.version, record.parent, page)
        }
        COLLECTION_TYPE => DirEntry::collection(id, record.visible_name, record.version, record.parent),
        other => {
            return Err(RemassError::UnknownDirentType {
                id: id.to_string(),
                type_tag: other.to_string(),
            })
        }
    };
    Ok(entry.with_last_modified(record.last_modified).with_flags(flags))
}
