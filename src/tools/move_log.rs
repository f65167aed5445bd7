//! 移動紀錄檔
//!
//! 紀錄檔是一個 JSON 陣列，每次新增都會讀取整個陣列、附加一筆後整個寫回。
//! 既有項目以原始 JSON 值保留，新增不會改動任何舊紀錄。

use crate::error::LogError;
use crate::tools::RootKind;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 預設紀錄檔名稱（位於工作目錄）
pub const MOVE_LOG_FILE: &str = "organ_reclassifier_moves_log.json";

/// 一次重新分類的紀錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub timestamp: DateTime<Utc>,
    pub root_kind: RootKind,
    pub data_point_id: String,
    pub source_organ: String,
    pub destination_organ: String,
    pub final_destination_name: String,
    pub ground_truth_moved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth_destination_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchRecord {
    pub timestamp: DateTime<Utc>,
    pub organ: String,
    pub data_point_id: String,
    pub raw_path: PathBuf,
    pub ground_truth_path: PathBuf,
}

/// 將 matched 資料點的一側降級到 `raw_images`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoteRecord {
    pub timestamp: DateTime<Utc>,
    pub organ: String,
    pub data_point_id: String,
    pub kept_side: PairSide,
    pub final_destination_name: String,
    pub removed_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRecord {
    pub timestamp: DateTime<Utc>,
    pub root_kind: RootKind,
    pub organ: String,
    pub data_point_id: String,
    pub deleted_paths: Vec<PathBuf>,
}

/// matched 資料點的哪一側
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairSide {
    Raw,
    GroundTruth,
}

/// 紀錄檔中的一筆項目，以 `action` 欄位區分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LogRecord {
    Move(MoveRecord),
    SwitchRawGt(SwitchRecord),
    DemoteToRaw(DemoteRecord),
    Delete(DeleteRecord),
}

impl LogRecord {
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Move(r) => r.timestamp,
            Self::SwitchRawGt(r) => r.timestamp,
            Self::DemoteToRaw(r) => r.timestamp,
            Self::Delete(r) => r.timestamp,
        }
    }

    /// 單行摘要，供歷史清單顯示
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Move(r) => {
                let mut line = format!(
                    "move {} {}: {} -> {}/{}",
                    r.root_kind,
                    r.data_point_id,
                    r.source_organ,
                    r.destination_organ,
                    r.final_destination_name
                );
                if r.ground_truth_moved {
                    line.push_str(" (+gt)");
                }
                line
            }
            Self::SwitchRawGt(r) => format!("switch raw/gt {}/{}", r.organ, r.data_point_id),
            Self::DemoteToRaw(r) => format!(
                "demote {}/{} -> raw_images/{}/{}",
                r.organ, r.data_point_id, r.organ, r.final_destination_name
            ),
            Self::Delete(r) => format!(
                "delete {} {}/{} ({} folders)",
                r.root_kind,
                r.organ,
                r.data_point_id,
                r.deleted_paths.len()
            ),
        }
    }
}

impl From<MoveRecord> for LogRecord {
    fn from(record: MoveRecord) -> Self {
        Self::Move(record)
    }
}

impl From<SwitchRecord> for LogRecord {
    fn from(record: SwitchRecord) -> Self {
        Self::SwitchRawGt(record)
    }
}

impl From<DemoteRecord> for LogRecord {
    fn from(record: DemoteRecord) -> Self {
        Self::DemoteToRaw(record)
    }
}

impl From<DeleteRecord> for LogRecord {
    fn from(record: DeleteRecord) -> Self {
        Self::Delete(record)
    }
}

/// 紀錄檔的控制代碼，程式啟動時開啟一次，傳給需要記錄的元件
#[derive(Debug)]
pub struct MoveLog {
    path: PathBuf,
}

impl MoveLog {
    /// 開啟紀錄檔；不存在時建立空陣列
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LogError> {
        let path = path.into();

        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| LogError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&path, "[]").map_err(|source| LogError::Io {
                path: path.clone(),
                source,
            })?;
            info!("建立移動紀錄檔: {}", path.display());
        }

        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 附加一筆紀錄並寫回檔案
    pub fn append(&mut self, record: &LogRecord) -> Result<(), LogError> {
        let mut entries = self.read_values()?;
        entries.push(serde_json::to_value(record)?);

        let content = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, content).map_err(|source| LogError::Io {
            path: self.path.clone(),
            source,
        })?;

        Ok(())
    }

    /// 讀取所有能辨識的紀錄（依寫入順序）
    pub fn read_all(&self) -> Result<Vec<LogRecord>, LogError> {
        let records = self
            .read_values()?
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("略過無法解析的紀錄 #{index}: {e}");
                    None
                }
            })
            .collect();

        Ok(records)
    }

    /// 最近的 `count` 筆紀錄，新的在前
    pub fn recent(&self, count: usize) -> Result<Vec<LogRecord>, LogError> {
        let mut records = self.read_all()?;
        records.reverse();
        records.truncate(count);
        Ok(records)
    }

    fn read_values(&self) -> Result<Vec<Value>, LogError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(LogError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(&content).map_err(|source| LogError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        match value {
            Value::Array(entries) => Ok(entries),
            _ => Err(LogError::NotAnArray {
                path: self.path.clone(),
            }),
        }
    }
}
