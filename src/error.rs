//! 資料集操作的錯誤型別
//!
//! 互動層使用 anyhow；這裡的型別讓呼叫端能區分版面、移動、紀錄與瀏覽錯誤

use crate::tools::{LogRecord, MoveRecord};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 資料夾版面不符合預期
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("dataset root not found: {}", .0.display())]
    RootMissing(PathBuf),

    #[error("expected folder is missing: {}", .0.display())]
    FolderMissing(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 檔案系統操作失敗
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("'{0}' is not a valid organ folder name")]
    InvalidOrgan(String),

    #[error("data point is already in organ '{0}'")]
    SameOrgan(String),

    #[error("source folder not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("this action needs a matched_images entry")]
    NotMatched,

    #[error("ground truth folder not found: {}", .0.display())]
    GroundTruthMissing(PathBuf),

    #[error("failed to create {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
    Relocate {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 原始資料夾已移動，但成對的 ground truth 沒有跟上（不會回滾）
    #[error(
        "raw folder moved to '{}/{}' but the ground truth move failed: {source}",
        .record.destination_organ,
        .record.final_destination_name
    )]
    PartialMove {
        record: Box<MoveRecord>,
        #[source]
        source: Box<MoveError>,
        /// 寫入部分移動紀錄時的錯誤
        log_error: Option<Box<LogError>>,
    },

    /// 第一步已改動磁碟，後續步驟失敗；`record` 描述實際完成的部分
    #[error("{}, but the remaining step failed: {source}", .record.summary())]
    Incomplete {
        record: Box<LogRecord>,
        #[source]
        source: Box<MoveError>,
        log_error: Option<Box<LogError>>,
    },

    /// 交換中斷且無法還原，原本的 raw 內容留在暫存資料夾
    #[error("switch interrupted, original raw folder left at {}: {source}", .temp_path.display())]
    SwitchStranded {
        temp_path: PathBuf,
        #[source]
        source: Box<MoveError>,
    },
}

impl MoveError {
    /// 部分完成時寫入紀錄失敗的錯誤
    #[must_use]
    pub fn log_error(&self) -> Option<&LogError> {
        match self {
            Self::PartialMove { log_error, .. } | Self::Incomplete { log_error, .. } => {
                log_error.as_deref()
            }
            _ => None,
        }
    }

    /// 已改動磁碟、應寫入紀錄的那一部分
    #[must_use]
    pub fn partial_record(&self) -> Option<LogRecord> {
        match self {
            Self::PartialMove { record, .. } => Some(LogRecord::Move((**record).clone())),
            Self::Incomplete { record, .. } => Some((**record).clone()),
            _ => None,
        }
    }
}

/// 移動紀錄檔讀寫失敗
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to access move log {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("move log {} is not valid JSON: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("move log {} does not contain a JSON array", .path.display())]
    NotAnArray { path: PathBuf },

    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 瀏覽游標錯誤
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("the list changed on disk, rescan before navigating")]
    Stale,

    #[error("index must be between 1 and {len}")]
    OutOfRange { len: usize },

    #[error("no entry matches '{0}'")]
    NotFound(String),
}
