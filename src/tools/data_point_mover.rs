//! 資料點重新分類
//!
//! 移動原始資料夾，matched 資料點再帶上成對的 ground truth。
//! 名稱衝突時以 `_dupN` 改名；ground truth 與原始資料夾各自檢查衝突。

use crate::error::{LogError, MoveError};
use crate::tools::{
    DataPointEntry, DatasetLayout, LogRecord, MoveLog, MoveRecord, collision_free_name,
    move_directory, validate_organ_name,
};
use chrono::Utc;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// 移動完成後的結果；紀錄寫入失敗不影響已完成的移動
#[derive(Debug)]
pub struct MoveOutcome {
    pub record: MoveRecord,
    pub log_error: Option<LogError>,
}

pub struct DataPointMover {
    layout: DatasetLayout,
}

impl DataPointMover {
    #[must_use]
    pub const fn new(layout: DatasetLayout) -> Self {
        Self { layout }
    }

    #[must_use]
    pub const fn layout(&self) -> &DatasetLayout {
        &self.layout
    }

    /// 將資料點移動到另一個器官資料夾
    pub fn relocate(
        &self,
        entry: &DataPointEntry,
        destination_organ: &str,
    ) -> Result<MoveRecord, MoveError> {
        validate_organ_name(destination_organ)?;
        if destination_organ == entry.organ {
            return Err(MoveError::SameOrgan(entry.organ.clone()));
        }
        if !entry.raw_path.is_dir() {
            return Err(MoveError::SourceMissing(entry.raw_path.clone()));
        }

        let kind = entry.root_kind;
        let raw_parent = self.layout.data_point_parent(kind, destination_organ);
        let final_destination_name =
            move_into(&entry.raw_path, &raw_parent, &entry.data_point_id)?;

        info!(
            "移動資料點 {} {}: {} -> {}/{}",
            kind, entry.data_point_id, entry.organ, destination_organ, final_destination_name
        );

        let mut record = MoveRecord {
            timestamp: Utc::now(),
            root_kind: kind,
            data_point_id: entry.data_point_id.clone(),
            source_organ: entry.organ.clone(),
            destination_organ: destination_organ.to_string(),
            final_destination_name,
            ground_truth_moved: false,
            ground_truth_destination_name: None,
        };

        let Some(ground_truth) = entry.ground_truth_path.as_deref().filter(|p| p.is_dir()) else {
            return Ok(record);
        };

        let gt_parent = self.layout.ground_truth_parent(destination_organ);
        match move_into(ground_truth, &gt_parent, &record.final_destination_name) {
            Ok(gt_name) => {
                info!("同步移動 ground truth: {}/{}", destination_organ, gt_name);
                record.ground_truth_moved = true;
                record.ground_truth_destination_name = Some(gt_name);
                Ok(record)
            }
            Err(e) => {
                warn!("ground truth 移動失敗，原始資料夾已移動且不回滾: {e}");
                Err(MoveError::PartialMove {
                    record: Box::new(record),
                    source: Box::new(e),
                    log_error: None,
                })
            }
        }
    }

    /// 移動並寫入紀錄檔
    ///
    /// 部分移動時仍會寫入原始資料夾那一筆紀錄，讓紀錄與磁碟一致
    pub fn move_and_log(
        &self,
        entry: &DataPointEntry,
        destination_organ: &str,
        log: &mut MoveLog,
    ) -> Result<MoveOutcome, MoveError> {
        match self.relocate(entry, destination_organ) {
            Ok(record) => {
                let log_error = append_or_warn(log, &LogRecord::Move(record.clone()));
                Ok(MoveOutcome { record, log_error })
            }
            Err(e) => Err(record_partial(log, e)),
        }
    }
}

/// 把 `source` 移到 `parent` 底下，名稱衝突時自動改名，回傳最終名稱
pub(crate) fn move_into(source: &Path, parent: &Path, name: &str) -> Result<String, MoveError> {
    fs::create_dir_all(parent).map_err(|source| MoveError::CreateDir {
        path: parent.to_path_buf(),
        source,
    })?;

    let final_name = collision_free_name(parent, name);
    let target: PathBuf = parent.join(&final_name);

    move_directory(source, &target).map_err(|e| MoveError::Relocate {
        from: source.to_path_buf(),
        to: target,
        source: e,
    })?;

    Ok(final_name)
}

/// 寫入紀錄；失敗只回報，不中斷呼叫端
pub fn append_or_warn(log: &mut MoveLog, record: &LogRecord) -> Option<LogError> {
    match log.append(record) {
        Ok(()) => None,
        Err(e) => {
            warn!("寫入移動紀錄失敗（操作本身已完成）: {e}");
            Some(e)
        }
    }
}

/// 部分完成的錯誤仍寫入實際完成那一部分的紀錄，讓紀錄與磁碟一致
///
/// 寫入失敗時錯誤會附在回傳的 `MoveError` 上；其他錯誤原樣回傳
pub fn record_partial(log: &mut MoveLog, err: MoveError) -> MoveError {
    let Some(record) = err.partial_record() else {
        return err;
    };
    let failure = append_or_warn(log, &record).map(Box::new);

    match err {
        MoveError::PartialMove { record, source, .. } => MoveError::PartialMove {
            record,
            source,
            log_error: failure,
        },
        MoveError::Incomplete { record, source, .. } => MoveError::Incomplete {
            record,
            source,
            log_error: failure,
        },
        other => other,
    }
}
