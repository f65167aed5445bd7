use crate::error::MoveError;
use crate::tools::data_point_mover::move_into;
use crate::tools::{
    DataPointEntry, DatasetLayout, DeleteRecord, DemoteRecord, LogRecord, PairSide, RootKind,
    SwitchRecord,
};
use chrono::Utc;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// 交換 matched 資料點的 raw 與 ground truth 資料夾
pub fn switch_raw_gt(
    layout: &DatasetLayout,
    entry: &DataPointEntry,
) -> Result<SwitchRecord, MoveError> {
    switch_with(layout, entry, rename)
}

/// 交換分三步：raw -> 暫存、gt -> raw、暫存 -> gt；任一步失敗就倒著還原
fn switch_with(
    layout: &DatasetLayout,
    entry: &DataPointEntry,
    rename: impl Fn(&Path, &Path) -> Result<(), MoveError>,
) -> Result<SwitchRecord, MoveError> {
    let gt_path = require_pair(layout, entry)?;
    let gt_path = gt_path.as_path();
    let raw_path = entry.raw_path.as_path();

    let parent = raw_path.parent().unwrap_or(raw_path);
    let temp_path = parent.join(format!(".{}_switch_{}", entry.data_point_id, Uuid::new_v4()));

    rename(raw_path, &temp_path)?;
    if let Err(e) = rename(gt_path, raw_path) {
        return Err(undo_switch(&rename, &[(temp_path.as_path(), raw_path)], &temp_path, e));
    }
    if let Err(e) = rename(&temp_path, gt_path) {
        let steps = [(raw_path, gt_path), (temp_path.as_path(), raw_path)];
        return Err(undo_switch(&rename, &steps, &temp_path, e));
    }

    info!("交換 raw 與 ground truth: {}/{}", entry.organ, entry.data_point_id);

    Ok(SwitchRecord {
        timestamp: Utc::now(),
        organ: entry.organ.clone(),
        data_point_id: entry.data_point_id.clone(),
        raw_path: raw_path.to_path_buf(),
        ground_truth_path: gt_path.to_path_buf(),
    })
}

/// 依序執行還原步驟；全部成功時回傳原本的錯誤，否則指出暫存資料夾位置
fn undo_switch(
    rename: &impl Fn(&Path, &Path) -> Result<(), MoveError>,
    steps: &[(&Path, &Path)],
    temp_path: &Path,
    cause: MoveError,
) -> MoveError {
    for &(from, to) in steps {
        if let Err(restore) = rename(from, to) {
            warn!("無法還原交換，raw 內容留在 {}: {restore}", temp_path.display());
            return MoveError::SwitchStranded {
                temp_path: temp_path.to_path_buf(),
                source: Box::new(cause),
            };
        }
    }
    cause
}

/// 把 matched 資料點的一側移到 `raw_images/<organ>/`，另一側刪除
pub fn demote_to_raw(
    layout: &DatasetLayout,
    entry: &DataPointEntry,
    keep: PairSide,
) -> Result<DemoteRecord, MoveError> {
    demote_with(layout, entry, keep, remove)
}

fn demote_with(
    layout: &DatasetLayout,
    entry: &DataPointEntry,
    keep: PairSide,
    remove: impl Fn(&Path) -> Result<(), MoveError>,
) -> Result<DemoteRecord, MoveError> {
    if entry.root_kind != RootKind::Matched {
        return Err(MoveError::NotMatched);
    }

    let gt_path = layout.ground_truth_path(&entry.organ, &entry.data_point_id);
    let (kept, other) = match keep {
        PairSide::Raw => (entry.raw_path.clone(), gt_path),
        PairSide::GroundTruth => (gt_path, entry.raw_path.clone()),
    };

    if !kept.is_dir() {
        return Err(match keep {
            PairSide::Raw => MoveError::SourceMissing(kept),
            PairSide::GroundTruth => MoveError::GroundTruthMissing(kept),
        });
    }

    let raw_parent = layout.data_point_parent(RootKind::Raw, &entry.organ);
    let final_destination_name = move_into(&kept, &raw_parent, &entry.data_point_id)?;
    info!(
        "降級為 raw: {}/{} -> raw_images/{}/{}",
        entry.organ, entry.data_point_id, entry.organ, final_destination_name
    );

    let mut record = DemoteRecord {
        timestamp: Utc::now(),
        organ: entry.organ.clone(),
        data_point_id: entry.data_point_id.clone(),
        kept_side: keep,
        final_destination_name,
        removed_path: None,
    };

    if other.is_dir() {
        if let Err(e) = remove(&other) {
            return Err(MoveError::Incomplete {
                record: Box::new(LogRecord::DemoteToRaw(record)),
                source: Box::new(e),
                log_error: None,
            });
        }
        record.removed_path = Some(other);
    }

    Ok(record)
}

/// 刪除資料點；matched 資料點連同 ground truth 一起刪除
pub fn delete_data_point(entry: &DataPointEntry) -> Result<DeleteRecord, MoveError> {
    delete_with(entry, remove)
}

fn delete_with(
    entry: &DataPointEntry,
    remove: impl Fn(&Path) -> Result<(), MoveError>,
) -> Result<DeleteRecord, MoveError> {
    let candidates: Vec<&Path> = std::iter::once(entry.raw_path.as_path())
        .chain(entry.ground_truth_path.as_deref())
        .filter(|p| p.is_dir())
        .collect();

    if candidates.is_empty() {
        return Err(MoveError::SourceMissing(entry.raw_path.clone()));
    }

    let mut record = DeleteRecord {
        timestamp: Utc::now(),
        root_kind: entry.root_kind,
        organ: entry.organ.clone(),
        data_point_id: entry.data_point_id.clone(),
        deleted_paths: Vec::new(),
    };

    for path in candidates {
        if let Err(e) = remove(path) {
            // 還沒刪掉任何東西時磁碟未改動，不需要紀錄
            if record.deleted_paths.is_empty() {
                return Err(e);
            }
            return Err(MoveError::Incomplete {
                record: Box::new(LogRecord::Delete(record)),
                source: Box::new(e),
                log_error: None,
            });
        }
        record.deleted_paths.push(path.to_path_buf());
    }

    info!(
        "刪除資料點 {} {}/{} ({} 個資料夾)",
        entry.root_kind,
        entry.organ,
        entry.data_point_id,
        record.deleted_paths.len()
    );

    Ok(record)
}

fn require_pair(layout: &DatasetLayout, entry: &DataPointEntry) -> Result<PathBuf, MoveError> {
    if entry.root_kind != RootKind::Matched {
        return Err(MoveError::NotMatched);
    }
    if !entry.raw_path.is_dir() {
        return Err(MoveError::SourceMissing(entry.raw_path.clone()));
    }

    let gt_path = layout.ground_truth_path(&entry.organ, &entry.data_point_id);
    if gt_path.is_dir() {
        Ok(gt_path)
    } else {
        Err(MoveError::GroundTruthMissing(gt_path))
    }
}

fn rename(from: &Path, to: &Path) -> Result<(), MoveError> {
    fs::rename(from, to).map_err(|source| MoveError::Relocate {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

fn remove(path: &Path) -> Result<(), MoveError> {
    fs::remove_dir_all(path).map_err(|source| MoveError::Remove {
        path: path.to_path_buf(),
        source,
    })
}
