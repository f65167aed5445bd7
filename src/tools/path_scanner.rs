use crate::error::LayoutError;
use crate::tools::{DatasetLayout, RootKind};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 掃描到的單一資料點
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPointEntry {
    pub root_kind: RootKind,
    pub organ: String,
    pub data_point_id: String,
    pub raw_path: PathBuf,
    pub ground_truth_path: Option<PathBuf>,
}

impl DataPointEntry {
    #[must_use]
    pub fn identity(&self) -> (RootKind, &str, &str) {
        (self.root_kind, &self.organ, &self.data_point_id)
    }

    /// 資料夾名稱第一段，例如 `119_000001_GUID123456` -> `119`
    #[must_use]
    pub fn patient_id(&self) -> &str {
        self.data_point_id
            .split('_')
            .next()
            .unwrap_or_default()
    }

    /// 資料夾名稱最後一段；沒有底線時為空字串
    #[must_use]
    pub fn guid(&self) -> &str {
        match self.data_point_id.rsplit_once('_') {
            Some((_, guid)) => guid,
            None => "",
        }
    }
}

/// 掃描整個資料集，依 (根目錄種類, 器官, 資料點名稱) 排序
pub fn scan_data_points(layout: &DatasetLayout) -> Result<Vec<DataPointEntry>, LayoutError> {
    info!("開始掃描資料集: {}", layout.root().display());

    let mut entries = Vec::new();

    for kind in RootKind::all() {
        for organ in list_organs(layout, kind)? {
            let parent = layout.data_point_parent(kind, &organ);
            if !parent.is_dir() {
                debug!("跳過沒有資料點資料夾的器官: {}", parent.display());
                continue;
            }

            for data_point_id in list_subdirectories(&parent)? {
                let raw_path = parent.join(&data_point_id);
                let ground_truth_path = match kind {
                    RootKind::Matched => {
                        Some(layout.ground_truth_path(&organ, &data_point_id))
                            .filter(|p| p.is_dir())
                    }
                    RootKind::Raw => None,
                };

                entries.push(DataPointEntry {
                    root_kind: kind,
                    organ: organ.clone(),
                    data_point_id,
                    raw_path,
                    ground_truth_path,
                });
            }
        }
    }

    entries.sort_by(|a, b| a.identity().cmp(&b.identity()));

    info!("掃描完成，找到 {} 個資料點", entries.len());
    Ok(entries)
}

/// 列出某個資料集底下的器官資料夾
pub fn list_organs(layout: &DatasetLayout, kind: RootKind) -> Result<Vec<String>, LayoutError> {
    list_subdirectories(&layout.kind_dir(kind))
}

/// 列出目錄下一層的子資料夾名稱（已排序，略過隱藏與非 UTF-8 名稱）
fn list_subdirectories(directory: &Path) -> Result<Vec<String>, LayoutError> {
    let mut names = Vec::new();

    let walker = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| LayoutError::Unreadable {
            path: directory.to_path_buf(),
            source: e.into(),
        })?;

        // 與 `Path::is_dir` 一致：指向資料夾的符號連結也算
        if entry.path_is_symlink() {
            if !entry.path().is_dir() {
                debug!("跳過不是資料夾的符號連結: {}", entry.path().display());
                continue;
            }
            debug!("跟隨符號連結資料夾: {}", entry.path().display());
        } else if !entry.file_type().is_dir() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            warn!("跳過非 UTF-8 名稱的資料夾: {}", entry.path().display());
            continue;
        };

        if name.starts_with('.') {
            debug!("跳過隱藏資料夾: {}", entry.path().display());
            continue;
        }

        names.push(name.to_string());
    }

    Ok(names)
}
