//! 資料集資料夾版面
//!
//! 所有路徑組合都集中在這裡：
//! - `matched_images/<organ>/raw_images/<id>`
//! - `matched_images/<organ>/ground_truth_images/<id>`
//! - `raw_images/<organ>/<id>`

use crate::error::{LayoutError, MoveError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// 預設的資料集根目錄名稱
pub const DEFAULT_ROOT_DIR: &str = "Data-Remapped-Combiner";

const MATCHED_DIR: &str = "matched_images";
const RAW_DIR: &str = "raw_images";
const MATCHED_RAW_SUBDIR: &str = "raw_images";
const MATCHED_GT_SUBDIR: &str = "ground_truth_images";

/// 資料集根目錄種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootKind {
    Matched,
    Raw,
}

impl RootKind {
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::Matched, Self::Raw]
    }

    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Matched => MATCHED_DIR,
            Self::Raw => RAW_DIR,
        }
    }
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// 已驗證的資料集根目錄
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    root: PathBuf,
}

impl DatasetLayout {
    /// 開啟資料集，確認根目錄與兩個資料集資料夾都存在
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LayoutError> {
        let root = root.into();
        if !root.exists() {
            return Err(LayoutError::RootMissing(root));
        }
        if !root.is_dir() {
            return Err(LayoutError::NotADirectory(root));
        }

        for kind in RootKind::all() {
            let dir = root.join(kind.dir_name());
            if !dir.exists() {
                return Err(LayoutError::FolderMissing(dir));
            }
            if !dir.is_dir() {
                return Err(LayoutError::NotADirectory(dir));
            }
        }

        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn kind_dir(&self, kind: RootKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    #[must_use]
    pub fn organ_dir(&self, kind: RootKind, organ: &str) -> PathBuf {
        self.kind_dir(kind).join(organ)
    }

    /// 資料點資料夾所在的上層目錄
    #[must_use]
    pub fn data_point_parent(&self, kind: RootKind, organ: &str) -> PathBuf {
        match kind {
            RootKind::Matched => self.organ_dir(kind, organ).join(MATCHED_RAW_SUBDIR),
            RootKind::Raw => self.organ_dir(kind, organ),
        }
    }

    #[must_use]
    pub fn data_point_path(&self, kind: RootKind, organ: &str, id: &str) -> PathBuf {
        self.data_point_parent(kind, organ).join(id)
    }

    /// Ground truth 只存在於 `matched_images`
    #[must_use]
    pub fn ground_truth_parent(&self, organ: &str) -> PathBuf {
        self.organ_dir(RootKind::Matched, organ).join(MATCHED_GT_SUBDIR)
    }

    #[must_use]
    pub fn ground_truth_path(&self, organ: &str, id: &str) -> PathBuf {
        self.ground_truth_parent(organ).join(id)
    }
}

/// 器官名稱必須是單一個一般路徑元件
pub fn validate_organ_name(organ: &str) -> Result<(), MoveError> {
    let mut components = Path::new(organ).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == organ => Ok(()),
        _ => Err(MoveError::InvalidOrgan(organ.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_layout_dirs(base: &Path) {
        fs::create_dir_all(base.join("matched_images")).unwrap();
        fs::create_dir_all(base.join("raw_images")).unwrap();
    }

    #[test]
    fn test_open_valid_layout() {
        let temp_dir = TempDir::new().unwrap();
        create_layout_dirs(temp_dir.path());

        let layout = DatasetLayout::open(temp_dir.path()).unwrap();
        assert_eq!(layout.root(), temp_dir.path());
    }

    #[test]
    fn test_open_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let err = DatasetLayout::open(&missing).unwrap_err();
        assert!(matches!(err, LayoutError::RootMissing(p) if p == missing));
    }

    #[test]
    fn test_open_missing_raw_folder() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("matched_images")).unwrap();

        let err = DatasetLayout::open(temp_dir.path()).unwrap_err();
        assert!(matches!(err, LayoutError::FolderMissing(p) if p.ends_with("raw_images")));
    }

    #[test]
    fn test_open_root_kind_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("matched_images")).unwrap();
        fs::write(temp_dir.path().join("raw_images"), "oops").unwrap();

        let err = DatasetLayout::open(temp_dir.path()).unwrap_err();
        assert!(matches!(err, LayoutError::NotADirectory(_)));
    }

    #[test]
    fn test_path_builders() {
        let temp_dir = TempDir::new().unwrap();
        create_layout_dirs(temp_dir.path());
        let layout = DatasetLayout::open(temp_dir.path()).unwrap();
        let base = temp_dir.path();

        assert_eq!(
            layout.data_point_path(RootKind::Matched, "liver", "p1"),
            base.join("matched_images/liver/raw_images/p1")
        );
        assert_eq!(
            layout.ground_truth_path("liver", "p1"),
            base.join("matched_images/liver/ground_truth_images/p1")
        );
        assert_eq!(
            layout.data_point_path(RootKind::Raw, "liver", "p1"),
            base.join("raw_images/liver/p1")
        );
    }

    #[test]
    fn test_root_kind_order() {
        assert!(RootKind::Matched < RootKind::Raw);
        assert_eq!(RootKind::Raw.to_string(), "raw_images");
    }

    #[test]
    fn test_validate_organ_name() {
        assert!(validate_organ_name("kidney").is_ok());
        assert!(validate_organ_name("left lung").is_ok());

        for bad in ["", ".", "..", "a/b", "/kidney", "kidney/"] {
            assert!(
                matches!(validate_organ_name(bad), Err(MoveError::InvalidOrgan(_))),
                "應該拒絕: {bad:?}"
            );
        }
    }
}
