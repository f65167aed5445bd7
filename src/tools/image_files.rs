use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 視為影像的副檔名（不分大小寫）
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

#[must_use]
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// 列出資料夾第一層的影像檔，依檔名排序
pub fn list_image_files(directory: &Path) -> io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() && is_image_file(entry.path()) {
            images.push(entry.into_path());
        }
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("scan.PNG")));
        assert!(is_image_file(Path::new("a/b/scan.tiff")));
        assert!(!is_image_file(Path::new("meta.json")));
        assert!(!is_image_file(Path::new("scan_anon.dcm")));
        assert!(!is_image_file(Path::new("png")));
    }

    #[test]
    fn test_list_image_files() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::write(base.join("b.jpg"), "").unwrap();
        fs::write(base.join("a.png"), "").unwrap();
        fs::write(base.join("meta.json"), "{}").unwrap();
        fs::create_dir(base.join("nested.png")).unwrap();

        let images = list_image_files(base).unwrap();

        assert_eq!(images, vec![base.join("a.png"), base.join("b.jpg")]);
    }
}
