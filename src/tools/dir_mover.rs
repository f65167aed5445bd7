use log::{debug, warn};
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// 目標路徑是否已被佔用（含損壞的符號連結）
#[must_use]
pub fn is_occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// 在 `parent` 底下為 `name` 找一個不衝突的名稱
///
/// 名稱未被使用時原樣回傳，否則回傳最小可用的 `<name>_dupN`（N 從 1 開始）
#[must_use]
pub fn collision_free_name(parent: &Path, name: &str) -> String {
    if !is_occupied(&parent.join(name)) {
        return name.to_string();
    }

    let mut n: u32 = 1;
    loop {
        let candidate = format!("{name}_dup{n}");
        if !is_occupied(&parent.join(&candidate)) {
            return candidate;
        }
        n += 1;
    }
}

/// 移動整個資料夾
///
/// 先嘗試 rename；跨檔案系統時改為複製後刪除
pub fn move_directory(source: &Path, target: &Path) -> io::Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                "rename 跨檔案系統，改用複製: {} -> {}",
                source.display(),
                target.display()
            );
            copy_and_delete(source, target)
        }
        Err(e) => Err(e),
    }
}

/// 複製資料夾後刪除原資料夾
///
/// 複製途中失敗時移除已複製的部分，避免殘留的目標佔用名稱
fn copy_and_delete(source: &Path, target: &Path) -> io::Result<()> {
    if let Err(e) = copy_tree(source, target) {
        if is_occupied(target)
            && let Err(cleanup) = fs::remove_dir_all(target)
        {
            warn!("無法移除複製到一半的 {}: {cleanup}", target.display());
        }
        return Err(e);
    }

    fs::remove_dir_all(source)
}

fn copy_tree(source: &Path, target: &Path) -> io::Result<()> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(source).map_err(io::Error::other)?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else {
            fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}
