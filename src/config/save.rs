use crate::config::types::{MAX_RECENT_ROOTS, SETTINGS_FILE, UserSettings};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn save_settings(settings: &UserSettings) -> Result<()> {
    save_settings_to(settings, Path::new(SETTINGS_FILE))
}

pub fn save_settings_to(settings: &UserSettings, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}

/// 設定目前的資料集根目錄，並更新最近使用清單
/// 新路徑放最前面，去重並限制數量
pub fn set_current_root(settings: &mut UserSettings, root: &str) {
    settings.root_dir = root.to_string();

    settings.recent_roots.retain(|p| p != root);
    settings.recent_roots.insert(0, root.to_string());
    settings.recent_roots.truncate(MAX_RECENT_ROOTS);
}
