use crate::config::types::{Config, SETTINGS_FILE, UserSettings};
use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::Path;

impl Config {
    /// 從工作目錄的設定檔載入；讀取失敗時使用預設值
    pub fn new() -> Result<Self> {
        let settings = load_settings(Path::new(SETTINGS_FILE)).unwrap_or_else(|e| {
            warn!("使用預設設定: {e:#}");
            UserSettings::default()
        });

        Ok(Self { settings })
    }
}

pub fn load_settings(path: &Path) -> Result<UserSettings> {
    if !path.exists() {
        return Ok(UserSettings::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;
    use crate::tools::DEFAULT_ROOT_DIR;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = load_settings(&temp_dir.path().join("settings.json")).unwrap();

        assert_eq!(settings, UserSettings::default());
        assert_eq!(settings.root_dir, DEFAULT_ROOT_DIR);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), r#"{"language": "zh-TW"}"#).unwrap();

        let settings = load_settings(temp_file.path()).unwrap();

        assert_eq!(settings.language, Language::ZhTw);
        assert_eq!(settings.root_dir, DEFAULT_ROOT_DIR);
        assert!(settings.recent_roots.is_empty());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "not json").unwrap();

        assert!(load_settings(temp_file.path()).is_err());
    }
}
