use crate::tools::{LogRecord, MoveLog};
use anyhow::Result;
use console::style;
use log::info;
use rust_i18n::t;

/// 預設顯示的紀錄筆數
pub const DEFAULT_HISTORY_COUNT: usize = 20;

/// 移動紀錄檢視器
pub struct MoveHistoryViewer {
    count: usize,
}

impl MoveHistoryViewer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: DEFAULT_HISTORY_COUNT,
        }
    }

    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn run(&self, log: &MoveLog) -> Result<()> {
        println!("{}", style(t!("history.title")).cyan().bold());
        println!(
            "{}",
            style(t!("history.file", path = log.path().display())).dim()
        );
        println!();

        let records = log.recent(self.count)?;
        if records.is_empty() {
            println!("{}", style(t!("history.empty")).yellow());
            return Ok(());
        }

        for line in format_history(&records) {
            println!("  {line}");
        }

        info!("顯示 {} 筆移動紀錄", records.len());
        Ok(())
    }
}

impl Default for MoveHistoryViewer {
    fn default() -> Self {
        Self::new()
    }
}

/// 每筆紀錄一行：本地時間 + 摘要
fn format_history(records: &[LogRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            let local = record.timestamp().with_timezone(&chrono::Local);
            format!("{}  {}", local.format("%Y-%m-%d %H:%M:%S"), record.summary())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{DeleteRecord, MoveRecord, RootKind};
    use chrono::Utc;
    use std::path::PathBuf;

    #[test]
    fn test_format_history() {
        let records = vec![
            LogRecord::Move(MoveRecord {
                timestamp: Utc::now(),
                root_kind: RootKind::Matched,
                data_point_id: "p1".to_string(),
                source_organ: "liver".to_string(),
                destination_organ: "kidney".to_string(),
                final_destination_name: "p1_dup1".to_string(),
                ground_truth_moved: true,
                ground_truth_destination_name: Some("p1_dup1".to_string()),
            }),
            LogRecord::Delete(DeleteRecord {
                timestamp: Utc::now(),
                root_kind: RootKind::Raw,
                organ: "brain".to_string(),
                data_point_id: "b1".to_string(),
                deleted_paths: vec![PathBuf::from("/x/raw_images/brain/b1")],
            }),
        ];

        let lines = format_history(&records);

        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("move matched_images p1: liver -> kidney/p1_dup1 (+gt)"));
        assert!(lines[1].ends_with("delete raw_images brain/b1 (1 folders)"));
    }

    #[test]
    fn test_with_count() {
        assert_eq!(MoveHistoryViewer::new().count, DEFAULT_HISTORY_COUNT);
        assert_eq!(MoveHistoryViewer::new().with_count(5).count, 5);
    }
}
