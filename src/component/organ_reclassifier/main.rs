//! 器官重新分類主流程
//!
//! 逐筆瀏覽資料點，選擇目標器官後移動；所有改動都寫入移動紀錄

use super::browse_cursor::BrowseCursor;
use crate::error::{LayoutError, MoveError};
use crate::pause;
use crate::tools::{
    DataPointEntry, DataPointMover, DatasetLayout, LogRecord, MoveLog, PairSide, RootKind,
    append_or_warn, delete_data_point, demote_to_raw, list_image_files, list_organs,
    record_partial, scan_data_points, switch_raw_gt,
};
use anyhow::{Result, bail};
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// 詳細資訊中最多列出的影像檔數量
const MAX_LISTED_IMAGES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowseAction {
    Next,
    Previous,
    JumpToIndex,
    JumpToPatientId,
    JumpToGuid,
    JumpToOrgan,
    MoveToOrgan,
    SwitchRawGt,
    DemoteToRaw,
    Delete,
    Rescan,
    Back,
}

impl BrowseAction {
    const ALL: [Self; 12] = [
        Self::Next,
        Self::Previous,
        Self::JumpToIndex,
        Self::JumpToPatientId,
        Self::JumpToGuid,
        Self::JumpToOrgan,
        Self::MoveToOrgan,
        Self::SwitchRawGt,
        Self::DemoteToRaw,
        Self::Delete,
        Self::Rescan,
        Self::Back,
    ];

    fn label(self) -> String {
        let label = match self {
            Self::Next => t!("browse.action.next"),
            Self::Previous => t!("browse.action.previous"),
            Self::JumpToIndex => t!("browse.action.jump_index"),
            Self::JumpToPatientId => t!("browse.action.jump_patient"),
            Self::JumpToGuid => t!("browse.action.jump_guid"),
            Self::JumpToOrgan => t!("browse.action.jump_organ"),
            Self::MoveToOrgan => t!("browse.action.move"),
            Self::SwitchRawGt => t!("browse.action.switch"),
            Self::DemoteToRaw => t!("browse.action.demote"),
            Self::Delete => t!("browse.action.delete"),
            Self::Rescan => t!("browse.action.rescan"),
            Self::Back => t!("browse.action.back"),
        };
        label.to_string()
    }

    /// 會改動磁碟的操作，完成後必須重新掃描
    const fn mutates(self) -> bool {
        matches!(
            self,
            Self::MoveToOrgan | Self::SwitchRawGt | Self::DemoteToRaw | Self::Delete
        )
    }
}

/// 器官重新分類元件
pub struct OrganReclassifier {
    layout: DatasetLayout,
    mover: DataPointMover,
    shutdown_signal: Arc<AtomicBool>,
}

impl OrganReclassifier {
    pub fn new(layout: DatasetLayout, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            mover: DataPointMover::new(layout.clone()),
            layout,
            shutdown_signal,
        }
    }

    pub fn run(&self, term: &Term, log: &mut MoveLog) -> Result<()> {
        let mut cursor = BrowseCursor::new(scan_with_spinner(&self.layout)?);
        let mut last_action = BrowseAction::Next;

        loop {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷訊號，離開瀏覽");
                break;
            }

            term.clear_screen()?;
            self.print_header(&cursor);
            self.print_current(&cursor);

            let labels: Vec<String> = BrowseAction::ALL.iter().map(|a| a.label()).collect();
            let default_index = BrowseAction::ALL
                .iter()
                .position(|&a| a == last_action)
                .unwrap_or(0);

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt(t!("browse.prompt"))
                .items(&labels)
                .default(default_index)
                .interact_on_opt(term)?;

            let Some(action) = selection.map(|i| BrowseAction::ALL[i]) else {
                break;
            };
            if action == BrowseAction::Back {
                break;
            }
            last_action = action;

            let outcome = self.dispatch(action, &mut cursor, log);
            settle_action(
                outcome,
                action.mutates(),
                &mut cursor,
                || scan_with_spinner(&self.layout),
                |e| report_error(term, e),
            )?;
        }

        Ok(())
    }

    fn dispatch(
        &self,
        action: BrowseAction,
        cursor: &mut BrowseCursor,
        log: &mut MoveLog,
    ) -> Result<()> {
        match action {
            BrowseAction::Next => {
                cursor.forward()?;
            }
            BrowseAction::Previous => {
                cursor.back()?;
            }
            BrowseAction::JumpToIndex => {
                let position: usize = Input::new()
                    .with_prompt(t!("browse.prompt_index", total = cursor.len()))
                    .interact_text()?;
                cursor.jump_to_index(position)?;
            }
            BrowseAction::JumpToPatientId => {
                let patient_id = prompt_text(&t!("browse.prompt_patient"))?;
                cursor.jump_to_patient_id(&patient_id)?;
            }
            BrowseAction::JumpToGuid => {
                let guid = prompt_text(&t!("browse.prompt_guid"))?;
                cursor.jump_to_guid(&guid)?;
            }
            BrowseAction::JumpToOrgan => self.jump_to_organ(cursor)?,
            BrowseAction::Rescan => {
                cursor.invalidate();
                cursor.refresh(scan_with_spinner(&self.layout)?);
            }
            BrowseAction::MoveToOrgan => self.move_current(require_current(cursor)?, log)?,
            BrowseAction::SwitchRawGt => self.switch_current(require_current(cursor)?, log)?,
            BrowseAction::DemoteToRaw => self.demote_current(require_current(cursor)?, log)?,
            BrowseAction::Delete => self.delete_current(require_current(cursor)?, log)?,
            BrowseAction::Back => {}
        }
        Ok(())
    }

    fn jump_to_organ(&self, cursor: &mut BrowseCursor) -> Result<()> {
        let mut targets: Vec<(RootKind, String)> = Vec::new();
        for entry in cursor.entries() {
            let key = (entry.root_kind, entry.organ.clone());
            if targets.last() != Some(&key) {
                targets.push(key);
            }
        }
        if targets.is_empty() {
            bail!(t!("browse.empty").to_string());
        }

        let labels: Vec<String> = targets
            .iter()
            .map(|(kind, organ)| format!("{kind}/{organ}"))
            .collect();
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("browse.prompt_organ"))
            .items(&labels)
            .default(0)
            .interact_opt()?;

        if let Some(index) = selection {
            let (kind, organ) = &targets[index];
            cursor.jump_to_organ(*kind, organ)?;
        }
        Ok(())
    }

    fn move_current(&self, entry: DataPointEntry, log: &mut MoveLog) -> Result<()> {
        let Some(destination) = self.prompt_destination(&entry)? else {
            return Ok(());
        };

        let confirmed = Confirm::new()
            .with_prompt(t!(
                "browse.confirm_move",
                name = entry.data_point_id,
                from = entry.organ,
                to = destination,
                dataset = entry.root_kind
            ))
            .default(true)
            .interact()?;
        if !confirmed {
            return Ok(());
        }

        let outcome = self.mover.move_and_log(&entry, &destination, log)?;
        let record = &outcome.record;

        println!(
            "{}",
            style(t!(
                "browse.moved",
                name = entry.data_point_id,
                organ = record.destination_organ,
                final_name = record.final_destination_name
            ))
            .green()
        );
        if record.ground_truth_moved {
            println!("{}", style(t!("browse.moved_gt")).green());
        }
        if let Some(e) = outcome.log_error {
            println!(
                "{} {e}",
                style(t!("common.log_warning_prefix")).yellow().bold()
            );
        }

        info!(
            "重新分類完成: {} {} -> {}",
            entry.data_point_id, entry.organ, record.destination_organ
        );
        std::thread::sleep(std::time::Duration::from_millis(800));
        Ok(())
    }

    /// 選擇目標器官；可輸入新的器官名稱
    fn prompt_destination(&self, entry: &DataPointEntry) -> Result<Option<String>> {
        let organs: Vec<String> = list_organs(&self.layout, entry.root_kind)?
            .into_iter()
            .filter(|organ| organ != &entry.organ)
            .collect();

        let mut items = organs.clone();
        items.push(t!("browse.new_organ").to_string());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("browse.prompt_destination"))
            .items(&items)
            .default(0)
            .interact_opt()?;

        match selection {
            None => Ok(None),
            Some(index) if index < organs.len() => Ok(Some(organs[index].clone())),
            Some(_) => {
                let name = prompt_text(&t!("browse.prompt_new_organ"))?;
                Ok(Some(name))
            }
        }
    }

    fn switch_current(&self, entry: DataPointEntry, log: &mut MoveLog) -> Result<()> {
        if !confirm(&t!("browse.confirm_switch", name = entry.data_point_id), false)? {
            return Ok(());
        }

        let record = switch_raw_gt(&self.layout, &entry).map_err(|e| record_partial(log, e))?;
        self.report_logged(log, record.into(), &t!("browse.switched"));
        Ok(())
    }

    fn demote_current(&self, entry: DataPointEntry, log: &mut MoveLog) -> Result<()> {
        if entry.root_kind != RootKind::Matched {
            bail!(t!("browse.matched_only").to_string());
        }

        let sides = [PairSide::Raw, PairSide::GroundTruth];
        let labels = [t!("browse.keep_raw"), t!("browse.keep_gt")];
        let Some(index) = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("browse.prompt_keep_side"))
            .items(&labels)
            .default(0)
            .interact_opt()?
        else {
            return Ok(());
        };

        if !confirm(&t!("browse.confirm_demote", name = entry.data_point_id), false)? {
            return Ok(());
        }

        let record = demote_to_raw(&self.layout, &entry, sides[index])
            .map_err(|e| record_partial(log, e))?;
        self.report_logged(log, record.into(), &t!("browse.demoted"));
        Ok(())
    }

    fn delete_current(&self, entry: DataPointEntry, log: &mut MoveLog) -> Result<()> {
        if !confirm(&t!("browse.confirm_delete", name = entry.data_point_id), false)? {
            return Ok(());
        }

        let record = delete_data_point(&entry).map_err(|e| record_partial(log, e))?;
        self.report_logged(log, record.into(), &t!("browse.deleted"));
        Ok(())
    }

    fn report_logged(&self, log: &mut MoveLog, record: LogRecord, message: &str) {
        println!("{}", style(message).green());
        if let Some(e) = append_or_warn(log, &record) {
            println!(
                "{} {e}",
                style(t!("common.log_warning_prefix")).yellow().bold()
            );
        }
        info!("{}", record.summary());
        std::thread::sleep(std::time::Duration::from_millis(800));
    }

    fn print_header(&self, cursor: &BrowseCursor) {
        println!("{}", style(t!("browse.title")).cyan().bold());
        println!(
            "{}",
            style(t!("browse.root", path = self.layout.root().display())).dim()
        );
        println!("{}", style(t!("common.esc_hint")).dim());
        println!();

        let (position, total) = cursor.position();
        println!(
            "{}",
            style(t!("browse.position", index = position, total = total)).bold()
        );
    }

    fn print_current(&self, cursor: &BrowseCursor) {
        let Some(entry) = cursor.current() else {
            println!("{}", style(t!("browse.empty")).yellow());
            println!();
            return;
        };

        let none = t!("browse.none").to_string();
        println!("  {} {}", style(t!("browse.field_dataset")).dim(), entry.root_kind);
        println!("  {} {}", style(t!("browse.field_organ")).dim(), style(&entry.organ).cyan());
        println!("  {} {}", style(t!("browse.field_name")).dim(), entry.data_point_id);
        println!("  {} {}", style(t!("browse.field_patient")).dim(), entry.patient_id());
        println!(
            "  {} {}",
            style(t!("browse.field_guid")).dim(),
            if entry.guid().is_empty() {
                none.as_str()
            } else {
                entry.guid()
            }
        );
        println!("  {} {}", style(t!("browse.field_raw")).dim(), entry.raw_path.display());
        match &entry.ground_truth_path {
            Some(path) => println!("  {} {}", style(t!("browse.field_gt")).dim(), path.display()),
            None => println!("  {} {}", style(t!("browse.field_gt")).dim(), none),
        }

        match list_image_files(&entry.raw_path) {
            Ok(images) if images.is_empty() => {
                println!("  {}", style(t!("browse.no_images")).yellow());
            }
            Ok(images) => {
                println!("  {}", style(t!("browse.images", count = images.len())).dim());
                for image in images.iter().take(MAX_LISTED_IMAGES) {
                    let name = image
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    println!("    {} {}", style("•").dim(), name);
                }
                if images.len() > MAX_LISTED_IMAGES {
                    println!(
                        "    {} {}",
                        style("⋯").dim(),
                        t!("browse.more", count = images.len() - MAX_LISTED_IMAGES)
                    );
                }
            }
            Err(e) => warn!("無法列出影像檔 {}: {e}", entry.raw_path.display()),
        }
        println!();
    }
}

/// 操作結束後的收尾
///
/// 先回報操作本身的錯誤，重新掃描失敗時才不會蓋掉它；
/// 會改動磁碟的操作之後游標失效並重新掃描
fn settle_action(
    outcome: Result<()>,
    mutated: bool,
    cursor: &mut BrowseCursor,
    rescan: impl FnOnce() -> Result<Vec<DataPointEntry>, LayoutError>,
    mut report: impl FnMut(&anyhow::Error) -> Result<()>,
) -> Result<()> {
    if let Err(e) = outcome {
        report(&e)?;
    }

    if mutated {
        cursor.invalidate();
        cursor.refresh(rescan()?);
    }
    Ok(())
}

/// 顯示錯誤；部分完成時紀錄寫入失敗也一併提示
fn report_error(term: &Term, error: &anyhow::Error) -> Result<()> {
    warn!("操作失敗: {error:#}");
    eprintln!("{} {:#}", style(t!("common.error_prefix")).red().bold(), error);
    if let Some(log_error) = error.downcast_ref::<MoveError>().and_then(MoveError::log_error) {
        println!(
            "{} {log_error}",
            style(t!("common.log_warning_prefix")).yellow().bold()
        );
    }
    pause(term)
}

fn require_current(cursor: &BrowseCursor) -> Result<DataPointEntry> {
    match cursor.current() {
        Some(entry) => Ok(entry.clone()),
        None => bail!(t!("browse.empty").to_string()),
    }
}

fn prompt_text(prompt: &str) -> Result<String> {
    let value: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(value.trim().to_string())
}

fn confirm(prompt: &str, default: bool) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?;
    Ok(confirmed)
}

/// 掃描時顯示 spinner，資料集很大時掃描需要數秒
fn scan_with_spinner(layout: &DatasetLayout) -> Result<Vec<DataPointEntry>, LayoutError> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(t!("browse.scanning").to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = scan_data_points(layout);
    spinner.finish_and_clear();

    if let Ok(entries) = &result {
        info!("掃描完成，共 {} 筆資料點", entries.len());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::path::PathBuf;

    fn entry(id: &str) -> DataPointEntry {
        DataPointEntry {
            root_kind: RootKind::Raw,
            organ: "liver".to_string(),
            data_point_id: id.to_string(),
            raw_path: PathBuf::from(format!("/data/raw_images/liver/{id}")),
            ground_truth_path: None,
        }
    }

    #[test]
    fn test_action_error_reported_before_failed_rescan() {
        let mut cursor = BrowseCursor::new(vec![entry("r1")]);
        let mut reported = Vec::new();

        let result = settle_action(
            Err(anyhow!("move failed")),
            true,
            &mut cursor,
            || Err(LayoutError::RootMissing(PathBuf::from("/gone"))),
            |e| {
                reported.push(e.to_string());
                Ok(())
            },
        );

        assert_eq!(reported, vec!["move failed".to_string()]);
        assert!(result.is_err());
        assert!(cursor.is_stale());
    }

    #[test]
    fn test_mutation_rescans_and_navigation_does_not() {
        let mut cursor = BrowseCursor::new(vec![entry("r1"), entry("r2")]);

        settle_action(
            Ok(()),
            false,
            &mut cursor,
            || panic!("navigation must not rescan"),
            |_| Ok(()),
        )
        .unwrap();
        assert_eq!(cursor.position(), (1, 2));

        settle_action(
            Ok(()),
            true,
            &mut cursor,
            || Ok(vec![entry("r2")]),
            |_| panic!("nothing to report"),
        )
        .unwrap();
        assert!(!cursor.is_stale());
        assert_eq!(cursor.position(), (1, 1));
    }
}
