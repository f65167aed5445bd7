use crate::component::{MoveHistoryViewer, OrganReclassifier};
use crate::config::Config;
use crate::config::save::{save_settings, set_current_root};
use crate::pause;
use crate::tools::{DatasetLayout, MoveLog};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use log::{info, warn};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_organ_reclassifier(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
    log: &mut MoveLog,
) -> Result<()> {
    let Some(root) = prompt_root(config)? else {
        return Ok(());
    };

    let layout = match DatasetLayout::open(&root) {
        Ok(layout) => layout,
        Err(e) => {
            warn!("資料集版面錯誤: {e}");
            eprintln!("{} {}", style(t!("common.error_prefix")).red().bold(), e);
            pause(term)?;
            return Ok(());
        }
    };

    if config.settings.root_dir != root || config.settings.recent_roots.first() != Some(&root) {
        set_current_root(&mut config.settings, &root);
        save_settings(&config.settings)?;
    }
    info!("開啟資料集: {root}");

    let reclassifier = OrganReclassifier::new(layout, Arc::clone(shutdown_signal));
    if let Err(e) = reclassifier.run(term, log) {
        eprintln!("{} {:#}", style(t!("common.error_prefix")).red().bold(), e);
        pause(term)?;
    }

    Ok(())
}

pub fn run_move_history(term: &Term, log: &MoveLog) -> Result<()> {
    term.clear_screen()?;
    let viewer = MoveHistoryViewer::new();

    if let Err(e) = viewer.run(log) {
        eprintln!("{} {}", style(t!("common.error_prefix")).red().bold(), e);
    }

    pause(term)?;
    Ok(())
}

/// 選擇資料集根目錄：目前的、最近用過的，或輸入新路徑
fn prompt_root(config: &Config) -> Result<Option<String>> {
    let mut roots: Vec<String> = vec![config.settings.root_dir.clone()];
    for recent in &config.settings.recent_roots {
        if !roots.contains(recent) {
            roots.push(recent.clone());
        }
    }

    let mut items = roots.clone();
    items.push(t!("root.other").to_string());

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("root.prompt"))
        .items(&items)
        .default(0)
        .interact_opt()?;

    match selection {
        None => Ok(None),
        Some(index) if index < roots.len() => Ok(Some(roots[index].clone())),
        Some(_) => {
            let path: String = Input::new()
                .with_prompt(t!("root.prompt_path"))
                .interact_text()?;
            Ok(Some(path.trim().to_string()))
        }
    }
}
