use crate::config::save::{save_settings, set_current_root};
use crate::config::{Config, Language};
use crate::menu::handlers::{run_move_history, run_organ_reclassifier};
use crate::pause;
use crate::tools::{DatasetLayout, MoveLog};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use log::info;
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainAction {
    Browse,
    History,
    Settings,
    Exit,
}

impl MainAction {
    const ALL: [Self; 4] = [Self::Browse, Self::History, Self::Settings, Self::Exit];

    fn label(self) -> String {
        let label = match self {
            Self::Browse => t!("main_menu.opt_browse"),
            Self::History => t!("main_menu.opt_history"),
            Self::Settings => t!("main_menu.opt_settings"),
            Self::Exit => t!("main_menu.exit"),
        };
        label.to_string()
    }
}

/// 顯示主選單並執行選擇的功能；回傳 false 表示離開程式
pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
    log: &mut MoveLog,
) -> Result<bool> {
    if shutdown_signal.load(Ordering::SeqCst) {
        return Ok(false);
    }

    term.clear_screen()?;
    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!(
        "{}",
        style(t!("main_menu.current_root", path = config.settings.root_dir)).dim()
    );
    println!("{}", style(t!("common.esc_hint")).dim());

    let labels: Vec<String> = MainAction::ALL.iter().map(|a| a.label()).collect();
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&labels)
        .default(0)
        .interact_on_opt(term)?
        .map(|i| MainAction::ALL[i]);

    match choice {
        Some(MainAction::Browse) => run_organ_reclassifier(term, shutdown_signal, config, log)?,
        Some(MainAction::History) => run_move_history(term, log)?,
        Some(MainAction::Settings) => show_settings_menu(term, config)?,
        // ESC 也視為離開
        Some(MainAction::Exit) | None => return Ok(false),
    }

    Ok(true)
}

/// 設定選單：語言、預設資料集根目錄
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;
        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let items = [
            t!(
                "settings.opt_language",
                current = config.settings.language
            ),
            t!("settings.opt_root", current = config.settings.root_dir),
        ];
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&items)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => choose_language(term, config)?,
            Some(1) => choose_root(term, config)?,
            _ => return Ok(()),
        }
    }
}

fn choose_language(term: &Term, config: &mut Config) -> Result<()> {
    let languages = Language::all();
    let names: Vec<String> = languages.iter().map(ToString::to_string).collect();
    let current = languages
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let Some(index) = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&names)
        .default(current)
        .interact_on_opt(term)?
    else {
        return Ok(());
    };

    let language = languages[index];
    if language == config.settings.language {
        return Ok(());
    }

    config.settings.language = language;
    rust_i18n::set_locale(language.as_str());
    save_settings(&config.settings)?;
    info!("語言切換為 {}", language.as_str());
    Ok(())
}

/// 輸入新的預設根目錄，版面驗證通過才儲存
fn choose_root(term: &Term, config: &mut Config) -> Result<()> {
    let input: String = Input::new()
        .with_prompt(t!("root.prompt_path"))
        .with_initial_text(config.settings.root_dir.clone())
        .interact_text()?;
    let root = input.trim();

    if let Err(e) = DatasetLayout::open(root) {
        eprintln!("{} {}", style(t!("common.error_prefix")).red().bold(), e);
        return pause(term);
    }

    set_current_root(&mut config.settings, root);
    save_settings(&config.settings)?;
    info!("預設資料集根目錄: {root}");
    Ok(())
}
