use anyhow::Result;
use console::{Term, style};
use log::{info, warn};
use organ_reclassifier::config::types::Config;
use organ_reclassifier::init;
use organ_reclassifier::menu::show_main_menu;
use organ_reclassifier::signal::setup_shutdown_signal;
use organ_reclassifier::tools::{MOVE_LOG_FILE, MoveLog};
use rust_i18n::t;

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en-US");

fn main() -> Result<()> {
    init::init();
    let term = Term::stdout();
    let shutdown_signal = setup_shutdown_signal()?;

    // Load config and set locale
    let mut config = Config::new()?;
    rust_i18n::set_locale(config.settings.language.as_str());

    // The move log handle lives for the whole session
    let mut move_log = MoveLog::open(MOVE_LOG_FILE)?;

    loop {
        match show_main_menu(&term, &shutdown_signal, &mut config, &mut move_log) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style(t!("main_menu.goodbye")).green().bold());
                info!("Program exited normally");
                break;
            }
            Err(e) => {
                warn!("Program error: {e}");
                eprintln!("{} {:#}", style(t!("common.error_prefix")).red().bold(), e);
                break;
            }
        }
    }

    Ok(())
}
