pub mod component;
pub mod config;
pub mod error;
pub mod init;
pub mod menu;
pub mod signal;
pub mod tools;

use anyhow::Result;
use console::{Term, style};
use rust_i18n::t;

rust_i18n::i18n!("locales", fallback = "en-US");

pub fn pause(term: &Term) -> Result<()> {
    println!("\n{}", style(t!("common.press_enter")).dim());
    term.read_line()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_i18n::t;

    #[test]
    fn test_entry_messages_translated() {
        for locale in ["en-US", "zh-TW"] {
            let goodbye = t!("main_menu.goodbye", locale = locale);
            let error = t!("common.error_prefix", locale = locale);
            assert!(!goodbye.ends_with("main_menu.goodbye"), "{locale}");
            assert!(!error.ends_with("common.error_prefix"), "{locale}");
        }
        assert_eq!(t!("main_menu.goodbye", locale = "zh-TW"), "再見！");
    }
}

