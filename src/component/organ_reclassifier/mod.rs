//! 器官重新分類元件
//!
//! 逐筆瀏覽 `matched_images` 與 `raw_images` 中的資料點，
//! 並將其移動到其他器官資料夾

mod browse_cursor;
mod main;

pub use browse_cursor::BrowseCursor;
pub use main::OrganReclassifier;
