//! 移動紀錄檢視元件（唯讀）

mod main;

pub use main::{DEFAULT_HISTORY_COUNT, MoveHistoryViewer};
