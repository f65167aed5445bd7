mod data_point_mover;
mod data_point_ops;
mod dataset_layout;
mod dir_mover;
mod image_files;
mod move_log;
mod path_scanner;

pub use data_point_mover::{DataPointMover, MoveOutcome, append_or_warn, record_partial};
pub use data_point_ops::{delete_data_point, demote_to_raw, switch_raw_gt};
pub use dataset_layout::{DEFAULT_ROOT_DIR, DatasetLayout, RootKind, validate_organ_name};
pub use dir_mover::{collision_free_name, is_occupied, move_directory};
pub use image_files::{IMAGE_EXTENSIONS, is_image_file, list_image_files};
pub use move_log::{
    DeleteRecord, DemoteRecord, LogRecord, MOVE_LOG_FILE, MoveLog, MoveRecord, PairSide,
    SwitchRecord,
};
pub use path_scanner::{DataPointEntry, list_organs, scan_data_points};
