//! 整合測試：掃描 -> 移動 -> 紀錄 -> 重新掃描

use std::fs;
use std::path::Path;

use organ_reclassifier::component::BrowseCursor;
use organ_reclassifier::error::MoveError;
use organ_reclassifier::tools::{
    DataPointEntry, DataPointMover, DatasetLayout, LogRecord, MoveLog, PairSide, RootKind,
    demote_to_raw, scan_data_points, switch_raw_gt,
};
use tempfile::TempDir;

fn create_dir_with_image(path: &Path) {
    fs::create_dir_all(path).unwrap();
    fs::write(path.join("slice_000.png"), b"png").unwrap();
}

/// matched: liver/patient_001（含 gt）、kidney/patient_001、kidney/patient_001_dup1
/// raw: brain/b1
fn create_dataset(base: &Path) -> DatasetLayout {
    let matched = base.join("matched_images");
    create_dir_with_image(&matched.join("liver/raw_images/patient_001"));
    create_dir_with_image(&matched.join("liver/ground_truth_images/patient_001"));
    create_dir_with_image(&matched.join("kidney/raw_images/patient_001"));
    create_dir_with_image(&matched.join("kidney/raw_images/patient_001_dup1"));
    create_dir_with_image(&base.join("raw_images/brain/b1"));

    DatasetLayout::open(base).unwrap()
}

fn find(entries: &[DataPointEntry], kind: RootKind, organ: &str, id: &str) -> DataPointEntry {
    entries
        .iter()
        .find(|e| e.root_kind == kind && e.organ == organ && e.data_point_id == id)
        .cloned()
        .unwrap()
}

#[test]
fn test_scan_lists_every_data_point() {
    let temp_dir = TempDir::new().unwrap();
    let layout = create_dataset(temp_dir.path());

    let entries = scan_data_points(&layout).unwrap();

    assert_eq!(entries.len(), 4);
    let liver = find(&entries, RootKind::Matched, "liver", "patient_001");
    assert!(liver.ground_truth_path.is_some());
    let kidney = find(&entries, RootKind::Matched, "kidney", "patient_001");
    assert!(kidney.ground_truth_path.is_none());
    let brain = find(&entries, RootKind::Raw, "brain", "b1");
    assert!(brain.ground_truth_path.is_none());
}

#[test]
fn test_move_with_collision_then_rescan() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path();
    let layout = create_dataset(base);
    let mut log = MoveLog::open(base.join("moves.json")).unwrap();

    let entries = scan_data_points(&layout).unwrap();
    let liver = find(&entries, RootKind::Matched, "liver", "patient_001");

    let mover = DataPointMover::new(layout.clone());
    let outcome = mover.move_and_log(&liver, "kidney", &mut log).unwrap();

    assert!(outcome.log_error.is_none());
    assert_eq!(outcome.record.final_destination_name, "patient_001_dup2");
    assert!(outcome.record.ground_truth_moved);
    assert_eq!(
        outcome.record.ground_truth_destination_name.as_deref(),
        Some("patient_001_dup2")
    );

    let matched = base.join("matched_images");
    assert!(!matched.join("liver/raw_images/patient_001").exists());
    assert!(!matched.join("liver/ground_truth_images/patient_001").exists());
    assert!(
        matched
            .join("kidney/raw_images/patient_001_dup2/slice_000.png")
            .is_file()
    );
    assert!(
        matched
            .join("kidney/ground_truth_images/patient_001_dup2")
            .is_dir()
    );

    let rescanned = scan_data_points(&layout).unwrap();
    assert_eq!(rescanned.len(), 4);
    let moved = find(&rescanned, RootKind::Matched, "kidney", "patient_001_dup2");
    assert!(moved.ground_truth_path.is_some());
    assert!(
        !rescanned
            .iter()
            .any(|e| e.organ == "liver" && e.data_point_id == "patient_001")
    );

    let records = log.read_all().unwrap();
    assert_eq!(records.len(), 1);
    let LogRecord::Move(record) = &records[0] else {
        panic!("expected a move record");
    };
    assert_eq!(record.source_organ, "liver");
    assert_eq!(record.destination_organ, "kidney");
    assert_eq!(record.final_destination_name, "patient_001_dup2");
}

#[test]
fn test_each_move_appends_one_record() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path();
    let layout = create_dataset(base);
    let log_path = base.join("moves.json");
    let mut log = MoveLog::open(&log_path).unwrap();
    let mover = DataPointMover::new(layout.clone());

    // brain -> lung -> heart -> brain
    for (from, to) in [("brain", "lung"), ("lung", "heart"), ("heart", "brain")] {
        let entries = scan_data_points(&layout).unwrap();
        let entry = find(&entries, RootKind::Raw, from, "b1");
        let outcome = mover.move_and_log(&entry, to, &mut log).unwrap();
        assert_eq!(outcome.record.final_destination_name, "b1");
        assert!(!outcome.record.ground_truth_moved);
    }

    assert!(base.join("raw_images/brain/b1").is_dir());

    let records = log.read_all().unwrap();
    assert_eq!(records.len(), 3);
    let destinations: Vec<&str> = records
        .iter()
        .map(|r| match r {
            LogRecord::Move(m) => m.destination_organ.as_str(),
            _ => "",
        })
        .collect();
    assert_eq!(destinations, ["lung", "heart", "brain"]);

    // 檔案本身是 JSON 陣列，舊紀錄順序不變
    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&log_path).unwrap()).unwrap();
    let array = raw.as_array().unwrap();
    assert_eq!(array.len(), 3);
    assert_eq!(array[0]["destination_organ"], "lung");
    assert_eq!(array[0]["root_kind"], "raw");
}

#[test]
fn test_rejected_move_leaves_disk_and_log_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path();
    let layout = create_dataset(base);
    let mut log = MoveLog::open(base.join("moves.json")).unwrap();
    let mover = DataPointMover::new(layout.clone());

    let entries = scan_data_points(&layout).unwrap();
    let liver = find(&entries, RootKind::Matched, "liver", "patient_001");

    assert!(matches!(
        mover.move_and_log(&liver, "../escape", &mut log),
        Err(MoveError::InvalidOrgan(_))
    ));
    assert!(matches!(
        mover.move_and_log(&liver, "liver", &mut log),
        Err(MoveError::SameOrgan(_))
    ));

    assert!(liver.raw_path.is_dir());
    assert!(log.read_all().unwrap().is_empty());
    assert_eq!(scan_data_points(&layout).unwrap(), entries);
}

#[test]
fn test_cursor_follows_rescan_after_move() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path();
    let layout = create_dataset(base);
    let mut log = MoveLog::open(base.join("moves.json")).unwrap();
    let mover = DataPointMover::new(layout.clone());

    let mut cursor = BrowseCursor::new(scan_data_points(&layout).unwrap());
    let entry = cursor.jump_to_organ(RootKind::Raw, "brain").unwrap().clone();

    mover.move_and_log(&entry, "lung", &mut log).unwrap();
    cursor.invalidate();
    assert!(cursor.current().is_none());

    cursor.refresh(scan_data_points(&layout).unwrap());
    let moved = cursor.jump_to_organ(RootKind::Raw, "lung").unwrap();
    assert_eq!(moved.data_point_id, "b1");
    assert!(cursor.jump_to_organ(RootKind::Raw, "brain").is_err());
}

#[test]
fn test_switch_then_demote() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path();
    let layout = create_dataset(base);
    let matched = base.join("matched_images/liver");
    fs::write(matched.join("ground_truth_images/patient_001/mask.txt"), "gt").unwrap();

    let entries = scan_data_points(&layout).unwrap();
    let liver = find(&entries, RootKind::Matched, "liver", "patient_001");

    switch_raw_gt(&layout, &liver).unwrap();
    assert!(matched.join("raw_images/patient_001/mask.txt").is_file());
    assert!(!matched.join("ground_truth_images/patient_001/mask.txt").exists());

    let record = demote_to_raw(&layout, &liver, PairSide::Raw).unwrap();
    assert_eq!(record.final_destination_name, "patient_001");
    assert!(base.join("raw_images/liver/patient_001/mask.txt").is_file());
    assert!(!matched.join("raw_images/patient_001").exists());
    assert!(!matched.join("ground_truth_images/patient_001").exists());
}
