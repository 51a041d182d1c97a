use std::{
    path::Path,
    process::{Command, Output},
};

use tilestep_core::{TileGrid, TileKind};

fn tilestep(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tilestep"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch tilestep binary")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temporary paths are valid utf-8")
}

#[test]
fn demo_export_import_round_trip() {
    let directory = tempfile::tempdir().expect("temporary directory");
    let demo = directory.path().join("demo.tmap");
    let copy = directory.path().join("copy.tmap");

    assert!(tilestep(&["demo", path_arg(&demo)]).status.success());

    let exported = tilestep(&["export", path_arg(&demo)]);
    assert!(exported.status.success());
    let share = String::from_utf8(exported.stdout).expect("utf-8 output");
    assert!(share.starts_with("tmap:v2:"));

    assert!(tilestep(&["import", share.trim(), path_arg(&copy)])
        .status
        .success());

    assert_eq!(
        tilestep_level::load_file(&demo).expect("demo loads"),
        tilestep_level::load_file(&copy).expect("copy loads")
    );
}

#[test]
fn upgrade_rewrites_legacy_files() {
    let directory = tempfile::tempdir().expect("temporary directory");
    let legacy = directory.path().join("legacy.tmap");
    let upgraded = directory.path().join("upgraded.tmap");

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"TMAP");
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&32u16.to_le_bytes());
    bytes.extend_from_slice(&4u32.to_le_bytes());
    bytes.extend_from_slice(&3u32.to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.push(2);
    bytes.extend_from_slice(&(-1i32).to_le_bytes());
    bytes.extend_from_slice(&(-1i32).to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    std::fs::write(&legacy, bytes).expect("legacy file written");

    let output = tilestep(&["upgrade", path_arg(&legacy), path_arg(&upgraded)]);
    assert!(output.status.success());

    let written = std::fs::read(&upgraded).expect("upgraded file");
    let header = tilestep_level::read_header(&written).expect("header");
    assert_eq!(header.version, tilestep_level::CURRENT_VERSION);
    let grid = tilestep_level::decode(&written)
        .expect("upgraded level decodes")
        .to_grid();
    assert_eq!(grid.get(2, 2).kind(), TileKind::Platform);
}

#[test]
fn inspect_reports_counts_and_rejects_garbage() {
    let directory = tempfile::tempdir().expect("temporary directory");
    let level_path = directory.path().join("small.tmap");
    let garbage = directory.path().join("garbage.tmap");
    let mut grid = TileGrid::new(5, 4, 32);
    grid.set(0, 3, TileKind::Solid);
    grid.set(1, 3, TileKind::Platform);
    let level = tilestep_core::LevelData::from_grid(&grid, None, Vec::new());
    tilestep_level::save_file(&level_path, &level).expect("level saved");
    std::fs::write(&garbage, b"nope").expect("garbage written");

    let output = tilestep(&["inspect", path_arg(&level_path)]);
    assert!(output.status.success());
    let report = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(report.contains("format version: 2"));
    assert!(report.contains("size: 5x4"));
    assert!(report.contains("1 solid (0 shaped), 1 platform"));
    assert!(report.contains("player spawn: unset"));

    assert!(!tilestep(&["inspect", path_arg(&garbage)]).status.success());
}

#[test]
fn simulate_prints_a_summary() {
    let output = tilestep(&["simulate", "--steps", "30", "--hold", "right"]);
    assert!(output.status.success());

    let report = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(report.contains("steps simulated:   30"));
    assert!(report.contains("enemies remaining: 3"));
}
