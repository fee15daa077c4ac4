//! Integration tests for liquidplan
//!
//! These tests load workflow files from disk and run them through planning,
//! checking and export the way the CLI does.

use liquidplan::config::Config;
use liquidplan::driver::{Command, CommandLog};
use liquidplan::export::PlanExport;
use liquidplan::labware::Mount;
use liquidplan::protocols::plan_workflow;
use liquidplan::report::check_workflow;
use liquidplan::PlanError;
use std::fs;
use tempfile::tempdir;

const STANDARDIZE_TABLE: &str = "\
source_slot,source_well,dest_slot,dest_well,vol_dna,vol_water
3,A1,5,A1,18.25,70.65
1,A10,5,A10,50.75,38.15
,,,,,
2,H12,6,H12,4.5,15.5
";

/// Workflow file with the table next to it
#[test]
fn test_standardize_from_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("table.csv"), STANDARDIZE_TABLE).unwrap();
    let config_path = dir.path().join("standardize.toml");
    fs::write(
        &config_path,
        r#"
        [standardize]
        source_plates = 3
        destination_plates = 2
        source_plate_type = "nest_100ul"
        destination_status = "clean"
        extra_rack = "300"
        table_file = "table.csv"
        "#,
    )
    .unwrap();

    let config = Config::from_file(&config_path).unwrap();
    let workflow = config.workflow().unwrap();

    let mut log = CommandLog::new();
    plan_workflow(&workflow, &mut log).unwrap();

    let stats = log.stats();
    assert_eq!(stats.dispenses, 6);
    let expected = 18.25 + 70.65 + 50.75 + 38.15 + 4.5 + 15.5;
    assert!((stats.dispensed_ul - expected).abs() < 1e-6);
    assert_eq!(stats.tip_pickups, stats.tips_dropped);

    // Three 300 uL racks with the extra rack
    let p300_racks = log
        .commands()
        .iter()
        .find_map(|c| match c {
            Command::LoadInstrument { mount, tip_racks, .. } if *mount == Mount::Left => Some(tip_racks.len()),
            _ => None,
        })
        .unwrap();
    assert_eq!(p300_racks, 3);
}

#[test]
fn test_missing_table_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("pool.toml");
    fs::write(&config_path, "[pool]\ntable_file = \"missing.csv\"\n").unwrap();

    let err = Config::from_file(&config_path).unwrap_err();
    assert!(matches!(err, PlanError::IoError(_)));
}

#[test]
fn test_check_then_export() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("cleanup.toml");
    fs::write(
        &config_path,
        r#"
        [cleanup]
        samples = 40
        reagent = "peg"
        sample_volume = 50
        bead_volume = 40
        elution_volume = 30
        "#,
    )
    .unwrap();

    let workflow = Config::from_file(&config_path).unwrap().workflow().unwrap();
    let report = check_workflow(&workflow);
    assert!(!report.has_failures(), "{}", report);

    let export = PlanExport::plan(&workflow).unwrap();
    assert_eq!(export.workflow, "cleanup");
    assert_eq!(export.stats.commands, export.commands.len());

    let json = export.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(value["generated_at"].as_str().unwrap().contains('T'));
    assert_eq!(
        value["commands"].as_array().unwrap().len(),
        export.commands.len()
    );
}

#[test]
fn test_failed_plan_issues_nothing() {
    let config = Config::from_str(
        r#"
        [ligation]
        plates = 2
        samples = [96]
        master_mix_volume = 8
        table = "barcode_well,dest_slot,dest_well\nA1,5,A1\n"
        "#,
    )
    .unwrap();
    let workflow = config.workflow().unwrap();

    let mut log = CommandLog::new();
    let err = plan_workflow(&workflow, &mut log).unwrap_err();
    assert!(matches!(err, PlanError::Configuration(_)));
    assert!(log.is_empty());

    let report = check_workflow(&workflow);
    assert_eq!(report.failure_count(), 1);
}

#[test]
fn test_malformed_row_reports_line() {
    let config = Config::from_str(
        r#"
        [standardize]
        table = "header\n1,A1,5,A1,40,60\n1,Z9,5,A2,40,60\n"
        "#,
    )
    .unwrap();
    let workflow = config.workflow().unwrap();

    let mut log = CommandLog::new();
    match plan_workflow(&workflow, &mut log) {
        Err(PlanError::MalformedRow { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected MalformedRow, got {:?}", other),
    }
    assert!(log.is_empty());
}
