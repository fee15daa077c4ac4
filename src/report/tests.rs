use super::*;
use crate::config::Config;

fn check(toml: &str) -> PlanReport {
    let workflow = Config::from_str(toml).unwrap().workflow().unwrap();
    check_workflow(&workflow)
}

#[test]
fn test_passing_workflow() {
    let report = check(
        r#"
        [pool]
        table = """
        source_slot,source_well,tube_well,vol_dna
        3,A1,A1,5
        3,A2,A1,5
        """
    "#,
    );
    assert!(!report.has_failures());
    assert!(!report.has_warnings());
    assert_eq!(report.workflow, "pool");

    let names: Vec<&str> = report.checks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names[0], "Workflow options");
    assert_eq!(names[1], "Transfer table (2 records)");
    assert_eq!(names[2], "Pool volumes");
    assert_eq!(names[3], "Deck layout");
    assert_eq!(names[4], "Dry run");
    assert_eq!(report.verdict(), Verdict::Ready);

    let stats = report.stats.as_ref().unwrap();
    assert_eq!(stats.tip_pickups, 1);
    assert_eq!(stats.dispenses, 2);
}

#[test]
fn test_collects_every_bad_volume() {
    let report = check(
        r#"
        [standardize]
        table = """
        source_slot,source_well,dest_slot,dest_well,vol_dna,vol_water
        1,A1,5,A1,250,10
        1,A2,5,A2,0.5,10
        1,A3,5,A3,30,10
        """
    "#,
    );
    assert!(report.has_failures());

    let dna = report.checks.iter().find(|c| c.name == "Dna volumes").unwrap();
    match &dna.status {
        CheckStatus::Failed(message) => {
            assert!(message.contains("record 1"));
            assert!(message.contains("record 2"));
            assert!(!message.contains("record 3"));
        }
        other => panic!("expected failure, got {:?}", other),
    }

    // No dry run once something failed
    assert!(!report.checks.iter().any(|c| c.name.starts_with("Dry run")));
}

#[test]
fn test_warns_below_tool_minimum() {
    let report = check(
        r#"
        [standardize]
        table = """
        source_slot,source_well,dest_slot,dest_well,vol_dna,vol_water
        1,A1,5,A1,10,0.5
        """
    "#,
    );
    assert!(!report.has_failures());
    assert_eq!(report.warning_count(), 1);
    let water = report.checks.iter().find(|c| c.name == "Water volumes").unwrap();
    assert!(matches!(&water.status, CheckStatus::Warning(m) if m.contains("0.5 uL")));
}

#[test]
fn test_reports_options_and_deck_together() {
    let report = check(
        r#"
        [standardize]
        source_plates = 4
        table = """
        source_slot,source_well,dest_slot,dest_well,vol_dna,vol_water
        1,A1,9,A1,10,10
        """
    "#,
    );
    assert_eq!(report.failure_count(), 2);
    assert_eq!(report.checks[0].name, "Workflow options");
    assert!(matches!(report.checks[0].status, CheckStatus::Failed(_)));
}

#[test]
fn test_out_of_range_cleanup_counts_reported() {
    for section in [
        "[cleanup]\nsamples = 300\n",
        "[cleanup]\nsamples = 9223372036854775807\n",
        "[cleanup]\nbatch_size = 0\n",
    ] {
        let report = check(section);
        assert_eq!(report.failure_count(), 2, "{}", report);
        assert!(matches!(report.checks[0].status, CheckStatus::Failed(_)));
        let deck = report.checks.iter().find(|c| c.name == "Deck layout").unwrap();
        assert!(matches!(&deck.status, CheckStatus::Failed(m) if m.contains("invalid")));
        assert!(report.stats.is_none());
    }
}

#[test]
fn test_display() {
    let mut report = PlanReport::new("cleanup");
    report.add_check(PlanCheck::ok("Workflow options"));
    report.add_check(PlanCheck::warning("Water volumes", "low"));

    let text = report.to_string();
    assert!(text.starts_with("Checking cleanup workflow\n"));
    assert!(text.contains("  [warn] Water volumes: low\n"));
    assert!(!text.contains("Plan\n"));
    assert!(text.ends_with("Workflow ready to run, with warnings (1 passed, 1 warnings, 0 failed)\n"));

    report.stats = Some(crate::driver::PlanStats {
        commands: 12,
        tip_pickups: 2,
        tips_dropped: 2,
        dispenses: 4,
        dispensed_ul: 80.0,
        delay_seconds: 300.0,
        ..Default::default()
    });
    let text = report.to_string();
    assert!(text.contains("  tips:      2 picked up, 2 dropped, 0 returned\n"));
    assert!(text.contains("  dispensed: 80.00 uL in 4 steps\n"));
    assert!(text.contains("  waiting:   5 min\n"));

    report.add_check(PlanCheck::failed("Deck layout", "slot 9"));
    assert_eq!(report.verdict(), Verdict::Blocked);
    assert!(report.to_string().contains("  [fail] Deck layout: slot 9\n"));
    assert!(report.to_string().contains("Workflow not runnable"));
}

#[test]
fn test_summarize_truncates() {
    let items: Vec<String> = (1..=8).map(|i| format!("item {}", i)).collect();
    let text = summarize(&items);
    assert!(text.contains("item 5"));
    assert!(!text.contains("item 6"));
    assert!(text.ends_with("(and 3 more)"));
}
