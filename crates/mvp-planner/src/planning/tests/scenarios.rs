use super::common::*;
use crate::planning::ScenarioError;
use chrono::{TimeZone, Utc};

#[test]
fn restore_replaces_the_whole_state() {
    let mut planner = planner();
    let saved_at = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).single().expect("valid");
    planner.assign(&npi(SMITH), &track("M001")).expect("assign");
    planner
        .select_measure(&track("M001"), &measure_id("001"), None)
        .expect("select");
    let snapshot = planner.state().clone();

    let summary = planner.save_scenario("baseline", saved_at).expect("save");
    assert_eq!(summary.assigned_clinicians, 1);
    assert_eq!(summary.tracks_with_selections, 1);

    planner.assign(&npi(JONES), &track("M002")).expect("assign");
    planner
        .deselect_measure(&track("M001"), &measure_id("001"))
        .expect("deselect");
    planner
        .select_measure(&track("M002"), &measure_id("002"), None)
        .expect("select");

    planner.restore_scenario("baseline").expect("restore");
    assert_eq!(planner.state(), &snapshot);
}

#[test]
fn saved_scenario_is_independent_of_later_edits() {
    let mut planner = planner();
    let saved_at = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).single().expect("valid");
    planner.assign(&npi(SMITH), &track("M001")).expect("assign");
    planner.save_scenario("draft", saved_at).expect("save");

    planner.unassign(&npi(SMITH)).expect("was assigned");
    let listed = planner.list_scenarios().expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].assigned_clinicians, 1);
}

#[test]
fn restoring_unknown_scenario_leaves_state_untouched() {
    let mut planner = planner();
    planner.assign(&npi(SMITH), &track("M001")).expect("assign");
    let before = planner.state().clone();

    match planner.restore_scenario("missing") {
        Err(ScenarioError::NotFound(name)) => assert_eq!(name, "missing"),
        other => panic!("expected not found, got {other:?}"),
    }
    assert_eq!(planner.state(), &before);
}

#[test]
fn blank_names_are_rejected_and_delete_reports_missing() {
    let planner = planner();
    let saved_at = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).single().expect("valid");
    assert!(matches!(
        planner.save_scenario("   ", saved_at),
        Err(ScenarioError::InvalidName)
    ));

    planner.save_scenario(" q1 plan ", saved_at).expect("save");
    planner.delete_scenario("q1 plan").expect("delete trimmed name");
    assert!(matches!(
        planner.delete_scenario("q1 plan"),
        Err(ScenarioError::NotFound(_))
    ));
}
