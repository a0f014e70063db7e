use super::common::*;
use crate::catalog::ClinicianQuery;
use crate::planning::{PlanError, MAX_SELECTED_MEASURES};

#[test]
fn fifth_measure_is_rejected_and_prior_selections_survive() {
    let mut planner = planner();
    let m001 = track("M001");
    for id in ["001", "002", "003", "004"] {
        planner
            .select_measure(&m001, &measure_id(id), None)
            .expect("within capacity");
    }

    match planner.select_measure(&m001, &measure_id("005"), None) {
        Err(PlanError::SelectionCapacity { track, limit }) => {
            assert_eq!(track, m001);
            assert_eq!(limit, MAX_SELECTED_MEASURES);
        }
        other => panic!("expected capacity rejection, got {other:?}"),
    }

    let selected: Vec<&str> = planner
        .state()
        .selections(&m001)
        .iter()
        .map(|selection| selection.measure_id.as_str())
        .collect();
    assert_eq!(selected, vec!["001", "002", "003", "004"]);
}

#[test]
fn reselecting_at_capacity_changes_collection_type_only() {
    let mut planner = planner();
    let m001 = track("M001");
    for id in ["001", "002", "003", "004"] {
        planner
            .select_measure(&m001, &measure_id(id), None)
            .expect("within capacity");
    }

    planner
        .select_measure(&m001, &measure_id("002"), Some("eCQM"))
        .expect("reselect is not a new slot");
    let selection = planner
        .state()
        .selection(&m001, &measure_id("002"))
        .expect("still selected");
    assert_eq!(selection.collection_type, "eCQM");
    assert_eq!(planner.state().selections(&m001).len(), 4);
}

#[test]
fn selection_defaults_to_first_listed_collection_type() {
    let mut planner = planner();
    let summary = planner
        .select_measure(&track("M001"), &measure_id("001"), None)
        .expect("select");
    assert_eq!(summary.measures[0].collection_type, "MIPS CQM");
}

#[test]
fn unknown_ids_are_rejected() {
    let mut planner = planner();
    assert_eq!(
        planner.select_measure(&track("M999"), &measure_id("001"), None),
        Err(PlanError::UnknownTrack(track("M999")))
    );
    assert_eq!(
        planner.select_measure(&track("M001"), &measure_id("999"), None),
        Err(PlanError::UnknownMeasure(measure_id("999")))
    );
    assert_eq!(
        planner.assign(&npi("0000000000"), &track("M001")),
        Err(PlanError::UnknownClinician(npi("0000000000")))
    );
}

#[test]
fn unsupported_collection_type_is_rejected() {
    let mut planner = planner();
    let result = planner.select_measure(
        &track("M001"),
        &measure_id("001"),
        Some("Medicare Part B Claims"),
    );
    assert!(matches!(
        result,
        Err(PlanError::UnsupportedCollectionType { .. })
    ));
    assert!(planner.state().selections(&track("M001")).is_empty());
}

#[test]
fn deselecting_unselected_measure_reports_error() {
    let mut planner = planner();
    let result = planner.deselect_measure(&track("M001"), &measure_id("001"));
    assert_eq!(
        result,
        Err(PlanError::MeasureNotSelected {
            track: track("M001"),
            measure: measure_id("001"),
        })
    );
}

#[test]
fn reassignment_moves_clinician_and_updates_listing() {
    let mut planner = planner();
    planner.assign(&npi(SMITH), &track("M001")).expect("assign");
    let summary = planner.assign(&npi(SMITH), &track("M002")).expect("move");

    assert_eq!(summary.clinicians, vec![npi(SMITH)]);
    assert_eq!(planner.track_summary(&track("M001")).clinician_count(), 0);

    let unassigned = planner.unassigned_clinicians(&ClinicianQuery::default());
    assert_eq!(unassigned.len(), 3);
    assert!(unassigned.iter().all(|clinician| clinician.npi != npi(SMITH)));
}

#[test]
fn bulk_assign_is_all_or_nothing() {
    let mut planner = planner();
    let result = planner.assign_many(&[npi(SMITH), npi("0000000000")], &track("M001"));
    assert!(matches!(result, Err(PlanError::UnknownClinician(_))));
    assert!(planner.state().assignments().is_empty());

    let summary = planner
        .assign_many(&[npi(SMITH), npi(PATEL)], &track("M001"))
        .expect("bulk assign");
    assert_eq!(summary.clinician_count(), 2);
}

#[test]
fn unassigned_listing_honours_search_and_specialty() {
    let mut planner = planner();
    planner.assign(&npi(SMITH), &track("M001")).expect("assign");

    let by_specialty = planner.unassigned_clinicians(&ClinicianQuery {
        search: None,
        specialty: Some("Family Practice".to_string()),
    });
    assert_eq!(by_specialty.len(), 1);
    assert_eq!(by_specialty[0].name, "Dr. Patel");

    let by_npi = planner.unassigned_clinicians(&ClinicianQuery {
        search: Some("4444".to_string()),
        specialty: None,
    });
    assert_eq!(by_npi.len(), 1);
    assert_eq!(by_npi[0].name, "Dr. Jones");
}

#[test]
fn recorded_rates_are_clamped() {
    let mut planner = planner();
    let m001 = track("M001");
    planner
        .assign_many(&[npi(SMITH), npi(PATEL)], &m001)
        .expect("assign");
    planner
        .select_measure(&m001, &measure_id("001"), None)
        .expect("select");
    planner
        .record_performance(&m001, &measure_id("001"), &npi(SMITH), 140.0)
        .expect("record");
    planner
        .record_performance(&m001, &measure_id("001"), &npi(PATEL), f64::NAN)
        .expect("record");

    let state = planner.state();
    assert_eq!(
        state.performance(&m001, &measure_id("001"), &npi(SMITH)),
        Some(100.0)
    );
    assert_eq!(
        state.performance(&m001, &measure_id("001"), &npi(PATEL)),
        Some(0.0)
    );
}

#[test]
fn unassign_from_checks_the_current_track() {
    let mut planner = planner();
    planner.assign(&npi(JONES), &track("M002")).expect("assign");

    assert_eq!(
        planner.unassign_from(&track("M001"), &npi(JONES)),
        Err(PlanError::NotAssigned {
            npi: npi(JONES),
            track: track("M001"),
        })
    );
    let summary = planner
        .unassign_from(&track("M002"), &npi(JONES))
        .expect("unassign");
    assert_eq!(summary.clinician_count(), 0);
    assert!(planner.unassign(&npi(JONES)).is_none());
}
