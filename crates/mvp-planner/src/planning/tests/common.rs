use std::sync::Arc;

use crate::benchmarks::{BenchmarkRow, BenchmarkTable};
use crate::catalog::Catalog;
use crate::domain::{
    Clinician, Direction, ImplementationProfile, Measure, MeasureId, MeasureStatus, Npi, Track,
    TrackId,
};
use crate::planning::MvpPlanner;

pub(super) const SMITH: &str = "1111111111";
pub(super) const PATEL: &str = "2222222222";
pub(super) const NGUYEN: &str = "3333333333";
pub(super) const JONES: &str = "4444444444";

pub(super) fn npi(value: &str) -> Npi {
    Npi::from(value)
}

pub(super) fn track(value: &str) -> TrackId {
    TrackId::from(value)
}

pub(super) fn measure_id(value: &str) -> MeasureId {
    MeasureId::from(value)
}

fn clinician(npi: &str, name: &str, specialty: &str) -> Clinician {
    Clinician {
        npi: Npi::from(npi),
        name: name.to_string(),
        specialty: specialty.to_string(),
        tin: "123456789".to_string(),
        separate_ehr: false,
    }
}

fn measure(id: &str, direction: Option<Direction>) -> Measure {
    Measure {
        id: MeasureId::from(id),
        name: format!("Quality measure {id}"),
        status: MeasureStatus::Active,
        collection_types: vec!["MIPS CQM".to_string(), "eCQM".to_string()],
        direction,
        track: Some(TrackId::from("M001")),
        implementation: ImplementationProfile::default(),
    }
}

/// Benchmarked row for measure 101 under MIPS CQM; decile 5 starts at 70 and
/// decile 6 at 80.
pub(super) fn benchmark_101() -> BenchmarkRow {
    BenchmarkRow {
        measure_id: MeasureId::from("101"),
        collection_type: "MIPS CQM".to_string(),
        direction: Some(Direction::Normal),
        thresholds: [5.0, 20.0, 40.0, 55.0, 70.0, 80.0, 85.0, 90.0, 95.0, 98.0],
        mean: None,
        median: Some(70.0),
        year: Some(2025),
    }
}

/// Four clinicians, two tracks, six ladder-scored measures and one
/// benchmarked measure.
pub(super) fn catalog() -> Catalog {
    let clinicians = vec![
        clinician(SMITH, "Dr. Smith", "Family Practice"),
        clinician(PATEL, "Dr. Patel", "Family Practice"),
        clinician(NGUYEN, "Dr. Nguyen", "Internal Medicine"),
        clinician(JONES, "Dr. Jones", "Emergency Medicine"),
    ];
    let tracks = vec![
        Track {
            id: TrackId::from("M001"),
            name: "Primary Care MVP".to_string(),
            specialties: vec!["Family Practice".to_string(), "Internal Medicine".to_string()],
            measure_count: 8,
        },
        Track {
            id: TrackId::from("M002"),
            name: "Emergency Medicine MVP".to_string(),
            specialties: vec!["Emergency Medicine".to_string()],
            measure_count: 7,
        },
    ];
    let mut measures: Vec<Measure> = ["001", "002", "003", "004", "005"]
        .into_iter()
        .map(|id| measure(id, None))
        .collect();
    measures.push(measure("101", Some(Direction::Normal)));

    Catalog::new(
        clinicians,
        tracks,
        measures,
        BenchmarkTable::new([benchmark_101()]),
    )
}

pub(super) fn planner() -> MvpPlanner {
    MvpPlanner::in_memory(Arc::new(catalog()))
}

pub(super) fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}
