use std::fs;
use std::path::{Path, PathBuf};

use mvp_planner::catalog::{
    read_rows, Catalog, CatalogError, CatalogFeeds, CatalogLoader, CatalogSource, ClinicianQuery,
};
use mvp_planner::domain::{Direction, MeasureId, MeasureStatus, Npi, TrackId};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mvp-planner-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

#[test]
fn loads_fixture_exports() {
    let catalog = CatalogLoader::from_dir(fixtures())
        .with_benchmark_year(Some(2025))
        .load()
        .expect("fixtures load");

    assert_eq!(catalog.source(), CatalogSource::Feeds);
    assert_eq!(catalog.clinicians().len(), 4, "row without an NPI is skipped");
    assert_eq!(catalog.tracks().len(), 2);
    assert_eq!(catalog.measures().len(), 4);
    assert_eq!(catalog.benchmarks().len(), 3);

    let primary = catalog.track(&TrackId::from("M001")).expect("M001 present");
    assert_eq!(
        primary.specialties,
        vec!["Family Practice".to_string(), "Internal Medicine".to_string()]
    );
    assert_eq!(primary.measure_count, 8);

    let patel = catalog
        .clinician(&Npi::from("1122334455"))
        .expect("Dr. Patel present");
    assert!(patel.separate_ehr);
}

#[test]
fn measure_metadata_is_normalised() {
    let catalog = CatalogLoader::from_dir(fixtures()).load().expect("fixtures load");

    let a1c = catalog.measure(&MeasureId::from("001")).expect("001 present");
    assert_eq!(a1c.direction, Some(Direction::Inverse));
    assert_eq!(a1c.collection_types, vec!["eCQM".to_string(), "MIPS CQM".to_string()]);
    assert_eq!(a1c.implementation.readiness, Some(4));
    assert_eq!(a1c.implementation.setup_time.as_deref(), Some("2 weeks"));

    let depression = catalog.measure(&MeasureId::from("134")).expect("134 present");
    assert_eq!(depression.status, MeasureStatus::New);
    assert_eq!(depression.implementation.readiness, Some(3));

    let uri = catalog.measure(&MeasureId::from("065")).expect("065 present");
    assert_eq!(uri.direction, None);
    assert_eq!(uri.implementation.readiness, Some(5));

    assert_eq!(catalog.measures_for_track(&TrackId::from("M001")).len(), 3);
}

#[test]
fn benchmark_year_selects_rows() {
    let filtered = CatalogLoader::from_dir(fixtures())
        .with_benchmark_year(Some(2025))
        .load()
        .expect("fixtures load");
    let row = filtered
        .benchmarks()
        .lookup(&MeasureId::from("001"), "ecqm")
        .expect("2025 row");
    assert_eq!(row.threshold(5), Some(30.0));
    assert_eq!(row.median, Some(30.0));

    let unfiltered = CatalogLoader::from_dir(fixtures()).load().expect("fixtures load");
    let row = unfiltered
        .benchmarks()
        .lookup(&MeasureId::from("001"), "eCQM")
        .expect("later row wins");
    assert_eq!(row.year, Some(2024));
    assert_eq!(row.threshold(5), Some(45.0));
}

#[test]
fn missing_benchmark_export_falls_back_to_ladder() {
    let dir = scratch_dir("no-benchmarks");
    for file in ["clinicians.csv", "mvps.csv", "measures.csv"] {
        fs::copy(fixtures().join(file), dir.join(file)).expect("copy fixture");
    }

    let catalog = CatalogLoader::from_dir(&dir).load().expect("loads without benchmarks");
    assert!(catalog.benchmarks().is_empty());
    let score = catalog
        .engine()
        .score(&MeasureId::from("Q001"), "MIPS CQM", 92.0);
    assert_eq!(score.points, 9.0);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_required_feed_is_an_error_and_demo_is_the_fallback() {
    let dir = scratch_dir("empty");

    match CatalogLoader::from_dir(&dir).load() {
        Err(CatalogError::Io { feed, .. }) => assert_eq!(feed, "clinicians"),
        other => panic!("expected io error, got {other:?}"),
    }

    let catalog = CatalogLoader::from_dir(&dir).load_or_demo();
    assert_eq!(catalog.source(), CatalogSource::Demo);
    assert_eq!(catalog.clinicians().len(), 2);
    assert_eq!(catalog.tracks().len(), 2);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn headers_are_matched_through_aliases() {
    let clinicians = "\u{feff}Provider NPI , Clinician Name,Primary Specialty\n\
                      1234567890,Dr. Smith,Family Practice\n\
                      1234567890,Dr. Smith-Lee,Family Practice\n\
                      0987654321,Dr. Jones\n\
                      ,,\n";
    let feeds = CatalogFeeds {
        clinicians: read_rows("clinicians", clinicians.as_bytes()).expect("parse"),
        ..CatalogFeeds::default()
    };

    let catalog = Catalog::from_feeds(&feeds, None);
    assert_eq!(catalog.clinicians().len(), 1);
    assert_eq!(catalog.clinicians()[0].name, "Dr. Smith-Lee");
}

#[test]
fn specialty_counts_and_search() {
    let catalog = CatalogLoader::from_dir(fixtures()).load().expect("fixtures load");

    let counts = catalog.specialty_counts();
    assert_eq!(counts.get("Family Practice"), Some(&2));
    assert_eq!(counts.get("Emergency Medicine"), Some(&1));

    let matches = catalog.search_clinicians(&ClinicianQuery {
        search: Some("smith".to_string()),
        specialty: None,
    });
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].npi, Npi::from("1234567890"));
}
