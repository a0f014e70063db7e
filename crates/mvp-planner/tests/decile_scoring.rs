use mvp_planner::benchmarks::{BenchmarkRow, BenchmarkTable};
use mvp_planner::domain::{Direction, MeasureId};
use mvp_planner::scoring::{ScoreBasis, ScoringEngine};

const RISING: [f64; 10] = [10.0, 20.0, 30.0, 40.0, 70.0, 80.0, 85.0, 90.0, 95.0, 98.0];
const FALLING: [f64; 10] = [90.0, 70.0, 50.0, 40.0, 30.0, 25.0, 20.0, 15.0, 10.0, 5.0];

fn row(measure: &str, direction: Direction, thresholds: [f64; 10]) -> BenchmarkRow {
    BenchmarkRow {
        measure_id: MeasureId::from(measure),
        collection_type: "MIPS CQM".to_string(),
        direction: Some(direction),
        thresholds,
        mean: None,
        median: None,
        year: Some(2025),
    }
}

fn engine() -> ScoringEngine {
    ScoringEngine::new(
        BenchmarkTable::new([
            row("Q001", Direction::Normal, RISING),
            row("Q236", Direction::Inverse, FALLING),
        ]),
        &[],
    )
}

fn rates() -> impl DoubleEndedIterator<Item = f64> {
    (0..=200).map(|step| f64::from(step) * 0.5)
}

#[test]
fn rate_between_fifth_and_sixth_deciles_scores_four_point_six() {
    let score = engine().score(&MeasureId::from("Q001"), "MIPS CQM", 75.0);
    assert_eq!(score.decile, 5);
    assert!((score.points - 4.6).abs() < 1e-9, "got {}", score.points);
    assert_eq!(score.basis, ScoreBasis::Benchmark);
}

#[test]
fn inverse_rate_between_thresholds_lands_in_lower_decile() {
    let score = engine().score(&MeasureId::from("Q236"), "MIPS CQM", 35.0);
    assert_eq!(score.decile, 4);
    assert_eq!(score.direction, Direction::Inverse);
    assert!(
        (3.5..=3.6).contains(&score.points),
        "got {}",
        score.points
    );
}

#[test]
fn rate_equal_to_threshold_reaches_that_decile() {
    let score = engine().score(&MeasureId::from("Q001"), "MIPS CQM", 85.0);
    assert_eq!(score.decile, 7);
    assert!((score.points - 6.1).abs() < 1e-9, "got {}", score.points);

    let inverse = engine().score(&MeasureId::from("Q236"), "MIPS CQM", 20.0);
    assert_eq!(inverse.decile, 7);
}

#[test]
fn top_decile_scores_exactly_ten() {
    let score = engine().score(&MeasureId::from("Q001"), "MIPS CQM", 99.0);
    assert_eq!(score.decile, 10);
    assert_eq!(score.points, 10.0);

    let inverse = engine().score(&MeasureId::from("Q236"), "MIPS CQM", 0.0);
    assert_eq!(inverse.decile, 10);
    assert_eq!(inverse.points, 10.0);
}

#[test]
fn points_never_decrease_as_performance_improves() {
    let engine = engine();
    let normal = MeasureId::from("Q001");
    let inverse = MeasureId::from("Q236");

    let mut previous = 0.0;
    for rate in rates() {
        let points = engine.score(&normal, "MIPS CQM", rate).points;
        assert!(points >= previous, "normal dropped at {rate}: {points} < {previous}");
        previous = points;
    }

    let mut previous = 0.0;
    for rate in rates().rev() {
        let points = engine.score(&inverse, "MIPS CQM", rate).points;
        assert!(points >= previous, "inverse dropped at {rate}: {points} < {previous}");
        previous = points;
    }
}

#[test]
fn points_stay_within_one_and_ten() {
    let engine = engine();
    for measure in ["Q001", "Q236", "UNBENCHMARKED"] {
        let measure = MeasureId::from(measure);
        for rate in rates().chain([-25.0, 140.0, f64::NAN, f64::INFINITY]) {
            let score = engine.score(&measure, "MIPS CQM", rate);
            assert!((1.0..=10.0).contains(&score.points), "{measure} at {rate}");
            assert!((1..=10).contains(&score.decile), "{measure} at {rate}");
        }
    }
}

#[test]
fn scoring_is_deterministic() {
    let engine = engine();
    let measure = MeasureId::from("Q001");
    for rate in rates() {
        assert_eq!(
            engine.score(&measure, "MIPS CQM", rate),
            engine.score(&measure, "MIPS CQM", rate)
        );
    }
}

#[test]
fn collection_type_must_match_exactly_apart_from_case() {
    let engine = engine();
    let measure = MeasureId::from("Q001");
    assert_eq!(
        engine.score(&measure, " mips cqm ", 75.0).basis,
        ScoreBasis::Benchmark
    );
    let fallback = engine.score(&measure, "eCQM", 75.0);
    assert_eq!(fallback.basis, ScoreBasis::DefaultLadder);
    assert_eq!(fallback.decile, 6);
}

#[test]
fn default_ladder_brackets() {
    let engine = ScoringEngine::default();
    let measure = MeasureId::from("404");
    let points = |rate: f64| engine.score(&measure, "MIPS CQM", rate).points;

    assert_eq!(points(95.0), 10.0);
    assert_eq!(points(100.0), 10.0);
    assert_eq!(points(94.9), 9.0);
    assert_eq!(points(70.0), 5.0);
    assert_eq!(points(60.0), 4.0);
    assert_eq!(points(40.0), 2.0);
    assert_eq!(points(39.9), 1.0);
    assert_eq!(points(0.0), 1.0);
}

#[test]
fn text_rates_are_parsed_leniently() {
    let engine = engine();
    let measure = MeasureId::from("Q001");
    assert_eq!(
        engine.score_text(&measure, "MIPS CQM", "75%"),
        engine.score(&measure, "MIPS CQM", 75.0)
    );
    assert_eq!(engine.score_text(&measure, "MIPS CQM", "not a rate").decile, 1);
}
