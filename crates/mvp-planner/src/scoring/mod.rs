//! Decile scoring against percentile benchmarks.

mod decile;
mod ladder;

use crate::benchmarks::{BenchmarkRow, BenchmarkTable};
use crate::catalog::parser::parse_number;
use crate::domain::{Direction, Measure, MeasureId};
use decile::{calculate_decile, fractional_points, MAX_POINTS, MIN_POINTS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Where a score's thresholds came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBasis {
    Benchmark,
    DefaultLadder,
}

/// Decile rank and point value for one measure result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecileScore {
    pub decile: u8,
    pub points: f64,
    pub direction: Direction,
    pub basis: ScoreBasis,
}

/// Scores raw performance rates. Pure over its benchmark table and the
/// measure directionality it was built with.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    benchmarks: BenchmarkTable,
    directions: HashMap<MeasureId, Direction>,
}

impl ScoringEngine {
    pub fn new(benchmarks: BenchmarkTable, measures: &[Measure]) -> Self {
        let directions = measures
            .iter()
            .filter_map(|measure| {
                measure
                    .direction
                    .map(|direction| (measure.id.clone(), direction))
            })
            .collect();

        Self {
            benchmarks,
            directions,
        }
    }

    pub fn benchmarks(&self) -> &BenchmarkTable {
        &self.benchmarks
    }

    /// Score `rate` for a measure under a collection type. Non-finite rates
    /// are scored as 0. Never fails: a missing benchmark row falls back to the
    /// default ladder.
    pub fn score(&self, measure_id: &MeasureId, collection_type: &str, rate: f64) -> DecileScore {
        let rate = sanitize_rate(rate);

        match self.benchmarks.lookup(measure_id, collection_type) {
            Some(row) => {
                let direction = self.direction_for(measure_id, Some(row));
                score_against_row(row, direction, rate)
            }
            None => {
                debug!(
                    measure = %measure_id,
                    collection_type,
                    "no benchmark row; scoring with default ladder"
                );
                let decile = ladder::default_decile(rate);
                DecileScore {
                    decile,
                    points: f64::from(decile),
                    direction: Direction::Normal,
                    basis: ScoreBasis::DefaultLadder,
                }
            }
        }
    }

    /// Score a rate supplied as text; malformed input scores as 0.
    pub fn score_text(&self, measure_id: &MeasureId, collection_type: &str, raw: &str) -> DecileScore {
        self.score(measure_id, collection_type, parse_rate(raw))
    }

    /// Row flag first, then the measure catalog, then normal.
    pub fn direction_for(&self, measure_id: &MeasureId, row: Option<&BenchmarkRow>) -> Direction {
        row.and_then(|row| row.direction)
            .or_else(|| self.directions.get(measure_id).copied())
            .unwrap_or_default()
    }
}

fn score_against_row(row: &BenchmarkRow, direction: Direction, rate: f64) -> DecileScore {
    let decile = calculate_decile(row, direction, rate);
    let points = fractional_points(row, direction, decile, rate).clamp(MIN_POINTS, MAX_POINTS);

    DecileScore {
        decile,
        points,
        direction,
        basis: ScoreBasis::Benchmark,
    }
}

fn sanitize_rate(rate: f64) -> f64 {
    if rate.is_finite() {
        rate
    } else {
        0.0
    }
}

/// Lenient rate parse used for user-entered values. Anything unparseable is 0.
pub fn parse_rate(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(0.0)
}

/// Clamp a stored rate to 0..=100; non-finite values become 0.
pub fn clamp_rate(rate: f64) -> f64 {
    sanitize_rate(rate).clamp(0.0, 100.0)
}
