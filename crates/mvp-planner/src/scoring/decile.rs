use crate::benchmarks::BenchmarkRow;
use crate::domain::Direction;

pub(crate) const MIN_POINTS: f64 = 1.0;
pub(crate) const MAX_POINTS: f64 = 10.0;

fn reaches(direction: Direction, rate: f64, threshold: f64) -> bool {
    match direction {
        Direction::Normal => rate >= threshold,
        Direction::Inverse => rate <= threshold,
    }
}

/// Highest decile whose threshold the rate reaches, scanning 10 down to 2.
/// A rate equal to a threshold reaches it.
pub(crate) fn calculate_decile(row: &BenchmarkRow, direction: Direction, rate: f64) -> u8 {
    (2..=10u8)
        .rev()
        .find(|decile| {
            row.threshold(*decile)
                .is_some_and(|threshold| reaches(direction, rate, threshold))
        })
        .unwrap_or(1)
}

/// Sub-decile points: progress from the decile's own boundary toward the next
/// better one, mapped onto `(d - 1) + 0.1 ..= (d - 1) + 1.0`.
///
/// For inverse measures the next better boundary is threshold `d + 1`, which
/// is lower, so progress grows as the rate falls toward it.
///
/// Decile 1 has no meaningful own boundary, so the worst possible rate is used
/// instead: 0 for normal measures, 100 for inverse ones.
pub(crate) fn fractional_points(
    row: &BenchmarkRow,
    direction: Direction,
    decile: u8,
    rate: f64,
) -> f64 {
    let whole = f64::from(decile);
    if decile >= 10 {
        return MAX_POINTS;
    }

    let Some(next) = row.threshold(decile + 1) else {
        return whole;
    };
    let floor = if decile <= 1 {
        match direction {
            Direction::Normal => 0.0,
            Direction::Inverse => 100.0,
        }
    } else {
        match row.threshold(decile) {
            Some(threshold) => threshold,
            None => return whole,
        }
    };

    let span = next - floor;
    if !span.is_finite() || span.abs() < f64::EPSILON {
        return whole;
    }

    let progress = ((rate - floor) / span).clamp(0.0, 1.0);
    let points = f64::from(decile - 1) + progress * 0.9 + 0.1;
    round_tenth(points).clamp(MIN_POINTS, MAX_POINTS)
}

pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
