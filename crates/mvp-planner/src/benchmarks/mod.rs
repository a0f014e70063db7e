//! Percentile benchmark thresholds keyed by measure and collection type.

use crate::catalog::aliases::Field;
use crate::catalog::TabularRow;
use crate::domain::{Direction, MeasureId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Number of performance bands in a benchmark row.
pub const DECILE_COUNT: usize = 10;

/// Threshold row for a single (measure, collection type) pair.
///
/// `thresholds[0]` is decile 1 and `thresholds[9]` is decile 10. For normal
/// measures each entry is the minimum rate that reaches the decile; for
/// inverse measures it is the maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRow {
    pub measure_id: MeasureId,
    pub collection_type: String,
    /// `None` when the feed did not say; scoring then asks the measure catalog.
    pub direction: Option<Direction>,
    pub thresholds: [f64; DECILE_COUNT],
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub year: Option<u16>,
}

impl BenchmarkRow {
    /// Threshold for a 1-based decile.
    pub fn threshold(&self, decile: u8) -> Option<f64> {
        let index = usize::from(decile).checked_sub(1)?;
        self.thresholds.get(index).copied()
    }

    /// Build a row from a loosely typed feed row. Returns `None` when the row
    /// lacks a measure id.
    pub fn from_tabular(row: &TabularRow) -> Option<Self> {
        let measure_id = row.text(Field::BenchmarkMeasureId)?;
        let collection_type = row
            .text(Field::BenchmarkCollectionType)
            .unwrap_or_default();
        let median = row.number(Field::BenchmarkMedian);

        let mut thresholds = [0.0; DECILE_COUNT];
        for (index, slot) in thresholds.iter_mut().enumerate() {
            let decile = index as u8 + 1;
            let resolved = row.number(Field::BenchmarkDecile(decile)).or(
                if decile == 5 { median } else { None },
            );
            *slot = resolved.unwrap_or(if decile == 10 { 100.0 } else { 0.0 });
        }

        Some(Self {
            measure_id: MeasureId::from(measure_id),
            collection_type,
            direction: row
                .flag(Field::BenchmarkInverse)
                .map(Direction::from_inverse_flag),
            thresholds,
            mean: row.number(Field::BenchmarkMean),
            median,
            year: row
                .number(Field::BenchmarkYear)
                .filter(|year| *year >= 0.0 && *year <= f64::from(u16::MAX))
                .map(|year| year as u16),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BenchmarkKey {
    measure_id: String,
    collection_type: String,
}

impl BenchmarkKey {
    fn new(measure_id: &str, collection_type: &str) -> Self {
        Self {
            measure_id: measure_id.trim().to_ascii_lowercase(),
            collection_type: collection_type.trim().to_ascii_lowercase(),
        }
    }
}

/// Immutable lookup table. One authoritative row per key; later rows replace
/// earlier ones with the same key.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkTable {
    rows: HashMap<BenchmarkKey, BenchmarkRow>,
}

impl BenchmarkTable {
    pub fn new<I: IntoIterator<Item = BenchmarkRow>>(rows: I) -> Self {
        let mut table = HashMap::new();
        for row in rows {
            let key = BenchmarkKey::new(row.measure_id.as_str(), &row.collection_type);
            if table.insert(key, row).is_some() {
                debug!("duplicate benchmark row replaced by later entry");
            }
        }
        Self { rows: table }
    }

    /// Build from feed rows, keeping only `year` when one is given. Rows that
    /// carry no year are always kept.
    pub fn from_rows(rows: &[TabularRow], year: Option<u16>) -> Self {
        let parsed = rows.iter().filter_map(|row| {
            let parsed = BenchmarkRow::from_tabular(row);
            if parsed.is_none() {
                debug!("skipping benchmark row without a measure id");
            }
            parsed
        });

        match year {
            Some(year) => Self::new(parsed.filter(|row| row.year.map_or(true, |y| y == year))),
            None => Self::new(parsed),
        }
    }

    /// Exact match on (measure, collection type); no cross-type fallback.
    pub fn lookup(&self, measure_id: &MeasureId, collection_type: &str) -> Option<&BenchmarkRow> {
        self.rows
            .get(&BenchmarkKey::new(measure_id.as_str(), collection_type))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
