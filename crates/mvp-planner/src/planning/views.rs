use crate::catalog::CatalogSource;
use crate::domain::{Npi, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::aggregate::MeasureResult;
use super::state::MeasureSelection;

/// Recomputed aggregate for one track, returned after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub track_id: TrackId,
    /// `None` for tracks referenced by state but missing from the catalog.
    pub track_name: Option<String>,
    pub clinicians: Vec<Npi>,
    pub measures: Vec<MeasureResult>,
    pub total_points: f64,
    pub average_points: f64,
}

impl TrackSummary {
    pub fn clinician_count(&self) -> usize {
        self.clinicians.len()
    }

    pub fn scored_measures(&self) -> usize {
        self.measures
            .iter()
            .filter(|measure| measure.score.is_some())
            .count()
    }
}

/// Headline counts for the planning dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStats {
    pub total_clinicians: usize,
    pub assigned: usize,
    pub unassigned: usize,
    pub tracks: usize,
    pub active_tracks: usize,
    pub measures: usize,
    pub benchmarks: usize,
    pub catalog_source: CatalogSource,
}

/// Whole-plan view: every catalog track plus the cross-track scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub stats: PlanStats,
    pub tracks: Vec<TrackSummary>,
    pub overall_average: f64,
    pub overall_total: f64,
}

/// Counts carried in a plan export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub total_clinicians: usize,
    pub assigned: usize,
    pub unassigned: usize,
    pub active_mvps: usize,
}

/// Timestamped snapshot for download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanExport {
    pub timestamp: DateTime<Utc>,
    pub assignments: BTreeMap<TrackId, Vec<Npi>>,
    pub selections: BTreeMap<TrackId, Vec<MeasureSelection>>,
    pub summary: ExportSummary,
}

impl PlanExport {
    /// Download file name, e.g. `mvp-assignments-2025-01-31.json`.
    pub fn file_name(&self) -> String {
        format!("mvp-assignments-{}.json", self.timestamp.format("%Y-%m-%d"))
    }
}
