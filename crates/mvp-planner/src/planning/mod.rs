//! Session planning: clinician assignments, measure selections, recorded
//! performance, and the scores recomputed from them.

mod aggregate;
mod planner;
mod scenario;
mod state;
mod views;

pub use aggregate::{
    measure_results, overall_score, track_average, track_total, MeasureResult, RateSource,
    TrackReduction, TrackWeight,
};
pub use planner::MvpPlanner;
pub use scenario::{
    InMemoryScenarioRepository, Scenario, ScenarioError, ScenarioRepository, ScenarioSummary,
};
pub use state::{MeasureSelection, PlanState, MAX_SELECTED_MEASURES};
pub use views::{ExportSummary, PlanExport, PlanStats, PlanSummary, TrackSummary};

use crate::domain::{MeasureId, Npi, TrackId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("track {track} already has the maximum of {limit} measures selected")]
    SelectionCapacity { track: TrackId, limit: usize },
    #[error("unknown track '{0}'")]
    UnknownTrack(TrackId),
    #[error("unknown clinician '{0}'")]
    UnknownClinician(Npi),
    #[error("unknown measure '{0}'")]
    UnknownMeasure(MeasureId),
    #[error("clinician {npi} is not assigned to track {track}")]
    NotAssigned { npi: Npi, track: TrackId },
    #[error("measure {measure} is not selected for track {track}")]
    MeasureNotSelected { track: TrackId, measure: MeasureId },
    #[error("collection type '{collection_type}' is not permitted for measure {measure}")]
    UnsupportedCollectionType {
        measure: MeasureId,
        collection_type: String,
    },
}

#[cfg(test)]
mod tests;
