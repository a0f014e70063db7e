use crate::catalog::{Catalog, ClinicianQuery};
use crate::domain::{Clinician, MeasureId, Npi, TrackId};
use crate::scoring::{clamp_rate, DecileScore};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::aggregate::{self, TrackReduction, TrackWeight};
use super::scenario::{
    validate_name, InMemoryScenarioRepository, Scenario, ScenarioError, ScenarioRepository,
    ScenarioSummary,
};
use super::state::{MeasureSelection, PlanState};
use super::views::{ExportSummary, PlanExport, PlanStats, PlanSummary, TrackSummary};
use super::PlanError;

/// Owns the plan state for one session and recomputes scores after every
/// change. The catalog is shared and never mutated.
pub struct MvpPlanner<R = InMemoryScenarioRepository> {
    catalog: Arc<Catalog>,
    state: PlanState,
    scenarios: Arc<R>,
}

impl MvpPlanner<InMemoryScenarioRepository> {
    pub fn in_memory(catalog: Arc<Catalog>) -> Self {
        Self::new(catalog, Arc::new(InMemoryScenarioRepository::default()))
    }
}

impl<R> MvpPlanner<R>
where
    R: ScenarioRepository + 'static,
{
    pub fn new(catalog: Arc<Catalog>, scenarios: Arc<R>) -> Self {
        Self {
            catalog,
            state: PlanState::new(),
            scenarios,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &PlanState {
        &self.state
    }

    /// Score a rate directly against the benchmark table.
    pub fn score(&self, measure_id: &MeasureId, collection_type: &str, rate: f64) -> DecileScore {
        self.catalog.engine().score(measure_id, collection_type, rate)
    }

    /// Assign a clinician to a track, moving them off any previous track.
    pub fn assign(&mut self, npi: &Npi, track: &TrackId) -> Result<TrackSummary, PlanError> {
        self.require_track(track)?;
        self.require_clinician(npi)?;

        if let Some(previous) = self.state.assign(npi.clone(), track.clone()) {
            debug!(%npi, from = %previous, to = %track, "clinician reassigned");
        }
        Ok(self.track_summary(track))
    }

    /// Assign several clinicians at once. Every id is validated before any
    /// assignment is applied.
    pub fn assign_many(&mut self, npis: &[Npi], track: &TrackId) -> Result<TrackSummary, PlanError> {
        self.require_track(track)?;
        for npi in npis {
            self.require_clinician(npi)?;
        }

        for npi in npis {
            self.state.assign(npi.clone(), track.clone());
        }
        info!(%track, count = npis.len(), "clinicians assigned");
        Ok(self.track_summary(track))
    }

    /// Remove a clinician from whatever track they are on.
    pub fn unassign(&mut self, npi: &Npi) -> Option<TrackSummary> {
        let previous = self.state.unassign(npi)?;
        Some(self.track_summary(&previous))
    }

    /// Remove a clinician from `track`, failing if they are elsewhere or
    /// unassigned.
    pub fn unassign_from(&mut self, track: &TrackId, npi: &Npi) -> Result<TrackSummary, PlanError> {
        if self.state.track_of(npi) != Some(track) {
            return Err(PlanError::NotAssigned {
                npi: npi.clone(),
                track: track.clone(),
            });
        }
        self.state.unassign(npi);
        Ok(self.track_summary(track))
    }

    /// Select a measure for a track. The collection type defaults to the
    /// measure's first permissible type. A fifth measure is rejected and the
    /// existing selections stay as they were.
    pub fn select_measure(
        &mut self,
        track: &TrackId,
        measure_id: &MeasureId,
        collection_type: Option<&str>,
    ) -> Result<TrackSummary, PlanError> {
        self.require_track(track)?;
        let measure = self
            .catalog
            .measure(measure_id)
            .ok_or_else(|| PlanError::UnknownMeasure(measure_id.clone()))?;

        let collection_type = match collection_type.map(str::trim).filter(|ct| !ct.is_empty()) {
            Some(requested) if measure.supports_collection_type(requested) => requested.to_string(),
            Some(requested) => {
                return Err(PlanError::UnsupportedCollectionType {
                    measure: measure_id.clone(),
                    collection_type: requested.to_string(),
                })
            }
            None => measure.default_collection_type().to_string(),
        };

        let mut selection = MeasureSelection::new(measure_id.clone(), collection_type);
        if let Some(existing) = self.state.selection(track, measure_id) {
            selection.difficulty = existing.difficulty.clone();
            selection.readiness = existing.readiness.clone();
            selection.estimated_rate = existing.estimated_rate;
        }

        if let Err(err) = self.state.select_measure(track, selection) {
            warn!(%track, measure = %measure_id, "measure selection rejected: {err}");
            return Err(err);
        }
        Ok(self.track_summary(track))
    }

    pub fn deselect_measure(
        &mut self,
        track: &TrackId,
        measure_id: &MeasureId,
    ) -> Result<TrackSummary, PlanError> {
        if !self.state.deselect_measure(track, measure_id) {
            return Err(PlanError::MeasureNotSelected {
                track: track.clone(),
                measure: measure_id.clone(),
            });
        }
        Ok(self.track_summary(track))
    }

    /// Set or clear the track-level estimate for a selected measure.
    pub fn set_estimate(
        &mut self,
        track: &TrackId,
        measure_id: &MeasureId,
        rate: Option<f64>,
    ) -> Result<TrackSummary, PlanError> {
        let selection = self.selection_mut(track, measure_id)?;
        selection.estimated_rate = rate.map(clamp_rate);
        Ok(self.track_summary(track))
    }

    /// Free-form difficulty and readiness overrides for a selected measure.
    pub fn annotate_selection(
        &mut self,
        track: &TrackId,
        measure_id: &MeasureId,
        difficulty: Option<String>,
        readiness: Option<String>,
    ) -> Result<TrackSummary, PlanError> {
        let selection = self.selection_mut(track, measure_id)?;
        selection.difficulty = difficulty;
        selection.readiness = readiness;
        Ok(self.track_summary(track))
    }

    /// Record a clinician's rate for a measure on a track. The clinician must
    /// be assigned to that track. Rates are clamped to 0..=100; non-numeric
    /// values are stored as 0.
    pub fn record_performance(
        &mut self,
        track: &TrackId,
        measure_id: &MeasureId,
        npi: &Npi,
        rate: f64,
    ) -> Result<TrackSummary, PlanError> {
        self.require_track(track)?;
        self.require_clinician(npi)?;
        if self.state.track_of(npi) != Some(track) {
            return Err(PlanError::NotAssigned {
                npi: npi.clone(),
                track: track.clone(),
            });
        }
        if self.catalog.measure(measure_id).is_none() {
            return Err(PlanError::UnknownMeasure(measure_id.clone()));
        }

        self.state
            .record_performance(track, measure_id, npi, clamp_rate(rate));
        Ok(self.track_summary(track))
    }

    /// Scores for one track. Unknown tracks yield an empty summary.
    pub fn track_summary(&self, track: &TrackId) -> TrackSummary {
        let measures = aggregate::measure_results(&self.catalog, &self.state, track);
        TrackSummary {
            track_id: track.clone(),
            track_name: self.catalog.track(track).map(|known| known.name.clone()),
            clinicians: self.state.clinicians_in(track).into_iter().cloned().collect(),
            total_points: aggregate::track_total(&measures),
            average_points: aggregate::track_average(&measures),
            measures,
        }
    }

    /// Sum of the track's scored measure points.
    pub fn track_total(&self, track: &TrackId) -> f64 {
        aggregate::track_total(&aggregate::measure_results(&self.catalog, &self.state, track))
    }

    /// Mean of the track's scored measure points.
    pub fn track_average(&self, track: &TrackId) -> f64 {
        aggregate::track_average(&aggregate::measure_results(&self.catalog, &self.state, track))
    }

    /// Clinician-weighted score across every track in the plan.
    pub fn overall_score(&self, reduction: TrackReduction) -> f64 {
        let weights = self.plan_tracks().into_iter().map(|track| {
            let results = aggregate::measure_results(&self.catalog, &self.state, &track);
            TrackWeight {
                clinicians: self.state.clinician_count(&track),
                selected_measures: self.state.selections(&track).len(),
                score: aggregate::reduce(&results, reduction),
            }
        });
        aggregate::overall_score(weights)
    }

    pub fn stats(&self) -> PlanStats {
        let total_clinicians = self.catalog.clinicians().len();
        let assigned = self
            .catalog
            .clinicians()
            .iter()
            .filter(|clinician| self.state.is_assigned(&clinician.npi))
            .count();

        PlanStats {
            total_clinicians,
            assigned,
            unassigned: total_clinicians - assigned,
            tracks: self.catalog.tracks().len(),
            active_tracks: self.state.active_tracks().len(),
            measures: self.catalog.measures().len(),
            benchmarks: self.catalog.benchmarks().len(),
            catalog_source: self.catalog.source(),
        }
    }

    /// Catalog clinicians not yet on any track, filtered by `query`.
    pub fn unassigned_clinicians(&self, query: &ClinicianQuery) -> Vec<&Clinician> {
        self.catalog
            .search_clinicians(query)
            .into_iter()
            .filter(|clinician| !self.state.is_assigned(&clinician.npi))
            .collect()
    }

    pub fn summary(&self) -> PlanSummary {
        let tracks = self
            .plan_tracks()
            .iter()
            .map(|track| self.track_summary(track))
            .collect();

        PlanSummary {
            stats: self.stats(),
            tracks,
            overall_average: self.overall_score(TrackReduction::Average),
            overall_total: self.overall_score(TrackReduction::Total),
        }
    }

    pub fn export(&self, timestamp: DateTime<Utc>) -> PlanExport {
        let stats = self.stats();
        PlanExport {
            timestamp,
            assignments: self.state.assignments_by_track(),
            selections: self.state.all_selections().clone(),
            summary: ExportSummary {
                total_clinicians: stats.total_clinicians,
                assigned: stats.assigned,
                unassigned: stats.unassigned,
                active_mvps: stats.active_tracks,
            },
        }
    }

    /// Save a full copy of the current state under `name`, replacing any
    /// scenario with the same name.
    pub fn save_scenario(
        &self,
        name: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<ScenarioSummary, ScenarioError> {
        let name = validate_name(name)?;
        let scenario = Scenario {
            name,
            saved_at,
            state: self.state.clone(),
        };
        let summary = scenario.summary();
        self.scenarios.save(scenario)?;
        info!(scenario = %summary.name, "scenario saved");
        Ok(summary)
    }

    /// Replace the whole plan state with a saved scenario. References the
    /// catalog no longer knows are kept and score as 0.
    pub fn restore_scenario(&mut self, name: &str) -> Result<PlanSummary, ScenarioError> {
        let name = validate_name(name)?;
        let scenario = self
            .scenarios
            .fetch(&name)?
            .ok_or_else(|| ScenarioError::NotFound(name.clone()))?;

        self.state = scenario.state;
        info!(scenario = %name, "scenario restored");
        Ok(self.summary())
    }

    pub fn list_scenarios(&self) -> Result<Vec<ScenarioSummary>, ScenarioError> {
        self.scenarios.list()
    }

    pub fn delete_scenario(&self, name: &str) -> Result<(), ScenarioError> {
        let name = validate_name(name)?;
        if self.scenarios.remove(&name)? {
            Ok(())
        } else {
            Err(ScenarioError::NotFound(name))
        }
    }

    /// Catalog tracks followed by any track only the plan state mentions.
    fn plan_tracks(&self) -> Vec<TrackId> {
        let mut seen: BTreeSet<TrackId> = BTreeSet::new();
        let mut tracks = Vec::new();
        let known = self.catalog.tracks().iter().map(|track| &track.id);
        let referenced = self
            .state
            .assignments()
            .values()
            .chain(self.state.all_selections().keys());

        for track in known.chain(referenced) {
            if seen.insert(track.clone()) {
                tracks.push(track.clone());
            }
        }
        tracks
    }

    fn selection_mut(
        &mut self,
        track: &TrackId,
        measure_id: &MeasureId,
    ) -> Result<&mut MeasureSelection, PlanError> {
        self.state
            .selection_mut(track, measure_id)
            .ok_or_else(|| PlanError::MeasureNotSelected {
                track: track.clone(),
                measure: measure_id.clone(),
            })
    }

    fn require_track(&self, track: &TrackId) -> Result<(), PlanError> {
        match self.catalog.track(track) {
            Some(_) => Ok(()),
            None => Err(PlanError::UnknownTrack(track.clone())),
        }
    }

    fn require_clinician(&self, npi: &Npi) -> Result<(), PlanError> {
        match self.catalog.clinician(npi) {
            Some(_) => Ok(()),
            None => Err(PlanError::UnknownClinician(npi.clone())),
        }
    }
}
