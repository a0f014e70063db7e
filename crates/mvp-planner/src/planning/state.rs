use crate::domain::{MeasureId, Npi, TrackId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::PlanError;

/// Hard cap on measures a single track may select.
pub const MAX_SELECTED_MEASURES: usize = 4;

/// A measure chosen for a track, with its submission method and planning notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureSelection {
    pub measure_id: MeasureId,
    pub collection_type: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub readiness: Option<String>,
    /// Track-level estimate used until clinician performance is recorded.
    #[serde(default)]
    pub estimated_rate: Option<f64>,
}

impl MeasureSelection {
    pub fn new(measure_id: MeasureId, collection_type: impl Into<String>) -> Self {
        Self {
            measure_id,
            collection_type: collection_type.into(),
            difficulty: None,
            readiness: None,
            estimated_rate: None,
        }
    }
}

/// Mutable planning state: assignments, selections, and recorded performance.
/// Cloning yields an independent full copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanState {
    #[serde(default)]
    assignments: BTreeMap<Npi, TrackId>,
    #[serde(default)]
    selections: BTreeMap<TrackId, Vec<MeasureSelection>>,
    #[serde(default)]
    performance: BTreeMap<TrackId, BTreeMap<MeasureId, BTreeMap<Npi, f64>>>,
}

impl PlanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a clinician, removing any previous assignment. Returns the
    /// track the clinician was moved from.
    pub fn assign(&mut self, npi: Npi, track: TrackId) -> Option<TrackId> {
        self.assignments
            .insert(npi, track.clone())
            .filter(|previous| previous != &track)
    }

    pub fn unassign(&mut self, npi: &Npi) -> Option<TrackId> {
        self.assignments.remove(npi)
    }

    pub fn track_of(&self, npi: &Npi) -> Option<&TrackId> {
        self.assignments.get(npi)
    }

    pub fn is_assigned(&self, npi: &Npi) -> bool {
        self.assignments.contains_key(npi)
    }

    pub fn assignments(&self) -> &BTreeMap<Npi, TrackId> {
        &self.assignments
    }

    pub fn clinicians_in(&self, track: &TrackId) -> Vec<&Npi> {
        self.assignments
            .iter()
            .filter(|(_, assigned)| *assigned == track)
            .map(|(npi, _)| npi)
            .collect()
    }

    pub fn clinician_count(&self, track: &TrackId) -> usize {
        self.assignments
            .values()
            .filter(|assigned| *assigned == track)
            .count()
    }

    /// Clinicians grouped by track, for exports.
    pub fn assignments_by_track(&self) -> BTreeMap<TrackId, Vec<Npi>> {
        let mut grouped: BTreeMap<TrackId, Vec<Npi>> = BTreeMap::new();
        for (npi, track) in &self.assignments {
            grouped.entry(track.clone()).or_default().push(npi.clone());
        }
        grouped
    }

    pub fn selections(&self, track: &TrackId) -> &[MeasureSelection] {
        self.selections
            .get(track)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn all_selections(&self) -> &BTreeMap<TrackId, Vec<MeasureSelection>> {
        &self.selections
    }

    pub fn selection(&self, track: &TrackId, measure: &MeasureId) -> Option<&MeasureSelection> {
        self.selections(track)
            .iter()
            .find(|selection| &selection.measure_id == measure)
    }

    /// Add a selection, or replace an existing selection of the same measure.
    /// A new measure beyond the cap is rejected and nothing changes.
    pub fn select_measure(
        &mut self,
        track: &TrackId,
        selection: MeasureSelection,
    ) -> Result<(), PlanError> {
        let selected = self.selections.entry(track.clone()).or_default();

        if let Some(existing) = selected
            .iter_mut()
            .find(|existing| existing.measure_id == selection.measure_id)
        {
            *existing = selection;
            return Ok(());
        }

        if selected.len() >= MAX_SELECTED_MEASURES {
            return Err(PlanError::SelectionCapacity {
                track: track.clone(),
                limit: MAX_SELECTED_MEASURES,
            });
        }

        selected.push(selection);
        Ok(())
    }

    pub fn deselect_measure(&mut self, track: &TrackId, measure: &MeasureId) -> bool {
        let Some(selected) = self.selections.get_mut(track) else {
            return false;
        };
        let before = selected.len();
        selected.retain(|selection| &selection.measure_id != measure);
        let removed = selected.len() != before;
        if selected.is_empty() {
            self.selections.remove(track);
        }
        removed
    }

    pub(crate) fn selection_mut(
        &mut self,
        track: &TrackId,
        measure: &MeasureId,
    ) -> Option<&mut MeasureSelection> {
        self.selections
            .get_mut(track)?
            .iter_mut()
            .find(|selection| &selection.measure_id == measure)
    }

    /// Record a clinician's rate. Last write wins.
    pub fn record_performance(&mut self, track: &TrackId, measure: &MeasureId, npi: &Npi, rate: f64) {
        self.performance
            .entry(track.clone())
            .or_default()
            .entry(measure.clone())
            .or_default()
            .insert(npi.clone(), rate);
    }

    pub fn performance(&self, track: &TrackId, measure: &MeasureId, npi: &Npi) -> Option<f64> {
        self.performance.get(track)?.get(measure)?.get(npi).copied()
    }

    /// Mean of the recorded rates of clinicians currently on the track.
    /// Records of clinicians moved elsewhere are kept but do not count.
    pub fn performance_rate(&self, track: &TrackId, measure: &MeasureId) -> Option<f64> {
        let rates: Vec<f64> = self
            .performance
            .get(track)?
            .get(measure)?
            .iter()
            .filter(|(npi, _)| self.track_of(npi) == Some(track))
            .map(|(_, rate)| *rate)
            .collect();
        if rates.is_empty() {
            return None;
        }
        Some(rates.iter().sum::<f64>() / rates.len() as f64)
    }

    /// Tracks with at least one assigned clinician.
    pub fn active_tracks(&self) -> Vec<&TrackId> {
        let mut tracks: Vec<&TrackId> = self.assignments.values().collect();
        tracks.sort();
        tracks.dedup();
        tracks
    }
}
