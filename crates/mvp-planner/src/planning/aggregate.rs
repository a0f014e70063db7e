use crate::catalog::Catalog;
use crate::domain::{MeasureId, TrackId};
use crate::scoring::DecileScore;
use serde::{Deserialize, Serialize};

use super::state::PlanState;

/// Which rate a measure was scored from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Recorded,
    Estimated,
}

/// How a track's measure points are reduced to one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackReduction {
    /// Sum of scored measure points ("total points").
    Total,
    /// Mean over scored measures ("composite").
    #[default]
    Average,
}

/// Scoring outcome for one selected measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureResult {
    pub measure_id: MeasureId,
    pub measure_name: Option<String>,
    pub collection_type: String,
    pub rate: Option<f64>,
    pub rate_source: Option<RateSource>,
    /// `None` until a rate or estimate exists, or when the measure is not in
    /// the catalog.
    pub score: Option<DecileScore>,
}

impl MeasureResult {
    pub fn points(&self) -> Option<f64> {
        self.score.map(|score| score.points)
    }
}

/// Score every selection on a track. Recorded performance wins over the
/// track estimate.
pub fn measure_results(catalog: &Catalog, state: &PlanState, track: &TrackId) -> Vec<MeasureResult> {
    state
        .selections(track)
        .iter()
        .map(|selection| {
            let known = catalog.measure(&selection.measure_id);
            let (rate, rate_source) = match state.performance_rate(track, &selection.measure_id) {
                Some(rate) => (Some(rate), Some(RateSource::Recorded)),
                None => match selection.estimated_rate {
                    Some(rate) => (Some(rate), Some(RateSource::Estimated)),
                    None => (None, None),
                },
            };

            let score = match (known, rate) {
                (Some(_), Some(rate)) => Some(catalog.engine().score(
                    &selection.measure_id,
                    &selection.collection_type,
                    rate,
                )),
                _ => None,
            };

            MeasureResult {
                measure_id: selection.measure_id.clone(),
                measure_name: known.map(|measure| measure.name.clone()),
                collection_type: selection.collection_type.clone(),
                rate,
                rate_source,
                score,
            }
        })
        .collect()
}

/// Sum of scored points; unscored measures contribute 0.
pub fn track_total(results: &[MeasureResult]) -> f64 {
    results.iter().filter_map(MeasureResult::points).sum()
}

/// Mean over scored measures only; 0 when nothing is scored yet.
pub fn track_average(results: &[MeasureResult]) -> f64 {
    let scored: Vec<f64> = results.iter().filter_map(MeasureResult::points).collect();
    if scored.is_empty() {
        return 0.0;
    }
    scored.iter().sum::<f64>() / scored.len() as f64
}

pub fn reduce(results: &[MeasureResult], reduction: TrackReduction) -> f64 {
    match reduction {
        TrackReduction::Total => track_total(results),
        TrackReduction::Average => track_average(results),
    }
}

/// One track's contribution to the cross-track score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackWeight {
    pub clinicians: usize,
    pub selected_measures: usize,
    pub score: f64,
}

/// Clinician-weighted mean of track scores. Tracks without clinicians or
/// without selected measures are left out entirely; 0 when none remain.
pub fn overall_score<I>(tracks: I) -> f64
where
    I: IntoIterator<Item = TrackWeight>,
{
    let (weighted, clinicians) = tracks
        .into_iter()
        .filter(|track| track.clinicians > 0 && track.selected_measures > 0)
        .fold((0.0, 0usize), |(weighted, clinicians), track| {
            (
                weighted + track.score * track.clinicians as f64,
                clinicians + track.clinicians,
            )
        });

    if clinicians == 0 {
        0.0
    } else {
        weighted / clinicians as f64
    }
}
