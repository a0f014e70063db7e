use super::aliases::Field;
use super::parser::TabularRow;
use crate::domain::{
    split_list, Clinician, Direction, ImplementationProfile, Measure, MeasureId, MeasureStatus,
    Npi, Track, TrackId,
};
use std::collections::HashMap;
use tracing::debug;

const UNKNOWN: &str = "Unknown";

pub(crate) fn clinician_from_row(row: &TabularRow) -> Option<Clinician> {
    let npi = row.text(Field::ClinicianNpi)?;

    Some(Clinician {
        npi: Npi::from(npi),
        name: row
            .text(Field::ClinicianName)
            .unwrap_or_else(|| UNKNOWN.to_string()),
        specialty: row
            .text(Field::ClinicianSpecialty)
            .unwrap_or_else(|| UNKNOWN.to_string()),
        tin: row.text(Field::ClinicianTin).unwrap_or_default(),
        separate_ehr: row.flag(Field::ClinicianSeparateEhr).unwrap_or(false),
    })
}

pub(crate) fn track_from_row(row: &TabularRow) -> Option<Track> {
    let id = row.text(Field::TrackId)?;

    Some(Track {
        name: row.text(Field::TrackName).unwrap_or_else(|| id.clone()),
        id: TrackId::from(id),
        specialties: row
            .field(Field::TrackSpecialties)
            .map(split_list)
            .unwrap_or_default(),
        measure_count: row
            .number(Field::TrackMeasureCount)
            .filter(|count| *count >= 0.0)
            .map(|count| count as u32)
            .unwrap_or(0),
    })
}

pub(crate) fn measure_from_row(row: &TabularRow) -> Option<Measure> {
    let id = row.text(Field::MeasureId)?;

    let status = match row.flag(Field::MeasureActive) {
        Some(true) => MeasureStatus::Active,
        _ => MeasureStatus::New,
    };

    Some(Measure {
        name: row.text(Field::MeasureName).unwrap_or_else(|| id.clone()),
        id: MeasureId::from(id),
        status,
        collection_types: row
            .field(Field::MeasureCollectionTypes)
            .map(split_list)
            .unwrap_or_default(),
        direction: row
            .flag(Field::MeasureInverse)
            .map(Direction::from_inverse_flag),
        track: row.text(Field::MeasureTrack).map(TrackId::from),
        implementation: ImplementationProfile {
            setup_time: row.text(Field::MeasureSetupTime),
            readiness: row
                .number(Field::MeasureReadiness)
                .map(|score| score.round().clamp(1.0, 5.0) as u8),
            prerequisites: row.text(Field::MeasurePrerequisites),
        },
    })
}

/// Convert rows with `convert`, dropping rows it rejects and keeping the last
/// record for each key.
pub(crate) fn collect_unique<T, K, C, F>(
    rows: &[TabularRow],
    feed: &'static str,
    convert: C,
    key: F,
) -> Vec<T>
where
    K: std::hash::Hash + Eq,
    C: Fn(&TabularRow) -> Option<T>,
    F: Fn(&T) -> K,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut records: Vec<T> = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(record) = convert(row) else {
            debug!(feed, "skipping row without an identifier");
            continue;
        };

        match positions.get(&key(&record)) {
            Some(&position) => records[position] = record,
            None => {
                positions.insert(key(&record), records.len());
                records.push(record);
            }
        }
    }

    records
}
