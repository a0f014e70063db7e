use super::normalizer::normalize_header;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Logical columns the feeds are read through. Each resolves to the first
/// populated alias present on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Field {
    ClinicianNpi,
    ClinicianName,
    ClinicianSpecialty,
    ClinicianTin,
    ClinicianSeparateEhr,
    TrackId,
    TrackName,
    TrackSpecialties,
    TrackMeasureCount,
    MeasureId,
    MeasureName,
    MeasureActive,
    MeasureCollectionTypes,
    MeasureInverse,
    MeasureReadiness,
    MeasureSetupTime,
    MeasurePrerequisites,
    MeasureTrack,
    BenchmarkMeasureId,
    BenchmarkCollectionType,
    BenchmarkInverse,
    BenchmarkDecile(u8),
    BenchmarkMean,
    BenchmarkMedian,
    BenchmarkYear,
}

static FIELD_ALIASES: OnceLock<HashMap<Field, Vec<String>>> = OnceLock::new();

pub(crate) fn aliases_for(field: Field) -> &'static [String] {
    field_aliases()
        .get(&field)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn field_aliases() -> &'static HashMap<Field, Vec<String>> {
    FIELD_ALIASES.get_or_init(|| {
        const FIELD_TO_ALIASES: &[(Field, &[&str])] = &[
            // Clinicians
            (Field::ClinicianNpi, &["npi", "NPI", "provider_npi", "Provider NPI"]),
            (
                Field::ClinicianName,
                &["name", "Name", "clinician_name", "provider_name"],
            ),
            (
                Field::ClinicianSpecialty,
                &["specialty", "Specialty", "primary_specialty"],
            ),
            (Field::ClinicianTin, &["tin", "TIN", "billing_tin"]),
            (
                Field::ClinicianSeparateEhr,
                &["separate_ehr", "Separate EHR"],
            ),
            // Program tracks
            (Field::TrackId, &["mvp_id", "MVP ID", "id"]),
            (Field::TrackName, &["mvp_name", "MVP Name", "name"]),
            (
                Field::TrackSpecialties,
                &["specialties", "Eligible Specialties"],
            ),
            (
                Field::TrackMeasureCount,
                &["measure_count", "Available Measures"],
            ),
            // Measures
            (
                Field::MeasureId,
                &["measure_id", "Measure ID", "quality_id", "id", "measure"],
            ),
            (
                Field::MeasureName,
                &["measure_name", "Measure Name", "name", "title"],
            ),
            (Field::MeasureActive, &["is_active", "active", "status"]),
            (
                Field::MeasureCollectionTypes,
                &["collection_types", "Collection Types", "collection_type"],
            ),
            (
                Field::MeasureInverse,
                &["is_inverse", "inverse", "inverse_measure", "direction"],
            ),
            (Field::MeasureReadiness, &["readiness", "readiness_score"]),
            (Field::MeasureSetupTime, &["setup_time", "setup_duration"]),
            (Field::MeasurePrerequisites, &["prerequisites"]),
            (Field::MeasureTrack, &["mvp_id", "MVP ID", "mvp"]),
            // Benchmarks
            (
                Field::BenchmarkMeasureId,
                &["measure_id", "Measure ID", "quality_id", "id"],
            ),
            (
                Field::BenchmarkCollectionType,
                &["collection_type", "Collection Type", "submission_method"],
            ),
            (
                Field::BenchmarkInverse,
                &["is_inverse", "inverse", "Inverse Measure", "direction"],
            ),
            (Field::BenchmarkMean, &["mean", "average"]),
            (Field::BenchmarkMedian, &["median"]),
            (
                Field::BenchmarkYear,
                &["year", "benchmark_year", "program_year"],
            ),
        ];

        let mut map: HashMap<Field, Vec<String>> =
            HashMap::with_capacity(FIELD_TO_ALIASES.len() + 10);
        for (field, aliases) in FIELD_TO_ALIASES {
            map.insert(*field, normalized(aliases.iter().copied()));
        }

        for decile in 1..=10u8 {
            let aliases = [
                format!("decile_{decile}"),
                format!("Decile {decile}"),
                format!("decile{decile}"),
                format!("d{decile}"),
                format!("p{}", u16::from(decile) * 10),
            ];
            map.insert(
                Field::BenchmarkDecile(decile),
                normalized(aliases.iter().map(String::as_str)),
            );
        }

        map
    })
}

fn normalized<'a>(aliases: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut resolved: Vec<String> = Vec::new();
    for alias in aliases {
        let alias = normalize_header(alias);
        if !resolved.contains(&alias) {
            resolved.push(alias);
        }
    }
    resolved
}

#[cfg(test)]
pub(crate) fn aliases_for_tests(field: Field) -> Vec<String> {
    aliases_for(field).to_vec()
}
