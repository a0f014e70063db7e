use crate::domain::{split_list, Clinician, Npi, Track, TrackId};

/// Small built-in dataset used when the feeds cannot be loaded.
pub(crate) fn demo_clinicians() -> Vec<Clinician> {
    vec![
        Clinician {
            npi: Npi::from("1234567890"),
            name: "Dr. Smith".to_string(),
            specialty: "Family Practice".to_string(),
            tin: "123456789".to_string(),
            separate_ehr: false,
        },
        Clinician {
            npi: Npi::from("0987654321"),
            name: "Dr. Jones".to_string(),
            specialty: "Emergency Medicine".to_string(),
            tin: "123456789".to_string(),
            separate_ehr: false,
        },
    ]
}

pub(crate) fn demo_tracks() -> Vec<Track> {
    vec![
        Track {
            id: TrackId::from("M001"),
            name: "Primary Care MVP".to_string(),
            specialties: split_list("Family Practice, Internal Medicine"),
            measure_count: 8,
        },
        Track {
            id: TrackId::from("M002"),
            name: "Emergency Medicine MVP".to_string(),
            specialties: split_list("Emergency Medicine"),
            measure_count: 7,
        },
    ]
}
