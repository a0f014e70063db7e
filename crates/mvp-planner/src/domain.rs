use std::fmt;

use serde::{Deserialize, Serialize};

/// National provider identifier wrapper for clinicians.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Npi(pub String);

/// Identifier wrapper for program tracks (MVPs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub String);

/// Identifier wrapper for quality measures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeasureId(pub String);

macro_rules! id_conversions {
    ($name:ident) => {
        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.trim().to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value.trim().to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

id_conversions!(Npi);
id_conversions!(TrackId);
id_conversions!(MeasureId);

/// Collection type applied when neither the selection nor the catalog names one.
pub const DEFAULT_COLLECTION_TYPE: &str = "MIPS CQM";

/// Whether a higher or a lower performance rate is the better outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Higher rate is better.
    #[default]
    Normal,
    /// Lower rate is better.
    Inverse,
}

impl Direction {
    pub fn from_inverse_flag(inverse: bool) -> Self {
        if inverse {
            Self::Inverse
        } else {
            Self::Normal
        }
    }
}

/// Billable clinician loaded from the clinicians feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clinician {
    pub npi: Npi,
    pub name: String,
    pub specialty: String,
    pub tin: String,
    pub separate_ehr: bool,
}

/// Program track a group of clinicians reports against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub specialties: Vec<String>,
    pub measure_count: u32,
}

impl Track {
    pub fn accepts_specialty(&self, specialty: &str) -> bool {
        self.specialties
            .iter()
            .any(|eligible| eligible.eq_ignore_ascii_case(specialty.trim()))
    }
}

/// Activation status of a measure within the group's reporting history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureStatus {
    Active,
    #[default]
    New,
}

/// Rollout metadata carried for planning displays. Not consulted by scoring.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImplementationProfile {
    pub setup_time: Option<String>,
    pub readiness: Option<u8>,
    pub prerequisites: Option<String>,
}

/// Quality measure from the measures feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measure {
    pub id: MeasureId,
    pub name: String,
    pub status: MeasureStatus,
    pub collection_types: Vec<String>,
    /// `None` when the feed leaves directionality blank.
    pub direction: Option<Direction>,
    pub track: Option<TrackId>,
    pub implementation: ImplementationProfile,
}

impl Measure {
    pub fn default_collection_type(&self) -> &str {
        self.collection_types
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_COLLECTION_TYPE)
    }

    pub fn supports_collection_type(&self, collection_type: &str) -> bool {
        self.collection_types.is_empty()
            || self
                .collection_types
                .iter()
                .any(|known| known.trim().eq_ignore_ascii_case(collection_type.trim()))
    }
}

/// Split a comma separated cell into trimmed, non-empty entries.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
