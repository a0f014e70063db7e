//! Read-only reference data: clinicians, program tracks, measures, and
//! benchmarks, ingested from loosely typed tabular feeds.

pub(crate) mod aliases;
mod demo;
mod normalizer;
pub(crate) mod parser;
mod records;

pub use parser::{parse_rows, TabularRow};

use crate::benchmarks::BenchmarkTable;
use crate::domain::{
    Clinician, Measure, MeasureId, Npi, Track, TrackId, DEFAULT_COLLECTION_TYPE,
};
use crate::scoring::ScoringEngine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Failure reading one of the catalog feeds.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {feed} feed at {path}: {source}")]
    Io {
        feed: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {feed} feed data: {source}")]
    Csv {
        feed: &'static str,
        #[source]
        source: csv::Error,
    },
}

/// Whether the catalog came from real feeds or the built-in demo data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    Feeds,
    Demo,
}

/// Already-parsed feed rows, one list per feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFeeds {
    #[serde(default)]
    pub clinicians: Vec<TabularRow>,
    #[serde(default)]
    pub tracks: Vec<TabularRow>,
    #[serde(default)]
    pub measures: Vec<TabularRow>,
    #[serde(default)]
    pub benchmarks: Vec<TabularRow>,
}

/// Filter used by the clinician search listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClinicianQuery {
    /// Case-insensitive substring of the name, or substring of the NPI.
    #[serde(default)]
    pub search: Option<String>,
    /// Exact specialty match.
    #[serde(default)]
    pub specialty: Option<String>,
}

impl ClinicianQuery {
    pub fn matches(&self, clinician: &Clinician) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                clinician.name.to_lowercase().contains(&term)
                    || clinician.npi.as_str().contains(&term)
            }
        };
        let matches_specialty = match self.specialty.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(specialty) => clinician.specialty == specialty,
        };
        matches_search && matches_specialty
    }
}

/// Immutable session catalog plus the scoring engine built over it.
#[derive(Debug, Clone)]
pub struct Catalog {
    clinicians: Vec<Clinician>,
    tracks: Vec<Track>,
    measures: Vec<Measure>,
    engine: ScoringEngine,
    source: CatalogSource,
}

impl Catalog {
    pub fn new(
        clinicians: Vec<Clinician>,
        tracks: Vec<Track>,
        measures: Vec<Measure>,
        benchmarks: BenchmarkTable,
    ) -> Self {
        let engine = ScoringEngine::new(benchmarks, &measures);
        Self {
            clinicians,
            tracks,
            measures,
            engine,
            source: CatalogSource::Feeds,
        }
    }

    /// Build from parsed feed rows; `benchmark_year` filters the benchmarks feed.
    pub fn from_feeds(feeds: &CatalogFeeds, benchmark_year: Option<u16>) -> Self {
        let clinicians = records::collect_unique(
            &feeds.clinicians,
            "clinicians",
            records::clinician_from_row,
            |clinician: &Clinician| clinician.npi.clone(),
        );
        let tracks = records::collect_unique(
            &feeds.tracks,
            "mvps",
            records::track_from_row,
            |track: &Track| track.id.clone(),
        );
        let measures = records::collect_unique(
            &feeds.measures,
            "measures",
            records::measure_from_row,
            |measure: &Measure| measure.id.clone(),
        );
        let benchmarks = BenchmarkTable::from_rows(&feeds.benchmarks, benchmark_year);

        Self::new(clinicians, tracks, measures, benchmarks)
    }

    pub fn demo() -> Self {
        let mut catalog = Self::new(
            demo::demo_clinicians(),
            demo::demo_tracks(),
            Vec::new(),
            BenchmarkTable::default(),
        );
        catalog.source = CatalogSource::Demo;
        catalog
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }

    pub fn clinicians(&self) -> &[Clinician] {
        &self.clinicians
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn benchmarks(&self) -> &BenchmarkTable {
        self.engine.benchmarks()
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn clinician(&self, npi: &Npi) -> Option<&Clinician> {
        self.clinicians.iter().find(|clinician| &clinician.npi == npi)
    }

    pub fn track(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|track| &track.id == id)
    }

    pub fn measure(&self, id: &MeasureId) -> Option<&Measure> {
        self.measures.iter().find(|measure| &measure.id == id)
    }

    /// Collection type used when a caller names none: the measure's first
    /// listed type, or the program default for unknown measures.
    pub fn default_collection_type(&self, id: &MeasureId) -> &str {
        self.measure(id)
            .map(Measure::default_collection_type)
            .unwrap_or(DEFAULT_COLLECTION_TYPE)
    }

    /// Measures tagged for a track in the measures feed.
    pub fn measures_for_track(&self, id: &TrackId) -> Vec<&Measure> {
        self.measures
            .iter()
            .filter(|measure| measure.track.as_ref() == Some(id))
            .collect()
    }

    pub fn search_clinicians(&self, query: &ClinicianQuery) -> Vec<&Clinician> {
        self.clinicians
            .iter()
            .filter(|clinician| query.matches(clinician))
            .collect()
    }

    /// Clinician count per specialty, sorted by specialty name.
    pub fn specialty_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for clinician in &self.clinicians {
            *counts.entry(clinician.specialty.clone()).or_insert(0) += 1;
        }
        counts
    }
}

const CLINICIANS_FILE: &str = "clinicians.csv";
const TRACKS_FILE: &str = "mvps.csv";
const MEASURES_FILE: &str = "measures.csv";
const BENCHMARKS_FILE: &str = "benchmarks.csv";

/// One-shot loader for CSV exports stored in a directory.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    dir: PathBuf,
    benchmark_year: Option<u16>,
}

impl CatalogLoader {
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            benchmark_year: None,
        }
    }

    pub fn with_benchmark_year(mut self, year: Option<u16>) -> Self {
        self.benchmark_year = year;
        self
    }

    /// Load every feed. The benchmarks export is optional; the others are not.
    pub fn load(&self) -> Result<Catalog, CatalogError> {
        let feeds = CatalogFeeds {
            clinicians: self.read_feed("clinicians", CLINICIANS_FILE)?,
            tracks: self.read_feed("mvps", TRACKS_FILE)?,
            measures: self.read_feed("measures", MEASURES_FILE)?,
            benchmarks: match self.read_feed("benchmarks", BENCHMARKS_FILE) {
                Ok(rows) => rows,
                Err(CatalogError::Io { source, .. })
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    warn!("no benchmarks export found; every measure will use the default ladder");
                    Vec::new()
                }
                Err(err) => return Err(err),
            },
        };

        let catalog = Catalog::from_feeds(&feeds, self.benchmark_year);
        info!(
            clinicians = catalog.clinicians().len(),
            tracks = catalog.tracks().len(),
            measures = catalog.measures().len(),
            benchmarks = catalog.benchmarks().len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Load, or fall back to the demo dataset when any required feed fails.
    pub fn load_or_demo(&self) -> Catalog {
        match self.load() {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(error = %err, "catalog load failed; using demo dataset");
                Catalog::demo()
            }
        }
    }

    fn read_feed(&self, feed: &'static str, file: &str) -> Result<Vec<TabularRow>, CatalogError> {
        let path = self.dir.join(file);
        let handle = std::fs::File::open(&path).map_err(|source| CatalogError::Io {
            feed,
            path: path.clone(),
            source,
        })?;
        read_rows(feed, handle)
    }
}

/// Parse one feed from any reader.
pub fn read_rows<R: Read>(feed: &'static str, reader: R) -> Result<Vec<TabularRow>, CatalogError> {
    parse_rows(reader).map_err(|source| CatalogError::Csv { feed, source })
}
