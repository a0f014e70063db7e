use super::aliases::{aliases_for, Field};
use super::normalizer::{normalize_header, normalize_value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use tracing::debug;

/// Loosely typed feed row keyed by normalized column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, String>", into = "HashMap<String, String>")]
pub struct TabularRow {
    cells: HashMap<String, String>,
}

impl TabularRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: &str, value: &str) {
        self.cells
            .insert(normalize_header(column), normalize_value(value));
    }

    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.insert(column, value);
        self
    }

    /// Raw lookup by column name; the name is normalized first.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .get(&normalize_header(column))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn field(&self, field: Field) -> Option<&str> {
        aliases_for(field).iter().find_map(|alias| {
            self.cells
                .get(alias)
                .map(String::as_str)
                .filter(|value| !value.is_empty())
        })
    }

    pub(crate) fn text(&self, field: Field) -> Option<String> {
        self.field(field).map(str::to_string)
    }

    pub(crate) fn number(&self, field: Field) -> Option<f64> {
        self.field(field).and_then(parse_number)
    }

    pub(crate) fn flag(&self, field: Field) -> Option<bool> {
        self.field(field).and_then(parse_flag)
    }
}

impl From<HashMap<String, String>> for TabularRow {
    fn from(value: HashMap<String, String>) -> Self {
        value.into_iter().collect()
    }
}

impl From<TabularRow> for HashMap<String, String> {
    fn from(value: TabularRow) -> Self {
        value.cells
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for TabularRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = TabularRow::new();
        for (column, value) in iter {
            row.insert(column.as_ref(), value.as_ref());
        }
        row
    }
}

/// Read a CSV export into rows. Rows whose column count disagrees with the
/// header are skipped.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<TabularRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.len() != headers.len() {
            debug!(
                line = index + 2,
                expected = headers.len(),
                found = record.len(),
                "skipping feed row with mismatched column count"
            );
            continue;
        }

        let row: TabularRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.as_str(), value))
            .collect();
        if row.cells.values().all(String::is_empty) {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Lenient numeric parse: tolerates `%`, thousands separators, and padding.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim().trim_end_matches('%').trim();
    if trimmed.is_empty() {
        return None;
    }

    let cleaned = strip_grouping(trimmed)?;
    cleaned.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Drop thousands separators. Commas anywhere else, such as a decimal comma
/// in `72,5`, make the value unparseable.
fn strip_grouping(value: &str) -> Option<String> {
    let groups: Vec<&str> = value.split(',').collect();
    let Some((head, rest)) = groups.split_first() else {
        return Some(value.to_string());
    };
    if rest.is_empty() {
        return Some(value.to_string());
    }

    let lead = head.trim_start_matches(['-', '+']);
    if lead.is_empty() || lead.len() > 3 || !lead.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let last = rest.len() - 1;
    for (index, group) in rest.iter().enumerate() {
        let digits = if index == last {
            group.split('.').next().unwrap_or(group)
        } else {
            group
        };
        if digits.len() != 3 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }
    Some(groups.concat())
}

pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    let lowered = value.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "" => None,
        "y" | "yes" | "true" | "t" | "1" | "x" | "active" | "inverse" => Some(true),
        "n" | "no" | "false" | "f" | "0" | "new" | "inactive" | "normal" => Some(false),
        other if other.contains("inverse") || other.contains("lower") => Some(true),
        other if other.contains("higher") => Some(false),
        _ => None,
    }
}
