use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field names that resolve to the typed columns of a [`StatRow`].
pub const ENTITY_ID: &str = "entity_id";
pub const SEASON: &str = "season";
pub const WEEK: &str = "week";

/// A single field of a stat line: either a number that can be summed or a
/// descriptive string (name, position, team abbreviation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            FieldValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(value) => write!(f, "{}", value),
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// A (season, week) snapshot boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Checkpoint {
    pub season: i32,
    pub week: i32,
}

impl Checkpoint {
    pub fn new(season: i32, week: i32) -> Self {
        Self { season, week }
    }

    /// The checkpoint one week earlier in the same season. Week 1 maps to
    /// week 0, which no regular-season row can fall under.
    pub fn previous(&self) -> Self {
        Self {
            season: self.season,
            week: self.week - 1,
        }
    }

    /// Whether a game played at `season`/`week` is part of the season-to-date
    /// window ending at this checkpoint.
    pub fn covers_in_season(&self, season: i32, week: i32) -> bool {
        week > 0 && season == self.season && week <= self.week
    }

    /// Whether a game played at `season`/`week` is part of the all-time
    /// window ending at this checkpoint.
    pub fn covers_all_time(&self, season: i32, week: i32) -> bool {
        week > 0 && (season < self.season || (season == self.season && week <= self.week))
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}W{}", self.season, self.week)
    }
}

/// One per-game observation for a player or team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    pub entity_id: String,
    pub season: i32,
    pub week: i32,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl StatRow {
    pub fn new(entity_id: impl Into<String>, season: i32, week: i32) -> Self {
        Self {
            entity_id: entity_id.into(),
            season,
            week,
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Numeric field lookup; absent or textual fields read as 0.
    pub fn number(&self, name: &str) -> f64 {
        self.fields
            .get(name)
            .and_then(FieldValue::as_number)
            .unwrap_or_default()
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(FieldValue::as_text)
    }

    /// String form of a grouping field, including the typed columns.
    pub fn key_part(&self, name: &str) -> String {
        match name {
            ENTITY_ID => self.entity_id.clone(),
            SEASON => self.season.to_string(),
            WEEK => self.week.to_string(),
            other => self
                .fields
                .get(other)
                .map(|value| value.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.season, self.week)
    }
}

/// Summed result for one group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRecord {
    pub key: String,
    pub row: StatRow,
}

impl AggregatedRecord {
    pub fn number(&self, name: &str) -> f64 {
        self.row.number(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.row.text(name)
    }
}

/// Aggregation output, iterated in first-seen key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedRecords {
    records: Vec<AggregatedRecord>,
}

impl AggregatedRecords {
    pub(crate) fn from_records(records: Vec<AggregatedRecord>) -> Self {
        Self { records }
    }

    pub fn get(&self, key: &str) -> Option<&AggregatedRecord> {
        self.records.iter().find(|record| record.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggregatedRecord> {
        self.records.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_rows(self) -> Vec<StatRow> {
        self.records.into_iter().map(|record| record.row).collect()
    }
}

impl IntoIterator for AggregatedRecords {
    type Item = AggregatedRecord;
    type IntoIter = std::vec::IntoIter<AggregatedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
