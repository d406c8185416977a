use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const MAX_QUALITY_SCORE: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Chat,
    Instruction,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Chat => "chat",
            EntryKind::Instruction => "instruction",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported entry type: {0}")]
pub struct UnknownEntryKind(pub String);

impl FromStr for EntryKind {
    type Err = UnknownEntryKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(EntryKind::Chat),
            "instruction" => Ok(EntryKind::Instruction),
            other => Err(UnknownEntryKind(other.to_string())),
        }
    }
}

/// One curated training example. Never mutated once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default = "new_entry_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Raw payload as submitted; this is what gets exported.
    pub data: serde_json::Value,
    #[serde(default = "Utc::now", with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_quality_score", deserialize_with = "clamped_score")]
    pub quality_score: u8,
}

impl Entry {
    pub fn new(kind: EntryKind, data: serde_json::Value, quality_score: u8) -> Self {
        Self {
            id: new_entry_id(),
            kind,
            data,
            timestamp: Utc::now(),
            quality_score: quality_score.min(MAX_QUALITY_SCORE),
        }
    }
}

/// Transient output of the validator; not persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// 0..=100
    pub quality_score: u8,
    /// Blocking problems; any entry here means `passes` is false.
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub passes: bool,
}

impl ValidationResult {
    pub fn perfect() -> Self {
        Self {
            quality_score: MAX_QUALITY_SCORE,
            issues: vec![],
            warnings: vec![],
            passes: true,
        }
    }
}

pub fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_quality_score() -> u8 {
    MAX_QUALITY_SCORE
}

/// Null reads as the default score.
fn clamped_score<'de, D>(de: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<f64>::deserialize(de)? {
        Some(raw) => raw.round().clamp(0.0, MAX_QUALITY_SCORE as f64) as u8,
        None => MAX_QUALITY_SCORE,
    })
}

/// RFC 3339 on the way out; RFC 3339 or naive ISO-8601 (read as UTC) on the way in.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(de)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&s) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| D::Error::custom(format!("invalid timestamp {s:?}: {e}")))
    }
}
