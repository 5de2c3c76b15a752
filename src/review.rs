//! User review records, as stored in the review table

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Timestamp layout of the review table
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One user review
///
/// Field names follow the headers of the historical review spreadsheet, which
/// downstream tooling still expects.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Review {
    /// Total playtime of the author, in minutes
    #[serde(rename = "Horas Jogadas")]
    pub playtime_minutes: u64,

    /// Steam language code of the review
    #[serde(rename = "Idioma")]
    pub language: Box<str>,

    /// Review text
    #[serde(rename = "Review")]
    pub text: Box<str>,

    /// Truth that the author recommends the game
    #[serde(rename = "Recomendado")]
    pub recommended: bool,

    /// Number of users who found the review helpful
    #[serde(rename = "Votos Úteis")]
    pub helpful_votes: u64,

    /// Creation time of the review
    #[serde(rename = "Data da Review", serialize_with = "serialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}
//
impl Review {
    /// Identity used to detect duplicate reviews
    pub fn dedup_key(&self) -> (&str, Option<DateTime<Utc>>) {
        (&self.text, self.created_at)
    }
}

/// Review table row as found on disk
///
/// Every column is optional and every cell may be empty, since tables can also
/// come from hand-edited spreadsheet exports.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TableRow {
    #[serde(rename = "Horas Jogadas", default, deserialize_with = "deserialize_count")]
    playtime_minutes: Option<f64>,

    #[serde(rename = "Idioma", default)]
    language: Option<Box<str>>,

    #[serde(rename = "Review", default)]
    text: Option<Box<str>>,

    #[serde(rename = "Recomendado", default, deserialize_with = "deserialize_flag")]
    recommended: Option<bool>,

    #[serde(rename = "Votos Úteis", default, deserialize_with = "deserialize_count")]
    helpful_votes: Option<f64>,

    #[serde(rename = "Data da Review", default, deserialize_with = "deserialize_timestamp")]
    created_at: Option<DateTime<Utc>>,
}
//
impl From<TableRow> for Review {
    fn from(row: TableRow) -> Self {
        // Spreadsheet tools like to turn integer columns into floats
        let count = |x: Option<f64>| x.filter(|x| x.is_finite() && *x > 0.0).map_or(0, |x| x as u64);
        Self {
            playtime_minutes: count(row.playtime_minutes),
            language: row.language.unwrap_or_default(),
            text: row.text.unwrap_or_default(),
            recommended: row.recommended.unwrap_or(false),
            helpful_votes: count(row.helpful_votes),
            created_at: row.created_at,
        }
    }
}

/// Write timestamps in the review table layout
fn serialize_timestamp<S: Serializer>(
    timestamp: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match timestamp {
        Some(timestamp) => {
            serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
        }
        None => serializer.serialize_str(""),
    }
}

/// Read timestamps in the review table layout, RFC 3339 or Unix seconds
///
/// Unrecognized timestamps are logged and treated as missing.
fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let Some(cell) = Option::<Box<str>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(parse_timestamp(&cell).unwrap_or_else(|e| {
        log::warn!("Ignoring review date: {e}");
        None
    }))
}

/// Read counts, which spreadsheet tools may have turned into floats
///
/// Unrecognized counts are logged and treated as missing.
fn deserialize_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let Some(cell) = Option::<Box<str>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    Ok(cell
        .parse::<f64>()
        .map_err(|_| log::warn!("Ignoring count {cell:?}, which is not a number"))
        .ok())
}

/// Parse a timestamp cell
pub fn parse_timestamp(cell: &str) -> Result<Option<DateTime<Utc>>, String> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(cell, TIMESTAMP_FORMAT) {
        return Ok(Some(naive.and_utc()));
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(cell) {
        return Ok(Some(timestamp.with_timezone(&Utc)));
    }
    cell.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(Some)
        .ok_or_else(|| format!("{cell:?} is not a recognized timestamp"))
}

/// Read recommendation flags as written by us or by spreadsheet tools
///
/// Unrecognized flags are logged and treated as missing.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let Some(cell) = Option::<Box<str>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(parse_flag(&cell))
}

/// Parse a recommendation flag cell
fn parse_flag(cell: &str) -> Option<bool> {
    match &*cell.trim().to_lowercase() {
        "" => None,
        "true" | "1" | "1.0" | "yes" => Some(true),
        "false" | "0" | "0.0" | "no" => Some(false),
        other => {
            log::warn!("Ignoring recommendation flag {other:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps() {
        let expected = DateTime::from_timestamp(1_600_000_000, 0);
        assert_eq!(parse_timestamp("2020-09-13 12:26:40"), Ok(expected));
        assert_eq!(parse_timestamp("2020-09-13T12:26:40Z"), Ok(expected));
        assert_eq!(parse_timestamp("1600000000"), Ok(expected));
        assert_eq!(parse_timestamp("  "), Ok(None));
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn flags() {
        assert_eq!(parse_flag(" True "), Some(true));
        assert_eq!(parse_flag("0.0"), Some(false));
        assert_eq!(parse_flag(""), None);
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn lenient_rows() {
        let row = TableRow {
            playtime_minutes: Some(125.0),
            helpful_votes: Some(-3.0),
            text: Some("ok".into()),
            ..TableRow::default()
        };
        let review = Review::from(row);
        assert_eq!(review.playtime_minutes, 125);
        assert_eq!(review.helpful_votes, 0);
        assert_eq!(&*review.text, "ok");
        assert!(!review.recommended);
        assert_eq!(review.created_at, None);
    }
}
