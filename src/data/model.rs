use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Origin – the categorical key behind the pie chart
// ---------------------------------------------------------------------------

/// Region a vehicle was manufactured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Origin {
    American,
    European,
    Japanese,
}

impl Origin {
    /// Canonical display order, also the heatmap's row domain.
    pub const ALL: [Origin; 3] = [Origin::American, Origin::European, Origin::Japanese];

    pub fn as_str(self) -> &'static str {
        match self {
            Origin::American => "American",
            Origin::European => "European",
            Origin::Japanese => "Japanese",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Origin {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Origin::ALL
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| FieldError::UnknownOrigin(trimmed.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Field errors
// ---------------------------------------------------------------------------

/// Why a single cell could not be turned into a [`Record`] field.
#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("column '{column}': '{value}' is not a number")]
    NotANumber { column: &'static str, value: String },

    #[error("column '{column}': '{value}' is not an integer")]
    NotAnInteger { column: &'static str, value: String },

    #[error("unknown origin '{0}' (expected American, European or Japanese)")]
    UnknownOrigin(String),
}

// ---------------------------------------------------------------------------
// RawRow – one row of text cells, as read from any file format
// ---------------------------------------------------------------------------

/// Unparsed cells of one input row, keyed by the dataset's header names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
    #[serde(rename = "MPG")]
    pub mpg: String,
    #[serde(rename = "Horsepower")]
    pub horsepower: String,
    #[serde(rename = "Weight")]
    pub weight: String,
    #[serde(rename = "Model Year")]
    pub model_year: String,
    #[serde(rename = "Cylinders")]
    pub cylinders: String,
    #[serde(rename = "Origin")]
    pub origin: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Header names every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "MPG",
    "Horsepower",
    "Weight",
    "Model Year",
    "Cylinders",
    "Origin",
    "Name",
];

// ---------------------------------------------------------------------------
// Record – one parsed vehicle
// ---------------------------------------------------------------------------

/// A single vehicle entry. Immutable once the store is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub mpg: f64,
    pub horsepower: f64,
    pub weight: f64,
    pub model_year: i32,
    pub cylinders: u32,
    pub origin: Origin,
    pub name: String,
}

impl Record {
    /// Parse every declared numeric field. Non-finite values count as malformed.
    pub fn from_raw(raw: &RawRow) -> Result<Self, FieldError> {
        Ok(Record {
            mpg: parse_float("MPG", &raw.mpg)?,
            horsepower: parse_float("Horsepower", &raw.horsepower)?,
            weight: parse_float("Weight", &raw.weight)?,
            model_year: normalize_year(parse_int("Model Year", &raw.model_year)?),
            cylinders: parse_int("Cylinders", &raw.cylinders)?,
            origin: raw.origin.parse()?,
            name: raw.name.trim().to_string(),
        })
    }
}

fn parse_float(column: &'static str, value: &str) -> Result<f64, FieldError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FieldError::NotANumber {
            column,
            value: value.to_string(),
        })
}

/// Integers may arrive as `"8"` or, from JSON/Parquet floats, as `"8.0"`.
fn parse_int<T>(column: &'static str, value: &str) -> Result<T, FieldError>
where
    T: FromStr + TryFrom<i64>,
{
    let trimmed = value.trim();
    let err = || FieldError::NotAnInteger {
        column,
        value: value.to_string(),
    };
    if let Ok(v) = trimmed.parse::<T>() {
        return Ok(v);
    }
    let f = trimmed.parse::<f64>().map_err(|_| err())?;
    if f.fract() != 0.0 || !f.is_finite() {
        return Err(err());
    }
    T::try_from(f as i64).map_err(|_| err())
}

/// Two-digit model years (`70`) are 20th-century years.
fn normalize_year(year: i32) -> i32 {
    if (0..100).contains(&year) {
        1900 + year
    } else {
        year
    }
}

// ---------------------------------------------------------------------------
// RecordStore – the write-once source of truth
// ---------------------------------------------------------------------------

/// How malformed rows are treated while building a [`RecordStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericPolicy {
    /// Abort the load on the first malformed row.
    #[default]
    Strict,
    /// Drop malformed rows and keep loading.
    SkipRow,
}

/// A row that could not be parsed. `row` is 1-based over data rows.
#[derive(Debug, Error, PartialEq)]
#[error("row {row}: {error}")]
pub struct RowError {
    pub row: usize,
    pub error: FieldError,
}

/// All records of the dataset in file order. There is no way to mutate it.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    skipped: usize,
}

impl RecordStore {
    /// Parse raw rows into a store according to `policy`.
    pub fn load<I>(raw_rows: I, policy: NumericPolicy) -> Result<Self, RowError>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut records = Vec::new();
        let mut skipped = 0;

        for (i, raw) in raw_rows.into_iter().enumerate() {
            match Record::from_raw(&raw) {
                Ok(rec) => records.push(rec),
                Err(error) => {
                    let err = RowError { row: i + 1, error };
                    match policy {
                        NumericPolicy::Strict => return Err(err),
                        NumericPolicy::SkipRow => {
                            log::warn!("Skipping malformed {err}");
                            skipped += 1;
                        }
                    }
                }
            }
        }

        Ok(RecordStore { records, skipped })
    }

    /// Build directly from already-parsed records.
    #[cfg(test)]
    pub fn from_records(records: Vec<Record>) -> Self {
        RecordStore {
            records,
            skipped: 0,
        }
    }

    /// Read-only view in insertion order.
    pub fn all(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows dropped under [`NumericPolicy::SkipRow`].
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Distinct model years, ascending. Feeds the year selector.
    pub fn model_years(&self) -> Vec<i32> {
        distinct_years(self.records.iter())
    }
}

/// Distinct model years of `records`, ascending.
pub fn distinct_years<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<i32> {
    let mut years: Vec<i32> = records.into_iter().map(|r| r.model_year).collect();
    years.sort_unstable();
    years.dedup();
    years
}
