use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::errors::ElevJoinError;
use crate::geo_core::KeyedPoint;

/// One data row of the input CSV
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateRecord {
    /// 1-based data row number (the header is not counted)
    pub row: usize,
    pub x: f64,
    pub y: f64,
    /// Remaining columns, in header order
    pub extra: Vec<String>,
}

/// The input CSV held fully in memory, in file order
#[derive(Debug, Clone, Default)]
pub struct CoordinateTable {
    pub headers: Vec<String>,
    pub records: Vec<CoordinateRecord>,
}

/// How to read the CSV
#[derive(Debug, Clone)]
pub struct TableOptions<'a> {
    pub x_name: &'a str,
    pub y_name: &'a str,
    pub delimiter: u8,
    pub encoding: &'a str,
}

impl Default for TableOptions<'_> {
    fn default() -> Self {
        TableOptions {
            x_name: "X",
            y_name: "Y",
            delimiter: b',',
            encoding: "utf-8",
        }
    }
}

impl CoordinateTable {
    /// Read the whole CSV at `path`, decoding it with the configured encoding first
    pub fn from_path(path: &Path, options: &TableOptions) -> Result<Self> {
        let file = File::open(path).context(format!("Failed to open CSV file: {:?}", path))?;

        let mut buffer = Vec::new();
        BufReader::new(file)
            .read_to_end(&mut buffer)
            .context(format!("Failed to read CSV file: {:?}", path))?;

        let encoding = encoding_rs::Encoding::for_label(options.encoding.as_bytes())
            .context(format!("Unknown text encoding: {}", options.encoding))?;
        let (decoded, _, had_errors) = encoding.decode(&buffer);
        if had_errors {
            tracing::warn!(
                "CSV {:?} contains bytes that are invalid in {}, replaced",
                path,
                encoding.name()
            );
        }

        Self::from_str_with(decoded.as_ref(), path, options)
    }

    /// Parse CSV text. `source` only labels errors.
    pub fn from_str_with(text: &str, source: &Path, options: &TableOptions) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = rdr
            .headers()
            .context(format!("Failed to read CSV header of {:?}", source))?
            .iter()
            .map(str::to_string)
            .collect();

        let x_idx = column_index(&headers, options.x_name, source)?;
        let y_idx = column_index(&headers, options.y_name, source)?;

        let mut records = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let row = i + 1;
            let record = result.context(format!("Failed to read CSV row {} of {:?}", row, source))?;
            let x = parse_coordinate(&record, x_idx, options.x_name, row)?;
            let y = parse_coordinate(&record, y_idx, options.y_name, row)?;
            let extra = record
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != x_idx && *idx != y_idx)
                .map(|(_, v)| v.to_string())
                .collect();
            records.push(CoordinateRecord { row, x, y, extra });
        }

        Ok(CoordinateTable { headers, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One keyed point per row, the key being the zero-based row index
    pub fn to_points(&self) -> Vec<KeyedPoint> {
        self.records
            .iter()
            .enumerate()
            .map(|(idx, r)| KeyedPoint::new(idx as u64, r.x, r.y))
            .collect()
    }
}

fn column_index(headers: &[String], name: &str, source: &Path) -> Result<usize> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        ElevJoinError::MissingColumn {
            column: name.to_string(),
            path: source.to_path_buf(),
            available: headers.to_vec(),
        }
        .into()
    })
}

fn parse_coordinate(record: &StringRecord, idx: usize, column: &str, row: usize) -> Result<f64> {
    let value = record.get(idx).unwrap_or("");
    // "NaN" and "inf" parse as f64 but are not coordinates
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            ElevJoinError::InvalidCoordinate {
                row,
                column: column.to_string(),
                value: value.to_string(),
            }
            .into()
        })
}
