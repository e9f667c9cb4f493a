use std::path::PathBuf;
use thiserror::Error;

/// Conditions a caller may want to branch on.
/// Everything else travels as a plain `anyhow::Error` with context.
#[derive(Error, Debug)]
pub enum ElevJoinError {
    #[error("column '{column}' not found in {path:?} (available: {available:?})")]
    MissingColumn {
        column: String,
        path: PathBuf,
        available: Vec<String>,
    },

    #[error("row {row}: value '{value}' in column '{column}' is not a number")]
    InvalidCoordinate {
        row: usize,
        column: String,
        value: String,
    },

    #[error("output {0:?} already exists (pass overwrite to replace it)")]
    OutputExists(PathBuf),

    #[error("no elevation returned for {} point(s): {ids:?}", .ids.len())]
    MissingElevation { ids: Vec<u64> },

    #[error("sampling response contains point_id {0} more than once")]
    DuplicatePointId(u64),

    #[error("sampling response contains point_id {0} which was never submitted")]
    UnexpectedPointId(u64),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("Earth Engine API returned error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed sampling response: {0}")]
    MalformedResponse(String),

    #[error("unsupported output format for {0:?} (use .shp, .geojson or .json)")]
    UnsupportedOutputFormat(PathBuf),
}
