use thiserror::Error;

pub mod ingest;
pub mod row;
pub mod submit;
pub mod tray;
pub mod validate;


/// A stage-level failure. Per-row problems never surface here; they are
/// recorded into the row itself. Anything of this type aborts the whole
/// stage and halts the run, leaving the last-saved tray on disk.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Record(#[from] crate::data::RecordError),
    #[error("input file is missing required columns: {0}")]
    InputFormat(String),
    #[error("invalid rule pattern: {0}")]
    Pattern(String),
}
