use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::worktray::row::{Cell, Flag, TrayRow};
use crate::worktray::StageError;

/// Fixed column contract of the worktray file. Both the validator and the
/// submitter rely on this exact set; order matters on write.
pub const TRAY_COLUMNS: [&str; 7] = [
    "Name",
    "Product",
    "Amount",
    "RequestDate",
    "DataValid",
    "FormSubmitted",
    "Observations",
];

/// Business columns the raw input file must provide.
pub const INPUT_COLUMNS: [&str; 4] = ["Name", "Product", "Amount", "RequestDate"];

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("unrecognized status value '{0}'")]
    UnknownFlag(String),
}

/// One worktray line as stored on disk. Cell typing and status parsing live
/// in the conversions below; nothing outside this module sees raw strings.
#[derive(Debug, Deserialize, Serialize)]
pub struct TrayRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "RequestDate")]
    pub request_date: String,
    #[serde(rename = "DataValid")]
    pub data_valid: String,
    #[serde(rename = "FormSubmitted")]
    pub form_submitted: String,
    #[serde(rename = "Observations")]
    pub observations: String,
}

/// One raw input line. Extra columns in the input file are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InputRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "RequestDate")]
    pub request_date: String,
}

impl TryFrom<TrayRecord> for TrayRow {
    type Error = RecordError;

    fn try_from(record: TrayRecord) -> Result<TrayRow, RecordError> {
        let data_valid = Flag::decode(&record.data_valid)
            .ok_or_else(|| RecordError::UnknownFlag(record.data_valid.clone()))?;
        let form_submitted = Flag::decode(&record.form_submitted)
            .ok_or_else(|| RecordError::UnknownFlag(record.form_submitted.clone()))?;

        Ok(TrayRow {
            name: Cell::decode(&record.name),
            product: Cell::decode(&record.product),
            amount: Cell::decode(&record.amount),
            request_date: Cell::decode(&record.request_date),
            data_valid,
            form_submitted,
            observations: record.observations,
        })
    }
}

impl From<&InputRecord> for TrayRow {
    fn from(record: &InputRecord) -> TrayRow {
        TrayRow::pending(
            Cell::decode(&record.name),
            Cell::decode(&record.product),
            Cell::decode(&record.amount),
            Cell::decode(&record.request_date),
        )
    }
}

impl From<&TrayRow> for TrayRecord {
    fn from(row: &TrayRow) -> TrayRecord {
        TrayRecord {
            name: row.name.encode(),
            product: row.product.encode(),
            amount: row.amount.encode(),
            request_date: row.request_date.encode(),
            data_valid: row.data_valid.encode().to_string(),
            form_submitted: row.form_submitted.encode().to_string(),
            observations: row.observations.clone(),
        }
    }
}

pub fn open_reader(path: &Path) -> Result<csv::Reader<File>, StageError> {
    let file = File::open(path)?;
    Ok(csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file))
}

pub fn read_headers(path: &Path) -> Result<Vec<String>, StageError> {
    let mut reader = open_reader(path)?;
    Ok(reader.headers()?.iter().map(str::to_string).collect())
}

pub fn read_input(path: &Path) -> Result<Vec<InputRecord>, StageError> {
    let mut reader = open_reader(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize::<InputRecord>() {
        records.push(record?);
    }
    Ok(records)
}
