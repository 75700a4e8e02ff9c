use std::thread;
use std::time::Duration;

use log::{debug, error, info};
use thiserror::Error;

use super::row::{Flag, TrayRow};
use super::tray::Worktray;
use super::StageError;
use crate::config::{Config, FormFields};

pub const SUCCESS_MESSAGE: &str = "submission succeeded";
pub const FAILURE_MESSAGE: &str = "submission failed";
pub const NETWORK_ERROR_MESSAGE: &str = "network error";
pub const CLIENT_ERROR_MESSAGE: &str = "client error";

/// Request-layer failure, classified so the submitter can match
/// exhaustively instead of branching on exception types.
#[derive(Debug, Error)]
pub enum FormClientError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed")]
    Connection,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("{0}")]
    Other(String),
}

/// Field-id/value pairs, in the order the remote form expects them.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPayload {
    pub fields: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct FormResponse {
    pub status: u16,
    pub body: String,
}

impl FormResponse {
    /// Known fragility: a 200 without the marker on a partial failure, or a
    /// marker-less redirect, would be misclassified. The real endpoint has
    /// not confirmed a stronger signal.
    pub fn indicates_success(&self, marker: &str) -> bool {
        self.status == 200 || self.body.contains(marker)
    }
}

/// The one seam to the remote form. Production uses the blocking HTTP
/// client below; tests script the outcomes.
pub trait FormClient {
    fn post(&self, payload: &FormPayload) -> Result<FormResponse, FormClientError>;
}

pub struct HttpFormClient {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpFormClient {
    pub fn new(config: &Config) -> Result<HttpFormClient, FormClientError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| FormClientError::Other(err.to_string()))?;

        Ok(HttpFormClient {
            client,
            url: config.form_url.clone(),
        })
    }
}

impl FormClient for HttpFormClient {
    fn post(&self, payload: &FormPayload) -> Result<FormResponse, FormClientError> {
        let response = self
            .client
            .post(&self.url)
            .form(&payload.fields)
            .send()
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().map_err(classify)?;

        Ok(FormResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> FormClientError {
    if err.is_timeout() {
        FormClientError::Timeout
    } else if err.is_connect() {
        FormClientError::Connection
    } else if err.is_request() || err.is_body() || err.is_decode() {
        FormClientError::Transport(err.to_string())
    } else {
        FormClientError::Other(err.to_string())
    }
}

pub struct SubmitOptions {
    pub fields: FormFields,
    pub success_marker: String,
    pub throttle: Duration,
}

impl From<&Config> for SubmitOptions {
    fn from(config: &Config) -> SubmitOptions {
        SubmitOptions {
            fields: config.form_fields.clone(),
            success_marker: config.success_marker.clone(),
            throttle: config.submission_delay(),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SubmitReport {
    pub submitted: usize,
    pub failed: usize,
}

fn payload_for(row: &TrayRow, fields: &FormFields) -> FormPayload {
    FormPayload {
        fields: vec![
            (fields.name.clone(), row.name.encode()),
            (fields.product.clone(), row.product.encode()),
            (fields.amount.clone(), row.amount.encode()),
            (fields.request_date.clone(), row.request_date.encode()),
        ],
    }
}

/// Submits every eligible row to the remote form. Rows not validated are
/// counted as failures without a network call; rows already submitted are
/// counted as successes without a network call, so a re-run only retries
/// what actually failed. The tray is saved once, after the pass.
pub fn submit_worktray(
    tray: &mut Worktray,
    client: &impl FormClient,
    options: &SubmitOptions,
) -> Result<SubmitReport, StageError> {
    info!("submission pass over {} rows", tray.rows().len());
    let mut report = SubmitReport::default();

    for (index, row) in tray.rows_mut().iter_mut().enumerate() {
        if row.data_valid != Flag::Yes {
            debug!("row {index} skipped: data not valid");
            report.failed += 1;
            continue;
        }
        if row.form_submitted == Flag::Yes {
            debug!("row {index} skipped: already submitted");
            report.submitted += 1;
            continue;
        }

        let payload = payload_for(row, &options.fields);
        debug!("submitting row {index}");
        match client.post(&payload) {
            Ok(response) if response.indicates_success(&options.success_marker) => {
                debug!("row {index} submitted, status {}", response.status);
                row.record_submission(true, SUCCESS_MESSAGE);
                report.submitted += 1;
            },
            Ok(response) => {
                error!("row {index} rejected by the form, status {}", response.status);
                row.record_submission(false, FAILURE_MESSAGE);
                report.failed += 1;
            },
            Err(FormClientError::Timeout) | Err(FormClientError::Connection) => {
                error!("row {index} failed: network error");
                row.record_submission(false, NETWORK_ERROR_MESSAGE);
                report.failed += 1;
            },
            Err(FormClientError::Transport(reason)) => {
                error!("row {index} failed: transport error: {reason}");
                row.record_submission(false, CLIENT_ERROR_MESSAGE);
                report.failed += 1;
            },
            Err(FormClientError::Other(reason)) => {
                error!("row {index} failed: {reason}");
                row.record_submission(false, FAILURE_MESSAGE);
                report.failed += 1;
            },
        }

        // Deliberate throttle between attempts; the remote service tolerates
        // only a modest submission rate.
        if !options.throttle.is_zero() {
            thread::sleep(options.throttle);
        }
    }

    tray.save()?;
    info!(
        "submission pass finished: {} submitted, {} failed",
        report.submitted, report.failed
    );

    Ok(report)
}
