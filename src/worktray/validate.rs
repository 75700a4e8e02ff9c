use chrono::{Datelike, NaiveDate};
use enum_dispatch::enum_dispatch;
use log::{debug, info};
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::row::{Cell, TrayRow};
use super::tray::Worktray;
use super::StageError;

pub const MISSING_DATA: &str = "missing data";
pub const INVALID_NAME: &str = "enter a valid name";
pub const SPECIAL_CHARACTERS: &str = "special characters not allowed";
pub const INVALID_PRODUCT: &str = "enter a valid product";
pub const INVALID_AMOUNT: &str = "enter a valid amount";
pub const INVALID_DATE: &str = "request date is not a date value";

// Letters (accented included), spaces, hyphen and period.
const NAME_PATTERN: &str = r"^[a-zA-ZáéíóúÁÉÍÓÚñÑüÜ\s\-\.]+$";

#[enum_dispatch]
pub trait RowRule {
    /// The triggered observation, if the rule rejects the row.
    fn check(&self, row: &TrayRow) -> Option<&'static str>;
}

/// The per-row rule set, evaluated in declaration order. Every triggered
/// reason is collected, not just the first.
#[enum_dispatch(RowRule)]
pub enum Rule {
    Completeness,
    NameFormat,
    ProductPresent,
    AmountNumeric,
    DateGenuine,
}

/// Any of the four business fields empty rejects the row. Reported once no
/// matter how many fields are missing.
pub struct Completeness;

impl RowRule for Completeness {
    fn check(&self, row: &TrayRow) -> Option<&'static str> {
        let cells = [&row.name, &row.product, &row.amount, &row.request_date];
        cells.iter().any(|cell| cell.is_empty()).then_some(MISSING_DATA)
    }
}

pub struct NameFormat {
    allowed: Regex,
}

impl NameFormat {
    pub fn new() -> Result<NameFormat, StageError> {
        let allowed =
            Regex::new(NAME_PATTERN).map_err(|err| StageError::Pattern(err.to_string()))?;
        Ok(NameFormat { allowed })
    }
}

impl RowRule for NameFormat {
    fn check(&self, row: &TrayRow) -> Option<&'static str> {
        match &row.name {
            Cell::Empty => None,
            Cell::Text(name) => (!self.allowed.is_match(name)).then_some(SPECIAL_CHARACTERS),
            _ => Some(INVALID_NAME),
        }
    }
}

/// The product field gets its own presence report, on top of the general
/// completeness one.
pub struct ProductPresent;

impl RowRule for ProductPresent {
    fn check(&self, row: &TrayRow) -> Option<&'static str> {
        row.product.is_empty().then_some(INVALID_PRODUCT)
    }
}

pub struct AmountNumeric;

impl RowRule for AmountNumeric {
    fn check(&self, row: &TrayRow) -> Option<&'static str> {
        match &row.amount {
            Cell::Empty | Cell::Number(_) => None,
            _ => Some(INVALID_AMOUNT),
        }
    }
}

/// The request date must be a genuine date value: a timestamp cell, or a
/// day count in the 1900 serial system. A string that merely looks like a
/// date (dd-mm-yyyy) is rejected the same way; it only earns a more
/// specific log line.
pub struct DateGenuine;

impl RowRule for DateGenuine {
    fn check(&self, row: &TrayRow) -> Option<&'static str> {
        match &row.request_date {
            Cell::Empty | Cell::Timestamp(_) => None,
            Cell::Number(serial) => (!is_serial_date(*serial)).then_some(INVALID_DATE),
            Cell::Text(text) => {
                if NaiveDate::parse_from_str(text, "%d-%m-%Y").is_ok() {
                    debug!("request date '{text}' is a formatted string, not a date value");
                }
                Some(INVALID_DATE)
            },
        }
    }
}

/// Day 1 of the serial system is 1900-01-01; the offset drops two days for
/// the fictitious 1900-02-29 that spreadsheet day counts carry.
fn is_serial_date(serial: Decimal) -> bool {
    const MIN_ORDINAL: i64 = 1; // 0001-01-01
    const MAX_ORDINAL: i64 = 3_652_059; // 9999-12-31

    let Some(days) = serial.trunc().to_i64() else {
        return false;
    };
    let Some(base) = NaiveDate::from_ymd_opt(1900, 1, 1) else {
        return false;
    };

    let ordinal = i64::from(base.num_days_from_ce()) + days - 2;
    if !(MIN_ORDINAL..=MAX_ORDINAL).contains(&ordinal) {
        return false;
    }

    i32::try_from(ordinal)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .is_some()
}

pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    pub fn new() -> Result<Rules, StageError> {
        Ok(Rules {
            rules: vec![
                Rule::Completeness(Completeness),
                Rule::NameFormat(NameFormat::new()?),
                Rule::ProductPresent(ProductPresent),
                Rule::AmountNumeric(AmountNumeric),
                Rule::DateGenuine(DateGenuine),
            ],
        })
    }

    pub fn evaluate(&self, row: &TrayRow) -> Vec<&'static str> {
        self.rules.iter().filter_map(|rule| rule.check(row)).collect()
    }
}

/// Runs every rule over every row, records the verdicts in place and saves
/// the tray. Deterministic: re-running on an unmodified tray reproduces the
/// same `DataValid`/`Observations` pairs.
pub fn validate_worktray(tray: &mut Worktray, rules: &Rules) -> Result<(), StageError> {
    info!("validating {} rows", tray.rows().len());

    for (index, row) in tray.rows_mut().iter_mut().enumerate() {
        let reasons = rules.evaluate(row);
        if !reasons.is_empty() {
            debug!("row {index} rejected: {}", reasons.join("; "));
        }
        row.record_validation(&reasons);
    }

    tray.save()?;
    info!("worktray validation completed and saved");

    Ok(())
}
