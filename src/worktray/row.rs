use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// A business cell as it came out of the tray file, decoded once at the
/// ledger boundary. Decoding never fails: anything that is not empty, a
/// number or an ISO date stays raw text and is judged by the validator.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(Decimal),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl Cell {
    pub fn decode(raw: &str) -> Cell {
        let raw = raw.trim();
        if raw.is_empty() {
            return Cell::Empty;
        }

        if let Ok(number) = raw.parse::<Decimal>() {
            return Cell::Number(number);
        }

        for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
                return Cell::Timestamp(timestamp);
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            if let Some(timestamp) = date.and_hms_opt(0, 0, 0) {
                return Cell::Timestamp(timestamp);
            }
        }

        Cell::Text(raw.to_string())
    }

    /// Inverse of `decode`: encode-then-decode must reproduce the same cell,
    /// otherwise a save would change what the next validation pass sees.
    pub fn encode(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(number) => number.to_string(),
            Cell::Timestamp(timestamp) => {
                if timestamp.time() == NaiveTime::MIN {
                    timestamp.format("%Y-%m-%d").to_string()
                } else {
                    timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
                }
            },
            Cell::Text(text) => text.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Cell::Empty
    }
}

/// Tri-state status of a tray row. Both status columns start out `Pending`
/// when a row is staged and are resolved by the validation and submission
/// passes respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Pending,
    Yes,
    No,
}

impl Flag {
    /// Strict: anything other than the three known markers is a contract
    /// violation and is reported by the ledger boundary, not coerced.
    pub fn decode(raw: &str) -> Option<Flag> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Flag::Pending),
            "TRUE" => Some(Flag::Yes),
            "FALSE" => Some(Flag::No),
            _ => None,
        }
    }

    pub fn encode(&self) -> &'static str {
        match self {
            Flag::Pending => "PENDING",
            Flag::Yes => "TRUE",
            Flag::No => "FALSE",
        }
    }
}

/// One transaction record of the worktray.
#[derive(Debug, Clone, PartialEq)]
pub struct TrayRow {
    pub name: Cell,
    pub product: Cell,
    pub amount: Cell,
    pub request_date: Cell,
    pub data_valid: Flag,
    pub form_submitted: Flag,
    pub observations: String,
}

impl TrayRow {
    /// A freshly staged row: both statuses pending, no observations yet.
    pub fn pending(name: Cell, product: Cell, amount: Cell, request_date: Cell) -> TrayRow {
        TrayRow {
            name,
            product,
            amount,
            request_date,
            data_valid: Flag::Pending,
            form_submitted: Flag::Pending,
            observations: String::new(),
        }
    }

    /// Observations always mirror the latest decision, they never accumulate
    /// reasons across passes.
    pub fn record_validation(&mut self, reasons: &[&str]) {
        self.data_valid = if reasons.is_empty() { Flag::Yes } else { Flag::No };
        self.observations = reasons.join("; ");
    }

    pub fn record_submission(&mut self, submitted: bool, observation: &str) {
        self.form_submitted = if submitted { Flag::Yes } else { Flag::No };
        self.observations = observation.to_string();
    }
}
