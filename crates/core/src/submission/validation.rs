//! Boundary checks applied before an edit touches the record store.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::{Error, Result};
use crate::records::{MutableField, RecordUpdate};

pub fn validate_submission(file_id: &str, record_key: &str, update: &RecordUpdate) -> Result<()> {
    if file_id.trim().is_empty() {
        return Err(Error::validation("A project file is required"));
    }
    if record_key.trim().is_empty() {
        return Err(Error::validation("A test point is required"));
    }

    for (field, value) in update.effective_values() {
        let value = value.trim();
        if field.is_measurement() && Decimal::from_str(value).is_err() {
            return Err(Error::validation(format!(
                "{} must be a number, got '{}'",
                field.column(),
                value
            )));
        }
        match field {
            MutableField::LineItemCompleted if value != "true" && value != "false" => {
                return Err(Error::validation(format!(
                    "{} must be true or false, got '{}'",
                    field.column(),
                    value
                )));
            }
            MutableField::TestDate if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() => {
                return Err(Error::validation(format!(
                    "{} must be a date (YYYY-MM-DD), got '{}'",
                    field.column(),
                    value
                )));
            }
            _ => {}
        }
    }
    Ok(())
}
