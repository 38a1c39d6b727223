//! CSV import for income history files
//!
//! Expected format: a header row containing `date` and `income` columns
//! (any order, extra columns ignored), one row per day.

use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::io::Read;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::IncomeRecord;

/// Parse an income CSV into records sorted by date ascending
pub fn parse_income_csv<R: Read>(reader: R) -> Result<Vec<IncomeRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let date_idx = find_column(&headers, "date");
    let income_idx = find_column(&headers, "income");

    let (date_idx, income_idx) = match (date_idx, income_idx) {
        (Some(d), Some(i)) => (d, i),
        _ => {
            return Err(Error::Import(
                "CSV must have 'date' and 'income' columns".into(),
            ))
        }
    };

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;

        let date_str = record
            .get(date_idx)
            .ok_or_else(|| Error::Import("Missing date".into()))?;
        if date_str.is_empty() {
            continue;
        }
        let date = parse_date(date_str)?;

        let amount_str = record
            .get(income_idx)
            .ok_or_else(|| Error::Import("Missing income".into()))?;
        let amount = parse_amount(amount_str)?;

        records.push(IncomeRecord { date, amount });
    }

    records.sort_by_key(|r| r.date);
    debug!("Parsed {} income records", records.len());
    Ok(records)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// Parse a date in ISO or US format
fn parse_date(s: &str) -> Result<NaiveDate> {
    let formats = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];
    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }
    Err(Error::Import(format!("Invalid date: {}", s)))
}

/// Parse an amount, tolerating currency symbols and thousands separators
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Invalid amount: {}", s)))
}
