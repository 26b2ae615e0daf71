//! Recovers transactions from the text of an M-Pesa statement. Only the
//! summary table is read; each row holds a transaction type with the total
//! paid in and paid out for the statement.

use std::str::FromStr;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use rust_decimal::Decimal;

use crate::entities::sea_orm_active_enums::TransactionType;

use super::{error::*, models::StatementEntry};

const STATEMENT_DATE_MARKER: &str = "Date of Statement:";
const SUMMARY_MARKER: &str = "SUMMARY";
const DETAILED_MARKER: &str = "DETAILED STATEMENT";

const HEADER_WORDS: [&str; 14] = [
    "receipt", "completion time", "transaction status", "paid in", "withdraw", "balance", "mpesa",
    "customer name", "mobile number", "statement period", "summary", "transaction type", "paid out", "total",
];

lazy_static! {
    static ref ORDINAL_RE: Regex = Regex::new(r"(\d+)(st|nd|rd|th)").unwrap();
}

///
/// Extracts the text of a PDF. Runs on the blocking pool, and a file that
/// makes the extractor panic is reported as unreadable.
/// 
pub async fn extract_text(contents: Vec<u8>) -> Result<String> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&contents))
        .await
        .map_err(|e| Error::UnreadableStatement(e.to_string()))?
        .map_err(|e| Error::UnreadableStatement(format!("{:?}", e)))
}

///
/// Parses summary rows into entries dated on the statement date,
/// falling back to `today` when the statement carries none
/// 
pub fn parse_statement(text: &str, today: NaiveDate) -> Vec<StatementEntry> {
    let date = text.lines()
        .find(|line| line.contains(STATEMENT_DATE_MARKER))
        .and_then(statement_date)
        .unwrap_or(today);

    let mut entries = vec![];
    let mut in_summary = false;
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if line.contains(SUMMARY_MARKER) {
            in_summary = true;
            continue;
        }
        if line.contains(DETAILED_MARKER) {
            in_summary = false;
            continue;
        }
        if !in_summary || is_header_line(line) {
            continue;
        }

        entries.extend(parse_summary_line(line, date));
    }

    info!("Parsed {} entries from statement dated {}", entries.len(), date);
    entries
}

/// Reads a `Date of Statement: 21st 10 2025` line as day, month, year
pub fn statement_date(line: &str) -> Option<NaiveDate> {
    let (_, value) = line.split_once(':')?;
    let value = ORDINAL_RE.replace_all(value.trim(), "$1");
    let parts: Vec<u32> = value.split_whitespace()
        .take(3)
        .map(|part| part.parse::<u32>().ok())
        .collect::<Option<_>>()?;

    match parts[..] {
        [day, month, year] => NaiveDate::from_ymd_opt(year as i32, month, day),
        _ => None,
    }
}

fn is_header_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    HEADER_WORDS.iter().any(|word| lower.contains(word))
        || lower.chars().all(|c| c == '|' || c.is_whitespace())
}

///
/// A row reads `<type> <paid in> <paid out>`, where the type may span
/// several words. Each non-zero amount becomes one entry.
/// 
fn parse_summary_line(line: &str, date: NaiveDate) -> Vec<StatementEntry> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 {
        return vec![];
    }

    let (tx_kind, paid_in, paid_out) = if parts.len() == 3 {
        (parts[0].to_string(), parts[1], parts[2])
    } else {
        // The second to last numeric part starts the amounts
        let Some(first_amount) = (0..parts.len()).rev()
            .filter(|i| is_numeric(parts[*i]))
            .nth(1)
            .filter(|i| *i > 0)
        else {
            debug!("No amounts found in statement line '{}'", line);
            return vec![];
        };
        (parts[..first_amount].join(" "), parts[first_amount], parts[first_amount + 1])
    };

    let tx_kind = tx_kind.trim();
    if tx_kind.is_empty() {
        return vec![];
    }

    let mut entries = vec![];
    if let Some(amount) = parse_amount(paid_in).filter(|am| *am > Decimal::ZERO) {
        entries.push(StatementEntry { 
            date, 
            description: format!("{} (Received)", tx_kind), 
            amount, 
            tx_type: TransactionType::Income, 
            details: format!("Summary: {}", tx_kind),
        });
    }
    if let Some(amount) = parse_amount(paid_out).filter(|am| *am > Decimal::ZERO) {
        entries.push(StatementEntry { 
            date, 
            description: format!("{} (Sent)", tx_kind), 
            amount, 
            tx_type: TransactionType::Expense, 
            details: format!("Summary: {}", tx_kind),
        });
    }

    entries
}

fn is_numeric(part: &str) -> bool {
    let cleaned: String = part.chars()
        .filter(|c| !matches!(c, 'K' | 's' | 'h' | ',') && !c.is_whitespace())
        .collect();
    !cleaned.is_empty() && cleaned.parse::<f64>().is_ok_and(|v| v.is_finite())
}

///
/// Reads an amount such as `Ksh 4,630.00`. Everything except digits and dots
/// is dropped, and only the last dot is kept as the decimal point.
/// 
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let cleaned: String = value.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if cleaned.is_empty() || cleaned == "." {
        return None;
    }

    let normalized = match cleaned.rfind('.') {
        Some(last_dot) if last_dot > 0 => {
            let (whole, fraction) = cleaned.split_at(last_dot);
            format!("{}{}", whole.replace('.', ""), fraction)
        },
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}
