use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::sea_orm_active_enums::TransactionType;

pub const MPESA_CATEGORY_NAME: &str = "M-Pesa";
pub const MAX_STATEMENT_BYTES: usize = 10 * 1024 * 1024;

/// One transaction recovered from a statement
#[derive(Debug, Clone, PartialEq)]
pub struct StatementEntry {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub tx_type: TransactionType,
    /// Where in the statement the entry came from
    pub details: String,
}

#[derive(Debug, Clone)]
pub struct StatementUploadModel {
    pub file_name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementImportModel {
    pub success: bool,
    pub message: String,
    pub total_transactions: usize,
    pub saved_transactions: usize,
    pub skipped_transactions: usize,
    pub total_income: Decimal,
    pub total_expense: Decimal,
}

impl StatementImportModel {
    /// An accepted upload that imported nothing
    pub fn nothing_imported(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            total_transactions: 0,
            saved_transactions: 0,
            skipped_transactions: 0,
            total_income: Decimal::ZERO,
            total_expense: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadInfoModel {
    pub max_file_size: String,
    pub supported_formats: Vec<String>,
    pub instructions: Vec<String>,
}

impl Default for UploadInfoModel {
    fn default() -> Self {
        Self {
            max_file_size: format!("{}MB", MAX_STATEMENT_BYTES / (1024 * 1024)),
            supported_formats: vec![String::from("PDF")],
            instructions: [
                "Download your M-Pesa statement from the Safaricom app",
                "Select the PDF file to upload",
                "We'll automatically extract and categorize your transactions",
                "Duplicate transactions will be skipped",
            ].into_iter().map(String::from).collect(),
        }
    }
}
