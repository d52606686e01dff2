//! Public taxpayer registry: VAT status and balance sheets.
//!
//! These endpoints need no OAuth token.

mod client;
mod response;

pub use client::{BASE_URL, TaxPayerClient};
pub use response::{BalanceSheet, Indicator, VatStatus, parse_balance_sheet, parse_vat_status};
