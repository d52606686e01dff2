//! Decoding of taxpayer web-service bodies.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::{AnafError, Outcome};
use crate::http::{lenient_u64, rejection};

/// VAT registration data of one taxpayer (`found[0]` of `/tva`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VatStatus {
    pub cui: u64,
    pub name: String,
    pub address: String,
    /// Registered for VAT purposes (`scpTVA`).
    pub vat_registered: bool,
    /// Applies VAT on collection (`statusTvaIncasare`).
    pub vat_on_collection: bool,
    /// Declared inactive (`statusInactivi`).
    pub inactive: bool,
    /// Applies split VAT (`statusSplitTVA`).
    pub split_vat: bool,
    /// The complete record, for the fields not mapped above.
    pub raw: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawVatRecord {
    date_generale: RawGeneral,
    #[serde(rename = "inregistrare_scop_Tva")]
    vat_scope: RawFlags,
    #[serde(rename = "inregistrare_RTVAI")]
    on_collection: RawFlags,
    stare_inactiv: RawFlags,
    #[serde(rename = "inregistrare_SplitTVA")]
    split: RawFlags,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGeneral {
    #[serde(deserialize_with = "lenient_u64")]
    cui: u64,
    denumire: String,
    adresa: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFlags {
    #[serde(rename = "scpTVA")]
    scope: bool,
    #[serde(rename = "statusTvaIncasare")]
    on_collection: bool,
    #[serde(rename = "statusInactivi")]
    inactive: bool,
    #[serde(rename = "statusSplitTVA")]
    split: bool,
}

/// Parse a `/api/PlatitorTvaRest/v9/tva` body.
///
/// A CIF listed under `notFound` yields a rejection naming it.
pub fn parse_vat_status(body: &str) -> Result<Outcome<VatStatus>, AnafError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| AnafError::InvalidResponse(format!("vat status: {e}")))?;
    if let Some(msg) = rejection(&json) {
        return Ok(Outcome::Rejected(msg));
    }

    let Some(record) = json.get("found").and_then(|found| found.get(0)) else {
        let missing = json
            .get("notFound")
            .and_then(|nf| nf.get(0))
            .map(Value::to_string)
            .unwrap_or_default();
        return Ok(Outcome::Rejected(format!("CIF not found {missing}").trim_end().to_string()));
    };

    let parsed: RawVatRecord = serde_json::from_value(record.clone())
        .map_err(|e| AnafError::InvalidResponse(format!("vat status: {e}")))?;

    Ok(Outcome::Success(VatStatus {
        cui: parsed.date_generale.cui,
        name: parsed.date_generale.denumire,
        address: parsed.date_generale.adresa,
        vat_registered: parsed.vat_scope.scope,
        vat_on_collection: parsed.on_collection.on_collection,
        inactive: parsed.stare_inactiv.inactive,
        split_vat: parsed.split.split,
        raw: record.clone(),
    }))
}

/// Annual balance sheet (`/bilant`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    #[serde(rename = "an", deserialize_with = "lenient_u64")]
    pub year: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub cui: u64,
    #[serde(rename = "deni", default)]
    pub name: String,
    #[serde(default)]
    pub caen: Value,
    #[serde(rename = "den_caen", default)]
    pub caen_description: String,
    #[serde(rename = "i", default)]
    pub indicators: Vec<Indicator>,
}

impl BalanceSheet {
    /// Value of the indicator with `code`, e.g. `"I1"`.
    pub fn indicator(&self, code: &str) -> Option<Decimal> {
        self.indicators
            .iter()
            .find(|i| i.code == code)
            .map(|i| i.value)
    }
}

/// One line of a balance sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    #[serde(rename = "indicator")]
    pub code: String,
    #[serde(rename = "val_indicator", deserialize_with = "lenient_decimal")]
    pub value: Decimal,
    #[serde(rename = "val_den_indicator", default)]
    pub label: String,
}

/// Numbers arrive as JSON integers, floats or strings.
fn lenient_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let text = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s,
        Value::Null => return Ok(Decimal::ZERO),
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected a number, got {other}"
            )));
        }
    };
    Decimal::from_str(text.trim())
        .or_else(|_| Decimal::from_scientific(text.trim()))
        .map_err(serde::de::Error::custom)
}

/// Parse a `/bilant` body.
pub fn parse_balance_sheet(body: &str) -> Result<Outcome<BalanceSheet>, AnafError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| AnafError::InvalidResponse(format!("balance sheet: {e}")))?;
    if let Some(msg) = rejection(&json) {
        return Ok(Outcome::Rejected(msg));
    }

    serde_json::from_value(json)
        .map(Outcome::Success)
        .map_err(|e| AnafError::InvalidResponse(format!("balance sheet: {e}")))
}
