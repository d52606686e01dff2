use std::fmt;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use reqwest::Request;
use serde::Serialize;

use super::response::{self, BalanceSheet, VatStatus};
use crate::core::{AnafConfig, AnafError, Cif, Outcome};
use crate::http;

/// Base of the public taxpayer web services.
pub const BASE_URL: &str = "https://webservicesp.anaf.ro";

#[derive(Debug, Serialize)]
struct VatQuery {
    cui: u64,
    data: String,
}

/// Client for the public taxpayer registry, bound to one CIF.
///
/// ```no_run
/// use anaf::taxpayer::TaxPayerClient;
/// use anaf::AnafConfig;
///
/// # async fn run() -> Result<(), anaf::AnafError> {
/// let client = TaxPayerClient::new("RO29930516", &AnafConfig::default())?;
/// let status = client.vat_status(None).await?.into_result()?;
/// println!("{} registered for VAT: {}", status.name, status.vat_registered);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TaxPayerClient {
    http: reqwest::Client,
    cif: Cif,
    base_url: String,
    timeout: Duration,
}

impl TaxPayerClient {
    /// # Errors
    ///
    /// [`AnafError::InvalidCif`] when `cif` fails the check-digit test.
    pub fn new(cif: impl fmt::Display, config: &AnafConfig) -> Result<Self, AnafError> {
        Ok(Self {
            http: http::build_client()?,
            cif: Cif::parse(cif)?,
            base_url: BASE_URL.to_string(),
            timeout: config.request_timeout(),
        })
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn cif(&self) -> &Cif {
        &self.cif
    }

    /// VAT registration status on `date` (today when `None`).
    pub async fn vat_status(&self, date: Option<NaiveDate>) -> Result<Outcome<VatStatus>, AnafError> {
        let date = date.unwrap_or_else(|| Local::now().date_naive());
        let request = self.vat_request(date)?;
        let resp = http::execute(&self.http, request, "vat_status").await?;
        response::parse_vat_status(&http::read_text(resp, "vat_status").await?)
    }

    /// Balance sheet filed for `year`.
    pub async fn balance_sheet(&self, year: i32) -> Result<Outcome<BalanceSheet>, AnafError> {
        let request = self.balance_sheet_request(year)?;
        let resp = http::execute(&self.http, request, "balance_sheet").await?;
        response::parse_balance_sheet(&http::read_text(resp, "balance_sheet").await?)
    }

    fn vat_request(&self, date: NaiveDate) -> Result<Request, AnafError> {
        let body = [VatQuery {
            cui: self.cif.as_u64(),
            data: date.format("%Y-%m-%d").to_string(),
        }];
        self.http
            .post(format!("{}/api/PlatitorTvaRest/v9/tva", self.base_url))
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .build()
            .map_err(|e| AnafError::Config(format!("invalid request: {e}")))
    }

    fn balance_sheet_request(&self, year: i32) -> Result<Request, AnafError> {
        self.http
            .get(format!("{}/bilant", self.base_url))
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("cui", self.cif.to_string()), ("an", year.to_string())])
            .build()
            .map_err(|e| AnafError::Config(format!("invalid request: {e}")))
    }
}
