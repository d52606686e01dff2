use std::fmt;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Method, Request, RequestBuilder};

use super::message::{self, MessageList, MessagePage};
use super::response::{self, Conversion, MessageStatus, ValidationReport};
use crate::core::{AnafConfig, AnafError, Cif, DocumentStandard, MessageType, Outcome, XmlStandard};
use crate::http;

/// Production e-Factura REST base.
pub const PRODUCTION_URL: &str = "https://api.anaf.ro/prod/FCTEL/rest";
/// Sandbox e-Factura REST base.
pub const TEST_URL: &str = "https://api.anaf.ro/test/FCTEL/rest";

/// Message window used when `days` is not given.
pub const DEFAULT_MESSAGE_DAYS: u32 = 60;

/// XML arguments shorter than this are tried as file paths first.
const MAX_PAYLOAD_PATH_LEN: usize = 2048;

/// Flags of `/upload` and `/uploadb2c`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub standard: XmlStandard,
    /// Buyer is not a Romanian entity (`extern=DA`).
    pub external: bool,
    /// Invoice issued by the buyer on behalf of the seller (`autofactura=DA`).
    pub self_invoice: bool,
    /// Invoice issued under legal enforcement (`executare=DA`).
    pub legal_enforcement: bool,
}

impl UploadOptions {
    fn query(&self, cif: &Cif) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("cif", cif.to_string()),
            ("standard", self.standard.as_str().to_string()),
        ];
        for (set, key) in [
            (self.external, "extern"),
            (self.self_invoice, "autofactura"),
            (self.legal_enforcement, "executare"),
        ] {
            if set {
                query.push((key, "DA".to_string()));
            }
        }
        query
    }
}

/// Client for the e-Factura REST API.
///
/// Holds the OAuth access token; obtaining and refreshing it is the job of
/// [`crate::oauth::OAuthClient`] or the caller. Validation and PDF
/// conversion always go to production, since the sandbox does not serve
/// them.
#[derive(Debug, Clone)]
pub struct EfacturaClient {
    http: reqwest::Client,
    access_token: String,
    base_url: String,
    live_url: String,
    timeout: Duration,
}

impl EfacturaClient {
    pub fn new(access_token: impl Into<String>, config: &AnafConfig) -> Result<Self, AnafError> {
        let base_url = if config.efactura_test_mode {
            TEST_URL
        } else {
            PRODUCTION_URL
        };
        Ok(Self {
            http: http::build_client()?,
            access_token: access_token.into(),
            base_url: base_url.to_string(),
            live_url: PRODUCTION_URL.to_string(),
            timeout: config.request_timeout(),
        })
    }

    pub fn in_test_mode(mut self) -> Self {
        self.base_url = TEST_URL.to_string();
        self
    }

    pub fn in_live_mode(mut self) -> Self {
        self.base_url = PRODUCTION_URL.to_string();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Point every endpoint at `url`, e.g. a local mock server.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.live_url = url.clone();
        self.base_url = url;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Messages of the last `days` days (default 60), optionally filtered.
    pub async fn messages(
        &self,
        cif: impl fmt::Display,
        days: Option<u32>,
        kind: Option<MessageType>,
    ) -> Result<Outcome<MessageList>, AnafError> {
        let request = self.messages_request(&Cif::parse(cif)?, days, kind)?;
        let resp = http::execute(&self.http, request, "listaMesajeFactura").await?;
        message::parse_messages(&http::read_text(resp, "listaMesajeFactura").await?)
    }

    /// One page of messages created between `start` and `end`.
    pub async fn messages_paginated(
        &self,
        cif: impl fmt::Display,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: Option<u32>,
        kind: Option<MessageType>,
    ) -> Result<Outcome<MessagePage>, AnafError> {
        let request = self.paginated_request(&Cif::parse(cif)?, start, end, page, kind)?;
        let resp = http::execute(&self.http, request, "listaMesajePaginatieFactura").await?;
        message::parse_paginated_messages(
            &http::read_text(resp, "listaMesajePaginatieFactura").await?,
        )
    }

    /// ZIP archive of an invoice and its signature.
    pub async fn download_invoice(&self, download_id: u64) -> Result<Outcome<Vec<u8>>, AnafError> {
        let request = self.download_request(download_id)?;
        let resp = http::execute(&self.http, request, "descarcare").await?;
        let content_type = http::content_type(&resp);
        let body = http::read_bytes(resp, "descarcare").await?;
        Ok(response::parse_download(content_type.as_deref(), body))
    }

    /// [`Self::download_invoice`], extracted into an [`crate::archive::ArchiveBundle`].
    #[cfg(feature = "archive")]
    pub async fn download_bundle(
        &self,
        download_id: u64,
    ) -> Result<Outcome<crate::archive::ArchiveBundle>, AnafError> {
        match self.download_invoice(download_id).await? {
            Outcome::Success(bytes) => {
                crate::archive::ArchiveBundle::from_bytes(&bytes).map(Outcome::Success)
            }
            Outcome::Rejected(msg) => Ok(Outcome::Rejected(msg)),
        }
    }

    /// Check invoice XML (or a path to it) against `standard`.
    pub async fn validate_invoice(
        &self,
        xml: &str,
        standard: DocumentStandard,
    ) -> Result<ValidationReport, AnafError> {
        let request = self.validate_request(read_payload(xml)?, standard)?;
        let resp = http::execute(&self.http, request, "validare").await?;
        response::parse_validation_report(&http::read_text(resp, "validare").await?)
    }

    /// Upload a B2B invoice; yields the upload index.
    pub async fn upload_invoice(
        &self,
        cif: impl fmt::Display,
        xml: &str,
        options: &UploadOptions,
    ) -> Result<Outcome<u64>, AnafError> {
        self.upload(cif, xml, options, false).await
    }

    /// Upload a B2C invoice; yields the upload index.
    pub async fn upload_invoice_b2c(
        &self,
        cif: impl fmt::Display,
        xml: &str,
        options: &UploadOptions,
    ) -> Result<Outcome<u64>, AnafError> {
        self.upload(cif, xml, options, true).await
    }

    async fn upload(
        &self,
        cif: impl fmt::Display,
        xml: &str,
        options: &UploadOptions,
        b2c: bool,
    ) -> Result<Outcome<u64>, AnafError> {
        let cif = Cif::parse(cif)?;
        let request = self.upload_request(&cif, read_payload(xml)?, options, b2c)?;
        let resp = http::execute(&self.http, request, "upload").await?;
        response::parse_upload_response(&http::read_text(resp, "upload").await?)
    }

    /// Processing state of an upload.
    pub async fn message_status(&self, upload_id: u64) -> Result<Outcome<MessageStatus>, AnafError> {
        let request = self.status_request(upload_id)?;
        let resp = http::execute(&self.http, request, "stareMesaj").await?;
        response::parse_status_response(&http::read_text(resp, "stareMesaj").await?)
    }

    /// Render invoice XML (or a path to it) as PDF.
    pub async fn convert_invoice(
        &self,
        xml: &str,
        standard: DocumentStandard,
        without_validation: bool,
    ) -> Result<Conversion, AnafError> {
        let request = self.convert_request(read_payload(xml)?, standard, without_validation)?;
        let resp = http::execute(&self.http, request, "transformare").await?;
        let content_type = http::content_type(&resp);
        let body = http::read_bytes(resp, "transformare").await?;
        Ok(response::parse_conversion(content_type.as_deref(), body))
    }

    fn request(&self, method: Method, base: &str, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{base}{path}"))
            .timeout(self.timeout);
        if self.access_token.trim().is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.access_token)
        }
    }

    fn messages_request(
        &self,
        cif: &Cif,
        days: Option<u32>,
        kind: Option<MessageType>,
    ) -> Result<Request, AnafError> {
        let mut query = vec![
            ("cif", cif.to_string()),
            ("zile", days.unwrap_or(DEFAULT_MESSAGE_DAYS).to_string()),
        ];
        if let Some(kind) = kind {
            query.push(("filtru", kind.as_str().to_string()));
        }
        build(
            self.request(Method::GET, &self.base_url, "/listaMesajeFactura")
                .query(&query),
        )
    }

    fn paginated_request(
        &self,
        cif: &Cif,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: Option<u32>,
        kind: Option<MessageType>,
    ) -> Result<Request, AnafError> {
        let mut query = vec![
            ("cif", cif.to_string()),
            ("startTime", start.timestamp_millis().to_string()),
            ("endTime", end.timestamp_millis().to_string()),
            ("pagina", page.unwrap_or(1).to_string()),
        ];
        if let Some(kind) = kind {
            query.push(("filtru", kind.as_str().to_string()));
        }
        build(
            self.request(Method::GET, &self.base_url, "/listaMesajePaginatieFactura")
                .query(&query),
        )
    }

    fn download_request(&self, download_id: u64) -> Result<Request, AnafError> {
        build(
            self.request(Method::GET, &self.base_url, "/descarcare")
                .query(&[("id", download_id)]),
        )
    }

    fn validate_request(&self, xml: String, standard: DocumentStandard) -> Result<Request, AnafError> {
        build(
            self.request(
                Method::POST,
                &self.live_url,
                &format!("/validare/{}", standard.as_str()),
            )
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(xml),
        )
    }

    fn upload_request(
        &self,
        cif: &Cif,
        xml: String,
        options: &UploadOptions,
        b2c: bool,
    ) -> Result<Request, AnafError> {
        let path = if b2c { "/uploadb2c" } else { "/upload" };
        build(
            self.request(Method::POST, &self.base_url, path)
                .query(&options.query(cif))
                .header(reqwest::header::CONTENT_TYPE, "application/xml")
                .body(xml),
        )
    }

    fn status_request(&self, upload_id: u64) -> Result<Request, AnafError> {
        build(
            self.request(Method::GET, &self.base_url, "/stareMesaj")
                .query(&[("id_incarcare", upload_id)]),
        )
    }

    fn convert_request(
        &self,
        xml: String,
        standard: DocumentStandard,
        without_validation: bool,
    ) -> Result<Request, AnafError> {
        let mut path = format!("/transformare/{}", standard.as_str());
        if without_validation {
            path.push_str("/DA");
        }
        build(
            self.request(Method::POST, &self.live_url, &path)
                .header(reqwest::header::CONTENT_TYPE, "text/plain")
                .body(xml),
        )
    }
}

fn build(builder: RequestBuilder) -> Result<Request, AnafError> {
    builder
        .build()
        .map_err(|e| AnafError::Config(format!("invalid request: {e}")))
}

/// File contents if `xml` names an existing file, else `xml` itself.
fn read_payload(xml: &str) -> Result<String, AnafError> {
    if xml.len() < MAX_PAYLOAD_PATH_LEN && !xml.contains('\0') && Path::new(xml).is_file() {
        return Ok(std::fs::read_to_string(xml)?);
    }
    Ok(xml.to_string())
}
