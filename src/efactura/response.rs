//! Decoding of e-Factura response bodies.
//!
//! Upload and status endpoints answer in XML, validation and conversion in
//! JSON. All functions here are pure so they can be tested without a
//! server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{AnafError, Outcome};
use crate::http::{is_json, rejection};
use crate::xml::{self, Element};

/// Processing state of an uploaded invoice (`/stareMesaj`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageStatus {
    /// `stare`: `ok`, `nok`, `in prelucrare`, ...
    pub status: String,
    /// `id_descarcare`, present once processing finished.
    pub download_id: Option<u64>,
}

impl MessageStatus {
    /// The invoice was accepted by the system.
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Processing has not finished yet.
    pub fn is_pending(&self) -> bool {
        self.status == "in prelucrare"
    }
}

/// Answer of `/validare` (and of a failed `/transformare`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// `stare == "ok"`.
    pub is_valid: bool,
    /// Validation messages, in service order.
    pub errors: Vec<String>,
    pub trace_id: Option<String>,
}

/// Answer of `/transformare`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// The rendered PDF.
    Pdf(Vec<u8>),
    /// The XML failed validation and was not converted.
    Rejected(ValidationReport),
}

#[derive(Debug, Deserialize)]
struct RawReport {
    #[serde(default)]
    stare: Option<String>,
    #[serde(rename = "Messages", default)]
    messages: Vec<RawReportMessage>,
    #[serde(default)]
    trace_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReportMessage {
    #[serde(default)]
    message: String,
}

fn decode_xml(body: &str) -> Result<Element, AnafError> {
    xml::convert(body, false).map_err(|e| {
        tracing::debug!(error = %e, "e-Factura returned malformed XML");
        AnafError::InvalidResponse("Invalid XML response".into())
    })
}

/// `<Errors errorMessage="..."/>` under the response root.
fn xml_rejection(doc: &Element) -> Option<String> {
    doc.child("Errors")
        .and_then(|errors| errors.attribute("errorMessage"))
        .map(str::to_string)
}

/// Parse an `/upload` or `/uploadb2c` body into the upload index.
///
/// ```
/// use anaf::efactura::parse_upload_response;
///
/// let body = r#"<header xmlns="mfp:anaf:dgti:spv:respUploadFisier:v1"
///     dateResponse="202108051140" ExecutionStatus="0" index_incarcare="3828"/>"#;
/// assert_eq!(parse_upload_response(body).unwrap().into_result().unwrap(), 3828);
/// ```
pub fn parse_upload_response(body: &str) -> Result<Outcome<u64>, AnafError> {
    let doc = decode_xml(body)?;
    if let Some(msg) = xml_rejection(&doc) {
        return Ok(Outcome::Rejected(msg));
    }

    let upload_id = doc
        .attribute("index_incarcare")
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| AnafError::InvalidResponse("missing index_incarcare".into()))?;
    Ok(Outcome::Success(upload_id))
}

/// Parse a `/stareMesaj` body.
pub fn parse_status_response(body: &str) -> Result<Outcome<MessageStatus>, AnafError> {
    let doc = decode_xml(body)?;
    if let Some(msg) = xml_rejection(&doc) {
        return Ok(Outcome::Rejected(msg));
    }

    let status = doc
        .attribute("stare")
        .ok_or_else(|| AnafError::InvalidResponse("missing stare".into()))?
        .to_string();
    let download_id = doc
        .attribute("id_descarcare")
        .and_then(|v| v.trim().parse().ok());

    Ok(Outcome::Success(MessageStatus {
        status,
        download_id,
    }))
}

/// Parse a `/validare` JSON body.
pub fn parse_validation_report(body: &str) -> Result<ValidationReport, AnafError> {
    let raw: RawReport = serde_json::from_str(body)
        .map_err(|e| AnafError::InvalidResponse(format!("validation report: {e}")))?;
    Ok(ValidationReport {
        is_valid: raw.stare.as_deref() == Some("ok"),
        errors: raw.messages.into_iter().map(|m| m.message).collect(),
        trace_id: raw.trace_id,
    })
}

/// Interpret a `/descarcare` body: ZIP bytes, or a JSON `eroare`.
pub fn parse_download(content_type: Option<&str>, body: Vec<u8>) -> Outcome<Vec<u8>> {
    if is_json(content_type) {
        if let Some(msg) = serde_json::from_slice::<Value>(&body)
            .ok()
            .as_ref()
            .and_then(rejection)
        {
            return Outcome::Rejected(msg);
        }
    }
    Outcome::Success(body)
}

/// Interpret a `/transformare` body: PDF bytes, or a JSON report with
/// `stare == "nok"`.
pub fn parse_conversion(content_type: Option<&str>, body: Vec<u8>) -> Conversion {
    if is_json(content_type) {
        if let Ok(text) = std::str::from_utf8(&body) {
            if let Ok(report) = parse_validation_report(text) {
                if !report.is_valid {
                    return Conversion::Rejected(report);
                }
            }
        }
    }
    Conversion::Pdf(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_accepted() {
        let body = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<header xmlns="mfp:anaf:dgti:spv:respUploadFisier:v1" dateResponse="202108051140" ExecutionStatus="0" index_incarcare="3828"/>"#;
        assert_eq!(parse_upload_response(body).unwrap(), Outcome::Success(3828));
    }

    #[test]
    fn upload_rejected() {
        let body = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<header xmlns="mfp:anaf:dgti:spv:respUploadFisier:v1" dateResponse="202108051144" ExecutionStatus="1">
    <Errors errorMessage="Fisierul transmis nu este valid."/>
</header>"#;
        assert_eq!(
            parse_upload_response(body).unwrap(),
            Outcome::Rejected("Fisierul transmis nu este valid.".into())
        );
    }

    #[test]
    fn upload_without_index_is_invalid() {
        let body = r#"<header ExecutionStatus="0"/>"#;
        assert!(matches!(
            parse_upload_response(body),
            Err(AnafError::InvalidResponse(_))
        ));
    }

    #[test]
    fn malformed_xml_is_invalid_response() {
        let err = parse_upload_response("<header").unwrap_err();
        assert_eq!(err.to_string(), "invalid response: Invalid XML response");
    }

    #[test]
    fn status_ok_with_download_id() {
        let body = r#"<header xmlns="mfp:anaf:dgti:efactura:stareMesajFactura:v1" stare="ok" id_descarcare="1234"/>"#;
        let status = parse_status_response(body).unwrap().into_result().unwrap();
        assert!(status.is_ok());
        assert_eq!(status.download_id, Some(1234));
    }

    #[test]
    fn status_pending_without_download_id() {
        let body = r#"<header xmlns="mfp:anaf:dgti:efactura:stareMesajFactura:v1" stare="in prelucrare"/>"#;
        let status = parse_status_response(body).unwrap().into_result().unwrap();
        assert!(status.is_pending());
        assert_eq!(status.download_id, None);
    }

    #[test]
    fn status_rejected() {
        let body = r#"<header xmlns="mfp:anaf:dgti:efactura:stareMesajFactura:v1">
            <Errors errorMessage="Nu aveti dreptul de inteorgare pentru id_incarcare= 18"/>
        </header>"#;
        assert_eq!(
            parse_status_response(body).unwrap().rejection(),
            Some("Nu aveti dreptul de inteorgare pentru id_incarcare= 18")
        );
    }

    #[test]
    fn validation_report() {
        let body = r#"{"stare":"nok","Messages":[{"message":"E: validari globale"}],"trace_id":"abc-123"}"#;
        let report = parse_validation_report(body).unwrap();
        assert!(!report.is_valid);
        assert_eq!(report.errors, ["E: validari globale"]);
        assert_eq!(report.trace_id.as_deref(), Some("abc-123"));

        let ok = parse_validation_report(r#"{"stare":"ok","trace_id":"t"}"#).unwrap();
        assert!(ok.is_valid);
        assert!(ok.errors.is_empty());
    }

    #[test]
    fn download_error_json() {
        let body = br#"{"eroare":"Nu exista factura cu id_descarcare=1"}"#.to_vec();
        let outcome = parse_download(Some("application/json"), body);
        assert_eq!(outcome.rejection(), Some("Nu exista factura cu id_descarcare=1"));
    }

    #[test]
    fn download_zip_passthrough() {
        let outcome = parse_download(Some("application/zip"), b"PK\x03\x04".to_vec());
        assert_eq!(outcome, Outcome::Success(b"PK\x03\x04".to_vec()));
    }

    #[test]
    fn conversion_rejected_and_pdf() {
        let body = br#"{"stare":"nok","Messages":[{"message":"bad"}],"trace_id":"t"}"#.to_vec();
        assert!(matches!(
            parse_conversion(Some("application/json"), body),
            Conversion::Rejected(ref r) if r.errors == ["bad"]
        ));

        let pdf = b"%PDF-1.7".to_vec();
        assert_eq!(
            parse_conversion(Some("application/pdf"), pdf.clone()),
            Conversion::Pdf(pdf)
        );
    }
}
