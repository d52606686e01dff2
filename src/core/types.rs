use serde::{Deserialize, Serialize};
use std::fmt;

use super::AnafError;

/// Standard used by the validation and XML-to-PDF conversion endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentStandard {
    /// Invoice (`FACT1`).
    #[default]
    #[serde(rename = "FACT1")]
    Fact1,
    /// Credit note (`FCN`).
    #[serde(rename = "FCN")]
    Fcn,
}

impl DocumentStandard {
    /// Path segment sent to the service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fact1 => "FACT1",
            Self::Fcn => "FCN",
        }
    }
}

impl fmt::Display for DocumentStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntax of an uploaded document (`standard` query parameter).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum XmlStandard {
    /// UBL 2.1 invoice.
    #[default]
    #[serde(rename = "UBL")]
    Ubl,
    /// UBL 2.1 credit note.
    #[serde(rename = "CN")]
    Cn,
    /// UN/CEFACT Cross Industry Invoice.
    #[serde(rename = "CII")]
    Cii,
    /// Buyer response message.
    #[serde(rename = "RASP")]
    Rasp,
}

impl XmlStandard {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ubl => "UBL",
            Self::Cn => "CN",
            Self::Cii => "CII",
            Self::Rasp => "RASP",
        }
    }
}

impl fmt::Display for XmlStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of an e-Factura inbox message (`filtru` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// Invoice errors (`E`).
    #[serde(rename = "E")]
    Error,
    /// Invoice sent (`T`).
    #[serde(rename = "T")]
    Sent,
    /// Invoice received (`P`).
    #[serde(rename = "P")]
    Received,
    /// Buyer message (`R`).
    #[serde(rename = "R")]
    Message,
}

impl MessageType {
    /// One-letter filter code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "E",
            Self::Sent => "T",
            Self::Received => "P",
            Self::Message => "R",
        }
    }

    /// Map the `tip` text of a message list entry.
    ///
    /// Unknown descriptions fall back to [`MessageType::Message`].
    pub fn from_description(tip: &str) -> Self {
        match tip.trim() {
            "FACTURA TRIMISA" => Self::Sent,
            "FACTURA PRIMITA" => Self::Received,
            "ERORI FACTURA" => Self::Error,
            _ => Self::Message,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a call the service answered at the application level.
///
/// ANAF reports most domain failures with HTTP 200 and an error field in
/// the body; those end up in `Rejected` rather than in [`AnafError`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The request succeeded.
    Success(T),
    /// The service refused the request with the given message.
    Rejected(String),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Borrow the success value, if any.
    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(v) => Some(v),
            Self::Rejected(_) => None,
        }
    }

    /// The rejection message, if any.
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Rejected(msg) => Some(msg),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(v) => Outcome::Success(f(v)),
            Self::Rejected(msg) => Outcome::Rejected(msg),
        }
    }

    /// Turn a rejection into [`AnafError::Rejected`].
    pub fn into_result(self) -> Result<T, AnafError> {
        match self {
            Self::Success(v) => Ok(v),
            Self::Rejected(msg) => Err(AnafError::Rejected(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_from_description() {
        assert_eq!(MessageType::from_description("FACTURA TRIMISA"), MessageType::Sent);
        assert_eq!(MessageType::from_description("FACTURA PRIMITA"), MessageType::Received);
        assert_eq!(MessageType::from_description("ERORI FACTURA"), MessageType::Error);
        assert_eq!(
            MessageType::from_description("MESAJ CUMPARATOR PRIMIT"),
            MessageType::Message
        );
    }

    #[test]
    fn codes() {
        assert_eq!(DocumentStandard::default().as_str(), "FACT1");
        assert_eq!(XmlStandard::Cii.to_string(), "CII");
        assert_eq!(MessageType::Received.as_str(), "P");
    }

    #[test]
    fn outcome_into_result() {
        let ok: Outcome<u32> = Outcome::Success(7);
        assert_eq!(ok.into_result().unwrap(), 7);

        let rejected: Outcome<u32> = Outcome::Rejected("Nu exista mesaje".into());
        assert!(matches!(
            rejected.into_result(),
            Err(AnafError::Rejected(ref m)) if m == "Nu exista mesaje"
        ));
    }
}
