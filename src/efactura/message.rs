//! Inbox listings (`/listaMesajeFactura`, `/listaMesajePaginatieFactura`).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{AnafError, MessageType, Outcome};
use crate::http::{lenient_u64, rejection};

/// `data_creare` layout, e.g. `202211011415`.
const CREATED_AT_FORMAT: &str = "%Y%m%d%H%M";

/// One entry of the e-Factura inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// CIF the message belongs to.
    pub cif: u64,
    /// `id_solicitare`: upload index of the related invoice.
    pub upload_id: u64,
    /// `id`: identifier to pass to `/descarcare`.
    pub download_id: u64,
    pub created_at: NaiveDateTime,
    pub kind: MessageType,
    pub description: String,
}

/// Result of `/listaMesajeFactura`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageList {
    /// `serial` of the listing.
    pub hash: String,
    pub messages: Vec<Message>,
}

/// Pagination data of `/listaMesajePaginatieFactura`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(rename = "numar_total_inregistrari", default, deserialize_with = "lenient_u64")]
    pub total: u64,
    #[serde(
        rename = "numar_total_inregistrari_per_pagina",
        default,
        deserialize_with = "lenient_u64"
    )]
    pub per_page: u64,
    #[serde(rename = "index_pagina_curenta", default, deserialize_with = "lenient_u64")]
    pub current_page: u64,
    #[serde(rename = "numar_total_pagini", default, deserialize_with = "lenient_u64")]
    pub last_page: u64,
}

/// Result of `/listaMesajePaginatieFactura`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePage {
    pub hash: String,
    pub messages: Vec<Message>,
    pub meta: Meta,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    data_creare: String,
    #[serde(deserialize_with = "lenient_u64")]
    cif: u64,
    #[serde(deserialize_with = "lenient_u64")]
    id_solicitare: u64,
    #[serde(default)]
    detalii: String,
    #[serde(default)]
    tip: String,
    #[serde(deserialize_with = "lenient_u64")]
    id: u64,
}

impl RawMessage {
    fn into_message(self) -> Result<Message, AnafError> {
        let created_at = NaiveDateTime::parse_from_str(self.data_creare.trim(), CREATED_AT_FORMAT)
            .map_err(|e| {
                AnafError::InvalidResponse(format!(
                    "invalid data_creare '{}': {e}",
                    self.data_creare
                ))
            })?;
        Ok(Message {
            cif: self.cif,
            upload_id: self.id_solicitare,
            download_id: self.id,
            created_at,
            kind: MessageType::from_description(&self.tip),
            description: self.detalii,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawListing {
    #[serde(default)]
    mesaje: Vec<RawMessage>,
    #[serde(default)]
    serial: Option<String>,
}

fn parse_listing(body: &str) -> Result<Outcome<(String, Vec<Message>, Value)>, AnafError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| AnafError::InvalidResponse(format!("message list: {e}")))?;
    if let Some(msg) = rejection(&json) {
        return Ok(Outcome::Rejected(msg));
    }

    let raw: RawListing = serde_json::from_value(json.clone())
        .map_err(|e| AnafError::InvalidResponse(format!("message list: {e}")))?;
    let messages = raw
        .mesaje
        .into_iter()
        .map(RawMessage::into_message)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Outcome::Success((raw.serial.unwrap_or_default(), messages, json)))
}

/// Parse a `/listaMesajeFactura` body.
pub fn parse_messages(body: &str) -> Result<Outcome<MessageList>, AnafError> {
    Ok(parse_listing(body)?.map(|(hash, messages, _)| MessageList { hash, messages }))
}

/// Parse a `/listaMesajePaginatieFactura` body.
pub fn parse_paginated_messages(body: &str) -> Result<Outcome<MessagePage>, AnafError> {
    match parse_listing(body)? {
        Outcome::Success((hash, messages, json)) => {
            let meta: Meta = serde_json::from_value(json)
                .map_err(|e| AnafError::InvalidResponse(format!("pagination: {e}")))?;
            Ok(Outcome::Success(MessagePage {
                hash,
                messages,
                meta,
            }))
        }
        Outcome::Rejected(msg) => Ok(Outcome::Rejected(msg)),
    }
}
