//! e-Factura REST client.
//!
//! ```no_run
//! use anaf::efactura::{EfacturaClient, UploadOptions};
//! use anaf::AnafConfig;
//!
//! # async fn run() -> Result<(), anaf::AnafError> {
//! let client = EfacturaClient::new("access-token", &AnafConfig::from_env())?;
//! let upload_id = client
//!     .upload_invoice("RO29930516", "invoice.xml", &UploadOptions::default())
//!     .await?
//!     .into_result()?;
//! let status = client.message_status(upload_id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Domain errors the service returns with HTTP 200 (`eroare`,
//! `Errors/@errorMessage`) come back as [`crate::Outcome::Rejected`];
//! transport and HTTP failures as [`crate::AnafError`].

mod client;
mod message;
mod response;

pub use client::{DEFAULT_MESSAGE_DAYS, EfacturaClient, PRODUCTION_URL, TEST_URL, UploadOptions};
pub use message::{Message, MessageList, MessagePage, Meta, parse_messages, parse_paginated_messages};
pub use response::{
    Conversion, MessageStatus, ValidationReport, parse_conversion, parse_download,
    parse_status_response, parse_upload_response, parse_validation_report,
};
