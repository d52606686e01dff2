//! # anaf
//!
//! Client library for the Romanian tax authority (ANAF) web services:
//! e-Factura invoice exchange, the public taxpayer registry and the OAuth2
//! login, plus the offline pieces those services need, namely CIF
//! validation, namespace-agnostic XML decoding and extraction of the
//! e-Factura download archives.
//!
//! ## Quick Start
//!
//! ```rust
//! use anaf::{validate_cif, Cif};
//!
//! assert!(validate_cif("RO29930516"));
//! assert!(!validate_cif(29930517));
//!
//! let cif = Cif::parse("RO 29930516").unwrap();
//! assert_eq!(cif.as_str(), "29930516");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Errors, CIF validation, protocol enums, configuration |
//! | `xml` | Structural XML decoder |
//! | `archive` | e-Factura ZIP extraction (path, raw bytes, base64) |
//! | `efactura` | e-Factura REST client |
//! | `taxpayer` | VAT status and balance sheet lookups |
//! | `oauth` | OAuth2 authorization-code flow |
//! | `all` | Everything |
//!
//! The library logs through [`tracing`] and never installs a subscriber.

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "archive")]
pub mod archive;

#[cfg(feature = "efactura")]
pub mod efactura;

#[cfg(feature = "taxpayer")]
pub mod taxpayer;

#[cfg(feature = "oauth")]
pub mod oauth;

#[cfg(any(feature = "efactura", feature = "taxpayer", feature = "oauth"))]
pub(crate) mod http;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
