//! e-Factura download archives.
//!
//! `/descarcare` returns a ZIP holding the invoice XML and a detached
//! signature named `semnatura_<id>.xml`. [`ArchiveBundle`] accepts that
//! archive as a file path, raw bytes, or base64 text and splits it into the
//! two payloads.
//!
//! # Example
//!
//! ```no_run
//! use anaf::archive::ArchiveBundle;
//!
//! let bundle = ArchiveBundle::from_input("/tmp/4212345678.zip")?;
//! let invoice = bundle.xml_invoice().unwrap_or_default();
//! let signature = bundle.signature().unwrap_or_default();
//! # Ok::<(), anaf::AnafError>(())
//! ```

mod bundle;
mod input;

#[cfg(feature = "xml")]
pub use bundle::StructuralReader;
pub use bundle::{ArchiveBundle, BundleExport, InvoiceReader, SIGNATURE_PREFIX};
pub use input::{InputKind, MAX_PATH_LEN, ZIP_MAGIC};
