use std::io::{Cursor, Read};
use std::path::Path;

use serde::Serialize;

use super::input::{self, InputKind};
use crate::core::AnafError;

/// Entries whose name starts with this prefix hold the XML signature.
pub const SIGNATURE_PREFIX: &str = "semnatura_";

/// Parses invoice XML into a business-document object.
///
/// Implemented for any `Fn(&[u8]) -> Result<I, E>`, so a UBL reader from
/// another crate can be plugged in with a closure.
pub trait InvoiceReader {
    type Invoice;
    type Error;

    fn read(&self, xml: &[u8]) -> Result<Self::Invoice, Self::Error>;
}

impl<F, I, E> InvoiceReader for F
where
    F: Fn(&[u8]) -> Result<I, E>,
{
    type Invoice = I;
    type Error = E;

    fn read(&self, xml: &[u8]) -> Result<I, E> {
        self(xml)
    }
}

/// Reads the invoice into the generic [`crate::xml::Element`] tree.
#[cfg(feature = "xml")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralReader;

#[cfg(feature = "xml")]
impl InvoiceReader for StructuralReader {
    type Invoice = crate::xml::Element;
    type Error = AnafError;

    fn read(&self, xml: &[u8]) -> Result<Self::Invoice, Self::Error> {
        let text = std::str::from_utf8(xml).map_err(|e| AnafError::Xml(e.to_string()))?;
        crate::xml::convert(text, true)
    }
}

/// The invoice XML and its signature, as downloaded from e-Factura.
///
/// Built from a path, raw ZIP bytes, or base64 text. Either construction
/// fails as a whole or the bundle holds whatever the archive contained:
/// a ZIP with only a signature entry leaves the invoice slot empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveBundle {
    source: InputKind,
    xml_invoice: Option<Vec<u8>>,
    signature: Option<Vec<u8>>,
}

/// Combined view of a bundle, with the invoice parsed by an [`InvoiceReader`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleExport<I> {
    pub xml_invoice: Option<String>,
    pub dto_invoice: Option<I>,
    pub signature: Option<String>,
}

impl ArchiveBundle {
    /// Detect the input kind (path, raw ZIP, base64 ZIP) and extract.
    ///
    /// # Errors
    ///
    /// [`AnafError::Archive`] for any input that is not one of the three
    /// kinds, or whose bytes do not open as a ZIP container.
    pub fn from_input(input: impl AsRef<[u8]>) -> Result<Self, AnafError> {
        let (source, bytes) = input::resolve(input.as_ref())?;
        tracing::debug!(source = ?source, size = bytes.len(), "archive input classified");
        Self::unzip(source, &bytes)
    }

    /// Read and extract the archive at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnafError> {
        let bytes = std::fs::read(path.as_ref()).map_err(|_| AnafError::Archive)?;
        if !bytes.starts_with(input::ZIP_MAGIC) {
            return Err(AnafError::Archive);
        }
        Self::unzip(InputKind::Path, &bytes)
    }

    /// Extract from raw ZIP bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AnafError> {
        if !bytes.starts_with(input::ZIP_MAGIC) {
            return Err(AnafError::Archive);
        }
        Self::unzip(InputKind::RawZip, bytes)
    }

    /// Extract from base64 text (line breaks and missing padding allowed).
    pub fn from_base64(text: &str) -> Result<Self, AnafError> {
        let bytes = input::decode_base64(text)?;
        Self::unzip(InputKind::Base64Zip, &bytes)
    }

    fn unzip(source: InputKind, bytes: &[u8]) -> Result<Self, AnafError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            tracing::debug!(error = %e, "archive is not a readable ZIP container");
            AnafError::Archive
        })?;

        let mut xml_invoice = None;
        let mut signature = None;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|_| AnafError::Archive)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut content = Vec::new();
            entry
                .read_to_end(&mut content)
                .map_err(|_| AnafError::Archive)?;

            if name.starts_with(SIGNATURE_PREFIX) {
                signature = Some(content);
            } else {
                if xml_invoice.is_some() {
                    tracing::warn!(entry = %name, "archive has several invoice entries, keeping the last one");
                }
                xml_invoice = Some(content);
            }
        }

        Ok(Self {
            source,
            xml_invoice,
            signature,
        })
    }

    /// How the input was recognised.
    pub fn source(&self) -> InputKind {
        self.source
    }

    /// The invoice XML, if the archive had a non-signature entry.
    pub fn xml_invoice(&self) -> Option<&[u8]> {
        self.xml_invoice.as_deref()
    }

    /// The detached signature XML, if present.
    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    /// Parse the invoice XML with `reader`. Runs on every call.
    pub fn dto_invoice<R: InvoiceReader>(
        &self,
        reader: &R,
    ) -> Result<Option<R::Invoice>, R::Error> {
        self.xml_invoice.as_deref().map(|xml| reader.read(xml)).transpose()
    }

    /// Both payloads as text plus the parsed invoice.
    pub fn export<R: InvoiceReader>(&self, reader: &R) -> Result<BundleExport<R::Invoice>, R::Error> {
        Ok(BundleExport {
            xml_invoice: self.xml_invoice.as_deref().map(lossy),
            dto_invoice: self.dto_invoice(reader)?,
            signature: self.signature.as_deref().map(lossy),
        })
    }

    /// Split into `(invoice, signature)`.
    pub fn into_parts(self) -> (Option<Vec<u8>>, Option<Vec<u8>>) {
        (self.xml_invoice, self.signature)
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn splits_invoice_and_signature() {
        let bytes = zip_of(&[
            ("4212345678.xml", "<Invoice/>"),
            ("semnatura_4212345678.xml", "<Signature/>"),
        ]);
        let bundle = ArchiveBundle::from_bytes(&bytes).unwrap();
        assert_eq!(bundle.xml_invoice(), Some(&b"<Invoice/>"[..]));
        assert_eq!(bundle.signature(), Some(&b"<Signature/>"[..]));
        assert_eq!(bundle.source(), InputKind::RawZip);
    }

    #[test]
    fn signature_only_leaves_invoice_empty() {
        let bytes = zip_of(&[("semnatura_x.xml", "<Signature/>")]);
        let bundle = ArchiveBundle::from_bytes(&bytes).unwrap();
        assert!(bundle.xml_invoice().is_none());
        assert_eq!(bundle.signature(), Some(&b"<Signature/>"[..]));
    }

    #[test]
    fn last_invoice_entry_wins() {
        let bytes = zip_of(&[("a.xml", "<A/>"), ("b.xml", "<B/>")]);
        let bundle = ArchiveBundle::from_bytes(&bytes).unwrap();
        assert_eq!(bundle.xml_invoice(), Some(&b"<B/>"[..]));
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        let bytes = zip_of(&[("Semnatura_x.xml", "<S/>")]);
        let bundle = ArchiveBundle::from_bytes(&bytes).unwrap();
        assert_eq!(bundle.xml_invoice(), Some(&b"<S/>"[..]));
        assert!(bundle.signature().is_none());
    }

    #[test]
    fn pk_prefix_without_container_fails() {
        assert!(matches!(
            ArchiveBundle::from_input("PK but not really a zip"),
            Err(AnafError::Archive)
        ));
    }

    #[test]
    fn closure_reader() {
        let bytes = zip_of(&[("f.xml", "<Invoice>42</Invoice>")]);
        let bundle = ArchiveBundle::from_bytes(&bytes).unwrap();
        let reader = |xml: &[u8]| -> Result<usize, AnafError> { Ok(xml.len()) };
        assert_eq!(bundle.dto_invoice(&reader).unwrap(), Some(21));
    }

    #[test]
    fn export_combines_payloads() {
        let bytes = zip_of(&[("f.xml", "<Invoice/>"), ("semnatura_f.xml", "<Sig/>")]);
        let bundle = ArchiveBundle::from_bytes(&bytes).unwrap();
        let reader = |xml: &[u8]| -> Result<usize, AnafError> { Ok(xml.len()) };
        let export = bundle.export(&reader).unwrap();
        assert_eq!(export.xml_invoice.as_deref(), Some("<Invoice/>"));
        assert_eq!(export.signature.as_deref(), Some("<Sig/>"));
        assert_eq!(export.dto_invoice, Some(10));
    }
}
