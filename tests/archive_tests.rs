//! Archive extraction from every supported input kind.
//!
//! Run with: `cargo test --features archive --test archive_tests`

#![cfg(feature = "archive")]

use std::io::{Cursor, Write};

use anaf::AnafError;
use anaf::archive::{ArchiveBundle, InputKind};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use zip::write::SimpleFileOptions;

const INVOICE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"><ID>FCT-001</ID></Invoice>"#;
const SIGNATURE: &str = r#"<Signature xmlns="http://www.w3.org/2000/09/xmldsig#"/>"#;

fn efactura_zip() -> Vec<u8> {
    zip_of(&[
        ("4212345678.xml", INVOICE),
        ("semnatura_4212345678.xml", SIGNATURE),
    ])
}

fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn assert_payloads(bundle: &ArchiveBundle) {
    assert_eq!(bundle.xml_invoice(), Some(INVOICE.as_bytes()));
    assert_eq!(bundle.signature(), Some(SIGNATURE.as_bytes()));
}

// --- Input kinds ---

#[test]
fn from_file_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&efactura_zip()).unwrap();
    let path = file.path().to_str().unwrap();

    let bundle = ArchiveBundle::from_input(path).unwrap();
    assert_eq!(bundle.source(), InputKind::Path);
    assert_payloads(&bundle);

    assert_eq!(ArchiveBundle::from_path(file.path()).unwrap(), bundle);
}

#[test]
fn from_raw_bytes() {
    let bundle = ArchiveBundle::from_input(efactura_zip()).unwrap();
    assert_eq!(bundle.source(), InputKind::RawZip);
    assert_payloads(&bundle);
}

#[test]
fn from_base64_text() {
    let encoded = STANDARD.encode(efactura_zip());
    let bundle = ArchiveBundle::from_input(&encoded).unwrap();
    assert_eq!(bundle.source(), InputKind::Base64Zip);
    assert_payloads(&bundle);
}

#[test]
fn base64_with_line_breaks_and_no_padding() {
    let encoded = STANDARD_NO_PAD.encode(efactura_zip());
    let wrapped: String = encoded
        .as_bytes()
        .chunks(76)
        .map(|line| format!("{}\r\n", std::str::from_utf8(line).unwrap()))
        .collect();

    let bundle = ArchiveBundle::from_input(&wrapped).unwrap();
    assert_payloads(&bundle);
    assert_eq!(ArchiveBundle::from_base64(&wrapped).unwrap(), bundle);
}

#[test]
fn all_input_kinds_agree() {
    let bytes = efactura_zip();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();

    let from_path = ArchiveBundle::from_input(file.path().to_str().unwrap()).unwrap();
    let from_raw = ArchiveBundle::from_input(&bytes).unwrap();
    let from_b64 = ArchiveBundle::from_input(STANDARD.encode(&bytes)).unwrap();

    assert_eq!(from_path.clone().into_parts(), from_raw.clone().into_parts());
    assert_eq!(from_raw.into_parts(), from_b64.into_parts());
}

// --- Failures ---

#[test]
fn rejects_garbage() {
    let inputs: Vec<Vec<u8>> = vec![
        b"not-a-valid-zip-archive".to_vec(),
        STANDARD.encode("not-a-valid-zip-archive").into_bytes(),
        Vec::new(),
        b"/definitely/not/a/file.zip".to_vec(),
        vec![0xff, 0xfe, 0x00],
    ];
    for input in inputs {
        let err = ArchiveBundle::from_input(&input).unwrap_err();
        assert!(matches!(err, AnafError::Archive));
        assert_eq!(
            err.to_string(),
            "archive must be a readable file path, raw ZIP bytes, or base64-encoded ZIP"
        );
    }
}

#[test]
fn file_that_is_not_a_zip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"<Invoice/>").unwrap();
    assert!(matches!(
        ArchiveBundle::from_input(file.path().to_str().unwrap()),
        Err(AnafError::Archive)
    ));
    assert!(matches!(
        ArchiveBundle::from_path(file.path()),
        Err(AnafError::Archive)
    ));
}

#[test]
fn directory_path_is_not_a_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        ArchiveBundle::from_input(dir.path().to_str().unwrap()),
        Err(AnafError::Archive)
    ));
}

// --- Contents ---

#[test]
fn signature_only_archive() {
    let bundle = ArchiveBundle::from_bytes(&zip_of(&[("semnatura_1.xml", SIGNATURE)])).unwrap();
    assert!(bundle.xml_invoice().is_none());
    assert_eq!(bundle.signature(), Some(SIGNATURE.as_bytes()));
}

#[test]
fn empty_archive() {
    let bundle = ArchiveBundle::from_bytes(&zip_of(&[])).unwrap();
    assert_eq!(bundle.into_parts(), (None, None));
}

#[cfg(feature = "xml")]
#[test]
fn structural_export() {
    use anaf::archive::StructuralReader;

    let bundle = ArchiveBundle::from_bytes(&efactura_zip()).unwrap();
    let export = bundle.export(&StructuralReader).unwrap();
    let json = serde_json::to_value(&export).unwrap();

    assert_eq!(json["xmlInvoice"], INVOICE);
    assert_eq!(json["signature"], SIGNATURE);
    assert_eq!(json["dtoInvoice"]["ID"], "FCT-001");
    assert_eq!(json["dtoInvoice"]["@root"], "Invoice");
}
