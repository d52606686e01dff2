use std::fs;
use std::path::Path;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::core::AnafError;

/// Inputs at least this long are never treated as file paths.
pub const MAX_PATH_LEN: usize = 2048;

/// Local file header signature every ZIP archive starts with.
pub const ZIP_MAGIC: &[u8] = b"PK";

const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// How an archive input was recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Path to a readable regular file.
    Path,
    /// ZIP bytes, starting with `PK`.
    RawZip,
    /// Base64 text decoding to ZIP bytes.
    Base64Zip,
}

type Resolver = fn(&[u8]) -> Option<Vec<u8>>;

/// Classify `input` and return the ZIP bytes it stands for.
///
/// Tried in order: file path, raw ZIP, base64 ZIP. The first kind that
/// matches is final, and its bytes must start with `PK`. Every failure
/// collapses into the same [`AnafError::Archive`].
pub fn resolve(input: &[u8]) -> Result<(InputKind, Vec<u8>), AnafError> {
    let pipeline: &[(InputKind, Resolver)] = &[
        (InputKind::Path, resolve_path),
        (InputKind::RawZip, resolve_raw),
        (InputKind::Base64Zip, resolve_base64),
    ];

    pipeline
        .iter()
        .find_map(|&(kind, resolver)| resolver(input).map(|bytes| (kind, bytes)))
        .filter(|(_, bytes)| is_zip(bytes))
        .ok_or(AnafError::Archive)
}

fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC)
}

fn resolve_path(input: &[u8]) -> Option<Vec<u8>> {
    let path = std::str::from_utf8(input).ok()?;
    if path.is_empty() || path.chars().count() >= MAX_PATH_LEN {
        return None;
    }
    let path = Path::new(path);
    if !path.is_file() {
        return None;
    }
    fs::read(path).ok()
}

fn resolve_raw(input: &[u8]) -> Option<Vec<u8>> {
    is_zip(input).then(|| input.to_vec())
}

fn resolve_base64(input: &[u8]) -> Option<Vec<u8>> {
    let looks_base64 = input.iter().all(|&b| {
        b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=') || b.is_ascii_whitespace()
    });
    if input.is_empty() || !looks_base64 {
        return None;
    }

    let compact: Vec<u8> = input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    BASE64.decode(compact).ok().filter(|bytes| is_zip(bytes))
}

/// Decode a base64 archive body, as returned by some download proxies.
pub(crate) fn decode_base64(text: &str) -> Result<Vec<u8>, AnafError> {
    resolve_base64(text.as_bytes()).ok_or(AnafError::Archive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_zip_is_recognised() {
        let (kind, bytes) = resolve(b"PK\x03\x04rest").unwrap();
        assert_eq!(kind, InputKind::RawZip);
        assert_eq!(bytes, b"PK\x03\x04rest");
    }

    #[test]
    fn base64_zip_is_recognised() {
        let encoded = BASE64.encode(b"PK\x03\x04rest");
        let (kind, bytes) = resolve(encoded.as_bytes()).unwrap();
        assert_eq!(kind, InputKind::Base64Zip);
        assert_eq!(bytes, b"PK\x03\x04rest");
    }

    #[test]
    fn base64_with_line_breaks_and_no_padding() {
        let encoded = BASE64.encode(b"PK\x03\x04abcdefgh");
        let trimmed = encoded.trim_end_matches('=');
        let wrapped = format!("{}\r\n{}", &trimmed[..8], &trimmed[8..]);
        let (kind, _) = resolve(wrapped.as_bytes()).unwrap();
        assert_eq!(kind, InputKind::Base64Zip);
    }

    #[test]
    fn base64_of_non_zip_is_rejected() {
        let encoded = BASE64.encode(b"not-a-valid-zip-archive");
        assert!(matches!(resolve(encoded.as_bytes()), Err(AnafError::Archive)));
    }

    #[test]
    fn plain_text_is_rejected() {
        assert!(matches!(resolve(b"not-a-valid-zip-archive"), Err(AnafError::Archive)));
        assert!(matches!(resolve(b""), Err(AnafError::Archive)));
    }

    #[test]
    fn readable_non_zip_file_fails_on_path_branch() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, b"plain text").unwrap();
        let path = file.to_str().unwrap().as_bytes();

        assert_eq!(resolve_path(path).as_deref(), Some(&b"plain text"[..]));
        assert!(matches!(resolve(path), Err(AnafError::Archive)));
    }

    #[test]
    fn overlong_input_is_not_a_path() {
        let long = "a".repeat(MAX_PATH_LEN);
        assert!(resolve_path(long.as_bytes()).is_none());
    }
}
