//! Namespace-agnostic XML decoding.
//!
//! ANAF answers status checks and uploads with small XML documents whose
//! namespaces differ per endpoint and version. [`convert`] turns any such
//! document into a generic [`Element`] tree keyed by local tag name, so
//! callers can pick out attributes like `index_incarcare` or
//! `Errors/@errorMessage` without binding to a schema.
//!
//! # Reserved keys
//!
//! When serialized (e.g. with `serde_json`) an [`Element`] uses the
//! following reserved keys next to its child tag names:
//!
//! | Key | Holds |
//! |-----|-------|
//! | `@attributes` | flat map of attribute local name to value |
//! | `@content` | text of an element that also has attributes |
//! | `@root` | local name of the document element (only on request) |

mod decode;
mod node;

pub use decode::convert;
pub use node::{Element, Entry, Node};

/// Key of the attribute map.
pub const ATTRIBUTES_KEY: &str = "@attributes";

/// Key of the text of an attribute-bearing element.
pub const CONTENT_KEY: &str = "@content";

/// Key of the document element name marker.
pub const ROOT_KEY: &str = "@root";
