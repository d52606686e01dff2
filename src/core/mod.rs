//! Core types: errors, CIF validation, protocol enums, configuration.
//!
//! Everything in here is free of network and XML dependencies and is
//! always compiled.

mod cif;
mod config;
mod error;
mod types;

pub use cif::*;
pub use config::*;
pub use error::*;
pub use types::*;
