//! Canonical food model.

mod barcode;
mod types;

pub use barcode::normalize_barcode;
pub use types::*;
