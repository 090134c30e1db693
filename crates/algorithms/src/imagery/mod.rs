//! Imagery stages of the burn-severity pipeline
//!
//! - NBR: normalized burn ratio from NIR and SWIR bands
//! - dNBR: scaled pre/post difference
//! - Classification: dNBR to eight severity classes

mod classify;
mod dnbr;
mod indices;

pub use classify::{classify_severity, SeverityClassification};
pub use dnbr::{dnbr, Dnbr, DnbrParams, DNBR_SCALE};
pub use indices::{nbr, normalized_difference, Platform};
