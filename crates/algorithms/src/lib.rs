//! # firescar algorithms
//!
//! Burn-severity pipeline over co-registered NBR rasters.
//!
//! ## Stages
//!
//! - **imagery**: NBR, scaled dNBR, severity classification
//! - **statistics**: pixels, hectares and percentage per class within a region
//! - **report**: per-region tables in the burned-area CSV layout
//! - **severity**: the eight classes and the threshold table

mod maybe_rayon;

pub mod imagery;
pub mod report;
pub mod severity;
pub mod statistics;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::imagery::{
        classify_severity, dnbr, nbr, Dnbr, DnbrParams, Platform, SeverityClassification,
    };
    pub use crate::report::{ReportRow, SeverityReport, REPORT_COLUMNS};
    pub use crate::severity::{
        legend, ClassifiedRaster, SeverityClass, ThresholdTable, CLASS_COUNT, CLASS_NODATA,
    };
    pub use crate::statistics::{
        burned_area, burned_area_by_region, AreaParams, ClassStat, RegionStats, TotalPolicy,
    };
    pub use firescar_core::prelude::*;
}
