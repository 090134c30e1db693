//! Region statistics over classified rasters
//!
//! - **burned_area**: pixels, hectares and percentage per severity class

pub mod burned_area;

pub use burned_area::{
    burned_area, burned_area_by_region, count_classes, region_window, AreaParams, ClassStat,
    RegionStats, TotalPolicy, Window, DEFAULT_MAX_PIXELS,
};
