//! # firescar core
//!
//! Core types and I/O shared by the firescar crates:
//! - `Raster<T>`: georeferenced grid with a no-data mask
//! - `GeoTransform`: affine transformation for georeferencing
//! - `CRS`: coordinate reference system identity
//! - `Region`: named polygon scoping burned-area statistics
//! - GeoTIFF reading and writing

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use vector::Region;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::vector::{parse_regions, read_regions, Region};
    pub use crate::Algorithm;
}

/// Core trait for the processing stages of firescar.
///
/// Stages are pure functions that transform input data according to parameters.
pub trait Algorithm {
    type Input;
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    type Error: std::error::Error;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
