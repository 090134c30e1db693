//! Differenced Normalized Burn Ratio
//!
//! `dNBR = (NBR_pre - NBR_post) * scale`
//!
//! Positive values mean the burn ratio dropped between the two dates
//! (vegetation loss), negative values mean regrowth.

use crate::maybe_rayon::*;
use firescar_core::raster::Raster;
use firescar_core::{Algorithm, Error, Result};

/// USGS scaling of dNBR
pub const DNBR_SCALE: f64 = 1000.0;

/// Parameters for dNBR differencing
#[derive(Debug, Clone)]
pub struct DnbrParams {
    /// Multiplier applied to the raw NBR difference
    pub scale: f64,
}

impl Default for DnbrParams {
    fn default() -> Self {
        Self { scale: DNBR_SCALE }
    }
}

/// dNBR differencing stage
#[derive(Debug, Clone, Default)]
pub struct Dnbr;

impl Algorithm for Dnbr {
    type Input = (Raster<f64>, Raster<f64>);
    type Output = Raster<f64>;
    type Params = DnbrParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "dNBR"
    }

    fn description(&self) -> &'static str {
        "Scaled difference between pre-fire and post-fire Normalized Burn Ratio"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (pre, post) = input;
        dnbr(&pre, &post, params)
    }
}

/// Compute the scaled difference of two co-registered NBR rasters.
///
/// Cells masked in either input are NaN in the output. The output carries the
/// pre-fire raster's grid and a NaN no-data value.
///
/// # Errors
/// `Error::ShapeMismatch` if the rasters differ in shape, resolution, origin
/// or CRS; `Error::InvalidParameter` for a zero or non-finite scale.
pub fn dnbr(pre: &Raster<f64>, post: &Raster<f64>, params: DnbrParams) -> Result<Raster<f64>> {
    if !params.scale.is_finite() || params.scale == 0.0 {
        return Err(Error::InvalidParameter {
            name: "scale",
            value: params.scale.to_string(),
            reason: "must be finite and non-zero".into(),
        });
    }
    pre.check_coregistered(post)?;

    let (rows, cols) = pre.shape();
    let scale = params.scale;

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let a = unsafe { pre.get_unchecked(row, col) };
                let b = unsafe { post.get_unchecked(row, col) };

                if pre.is_nodata(a) || post.is_nodata(b) {
                    continue;
                }
                *out = (a - b) * scale;
            }
            row_data
        })
        .collect();

    pre.derive(data, Some(f64::NAN))
}
