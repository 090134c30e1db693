//! Normalized Burn Ratio from single-band reflectance rasters

use crate::maybe_rayon::*;
use firescar_core::raster::Raster;
use firescar_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Satellite platforms with their NBR band pair and native resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// Landsat 8 OLI, 30 m
    #[default]
    Landsat8,
    /// Sentinel-2 MSI, 10 m
    Sentinel2,
}

impl Platform {
    /// Near-infrared band name
    pub fn nir_band(self) -> &'static str {
        match self {
            Platform::Landsat8 => "B5",
            Platform::Sentinel2 => "B8",
        }
    }

    /// Shortwave-infrared band name used by NBR
    pub fn swir_band(self) -> &'static str {
        match self {
            Platform::Landsat8 => "B7",
            Platform::Sentinel2 => "B12",
        }
    }

    /// Native pixel side length in meters
    pub fn pixel_size(self) -> f64 {
        match self {
            Platform::Landsat8 => 30.0,
            Platform::Sentinel2 => 10.0,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Landsat8 => f.write_str("Landsat 8"),
            Platform::Sentinel2 => f.write_str("Sentinel-2"),
        }
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "l8" | "landsat8" | "landsat-8" => Ok(Platform::Landsat8),
            "s2" | "sentinel2" | "sentinel-2" => Ok(Platform::Sentinel2),
            _ => Err(Error::InvalidParameter {
                name: "platform",
                value: s.to_string(),
                reason: "expected l8 or s2".into(),
            }),
        }
    }
}

/// Compute the normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// Cells where either band is masked, or where the sum is zero, are NaN.
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<Raster<f64>> {
    band_a.check_coregistered(band_b)?;

    let (rows, cols) = band_a.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let a = unsafe { band_a.get_unchecked(row, col) };
                let b = unsafe { band_b.get_unchecked(row, col) };

                if band_a.is_nodata(a) || band_b.is_nodata(b) {
                    continue;
                }

                let sum = a + b;
                if sum.abs() < 1e-10 {
                    continue;
                }
                *out = (a - b) / sum;
            }
            row_data
        })
        .collect();

    band_a.derive(data, Some(f64::NAN))
}

/// Normalized Burn Ratio
///
/// `NBR = (NIR - SWIR) / (NIR + SWIR)`
///
/// Healthy vegetation has high NBR; freshly burned surfaces have low or
/// negative NBR. See [`Platform`] for the band pair of each sensor.
pub fn nbr(nir: &Raster<f64>, swir: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(nir, swir)
}
