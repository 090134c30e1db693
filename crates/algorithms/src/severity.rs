//! Burn-severity classes and the dNBR threshold table
//!
//! The eight ordinal classes follow the UN-SPIDER / USGS dNBR scheme. Class
//! indices are canonical (0..=7) and are what a [`ClassifiedRaster`] stores;
//! legends use a different display order, see [`legend`].

use std::fmt;
use std::str::FromStr;
use firescar_core::raster::Raster;
use firescar_core::{Error, Result};

/// Number of severity classes
pub const CLASS_COUNT: usize = 8;

/// No-data marker stored in a [`ClassifiedRaster`]
pub const CLASS_NODATA: u8 = 255;

/// Raster of severity class indices (0..=7), masked cells hold [`CLASS_NODATA`]
pub type ClassifiedRaster = Raster<u8>;

/// Ordinal burn-severity category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum SeverityClass {
    /// dNBR below the lowest threshold
    Na = 0,
    HighSeverity = 1,
    ModerateHighSeverity = 2,
    ModerateLowSeverity = 3,
    LowSeverity = 4,
    Unburned = 5,
    EnhancedRegrowthLow = 6,
    EnhancedRegrowthHigh = 7,
}

impl SeverityClass {
    /// All classes in canonical index order
    pub const ALL: [SeverityClass; CLASS_COUNT] = [
        SeverityClass::Na,
        SeverityClass::HighSeverity,
        SeverityClass::ModerateHighSeverity,
        SeverityClass::ModerateLowSeverity,
        SeverityClass::LowSeverity,
        SeverityClass::Unburned,
        SeverityClass::EnhancedRegrowthLow,
        SeverityClass::EnhancedRegrowthHigh,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Human-readable label, as written in the report's `Class` column
    pub fn label(self) -> &'static str {
        match self {
            SeverityClass::Na => "NA",
            SeverityClass::HighSeverity => "High Severity",
            SeverityClass::ModerateHighSeverity => "Moderate-high Severity",
            SeverityClass::ModerateLowSeverity => "Moderate-low Severity",
            SeverityClass::LowSeverity => "Low Severity",
            SeverityClass::Unburned => "Unburned",
            SeverityClass::EnhancedRegrowthLow => "Enhanced Regrowth, Low",
            SeverityClass::EnhancedRegrowthHigh => "Enhanced Regrowth, High",
        }
    }

    /// Legend colour as an RGB hex string (no leading `#`)
    pub fn color(self) -> &'static str {
        match self {
            SeverityClass::Na => "ffffff",
            SeverityClass::HighSeverity => "a41fd6",
            SeverityClass::ModerateHighSeverity => "ff641b",
            SeverityClass::ModerateLowSeverity => "ffaf38",
            SeverityClass::LowSeverity => "fff70b",
            SeverityClass::Unburned => "0ae042",
            SeverityClass::EnhancedRegrowthLow => "acbe4d",
            SeverityClass::EnhancedRegrowthHigh => "7a8737",
        }
    }
}

impl fmt::Display for SeverityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classes in legend display order (regrowth first, NA last).
///
/// Display order only; reports always use [`SeverityClass::ALL`].
pub fn legend() -> [SeverityClass; CLASS_COUNT] {
    let mut classes = SeverityClass::ALL;
    classes.reverse();
    classes
}

/// Eight strictly ascending dNBR upper bounds, one per class.
///
/// A value `v` belongs to the smallest class `i` with `v < T[i]`. A value at
/// or above the last bound (possible only when it is finite) belongs to the
/// top class, so every valid value maps to exactly one class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTable([f64; CLASS_COUNT]);

impl ThresholdTable {
    /// USGS dNBR breakpoints, open-ended top class
    pub const USGS: [f64; CLASS_COUNT] = [-1000.0, -251.0, -101.0, 99.0, 269.0, 439.0, 659.0, f64::INFINITY];

    pub fn new(values: &[f64]) -> Result<Self> {
        let table: [f64; CLASS_COUNT] = values.try_into().map_err(|_| {
            Error::InvalidThresholdTable(format!(
                "expected {} thresholds, got {}",
                CLASS_COUNT,
                values.len()
            ))
        })?;

        if let Some(i) = table.iter().position(|v| v.is_nan()) {
            return Err(Error::InvalidThresholdTable(format!("threshold {} is NaN", i)));
        }
        if let Some(w) = table.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::InvalidThresholdTable(format!(
                "thresholds must be strictly ascending ({} >= {})",
                w[0], w[1]
            )));
        }

        Ok(Self(table))
    }

    pub fn usgs() -> Self {
        Self(Self::USGS)
    }

    pub fn values(&self) -> &[f64; CLASS_COUNT] {
        &self.0
    }

    /// Class of a valid (non-NaN) dNBR value
    pub fn classify(&self, value: f64) -> SeverityClass {
        let index = self
            .0
            .iter()
            .position(|&t| value < t)
            .unwrap_or(CLASS_COUNT - 1);
        SeverityClass::ALL[index]
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::usgs()
    }
}

/// Parses a comma-separated list such as `-1000,-251,-101,99,269,439,659,inf`
impl FromStr for ThresholdTable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<f64>().map_err(|_| {
                    Error::InvalidThresholdTable(format!("'{}' is not a number", part))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(&values)
    }
}
