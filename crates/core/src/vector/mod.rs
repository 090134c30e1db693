//! Region geometries used to scope burned-area statistics
//!
//! A [`Region`] is a named polygon or multi-polygon expressed in the same
//! coordinate frame as the rasters it is applied to. Regions are independent
//! of the raster extent: they may cover it entirely, partially, or not at all.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{Raster, RasterElement};
use geo::{BoundingRect, Contains};
use geo_types::{Coord, LineString, MultiPolygon, Point, Polygon, Rect};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// A named area of interest
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    name: String,
    geometry: MultiPolygon<f64>,
    crs: Option<CRS>,
}

impl Region {
    /// Create a region from a polygon or multi-polygon
    pub fn new(name: impl Into<String>, geometry: impl Into<MultiPolygon<f64>>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidRegion("region name is empty".into()));
        }

        let geometry = geometry.into();
        if geometry.0.is_empty() || geometry.0.iter().all(|p| p.exterior().0.len() < 4) {
            return Err(Error::InvalidRegion(format!("region '{}' has no polygon", name)));
        }

        Ok(Self {
            name,
            geometry,
            crs: None,
        })
    }

    /// Axis-aligned rectangle region
    pub fn from_bbox(
        name: impl Into<String>,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    ) -> Result<Self> {
        let name = name.into();
        let finite = [min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite());
        if !finite || min_x >= max_x || min_y >= max_y {
            return Err(Error::InvalidRegion(format!(
                "region '{}' has a degenerate bbox ({}, {}, {}, {})",
                name, min_x, min_y, max_x, max_y
            )));
        }

        let rect = Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y });
        Self::new(name, rect.to_polygon())
    }

    /// Region covering the full extent of a raster, carrying its CRS
    pub fn covering<T: RasterElement>(name: impl Into<String>, raster: &Raster<T>) -> Result<Self> {
        let (min_x, min_y, max_x, max_y) = raster.bounds();
        let region = Self::from_bbox(name, min_x, min_y, max_x, max_y)?;
        Ok(region.with_crs(raster.crs().cloned()))
    }

    pub fn with_crs(mut self, crs: Option<CRS>) -> Self {
        self.crs = crs;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    /// Bounding box (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.geometry
            .bounding_rect()
            .map(|r| (r.min().x, r.min().y, r.max().x, r.max().y))
    }

    /// Whether the point lies in the interior of the region
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.geometry.contains(&Point::new(x, y))
    }
}

// ---------------------------------------------------------------------------
// Regions file
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegionsFile {
    regions: Vec<RegionEntry>,
}

/// One entry of a regions file: either `polygons` (list of polygons, each a
/// list of rings, exterior first) or a `bbox` shorthand.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegionEntry {
    name: String,
    #[serde(default)]
    polygons: Option<Vec<Vec<Vec<[f64; 2]>>>>,
    #[serde(default)]
    bbox: Option<[f64; 4]>,
    #[serde(default)]
    epsg: Option<u32>,
}

impl RegionEntry {
    fn into_region(self) -> Result<Region> {
        let region = match (self.polygons, self.bbox) {
            (Some(polygons), None) => {
                let polygons = polygons
                    .into_iter()
                    .map(|rings| polygon_from_rings(&self.name, rings))
                    .collect::<Result<Vec<_>>>()?;
                Region::new(self.name, MultiPolygon::new(polygons))?
            }
            (None, Some([min_x, min_y, max_x, max_y])) => {
                Region::from_bbox(self.name, min_x, min_y, max_x, max_y)?
            }
            _ => {
                return Err(Error::InvalidRegion(format!(
                    "region '{}' must define exactly one of `polygons` or `bbox`",
                    self.name
                )))
            }
        };
        Ok(region.with_crs(self.epsg.map(CRS::from_epsg)))
    }
}

fn polygon_from_rings(name: &str, rings: Vec<Vec<[f64; 2]>>) -> Result<Polygon<f64>> {
    let mut rings = rings.into_iter().map(|ring| {
        if ring.len() < 3 {
            return Err(Error::InvalidRegion(format!(
                "region '{}' has a ring with {} vertices",
                name,
                ring.len()
            )));
        }
        Ok(LineString::from(ring))
    });

    let exterior = rings
        .next()
        .ok_or_else(|| Error::InvalidRegion(format!("region '{}' has an empty polygon", name)))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse regions from a JSON document.
///
/// ```json
/// {"regions": [
///   {"name": "east", "bbox": [30.03, -4.07, 30.18, -3.97]},
///   {"name": "plot", "polygons": [[[[0, 0], [60, 0], [60, 60], [0, 0]]]], "epsg": 32735}
/// ]}
/// ```
pub fn parse_regions(json: &str) -> Result<Vec<Region>> {
    let file: RegionsFile = serde_json::from_str(json)?;
    if file.regions.is_empty() {
        return Err(Error::InvalidRegion("regions file lists no region".into()));
    }

    let mut seen = HashSet::new();
    file.regions
        .into_iter()
        .map(|entry| {
            if !seen.insert(entry.name.clone()) {
                return Err(Error::InvalidRegion(format!("duplicate region name '{}'", entry.name)));
            }
            entry.into_region()
        })
        .collect()
}

/// Read regions from a JSON file (see [`parse_regions`])
pub fn read_regions<P: AsRef<Path>>(path: P) -> Result<Vec<Region>> {
    let json = std::fs::read_to_string(path.as_ref())?;
    parse_regions(&json)
}
