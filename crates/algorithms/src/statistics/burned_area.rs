//! Burned area per severity class within a region
//!
//! Counts classified cells whose centre falls inside a region, converts the
//! counts to hectares and expresses each class as a share of the region's
//! valid cells.

use crate::imagery::Platform;
use crate::maybe_rayon::*;
use crate::severity::{ClassifiedRaster, SeverityClass, CLASS_COUNT};
use firescar_core::{Error, Region, Result};

/// Pixel budget of a single region query
pub const DEFAULT_MAX_PIXELS: usize = 10_000_000;

const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Which cells form the percentage denominator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotalPolicy {
    /// Every valid classified cell in the region
    #[default]
    AllClassified,
    /// Valid cells except class 0 ("NA"); class 0 is still counted in its
    /// own row, so percentages may exceed 100 in sum
    ExcludeNa,
}

/// Parameters for burned-area aggregation
#[derive(Debug, Clone)]
pub struct AreaParams {
    /// Nominal pixel side length in meters
    pub pixel_size: f64,
    /// Largest region window (in cells) a single query may scan
    pub max_pixels: usize,
    pub total_policy: TotalPolicy,
}

impl Default for AreaParams {
    fn default() -> Self {
        Self {
            pixel_size: Platform::Landsat8.pixel_size(),
            max_pixels: DEFAULT_MAX_PIXELS,
            total_policy: TotalPolicy::AllClassified,
        }
    }
}

impl AreaParams {
    /// Defaults with the platform's native pixel size
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            pixel_size: platform.pixel_size(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.pixel_size.is_finite() || self.pixel_size <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "pixel_size",
                value: self.pixel_size.to_string(),
                reason: "must be a positive number of meters".into(),
            });
        }
        if self.max_pixels == 0 {
            return Err(Error::InvalidParameter {
                name: "max_pixels",
                value: "0".into(),
                reason: "must allow at least one pixel".into(),
            });
        }
        Ok(())
    }
}

/// Area statistics of one severity class in one region
#[derive(Debug, Clone, PartialEq)]
pub struct ClassStat {
    pub class: SeverityClass,
    pub pixels: u64,
    pub hectares: f64,
    /// Share of the region's valid cells, rounded to two decimals
    pub percentage: f64,
}

/// Per-class statistics of one region, in canonical class order
#[derive(Debug, Clone, PartialEq)]
pub struct RegionStats {
    pub region: String,
    /// Percentage denominator
    pub total_valid: u64,
    pub classes: Vec<ClassStat>,
}

impl RegionStats {
    pub fn total_pixels(&self) -> u64 {
        self.classes.iter().map(|c| c.pixels).sum()
    }

    pub fn total_hectares(&self) -> f64 {
        self.classes.iter().map(|c| c.hectares).sum()
    }
}

/// Cell window (half-open row and column ranges) of a region's bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl Window {
    pub fn len(&self) -> usize {
        (self.row_end - self.row_start) * (self.col_end - self.col_start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cells of `raster` that can hold the centre of a point of `region`.
///
/// Returns an empty window when the region lies outside the raster.
pub fn region_window(raster: &ClassifiedRaster, region: &Region) -> Window {
    let empty = Window {
        row_start: 0,
        row_end: 0,
        col_start: 0,
        col_end: 0,
    };
    let Some((min_x, min_y, max_x, max_y)) = region.bounds() else {
        return empty;
    };

    let corners = [
        raster.geo_to_pixel(min_x, min_y),
        raster.geo_to_pixel(min_x, max_y),
        raster.geo_to_pixel(max_x, min_y),
        raster.geo_to_pixel(max_x, max_y),
    ];
    if corners.iter().any(|(c, r)| c.is_nan() || r.is_nan()) {
        return empty;
    }

    let (mut c0, mut r0) = (f64::INFINITY, f64::INFINITY);
    let (mut c1, mut r1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (c, r) in corners {
        c0 = c0.min(c);
        c1 = c1.max(c);
        r0 = r0.min(r);
        r1 = r1.max(r);
    }

    let clamp = |v: f64, hi: usize| v.max(0.0).min(hi as f64) as usize;
    let (rows, cols) = raster.shape();
    let window = Window {
        row_start: clamp(r0.floor(), rows),
        row_end: clamp(r1.ceil(), rows),
        col_start: clamp(c0.floor(), cols),
        col_end: clamp(c1.ceil(), cols),
    };

    if window.row_start >= window.row_end || window.col_start >= window.col_end {
        empty
    } else {
        window
    }
}

/// Count valid cells per class whose centre lies inside `region`.
///
/// # Errors
/// `Error::RegionTooLarge` when the region window exceeds `max_pixels`;
/// `Error::ShapeMismatch` when raster and region declare different CRS.
pub fn count_classes(
    classified: &ClassifiedRaster,
    region: &Region,
    max_pixels: usize,
) -> Result<[u64; CLASS_COUNT]> {
    if let (Some(raster_crs), Some(region_crs)) = (classified.crs(), region.crs()) {
        if !raster_crs.is_equivalent(region_crs) {
            return Err(Error::ShapeMismatch {
                what: "reference frame",
                expected: raster_crs.to_string(),
                actual: format!("{} (region '{}')", region_crs, region.name()),
            });
        }
    }

    let window = region_window(classified, region);
    if window.len() > max_pixels {
        return Err(Error::RegionTooLarge {
            region: region.name().to_string(),
            pixels: window.len(),
            max_pixels,
        });
    }

    tracing::debug!(
        region = region.name(),
        rows = window.row_end - window.row_start,
        cols = window.col_end - window.col_start,
        "scanning region window"
    );

    let per_row: Vec<Result<[u64; CLASS_COUNT]>> = (window.row_start..window.row_end)
        .into_par_iter()
        .map(|row| {
            let mut counts = [0u64; CLASS_COUNT];
            for col in window.col_start..window.col_end {
                let class = unsafe { classified.get_unchecked(row, col) };
                if classified.is_nodata(class) {
                    continue;
                }
                let (x, y) = classified.pixel_to_geo(col, row);
                if !region.contains_point(x, y) {
                    continue;
                }
                match counts.get_mut(class as usize) {
                    Some(n) => *n += 1,
                    None => {
                        return Err(Error::Other(format!(
                            "cell ({}, {}) holds {}, which is not a severity class",
                            row, col, class
                        )))
                    }
                }
            }
            Ok(counts)
        })
        .collect();

    let mut totals = [0u64; CLASS_COUNT];
    for counts in per_row {
        for (total, n) in totals.iter_mut().zip(counts?) {
            *total += n;
        }
    }
    Ok(totals)
}

/// Burned area per severity class within one region.
///
/// `hectares = pixels * pixel_size² / 10 000` and
/// `percentage = round(pixels / total * 10 000) / 100`, where `total` is the
/// count of valid cells selected by `params.total_policy`.
///
/// # Errors
/// `Error::NoValidPixels` when the denominator is zero, plus the errors of
/// [`count_classes`] and `Error::InvalidParameter` for bad parameters.
pub fn burned_area(
    classified: &ClassifiedRaster,
    region: &Region,
    params: &AreaParams,
) -> Result<RegionStats> {
    params.validate()?;
    let counts = count_classes(classified, region, params.max_pixels)?;

    let all: u64 = counts.iter().sum();
    let total_valid = match params.total_policy {
        TotalPolicy::AllClassified => all,
        TotalPolicy::ExcludeNa => all - counts[SeverityClass::Na.index() as usize],
    };
    if total_valid == 0 {
        return Err(Error::NoValidPixels {
            region: region.name().to_string(),
        });
    }

    let pixel_area = params.pixel_size * params.pixel_size;
    let classes = SeverityClass::ALL
        .iter()
        .zip(counts)
        .map(|(&class, pixels)| ClassStat {
            class,
            pixels,
            hectares: pixels as f64 * pixel_area / SQUARE_METERS_PER_HECTARE,
            percentage: (pixels as f64 / total_valid as f64 * 10_000.0).round() / 100.0,
        })
        .collect();

    tracing::debug!(region = region.name(), total_valid, "aggregated burned area");

    Ok(RegionStats {
        region: region.name().to_string(),
        total_valid,
        classes,
    })
}

/// Run [`burned_area`] for each region; results keep the input order.
pub fn burned_area_by_region(
    classified: &ClassifiedRaster,
    regions: &[Region],
    params: &AreaParams,
) -> Result<Vec<RegionStats>> {
    regions
        .into_par_iter()
        .map(|region| burned_area(classified, region, params))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::CLASS_NODATA;
    use approx::assert_relative_eq;
    use firescar_core::{GeoTransform, Raster, CRS};

    /// 30 m grid anchored at (0, rows * 30)
    fn classified(values: Vec<u8>, rows: usize, cols: usize) -> ClassifiedRaster {
        let mut r = Raster::from_vec(values, rows, cols).unwrap();
        r.set_transform(GeoTransform::new(0.0, rows as f64 * 30.0, 30.0, -30.0));
        r.set_nodata(Some(CLASS_NODATA));
        r
    }

    #[test]
    fn test_two_by_two_scenario() {
        let raster = classified(vec![0, 3, 5, 7], 2, 2);
        let region = Region::covering("all", &raster).unwrap();

        let stats = burned_area(&raster, &region, &AreaParams::default()).unwrap();
        assert_eq!(stats.total_valid, 4);
        assert_eq!(stats.classes.len(), CLASS_COUNT);

        for idx in [0usize, 3, 5, 7] {
            let c = &stats.classes[idx];
            assert_eq!(c.pixels, 1);
            assert_relative_eq!(c.hectares, 0.09, epsilon = 1e-12);
            assert_relative_eq!(c.percentage, 25.0);
        }
        for idx in [1usize, 2, 4, 6] {
            assert_eq!(stats.classes[idx].pixels, 0);
            assert_eq!(stats.classes[idx].percentage, 0.0);
        }
    }

    #[test]
    fn test_rows_follow_canonical_order() {
        let raster = classified(vec![7, 7, 1, 1], 2, 2);
        let region = Region::covering("all", &raster).unwrap();
        let stats = burned_area(&raster, &region, &AreaParams::default()).unwrap();

        let order: Vec<SeverityClass> = stats.classes.iter().map(|c| c.class).collect();
        assert_eq!(order, SeverityClass::ALL.to_vec());
    }

    #[test]
    fn test_counts_partition_valid_pixels() {
        let values: Vec<u8> = (0..100)
            .map(|i| if i % 9 == 0 { CLASS_NODATA } else { (i % 8) as u8 })
            .collect();
        let raster = classified(values, 10, 10);
        let region = Region::covering("all", &raster).unwrap();

        let stats = burned_area(&raster, &region, &AreaParams::default()).unwrap();
        assert_eq!(stats.total_pixels(), stats.total_valid);
        assert_eq!(stats.total_valid, raster.valid_count() as u64);

        let pct: f64 = stats.classes.iter().map(|c| c.percentage).sum();
        assert!((pct - 100.0).abs() <= 0.08, "percentages sum to {}", pct);
    }

    #[test]
    fn test_sub_region_counts_only_inner_cells() {
        // 4x4 grid spanning x 0..120, y 0..120; region covers the lower-left 2x2
        let mut values = vec![1u8; 16];
        values[8] = 4;
        values[13] = 4;
        let raster = classified(values, 4, 4);
        let region = Region::from_bbox("corner", 0.0, 0.0, 60.0, 60.0).unwrap();

        let window = region_window(&raster, &region);
        assert_eq!(window, Window { row_start: 2, row_end: 4, col_start: 0, col_end: 2 });

        let stats = burned_area(&raster, &region, &AreaParams::default()).unwrap();
        assert_eq!(stats.total_valid, 4);
        assert_eq!(stats.classes[1].pixels, 2);
        assert_eq!(stats.classes[4].pixels, 2);
        assert_relative_eq!(stats.classes[4].percentage, 50.0);
    }

    #[test]
    fn test_polygon_region_uses_cell_centres() {
        use geo::{LineString, Polygon};

        // Triangle below the diagonal from (0,0) to (120,120)
        let raster = classified(vec![3; 16], 4, 4);
        let triangle = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (120.0, 0.0), (120.0, 120.0)]),
            vec![],
        );
        let region = Region::new("triangle", triangle).unwrap();

        let stats = burned_area(&raster, &region, &AreaParams::default()).unwrap();
        // strictly below the diagonal: 6 centres; the 4 on the diagonal are on the boundary
        assert_eq!(stats.total_valid, 6);
    }

    #[test]
    fn test_no_valid_pixels() {
        let raster = classified(vec![CLASS_NODATA; 4], 2, 2);
        let region = Region::covering("masked", &raster).unwrap();
        let err = burned_area(&raster, &region, &AreaParams::default()).unwrap_err();
        assert!(matches!(err, Error::NoValidPixels { ref region } if region == "masked"));
    }

    #[test]
    fn test_region_outside_raster_has_no_valid_pixels() {
        let raster = classified(vec![2; 4], 2, 2);
        let region = Region::from_bbox("far", 1000.0, 1000.0, 2000.0, 2000.0).unwrap();
        assert!(region_window(&raster, &region).is_empty());
        assert!(matches!(
            burned_area(&raster, &region, &AreaParams::default()),
            Err(Error::NoValidPixels { .. })
        ));
    }

    #[test]
    fn test_region_too_large() {
        let raster = classified(vec![2; 100], 10, 10);
        let region = Region::covering("all", &raster).unwrap();
        let params = AreaParams {
            max_pixels: 50,
            ..AreaParams::default()
        };

        let err = burned_area(&raster, &region, &params).unwrap_err();
        assert!(matches!(
            err,
            Error::RegionTooLarge { pixels: 100, max_pixels: 50, .. }
        ));
    }

    #[test]
    fn test_exclude_na_policy() {
        let raster = classified(vec![0, 0, 1, 7], 2, 2);
        let region = Region::covering("all", &raster).unwrap();
        let params = AreaParams {
            total_policy: TotalPolicy::ExcludeNa,
            ..AreaParams::default()
        };

        let stats = burned_area(&raster, &region, &params).unwrap();
        assert_eq!(stats.total_valid, 2);
        assert_eq!(stats.classes[0].pixels, 2);
        assert_relative_eq!(stats.classes[0].percentage, 100.0);
        assert_relative_eq!(stats.classes[1].percentage, 50.0);
    }

    #[test]
    fn test_exclude_na_policy_with_only_na_pixels() {
        let raster = classified(vec![0; 4], 2, 2);
        let region = Region::covering("all", &raster).unwrap();
        let params = AreaParams {
            total_policy: TotalPolicy::ExcludeNa,
            ..AreaParams::default()
        };
        assert!(matches!(
            burned_area(&raster, &region, &params),
            Err(Error::NoValidPixels { .. })
        ));
    }

    #[test]
    fn test_percentage_rounding() {
        // 1 of 3 → 33.33, 2 of 3 → 66.67
        let raster = classified(vec![4, 5, 5], 1, 3);
        let region = Region::covering("all", &raster).unwrap();
        let stats = burned_area(&raster, &region, &AreaParams::default()).unwrap();
        assert_relative_eq!(stats.classes[4].percentage, 33.33);
        assert_relative_eq!(stats.classes[5].percentage, 66.67);
    }

    #[test]
    fn test_sentinel_pixel_size() {
        let raster = classified(vec![6; 4], 2, 2);
        let region = Region::covering("all", &raster).unwrap();
        let params = AreaParams::for_platform(Platform::Sentinel2);
        let stats = burned_area(&raster, &region, &params).unwrap();
        assert_relative_eq!(stats.classes[6].hectares, 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_pixel_size() {
        let raster = classified(vec![6; 4], 2, 2);
        let region = Region::covering("all", &raster).unwrap();
        let params = AreaParams {
            pixel_size: -30.0,
            ..AreaParams::default()
        };
        assert!(matches!(
            burned_area(&raster, &region, &params),
            Err(Error::InvalidParameter { name: "pixel_size", .. })
        ));
    }

    #[test]
    fn test_region_crs_mismatch() {
        let mut raster = classified(vec![6; 4], 2, 2);
        raster.set_crs(Some(CRS::utm(35, false)));
        let region = Region::from_bbox("geo", 0.0, 0.0, 60.0, 60.0)
            .unwrap()
            .with_crs(Some(CRS::wgs84()));
        assert!(matches!(
            burned_area(&raster, &region, &AreaParams::default()),
            Err(Error::ShapeMismatch { what: "reference frame", .. })
        ));
    }

    #[test]
    fn test_unknown_class_value_is_rejected() {
        let raster = classified(vec![6, 9, 6, 6], 2, 2);
        let region = Region::covering("all", &raster).unwrap();
        assert!(matches!(
            burned_area(&raster, &region, &AreaParams::default()),
            Err(Error::Other(_))
        ));
    }

    #[test]
    fn test_multiple_regions_keep_order() {
        let raster = classified(vec![1, 2, 3, 4], 2, 2);
        let regions = vec![
            Region::covering("all", &raster).unwrap(),
            Region::from_bbox("left", 0.0, 0.0, 30.0, 60.0).unwrap(),
        ];

        let stats = burned_area_by_region(&raster, &regions, &AreaParams::default()).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].region, "all");
        assert_eq!(stats[0].total_valid, 4);
        assert_eq!(stats[1].region, "left");
        assert_eq!(stats[1].total_valid, 2);
        assert_eq!(stats[1].classes[1].pixels, 1);
        assert_eq!(stats[1].classes[3].pixels, 1);
    }
}
