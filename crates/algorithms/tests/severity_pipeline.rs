//! End-to-end tests: NBR rasters → dNBR → severity classes → per-region report.

use approx::assert_relative_eq;
use firescar_algorithms::prelude::*;
use firescar_core::io::{read_geotiff_from_buffer, write_geotiff_to_buffer};

/// 30 m UTM grid anchored at (500 000, 9 560 000)
fn nbr_raster(values: Vec<f64>, rows: usize, cols: usize) -> Raster<f64> {
    let mut r = Raster::from_vec(values, rows, cols).unwrap();
    r.set_transform(GeoTransform::new(500_000.0, 9_560_000.0, 30.0, -30.0));
    r.set_crs(Some(CRS::utm(35, false)));
    r.set_nodata(Some(f64::NAN));
    r
}

/// Synthetic pre/post pair with a burn scar in the upper-left quadrant
fn scar_pair(size: usize) -> (Raster<f64>, Raster<f64>) {
    let pre = vec![0.55; size * size];
    let post: Vec<f64> = (0..size * size)
        .map(|i| {
            let (row, col) = (i / size, i % size);
            if row < size / 2 && col < size / 2 {
                -0.1 // dNBR 650
            } else if (row + col) % 7 == 0 {
                f64::NAN // cloud gap
            } else {
                0.5 // dNBR 50
            }
        })
        .collect();
    (nbr_raster(pre, size, size), nbr_raster(post, size, size))
}

#[test]
fn two_by_two_scenario() {
    let pre = nbr_raster(vec![0.0, 0.0, 0.3, 0.7], 2, 2);
    let post = nbr_raster(vec![1.2, 0.05, 0.0, 0.0], 2, 2);

    let d = dnbr(&pre, &post, DnbrParams::default()).unwrap();
    let classes = classify_severity(&d, &ThresholdTable::usgs()).unwrap();
    assert_eq!(classes.data().iter().copied().collect::<Vec<_>>(), vec![0, 3, 5, 7]);

    let region = Region::covering("study area", &classes).unwrap();
    let stats = burned_area(&classes, &region, &AreaParams::default()).unwrap();
    assert_eq!(stats.total_valid, 4);

    let report = SeverityReport::from_stats(&stats).unwrap();
    for row in report.rows().iter().filter(|r| r.pixels > 0) {
        assert_relative_eq!(row.hectares, 0.09, epsilon = 1e-12);
        assert_relative_eq!(row.percentage, 25.0);
    }
}

#[test]
fn full_area_and_sub_rectangle() {
    let size = 20;
    let (pre, post) = scar_pair(size);

    let d = dnbr(&pre, &post, DnbrParams::default()).unwrap();
    let classes = classify_severity(&d, &ThresholdTable::usgs()).unwrap();

    let full = Region::covering("full", &classes).unwrap();
    // Upper-left 10x10 cells: x 500 000..500 300, y 9 559 700..9 560 000
    let scar = Region::from_bbox("scar", 500_000.0, 9_559_700.0, 500_300.0, 9_560_000.0)
        .unwrap()
        .with_crs(Some(CRS::utm(35, false)));

    let stats =
        burned_area_by_region(&classes, &[full, scar], &AreaParams::default()).unwrap();

    let full_stats = &stats[0];
    assert_eq!(full_stats.total_pixels(), full_stats.total_valid);
    assert_eq!(full_stats.total_valid, classes.valid_count() as u64);
    assert_relative_eq!(
        full_stats.total_hectares(),
        full_stats.total_valid as f64 * 0.09,
        epsilon = 1e-9
    );
    let pct: f64 = full_stats.classes.iter().map(|c| c.percentage).sum();
    assert!((pct - 100.0).abs() <= 0.08);

    let scar_stats = &stats[1];
    assert_eq!(scar_stats.total_valid, 100);
    let regrowth = &scar_stats.classes[SeverityClass::EnhancedRegrowthLow.index() as usize];
    assert_eq!(regrowth.pixels, 100);
    assert_relative_eq!(regrowth.hectares, 9.0, epsilon = 1e-9);
    assert_relative_eq!(regrowth.percentage, 100.0);
}

#[test]
fn masked_region_reports_no_valid_pixels() {
    let pre = nbr_raster(vec![f64::NAN; 4], 2, 2);
    let post = nbr_raster(vec![0.1; 4], 2, 2);

    let d = dnbr(&pre, &post, DnbrParams::default()).unwrap();
    let classes = classify_severity(&d, &ThresholdTable::usgs()).unwrap();
    let region = Region::covering("cloudy", &classes).unwrap();

    let err = burned_area(&classes, &region, &AreaParams::default()).unwrap_err();
    assert!(matches!(err, Error::NoValidPixels { .. }));
}

#[test]
fn resolution_mismatch_is_rejected() {
    let pre = nbr_raster(vec![0.5; 4], 2, 2);
    let mut post = nbr_raster(vec![0.5; 4], 2, 2);
    post.set_transform(GeoTransform::new(500_000.0, 9_560_000.0, 10.0, -10.0));

    let err = dnbr(&pre, &post, DnbrParams::default()).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }));
}

#[test]
fn float_class_map_with_nan_nodata_aggregates() {
    let mut exported: Raster<f32> = Raster::from_vec(vec![1.0, 3.0, f32::NAN, 7.0], 2, 2).unwrap();
    exported.set_transform(GeoTransform::new(500_000.0, 9_560_000.0, 30.0, -30.0));
    exported.set_nodata(Some(f32::NAN));

    let bytes = write_geotiff_to_buffer(&exported).unwrap();
    let classes: ClassifiedRaster = read_geotiff_from_buffer(&bytes).unwrap();
    let region = Region::covering("exported", &classes).unwrap();

    let stats = burned_area(&classes, &region, &AreaParams::default()).unwrap();
    assert_eq!(stats.total_valid, 3);
    assert_eq!(stats.classes[SeverityClass::HighSeverity.index() as usize].pixels, 1);
    assert_eq!(stats.classes[SeverityClass::Na.index() as usize].pixels, 0);
}

#[test]
fn classified_raster_survives_geotiff_roundtrip() {
    let (pre, post) = scar_pair(8);
    let d = dnbr(&pre, &post, DnbrParams::default()).unwrap();
    let classes = classify_severity(&d, &ThresholdTable::usgs()).unwrap();

    let bytes = write_geotiff_to_buffer(&classes).unwrap();
    let back: ClassifiedRaster = read_geotiff_from_buffer(&bytes).unwrap();

    assert_eq!(back.data(), classes.data());
    assert_eq!(back.nodata(), Some(CLASS_NODATA));
    assert_eq!(back.crs(), classes.crs());

    let region = Region::covering("all", &back).unwrap();
    let a = burned_area(&classes, &region, &AreaParams::default()).unwrap();
    let b = burned_area(&back, &region, &AreaParams::default()).unwrap();
    assert_eq!(a, b);
}
