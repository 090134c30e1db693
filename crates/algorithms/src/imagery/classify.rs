//! Burn-severity classification of a dNBR raster

use crate::maybe_rayon::*;
use crate::severity::{ClassifiedRaster, ThresholdTable, CLASS_NODATA};
use firescar_core::raster::Raster;
use firescar_core::{Algorithm, Error, Result};

/// Severity classification stage
#[derive(Debug, Clone, Default)]
pub struct SeverityClassification;

impl Algorithm for SeverityClassification {
    type Input = Raster<f64>;
    type Output = ClassifiedRaster;
    type Params = ThresholdTable;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Severity classification"
    }

    fn description(&self) -> &'static str {
        "Bucket dNBR values into eight ordinal burn-severity classes"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        classify_severity(&input, &params)
    }
}

/// Assign every valid dNBR cell its severity class index.
///
/// Masked cells (NaN or the raster's no-data value) become [`CLASS_NODATA`].
/// The output lies on the same grid as the input.
///
/// # Example
/// ```ignore
/// let classes = classify_severity(&dnbr, &ThresholdTable::usgs())?;
/// ```
pub fn classify_severity(dnbr: &Raster<f64>, thresholds: &ThresholdTable) -> Result<ClassifiedRaster> {
    let (rows, cols) = dnbr.shape();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![CLASS_NODATA; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let val = unsafe { dnbr.get_unchecked(row, col) };
                if dnbr.is_nodata(val) {
                    continue;
                }
                *out = thresholds.classify(val).index();
            }
            row_data
        })
        .collect();

    tracing::debug!(
        rows,
        cols,
        thresholds = ?thresholds.values(),
        "classified dNBR raster"
    );

    dnbr.derive(data, Some(CLASS_NODATA))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::CLASS_COUNT;
    use firescar_core::GeoTransform;

    fn dnbr_raster(values: Vec<f64>, rows: usize, cols: usize) -> Raster<f64> {
        let mut r = Raster::from_vec(values, rows, cols).unwrap();
        r.set_transform(GeoTransform::new(0.0, rows as f64 * 30.0, 30.0, -30.0));
        r.set_nodata(Some(f64::NAN));
        r
    }

    #[test]
    fn test_two_by_two_scenario() {
        let d = dnbr_raster(vec![-1200.0, -50.0, 300.0, 700.0], 2, 2);
        let classes = classify_severity(&d, &ThresholdTable::usgs()).unwrap();

        assert_eq!(classes.data().iter().copied().collect::<Vec<_>>(), vec![0, 3, 5, 7]);
        assert_eq!(classes.nodata(), Some(CLASS_NODATA));
        assert_eq!(classes.transform(), d.transform());
    }

    #[test]
    fn test_masked_cells_stay_nodata() {
        let mut d = dnbr_raster(vec![f64::NAN, 100.0, -9999.0, 800.0], 2, 2);
        d.set_nodata(Some(-9999.0));
        let classes = classify_severity(&d, &ThresholdTable::usgs()).unwrap();

        assert_eq!(classes.get(0, 0).unwrap(), CLASS_NODATA);
        assert_eq!(classes.get(1, 0).unwrap(), CLASS_NODATA);
        assert_eq!(classes.get(0, 1).unwrap(), 4);
        assert_eq!(classes.valid_count(), 2);
    }

    #[test]
    fn test_every_valid_cell_gets_one_class() {
        let values: Vec<f64> = (0..400).map(|i| -2000.0 + i as f64 * 12.5).collect();
        let d = dnbr_raster(values, 20, 20);
        let classes = classify_severity(&d, &ThresholdTable::usgs()).unwrap();

        assert!(classes.data().iter().all(|&c| (c as usize) < CLASS_COUNT));
        assert_eq!(classes.valid_count(), 400);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let values: Vec<f64> = (0..100).map(|i| ((i * 37) % 300) as f64 * 10.0 - 1500.0).collect();
        let d = dnbr_raster(values, 10, 10);

        let first = classify_severity(&d, &ThresholdTable::usgs()).unwrap();
        let second = classify_severity(&d, &ThresholdTable::usgs()).unwrap();
        assert_eq!(first.data(), second.data());
    }

    #[test]
    fn test_algorithm_trait_uses_usgs_by_default() {
        let d = dnbr_raster(vec![-1000.0, 2000.0, 99.0, -101.0], 2, 2);
        let classes = SeverityClassification.execute_default(d).unwrap();
        assert_eq!(classes.data().iter().copied().collect::<Vec<_>>(), vec![1, 7, 4, 3]);
    }
}
