//! Burned-area report tables
//!
//! One [`SeverityReport`] per region, with the column layout
//! `system:index, Class, Hectares, Pixels, Percentage` expected by tools that
//! consume the original burned-area CSV export.

use crate::severity::{SeverityClass, CLASS_COUNT};
use crate::statistics::RegionStats;
use firescar_core::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Report columns, in export order
pub const REPORT_COLUMNS: [&str; 5] = ["system:index", "Class", "Hectares", "Pixels", "Percentage"];

/// One row of a burned-area report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "system:index")]
    pub index: usize,
    #[serde(rename = "Class")]
    pub class: &'static str,
    #[serde(rename = "Hectares")]
    pub hectares: f64,
    #[serde(rename = "Pixels")]
    pub pixels: u64,
    #[serde(rename = "Percentage")]
    pub percentage: f64,
}

/// Burned-area table of a single region
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityReport {
    region: String,
    rows: Vec<ReportRow>,
}

impl SeverityReport {
    /// Build the table from one region's statistics.
    ///
    /// Rows follow the canonical class order 0..=7; statistics that do not
    /// hold exactly one entry per class in that order are rejected.
    pub fn from_stats(stats: &RegionStats) -> Result<Self> {
        let in_order = stats.classes.len() == CLASS_COUNT
            && stats
                .classes
                .iter()
                .zip(SeverityClass::ALL)
                .all(|(stat, class)| stat.class == class);
        if !in_order {
            return Err(Error::Other(format!(
                "statistics of region '{}' do not list the {} severity classes in order",
                stats.region, CLASS_COUNT
            )));
        }

        let rows = stats
            .classes
            .iter()
            .enumerate()
            .map(|(index, stat)| ReportRow {
                index,
                class: stat.class.label(),
                hectares: stat.hectares,
                pixels: stat.pixels,
                percentage: stat.percentage,
            })
            .collect();

        Ok(Self {
            region: stats.region.clone(),
            rows,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Serialize the table as CSV with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv.serialize(row).map_err(|e| Error::Csv(e.to_string()))?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::Csv(e.to_string()))
    }

    pub fn write_csv_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_csv(BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::ClassStat;

    fn stats() -> RegionStats {
        let classes = SeverityClass::ALL
            .iter()
            .map(|&class| {
                let pixels = if class.index() % 2 == 1 { 1 } else { 0 };
                ClassStat {
                    class,
                    pixels,
                    hectares: pixels as f64 * 0.09,
                    percentage: pixels as f64 * 25.0,
                }
            })
            .collect();
        RegionStats {
            region: "east".into(),
            total_valid: 4,
            classes,
        }
    }

    #[test]
    fn test_rows_in_canonical_order() {
        let report = SeverityReport::from_stats(&stats()).unwrap();
        assert_eq!(report.region(), "east");
        assert_eq!(report.rows().len(), CLASS_COUNT);
        assert_eq!(report.rows()[0].class, "NA");
        assert_eq!(report.rows()[7].class, "Enhanced Regrowth, High");
        assert!(report.rows().iter().enumerate().all(|(i, r)| r.index == i));
    }

    #[test]
    fn test_csv_layout() {
        let report = SeverityReport::from_stats(&stats()).unwrap();
        let csv = report.to_csv_string().unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some(REPORT_COLUMNS.join(",").as_str()));
        assert_eq!(lines.next(), Some("0,NA,0.0,0,0.0"));
        assert_eq!(lines.next(), Some("1,High Severity,0.09,1,25.0"));
        // labels containing a comma are quoted
        assert_eq!(lines.nth(4), Some("6,\"Enhanced Regrowth, Low\",0.0,0,0.0"));
        assert_eq!(csv.lines().count(), 1 + CLASS_COUNT);
    }

    #[test]
    fn test_rejects_out_of_order_stats() {
        let mut s = stats();
        s.classes.swap(0, 1);
        assert!(SeverityReport::from_stats(&s).is_err());

        let mut short = stats();
        short.classes.pop();
        assert!(SeverityReport::from_stats(&short).is_err());
    }
}
