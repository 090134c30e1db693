//! firescar CLI - burn severity from pre/post-fire NBR rasters

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use firescar_algorithms::imagery::{classify_severity, dnbr, nbr, DnbrParams, Platform};
use firescar_algorithms::report::SeverityReport;
use firescar_algorithms::severity::{legend, ClassifiedRaster, ThresholdTable};
use firescar_algorithms::statistics::{
    burned_area_by_region, AreaParams, RegionStats, TotalPolicy, DEFAULT_MAX_PIXELS,
};
use firescar_core::io::{read_geotiff, write_geotiff};
use firescar_core::vector::read_regions;
use firescar_core::{Raster, RasterElement, Region};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "firescar")]
#[command(author, version, about = "Burn severity mapping from NBR rasters", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Print the severity classes with their display colors
    Legend,
    /// Normalized Burn Ratio from NIR and SWIR bands
    Nbr {
        /// NIR band (Landsat 8 B5, Sentinel-2 B8)
        nir: PathBuf,
        /// SWIR band (Landsat 8 B7, Sentinel-2 B12)
        swir: PathBuf,
        /// Output file
        output: PathBuf,
        /// Sensor platform the bands come from: l8 or s2
        #[arg(short, long, default_value = "l8")]
        platform: String,
    },
    /// Scaled pre/post-fire NBR difference
    Dnbr {
        /// Pre-fire NBR raster
        pre: PathBuf,
        /// Post-fire NBR raster
        post: PathBuf,
        /// Output file
        output: PathBuf,
        /// Scale factor applied to the difference
        #[arg(long, default_value = "1000")]
        scale: f64,
    },
    /// Classify a dNBR raster into severity classes 0-7
    Classify {
        /// Input dNBR raster
        input: PathBuf,
        /// Output file (class codes, 255 = no data)
        output: PathBuf,
        #[command(flatten)]
        thresholds: ThresholdArgs,
    },
    /// Burned-area tables of a classified raster
    Area {
        /// Classified raster (class codes 0-7)
        classified: PathBuf,
        #[command(flatten)]
        area: AreaArgs,
    },
    /// Full pipeline: dNBR, classification and burned-area tables
    Run {
        /// Pre-fire NBR raster
        pre: PathBuf,
        /// Post-fire NBR raster
        post: PathBuf,
        /// Scale factor applied to the difference
        #[arg(long, default_value = "1000")]
        scale: f64,
        #[command(flatten)]
        thresholds: ThresholdArgs,
        #[command(flatten)]
        area: AreaArgs,
    },
}

#[derive(Args)]
struct ThresholdArgs {
    /// Eight ascending upper bounds, comma separated ("inf" allowed)
    #[arg(long, allow_hyphen_values = true)]
    thresholds: Option<String>,
}

#[derive(Args)]
struct AreaArgs {
    /// Regions JSON file; the whole raster when omitted
    #[arg(short, long)]
    regions: Option<PathBuf>,
    /// Directory receiving one CSV per region
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    /// Sensor platform: l8 or s2 (sets the pixel size)
    #[arg(short, long, default_value = "l8")]
    platform: String,
    /// Pixel side length in meters, overrides the platform's
    #[arg(long)]
    pixel_size: Option<f64>,
    /// Largest region window (cells) a query may scan
    #[arg(long, default_value_t = DEFAULT_MAX_PIXELS)]
    max_pixels: usize,
    /// Leave class 0 out of the percentage denominator
    #[arg(long)]
    exclude_na_from_total: bool,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn read_raster<T: RasterElement>(path: &Path) -> Result<Raster<T>> {
    let pb = spinner("Reading raster...")?;
    let raster: Raster<T> = read_geotiff(path)
        .with_context(|| format!("Failed to read raster {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());
    Ok(raster)
}

fn write_result<T: RasterElement>(raster: &Raster<T>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...")?;
    write_geotiff(raster, path).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

impl ThresholdArgs {
    fn table(&self) -> Result<ThresholdTable> {
        match &self.thresholds {
            Some(s) => s.parse().context("Invalid threshold table"),
            None => Ok(ThresholdTable::usgs()),
        }
    }
}

impl AreaArgs {
    fn params(&self) -> Result<AreaParams> {
        let platform: Platform = self.platform.parse().context("Invalid platform")?;
        let mut params = AreaParams::for_platform(platform);
        if let Some(size) = self.pixel_size {
            params.pixel_size = size;
        }
        params.max_pixels = self.max_pixels;
        if self.exclude_na_from_total {
            params.total_policy = TotalPolicy::ExcludeNa;
        }
        Ok(params)
    }

    fn regions(&self, classified: &ClassifiedRaster) -> Result<Vec<Region>> {
        match &self.regions {
            Some(path) => read_regions(path)
                .with_context(|| format!("Failed to read regions {}", path.display())),
            None => Ok(vec![Region::covering("full", classified)?]),
        }
    }
}

/// Region names become file stems; anything outside [A-Za-z0-9_-] is replaced
fn report_path(out_dir: &Path, region: &str) -> PathBuf {
    let stem: String = region
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    out_dir.join(format!("{stem}.csv"))
}

fn print_stats(stats: &RegionStats) {
    println!("\nRegion: {}", stats.region);
    println!("  {:<26} {:>12} {:>10} {:>8}", "Class", "Hectares", "Pixels", "%");
    for c in &stats.classes {
        println!(
            "  {:<26} {:>12.2} {:>10} {:>8.2}",
            c.class.label(),
            c.hectares,
            c.pixels,
            c.percentage
        );
    }
    println!("  Valid pixels: {}", stats.total_valid);
    println!("  Total area: {:.2} ha", stats.total_hectares());
}

fn write_reports(classified: &ClassifiedRaster, area: &AreaArgs) -> Result<()> {
    let params = area.params()?;
    let regions = area.regions(classified)?;
    std::fs::create_dir_all(&area.out_dir)
        .with_context(|| format!("Failed to create {}", area.out_dir.display()))?;

    let start = Instant::now();
    let all_stats = burned_area_by_region(classified, &regions, &params)
        .context("Failed to aggregate burned area")?;
    let elapsed = start.elapsed();

    for stats in &all_stats {
        print_stats(stats);
        let path = report_path(&area.out_dir, &stats.region);
        SeverityReport::from_stats(stats)?
            .write_csv_file(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        done("Burned-area table", &path, elapsed);
    }
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => {
            let raster: Raster<f64> = read_raster(&input)?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len().max(1) as f64
            );
        }

        Commands::Legend => {
            for class in legend() {
                println!("#{}  {} {}", class.color(), class.index(), class.label());
            }
        }

        Commands::Nbr {
            nir,
            swir,
            output,
            platform,
        } => {
            let platform: Platform = platform.parse().context("Invalid platform")?;
            info!(
                "{}: NIR {} / SWIR {}",
                platform,
                platform.nir_band(),
                platform.swir_band()
            );
            let nir_r = read_raster(&nir)?;
            let swir_r = read_raster(&swir)?;
            let start = Instant::now();
            let result = nbr(&nir_r, &swir_r).context("Failed to calculate NBR")?;
            let elapsed = start.elapsed();
            write_result(&result, &output)?;
            done("NBR", &output, elapsed);
        }

        Commands::Dnbr {
            pre,
            post,
            output,
            scale,
        } => {
            let pre_r = read_raster(&pre)?;
            let post_r = read_raster(&post)?;
            let start = Instant::now();
            let result =
                dnbr(&pre_r, &post_r, DnbrParams { scale }).context("Failed to calculate dNBR")?;
            let elapsed = start.elapsed();
            write_result(&result, &output)?;
            done("dNBR", &output, elapsed);
        }

        Commands::Classify {
            input,
            output,
            thresholds,
        } => {
            let table = thresholds.table()?;
            let d = read_raster(&input)?;
            let start = Instant::now();
            let result = classify_severity(&d, &table).context("Failed to classify dNBR")?;
            let elapsed = start.elapsed();
            write_result(&result, &output)?;
            done("Severity classes", &output, elapsed);
        }

        Commands::Area { classified, area } => {
            let classes: ClassifiedRaster = read_raster(&classified)?;
            write_reports(&classes, &area)?;
        }

        Commands::Run {
            pre,
            post,
            scale,
            thresholds,
            area,
        } => {
            let table = thresholds.table()?;
            let pre_r = read_raster(&pre)?;
            let post_r = read_raster(&post)?;
            std::fs::create_dir_all(&area.out_dir)
                .with_context(|| format!("Failed to create {}", area.out_dir.display()))?;

            let start = Instant::now();
            let d =
                dnbr(&pre_r, &post_r, DnbrParams { scale }).context("Failed to calculate dNBR")?;
            let classes = classify_severity(&d, &table).context("Failed to classify dNBR")?;
            let elapsed = start.elapsed();

            let dnbr_path = area.out_dir.join("dnbr.tif");
            write_result(&d, &dnbr_path)?;
            done("dNBR", &dnbr_path, elapsed);

            let classes_path = area.out_dir.join("classified.tif");
            write_result(&classes, &classes_path)?;
            done("Severity classes", &classes_path, elapsed);

            write_reports(&classes, &area)?;
        }
    }

    Ok(())
}
