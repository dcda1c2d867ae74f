//! PNG charts for the analysis stage.
//!
//! Charts are plain bar plots rasterised with `image`: a white canvas, two
//! axis lines and one filled rectangle per bar, scaled to the largest value.
//! Rendering is best-effort; a chart that fails is logged and skipped.

use crate::error::{EtlError, Result};
use crate::types::staged;
use crate::utils::{require_column, series_to_f64, series_to_strings};
use image::{ImageBuffer, Rgb, RgbImage};
use polars::prelude::DataFrame;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CHURN_RATE_CHART: &str = "churn_rate_by_charge_segment.png";
pub const TOTAL_CHARGES_HISTOGRAM: &str = "hist_total_charges.png";
pub const CONTRACT_CHART: &str = "contract_distribution.png";

/// Number of histogram bins for total charges.
pub const HISTOGRAM_BINS: usize = 30;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const MARGIN: u32 = 40;
const BAR_GAP: u32 = 2;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([90, 90, 90]);
const BAR: Rgb<u8> = Rgb([70, 130, 180]);

const LOADED_TABLE: &str = "loaded table";

/// Render all three charts into `output_dir`. Returns the charts written.
pub fn render_all(df: &DataFrame, output_dir: &Path) -> Vec<PathBuf> {
    if let Err(e) = fs::create_dir_all(output_dir) {
        warn!("Skipping charts, cannot create {}: {}", output_dir.display(), e);
        return Vec::new();
    }

    let charts: [(&str, fn(&DataFrame) -> Result<Vec<f64>>); 3] = [
        (CHURN_RATE_CHART, |df| {
            Ok(churn_rate_by_segment(df)?.into_values().collect())
        }),
        (TOTAL_CHARGES_HISTOGRAM, |df| {
            Ok(total_charges_histogram(df, HISTOGRAM_BINS)?
                .into_iter()
                .map(|n| n as f64)
                .collect())
        }),
        (CONTRACT_CHART, |df| {
            Ok(contract_counts(df)?.into_iter().map(|(_, n)| n as f64).collect())
        }),
    ];

    let mut written = Vec::new();
    for (file_name, data) in charts {
        let path = output_dir.join(file_name);
        match data(df).and_then(|values| draw_bars(&values, &path)) {
            Ok(()) => {
                debug!("Chart written to {}", path.display());
                written.push(path);
            }
            Err(e) => warn!("Chart {} failed: {}", file_name, e),
        }
    }

    info!("Visualizations saved: {}/3", written.len());
    written
}

/// Share of churned customers per `monthly_charge_segment`, in segment order.
pub fn churn_rate_by_segment(df: &DataFrame) -> Result<BTreeMap<String, f64>> {
    let segment_col = require_column(df, staged::MONTHLY_CHARGE_SEGMENT, LOADED_TABLE)?;
    let churn_col = require_column(df, staged::CHURN, LOADED_TABLE)?;

    let segments = series_to_strings(df.column(&segment_col)?.as_materialized_series())?;
    let churn = series_to_strings(df.column(&churn_col)?.as_materialized_series())?;

    let mut tally: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for (segment, churned) in segments.into_iter().zip(churn) {
        let Some(segment) = segment else { continue };
        let entry = tally.entry(segment).or_default();
        entry.1 += 1;
        if churned.is_some_and(|c| c.eq_ignore_ascii_case("yes")) {
            entry.0 += 1;
        }
    }

    Ok(tally
        .into_iter()
        .map(|(segment, (yes, total))| (segment, yes as f64 / total as f64))
        .collect())
}

/// Counts of `totalcharges` in `bins` equal-width bins between min and max.
pub fn total_charges_histogram(df: &DataFrame, bins: usize) -> Result<Vec<usize>> {
    let col = require_column(df, staged::TOTAL_CHARGES, LOADED_TABLE)?;
    let values: Vec<f64> = series_to_f64(df.column(&col)?.as_materialized_series())?
        .into_iter()
        .flatten()
        .collect();

    let mut counts = vec![0usize; bins];
    if values.is_empty() || bins == 0 {
        return Ok(counts);
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bins as f64;

    for v in values {
        let idx = if width > 0.0 {
            (((v - min) / width) as usize).min(bins - 1)
        } else {
            bins / 2
        };
        counts[idx] += 1;
    }

    Ok(counts)
}

/// Row count per `contract`, largest first.
pub fn contract_counts(df: &DataFrame) -> Result<Vec<(String, usize)>> {
    let col = require_column(df, staged::CONTRACT, LOADED_TABLE)?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in series_to_strings(df.column(&col)?.as_materialized_series())?
        .into_iter()
        .flatten()
    {
        *counts.entry(value).or_default() += 1;
    }

    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(sorted)
}

/// Draw one bar per value and save the canvas as PNG.
fn draw_bars(values: &[f64], path: &Path) -> Result<()> {
    let mut img: RgbImage = ImageBuffer::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    let plot_width = WIDTH - 2 * MARGIN;
    let plot_height = HEIGHT - 2 * MARGIN;
    let baseline = HEIGHT - MARGIN;

    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if !values.is_empty() && max > 0.0 {
        let slot = plot_width / values.len() as u32;
        let bar_width = slot.saturating_sub(BAR_GAP).max(1);

        for (i, value) in values.iter().enumerate() {
            let bar_height = ((value.max(0.0) / max) * plot_height as f64).round() as u32;
            let x0 = MARGIN + i as u32 * slot + BAR_GAP / 2;
            fill_rect(&mut img, x0, baseline - bar_height, bar_width, bar_height, BAR);
        }
    }

    fill_rect(&mut img, MARGIN, MARGIN, 1, plot_height, AXIS);
    fill_rect(&mut img, MARGIN, baseline, plot_width, 1, AXIS);

    img.save(path)
        .map_err(|e| EtlError::write_failed(path, std::io::Error::other(e)))
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let (max_x, max_y) = img.dimensions();
    for px in x..(x + width).min(max_x) {
        for py in y..(y + height).min(max_y) {
            img.put_pixel(px, py, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn loaded() -> DataFrame {
        df![
            "monthly_charge_segment" => ["low", "low", "high", "medium"],
            "churn" => ["Yes", "No", "yes", "No"],
            "totalcharges" => [10.0, 20.0, 40.0, 40.0],
            "contract" => ["Month-to-month", "One year", "Month-to-month", "Two year"],
        ]
        .unwrap()
    }

    #[test]
    fn test_churn_rate_by_segment() {
        let rates = churn_rate_by_segment(&loaded()).unwrap();
        assert_eq!(rates["low"], 0.5);
        assert_eq!(rates["high"], 1.0);
        assert_eq!(rates["medium"], 0.0);
    }

    #[test]
    fn test_total_charges_histogram() {
        let counts = total_charges_histogram(&loaded(), HISTOGRAM_BINS).unwrap();
        assert_eq!(counts.len(), 30);
        assert_eq!(counts.iter().sum::<usize>(), 4);
        assert_eq!(counts[0], 1);
        assert_eq!(counts[29], 2);
    }

    #[test]
    fn test_histogram_constant_values() {
        let df = df!["totalcharges" => [5.0, 5.0]].unwrap();
        let counts = total_charges_histogram(&df, 4).unwrap();
        assert_eq!(counts, vec![0, 0, 2, 0]);
    }

    #[test]
    fn test_contract_counts_largest_first() {
        let counts = contract_counts(&loaded()).unwrap();
        assert_eq!(counts[0], ("Month-to-month".to_string(), 2));
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn test_render_all_writes_three_pngs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("processed");

        let written = render_all(&loaded(), &out);

        assert_eq!(written.len(), 3);
        assert!(out.join(CHURN_RATE_CHART).is_file());
        assert!(out.join(TOTAL_CHARGES_HISTOGRAM).is_file());
        assert!(out.join(CONTRACT_CHART).is_file());
    }

    #[test]
    fn test_render_all_skips_failed_charts() {
        let dir = tempfile::tempdir().unwrap();
        let df = df!["contract" => ["One year"]].unwrap();

        let written = render_all(&df, dir.path());

        assert_eq!(written, vec![dir.path().join(CONTRACT_CHART)]);
    }
}
