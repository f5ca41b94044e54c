//! CSV export for power series and power histograms.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::daily::time_label;
use crate::sim::histogram::PowerHistogramDataPoint;
use crate::sim::types::MINUTES_PER_DAY;

/// Column header for power series export.
const SERIES_HEADER: [&str; 4] = ["interval", "day", "time", "power_kw"];

/// Column header for histogram export.
const HISTOGRAM_HEADER: [&str; 3] = ["max_power_kw", "count", "percentage"];

/// Exports a power series to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_series_csv(series: &[f64], interval_minutes: u32, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_series_csv(series, interval_minutes, io::BufWriter::new(file))
}

/// Writes a power series as CSV to any writer.
///
/// One row per sample: the 0-based sample index, the 1-based day, the
/// `HH:MM` start time within that day, and the station power.
///
/// # Errors
///
/// Returns an `io::Error` of kind `InvalidInput` if `interval_minutes` does
/// not divide a day, or any error raised while writing.
pub fn write_series_csv(series: &[f64], interval_minutes: u32, writer: impl Write) -> io::Result<()> {
    if interval_minutes == 0 || MINUTES_PER_DAY % interval_minutes != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("interval of {interval_minutes} min does not divide a day"),
        ));
    }
    let intervals_per_day = (MINUTES_PER_DAY / interval_minutes) as usize;

    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(SERIES_HEADER)?;

    for (i, power_kw) in series.iter().enumerate() {
        let pos = (i % intervals_per_day) as u32;
        wtr.write_record(&[
            i.to_string(),
            (i / intervals_per_day + 1).to_string(),
            time_label(pos * interval_minutes),
            format!("{power_kw:.4}"),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports a power histogram to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_histogram_csv(histogram: &[PowerHistogramDataPoint], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_histogram_csv(histogram, io::BufWriter::new(file))
}

/// Writes a power histogram as CSV to any writer, one row per bin.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_histogram_csv(
    histogram: &[PowerHistogramDataPoint],
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HISTOGRAM_HEADER)?;

    for bin in histogram {
        wtr.write_record(&[
            format!("{:.4}", bin.max_power_kw),
            bin.count.to_string(),
            format!("{:.4}", bin.percentage),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
