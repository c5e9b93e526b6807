//! CSV persistence for daily series.
//!
//! Writes a `date` column followed by every metric column; null values are
//! written as empty cells.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use csv::Writer;
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, info};

use crate::error::Result;
use crate::series::DailySeries;

/// Writes `series` as CSV to `writer`.
pub fn write_series<W: Write>(writer: W, series: &DailySeries) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    let mut header = vec!["date".to_string()];
    header.extend(series.column_names().map(str::to_string));
    wtr.write_record(&header)?;

    for (date, values) in series.rows() {
        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(date.format("%Y-%m-%d").to_string());
        record.extend(
            values
                .iter()
                .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes `series` to `path`, creating parent directories. With `gzip` the
/// file is gzip-compressed.
pub fn write_series_file(path: &Path, series: &DailySeries, gzip: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    debug!(path = %path.display(), gzip, "Writing series CSV");

    let file = File::create(path)?;
    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_series(&mut encoder, series)?;
        encoder.finish()?;
    } else {
        write_series(file, series)?;
    }

    info!(
        path = %path.display(),
        rows = series.len(),
        columns = series.columns().len(),
        "Series written"
    );
    Ok(())
}
