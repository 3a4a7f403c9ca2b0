//! Delimited-text writer for the derived tables.

use crate::error::{SummaryError, SummaryResult};
use crate::models::SummaryRow;
use csv::WriterBuilder;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::info;

/// Write `rows` to `path`, header first. An empty slice writes the header only.
pub fn write_table<R: SummaryRow>(rows: &[R], path: &Path, delimiter: u8) -> SummaryResult<()> {
    let file = File::create(path).map_err(|source| SummaryError::IoWrite {
        path: path.to_path_buf(),
        source,
    })?;

    write_csv(file, rows, delimiter)
        .map_err(|err| SummaryError::from_csv_write(path.to_path_buf(), err))?;

    info!("Wrote {} row(s) to {}", rows.len(), path.display());
    Ok(())
}

/// Render `rows` exactly as [`write_table`] would write them.
pub fn render_table<R: SummaryRow>(rows: &[R], delimiter: u8) -> SummaryResult<String> {
    let bytes = write_csv(Vec::new(), rows, delimiter)
        .map_err(|err| SummaryError::from_csv_write("<memory>".into(), err))?;

    // Every cell comes from a Rust string, so the output is valid UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_csv<W: io::Write, R: SummaryRow>(sink: W, rows: &[R], delimiter: u8) -> csv::Result<W> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(sink);

    writer.write_record(R::HEADERS)?;
    for row in rows {
        writer.write_record(row.fields())?;
    }

    writer.into_inner().map_err(|err| err.into_error().into())
}
