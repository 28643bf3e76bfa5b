//! Tabular export of scraped articles.
//!
//! # Submodules
//!
//! - [`xlsx`]: Writes one spreadsheet row per article
//! - [`json`]: Writes the same rows as a JSON array
//!
//! # Output Structure
//!
//! ```text
//! export_dir/
//! └── 01-05-2024_08-09-10.xlsx   # one file per run, named by export time
//! ```
//!
//! Both formats share the column set of [`ExportRow::HEADERS`].

use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::config::ExportFormat;
use crate::dates::{display_string, DateSeparator, Timestamp};
use crate::error::ExportError;
use crate::models::ExportRow;

pub mod json;
pub mod xlsx;

/// A writer for one tabular file format.
pub trait TabularExporter {
    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    /// Write `rows` to `path`, replacing any existing file.
    fn write_rows(&self, rows: &[ExportRow], path: &Path) -> Result<(), ExportError>;

    /// Export `rows` into `dir` under a time-stamped file name.
    ///
    /// # Returns
    ///
    /// The written path, or `None` when there was nothing to export. No file
    /// is created for zero rows.
    #[instrument(level = "info", skip_all, fields(dir = %dir.display(), rows = rows.len()))]
    fn export(&self, rows: &[ExportRow], dir: &Path) -> Result<Option<PathBuf>, ExportError> {
        if rows.is_empty() {
            warn!("No articles to export; skipping file creation");
            return Ok(None);
        }
        let path = dir.join(export_file_name(&Local::now(), self.extension()));
        self.write_rows(rows, &path)?;
        info!(path = %path.display(), "Wrote export file");
        Ok(Some(path))
    }
}

/// `MM-DD-YYYY_HH-MM-SS.<extension>`
pub fn export_file_name(now: &Timestamp, extension: &str) -> String {
    format!("{}.{}", display_string(now, DateSeparator::Dash, true), extension)
}

pub fn exporter_for(format: ExportFormat, sheet_name: &str) -> Box<dyn TabularExporter> {
    match format {
        ExportFormat::Xlsx => Box::new(xlsx::XlsxExporter::new(sheet_name)),
        ExportFormat::Json => Box::new(json::JsonExporter),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_export_file_name() {
        let now = Local.with_ymd_and_hms(2024, 1, 5, 8, 9, 10).unwrap();
        assert_eq!(export_file_name(&now, "xlsx"), "01-05-2024_08-09-10.xlsx");
    }

    #[test]
    fn test_zero_rows_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        for format in [ExportFormat::Xlsx, ExportFormat::Json] {
            let exporter = exporter_for(format, "Articles");
            assert_eq!(exporter.export(&[], dir.path()).unwrap(), None);
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_exporter_for_picks_extension() {
        assert_eq!(exporter_for(ExportFormat::Xlsx, "S").extension(), "xlsx");
        assert_eq!(exporter_for(ExportFormat::Json, "S").extension(), "json");
    }
}
