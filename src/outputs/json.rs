//! JSON output.
//!
//! Rows are written as a pretty-printed array of objects keyed by the
//! spreadsheet column headers:
//!
//! ```json
//! [
//!   {
//!     "Title": "Rain returns",
//!     "Date": "01/05/2024",
//!     "Description": "Storm damage tops $2,000",
//!     "Image file name": "rain.jpg",
//!     "Search phrase count": 2,
//!     "Contains money": true
//!   }
//! ]
//! ```

use std::fs;
use std::path::Path;
use tracing::debug;

use super::TabularExporter;
use crate::error::ExportError;
use crate::models::ExportRow;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl TabularExporter for JsonExporter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn write_rows(&self, rows: &[ExportRow], path: &Path) -> Result<(), ExportError> {
        let json = serde_json::to_string_pretty(rows)?;
        fs::write(path, &json)?;
        debug!(path = %path.display(), bytes = json.len(), "Wrote JSON rows");
        Ok(())
    }
}
