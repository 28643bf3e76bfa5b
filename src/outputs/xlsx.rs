//! Spreadsheet output.

use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook};
use std::path::Path;
use tracing::debug;

use super::TabularExporter;
use crate::error::ExportError;
use crate::models::ExportRow;

const COLUMN_WIDTHS: [f64; 6] = [60.0, 12.0, 80.0, 30.0, 20.0, 15.0];

/// Writes a single-sheet workbook with a bold header row.
#[derive(Debug, Clone)]
pub struct XlsxExporter {
    sheet_name: String,
}

impl XlsxExporter {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }
}

impl TabularExporter for XlsxExporter {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn write_rows(&self, rows: &[ExportRow], path: &Path) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name)?;

        for (col, (name, width)) in ExportRow::HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
            let col = col as ColNum;
            sheet.write_string_with_format(0, col, *name, &header)?;
            sheet.set_column_width(col, width)?;
        }

        for (index, row) in rows.iter().enumerate() {
            let r = (index + 1) as RowNum;
            sheet.write_string(r, 0, &row.title)?;
            sheet.write_string(r, 1, &row.date)?;
            sheet.write_string(r, 2, &row.description)?;
            sheet.write_string(r, 3, &row.image_file_name)?;
            sheet.write_number(r, 4, row.phrase_count as f64)?;
            sheet.write_boolean(r, 5, row.contains_money)?;
        }

        workbook.save(path)?;
        debug!(path = %path.display(), rows = rows.len(), "Saved workbook");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::fixtures;
    use std::io::Read;

    #[test]
    fn test_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = XlsxExporter::new("Articles")
            .export(&fixtures::rows(), dir.path())
            .unwrap()
            .unwrap();

        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("xlsx"));
        let mut magic = [0u8; 2];
        std::fs::File::open(&path).unwrap().read_exact(&mut magic).unwrap();
        assert_eq!(&magic, b"PK");
    }

    #[test]
    fn test_invalid_sheet_name_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = XlsxExporter::new("bad[name]")
            .write_rows(&fixtures::rows(), &dir.path().join("out.xlsx"))
            .unwrap_err();
        assert!(matches!(err, ExportError::Xlsx(_)));
    }
}
