//! Lectura del catálogo desde archivo.
//!
//! Submódulos:
//! - `io`: conversión de celdas y armado de filas a partir de la rejilla
//! - `workbook`: libros Excel/ODS vía calamine
//! - `csv_file`: CSV vía polars

mod io;
mod workbook;
mod csv_file;

pub use csv_file::read_csv_rows;
pub use workbook::read_workbook_rows;
pub use io::{cell_to_string, normalize_header, rows_from_grid};

use std::path::Path;

use crate::loader::{CatalogRow, LoadError};

/// Hoja por defecto del catálogo exportado.
pub const DEFAULT_SHEET: &str = "courses";

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Lee las filas del catálogo según la extensión del archivo.
pub fn read_catalog_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<CatalogRow>, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        read_workbook_rows(path, sheet)
    } else if ext == "csv" {
        read_csv_rows(path)
    } else {
        Err(LoadError::UnsupportedFormat(ext))
    }
}
