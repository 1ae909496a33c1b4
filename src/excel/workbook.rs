use calamine::{open_workbook_auto, Reader};
use std::path::Path;

use super::io::{cell_to_string, rows_from_grid};
use crate::loader::{CatalogRow, LoadError};

fn workbook_error(path: &Path, source: calamine::Error) -> LoadError {
    LoadError::Workbook { path: path.display().to_string(), source }
}

/// Lee la hoja indicada (o la primera) de un libro Excel/ODS.
/// Que la hoja pedida no exista es un error estructural.
pub fn read_workbook_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<CatalogRow>, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(path, e))?;
    let names = workbook.sheet_names().to_owned();

    let target = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.trim() == wanted.trim())
            .cloned()
            .ok_or_else(|| LoadError::SheetNotFound { sheet: wanted.to_string(), available: names.clone() })?,
        None => names.first().cloned().ok_or(LoadError::NoSheets)?,
    };

    let range = workbook.worksheet_range(&target).map_err(|e| workbook_error(path, e))?;
    let grid: Vec<Vec<String>> = range.rows().map(|r| r.iter().map(cell_to_string).collect()).collect();
    log::debug!("hoja '{}' de {:?}: {} filas", target, path, grid.len());
    rows_from_grid(grid)
}
