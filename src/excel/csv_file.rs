use polars::prelude::*;
use std::path::Path;

use super::io::rows_from_grid;
use crate::loader::{CatalogRow, LoadError};

/// Lee un CSV UTF-8 con cabecera. Todas las columnas se leen como texto
/// (`infer_schema_length = 0`) para no convertir `班号` en número.
pub fn read_csv_rows(path: &Path) -> Result<Vec<CatalogRow>, LoadError> {
    let csv_error = |source: PolarsError| LoadError::Csv { path: path.display().to_string(), source };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(csv_error)?;

    let header: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
    let columns = df
        .get_columns()
        .iter()
        .map(|c| c.str())
        .collect::<PolarsResult<Vec<_>>>()
        .map_err(csv_error)?;

    let mut grid = Vec::with_capacity(df.height() + 1);
    grid.push(header);
    for i in 0..df.height() {
        grid.push(columns.iter().map(|col| col.get(i).unwrap_or("").to_string()).collect());
    }
    rows_from_grid(grid)
}
