use calamine::Data;

use crate::loader::{CatalogRow, LoadError, IDENTITY_COLUMNS};

/// Texto de una celda. Los números enteros se escriben sin decimales para
/// que `班号` 1 no termine como "1.0".
pub fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(d) => d.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Empty | Data::Error(_) => String::new(),
    }
}

/// Limpia un encabezado: BOM, espacios exteriores e interiores.
pub fn normalize_header(s: &str) -> String {
    s.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Convierte una rejilla (primera fila = cabecera) en filas con nombre.
/// Las filas completamente vacías se saltan pero conservan la numeración.
pub fn rows_from_grid(grid: Vec<Vec<String>>) -> Result<Vec<CatalogRow>, LoadError> {
    let mut it = grid.into_iter();
    let header: Vec<String> = match it.next() {
        Some(h) => h.iter().map(|s| normalize_header(s)).collect(),
        None => return Ok(Vec::new()),
    };
    for column in IDENTITY_COLUMNS {
        if !header.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column.to_string()));
        }
    }

    let mut rows = Vec::new();
    for (idx, cells) in it.enumerate() {
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        // fila 1 = cabecera
        let mut row = CatalogRow::new(idx + 2);
        for (col, name) in header.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            row.set(name.clone(), cells.get(col).cloned().unwrap_or_default());
        }
        rows.push(row);
    }
    Ok(rows)
}
