//! Errores y avisos de carga del catálogo.
//!
//! - `LoadError`: fallo estructural, no se produce `LoadResult`
//! - `LoadWarning`: problema de una fila; la fila se omite y la carga sigue

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::CourseUid;
use crate::parser::TimetableError;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("archivo de catálogo no encontrado: {}", .0.display())]
    NotFound(PathBuf),

    #[error("formato no soportado '{0}' (se aceptan .xlsx, .xlsm, .xls, .ods y .csv)")]
    UnsupportedFormat(String),

    #[error("no se pudo abrir el libro '{path}': {source}")]
    Workbook {
        path: String,
        #[source]
        source: calamine::Error,
    },

    #[error("no se pudo leer el CSV '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: polars::prelude::PolarsError,
    },

    #[error("la hoja '{sheet}' no existe (disponibles: {available:?})")]
    SheetNotFound { sheet: String, available: Vec<String> },

    #[error("el libro no contiene ninguna hoja")]
    NoSheets,

    #[error("la cabecera no contiene la columna obligatoria '{0}'")]
    MissingColumn(String),

    #[error(transparent)]
    Timetable(#[from] TimetableError),
}

/// Aviso a nivel de carga (fila omitida).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadWarning {
    MissingIdentity { row: usize, column: String },
    DuplicateKey {
        row: usize,
        first_row: usize,
        uid: CourseUid,
        teacher: String,
        first_teacher: String,
    },
}

impl LoadWarning {
    pub fn row(&self) -> usize {
        match self {
            LoadWarning::MissingIdentity { row, .. } | LoadWarning::DuplicateKey { row, .. } => *row,
        }
    }
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MissingIdentity { row, column } => {
                write!(f, "第{}行 缺少{}，已跳过", row, column)
            }
            LoadWarning::DuplicateKey { row, first_row, uid, teacher, first_teacher } => write!(
                f,
                "第{}行 课程号/班号重复：{}（首次出现于第{}行）| 旧教师={} 新教师={}，已跳过",
                row, uid, first_row, first_teacher, teacher
            ),
        }
    }
}
