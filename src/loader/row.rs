use std::collections::HashMap;

/// Columnas del catálogo exportado (cabecera de la hoja `courses`).
pub const COL_COURSE_ID: &str = "课程号";
pub const COL_NAME: &str = "课程名";
pub const COL_CATEGORY: &str = "课程类别";
pub const COL_CREDITS: &str = "学分";
pub const COL_TEACHER: &str = "教师";
pub const COL_CLASS_NUMBER: &str = "班号";
pub const COL_DEPARTMENT: &str = "开课单位";
pub const COL_GRADE: &str = "年级";
pub const COL_MEETING_INFO: &str = "上课考试信息";

/// Columnas sin las cuales no se puede identificar una sección.
pub const IDENTITY_COLUMNS: [&str; 2] = [COL_COURSE_ID, COL_CLASS_NUMBER];

/// Una fila del catálogo: columna → texto. La procedencia (hoja, CSV,
/// memoria) no importa al cargador.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRow {
    /// Número de fila en la fuente (la cabecera es la fila 1)
    pub row: usize,
    fields: HashMap<String, String>,
}

impl CatalogRow {
    pub fn new(row: usize) -> Self {
        CatalogRow { row, fields: HashMap::new() }
    }

    pub fn from_pairs<K, V, I>(row: usize, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let fields = pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        CatalogRow { row, fields }
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Valor de la columna sin espacios exteriores; "" si falta.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(|v| v.trim()).unwrap_or("")
    }

    pub fn has(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }
}
