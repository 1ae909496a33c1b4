//! Carga del catálogo: filas → `Course` → `LoadResult`.
//!
//! Los problemas de fila (identidad vacía, clave duplicada) se acumulan como
//! `LoadWarning` y la fila se omite; los de segmento quedan en
//! `Course::parse_warnings`. Sólo los fallos estructurales (archivo, hoja,
//! cabecera) devuelven `LoadError`.

mod error;
mod result;
mod row;

pub use error::{LoadError, LoadWarning};
pub use result::{sort_for_display, LoadResult, LoadSummary};
pub use row::*;

use std::path::Path;

use crate::models::Course;
use crate::parser::{MeetingParser, Timetable};

/// A partir de este número de filas el parseo se reparte entre hilos.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 2_000;

pub struct CourseLoader {
    parser: MeetingParser,
    parallel_threshold: usize,
}

impl Default for CourseLoader {
    fn default() -> Self {
        CourseLoader::new(MeetingParser::default())
    }
}

impl CourseLoader {
    pub fn new(parser: MeetingParser) -> Self {
        CourseLoader { parser, parallel_threshold: DEFAULT_PARALLEL_THRESHOLD }
    }

    pub fn with_timetable(timetable: Timetable) -> Self {
        CourseLoader::new(MeetingParser::new(timetable))
    }

    /// Umbral de filas para el parseo en paralelo (`usize::MAX` = nunca).
    pub fn parallel_threshold(mut self, rows: usize) -> Self {
        self.parallel_threshold = rows.max(1);
        self
    }

    pub fn parser(&self) -> &MeetingParser {
        &self.parser
    }

    /// Construye el curso de una fila, o el aviso por el que se omite.
    pub fn build_course(&self, row: &CatalogRow) -> Result<Course, LoadWarning> {
        for column in IDENTITY_COLUMNS {
            if row.get(column).is_empty() {
                return Err(LoadWarning::MissingIdentity { row: row.row, column: column.to_string() });
            }
        }

        let credits_raw = row.get(COL_CREDITS);
        let credits = if credits_raw.is_empty() {
            0.0
        } else {
            credits_raw.parse::<f64>().unwrap_or_else(|_| {
                log::debug!("fila {}: 学分 '{}' no numérico, se usa 0", row.row, credits_raw);
                0.0
            })
        };

        let parsed = self.parser.parse_cell(row.get(COL_MEETING_INFO));

        Ok(Course {
            course_id: row.get(COL_COURSE_ID).to_string(),
            class_number: row.get(COL_CLASS_NUMBER).to_string(),
            name: row.get(COL_NAME).to_string(),
            teacher: row.get(COL_TEACHER).to_string(),
            department: row.get(COL_DEPARTMENT).to_string(),
            credits,
            category: row.get(COL_CATEGORY).to_string(),
            grade: row.get(COL_GRADE).to_string(),
            row: row.row,
            meetings: parsed.meetings,
            parse_warnings: parsed.warnings,
            fallback_room: parsed.salvaged_rooms.into_iter().next().unwrap_or_default(),
        })
    }

    fn build_all(&self, rows: &[CatalogRow]) -> Vec<Result<Course, LoadWarning>> {
        if rows.len() < self.parallel_threshold {
            return rows.iter().map(|r| self.build_course(r)).collect();
        }
        let workers = num_cpus::get().max(1);
        let chunk = rows.len().div_ceil(workers);
        log::debug!("parseando {} filas en {} hilos", rows.len(), workers);
        std::thread::scope(|scope| {
            let handles: Vec<_> = rows
                .chunks(chunk)
                .map(|part| scope.spawn(move || part.iter().map(|r| self.build_course(r)).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
    }

    /// Carga filas ya materializadas. Nunca falla: los problemas de fila
    /// quedan como avisos en el resultado.
    pub fn load_rows(&self, rows: &[CatalogRow], source: &str) -> LoadResult {
        let mut result = LoadResult::empty(source, rows.len());

        for built in self.build_all(rows) {
            let course = match built {
                Ok(c) => c,
                Err(w) => {
                    log::warn!("{}", w);
                    result.push_warning(w);
                    continue;
                }
            };
            let (row, teacher) = (course.row, course.teacher.clone());
            if let Err(first) = result.insert(course) {
                let warning = LoadWarning::DuplicateKey {
                    row,
                    first_row: first.row,
                    uid: first.uid(),
                    teacher,
                    first_teacher: first.teacher.clone(),
                };
                log::warn!("{}", warning);
                result.push_warning(warning);
            }
        }

        log::info!(
            "catálogo '{}': {} filas, {} cursos, {} filas omitidas",
            source,
            rows.len(),
            result.len(),
            result.warnings().len()
        );
        result
    }

    /// Lee un archivo (.xlsx/.xls/.ods vía calamine, .csv vía polars) y lo
    /// carga. `sheet = None` usa la primera hoja del libro.
    pub fn load_file<P: AsRef<Path>>(&self, path: P, sheet: Option<&str>) -> Result<LoadResult, LoadError> {
        let path = path.as_ref();
        let rows = crate::excel::read_catalog_rows(path, sheet)?;
        Ok(self.load_rows(&rows, &path.display().to_string()))
    }
}

/// Atajo con la tabla horaria por defecto.
pub fn load_courses<P: AsRef<Path>>(path: P, sheet: Option<&str>) -> Result<LoadResult, LoadError> {
    CourseLoader::default().load_file(path, sheet)
}
