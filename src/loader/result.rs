use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use super::error::LoadWarning;
use crate::models::{Course, CourseUid};

/// Resultado agregado de una carga. Inmutable: recargar produce otro valor.
///
/// Los índices guardan posiciones dentro de `courses`, así que no pueden
/// apuntar a un curso que no esté en la lista.
#[derive(Debug, Clone, Serialize)]
pub struct LoadResult {
    courses: Vec<Course>,
    #[serde(skip)]
    by_key: HashMap<String, usize>,
    #[serde(skip)]
    by_uid: HashMap<CourseUid, usize>,
    warnings: Vec<LoadWarning>,
    total_rows: usize,
    source: String,
    loaded_at: DateTime<Utc>,
}

/// Estadísticas de la carga (lo que se imprime en modo diagnóstico).
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub total_rows: usize,
    pub courses: usize,
    pub skipped_rows: usize,
    pub duplicate_rows: usize,
    pub courses_with_warnings: usize,
    pub segment_warnings: usize,
    pub courses_without_meetings: usize,
    pub courses_without_room: usize,
    pub load_warnings: Vec<String>,
    /// Primeros avisos de segmento con el contexto de su fila
    pub segment_warning_examples: Vec<String>,
    pub empty_room_examples: Vec<String>,
}

const SUMMARY_EXAMPLES: usize = 10;

impl LoadResult {
    pub(crate) fn empty(source: impl Into<String>, total_rows: usize) -> Self {
        LoadResult {
            courses: Vec::new(),
            by_key: HashMap::new(),
            by_uid: HashMap::new(),
            warnings: Vec::new(),
            total_rows,
            source: source.into(),
            loaded_at: Utc::now(),
        }
    }

    /// Inserta un curso si su clave no existe; si ya existe devuelve el
    /// curso que se conserva.
    pub(crate) fn insert(&mut self, course: Course) -> Result<(), &Course> {
        let uid = course.uid();
        let key = uid.dedup_key();
        if let Some(&idx) = self.by_key.get(&key).or_else(|| self.by_uid.get(&uid)) {
            return Err(&self.courses[idx]);
        }
        let idx = self.courses.len();
        self.courses.push(course);
        self.by_key.insert(key, idx);
        self.by_uid.insert(uid, idx);
        Ok(())
    }

    pub(crate) fn push_warning(&mut self, warning: LoadWarning) {
        self.warnings.push(warning);
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Búsqueda por clave de deduplicación (`CourseUid::dedup_key`).
    pub fn get_by_key(&self, key: &str) -> Option<&Course> {
        self.by_key.get(key).map(|&i| &self.courses[i])
    }

    pub fn get_by_uid(&self, uid: &CourseUid) -> Option<&Course> {
        self.by_uid.get(uid).map(|&i| &self.courses[i])
    }

    pub fn lookup(&self, course_id: &str, class_number: &str) -> Option<&Course> {
        self.get_by_uid(&CourseUid::new(course_id, class_number))
    }

    pub fn contains(&self, uid: &CourseUid) -> bool {
        self.by_uid.contains_key(uid)
    }

    pub fn uids(&self) -> impl Iterator<Item = CourseUid> + '_ {
        self.courses.iter().map(|c| c.uid())
    }

    /// Unidades académicas distintas (no vacías), ordenadas.
    pub fn departments(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .courses
            .iter()
            .map(|c| c.department.trim())
            .filter(|d| !d.is_empty())
            .collect();
        set.into_iter().map(|d| d.to_string()).collect()
    }

    /// Cursos de una unidad (o todos con `None`), en el orden de la
    /// interfaz: unidad, nombre, profesor, 班号.
    pub fn courses_in_department(&self, department: Option<&str>) -> Vec<&Course> {
        let dept = department.map(str::trim).filter(|d| !d.is_empty());
        let mut out: Vec<&Course> = self
            .courses
            .iter()
            .filter(|c| dept.is_none_or(|d| c.department.trim() == d))
            .collect();
        sort_for_display(&mut out);
        out
    }

    /// Búsqueda aproximada por nombre: primero coincidencias por
    /// subcadena, luego por similitud Jaro-Winkler >= `min_score`.
    pub fn search_by_name(&self, query: &str, min_score: f64, limit: usize) -> Vec<&Course> {
        let q = query.trim();
        if q.is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<(f64, &Course)> = self
            .courses
            .iter()
            .filter_map(|c| {
                let score = if c.name.contains(q) {
                    2.0
                } else {
                    strsim::jaro_winkler(q, &c.name)
                };
                (score >= min_score).then_some((score, c))
            })
            .collect();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.row.cmp(&b.1.row))
        });
        scored.into_iter().take(limit).map(|(_, c)| c).collect()
    }

    pub fn summary(&self) -> LoadSummary {
        let duplicate_rows = self
            .warnings
            .iter()
            .filter(|w| matches!(w, LoadWarning::DuplicateKey { .. }))
            .count();

        let mut segment_warning_examples = Vec::new();
        let mut segment_warnings = 0;
        let mut empty_room_examples = Vec::new();
        let mut courses_without_room = 0;
        for c in &self.courses {
            for w in &c.parse_warnings {
                segment_warnings += 1;
                if segment_warning_examples.len() < SUMMARY_EXAMPLES {
                    segment_warning_examples.push(format!(
                        "第{}行 {}/{}/班{} | {}",
                        c.row, c.course_id, c.name, c.class_number, w
                    ));
                }
            }
            if c.primary_room().is_empty() {
                courses_without_room += 1;
                if empty_room_examples.len() < SUMMARY_EXAMPLES {
                    empty_room_examples.push(format!(
                        "第{}行 课程号={} 课程名={} 班号={} 教师={}",
                        c.row, c.course_id, c.name, c.class_number, c.teacher
                    ));
                }
            }
        }

        LoadSummary {
            source: self.source.clone(),
            loaded_at: self.loaded_at,
            total_rows: self.total_rows,
            courses: self.courses.len(),
            skipped_rows: self.warnings.len(),
            duplicate_rows,
            courses_with_warnings: self.courses.iter().filter(|c| !c.is_fully_parsed()).count(),
            segment_warnings,
            courses_without_meetings: self.courses.iter().filter(|c| c.meetings.is_empty()).count(),
            courses_without_room,
            load_warnings: self.warnings.iter().map(|w| w.to_string()).collect(),
            segment_warning_examples,
            empty_room_examples,
        }
    }
}

/// Orden de presentación: unidad, nombre, profesor, 班号.
pub fn sort_for_display(courses: &mut [&Course]) {
    courses.sort_by(|a, b| {
        a.department
            .trim()
            .cmp(b.department.trim())
            .then_with(|| a.name.trim().cmp(b.name.trim()))
            .then_with(|| a.teacher.trim().cmp(b.teacher.trim()))
            .then_with(|| a.class_number.trim().cmp(b.class_number.trim()))
    });
}
