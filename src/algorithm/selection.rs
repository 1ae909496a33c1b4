//! Conjunto de cursos elegidos con tope de créditos.

use serde::Serialize;
use thiserror::Error;

use super::conflict::{course_clash, Clash};
use crate::loader::LoadResult;
use crate::models::{Course, CourseUid};

pub const DEFAULT_CREDIT_LIMIT: f64 = 25.0;
/// Tolerancia al comparar sumas de créditos decimales con el tope.
pub const CREDIT_EPSILON: f64 = 1e-9;
/// Semanas que muestra la grilla semanal.
pub const SEMESTER_WEEKS: u16 = 16;

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionError {
    #[error("课程 {uid} 不存在")]
    UnknownCourse { uid: CourseUid },

    #[error("{first}（{first_name}）与 {second}（{second_name}）时间冲突：{clash}")]
    Conflict {
        first: CourseUid,
        first_name: String,
        second: CourseUid,
        second_name: String,
        clash: Clash,
    },

    #[error("学分超出上限：{total} > {limit}")]
    CreditLimit { total: f64, limit: f64 },
}

/// Celda ocupada de la grilla semanal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupiedCell {
    pub weekday: u8,
    pub period: u8,
    pub uid: CourseUid,
    pub name: String,
    pub room: String,
}

#[derive(Debug, Clone)]
pub struct Selection {
    courses: Vec<Course>,
    credit_limit: f64,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::new(DEFAULT_CREDIT_LIMIT)
    }
}

impl Selection {
    pub fn new(credit_limit: f64) -> Self {
        Selection { courses: Vec::new(), credit_limit }
    }

    /// Reconstruye una selección a partir de identificadores del catálogo.
    /// No valida conflictos: la selección ya existente se acepta tal cual.
    pub fn from_uids(catalog: &LoadResult, uids: &[CourseUid], credit_limit: f64) -> Result<Self, SelectionError> {
        let mut selection = Selection::new(credit_limit);
        for uid in uids {
            let course = catalog
                .get_by_uid(uid)
                .ok_or_else(|| SelectionError::UnknownCourse { uid: uid.clone() })?;
            if !selection.contains(uid) {
                selection.courses.push(course.clone());
            }
        }
        Ok(selection)
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn credit_limit(&self) -> f64 {
        self.credit_limit
    }

    pub fn contains(&self, uid: &CourseUid) -> bool {
        self.courses.iter().any(|c| &c.uid() == uid)
    }

    pub fn total_credits(&self) -> f64 {
        self.courses.iter().map(|c| c.credits).sum()
    }

    /// Comprueba si los candidatos pueden añadirse juntos: sin conflicto con
    /// lo ya elegido ni entre sí, y sin superar el tope de créditos. Los
    /// candidatos ya elegidos se ignoran.
    pub fn check_add(&self, candidates: &[&Course]) -> Result<(), SelectionError> {
        let mut accepted: Vec<&Course> = Vec::new();
        for &cand in candidates {
            let uid = cand.uid();
            if self.contains(&uid) || accepted.iter().any(|c| c.uid() == uid) {
                continue;
            }
            for other in self.courses.iter().chain(accepted.iter().copied()) {
                if let Some(clash) = course_clash(other, cand) {
                    return Err(SelectionError::Conflict {
                        first: other.uid(),
                        first_name: other.name.clone(),
                        second: uid,
                        second_name: cand.name.clone(),
                        clash,
                    });
                }
            }
            accepted.push(cand);
        }

        let total = self.total_credits() + accepted.iter().map(|c| c.credits).sum::<f64>();
        if total > self.credit_limit + CREDIT_EPSILON {
            return Err(SelectionError::CreditLimit { total, limit: self.credit_limit });
        }
        Ok(())
    }

    /// Añade los candidatos si `check_add` los acepta; si no, la selección
    /// no cambia.
    pub fn add(&mut self, candidates: &[&Course]) -> Result<(), SelectionError> {
        self.check_add(candidates)?;
        for &cand in candidates {
            if !self.contains(&cand.uid()) {
                self.courses.push(cand.clone());
            }
        }
        Ok(())
    }

    pub fn remove(&mut self, uid: &CourseUid) -> Option<Course> {
        let pos = self.courses.iter().position(|c| &c.uid() == uid)?;
        Some(self.courses.remove(pos))
    }

    /// Celdas (día, periodo) ocupadas en la semana `week`, ordenadas.
    /// Una celda con dos cursos aparece dos veces.
    pub fn occupied_cells(&self, week: u16) -> Vec<OccupiedCell> {
        let mut cells = Vec::new();
        for course in &self.courses {
            for m in course.meetings.iter().filter(|m| m.occurs_on_week(week)) {
                for period in m.start_period()..=m.end_period() {
                    cells.push(OccupiedCell {
                        weekday: m.weekday(),
                        period,
                        uid: course.uid(),
                        name: course.name.clone(),
                        room: m.room().to_string(),
                    });
                }
            }
        }
        cells.sort_by(|a, b| (a.weekday, a.period, &a.uid).cmp(&(b.weekday, b.period, &b.uid)));
        cells
    }
}
