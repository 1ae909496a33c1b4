//! Predicado de conflicto entre sesiones y entre cursos.
//!
//! Dos sesiones chocan cuando comparten día, hay al menos una semana en la
//! que ambas se dictan y sus periodos se solapan.

use serde::Serialize;
use std::fmt;

use crate::models::{Course, Meeting, WeekPattern};

const WEEKDAY_NAMES: [&str; 7] = ["一", "二", "三", "四", "五", "六", "日"];

/// Primera celda compartida por dos sesiones. El orden derivado
/// (semana, día, periodo) es el cronológico.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Clash {
    pub week: u16,
    pub weekday: u8,
    pub period: u8,
}

impl fmt::Display for Clash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let day = WEEKDAY_NAMES.get(usize::from(self.weekday).wrapping_sub(1)).copied().unwrap_or("?");
        write!(f, "第{}周 周{} 第{}节", self.week, day, self.period)
    }
}

fn week_overlap(a: &Meeting, b: &Meeting) -> Option<(u16, u16)> {
    let lo = a.start_week().max(b.start_week());
    let hi = a.end_week().min(b.end_week());
    (lo <= hi).then_some((lo, hi))
}

/// Semana del solape que se reporta como choque. Si alguna de las dos es
/// semanal basta con que los rangos se toquen; impar contra par nunca
/// choca; con la misma paridad el solape debe contener una semana de esa
/// paridad (un solape de una semana puede caer en la otra).
fn shared_week(a: &Meeting, b: &Meeting) -> Option<u16> {
    let (lo, hi) = week_overlap(a, b)?;
    match (a.pattern(), b.pattern()) {
        (WeekPattern::Every, _) | (_, WeekPattern::Every) => Some(lo),
        (WeekPattern::Odd, WeekPattern::Even) | (WeekPattern::Even, WeekPattern::Odd) => None,
        (p, _) => (lo..=hi).take(2).find(|&w| p.admits(w)),
    }
}

/// Primera semana en la que ambas sesiones se dictan de verdad (vista de
/// celdas ocupadas de la grilla semanal).
fn first_common_week(a: &Meeting, b: &Meeting) -> Option<u16> {
    let (lo, hi) = week_overlap(a, b)?;
    (lo..=hi).take(2).find(|&w| a.occurs_on_week(w) && b.occurs_on_week(w))
}

fn periods_overlap(a: &Meeting, b: &Meeting) -> bool {
    a.start_period() <= b.end_period() && b.start_period() <= a.end_period()
}

pub fn meetings_conflict(a: &Meeting, b: &Meeting) -> bool {
    a.weekday() == b.weekday() && periods_overlap(a, b) && shared_week(a, b).is_some()
}

/// True si alguna celda (semana, día, periodo) la ocupan las dos sesiones.
/// Más estricto que `meetings_conflict` cuando una es semanal y la otra
/// impar/par y el solape es una sola semana de la paridad contraria.
pub fn meetings_share_cell(a: &Meeting, b: &Meeting) -> bool {
    a.weekday() == b.weekday() && periods_overlap(a, b) && first_common_week(a, b).is_some()
}

/// Celda más temprana en la que chocan; `Some` exactamente cuando
/// `meetings_conflict(a, b)`.
pub fn first_clash(a: &Meeting, b: &Meeting) -> Option<Clash> {
    if a.weekday() != b.weekday() || !periods_overlap(a, b) {
        return None;
    }
    let week = shared_week(a, b)?;
    Some(Clash {
        week,
        weekday: a.weekday(),
        period: a.start_period().max(b.start_period()),
    })
}

pub fn courses_conflict(a: &Course, b: &Course) -> bool {
    a.meetings
        .iter()
        .any(|ma| b.meetings.iter().any(|mb| meetings_conflict(ma, mb)))
}

/// Choque más temprano entre cualquier par de sesiones de los dos cursos.
pub fn course_clash(a: &Course, b: &Course) -> Option<Clash> {
    a.meetings
        .iter()
        .flat_map(|ma| b.meetings.iter().filter_map(move |mb| first_clash(ma, mb)))
        .min()
}
