//! Tabla horaria institucional: periodos (节) con sus horas de inicio y fin,
//! franjas con nombre (上午/下午/晚上) y bloques franja+rango → periodos.
//!
//! Es un valor inmutable que se construye explícitamente y se entrega al
//! parser; para otra institución basta con cargar otro JSON con
//! [`Timetable::from_json_file`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::models::PERIODS_PER_DAY;

#[derive(Debug, Error)]
pub enum TimetableError {
    #[error("no se pudo leer la tabla horaria '{path}': {source}")]
    Io { path: String, source: std::io::Error },
    #[error("tabla horaria JSON inválida: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tabla horaria inconsistente: {0}")]
    Invalid(String),
}

/// Un periodo numerado y su franja en minutos desde medianoche `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSlot {
    pub period: u8,
    pub start: u16,
    pub end: u16,
}

/// Franja del día con nombre. `origin` es el minuto del día que corresponde
/// a la "hora 1" de la franja (下午1点 = 13:00 → origin = 780).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Daypart {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub origin: u16,
}

impl Daypart {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(|s| s.as_str()))
    }
}

/// Entrada de la tabla (franja, rango de minutos) → (periodo inicial, final).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotBlock {
    pub daypart: String,
    pub start: u16,
    pub end: u16,
    pub periods: (u8, u8),
}

/// Resultado de ubicar una ventana de reloj en la rejilla de periodos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodResolution {
    pub start_period: u8,
    pub end_period: u8,
    /// false si la ventana no coincide (dentro de la tolerancia) con los
    /// límites de los periodos elegidos
    pub aligned: bool,
}

fn default_tolerance() -> u16 { 20 }

fn default_exam_markers() -> Vec<String> {
    vec!["考试时间".to_string(), "考试方式".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    pub periods: Vec<PeriodSlot>,
    pub dayparts: Vec<Daypart>,
    pub blocks: Vec<SlotBlock>,
    #[serde(default = "default_tolerance")]
    pub tolerance_minutes: u16,
    #[serde(default = "default_exam_markers")]
    pub exam_markers: Vec<String>,
}

const fn hm(h: u16, m: u16) -> u16 { h * 60 + m }

const MINUTES_PER_DAY: u16 = 24 * 60;

impl Default for Timetable {
    /// Horario de la PKU (12 periodos).
    fn default() -> Self {
        let bounds = [
            (hm(8, 0), hm(8, 50)),
            (hm(9, 0), hm(9, 50)),
            (hm(10, 10), hm(11, 0)),
            (hm(11, 10), hm(12, 0)),
            (hm(13, 0), hm(13, 50)),
            (hm(14, 0), hm(14, 50)),
            (hm(15, 10), hm(16, 0)),
            (hm(16, 10), hm(17, 0)),
            (hm(17, 10), hm(18, 0)),
            (hm(18, 40), hm(19, 30)),
            (hm(19, 40), hm(20, 30)),
            (hm(20, 40), hm(21, 30)),
        ];
        let periods = bounds
            .iter()
            .enumerate()
            .map(|(i, &(start, end))| PeriodSlot { period: i as u8 + 1, start, end })
            .collect();

        let daypart = |name: &str, aliases: &[&str], origin: u16| Daypart {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            origin,
        };
        let block = |dp: &str, start: u16, end: u16, periods: (u8, u8)| SlotBlock {
            daypart: dp.to_string(),
            start,
            end,
            periods,
        };

        Timetable {
            periods,
            dayparts: vec![
                daypart("上午", &[], hm(1, 0)),
                daypart("下午", &[], hm(13, 0)),
                daypart("晚上", &["晚"], hm(13, 0)),
            ],
            blocks: vec![
                block("上午", hm(8, 0), hm(12, 0), (1, 4)),
                block("下午", hm(13, 0), hm(16, 30), (5, 8)),
                block("晚上", hm(18, 0), hm(21, 30), (9, 12)),
            ],
            tolerance_minutes: default_tolerance(),
            exam_markers: default_exam_markers(),
        }
    }
}

impl Timetable {
    /// Carga y valida una tabla horaria desde un fichero JSON.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TimetableError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TimetableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, TimetableError> {
        let tt: Timetable = serde_json::from_str(text)?;
        tt.validate()?;
        Ok(tt)
    }

    pub fn validate(&self) -> Result<(), TimetableError> {
        if self.periods.is_empty() || self.periods.len() > PERIODS_PER_DAY as usize {
            return Err(TimetableError::Invalid(format!(
                "se esperaban entre 1 y {} periodos, hay {}",
                PERIODS_PER_DAY,
                self.periods.len()
            )));
        }
        let mut prev_end = 0u16;
        for (i, p) in self.periods.iter().enumerate() {
            if p.period as usize != i + 1 {
                return Err(TimetableError::Invalid(format!(
                    "periodo {} fuera de orden (posición {})",
                    p.period,
                    i + 1
                )));
            }
            if p.start >= p.end || p.start < prev_end {
                return Err(TimetableError::Invalid(format!(
                    "periodo {} con franja {}-{} solapada o vacía",
                    p.period, p.start, p.end
                )));
            }
            prev_end = p.end;
        }
        if let Some(p) = self.periods.iter().find(|p| p.end > MINUTES_PER_DAY) {
            return Err(TimetableError::Invalid(format!(
                "periodo {} termina después de medianoche",
                p.period
            )));
        }
        for d in &self.dayparts {
            if d.origin >= MINUTES_PER_DAY {
                return Err(TimetableError::Invalid(format!(
                    "franja '{}' con origen {} fuera del día (0-{})",
                    d.name,
                    d.origin,
                    MINUTES_PER_DAY - 1
                )));
            }
        }
        for b in &self.blocks {
            let (s, e) = b.periods;
            if s < 1 || s > e || e as usize > self.periods.len() {
                return Err(TimetableError::Invalid(format!(
                    "bloque {} {}-{} apunta a periodos {}-{}",
                    b.daypart, b.start, b.end, s, e
                )));
            }
            if !self.dayparts.iter().any(|d| d.name == b.daypart) {
                return Err(TimetableError::Invalid(format!("franja desconocida '{}'", b.daypart)));
            }
        }
        Ok(())
    }

    pub fn period_count(&self) -> u8 {
        self.periods.len() as u8
    }

    pub fn period(&self, n: u8) -> Option<&PeriodSlot> {
        self.periods.iter().find(|p| p.period == n)
    }

    /// Busca la franja por cualquiera de sus etiquetas.
    pub fn daypart(&self, label: &str) -> Option<&Daypart> {
        self.dayparts.iter().find(|d| d.labels().any(|l| l == label))
    }

    /// Todas las etiquetas de franja, de la más larga a la más corta
    /// (晚上 tiene que probarse antes que 晚).
    pub fn daypart_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.dayparts.iter().flat_map(|d| d.labels()).collect();
        labels.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        labels
    }

    /// Minuto del día para una hora escrita dentro de una franja.
    /// Las horas >= 12 ya vienen en formato 24h y se toman literalmente.
    pub fn clock_minute(&self, daypart: Option<&Daypart>, hour: u16, minute: u16) -> u16 {
        let base = match daypart {
            Some(dp) if hour < 12 => dp.origin.saturating_add(hour.saturating_sub(1) * 60),
            _ => hour.saturating_mul(60),
        };
        base.saturating_add(minute)
    }

    /// Ubica la ventana `[start, end)` en la rejilla de periodos.
    ///
    /// 1. Un bloque de la misma franja cuyos extremos estén ambos dentro de la
    ///    tolerancia gana (alineado).
    /// 2. Si no, periodo inicial = el que contiene `start` o el siguiente en
    ///    empezar; periodo final = el que contiene `end` o el último en
    ///    terminar antes. Si la ventana cae entera en un descanso se usa el
    ///    periodo más cercano al punto medio.
    /// 3. `None` si la ventana está vacía o no toca el día lectivo.
    pub fn resolve(&self, daypart: Option<&Daypart>, start: u16, end: u16) -> Option<PeriodResolution> {
        if end <= start {
            return None;
        }
        let tol = self.tolerance_minutes;

        let block = self
            .blocks
            .iter()
            .filter(|b| daypart.map_or(true, |d| d.name == b.daypart))
            .find(|b| start.abs_diff(b.start) <= tol && end.abs_diff(b.end) <= tol);
        if let Some(b) = block {
            return Some(PeriodResolution {
                start_period: b.periods.0,
                end_period: b.periods.1,
                aligned: true,
            });
        }

        let first = self.periods.first()?;
        let last = self.periods.last()?;
        if end <= first.start || start >= last.end {
            return None;
        }

        let mut sp = self
            .periods
            .iter()
            .find(|p| p.start <= start && start < p.end)
            .or_else(|| self.periods.iter().find(|p| p.start >= start))?;
        let mut ep = self
            .periods
            .iter()
            .find(|p| p.start < end && end <= p.end)
            .or_else(|| self.periods.iter().rev().find(|p| p.end <= end))?;

        if sp.period > ep.period {
            let mid = start + (end - start) / 2;
            let dist = |p: &PeriodSlot| {
                if p.start <= mid && mid < p.end { 0 } else { mid.abs_diff(p.start).min(mid.abs_diff(p.end)) }
            };
            let nearest = self.periods.iter().min_by_key(|p| dist(p))?;
            sp = nearest;
            ep = nearest;
        }

        Some(PeriodResolution {
            start_period: sp.period,
            end_period: ep.period,
            aligned: start.abs_diff(sp.start) <= tol && end.abs_diff(ep.end) <= tol,
        })
    }
}
