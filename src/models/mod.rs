// Estructuras de datos principales: patrón de semanas, sesiones y cursos.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Número de periodos (节) de un día lectivo.
pub const PERIODS_PER_DAY: u8 = 12;

/// Qué semanas dentro de `[start_week, end_week]` tienen clase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekPattern {
    /// 每周
    Every,
    /// 单周
    Odd,
    /// 双周
    Even,
}

impl WeekPattern {
    /// True si la semana `week` pertenece a la paridad del patrón.
    pub fn admits(self, week: u16) -> bool {
        match self {
            WeekPattern::Every => true,
            WeekPattern::Odd => week % 2 == 1,
            WeekPattern::Even => week % 2 == 0,
        }
    }
}

impl fmt::Display for WeekPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WeekPattern::Every => "每周",
            WeekPattern::Odd => "单周",
            WeekPattern::Even => "双周",
        };
        f.write_str(s)
    }
}

/// Motivo por el que no se puede construir una `Meeting`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeetingError {
    #[error("rango de semanas inválido {start}-{end}")]
    WeekRange { start: u16, end: u16 },
    #[error("día de la semana fuera de rango: {0}")]
    Weekday(u8),
    #[error("rango de periodos inválido {start}-{end} (permitido 1-{max})")]
    PeriodRange { start: u8, end: u8, max: u8 },
}

/// Una regla de horario contigua extraída de un segmento de texto.
///
/// Los campos son privados: una vez construida (vía [`Meeting::new`]) la
/// sesión no cambia y sus invariantes se mantienen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Meeting {
    start_week: u16,
    end_week: u16,
    pattern: WeekPattern,
    weekday: u8,
    start_period: u8,
    end_period: u8,
    room: String,
    raw: String,
}

impl Meeting {
    /// Valida y construye una sesión.
    /// - semanas: `1 <= start_week <= end_week`
    /// - día: `1..=7` (lunes = 1)
    /// - periodos: `1 <= start_period <= end_period <= 12`
    pub fn new(
        start_week: u16,
        end_week: u16,
        pattern: WeekPattern,
        weekday: u8,
        start_period: u8,
        end_period: u8,
        room: impl Into<String>,
    ) -> Result<Self, MeetingError> {
        if start_week < 1 || start_week > end_week {
            return Err(MeetingError::WeekRange { start: start_week, end: end_week });
        }
        if !(1..=7).contains(&weekday) {
            return Err(MeetingError::Weekday(weekday));
        }
        if start_period < 1 || start_period > end_period || end_period > PERIODS_PER_DAY {
            return Err(MeetingError::PeriodRange {
                start: start_period,
                end: end_period,
                max: PERIODS_PER_DAY,
            });
        }
        Ok(Meeting {
            start_week,
            end_week,
            pattern,
            weekday,
            start_period,
            end_period,
            room: room.into(),
            raw: String::new(),
        })
    }

    /// Adjunta el segmento original del que proviene la sesión.
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = raw.into();
        self
    }

    pub fn start_week(&self) -> u16 { self.start_week }
    pub fn end_week(&self) -> u16 { self.end_week }
    pub fn pattern(&self) -> WeekPattern { self.pattern }
    pub fn weekday(&self) -> u8 { self.weekday }
    pub fn start_period(&self) -> u8 { self.start_period }
    pub fn end_period(&self) -> u8 { self.end_period }
    pub fn room(&self) -> &str { &self.room }
    pub fn raw(&self) -> &str { &self.raw }

    /// True si hay clase en la semana `week`.
    pub fn occurs_on_week(&self, week: u16) -> bool {
        week >= self.start_week && week <= self.end_week && self.pattern.admits(week)
    }

    /// True si la sesión ocupa la celda (semana, día, periodo).
    pub fn occurs_on(&self, week: u16, weekday: u8, period: u8) -> bool {
        self.occurs_on_week(week)
            && self.weekday == weekday
            && self.start_period <= period
            && period <= self.end_period
    }
}

/// Separador de `CourseUid::dedup_key`.
pub const DEDUP_SEPARATOR: char = '\u{1f}';

/// Identidad de una sección: (课程号, 班号).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseUid {
    pub course_id: String,
    pub class_number: String,
}

impl CourseUid {
    pub fn new(course_id: impl Into<String>, class_number: impl Into<String>) -> Self {
        CourseUid { course_id: course_id.into(), class_number: class_number.into() }
    }

    /// Clave de deduplicación en forma de texto. El separador es U+001F,
    /// que no aparece en una celda de texto, así `("a|b", "c")` y
    /// `("a", "b|c")` no comparten clave.
    pub fn dedup_key(&self) -> String {
        format!("{}{}{}", self.course_id, DEDUP_SEPARATOR, self.class_number)
    }
}

impl fmt::Display for CourseUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.course_id, self.class_number)
    }
}

impl FromStr for CourseUid {
    type Err = String;

    /// Acepta `课程号:班号` (también `|` como separador).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, class) = s
            .split_once(':')
            .or_else(|| s.split_once('|'))
            .ok_or_else(|| format!("se esperaba 课程号:班号, recibido '{}'", s))?;
        let (id, class) = (id.trim(), class.trim());
        if id.is_empty() || class.is_empty() {
            return Err(format!("课程号 y 班号 no pueden estar vacíos: '{}'", s));
        }
        Ok(CourseUid::new(id, class))
    }
}

/// Una fila del catálogo (nunca se pierde información: las sesiones que no
/// se pudieron interpretar quedan en `parse_warnings`).
#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub course_id: String,
    pub class_number: String,
    pub name: String,
    pub teacher: String,
    pub department: String,
    pub credits: f64,
    pub category: String,
    pub grade: String,
    /// Fila de origen (1 = cabecera)
    pub row: usize,
    pub meetings: Vec<Meeting>,
    pub parse_warnings: Vec<String>,
    /// Sala leída de un segmento no interpretable; sólo cuenta si ninguna
    /// sesión trae sala
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fallback_room: String,
}

impl Course {
    pub fn uid(&self) -> CourseUid {
        CourseUid::new(self.course_id.clone(), self.class_number.clone())
    }

    pub fn dedup_key(&self) -> String {
        self.uid().dedup_key()
    }

    /// Primera sala conocida, o cadena vacía.
    pub fn primary_room(&self) -> &str {
        self.meetings
            .iter()
            .map(|m| m.room())
            .find(|r| !r.is_empty())
            .unwrap_or(self.fallback_room.as_str())
    }

    pub fn is_fully_parsed(&self) -> bool {
        self.parse_warnings.is_empty()
    }
}
