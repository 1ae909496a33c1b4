//! Interpretación de la celda de horario de un curso.
//!
//! Submódulos:
//! - `timetable`: tabla horaria institucional (periodos, franjas, bloques)
//! - `tokenizer`: separa la celda en segmentos
//! - `period_form`: notación por periodos (`1~16周 周一 1~4节 理教101`)
//! - `clock_form`: notación por hora (`第1-16周 周一 下午1-4点半, 理教101`)
//! - `normalize`: validación final y construcción de `Meeting`
//!
//! Las gramáticas se prueban en orden; la primera que reconoce el segmento
//! produce un `SegmentMatch` y el normalizador decide si es válido.

pub mod timetable;
mod tokenizer;
mod period_form;
mod clock_form;
mod normalize;

pub use clock_form::ClockForm;
pub use normalize::{ClockWindow, SegmentError, SegmentOutcome};
pub use period_form::PeriodForm;
pub use timetable::{Daypart, PeriodResolution, PeriodSlot, SlotBlock, Timetable, TimetableError};
pub use tokenizer::Tokenizer;

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::models::{Meeting, WeekPattern};

/// Cómo quedó ubicada la sesión dentro del día.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Periodos escritos explícitamente (pueden estar fuera de rango)
    Periods { start: u32, end: u32 },
    /// Ventana de reloj en minutos y su resolución a periodos, si la hubo
    Clock { window: (u16, u16), resolution: Option<PeriodResolution> },
}

/// Extracción estructurada de un segmento, antes de validar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentMatch {
    pub grammar: &'static str,
    pub start_week: u32,
    pub end_week: u32,
    pub pattern: WeekPattern,
    pub weekday: u32,
    pub placement: Placement,
    pub room: String,
}

/// Una notación de horario. Devuelve `None` si el segmento no le pertenece.
pub trait SegmentGrammar: Send + Sync {
    fn name(&self) -> &'static str;
    fn parse(&self, segment: &str) -> Option<SegmentMatch>;
}

pub(crate) fn weekday_from_char(c: &str) -> Option<u32> {
    match c {
        "一" => Some(1),
        "二" => Some(2),
        "三" => Some(3),
        "四" => Some(4),
        "五" => Some(5),
        "六" => Some(6),
        "日" | "天" => Some(7),
        _ => None,
    }
}

pub(crate) fn pattern_from_marker(marker: Option<&str>) -> WeekPattern {
    match marker {
        Some("单周") => WeekPattern::Odd,
        Some("双周") => WeekPattern::Even,
        _ => WeekPattern::Every,
    }
}

/// Sala: lo que queda tras la cláusula horaria, sin separadores iniciales,
/// sin el paréntesis de cierre de un comentario envolvente y sin la
/// observación entre paréntesis del final.
pub(crate) fn extract_room(rest: &str) -> String {
    let s = rest.trim().trim_start_matches([',', ':', '：', '、', ' ']);
    let s = match s.find(['(', '（']) {
        Some(pos) => &s[..pos],
        None => s,
    };
    s.trim().trim_end_matches([')', '）']).trim().to_string()
}

static ROOM_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"节|点(?:半|\d+分?)?").expect("regex de cola de sala válida"));

/// Sala de un segmento que ninguna gramática aceptó: el texto tras el
/// último marcador de periodo u hora (`节`, `点`, `点半`, `点30分`).
pub(crate) fn salvage_room(segment: &str) -> Option<String> {
    let tail = ROOM_TAIL.find_iter(segment).last()?;
    let room = extract_room(&segment[tail.end()..]);
    (!room.is_empty() && !room.contains('周')).then_some(room)
}

/// Resultado de interpretar una celda completa.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCell {
    pub meetings: Vec<Meeting>,
    pub warnings: Vec<String>,
    /// Salas recuperadas de segmentos descartados
    pub salvaged_rooms: Vec<String>,
}

/// Pipeline completo: tokenizer → gramáticas → normalizador.
pub struct MeetingParser {
    timetable: Arc<Timetable>,
    tokenizer: Tokenizer,
    grammars: Vec<Box<dyn SegmentGrammar>>,
}

impl MeetingParser {
    /// Parser con las dos notaciones conocidas (periodos primero).
    pub fn new(timetable: Timetable) -> Self {
        let timetable = Arc::new(timetable);
        let grammars: Vec<Box<dyn SegmentGrammar>> = vec![
            Box::new(PeriodForm::new()),
            Box::new(ClockForm::new(Arc::clone(&timetable))),
        ];
        Self::with_grammars(timetable, grammars)
    }

    pub fn with_grammars(timetable: Arc<Timetable>, grammars: Vec<Box<dyn SegmentGrammar>>) -> Self {
        let tokenizer = Tokenizer::new(&timetable.exam_markers);
        MeetingParser { timetable, tokenizer, grammars }
    }

    /// Añade una notación al final de la lista.
    pub fn push_grammar(&mut self, grammar: Box<dyn SegmentGrammar>) {
        self.grammars.push(grammar);
    }

    pub fn timetable(&self) -> &Timetable {
        &self.timetable
    }

    pub fn grammar_names(&self) -> Vec<&'static str> {
        self.grammars.iter().map(|g| g.name()).collect()
    }

    pub fn segments(&self, cell: &str) -> Vec<String> {
        self.tokenizer.segments(cell)
    }

    /// Primera gramática que reconoce el segmento.
    pub fn match_segment(&self, segment: &str) -> Option<SegmentMatch> {
        self.grammars.iter().find_map(|g| g.parse(segment))
    }

    pub fn parse_segment(&self, segment: &str) -> SegmentOutcome {
        let matched = self.match_segment(segment);
        normalize::normalize(segment, matched, &self.timetable)
    }

    pub fn parse_cell(&self, cell: &str) -> ParsedCell {
        let mut out = ParsedCell::default();
        for segment in self.segments(cell) {
            match self.parse_segment(&segment) {
                SegmentOutcome::Parsed(m) => out.meetings.push(m),
                SegmentOutcome::Approximate { meeting, warning } => {
                    out.meetings.push(meeting);
                    out.warnings.push(warning.to_string());
                }
                SegmentOutcome::Rejected(err) => {
                    log::debug!("segmento descartado: {}", err);
                    out.warnings.push(err.to_string());
                    if let Some(room) = salvage_room(&segment) {
                        out.salvaged_rooms.push(room);
                    }
                }
            }
        }
        out
    }
}

impl Default for MeetingParser {
    fn default() -> Self {
        MeetingParser::new(Timetable::default())
    }
}
