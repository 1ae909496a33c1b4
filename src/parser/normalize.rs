// Validación final: de `SegmentMatch` a `Meeting` o a un aviso.

use std::fmt;
use thiserror::Error;

use super::timetable::Timetable;
use super::{Placement, SegmentMatch};
use crate::models::{Meeting, MeetingError};

/// Ventana de reloj en minutos desde medianoche, `[inicio, fin)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockWindow(pub u16, pub u16);

impl fmt::Display for ClockWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}-{:02}:{:02}", self.0 / 60, self.0 % 60, self.1 / 60, self.1 % 60)
    }
}

/// Problema con un segmento. El `Display` es el aviso que ve el usuario y
/// siempre incluye el texto original.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("未能解析上课行：{segment}")]
    Unrecognized { segment: String },

    #[error("上课行校验失败（{reason}）：{segment}")]
    Invalid { segment: String, reason: MeetingError },

    #[error("数值超出范围（{field}={value}）：{segment}")]
    NumberOutOfRange { segment: String, field: &'static str, value: u32 },

    #[error("节次超出课表范围（第{start}-{end}节，共{max}节）：{segment}")]
    BeyondTimetable { segment: String, start: u8, end: u8, max: u8 },

    #[error("钟点无法对应到节次（{window}）：{segment}")]
    Unplaceable { segment: String, window: ClockWindow },

    #[error("钟点与节次边界不对齐（{window}），按第{start_period}-{end_period}节近似：{segment}")]
    Approximate { segment: String, window: ClockWindow, start_period: u8, end_period: u8 },
}

/// Resultado etiquetado de un segmento: nunca se lanza un error, se acumula.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentOutcome {
    Parsed(Meeting),
    /// Sesión ubicada de forma aproximada; se conserva junto con el aviso
    Approximate { meeting: Meeting, warning: SegmentError },
    Rejected(SegmentError),
}

impl SegmentOutcome {
    pub fn meeting(&self) -> Option<&Meeting> {
        match self {
            SegmentOutcome::Parsed(m) | SegmentOutcome::Approximate { meeting: m, .. } => Some(m),
            SegmentOutcome::Rejected(_) => None,
        }
    }

    pub fn warning(&self) -> Option<&SegmentError> {
        match self {
            SegmentOutcome::Parsed(_) => None,
            SegmentOutcome::Approximate { warning, .. } | SegmentOutcome::Rejected(warning) => Some(warning),
        }
    }
}

/// Estrecha un número capturado; si no cabe, el segmento se rechaza con
/// el valor original en el aviso.
fn narrow<T: TryFrom<u32>>(segment: &str, field: &'static str, value: u32) -> Result<T, SegmentError> {
    T::try_from(value).map_err(|_| SegmentError::NumberOutOfRange { segment: segment.to_string(), field, value })
}

pub(super) fn normalize(segment: &str, matched: Option<SegmentMatch>, timetable: &Timetable) -> SegmentOutcome {
    let segment = segment.trim().to_string();
    let Some(m) = matched else {
        return SegmentOutcome::Rejected(SegmentError::Unrecognized { segment });
    };

    let (periods, approx) = match m.placement {
        Placement::Periods { start, end } => {
            let periods = narrow::<u8>(&segment, "start_period", start)
                .and_then(|s| Ok((s, narrow::<u8>(&segment, "end_period", end)?)));
            (periods, None)
        }
        Placement::Clock { window, resolution: None } => {
            return SegmentOutcome::Rejected(SegmentError::Unplaceable {
                segment,
                window: ClockWindow(window.0, window.1),
            });
        }
        Placement::Clock { window, resolution: Some(r) } => {
            (Ok((r.start_period, r.end_period)), (!r.aligned).then_some(ClockWindow(window.0, window.1)))
        }
    };

    let fields = periods.and_then(|(sp, ep)| {
        Ok((
            narrow::<u16>(&segment, "start_week", m.start_week)?,
            narrow::<u16>(&segment, "end_week", m.end_week)?,
            narrow::<u8>(&segment, "weekday", m.weekday)?,
            sp,
            ep,
        ))
    });
    let (start_week, end_week, weekday, start_period, end_period) = match fields {
        Ok(f) => f,
        Err(e) => return SegmentOutcome::Rejected(e),
    };

    let meeting = match Meeting::new(start_week, end_week, m.pattern, weekday, start_period, end_period, m.room) {
        Ok(meeting) => meeting.with_raw(segment.clone()),
        Err(reason) => return SegmentOutcome::Rejected(SegmentError::Invalid { segment, reason }),
    };

    let max = timetable.period_count();
    if end_period > max {
        return SegmentOutcome::Rejected(SegmentError::BeyondTimetable {
            segment,
            start: start_period,
            end: end_period,
            max,
        });
    }

    match approx {
        Some(window) => SegmentOutcome::Approximate {
            meeting,
            warning: SegmentError::Approximate { segment, window, start_period, end_period },
        },
        None => SegmentOutcome::Parsed(meeting),
    }
}
