// Notación por hora: `第1-16周 周一 下午1-4点半, 理教101`.
// Suele venir dentro de un comentario: `(备注：第1-16周 周一 下午1-4点半，理教101)`.

use regex::Regex;
use std::sync::Arc;

use super::timetable::Timetable;
use super::{extract_room, pattern_from_marker, weekday_from_char, Placement, SegmentGrammar, SegmentMatch};

pub struct ClockForm {
    re: Regex,
    timetable: Arc<Timetable>,
}

impl ClockForm {
    /// Las etiquetas de franja se toman de la tabla horaria.
    pub fn new(timetable: Arc<Timetable>) -> Self {
        let labels: Vec<String> = timetable.daypart_labels().into_iter().map(regex::escape).collect();
        let tod = if labels.is_empty() {
            String::new()
        } else {
            format!(r"(?P<tod>{})?\s*", labels.join("|"))
        };
        let pattern = format!(
            r"^[(（]?\s*(?:备注\s*[:：]\s*)?第?\s*(?P<ws>\d+)\s*[-~～]\s*(?P<we>\d+)\s*周\s*(?:(?P<pat>每周|单周|双周)\s*)?(?:周|星期)(?P<wd>[一二三四五六日天])\s*{tod}(?P<h1>\d{{1,2}})\s*(?:[:：](?P<m1>\d{{1,2}}))?\s*点?\s*(?P<half1>半)?\s*[-~～]\s*(?P<h2>\d{{1,2}})\s*(?:[:：](?P<m2>\d{{1,2}}))?\s*点?\s*(?P<half2>半)?(?P<rest>.*)$"
        );
        let re = Regex::new(&pattern).expect("regex de notación por hora válida");
        ClockForm { re, timetable }
    }
}

impl SegmentGrammar for ClockForm {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn parse(&self, segment: &str) -> Option<SegmentMatch> {
        let caps = self.re.captures(segment.trim())?;
        let rest = caps.name("rest").map_or("", |m| m.as_str());
        // `1~4节` también encaja en la gramática de horas; no es nuestro
        if rest.trim_start().starts_with('节') {
            return None;
        }
        let num = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());
        let small = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u16>().ok());

        let daypart = caps.name("tod").and_then(|m| self.timetable.daypart(m.as_str()));
        let minute_of = |h: &str, m: &str, half: &str| -> Option<u16> {
            let hour = small(h)?;
            let minute = match (small(m), caps.name(half)) {
                (Some(mm), _) => mm,
                (None, Some(_)) => 30,
                (None, None) => 0,
            };
            Some(self.timetable.clock_minute(daypart, hour, minute))
        };
        let start = minute_of("h1", "m1", "half1")?;
        let end = minute_of("h2", "m2", "half2")?;

        Some(SegmentMatch {
            grammar: self.name(),
            start_week: num("ws")?,
            end_week: num("we")?,
            pattern: pattern_from_marker(caps.name("pat").map(|m| m.as_str())),
            weekday: weekday_from_char(caps.name("wd")?.as_str())?,
            placement: Placement::Clock {
                window: (start, end),
                resolution: self.timetable.resolve(daypart, start, end),
            },
            room: extract_room(rest),
        })
    }
}
