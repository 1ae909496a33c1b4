// Notación por periodos: `1~16周 [单周|双周] 周一 1~4节 理教101`.

use regex::Regex;

use super::{extract_room, pattern_from_marker, weekday_from_char, Placement, SegmentGrammar, SegmentMatch};

pub struct PeriodForm {
    re: Regex,
}

impl PeriodForm {
    pub fn new() -> Self {
        let re = Regex::new(
            r"^第?\s*(?P<ws>\d+)\s*[~\-～]\s*(?P<we>\d+)\s*周\s*(?:(?P<pat>每周|单周|双周)\s*)?(?:周|星期)(?P<wd>[一二三四五六日天])\s*(?P<ps>\d+)\s*[~\-～]\s*(?P<pe>\d+)\s*节(?P<rest>.*)$",
        )
        .expect("regex de notación por periodos válida");
        PeriodForm { re }
    }
}

impl Default for PeriodForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentGrammar for PeriodForm {
    fn name(&self) -> &'static str {
        "period"
    }

    fn parse(&self, segment: &str) -> Option<SegmentMatch> {
        let caps = self.re.captures(segment.trim())?;
        let num = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());

        Some(SegmentMatch {
            grammar: self.name(),
            start_week: num("ws")?,
            end_week: num("we")?,
            pattern: pattern_from_marker(caps.name("pat").map(|m| m.as_str())),
            weekday: weekday_from_char(caps.name("wd")?.as_str())?,
            placement: Placement::Periods { start: num("ps")?, end: num("pe")? },
            room: extract_room(caps.name("rest").map_or("", |m| m.as_str())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeekPattern;

    #[test]
    fn parses_catalog_style_line() {
        let m = PeriodForm::new().parse("1~15周 每周周一3~4节 理教107").unwrap();
        assert_eq!((m.start_week, m.end_week), (1, 15));
        assert_eq!(m.pattern, WeekPattern::Every);
        assert_eq!(m.weekday, 1);
        assert_eq!(m.placement, Placement::Periods { start: 3, end: 4 });
        assert_eq!(m.room, "理教107");
    }

    #[test]
    fn accepts_dash_and_di_prefix() {
        let m = PeriodForm::new().parse("第2-16周 双周 周四 10-12节 二教101").unwrap();
        assert_eq!((m.start_week, m.end_week), (2, 16));
        assert_eq!(m.pattern, WeekPattern::Even);
        assert_eq!(m.weekday, 4);
    }

    #[test]
    fn clock_notation_is_not_claimed() {
        assert!(PeriodForm::new().parse("第1-16周 周一 下午1-4点半, 理教101").is_none());
    }
}
