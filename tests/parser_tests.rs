use kebiao::parser::{MeetingParser, SegmentError, SegmentOutcome, Timetable};
use kebiao::WeekPattern;

fn parser() -> MeetingParser {
    MeetingParser::default()
}

#[test]
fn test_period_form_basic() {
    let cell = parser().parse_cell("1~16周 周一 1~4节 理教101");
    assert!(cell.warnings.is_empty(), "{:?}", cell.warnings);
    assert_eq!(cell.meetings.len(), 1);
    let m = &cell.meetings[0];
    assert_eq!((m.start_week(), m.end_week()), (1, 16));
    assert_eq!(m.pattern(), WeekPattern::Every);
    assert_eq!(m.weekday(), 1);
    assert_eq!((m.start_period(), m.end_period()), (1, 4));
    assert_eq!(m.room(), "理教101");
}

#[test]
fn test_period_form_parity_and_variants() {
    let p = parser();
    let m = p.parse_segment("第2-16周 双周 周三 9-11节 二教401").meeting().cloned().unwrap();
    assert_eq!(m.pattern(), WeekPattern::Even);
    assert_eq!((m.weekday(), m.start_period(), m.end_period()), (3, 9, 11));
    assert_eq!(m.room(), "二教401");

    let m = p.parse_segment("1-15周单周星期日 5~6节").meeting().cloned().unwrap();
    assert_eq!(m.pattern(), WeekPattern::Odd);
    assert_eq!(m.weekday(), 7);
    assert_eq!(m.room(), "");
}

#[test]
fn test_clock_form_afternoon() {
    let cell = parser().parse_cell("第1-16周 周一 下午1-4点半, 理教101");
    assert!(cell.warnings.is_empty(), "{:?}", cell.warnings);
    let m = &cell.meetings[0];
    assert_eq!((m.start_period(), m.end_period()), (5, 8));
    assert_eq!(m.pattern(), WeekPattern::Every);
    assert_eq!(m.room(), "理教101");
}

#[test]
fn test_clock_form_straddling_window_is_approximate() {
    let outcome = parser().parse_segment("第1-16周 周二 下午2-3点半 理教102");
    match &outcome {
        SegmentOutcome::Approximate { meeting, warning } => {
            assert_eq!((meeting.start_period(), meeting.end_period()), (6, 7));
            assert!(matches!(warning, SegmentError::Approximate { start_period: 6, end_period: 7, .. }));
        }
        other => panic!("se esperaba aproximación: {:?}", other),
    }

    // la sesión se conserva y el aviso queda en la celda
    let cell = parser().parse_cell("第1-16周 周二 下午2-3点半 理教102");
    assert_eq!(cell.meetings.len(), 1);
    assert_eq!(cell.warnings.len(), 1);
    assert!(cell.warnings[0].contains("下午2-3点半"));
}

#[test]
fn test_clock_resolution_is_idempotent() {
    let p = parser();
    let a = p.parse_segment("第1-16周 周四 晚上6-9点半 三教201");
    let b = p.parse_segment("第1-16周 周四 晚上6-9点半 三教201");
    assert_eq!(a, b);
    let m = a.meeting().unwrap();
    assert_eq!((m.start_period(), m.end_period()), (9, 12));
}

#[test]
fn test_empty_cell() {
    let cell = parser().parse_cell("");
    assert!(cell.meetings.is_empty());
    assert!(cell.warnings.is_empty());
    let cell = parser().parse_cell("  \n ; ");
    assert!(cell.meetings.is_empty());
    assert!(cell.warnings.is_empty());
}

#[test]
fn test_out_of_range_period_keeps_siblings() {
    let cell = parser().parse_cell("1~16周 周一 12~13节 理教101\n1~16周 周三 3~4节 理教102");
    assert_eq!(cell.meetings.len(), 1);
    assert_eq!(cell.meetings[0].weekday(), 3);
    assert_eq!(cell.warnings.len(), 1);
    assert!(cell.warnings[0].contains("12~13节"));
}

#[test]
fn test_exam_block_is_ignored() {
    let cell = parser().parse_cell("1~16周 周一 1~2节 理教101\n考试时间：20250110下午；考试方式：闭卷");
    assert_eq!(cell.meetings.len(), 1);
    assert!(cell.warnings.is_empty(), "{:?}", cell.warnings);
}

#[test]
fn test_multiple_segments_and_garbage() {
    let cell = parser().parse_cell("1~16周 周一 1~2节 理教101；1~16周 周三 1~2节 理教101；另行通知");
    assert_eq!(cell.meetings.len(), 2);
    assert_eq!(cell.warnings.len(), 1);
    assert!(cell.warnings[0].contains("另行通知"));
}

#[test]
fn test_invalid_week_range_rejected() {
    let outcome = parser().parse_segment("16~1周 周一 1~2节");
    assert!(matches!(outcome, SegmentOutcome::Rejected(SegmentError::Invalid { .. })));
}

#[test]
fn test_custom_timetable_from_json() {
    let json = r#"{
        "periods": [
            {"period": 1, "start": 480, "end": 530},
            {"period": 2, "start": 540, "end": 590}
        ],
        "dayparts": [{"name": "上午", "aliases": [], "origin": 420}],
        "blocks": []
    }"#;
    let tt = Timetable::from_json_str(json).unwrap();
    assert_eq!(tt.period_count(), 2);
    let p = MeetingParser::new(tt);
    // el periodo 3 no existe en esta tabla
    let outcome = p.parse_segment("1~16周 周一 2~3节");
    assert!(matches!(outcome, SegmentOutcome::Rejected(SegmentError::BeyondTimetable { .. })));
    assert!(p.parse_segment("1~16周 周一 1~2节").meeting().is_some());
}

#[test]
fn test_week_number_beyond_u16_is_reported() {
    let p = parser();
    let outcome = p.parse_segment("1~70000周 周一 1~2节 理教101");
    assert!(
        matches!(outcome, SegmentOutcome::Rejected(SegmentError::NumberOutOfRange { field: "end_week", value: 70_000, .. })),
        "{:?}",
        outcome
    );
    let cell = p.parse_cell("1~70000周 周一 1~2节 理教101\n1~16周 周二 1~2节 理教102");
    assert_eq!(cell.meetings.len(), 1);
    assert_eq!(cell.warnings.len(), 1);
    assert!(cell.warnings[0].contains("70000"));
}
