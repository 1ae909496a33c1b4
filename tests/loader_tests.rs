use std::io::Write;

use kebiao::loader::{CatalogRow, CourseLoader, LoadError, LoadWarning};
use kebiao::{load_courses, CourseUid};

fn row(n: usize, id: &str, class: &str, name: &str, teacher: &str, info: &str) -> CatalogRow {
    CatalogRow::from_pairs(
        n,
        [
            ("课程号", id),
            ("课程名", name),
            ("课程类别", "专业课"),
            ("学分", "3"),
            ("教师", teacher),
            ("班号", class),
            ("开课单位", "数学科学学院"),
            ("年级", "2024"),
            ("上课考试信息", info),
        ],
    )
}

#[test]
fn test_load_rows_builds_courses() {
    let rows = vec![
        row(2, "00132380", "1", "高等数学", "张三", "1~16周 周一 1~2节 理教101\n1~16周 周三 3~4节 理教101"),
        row(3, "00132380", "2", "高等数学", "李四", ""),
    ];
    let result = CourseLoader::default().load_rows(&rows, "memoria");
    assert_eq!(result.len(), 2);
    assert_eq!(result.total_rows(), 2);
    assert!(result.warnings().is_empty());

    let c = result.lookup("00132380", "1").unwrap();
    assert_eq!(c.meetings.len(), 2);
    assert_eq!(c.credits, 3.0);
    assert_eq!(c.department, "数学科学学院");
    assert_eq!(c.primary_room(), "理教101");
    assert!(result.get_by_key(&CourseUid::new("00132380", "2").dedup_key()).unwrap().meetings.is_empty());
    assert!(result.contains(&CourseUid::new("00132380", "2")));
}

#[test]
fn test_duplicate_key_keeps_first() {
    let rows = vec![
        row(2, "001", "1", "线性代数", "张三", "1~16周 周二 1~2节 二教101"),
        row(3, "001", "1", "线性代数", "王五", "1~16周 周四 1~2节 二教102"),
    ];
    let result = CourseLoader::default().load_rows(&rows, "memoria");
    assert_eq!(result.len(), 1);
    assert_eq!(result.warnings().len(), 1);
    match &result.warnings()[0] {
        LoadWarning::DuplicateKey { row, first_row, teacher, first_teacher, .. } => {
            assert_eq!((*row, *first_row), (3, 2));
            assert_eq!(teacher, "王五");
            assert_eq!(first_teacher, "张三");
        }
        other => panic!("aviso inesperado: {:?}", other),
    }
    let kept = result.lookup("001", "1").unwrap();
    assert_eq!(kept.teacher, "张三");
    assert_eq!(kept.meetings[0].weekday(), 2);
    assert_eq!(result.summary().duplicate_rows, 1);
}

#[test]
fn test_pipe_inside_identity_is_not_a_duplicate() {
    let rows = vec![row(2, "a|b", "c", "甲", "", ""), row(3, "a", "b|c", "乙", "", "")];
    let result = CourseLoader::default().load_rows(&rows, "memoria");
    assert_eq!(result.len(), 2);
    assert!(result.warnings().is_empty());
    assert_eq!(result.lookup("a", "b|c").unwrap().name, "乙");
    assert_ne!(CourseUid::new("a|b", "c").dedup_key(), CourseUid::new("a", "b|c").dedup_key());
}

#[test]
fn test_missing_identity_skips_row() {
    let rows = vec![row(2, "", "1", "无号课程", "", ""), row(3, "002", "", "无班号", "", ""), row(4, "003", "1", "正常", "", "")];
    let result = CourseLoader::default().load_rows(&rows, "memoria");
    assert_eq!(result.len(), 1);
    assert_eq!(result.warnings().len(), 2);
    assert!(matches!(&result.warnings()[0], LoadWarning::MissingIdentity { row: 2, column } if column == "课程号"));
    assert!(matches!(&result.warnings()[1], LoadWarning::MissingIdentity { row: 3, column } if column == "班号"));
}

#[test]
fn test_bad_credits_and_segment_warnings() {
    let mut r = row(2, "005", "1", "体育", "", "1~16周 周五 13~14节 五四操场；1~16周 周五 7~8节 五四操场");
    r.set("学分", "两学分");
    let result = CourseLoader::default().load_rows(&[r], "memoria");
    let c = result.lookup("005", "1").unwrap();
    assert_eq!(c.credits, 0.0);
    assert_eq!(c.meetings.len(), 1);
    assert_eq!(c.parse_warnings.len(), 1);
    assert!(!c.is_fully_parsed());

    let s = result.summary();
    assert_eq!(s.courses_with_warnings, 1);
    assert_eq!(s.segment_warnings, 1);
    assert!(s.segment_warning_examples[0].starts_with("第2行"));
}

#[test]
fn test_room_recovered_from_unparseable_segment() {
    let rows = vec![
        row(2, "006", "1", "数学分析", "", "1~70000周 周一 1~2节 理教101"),
        row(3, "007", "1", "读书会", "", "时间另行通知"),
    ];
    let result = CourseLoader::default().load_rows(&rows, "memoria");
    let c = result.lookup("006", "1").unwrap();
    assert!(c.meetings.is_empty());
    assert_eq!(c.parse_warnings.len(), 1);
    assert_eq!(c.primary_room(), "理教101");

    let s = result.summary();
    assert_eq!(s.courses_without_meetings, 2);
    assert_eq!(s.courses_without_room, 1);
    assert!(s.empty_room_examples[0].contains("课程号=007"));
}

#[test]
fn test_parallel_parse_matches_sequential() {
    let rows: Vec<CatalogRow> = (0..300)
        .map(|i| {
            let info = format!("1~16周 周{} {}~{}节 理教{}", ["一", "二", "三", "四", "五"][i % 5], 1 + i % 10, 2 + i % 10, i);
            row(i + 2, &format!("{:08}", i), "1", "课程", "", &info)
        })
        .collect();
    let seq = CourseLoader::default().parallel_threshold(usize::MAX).load_rows(&rows, "seq");
    let par = CourseLoader::default().parallel_threshold(10).load_rows(&rows, "par");
    assert_eq!(seq.len(), 300);
    let a: Vec<_> = seq.courses().iter().map(|c| (c.uid(), c.meetings.clone())).collect();
    let b: Vec<_> = par.courses().iter().map(|c| (c.uid(), c.meetings.clone())).collect();
    assert_eq!(a, b);
}

#[test]
fn test_departments_and_display_order() {
    let mut rows = vec![
        row(2, "010", "2", "数学分析", "b老师", ""),
        row(3, "010", "1", "数学分析", "a老师", ""),
        row(4, "020", "1", "普通物理", "丙", ""),
    ];
    rows[2].set("开课单位", "物理学院");
    let result = CourseLoader::default().load_rows(&rows, "memoria");
    assert_eq!(result.departments(), vec!["数学科学学院".to_string(), "物理学院".to_string()]);
    let math = result.courses_in_department(Some("数学科学学院"));
    assert_eq!(math.len(), 2);
    assert_eq!(math[0].teacher, "a老师");
    assert_eq!(result.courses_in_department(None).len(), 3);
    assert_eq!(result.search_by_name("物理", 0.85, 10).len(), 1);
}

#[test]
fn test_csv_file_goes_through_same_pipeline() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(
        file,
        "\u{feff}课程号,课程名,课程类别,学分,教师,班号,开课单位,年级,上课考试信息\n\
         00132380,高等数学,专业课,5,张三,1,数学科学学院,2024,1~16周 周一 1~2节 理教101；1~16周 周三 3~4节 理教101\n\
         00132380,高等数学,专业课,5,李四,1,数学科学学院,2024,\n\
         04830041,普通物理,专业课,2.5,王五,02,物理学院,2024,第1-16周 周二 下午1-4点半 理教201\n"
    )
    .unwrap();
    file.flush().unwrap();

    let result = load_courses(file.path(), None).unwrap();
    assert_eq!(result.total_rows(), 3);
    assert_eq!(result.len(), 2);
    assert_eq!(result.warnings().len(), 1);

    let math = result.lookup("00132380", "1").unwrap();
    assert_eq!(math.meetings.len(), 2);
    assert_eq!(math.credits, 5.0);
    // 班号 se conserva como texto
    let physics = result.lookup("04830041", "02").unwrap();
    assert_eq!(physics.credits, 2.5);
    assert_eq!((physics.meetings[0].start_period(), physics.meetings[0].end_period()), (5, 8));
}

#[test]
fn test_csv_without_identity_column_fails() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "课程名,学分\n高等数学,5").unwrap();
    file.flush().unwrap();
    let err = load_courses(file.path(), None).unwrap_err();
    assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "课程号"), "{:?}", err);
}

#[test]
fn test_missing_and_unsupported_files() {
    let err = load_courses("no/existe/catalogo.xlsx", Some("courses")).unwrap_err();
    assert!(matches!(err, LoadError::NotFound(_)));

    let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    let err = load_courses(file.path(), None).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat(ref ext) if ext == "txt"));
}

#[test]
fn test_corrupt_workbook_is_reported() {
    let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    writeln!(file, "esto no es un libro").unwrap();
    file.flush().unwrap();
    let err = load_courses(file.path(), Some("courses")).unwrap_err();
    assert!(matches!(err, LoadError::Workbook { .. }), "{:?}", err);
}
