use actix_web::{test, web, App};
use serde_json::{json, Value};

use kebiao::loader::{CatalogRow, CourseLoader};
use kebiao::server::{routes, AppState};
use kebiao::AppConfig;

fn state() -> web::Data<AppState> {
    let rows: Vec<CatalogRow> = [
        ("001", "1", "高等数学", "数学科学学院", "5", "1~16周 周一 1~2节 理教101"),
        ("002", "1", "线性代数", "数学科学学院", "3", "1~16周 周一 2~3节 理教102"),
        ("003", "1", "普通物理", "物理学院", "4", "1~16周 单周 周三 1~2节 理教103"),
        ("003", "1", "普通物理", "物理学院", "4", "1~16周 双周 周三 1~2节 理教103"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (id, class, name, dept, credits, info))| {
        CatalogRow::from_pairs(
            i + 2,
            [
                ("课程号", *id),
                ("班号", *class),
                ("课程名", *name),
                ("开课单位", *dept),
                ("学分", *credits),
                ("上课考试信息", *info),
            ],
        )
    })
    .collect();
    let loader = CourseLoader::default();
    let catalog = loader.load_rows(&rows, "memoria");
    web::Data::new(AppState::new(AppConfig::default(), loader, catalog))
}

macro_rules! app {
    () => {
        test::init_service(App::new().app_data(state()).configure(routes)).await
    };
}

#[actix_web::test]
async fn test_summary_and_departments() {
    let app = app!();
    let req = test::TestRequest::get().uri("/summary").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["courses"], 3);
    assert_eq!(body["total_rows"], 4);
    assert_eq!(body["duplicate_rows"], 1);

    let req = test::TestRequest::get().uri("/departments").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["departments"], json!(["数学科学学院", "物理学院"]));
}

#[actix_web::test]
async fn test_course_list_and_detail() {
    let app = app!();
    let req = test::TestRequest::get().uri("/courses?department=%E7%89%A9%E7%90%86%E5%AD%A6%E9%99%A2").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["courses"][0]["course_id"], "003");

    let req = test::TestRequest::get().uri("/courses/001/1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["name"], "高等数学");
    assert_eq!(body["meetings"][0]["room"], "理教101");

    let req = test::TestRequest::get().uri("/courses/999/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_conflicts_endpoint() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/conflicts")
        .set_json(json!({"a": "001:1", "b": {"course_id": "002", "class_number": "1"}}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["conflict"], true);
    assert_eq!(body["clash"], json!({"week": 1, "weekday": 1, "period": 2}));

    let req = test::TestRequest::post()
        .uri("/conflicts")
        .set_json(json!({"a": "001:1", "b": "003:1"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["conflict"], false);
    assert!(body["clash"].is_null());

    let req = test::TestRequest::post().uri("/conflicts").set_json(json!({"a": "001"})).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_selection_endpoints() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/selection/check")
        .set_json(json!({"selected": ["001:1"], "adding": ["003:1"]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["total_credits"], 9.0);

    let req = test::TestRequest::post()
        .uri("/selection/check")
        .set_json(json!({"selected": ["001:1"], "adding": ["002:1"]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["reason"]["kind"], "conflict");

    let req = test::TestRequest::post()
        .uri("/selection/check")
        .set_json(json!({"selected": ["001:1"], "adding": ["003:1"], "credit_limit": 8.0}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["reason"]["kind"], "credit_limit");

    let req = test::TestRequest::post()
        .uri("/selection/timetable")
        .set_json(json!({"selected": ["001:1", "003:1"], "week": 2}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    // semana par: sólo 高等数学 (la sesión de 003 es de semanas impares)
    assert_eq!(body["cells"].as_array().map(|c| c.len()), Some(2));

    let req = test::TestRequest::post()
        .uri("/selection/timetable")
        .set_json(json!({"selected": ["001:1"], "week": 20}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_conflict_graph_and_reload_without_file() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/conflicts/graph")
        .set_json(json!({"uids": ["001:1", "002:1", "003:1"]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["pairs"].as_array().map(|p| p.len()), Some(1));
    assert_eq!(body["groups"][0], json!([
        {"course_id": "001", "class_number": "1"},
        {"course_id": "002", "class_number": "1"}
    ]));

    let req = test::TestRequest::post().uri("/reload").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_reload_from_csv() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    std::io::Write::write_all(&mut file, "课程号,班号,课程名,学分\n010,1,新课程,2\n".as_bytes()).unwrap();
    let config = AppConfig { catalog: Some(file.path().to_path_buf()), sheet: None, ..AppConfig::default() };
    let data = web::Data::new(AppState::new(config, CourseLoader::default(), CourseLoader::default().load_rows(&[], "vacío")));
    let app = test::init_service(App::new().app_data(data.clone()).configure(routes)).await;

    let req = test::TestRequest::post().uri("/reload").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["courses"], 1);
    assert!(data.catalog().lookup("010", "1").is_some());
}
