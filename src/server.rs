//! API HTTP sobre el catálogo cargado.
//!
//! El catálogo vive en un `Arc<LoadResult>` detrás de un `RwLock`: los
//! handlers toman una copia del `Arc` y `POST /reload` lo reemplaza entero.

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Responder};
use serde_json::json;
use std::sync::{Arc, RwLock};

use crate::algorithm::{
    conflict_graph, conflict_groups, conflicting_pairs, course_clash, Selection, SelectionError, SEMESTER_WEEKS,
};
use crate::api_json::{
    resolve_all, ConflictRequest, CoursesQuery, GraphRequest, SelectionCheckRequest, TimetableRequest, UidRef,
};
use crate::config::AppConfig;
use crate::loader::{CourseLoader, LoadResult};
use crate::models::{Course, CourseUid};

/// Umbral de similitud para `GET /courses?q=`.
const SEARCH_MIN_SCORE: f64 = 0.85;
const SEARCH_LIMIT: usize = 50;

pub struct AppState {
    config: AppConfig,
    loader: Arc<CourseLoader>,
    catalog: RwLock<Arc<LoadResult>>,
}

impl AppState {
    pub fn new(config: AppConfig, loader: CourseLoader, catalog: LoadResult) -> Self {
        AppState { config, loader: Arc::new(loader), catalog: RwLock::new(Arc::new(catalog)) }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Catálogo vigente.
    pub fn catalog(&self) -> Arc<LoadResult> {
        match self.catalog.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn replace(&self, catalog: LoadResult) {
        let mut guard = match self.catalog.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(catalog);
    }
}

fn bad_request(msg: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({"error": msg.to_string()}))
}

fn not_found(uid: &CourseUid) -> HttpResponse {
    HttpResponse::NotFound().json(json!({"error": format!("课程 {} 不存在", uid)}))
}

/// Convierte el cuerpo JSON al tipo de la petición (400 si no encaja).
fn parse_body<T: serde::de::DeserializeOwned>(body: web::Json<serde_json::Value>) -> Result<T, HttpResponse> {
    serde_json::from_value(body.into_inner()).map_err(|e| bad_request(format!("invalid JSON body: {}", e)))
}

fn resolve_uids(refs: &[UidRef]) -> Result<Vec<CourseUid>, HttpResponse> {
    resolve_all(refs).map_err(bad_request)
}

fn lookup_all<'a>(catalog: &'a LoadResult, uids: &[CourseUid]) -> Result<Vec<&'a Course>, HttpResponse> {
    uids.iter().map(|uid| catalog.get_by_uid(uid).ok_or_else(|| not_found(uid))).collect()
}

/// GET /summary
async fn summary_handler(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.catalog().summary())
}

/// GET /courses?department=&q=
async fn courses_handler(state: web::Data<AppState>, query: web::Query<CoursesQuery>) -> impl Responder {
    let catalog = state.catalog();
    let department = query.department.as_deref().map(str::trim).filter(|d| !d.is_empty());
    let courses: Vec<&Course> = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => catalog
            .search_by_name(q, SEARCH_MIN_SCORE, SEARCH_LIMIT)
            .into_iter()
            .filter(|c| department.is_none_or(|d| c.department.trim() == d))
            .collect(),
        None => catalog.courses_in_department(department),
    };
    HttpResponse::Ok().json(json!({"count": courses.len(), "courses": courses}))
}

/// GET /courses/{course_id}/{class_number}
async fn course_detail_handler(state: web::Data<AppState>, path: web::Path<(String, String)>) -> impl Responder {
    let (course_id, class_number) = path.into_inner();
    let catalog = state.catalog();
    match catalog.lookup(course_id.trim(), class_number.trim()) {
        Some(course) => HttpResponse::Ok().json(course),
        None => not_found(&CourseUid::new(course_id, class_number)),
    }
}

/// GET /departments
async fn departments_handler(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({"departments": state.catalog().departments()}))
}

/// POST /conflicts
async fn conflicts_handler(state: web::Data<AppState>, body: web::Json<serde_json::Value>) -> HttpResponse {
    let req: ConflictRequest = match parse_body(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let uids = match resolve_uids(&[req.a, req.b]) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let catalog = state.catalog();
    let courses = match lookup_all(&catalog, &uids) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let clash = course_clash(courses[0], courses[1]);
    HttpResponse::Ok().json(json!({
        "a": uids[0],
        "b": uids[1],
        "conflict": clash.is_some(),
        "clash": clash,
        "message": clash.map(|c| c.to_string()),
    }))
}

/// POST /selection/check
async fn selection_check_handler(state: web::Data<AppState>, body: web::Json<serde_json::Value>) -> HttpResponse {
    let req: SelectionCheckRequest = match parse_body(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let (selected, adding) = match (resolve_uids(&req.selected), resolve_uids(&req.adding)) {
        (Ok(s), Ok(a)) => (s, a),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };
    let limit = req.credit_limit.unwrap_or(state.config().credit_limit);
    if !limit.is_finite() || limit < 0.0 {
        return bad_request(format!("credit_limit inválido: {}", limit));
    }

    let catalog = state.catalog();
    let selection = match Selection::from_uids(&catalog, &selected, limit) {
        Ok(s) => s,
        Err(SelectionError::UnknownCourse { uid }) => return not_found(&uid),
        Err(e) => return bad_request(e),
    };
    let candidates = match lookup_all(&catalog, &adding) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let added_credits: f64 = candidates.iter().filter(|c| !selection.contains(&c.uid())).map(|c| c.credits).sum();
    match selection.check_add(&candidates) {
        Ok(()) => HttpResponse::Ok().json(json!({
            "ok": true,
            "total_credits": selection.total_credits() + added_credits,
            "credit_limit": limit,
        })),
        Err(e) => HttpResponse::Ok().json(json!({
            "ok": false,
            "reason": e,
            "message": e.to_string(),
        })),
    }
}

/// POST /selection/timetable
async fn selection_timetable_handler(state: web::Data<AppState>, body: web::Json<serde_json::Value>) -> HttpResponse {
    let req: TimetableRequest = match parse_body(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    if !(1..=SEMESTER_WEEKS).contains(&req.week) {
        return bad_request(format!("week debe estar entre 1 y {}", SEMESTER_WEEKS));
    }
    let uids = match resolve_uids(&req.selected) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let catalog = state.catalog();
    let selection = match Selection::from_uids(&catalog, &uids, state.config().credit_limit) {
        Ok(s) => s,
        Err(SelectionError::UnknownCourse { uid }) => return not_found(&uid),
        Err(e) => return bad_request(e),
    };
    HttpResponse::Ok().json(json!({
        "week": req.week,
        "total_credits": selection.total_credits(),
        "cells": selection.occupied_cells(req.week),
    }))
}

/// POST /conflicts/graph
async fn conflict_graph_handler(state: web::Data<AppState>, body: web::Json<serde_json::Value>) -> HttpResponse {
    let req: GraphRequest = match parse_body(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let uids = match resolve_uids(&req.uids) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let catalog = state.catalog();
    let courses = match lookup_all(&catalog, &uids) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let graph = conflict_graph(&courses);
    HttpResponse::Ok().json(json!({
        "pairs": conflicting_pairs(&graph),
        "groups": conflict_groups(&graph),
    }))
}

/// POST /reload
/// Vuelve a leer el archivo configurado en un hilo bloqueante y reemplaza
/// el catálogo sólo si la carga tuvo éxito.
async fn reload_handler(state: web::Data<AppState>) -> HttpResponse {
    let path = match state.config().catalog.clone() {
        Some(p) => p,
        None => return bad_request("no hay archivo de catálogo configurado (KEBIAO_CATALOG)"),
    };
    let sheet = state.config().sheet.clone();
    let loader = Arc::clone(&state.loader);

    let joined = tokio::task::spawn_blocking(move || loader.load_file(&path, sheet.as_deref())).await;
    match joined {
        Ok(Ok(result)) => {
            let summary = result.summary();
            state.replace(result);
            log::info!("catálogo recargado: {} cursos", summary.courses);
            HttpResponse::Ok().json(summary)
        }
        Ok(Err(e)) => {
            log::error!("recarga fallida: {}", e);
            HttpResponse::InternalServerError().json(json!({"error": e.to_string()}))
        }
        Err(e) => HttpResponse::InternalServerError().json(json!({"error": format!("reload task failed: {}", e)})),
    }
}

async fn help_handler() -> impl Responder {
    let help = json!({
        "description": "API de consulta del catálogo de cursos y detección de conflictos de horario.",
        "uid_format": "\"课程号:班号\" o {\"course_id\": ..., \"class_number\": ...}",
        "endpoints": [
            {"method": "GET", "path": "/summary", "description": "estadísticas y avisos de la carga"},
            {"method": "GET", "path": "/courses?department=&q=", "description": "lista de cursos; q busca por nombre"},
            {"method": "GET", "path": "/courses/{course_id}/{class_number}", "description": "detalle de un curso"},
            {"method": "GET", "path": "/departments", "description": "unidades académicas"},
            {"method": "POST", "path": "/conflicts", "example": {"a": "00132380:1", "b": "04830041:2"}},
            {"method": "POST", "path": "/selection/check", "example": {"selected": ["00132380:1"], "adding": ["04830041:2"], "credit_limit": 25.0}},
            {"method": "POST", "path": "/selection/timetable", "example": {"selected": ["00132380:1"], "week": 3}},
            {"method": "POST", "path": "/conflicts/graph", "example": {"uids": ["00132380:1", "04830041:2", "04830041:3"]}},
            {"method": "POST", "path": "/reload", "description": "vuelve a leer el archivo del catálogo"}
        ]
    });
    HttpResponse::Ok().json(help)
}

/// Rutas de la API (reutilizable en tests con `App::new().configure(routes)`).
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/summary", web::get().to(summary_handler))
        .route("/courses", web::get().to(courses_handler))
        .route("/courses/{course_id}/{class_number}", web::get().to(course_detail_handler))
        .route("/departments", web::get().to(departments_handler))
        .route("/conflicts", web::post().to(conflicts_handler))
        .route("/conflicts/graph", web::post().to(conflict_graph_handler))
        .route("/selection/check", web::post().to(selection_check_handler))
        .route("/selection/timetable", web::post().to(selection_timetable_handler))
        .route("/reload", web::post().to(reload_handler))
        .route("/help", web::get().to(help_handler));
}

pub async fn run_server(state: AppState) -> std::io::Result<()> {
    let bind = state.config().bind.clone();
    let data = web::Data::new(state);
    log::info!("servidor escuchando en http://{}", bind);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(middleware::Logger::default())
            .wrap(Cors::permissive())
            .configure(routes)
    })
    .bind(bind.as_str())?
    .run()
    .await
}
