// Biblioteca raíz del crate `kebiao`.
// Interpretación de los horarios del catálogo de cursos, carga del catálogo
// y detección de conflictos; el servidor HTTP y el binario se apoyan en ella.
pub mod models;
pub mod parser;
pub mod excel;
pub mod loader;
pub mod algorithm;
pub mod config;
pub mod api_json;
pub mod server;

pub use algorithm::{courses_conflict, first_clash, meetings_conflict, Clash, Selection, SelectionError};
pub use config::AppConfig;
pub use loader::{load_courses, CatalogRow, CourseLoader, LoadError, LoadResult, LoadWarning};
pub use models::{Course, CourseUid, Meeting, WeekPattern};
pub use parser::{MeetingParser, SegmentError, SegmentOutcome, Timetable};
/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::{run_server, AppState};
