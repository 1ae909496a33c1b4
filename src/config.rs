//! Configuración de la aplicación a partir del entorno (`.env` incluido).
//!
//! | Variable              | Uso                                   | Defecto          |
//! |-----------------------|---------------------------------------|------------------|
//! | `KEBIAO_CATALOG`      | archivo del catálogo (.xlsx/.csv ...) | —                |
//! | `KEBIAO_SHEET`        | hoja del libro; vacío = primera hoja  | `courses`        |
//! | `KEBIAO_BIND`         | dirección del servidor HTTP           | `127.0.0.1:8080` |
//! | `KEBIAO_TIMETABLE`    | tabla horaria en JSON                 | tabla PKU        |
//! | `KEBIAO_CREDIT_LIMIT` | tope de créditos de una selección     | `25`             |

use std::path::PathBuf;

use crate::algorithm::DEFAULT_CREDIT_LIMIT;
use crate::excel::DEFAULT_SHEET;
use crate::loader::{CourseLoader, LoadError};
use crate::parser::{MeetingParser, Timetable, TimetableError};

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub catalog: Option<PathBuf>,
    pub sheet: Option<String>,
    pub bind: String,
    pub timetable: Option<PathBuf>,
    pub credit_limit: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            catalog: None,
            sheet: Some(DEFAULT_SHEET.to_string()),
            bind: DEFAULT_BIND.to_string(),
            timetable: None,
            credit_limit: DEFAULT_CREDIT_LIMIT,
        }
    }
}

impl AppConfig {
    /// Carga `.env` (si existe) y lee las variables `KEBIAO_*`.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AppConfig::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        cfg.catalog = non_empty("KEBIAO_CATALOG").map(PathBuf::from);
        if let Some(sheet) = lookup("KEBIAO_SHEET") {
            let sheet = sheet.trim();
            cfg.sheet = (!sheet.is_empty()).then(|| sheet.to_string());
        }
        if let Some(bind) = non_empty("KEBIAO_BIND") {
            cfg.bind = bind;
        }
        cfg.timetable = non_empty("KEBIAO_TIMETABLE").map(PathBuf::from);
        if let Some(raw) = non_empty("KEBIAO_CREDIT_LIMIT") {
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => cfg.credit_limit = v,
                _ => log::warn!("KEBIAO_CREDIT_LIMIT='{}' no es válido, se usa {}", raw, cfg.credit_limit),
            }
        }
        cfg
    }

    /// Tabla horaria configurada, o la tabla por defecto.
    pub fn load_timetable(&self) -> Result<Timetable, TimetableError> {
        match &self.timetable {
            Some(path) => Timetable::from_json_file(path),
            None => Ok(Timetable::default()),
        }
    }

    pub fn loader(&self) -> Result<CourseLoader, LoadError> {
        Ok(CourseLoader::new(MeetingParser::new(self.load_timetable()?)))
    }
}
