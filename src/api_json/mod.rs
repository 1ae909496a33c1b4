//! Cuerpos JSON de la API HTTP.
//!
//! Un curso se identifica con `"课程号:班号"` (también `"课程号|班号"`) o con
//! el objeto explícito:
//! ```json
//! { "course_id": "00132380", "class_number": "1" }
//! ```

use serde::{Deserialize, Serialize};

use crate::models::CourseUid;

/// Referencia a una sección tal como llega en el JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UidRef {
    Text(String),
    Pair { course_id: String, class_number: String },
}

impl UidRef {
    pub fn resolve(&self) -> Result<CourseUid, String> {
        match self {
            UidRef::Text(s) => s.parse::<CourseUid>(),
            UidRef::Pair { course_id, class_number } => {
                if course_id.trim().is_empty() || class_number.trim().is_empty() {
                    return Err("course_id y class_number no pueden estar vacíos".to_string());
                }
                Ok(CourseUid::new(course_id.trim(), class_number.trim()))
            }
        }
    }
}

impl From<&CourseUid> for UidRef {
    fn from(uid: &CourseUid) -> Self {
        UidRef::Text(uid.to_string())
    }
}

/// Resuelve una lista de referencias; falla con la primera inválida.
pub fn resolve_all(refs: &[UidRef]) -> Result<Vec<CourseUid>, String> {
    refs.iter().map(UidRef::resolve).collect()
}

/// `GET /courses?department=&q=`
#[derive(Debug, Default, Deserialize)]
pub struct CoursesQuery {
    pub department: Option<String>,
    pub q: Option<String>,
}

/// `POST /conflicts`
#[derive(Debug, Serialize, Deserialize)]
pub struct ConflictRequest {
    pub a: UidRef,
    pub b: UidRef,
}

/// `POST /selection/check`
///
/// ```json
/// {
///   "selected": ["00132380:1"],
///   "adding": ["04830041:2"],
///   "credit_limit": 25.0
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct SelectionCheckRequest {
    #[serde(default)]
    pub selected: Vec<UidRef>,
    pub adding: Vec<UidRef>,
    /// Si falta se usa el tope configurado
    pub credit_limit: Option<f64>,
}

/// `POST /selection/timetable`
#[derive(Debug, Serialize, Deserialize)]
pub struct TimetableRequest {
    pub selected: Vec<UidRef>,
    pub week: u16,
}

/// `POST /conflicts/graph`
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphRequest {
    pub uids: Vec<UidRef>,
}
