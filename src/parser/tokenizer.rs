// Separación de la celda 上课考试信息 en segmentos independientes.

use regex::Regex;

/// Divide la celda cruda en segmentos candidatos (uno por sesión).
///
/// - normaliza saltos de línea, puntuación de ancho completo y espacios
/// - corta en saltos de línea y en `;`
/// - descarta el bloque de examen desde el primer marcador (`考试时间`, ...)
///   aunque venga pegado a la misma línea
/// - elimina segmentos vacíos
pub struct Tokenizer {
    spaces: Regex,
    exam_markers: Vec<String>,
}

impl Tokenizer {
    pub fn new(exam_markers: &[String]) -> Self {
        Tokenizer {
            spaces: Regex::new(r"[ \t\u{3000}]+").expect("regex de espacios válida"),
            exam_markers: exam_markers.iter().filter(|m| !m.is_empty()).cloned().collect(),
        }
    }

    pub fn normalize(&self, cell: &str) -> String {
        let s = cell
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .replace('；', ";")
            .replace('，', ",");
        self.spaces.replace_all(&s, " ").trim().to_string()
    }

    /// Recorta el texto en la primera aparición de un marcador de examen.
    fn strip_exam_block<'a>(&self, s: &'a str) -> &'a str {
        let cut = self.exam_markers.iter().filter_map(|m| s.find(m.as_str())).min();
        match cut {
            Some(pos) => &s[..pos],
            None => s,
        }
    }

    pub fn segments(&self, cell: &str) -> Vec<String> {
        let normalized = self.normalize(cell);
        if normalized.is_empty() {
            return Vec::new();
        }
        self.strip_exam_block(&normalized)
            .split(['\n', ';'])
            .map(|seg| seg.trim())
            .filter(|seg| !seg.is_empty())
            .map(|seg| seg.to_string())
            .collect()
    }
}
