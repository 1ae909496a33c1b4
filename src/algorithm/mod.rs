// Detección de conflictos de horario y operaciones sobre una selección.
pub mod conflict;
pub mod graph;
pub mod selection;

pub use conflict::{course_clash, courses_conflict, first_clash, meetings_conflict, meetings_share_cell, Clash};
pub use graph::{conflict_graph, conflict_groups, conflicting_pairs, ConflictGraph, ConflictPair};
pub use selection::{OccupiedCell, Selection, SelectionError, CREDIT_EPSILON, DEFAULT_CREDIT_LIMIT, SEMESTER_WEEKS};
