//! Grafo de conflictos: un nodo por curso, una arista por par que choca.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use serde::Serialize;
use std::collections::HashMap;

use super::conflict::{course_clash, Clash};
use crate::models::{Course, CourseUid};

pub type ConflictGraph<'a> = UnGraph<&'a Course, Clash>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictPair {
    pub a: CourseUid,
    pub b: CourseUid,
    pub clash: Clash,
}

pub fn conflict_graph<'a>(courses: &[&'a Course]) -> ConflictGraph<'a> {
    let mut graph = UnGraph::<&Course, Clash>::new_undirected();
    let nodes: Vec<NodeIndex> = courses.iter().map(|&c| graph.add_node(c)).collect();
    for i in 0..courses.len() {
        for j in (i + 1)..courses.len() {
            if let Some(clash) = course_clash(courses[i], courses[j]) {
                graph.add_edge(nodes[i], nodes[j], clash);
            }
        }
    }
    log::debug!("grafo de conflictos: {} nodos, {} aristas", graph.node_count(), graph.edge_count());
    graph
}

/// Pares en conflicto, en orden de inserción de las aristas.
pub fn conflicting_pairs(graph: &ConflictGraph<'_>) -> Vec<ConflictPair> {
    graph
        .edge_indices()
        .filter_map(|e| {
            let (x, y) = graph.edge_endpoints(e)?;
            Some(ConflictPair { a: graph[x].uid(), b: graph[y].uid(), clash: graph[e] })
        })
        .collect()
}

/// Componentes conexas con más de un curso. Cada grupo va ordenado y los
/// grupos se ordenan por su primer elemento.
pub fn conflict_groups(graph: &ConflictGraph<'_>) -> Vec<Vec<CourseUid>> {
    let mut uf = UnionFind::<usize>::new(graph.node_count());
    for e in graph.edge_indices() {
        if let Some((x, y)) = graph.edge_endpoints(e) {
            uf.union(x.index(), y.index());
        }
    }

    let mut groups: Vec<Vec<CourseUid>> = Vec::new();
    let mut root_slot: HashMap<usize, usize> = HashMap::new();
    for n in graph.node_indices() {
        let root = uf.find(n.index());
        let slot = *root_slot.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(graph[n].uid());
    }

    for g in groups.iter_mut() {
        g.sort();
        g.dedup();
    }
    groups.retain(|g| g.len() > 1);
    groups.sort();
    groups
}
