use std::collections::HashSet;

use crate::hypergraph::Hypergraph;

/// Collects the component of `start` in the subgraph left by the current
/// separator, labelling its edges and interior vertices with `label`.
///
/// Separator edges and vertices must carry label −1, everything else in
/// the subgraph 0. Vertices of the separator encountered at the frontier
/// are reported as the component's connector (and relabelled −2 so each
/// is reported once). The first entry of the returned edge list is
/// always `start`, the component's starter edge.
pub(crate) fn collect_reach_edges(
    g: &mut Hypergraph,
    start: usize,
    label: i64,
) -> (Vec<usize>, Vec<usize>) {
    let mut comp_edges = vec![start];
    let mut connector = Vec::new();
    g.set_edge_label(start, label);

    let mut idx = 0;
    while idx < comp_edges.len() {
        let members = g.edge(comp_edges[idx]).members().to_vec();
        for v in members {
            match g.vertex_label(v) {
                0 => {
                    g.set_vertex_label(v, label);
                    for e in g.vertex(v).members().to_vec() {
                        if g.edge_label(e) == 0 {
                            g.set_edge_label(e, label);
                            comp_edges.push(e);
                        }
                    }
                }
                -1 => {
                    connector.push(v);
                    g.set_vertex_label(v, -2);
                }
                _ => {}
            }
        }
        idx += 1;
    }
    (comp_edges, connector)
}

/// Splits the unlabelled part of `edges` into connected components.
///
/// Separator edges and vertices must carry label −1, everything else 0.
/// Returns `(component edges, connector vertices)` pairs; component `i`
/// is labelled `i + 1`. Connector vertices are put back to −1 so the
/// next seed sees the separator intact.
pub(crate) fn separate(g: &mut Hypergraph, edges: &[usize]) -> Vec<(Vec<usize>, Vec<usize>)> {
    let mut parts = Vec::new();
    for &e in edges {
        if g.edge_label(e) == 0 {
            let label = parts.len() as i64 + 1;
            let (comp_edges, connector) = collect_reach_edges(g, e, label);
            for &v in &connector {
                g.set_vertex_label(v, -1);
            }
            parts.push((comp_edges, connector));
        }
    }
    parts
}

/// Partitions `edges` into inner hyperedges (no boundary vertex) and
/// boundary hyperedges, the latter ordered so that boundary edges inside
/// `edges` come before boundary edges outside.
///
/// An outside boundary edge whose boundary-vertex footprint is covered
/// by another outside boundary edge is dropped, since both would act
/// identically as separator candidates. Returns
/// `(inner, bound, comp_end)` with `bound[..comp_end]` inside `edges`.
pub(crate) fn divide_comp_edges(
    g: &mut Hypergraph,
    edges: &[usize],
    boundary: &[usize],
) -> (Vec<usize>, Vec<usize>, usize) {
    g.reset_edge_labels(0);
    for &e in edges {
        g.set_edge_label(e, 1);
    }

    let mut inner_bound: Vec<usize> = Vec::new();
    let mut outer_bound: Vec<usize> = Vec::new();
    for &v in boundary {
        for e in g.vertex(v).members().to_vec() {
            match g.edge_label(e) {
                0 => {
                    g.set_edge_label(e, -1);
                    outer_bound.push(e);
                }
                1 => {
                    g.set_edge_label(e, -1);
                    inner_bound.push(e);
                }
                _ => {}
            }
        }
    }

    let inner: Vec<usize> = edges
        .iter()
        .copied()
        .filter(|&e| g.edge_label(e) > 0)
        .collect();

    g.reset_vertex_labels(0);
    g.reset_edge_labels(0);
    for &e in &outer_bound {
        g.set_edge_label(e, 1);
    }

    // drop outside boundary edges whose boundary footprint another
    // outside boundary edge subsumes
    let mut removed: HashSet<usize> = HashSet::new();
    for &o in &outer_bound {
        if removed.contains(&o) {
            continue;
        }
        for &v in boundary {
            g.set_vertex_label(v, 1);
        }
        g.label_edge_vertices(o, 0);

        for nb in g.edge(o).neighbours().to_vec() {
            if g.edge_label(nb) == 0 || nb == o || removed.contains(&nb) {
                continue;
            }
            let covered = g.edge(nb).members().iter().all(|&v| g.vertex_label(v) == 0);
            if covered {
                removed.insert(nb);
            }
        }
    }

    let comp_end = inner_bound.len();
    let mut bound = inner_bound;
    bound.extend(outer_bound.iter().copied().filter(|e| !removed.contains(e)));
    (inner, bound, comp_end)
}

/// True iff the separator split the parent connector across several
/// components, i.e. no single child connector contains it entirely.
///
/// An empty parent connector always counts as split.
pub fn is_split_sep(
    g: &mut Hypergraph,
    connector: &[usize],
    child_connectors: &[Vec<usize>],
) -> bool {
    if connector.is_empty() {
        return true;
    }
    g.reset_vertex_labels(-1);
    for &v in connector {
        g.set_vertex_label(v, 0);
    }
    for child in child_connectors {
        let shared = child.iter().filter(|&&v| g.vertex_label(v) == 0).count();
        if shared >= connector.len() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> Hypergraph {
        // a-b, b-c, c-d, d-e
        Hypergraph::from_edge_lists(&[&["a", "b"], &["b", "c"], &["c", "d"], &["d", "e"]])
    }

    fn mark_separator(g: &mut Hypergraph, sep: &[usize]) {
        g.reset_edge_labels(0);
        g.reset_vertex_labels(0);
        for &e in sep {
            g.set_edge_label(e, -1);
            g.label_edge_vertices(e, -1);
        }
    }

    #[test]
    fn test_separate_splits_path_at_middle_edge() {
        let mut g = path_graph();
        let edges = g.edge_ids();
        mark_separator(&mut g, &[1]); // remove b-c
        let parts = separate(&mut g, &edges);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].0, vec![0]); // starter is the seed edge
        assert_eq!(parts[0].1, vec![1]); // connector {b}
        assert_eq!(parts[1].0, vec![2, 3]);
        assert_eq!(parts[1].1, vec![2]); // connector {c}
    }

    #[test]
    fn test_separate_reports_connector_once() {
        let mut g = Hypergraph::from_edge_lists(&[&["s", "a"], &["s", "b"], &["a", "b"]]);
        let edges = g.edge_ids();
        mark_separator(&mut g, &[2]); // separator {a, b}
        let parts = separate(&mut g, &edges);
        assert_eq!(parts.len(), 1);
        let (comp, conn) = &parts[0];
        assert_eq!(comp, &vec![0, 1]);
        let mut conn = conn.clone();
        conn.sort_unstable();
        assert_eq!(conn, vec![1, 2]); // a and b, each once
    }

    #[test]
    fn test_divide_comp_edges() {
        let mut g = path_graph();
        let g_edges = g.edge_ids();
        // component = {b-c, c-d, d-e}, boundary vertex b
        let comp = &g_edges[1..];
        let (inner, bound, comp_end) = divide_comp_edges(&mut g, comp, &[1]);
        assert_eq!(inner, vec![2, 3]);
        assert_eq!(comp_end, 1);
        assert_eq!(&bound[..comp_end], &[1]); // b-c is the in-component boundary
        assert_eq!(&bound[comp_end..], &[0]); // a-b lies outside
    }

    #[test]
    fn test_divide_reduces_subsumed_outer_edges() {
        // boundary {b, c}; outside edges E3 = {a, b} and E4 = {a, b, c}:
        // E3's boundary footprint {b} is inside E4's {b, c}
        let mut g = Hypergraph::from_edge_lists(&[
            &["b", "x"],
            &["c", "y"],
            &["x", "y"],
            &["a", "b"],
            &["a", "b", "c"],
        ]);
        let comp = [0, 1, 2];
        let boundary = [g.vertex_id_by_name("b"), g.vertex_id_by_name("c")];
        let (inner, bound, comp_end) = divide_comp_edges(&mut g, &comp, &boundary);
        assert_eq!(inner, vec![2]);
        assert_eq!(comp_end, 2);
        assert!(bound.contains(&4));
        assert!(!bound.contains(&3));
    }

    #[test]
    fn test_is_split_sep() {
        let mut g = path_graph();
        // parent connector {b, c} split across two child connectors
        assert!(is_split_sep(&mut g, &[1, 2], &[vec![1], vec![2]]));
        // one child swallows the whole parent connector
        assert!(!is_split_sep(&mut g, &[1, 2], &[vec![1, 2], vec![2]]));
        assert!(is_split_sep(&mut g, &[], &[vec![1]]));
    }
}
