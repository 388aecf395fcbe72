//! Heuristic minimum-cardinality set cover over hypergraph components.
//!
//! [`cover`] runs four greedy variants (two scoring schemes, each with a
//! deterministic and a randomized tie-break) and keeps the smallest
//! result. Vertex and edge labels are used as scratch; callers must not
//! rely on label values across a call.

use rand::Rng;

use crate::compset::CompSet;
use crate::hypergraph::Hypergraph;

/// True iff every vertex in `nodes` occurs in some hyperedge of `hedges`.
pub fn covers(g: &mut Hypergraph, nodes: &CompSet, hedges: &CompSet) -> bool {
    for v in nodes.iter() {
        g.set_vertex_label(v, 0);
    }
    for e in hedges.iter() {
        g.label_edge_vertices(e, 1);
    }
    nodes.iter().all(|v| g.vertex_label(v) != 0)
}

/// Returns a subset of `hedges` covering every vertex in `nodes`, of the
/// smallest cardinality found by the four heuristics.
///
/// # Panics
/// Panics if `nodes` cannot be covered by `hedges` at all; call
/// [`covers`] first when that is not known.
pub fn cover(
    g: &mut Hypergraph,
    nodes: &CompSet,
    hedges: &CompSet,
    rng: &mut impl Rng,
) -> CompSet {
    assert!(covers(g, nodes, hedges), "covering not possible");

    let mut best = node_cover1(g, nodes, hedges, true, rng);
    for alt in [
        node_cover1(g, nodes, hedges, false, rng),
        node_cover2(g, nodes, hedges, true, rng),
        node_cover2(g, nodes, hedges, false, rng),
    ] {
        if alt.len() < best.len() {
            best = alt;
        }
    }
    best
}

/// Seeds the cover with every hyperedge that is the only candidate
/// containing some required vertex, then marks the vertices it covers.
/// Candidate edges are expected to carry label ≥ 0, all others −1.
fn seed_unique_covers(g: &mut Hypergraph, nodes: &CompSet) -> usize {
    let mut seeded = 0;
    for v in nodes.iter() {
        let mut unique: Option<usize> = None;
        let mut multiple = false;
        for &e in g.vertex(v).members() {
            if g.edge_label(e) != -1 {
                if unique.is_some() {
                    multiple = true;
                    break;
                }
                unique = Some(e);
            }
        }
        if multiple || g.vertex_label(v) != 0 {
            continue;
        }
        if let Some(e) = unique {
            seeded += 1;
            g.set_edge_label(e, -1);
            g.label_edge_vertices(e, 1);
        }
    }
    seeded
}

/// Greedy cover picking the edge that covers the most still-uncovered
/// vertices; ties go to the lowest edge id (`determ`) or uniformly at
/// random.
fn node_cover1(
    g: &mut Hypergraph,
    nodes: &CompSet,
    hedges: &CompSet,
    determ: bool,
    rng: &mut impl Rng,
) -> CompSet {
    let mut uncovered = nodes.len();

    for v in nodes.iter() {
        for e in g.vertex(v).members().to_vec() {
            g.set_edge_label(e, -1);
        }
        g.set_vertex_label(v, 0);
    }
    for e in hedges.iter() {
        g.set_edge_label(e, 0);
    }

    let mut nr_cov_edges = seed_unique_covers(g, nodes);
    for v in nodes.iter() {
        if g.vertex_label(v) > 0 {
            g.set_vertex_label(v, -1);
            uncovered -= 1;
        }
    }

    while uncovered > 0 {
        // count, per candidate edge, the uncovered vertices it covers
        for v in nodes.iter() {
            if g.vertex_label(v) == 0 {
                for e in g.vertex(v).members().to_vec() {
                    g.add_edge_label(e, 1);
                }
            }
        }

        let mut max = -1i64;
        let mut candidates: Vec<usize> = Vec::new();
        for pos in 0..hedges.len() {
            let label = g.edge_label(hedges[pos]);
            if label > max {
                max = label;
                candidates.clear();
                candidates.push(pos);
            } else if label == max {
                candidates.push(pos);
            }
            if label > 0 {
                g.set_edge_label(hedges[pos], 0);
            }
        }

        let chosen_pos = if determ {
            let mut best = candidates[0];
            for &c in &candidates[1..] {
                if hedges[c] < hedges[best] {
                    best = c;
                }
            }
            best
        } else {
            candidates[rng.random_range(0..candidates.len())]
        };

        nr_cov_edges += 1;
        let chosen = hedges[chosen_pos];
        g.set_edge_label(chosen, -1);
        for m in g.edge(chosen).members().to_vec() {
            if g.vertex_label(m) == 0 {
                g.set_vertex_label(m, 1);
            }
        }
        for v in nodes.iter() {
            if g.vertex_label(v) > 0 {
                g.set_vertex_label(v, -1);
                uncovered -= 1;
            }
        }
    }

    let mut cov = CompSet::new(nr_cov_edges);
    for e in hedges.iter() {
        if g.edge_label(e) < 0 {
            cov.ins(e);
        }
    }
    cov
}

/// Weighted greedy cover. Each required vertex weighs
/// `1 − (#candidates containing it) / |hedges|`; each candidate edge
/// weighs the sum of its still-uncovered vertices' weights, updated
/// incrementally as vertices become covered.
fn node_cover2(
    g: &mut Hypergraph,
    nodes: &CompSet,
    hedges: &CompSet,
    determ: bool,
    rng: &mut impl Rng,
) -> CompSet {
    let mut uncovered = nodes.len();
    let mut node_weights = vec![0f64; nodes.len()];
    let mut edge_weights = vec![0f64; hedges.len()];

    for (i, v) in nodes.iter().enumerate() {
        let mut contained = 0usize;
        for e in g.vertex(v).members().to_vec() {
            g.set_edge_label(e, -1);
            if hedges.contains(e) {
                contained += 1;
            }
        }
        g.set_vertex_label(v, 0);
        node_weights[i] = 1.0 - contained as f64 / hedges.len() as f64;
    }
    // candidate edges carry their index in edge_weights as label
    for (pos, e) in hedges.iter().enumerate() {
        g.set_edge_label(e, pos as i64);
    }

    let mut nr_cov_edges = seed_unique_covers(g, nodes);
    for (i, v) in nodes.iter().enumerate() {
        if g.vertex_label(v) > 0 {
            node_weights[i] = 0.0;
            g.set_vertex_label(v, -1);
            uncovered -= 1;
        }
    }

    for (i, v) in nodes.iter().enumerate() {
        if node_weights[i] > 0.0 {
            for &e in g.vertex(v).members().to_vec().iter() {
                let label = g.edge_label(e);
                if label >= 0 {
                    edge_weights[label as usize] += node_weights[i];
                }
            }
        }
    }

    while uncovered > 0 {
        let mut start = 0;
        while g.edge_label(hedges[start]) == -1 {
            start += 1;
        }
        let mut max = edge_weights[start];
        let mut candidates: Vec<usize> = vec![start];
        for pos in start + 1..hedges.len() {
            if edge_weights[pos] > max {
                max = edge_weights[pos];
                candidates.clear();
                candidates.push(pos);
            } else if edge_weights[pos] == max {
                candidates.push(pos);
            }
        }

        let chosen_pos = if determ {
            let mut best = candidates[0];
            for &c in &candidates[1..] {
                if hedges[c] < hedges[best] {
                    best = c;
                }
            }
            best
        } else {
            candidates[rng.random_range(0..candidates.len())]
        };

        nr_cov_edges += 1;
        edge_weights[chosen_pos] = 0.0;
        let chosen = hedges[chosen_pos];
        g.set_edge_label(chosen, -1);
        for m in g.edge(chosen).members().to_vec() {
            if g.vertex_label(m) == 0 {
                g.set_vertex_label(m, 1);
            }
        }
        for (i, v) in nodes.iter().enumerate() {
            if g.vertex_label(v) > 0 {
                for e in g.vertex(v).members().to_vec() {
                    let label = g.edge_label(e);
                    if label >= 0 {
                        edge_weights[label as usize] -= node_weights[i];
                    }
                }
                node_weights[i] = 0.0;
                g.set_vertex_label(v, -1);
                uncovered -= 1;
            }
        }
    }

    let mut cov = CompSet::new(nr_cov_edges);
    for e in hedges.iter() {
        if g.edge_label(e) == -1 {
            cov.ins(e);
        }
    }
    cov
}
