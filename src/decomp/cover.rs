use std::cmp::Reverse;

use crate::hypergraph::Hypergraph;

/// Resumable enumeration of connector covers.
///
/// Holds the boundary-edge candidates sorted by how many connector
/// vertices each covers (inside-the-component edges first among equals),
/// the suffix-sum pruning weights, and the current selection of at most
/// `k` candidate indices terminated by `-1`.
///
/// Labels do not survive the recursion that happens between two yields,
/// so [`CoverSubsets::next`] relabels the connector and replays the
/// recorded selection to rebuild its depth-first position before
/// searching on.
pub(crate) struct CoverSubsets {
    edges: Vec<usize>,
    in_comp: Vec<bool>,
    cov_weights: Vec<i64>,
    sel: Vec<isize>,
    k: usize,
}

impl CoverSubsets {
    /// Ranks the boundary edges; `bound[..comp_end]` are the ones inside
    /// the current component.
    pub fn new(
        g: &mut Hypergraph,
        connector: &[usize],
        bound: &[usize],
        comp_end: usize,
        k: usize,
    ) -> Self {
        g.reset_vertex_labels(-1);
        for &v in connector {
            g.set_vertex_label(v, 0);
        }

        let mut items: Vec<(i64, bool, usize)> = bound
            .iter()
            .enumerate()
            .map(|(pos, &e)| {
                let coverage = g
                    .edge(e)
                    .members()
                    .iter()
                    .filter(|&&v| g.vertex_label(v) == 0)
                    .count() as i64;
                (coverage, pos < comp_end, e)
            })
            .collect();
        items.sort_by_key(|&(coverage, in_comp, _)| (Reverse(coverage), !in_comp));

        let mut cov_weights: Vec<i64> = items.iter().map(|&(coverage, ..)| coverage).collect();
        let mut acc = 0;
        for w in cov_weights.iter_mut().rev() {
            acc += *w;
            *w = acc;
        }

        CoverSubsets {
            edges: items.iter().map(|&(.., e)| e).collect(),
            in_comp: items.iter().map(|&(_, ic, _)| ic).collect(),
            cov_weights,
            sel: vec![-1; k + 1],
            k,
        }
    }

    /// Candidate edges, most-covering first.
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    pub fn in_comp_flags(&self) -> &[bool] {
        &self.in_comp
    }

    pub fn edge_at(&self, idx: usize) -> usize {
        self.edges[idx]
    }

    pub fn in_comp(&self, idx: usize) -> bool {
        self.in_comp[idx]
    }

    /// Candidate indices of the current selection.
    pub fn selection(&self) -> impl Iterator<Item = usize> + '_ {
        self.sel
            .iter()
            .take_while(|&&s| s != -1)
            .map(|&s| s as usize)
    }

    /// Finds the first selection of at most `k` candidates covering the
    /// connector; returns the selection size, or −1 if none exists.
    pub fn first(&mut self, g: &mut Hypergraph, connector: &[usize]) -> isize {
        let uncovered = Self::relabel(g, connector);
        self.cover_nodes(g, uncovered, false)
    }

    /// Yields the next selection in depth-first order, or −1 when
    /// exhausted.
    pub fn next(&mut self, g: &mut Hypergraph, connector: &[usize]) -> isize {
        let uncovered = Self::relabel(g, connector);
        self.cover_nodes(g, uncovered, true)
    }

    fn relabel(g: &mut Hypergraph, connector: &[usize]) -> i64 {
        g.reset_vertex_labels(-1);
        for &v in connector {
            g.set_vertex_label(v, 0);
        }
        connector.len() as i64
    }

    /// Depth-first subset search over the ranked candidates.
    ///
    /// Vertices to cover must carry label 0, all others −1. Selecting a
    /// candidate saves the labels of its vertices and overwrites them
    /// with 1; backtracking restores them. At position `pos` with `s`
    /// selections the best still achievable coverage is
    /// `cov_weights[pos] − cov_weights[pos + (k − s)]`, which prunes the
    /// branch when it cannot reach the uncovered count. A selection with
    /// no in-component edge yet must leave room for one.
    fn cover_nodes(&mut self, g: &mut Hypergraph, mut uncovered: i64, reconstruct: bool) -> isize {
        let size = self.edges.len();
        let mut pos: usize = 0;
        let mut nbr_sel: usize = 0;
        let mut in_comp_sel: usize = 0;
        let mut covered = uncovered == 0;
        let mut label_stack: Vec<Vec<i64>> = Vec::new();

        if reconstruct {
            if self.sel[0] == -1 {
                return -1;
            }
            // replay all but the last pick, then drop the last pick and
            // resume scanning right after it
            while self.sel[nbr_sel + 1] != -1 {
                pos = self.sel[nbr_sel] as usize;
                if self.in_comp[pos] {
                    in_comp_sel += 1;
                }
                let members = g.edge(self.edges[pos]).members().to_vec();
                let saved: Vec<i64> = members.iter().map(|&v| g.vertex_label(v)).collect();
                for &v in &members {
                    g.set_vertex_label(v, 1);
                }
                label_stack.push(saved);
                nbr_sel += 1;
            }
            pos = self.sel[nbr_sel] as usize;
            uncovered = g
                .edge(self.edges[pos])
                .members()
                .iter()
                .filter(|&&v| g.vertex_label(v) == 0)
                .count() as i64;
            pos += 1;
        }

        let mut exhausted = false;
        while !covered {
            let mut back = false;
            while !covered {
                let window = pos + (self.k - nbr_sel);
                let weight = if window < size {
                    self.cov_weights[pos] - self.cov_weights[window]
                } else if pos < size {
                    self.cov_weights[pos]
                } else {
                    0
                };
                if weight < uncovered || weight == 0 {
                    back = true;
                    break;
                }

                let mut select = false;
                if self.in_comp[pos] || in_comp_sel > 0 || nbr_sel < self.k - 1 {
                    select = g
                        .edge(self.edges[pos])
                        .members()
                        .iter()
                        .any(|&v| g.vertex_label(v) == 0);
                }
                if select {
                    self.sel[nbr_sel] = pos as isize;
                    nbr_sel += 1;
                    if self.in_comp[pos] {
                        in_comp_sel += 1;
                    }
                    let members = g.edge(self.edges[pos]).members().to_vec();
                    let saved: Vec<i64> = members.iter().map(|&v| g.vertex_label(v)).collect();
                    for (i, &v) in members.iter().enumerate() {
                        g.set_vertex_label(v, 1);
                        if saved[i] == 0 {
                            uncovered -= 1;
                        }
                    }
                    label_stack.push(saved);
                    if uncovered == 0 {
                        covered = true;
                    }
                }
                pos += 1;
            }

            if back {
                if nbr_sel == 0 {
                    exhausted = true;
                    break;
                }
                nbr_sel -= 1;
                pos = self.sel[nbr_sel] as usize;
                if self.in_comp[pos] {
                    in_comp_sel -= 1;
                }
                let saved = label_stack.pop().expect("selection stack unbalanced");
                let members = g.edge(self.edges[pos]).members().to_vec();
                for (i, &v) in members.iter().enumerate() {
                    g.set_vertex_label(v, saved[i]);
                    if saved[i] == 0 {
                        uncovered += 1;
                    }
                }
                pos += 1;
            }
        }

        if exhausted {
            return -1;
        }
        self.sel[nbr_sel] = -1;
        nbr_sel as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> Hypergraph {
        // a - b - c - d as binary edges
        Hypergraph::from_edge_lists(&[&["a", "b"], &["b", "c"], &["c", "d"]])
    }

    fn collect_selections(
        g: &mut Hypergraph,
        connector: &[usize],
        bound: &[usize],
        comp_end: usize,
        k: usize,
    ) -> Vec<Vec<usize>> {
        let mut cov = CoverSubsets::new(g, connector, bound, comp_end, k);
        let mut all = Vec::new();
        let mut n = cov.first(g, connector);
        while n >= 0 {
            all.push(cov.selection().map(|p| cov.edge_at(p)).collect());
            n = cov.next(g, connector);
        }
        all
    }

    #[test]
    fn test_empty_connector_yields_one_empty_cover() {
        let mut g = path_graph();
        let bound = g.edge_ids();
        let covers = collect_selections(&mut g, &[], &bound, bound.len(), 2);
        assert_eq!(covers, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_enumerates_covers_of_vertex_b() {
        let mut g = path_graph();
        let bound = g.edge_ids();
        // vertex b (id 1) is covered by edges 0 and 1
        let covers = collect_selections(&mut g, &[1], &bound, bound.len(), 1);
        assert_eq!(covers.len(), 2);
        for c in &covers {
            assert_eq!(c.len(), 1);
            assert!(g.edge(c[0]).members().contains(&1));
        }
    }

    #[test]
    fn test_uncoverable_connector() {
        let mut g = path_graph();
        // restrict candidates to the far edge, which misses vertex a
        let covers = collect_selections(&mut g, &[0], &[2], 1, 2);
        assert!(covers.is_empty());
    }

    #[test]
    fn test_every_yield_covers_the_connector() {
        let mut g = Hypergraph::from_edge_lists(&[
            &["a", "b", "c"],
            &["b", "d"],
            &["c", "e"],
            &["d", "e"],
        ]);
        let bound = g.edge_ids();
        // cover {b, c}
        let covers = collect_selections(&mut g, &[1, 2], &bound, bound.len(), 2);
        assert!(!covers.is_empty());
        for c in &covers {
            for &v in &[1usize, 2] {
                assert!(
                    c.iter().any(|&e| g.edge(e).members().contains(&v)),
                    "cover {c:?} misses vertex {v}"
                );
            }
        }
        // the single big edge shows up as a size-1 cover
        assert!(covers.iter().any(|c| c == &vec![0]));
    }
}
