//! The det-k-decomp engine: a backtracking, bounded-width separator
//! search producing hypertree decompositions of width at most `k`.

use std::collections::HashMap;

use log::{info, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::hypergraph::Hypergraph;
use crate::hypertree::Hypertree;

mod cover;
mod separate;

use cover::CoverSubsets;
use separate::{divide_comp_edges, separate};

pub use separate::is_split_sep;

/// What is known about a separator that has been tried before:
/// starter edges of components proven decomposable below it, and starter
/// edges of components proven undecomposable.
#[derive(Default)]
struct SepEntry {
    ok_starters: Vec<usize>,
    fail_starters: Vec<usize>,
}

/// Decomposition engine over a borrowed hypergraph.
///
/// The engine treats the graph's labels as its private scratchpad and
/// leaves them in an unspecified state. One engine performs one search:
/// [`DetKDecomp::run`] consumes it, and the separator cache dies with it.
pub struct DetKDecomp<'a> {
    graph: &'a mut Hypergraph,
    k: usize,
    rng: StdRng,
    seps: HashMap<Vec<usize>, SepEntry>,
}

impl<'a> DetKDecomp<'a> {
    /// # Panics
    /// Panics if `k` is zero.
    pub fn new(graph: &'a mut Hypergraph, k: usize, seed: u64) -> Self {
        assert!(k >= 1, "illegal hypertree-width bound k = 0");
        DetKDecomp {
            graph,
            k,
            rng: StdRng::seed_from_u64(seed),
            seps: HashMap::new(),
        }
    }

    /// Searches for a hypertree decomposition of width at most `k`.
    ///
    /// Hyperedges are pre-ordered by maximum cardinality search on the
    /// dual hypergraph, and each edge's position in that order is stored
    /// as its weight. Returns `None` iff no decomposition of width ≤ `k`
    /// exists; the caller is expected to have checked connectedness.
    pub fn run(mut self) -> Option<Hypertree> {
        if self.graph.nr_edges() == 0 {
            return None;
        }

        self.graph.make_dual();
        let order = self.graph.mcs_order(&mut self.rng);
        self.graph.make_dual();
        for (pos, &e) in order.iter().enumerate() {
            self.graph.set_edge_weight(e, pos as i64);
        }

        let mut htree = self.decomp(&order, &[], 0)?;
        if htree.has_cut_node() {
            info!("expanding pruned subtrees");
            self.expand(&mut htree);
        }
        Some(htree)
    }

    /// Decomposes the subgraph spanned by `edges`, guaranteeing that
    /// every vertex of `connector` ends up in the returned root's χ.
    ///
    /// Returns `None` when the subgraph has no decomposition of width
    /// ≤ `k` under that connector obligation.
    ///
    /// Directly recursive; every recursion strictly shrinks the edge
    /// set, so the depth is bounded by the number of hyperedges.
    fn decomp(&mut self, edges: &[usize], connector: &[usize], depth: usize) -> Option<Hypertree> {
        let nr = edges.len();

        // with no connector obligation a small subgraph splits into two
        // nodes of at most k edges each
        if connector.is_empty() && nr > 1 && nr.div_ceil(2) <= self.k {
            let mid = nr / 2;
            let mut root = ht_node(self.graph, &edges[mid..], &edges[mid..], &[], vec![]);
            root.add_child(ht_node(self.graph, &edges[..mid], &edges[..mid], &[], vec![]));
            return Some(root);
        }
        if nr <= self.k {
            return Some(ht_node(self.graph, edges, edges, connector, vec![]));
        }

        let (inner, bound, comp_end) = divide_comp_edges(self.graph, edges, connector);

        let mut cov = CoverSubsets::new(self.graph, connector, &bound, comp_end, self.k);
        let mut nbr_sel = cov.first(self.graph, connector);

        // candidates for the extra separator edge: in-component boundary
        // edges first, then inner edges
        let add_edges: Vec<usize> = cov
            .edges()
            .iter()
            .zip(cov.in_comp_flags())
            .filter_map(|(&e, &in_comp)| in_comp.then_some(e))
            .chain(inner.iter().copied())
            .collect();
        assert!(!add_edges.is_empty(), "component without separator candidates");

        let mut result: Option<Hypertree> = None;
        while nbr_sel >= 0 {
            let has_in_comp = cov.selection().any(|p| cov.in_comp(p));
            let needs_add_edge = !has_in_comp;

            // a full cover with no in-component edge cannot become a
            // separator; otherwise try the cover, extended by one
            // in-component edge when necessary
            if !needs_add_edge || (nbr_sel as usize) < self.k {
                let mut add_idx = 0;
                loop {
                    trace!("trying separator at depth {depth}");

                    self.graph.reset_edge_labels(0);
                    self.graph.reset_vertex_labels(0);
                    let mut separator: Vec<usize> =
                        cov.selection().map(|p| cov.edge_at(p)).collect();
                    if needs_add_edge {
                        separator.push(add_edges[add_idx]);
                    }
                    for &e in &separator {
                        self.graph.set_edge_label(e, -1);
                        self.graph.label_edge_vertices(e, -1);
                    }

                    let mut key = separator.clone();
                    key.sort_unstable();
                    self.seps.entry(key.clone()).or_default();

                    let parts = separate(self.graph, edges);

                    let mut fail_sep = false;
                    let mut cut_parts = vec![false; parts.len()];
                    {
                        let entry = &self.seps[&key];
                        for (i, (part_edges, _)) in parts.iter().enumerate() {
                            assert!(
                                part_edges.len() < nr,
                                "monotonicity violated during decomposition"
                            );
                            let comp_label = (i + 1) as i64;
                            if entry
                                .fail_starters
                                .iter()
                                .any(|&s| self.graph.edge_label(s) == comp_label)
                            {
                                fail_sep = true;
                                break;
                            }
                            if entry
                                .ok_starters
                                .iter()
                                .any(|&s| self.graph.edge_label(s) == comp_label)
                            {
                                cut_parts[i] = true;
                            }
                        }
                    }

                    if !fail_sep {
                        let mut subtrees: Vec<Hypertree> = Vec::new();
                        let mut child_failed = false;
                        for (i, (part_edges, part_conn)) in parts.iter().enumerate() {
                            if cut_parts[i] {
                                // known decomposable: emit a pruned
                                // placeholder and expand it at the end
                                let mut cut =
                                    ht_node(self.graph, part_edges, &[], part_conn, vec![]);
                                cut.set_cut(true);
                                cut.set_label((depth + 1) as i64);
                                subtrees.push(cut);
                            } else {
                                match self.decomp(part_edges, part_conn, depth + 1) {
                                    Some(sub) => {
                                        self.sep_entry(&key).ok_starters.push(part_edges[0]);
                                        subtrees.push(sub);
                                    }
                                    None => {
                                        self.sep_entry(&key).fail_starters.push(part_edges[0]);
                                        child_failed = true;
                                        break;
                                    }
                                }
                            }
                        }
                        if !child_failed {
                            // χ takes the connector plus the vertices of
                            // the separator edges inside the component
                            let chi_edges: Vec<usize> = cov
                                .selection()
                                .filter(|&p| cov.in_comp(p))
                                .map(|p| cov.edge_at(p))
                                .chain(needs_add_edge.then(|| add_edges[add_idx]))
                                .collect();
                            result = Some(ht_node(
                                self.graph,
                                &separator,
                                &chi_edges,
                                connector,
                                subtrees,
                            ));
                        }
                    }

                    if result.is_some() {
                        break;
                    }
                    if needs_add_edge {
                        add_idx += 1;
                        if add_idx < add_edges.len() {
                            continue;
                        }
                    }
                    break;
                }
            }

            if result.is_some() {
                break;
            }
            nbr_sel = cov.next(self.graph, connector);
            if nbr_sel <= 0 {
                break;
            }
        }
        result
    }

    fn sep_entry(&mut self, key: &[usize]) -> &mut SepEntry {
        self.seps
            .get_mut(key)
            .expect("separator entry vanished from the cache")
    }

    /// Replaces every cut node by a freshly decomposed subtree.
    ///
    /// # Panics
    /// Panics if a pruned subtree fails to decompose; the memo cache
    /// certified it, so that would be an engine invariant violation.
    fn expand(&mut self, node: &mut Hypertree) {
        let mut i = 0;
        while i < node.nr_children() {
            if node.child(i).is_cut() {
                let sub_edges: Vec<usize> = node.child(i).lambda().to_vec();
                let sub_conn: Vec<usize> = node.child(i).chi().to_vec();
                let depth = node.child(i).label() as usize;
                let sub = self
                    .decomp(&sub_edges, &sub_conn, depth)
                    .expect("pruned subtree is not decomposable");
                *node.child_mut(i) = sub;
            }
            self.expand(node.child_mut(i));
            i += 1;
        }
    }
}

/// Builds a hypertree node with `λ = lambda`, χ = vertices of
/// `chi_edges` ∪ `connector`, and the given children.
fn ht_node(
    g: &Hypergraph,
    lambda: &[usize],
    chi_edges: &[usize],
    connector: &[usize],
    children: Vec<Hypertree>,
) -> Hypertree {
    let mut node = Hypertree::new();
    for &e in lambda {
        node.ins_lambda(e);
    }
    for &e in chi_edges {
        for &v in g.edge(e).members() {
            node.ins_chi(v);
        }
    }
    for &v in connector {
        node.ins_chi(v);
    }
    for child in children {
        node.add_child(child);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "illegal hypertree-width")]
    fn test_k_zero_panics() {
        let mut g = Hypergraph::from_edge_lists(&[&["a", "b"]]);
        DetKDecomp::new(&mut g, 0, 0);
    }

    #[test]
    fn test_empty_hypergraph_has_no_tree() {
        let mut g = Hypergraph::from_edge_lists(&[]);
        assert!(DetKDecomp::new(&mut g, 1, 0).run().is_none());
    }

    #[test]
    fn test_single_edge_single_node() {
        let mut g = Hypergraph::from_edge_lists(&[&["a", "b", "c"]]);
        let ht = DetKDecomp::new(&mut g, 1, 0).run().unwrap();
        assert_eq!(ht.lambda(), &[0]);
        assert_eq!(ht.chi(), &[0, 1, 2]);
        assert_eq!(ht.nr_children(), 0);
    }

    #[test]
    fn test_small_graph_splits_into_two_nodes() {
        let mut g =
            Hypergraph::from_edge_lists(&[&["a", "b"], &["b", "c"], &["c", "d"], &["d", "e"]]);
        let ht = DetKDecomp::new(&mut g, 4, 0).run().unwrap();
        assert_eq!(ht.nr_children(), 1);
        assert_eq!(ht.lambda().len() + ht.child(0).lambda().len(), 4);
    }

    #[test]
    fn test_triangle_needs_width_two() {
        let mut g = Hypergraph::from_edge_lists(&[&["a", "b"], &["b", "c"], &["a", "c"]]);
        assert!(DetKDecomp::new(&mut g, 1, 0).run().is_none());
        let ht = DetKDecomp::new(&mut g, 2, 0).run().unwrap();
        assert!(ht.ht_width() <= 2);
    }

    #[test]
    fn test_path_decomposes_with_k_one() {
        let mut g = Hypergraph::from_edge_lists(&[
            &["a", "b"],
            &["b", "c"],
            &["c", "d"],
            &["d", "e"],
            &["e", "f"],
        ]);
        let ht = DetKDecomp::new(&mut g, 1, 42).run().unwrap();
        assert_eq!(ht.ht_width(), 1);
        assert!(ht.check_cond1(&mut g).is_none());
        assert!(ht.check_cond2(&mut g).is_none());
    }

    #[test]
    fn test_same_seed_same_tree() {
        let build = || {
            let mut g = Hypergraph::from_edge_lists(&[
                &["a", "b", "c"],
                &["c", "d"],
                &["d", "e", "f"],
                &["f", "a"],
                &["b", "e"],
            ]);
            let mut ht = DetKDecomp::new(&mut g, 2, 7).run().unwrap();
            ht.set_id_labels(1);
            format!("{ht}")
        };
        assert_eq!(build(), build());
    }
}
