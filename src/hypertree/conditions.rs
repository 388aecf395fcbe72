//! The four structural conditions of a hypertree decomposition. Every
//! check returns the first witness of a violation, or `None` when the
//! condition holds.

use super::Hypertree;
use crate::hypergraph::Hypergraph;

impl Hypertree {
    /// Condition 1: every hyperedge is covered by some node's χ.
    /// Returns a violating hyperedge id.
    pub fn check_cond1(&self, g: &mut Hypergraph) -> Option<usize> {
        g.reset_edge_labels(0);
        g.reset_vertex_labels(0);
        self.label_covered_edges(g);
        g.edge_ids().into_iter().find(|&e| g.edge_label(e) == 0)
    }

    fn label_covered_edges(&self, g: &mut Hypergraph) {
        for &v in self.chi() {
            g.set_vertex_label(v, 1);
        }
        for e in g.edge_ids() {
            if g.edge(e).members().iter().all(|&v| g.vertex_label(v) == 1) {
                g.set_edge_label(e, 1);
            }
        }
        for &v in self.chi() {
            g.set_vertex_label(v, 0);
        }
        for c in self.children() {
            c.label_covered_edges(g);
        }
    }

    /// Condition 2: for every vertex the nodes whose χ contains it form
    /// a connected subtree. Returns a violating vertex id.
    ///
    /// A vertex present in a child's χ but missing from its parent's is
    /// closed; reappearing above the gap is the violation.
    pub fn check_cond2(&self, g: &mut Hypergraph) -> Option<usize> {
        g.reset_vertex_labels(0);
        self.check_cond2_inner(g)
    }

    fn check_cond2_inner(&self, g: &mut Hypergraph) -> Option<usize> {
        for c in self.children() {
            if let Some(witness) = c.check_cond2_inner(g) {
                return Some(witness);
            }
            for &v in c.chi() {
                if !self.chi_contains(v) {
                    g.set_vertex_label(v, 1);
                }
            }
        }
        self.chi()
            .iter()
            .copied()
            .find(|&v| g.vertex_label(v) != 0)
    }

    /// Condition 3: χ of every node lies inside the vertices of its λ
    /// edges. Returns the violating node.
    pub fn check_cond3(&self, g: &mut Hypergraph) -> Option<&Hypertree> {
        g.reset_vertex_labels(0);
        self.check_cond3_inner(g)
    }

    fn check_cond3_inner(&self, g: &mut Hypergraph) -> Option<&Hypertree> {
        for &e in self.lambda() {
            g.label_edge_vertices(e, 1);
        }
        if self.chi().iter().any(|&v| g.vertex_label(v) == 0) {
            return Some(self);
        }
        for &e in self.lambda() {
            g.label_edge_vertices(e, 0);
        }
        self.children()
            .find_map(|c| c.check_cond3_inner(g))
    }

    /// Condition 4: the vertices of a node's λ edges that occur anywhere
    /// in the subtree's χ sets must already be in the node's χ. Returns
    /// the violating node.
    pub fn check_cond4(&self, g: &mut Hypergraph) -> Option<&Hypertree> {
        g.reset_vertex_labels(0);
        self.label_chi_sets(g, 1);

        // intersect the lambda vertices with the subtree chi vertices
        for &e in self.lambda() {
            for v in g.edge(e).members().to_vec() {
                if g.vertex_label(v) != 0 {
                    g.set_vertex_label(v, 2);
                }
            }
        }
        // subtract the node's own chi
        for &v in self.chi() {
            g.add_vertex_label(v, -1);
        }
        if g.vertex_ids().into_iter().any(|v| g.vertex_label(v) > 1) {
            return Some(self);
        }

        self.children().find_map(|c| c.check_cond4(g))
    }

    /// Labels every χ vertex of the subtree with `label`; a vertex seen
    /// under an earlier positive label is demoted to −1. With distinct
    /// labels per subtree this flags vertices shared between subtrees.
    pub(crate) fn label_chi_sets(&self, g: &mut Hypergraph, label: i64) {
        for &v in self.chi() {
            let current = g.vertex_label(v);
            if current >= 0 {
                if current > 0 && current < label {
                    g.set_vertex_label(v, -1);
                } else {
                    g.set_vertex_label(v, label);
                }
            }
        }
        for c in self.children() {
            c.label_chi_sets(g, label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomp::DetKDecomp;

    fn node(chi: &[usize], lambda: &[usize]) -> Hypertree {
        let mut n = Hypertree::new();
        for &v in chi {
            n.ins_chi(v);
        }
        for &e in lambda {
            n.ins_lambda(e);
        }
        n
    }

    fn triangle() -> Hypergraph {
        Hypergraph::from_edge_lists(&[&["a", "b"], &["b", "c"], &["a", "c"]])
    }

    #[test]
    fn test_conditions_hold_on_engine_output() {
        let mut g = triangle();
        let ht = DetKDecomp::new(&mut g, 2, 5).run().unwrap();
        assert_eq!(ht.check_cond1(&mut g), None);
        assert_eq!(ht.check_cond2(&mut g), None);
        assert!(ht.check_cond3(&mut g).is_none());
        assert!(ht.check_cond4(&mut g).is_none());
    }

    #[test]
    fn test_cond1_detects_uncovered_edge() {
        let mut g = triangle();
        // only the edge {a, b} is covered
        let ht = node(&[0, 1], &[0]);
        assert_eq!(ht.check_cond1(&mut g), Some(1));
    }

    #[test]
    fn test_cond2_detects_disconnected_chi() {
        let mut g = triangle();
        // vertex a appears at the root and in a grandchild, but not in
        // the middle node
        let mut root = node(&[0, 1], &[0]);
        let mut mid = node(&[1, 2], &[1]);
        mid.add_child(node(&[0, 2], &[2]));
        root.add_child(mid);
        assert_eq!(root.check_cond2(&mut g), Some(0));
    }

    #[test]
    fn test_cond3_detects_chi_outside_lambda() {
        let mut g = triangle();
        // chi contains c (id 2) but lambda is only {a, b}
        let ht = node(&[0, 1, 2], &[0]);
        assert!(ht.check_cond3(&mut g).is_some());
    }

    #[test]
    fn test_cond4_detects_leaked_lambda_vertex() {
        let mut g = triangle();
        // root lambda edge {b, c} has vertex c in the subtree's chi but
        // not in the root's chi
        let mut root = node(&[0, 1], &[0, 1]);
        root.add_child(node(&[0, 2], &[2]));
        assert!(root.check_cond4(&mut g).is_some());
    }
}
