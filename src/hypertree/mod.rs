use std::fmt;

use sorted_vec::SortedSet;

use crate::util;

mod conditions;
mod gml;
mod transform;

/// A node of a hypertree decomposition, owning its subtree.
///
/// Carries the vertex set `χ`, the hyperedge set `λ` (both as sorted id
/// sets), an integer label for traversal bookkeeping, the cut flag
/// marking subtrees whose decomposition was proven but not materialized,
/// and an auxiliary id set usable to locate nodes after construction.
#[derive(Clone, Debug)]
pub struct Hypertree {
    chi: SortedSet<usize>,
    lambda: SortedSet<usize>,
    children: Vec<Hypertree>,
    label: i64,
    cut: bool,
    aux_ids: SortedSet<usize>,
}

impl Default for Hypertree {
    fn default() -> Self {
        Self::new()
    }
}

impl Hypertree {
    pub fn new() -> Self {
        Hypertree {
            chi: SortedSet::new(),
            lambda: SortedSet::new(),
            children: Vec::new(),
            label: 0,
            cut: false,
            aux_ids: SortedSet::new(),
        }
    }

    pub fn ins_chi(&mut self, vertex: usize) {
        self.chi.push(vertex);
    }

    pub fn ins_lambda(&mut self, edge: usize) {
        self.lambda.push(edge);
    }

    /// Vertex ids of χ, ascending.
    pub fn chi(&self) -> &[usize] {
        &self.chi
    }

    /// Hyperedge ids of λ, ascending.
    pub fn lambda(&self) -> &[usize] {
        &self.lambda
    }

    pub fn chi_contains(&self, vertex: usize) -> bool {
        self.chi.binary_search(&vertex).is_ok()
    }

    pub fn lambda_contains(&self, edge: usize) -> bool {
        self.lambda.binary_search(&edge).is_ok()
    }

    pub fn add_child(&mut self, child: Hypertree) {
        self.children.push(child);
    }

    pub fn rem_child(&mut self, idx: usize) -> Hypertree {
        self.children.remove(idx)
    }

    pub fn nr_children(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, idx: usize) -> &Hypertree {
        &self.children[idx]
    }

    pub(crate) fn child_mut(&mut self, idx: usize) -> &mut Hypertree {
        &mut self.children[idx]
    }

    pub fn children(&self) -> impl Iterator<Item = &Hypertree> {
        self.children.iter()
    }

    pub fn label(&self) -> i64 {
        self.label
    }

    pub fn set_label(&mut self, label: i64) {
        self.label = label;
    }

    pub fn is_cut(&self) -> bool {
        self.cut
    }

    pub fn set_cut(&mut self, cut: bool) {
        self.cut = cut;
    }

    /// True iff some node in the subtree carries the cut flag.
    pub fn has_cut_node(&self) -> bool {
        self.cut || self.children.iter().any(Hypertree::has_cut_node)
    }

    pub fn ins_aux_id(&mut self, id: usize) {
        self.aux_ids.push(id);
    }

    /// First node in preorder whose auxiliary id set contains `id`.
    pub fn node_by_aux_id(&self, id: usize) -> Option<&Hypertree> {
        if self.aux_ids.binary_search(&id).is_ok() {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.node_by_aux_id(id))
    }

    pub fn reset_labels(&mut self) {
        self.label = 0;
        for c in &mut self.children {
            c.reset_labels();
        }
    }

    /// Assigns strictly increasing preorder labels starting at `start`;
    /// returns the last label used.
    pub fn set_id_labels(&mut self, start: i64) -> i64 {
        self.label = start;
        let mut last = start;
        for c in &mut self.children {
            last = c.set_id_labels(last + 1);
        }
        last
    }

    /// Maximum `|λ|` over the subtree.
    pub fn ht_width(&self) -> usize {
        self.children
            .iter()
            .map(Hypertree::ht_width)
            .fold(self.lambda.len(), usize::max)
    }

    /// Maximum `|χ| − 1` over the subtree.
    pub fn tree_width(&self) -> isize {
        self.children
            .iter()
            .map(Hypertree::tree_width)
            .fold(self.chi.len() as isize - 1, isize::max)
    }

    pub fn contains_label(&self, label: i64) -> bool {
        self.label == label || self.children.iter().any(|c| c.contains_label(label))
    }

    /// Re-roots the tree at the node labelled `target` by inverting the
    /// parent relation along the path to it.
    ///
    /// # Panics
    /// Panics if no node carries `target`.
    pub fn set_root(mut self, target: i64) -> Hypertree {
        if self.label == target {
            return self;
        }
        let idx = self
            .children
            .iter()
            .position(|c| c.contains_label(target))
            .unwrap_or_else(|| panic!("re-root target label {target} not in tree"));
        let child = self.children.remove(idx);
        child.reroot_onto(target, self)
    }

    fn reroot_onto(mut self, target: i64, parent: Hypertree) -> Hypertree {
        if self.label == target {
            self.children.push(parent);
            return self;
        }
        let idx = self
            .children
            .iter()
            .position(|c| c.contains_label(target))
            .expect("re-root path lost its target");
        let child = self.children.remove(idx);
        self.children.push(parent);
        child.reroot_onto(target, self)
    }

    /// Exchanges χ and λ in every node. Meaningful together with
    /// [`crate::hypergraph::Hypergraph::make_dual`]; applying it twice is
    /// the identity.
    pub fn swap_chi_lambda(&mut self) {
        std::mem::swap(&mut self.chi, &mut self.lambda);
        for c in &mut self.children {
            c.swap_chi_lambda();
        }
    }

    /// Merges redundant nodes: a child whose χ contains this node's χ is
    /// absorbed upward, and a child whose χ this node's χ contains is
    /// dissolved into it. With `lambda_union` the absorbed λ is unioned
    /// into the survivor, otherwise the surviving χ's owner keeps the
    /// larger node's λ alone.
    ///
    /// Children promoted from a merged child join the end of the scan
    /// and are examined in the same pass.
    pub fn shrink(&mut self, lambda_union: bool) {
        for c in &mut self.children {
            c.shrink(lambda_union);
        }

        // absorb children with a larger chi
        let mut i = 0;
        while i < self.children.len() {
            if util::is_subset(&self.chi, &self.children[i].chi) {
                let child = self.children.remove(i);
                for &v in child.chi() {
                    self.chi.push(v);
                }
                if lambda_union {
                    for &e in child.lambda() {
                        self.lambda.push(e);
                    }
                } else {
                    self.lambda = child.lambda;
                }
                for &a in &*child.aux_ids {
                    self.aux_ids.push(a);
                }
                self.children.extend(child.children);
            } else {
                i += 1;
            }
        }

        // dissolve children with a smaller chi
        let mut i = 0;
        while i < self.children.len() {
            if util::is_subset(&self.children[i].chi, &self.chi) {
                let child = self.children.remove(i);
                if lambda_union {
                    for &e in child.lambda() {
                        self.lambda.push(e);
                    }
                }
                for &a in &*child.aux_ids {
                    self.aux_ids.push(a);
                }
                self.children.extend(child.children);
            } else {
                i += 1;
            }
        }
    }
}

impl fmt::Display for Hypertree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(
            node: &Hypertree,
            f: &mut fmt::Formatter<'_>,
            depth: usize,
        ) -> fmt::Result {
            writeln!(
                f,
                "{:indent$}{:?}  {:?}",
                "",
                node.lambda(),
                node.chi(),
                indent = 2 * depth
            )?;
            for c in node.children() {
                write_node(c, f, depth + 1)?;
            }
            Ok(())
        }
        write_node(self, f, 0)
    }
}
