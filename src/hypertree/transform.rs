//! Post-processing passes rewriting the χ and λ labellings of a
//! decomposition with the help of the set-cover solver.

use rand::Rng;
use sorted_vec::SortedSet;

use super::Hypertree;
use crate::compset::CompSet;
use crate::hypergraph::Hypergraph;
use crate::setcover;

impl Hypertree {
    /// Replaces every node's λ by a set cover of its χ drawn from the
    /// node's own λ, dropping redundant edges.
    pub fn elim_cov_edges(&mut self, g: &mut Hypergraph, rng: &mut impl Rng) {
        let nodes: CompSet = self.chi().iter().copied().collect();
        let hedges: CompSet = self.lambda().iter().copied().collect();
        let cov = setcover::cover(g, &nodes, &hedges, rng);
        self.lambda = SortedSet::from_unsorted(cov.iter().collect());
        for c in &mut self.children {
            c.elim_cov_edges(g, rng);
        }
    }

    /// Two-pass λ reduction: top-down against the parent, then bottom-up
    /// against the children. Each node keeps its result only when the
    /// cover came out strictly smaller.
    pub fn reduce_lambda(&mut self, g: &mut Hypergraph, rng: &mut impl Rng) {
        self.reduce_lambda_top_down(None, g, rng);
        self.reduce_lambda_bottom_up(None, g, rng);
    }

    fn reduce_lambda_top_down(
        &mut self,
        parent_lambda: Option<&[usize]>,
        g: &mut Hypergraph,
        rng: &mut impl Rng,
    ) {
        let lambda_list: Vec<usize> = self.lambda().to_vec();
        let mut hedges = CompSet::new(lambda_list.len() + parent_lambda.map_or(0, <[usize]>::len));
        for &e in &lambda_list {
            hedges.ins(e);
            g.label_edge_vertices(e, 0);
        }

        // vertices shared by the lambda sets of two or more children are
        // the ones whose cover must survive here
        for (i, c) in self.children.iter().enumerate() {
            let tag = (i + 1) as i64;
            for &e in c.lambda() {
                for v in g.edge(e).members().to_vec() {
                    let current = g.vertex_label(v);
                    if current >= 0 {
                        if current > 0 && current < tag {
                            g.set_vertex_label(v, -1);
                        } else {
                            g.set_vertex_label(v, tag);
                        }
                    }
                }
            }
        }
        if let Some(parent) = parent_lambda {
            for &e in parent {
                hedges.ins(e);
                for v in g.edge(e).members().to_vec() {
                    if g.vertex_label(v) > 0 {
                        g.set_vertex_label(v, -1);
                    }
                }
            }
        }

        // an edge absent from every child's lambda occurs here for the
        // last time and must stay
        let mut new_lambda: SortedSet<usize> = SortedSet::new();
        for &e in &lambda_list {
            let in_child = self.children.iter().any(|c| c.lambda_contains(e));
            if !in_child {
                new_lambda.push(e);
                g.label_edge_vertices(e, 0);
            }
        }

        let member_bound: usize = lambda_list.iter().map(|&e| g.edge(e).members().len()).sum();
        let mut nodes = CompSet::new(member_bound);
        for &e in &lambda_list {
            for v in g.edge(e).members().to_vec() {
                if g.vertex_label(v) == -1 {
                    nodes.ins(v);
                }
            }
        }

        let cov = setcover::cover(g, &nodes, &hedges, rng);
        for e in cov.iter() {
            new_lambda.push(e);
        }
        self.lambda = if new_lambda.len() >= lambda_list.len() {
            SortedSet::from_unsorted(lambda_list)
        } else {
            new_lambda
        };

        let own: Vec<usize> = self.lambda().to_vec();
        for c in &mut self.children {
            c.reduce_lambda_top_down(Some(&own), g, rng);
        }
    }

    fn reduce_lambda_bottom_up(
        &mut self,
        parent_lambda: Option<&[usize]>,
        g: &mut Hypergraph,
        rng: &mut impl Rng,
    ) {
        let own: Vec<usize> = self.lambda().to_vec();
        for c in &mut self.children {
            c.reduce_lambda_bottom_up(Some(&own), g, rng);
        }

        let lambda_list = own;
        let child_edges: usize = self.children.iter().map(|c| c.lambda().len()).sum();
        let mut hedges = CompSet::new(lambda_list.len() + child_edges);
        for &e in &lambda_list {
            hedges.ins(e);
            g.label_edge_vertices(e, 0);
        }

        for (i, c) in self.children.iter().enumerate() {
            let tag = (i + 1) as i64;
            for &e in c.lambda() {
                hedges.ins(e);
                for v in g.edge(e).members().to_vec() {
                    let current = g.vertex_label(v);
                    if current >= 0 {
                        if current > 0 && current < tag {
                            g.set_vertex_label(v, -1);
                        } else {
                            g.set_vertex_label(v, tag);
                        }
                    }
                }
            }
        }
        if let Some(parent) = parent_lambda {
            for &e in parent {
                for v in g.edge(e).members().to_vec() {
                    if g.vertex_label(v) > 0 {
                        g.set_vertex_label(v, -1);
                    }
                }
            }
        }

        // an edge absent from the parent's lambda occurs here for the
        // last time on the way up and must stay
        let mut new_lambda: SortedSet<usize> = SortedSet::new();
        for &e in &lambda_list {
            let in_parent = parent_lambda.is_some_and(|p| p.contains(&e));
            if !in_parent {
                new_lambda.push(e);
                g.label_edge_vertices(e, 0);
            }
        }

        let member_bound: usize = lambda_list.iter().map(|&e| g.edge(e).members().len()).sum();
        let mut nodes = CompSet::new(member_bound);
        for &e in &lambda_list {
            for v in g.edge(e).members().to_vec() {
                if g.vertex_label(v) == -1 {
                    nodes.ins(v);
                }
            }
        }

        let cov = setcover::cover(g, &nodes, &hedges, rng);
        for e in cov.iter() {
            new_lambda.push(e);
        }
        self.lambda = if new_lambda.len() >= lambda_list.len() {
            SortedSet::from_unsorted(lambda_list)
        } else {
            new_lambda
        };
    }

    /// Rebuilds every χ from the λ sets: each hyperedge of the graph is
    /// assigned to one covering node (strict: the first in preorder whose
    /// λ contains it; non-strict: the one with the smallest λ among
    /// those), that node absorbs the edge's vertices, and finally χ sets
    /// are patched so every vertex's occurrence stays connected.
    ///
    /// The hypergraph's edge labels serve as an edge-to-position map for
    /// the whole pass, which is why the graph is borrowed exclusively.
    pub fn set_chi(&mut self, g: &mut Hypergraph, strict: bool) {
        let edge_ids = g.edge_ids();
        for (pos, &e) in edge_ids.iter().enumerate() {
            g.set_edge_label(e, pos as i64);
        }
        let mut owners: Vec<Option<(usize, usize)>> = vec![None; edge_ids.len()];
        self.assign_cover_nodes(g, strict, &mut owners, &mut 0);
        self.insert_cover_members(g, &edge_ids, &owners, &mut 0);
        self.patch_chi_connectivity(g, None);
    }

    fn assign_cover_nodes(
        &self,
        g: &Hypergraph,
        strict: bool,
        owners: &mut [Option<(usize, usize)>],
        counter: &mut usize,
    ) {
        let me = *counter;
        *counter += 1;
        for &e in self.lambda() {
            let pos = g.edge_label(e) as usize;
            match owners[pos] {
                None => owners[pos] = Some((me, self.lambda.len())),
                Some((_, size)) => {
                    if !strict && self.lambda.len() < size {
                        owners[pos] = Some((me, self.lambda.len()));
                    }
                }
            }
        }
        for c in self.children() {
            c.assign_cover_nodes(g, strict, owners, counter);
        }
    }

    fn insert_cover_members(
        &mut self,
        g: &Hypergraph,
        edge_ids: &[usize],
        owners: &[Option<(usize, usize)>],
        counter: &mut usize,
    ) {
        let me = *counter;
        *counter += 1;
        for (pos, owner) in owners.iter().enumerate() {
            if let Some((id, _)) = owner {
                if *id == me {
                    for &v in g.edge(edge_ids[pos]).members() {
                        self.chi.push(v);
                    }
                }
            }
        }
        for c in &mut self.children {
            c.insert_cover_members(g, edge_ids, owners, counter);
        }
    }

    /// Adds to χ every vertex occurring in the χ sets of two or more
    /// subtrees, or in the parent's χ and at least one subtree.
    fn patch_chi_connectivity(&mut self, g: &mut Hypergraph, parent_chi: Option<&[usize]>) {
        g.reset_vertex_labels(0);
        for (i, c) in self.children.iter().enumerate() {
            c.label_chi_sets(g, (i + 1) as i64);
        }
        if let Some(parent) = parent_chi {
            for &v in parent {
                if g.vertex_label(v) > 0 {
                    g.set_vertex_label(v, -1);
                }
            }
        }
        for v in g.vertex_ids() {
            if g.vertex_label(v) == -1 {
                self.chi.push(v);
            }
        }
        let own: Vec<usize> = self.chi().to_vec();
        for c in &mut self.children {
            c.patch_chi_connectivity(g, Some(&own));
        }
    }

    /// Extends every λ to a set cover of its χ, keeping the smaller of a
    /// full cover and a cover of the part the current λ misses.
    pub fn set_lambda(&mut self, g: &mut Hypergraph, rng: &mut impl Rng) {
        let chi_list: Vec<usize> = self.chi().to_vec();
        let mut nodes = CompSet::new(chi_list.len());
        let mut hedges = CompSet::new(g.nr_edges());
        for &v in &chi_list {
            nodes.ins(v);
            for e in g.vertex(v).members().to_vec() {
                hedges.ins(e);
            }
        }
        let full_cover = setcover::cover(g, &nodes, &hedges, rng);

        let chosen = if !self.lambda.is_empty() {
            g.reset_vertex_labels(0);
            for &e in self.lambda() {
                g.label_edge_vertices(e, 1);
            }
            let mut rest_nodes = CompSet::new(chi_list.len());
            let mut rest_hedges = CompSet::new(g.nr_edges());
            for &v in &chi_list {
                if g.vertex_label(v) == 0 {
                    rest_nodes.ins(v);
                    for e in g.vertex(v).members().to_vec() {
                        rest_hedges.ins(e);
                    }
                }
            }
            let rest_cover = setcover::cover(g, &rest_nodes, &rest_hedges, rng);
            if rest_cover.len() < full_cover.len() {
                rest_cover
            } else {
                full_cover
            }
        } else {
            full_cover
        };

        for e in chosen.iter() {
            self.lambda.push(e);
        }
        for c in &mut self.children {
            c.set_lambda(g, rng);
        }
    }

    /// Replaces this node's λ by a set cover of its χ when that cover is
    /// smaller. The guard applies to this node only; every descendant
    /// receives the additive [`Hypertree::set_lambda`] pass.
    pub fn reset_lambda(&mut self, g: &mut Hypergraph, rng: &mut impl Rng) {
        let chi_list: Vec<usize> = self.chi().to_vec();
        let mut nodes = CompSet::new(chi_list.len());
        let mut hedges = CompSet::new(g.nr_edges());
        for &v in &chi_list {
            nodes.ins(v);
            for e in g.vertex(v).members().to_vec() {
                hedges.ins(e);
            }
        }
        let cov = setcover::cover(g, &nodes, &hedges, rng);
        if cov.len() < self.lambda.len() {
            self.lambda = SortedSet::from_unsorted(cov.iter().collect());
        }
        for c in &mut self.children {
            c.set_lambda(g, rng);
        }
    }
}
