use std::collections::HashMap;

use log::warn;
use union_find::{QuickUnionUf, UnionByRank, UnionFind};

mod ordering;

/// A vertex or hyperedge of a hypergraph.
///
/// Both sides of the bipartite incidence share this record: a stable `id`,
/// a display `name`, the ids of the incident components on the opposite
/// side (`members`, insertion order), the ids of the components on the
/// same side sharing a member (`neighbours`), an integer `label` used as
/// scratch by every algorithm in the crate, a `weight`, and the ids of
/// the redundant components this one subsumed during [`Hypergraph::reduce`].
#[derive(Clone, Debug)]
pub struct Component {
    id: usize,
    name: String,
    members: Vec<usize>,
    neighbours: Vec<usize>,
    label: i64,
    weight: i64,
    covered_ids: Vec<usize>,
}

impl Component {
    fn new(id: usize, name: String) -> Self {
        Component {
            id,
            name,
            members: Vec::new(),
            neighbours: Vec::new(),
            label: 0,
            weight: 1,
            covered_ids: Vec::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ids of the incident components on the opposite side, in insertion order.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Ids of the components on the same side sharing at least one member.
    pub fn neighbours(&self) -> &[usize] {
        &self.neighbours
    }

    pub fn label(&self) -> i64 {
        self.label
    }

    pub fn weight(&self) -> i64 {
        self.weight
    }

    /// Ids of the components this one subsumed during reduction.
    pub fn covered_ids(&self) -> &[usize] {
        &self.covered_ids
    }
}

/// A finite hypergraph owning its vertices and hyperedges.
///
/// Components carry stable ids, dense per side at build time; positions
/// shift when `reduce` removes subsumed hyperedges, so by-id access goes
/// through id-to-position tables. The per-component `label` fields form a
/// shared scratchpad: every algorithm entry point treats labels as
/// undefined on entry and resets the ones it relies on.
#[derive(Clone, Debug)]
pub struct Hypergraph {
    vertices: Vec<Component>,
    edges: Vec<Component>,
    vertex_pos: Vec<Option<usize>>,
    edge_pos: Vec<Option<usize>>,
}

impl Hypergraph {
    /// Builds a hypergraph from named hyperedges over named vertices.
    ///
    /// Vertices are registered in order of first appearance. A vertex
    /// repeated within one hyperedge is kept once and reported as a
    /// warning.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut g = Hypergraph {
            vertices: Vec::new(),
            edges: Vec::new(),
            vertex_pos: Vec::new(),
            edge_pos: Vec::new(),
        };
        let mut ids_by_name: HashMap<String, usize> = HashMap::new();

        for (edge_id, (name, vertex_names)) in edges.into_iter().enumerate() {
            let mut edge = Component::new(edge_id, name);
            for vertex_name in vertex_names {
                let vertex_id = *ids_by_name.entry(vertex_name.clone()).or_insert_with(|| {
                    let id = g.vertices.len();
                    g.vertices.push(Component::new(id, vertex_name));
                    id
                });
                if edge.members.contains(&vertex_id) {
                    warn!(
                        "vertex {} repeated in hyperedge {}",
                        g.vertices[vertex_id].name, edge.name
                    );
                    continue;
                }
                edge.members.push(vertex_id);
            }
            g.edges.push(edge);
        }

        for edge_pos in 0..g.edges.len() {
            let edge_id = g.edges[edge_pos].id;
            for member_pos in 0..g.edges[edge_pos].members.len() {
                let vertex_id = g.edges[edge_pos].members[member_pos];
                g.vertices[vertex_id].members.push(edge_id);
            }
        }

        g.vertex_pos = (0..g.vertices.len()).map(Some).collect();
        g.edge_pos = (0..g.edges.len()).map(Some).collect();
        g.update_neighbourhood();
        g
    }

    /// Convenience builder naming hyperedges `E0`, `E1`, ...
    pub fn from_edge_lists(lists: &[&[&str]]) -> Self {
        Self::from_edges(lists.iter().enumerate().map(|(i, vs)| {
            (
                format!("E{i}"),
                vs.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
            )
        }))
    }

    pub fn nr_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn nr_edges(&self) -> usize {
        self.edges.len()
    }

    fn vpos(&self, id: usize) -> usize {
        match self.vertex_pos.get(id) {
            Some(Some(pos)) => *pos,
            _ => panic!("unknown vertex id {id}"),
        }
    }

    fn epos(&self, id: usize) -> usize {
        match self.edge_pos.get(id) {
            Some(Some(pos)) => *pos,
            _ => panic!("unknown hyperedge id {id}"),
        }
    }

    /// # Panics
    /// Panics if no live vertex carries `id`.
    pub fn vertex(&self, id: usize) -> &Component {
        &self.vertices[self.vpos(id)]
    }

    /// # Panics
    /// Panics if no live hyperedge carries `id`.
    pub fn edge(&self, id: usize) -> &Component {
        &self.edges[self.epos(id)]
    }

    fn vertex_mut(&mut self, id: usize) -> &mut Component {
        let pos = self.vpos(id);
        &mut self.vertices[pos]
    }

    fn edge_mut(&mut self, id: usize) -> &mut Component {
        let pos = self.epos(id);
        &mut self.edges[pos]
    }

    /// # Panics
    /// Panics if no live vertex is called `name`.
    pub fn vertex_id_by_name(&self, name: &str) -> usize {
        self.vertices
            .iter()
            .find(|v| v.name == name)
            .unwrap_or_else(|| panic!("unknown vertex {name}"))
            .id
    }

    /// # Panics
    /// Panics if no live hyperedge is called `name`.
    pub fn edge_id_by_name(&self, name: &str) -> usize {
        self.edges
            .iter()
            .find(|e| e.name == name)
            .unwrap_or_else(|| panic!("unknown hyperedge {name}"))
            .id
    }

    /// # Panics
    /// Panics if `pos` is out of range.
    pub fn vertex_at(&self, pos: usize) -> &Component {
        assert!(pos < self.vertices.len(), "vertex position {pos} not available");
        &self.vertices[pos]
    }

    /// # Panics
    /// Panics if `pos` is out of range.
    pub fn edge_at(&self, pos: usize) -> &Component {
        assert!(pos < self.edges.len(), "hyperedge position {pos} not available");
        &self.edges[pos]
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Component> {
        self.vertices.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Component> {
        self.edges.iter()
    }

    /// Live vertex ids in position order.
    pub fn vertex_ids(&self) -> Vec<usize> {
        self.vertices.iter().map(|v| v.id).collect()
    }

    /// Live hyperedge ids in position order.
    pub fn edge_ids(&self) -> Vec<usize> {
        self.edges.iter().map(|e| e.id).collect()
    }

    pub fn vertex_label(&self, id: usize) -> i64 {
        self.vertex(id).label
    }

    pub fn set_vertex_label(&mut self, id: usize, label: i64) {
        self.vertex_mut(id).label = label;
    }

    pub fn edge_label(&self, id: usize) -> i64 {
        self.edge(id).label
    }

    pub fn set_edge_label(&mut self, id: usize, label: i64) {
        self.edge_mut(id).label = label;
    }

    pub fn add_edge_label(&mut self, id: usize, delta: i64) {
        self.edge_mut(id).label += delta;
    }

    pub fn add_vertex_label(&mut self, id: usize, delta: i64) {
        self.vertex_mut(id).label += delta;
    }

    pub fn set_edge_weight(&mut self, id: usize, weight: i64) {
        self.edge_mut(id).weight = weight;
    }

    /// Labels every vertex of hyperedge `id`.
    pub fn label_edge_vertices(&mut self, id: usize, label: i64) {
        let pos = self.epos(id);
        let members = std::mem::take(&mut self.edges[pos].members);
        for &v in &members {
            let vp = self.vpos(v);
            self.vertices[vp].label = label;
        }
        self.edges[pos].members = members;
    }

    pub fn reset_vertex_labels(&mut self, label: i64) {
        for v in &mut self.vertices {
            v.label = label;
        }
    }

    pub fn reset_edge_labels(&mut self, label: i64) {
        for e in &mut self.edges {
            e.label = label;
        }
    }

    /// Swaps the roles of vertices and hyperedges.
    ///
    /// Labels and weights travel with their components; a second call
    /// restores the original orientation.
    pub fn make_dual(&mut self) {
        std::mem::swap(&mut self.vertices, &mut self.edges);
        std::mem::swap(&mut self.vertex_pos, &mut self.edge_pos);
    }

    /// True iff the hyperedges form a single connected component.
    ///
    /// Hypergraphs without hyperedges count as connected; isolated
    /// vertices are ignored, matching the edge-reachability notion the
    /// decomposition engine works with.
    pub fn is_connected(&self) -> bool {
        if self.edges.len() <= 1 {
            return true;
        }
        let mut uf: QuickUnionUf<UnionByRank> = QuickUnionUf::new(self.edges.len());
        for v in &self.vertices {
            let mut iter = v.members.iter();
            if let Some(&first) = iter.next() {
                let first_pos = self.epos(first);
                for &e in iter {
                    uf.union(first_pos, self.epos(e));
                }
            }
        }
        let root = uf.find(0);
        (1..self.edges.len()).all(|pos| uf.find(pos) == root)
    }

    /// Removes every hyperedge whose vertex set is contained in another
    /// hyperedge's, recording the subsumed edge's id (and everything it
    /// had subsumed) on the survivor.
    ///
    /// With `final_only`, comparisons are restricted to the last
    /// hyperedge. After removing an edge the scan resumes at the same
    /// position, so chains of subsumed edges fall in a single pass.
    pub fn reduce(&mut self, final_only: bool) {
        self.reset_vertex_labels(0);
        let mut i = 0;
        while i < self.edges.len() {
            let members = self.edges[i].members.clone();
            for &v in &members {
                self.vertex_mut(v).label = 1;
            }

            let mut j = if final_only && i + 1 < self.edges.len() {
                self.edges.len() - 1
            } else {
                0
            };
            while j < self.edges.len() {
                let covered =
                    j != i && self.edges[j].members.iter().all(|&v| self.vertex(v).label == 1);
                if covered {
                    let dead_id = self.edges[j].id;
                    let mut dead_covered = std::mem::take(&mut self.edges[j].covered_ids);
                    self.edges[i].covered_ids.push(dead_id);
                    self.edges[i].covered_ids.append(&mut dead_covered);
                    self.remove_edge_at(j);
                    if j < i {
                        i -= 1;
                    }
                } else {
                    j += 1;
                }
            }

            let members = self.edges[i].members.clone();
            for &v in &members {
                self.vertex_mut(v).label = 0;
            }
            i += 1;
        }
    }

    fn remove_edge_at(&mut self, pos: usize) {
        let dead = self.edges.remove(pos);
        self.edge_pos[dead.id] = None;
        for p in pos..self.edges.len() {
            let id = self.edges[p].id;
            self.edge_pos[id] = Some(p);
        }
        for &v in &dead.members {
            if let Some(vp) = self.vertex_pos[v] {
                self.vertices[vp].members.retain(|&e| e != dead.id);
            }
        }
        for &ne in &dead.neighbours {
            if let Some(np) = self.edge_pos[ne] {
                self.edges[np].neighbours.retain(|&e| e != dead.id);
            }
        }
    }

    /// Drops member references whose target component was removed.
    pub fn update_comp_sizes(&mut self) {
        let edge_alive: Vec<bool> = self.edge_pos.iter().map(Option::is_some).collect();
        let vertex_alive: Vec<bool> = self.vertex_pos.iter().map(Option::is_some).collect();
        for v in &mut self.vertices {
            v.members.retain(|&e| edge_alive[e]);
        }
        for e in &mut self.edges {
            e.members.retain(|&v| vertex_alive[v]);
        }
    }

    /// Recomputes both neighbour relations from the incidence lists.
    ///
    /// Neighbour lists come out sorted by id, which keeps every
    /// label-free walk over them deterministic.
    pub fn update_neighbourhood(&mut self) {
        for pos in 0..self.vertices.len() {
            let id = self.vertices[pos].id;
            let mut nb: Vec<usize> = self.vertices[pos]
                .members
                .iter()
                .map(|&e| self.epos(e))
                .flat_map(|ep| self.edges[ep].members.iter().copied())
                .filter(|&u| u != id)
                .collect();
            nb.sort_unstable();
            nb.dedup();
            self.vertices[pos].neighbours = nb;
        }
        for pos in 0..self.edges.len() {
            let id = self.edges[pos].id;
            let mut nb: Vec<usize> = self.edges[pos]
                .members
                .iter()
                .map(|&v| self.vpos(v))
                .flat_map(|vp| self.vertices[vp].members.iter().copied())
                .filter(|&f| f != id)
                .collect();
            nb.sort_unstable();
            nb.dedup();
            self.edges[pos].neighbours = nb;
        }
    }
}
