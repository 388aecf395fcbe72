//! GML serialization of a decomposition for visualization.

use std::io::{self, Write};

use itertools::Itertools;

use super::Hypertree;
use crate::hypergraph::Hypergraph;

impl Hypertree {
    /// Writes the tree in GML format.
    ///
    /// Node ids come from a fresh preorder labelling; λ and χ members
    /// are ordered by the hypergraph's position indices, written into
    /// the component labels for the duration of the call, so equal
    /// inputs serialize identically.
    pub fn write_gml<W: Write>(&mut self, g: &mut Hypergraph, out: &mut W) -> io::Result<()> {
        self.set_id_labels(1);
        for (pos, v) in g.vertex_ids().into_iter().enumerate() {
            g.set_vertex_label(v, pos as i64);
        }
        for (pos, e) in g.edge_ids().into_iter().enumerate() {
            g.set_edge_label(e, pos as i64);
        }

        writeln!(out, "graph [")?;
        writeln!(out)?;
        writeln!(out, "  directed 0")?;
        writeln!(out)?;
        self.write_gml_nodes(g, out)?;
        self.write_gml_edges(out, None)?;
        writeln!(out, "]")
    }

    fn write_gml_nodes<W: Write>(&self, g: &Hypergraph, out: &mut W) -> io::Result<()> {
        let mut lambda: Vec<usize> = self.lambda().to_vec();
        lambda.sort_by_key(|&e| g.edge(e).label());
        let mut chi: Vec<usize> = self.chi().to_vec();
        chi.sort_by_key(|&v| g.vertex(v).label());

        writeln!(out, "  node [")?;
        writeln!(out, "    id {}", self.label())?;
        writeln!(
            out,
            "    label \"{{{}}}    {{{}}}\"",
            lambda.iter().map(|&e| g.edge(e).name()).join(", "),
            chi.iter().map(|&v| g.vertex(v).name()).join(", ")
        )?;
        writeln!(out, "    vgj [")?;
        writeln!(out, "      labelPosition \"in\"")?;
        writeln!(out, "      shape \"Rectangle\"")?;
        writeln!(out, "    ]")?;
        writeln!(out, "  ]")?;
        writeln!(out)?;

        for c in self.children() {
            c.write_gml_nodes(g, out)?;
        }
        Ok(())
    }

    fn write_gml_edges<W: Write>(&self, out: &mut W, parent: Option<i64>) -> io::Result<()> {
        if let Some(parent_label) = parent {
            writeln!(out, "  edge [")?;
            writeln!(out, "    source {parent_label}")?;
            writeln!(out, "    target {}", self.label())?;
            writeln!(out, "  ]")?;
            writeln!(out)?;
        }
        for c in self.children() {
            c.write_gml_edges(out, Some(self.label()))?;
        }
        Ok(())
    }
}
