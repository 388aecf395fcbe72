//! Hypertree decompositions of bounded width.
//!
//! Given a connected hypergraph and a bound `k`, [`DetKDecomp`] either
//! produces a hypertree decomposition of width at most `k` or reports
//! that none exists, via the backtracking det-k-decomp separator search.
//! [`Hypertree`] carries the result along with structural operations,
//! validity checks and a GML writer; [`Hypergraph`] is the underlying
//! store.

pub mod compset;
pub mod decomp;
pub mod hypergraph;
pub mod hypertree;
pub mod setcover;
pub mod util;

pub use compset::CompSet;
pub use decomp::DetKDecomp;
pub use hypergraph::{Component, Hypergraph};
pub use hypertree::Hypertree;
