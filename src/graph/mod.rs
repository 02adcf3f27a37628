//! Read only access to the graphs of the corpus.
//!
//! The embedding algorithms only need to enumerate vertex slots, get the label of a vertex
//! and follow outgoing edges. This is described by the trait [GraphView].
//! The graph container itself is petgraph's StableGraph (see [pgraph]), so that vertex numbers
//! stay stable when vertices are removed: a removed vertex leaves an empty slot.

/// Defines interface to petgraph.
pub mod pgraph;

pub use pgraph::*;
