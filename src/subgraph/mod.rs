//! Rooted subgraphs of the corpus.
//!
//! - [fingerprint] computes the Weisfeiler-Lehman canonical string of each (graph, vertex, degree),
//!   allocates the subgraph ids and the initial subgraph embeddings.
//! - [context] computes for each subgraph the multiset of subgraphs in its radial context,
//!   from which the skip-gram training pairs are made.
//!
//! Some References :
//! - Weisfeiler-Lehman Graph Kernels. Shervashidze, Schweitzer, van Leeuwen, Mehlhorn, Borgwardt 2011
//! - subgraph2vec: Learning Distributed Representations of Rooted Sub-graphs from Large Graphs.
//!   Narayanan, Chandramohan, Chen, Liu, Saminathan 2016
//! - graph2vec: Learning Distributed Representations of Graphs. Narayanan et al. 2017

pub mod fingerprint;

pub mod context;

pub use fingerprint::*;
pub use context::*;
