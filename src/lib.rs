//! graph2vec : embedding of a corpus of labelled graphs.
//!
//! Rooted subgraphs of each graph are fingerprinted with Weisfeiler-Lehman relabelling,
//! subgraph embeddings are learned with a skip-gram model over their radial context,
//! then each graph gets a vector trained by negative sampling against the subgraph embeddings.
//!
//! - [graph] : labelled graphs and the read only view the algorithms use.
//! - [subgraph] : fingerprinting of rooted subgraphs and radial contexts.
//! - [train] : the two training stages.
//! - [graph2vec] : the pipeline.
//! - [io] : json dataset loader and dumps of results.

pub mod error;

pub mod graph;

pub mod subgraph;

pub mod train;

pub mod graph2vec;

pub mod embedding;

pub mod tools;

pub mod io;

pub mod prelude;
