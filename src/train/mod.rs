//! Training stages.
//!
//! - [skipgram] : per graph, subgraph embeddings are refined by a skip-gram model over the radial context.
//! - [negsampling] : graph embeddings are trained against the (frozen) subgraph embeddings,
//!   with negative sampling.
//!
//! Both stages use the plain SGD linear engine of [linear].

pub mod linear;

pub mod skipgram;

pub mod negsampling;

pub use linear::{LinearSgd, Objective, stable_softmax, stable_softmax_columns};
pub use skipgram::SubgraphTrainer;
pub use negsampling::{GraphTrainer, negative_pool_sizes};
