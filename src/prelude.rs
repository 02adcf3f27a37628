//! To ease access to most frequently used items
//!

pub use crate::error::GraphEmbedError;

pub use crate::graph::*;

pub use crate::subgraph::*;

pub use crate::graph2vec::*;

pub use crate::embedding::*;

pub use crate::io::{dataset::*, output::*, bson::*};

pub use crate::tools::cosine::*;
