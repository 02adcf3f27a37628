//! Parameters of the graph2vec embedding.
//!
//! The degree is the radius (in hops) of the largest rooted subgraph fingerprinted around a vertex.
//! Each graph is described by (max_degree + 1) subgraph instances per vertex.

use crate::error::{GraphEmbedError, Result};
use crate::graph::GraphView;
use crate::subgraph::InitMode;
use crate::train::negative_pool_sizes;


#[derive(Debug, Copy, Clone)]
pub struct Graph2VecParams {
    /// maximum degree (hop radius) of rooted subgraphs
    pub max_degree : u16,
    /// dimension of subgraph and graph embeddings
    pub dimension : usize,
    /// number of epochs of the skip-gram training of subgraphs, per graph
    pub subgraph_epochs : usize,
    /// number of epochs of the graph embedding training
    pub graph_epochs : usize,
    /// learning rate of both stages
    pub learning_rate : f64,
    /// number of negative subgraph instances drawn per graph and epoch
    pub nb_negative : usize,
    /// seed of the random generator. Drawn from entropy if None
    pub seed : Option<u64>,
    /// initialization of subgraph embeddings
    pub init_mode : InitMode,
} // end of Graph2VecParams


impl Graph2VecParams {
    pub fn new(max_degree : u16, dimension : usize, subgraph_epochs : usize, graph_epochs : usize, learning_rate : f64,
            nb_negative : usize, seed : Option<u64>, init_mode : InitMode) -> Self {
        Graph2VecParams{max_degree, dimension, subgraph_epochs, graph_epochs, learning_rate, nb_negative, seed, init_mode}
    }

    ///
    pub fn get_max_degree(&self) -> u16 { self.max_degree }

    ///
    pub fn get_dimension(&self) -> usize { self.dimension }

    ///
    pub fn get_subgraph_epochs(&self) -> usize { self.subgraph_epochs }

    ///
    pub fn get_graph_epochs(&self) -> usize { self.graph_epochs }

    ///
    pub fn get_learning_rate(&self) -> f64 { self.learning_rate }

    ///
    pub fn get_nb_negative(&self) -> usize { self.nb_negative }

    ///
    pub fn get_seed(&self) -> Option<u64> { self.seed }

    ///
    pub fn get_init_mode(&self) -> InitMode { self.init_mode }

    /// to fix the seed after construction (useful for reproducible runs from the command line)
    pub fn set_seed(&mut self, seed : u64) { self.seed = Some(seed) }


    /// checks values that do not depend on the corpus
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(GraphEmbedError::Configuration("dimension must be positive".into()));
        }
        if self.subgraph_epochs == 0 || self.graph_epochs == 0 {
            return Err(GraphEmbedError::Configuration(format!("epochs must be positive, subgraph epochs : {}, graph epochs : {}",
                    self.subgraph_epochs, self.graph_epochs)));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0. {
            return Err(GraphEmbedError::Configuration(format!("learning rate must be positive and finite, got {}", self.learning_rate)));
        }
        if self.nb_negative < 2 {
            return Err(GraphEmbedError::Configuration(format!("number of negatives must be at least 2, got {}", self.nb_negative)));
        }
        Ok(())
    } // end of validate


    /// checks parameters against a corpus, before anything is computed.
    pub fn validate_corpus<G : GraphView>(&self, graphs : &[G]) -> Result<()> {
        self.validate()?;
        if graphs.is_empty() {
            return Err(GraphEmbedError::DegenerateInput("empty corpus".into()));
        }
        if graphs.len() < 2 {
            return Err(GraphEmbedError::Configuration("negative sampling needs at least 2 graphs".into()));
        }
        for (rank, graph) in graphs.iter().enumerate() {
            let nb_vertices = graph.get_nb_vertices();
            if nb_vertices < 2 {
                log::error!("graph {} has {} vertices", rank, nb_vertices);
                return Err(GraphEmbedError::DegenerateInput(format!("graph {} has {} live vertices, at least 2 are needed", rank, nb_vertices)));
            }
        }
        let pools = negative_pool_sizes(graphs, self.max_degree);
        for (rank, pool) in pools.iter().enumerate() {
            if *pool < self.nb_negative {
                log::error!("graph {} : {} negative candidates for {} negatives asked", rank, pool, self.nb_negative);
                return Err(GraphEmbedError::Configuration(format!("{} negatives asked but graph {} has only {} candidate instances in other graphs",
                        self.nb_negative, rank, pool)));
            }
        }
        Ok(())
    } // end of validate_corpus

} // end of impl Graph2VecParams


/// default values are those of the reference graph2vec command line.
/// The default [InitMode::Independent] does not guarantee that identical graphs embed close to each other,
/// use [InitMode::Canonical] for that.
impl Default for Graph2VecParams {
    fn default() -> Self {
        Graph2VecParams{max_degree : 10, dimension : 10, subgraph_epochs : 3, graph_epochs : 3, learning_rate : 0.025, nb_negative : 20,
                seed : None, init_mode : InitMode::Independent}
    }
}



//=====================================================================================

// end of mod tests
