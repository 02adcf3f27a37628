//! Skip-gram training of the subgraph embeddings of one graph.
//!
//! The vocabulary of a graph is the set of its subgraph instances. As ids of a graph are allocated
//! contiguously during fingerprinting, the local index of an instance is its id minus the smallest id
//! of the graph. Each (subject, context) pair of the radial context is a training example of a
//! softmax classifier predicting the context from the subject embedding.
//!
//! The output layer is drawn fresh for each graph and dropped after training, only the subgraph
//! embeddings are written back in the table.

use ndarray::Array2;

use rand_distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;

use cpu_time::ProcessTime;
use std::time::SystemTime;

use crate::error::{GraphEmbedError, Result};
use crate::graph::GraphView;
use crate::subgraph::{RadialContext, SubgraphId, SubgraphTable};

use super::linear::{LinearSgd, Objective};


/// Training pairs of a graph expressed in local vocabulary indexes.
#[derive(Debug, Clone)]
pub struct LocalPairs {
    /// smallest subgraph id of the graph
    min_id : SubgraphId,
    /// vocabulary size
    nb_words : usize,
    subjects : Vec<usize>,
    targets : Vec<usize>,
}


impl LocalPairs {
    /// Collects the pairs of graph graph_rank. ids must be a contiguous range.
    pub fn new(ids : &[SubgraphId], context : &RadialContext, graph_rank : u32) -> Result<Self> {
        let min_id = match ids.iter().min() {
            Some(min) => *min,
            None => {
                return Err(GraphEmbedError::DegenerateInput(format!("graph {} has no subgraph instance", graph_rank)));
            }
        };
        let nb_words = ids.len();
        let to_local = |id : SubgraphId| -> Result<usize> {
            if id < min_id || id - min_id >= nb_words {
                log::error!("graph {} : subgraph id {} outside vocabulary [{}, {})", graph_rank, id, min_id, min_id + nb_words);
                return Err(GraphEmbedError::InvariantViolation(format!("graph {} : subgraph id {} outside local vocabulary of {} words starting at {}",
                        graph_rank, id, nb_words, min_id)));
            }
            Ok(id - min_id)
        };
        let mut subjects = Vec::<usize>::new();
        let mut targets = Vec::<usize>::new();
        for id in ids {
            let subject = to_local(*id)?;
            for c in context.get(*id) {
                subjects.push(subject);
                targets.push(to_local(*c)?);
            }
        }
        Ok(LocalPairs{min_id, nb_words, subjects, targets})
    } // end of new

    ///
    pub fn get_min_id(&self) -> SubgraphId { self.min_id }

    /// vocabulary size
    pub fn get_nb_words(&self) -> usize { self.nb_words }

    ///
    pub fn get_nb_pairs(&self) -> usize { self.subjects.len() }

    ///
    pub fn is_empty(&self) -> bool { self.subjects.is_empty() }
} // end of impl LocalPairs



/// Trains subgraph embeddings graph by graph.
#[derive(Copy, Clone, Debug)]
pub struct SubgraphTrainer {
    sgd : LinearSgd,
    nb_epochs : usize,
}


impl SubgraphTrainer {
    pub fn new(learning_rate : f64, nb_epochs : usize) -> Self {
        SubgraphTrainer{sgd : LinearSgd::new(learning_rate), nb_epochs}
    }

    ///
    pub fn get_nb_epochs(&self) -> usize { self.nb_epochs }

    /// Trains the subgraph embeddings of one graph and writes them back in table.
    /// Returns the mean cross entropy of each epoch (empty if the graph has no training pair).
    pub fn train_graph<G : GraphView>(&self, graph : &G, graph_rank : u32, max_degree : u16, table : &mut SubgraphTable,
                    context : &RadialContext, rng : &mut Xoshiro256PlusPlus) -> Result<Vec<f64>> {
        //
        let ids = table.get_graph_instances(graph, graph_rank, max_degree)?;
        let pairs = LocalPairs::new(&ids, context, graph_rank)?;
        if pairs.is_empty() {
            log::warn!("SubgraphTrainer : graph {} has no training pair, skipped", graph_rank);
            return Ok(Vec::new());
        }
        let dimension = table.get_dimension();
        // local embeddings, row i is subgraph min_id + i
        let mut inputs = Array2::<f64>::zeros((pairs.nb_words, dimension));
        for id in &ids {
            let instance = table.get_by_id(*id)?;
            inputs.row_mut(id - pairs.min_id).assign(&instance.get_embedding());
        }
        let uniform = Uniform::<f64>::new_inclusive(-1., 1.);
        let mut weights = Array2::<f64>::from_shape_fn((pairs.nb_words, dimension), |_| uniform.sample(&mut *rng));
        //
        let mut losses = Vec::<f64>::with_capacity(self.nb_epochs);
        for epoch in 0..self.nb_epochs {
            let objective = Objective::Softmax{targets : &pairs.targets, weights : &mut weights};
            let loss = self.sgd.step(&mut inputs, &pairs.subjects, objective)?;
            log::debug!("SubgraphTrainer graph {} epoch {} loss : {:.5e}", graph_rank, epoch, loss);
            losses.push(loss);
        }
        // write back
        for (i, row) in inputs.outer_iter().enumerate() {
            table.set_embedding(pairs.min_id + i, row)?;
        }
        Ok(losses)
    } // end of train_graph


    /// Trains subgraph embeddings of all graphs, sequentially.
    pub fn train_corpus<G : GraphView>(&self, graphs : &[G], max_degree : u16, table : &mut SubgraphTable,
                    context : &RadialContext, rng : &mut Xoshiro256PlusPlus) -> Result<()> {
        let cpu_start = ProcessTime::now();
        let sys_now = SystemTime::now();
        //
        let mut nb_skipped = 0;
        for (rank, graph) in graphs.iter().enumerate() {
            let losses = self.train_graph(graph, rank as u32, max_degree, table, context, rng)?;
            if losses.is_empty() {
                nb_skipped += 1;
            }
            else {
                log::trace!("graph {} first loss {:.5e} last loss {:.5e}", rank, losses[0], losses[losses.len() - 1]);
            }
        }
        //
        let cpu_time = cpu_start.elapsed();
        log::info!("SubgraphTrainer::train_corpus nb graphs : {}, skipped : {}, sys time(s) {:.2e} cpu time(s) {:.2e}",
                graphs.len(), nb_skipped, sys_now.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.), cpu_time.as_secs_f64());
        Ok(())
    } // end of train_corpus

} // end of impl SubgraphTrainer



//=====================================================================================

// end of mod tests
