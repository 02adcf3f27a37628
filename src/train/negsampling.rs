//! Training of graph embeddings by negative sampling.
//!
//! A graph is a document whose words are its subgraph instances (as in doc2vec PV-DBOW).
//! Each instance p of graph g is a positive example and is contrasted against k subgraph instances
//! drawn in other graphs. Subgraph embeddings are frozen at this stage, only the rows of the graph
//! matrix move.

use indexmap::IndexSet;

use ndarray::Array2;

use rand::Rng;
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;

use cpu_time::ProcessTime;
use std::time::SystemTime;

use crate::error::{GraphEmbedError, Result};
use crate::graph::GraphView;
use crate::subgraph::{SubgraphId, SubgraphKey, SubgraphTable};

use super::linear::{stable_softmax, LinearSgd, Objective};


/// Trains the rows of the graph embedding matrix.
#[derive(Copy, Clone, Debug)]
pub struct GraphTrainer {
    sgd : LinearSgd,
    nb_epochs : usize,
    /// number of negative instances per graph and epoch
    nb_negative : usize,
    max_degree : u16,
}


impl GraphTrainer {
    pub fn new(learning_rate : f64, nb_epochs : usize, nb_negative : usize, max_degree : u16) -> Self {
        GraphTrainer{sgd : LinearSgd::new(learning_rate), nb_epochs, nb_negative, max_degree}
    }

    ///
    pub fn get_nb_negative(&self) -> usize { self.nb_negative }

    ///
    pub fn get_nb_epochs(&self) -> usize { self.nb_epochs }


    /// Draws nb_negative distinct subgraph ids outside graph graph_rank.
    /// Each draw picks a graph other than graph_rank, then one of its live vertices, then a degree, all uniformly.
    pub fn sample_negatives<G : GraphView>(&self, graphs : &[G], graph_rank : usize, table : &SubgraphTable, rng : &mut Xoshiro256PlusPlus) -> Result<Vec<SubgraphId>> {
        if graphs.len() < 2 {
            return Err(GraphEmbedError::Configuration(format!("negative sampling needs at least 2 graphs, got {}", graphs.len())));
        }
        let pool : usize = graphs.iter().enumerate().filter(|(r, _)| *r != graph_rank)
                .map(|(_, g)| g.get_nb_vertices() * (self.max_degree as usize + 1)).sum();
        if pool < self.nb_negative {
            log::error!("sample_negatives graph {} : {} candidates for {} negatives", graph_rank, pool, self.nb_negative);
            return Err(GraphEmbedError::Configuration(format!("graph {} : only {} negative candidates, {} asked", graph_rank, pool, self.nb_negative)));
        }
        let live : Vec<Vec<usize>> = graphs.iter().map(|g| g.live_vertices()).collect();
        let mut negatives = IndexSet::<SubgraphId>::with_capacity(self.nb_negative);
        while negatives.len() < self.nb_negative {
            let mut other = rng.gen_range(0..graphs.len() - 1);
            if other >= graph_rank {
                other += 1;
            }
            if live[other].is_empty() {
                continue;
            }
            let vertex = live[other][rng.gen_range(0..live[other].len())];
            let degree = rng.gen_range(0..=self.max_degree);
            let id = table.get_id(&SubgraphKey::new(other as u32, vertex as u32, degree))?;
            if !negatives.insert(id) {
                log::trace!("sample_negatives graph {} : id {} drawn twice", graph_rank, id);
            }
        }
        Ok(negatives.into_iter().collect())
    } // end of sample_negatives


    /// One pass over all graphs in a random order. Returns the sum of the losses of the positive instances.
    pub fn run_epoch<G : GraphView>(&self, graphs : &[G], table : &SubgraphTable, embeddings : &mut Array2<f64>, rng : &mut Xoshiro256PlusPlus) -> Result<f64> {
        let mut order : Vec<usize> = (0..graphs.len()).collect();
        order.shuffle(rng);
        let mut loss = 0.;
        for rank in order {
            let negative_ids = self.sample_negatives(graphs, rank, table, rng)?;
            let negatives = gather_embeddings(table, &negative_ids)?;
            for id in table.get_graph_instances(&graphs[rank], rank as u32, self.max_degree)? {
                let positive = table.get_by_id(id)?.get_embedding();
                let objective = Objective::NegativeSampling{positive, negatives : negatives.view()};
                loss += self.sgd.step(embeddings, &[rank], objective)?;
            }
        }
        Ok(loss)
    } // end of run_epoch


    /// Runs all epochs, returns the sampled loss of each epoch.
    pub fn train<G : GraphView>(&self, graphs : &[G], table : &SubgraphTable, embeddings : &mut Array2<f64>, rng : &mut Xoshiro256PlusPlus) -> Result<Vec<f64>> {
        if embeddings.nrows() != graphs.len() || embeddings.ncols() != table.get_dimension() {
            return Err(GraphEmbedError::InvariantViolation(format!("graph matrix shape {:?}, expected ({}, {})",
                    embeddings.dim(), graphs.len(), table.get_dimension())));
        }
        let cpu_start = ProcessTime::now();
        let sys_now = SystemTime::now();
        //
        let mut losses = Vec::<f64>::with_capacity(self.nb_epochs);
        for epoch in 0..self.nb_epochs {
            let loss = self.run_epoch(graphs, table, embeddings, rng)?;
            log::debug!("GraphTrainer epoch {} loss : {:.5e}", epoch, loss);
            losses.push(loss);
        }
        //
        let cpu_time = cpu_start.elapsed();
        log::info!("GraphTrainer::train nb epochs : {}, sys time(s) {:.2e} cpu time(s) {:.2e}",
                self.nb_epochs, sys_now.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.), cpu_time.as_secs_f64());
        Ok(losses)
    } // end of train


    /// Loss of the graph matrix with all instances of the other graphs as negatives.
    /// Does not draw anything so it can be compared across epochs.
    pub fn corpus_loss<G : GraphView>(&self, graphs : &[G], table : &SubgraphTable, embeddings : &Array2<f64>) -> Result<f64> {
        let instances = graphs.iter().enumerate()
                .map(|(rank, g)| table.get_graph_instances(g, rank as u32, self.max_degree))
                .collect::<Result<Vec<Vec<SubgraphId>>>>()?;
        let mut loss = 0.;
        for (rank, ids) in instances.iter().enumerate() {
            let negative_ids : Vec<SubgraphId> = instances.iter().enumerate().filter(|(r, _)| *r != rank)
                    .flat_map(|(_, ids)| ids.iter().copied()).collect();
            if negative_ids.is_empty() {
                return Err(GraphEmbedError::Configuration("corpus loss needs at least 2 graphs".into()));
            }
            let negatives = gather_embeddings(table, &negative_ids)?;
            let row = embeddings.row(rank);
            let scores = negatives.dot(&row);
            for id in ids {
                let positive = table.get_by_id(*id)?.get_embedding();
                let mut s = scores.clone();
                loss += stable_softmax(s.view_mut()) - row.dot(&positive);
            }
        }
        Ok(loss)
    } // end of corpus_loss

} // end of impl GraphTrainer



// rows are embeddings of ids, in order
fn gather_embeddings(table : &SubgraphTable, ids : &[SubgraphId]) -> Result<Array2<f64>> {
    let mut gathered = Array2::<f64>::zeros((ids.len(), table.get_dimension()));
    for (i, id) in ids.iter().enumerate() {
        gathered.row_mut(i).assign(&table.get_by_id(*id)?.get_embedding());
    }
    Ok(gathered)
}


/// number of subgraph instances outside each graph, the candidates for negative sampling.
pub fn negative_pool_sizes<G : GraphView>(graphs : &[G], max_degree : u16) -> Vec<usize> {
    let counts : Vec<usize> = graphs.iter().map(|g| g.get_nb_vertices() * (max_degree as usize + 1)).collect();
    let total : usize = counts.iter().sum();
    counts.iter().map(|c| total - c).collect()
}


//=====================================================================================

// end of mod tests
