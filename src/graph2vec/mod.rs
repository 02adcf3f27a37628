//! graph2vec embedding of a corpus of labelled graphs.
//!
//! The pipeline is run in strict sequence over the whole corpus:
//! 1. the graph matrix is initialized uniformly in \[-1, 1\],
//! 2. all rooted subgraphs up to the maximum degree are fingerprinted (Weisfeiler-Lehman strings),
//! 3. the radial context of every subgraph instance is built,
//! 4. subgraph embeddings are refined graph by graph with a skip-gram model,
//! 5. graph embeddings are trained by negative sampling against the subgraph embeddings.
//!
//! All random draws come from one Xoshiro256PlusPlus generator so a seed reproduces a run.
//!
//! Graph vectors are compared with the cosine distance.
//!
//! See *graph2vec: Learning Distributed Representations of Graphs*, Narayanan et al. 2017

pub mod params;

pub use params::*;

use ndarray::Array2;

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

use cpu_time::ProcessTime;
use std::time::SystemTime;

use crate::embedding::{EmbedderT, Embedded};
use crate::error::Result;
use crate::graph::GraphView;
use crate::subgraph::{build_radial_context, fingerprint_corpus, EmbeddingSampler, SubgraphTable};
use crate::tools::cosine::cosine_distance;
use crate::train::{GraphTrainer, SubgraphTrainer};


/// The graph2vec embedder of a corpus of graphs.
pub struct Graph2Vec<'a, G : GraphView> {
    params : Graph2VecParams,
    graphs : &'a [G],
    /// subgraph instances of the last run
    table : Option<SubgraphTable>,
    /// sampled loss of each graph epoch of the last run
    losses : Vec<f64>,
} // end of struct Graph2Vec



impl <'a, G : GraphView> Graph2Vec<'a, G> {

    pub fn new(params : Graph2VecParams, graphs : &'a [G]) -> Self {
        Graph2Vec{params, graphs, table : None, losses : Vec::new()}
    }

    ///
    pub fn get_params(&self) -> &Graph2VecParams { &self.params }

    /// number of graphs of the corpus
    pub fn get_nb_graphs(&self) -> usize { self.graphs.len() }

    /// The subgraph table of the last run, None before compute_embedded succeeded.
    pub fn get_subgraph_table(&self) -> Option<&SubgraphTable> { self.table.as_ref() }

    /// sampled loss of each graph epoch of the last run
    pub fn get_losses(&self) -> &[f64] { &self.losses }


    /// Runs the whole pipeline and returns one vector per graph, in corpus order.
    pub fn compute_embedded(&mut self) -> Result<Embedded<f64>> {
        //
        log::debug!("Graph2Vec compute_embedded, params : {:?}", self.params);
        self.params.validate_corpus(self.graphs)?;
        let cpu_start = ProcessTime::now();
        let sys_start = SystemTime::now();
        //
        let seed = match self.params.get_seed() {
            Some(seed) => seed,
            None => rand::thread_rng().gen::<u64>(),
        };
        log::info!("Graph2Vec seed : {}", seed);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let max_degree = self.params.get_max_degree();
        let dimension = self.params.get_dimension();
        //
        let uniform = Uniform::<f64>::new_inclusive(-1., 1.);
        let mut embeddings = Array2::<f64>::from_shape_fn((self.graphs.len(), dimension), |_| uniform.sample(&mut rng));
        //
        let stage_cpu = ProcessTime::now();
        let stage_sys = SystemTime::now();
        let mut sampler = EmbeddingSampler::new(dimension, self.params.get_init_mode(), rng.gen::<u64>());
        let mut table = fingerprint_corpus(self.graphs, max_degree, &mut sampler)?;
        log::info!("fingerprinting nb subgraphs : {}, sys time(s) {:.2e} cpu time(s) {:.2e}", table.len(),
                stage_sys.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.), stage_cpu.elapsed().as_secs_f64());
        //
        let stage_cpu = ProcessTime::now();
        let stage_sys = SystemTime::now();
        let context = build_radial_context(self.graphs, &table, max_degree, &mut rng)?;
        log::info!("radial context nb pairs : {}, sys time(s) {:.2e} cpu time(s) {:.2e}", context.get_nb_pairs(),
                stage_sys.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.), stage_cpu.elapsed().as_secs_f64());
        //
        let subgraph_trainer = SubgraphTrainer::new(self.params.get_learning_rate(), self.params.get_subgraph_epochs());
        subgraph_trainer.train_corpus(self.graphs, max_degree, &mut table, &context, &mut rng)?;
        // the context is not needed any more
        drop(context);
        //
        let graph_trainer = GraphTrainer::new(self.params.get_learning_rate(), self.params.get_graph_epochs(),
                self.params.get_nb_negative(), max_degree);
        self.losses = graph_trainer.train(self.graphs, &table, &mut embeddings, &mut rng)?;
        self.table = Some(table);
        //
        log::info!("Graph2Vec embedded {} graphs sys time(s) {:.2e} cpu time(s) {:.2e}", self.graphs.len(),
                sys_start.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.), cpu_start.elapsed().as_secs_f64());
        Ok(Embedded::new(embeddings, cosine_distance))
    } // end of compute_embedded

} // end of impl Graph2Vec



impl <'a, G : GraphView> EmbedderT<f64> for Graph2Vec<'a, G> {
    type Output = Embedded<f64>;
    ///
    fn embed(&mut self) -> std::result::Result<Embedded<f64>, anyhow::Error> {
        let embedded = self.compute_embedded()?;
        Ok(embedded)
    } // end of embed
} // end of impl EmbedderT<f64>



//=====================================================================================

// end of mod tests
