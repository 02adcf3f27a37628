//! Weisfeiler-Lehman fingerprinting of rooted subgraphs.
//!
//! The canonical string of a subgraph rooted at vertex v with degree (hop radius) d is:
//! - the label of v if d = 0
//! - the string of (v, d-1) followed by the lexicographically sorted *set* of strings of (u, d-1)
//!   for u reached by an edge going out of v.
//!
//! Each (graph, vertex, degree) triple fingerprinted gets a unique id, taken from a counter shared by
//! the whole corpus, and a random embedding vector. Two triples with the same canonical string get
//! different ids: ids identify subgraph instances, not isomorphism classes.

use std::collections::{BTreeSet, HashMap};
use std::hash::{BuildHasher, Hasher};

use ndarray::{Array1, ArrayView1};

use rand_distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

use crate::error::{GraphEmbedError, Result};
use crate::graph::GraphView;


/// identity of a subgraph instance
pub type SubgraphId = usize;

/// (graph rank in corpus, vertex number, degree). Identifies a rooted subgraph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubgraphKey {
    pub graph : u32,
    pub vertex : u32,
    pub degree : u16,
}

impl SubgraphKey {
    pub fn new(graph : u32, vertex : u32, degree : u16) -> Self {
        SubgraphKey{graph, vertex, degree}
    }
} // end of impl SubgraphKey



/// A fingerprinted rooted subgraph
#[derive(Clone, Debug)]
pub struct SubgraphInstance {
    id : SubgraphId,
    /// canonical WL string
    canonical : String,
    /// current embedding
    embedding : Array1<f64>,
} // end of SubgraphInstance


impl SubgraphInstance {
    ///
    pub fn get_id(&self) -> SubgraphId { self.id }

    ///
    pub fn get_canonical(&self) -> &str { &self.canonical }

    ///
    pub fn get_embedding(&self) -> ArrayView1<f64> { self.embedding.view() }
} // end of impl SubgraphInstance



/// Allocates subgraph ids. One counter per pipeline run, never reset.
#[derive(Debug, Default)]
pub struct SubgraphIdCounter {
    next : SubgraphId,
}

impl SubgraphIdCounter {
    pub fn new() -> Self {
        SubgraphIdCounter{next : 0}
    }

    /// returns a fresh id
    pub fn next_id(&mut self) -> SubgraphId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// number of ids allocated so far
    pub fn get_nb_allocated(&self) -> usize { self.next }
} // end of impl SubgraphIdCounter



/// maps a subgraph id back to its (graph, vertex, degree).
#[derive(Debug, Default)]
pub struct ReverseIndex {
    keys : HashMap<SubgraphId, SubgraphKey, ahash::RandomState>,
}

impl ReverseIndex {
    /// get key of subgraph id
    pub fn get(&self, id : SubgraphId) -> Result<SubgraphKey> {
        match self.keys.get(&id) {
            Some(key) => Ok(*key),
            None => {
                log::error!("ReverseIndex : subgraph id {} was never assigned", id);
                Err(GraphEmbedError::InvariantViolation(format!("subgraph id {} not in reverse index", id)))
            }
        }
    }

    ///
    pub fn len(&self) -> usize { self.keys.len() }

    ///
    pub fn is_empty(&self) -> bool { self.keys.is_empty() }

    // ids are never reassigned
    fn insert(&mut self, id : SubgraphId, key : SubgraphKey) {
        let already = self.keys.insert(id, key);
        assert!(already.is_none());
    }
} // end of impl ReverseIndex



/// How initial subgraph embeddings are drawn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InitMode {
    /// each instance gets independent uniform values in \[-1, 1\]
    Independent,
    /// uniform values in \[-1, 1\] drawn from a generator seeded by the canonical string,
    /// so instances with the same canonical string start with the same vector.
    /// Graphs with the same structure then share their starting subgraph vectors, which is what brings
    /// identical graphs close together. With [InitMode::Independent] this closeness is not guaranteed.
    Canonical,
}


/// Draws initial embeddings of subgraph instances.
pub struct EmbeddingSampler {
    dimension : usize,
    mode : InitMode,
    /// used to build canonical string hasher
    hash_state : ahash::RandomState,
    rng : Xoshiro256PlusPlus,
    uniform : Uniform<f64>,
} // end of struct EmbeddingSampler


impl EmbeddingSampler {
    pub fn new(dimension : usize, mode : InitMode, seed : u64) -> Self {
        let hash_state = ahash::RandomState::with_seeds(seed, seed.rotate_left(32), 0x243f_6a88_85a3_08d3, 0x1319_8a2e_0370_7344);
        EmbeddingSampler{dimension, mode, hash_state, rng : Xoshiro256PlusPlus::seed_from_u64(seed), uniform : Uniform::new_inclusive(-1., 1.)}
    }

    ///
    pub fn get_dimension(&self) -> usize { self.dimension }

    /// a new embedding vector for a subgraph with string canonical
    pub fn draw(&mut self, canonical : &str) -> Array1<f64> {
        match self.mode {
            InitMode::Independent => {
                let dimension = self.dimension;
                Array1::from_shape_fn(dimension, |_| self.uniform.sample(&mut self.rng))
            },
            InitMode::Canonical => {
                let mut hasher = self.hash_state.build_hasher();
                hasher.write(canonical.as_bytes());
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(hasher.finish());
                let uniform = &self.uniform;
                Array1::from_shape_fn(self.dimension, |_| uniform.sample(&mut rng))
            },
        }
    } // end of draw
} // end of impl EmbeddingSampler



/// The table of all fingerprinted subgraph instances of a corpus, with the id counter and the reverse index.
pub struct SubgraphTable {
    dimension : usize,
    counter : SubgraphIdCounter,
    instances : HashMap<SubgraphKey, SubgraphInstance, ahash::RandomState>,
    reverse : ReverseIndex,
} // end of struct SubgraphTable


impl SubgraphTable {
    /// an empty table for embeddings of size dimension
    pub fn new(dimension : usize) -> Self {
        SubgraphTable{dimension, counter : SubgraphIdCounter::new(), instances : HashMap::default(), reverse : ReverseIndex::default()}
    }

    /// dimension of subgraph embeddings
    pub fn get_dimension(&self) -> usize { self.dimension }

    /// number of subgraph instances
    pub fn len(&self) -> usize { self.instances.len() }

    ///
    pub fn is_empty(&self) -> bool { self.instances.is_empty() }

    ///
    pub fn get_reverse_index(&self) -> &ReverseIndex { &self.reverse }

    ///
    pub fn get(&self, key : &SubgraphKey) -> Option<&SubgraphInstance> {
        self.instances.get(key)
    }

    /// returns id of key, an error if key was never fingerprinted
    pub fn get_id(&self, key : &SubgraphKey) -> Result<SubgraphId> {
        match self.instances.get(key) {
            Some(instance) => Ok(instance.id),
            None => {
                log::error!("SubgraphTable : no subgraph for {:?}", key);
                Err(GraphEmbedError::InvariantViolation(format!("no subgraph fingerprinted for graph {} vertex {} degree {}", key.graph, key.vertex, key.degree)))
            }
        }
    }

    /// get instance from its id, going through the reverse index
    pub fn get_by_id(&self, id : SubgraphId) -> Result<&SubgraphInstance> {
        let key = self.reverse.get(id)?;
        self.instances.get(&key).ok_or_else(|| GraphEmbedError::InvariantViolation(format!("subgraph id {} has no instance for {:?}", id, key)))
    }

    /// overwrite embedding of subgraph id
    pub fn set_embedding(&mut self, id : SubgraphId, embedding : ArrayView1<f64>) -> Result<()> {
        let key = self.reverse.get(id)?;
        match self.instances.get_mut(&key) {
            Some(instance) => {
                assert_eq!(embedding.len(), self.dimension);
                instance.embedding.assign(&embedding);
                Ok(())
            },
            None => Err(GraphEmbedError::InvariantViolation(format!("subgraph id {} has no instance for {:?}", id, key))),
        }
    } // end of set_embedding


    /// Returns the canonical string of the subgraph rooted at vertex with given degree.
    /// If the triple was not yet fingerprinted, its neighbourhood is fingerprinted recursively and the
    /// triple gets a new id and an embedding drawn by sampler.
    /// - graph_rank : rank of graph in the corpus
    pub fn fingerprint<G : GraphView>(&mut self, graph : &G, graph_rank : u32, vertex : u32, degree : u16, sampler : &mut EmbeddingSampler) -> Result<String> {
        let key = SubgraphKey::new(graph_rank, vertex, degree);
        if let Some(instance) = self.instances.get(&key) {
            return Ok(instance.canonical.clone());
        }
        let node = match graph.vertex(vertex as usize) {
            Some(node) => node,
            None => {
                log::error!("fingerprint : graph {} has no vertex {}", graph_rank, vertex);
                return Err(GraphEmbedError::DegenerateInput(format!("graph {} has no vertex {} (degree {})", graph_rank, vertex, degree)));
            }
        };
        let canonical = if degree == 0 {
            node.get_label().to_string()
        }
        else {
            let mut neighbour_strings = BTreeSet::<String>::new();
            for neighbour in graph.out_neighbours(vertex as usize) {
                neighbour_strings.insert(self.fingerprint(graph, graph_rank, neighbour as u32, degree - 1, sampler)?);
            }
            let mut canonical = self.fingerprint(graph, graph_rank, vertex, degree - 1, sampler)?;
            for s in &neighbour_strings {
                canonical.push_str(s);
            }
            canonical
        };
        //
        let id = self.counter.next_id();
        log::trace!("fingerprint {:?} id {} : {}", key, id, canonical);
        let embedding = sampler.draw(&canonical);
        self.instances.insert(key, SubgraphInstance{id, canonical : canonical.clone(), embedding});
        self.reverse.insert(id, key);
        //
        Ok(canonical)
    } // end of fingerprint


    /// ids of all instances of a graph, by vertex number then degree.
    pub fn get_graph_instances<G : GraphView>(&self, graph : &G, graph_rank : u32, max_degree : u16) -> Result<Vec<SubgraphId>> {
        let live = graph.live_vertices();
        let mut ids = Vec::<SubgraphId>::with_capacity(live.len() * (max_degree as usize + 1));
        for vertex in live {
            for degree in 0..=max_degree {
                ids.push(self.get_id(&SubgraphKey::new(graph_rank, vertex as u32, degree))?);
            }
        }
        Ok(ids)
    } // end of get_graph_instances

} // end of impl SubgraphTable



/// Fingerprints every live vertex of every graph at every degree from 0 to max_degree.
pub fn fingerprint_corpus<G : GraphView>(graphs : &[G], max_degree : u16, sampler : &mut EmbeddingSampler) -> Result<SubgraphTable> {
    let mut table = SubgraphTable::new(sampler.get_dimension());
    for (rank, graph) in graphs.iter().enumerate() {
        for vertex in graph.live_vertices() {
            for degree in 0..=max_degree {
                table.fingerprint(graph, rank as u32, vertex as u32, degree, sampler)?;
            }
        }
        log::debug!("fingerprint_corpus graph {} done, nb subgraphs : {}", rank, table.len());
    }
    Ok(table)
} // end of fingerprint_corpus



//=====================================================================================

#[cfg(test)]
mod tests {

    use super::*;

    use crate::graph::{labeled_graph_from, LabeledGraph};

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }


    fn fingerprint_all(graphs : &[LabeledGraph], max_degree : u16) -> SubgraphTable {
        let mut sampler = EmbeddingSampler::new(4, InitMode::Independent, 127);
        fingerprint_corpus(graphs, max_degree, &mut sampler).unwrap()
    }


    #[test]
    fn test_fingerprint_strings() {
        log_init_test();
        // 0 -> 1, 0 -> 2, 1 -> 2
        let graph = labeled_graph_from(0, &[1, 2, 3], &[(0, 1), (0, 2), (1, 2)], false).unwrap();
        let table = fingerprint_all(&[graph], 2);
        let canonical = |v, d| table.get(&SubgraphKey::new(0, v, d)).unwrap().get_canonical().to_string();
        assert_eq!(canonical(0, 0), "1");
        assert_eq!(canonical(0, 1), "123");
        assert_eq!(canonical(1, 1), "23");
        assert_eq!(canonical(0, 2), "123233");
        // vertex 2 has no outgoing edge, its string does not grow
        assert_eq!(canonical(2, 0), "3");
        assert_eq!(canonical(2, 1), "3");
        assert_eq!(canonical(2, 2), "3");
        assert_eq!(table.len(), 9);
    } // end of test_fingerprint_strings


    #[test]
    fn test_fingerprint_memoization() {
        log_init_test();
        //
        let graph = labeled_graph_from(0, &[1, 2, 3], &[(0, 1), (1, 2), (2, 0)], false).unwrap();
        let mut sampler = EmbeddingSampler::new(4, InitMode::Independent, 127);
        let mut table = SubgraphTable::new(4);
        let first = table.fingerprint(&graph, 0, 0, 2, &mut sampler).unwrap();
        let nb_allocated = table.counter.get_nb_allocated();
        let key = SubgraphKey::new(0, 0, 2);
        let id = table.get_id(&key).unwrap();
        let embedding = table.get(&key).unwrap().get_embedding().to_owned();
        for _ in 0..3 {
            let again = table.fingerprint(&graph, 0, 0, 2, &mut sampler).unwrap();
            assert_eq!(again, first);
        }
        assert_eq!(table.counter.get_nb_allocated(), nb_allocated);
        assert_eq!(table.get_id(&key).unwrap(), id);
        assert_eq!(table.get(&key).unwrap().get_embedding(), embedding.view());
    } // end of test_fingerprint_memoization


    #[test]
    fn test_fingerprint_neighbour_order_invariance() {
        log_init_test();
        // same structure, vertex 1 and 2 swapped and edges inserted in other order
        let g1 = labeled_graph_from(0, &[1, 2, 3, 4], &[(0, 1), (0, 2), (1, 3), (2, 3), (0, 3)], false).unwrap();
        let g2 = labeled_graph_from(1, &[1, 3, 2, 4], &[(0, 3), (2, 3), (0, 2), (0, 1), (1, 3), (0, 2)], false).unwrap();
        let table = fingerprint_all(&[g1, g2], 3);
        for degree in 0..=3 {
            let s1 = table.get(&SubgraphKey::new(0, 0, degree)).unwrap();
            let s2 = table.get(&SubgraphKey::new(1, 0, degree)).unwrap();
            assert_eq!(s1.get_canonical(), s2.get_canonical());
            assert_ne!(s1.get_id(), s2.get_id());
        }
    } // end of test_fingerprint_neighbour_order_invariance


    #[test]
    fn test_duplicated_neighbour_strings() {
        log_init_test();
        // two neighbours with same label contribute once
        let graph = labeled_graph_from(0, &[1, 2, 2], &[(0, 1), (0, 2)], false).unwrap();
        let table = fingerprint_all(&[graph], 1);
        assert_eq!(table.get(&SubgraphKey::new(0, 0, 1)).unwrap().get_canonical(), "12");
    } // end of test_duplicated_neighbour_strings


    #[test]
    fn test_id_monotonicity() {
        log_init_test();
        //
        let g1 = labeled_graph_from(0, &[1, 2, 3], &[(0, 1), (1, 2), (2, 0)], false).unwrap();
        let g2 = labeled_graph_from(1, &[4, 5], &[(0, 1)], false).unwrap();
        let max_degree = 2;
        let graphs = [g1, g2];
        let table = fingerprint_all(&graphs, max_degree);
        let nb_instances = 3 * 3 + 2 * 3;
        assert_eq!(table.len(), nb_instances);
        assert_eq!(table.get_reverse_index().len(), nb_instances);
        // ids are exactly 0..nb_instances, each routed back to its key
        for id in 0..nb_instances {
            let key = table.get_reverse_index().get(id).unwrap();
            assert_eq!(table.get_id(&key).unwrap(), id);
        }
        assert!(table.get_reverse_index().get(nb_instances).is_err());
        // graphs are processed one after the other
        let ids_0 = table.get_graph_instances(&graphs[0], 0, max_degree).unwrap();
        let ids_1 = table.get_graph_instances(&graphs[1], 1, max_degree).unwrap();
        assert!(ids_0.iter().max().unwrap() < ids_1.iter().min().unwrap());
        // an instance is discovered after the instances it is built from
        for (rank, graph) in graphs.iter().enumerate() {
            for vertex in graph.live_vertices() {
                for degree in 1..=max_degree {
                    let id = table.get_id(&SubgraphKey::new(rank as u32, vertex as u32, degree)).unwrap();
                    let previous = table.get_id(&SubgraphKey::new(rank as u32, vertex as u32, degree - 1)).unwrap();
                    assert!(previous < id);
                    for neighbour in graph.out_neighbours(vertex) {
                        let nid = table.get_id(&SubgraphKey::new(rank as u32, neighbour as u32, degree - 1)).unwrap();
                        assert!(nid < id);
                    }
                }
            }
        }
    } // end of test_id_monotonicity


    #[test]
    fn test_embedding_init() {
        log_init_test();
        //
        let g1 = labeled_graph_from(0, &[5, 7], &[(0, 1)], false).unwrap();
        let g2 = labeled_graph_from(1, &[5, 7], &[(0, 1)], false).unwrap();
        let graphs = [g1, g2];
        let mut sampler = EmbeddingSampler::new(6, InitMode::Canonical, 3);
        let table = fingerprint_corpus(&graphs, 1, &mut sampler).unwrap();
        for vertex in 0..2 {
            let e1 = table.get(&SubgraphKey::new(0, vertex, 1)).unwrap();
            let e2 = table.get(&SubgraphKey::new(1, vertex, 1)).unwrap();
            assert_eq!(e1.get_embedding(), e2.get_embedding());
            assert!(e1.get_embedding().iter().all(|x| *x >= -1. && *x <= 1.));
        }
        //
        let mut sampler = EmbeddingSampler::new(6, InitMode::Independent, 3);
        let table = fingerprint_corpus(&graphs, 1, &mut sampler).unwrap();
        let e1 = table.get(&SubgraphKey::new(0, 0, 1)).unwrap();
        let e2 = table.get(&SubgraphKey::new(1, 0, 1)).unwrap();
        assert_eq!(e1.get_canonical(), e2.get_canonical());
        assert_ne!(e1.get_embedding(), e2.get_embedding());
    } // end of test_embedding_init


    #[test]
    fn test_missing_vertex() {
        log_init_test();
        //
        let graph = labeled_graph_from(0, &[5, 7], &[(0, 1)], false).unwrap();
        let mut sampler = EmbeddingSampler::new(2, InitMode::Independent, 3);
        let mut table = SubgraphTable::new(2);
        let res = table.fingerprint(&graph, 0, 4, 1, &mut sampler);
        assert!(matches!(res, Err(GraphEmbedError::DegenerateInput(_))));
    } // end of test_missing_vertex

} // end of mod tests
