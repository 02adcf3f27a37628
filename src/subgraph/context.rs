//! Radial context of subgraph instances (as in subgraph2vec).
//!
//! The context of the subgraph rooted at v with degree d is the multiset of ids of subgraphs rooted at
//! each vertex u != v with an edge v -> u, at degrees d-1, d, d+1 (clipped to \[0, max_degree\]).
//! Only outgoing edges are followed so the relation is not symetric for directed graphs.
//!
//! A vertex with no outgoing neighbour borrows the neighbourhood of a vertex of its graph drawn at random.
//! This avoids instances with no training pair, it does not pretend to be structurally meaningful.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::{GraphEmbedError, Result};
use crate::graph::GraphView;

use super::fingerprint::{SubgraphId, SubgraphKey, SubgraphTable};


/// For each subgraph id, the ids in its radial context. Duplicates are kept.
#[derive(Debug, Default)]
pub struct RadialContext {
    contexts : HashMap<SubgraphId, Vec<SubgraphId>, ahash::RandomState>,
    /// instances whose context was borrowed from a random vertex
    substitutes : HashSet<SubgraphId, ahash::RandomState>,
} // end of struct RadialContext


impl RadialContext {
    /// context of id. Empty if id has no context.
    pub fn get(&self, id : SubgraphId) -> &[SubgraphId] {
        match self.contexts.get(&id) {
            Some(context) => context.as_slice(),
            None => &[],
        }
    }

    /// true if context of id was borrowed from a random vertex
    pub fn is_substitute(&self, id : SubgraphId) -> bool {
        self.substitutes.contains(&id)
    }

    /// number of subgraphs having a context
    pub fn len(&self) -> usize { self.contexts.len() }

    ///
    pub fn is_empty(&self) -> bool { self.contexts.is_empty() }

    /// total number of (subgraph, context) pairs
    pub fn get_nb_pairs(&self) -> usize {
        self.contexts.values().map(|c| c.len()).sum()
    }

    pub(crate) fn push(&mut self, id : SubgraphId, context_id : SubgraphId) {
        self.contexts.entry(id).or_insert_with(Vec::new).push(context_id);
    }
} // end of impl RadialContext



// pushes in context of id the instances of vertex u at degrees in window around degree
fn push_window(context : &mut RadialContext, table : &SubgraphTable, id : SubgraphId, graph_rank : u32, u : u32, degree : u16, max_degree : u16) -> Result<()> {
    let low = degree.saturating_sub(1);
    let high = degree.saturating_add(1).min(max_degree);
    for delta in low..=high {
        let context_id = table.get_id(&SubgraphKey::new(graph_rank, u, delta))?;
        context.push(id, context_id);
    }
    Ok(())
} // end of push_window



/// Builds the radial context of every subgraph instance of the corpus.
/// The table must contain all (graph, vertex, degree) triples for degree in 0..=max_degree.
/// rng is used to draw substitute vertices.
pub fn build_radial_context<G : GraphView>(graphs : &[G], table : &SubgraphTable, max_degree : u16, rng : &mut Xoshiro256PlusPlus) -> Result<RadialContext> {
    let mut context = RadialContext::default();
    for (rank, graph) in graphs.iter().enumerate() {
        let graph_rank = rank as u32;
        let live = graph.live_vertices();
        for vertex in &live {
            let neighbours : Vec<usize> = graph.out_neighbours(*vertex).into_iter().filter(|u| u != vertex).collect();
            for degree in 0..=max_degree {
                let id = table.get_id(&SubgraphKey::new(graph_rank, *vertex as u32, degree))?;
                if !neighbours.is_empty() {
                    for u in &neighbours {
                        push_window(&mut context, table, id, graph_rank, *u as u32, degree, max_degree)?;
                    }
                }
                else {
                    // substitute a random other vertex of the graph
                    if live.len() < 2 {
                        log::error!("build_radial_context : graph {} vertex {} has no neighbour and no other vertex", rank, vertex);
                        return Err(GraphEmbedError::DegenerateInput(format!("graph {} has a single vertex ({}), no context can be built", rank, vertex)));
                    }
                    let mut j = rng.gen_range(0..live.len() - 1);
                    if live[j] >= *vertex {
                        j += 1;
                    }
                    log::trace!("graph {} vertex {} degree {} : substitute context from vertex {}", rank, vertex, degree, live[j]);
                    push_window(&mut context, table, id, graph_rank, live[j] as u32, degree, max_degree)?;
                    context.substitutes.insert(id);
                }
            }
        }
    }
    log::debug!("build_radial_context nb subgraphs : {}, nb pairs : {}, nb substitutes : {}", context.len(), context.get_nb_pairs(), context.substitutes.len());
    Ok(context)
} // end of build_radial_context



//=====================================================================================

#[cfg(test)]
mod tests {

    use super::*;

    use rand_xoshiro::rand_core::SeedableRng;

    use crate::graph::{labeled_graph_from, LabeledGraph};
    use crate::subgraph::fingerprint::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }


    fn context_of(graphs : &[LabeledGraph], max_degree : u16) -> (SubgraphTable, RadialContext) {
        let mut sampler = EmbeddingSampler::new(3, InitMode::Independent, 5);
        let table = fingerprint_corpus(graphs, max_degree, &mut sampler).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);
        let context = build_radial_context(graphs, &table, max_degree, &mut rng).unwrap();
        (table, context)
    }


    #[test]
    fn test_context_window() {
        log_init_test();
        // 0 -> 1, 0 -> 2, self loop on 1, 1 -> 2, 2 -> 0
        let graph = labeled_graph_from(0, &[1, 2, 3], &[(0, 1), (0, 2), (1, 1), (1, 2), (2, 0)], false).unwrap();
        let max_degree = 3;
        let graphs = [graph];
        let (table, context) = context_of(&graphs, max_degree);
        let id = |v, d| table.get_id(&SubgraphKey::new(0, v, d)).unwrap();
        // degree 0 : degrees 0 and 1 of vertex 1 and 2
        let mut c = context.get(id(0, 0)).to_vec();
        c.sort_unstable();
        let mut expected = vec![id(1, 0), id(1, 1), id(2, 0), id(2, 1)];
        expected.sort_unstable();
        assert_eq!(c, expected);
        // middle degree : 3 levels per neighbour
        assert_eq!(context.get(id(0, 2)).len(), 6);
        // top degree is clipped
        assert_eq!(context.get(id(0, 3)).len(), 4);
        // self loop excluded
        assert!(!context.get(id(1, 1)).contains(&id(1, 1)));
        assert_eq!(context.get(id(1, 1)).len(), 3);
        // every entry is within degree window of an out neighbour
        let graph = &graphs[0];
        for vertex in 0..3u32 {
            for degree in 0..=max_degree {
                let ctx_id = id(vertex, degree);
                assert!(!context.is_substitute(ctx_id));
                for c in context.get(ctx_id) {
                    let key = table.get_reverse_index().get(*c).unwrap();
                    assert!(key.vertex != vertex);
                    assert!(graph.has_edge(vertex as usize, key.vertex as usize));
                    assert!((key.degree as i32 - degree as i32).abs() <= 1);
                }
            }
        }
    } // end of test_context_window


    #[test]
    fn test_context_duplicates_kept() {
        log_init_test();
        // two neighbours give each their window, instances are distinct but a neighbour counted once
        let graph = labeled_graph_from(0, &[1, 2], &[(0, 1), (0, 1)], false).unwrap();
        let (table, context) = context_of(&[graph], 0);
        let id0 = table.get_id(&SubgraphKey::new(0, 0, 0)).unwrap();
        assert_eq!(context.get(id0).len(), 1);
        // a context is a multiset, pushing twice keeps both
        let mut ctx = RadialContext::default();
        ctx.push(0, 1);
        ctx.push(0, 1);
        assert_eq!(ctx.get(0), &[1, 1]);
        assert_eq!(ctx.get_nb_pairs(), 2);
    } // end of test_context_duplicates_kept


    #[test]
    fn test_context_substitute() {
        log_init_test();
        // vertex 2 has no outgoing edge, its context comes from vertex 0 or 1
        let graph = labeled_graph_from(0, &[1, 2, 3], &[(0, 1), (1, 2)], false).unwrap();
        let max_degree = 2;
        let (table, context) = context_of(&[graph], max_degree);
        for degree in 0..=max_degree {
            let id = table.get_id(&SubgraphKey::new(0, 2, degree)).unwrap();
            assert!(context.is_substitute(id));
            let ctx = context.get(id);
            assert!(!ctx.is_empty());
            let first = table.get_reverse_index().get(ctx[0]).unwrap();
            assert!(first.vertex != 2);
            for c in ctx {
                let key = table.get_reverse_index().get(*c).unwrap();
                assert_eq!(key.vertex, first.vertex);
                assert!((key.degree as i32 - degree as i32).abs() <= 1);
            }
        }
    } // end of test_context_substitute


    #[test]
    fn test_context_self_loop_only() {
        log_init_test();
        // the only edge of vertex 2 is a self loop, so it gets a substitute context
        let graph = labeled_graph_from(0, &[1, 2, 3], &[(0, 1), (1, 2), (2, 2)], false).unwrap();
        let max_degree = 2;
        let graphs = [graph];
        let (table, context) = context_of(&graphs, max_degree);
        for degree in 0..=max_degree {
            let id = table.get_id(&SubgraphKey::new(0, 2, degree)).unwrap();
            assert!(context.is_substitute(id));
            assert!(!context.get(id).is_empty());
            for c in context.get(id) {
                let key = table.get_reverse_index().get(*c).unwrap();
                assert!(key.vertex != 2);
            }
            // vertices with a real out neighbour are not substituted
            assert!(!context.is_substitute(table.get_id(&SubgraphKey::new(0, 0, degree)).unwrap()));
            assert!(!context.is_substitute(table.get_id(&SubgraphKey::new(0, 1, degree)).unwrap()));
        }
    } // end of test_context_self_loop_only


    #[test]
    fn test_single_vertex_graph_rejected() {
        log_init_test();
        //
        let graph = labeled_graph_from(0, &[1], &[], false).unwrap();
        let graphs = [graph];
        let mut sampler = EmbeddingSampler::new(3, InitMode::Independent, 5);
        let table = fingerprint_corpus(&graphs, 1, &mut sampler).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);
        let res = build_radial_context(&graphs, &table, 1, &mut rng);
        assert!(matches!(res, Err(GraphEmbedError::DegenerateInput(_))));
    } // end of test_single_vertex_graph_rejected

} // end of mod tests
