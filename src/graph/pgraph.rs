//! This module describes vertices of our labelled graphs and the [GraphView] capability
//! the fingerprinting and training stages work on.
//!
//! A vertex is identified by its number, which is the index of its slot in a petgraph StableGraph.
//! The node weight of the StableGraph is the (discrete) label of the vertex.
//! Edges carry no data, they can be directed or not (petgraph EdgeType).
//! In the undirected case outgoing neighbours are all the neighbours of a vertex.

use indexmap::IndexSet;

use petgraph::graph::IndexType;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::NodeIndexable;
use petgraph::{Directed, Direction, EdgeType};

use crate::error::{GraphEmbedError, Result};

/// discrete label of a vertex
pub type Label = u32;

/// The graph container we use: vertex labels as node weights, no edge data, directed edges.
pub type LabeledGraph = StableGraph<Label, (), Directed, u32>;

/// A vertex: its number (slot index in its graph) and its label.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vertex {
    number : u32,
    label : Label,
}

impl Vertex {
    pub fn new(number : u32, label : Label) -> Self {
        Vertex{number, label}
    }

    /// slot number of vertex in its graph
    pub fn get_number(&self) -> u32 { self.number }

    ///
    pub fn get_label(&self) -> Label { self.label }
} // end of impl Vertex



/// Read only capability over a graph.
/// Vertex numbers are in 0..vertex_slot_count(), some slots may be empty.
pub trait GraphView {
    /// number of vertex slots (live or not)
    fn vertex_slot_count(&self) -> usize;
    /// the vertex in slot number, None if slot is empty or out of range
    fn vertex(&self, number : usize) -> Option<Vertex>;
    /// true if there is an edge from vertex from to vertex to
    fn has_edge(&self, from : usize, to : usize) -> bool;

    /// numbers of vertices reached by an edge going out of vertex number.
    /// Each neighbour is returned once, in increasing order, even with multi edges.
    fn out_neighbours(&self, number : usize) -> Vec<usize> {
        (0..self.vertex_slot_count()).filter(|i| self.vertex(*i).is_some() && self.has_edge(number, *i)).collect()
    }

    /// numbers of non empty slots, in increasing order
    fn live_vertices(&self) -> Vec<usize> {
        (0..self.vertex_slot_count()).filter(|i| self.vertex(*i).is_some()).collect()
    }

    /// number of non empty slots
    fn get_nb_vertices(&self) -> usize {
        self.live_vertices().len()
    }
} // end of trait GraphView



impl <Ty, Ix> GraphView for StableGraph<Label, (), Ty, Ix>
    where   Ty : EdgeType,
            Ix : IndexType {

    fn vertex_slot_count(&self) -> usize {
        self.node_bound()
    }

    fn vertex(&self, number : usize) -> Option<Vertex> {
        if number >= self.node_bound() {
            return None;
        }
        self.node_weight(NodeIndex::new(number)).map(|label| Vertex::new(number as u32, *label))
    }

    fn has_edge(&self, from : usize, to : usize) -> bool {
        if self.vertex(from).is_none() || self.vertex(to).is_none() {
            return false;
        }
        self.contains_edge(NodeIndex::new(from), NodeIndex::new(to))
    }

    // petgraph gives neighbours once per edge and in reverse insertion order, so we deduplicate and sort
    fn out_neighbours(&self, number : usize) -> Vec<usize> {
        if self.vertex(number).is_none() {
            return Vec::new();
        }
        let neighbours : IndexSet<usize> = self.neighbors_directed(NodeIndex::new(number), Direction::Outgoing).map(|n| n.index()).collect();
        let mut neighbours : Vec<usize> = neighbours.into_iter().collect();
        neighbours.sort_unstable();
        neighbours
    }

    fn live_vertices(&self) -> Vec<usize> {
        let mut live : Vec<usize> = self.node_indices().map(|n| n.index()).collect();
        live.sort_unstable();
        live
    }

    fn get_nb_vertices(&self) -> usize {
        self.node_count()
    }
} // end of impl GraphView for StableGraph



/// Builds a graph from labels (vertex i gets labels\[i\]) and a list of edges.
/// Duplicated edges are inserted once.
/// If symetric is true each edge is inserted in both directions.
/// - rank : rank of graph in corpus, only used in error messages
pub fn labeled_graph_from(rank : usize, labels : &[Label], edges : &[(u32, u32)], symetric : bool) -> Result<LabeledGraph> {
    let mut graph = LabeledGraph::with_capacity(labels.len(), edges.len());
    for label in labels {
        graph.add_node(*label);
    }
    let nb_nodes = labels.len() as u32;
    for (from, to) in edges {
        if *from >= nb_nodes || *to >= nb_nodes {
            log::error!("graph {} : cannot add edge ({}, {}), nb vertices {}", rank, from, to, nb_nodes);
            return Err(GraphEmbedError::InvalidEdge{graph : rank, from : *from, to : *to});
        }
        graph.update_edge(NodeIndex::new(*from as usize), NodeIndex::new(*to as usize), ());
        if symetric && from != to {
            graph.update_edge(NodeIndex::new(*to as usize), NodeIndex::new(*from as usize), ());
        }
    }
    log::trace!("graph {} : nb vertices {}, nb edges {}", rank, graph.node_count(), graph.edge_count());
    Ok(graph)
} // end of labeled_graph_from



//=====================================================================================

// end of mod tests
