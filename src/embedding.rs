//! Describes the embedded vectors.
//!
//! Embedded graph vectors are stored in an Array2\<F\>, each row corresponds to a graph of the corpus,
//! identified by its rank. The [Embedding] structure adds the association between the graph identifiers
//! of the dataset and the ranks.
//!
//! graph2vec vectors are compared with the cosine distance (see [crate::tools::cosine]).


use ndarray::{Array2, ArrayView1};
use indexmap::IndexSet;


/// to represent the distance in embedded space between 2 vectors
pub type Distance<F> = fn(&[F], &[F]) -> f64;


/// The Embedded trait. It defines the interface satisfied by embedded data.
/// In our implementations the embedded data are stored in Array2 and embedded graphs
/// are identified by their rank.
/// F is the type contained in embedded vectors
pub trait EmbeddedT<F> {
    /// get dimension of vectors of the Embedded
    fn get_dimension(&self) -> usize;
    /// get distance in embedded space between graphs identified by their rank
    fn get_rank_distance(&self, rank1 : usize, rank2 : usize) -> f64;
    /// the trait provides a function distance between embedded items.
    fn get_vec_distance(&self, from : &[F], to : &[F]) -> f64;
    /// get number of graphs
    fn get_nb_graphs(&self) -> usize;
    /// get embedding of graph of rank rank
    fn get_embedded_graph(&self, rank : usize) -> ArrayView1<F>;
    /// Returns the distance function f (a pointer to) used for computing distances in the embedding.
    fn get_distance(&self) -> Distance<F>;
} // end of trait



/// Embedded data without information on the graph indexation.
/// To get also the indexation information use the [Embedding] structure
pub struct Embedded<F> {
    /// array (n,d) with n number of graphs, d dimension of Embedded
    data : Array2<F>,
    /// distance between vectors in embedded space. helps to implement trait [EmbeddedT\<F\>]
    distance : Distance<F>,
} // end of Embedded



impl<F> Embedded<F> {
    // fills embedded vectors with the appropriate distance function
    pub fn new(data : Array2<F>, distance : Distance<F>) -> Self {
        Embedded{data, distance}
    }

    /// get the vectors, one row per graph
    pub fn get_embedded(&self) -> &Array2<F> {
        &self.data
    }

    /// get reference to distance function
    pub fn get_distance_ref(&self) -> &Distance<F> {
        &self.distance
    }
}  // end of impl Embedded



impl<F : Clone> EmbeddedT<F> for Embedded<F> {

    /// get dimension of Embedded. (row size of Array)
    fn get_dimension(&self) -> usize {
        self.data.ncols()
    }

    /// computes the distance in embedded space between 2 vectors
    /// dimensions must be equal to Embedded dimension
    fn get_vec_distance(&self, data1 : &[F], data2 : &[F]) -> f64 {
        assert_eq!(data1.len(), self.get_dimension());
        (self.distance)(data1, data2)
    }

    /// get distance between graphs identified by their rank
    fn get_rank_distance(&self, rank1 : usize, rank2 : usize) -> f64 {
        // rows of a standard layout Array2 are contiguous, to_vec covers other layouts
        let row1 = self.data.row(rank1);
        let row2 = self.data.row(rank2);
        match (row1.as_slice(), row2.as_slice()) {
            (Some(s1), Some(s2)) => (self.distance)(s1, s2),
            _ => (self.distance)(&row1.to_vec(), &row2.to_vec()),
        }
    }

    /// return number of graphs
    fn get_nb_graphs(&self) -> usize {
        self.data.nrows()
    }

    fn get_embedded_graph(&self, rank : usize) -> ArrayView1<F> {
        self.data.row(rank)
    }

    /// get distance function
    fn get_distance(&self) -> Distance<F> {
        self.distance
    }
} // end impl EmbeddedT<F>


//====================================================================================


/// The trait EmbedderT is something whose method embed has as output something satisfying the trait EmbeddedT\<F\>.
/// F is the type contained in embedded vectors, f64 for graph2vec.
pub trait EmbedderT<F> {
    type Output : EmbeddedT<F>;
    ///
    fn embed(&mut self) -> Result<Self::Output, anyhow::Error>;
} // end of trait EmbedderT<F>

//==============================================================================

/// The structure collecting the result of the embedding process
///
/// - F the embedded vectors contains values of type F
///
/// - GraphId is the type representing graphs in the dataset (most often an usize, the file number). It must
///     implement Hash and Eq to be indexed.
///
/// - indexation : an IndexSet storing graph identifiers and associating each to a rank in the Array of embedded graphs.
///                      given a graph id we get its rank using IndexSet::get_index_of
///                      given a rank we get the graph id by using IndexSet::get_index.
///
/// - embedded : the embedded data of type EmbeddedData.
pub struct Embedding<F, GraphId : std::hash::Hash + std::cmp::Eq, EmbeddedData : EmbeddedT<F>> {
    /// association of graph id to a rank
    indexation : IndexSet<GraphId>,
    ///
    embedded : EmbeddedData,
    ///
    mark : std::marker::PhantomData<F>,
}  // end of Embedding



impl <GraphId, EmbeddedData, F> Embedding<F, GraphId, EmbeddedData> where EmbeddedData : EmbeddedT<F>,
         GraphId : std::hash::Hash + std::cmp::Eq {
    /// Runs embedder and associates its result to indexation.
    pub fn new(indexation : IndexSet<GraphId>, embedder : &mut dyn EmbedderT<F, Output = EmbeddedData>) -> Result<Self, anyhow::Error> {
        let embedded = match embedder.embed() {
            Ok(embedded) => embedded,
            Err(e) => {
                log::error!("embedding failed : {}", e);
                return Err(e);
            }
        };
        if embedded.get_nb_graphs() != indexation.len() {
            log::error!("embedding has {} vectors, indexation has {} graphs", embedded.get_nb_graphs(), indexation.len());
            return Err(anyhow::anyhow!("indexation size {} does not match number of embedded graphs {}", indexation.len(), embedded.get_nb_graphs()));
        }
        Ok(Embedding{indexation, embedded, mark : std::marker::PhantomData})
    } // end of new


    /// assemble already embedded data and its indexation (used after a reload)
    pub fn from_parts(indexation : IndexSet<GraphId>, embedded : EmbeddedData) -> Result<Self, anyhow::Error> {
        if embedded.get_nb_graphs() != indexation.len() {
            return Err(anyhow::anyhow!("indexation size {} does not match number of embedded graphs {}", indexation.len(), embedded.get_nb_graphs()));
        }
        Ok(Embedding{indexation, embedded, mark : std::marker::PhantomData})
    }


    /// to retrieve the indexation
    pub fn get_graph_indexation(&self) -> &IndexSet<GraphId> {
        &self.indexation
    }

    /// retrieves the embedded data
    pub fn get_embedded_data(&self) -> &EmbeddedData {
        &self.embedded
    }


    /// get distance between graphs, given their id. None if one of them is unknown.
    pub fn get_graph_distance(&self, graph1 : GraphId, graph2 : GraphId) -> Option<f64> {
        let rank1 = self.indexation.get_index_of(&graph1)?;
        let rank2 = self.indexation.get_index_of(&graph2)?;
        Some(self.embedded.get_rank_distance(rank1, rank2))
    }


    /// get rank of a graph_id.
    pub fn get_graph_rank(&self, graph_id : GraphId) -> Option<usize> {
        self.indexation.get_index_of(&graph_id)
    }

    /// get graph_id given its rank in indexation (and matrix representation)
    pub fn get_graph_id(&self, rank : usize) -> Option<&GraphId> {
        self.indexation.get_index(rank)
    }

 } // end of impl Embedding



//=====================================================================================

#[cfg(test)]
mod tests {

    use super::*;

    use ndarray::array;

    use crate::tools::cosine::cosine_distance;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }


    struct FixedEmbedder {
        data : Array2<f64>,
    }

    impl EmbedderT<f64> for FixedEmbedder {
        type Output = Embedded<f64>;
        fn embed(&mut self) -> Result<Self::Output, anyhow::Error> {
            Ok(Embedded::new(self.data.clone(), cosine_distance))
        }
    }


    #[test]
    fn test_embedding_indexation() {
        log_init_test();
        //
        let mut embedder = FixedEmbedder{data : array![[1., 0.], [0., 1.], [2., 0.]]};
        let indexation : IndexSet<usize> = [10, 3, 7].into_iter().collect();
        let embedding = Embedding::<f64, usize, Embedded<f64>>::new(indexation, &mut embedder).unwrap();
        assert_eq!(embedding.get_graph_rank(3), Some(1));
        assert_eq!(embedding.get_graph_id(2), Some(&7));
        assert!(embedding.get_graph_distance(10, 7).unwrap().abs() < 1.0e-12);
        assert!((embedding.get_graph_distance(10, 3).unwrap() - 1.).abs() < 1.0e-12);
        assert!(embedding.get_graph_distance(10, 4).is_none());
        assert_eq!(embedding.get_embedded_data().get_dimension(), 2);
        //
        let indexation : IndexSet<usize> = [1, 2].into_iter().collect();
        assert!(Embedding::<f64, usize, Embedded<f64>>::new(indexation, &mut embedder).is_err());
    } // end of test_embedding_indexation

} // end of mod tests
