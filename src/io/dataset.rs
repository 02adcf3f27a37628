//! Loads a corpus of labelled graphs from a directory of json files.
//!
//! Each file `<n>.json` describes graph number n:
//! ```text
//! {"edges": [[0, 1], [1, 2]], "features": {"0": "5", "1": "7", "2": 3}}
//! ```
//! Vertex i gets label features\["i"\], given as a string or as an integer.
//! Duplicated edges are inserted once.

use anyhow::anyhow;

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use indexmap::IndexSet;

use crate::error::{GraphEmbedError, Result};
use crate::graph::{labeled_graph_from, Label, LabeledGraph};


/// a vertex label as found in dataset files
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureValue {
    Number(Label),
    Text(String),
}


#[derive(Debug, Deserialize)]
struct JsonGraph {
    #[serde(default)]
    edges : Vec<(u32, u32)>,
    features : HashMap<String, FeatureValue>,
}


// converts a decoded document in a graph
fn to_graph(rank : usize, document : JsonGraph, symetric : bool) -> Result<LabeledGraph> {
    let nb_vertices = document.features.len();
    let mut labels = Vec::<Label>::with_capacity(nb_vertices);
    for i in 0..nb_vertices {
        let label = match document.features.get(&i.to_string()) {
            Some(FeatureValue::Number(label)) => *label,
            Some(FeatureValue::Text(s)) => match s.trim().parse::<Label>() {
                Ok(label) => label,
                Err(_) => {
                    log::error!("graph {} vertex {} : label {:?} is not an integer", rank, i, s);
                    return Err(GraphEmbedError::DegenerateInput(format!("graph {} vertex {} : label {:?} is not an integer", rank, i, s)));
                }
            },
            None => {
                log::error!("graph {} : no feature for vertex {}", rank, i);
                return Err(GraphEmbedError::DegenerateInput(format!("graph {} : features do not cover vertex {}", rank, i)));
            }
        };
        labels.push(label);
    }
    labeled_graph_from(rank, &labels, &document.edges, symetric)
} // end of to_graph


/// decodes one graph from a json string.
/// - rank : rank of graph in corpus, used in error messages
pub fn graph_from_json_str(rank : usize, json : &str, symetric : bool) -> Result<LabeledGraph> {
    let document : JsonGraph = serde_json::from_str(json)?;
    to_graph(rank, document, symetric)
}


/// decodes one graph from a json file.
pub fn graph_from_json_file(rank : usize, path : &Path, symetric : bool) -> Result<LabeledGraph> {
    let file = OpenOptions::new().read(true).open(path)?;
    let document : JsonGraph = serde_json::from_reader(BufReader::new(file))?;
    to_graph(rank, document, symetric)
}



/// Loads all `*.json` files of directory dir. The stem of each file must be an integer, the graph number.
/// Returns graphs sorted by increasing graph number, and the indexation of graph numbers
/// (the rank of a graph in the returned vector is the index of its number in the IndexSet).
/// If symetric is true each edge is inserted in both directions.
pub fn load_json_dir(dir : &Path, symetric : bool) -> anyhow::Result<(Vec<LabeledGraph>, IndexSet<usize>)> {
    log::info!("load_json_dir : {:?}, symetric : {}", dir, symetric);
    //
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("load_json_dir could not read directory {:?}", dir);
            return Err(anyhow!("could not read directory {} : {}", dir.display(), e));
        }
    };
    let mut files = Vec::<(usize, PathBuf)>::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
            log::debug!("load_json_dir skipping {:?}", path);
            continue;
        }
        let number = path.file_stem().and_then(|s| s.to_str()).and_then(|s| s.parse::<usize>().ok());
        match number {
            Some(number) => files.push((number, path)),
            None => {
                log::error!("load_json_dir : file stem of {:?} is not a graph number", path);
                return Err(anyhow!("file {} : stem is not a graph number", path.display()));
            }
        }
    }
    files.sort_unstable_by_key(|f| f.0);
    //
    let mut graphs = Vec::<LabeledGraph>::with_capacity(files.len());
    let mut indexation = IndexSet::<usize>::with_capacity(files.len());
    for (rank, (number, path)) in files.iter().enumerate() {
        let graph = graph_from_json_file(rank, path, symetric).map_err(|e| anyhow!("file {} : {}", path.display(), e))?;
        log::trace!("graph number {} nb vertices {} nb edges {}", number, graph.node_count(), graph.edge_count());
        graphs.push(graph);
        indexation.insert(*number);
    }
    log::info!("load_json_dir loaded {} graphs", graphs.len());
    Ok((graphs, indexation))
} // end of load_json_dir



//=====================================================================================

#[cfg(test)]
mod tests {

    use super::*;

    use crate::graph::GraphView;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }


    #[test]
    fn test_json_graph() {
        log_init_test();
        //
        let json = r#"{"edges": [[0, 1], [1, 2], [0, 1]], "features": {"0": "5", "1": 7, "2": " 9"}}"#;
        let graph = graph_from_json_str(0, json, false).unwrap();
        assert_eq!(graph.get_nb_vertices(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.vertex(1).unwrap().get_label(), 7);
        assert_eq!(graph.vertex(2).unwrap().get_label(), 9);
        assert!(!graph.has_edge(1, 0));
        //
        let graph = graph_from_json_str(0, json, true).unwrap();
        assert!(graph.has_edge(1, 0));
        // edge to a missing vertex
        let json = r#"{"edges": [[0, 3]], "features": {"0": "5", "1": "7"}}"#;
        assert!(matches!(graph_from_json_str(3, json, false), Err(GraphEmbedError::InvalidEdge{graph : 3, from : 0, to : 3})));
        // features with a hole
        let json = r#"{"edges": [], "features": {"0": "5", "2": "7"}}"#;
        assert!(matches!(graph_from_json_str(0, json, false), Err(GraphEmbedError::DegenerateInput(_))));
        // not json
        assert!(matches!(graph_from_json_str(0, "{edges", false), Err(GraphEmbedError::Json(_))));
    } // end of test_json_graph


    #[test]
    fn test_load_dir() {
        log_init_test();
        //
        let dir = std::env::temp_dir().join(format!("graph2vec_load_dir_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("10.json"), r#"{"edges": [[0, 1]], "features": {"0": "1", "1": "2"}}"#).unwrap();
        std::fs::write(dir.join("2.json"), r#"{"edges": [[0, 1], [1, 2]], "features": {"0": "1", "1": "2", "2": "3"}}"#).unwrap();
        std::fs::write(dir.join("notes.txt"), "not a graph").unwrap();
        let (graphs, indexation) = load_json_dir(&dir, false).unwrap();
        assert_eq!(graphs.len(), 2);
        assert_eq!(indexation.get_index(0), Some(&2));
        assert_eq!(indexation.get_index_of(&10), Some(1));
        assert_eq!(graphs[0].get_nb_vertices(), 3);
        assert_eq!(graphs[1].get_nb_vertices(), 2);
        // a json file not named by a number
        std::fs::write(dir.join("abc.json"), r#"{"edges": [], "features": {}}"#).unwrap();
        assert!(load_json_dir(&dir, false).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    } // end of test_load_dir

} // end of mod tests
