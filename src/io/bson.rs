//! module to do bson io for graph embedding results
//!
//!  Data are formatted in bson Documents, each value has a key.
//!
//!  The encoding is done in 3 parts:
//! 1. A header document with key "header". See struct [EmbeddedBsonHeader]
//! - a version index
//! - base type name (f64) encoded as a String. key is type_name.
//! - dimension of vectors
//! - number of vectors
//!
//! 2. The embedded vectors, one document per graph, each vector has as key the rank of the graph.
//!
//! 3. The graph indexation in a document : each graph id is encoded as a string providing a key
//!    associated to the graph rank as i64.

// Note : a Bson document must not be larger than 16Mb!
// So we need to have many Documents in the file dumped

use anyhow::anyhow;

use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use bson::{bson, Bson, Document};
use serde::{Deserialize, Serialize};

use indexmap::IndexSet;
use ndarray::{Array2, ArrayView1};

use crate::embedding::{EmbeddedT, Embedding};

use super::output::Output;

/// version of dump format
const BSON_VERSION : i64 = 1;


/// This structure defines the header of the bson document
#[derive(Debug, Serialize, Deserialize)]
pub struct EmbeddedBsonHeader {
    /// version of dump format
    pub version : i64,
    /// encodes type of vectors used in the embedding
    pub type_name : String,
    /// dimension of the embedding (length of vectors)
    pub dimension : i64,
    /// number of vectors.
    pub nbdata : i64,
} // end of EmbeddedBsonHeader



/// dump an embedding in bson format in file output.get_output_name().
/// The dump consists in a header document. Then each graph vector is dumped in its document (a bson document must be less than 16Mb)
/// The last document contains the indexation.
pub fn bson_dump<GraphId, EmbeddedData>(embedding : &Embedding<f64, GraphId, EmbeddedData>, output : &Output) -> Result<(), anyhow::Error>
    where   GraphId : std::hash::Hash + std::cmp::Eq + std::fmt::Display,
            EmbeddedData : EmbeddedT<f64> {
    //
    log::info!("entering bson_dump");
    //
    let path = Path::new(output.get_output_name());
    let file = match OpenOptions::new().write(true).create(true).truncate(true).open(path) {
        Ok(file) => file,
        Err(e) => {
            log::error!("bson_dump could not open file : {}", path.display());
            return Err(anyhow!("could not open file {} : {}", path.display(), e));
        }
    };
    let mut bufwriter = BufWriter::new(file);
    let embedded = embedding.get_embedded_data();
    let nbdata = embedded.get_nb_graphs();
    // dump header part
    let dim = embedded.get_dimension() as i64;
    let nbdata_i64 = nbdata as i64;
    let bson_header = bson!({
        "version": BSON_VERSION,
        "type_name": std::any::type_name::<f64>(),
        "dimension": dim,
        "nbdata": nbdata_i64
        }
    );
    let mut doc = Document::new();
    doc.insert("header", bson_header);
    if let Err(e) = doc.to_writer(&mut bufwriter) {
        log::error!("dump header bson in {} failed", path.display());
        return Err(anyhow!("dump of bson failed: {}", e));
    }
    // now loop on data vectors
    for i in 0..nbdata {
        let mut doc = Document::new();
        let data : Vec<Bson> = embedded.get_embedded_graph(i).iter().map(|x| Bson::Double(*x)).collect();
        doc.insert(i.to_string(), data);
        if let Err(e) = doc.to_writer(&mut bufwriter) {
            log::error!("bson dump error in graph {}", i);
            return Err(anyhow!("bson dump error for graph {} {}", i, e));
        }
    }
    // We dump indexation as a document with each key being graph id converted to a String
    let mut bson_indexation = Document::new();
    for (rank, graph_id) in embedding.get_graph_indexation().iter().enumerate() {
        bson_indexation.insert(graph_id.to_string(), rank as i64);
    }
    if let Err(e) = bson_indexation.to_writer(&mut bufwriter) {
        log::error!("dump of indexation in {} failed", path.display());
        return Err(anyhow!("dump of bson failed: {}", e));
    }
    bufwriter.flush()?;
    //
    log::info!("bson dump in file {} finished", path.display());
    Ok(())
} // end of bson_dump



/// The structure returned by bson_load.
pub struct EmbeddedBsonReload<GraphId> {
    /// one row per graph
    pub(crate) embedded : Array2<f64>,
    /// the indexation if found in the dump
    pub(crate) indexation : Option<IndexSet<GraphId>>,
} // end of EmbeddedBsonReload


impl<GraphId> EmbeddedBsonReload<GraphId> {
    /// returns embedded data.
    pub fn get_embedded(&self) -> &Array2<f64> {
        &self.embedded
    }

    /// returns graph indexation if present
    pub fn get_indexation(&self) -> Option<&IndexSet<GraphId>> {
        self.indexation.as_ref()
    }

    /// consumes the reload
    pub fn into_parts(self) -> (Array2<f64>, Option<IndexSet<GraphId>>) {
        (self.embedded, self.indexation)
    }
} // end of impl EmbeddedBsonReload



// reads next document of bufreader
fn read_document<R : std::io::Read>(bufreader : &mut R, path : &Path, what : &str) -> Result<Document, anyhow::Error> {
    match Document::from_reader(bufreader) {
        Ok(doc) => Ok(doc),
        Err(e) => {
            log::error!("could not load {} document from file {}", what, path.display());
            Err(anyhow!("could not load {} document from file {} : {}", what, path.display(), e))
        }
    }
}


/// reloads embedded data from a previous bson dump.
pub fn bson_load<GraphId>(fname : &str) -> Result<EmbeddedBsonReload<GraphId>, anyhow::Error>
    where GraphId : std::hash::Hash + std::cmp::Eq + FromStr {
    //
    log::info!("entering bson_load, file name : {:?}", fname);
    //
    let path = Path::new(fname);
    let file = match OpenOptions::new().read(true).open(path) {
        Ok(file) => file,
        Err(e) => {
            log::error!("reload of bson dump failed");
            return Err(anyhow!("reload failed: {}", e));
        }
    };
    let mut bufreader = BufReader::new(file);
    // load header
    let doc = read_document(&mut bufreader, path, "header")?;
    let bson_header = match doc.get("header") {
        Some(header) => header.clone(),
        None => {
            log::error!("could not find header in file {}", path.display());
            return Err(anyhow!("could not find header in document"));
        }
    };
    let header : EmbeddedBsonHeader = bson::from_bson(bson_header)?;
    log::info!("header : {:?}", header);
    if header.version != BSON_VERSION {
        log::error!("header format version : {}", header.version);
        return Err(anyhow!("format version error, inconsistent with header"));
    }
    if header.type_name != std::any::type_name::<f64>() {
        log::error!("header as type name : {}, reloading with : {}", header.type_name, std::any::type_name::<f64>());
        return Err(anyhow!("type error, inconsistent with header"));
    }
    if header.nbdata < 0 || header.dimension < 0 {
        return Err(anyhow!("bad header : nbdata {} dimension {}", header.nbdata, header.dimension));
    }
    let nb_data = header.nbdata as usize;
    let dim = header.dimension as usize;
    //
    let mut embedded = Array2::<f64>::zeros((0, dim));
    for i in 0..nb_data {
        // we have one document for each graph
        let doc = read_document(&mut bufreader, path, "vector")?;
        let key = i.to_string();
        let value = match doc.get(&key) {
            Some(value) => value.clone(),
            None => {
                log::error!("could not get record for key {:?}", key);
                return Err(anyhow!("could not get record for key {:?}", key));
            }
        };
        let data_1d : Vec<f64> = match bson::from_bson(value) {
            Ok(data) => data,
            Err(e) => {
                log::error!("bson decoding error for graph {}, err : {:?}", i, e);
                return Err(anyhow!("bson decoding error for graph {} : {}", i, e));
            }
        };
        if let Err(e) = embedded.push_row(ArrayView1::from(data_1d.as_slice())) {
            return Err(anyhow!("could not insert vector {} : {}", i, e));
        }
    }
    log::debug!("finished bson decoding of {} embedded vectors", nb_data);
    // the indexation
    let indexation = match Document::from_reader(&mut bufreader) {
        Err(e) => {
            log::info!("could not find indexation document in file {}, err : {:?}", path.display(), e);
            None
        },
        Ok(doc) => {
            let mut ranked = Vec::<(i64, GraphId)>::with_capacity(doc.len());
            for (key, value) in doc.iter() {
                let rank = match value.as_i64() {
                    Some(rank) => rank,
                    None => { return Err(anyhow!("indexation : rank of {} is not an integer", key)); }
                };
                let graph_id = match GraphId::from_str(key) {
                    Ok(id) => id,
                    Err(_) => { return Err(anyhow!("indexation : could not decode graph id {}", key)); }
                };
                ranked.push((rank, graph_id));
            }
            ranked.sort_unstable_by_key(|r| r.0);
            if ranked.iter().enumerate().any(|(i, r)| r.0 != i as i64) || ranked.len() != nb_data {
                return Err(anyhow!("indexation ranks are not 0..{}", nb_data));
            }
            Some(ranked.into_iter().map(|r| r.1).collect::<IndexSet<GraphId>>())
        },
    };
    log::info!("bson_load done, indexation found : {}", indexation.is_some());
    Ok(EmbeddedBsonReload{embedded, indexation})
} // end of bson_load
