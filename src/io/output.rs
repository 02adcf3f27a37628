//! To describe dump of embedding

use anyhow::anyhow;

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::embedding::{EmbeddedT, Embedding};

use super::{bson::bson_dump, csv::csv_dump};


/// Output formats
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    /// one block per graph : a line "Graph no i" then one line "\tx_j: value" per coordinate (j from 1)
    TEXT,
    /// one record per graph : graph id then coordinates
    CSV,
    /// header document, one document per vector then the indexation document
    BSON,
}


impl std::str::FromStr for Format {
    type Err = anyhow::Error;
    fn from_str(s : &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Format::TEXT),
            "csv" => Ok(Format::CSV),
            "bson" => Ok(Format::BSON),
            _ => Err(anyhow!("unknown output format {}, expecting text, csv or bson", s)),
        }
    }
}



pub struct Output {
    /// describe output format
    fmt : Format,
    /// name of output file
    output_name : String,
}

impl Output {
    pub fn new(fmt : Format, output_name : &str) -> Self {
        Output{fmt, output_name : output_name.to_string()}
    }

    /// get ouput format
    pub fn get_fmt(&self) -> Format { self.fmt }

    /// get output_name
    pub fn get_output_name(&self) -> &String { &self.output_name }


    /// dumps embedding in the format of self, creating the parent directory of the output file if needed.
    pub fn dump<GraphId, EmbeddedData>(&self, embedding : &Embedding<f64, GraphId, EmbeddedData>) -> Result<(), anyhow::Error>
        where   GraphId : std::hash::Hash + std::cmp::Eq + std::fmt::Display,
                EmbeddedData : EmbeddedT<f64> {
        //
        if let Some(parent) = Path::new(&self.output_name).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                log::info!("creating output directory {:?}", parent);
                std::fs::create_dir_all(parent)?;
            }
        }
        match self.fmt {
            Format::TEXT => text_dump(embedding, self),
            Format::CSV => csv_dump(embedding, self),
            Format::BSON => bson_dump(embedding, self),
        }
    } // end of dump

}  // end of Output


impl Default for Output {
    fn default() -> Self {
        Output{fmt : Format::BSON, output_name : String::from("embedding.bson")}
    }
}



/// text dump, graphs in rank order
pub fn text_dump<GraphId, EmbeddedData>(embedding : &Embedding<f64, GraphId, EmbeddedData>, output : &Output) -> Result<(), anyhow::Error>
    where   GraphId : std::hash::Hash + std::cmp::Eq + std::fmt::Display,
            EmbeddedData : EmbeddedT<f64> {
    //
    let path = Path::new(output.get_output_name());
    let file = match OpenOptions::new().write(true).create(true).truncate(true).open(path) {
        Ok(file) => file,
        Err(e) => {
            log::error!("text_dump could not open file : {}", path.display());
            return Err(anyhow!("could not open file {} : {}", path.display(), e));
        }
    };
    let mut bufwriter = BufWriter::new(file);
    let embedded = embedding.get_embedded_data();
    for rank in 0..embedded.get_nb_graphs() {
        let graph_id = embedding.get_graph_id(rank).ok_or_else(|| anyhow!("no graph id for rank {}", rank))?;
        writeln!(bufwriter, "Graph no {}", graph_id)?;
        for (j, x) in embedded.get_embedded_graph(rank).iter().enumerate() {
            writeln!(bufwriter, "\tx_{}: {}", j + 1, x)?;
        }
    }
    bufwriter.flush()?;
    log::info!("text dump in file {} finished", path.display());
    Ok(())
} // end of text_dump



//=====================================================================================

// end of mod tests
