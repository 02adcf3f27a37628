//! Dump of graph embedding in a csv file, one record per graph : graph id then the coordinates.

use anyhow::anyhow;

use csv::WriterBuilder;

use std::path::Path;

use crate::embedding::{EmbeddedT, Embedding};

use super::output::Output;


pub fn csv_dump<GraphId, EmbeddedData>(embedding : &Embedding<f64, GraphId, EmbeddedData>, output : &Output) -> Result<(), anyhow::Error>
    where   GraphId : std::hash::Hash + std::cmp::Eq + std::fmt::Display,
            EmbeddedData : EmbeddedT<f64> {
    //
    let path = Path::new(output.get_output_name());
    let mut writer = match WriterBuilder::new().has_headers(false).from_path(path) {
        Ok(writer) => writer,
        Err(e) => {
            log::error!("csv_dump could not open file : {}", path.display());
            return Err(anyhow!("could not open file {} : {}", path.display(), e));
        }
    };
    let embedded = embedding.get_embedded_data();
    for rank in 0..embedded.get_nb_graphs() {
        let graph_id = embedding.get_graph_id(rank).ok_or_else(|| anyhow!("no graph id for rank {}", rank))?;
        let mut record = Vec::<String>::with_capacity(embedded.get_dimension() + 1);
        record.push(graph_id.to_string());
        record.extend(embedded.get_embedded_graph(rank).iter().map(|x| x.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    log::info!("csv dump in file {} finished", path.display());
    Ok(())
} // end of csv_dump
