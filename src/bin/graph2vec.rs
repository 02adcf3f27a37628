//! an executable for graph2vec embedding of a directory of json graphs
//! example usage:
//! graph2vec --dataset "dataset/" --output "features/embedding.bson" --format bson --deg 3 --dim 32 --ep 10 --neg 20
//!
//! Each file n.json of the dataset directory is a graph (see graph2vec::io::dataset).
//! Logging is controlled by RUST_LOG.

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command};

use std::path::Path;
use std::str::FromStr;

use graph2vec::prelude::*;


// parses value of argument name, None if absent
fn parse_opt<T : FromStr>(matches : &ArgMatches, name : &str) -> anyhow::Result<Option<T>> {
    match matches.value_of(name) {
        Some(str) => match str.parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                log::error!("could not parse argument {} : {}", name, str);
                Err(anyhow!("error parsing {} : {}", name, str))
            }
        },
        None => Ok(None),
    }
} // end of parse_opt


fn parse_params(matches : &ArgMatches) -> anyhow::Result<Graph2VecParams> {
    log::debug!("in parse_params");
    let mut params = Graph2VecParams::default();
    if let Some(deg) = parse_opt::<u16>(matches, "deg")? {
        params.max_degree = deg;
    }
    if let Some(dim) = parse_opt::<usize>(matches, "dim")? {
        params.dimension = dim;
    }
    if let Some(ep) = parse_opt::<usize>(matches, "ep")? {
        params.graph_epochs = ep;
        params.subgraph_epochs = ep;
    }
    if let Some(ep) = parse_opt::<usize>(matches, "subgraph_ep")? {
        params.subgraph_epochs = ep;
    }
    if let Some(alpha) = parse_opt::<f64>(matches, "alpha")? {
        params.learning_rate = alpha;
    }
    if let Some(neg) = parse_opt::<usize>(matches, "neg")? {
        params.nb_negative = neg;
    }
    params.seed = parse_opt::<u64>(matches, "seed")?;
    params.init_mode = match matches.value_of("init") {
        None | Some("independent") => InitMode::Independent,
        Some("canonical") => InitMode::Canonical,
        Some(other) => { return Err(anyhow!("init must be independent or canonical, got {}", other)); }
    };
    params.validate()?;
    Ok(params)
} // end of parse_params


fn run(matches : &ArgMatches) -> anyhow::Result<()> {
    let dataset = matches.value_of("dataset").ok_or_else(|| anyhow!("dataset is required"))?;
    let output_name = matches.value_of("output").ok_or_else(|| anyhow!("output is required"))?;
    let format = match matches.value_of("format") {
        Some(str) => str.parse::<Format>()?,
        None => Format::TEXT,
    };
    let symetric = matches.is_present("symetric");
    let params = parse_params(matches)?;
    log::info!("dataset : {}, output : {} ({:?}), params : {:?}", dataset, output_name, format, params);
    //
    let (graphs, indexation) = load_json_dir(Path::new(dataset), symetric)?;
    let mut graph2vec = Graph2Vec::new(params, &graphs);
    let embedding = Embedding::<f64, usize, Embedded<f64>>::new(indexation, &mut graph2vec)?;
    //
    let output = Output::new(format, output_name);
    output.dump(&embedding)?;
    log::info!("embedding of {} graphs written in {}", graphs.len(), output_name);
    Ok(())
} // end of run



fn build_command() -> Command<'static> {
    Command::new("graph2vec")
        .arg_required_else_help(true)
        .arg(Arg::new("dataset")
            .long("dataset")
            .takes_value(true)
            .required(true)
            .help("directory of json graph files"))
        .arg(Arg::new("output")
            .long("output")
            .takes_value(true)
            .required(true)
            .help("output file, its directory is created if needed"))
        .arg(Arg::new("format")
            .long("format")
            .takes_value(true)
            .help("text (default), csv or bson"))
        .arg(Arg::new("deg")
            .long("deg")
            .takes_value(true)
            .help("maximum degree of rooted subgraphs, default 10"))
        .arg(Arg::new("dim")
            .long("dim")
            .takes_value(true)
            .help("embedding dimension, default 10"))
        .arg(Arg::new("ep")
            .long("ep")
            .takes_value(true)
            .help("number of epochs, default 3"))
        .arg(Arg::new("subgraph_ep")
            .long("subgraph-ep")
            .takes_value(true)
            .help("number of epochs of subgraph training, default to --ep"))
        .arg(Arg::new("alpha")
            .long("alpha")
            .takes_value(true)
            .help("learning rate, default 0.025"))
        .arg(Arg::new("neg")
            .long("neg")
            .takes_value(true)
            .help("number of negative samples, default 20"))
        .arg(Arg::new("seed")
            .long("seed")
            .takes_value(true)
            .help("seed of random generator"))
        .arg(Arg::new("init")
            .long("init")
            .takes_value(true)
            .help("initialization of subgraph embeddings : independent (default) or canonical. \
                With independent initialization identical graphs are not guaranteed to embed close to each other, canonical gives them equal starting subgraph vectors"))
        .arg(Arg::new("symetric")
            .long("symetric")
            .help("insert edges of dataset in both directions"))
} // end of build_command



pub fn main() {
    //
    env_logger::Builder::from_default_env().init();
    log::info!("logger initialized");
    //
    let matches = build_command().get_matches();
    //
    if let Err(e) = run(&matches) {
        log::error!("graph2vec failed : {:?}", e);
        eprintln!("graph2vec failed : {}", e);
        std::process::exit(1);
    }
} // end of main



//=====================================================================================

// end of mod tests
