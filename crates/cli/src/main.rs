use anyhow::Result;
use clap::Parser;
use san_loader_cli::{absolute_path, get_delimiters};
use sfc::LoaderOptions;

use std::fs;
use std::io::{self, Read};

mod cli;

/// Runs the San single file component loader on one file and prints
/// the module a bundler would receive.
#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// The component to load. Stdin will be loaded if no file is provided.
    input_file_name: Option<String>,

    /// Block request query, e.g. `?san&type=style&index=0`.
    /// The entry module is printed when empty.
    #[arg(short, long, default_value = "")]
    query: String,

    /// Loader options as JSON, e.g. `{"esModule": true}`.
    #[arg(short, long)]
    options: Option<String>,

    #[arg(long)]
    es_module: bool,

    /// Print a source map after extracted blocks.
    #[arg(long)]
    source_map: bool,

    /// Interpolation delimiters split by one whitespace, e.g. `"${ }"`.
    #[arg(short, long)]
    delimiters: Option<String>,

    /// none, aNode or aPack
    #[arg(long)]
    compile_template: Option<String>,

    #[arg(long)]
    dump_descriptor: bool,

    /// Print the template's ANode tree.
    #[arg(long)]
    dump_tree: bool,

    /// Also load every block the entry module imports.
    #[arg(long)]
    follow: bool,
}

pub(crate) struct ShowOption {
    pub dump_descriptor: bool,
    pub dump_tree: bool,
    pub follow: bool,
}

/// (file name, source, query, loader options, dumps)
pub(crate) type CliInput = (String, String, String, LoaderOptions, ShowOption);

fn main() -> Result<()> {
    env_logger::init();
    let opts: Opts = Opts::parse();
    let (name, file) = if let Some(file_name) = opts.input_file_name {
        let ab_path = absolute_path(&file_name)?;
        (file_name, fs::read_to_string(ab_path)?)
    } else {
        let mut s = String::new();
        io::stdin().read_to_string(&mut s)?;
        ("App.san".to_owned(), s)
    };

    let mut options = match &opts.options {
        Some(json) => LoaderOptions::from_json(json)?,
        None => LoaderOptions::default(),
    };
    if opts.es_module {
        options.es_module = true;
    }
    if opts.source_map {
        options.source_map = true;
    }
    if let Some(delimiters) = opts.delimiters {
        options.delimiters = get_delimiters(delimiters)?;
    }
    if let Some(target) = opts.compile_template {
        options.compile_template = target.parse()?;
    }
    log::debug!("loading {} with {:?}", name, options);

    let show = ShowOption {
        dump_descriptor: opts.dump_descriptor,
        dump_tree: opts.dump_tree,
        follow: opts.follow,
    };
    cli::load_to_stdout((name, file, opts.query, options, show))
}
