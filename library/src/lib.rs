pub mod compiler;
pub mod error;
pub mod ir;
pub mod model;
pub mod nodes;
pub mod util;

use std::fs;
use std::path::PathBuf;

use log::info;

pub use compiler::{CompilerOptions, GraphCompiler, compile_graph};
pub use error::CompileError;
pub use ir::IrGraph;
pub use model::graph::SourceGraph;
pub use nodes::NodeTypeRegistry;

const USAGE: &str = "usage: node-compiler <graph.json> [--config <options.toml>] [--dump]";

/// Parsed command line of the `node-compiler` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub graph: PathBuf,
    pub config: Option<PathBuf>,
    /// Print the textual dump instead of JSON.
    pub dump: bool,
}

impl CliArgs {
    /// Parse `args` as received by `main`, program name first.
    pub fn parse(args: &[String]) -> Result<Self, CompileError> {
        let mut graph = None;
        let mut config = None;
        let mut dump = false;

        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--dump" => dump = true,
                "--config" => {
                    let path = iter.next().ok_or_else(|| {
                        CompileError::InvalidArgument(format!("--config needs a path\n{}", USAGE))
                    })?;
                    config = Some(PathBuf::from(path));
                }
                flag if flag.starts_with("--") => {
                    return Err(CompileError::InvalidArgument(format!(
                        "unknown flag {}\n{}",
                        flag, USAGE
                    )));
                }
                path if graph.is_none() => graph = Some(PathBuf::from(path)),
                extra => {
                    return Err(CompileError::InvalidArgument(format!(
                        "unexpected argument {}\n{}",
                        extra, USAGE
                    )));
                }
            }
        }

        let graph = graph.ok_or_else(|| CompileError::InvalidArgument(USAGE.to_string()))?;
        Ok(Self {
            graph,
            config,
            dump,
        })
    }
}

/// Load a source tree from JSON, compile it and render the result.
pub fn compile_to_string(
    graph_json: &str,
    options: CompilerOptions,
    dump: bool,
) -> Result<String, CompileError> {
    let graph =
        util::timing::measure_debug("Loading source tree", || SourceGraph::load(graph_json))?;
    let ir = GraphCompiler::new(options).compile(&graph)?;
    if dump {
        Ok(ir.to_string())
    } else {
        Ok(serde_json::to_string_pretty(&ir)?)
    }
}

/// Entry point of the `node-compiler` binary.
pub fn run(args: Vec<String>) -> Result<(), CompileError> {
    let args = CliArgs::parse(&args)?;
    let options = match &args.config {
        Some(path) => CompilerOptions::load(path)?,
        None => CompilerOptions::default(),
    };
    info!("Compiling {}", args.graph.display());
    let graph_json = fs::read_to_string(&args.graph)?;
    let output = compile_to_string(&graph_json, options, args.dump)?;
    println!("{}", output);
    Ok(())
}
