//! Lowering of source node trees into the IR graph.

pub mod context;
mod driver;
pub mod lowering;
pub mod options;

pub use context::{IrNodeHandle, NodeCompiler};
pub use driver::{GraphCompiler, compile_graph};
pub use lowering::{LoweringTable, NodeLowering};
pub use options::{CompilerOptions, GraphInputDecl};
