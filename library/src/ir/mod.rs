//! Intermediate representation produced by the compiler and executed by the node VM.

pub mod graph;
pub mod opcode;
pub mod value;

pub use graph::{
    DuplicateLinkPolicy, InputRef, InputState, IrGraph, IrInput, IrNode, IrNodeId, IrOutput,
    OutputRef,
};
pub use opcode::{InputDecl, OpCode, OpSignature, OutputDecl};
pub use value::{Value, ValueType};
