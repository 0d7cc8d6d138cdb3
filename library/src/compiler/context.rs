//! State of a single compilation pass.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};

use super::options::CompilerOptions;
use crate::error::CompileError;
use crate::ir::{InputRef, IrGraph, IrNodeId, OpCode, OutputRef, Value};
use crate::model::graph::{PropertyValue, SocketRef, SourceNode};

/// Handle to an IR node created during lowering.
///
/// Slots are addressed by position or by the names of the opcode signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrNodeHandle {
    pub id: IrNodeId,
    pub op: OpCode,
}

impl IrNodeHandle {
    pub fn input(&self, index: usize) -> Result<InputRef, CompileError> {
        if index < self.op.signature().inputs.len() {
            Ok(InputRef {
                node: self.id,
                slot: index,
            })
        } else {
            Err(self.unknown_slot(index.to_string()))
        }
    }

    pub fn input_named(&self, name: &str) -> Result<InputRef, CompileError> {
        self.op
            .signature()
            .input_index(name)
            .map(|slot| InputRef {
                node: self.id,
                slot,
            })
            .ok_or_else(|| self.unknown_slot(name.to_string()))
    }

    pub fn output(&self, index: usize) -> Result<OutputRef, CompileError> {
        if index < self.op.signature().outputs.len() {
            Ok(OutputRef {
                node: self.id,
                slot: index,
            })
        } else {
            Err(self.unknown_slot(index.to_string()))
        }
    }

    pub fn output_named(&self, name: &str) -> Result<OutputRef, CompileError> {
        self.op
            .signature()
            .output_index(name)
            .map(|slot| OutputRef {
                node: self.id,
                slot,
            })
            .ok_or_else(|| self.unknown_slot(name.to_string()))
    }

    fn unknown_slot(&self, slot: String) -> CompileError {
        CompileError::UnknownSlot {
            op: self.op.to_string(),
            slot,
        }
    }
}

/// Boundary mapping of the source node currently being lowered.
struct NodeScope {
    node: String,
    defaults: Vec<Option<PropertyValue>>,
    inputs: BTreeMap<usize, Vec<InputRef>>,
    outputs: BTreeMap<usize, OutputRef>,
}

/// Context for one compilation pass.
///
/// Created fresh for each compile. Lowering procedures emit IR through it and
/// record which IR slots their sockets resolve to; the traversal driver then
/// wires source links through those mappings.
pub struct NodeCompiler<'a> {
    options: &'a CompilerOptions,
    ir: IrGraph,
    scopes: Vec<NodeScope>,
    input_map: HashMap<SocketRef, Vec<InputRef>>,
    output_map: HashMap<SocketRef, OutputRef>,
}

impl<'a> NodeCompiler<'a> {
    pub fn new(options: &'a CompilerOptions) -> Self {
        let mut ir = IrGraph::new();
        for input in &options.graph_inputs {
            ir.add_input(&input.name, input.value_type);
        }
        Self {
            options,
            ir,
            scopes: Vec::new(),
            input_map: HashMap::new(),
            output_map: HashMap::new(),
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        self.options
    }

    pub fn ir(&self) -> &IrGraph {
        &self.ir
    }

    /// Hand the finished IR graph over.
    pub fn finish(self) -> IrGraph {
        if !self.scopes.is_empty() {
            warn!("{} node scope(s) still open at finish", self.scopes.len());
        }
        self.ir
    }

    // ---------------------------------------------------------------------
    // Scopes
    // ---------------------------------------------------------------------

    /// Make `node` the node that subsequent emission calls are attributed to.
    pub fn push_node_scope(&mut self, node: &SourceNode) {
        self.scopes.push(NodeScope {
            node: node.name.clone(),
            defaults: node.inputs.iter().map(|s| s.default_value.clone()).collect(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
        });
    }

    /// Close the innermost scope: thread socket defaults into the mapped IR
    /// slots and publish the scope's mappings for link wiring.
    pub fn pop_node_scope(&mut self) -> Result<(), CompileError> {
        let scope = self.scopes.pop().ok_or(CompileError::NoActiveScope)?;

        if self.options.thread_defaults {
            for (socket, slots) in &scope.inputs {
                let Some(Some(default)) = scope.defaults.get(*socket) else {
                    continue;
                };
                for slot in slots {
                    self.thread_default(&scope.node, *socket, default, *slot)?;
                }
            }
        }

        for (socket, slots) in scope.inputs {
            self.input_map
                .entry(SocketRef::new(&scope.node, socket))
                .or_default()
                .extend(slots);
        }
        for (socket, slot) in scope.outputs {
            let key = SocketRef::new(&scope.node, socket);
            if self.output_map.contains_key(&key) {
                return Err(CompileError::OutputRemapped {
                    node: scope.node,
                    socket,
                });
            }
            self.output_map.insert(key, slot);
        }
        Ok(())
    }

    /// Run `f` inside a scope for `node`; the scope is closed on every path.
    pub fn with_node_scope<F>(&mut self, node: &SourceNode, f: F) -> Result<(), CompileError>
    where
        F: FnOnce(&mut Self) -> Result<(), CompileError>,
    {
        self.push_node_scope(node);
        let result = f(self);
        let popped = self.pop_node_scope();
        result.and(popped)
    }

    fn scope(&mut self) -> Result<&mut NodeScope, CompileError> {
        self.scopes.last_mut().ok_or(CompileError::NoActiveScope)
    }

    /// Name of the source node currently being lowered.
    pub fn current_node(&self) -> Option<&str> {
        self.scopes.last().map(|s| s.node.as_str())
    }

    fn thread_default(
        &mut self,
        node: &str,
        socket: usize,
        default: &PropertyValue,
        slot: InputRef,
    ) -> Result<(), CompileError> {
        let Some(value_type) = self
            .ir
            .node(slot.node)
            .and_then(|n| n.inputs.get(slot.slot))
            .map(|i| i.value_type)
        else {
            return Ok(());
        };
        match default.to_ir_value(value_type) {
            Some(value) => self.ir.set_value(slot, value),
            None => {
                warn!(
                    "Node '{}': default {} of input {} does not fit a {} slot, skipped",
                    node, default, socket, value_type
                );
                Ok(())
            }
        }
    }

    // ---------------------------------------------------------------------
    // Emission
    // ---------------------------------------------------------------------

    /// Add a primitive attributed to the current node. Without a name hint
    /// the instance is named `<node>.<OPCODE>`.
    pub fn add_node(
        &mut self,
        op: OpCode,
        name_hint: Option<&str>,
    ) -> Result<IrNodeHandle, CompileError> {
        let source = self.scope()?.node.clone();
        let name = match name_hint {
            Some(hint) => hint.to_string(),
            None => format!("{}.{}", source, op),
        };
        let id = self.ir.add_node(op, &name, Some(&source));
        debug!(
            "  {} -> {} '{}'",
            source,
            op,
            self.ir.node(id).map(|n| n.name.as_str()).unwrap_or_default()
        );
        Ok(IrNodeHandle { id, op })
    }

    /// Record that input socket `socket` of the current node resolves to `slot`.
    /// A socket may resolve to several slots.
    pub fn map_input(&mut self, socket: usize, slot: InputRef) -> Result<(), CompileError> {
        self.scope()?.inputs.entry(socket).or_default().push(slot);
        Ok(())
    }

    /// Record that output socket `socket` of the current node resolves to `slot`.
    pub fn map_output(&mut self, socket: usize, slot: OutputRef) -> Result<(), CompileError> {
        let scope = self.scope()?;
        if scope.outputs.contains_key(&socket) {
            return Err(CompileError::OutputRemapped {
                node: scope.node.clone(),
                socket,
            });
        }
        scope.outputs.insert(socket, slot);
        Ok(())
    }

    /// Wire two IR slots directly.
    pub fn link(&mut self, from: OutputRef, to: InputRef) -> Result<(), CompileError> {
        self.ir.link(from, to, self.options.duplicate_links)
    }

    /// Bake a literal into an input slot.
    pub fn set_value(&mut self, slot: InputRef, value: Value) -> Result<(), CompileError> {
        self.ir.set_value(slot, value)
    }

    /// Argument node providing the named external input.
    pub fn graph_input(&self, name: &str) -> Result<IrNodeHandle, CompileError> {
        let id = self
            .ir
            .input_node(name)
            .ok_or_else(|| CompileError::UnknownGraphInput(name.to_string()))?;
        let op = self
            .ir
            .node(id)
            .map(|n| n.op)
            .ok_or_else(|| CompileError::UnknownGraphInput(name.to_string()))?;
        Ok(IrNodeHandle { id, op })
    }

    // ---------------------------------------------------------------------
    // Boundary lookups (used by the traversal driver)
    // ---------------------------------------------------------------------

    pub fn mapped_output(&self, socket: &SocketRef) -> Option<OutputRef> {
        self.output_map.get(socket).copied()
    }

    pub fn mapped_inputs(&self, socket: &SocketRef) -> &[InputRef] {
        self.input_map
            .get(socket)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::InputState;
    use crate::model::graph::{Socket, SocketType};

    fn float_node(name: &str, default: f64) -> SourceNode {
        let mut socket = Socket::new("Value", SocketType::Float);
        socket.default_value = Some(PropertyValue::from(default));
        SourceNode::new(name, "math.math")
            .with_inputs(vec![socket])
            .with_outputs(vec![Socket::new("Value", SocketType::Float)])
    }

    #[test]
    fn test_emission_requires_scope() {
        let options = CompilerOptions::default();
        let mut compiler = NodeCompiler::new(&options);
        assert!(matches!(
            compiler.add_node(OpCode::Sine, None),
            Err(CompileError::NoActiveScope)
        ));
        assert!(matches!(
            compiler.pop_node_scope(),
            Err(CompileError::NoActiveScope)
        ));
    }

    #[test]
    fn test_default_name_uses_source_and_opcode() {
        let options = CompilerOptions::default();
        let mut compiler = NodeCompiler::new(&options);
        let node = float_node("Wave", 0.0);
        compiler.push_node_scope(&node);
        let handle = compiler.add_node(OpCode::Sine, None).unwrap();
        compiler.pop_node_scope().unwrap();
        let ir_node = compiler.ir().node(handle.id).unwrap();
        assert_eq!(ir_node.name, "Wave.SINE");
        assert_eq!(ir_node.source.as_deref(), Some("Wave"));
    }

    #[test]
    fn test_defaults_thread_into_mapped_slots() {
        let options = CompilerOptions::default();
        let mut compiler = NodeCompiler::new(&options);
        let node = float_node("Wave", 0.25);
        compiler
            .with_node_scope(&node, |c| {
                let h = c.add_node(OpCode::Sine, None)?;
                c.map_input(0, h.input(0)?)?;
                c.map_output(0, h.output(0)?)
            })
            .unwrap();
        let state = &compiler.ir().find_node("Wave.SINE").unwrap().inputs[0].state;
        assert_eq!(*state, InputState::Value(Value::float(0.25)));
        assert_eq!(compiler.mapped_inputs(&SocketRef::new("Wave", 0)).len(), 1);
        assert!(compiler.mapped_output(&SocketRef::new("Wave", 0)).is_some());
    }

    #[test]
    fn test_defaults_not_threaded_when_disabled() {
        let options = CompilerOptions {
            thread_defaults: false,
            ..CompilerOptions::default()
        };
        let mut compiler = NodeCompiler::new(&options);
        let node = float_node("Wave", 0.25);
        compiler
            .with_node_scope(&node, |c| {
                let h = c.add_node(OpCode::Sine, None)?;
                c.map_input(0, h.input(0)?)
            })
            .unwrap();
        let state = &compiler.ir().find_node("Wave.SINE").unwrap().inputs[0].state;
        assert_eq!(*state, InputState::Value(Value::float(0.0)));
    }

    #[test]
    fn test_output_mapped_twice_is_rejected() {
        let options = CompilerOptions::default();
        let mut compiler = NodeCompiler::new(&options);
        let node = float_node("Wave", 0.0);
        let result = compiler.with_node_scope(&node, |c| {
            let a = c.add_node(OpCode::Sine, None)?;
            let b = c.add_node(OpCode::Cosine, None)?;
            c.map_output(0, a.output(0)?)?;
            c.map_output(0, b.output(0)?)
        });
        assert!(matches!(
            result,
            Err(CompileError::OutputRemapped { socket: 0, .. })
        ));
        // The scope was still closed.
        assert_eq!(compiler.current_node(), None);
    }

    #[test]
    fn test_nested_scopes_attribute_to_innermost() {
        let options = CompilerOptions::default();
        let mut compiler = NodeCompiler::new(&options);
        let outer = float_node("Outer", 0.0);
        let inner = float_node("Inner", 0.0);
        compiler
            .with_node_scope(&outer, |c| {
                c.with_node_scope(&inner, |c| {
                    assert_eq!(c.current_node(), Some("Inner"));
                    c.add_node(OpCode::Sine, None).map(|_| ())
                })?;
                assert_eq!(c.current_node(), Some("Outer"));
                c.add_node(OpCode::Cosine, None).map(|_| ())
            })
            .unwrap();
        assert_eq!(compiler.ir().nodes_from("Inner").count(), 1);
        assert_eq!(compiler.ir().nodes_from("Outer").count(), 1);
    }

    #[test]
    fn test_graph_input_lookup() {
        let options = CompilerOptions::default();
        let compiler = NodeCompiler::new(&options);
        let handle = compiler.graph_input("iteration").unwrap();
        assert_eq!(handle.op, OpCode::ArgInt);
        assert!(matches!(
            compiler.graph_input("time"),
            Err(CompileError::UnknownGraphInput(_))
        ));
    }

    #[test]
    fn test_named_slots() {
        let options = CompilerOptions::default();
        let mut compiler = NodeCompiler::new(&options);
        let node = float_node("Sep", 0.0);
        compiler.push_node_scope(&node);
        let h = compiler.add_node(OpCode::GetElemFloat3, None).unwrap();
        assert_eq!(h.input_named("value").unwrap().slot, 1);
        assert!(h.input_named("vector").is_err());
        assert!(h.output(1).is_err());
        compiler.pop_node_scope().unwrap();
    }
}
