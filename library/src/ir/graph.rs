//! IR graph: the flat primitive-operation graph handed to the node VM.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::opcode::OpCode;
use super::value::{Value, ValueType};
use crate::error::CompileError;

/// Index of a node inside its `IrGraph`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct IrNodeId(pub usize);

/// An output slot of an IR node.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputRef {
    pub node: IrNodeId,
    pub slot: usize,
}

/// An input slot of an IR node.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputRef {
    pub node: IrNodeId,
    pub slot: usize,
}

/// What an input slot currently holds: a literal or its single upstream output.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InputState {
    Value(Value),
    Link(OutputRef),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IrInput {
    pub name: String,
    pub value_type: ValueType,
    pub state: InputState,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IrOutput {
    pub name: String,
    pub value_type: ValueType,
    /// Fan-out targets in connection order.
    pub links: Vec<InputRef>,
}

/// One primitive operation instance.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IrNode {
    pub name: String,
    pub op: OpCode,
    /// Source node this primitive was lowered from; `None` for graph arguments.
    pub source: Option<String>,
    pub inputs: Vec<IrInput>,
    pub outputs: Vec<IrOutput>,
}

impl IrNode {
    fn new(name: String, op: OpCode, source: Option<String>) -> Self {
        let sig = op.signature();
        Self {
            name,
            op,
            source,
            inputs: sig
                .inputs
                .iter()
                .map(|d| IrInput {
                    name: d.name.to_string(),
                    value_type: d.value_type(),
                    state: InputState::Value(d.default),
                })
                .collect(),
            outputs: sig
                .outputs
                .iter()
                .map(|d| IrOutput {
                    name: d.name.to_string(),
                    value_type: d.value_type,
                    links: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn input(&self, name: &str) -> Option<&IrInput> {
        self.inputs.iter().find(|i| i.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&IrOutput> {
        self.outputs.iter().find(|o| o.name == name)
    }

    /// Name of the source node, or the IR name for arguments (used in diagnostics).
    fn owner(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }
}

/// Handling of a second connection into an already linked input slot.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateLinkPolicy {
    /// Reject the connection with `CompileError::DuplicateLink`.
    #[default]
    Error,
    /// Replace the previous connection.
    LastWriterWins,
}

/// The compiled instruction graph.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct IrGraph {
    pub nodes: Vec<IrNode>,
    /// Named external inputs and the argument node that provides each.
    pub inputs: BTreeMap<String, IrNodeId>,
    #[serde(skip)]
    names: HashSet<String>,
}

impl IrGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a primitive. The name is made unique by appending `.001`, `.002`, ...
    pub fn add_node(&mut self, op: OpCode, name: &str, source: Option<&str>) -> IrNodeId {
        let name = self.unique_name(name);
        let id = IrNodeId(self.nodes.len());
        self.names.insert(name.clone());
        self.nodes
            .push(IrNode::new(name, op, source.map(str::to_string)));
        id
    }

    /// Declare an external input fed by an argument primitive.
    pub fn add_input(&mut self, name: &str, value_type: ValueType) -> IrNodeId {
        if let Some(id) = self.inputs.get(name) {
            return *id;
        }
        let id = self.add_node(OpCode::argument_for(value_type), name, None);
        self.inputs.insert(name.to_string(), id);
        id
    }

    pub fn input_node(&self, name: &str) -> Option<IrNodeId> {
        self.inputs.get(name).copied()
    }

    fn unique_name(&self, hint: &str) -> String {
        if !self.names.contains(hint) {
            return hint.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}.{:03}", hint, n);
            if !self.names.contains(&candidate) {
                debug!("IR name '{}' taken, using '{}'", hint, candidate);
                return candidate;
            }
            n += 1;
        }
    }

    pub fn node(&self, id: IrNodeId) -> Option<&IrNode> {
        self.nodes.get(id.0)
    }

    pub fn find_node(&self, name: &str) -> Option<&IrNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// All primitives lowered from the named source node, in creation order.
    pub fn nodes_from<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a IrNode> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.source.as_deref() == Some(source))
    }

    fn input_mut(&mut self, slot: InputRef) -> Result<&mut IrInput, CompileError> {
        let node = self
            .nodes
            .get_mut(slot.node.0)
            .ok_or_else(|| CompileError::InvalidArgument(format!("No IR node {:?}", slot.node)))?;
        let op = node.op;
        node.inputs
            .get_mut(slot.slot)
            .ok_or_else(|| CompileError::UnknownSlot {
                op: op.to_string(),
                slot: slot.slot.to_string(),
            })
    }

    pub fn input_state(&self, slot: InputRef) -> Option<&InputState> {
        self.node(slot.node)
            .and_then(|n| n.inputs.get(slot.slot))
            .map(|i| &i.state)
    }

    /// Store a literal in an unconnected input slot.
    pub fn set_value(&mut self, slot: InputRef, value: Value) -> Result<(), CompileError> {
        let owner = self.owner_of(slot.node);
        let input = self.input_mut(slot)?;
        if let InputState::Link(_) = input.state {
            return Err(CompileError::DuplicateLink {
                node: owner,
                slot: input.name.clone(),
            });
        }
        let converted =
            value
                .convert_to(input.value_type)
                .ok_or_else(|| CompileError::TypeMismatch {
                    node: owner,
                    slot: input.name.clone(),
                    expected: input.value_type,
                    found: value.value_type(),
                })?;
        input.state = InputState::Value(converted);
        Ok(())
    }

    /// Connect an output slot to an input slot. Input slots accept a single writer.
    pub fn link(
        &mut self,
        from: OutputRef,
        to: InputRef,
        policy: DuplicateLinkPolicy,
    ) -> Result<(), CompileError> {
        let from_type = self
            .node(from.node)
            .and_then(|n| n.outputs.get(from.slot))
            .map(|o| o.value_type)
            .ok_or_else(|| CompileError::UnknownSlot {
                op: self
                    .node(from.node)
                    .map(|n| n.op.to_string())
                    .unwrap_or_default(),
                slot: from.slot.to_string(),
            })?;

        let owner = self.owner_of(to.node);
        let input = self.input_mut(to)?;
        if input.value_type != from_type {
            warn!(
                "Linking {} output into {} input '{}' of '{}'",
                from_type, input.value_type, input.name, owner
            );
        }
        let previous = match input.state {
            InputState::Link(prev) => match policy {
                DuplicateLinkPolicy::Error => {
                    return Err(CompileError::DuplicateLink {
                        node: owner,
                        slot: input.name.clone(),
                    });
                }
                DuplicateLinkPolicy::LastWriterWins => Some(prev),
            },
            InputState::Value(_) => None,
        };
        input.state = InputState::Link(from);

        if let Some(prev) = previous {
            if let Some(out) = self
                .nodes
                .get_mut(prev.node.0)
                .and_then(|n| n.outputs.get_mut(prev.slot))
            {
                out.links.retain(|t| *t != to);
            }
        }
        if let Some(out) = self
            .nodes
            .get_mut(from.node.0)
            .and_then(|n| n.outputs.get_mut(from.slot))
        {
            out.links.push(to);
        }
        Ok(())
    }

    fn owner_of(&self, id: IrNodeId) -> String {
        self.node(id)
            .map(|n| n.owner().to_string())
            .unwrap_or_default()
    }

    /// All connections as (from, to) pairs, ordered by target node and slot.
    pub fn connections(&self) -> Vec<(OutputRef, InputRef)> {
        let mut result = Vec::new();
        for (ni, node) in self.nodes.iter().enumerate() {
            for (si, input) in node.inputs.iter().enumerate() {
                if let InputState::Link(from) = input.state {
                    result.push((
                        from,
                        InputRef {
                            node: IrNodeId(ni),
                            slot: si,
                        },
                    ));
                }
            }
        }
        result
    }

    /// Check the structural invariants: unique names, and every connection
    /// recorded identically on both of its ends.
    pub fn validate(&self) -> Result<(), CompileError> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.name.as_str()) {
                return Err(CompileError::InvalidArgument(format!(
                    "Duplicate IR node name '{}'",
                    node.name
                )));
            }
        }

        let mut forward = 0;
        for (from, to) in self.connections() {
            let recorded = self
                .node(from.node)
                .and_then(|n| n.outputs.get(from.slot))
                .map(|o| o.links.contains(&to))
                .unwrap_or(false);
            if !recorded {
                return Err(CompileError::InvalidArgument(format!(
                    "Connection into '{}' missing from its source output",
                    self.owner_of(to.node)
                )));
            }
            forward += 1;
        }
        let fan_out: usize = self
            .nodes
            .iter()
            .flat_map(|n| n.outputs.iter())
            .map(|o| o.links.len())
            .sum();
        if fan_out != forward {
            return Err(CompileError::InvalidArgument(format!(
                "{} output links recorded for {} connections",
                fan_out, forward
            )));
        }
        Ok(())
    }

    /// Rebuild the name index after deserialization.
    pub fn reindex(&mut self) {
        self.names = self.nodes.iter().map(|n| n.name.clone()).collect();
    }
}

impl fmt::Display for IrGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{} = {}(", node.name, node.op)?;
            for (i, input) in node.inputs.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                match &input.state {
                    InputState::Value(v) => write!(f, "{}={}", input.name, v)?,
                    InputState::Link(from) => {
                        let src = self.node(from.node);
                        let src_name = src.map_or("?", |n| n.name.as_str());
                        let slot_name = src
                            .and_then(|n| n.outputs.get(from.slot))
                            .map_or("?", |o| o.name.as_str());
                        write!(f, "{}=@{}.{}", input.name, src_name, slot_name)?;
                    }
                }
            }
            writeln!(f, ")")?;
        }
        Ok(())
    }
}
