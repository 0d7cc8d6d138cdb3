use thiserror::Error;

use crate::ir::ValueType;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Node '{node}': input slot '{slot}' already has a writer")]
    DuplicateLink { node: String, slot: String },
    #[error("Node '{node}': slot '{slot}' expects {expected}, got {found}")]
    TypeMismatch {
        node: String,
        slot: String,
        expected: ValueType,
        found: ValueType,
    },
    #[error("Node '{node}': cannot resolve {property} = '{value}'")]
    UnresolvedEnum {
        node: String,
        property: String,
        value: String,
    },
    #[error("Node '{node}': output socket {socket} mapped twice")]
    OutputRemapped { node: String, socket: usize },
    #[error("Opcode {op} has no slot '{slot}'")]
    UnknownSlot { op: String, slot: String },
    #[error("Unknown graph input: {0}")]
    UnknownGraphInput(String),
    #[error("No node scope is active")]
    NoActiveScope,
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Node '{node}': {source}")]
    Lowering {
        node: String,
        #[source]
        source: Box<CompileError>,
    },
}

impl CompileError {
    /// Source node the error is attributed to, if any.
    pub fn node(&self) -> Option<&str> {
        match self {
            CompileError::DuplicateLink { node, .. }
            | CompileError::TypeMismatch { node, .. }
            | CompileError::UnresolvedEnum { node, .. }
            | CompileError::OutputRemapped { node, .. }
            | CompileError::Lowering { node, .. } => Some(node),
            _ => None,
        }
    }

    /// Attribute the error to `node` unless it already names a source node.
    pub fn in_node(self, node: &str) -> CompileError {
        if self.node().is_some() {
            return self;
        }
        CompileError::Lowering {
            node: node.to_string(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_node_wraps_unattributed_errors() {
        let err = CompileError::UnknownGraphInput("time".to_string()).in_node("Clock");
        assert_eq!(err.node(), Some("Clock"));
        assert_eq!(err.to_string(), "Node 'Clock': Unknown graph input: time");
        assert!(matches!(
            err,
            CompileError::Lowering { ref source, .. }
                if matches!(**source, CompileError::UnknownGraphInput(_))
        ));
    }

    #[test]
    fn test_in_node_keeps_existing_attribution() {
        let err = CompileError::OutputRemapped {
            node: "Math".to_string(),
            socket: 0,
        }
        .in_node("Other");
        assert_eq!(err.node(), Some("Math"));
        assert!(matches!(err, CompileError::OutputRemapped { .. }));
    }
}
