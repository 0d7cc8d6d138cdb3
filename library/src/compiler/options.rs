//! Compiler options, loadable from TOML.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::ir::{DuplicateLinkPolicy, ValueType};

/// An external value the VM provides to every evaluation (e.g. the iteration counter).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GraphInputDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl GraphInputDecl {
    pub fn new(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            value_type,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CompilerOptions {
    pub duplicate_links: DuplicateLinkPolicy,
    /// Copy unlinked socket defaults into the IR slots they map to.
    pub thread_defaults: bool,
    pub graph_inputs: Vec<GraphInputDecl>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            duplicate_links: DuplicateLinkPolicy::Error,
            thread_defaults: true,
            graph_inputs: vec![GraphInputDecl::new("iteration", ValueType::Int)],
        }
    }
}

impl CompilerOptions {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, CompileError> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn load(path: &Path) -> Result<Self, CompileError> {
        let toml_str = fs::read_to_string(path)?;
        Self::from_toml_str(&toml_str)
    }

    /// Load from `path`, falling back to defaults when the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(options) => {
                info!("Compiler options loaded from {}", path.display());
                options
            }
            Err(e) => {
                warn!("Failed to load compiler options, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String, CompileError> {
        toml::to_string_pretty(self).map_err(|e| {
            CompileError::InvalidArgument(format!("Failed to serialize options: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let options = CompilerOptions::from_toml_str("").unwrap();
        assert_eq!(options, CompilerOptions::default());
    }

    #[test]
    fn test_parse_options() {
        let options = CompilerOptions::from_toml_str(
            r#"
            duplicate_links = "last_writer_wins"
            thread_defaults = false

            [[graph_inputs]]
            name = "iteration"
            type = "int"

            [[graph_inputs]]
            name = "time"
            type = "float"
            "#,
        )
        .unwrap();
        assert_eq!(options.duplicate_links, DuplicateLinkPolicy::LastWriterWins);
        assert!(!options.thread_defaults);
        assert_eq!(options.graph_inputs[1], GraphInputDecl::new("time", ValueType::Float));
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = CompilerOptions::from_toml_str(r#"duplicate_links = "first_wins""#);
        assert!(matches!(result, Err(CompileError::Config(_))));
    }

    #[test]
    fn test_toml_roundtrip() {
        let options = CompilerOptions::default();
        let text = options.to_toml_string().unwrap();
        assert_eq!(CompilerOptions::from_toml_str(&text).unwrap(), options);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let options = CompilerOptions::load_or_default(Path::new("/nonexistent/options.toml"));
        assert_eq!(options, CompilerOptions::default());
    }
}
