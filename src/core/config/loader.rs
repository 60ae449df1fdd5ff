//! Config file loading.
//!
//! Loading never fails: a missing file, an unreadable file or a document
//! that does not parse all contribute an empty mapping. Failures are logged
//! as warnings so the operator can see which layer was dropped.

use std::path::Path;

use serde_yaml::Value;
use tracing::{debug, warn};

use super::node::Node;
use crate::error::ConfigError;

/// Supported config document formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    /// `.toml` and `.json` map to their formats; anything else is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Load one config file.
pub fn load_file(path: &Path) -> Node {
    if !path.exists() {
        debug!(path = %path.display(), "config file not found, using empty document");
        return Node::mapping();
    }

    match read_document(path) {
        Ok(node) => {
            debug!(path = %path.display(), leaves = node.leaf_count(), "loaded config file");
            node
        }
        Err(e) => {
            warn!(error = %e, "ignoring config file");
            Node::mapping()
        }
    }
}

fn read_document(path: &Path) -> Result<Node, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    parse_str(&contents, Format::from_path(path)).map_err(|reason| ConfigError::Load {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parse a config document.
///
/// An empty document is an empty mapping. A document whose top level is
/// not a mapping is rejected.
pub fn parse_str(contents: &str, format: Format) -> Result<Node, String> {
    let value: Value = match format {
        Format::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string())?,
        Format::Toml => toml::from_str(contents).map_err(|e| e.to_string())?,
        Format::Json => serde_json::from_str(contents).map_err(|e| e.to_string())?,
    };

    match Node::from(value) {
        Node::Null => Ok(Node::mapping()),
        node @ Node::Mapping(_) => Ok(node),
        _ => Err("top-level document is not a mapping".to_string()),
    }
}
