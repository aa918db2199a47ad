//! Reading `nodes.yaml`.
//!
//! The store never fails its caller: an unreadable or malformed file is logged
//! and treated as an empty configuration.

use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("top level must be a mapping with 'nodes' and 'local_ae_titles'")]
    NotAMapping,
}

/// A remote node entry as written in the file; absent fields are empty / zero
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNode {
    pub ae_title: String,
    pub ip: String,
    pub port: u16,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLocalAe {
    pub name: String,
    pub ae_title: String,
    pub description: String,
}

/// File contents in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    pub nodes: Vec<(String, RawNode)>,
    pub local_ae_titles: Vec<RawLocalAe>,
}

/// Read-only access to the nodes file at a fixed path
#[derive(Debug, Clone)]
pub struct NodeStore {
    path: PathBuf,
}

impl NodeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file, falling back to an empty configuration on any failure
    pub fn load(&self) -> RawConfig {
        match self.try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Error loading nodes configuration from {:?}: {}", self.path, e);
                RawConfig::default()
            }
        }
    }

    pub fn try_load(&self) -> Result<RawConfig, StoreError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        parse_nodes_yaml(&text)
    }
}

pub fn parse_nodes_yaml(text: &str) -> Result<RawConfig, StoreError> {
    let root: Value = serde_yaml::from_str(text)?;
    let root = match root {
        Value::Mapping(m) => m,
        _ => return Err(StoreError::NotAMapping),
    };

    let mut config = RawConfig::default();

    if let Some(Value::Mapping(nodes)) = root.get("nodes") {
        for (key, details) in nodes {
            let Some(name) = scalar_string(key) else {
                tracing::warn!("Ignoring node with non-scalar name: {:?}", key);
                continue;
            };
            let node = match details {
                Value::Mapping(m) => RawNode {
                    ae_title: string_field(m, "ae_title"),
                    ip: string_field(m, "ip"),
                    port: port_field(m, "port"),
                    description: string_field(m, "description"),
                },
                _ => RawNode::default(),
            };
            config.nodes.push((name, node));
        }
    }

    if let Some(Value::Sequence(entries)) = root.get("local_ae_titles") {
        for entry in entries {
            let local = match entry {
                Value::Mapping(m) => RawLocalAe {
                    name: string_field(m, "name"),
                    ae_title: string_field(m, "ae_title"),
                    description: string_field(m, "description"),
                },
                _ => RawLocalAe::default(),
            };
            config.local_ae_titles.push(local);
        }
    }

    Ok(config)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_field(map: &Mapping, key: &str) -> String {
    map.get(key).and_then(scalar_string).unwrap_or_default()
}

fn port_field(map: &Mapping, key: &str) -> u16 {
    match map.get(key) {
        Some(Value::Number(n)) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .unwrap_or(0)
}
