//! Directory of known DICOM peers and local AE identities.
//!
//! Every query takes a fresh snapshot of the nodes file; nothing is cached.

pub mod store;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::{NodeStore, RawConfig};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Node '{0}' not found in configuration")]
    PeerNotFound(String),
}

/// A configured remote DICOM node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerNode {
    pub name: String,
    pub ae_title: String,
    #[serde(rename = "ip")]
    pub host: String,
    pub port: u16,
    pub description: String,
}

/// A local AE title usable as the calling side of an association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalIdentity {
    pub name: String,
    pub ae_title: String,
    pub description: String,
}

/// Output of `list_dicom_nodes`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeListing {
    pub nodes: Vec<PeerNode>,
    pub local_ae_titles: Vec<LocalIdentity>,
}

/// How a local AE name was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalAeResolution {
    Configured(LocalIdentity),
    Fallback(String),
}

impl LocalAeResolution {
    pub fn ae_title(&self) -> &str {
        match self {
            LocalAeResolution::Configured(identity) => &identity.ae_title,
            LocalAeResolution::Fallback(ae_title) => ae_title,
        }
    }
}

/// One snapshot of the nodes file. Peer names are unique; file order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    peers: Vec<PeerNode>,
    local_identities: Vec<LocalIdentity>,
}

impl Directory {
    pub fn from_raw(raw: RawConfig) -> Self {
        let mut peers: Vec<PeerNode> = Vec::with_capacity(raw.nodes.len());
        for (name, node) in raw.nodes {
            // Keys such as `104` and `"104"` normalise to the same name
            if peers.iter().any(|p| p.name == name) {
                tracing::warn!("Duplicate node name '{}' in configuration, keeping the first", name);
                continue;
            }
            peers.push(PeerNode {
                name,
                ae_title: node.ae_title,
                host: node.ip,
                port: node.port,
                description: node.description,
            });
        }

        let local_identities = raw
            .local_ae_titles
            .into_iter()
            .map(|ae| LocalIdentity {
                name: ae.name,
                ae_title: ae.ae_title,
                description: ae.description,
            })
            .collect();

        Self {
            peers,
            local_identities,
        }
    }

    pub fn peers(&self) -> &[PeerNode] {
        &self.peers
    }

    pub fn local_identities(&self) -> &[LocalIdentity] {
        &self.local_identities
    }

    pub fn resolve_peer(&self, name: &str) -> Result<PeerNode, DirectoryError> {
        self.peers
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| DirectoryError::PeerNotFound(name.to_string()))
    }

    /// First entry with a matching name wins; duplicates are tolerated.
    pub fn resolve_local_identity(&self, name: &str, fallback: &str) -> LocalAeResolution {
        let mut matches = self.local_identities.iter().filter(|ae| ae.name == name);
        match matches.next() {
            Some(identity) => {
                if matches.next().is_some() {
                    tracing::debug!("Local AE name '{}' is configured more than once, using the first", name);
                }
                LocalAeResolution::Configured(identity.clone())
            }
            None => LocalAeResolution::Fallback(fallback.to_string()),
        }
    }

    pub fn into_listing(self) -> NodeListing {
        NodeListing {
            nodes: self.peers,
            local_ae_titles: self.local_identities,
        }
    }
}

/// Queryable view over the nodes file
#[derive(Debug, Clone)]
pub struct DirectoryService {
    store: NodeStore,
    default_local_ae: String,
}

impl DirectoryService {
    pub fn new(store: NodeStore, default_local_ae: impl Into<String>) -> Self {
        Self {
            store,
            default_local_ae: default_local_ae.into(),
        }
    }

    pub fn default_local_ae(&self) -> &str {
        &self.default_local_ae
    }

    /// Re-read the nodes file
    pub fn snapshot(&self) -> Directory {
        Directory::from_raw(self.store.load())
    }

    /// Re-read the nodes file on the blocking pool
    pub async fn load_snapshot(&self) -> Directory {
        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || Directory::from_raw(store.load())).await {
            Ok(directory) => directory,
            Err(e) => {
                tracing::error!("Nodes configuration reader terminated: {}", e);
                Directory::default()
            }
        }
    }

    pub fn list_nodes(&self) -> NodeListing {
        self.snapshot().into_listing()
    }

    pub fn resolve_peer(&self, name: &str) -> Result<PeerNode, DirectoryError> {
        self.snapshot().resolve_peer(name)
    }

    pub fn resolve_local_identity(&self, name: &str) -> LocalAeResolution {
        self.snapshot()
            .resolve_local_identity(name, &self.default_local_ae)
    }
}
