// src/artifact.rs
//
// The downloadable artifact is an n8n-importable workflow document. The
// format has to round-trip: re-importing the exported JSON must reproduce
// the same node/connection graph.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::CatalogItem;
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(rename = "typeVersion")]
    pub type_version: u32,
    pub parameters: Value,
    pub position: [i64; 2],
}

/// One edge leaving a node's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTarget {
    pub node: String,
    #[serde(rename = "type")]
    pub connection_type: String,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConnections {
    pub main: Vec<Vec<ConnectionTarget>>,
}

/// Source node name -> outgoing edges, deterministically ordered.
pub type ConnectionMap = BTreeMap<String, NodeConnections>;

/// The node/connection graph stored with a catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub nodes: Vec<WorkflowNode>,
    pub connections: ConnectionMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSettings {
    #[serde(rename = "executionOrder")]
    pub execution_order: String,
}

/// The document actually handed to the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowArtifact {
    pub name: String,
    pub nodes: Vec<WorkflowNode>,
    pub connections: ConnectionMap,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub settings: ArtifactSettings,
    #[serde(rename = "staticData")]
    pub static_data: Option<Value>,
    pub tags: Vec<String>,
    #[serde(rename = "triggerCount")]
    pub trigger_count: u32,
    #[serde(rename = "versionId")]
    pub version_id: String,
}

#[derive(Debug)]
pub struct DownloadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub fn build_artifact(item: &CatalogItem, now: DateTime<Utc>) -> WorkflowArtifact {
    WorkflowArtifact {
        name: item.workflow.name.clone(),
        nodes: item.workflow.nodes.clone(),
        connections: item.workflow.connections.clone(),
        created_at: now,
        updated_at: now,
        settings: ArtifactSettings {
            execution_order: "v1".to_string(),
        },
        static_data: None,
        tags: Vec::new(),
        trigger_count: 0,
        version_id: item.version.clone(),
    }
}

pub fn render_download(item: &CatalogItem, now: DateTime<Utc>) -> Result<DownloadFile, Error> {
    let artifact = build_artifact(item, now);
    let bytes = serde_json::to_vec_pretty(&artifact)
        .map_err(|e| Error::Upstream(format!("artifact serialization failed: {e}")))?;
    Ok(DownloadFile {
        filename: artifact_filename(&item.title, &item.version),
        bytes,
    })
}

/// Deterministic attachment name: every non-alphanumeric character becomes
/// `-`, lower-cased, suffixed with the item version.
pub fn artifact_filename(title: &str, version: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("{slug}-v{version}.json")
}
