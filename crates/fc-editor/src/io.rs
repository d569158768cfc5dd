//! JSON import/export at the engine boundary.
//!
//! Export always writes the full bundle: the current snapshot plus every
//! saved version. Import accepts that bundle or a bare `{nodes, edges}`
//! document, distinguished by the presence of a `history` key. Parsing is
//! all-or-nothing — callers only touch engine state after a full, valid
//! parse, so a malformed file can never leave a half-imported document.

use fc_core::{Edge, Node, Snapshot, Version};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Why an import was rejected. Engine state stays untouched in every case;
/// the message is shown to the user as-is.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("unrecognized document shape: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Parsed import payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportData {
    /// Full export bundle. The version list carries the state; the newest
    /// version becomes the canvas.
    Bundle { versions: Vec<Version> },
    /// Bare snapshot document.
    Bare { snapshot: Snapshot },
}

#[derive(Serialize)]
struct BundleOut<'a> {
    nodes: &'a [Node],
    edges: &'a [Edge],
    history: &'a [Version],
}

#[derive(Deserialize)]
struct BundleIn {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    history: Vec<Version>,
}

/// Serialize the full export bundle.
pub fn export_bundle(snapshot: &Snapshot, versions: &[Version]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&BundleOut {
        nodes: &snapshot.nodes,
        edges: &snapshot.edges,
        history: versions,
    })
}

/// Parse an import without applying it.
pub fn parse_import(text: &str) -> Result<ImportData, ImportError> {
    let value: Value = serde_json::from_str(text).map_err(ImportError::Parse)?;
    if value.get("history").is_some() {
        let bundle: BundleIn = serde_json::from_value(value).map_err(ImportError::Shape)?;
        log::debug!(
            "parsed bundle: {} node(s), {} edge(s), {} version(s)",
            bundle.nodes.len(),
            bundle.edges.len(),
            bundle.history.len()
        );
        Ok(ImportData::Bundle { versions: bundle.history })
    } else {
        let snapshot: Snapshot = serde_json::from_value(value).map_err(ImportError::Shape)?;
        Ok(ImportData::Bare { snapshot })
    }
}
