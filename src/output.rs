//! Presentation-ready view of a run.
//!
//! Nothing here computes anything new: it flattens the graph, layout and
//! ranked table into records a renderer can consume, and encodes them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::graph::{NodeId, SimilarityGraph};
use crate::layout::{Layout, Position};
use crate::rank::RankedPair;

/// characters kept in a node caption before it is cut
pub const SHORT_LABEL_CHARS: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    /// full text, for hover
    pub label: String,
    /// caption drawn next to the marker
    pub short_label: String,
    /// drives the marker colour
    pub degree: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphOutput {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    pub positions: IndexMap<NodeId, Position>,
}

/// First `SHORT_LABEL_CHARS` characters, followed by `...` when the label is longer.
pub fn short_label(label: &str) -> String {
    let mut chars = label.chars();
    let head: String = chars.by_ref().take(SHORT_LABEL_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

impl GraphOutput {
    pub fn new(graph: &SimilarityGraph, layout: &Layout) -> Self {
        let nodes = graph
            .nodes()
            .map(|(id, data)| {
                let pos = layout.get(id).unwrap_or(Position { x: 0.0, y: 0.0 });
                NodeRecord {
                    id,
                    label: data.label.clone(),
                    short_label: short_label(&data.label),
                    degree: graph.degree(id),
                    x: pos.x,
                    y: pos.y,
                }
            })
            .collect();
        let edges = graph
            .edges()
            .into_iter()
            .map(|(source, target, weight)| EdgeRecord {
                source,
                target,
                weight,
            })
            .collect();
        GraphOutput {
            nodes,
            edges,
            positions: layout.positions().clone(),
        }
    }
}

/// Everything a renderer needs for one run, plus the parameters that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub parameters: PipelineConfig,
    pub graph: GraphOutput,
    pub ranked: Vec<RankedPair>,
}

impl Report {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }
}
