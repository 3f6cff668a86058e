use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::graph::{NodeId, SimilarityGraph};

/// Restrict `graph` to the closed 1-hop neighbourhood of the nodes whose label
/// contains `keyword` (case-sensitive).
///
/// The keyword is trimmed first; an empty keyword returns a copy of the graph.
/// Edges among kept nodes are preserved as they are, and neighbours stay even
/// when their own label does not match.
///
/// # Errors
/// `NoMatch` when no label contains the keyword.
pub fn filter_by_keyword(graph: &SimilarityGraph, keyword: &str) -> Result<SimilarityGraph> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Ok(graph.clone());
    }

    let matched: Vec<NodeId> = graph
        .nodes()
        .filter(|(_, data)| data.label.contains(keyword))
        .map(|(id, _)| id)
        .collect();
    if matched.is_empty() {
        warn!("Keyword filter matched nothing - keyword={:?}", keyword);
        return Err(PipelineError::NoMatch {
            keyword: keyword.to_string(),
        });
    }

    let mut keep: IndexSet<NodeId> = IndexSet::new();
    for &id in &matched {
        keep.insert(id);
        keep.extend(graph.neighbors(id));
    }
    let sub = graph.subgraph(&keep);
    debug!(
        "Keyword filter applied - keyword={:?}, matched={}, kept_nodes={}, kept_edges={}",
        keyword,
        matched.len(),
        sub.node_count(),
        sub.edge_count()
    );
    Ok(sub)
}
