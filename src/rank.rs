use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corpus::TextCorpus;
use crate::graph::NodeId;
use crate::similarity::SimilarityMatrix;

pub const DEFAULT_TOP_N: usize = 20;

/// One row of the ranked table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPair {
    pub index_a: NodeId,
    pub index_b: NodeId,
    pub text_a: String,
    pub text_b: String,
    /// rounded to 3 decimals for display
    pub similarity: f64,
}

/// Round half away from zero to 3 decimal places.
#[inline]
pub fn round3(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

/// Top `top_n` pairs `(i, j)`, `i < j`, whose score reaches `threshold`.
///
/// Sorted on the full-precision score, highest first; equal scores keep their
/// enumeration order. Keyword filtering never narrows this list.
pub fn top_pairs(
    corpus: &TextCorpus,
    sim: &SimilarityMatrix,
    threshold: f64,
    top_n: usize,
) -> Vec<RankedPair> {
    let mut pairs: Vec<(NodeId, NodeId, f64)> = sim
        .upper_pairs()
        .filter(|&(_, _, score)| score >= threshold)
        .collect();
    let qualifying = pairs.len();
    // stable sort: ties stay in (i, j) order
    pairs.sort_by(|a, b| b.2.total_cmp(&a.2));
    pairs.truncate(top_n);

    debug!(
        "Ranked pairs extracted - qualifying={}, kept={}, top_n={}",
        qualifying,
        pairs.len(),
        top_n
    );

    pairs
        .into_iter()
        .map(|(i, j, score)| RankedPair {
            index_a: i,
            index_b: j,
            text_a: corpus.get(i).unwrap_or_default().to_string(),
            text_b: corpus.get(j).unwrap_or_default().to_string(),
            similarity: round3(score),
        })
        .collect()
}
