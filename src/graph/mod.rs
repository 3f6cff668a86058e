pub mod filter;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::corpus::TextCorpus;
use crate::error::{PipelineError, Result};
use crate::similarity::SimilarityMatrix;

/// Node identifier: the corpus row index
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// raw text of the corpus row
    pub label: String,
}

/// Undirected weighted graph without self-loops.
///
/// Nodes and each adjacency list keep insertion order, so iteration is
/// reproducible: nodes in the order they were added, edges by first endpoint
/// and then by the order the second endpoint was attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityGraph {
    nodes: IndexMap<NodeId, NodeData>,
    adjacency: IndexMap<NodeId, IndexMap<NodeId, f64>>,
}

impl SimilarityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node or replace the label of an existing one.
    pub fn add_node(&mut self, id: NodeId, label: impl Into<String>) {
        self.nodes.insert(id, NodeData { label: label.into() });
        self.adjacency.entry(id).or_default();
    }

    /// Connect `u` and `v`, adding missing endpoints with empty labels.
    /// Self-loops are ignored.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, weight: f64) {
        if u == v {
            warn!("Ignoring self-loop on node {}", u);
            return;
        }
        for id in [u, v] {
            if !self.nodes.contains_key(&id) {
                self.add_node(id, String::new());
            }
        }
        self.adjacency.entry(u).or_default().insert(v, weight);
        self.adjacency.entry(v).or_default().insert(u, weight);
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(IndexMap::len).sum::<usize>() / 2
    }

    #[inline]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[inline]
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.label.as_str())
    }

    /// Number of incident edges; 0 for unknown nodes.
    #[inline]
    pub fn degree(&self, id: NodeId) -> usize {
        self.adjacency.get(&id).map_or(0, IndexMap::len)
    }

    #[inline]
    pub fn edge_weight(&self, u: NodeId, v: NodeId) -> Option<f64> {
        self.adjacency.get(&u).and_then(|nbrs| nbrs.get(&v)).copied()
    }

    #[inline]
    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.edge_weight(u, v).is_some()
    }

    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|nbrs| nbrs.keys().copied())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeData)> + '_ {
        self.nodes.iter().map(|(&id, data)| (id, data))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Index of `id` in node iteration order.
    #[inline]
    pub fn node_index(&self, id: NodeId) -> Option<usize> {
        self.nodes.get_index_of(&id)
    }

    /// Every edge once as `(u, v, weight)`, `u` being the endpoint seen first.
    pub fn edges(&self) -> Vec<(NodeId, NodeId, f64)> {
        let mut seen: IndexSet<NodeId> = IndexSet::with_capacity(self.nodes.len());
        let mut edges = Vec::with_capacity(self.edge_count());
        for (&u, nbrs) in &self.adjacency {
            for (&v, &weight) in nbrs {
                if !seen.contains(&v) {
                    edges.push((u, v, weight));
                }
            }
            seen.insert(u);
        }
        edges
    }

    /// Induced subgraph over `keep`.
    /// Node order follows this graph; ids absent here are skipped.
    pub fn subgraph(&self, keep: &IndexSet<NodeId>) -> SimilarityGraph {
        let mut sub = SimilarityGraph::new();
        for (id, data) in self.nodes() {
            if keep.contains(&id) {
                sub.add_node(id, data.label.clone());
            }
        }
        for (u, v, weight) in self.edges() {
            if keep.contains(&u) && keep.contains(&v) {
                sub.add_edge(u, v, weight);
            }
        }
        sub
    }

    /// Build the threshold graph over a corpus.
    ///
    /// Every text becomes a node, connected or not. Pair `(i, j)`, `i < j`,
    /// is joined iff `sim[i][j] >= threshold`, weighted by the score.
    ///
    /// # Errors
    /// - `EmptyCorpus` when there is no node
    /// - `NoEdges` when no pair reaches the threshold
    ///
    /// # Panics
    /// if `sim` was not computed over `corpus` (row counts differ)
    pub fn from_similarity(
        corpus: &TextCorpus,
        sim: &SimilarityMatrix,
        threshold: f64,
    ) -> Result<Self> {
        assert_eq!(
            corpus.len(),
            sim.len(),
            "similarity matrix does not match the corpus"
        );
        let mut graph = SimilarityGraph::new();
        for (id, text) in corpus.iter() {
            graph.add_node(id, text);
        }
        for (i, j, score) in sim.upper_pairs() {
            if score >= threshold {
                graph.add_edge(i, j, score);
            }
        }

        if graph.node_count() == 0 {
            warn!("Graph build failed - corpus has no rows");
            return Err(PipelineError::EmptyCorpus);
        }
        if graph.edge_count() == 0 {
            warn!(
                "Graph build failed - nodes={}, threshold={}, no qualifying pair",
                graph.node_count(),
                threshold
            );
            return Err(PipelineError::NoEdges { threshold });
        }
        debug!(
            "Graph built - nodes={}, edges={}, threshold={}",
            graph.node_count(),
            graph.edge_count(),
            threshold
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::TfIdfVectorizer;

    fn build(texts: &[&str], threshold: f64) -> Result<SimilarityGraph> {
        let corpus = TextCorpus::from_texts(texts.iter().copied());
        let features = TfIdfVectorizer::<f64>::new().fit_transform(corpus.texts())?;
        let sim = SimilarityMatrix::from_features(&features);
        SimilarityGraph::from_similarity(&corpus, &sim, threshold)
    }

    #[test]
    fn edges_are_listed_once_without_self_loops() {
        let mut g = SimilarityGraph::new();
        g.add_node(0, "a");
        g.add_node(1, "b");
        g.add_node(2, "c");
        g.add_edge(0, 2, 0.5);
        g.add_edge(1, 0, 0.7);
        g.add_edge(2, 2, 1.0);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.edges(), vec![(0, 2, 0.5), (0, 1, 0.7)]);
        assert_eq!(g.degree(0), 2);
        assert_eq!(g.degree(2), 1);
        assert_eq!(g.degree(9), 0);
        assert_eq!(g.edge_weight(2, 0), Some(0.5));
        assert!(!g.has_edge(1, 2));
    }

    #[test]
    fn subgraph_keeps_parent_order_and_weights() {
        let mut g = SimilarityGraph::new();
        for id in 0..4 {
            g.add_node(id, format!("n{id}"));
        }
        g.add_edge(0, 1, 0.4);
        g.add_edge(1, 3, 0.6);
        g.add_edge(2, 3, 0.9);
        let keep: IndexSet<NodeId> = [3, 1, 0].into_iter().collect();
        let sub = g.subgraph(&keep);
        assert_eq!(sub.node_ids().collect::<Vec<_>>(), vec![0, 1, 3]);
        assert_eq!(sub.edges(), vec![(0, 1, 0.4), (1, 3, 0.6)]);
        assert_eq!(sub.label(3), Some("n3"));
        // parent untouched
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn threshold_graph_keeps_isolated_nodes() {
        let g = build(
            &["solar cell battery", "battery storage system", "unrelated robotics topic"],
            0.1,
        )
        .unwrap();
        assert_eq!(g.node_count(), 3);
        assert!(g.has_edge(0, 1));
        assert!(!g.has_edge(0, 2));
        assert!(!g.has_edge(1, 2));
        assert_eq!(g.degree(2), 0);
        assert_eq!(g.label(2), Some("unrelated robotics topic"));
    }

    #[test]
    fn identical_texts_form_a_triangle() {
        let g = build(&["nano coating", "nano coating", "nano coating"], 0.99).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        for (_, _, w) in g.edges() {
            assert!((w - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn no_qualifying_pair_is_an_error() {
        let err = build(&["solar cell battery", "battery storage system"], 1.0).unwrap_err();
        assert!(matches!(err, PipelineError::NoEdges { threshold } if threshold == 1.0));
    }

    #[test]
    fn empty_corpus_is_an_error() {
        let corpus = TextCorpus::default();
        let sim = SimilarityMatrix::from_features(&crate::vectorizer::FeatureMatrix {
            rows: Vec::new(),
            vocabulary: Default::default(),
        });
        let err = SimilarityGraph::from_similarity(&corpus, &sim, 0.3).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyCorpus));
    }

    #[test]
    #[should_panic(expected = "does not match the corpus")]
    fn mismatched_matrix_panics() {
        let features = TfIdfVectorizer::<f64>::new()
            .fit_transform(&["nano coating", "nano ink", "solar cell"])
            .unwrap();
        let sim = SimilarityMatrix::from_features(&features);
        let corpus = TextCorpus::from_texts(["nano coating", "nano ink"]);
        let _ = SimilarityGraph::from_similarity(&corpus, &sim, 0.1);
    }

    #[test]
    fn raising_threshold_only_removes_edges() {
        let texts = [
            "carbon nanotube gas sensor",
            "nanotube sensor array",
            "gas barrier film",
            "thin film solar cell",
            "solar cell efficiency coating",
        ];
        let low = build(&texts, 0.05).unwrap();
        let high = build(&texts, 0.2).unwrap();
        for (u, v, _) in high.edges() {
            assert!(low.has_edge(u, v));
        }
        assert!(high.edge_count() <= low.edge_count());
    }
}
