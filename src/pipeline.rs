use tracing::info;

use crate::config::PipelineConfig;
use crate::corpus::TextCorpus;
use crate::error::Result;
use crate::graph::{filter::filter_by_keyword, SimilarityGraph};
use crate::layout::{spring_layout, Layout};
use crate::output::{GraphOutput, Report};
use crate::rank::{top_pairs, RankedPair};
use crate::similarity::SimilarityMatrix;
use crate::vectorizer::{FeatureMatrix, TfIdfVectorizer};

/// Result of one run: the displayed (possibly filtered) graph, its layout,
/// and the ranked pairs of the whole corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub graph: SimilarityGraph,
    pub layout: Layout,
    pub ranked: Vec<RankedPair>,
}

impl PipelineOutput {
    pub fn graph_output(&self) -> GraphOutput {
        GraphOutput::new(&self.graph, &self.layout)
    }

    pub fn into_report(self, parameters: PipelineConfig) -> Report {
        Report {
            graph: GraphOutput::new(&self.graph, &self.layout),
            ranked: self.ranked,
            parameters,
        }
    }
}

/// Corpus with its feature and similarity matrices computed once.
///
/// `run` can then be called for any threshold or keyword without
/// re-vectorising; each call is independent and gives the same output as
/// the free [`run`] function.
#[derive(Debug, Clone)]
pub struct SimilarityPipeline {
    corpus: TextCorpus,
    features: FeatureMatrix<f64>,
    similarity: SimilarityMatrix,
}

impl SimilarityPipeline {
    /// # Errors
    /// `Vectorization` when the corpus yields no term at all.
    pub fn new(corpus: TextCorpus) -> Result<Self> {
        let features = TfIdfVectorizer::<f64>::new().fit_transform(corpus.texts())?;
        let similarity = SimilarityMatrix::from_features(&features);
        Ok(SimilarityPipeline {
            corpus,
            features,
            similarity,
        })
    }

    #[inline]
    pub fn corpus(&self) -> &TextCorpus {
        &self.corpus
    }

    #[inline]
    pub fn features(&self) -> &FeatureMatrix<f64> {
        &self.features
    }

    #[inline]
    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    /// Build, filter, lay out and rank for one set of parameters.
    ///
    /// Errors surface in pipeline order: invalid parameters, then
    /// `EmptyCorpus` / `NoEdges` from the graph build, then `NoMatch` from
    /// the keyword filter.
    pub fn run(&self, config: &PipelineConfig) -> Result<PipelineOutput> {
        config.validate()?;
        let full = SimilarityGraph::from_similarity(&self.corpus, &self.similarity, config.threshold)?;
        let graph = filter_by_keyword(&full, &config.keyword)?;
        let layout = spring_layout(&graph, &config.layout);
        let ranked = top_pairs(&self.corpus, &self.similarity, config.threshold, config.top_n);

        info!(
            "Pipeline finished - texts={}, threshold={}, keyword={:?}, nodes={}/{}, edges={}/{}, ranked={}",
            self.corpus.len(),
            config.threshold,
            config.keyword.trim(),
            graph.node_count(),
            full.node_count(),
            graph.edge_count(),
            full.edge_count(),
            ranked.len()
        );
        Ok(PipelineOutput {
            graph,
            layout,
            ranked,
        })
    }
}

/// One fresh run over `corpus` with default layout and table size.
pub fn run(corpus: &TextCorpus, threshold: f64, keyword: &str) -> Result<PipelineOutput> {
    run_with_config(corpus, &PipelineConfig::new(threshold, keyword))
}

/// One fresh run with explicit parameters.
/// Parameters are validated before any vectorising work.
pub fn run_with_config(corpus: &TextCorpus, config: &PipelineConfig) -> Result<PipelineOutput> {
    config.validate()?;
    SimilarityPipeline::new(corpus.clone())?.run(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    fn corpus() -> TextCorpus {
        TextCorpus::from_texts([
            "graphene battery anode material",
            "silicon anode for lithium battery",
            "quantum dot display film",
            "micro LED display panel",
            "antibacterial nano coating",
        ])
    }

    #[test]
    fn memoised_runs_match_fresh_runs() {
        let pipeline = SimilarityPipeline::new(corpus()).unwrap();
        for (threshold, keyword) in [(0.1, ""), (0.1, "display"), (0.05, "anode")] {
            let config = PipelineConfig::new(threshold, keyword);
            assert_eq!(
                pipeline.run(&config).unwrap(),
                run(&corpus(), threshold, keyword).unwrap()
            );
        }
    }

    #[test]
    fn ranked_pairs_ignore_keyword() {
        let unfiltered = run(&corpus(), 0.1, "").unwrap();
        let filtered = run(&corpus(), 0.1, "display").unwrap();
        assert!(filtered.graph.node_count() < unfiltered.graph.node_count());
        assert_eq!(filtered.ranked, unfiltered.ranked);
    }

    #[test]
    fn layout_covers_displayed_nodes() {
        let out = run(&corpus(), 0.1, "anode").unwrap();
        assert_eq!(out.layout.len(), out.graph.node_count());
        for id in out.graph.node_ids() {
            assert!(out.layout.get(id).is_some());
        }
    }

    #[test]
    fn invalid_threshold_stops_before_vectorising() {
        let err = run(&TextCorpus::from_texts(["", ""]), 1.5, "").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidThreshold(_)));
    }

    #[test]
    fn no_edges_is_reported_before_keyword() {
        let err = run(&corpus(), 1.0, "nothing-matches").unwrap_err();
        assert!(matches!(err, PipelineError::NoEdges { .. }));
        assert_eq!(err.hint(), Some("lower the similarity threshold"));
    }

    #[test]
    fn report_bundles_parameters() {
        let config = PipelineConfig::new(0.1, "coating");
        let out = run_with_config(&corpus(), &config);
        // "antibacterial nano coating" shares nothing with the rest
        assert!(out.is_ok());
        let report = out.unwrap().into_report(config.clone());
        assert_eq!(report.parameters, config);
        assert_eq!(report.graph.nodes.len(), 1);
        assert!(report.graph.edges.is_empty());
    }
}
