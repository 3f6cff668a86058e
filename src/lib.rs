/// This crate turns a small corpus of technology descriptions into a TF-IDF
/// similarity graph, a spring layout for drawing it, and a ranked table of the
/// most similar pairs.
pub mod config;
pub mod corpus;
pub mod error;
pub mod graph;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod rank;
pub mod similarity;
pub mod utils;
pub mod vectorizer;

/// Pipeline entry points
/// `run` executes vectorize → similarity → graph → keyword filter → layout →
/// ranking from scratch.
/// `SimilarityPipeline` keeps the feature and similarity matrices of one
/// corpus so that threshold and keyword changes only redo the cheap stages.
///
/// Both return a `PipelineOutput` holding:
/// - the displayed graph (filtered when a keyword is set)
/// - its layout
/// - the ranked pairs of the whole corpus (never narrowed by the keyword)
pub use pipeline::{run, run_with_config, PipelineOutput, SimilarityPipeline};

/// Run parameters
/// Threshold (default 0.3), keyword (default empty = no filter), table size
/// (default 20) and layout settings (seed 42). Loadable from TOML.
pub use config::PipelineConfig;

/// Text Corpus
/// Ordered raw texts; the position of a text is its node id.
/// Loaders read plain lines or one column of JSON records.
pub use corpus::TextCorpus;

/// Errors
/// Every variant of `PipelineError` is terminal and distinct so callers can
/// show the matching advice (`PipelineError::hint`).
pub use error::{ConfigError, CorpusLoadError, PipelineError};

/// TF-IDF Vectorizer
/// Smoothed idf, raw-count tf, L2-normalised rows.
/// The weighting is pluggable through `TfIdfEngine`.
pub use vectorizer::{
    tfidf::{DefaultTfIdfEngine, TfIdfEngine},
    FeatureMatrix, TfIdfVectorizer,
};

pub use similarity::SimilarityMatrix;
pub use graph::{filter::filter_by_keyword, NodeId, SimilarityGraph};
pub use layout::{spring_layout, Layout, LayoutConfig, Position};
pub use rank::{top_pairs, RankedPair};

/// Presentation records
/// `GraphOutput` flattens nodes (with short captions and degrees), edges and
/// positions; `Report` adds the ranked table and the run parameters and can
/// be encoded as JSON or CBOR.
pub use output::{GraphOutput, Report};
