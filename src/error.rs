use std::path::PathBuf;
use thiserror::Error;

/// Terminal conditions of a pipeline run.
/// Every variant halts the run; nothing downstream is computed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to load corpus: {0}")]
    CorpusLoad(#[from] CorpusLoadError),

    #[error("empty vocabulary: the corpus contains no usable terms")]
    Vectorization,

    #[error("the corpus produced no nodes; check the selected column and the source contents")]
    EmptyCorpus,

    #[error("no pair reaches similarity threshold {threshold}; try lowering the threshold")]
    NoEdges { threshold: f64 },

    #[error("no text contains keyword {keyword:?}; try a different keyword")]
    NoMatch { keyword: String },

    #[error("invalid threshold {0}: must be within [0.0, 1.0]")]
    InvalidThreshold(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl PipelineError {
    /// Short advice for the person adjusting the parameters.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            PipelineError::NoEdges { .. } => Some("lower the similarity threshold"),
            PipelineError::NoMatch { .. } => Some("change or clear the keyword"),
            PipelineError::EmptyCorpus | PipelineError::Vectorization => {
                Some("check the text column and the corpus contents")
            }
            PipelineError::InvalidThreshold(_) => Some("pick a threshold between 0.0 and 1.0"),
            PipelineError::CorpusLoad(_) | PipelineError::InvalidConfig(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CorpusLoadError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("malformed JSON records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of objects")]
    NotRecords,

    #[error("column {column:?} not found; available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },
}

impl From<std::io::Error> for CorpusLoadError {
    fn from(source: std::io::Error) -> Self {
        CorpusLoadError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("top_n must be at least 1")]
    ZeroTopN,

    #[error("layout scale must be a positive finite number, got {0}")]
    LayoutScale(f64),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
