pub mod token;
pub mod tfidf;
pub mod vocabulary;

use std::marker::PhantomData;

use num::Float;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::utils::math::vector::SparseVec;
use crate::vectorizer::{
    tfidf::{DefaultTfIdfEngine, TfIdfEngine},
    token::TermFrequency,
    vocabulary::Vocabulary,
};

/// N × V matrix of L2-normalised TF-IDF rows, one row per corpus text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureMatrix<N = f64>
where
    N: Float,
{
    pub rows: Vec<SparseVec<N>>,
    pub vocabulary: Vocabulary,
}

impl<N> FeatureMatrix<N>
where
    N: Float,
{
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.vocabulary.len()
    }

    #[inline]
    pub fn row(&self, index: usize) -> Option<&SparseVec<N>> {
        self.rows.get(index)
    }
}

/// TF-IDF Vectorizer
/// Fits a vocabulary on a set of texts and turns each text into a
/// cosine-ready feature row.
///
/// - `N`: element type (f32, f64)
/// - `E`: weighting engine (`DefaultTfIdfEngine` for smoothed idf)
#[derive(Debug, Clone, Default)]
pub struct TfIdfVectorizer<N = f64, E = DefaultTfIdfEngine>
where
    N: Float,
    E: TfIdfEngine<N>,
{
    _marker: PhantomData<(N, E)>,
}

impl<N, E> TfIdfVectorizer<N, E>
where
    N: Float,
    E: TfIdfEngine<N>,
{
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Build the vocabulary from `texts` and weight every text against it.
    ///
    /// # Errors
    /// `PipelineError::Vectorization` when no text yields a single term.
    pub fn fit_transform<T>(&self, texts: &[T]) -> Result<FeatureMatrix<N>>
    where
        T: AsRef<str>,
    {
        let freqs: Vec<TermFrequency> = texts
            .iter()
            .map(|text| TermFrequency::from_text(text.as_ref()))
            .collect();

        let mut vocabulary = Vocabulary::new();
        for freq in &freqs {
            vocabulary.add_doc(freq);
        }
        vocabulary.finish();

        if vocabulary.is_empty() {
            warn!("Vectorization failed - docs={}, vocabulary is empty", texts.len());
            return Err(PipelineError::Vectorization);
        }

        let idf = E::idf_vec(&vocabulary);
        let mut empty_rows = 0usize;
        let rows: Vec<SparseVec<N>> = freqs
            .iter()
            .map(|freq| {
                let mut row = E::tf_vec(freq, &vocabulary);
                row.hadamard_dense(&idf);
                row.normalize_l2();
                if row.is_zero() {
                    empty_rows += 1;
                }
                row
            })
            .collect();

        debug!(
            "Vectorized - docs={}, vocabulary={}, empty_rows={}",
            rows.len(),
            vocabulary.len(),
            empty_rows
        );

        Ok(FeatureMatrix { rows, vocabulary })
    }
}
