use num::{Float, NumCast};

use crate::utils::math::vector::SparseVec;
use crate::vectorizer::{token::TermFrequency, vocabulary::Vocabulary};

/// TF-IDF calculation engine.
/// Plugged into `TfIdfVectorizer<N, E>` to choose the weighting strategy.
pub trait TfIdfEngine<N>
where
    N: Float,
{
    /// IDFベクトルを生成する (語彙の列順)
    fn idf_vec(vocab: &Vocabulary) -> Vec<N>;
    /// TFベクトルを生成する (語彙にない term は無視)
    fn tf_vec(freq: &TermFrequency, vocab: &Vocabulary) -> SparseVec<N>;
}

/// デフォルトのTF-IDFエンジン
/// - tf: raw term count
/// - idf: smoothed, `ln((1 + n) / (1 + df)) + 1`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTfIdfEngine;

impl DefaultTfIdfEngine {
    /// smoothed idf; a term present in every document still weighs 1
    #[inline]
    pub fn idf_calc(doc_num: u64, doc_freq: u64) -> f64 {
        ((1.0 + doc_num as f64) / (1.0 + doc_freq as f64)).ln() + 1.0
    }
}

impl<N> TfIdfEngine<N> for DefaultTfIdfEngine
where
    N: Float,
{
    fn idf_vec(vocab: &Vocabulary) -> Vec<N> {
        let doc_num = vocab.doc_num();
        vocab
            .iter()
            .map(|(_, df)| <N as NumCast>::from(Self::idf_calc(doc_num, df)).unwrap_or_else(N::one))
            .collect()
    }

    fn tf_vec(freq: &TermFrequency, vocab: &Vocabulary) -> SparseVec<N> {
        let pairs: Vec<(u32, N)> = freq
            .iter()
            .filter_map(|(term, count)| {
                let idx = vocab.index_of(term)?;
                Some((idx as u32, <N as NumCast>::from(count)?))
            })
            .collect();
        SparseVec::from_pairs(vocab.len(), pairs)
    }
}
