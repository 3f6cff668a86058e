use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::vectorizer::token::TermFrequency;

/// Document frequencies of every term seen in a corpus.
/// Term columns are assigned in lexicographic order once `finish` is called.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    /// number of documents added
    doc_num: u64,
    /// term -> number of documents containing it
    #[serde(with = "indexmap::map::serde_seq")]
    doc_freqs: IndexMap<Box<str>, u64>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self {
            doc_num: 0,
            doc_freqs: IndexMap::new(),
        }
    }

    /// Add one document's distinct terms.
    /// Empty documents still count towards the document number.
    pub fn add_doc(&mut self, freq: &TermFrequency) {
        self.doc_num += 1;
        for term in freq.term_set_ref_str() {
            self.doc_freqs
                .entry(term.into())
                .and_modify(|count| *count += 1)
                .or_insert(1);
        }
    }

    /// 辞書順に並べ替えて列番号を確定する
    pub fn finish(&mut self) {
        self.doc_freqs.sort_keys();
    }

    #[inline]
    pub fn doc_num(&self) -> u64 {
        self.doc_num
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.doc_freqs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.doc_freqs.is_empty()
    }

    /// column index of `term`
    #[inline]
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.doc_freqs.get_index_of(term)
    }

    /// (term, document frequency) in column order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.doc_freqs.iter().map(|(t, &df)| (t.as_ref(), df))
    }
}
