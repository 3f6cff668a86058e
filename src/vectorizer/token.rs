use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum number of characters for a run of word characters to count as a term.
pub const MIN_TERM_CHARS: usize = 2;

/// word run: letters, numbers and `_`
/// combining marks (Mn/Mc) split a run, so vowel signs are not word characters
static WORD_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}_]+").expect("valid word pattern"));

/// テキストを小文字化し、単語文字の連続を term として切り出す
/// `MIN_TERM_CHARS` 未満の term は捨てる
///
/// # Examples
/// ```
/// use tech_similarity_graph::vectorizer::token::tokenize;
/// assert_eq!(tokenize("Solar-cell, a battery!"), vec!["solar", "cell", "battery"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_RUN
        .find_iter(&lowered)
        .map(|run| run.as_str())
        .filter(|run| run.chars().count() >= MIN_TERM_CHARS)
        .map(str::to_owned)
        .collect()
}

/// TermFrequency 構造体
/// 1 ドキュメント内の term の出現回数を管理する
///
/// term の挿入順を保持するので、同じ入力からは常に同じ順序で列挙される
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TermFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    term_count: IndexMap<String, u32>,
    total_term_count: u64,
}

impl TermFrequency {
    pub fn new() -> Self {
        TermFrequency {
            term_count: IndexMap::new(),
            total_term_count: 0,
        }
    }

    /// Tokenize `text` and count its terms.
    pub fn from_text(text: &str) -> Self {
        let mut freq = Self::new();
        freq.add_terms(&tokenize(text));
        freq
    }

    /// termを追加する
    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        let count = self.term_count.entry(term.to_string()).or_insert(0);
        *count += 1;
        self.total_term_count += 1;
        self
    }

    /// 複数のtermを追加する
    #[inline]
    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }

    #[inline]
    pub fn term_count(&self, term: &str) -> u32 {
        self.term_count.get(term).copied().unwrap_or(0)
    }

    /// total number of terms, duplicates included
    #[inline]
    pub fn term_sum(&self) -> u64 {
        self.total_term_count
    }

    /// number of distinct terms
    #[inline]
    pub fn term_num(&self) -> usize {
        self.term_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.term_count.is_empty()
    }

    /// distinct terms in first-seen order
    #[inline]
    pub fn term_set_ref_str(&self) -> Vec<&str> {
        self.term_count.keys().map(String::as_str).collect()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.term_count.iter().map(|(t, &c)| (t.as_str(), c))
    }
}
