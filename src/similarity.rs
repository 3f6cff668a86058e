use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::utils::math::vector::SparseVec;
use crate::vectorizer::FeatureMatrix;

/// Row count from which upper-triangle rows are scored on the rayon pool.
const PAR_ROW_CUTOFF: usize = 256;

/// Scores within this distance of 1 are parallel rows.
const UNIT_SNAP: f64 = 1e-12;

/// Cosine of two rows in [0, 1]; parallel rows score exactly 1.
fn pair_score(a: &SparseVec<f64>, b: &SparseVec<f64>) -> f64 {
    let score = a.cosine_similarity(b);
    if 1.0 - score <= UNIT_SNAP {
        1.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Dense symmetric N × N cosine similarity matrix, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SimilarityMatrix {
    /// Score every pair of rows of an L2-normalised feature matrix.
    /// Only the upper triangle is computed; it is mirrored below the diagonal.
    pub fn from_features(features: &FeatureMatrix<f64>) -> Self {
        let rows = &features.rows;
        let n = rows.len();

        let score_row = |i: usize| -> Vec<f64> {
            (i..n)
                .map(|j| pair_score(&rows[i], &rows[j]))
                .collect()
        };
        let upper: Vec<Vec<f64>> = if n >= PAR_ROW_CUTOFF {
            (0..n).into_par_iter().map(score_row).collect()
        } else {
            (0..n).map(score_row).collect()
        };

        let mut data = vec![0.0; n * n];
        for (i, row) in upper.into_iter().enumerate() {
            for (offset, score) in row.into_iter().enumerate() {
                let j = i + offset;
                data[i * n + j] = score;
                data[j * n + i] = score;
            }
        }
        debug!("Similarity matrix computed - n={}", n);
        SimilarityMatrix { n, data }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// # Panics
    /// if `i` or `j` is out of range
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "({i}, {j}) out of {0}x{0}", self.n);
        self.data[i * self.n + j]
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Unordered pairs `(i, j, score)` with `i < j`, row by row.
    pub fn upper_pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.n).flat_map(move |i| ((i + 1)..self.n).map(move |j| (i, j, self.get(i, j))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::TfIdfVectorizer;

    fn matrix_of(texts: &[&str]) -> SimilarityMatrix {
        let features = TfIdfVectorizer::<f64>::new().fit_transform(texts).unwrap();
        SimilarityMatrix::from_features(&features)
    }

    #[test]
    fn symmetric_and_bounded() {
        let sim = matrix_of(&[
            "carbon nanotube sensor",
            "nanotube based gas sensor array",
            "thin film solar cell",
            "flexible solar panel with thin film",
            "",
        ]);
        for i in 0..sim.len() {
            for j in 0..sim.len() {
                let s = sim.get(i, j);
                assert_eq!(s, sim.get(j, i));
                assert!((0.0..=1.0).contains(&s));
            }
        }
    }

    #[test]
    fn diagonal_is_one_for_non_empty_rows() {
        let sim = matrix_of(&["graphene ink", "", "graphene coating"]);
        assert_eq!(sim.get(0, 0), 1.0);
        assert_eq!(sim.get(1, 1), 0.0);
        assert_eq!(sim.get(1, 2), 0.0);
    }

    #[test]
    fn shared_vocabulary_scores_positive() {
        let sim = matrix_of(&["solar cell battery", "battery storage system", "unrelated robotics topic"]);
        assert!(sim.get(0, 1) > 0.2);
        assert_eq!(sim.get(0, 2), 0.0);
        assert_eq!(sim.get(1, 2), 0.0);
    }

    #[test]
    fn duplicate_multi_term_rows_score_exactly_one() {
        for k in 1..10 {
            let text = (0..k).map(|t| format!("term{t}")).collect::<Vec<_>>().join(" ");
            let sim = matrix_of(&[&text, &text, "unrelated words"]);
            assert_eq!(sim.get(0, 1), 1.0, "{k} terms");
            assert_eq!(sim.get(0, 0), 1.0);
        }
    }

    #[test]
    fn upper_pairs_enumerates_i_less_than_j() {
        let sim = matrix_of(&["aa bb", "bb cc", "cc dd"]);
        let pairs: Vec<(usize, usize)> = sim.upper_pairs().map(|(i, j, _)| (i, j)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
        assert_eq!(sim.row(1).len(), 3);
    }

    #[test]
    fn large_matrix_matches_sequential_scores() {
        let texts: Vec<String> = (0..PAR_ROW_CUTOFF + 4)
            .map(|i| format!("alloy{} coating{} sensor", i % 7, i % 5))
            .collect();
        let features = TfIdfVectorizer::<f64>::new().fit_transform(&texts).unwrap();
        let sim = SimilarityMatrix::from_features(&features);
        assert_eq!(sim.len(), texts.len());
        let expected = pair_score(&features.rows[3], &features.rows[10]);
        assert_eq!(sim.get(3, 10), expected);
        assert_eq!(sim.get(10, 3), expected);
    }
}
