use std::cmp::Ordering;
use std::fmt::Debug;

use num::Float;
use serde::{Deserialize, Serialize};

/// SparseVec は 0 要素を省略した疎ベクトル
/// indices と values を並行して持ち、
/// indices は昇順でソートされ重複しないことを保証する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVec<N = f64>
where
    N: Float,
{
    inds: Vec<u32>,
    vals: Vec<N>,
    /// 論理的な次元数 (語彙サイズ)
    dim: usize,
}

impl<N> SparseVec<N>
where
    N: Float,
{
    #[inline]
    pub fn new(dim: usize) -> Self {
        SparseVec {
            inds: Vec::new(),
            vals: Vec::new(),
            dim,
        }
    }

    /// Build from unordered `(index, value)` pairs.
    /// Zero values are dropped and duplicated indices are summed.
    pub fn from_pairs(dim: usize, mut pairs: Vec<(u32, N)>) -> Self {
        pairs.sort_unstable_by_key(|&(idx, _)| idx);
        let mut inds: Vec<u32> = Vec::with_capacity(pairs.len());
        let mut vals: Vec<N> = Vec::with_capacity(pairs.len());
        for (idx, val) in pairs {
            debug_assert!((idx as usize) < dim, "index {idx} out of dim {dim}");
            match inds.last() {
                Some(&last) if last == idx => {
                    if let Some(v) = vals.last_mut() {
                        *v = *v + val;
                    }
                }
                _ => {
                    inds.push(idx);
                    vals.push(val);
                }
            }
        }
        let mut vec = SparseVec { inds, vals, dim };
        vec.drop_zeros();
        vec
    }

    fn drop_zeros(&mut self) {
        if self.vals.iter().all(|v| !v.is_zero()) {
            return;
        }
        let (inds, vals): (Vec<u32>, Vec<N>) = self
            .inds
            .iter()
            .zip(self.vals.iter())
            .filter(|(_, v)| !v.is_zero())
            .map(|(&i, &v)| (i, v))
            .unzip();
        self.inds = inds;
        self.vals = vals;
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// number of non-zero entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.inds.len()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.inds.is_empty()
    }

    pub fn get(&self, index: u32) -> N {
        match self.inds.binary_search(&index) {
            Ok(pos) => self.vals[pos],
            Err(_) => N::zero(),
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (u32, N)> + '_ {
        self.inds.iter().copied().zip(self.vals.iter().copied())
    }

    /// Element-wise scaling by a dense vector of the same dimension.
    pub fn hadamard_dense(&mut self, dense: &[N]) {
        debug_assert_eq!(dense.len(), self.dim);
        for (idx, val) in self.inds.iter().zip(self.vals.iter_mut()) {
            *val = *val * dense[*idx as usize];
        }
        self.drop_zeros();
    }

    /// ||a|| = sqrt(Σ(a_i^2))
    pub fn norm_l2(&self) -> N {
        self.vals
            .iter()
            .fold(N::zero(), |acc, &v| acc + v * v)
            .sqrt()
    }

    /// Scale to unit length.
    /// A zero vector stays zero; returns the norm before scaling.
    pub fn normalize_l2(&mut self) -> N {
        let norm = self.norm_l2();
        if norm > N::zero() {
            for v in self.vals.iter_mut() {
                *v = *v / norm;
            }
        }
        norm
    }

    /// dot積
    /// d(a, b) = Σ(a_i * b_i)
    /// 両方の indices が昇順であることを利用したマージ走査
    pub fn dot(&self, other: &SparseVec<N>) -> N {
        let mut a = 0usize;
        let mut b = 0usize;
        let mut acc = N::zero();
        while a < self.inds.len() && b < other.inds.len() {
            match self.inds[a].cmp(&other.inds[b]) {
                Ordering::Equal => {
                    acc = acc + self.vals[a] * other.vals[b];
                    a += 1;
                    b += 1;
                }
                Ordering::Less => a += 1,
                Ordering::Greater => b += 1,
            }
        }
        acc
    }

    /// コサイン類似度
    /// cos(θ) = Σ(a_i * b_i) / (||a|| * ||b||)
    /// どちらかがゼロベクトルなら 0
    pub fn cosine_similarity(&self, other: &SparseVec<N>) -> N {
        let norm_a = self.norm_l2();
        let norm_b = other.norm_l2();
        if norm_a.is_zero() || norm_b.is_zero() {
            return N::zero();
        }
        self.dot(other) / (norm_a * norm_b)
    }
}
