// src/train/select.rs
use crate::error::{PipelineError, Result};

use super::Matrix;

/// Reduces a feature matrix to a subset of its columns.
pub trait FeatureSelector {
    fn fit(&mut self, x: &Matrix, y: &[usize]) -> Result<()>;
    /// Indices of the kept columns, ascending.
    fn selected(&self) -> &[usize];

    fn transform(&self, x: &Matrix) -> Matrix {
        x.select_columns(self.selected())
    }

    fn fit_transform(&mut self, x: &Matrix, y: &[usize]) -> Result<Matrix> {
        self.fit(x, y)?;
        Ok(self.transform(x))
    }
}

/// Keep the `k` columns with the highest chi² statistic against the labels.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectKBest {
    pub k: usize,
    scores: Vec<f64>,
    selected: Vec<usize>,
}

impl SelectKBest {
    pub fn new(k: usize) -> Self {
        Self { k, scores: Vec::new(), selected: Vec::new() }
    }

    pub fn scores(&self) -> &[f64] { &self.scores }
}

impl FeatureSelector for SelectKBest {
    fn fit(&mut self, x: &Matrix, y: &[usize]) -> Result<()> {
        self.scores = chi2(x, y)?;
        let mut order: Vec<usize> = (0..self.scores.len()).collect();
        // Highest score first; earlier column wins a tie
        order.sort_by(|&a, &b| self.scores[b].total_cmp(&self.scores[a]).then(a.cmp(&b)));
        order.truncate(self.k);
        order.sort_unstable();
        self.selected = order;
        Ok(())
    }

    fn selected(&self) -> &[usize] { &self.selected }
}

/// chi² of each (non-negative) feature against the class labels.
/// Columns that are zero everywhere score 0.
pub fn chi2(x: &Matrix, y: &[usize]) -> Result<Vec<f64>> {
    if x.rows() != y.len() {
        return Err(PipelineError::Data(format!(
            "chi2: {} samples but {} labels",
            x.rows(),
            y.len()
        )));
    }
    let n_classes = y.iter().max().map_or(0, |m| m + 1);
    let cols = x.cols();

    let mut observed = vec![vec![0.0; cols]; n_classes];
    let mut class_count = vec![0.0; n_classes];
    let mut feature_total = vec![0.0; cols];
    for (row, &c) in x.iter_rows().zip(y) {
        class_count[c] += 1.0;
        for (j, &v) in row.iter().enumerate() {
            if v < 0.0 {
                return Err(PipelineError::Data(s!("chi2 needs non-negative features")));
            }
            observed[c][j] += v;
            feature_total[j] += v;
        }
    }

    let n = y.len() as f64;
    let mut scores = vec![0.0; cols];
    for c in 0..n_classes {
        let prior = class_count[c] / n;
        for j in 0..cols {
            let expected = prior * feature_total[j];
            if expected > 0.0 {
                let d = observed[c][j] - expected;
                scores[j] += d * d / expected;
            }
        }
    }
    Ok(scores)
}
