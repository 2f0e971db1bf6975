// src/train/model.rs
use crate::error::{PipelineError, Result};

use super::Matrix;

pub trait Classifier {
    /// `y` holds class indices below `n_classes`.
    fn fit(&mut self, x: &Matrix, y: &[usize], n_classes: usize) -> Result<()>;
    fn predict(&self, x: &Matrix) -> Vec<usize>;
}

/// Multinomial naive Bayes with additive (Laplace) smoothing.
#[derive(Clone, Debug, PartialEq)]
pub struct MultinomialNb {
    pub alpha: f64,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
}

impl Default for MultinomialNb {
    fn default() -> Self { Self::new(1.0) }
}

impl MultinomialNb {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, class_log_prior: Vec::new(), feature_log_prob: Vec::new() }
    }

    pub fn is_fitted(&self) -> bool { !self.class_log_prior.is_empty() }
}

impl Classifier for MultinomialNb {
    fn fit(&mut self, x: &Matrix, y: &[usize], n_classes: usize) -> Result<()> {
        if x.rows() == 0 || x.rows() != y.len() {
            return Err(PipelineError::Data(format!(
                "cannot fit on {} samples with {} labels",
                x.rows(),
                y.len()
            )));
        }
        let cols = x.cols();
        let mut counts = vec![vec![0.0; cols]; n_classes];
        let mut class_n = vec![0usize; n_classes];
        for (row, &c) in x.iter_rows().zip(y) {
            if c >= n_classes {
                return Err(PipelineError::Data(format!("label {c} out of range")));
            }
            class_n[c] += 1;
            for (j, &v) in row.iter().enumerate() {
                if v < 0.0 {
                    return Err(PipelineError::Data(s!("negative feature value for multinomial model")));
                }
                counts[c][j] += v;
            }
        }

        let n = y.len() as f64;
        // Unseen classes keep -inf and are never predicted
        self.class_log_prior = class_n
            .iter()
            .map(|&k| if k == 0 { f64::NEG_INFINITY } else { (k as f64 / n).ln() })
            .collect();
        self.feature_log_prob = counts
            .iter()
            .map(|row| {
                let denom = row.iter().sum::<f64>() + self.alpha * cols as f64;
                row.iter().map(|&v| ((v + self.alpha) / denom).ln()).collect()
            })
            .collect();
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> Vec<usize> {
        x.iter_rows()
            .map(|row| {
                let mut best = (0usize, f64::NEG_INFINITY);
                for (c, prior) in self.class_log_prior.iter().enumerate() {
                    let score = prior
                        + self.feature_log_prob[c]
                            .iter()
                            .zip(row)
                            .map(|(lp, v)| lp * v)
                            .sum::<f64>();
                    if score > best.1 {
                        best = (c, score);
                    }
                }
                best.0
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separates_obvious_classes() {
        let x = Matrix::new(
            vec![vec![5.0, 0.0], vec![4.0, 1.0], vec![0.0, 5.0], vec![1.0, 4.0]],
            2,
        );
        let y = [0, 0, 1, 1];
        let mut nb = MultinomialNb::default();
        nb.fit(&x, &y, 2).unwrap();
        assert!(nb.is_fitted());
        let test = Matrix::new(vec![vec![3.0, 0.0], vec![0.0, 3.0]], 2);
        assert_eq!(nb.predict(&test), vec![0, 1]);
    }

    #[test]
    fn empty_training_set_is_an_error() {
        let mut nb = MultinomialNb::default();
        assert!(nb.fit(&Matrix::new(Vec::new(), 0), &[], 1).is_err());
    }
}
