// src/train/report.rs
use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffled (train, test) row indices. The test side gets
/// `ceil(n * test_size)` rows, but never all of them.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut idx: Vec<usize> = (0..n).collect();
    idx.shuffle(&mut StdRng::seed_from_u64(seed));
    let mut n_test = (n as f64 * test_size).ceil() as usize;
    if n > 1 {
        n_test = n_test.clamp(1, n - 1);
    } else {
        n_test = 0;
    }
    let train = idx.split_off(n_test);
    (train, idx)
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision / recall / f1, plus accuracy and averages.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub total: usize,
}

impl ClassificationReport {
    /// Classes with neither support nor predictions are left out.
    pub fn new(y_true: &[usize], y_pred: &[usize], labels: &[String]) -> Self {
        let mut classes = Vec::new();
        for (c, label) in labels.iter().enumerate() {
            let tp = y_true.iter().zip(y_pred).filter(|&(&t, &p)| t == c && p == c).count();
            let support = y_true.iter().filter(|&&t| t == c).count();
            let predicted = y_pred.iter().filter(|&&p| p == c).count();
            if support == 0 && predicted == 0 {
                continue;
            }
            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            classes.push(ClassMetrics { label: label.clone(), precision, recall, f1, support });
        }
        let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
        Self { classes, accuracy: ratio(correct, y_true.len()), total: y_true.len() }
    }

    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|m| m.label == label)
    }

    fn macro_avg(&self) -> (f64, f64, f64) {
        let n = self.classes.len().max(1) as f64;
        let sum = |f: fn(&ClassMetrics) -> f64| self.classes.iter().map(f).sum::<f64>() / n;
        (sum(|m| m.precision), sum(|m| m.recall), sum(|m| m.f1))
    }

    fn weighted_avg(&self) -> (f64, f64, f64) {
        let n = self.total.max(1) as f64;
        let sum = |f: fn(&ClassMetrics) -> f64| {
            self.classes.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / n
        };
        (sum(|m| m.precision), sum(|m| m.recall), sum(|m| m.f1))
    }
}

fn ratio(a: usize, b: usize) -> f64 {
    if b == 0 { 0.0 } else { a as f64 / b as f64 }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for m in &self.classes {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>14} {:>9} {:>9} {:>9.2} {:>9}", "accuracy", "", "", self.accuracy, self.total)?;
        let (p, r, f1) = self.macro_avg();
        writeln!(f, "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}", "macro avg", p, r, f1, self.total)?;
        let (p, r, f1) = self.weighted_avg();
        writeln!(f, "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}", "weighted avg", p, r, f1, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_deterministic_and_disjoint() {
        let (a_train, a_test) = train_test_split(10, 0.2, 42);
        let (b_train, b_test) = train_test_split(10, 0.2, 42);
        assert_eq!((a_train.clone(), a_test.clone()), (b_train, b_test));
        assert_eq!(a_test.len(), 2);
        assert_eq!(a_train.len(), 8);
        let mut all: Vec<_> = a_train.into_iter().chain(a_test).collect();
        all.sort();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn tiny_inputs_keep_a_training_row() {
        assert_eq!(train_test_split(2, 0.2, 1).0.len(), 1);
        let (train, test) = train_test_split(1, 0.2, 1);
        assert_eq!((train.len(), test.len()), (1, 0));
    }

    #[test]
    fn metrics_per_class() {
        let labels = vec![s!("e"), s!("m"), s!("t")];
        let y_true = [0, 0, 1, 1];
        let y_pred = [0, 1, 1, 1];
        let r = ClassificationReport::new(&y_true, &y_pred, &labels);
        assert_eq!(r.accuracy, 0.75);
        let m = r.class("m").unwrap();
        assert!((m.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(m.recall, 1.0);
        assert_eq!(r.class("e").unwrap().recall, 0.5);
        assert!(r.class("t").is_none());
        assert!(r.to_string().contains("weighted avg"));
    }
}
