// src/train/mod.rs
//! # Rating classifier
//!
//! A details table (or a processed description table) is turned into a dense
//! feature matrix, narrowed by chi² feature selection, split, and fed to a
//! classifier. The encoders, selector and model are small local
//! implementations behind the `FeatureSelector` / `Classifier` traits.
pub mod features;
pub mod model;
pub mod preprocess;
pub mod report;
pub mod select;

use tracing::info;

use crate::config::consts::{SELECT_K, SPLIT_SEED, TEST_SIZE, TFIDF_MAX_FEATURES};
use crate::error::{PipelineError, Result};
use crate::table::Table;

pub use features::{LabelEncoder, TfidfVectorizer};
pub use model::{Classifier, MultinomialNb};
pub use preprocess::{preprocess, Prepared, TrainingSpec};
pub use report::{train_test_split, ClassificationReport};
pub use select::{FeatureSelector, SelectKBest};

/// Dense row-major feature matrix.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Matrix {
    rows: Vec<Vec<f64>>,
    cols: usize,
}

impl Matrix {
    /// Every row must be `cols` wide.
    pub fn new(rows: Vec<Vec<f64>>, cols: usize) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == cols));
        Self { rows, cols }
    }

    pub fn rows(&self) -> usize { self.rows.len() }
    pub fn cols(&self) -> usize { self.cols }
    pub fn row(&self, i: usize) -> &[f64] { &self.rows[i] }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub fn select_rows(&self, idx: &[usize]) -> Matrix {
        Matrix { rows: idx.iter().map(|&i| self.rows[i].clone()).collect(), cols: self.cols }
    }

    pub fn select_columns(&self, idx: &[usize]) -> Matrix {
        Matrix {
            rows: self.rows.iter().map(|r| idx.iter().map(|&j| r[j]).collect()).collect(),
            cols: idx.len(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrainOptions {
    pub max_features: usize,
    /// Columns kept by the selector.
    pub k: usize,
    pub test_size: f64,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            max_features: TFIDF_MAX_FEATURES,
            k: SELECT_K,
            test_size: TEST_SIZE,
            seed: SPLIT_SEED,
        }
    }
}

pub struct TrainOutcome<C> {
    pub model: C,
    pub selected_features: Vec<String>,
    pub report: ClassificationReport,
}

/// Preprocess, select, split, fit and evaluate.
pub fn train_model<C: Classifier>(
    table: &Table,
    spec: &TrainingSpec,
    opts: &TrainOptions,
    mut model: C,
) -> Result<TrainOutcome<C>> {
    let prepared = preprocess(table, spec, opts.max_features)?;
    if prepared.x.rows() < 2 {
        return Err(PipelineError::Data(format!(
            "{}: need at least 2 labelled rows to train, found {}",
            table.label,
            prepared.x.rows()
        )));
    }

    let mut selector = SelectKBest::new(opts.k);
    let x = selector.fit_transform(&prepared.x, &prepared.y)?;
    let selected_features: Vec<String> = selector
        .selected()
        .iter()
        .map(|&j| prepared.feature_names[j].clone())
        .collect();
    info!(kept = selected_features.len(), "selected features: {}", selected_features.join(", "));

    let (train_idx, test_idx) = train_test_split(x.rows(), opts.test_size, opts.seed);
    let pick = |idx: &[usize]| idx.iter().map(|&i| prepared.y[i]).collect::<Vec<_>>();
    let (y_train, y_test) = (pick(&train_idx), pick(&test_idx));

    model.fit(&x.select_rows(&train_idx), &y_train, prepared.classes.len())?;
    let y_pred = model.predict(&x.select_rows(&test_idx));
    let report = ClassificationReport::new(&y_test, &y_pred, &prepared.classes);
    info!(train = train_idx.len(), test = test_idx.len(), accuracy = report.accuracy, "model trained");

    Ok(TrainOutcome { model, selected_features, report })
}
