// src/train/features.rs
//! Categorical and free-text encoders.

use std::collections::{BTreeMap, HashMap};

/// Maps each distinct string to its index in sorted order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<S: AsRef<str>>(values: &[S]) -> Self {
        let mut classes: Vec<String> = values.iter().map(|v| s!(v.as_ref())).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] { &self.classes }

    pub fn transform(&self, value: &str) -> Option<usize> {
        self.classes.binary_search_by(|c| c.as_str().cmp(value)).ok()
    }

    /// Fit on `values` and encode them in one go.
    pub fn fit_transform<S: AsRef<str>>(values: &[S]) -> (Self, Vec<usize>) {
        let enc = Self::fit(values);
        let codes = values
            .iter()
            .map(|v| enc.transform(v.as_ref()).unwrap_or_default())
            .collect();
        (enc, codes)
    }
}

/// Lower-cased runs of two or more word characters.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_lowercase())
}

/// TF-IDF over the `max_features` most frequent terms.
///
/// idf is smoothed, `ln((1 + n) / (1 + df)) + 1`, and each output row is
/// scaled to unit L2 norm.
#[derive(Clone, Debug, PartialEq)]
pub struct TfidfVectorizer {
    pub max_features: usize,
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self { max_features, vocabulary: Vec::new(), index: HashMap::new(), idf: Vec::new() }
    }

    /// Terms in column order (alphabetical).
    pub fn vocabulary(&self) -> &[String] { &self.vocabulary }

    pub fn fit<S: AsRef<str>>(&mut self, docs: &[S]) -> &mut Self {
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for doc in docs {
            let mut seen: Vec<String> = Vec::new();
            for tok in tokenize(doc.as_ref()) {
                *term_freq.entry(tok.clone()).or_insert(0) += 1;
                if !seen.contains(&tok) {
                    seen.push(tok);
                }
            }
            for tok in seen {
                *doc_freq.entry(tok).or_insert(0) += 1;
            }
        }

        // Most frequent first, ties alphabetical
        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        let mut vocabulary: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        vocabulary.sort();

        let n = docs.len() as f64;
        self.idf = vocabulary
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.index = vocabulary.iter().enumerate().map(|(i, t)| (t.clone(), i)).collect();
        self.vocabulary = vocabulary;
        self
    }

    pub fn transform<S: AsRef<str>>(&self, docs: &[S]) -> Vec<Vec<f64>> {
        docs.iter().map(|d| self.transform_one(d.as_ref())).collect()
    }

    fn transform_one(&self, doc: &str) -> Vec<f64> {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for tok in tokenize(doc) {
            if let Some(&i) = self.index.get(&tok) {
                *counts.entry(i).or_insert(0.0) += 1.0;
            }
        }
        let mut row = vec![0.0; self.vocabulary.len()];
        for (i, tf) in counts {
            row[i] = tf * self.idf[i];
        }
        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|v| *v /= norm);
        }
        row
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, docs: &[S]) -> Vec<Vec<f64>> {
        self.fit(docs);
        self.transform(docs)
    }
}
