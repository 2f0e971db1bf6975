// src/train/preprocess.rs
//! Table → feature matrix.

use tracing::{debug, info};

use super::features::{LabelEncoder, TfidfVectorizer};
use super::Matrix;
use crate::error::{PipelineError, Result};
use crate::steam::models::NOT_AVAILABLE;
use crate::table::Table;

/// Which columns feed the model and how.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainingSpec {
    pub label: String,
    /// Free text, TF-IDF encoded.
    pub text: String,
    /// Label-encoded, one feature each.
    pub categorical: Vec<String>,
    /// Parsed as numbers; booleans become 0/1, anything else 0.
    pub numeric: Vec<String>,
}

impl TrainingSpec {
    /// The flattened details table written by `collect`.
    pub fn game_details() -> Self {
        Self {
            label: s!("esrb_rating"),
            text: s!("detailed_description"),
            categorical: vec![s!("genres"), s!("categories")],
            numeric: vec![s!("required_age"), s!("is_free")],
        }
    }

    /// A processed description-based table.
    pub fn descriptions() -> Self {
        Self {
            label: s!("esrb_rating"),
            text: s!("description"),
            categorical: Vec::new(),
            numeric: Vec::new(),
        }
    }

    /// Pick a preset from the columns `table` has. A cleaned text column is
    /// preferred over the raw one.
    pub fn detect(table: &Table) -> Result<Self> {
        let mut spec = if table.column_index("detailed_description").is_some() {
            Self::game_details()
        } else if table.column_index("description").is_some() {
            Self::descriptions()
        } else {
            return Err(PipelineError::MissingColumn {
                table: table.label.clone(),
                column: s!("detailed_description"),
            });
        };
        let cleaned = format!("cleaned_{}", spec.text);
        if table.column_index(&cleaned).is_some() {
            spec.text = cleaned;
        }
        spec.categorical.retain(|c| table.column_index(c).is_some());
        spec.numeric.retain(|c| table.column_index(c).is_some());
        Ok(spec)
    }
}

/// Features and labels ready for a classifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Prepared {
    pub x: Matrix,
    pub y: Vec<usize>,
    pub classes: Vec<String>,
    pub feature_names: Vec<String>,
}

/// Drop unlabelled rows, encode categoricals, vectorize text.
pub fn preprocess(table: &Table, spec: &TrainingSpec, max_features: usize) -> Result<Prepared> {
    let label_ix = table.require(&spec.label)?;
    let text_ix = table.require(&spec.text)?;
    let cat_ix = spec
        .categorical
        .iter()
        .map(|c| table.require(c))
        .collect::<Result<Vec<_>>>()?;
    let num_ix = spec
        .numeric
        .iter()
        .map(|c| table.require(c))
        .collect::<Result<Vec<_>>>()?;

    let rows: Vec<&Vec<String>> = table
        .rows
        .iter()
        .filter(|r| {
            let label = r[label_ix].trim();
            !label.is_empty() && label != NOT_AVAILABLE
        })
        .collect();
    debug!(kept = rows.len(), dropped = table.len() - rows.len(), "dropped unlabelled rows");

    let labels: Vec<&str> = rows.iter().map(|r| r[label_ix].trim()).collect();
    let (label_enc, y) = LabelEncoder::fit_transform(&labels);

    let mut feature_names: Vec<String> = Vec::new();
    let mut x: Vec<Vec<f64>> = vec![Vec::new(); rows.len()];

    for (name, &ix) in spec.categorical.iter().zip(&cat_ix) {
        let values: Vec<&str> = rows.iter().map(|r| r[ix].as_str()).collect();
        let (_, codes) = LabelEncoder::fit_transform(&values);
        for (row, code) in x.iter_mut().zip(codes) {
            row.push(code as f64);
        }
        feature_names.push(name.clone());
    }

    for (name, &ix) in spec.numeric.iter().zip(&num_ix) {
        for (row, r) in x.iter_mut().zip(&rows) {
            row.push(parse_numeric(&r[ix]));
        }
        feature_names.push(name.clone());
    }

    let docs: Vec<&str> = rows.iter().map(|r| r[text_ix].as_str()).collect();
    let mut tfidf = TfidfVectorizer::new(max_features);
    let text = tfidf.fit_transform(&docs);
    for (row, t) in x.iter_mut().zip(text) {
        row.extend(t);
    }
    feature_names.extend(tfidf.vocabulary().iter().map(|t| join!("tfidf:", t)));

    info!(
        samples = x.len(),
        features = feature_names.len(),
        classes = label_enc.classes().len(),
        "prepared training data"
    );
    Ok(Prepared {
        x: Matrix::new(x, feature_names.len()),
        y,
        classes: label_enc.classes().to_vec(),
        feature_names,
    })
}

fn parse_numeric(raw: &str) -> f64 {
    let raw = raw.trim();
    match raw.to_ascii_lowercase().as_str() {
        "true" => 1.0,
        "false" => 0.0,
        _ => raw.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> Table {
        Table::from_csv_str(
            "app_id,name,required_age,is_free,detailed_description,categories,genres,esrb_rating\n\
             1,A,17,false,blood and gore,Single-player,Action,m\n\
             2,B,0,true,cute puppies,Multi-player,Casual,e\n\
             3,C,N/A,false,nothing here,Single-player,Action,N/A\n",
        )
        .with_label("details")
    }

    #[test]
    fn unlabelled_rows_are_dropped() {
        let p = preprocess(&details(), &TrainingSpec::game_details(), 1000).unwrap();
        assert_eq!(p.x.rows(), 2);
        assert_eq!(p.classes, vec!["e", "m"]);
        assert_eq!(p.y, vec![1, 0]);
        assert_eq!(&p.feature_names[..4], ["genres", "categories", "required_age", "is_free"]);
        assert_eq!(p.x.row(0)[2], 17.0);
        assert_eq!(p.x.row(1)[3], 1.0);
        assert_eq!(p.x.cols(), p.feature_names.len());
    }

    #[test]
    fn detect_prefers_cleaned_text() {
        let mut t = details();
        t.push_column("cleaned_detailed_description", vec![s!("a"), s!("b"), s!("c")]).unwrap();
        assert_eq!(TrainingSpec::detect(&t).unwrap().text, "cleaned_detailed_description");

        let d = Table::from_csv_str("title,description,esrb_rating\nA,x,M\n");
        assert_eq!(TrainingSpec::detect(&d).unwrap(), TrainingSpec::descriptions());

        let none = Table::from_csv_str("title\nA\n");
        assert!(TrainingSpec::detect(&none).is_err());
    }
}
