//! Pre-fit label encoders and the feature vector the cluster model consumes

use anyhow::Context as _;
use ndarray::{array, Array1};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Number of features the cluster model was fit on
pub const FEATURE_DIM: usize = 4;

/// Categorical column an encoder belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    City,
    Cuisine,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::City => f.write_str("city"),
            Field::Cuisine => f.write_str("cuisine"),
        }
    }
}

/// Failure to map a category onto its encoder vocabulary
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unseen {field} category: {value:?}")]
    UnseenCategory { field: Field, value: String },
}

#[derive(Debug, Deserialize)]
struct LabelEncoderFile {
    classes: Vec<String>,
}

/// Fitted mapping from category strings to stable integer codes
///
/// The code of a category is its position in the fitted class list.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    field: Field,
    classes: Vec<String>,
    codes: HashMap<String, usize>,
}

impl LabelEncoder {
    /// Build an encoder from its fitted class list
    pub fn new(field: Field, classes: Vec<String>) -> crate::Result<Self> {
        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if codes.insert(class.clone(), code).is_some() {
                anyhow::bail!("{} encoder lists class {:?} more than once", field, class);
            }
        }

        Ok(Self {
            field,
            classes,
            codes,
        })
    }

    /// Load an encoder artifact (`{"classes": [...]}`) from disk
    pub fn load(field: Field, path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {} encoder {}", field, path.display()))?;
        let file: LabelEncoderFile = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {} encoder {}", field, path.display()))?;
        Self::new(field, file.classes)
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, value: &str) -> Result<usize, EncodeError> {
        self.codes
            .get(value)
            .copied()
            .ok_or_else(|| EncodeError::UnseenCategory {
                field: self.field,
                value: value.to_string(),
            })
    }
}

/// Encoded (city_code, cuisine_code, rating, cost) vector
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Array1<f64>);

impl FeatureVector {
    pub fn new(city_code: usize, cuisine_code: usize, rating: f64, cost: i64) -> Self {
        Self(array![city_code as f64, cuisine_code as f64, rating, cost as f64])
    }

    /// Encode the categorical parts of a record and assemble its feature vector
    pub fn encode(
        cities: &LabelEncoder,
        cuisines: &LabelEncoder,
        city: &str,
        cuisine: &str,
        rating: f64,
        cost: i64,
    ) -> Result<Self, EncodeError> {
        let city_code = cities.transform(city)?;
        let cuisine_code = cuisines.transform(cuisine)?;
        Ok(Self::new(city_code, cuisine_code, rating, cost))
    }

    pub fn as_array(&self) -> &Array1<f64> {
        &self.0
    }
}
