//! Pre-fit K-Means cluster model

use crate::encoder::{FeatureVector, FEATURE_DIM};
use anyhow::Context as _;
use ndarray::{Array1, Array2, ArrayView1};
use serde::Deserialize;
use std::path::Path;

/// Failure to assign a feature vector to a cluster
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictError {
    #[error("feature vector has {actual} dimensions, model expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// On-disk form of the fitted model
#[derive(Debug, Deserialize)]
struct ClusterModelFile {
    centroids: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

/// K-Means model restored from its fitted parameters
#[derive(Debug, Clone)]
pub struct ClusterModel {
    /// Number of clusters
    pub n_clusters: usize,
    /// Cluster centroids, one row per cluster
    pub centroids: Array2<f64>,
    /// Cluster assignments of the training rows, in table order
    pub labels: Array1<usize>,
}

impl ClusterModel {
    /// Build a model from centroids and training labels, validating both
    pub fn new(centroids: Vec<Vec<f64>>, labels: Vec<usize>) -> crate::Result<Self> {
        if centroids.is_empty() {
            anyhow::bail!("Cluster model has no centroids");
        }
        if let Some(bad) = centroids.iter().find(|c| c.len() != FEATURE_DIM) {
            anyhow::bail!(
                "Centroid has {} dimensions, expected {}",
                bad.len(),
                FEATURE_DIM
            );
        }

        let n_clusters = centroids.len();
        if let Some(&bad) = labels.iter().find(|&&label| label >= n_clusters) {
            anyhow::bail!(
                "Training label {} out of range for {} clusters",
                bad,
                n_clusters
            );
        }

        let flat: Vec<f64> = centroids.into_iter().flatten().collect();
        let centroids = Array2::from_shape_vec((n_clusters, FEATURE_DIM), flat)?;

        Ok(Self {
            n_clusters,
            centroids,
            labels: Array1::from_vec(labels),
        })
    }

    /// Load a model artifact (`{"centroids": [...], "labels": [...]}`) from disk
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read cluster model {}", path.display()))?;
        let file: ClusterModelFile = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse cluster model {}", path.display()))?;
        Self::new(file.centroids, file.labels)
    }

    /// Predict the cluster of a feature vector (nearest centroid)
    pub fn predict(&self, features: &FeatureVector) -> Result<usize, PredictError> {
        let features = features.as_array();
        if features.len() != self.centroids.ncols() {
            return Err(PredictError::DimensionMismatch {
                expected: self.centroids.ncols(),
                actual: features.len(),
            });
        }

        let mut min_distance = f64::INFINITY;
        let mut closest_cluster = 0;

        for (cluster_idx, centroid) in self.centroids.outer_iter().enumerate() {
            let distance = squared_distance(&features.view(), &centroid);
            if distance < min_distance {
                min_distance = distance;
                closest_cluster = cluster_idx;
            }
        }

        Ok(closest_cluster)
    }

    /// Get cluster sizes over the training rows
    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.labels
            .iter()
            .fold(vec![0; self.n_clusters], |mut sizes, &label| {
                sizes[label] += 1;
                sizes
            })
    }
}

fn squared_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}
