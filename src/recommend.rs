//! Cluster-based "similar restaurant" suggestions

use crate::context::Context;
use crate::encoder::{EncodeError, FeatureVector};
use crate::model::PredictError;
use tracing::debug;

/// Maximum number of suggestions returned for a reference restaurant
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Failure inside the recommendation step; shown to the user, never fatal
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Predict(#[from] PredictError),
}

/// Restaurants sharing the reference row's cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendations {
    /// Row used as the reference
    pub reference: usize,
    /// Cluster predicted for the reference
    pub cluster: usize,
    /// Up to five co-clustered rows in table order, never the reference itself
    pub similar: Vec<usize>,
}

/// Recommend restaurants similar to the first row of the filtered set
///
/// Returns `Ok(None)` when there is no filtered row to start from.
pub fn recommend_similar(
    context: &Context,
    filtered: &[usize],
    city: &str,
) -> Result<Option<Recommendations>, RecommendError> {
    let Some(&reference) = filtered.first() else {
        return Ok(None);
    };
    let row = &context.restaurants[reference];

    let features = FeatureVector::encode(
        &context.cities,
        &context.cuisines,
        &row.city,
        &row.cuisine,
        row.rating,
        row.cost,
    )?;
    let cluster = context.model.predict(&features)?;
    debug!(reference, cluster, name = %row.name, "reference restaurant clustered");

    // Candidates are matched on training-time labels, not re-predicted.
    let similar = context
        .restaurants
        .iter()
        .enumerate()
        .filter(|&(i, r)| i != reference && r.city == city && context.cluster_of(i) == cluster)
        .map(|(i, _)| i)
        .take(MAX_RECOMMENDATIONS)
        .collect();

    Ok(Some(Recommendations {
        reference,
        cluster,
        similar,
    }))
}
