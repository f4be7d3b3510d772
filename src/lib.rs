//! DineCluster: restaurant filtering with cluster-based recommendations
//!
//! Filters a static restaurant table by city, cuisine, rating and cost, and
//! suggests similar restaurants using a pre-fit K-Means model and label
//! encoders loaded from disk.

pub mod cli;
pub mod context;
pub mod data;
pub mod encoder;
pub mod filter;
pub mod model;
pub mod pick;
pub mod recommend;
pub mod render;

// Re-export public items for easier access
pub use cli::{Args, Command};
pub use context::{ArtifactPaths, Context, Session};
pub use data::{load_restaurants, Restaurant, ReviewCount};
pub use encoder::{EncodeError, FeatureVector, Field, LabelEncoder};
pub use filter::{apply_filters, FilterOutcome, FilterResult, MatchCounts, Query, SortOrder};
pub use model::{ClusterModel, PredictError};
pub use pick::{random_pick, RandomPick, Tag};
pub use recommend::{recommend_similar, RecommendError, Recommendations};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
