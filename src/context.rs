//! Load-once session context: restaurant table, encoders and cluster model

use crate::data::{load_restaurants, Restaurant};
use crate::encoder::{Field, LabelEncoder};
use crate::model::ClusterModel;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Locations of the table and the three pre-fit artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub data: PathBuf,
    pub city_encoder: PathBuf,
    pub cuisine_encoder: PathBuf,
    pub model: PathBuf,
}

/// Immutable state shared by every interaction of a session
#[derive(Debug)]
pub struct Context {
    pub restaurants: Vec<Restaurant>,
    pub cities: LabelEncoder,
    pub cuisines: LabelEncoder,
    pub model: ClusterModel,
}

impl Context {
    /// Load all inputs and check that the model's training labels line up with the table
    pub fn load(paths: &ArtifactPaths) -> crate::Result<Self> {
        let cities = LabelEncoder::load(Field::City, &paths.city_encoder)?;
        let cuisines = LabelEncoder::load(Field::Cuisine, &paths.cuisine_encoder)?;
        let model = ClusterModel::load(&paths.model)?;
        let restaurants = load_restaurants(&paths.data, &cities, &cuisines)?;

        let context = Self::new(restaurants, cities, cuisines, model)?;
        info!(
            rows = context.restaurants.len(),
            clusters = context.model.n_clusters,
            "session context ready"
        );
        Ok(context)
    }

    pub fn new(
        restaurants: Vec<Restaurant>,
        cities: LabelEncoder,
        cuisines: LabelEncoder,
        model: ClusterModel,
    ) -> crate::Result<Self> {
        if model.labels.len() != restaurants.len() {
            anyhow::bail!(
                "Cluster model has {} training labels but the table has {} rows",
                model.labels.len(),
                restaurants.len()
            );
        }

        Ok(Self {
            restaurants,
            cities,
            cuisines,
            model,
        })
    }

    /// Training-time cluster label of a row
    pub fn cluster_of(&self, row: usize) -> usize {
        self.model.labels[row]
    }

    /// Distinct cities, sorted
    pub fn cities(&self) -> Vec<&str> {
        distinct_sorted(self.restaurants.iter().map(|r| r.city.as_str()))
    }

    /// Distinct cuisines served in a city, sorted
    pub fn cuisines_in(&self, city: &str) -> Vec<&str> {
        distinct_sorted(
            self.restaurants
                .iter()
                .filter(|r| r.city == city)
                .map(|r| r.cuisine.as_str()),
        )
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut values: Vec<&str> = values.collect();
    values.sort_unstable();
    values.dedup();
    values
}

/// Caches the loaded context for as long as the inputs stay the same
#[derive(Debug, Default)]
pub struct Session {
    cached: Option<(ArtifactPaths, Arc<Context>)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached context, loading it first if the paths changed
    pub fn context(&mut self, paths: &ArtifactPaths) -> crate::Result<Arc<Context>> {
        if let Some((cached_paths, context)) = &self.cached {
            if cached_paths == paths {
                debug!("reusing cached session context");
                return Ok(Arc::clone(context));
            }
        }

        let context = Arc::new(Context::load(paths)?);
        self.cached = Some((paths.clone(), Arc::clone(&context)));
        Ok(context)
    }
}
