//! "Surprise me" random pick with cascading fallback

use crate::context::Context;
use crate::data::Restaurant;
use crate::filter::{city_and_cuisine_rows, city_rows, Query};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

pub const TOP_RATED_MIN_RATING: f64 = 4.5;
pub const BUDGET_MAX_COST: i64 = 300;

/// Candidate set a random pick was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickSource {
    Filtered,
    CityAndCuisine,
    City,
}

/// Presentational badge for a picked restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    TopRated,
    BudgetFriendly,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::TopRated => f.write_str("Top Rated"),
            Tag::BudgetFriendly => f.write_str("Budget Friendly"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomPick {
    pub row: usize,
    pub source: PickSource,
    pub tags: Vec<Tag>,
}

pub fn tags_for(restaurant: &Restaurant) -> Vec<Tag> {
    let mut tags = Vec::new();
    if restaurant.rating >= TOP_RATED_MIN_RATING {
        tags.push(Tag::TopRated);
    }
    if restaurant.cost <= BUDGET_MAX_COST {
        tags.push(Tag::BudgetFriendly);
    }
    tags
}

/// Draw one row uniformly from the first non-empty candidate set
///
/// Tries the filtered rows, then city and cuisine, then the city alone.
pub fn random_pick<R: Rng + ?Sized>(
    context: &Context,
    filtered: &[usize],
    query: &Query,
    rng: &mut R,
) -> Option<RandomPick> {
    let (candidates, source) = if !filtered.is_empty() {
        (filtered.to_vec(), PickSource::Filtered)
    } else {
        let partial = city_and_cuisine_rows(context, &query.city, &query.cuisine);
        if !partial.is_empty() {
            (partial, PickSource::CityAndCuisine)
        } else {
            (city_rows(context, &query.city), PickSource::City)
        }
    };

    let &row = candidates.choose(rng)?;
    Some(RandomPick {
        row,
        source,
        tags: tags_for(&context.restaurants[row]),
    })
}
