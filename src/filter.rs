//! Filter engine: four independent predicates, their conjunction and graduated fallback

use crate::context::Context;
use crate::data::{Restaurant, MAX_RATING};
use std::cmp::Ordering;
use std::ops::RangeInclusive;
use tracing::debug;

/// Accepted range for the maximum-cost threshold
pub const MAX_COST_RANGE: RangeInclusive<i64> = 100..=2000;

pub const DEFAULT_MIN_RATING: f64 = 3.5;
pub const DEFAULT_MAX_COST: i64 = 500;

/// Ordering applied to exact matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    None,
    RatingDesc,
    CostAsc,
    CostDesc,
}

/// A validated filter request
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub city: String,
    pub cuisine: String,
    pub min_rating: f64,
    pub max_cost: i64,
}

impl Query {
    pub fn new(
        city: impl Into<String>,
        cuisine: impl Into<String>,
        min_rating: f64,
        max_cost: i64,
    ) -> crate::Result<Self> {
        if !(0.0..=MAX_RATING).contains(&min_rating) {
            anyhow::bail!(
                "Minimum rating must be between 0.0 and {:.1}, got {}",
                MAX_RATING,
                min_rating
            );
        }
        if !MAX_COST_RANGE.contains(&max_cost) {
            anyhow::bail!(
                "Maximum cost must be between {} and {}, got {}",
                MAX_COST_RANGE.start(),
                MAX_COST_RANGE.end(),
                max_cost
            );
        }

        Ok(Self {
            city: city.into(),
            cuisine: cuisine.into(),
            min_rating,
            max_cost,
        })
    }

    fn city_matches(&self, r: &Restaurant) -> bool {
        r.city == self.city
    }

    fn cuisine_matches(&self, r: &Restaurant) -> bool {
        r.cuisine == self.cuisine
    }

    fn rating_matches(&self, r: &Restaurant) -> bool {
        r.rating >= self.min_rating
    }

    fn cost_matches(&self, r: &Restaurant) -> bool {
        r.cost <= self.max_cost
    }
}

/// Rows matched by each predicate on its own, and by all four together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchCounts {
    pub city: usize,
    pub cuisine: usize,
    pub rating: usize,
    pub cost: usize,
    pub exact: usize,
}

/// Result of a filter pass, from strongest to weakest match
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// Rows satisfying all four predicates, sorted as requested
    Exact(Vec<usize>),
    /// No exact match; rows matching only city and cuisine, in table order
    Partial(Vec<usize>),
    /// Nothing in the city serves the cuisine
    NoMatch { available_cuisines: Vec<String> },
}

impl FilterOutcome {
    /// Row indices of the current filtered set; empty on no match
    pub fn rows(&self) -> &[usize] {
        match self {
            FilterOutcome::Exact(rows) | FilterOutcome::Partial(rows) => rows,
            FilterOutcome::NoMatch { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    pub outcome: FilterOutcome,
    pub counts: MatchCounts,
}

/// Apply the query to the table, falling back to weaker matches when needed
pub fn apply_filters(context: &Context, query: &Query, sort: SortOrder) -> FilterResult {
    let restaurants = &context.restaurants;
    let mut counts = MatchCounts::default();
    let mut exact = Vec::new();

    for (i, r) in restaurants.iter().enumerate() {
        let city = query.city_matches(r);
        let cuisine = query.cuisine_matches(r);
        let rating = query.rating_matches(r);
        let cost = query.cost_matches(r);

        counts.city += usize::from(city);
        counts.cuisine += usize::from(cuisine);
        counts.rating += usize::from(rating);
        counts.cost += usize::from(cost);
        if city && cuisine && rating && cost {
            exact.push(i);
        }
    }
    counts.exact = exact.len();
    debug!(?counts, city = %query.city, cuisine = %query.cuisine, "filter masks computed");

    let outcome = if !exact.is_empty() {
        sort_rows(restaurants, &mut exact, sort);
        FilterOutcome::Exact(exact)
    } else {
        let partial = city_and_cuisine_rows(context, &query.city, &query.cuisine);
        if !partial.is_empty() {
            FilterOutcome::Partial(partial)
        } else {
            FilterOutcome::NoMatch {
                available_cuisines: context
                    .cuisines_in(&query.city)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            }
        }
    };

    FilterResult { outcome, counts }
}

/// Rows matching city and cuisine regardless of thresholds
pub fn city_and_cuisine_rows(context: &Context, city: &str, cuisine: &str) -> Vec<usize> {
    matching_rows(&context.restaurants, |r| r.city == city && r.cuisine == cuisine)
}

/// Rows in a city
pub fn city_rows(context: &Context, city: &str) -> Vec<usize> {
    matching_rows(&context.restaurants, |r| r.city == city)
}

fn matching_rows(
    restaurants: &[Restaurant],
    predicate: impl Fn(&Restaurant) -> bool,
) -> Vec<usize> {
    restaurants
        .iter()
        .enumerate()
        .filter(|(_, r)| predicate(r))
        .map(|(i, _)| i)
        .collect()
}

/// Stable sort of row indices; ties keep their current order
pub fn sort_rows(restaurants: &[Restaurant], rows: &mut [usize], order: SortOrder) {
    let compare: fn(&Restaurant, &Restaurant) -> Ordering = match order {
        SortOrder::None => return,
        SortOrder::RatingDesc => |a, b| b.rating.total_cmp(&a.rating),
        SortOrder::CostAsc => |a, b| a.cost.cmp(&b.cost),
        SortOrder::CostDesc => |a, b| b.cost.cmp(&a.cost),
    };
    rows.sort_by(|&a, &b| compare(&restaurants[a], &restaurants[b]));
}
