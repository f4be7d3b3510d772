//! Plain-text rendering of listings, outcomes and diagnostics

use crate::context::Context;
use crate::data::Restaurant;
use crate::filter::{FilterOutcome, MatchCounts};
use crate::pick::{PickSource, RandomPick};
use crate::recommend::{RecommendError, Recommendations};

const SEPARATOR: &str = "----------------------------------------";

/// Render one restaurant card
pub fn restaurant(r: &Restaurant) -> String {
    let reviews = match r.rating_count {
        Some(count) => count.to_string(),
        None => "Too Few Ratings".to_string(),
    };

    format!(
        "{}\n  City: {}\n  Cuisine: {}\n  Rating: {:.1} ({} reviews)\n  Cost: ₹{}\n",
        r.name, r.city, r.cuisine, r.rating, reviews, r.cost
    )
}

fn listing(out: &mut String, context: &Context, rows: &[usize]) {
    for &row in rows {
        out.push_str(&restaurant(&context.restaurants[row]));
        out.push_str(SEPARATOR);
        out.push('\n');
    }
}

/// Render the filter outcome: matches, the weaker fallback, or guidance
pub fn outcome(context: &Context, outcome: &FilterOutcome, city: &str) -> String {
    match outcome {
        FilterOutcome::Exact(rows) => {
            let mut out = format!(
                "Found {} matching restaurant(s).\n\nMatching Restaurants\n{}\n",
                rows.len(),
                SEPARATOR
            );
            listing(&mut out, context, rows);
            out
        }
        FilterOutcome::Partial(rows) => format!(
            "No exact match found with all filters.\n\
             Found {} restaurants matching only city and cuisine.\n",
            rows.len()
        ),
        FilterOutcome::NoMatch { available_cuisines } => {
            let cuisines: String = available_cuisines
                .iter()
                .map(|cuisine| format!("- {}\n", cuisine))
                .collect();
            format!(
                "No exact match found with all filters.\n\
                 No restaurants found with the selected filters.\n\
                 Available cuisines in {}:\n{}",
                city, cuisines
            )
        }
    }
}

/// Render the recommendation step, including its non-fatal failures
pub fn recommendations(
    context: &Context,
    result: &Result<Option<Recommendations>, RecommendError>,
) -> String {
    match result {
        Ok(Some(recs)) if !recs.similar.is_empty() => {
            let mut out = format!("Other Recommended Restaurants\n{}\n", SEPARATOR);
            listing(&mut out, context, &recs.similar);
            out
        }
        Ok(Some(_)) => {
            "No other similar restaurants found in the same cluster for the selected city.\n"
                .to_string()
        }
        Ok(None) => String::new(),
        Err(err) => format!("Error generating recommendations: {}\n", err),
    }
}

/// Render per-predicate match counts
pub fn match_counts(counts: &MatchCounts) -> String {
    format!(
        "Filter Match Counts\n  \
         City match count: {}\n  \
         Cuisine match count: {}\n  \
         Rating match count: {}\n  \
         Cost match count: {}\n  \
         Total exact matches: {}\n",
        counts.city, counts.cuisine, counts.rating, counts.cost, counts.exact
    )
}

/// Render a random pick with its tags
pub fn random_pick(context: &Context, pick: Option<&RandomPick>) -> String {
    let Some(pick) = pick else {
        return "No restaurants available for your selection to suggest randomly.\n".to_string();
    };

    let origin = match pick.source {
        PickSource::Filtered => "your selection",
        PickSource::CityAndCuisine => "your city and cuisine",
        PickSource::City => "your city",
    };
    let mut out = format!(
        "Here's a random restaurant based on {}:\n{}",
        origin,
        restaurant(&context.restaurants[pick.row])
    );

    if !pick.tags.is_empty() {
        let tags: Vec<String> = pick.tags.iter().map(ToString::to_string).collect();
        out.push_str(&format!("  Tags: {}\n", tags.join(", ")));
    }
    out.push_str(SEPARATOR);
    out.push('\n');
    out
}

/// Render the table size and how the training rows spread over clusters
pub fn summary(context: &Context) -> String {
    let total = context.restaurants.len();
    let mut out = format!("Loaded {} restaurants\n", total);

    for (cluster, size) in context.model.cluster_sizes().iter().enumerate() {
        let percentage = if total == 0 {
            0.0
        } else {
            *size as f64 / total as f64 * 100.0
        };
        out.push_str(&format!(
            "  Cluster {}: {} restaurants ({:.1}%)\n",
            cluster, size, percentage
        ));
    }
    out
}
