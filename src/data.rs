//! Restaurant table loading and field normalization using Polars

use crate::encoder::LabelEncoder;
use anyhow::Context as _;
use polars::prelude::{CsvReadOptions, DataFrame, DataType, SerReader};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Columns every table must provide
pub const REQUIRED_COLUMNS: [&str; 5] = ["name", "city", "cuisine", "cost", "rating"];

/// Highest rating a restaurant can carry
pub const MAX_RATING: f64 = 5.0;

/// One restaurant row after normalization and encoding
#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
    pub name: String,
    pub city: String,
    pub cuisine: String,
    /// Rating in [0.0, 5.0]; 0.0 when the source value was unusable
    pub rating: f64,
    /// Cost for two in rupees; 0 when the source value was unusable
    pub cost: i64,
    pub rating_count: Option<ReviewCount>,
    pub city_code: usize,
    pub cuisine_code: usize,
}

/// Number of reviews; `at_least` marks bucketed counts such as `"100+"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewCount {
    pub count: u64,
    pub at_least: bool,
}

impl ReviewCount {
    pub fn exact(count: u64) -> Self {
        Self {
            count,
            at_least: false,
        }
    }

    pub fn at_least(count: u64) -> Self {
        Self {
            count,
            at_least: true,
        }
    }
}

impl fmt::Display for ReviewCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count)?;
        if self.at_least {
            f.write_str("+")?;
        }
        Ok(())
    }
}

/// Load the restaurant table and encode its categorical columns
///
/// # Arguments
/// * `file_path` - Path to the CSV file
/// * `cities` - Fitted city encoder
/// * `cuisines` - Fitted cuisine encoder
///
/// # Returns
/// * Rows in file order; fails on a missing column or an unseen category
pub fn load_restaurants(
    file_path: impl AsRef<Path>,
    cities: &LabelEncoder,
    cuisines: &LabelEncoder,
) -> crate::Result<Vec<Restaurant>> {
    let file_path = file_path.as_ref();
    info!(path = %file_path.display(), "loading restaurant table");

    // Everything is read as text; the numeric columns carry currency symbols
    // and placeholders that are normalized below.
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(file_path.to_path_buf()))?
        .finish()
        .with_context(|| format!("failed to read {}", file_path.display()))?;

    let restaurants = restaurants_from_frame(&df, cities, cuisines)?;
    info!(rows = restaurants.len(), "restaurant table loaded");
    Ok(restaurants)
}

/// Convert a text-typed frame into encoded restaurant rows
pub fn restaurants_from_frame(
    df: &DataFrame,
    cities: &LabelEncoder,
    cuisines: &LabelEncoder,
) -> crate::Result<Vec<Restaurant>> {
    let [names, city_values, cuisine_values, costs, ratings] =
        REQUIRED_COLUMNS.map(|name| text_column(df, name));
    let (names, city_values, cuisine_values, costs, ratings) =
        (names?, city_values?, cuisine_values?, costs?, ratings?);

    let rating_counts = if df.column("rating_count").is_ok() {
        text_column(df, "rating_count")?
    } else {
        debug!("no rating_count column, review counts will be absent");
        vec![None; df.height()]
    };

    let mut restaurants = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let city = trimmed(&city_values[i]);
        let cuisine = trimmed(&cuisine_values[i]);
        let city_code = cities
            .transform(&city)
            .with_context(|| format!("failed to encode row {}", i))?;
        let cuisine_code = cuisines
            .transform(&cuisine)
            .with_context(|| format!("failed to encode row {}", i))?;

        restaurants.push(Restaurant {
            name: trimmed(&names[i]),
            city,
            cuisine,
            rating: parse_rating(ratings[i].as_deref()),
            cost: parse_cost(costs[i].as_deref()),
            rating_count: parse_rating_count(rating_counts[i].as_deref()),
            city_code,
            cuisine_code,
        });
    }

    Ok(restaurants)
}

fn text_column(df: &DataFrame, name: &str) -> crate::Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .with_context(|| format!("missing required column {:?}", name))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    let values = series.str()?;
    Ok(values.into_iter().map(|v| v.map(str::to_string)).collect())
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().trim().to_string()
}

/// Parse a currency-formatted cost such as `"₹1,200"`
///
/// Non-parseable and negative values normalize to 0; decimals are truncated.
pub fn parse_cost(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return 0;
    };
    let cleaned = raw.replace(['₹', ','], "");
    let cleaned = cleaned.trim();

    cleaned
        .parse::<i64>()
        .ok()
        .or_else(|| {
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.trunc() as i64)
        })
        .filter(|&v| v >= 0)
        .unwrap_or(0)
}

/// Parse a rating; anything unusable or outside [0, 5] becomes 0.0
pub fn parse_rating(raw: Option<&str>) -> f64 {
    raw.and_then(|r| r.trim().parse::<f64>().ok())
        .filter(|r| r.is_finite() && (0.0..=MAX_RATING).contains(r))
        .unwrap_or(0.0)
}

/// Parse review counts like `"50"`, `"100+ ratings"` or `"1.5K+ ratings"`
pub fn parse_rating_count(raw: Option<&str>) -> Option<ReviewCount> {
    let raw = raw?.trim();
    let number_end = raw
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(raw.len());
    let number: f64 = raw[..number_end].parse().ok()?;

    let mut rest = raw[number_end..].chars().peekable();
    let scale = match rest.peek() {
        Some('K') | Some('k') => {
            rest.next();
            1000.0
        }
        _ => 1.0,
    };
    let count = (number * scale).round();
    if !count.is_finite() || count > u64::MAX as f64 {
        return None;
    }

    Some(ReviewCount {
        count: count as u64,
        at_least: rest.next() == Some('+'),
    })
}
