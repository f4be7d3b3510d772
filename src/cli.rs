//! Command-line interface definitions, argument parsing and command dispatch

use crate::context::{ArtifactPaths, Context, Session};
use crate::filter::{
    apply_filters, FilterOutcome, Query, SortOrder, DEFAULT_MAX_COST, DEFAULT_MIN_RATING,
};
use crate::pick::random_pick;
use crate::recommend::recommend_similar;
use crate::render;
use clap::{Parser, Subcommand, ValueEnum};
use rand::Rng;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Restaurant finder with cluster-based recommendations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the restaurant CSV table
    #[arg(
        long,
        env = "DINECLUSTER_DATA",
        default_value = "cleaned_data.csv",
        global = true
    )]
    pub data: PathBuf,

    /// Path to the fitted city label encoder (JSON)
    #[arg(
        long,
        env = "DINECLUSTER_CITY_ENCODER",
        default_value = "le_city.json",
        global = true
    )]
    pub city_encoder: PathBuf,

    /// Path to the fitted cuisine label encoder (JSON)
    #[arg(
        long,
        env = "DINECLUSTER_CUISINE_ENCODER",
        default_value = "le_cuisine.json",
        global = true
    )]
    pub cuisine_encoder: PathBuf,

    /// Path to the fitted K-Means model (JSON)
    #[arg(
        long,
        env = "DINECLUSTER_MODEL",
        default_value = "kmeans_model.json",
        global = true
    )]
    pub model: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            data: self.data.clone(),
            city_encoder: self.city_encoder.clone(),
            cuisine_encoder: self.cuisine_encoder.clone(),
            model: self.model.clone(),
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List the cities in the table
    Cities,
    /// List the cuisines available in a city
    Cuisines {
        #[arg(long)]
        city: String,
    },
    /// Filter restaurants and suggest similar ones
    Search(SearchArgs),
    /// Interactive shell: one command per line, keeping the data loaded
    Shell,
}

#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct SearchArgs {
    #[arg(long)]
    pub city: String,

    #[arg(long)]
    pub cuisine: String,

    /// Minimum rating (0.0 - 5.0)
    #[arg(long, default_value_t = DEFAULT_MIN_RATING)]
    pub min_rating: f64,

    /// Maximum cost in rupees (100 - 2000)
    #[arg(long, default_value_t = DEFAULT_MAX_COST)]
    pub max_cost: i64,

    #[arg(long, value_enum, default_value_t = SortArg::None)]
    pub sort: SortArg,

    /// Also pick a random restaurant from the selection
    #[arg(long)]
    pub surprise: bool,
}

impl SearchArgs {
    pub fn query(&self) -> crate::Result<Query> {
        Query::new(&self.city, &self.cuisine, self.min_rating, self.max_cost)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    /// Keep table order
    None,
    /// Rating, high to low
    RatingDesc,
    /// Cost, low to high
    CostAsc,
    /// Cost, high to low
    CostDesc,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::None => SortOrder::None,
            SortArg::RatingDesc => SortOrder::RatingDesc,
            SortArg::CostAsc => SortOrder::CostAsc,
            SortArg::CostDesc => SortOrder::CostDesc,
        }
    }
}

/// One line of the interactive shell
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

/// Split a shell line on whitespace; double quotes group words
pub fn split_line(line: &str) -> crate::Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        anyhow::bail!("Unterminated quote in: {}", line);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Run a single command against a loaded context and return its output
pub fn execute<R: Rng + ?Sized>(
    context: &Context,
    command: &Command,
    rng: &mut R,
) -> crate::Result<String> {
    let mut out = String::new();
    match command {
        Command::Cities => {
            for city in context.cities() {
                out.push_str(city);
                out.push('\n');
            }
        }
        Command::Cuisines { city } => {
            let cuisines = context.cuisines_in(city);
            if cuisines.is_empty() {
                out = format!("No restaurants found in {}.\n", city);
            } else {
                out = format!(
                    "Cuisines available in {}: {}\n",
                    city,
                    cuisines.join(", ")
                );
            }
        }
        Command::Search(search) => {
            let query = search.query()?;
            let result = apply_filters(context, &query, search.sort.into());
            out.push_str(&render::outcome(context, &result.outcome, &query.city));

            if !matches!(result.outcome, FilterOutcome::NoMatch { .. }) {
                let recs = recommend_similar(context, result.outcome.rows(), &query.city);
                if let Err(err) = &recs {
                    warn!(%err, "recommendation step failed");
                }
                out.push('\n');
                out.push_str(&render::recommendations(context, &recs));
            }

            out.push('\n');
            out.push_str(&render::match_counts(&result.counts));

            if search.surprise {
                let pick = random_pick(context, result.outcome.rows(), &query, rng);
                out.push('\n');
                out.push_str(&render::random_pick(context, pick.as_ref()));
            }
        }
        Command::Shell => anyhow::bail!("Already in a shell session"),
    }
    Ok(out)
}

/// Drive a shell session over `lines`, writing every command's output to `out`
///
/// The context is loaded through `session` on the first command and reused
/// afterwards. A failing line prints `Error: ...` and the session continues;
/// `quit` or `exit` ends it, as does the end of `lines`.
pub fn run_shell_lines<I, W, R>(
    session: &mut Session,
    paths: &ArtifactPaths,
    lines: I,
    out: &mut W,
    rng: &mut R,
) -> crate::Result<()>
where
    I: IntoIterator<Item = String>,
    W: Write,
    R: Rng + ?Sized,
{
    info!("shell session started");

    for line in lines {
        let trimmed = line.trim();
        match trimmed {
            "quit" | "exit" => break,
            "" => continue,
            _ => {}
        }

        debug!(line = trimmed, "shell command");
        let result = split_line(trimmed)
            .and_then(|words| ShellLine::try_parse_from(words).map_err(Into::into))
            .and_then(|parsed| {
                let context = session.context(paths)?;
                execute(&context, &parsed.command, rng)
            });

        match result {
            Ok(output) => write!(out, "{}", output)?,
            Err(err) => writeln!(out, "Error: {:#}", err)?,
        }
        out.flush()?;
    }

    info!("shell session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::{sample_context, write_sample_fixture};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn parse_line(line: &str) -> Command {
        ShellLine::try_parse_from(split_line(line).unwrap())
            .unwrap()
            .command
    }

    #[test]
    fn test_split_line() {
        assert_eq!(
            split_line(r#"search --city Mumbai --cuisine "North Indian"  --surprise"#).unwrap(),
            vec!["search", "--city", "Mumbai", "--cuisine", "North Indian", "--surprise"]
        );
        assert_eq!(split_line("   ").unwrap(), Vec::<String>::new());
        assert_eq!(
            split_line(r#"cuisines --city """#).unwrap(),
            vec!["cuisines", "--city", ""]
        );
        assert!(split_line(r#"cuisines --city "Navi Mumbai"#).is_err());
    }

    #[test]
    fn test_parse_search_defaults() {
        let command = parse_line("search --city Mumbai --cuisine Chinese");
        let Command::Search(search) = command else {
            panic!("expected search, got {:?}", command);
        };

        assert_eq!(search.min_rating, 3.5);
        assert_eq!(search.max_cost, 500);
        assert_eq!(search.sort, SortArg::None);
        assert!(!search.surprise);
    }

    #[test]
    fn test_parse_search_options() {
        let command = parse_line(
            "search --city Mumbai --cuisine Chinese --min-rating 4 --max-cost 400 \
             --sort cost-desc --surprise",
        );
        let Command::Search(search) = command else {
            panic!("expected search, got {:?}", command);
        };

        assert_eq!(search.min_rating, 4.0);
        assert_eq!(search.max_cost, 400);
        assert_eq!(SortOrder::from(search.sort), SortOrder::CostDesc);
        assert!(search.surprise);
    }

    #[test]
    fn test_execute_search_partial_match() {
        let context = sample_context();
        let mut rng = StdRng::seed_from_u64(1);
        let command =
            parse_line("search --city Mumbai --cuisine Chinese --min-rating 4.8 --max-cost 2000");

        let out = execute(&context, &command, &mut rng).unwrap();
        assert!(out.contains("Found 3 restaurants matching only city and cuisine."));
        assert!(out.contains("Other Recommended Restaurants"));
        assert!(out.contains("Total exact matches: 0"));
    }

    #[test]
    fn test_execute_search_no_match_skips_recommendations() {
        let context = sample_context();
        let mut rng = StdRng::seed_from_u64(1);
        let command = parse_line("search --city Delhi --cuisine Italian --surprise");

        let out = execute(&context, &command, &mut rng).unwrap();
        assert!(out.contains("Available cuisines in Delhi:"));
        assert!(!out.contains("Recommended"));
        assert!(out.contains("Here's a random restaurant based on your city:"));
    }

    #[test]
    fn test_execute_rejects_invalid_threshold() {
        let context = sample_context();
        let mut rng = StdRng::seed_from_u64(1);
        let command = parse_line("search --city Mumbai --cuisine Chinese --max-cost 50");

        assert!(execute(&context, &command, &mut rng).is_err());
    }

    #[test]
    fn test_execute_listings() {
        let context = sample_context();
        let mut rng = StdRng::seed_from_u64(1);

        let cities = execute(&context, &Command::Cities, &mut rng).unwrap();
        assert_eq!(cities, "Delhi\nMumbai\n");

        let cuisines = execute(
            &context,
            &Command::Cuisines {
                city: "Mumbai".to_string(),
            },
            &mut rng,
        )
        .unwrap();
        assert_eq!(cuisines, "Cuisines available in Mumbai: Chinese, Italian\n");
    }

    fn run_lines(session: &mut Session, paths: &ArtifactPaths, lines: &[&str]) -> String {
        let mut out = Vec::new();
        let mut rng = StdRng::seed_from_u64(1);
        let lines = lines.iter().map(|line| line.to_string());

        run_shell_lines(session, paths, lines, &mut out, &mut rng).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_shell_continues_after_failed_line() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sample_fixture(dir.path());
        let mut session = Session::new();

        let out = run_lines(
            &mut session,
            &paths,
            &[
                "search --city Mumbai --cuisine Chinese --max-cost 50",
                "cities",
            ],
        );
        assert!(out.starts_with("Error: "));
        assert!(out.contains("Maximum cost must be between"));
        assert!(out.ends_with("Delhi\nMumbai\n"));
    }

    #[test]
    fn test_shell_reports_unknown_command() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sample_fixture(dir.path());
        let mut session = Session::new();

        let out = run_lines(&mut session, &paths, &["dance", r#"cuisines --city "Navi"#]);
        assert_eq!(out.matches("Error: ").count(), 2);
    }

    #[test]
    fn test_shell_stops_at_quit() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sample_fixture(dir.path());
        let mut session = Session::new();

        assert_eq!(run_lines(&mut session, &paths, &["quit", "cities"]), "");
        assert_eq!(run_lines(&mut session, &paths, &["  exit  ", "cities"]), "");
    }

    #[test]
    fn test_shell_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sample_fixture(dir.path());
        let mut session = Session::new();

        let out = run_lines(&mut session, &paths, &["", "   ", "cities"]);
        assert_eq!(out, "Delhi\nMumbai\n");
    }

    #[test]
    fn test_shell_loads_context_once() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sample_fixture(dir.path());
        let mut session = Session::new();

        let first = run_lines(&mut session, &paths, &["cities"]);
        std::fs::remove_file(&paths.data).unwrap();
        let second = run_lines(
            &mut session,
            &paths,
            &["cuisines --city Mumbai", "cities"],
        );

        assert_eq!(first, "Delhi\nMumbai\n");
        assert_eq!(
            second,
            "Cuisines available in Mumbai: Chinese, Italian\nDelhi\nMumbai\n"
        );
    }
}
