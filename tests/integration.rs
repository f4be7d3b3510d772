//! Integration tests for DineCluster

use dinecluster::{
    apply_filters, random_pick, recommend_similar, ArtifactPaths, Context, FilterOutcome, Query,
    Session, SortOrder,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::Write;
use std::sync::Arc;
use tempfile::TempDir;

const CITY_ENCODER: &str = r#"{"classes": ["Delhi", "Mumbai"]}"#;
const CUISINE_ENCODER: &str = r#"{"classes": ["Chinese", "Italian", "North Indian"]}"#;
const MODEL: &str = r#"{
    "centroids": [[1, 0, 3.9, 500], [1, 1, 4.5, 1200], [0, 1.5, 2.3, 275]],
    "labels": [0, 0, 0, 1, 2, 2]
}"#;

/// Write a table and its artifacts into a temporary directory
fn create_fixture(model: &str) -> (TempDir, ArtifactPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths {
        data: dir.path().join("restaurants.csv"),
        city_encoder: dir.path().join("le_city.json"),
        cuisine_encoder: dir.path().join("le_cuisine.json"),
        model: dir.path().join("kmeans_model.json"),
    };

    let mut csv = fs::File::create(&paths.data).unwrap();
    writeln!(csv, "name,city,rating,rating_count,cost,cuisine").unwrap();
    writeln!(csv, "Wok Express,Mumbai,4.3,100+ ratings,₹ 450,Chinese").unwrap();
    writeln!(csv, "Dragon Bowl,Mumbai,3.6,Too Few Ratings,₹ 500,Chinese").unwrap();
    writeln!(csv, "Chowman,Mumbai,3.9,50+ ratings,₹ 600,Chinese").unwrap();
    writeln!(csv, "Pasta Street,Mumbai,4.5,1K+ ratings,\"₹1,200\",Italian").unwrap();
    writeln!(csv, "Karim's,Delhi,4.6,500+ ratings,₹ 300,North Indian").unwrap();
    writeln!(csv, "Noodle Bar,Delhi,--,Too Few Ratings,₹ 250,Chinese").unwrap();

    fs::write(&paths.city_encoder, CITY_ENCODER).unwrap();
    fs::write(&paths.cuisine_encoder, CUISINE_ENCODER).unwrap();
    fs::write(&paths.model, model).unwrap();

    (dir, paths)
}

#[test]
fn test_load_context() {
    let (_dir, paths) = create_fixture(MODEL);
    let context = Context::load(&paths).unwrap();

    assert_eq!(context.restaurants.len(), 6);
    assert_eq!(context.model.n_clusters, 3);
    assert_eq!(context.restaurants[3].cost, 1200);
    assert_eq!(context.restaurants[5].rating, 0.0);

    // Every parsed row stays in the documented ranges.
    for r in &context.restaurants {
        assert!(r.cost >= 0);
        assert!((0.0..=5.0).contains(&r.rating));
    }
}

#[test]
fn test_partial_match_example() {
    let (_dir, paths) = create_fixture(MODEL);
    let context = Context::load(&paths).unwrap();
    let query = Query::new("Mumbai", "Chinese", 4.0, 400).unwrap();

    let result = apply_filters(&context, &query, SortOrder::RatingDesc);
    assert_eq!(result.counts.exact, 0);
    assert_eq!(result.outcome, FilterOutcome::Partial(vec![0, 1, 2]));

    let recs = recommend_similar(&context, result.outcome.rows(), &query.city)
        .unwrap()
        .unwrap();
    assert_eq!(recs.reference, 0);
    assert_eq!(recs.similar, vec![1, 2]);
}

#[test]
fn test_random_pick_prefers_city_and_cuisine() {
    let (_dir, paths) = create_fixture(MODEL);
    let context = Context::load(&paths).unwrap();
    let query = Query::new("Mumbai", "Chinese", 4.0, 400).unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..25 {
        let pick = random_pick(&context, &[], &query, &mut rng).unwrap();
        assert!([0, 1, 2].contains(&pick.row));
    }
}

#[test]
fn test_session_reuses_context() {
    let (_dir, paths) = create_fixture(MODEL);
    let mut session = Session::new();

    let first = session.context(&paths).unwrap();
    // Cached: the table is not read again even if it disappears.
    fs::remove_file(&paths.data).unwrap();
    let second = session.context(&paths).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_session_reloads_on_new_inputs() {
    let (_dir, paths) = create_fixture(MODEL);
    let (_other_dir, other_paths) = create_fixture(MODEL);
    let mut session = Session::new();

    let first = session.context(&paths).unwrap();
    let second = session.context(&other_paths).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_label_count_mismatch_fails_load() {
    let (_dir, paths) = create_fixture(
        r#"{"centroids": [[1, 0, 3.9, 500]], "labels": [0, 0, 0]}"#,
    );

    let err = Context::load(&paths).unwrap_err();
    assert!(err.to_string().contains("3 training labels"));
}

#[test]
fn test_unseen_category_fails_load() {
    let (_dir, paths) = create_fixture(MODEL);
    fs::write(&paths.city_encoder, r#"{"classes": ["Mumbai"]}"#).unwrap();

    let err = Context::load(&paths).unwrap_err();
    assert!(format!("{:#}", err).contains("unseen city category: \"Delhi\""));
}
