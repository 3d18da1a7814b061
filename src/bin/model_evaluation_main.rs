use std::error::Error;
use traffic_volume_predictor::global_variables::{
    ServerConfig, DEFAULT_SPLIT_SEED, DEFAULT_TEST_FRACTION,
};
use traffic_volume_predictor::trainer::{category_counts, evaluate_holdout, load_dataset};

// Offline check of fit quality on a seeded 80/20 split. The served model is
// never built from this split.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let config = ServerConfig::from_env()?;

    let records = load_dataset(&config.dataset_path)?;
    println!("Loaded {} rows from {}", records.len(), config.dataset_path);
    for (field, count) in category_counts(&records) {
        println!("  {}: {} distinct values", field, count);
    }

    let report = evaluate_holdout(&records, DEFAULT_TEST_FRACTION, DEFAULT_SPLIT_SEED)?;
    println!("Holdout evaluation (seed {}):", DEFAULT_SPLIT_SEED);
    println!("  Train rows: {}", report.train_rows);
    println!("  Test rows: {}", report.test_rows);
    println!("  Skipped (unseen categories): {}", report.skipped_rows);
    match report.mean_absolute_error {
        Some(mae) => println!("  MAE: {:.3}", mae),
        None => println!("  MAE: n/a"),
    }
    match report.r_squared {
        Some(r2) => println!("  R^2: {:.4}", r2),
        None => println!("  R^2: n/a"),
    }
    Ok(())
}
