// trainer/mod.rs
//
// Builds the fitted pipeline from the traffic dataset. The served model is
// always fit on every row; the seeded train/test split below only feeds the
// offline holdout report.

use crate::error::{PredictionError, TrainingError};
use crate::model::{FittedPipeline, OneHotEncoder};
use crate::shared_data::{CategoricalField, TrafficFeatures, TrafficRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reads every row of the dataset at `path`.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Vec<TrafficRecord>, TrainingError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| TrainingError::DatasetIo {
        path: path.display().to_string(),
        source,
    })?;
    read_records(file)
}

/// Parses header-keyed CSV rows. Extra columns are ignored.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<TrafficRecord>, TrainingError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let record: TrafficRecord = result?;
        if !record.temperature.is_finite() {
            return Err(TrainingError::NonFinite {
                row: i + 1,
                column: "temperature",
            });
        }
        if !record.traffic_volume.is_finite() {
            return Err(TrainingError::NonFinite {
                row: i + 1,
                column: "traffic_volume",
            });
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }
    Ok(records)
}

pub fn normalize_records(records: &mut [TrafficRecord]) {
    for record in records.iter_mut() {
        record.normalize();
    }
}

/// Separates the `traffic_volume` target from the input columns.
pub fn split_features_and_target(records: &[TrafficRecord]) -> (Vec<TrafficFeatures>, Vec<f64>) {
    records
        .iter()
        .map(|r| (r.features(), r.traffic_volume))
        .unzip()
}

/// Normalizes `records` and fits the pipeline on all of them.
pub fn fit_records(mut records: Vec<TrafficRecord>) -> Result<FittedPipeline, TrainingError> {
    normalize_records(&mut records);
    let (features, targets) = split_features_and_target(&records);
    FittedPipeline::fit(&features, &targets)
}

/// Loads the dataset and fits the served model. Any failure here is fatal for startup.
pub fn train<P: AsRef<Path>>(dataset_path: P) -> Result<FittedPipeline, TrainingError> {
    let dataset_path = dataset_path.as_ref();
    log::info!("Loading traffic dataset from {}", dataset_path.display());
    let records = load_dataset(dataset_path)?;
    let n_rows = records.len();

    let pipeline = fit_records(records)?;
    for vocab in pipeline.encoder().vocabularies() {
        log::info!(
            "Learned {} categories for {}: {:?}",
            vocab.categories.len(),
            vocab.field,
            vocab.categories
        );
    }
    log::info!(
        "Fitted linear regression on {} rows: {} features, intercept {:.3}",
        n_rows,
        pipeline.regressor().n_features(),
        pipeline.regressor().intercept()
    );
    Ok(pipeline)
}

/// Deterministic shuffle-and-split. The test part holds `ceil(n * test_fraction)` rows.
pub fn train_test_split(
    records: &[TrafficRecord],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<TrafficRecord>, Vec<TrafficRecord>), TrainingError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(TrainingError::InvalidSplit(test_fraction));
    }
    let n_test = (records.len() as f64 * test_fraction).ceil() as usize;
    if n_test >= records.len() {
        return Err(TrainingError::EmptyDataset);
    }

    let mut indices: Vec<usize> = (0..records.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    let pick = |idx: &[usize]| idx.iter().map(|&i| records[i].clone()).collect::<Vec<_>>();
    Ok((pick(train_idx), pick(test_idx)))
}

/// Fit quality measured on rows held out from training.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldoutReport {
    pub train_rows: usize,
    pub test_rows: usize,
    /// Test rows whose categories never appeared in the train part.
    pub skipped_rows: usize,
    pub mean_absolute_error: Option<f64>,
    pub r_squared: Option<f64>,
}

pub fn evaluate_holdout(
    records: &[TrafficRecord],
    test_fraction: f64,
    seed: u64,
) -> Result<HoldoutReport, TrainingError> {
    let (train, test) = train_test_split(records, test_fraction, seed)?;
    let train_rows = train.len();
    let test_rows = test.len();
    let pipeline = fit_records(train)?;

    let mut scored = Vec::with_capacity(test_rows);
    let mut skipped_rows = 0;
    for record in &test {
        let features = record.features().normalized();
        match pipeline.predict(&features) {
            Ok(predicted) => scored.push((predicted, record.traffic_volume)),
            Err(PredictionError::UnknownCategory(unknown)) => {
                log::debug!("Skipping holdout row: {}", unknown);
                skipped_rows += 1;
            }
            Err(e) => return Err(TrainingError::Evaluation(e.to_string())),
        }
    }

    Ok(HoldoutReport {
        train_rows,
        test_rows,
        skipped_rows,
        mean_absolute_error: mean_absolute_error(&scored),
        r_squared: r_squared(&scored),
    })
}

fn mean_absolute_error(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }
    let total: f64 = pairs.iter().map(|(p, y)| (p - y).abs()).sum();
    Some(total / pairs.len() as f64)
}

fn r_squared(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let mean = pairs.iter().map(|(_, y)| y).sum::<f64>() / pairs.len() as f64;
    let ss_tot: f64 = pairs.iter().map(|(_, y)| (y - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return None;
    }
    let ss_res: f64 = pairs.iter().map(|(p, y)| (y - p).powi(2)).sum();
    Some(1.0 - ss_res / ss_tot)
}

/// Distinct normalized values per field, for quick dataset summaries.
pub fn category_counts(records: &[TrafficRecord]) -> Vec<(CategoricalField, usize)> {
    let features: Vec<TrafficFeatures> = records.iter().map(|r| r.features().normalized()).collect();
    let encoder = OneHotEncoder::fit(&features);
    encoder
        .vocabularies()
        .iter()
        .map(|v| (v.field, v.categories.len()))
        .collect()
}
