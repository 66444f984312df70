//! Per-SKU model training
//!
//! Training replays history through the same [`FeatureBuilder`] the
//! forecaster uses, so the feature semantics a model sees at prediction
//! time are exactly what it was fitted on. The fitted model, its scaler and
//! its metadata go through [`ModelStore::save`] as one unit.

use crate::error::{ForecastError, Result};
use crate::gbdt::GbdtRegressor;
use crate::metadata::ModelMetadata;
use crate::metrics::{forecast_accuracy, ForecastAccuracy};
use crate::regressor::{LinearRegressor, Regressor};
use crate::scaler::StandardScaler;
use crate::store::ModelStore;
use chrono::Utc;
use feature_math::{FeatureBuilder, FeatureSchema};
use log::info;
use price_data::{daily_price_series, DailySeries, HistoryStore};
use std::collections::BTreeMap;

/// Knobs for a training run
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// How far back to read observations
    pub lookback_days: u32,
    /// Raw observations required before training is attempted
    pub min_observations: usize,
    /// Chronological tail fraction held out for evaluation
    pub holdout_ratio: f64,
    /// L2 penalty on the feature weights (the intercept is unpenalized)
    pub ridge_lambda: f64,
    /// Days skipped at the series start so lags have context
    pub warmup_days: usize,
    /// History window a sample sees, matching the forecast buffers
    pub buffer_capacity: usize,
    /// Version string recorded in metadata
    pub version: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            lookback_days: 365,
            min_observations: 30,
            holdout_ratio: 0.2,
            ridge_lambda: 1.0,
            warmup_days: 7,
            buffer_capacity: 60,
            version: "0.1.0".to_string(),
        }
    }
}

/// Outcome of a completed training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub sku: String,
    pub samples: usize,
    pub holdout: ForecastAccuracy,
}

/// Train, evaluate and persist a ridge-regression price model for `sku`
pub fn train_price_model<S: HistoryStore>(
    history: &S,
    models: &ModelStore,
    builder: &FeatureBuilder,
    sku: &str,
    config: &TrainingConfig,
) -> Result<TrainingReport> {
    let series = daily_price_series(
        history,
        sku,
        config.lookback_days,
        config.min_observations,
    )?;

    let schema = FeatureSchema::standard();
    let (matrix, targets) = build_dataset(builder, &series, &schema, config)?;

    if matrix.len() < 4 {
        return Err(ForecastError::TrainingError(format!(
            "Only {} usable samples for {}; need at least 4",
            matrix.len(),
            sku
        )));
    }

    let holdout_len = ((matrix.len() as f64) * config.holdout_ratio).round() as usize;
    let holdout_len = holdout_len.clamp(1, matrix.len() - 1);
    let split = matrix.len() - holdout_len;

    let scaler = StandardScaler::fit(&matrix[..split])?;
    let train_x = scaler.transform_matrix(&matrix[..split])?;
    let test_x = scaler.transform_matrix(&matrix[split..])?;

    let (weights, intercept) = fit_ridge(&train_x, &targets[..split], config.ridge_lambda)?;
    let regressor = Regressor::Linear(LinearRegressor::new(weights, intercept));

    let predicted: Vec<f64> = test_x
        .iter()
        .map(|row| regressor.predict(row))
        .collect::<Result<_>>()?;
    let holdout = forecast_accuracy(&predicted, &targets[split..])?;

    let metadata = ModelMetadata {
        model_type: regressor.kind().to_string(),
        version: config.version.clone(),
        features: schema,
        hyperparameters: BTreeMap::from([
            ("ridge_lambda".to_string(), config.ridge_lambda),
            ("holdout_ratio".to_string(), config.holdout_ratio),
        ]),
        metrics: holdout.to_map(),
        trained_at: Utc::now(),
        training_samples: matrix.len(),
    };
    models.save(sku, &regressor, Some(&scaler), &metadata)?;

    info!(
        "Trained {} on {} samples (holdout MAE {:.4})",
        sku,
        matrix.len(),
        holdout.mae
    );

    Ok(TrainingReport {
        sku: sku.to_string(),
        samples: matrix.len(),
        holdout,
    })
}

/// Persist a LightGBM regression model exported by the platform's Python
/// training pipeline.
///
/// The text's feature count must match the schema the model was trained
/// with; a disagreement here would silently corrupt every prediction, so it
/// fails the import instead.
pub fn import_lightgbm_model(
    models: &ModelStore,
    sku: &str,
    text: &str,
    features: FeatureSchema,
    version: &str,
) -> Result<ModelMetadata> {
    let gbdt = GbdtRegressor::from_model_text(text)?;
    if gbdt.feature_count() != features.len() {
        return Err(ForecastError::SchemaMismatch {
            sku: sku.to_string(),
            detail: format!(
                "model text expects {} features, schema lists {}",
                gbdt.feature_count(),
                features.len()
            ),
        });
    }

    let metadata = ModelMetadata {
        model_type: "gradient_boost".to_string(),
        version: version.to_string(),
        features,
        hyperparameters: BTreeMap::from([("num_trees".to_string(), gbdt.num_trees() as f64)]),
        metrics: BTreeMap::new(),
        trained_at: Utc::now(),
        training_samples: 0,
    };
    models.save(sku, &Regressor::GradientBoost(gbdt), None, &metadata)?;
    Ok(metadata)
}

/// Walk the series building (feature vector, next-day price) pairs.
///
/// Each sample at day `t` sees only the `buffer_capacity` days before `t`,
/// the same window the forecaster feeds the model later.
fn build_dataset(
    builder: &FeatureBuilder,
    series: &DailySeries,
    schema: &FeatureSchema,
    config: &TrainingConfig,
) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    let warmup = config.warmup_days.max(1);
    let capacity = config.buffer_capacity.max(1);

    let mut matrix = Vec::new();
    let mut targets = Vec::new();
    for t in warmup..series.len() {
        let start = t.saturating_sub(capacity);
        let record = builder.build(
            series.dates[t],
            &series.prices[start..t],
            &series.quantities[start..t],
        )?;
        matrix.push(record.to_vector(schema)?);
        targets.push(series.prices[t]);
    }
    Ok((matrix, targets))
}

/// Ridge least squares via the normal equations, with an unpenalized
/// intercept. Returns (weights, intercept).
fn fit_ridge(matrix: &[Vec<f64>], targets: &[f64], lambda: f64) -> Result<(Vec<f64>, f64)> {
    let rows = matrix.len();
    if rows == 0 || rows != targets.len() {
        return Err(ForecastError::TrainingError(
            "Design matrix and targets must have the same non-zero length".to_string(),
        ));
    }
    let cols = matrix[0].len();
    let dim = cols + 1; // bias column appended last

    let mut normal = vec![vec![0.0; dim]; dim];
    let mut rhs = vec![0.0; dim];
    let mut augmented = vec![0.0; dim];

    for (row, &y) in matrix.iter().zip(targets.iter()) {
        if row.len() != cols {
            return Err(ForecastError::TrainingError(
                "Ragged design matrix".to_string(),
            ));
        }
        augmented[..cols].copy_from_slice(row);
        augmented[cols] = 1.0;

        for i in 0..dim {
            rhs[i] += augmented[i] * y;
            for j in 0..dim {
                normal[i][j] += augmented[i] * augmented[j];
            }
        }
    }

    for i in 0..cols {
        normal[i][i] += lambda.max(0.0);
    }

    let solution = solve_linear_system(normal, rhs)?;
    let intercept = solution[cols];
    let weights = solution[..cols].to_vec();
    Ok((weights, intercept))
}

/// Gaussian elimination with partial pivoting
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let mut pivot = col;
        for row in (col + 1)..n {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < 1e-10 {
            return Err(ForecastError::TrainingError(
                "Singular normal matrix; increase ridge_lambda".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for col in (0..n).rev() {
        let mut sum = b[col];
        for k in (col + 1)..n {
            sum -= a[col][k] * x[k];
        }
        x[col] = sum / a[col][col];
    }
    Ok(x)
}
