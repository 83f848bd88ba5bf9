//! Binary logistic regression trained with full-batch gradient descent.
//!
//! The optimiser is deliberately simple: zero initialisation, a fixed number
//! of steps, a constant learning rate and no early stopping. Given the same
//! inputs it produces bit-identical weights.

use serde::{Deserialize, Serialize};

/// Default number of gradient descent steps.
pub const DEFAULT_STEPS: usize = 800;

/// Default learning rate.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Probabilities are clamped to `[EPS, 1 - EPS]` before taking logs.
const LOG_LOSS_EPS: f64 = 1e-15;

/// Optimiser hyper-parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainParams {
    pub steps: usize,
    pub learning_rate: f64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            learning_rate: DEFAULT_LEARNING_RATE,
        }
    }
}

impl TrainParams {
    /// Reject settings the optimiser cannot run with. Zero steps is allowed.
    pub fn validate(&self) -> Result<(), TrainError> {
        let lr = self.learning_rate;
        if !lr.is_finite() || lr <= 0.0 {
            return Err(TrainError::InvalidParams(format!(
                "learning_rate must be a positive number, got {lr}"
            )));
        }
        Ok(())
    }
}

/// Training failures.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainError {
    /// The training matrix has no rows
    NoTrainingRows,
    /// Rows of differing width or a label vector of the wrong length
    InvalidInput(String),
    /// Optimiser settings out of range
    InvalidParams(String),
    /// Gradient descent produced a non-finite weight or bias
    Diverged,
    /// No event carried a usable label
    NoLabeledEvents,
    /// The labeled rows did not contain exactly two distinct labels
    LabelCount(Vec<String>),
    /// The labeled rows carried no numeric features
    NoNumericFeatures,
    /// Writing the model or hashing the events file failed
    IoError(String),
    SerializeError(String),
}

impl std::fmt::Display for TrainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrainError::NoTrainingRows => write!(f, "No training rows"),
            TrainError::InvalidInput(e) => write!(f, "Invalid training input: {e}"),
            TrainError::InvalidParams(e) => write!(f, "Invalid training parameters: {e}"),
            TrainError::Diverged => write!(f, "Training diverged: non-finite weights"),
            TrainError::NoLabeledEvents => {
                write!(f, "No labeled events found. Add payload.label for training.")
            }
            TrainError::LabelCount(labels) => write!(
                f,
                "Binary training requires exactly 2 labels; got {labels:?}"
            ),
            TrainError::NoNumericFeatures => write!(
                f,
                "No numeric features found. Add numeric payload.features.* fields."
            ),
            TrainError::IoError(e) => write!(f, "IO error: {e}"),
            TrainError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for TrainError {}

/// In-sample quality of a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Number of rows the model was trained on
    pub rows: usize,
    /// Fraction of rows classified correctly at a 0.5 threshold
    pub accuracy: f64,
    /// Mean binary cross-entropy
    pub log_loss: f64,
}

/// Logistic function, stable for inputs of any magnitude.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let ez = z.exp();
        ez / (1.0 + ez)
    }
}

fn linear_score(weights: &[f64], bias: f64, x: &[f64]) -> f64 {
    weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + bias
}

fn check_shape(xs: &[Vec<f64>], ys: &[u8]) -> Result<usize, TrainError> {
    let first = xs.first().ok_or(TrainError::NoTrainingRows)?;
    let n_features = first.len();

    if ys.len() != xs.len() {
        return Err(TrainError::InvalidInput(format!(
            "{} rows but {} labels",
            xs.len(),
            ys.len()
        )));
    }
    if let Some(i) = xs.iter().position(|row| row.len() != n_features) {
        return Err(TrainError::InvalidInput(format!(
            "row {i} has {} features, expected {n_features}",
            xs[i].len()
        )));
    }
    if let Some(i) = ys.iter().position(|&y| y > 1) {
        return Err(TrainError::InvalidInput(format!(
            "label at row {i} is {}, expected 0 or 1",
            ys[i]
        )));
    }

    Ok(n_features)
}

/// Fit weights and bias to `xs` (one row per sample) and `ys` (0 or 1).
///
/// Fails with [`TrainError::Diverged`] if any weight or the bias ends up
/// NaN or infinite, which happens when feature magnitudes overflow the
/// gradient sums.
pub fn fit(xs: &[Vec<f64>], ys: &[u8], params: &TrainParams) -> Result<(Vec<f64>, f64), TrainError> {
    params.validate()?;
    let n_features = check_shape(xs, ys)?;
    let m = xs.len() as f64;

    let mut weights = vec![0.0; n_features];
    let mut bias = 0.0;

    for _ in 0..params.steps {
        let mut grad_w = vec![0.0; n_features];
        let mut grad_b = 0.0;

        for (x, &y) in xs.iter().zip(ys) {
            let p = sigmoid(linear_score(&weights, bias, x));
            let err = p - f64::from(y);
            for (g, v) in grad_w.iter_mut().zip(x) {
                *g += err * v;
            }
            grad_b += err;
        }

        for (w, g) in weights.iter_mut().zip(&grad_w) {
            *w -= params.learning_rate * (g / m);
        }
        bias -= params.learning_rate * (grad_b / m);
    }

    if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
        tracing::warn!(steps = params.steps, rows = xs.len(), "gradient descent diverged");
        return Err(TrainError::Diverged);
    }

    tracing::debug!(
        steps = params.steps,
        learning_rate = params.learning_rate,
        rows = xs.len(),
        features = n_features,
        bias,
        "logistic regression fitted"
    );

    Ok((weights, bias))
}

/// Probability of the positive class for one row.
pub fn predict_proba(weights: &[f64], bias: f64, x: &[f64]) -> f64 {
    sigmoid(linear_score(weights, bias, x))
}

/// Score a fitted model on the rows it was trained on.
pub fn evaluate(
    weights: &[f64],
    bias: f64,
    xs: &[Vec<f64>],
    ys: &[u8],
) -> Result<TrainingMetrics, TrainError> {
    check_shape(xs, ys)?;

    let mut correct = 0usize;
    let mut loss = 0.0;
    for (x, &y) in xs.iter().zip(ys) {
        let p = predict_proba(weights, bias, x);
        let predicted = u8::from(p >= 0.5);
        if predicted == y {
            correct += 1;
        }
        let p = p.clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS);
        loss -= if y == 1 { p.ln() } else { (1.0 - p).ln() };
    }

    let rows = xs.len();
    Ok(TrainingMetrics {
        rows,
        accuracy: correct as f64 / rows as f64,
        log_loss: loss / rows as f64,
    })
}
