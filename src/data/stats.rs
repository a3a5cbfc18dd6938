use super::model::MagneticVector;
use crate::error::SurveyError;

// ---------------------------------------------------------------------------
// Weighted aggregation
// ---------------------------------------------------------------------------

/// Column-wise weighted mean of `vectors`.
///
/// `weights` defaults to uniform and is normalised to sum to one, so any
/// positive rescaling of the weights gives the same result.
pub fn weighted_average(
    vectors: &[MagneticVector],
    weights: Option<&[f64]>,
) -> Result<MagneticVector, SurveyError> {
    if vectors.is_empty() {
        return Err(SurveyError::Domain(
            "cannot average zero vectors".to_string(),
        ));
    }

    let uniform;
    let weights = match weights {
        Some(w) => {
            if w.len() != vectors.len() {
                return Err(SurveyError::Domain(format!(
                    "{} weights given for {} vectors",
                    w.len(),
                    vectors.len()
                )));
            }
            w
        }
        None => {
            uniform = vec![1.0; vectors.len()];
            &uniform[..]
        }
    };

    let total: f64 = weights.iter().sum();
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || !(total > 0.0) {
        return Err(SurveyError::Domain(format!(
            "weights must be finite, non-negative and sum to a positive value (sum = {total})"
        )));
    }

    let mut mean = [0.0; 3];
    for (v, w) in vectors.iter().zip(weights) {
        let w = w / total;
        for col in 0..3 {
            mean[col] += w * v[col];
        }
    }
    Ok(mean)
}

// ---------------------------------------------------------------------------
// Vector correction
// ---------------------------------------------------------------------------

/// Move every row of `main` toward `reference` by `factor` in `[0, 1]`.
///
/// Computes `main + factor * (reference - main)` in the form
/// `(1 - factor) * main + factor * reference`, which keeps both endpoints
/// exact.
pub fn correct_vectors(
    main: &[MagneticVector],
    reference: MagneticVector,
    factor: f64,
) -> Result<Vec<MagneticVector>, SurveyError> {
    if main.is_empty() {
        return Err(SurveyError::Domain(
            "no main vectors to correct".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&factor) {
        return Err(SurveyError::Domain(format!(
            "blend factor must lie in [0, 1], got {factor}"
        )));
    }

    let keep = 1.0 - factor;
    Ok(main
        .iter()
        .map(|row| {
            [
                keep * row[0] + factor * reference[0],
                keep * row[1] + factor * reference[1],
                keep * row[2] + factor * reference[2],
            ]
        })
        .collect())
}
