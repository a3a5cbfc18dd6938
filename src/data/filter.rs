use super::model::MagneticVector;

// ---------------------------------------------------------------------------
// z-score outlier filter
// ---------------------------------------------------------------------------

/// Per-row, per-column z-scores `|x - mean| / std` using the population
/// standard deviation.
///
/// Zero-deviation convention:
/// * a column whose values are all identical scores 0 everywhere;
/// * otherwise a zero deviation scores 0 and a non-zero deviation over a
///   zero std scores `+inf`.
pub fn zscores(vectors: &[MagneticVector]) -> Vec<MagneticVector> {
    let mut scores = vec![[0.0; 3]; vectors.len()];
    let Some(first) = vectors.first() else {
        return scores;
    };
    let n = vectors.len() as f64;

    for col in 0..3 {
        if vectors.iter().all(|v| v[col] == first[col]) {
            continue;
        }
        let mean = vectors.iter().map(|v| v[col]).sum::<f64>() / n;
        let variance = vectors
            .iter()
            .map(|v| (v[col] - mean).powi(2))
            .sum::<f64>()
            / n;
        let std = variance.sqrt();

        for (row, v) in vectors.iter().enumerate() {
            let dev = (v[col] - mean).abs();
            scores[row][col] = if dev == 0.0 {
                0.0
            } else if std == 0.0 {
                f64::INFINITY
            } else {
                dev / std
            };
        }
    }
    scores
}

/// Outlier mask (`true` = outlier): a row is rejected when any of its three
/// z-scores is strictly greater than `threshold`.
pub fn detect_outliers(vectors: &[MagneticVector], threshold: f64) -> Vec<bool> {
    zscores(vectors)
        .iter()
        .map(|z| z.iter().any(|&s| s > threshold))
        .collect()
}

/// Indices of rows not flagged in `mask`.
pub fn inlier_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter(|&(_, &outlier)| !outlier)
        .map(|(i, _)| i)
        .collect()
}
