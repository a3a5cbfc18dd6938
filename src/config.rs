use crate::error::SurveyError;

/// z-score above which an auxiliary row is rejected.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 3.0;

/// Full replacement of each main vector by the auxiliary reference.
pub const DEFAULT_BLEND_FACTOR: f64 = 1.0;

/// Tunables of the correction pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub outlier_threshold: f64,
    /// How far each main vector moves toward the reference, in `[0, 1]`.
    pub blend_factor: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            blend_factor: DEFAULT_BLEND_FACTOR,
        }
    }
}

impl PipelineConfig {
    pub fn with_blend_factor(mut self, blend_factor: f64) -> Self {
        self.blend_factor = blend_factor;
        self
    }

    pub fn validate(&self) -> Result<(), SurveyError> {
        if !(self.outlier_threshold.is_finite() && self.outlier_threshold > 0.0) {
            return Err(SurveyError::Domain(format!(
                "outlier threshold must be a positive number, got {}",
                self.outlier_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.blend_factor) {
            return Err(SurveyError::Domain(format!(
                "blend factor must lie in [0, 1], got {}",
                self.blend_factor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.outlier_threshold, 3.0);
        assert_eq!(cfg.blend_factor, 1.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_blend() {
        assert!(PipelineConfig::default().with_blend_factor(1.5).validate().is_err());
        assert!(PipelineConfig::default().with_blend_factor(f64::NAN).validate().is_err());
        assert!(PipelineConfig::default().with_blend_factor(0.0).validate().is_ok());
    }
}
