use std::path::{Path, PathBuf};

use super::size::{GIB, format_size};
use crate::error::{PruneError, Result};

/// Default quota in gibibytes
pub const DEFAULT_QUOTA_GIB: u64 = 200;
/// Default fraction of the quota to prune down to
pub const DEFAULT_TARGET_RATIO: f64 = 0.8;

/// Inputs to one prune run
#[derive(Debug, Clone, PartialEq)]
pub struct PruneRequest {
    /// Directory holding the per-bucket subdirectories
    cache_root: PathBuf,
    /// Size at or above which eviction starts
    quota_bytes: u64,
    /// Fraction of the quota that eviction prunes down to
    target_ratio: f64,
}

impl PruneRequest {
    /// Creates a new builder for [`PruneRequest`]
    pub fn builder() -> PruneRequestBuilder {
        PruneRequestBuilder::default()
    }

    /// Get the cache root
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Get the quota in bytes
    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }

    /// Get the target ratio
    pub fn target_ratio(&self) -> f64 {
        self.target_ratio
    }

    /// Size eviction prunes down to: `quota_bytes * target_ratio`.
    pub fn floor(&self) -> f64 {
        self.quota_bytes as f64 * self.target_ratio
    }

    /// Check the ratio lies in the open interval (0, 1).
    ///
    /// The cache root is not checked here; the CLI driver does that because
    /// it is the only component allowed to fail on process-level input.
    pub fn validate(&self) -> Result<()> {
        let ratio = self.target_ratio;
        if !ratio.is_finite() || ratio <= 0.0 || ratio >= 1.0 {
            return Err(PruneError::InvalidInput {
                message: format!("prune ratio {ratio} is outside the open interval (0, 1)"),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for PruneRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (quota {}, prune ratio {})",
            self.cache_root.display(),
            format_size(self.quota_bytes),
            self.target_ratio
        )
    }
}

/// Builder for [`PruneRequest`]
#[derive(Debug, Default)]
pub struct PruneRequestBuilder {
    cache_root: Option<PathBuf>,
    quota_bytes: Option<u64>,
    target_ratio: Option<f64>,
}

impl PruneRequestBuilder {
    /// Set the cache root
    pub fn cache_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_root = Some(dir.into());
        self
    }

    /// Set the quota in bytes
    pub fn quota_bytes(mut self, bytes: u64) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    /// Set the target ratio
    pub fn target_ratio(mut self, ratio: f64) -> Self {
        self.target_ratio = Some(ratio);
        self
    }

    /// Build the [`PruneRequest`] without validating it
    pub fn build(self) -> PruneRequest {
        PruneRequest {
            cache_root: self.cache_root.unwrap_or_else(|| PathBuf::from(".")),
            quota_bytes: self
                .quota_bytes
                .unwrap_or(DEFAULT_QUOTA_GIB.saturating_mul(GIB)),
            target_ratio: self.target_ratio.unwrap_or(DEFAULT_TARGET_RATIO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let request = PruneRequest::builder().cache_root("/cache").build();
        assert_eq!(request.cache_root(), Path::new("/cache"));
        assert_eq!(request.quota_bytes(), 200 * GIB);
        assert_eq!(request.target_ratio(), 0.8);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_floor() {
        let request = PruneRequest::builder()
            .quota_bytes(5 * GIB)
            .target_ratio(0.8)
            .build();
        assert_eq!(request.floor(), (4 * GIB) as f64);
    }

    #[test]
    fn test_validate_rejects_out_of_range_ratios() {
        for ratio in [0.0, -0.5, 1.0, 1.5, f64::NAN, f64::INFINITY] {
            let request = PruneRequest::builder().target_ratio(ratio).build();
            assert!(
                matches!(request.validate(), Err(PruneError::InvalidInput { .. })),
                "ratio {ratio} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_accepts_open_interval() {
        for ratio in [f64::MIN_POSITIVE, 0.01, 0.5, 0.999] {
            let request = PruneRequest::builder().target_ratio(ratio).build();
            assert!(request.validate().is_ok(), "ratio {ratio} should pass");
        }
    }
}
