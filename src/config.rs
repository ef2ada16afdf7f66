//! Tunable thresholds for one scan.
//!
//! Everything the pipeline reads lives in [`ScanConfig`], passed by reference
//! into each stage. Defaults reproduce the stock tuning; a handful of knobs can
//! be overridden from the environment via [`ScanConfig::with_env_overrides`].
use serde::{Deserialize, Serialize};

fn env_f32(name: &str) -> Option<f32> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok().and_then(|v| v.trim().parse::<usize>().ok())
}

fn env_bool_u8(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
}

/// Contrast normalization and thresholding parameters for one preprocessing pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// CLAHE histogram clip limit, relative to the mean bin height
    pub clahe_clip_limit: f32,
    /// CLAHE tile grid columns
    pub clahe_tiles_x: usize,
    /// CLAHE tile grid rows
    pub clahe_tiles_y: usize,
    /// Adaptive threshold neighborhood (odd, pixels)
    pub block_size: usize,
    /// Constant subtracted from the local mean
    pub offset: i32,
}

impl PreprocessConfig {
    /// Settings for original-resolution and downscaled passes
    pub const STANDARD: Self = Self {
        clahe_clip_limit: 2.0,
        clahe_tiles_x: 8,
        clahe_tiles_y: 8,
        block_size: 11,
        offset: 2,
    };

    /// Settings for the upscaled pass, where features are proportionally larger
    pub const UPSCALED: Self = Self {
        block_size: 21,
        ..Self::STANDARD
    };
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Shape filter for nested-square candidates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Minimum outer area at original resolution (pixels²)
    pub min_area_original: f32,
    /// Minimum outer area in upscaled-image pixels
    pub min_area_upscaled: f32,
    /// Minimum outer area in downscaled-image pixels
    pub min_area_downscaled: f32,
    /// Accepted shortfall of `area / min_rect_area` below 1.0
    pub square_tolerance: f32,
    /// Expected middle-to-outer area ratio
    pub middle_area_ratio: f32,
    /// Expected inner-to-middle area ratio
    pub inner_area_ratio: f32,
    /// Maximum absolute deviation from either expected ratio
    pub area_ratio_tolerance: f32,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            min_area_original: 100.0,
            min_area_upscaled: 200.0,
            min_area_downscaled: 50.0,
            square_tolerance: 0.25,
            middle_area_ratio: 0.18,
            inner_area_ratio: 0.11,
            area_ratio_tolerance: 0.5,
        }
    }
}

/// How spatially coincident candidates are merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// First-seen wins; later candidates near a kept one are dropped
    #[default]
    Greedy,
    /// Transitive grouping over the "closer than distance" graph
    Cluster,
}

/// Duplicate suppression settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Centers strictly closer than this (pixels) are the same pattern
    pub distance: f32,
    /// Merge policy
    pub strategy: DedupStrategy,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            distance: 15.0,
            strategy: DedupStrategy::Greedy,
        }
    }
}

/// Guidance decision thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    /// Mean candidate area below which the user is told to move closer
    pub min_guidance_area: f32,
    /// Dead zone as a fraction of frame width and height
    pub dead_zone_fraction: f32,
    /// Relative error allowed in `hyp² = leg1² + leg2²`
    pub angle_tolerance: f32,
    /// Allowed deviation of the edge length ratio from 1.0
    pub rotation_tolerance: f32,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            min_guidance_area: 250.0,
            dead_zone_fraction: 0.25,
            angle_tolerance: 0.15,
            rotation_tolerance: 0.15,
        }
    }
}

/// Aggregate-area window that gates the payload decoder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeGate {
    /// Inclusive lower bound on the summed candidate area
    pub min_area: f32,
    /// Inclusive upper bound on the summed candidate area
    pub max_area: f32,
}

impl DecodeGate {
    /// Whether `total_area` lies inside the window
    pub fn admits(&self, total_area: f32) -> bool {
        total_area >= self.min_area && total_area <= self.max_area
    }
}

impl Default for DecodeGate {
    fn default() -> Self {
        Self {
            min_area: 1200.0,
            max_area: 250_000.0,
        }
    }
}

/// Complete, immutable configuration for [`crate::Scanner`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Preprocessing for the original-resolution pass
    pub standard: PreprocessConfig,
    /// Preprocessing for the upscaled pass
    pub upscaled: PreprocessConfig,
    /// Preprocessing for the downscaled pass
    pub downscaled: PreprocessConfig,
    /// Resize factor of the upscaled pass
    pub upscale_factor: f32,
    /// The upscaled pass runs when the original pass finds fewer candidates than this
    pub min_candidates_before_upscale: usize,
    /// Resize factor of the optional downscaled pass (`None` disables it)
    pub downscale_factor: Option<f32>,
    /// Candidate shape filter
    pub finder: FinderConfig,
    /// Duplicate suppression
    pub dedup: DedupConfig,
    /// Guidance thresholds
    pub guidance: GuidanceConfig,
    /// Decoder area gate
    pub decode: DecodeGate,
    /// Draw overlays into the caller's frame
    pub render_overlay: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            standard: PreprocessConfig::STANDARD,
            upscaled: PreprocessConfig::UPSCALED,
            downscaled: PreprocessConfig::STANDARD,
            upscale_factor: 2.0,
            min_candidates_before_upscale: 2,
            downscale_factor: None,
            finder: FinderConfig::default(),
            dedup: DedupConfig::default(),
            guidance: GuidanceConfig::default(),
            decode: DecodeGate::default(),
            render_overlay: true,
        }
    }
}

impl ScanConfig {
    /// Apply `QRG_*` environment overrides on top of `self`.
    ///
    /// Recognized: `QRG_UPSCALE_FACTOR`, `QRG_DOWNSCALE_FACTOR` (0 disables),
    /// `QRG_DEDUPE_DISTANCE`, `QRG_DEDUPE_CLUSTER` (0/1), `QRG_MIN_GUIDANCE_AREA`,
    /// `QRG_BLOCK_SIZE`, `QRG_UPSCALED_BLOCK_SIZE`. Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(factor) = env_f32("QRG_UPSCALE_FACTOR") {
            self.upscale_factor = factor;
        }
        if let Some(factor) = env_f32("QRG_DOWNSCALE_FACTOR") {
            self.downscale_factor = (factor > 0.0 && factor < 1.0).then_some(factor);
        }
        if let Some(distance) = env_f32("QRG_DEDUPE_DISTANCE") {
            self.dedup.distance = distance;
        }
        if let Some(cluster) = env_bool_u8("QRG_DEDUPE_CLUSTER") {
            self.dedup.strategy = if cluster {
                DedupStrategy::Cluster
            } else {
                DedupStrategy::Greedy
            };
        }
        if let Some(area) = env_f32("QRG_MIN_GUIDANCE_AREA") {
            self.guidance.min_guidance_area = area;
        }
        // Standard and downscaled passes share the native block size
        if let Some(block) = env_usize("QRG_BLOCK_SIZE") {
            self.standard.block_size = block;
            self.downscaled.block_size = block;
        }
        if let Some(block) = env_usize("QRG_UPSCALED_BLOCK_SIZE") {
            self.upscaled.block_size = block;
        }
        self
    }
}

/// Serializes tests that read or write `QRG_*` variables (the environment is process-wide)
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 7] = [
        "QRG_UPSCALE_FACTOR",
        "QRG_DOWNSCALE_FACTOR",
        "QRG_DEDUPE_DISTANCE",
        "QRG_DEDUPE_CLUSTER",
        "QRG_MIN_GUIDANCE_AREA",
        "QRG_BLOCK_SIZE",
        "QRG_UPSCALED_BLOCK_SIZE",
    ];

    fn with_env<R>(vars: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // SAFETY: every test that reads or writes QRG_* holds ENV_LOCK
        unsafe {
            for name in ENV_VARS {
                std::env::remove_var(name);
            }
            for (name, value) in vars {
                std::env::set_var(name, value);
            }
        }
        let result = f();
        unsafe {
            for name in ENV_VARS {
                std::env::remove_var(name);
            }
        }
        result
    }

    #[test]
    fn test_env_unset_keeps_json_values() {
        let json = r#"{ "downscaled": { "block_size": 7 }, "downscale_factor": 0.5,
                        "dedup": { "strategy": "cluster", "distance": 9.0 } }"#;
        let config: ScanConfig = serde_json::from_str(json).unwrap();
        let config = with_env(&[], || config.with_env_overrides());
        assert_eq!(config.downscaled.block_size, 7);
        assert_eq!(config.standard.block_size, 11);
        assert_eq!(config.downscale_factor, Some(0.5));
        assert_eq!(config.dedup.strategy, DedupStrategy::Cluster);
        assert_eq!(config.dedup.distance, 9.0);
    }

    #[test]
    fn test_env_overrides_every_knob() {
        let vars = [
            ("QRG_UPSCALE_FACTOR", "3"),
            ("QRG_DOWNSCALE_FACTOR", "0.5"),
            ("QRG_DEDUPE_DISTANCE", "20"),
            ("QRG_DEDUPE_CLUSTER", "1"),
            ("QRG_MIN_GUIDANCE_AREA", "400"),
            ("QRG_BLOCK_SIZE", "15"),
            ("QRG_UPSCALED_BLOCK_SIZE", "31"),
        ];
        let config = with_env(&vars, || ScanConfig::default().with_env_overrides());
        assert_eq!(config.upscale_factor, 3.0);
        assert_eq!(config.downscale_factor, Some(0.5));
        assert_eq!(config.dedup.distance, 20.0);
        assert_eq!(config.dedup.strategy, DedupStrategy::Cluster);
        assert_eq!(config.guidance.min_guidance_area, 400.0);
        assert_eq!(config.standard.block_size, 15);
        assert_eq!(config.downscaled.block_size, 15);
        assert_eq!(config.upscaled.block_size, 31);
    }

    #[test]
    fn test_env_zero_disables_downscale_and_clustering() {
        let start = ScanConfig {
            downscale_factor: Some(0.25),
            dedup: DedupConfig {
                strategy: DedupStrategy::Cluster,
                ..DedupConfig::default()
            },
            ..ScanConfig::default()
        };
        let vars = [("QRG_DOWNSCALE_FACTOR", "0"), ("QRG_DEDUPE_CLUSTER", "0")];
        let config = with_env(&vars, || start.clone().with_env_overrides());
        assert!(config.downscale_factor.is_none());
        assert_eq!(config.dedup.strategy, DedupStrategy::Greedy);
    }

    #[test]
    fn test_env_unparseable_values_are_ignored() {
        let vars = [
            ("QRG_UPSCALE_FACTOR", "big"),
            ("QRG_DOWNSCALE_FACTOR", "NaN"),
            ("QRG_DEDUPE_DISTANCE", ""),
            ("QRG_DEDUPE_CLUSTER", "yes"),
            ("QRG_BLOCK_SIZE", "-3"),
        ];
        let config = with_env(&vars, || ScanConfig::default().with_env_overrides());
        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.standard.block_size, 11);
        assert_eq!(config.upscaled.block_size, 21);
        assert_eq!(config.upscale_factor, 2.0);
        assert_eq!(config.dedup.distance, 15.0);
        assert_eq!(config.dedup.strategy, DedupStrategy::Greedy);
        assert_eq!(config.guidance.dead_zone_fraction, 0.25);
        assert!(config.downscale_factor.is_none());
    }

    #[test]
    fn test_decode_gate_is_inclusive() {
        let gate = DecodeGate {
            min_area: 100.0,
            max_area: 200.0,
        };
        assert!(gate.admits(100.0));
        assert!(gate.admits(200.0));
        assert!(!gate.admits(99.9));
        assert!(!gate.admits(200.1));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "upscale_factor": 3.0, "dedup": { "strategy": "cluster" } }"#;
        let config: ScanConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.upscale_factor, 3.0);
        assert_eq!(config.dedup.strategy, DedupStrategy::Cluster);
        assert_eq!(config.dedup.distance, 15.0);
        assert_eq!(config.finder, FinderConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = ScanConfig {
            downscale_factor: Some(0.5),
            ..ScanConfig::default()
        };
        let text = serde_json::to_string(&config).unwrap();
        let back: ScanConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
