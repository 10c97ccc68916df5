//! Tunables for the scratch surface, the fireworks and the card page.
//!
//! Every value that was tuned by eye (reveal threshold, sampling stride, brush
//! size, throttle) lives here so callers can override it instead of patching
//! constants. With the `serde` feature all configs round-trip through JSON with
//! missing fields filled from `Default`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SIZE: u32 = 450;
pub const DEFAULT_BRUSH_RADIUS: f64 = 30.0;
/// Opaque percentage of the whole surface below which the card counts as revealed.
pub const DEFAULT_REVEAL_THRESHOLD: f64 = 25.0;
/// Sample every Nth pixel (16 bytes of RGBA for N = 4).
pub const DEFAULT_SAMPLE_STRIDE: usize = 4;
pub const DEFAULT_CHECK_PROBABILITY: f64 = 0.2;
pub const DEFAULT_GLITTER_COUNT: usize = 800;
/// Upper bound on the particles a single burst may ask for.
pub const MAX_PARTICLES_PER_BURST: f64 = 1_000.0;

/// When a progress check runs while a stroke is still moving.
///
/// The check on stroke end is never throttled.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum CheckPolicy {
    /// Check on a random subset of move events.
    Random { probability: f64 },
    /// Check on every nth move event of a stroke.
    EveryNth { n: u32 },
    /// Only check when the stroke ends.
    StrokeEnd,
}

impl Default for CheckPolicy {
    fn default() -> Self {
        CheckPolicy::Random {
            probability: DEFAULT_CHECK_PROBABILITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScratchConfig {
    pub width: u32,
    pub height: u32,
    pub brush_radius: f64,
    pub reveal_threshold: f64,
    pub sample_stride: usize,
    pub check_policy: CheckPolicy,
    pub glitter_count: usize,
    pub glitter_max_radius: f64,
    pub glitter_max_alpha: f64,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            brush_radius: DEFAULT_BRUSH_RADIUS,
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
            sample_stride: DEFAULT_SAMPLE_STRIDE,
            check_policy: CheckPolicy::default(),
            glitter_count: DEFAULT_GLITTER_COUNT,
            glitter_max_radius: 2.0,
            glitter_max_alpha: 0.8,
        }
    }
}

impl ScratchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptySurface {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.brush_radius > 0.0) {
            return Err(ConfigError::BrushRadius(self.brush_radius));
        }
        if !(0.0..=100.0).contains(&self.reveal_threshold) {
            return Err(ConfigError::Threshold(self.reveal_threshold));
        }
        if self.sample_stride == 0 {
            return Err(ConfigError::SampleStride);
        }
        match self.check_policy {
            CheckPolicy::Random { probability } if !(0.0..=1.0).contains(&probability) => {
                return Err(ConfigError::Probability(probability));
            }
            CheckPolicy::EveryNth { n: 0 } => return Err(ConfigError::EveryNth),
            _ => {}
        }
        if !(0.0..=1.0).contains(&self.glitter_max_alpha) {
            return Err(ConfigError::Probability(self.glitter_max_alpha));
        }
        Ok(())
    }
}

/// Fireworks burst parameters (times in milliseconds, speeds in px per tick).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FireworksConfig {
    pub duration_ms: f64,
    pub interval_ms: f64,
    /// Particles per burst at the very start; scales down linearly to zero.
    pub particles_per_burst: f64,
    pub start_velocity: f64,
    pub spread_deg: f64,
    pub ticks: u32,
    pub gravity: f64,
    pub decay: f64,
    pub particle_radius: f64,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            duration_ms: 5_000.0,
            interval_ms: 250.0,
            particles_per_burst: 50.0,
            start_velocity: 30.0,
            spread_deg: 360.0,
            ticks: 60,
            gravity: 3.0,
            decay: 0.9,
            particle_radius: 4.0,
        }
    }
}

impl FireworksConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.duration_ms.is_finite() && self.duration_ms > 0.0) {
            return Err(ConfigError::Duration(self.duration_ms));
        }
        if !(self.interval_ms.is_finite() && self.interval_ms > 0.0) {
            return Err(ConfigError::Interval(self.interval_ms));
        }
        if !(self.particles_per_burst > 0.0 && self.particles_per_burst <= MAX_PARTICLES_PER_BURST) {
            return Err(ConfigError::ParticleCount {
                got: self.particles_per_burst,
                max: MAX_PARTICLES_PER_BURST,
            });
        }
        Ok(())
    }
}

/// Page-level settings: element ids, texts and the nested component configs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CardConfig {
    /// Id of the element the card is mounted into; falls back to `<body>`.
    pub host_id: String,
    pub message: String,
    pub hint: String,
    pub footer: String,
    pub scratch: ScratchConfig,
    pub fireworks: FireworksConfig,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            host_id: "scratch-heart".to_string(),
            message: "#SamGotMusTaken".to_string(),
            hint: "Scratch to Reveal".to_string(),
            footer: "See you there!".to_string(),
            scratch: ScratchConfig::default(),
            fireworks: FireworksConfig::default(),
        }
    }
}

impl CardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scratch.validate()?;
        self.fireworks.validate()
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, crate::error::CardError> {
        let cfg: CardConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(CardConfig::default().validate().is_ok());
        let cfg = ScratchConfig::default();
        assert_eq!((cfg.width, cfg.height), (450, 450));
        assert_eq!(cfg.sample_stride, 4);
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = ScratchConfig::default();
        cfg.reveal_threshold = 120.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Threshold(_))));

        let mut cfg = ScratchConfig::default();
        cfg.check_policy = CheckPolicy::Random { probability: 1.5 };
        assert!(matches!(cfg.validate(), Err(ConfigError::Probability(_))));

        let mut cfg = ScratchConfig::default();
        cfg.width = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptySurface { .. })));

        let mut cfg = ScratchConfig::default();
        cfg.brush_radius = f64::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::BrushRadius(_))));
    }

    #[test]
    fn rejects_runaway_fireworks() {
        let mut cfg = CardConfig::default();
        cfg.fireworks.particles_per_burst = 1e300;
        assert!(matches!(cfg.validate(), Err(ConfigError::ParticleCount { .. })));

        cfg.fireworks.particles_per_burst = f64::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::ParticleCount { .. })));

        cfg.fireworks.particles_per_burst = MAX_PARTICLES_PER_BURST;
        assert!(cfg.validate().is_ok());

        for bad in [0.0, -5.0, f64::INFINITY, f64::NAN] {
            let mut cfg = CardConfig::default();
            cfg.fireworks.duration_ms = bad;
            assert!(matches!(cfg.validate(), Err(ConfigError::Duration(_))), "{bad}");

            let mut cfg = CardConfig::default();
            cfg.fireworks.interval_ms = bad;
            assert!(matches!(cfg.validate(), Err(ConfigError::Interval(_))), "{bad}");
        }
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn partial_json_fills_defaults() {
        let cfg = CardConfig::from_json(r#"{"message":"hi","scratch":{"brush_radius":12.0}}"#)
            .unwrap();
        assert_eq!(cfg.message, "hi");
        assert_eq!(cfg.scratch.brush_radius, 12.0);
        assert_eq!(cfg.scratch.width, DEFAULT_SIZE);
        assert_eq!(cfg.footer, "See you there!");
    }
}
