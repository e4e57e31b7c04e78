//! Tunable constants for a flowfield run.
//!
//! [`FlowConfig::default`] reproduces the reference look: a 1200x800 canvas,
//! 5-pixel cells, 20 000 particles on 10 workers and a five-color mauve
//! palette. Overrides come from a JSON params object (CLI `--params`) or a
//! serialized config file.

use crate::color::Srgb;
use crate::error::EngineError;
use crate::grid::FlowParams;
use crate::params::{param_bool, param_f64, param_str, param_strings, param_u64_opt, param_usize};
use crate::vector::Vector2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::f64::consts::PI;

const DEFAULT_WIDTH: usize = 1200;
const DEFAULT_HEIGHT: usize = 800;
const DEFAULT_SCALE: f64 = 5.0;
const DEFAULT_PARTICLES: usize = 20_000;
const DEFAULT_WORKERS: usize = 10;
const DEFAULT_MAX_VELOCITY: f64 = 1.5;
const DEFAULT_ACCELERATION: f64 = 0.1;
const DEFAULT_MIN_ANGLE: f64 = -2.0 * PI;
const DEFAULT_MAX_ANGLE: f64 = 2.0 * PI;
const DEFAULT_SIMILARITY: f64 = 0.1;
const DEFAULT_DELTA_Z: f64 = 0.001;
const DEFAULT_PALETTE: &[&str] = &["#afd2e9", "#9d96b8", "#9a7197", "#886176", "#7c5869"];
const DEFAULT_TRAIL_OPACITY: f64 = 0.5;
/// Also the smallest accepted `min_frame_delay`.
const DEFAULT_MIN_FRAME_DELAY: u16 = 2;
const DEFAULT_TICKS_PER_SECOND: u32 = 60;

/// Every knob of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Canvas width in pixels.
    pub width: usize,
    /// Canvas height in pixels.
    pub height: usize,
    /// Grid cell edge length in pixels.
    pub scale: f64,
    pub particles: usize,
    /// Worker threads for the particle update.
    pub workers: usize,
    pub max_velocity: f64,
    /// Magnitude of each cell's acceleration.
    pub acceleration: f64,
    pub min_angle: f64,
    pub max_angle: f64,
    /// Spatial coherence of the noise; smaller is smoother.
    pub similarity: f64,
    /// Depth advance per tick; bigger changes the field faster.
    pub delta_z: f64,
    pub palette: Vec<Srgb>,
    pub background: Srgb,
    /// Sprite edge length in pixels.
    pub particle_size: usize,
    /// Past positions drawn behind each particle; 0 disables trails.
    pub trail_length: usize,
    pub trail_opacity: f64,
    pub clear_each_frame: bool,
    /// Overlays each cell's acceleration as a short line.
    pub draw_field: bool,
    /// Frames to capture; 0 disables recording.
    pub record_frames: usize,
    /// Lower bound on the per-frame delay, in hundredths of a second.
    pub min_frame_delay: u16,
    pub ticks_per_second: u32,
    /// Fixed seed; `None` seeds from the wall clock.
    pub seed: Option<u64>,
}

fn default_palette() -> Vec<Srgb> {
    DEFAULT_PALETTE
        .iter()
        .filter_map(|hex| Srgb::from_hex(hex).ok())
        .collect()
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scale: DEFAULT_SCALE,
            particles: DEFAULT_PARTICLES,
            workers: DEFAULT_WORKERS,
            max_velocity: DEFAULT_MAX_VELOCITY,
            acceleration: DEFAULT_ACCELERATION,
            min_angle: DEFAULT_MIN_ANGLE,
            max_angle: DEFAULT_MAX_ANGLE,
            similarity: DEFAULT_SIMILARITY,
            delta_z: DEFAULT_DELTA_Z,
            palette: default_palette(),
            background: Srgb::BLACK,
            particle_size: 1,
            trail_length: 0,
            trail_opacity: DEFAULT_TRAIL_OPACITY,
            clear_each_frame: true,
            draw_field: false,
            record_frames: 0,
            min_frame_delay: DEFAULT_MIN_FRAME_DELAY,
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            seed: None,
        }
    }
}

fn parse_palette(hexes: &[String]) -> Result<Vec<Srgb>, EngineError> {
    hexes.iter().map(|h| Srgb::from_hex(h)).collect()
}

impl FlowConfig {
    /// Applies the keys present in `params` on top of `self`.
    ///
    /// Unknown keys are ignored; known keys with the wrong type are errors.
    /// The result is validated.
    pub fn with_overrides(&self, params: &Value) -> Result<Self, EngineError> {
        let background = match param_str(params, "background")? {
            Some(hex) => Srgb::from_hex(hex)?,
            None => self.background,
        };
        let palette = match param_strings(params, "palette")? {
            Some(hexes) => parse_palette(&hexes)?,
            None => self.palette.clone(),
        };
        let config = Self {
            width: param_usize(params, "width", self.width)?,
            height: param_usize(params, "height", self.height)?,
            scale: param_f64(params, "scale", self.scale)?,
            particles: param_usize(params, "particles", self.particles)?,
            workers: param_usize(params, "workers", self.workers)?,
            max_velocity: param_f64(params, "max_velocity", self.max_velocity)?,
            acceleration: param_f64(params, "acceleration", self.acceleration)?,
            min_angle: param_f64(params, "min_angle", self.min_angle)?,
            max_angle: param_f64(params, "max_angle", self.max_angle)?,
            similarity: param_f64(params, "similarity", self.similarity)?,
            delta_z: param_f64(params, "delta_z", self.delta_z)?,
            palette,
            background,
            particle_size: param_usize(params, "particle_size", self.particle_size)?,
            trail_length: param_usize(params, "trail_length", self.trail_length)?,
            trail_opacity: param_f64(params, "trail_opacity", self.trail_opacity)?,
            clear_each_frame: param_bool(params, "clear_each_frame", self.clear_each_frame)?,
            draw_field: param_bool(params, "draw_field", self.draw_field)?,
            record_frames: param_usize(params, "record_frames", self.record_frames)?,
            min_frame_delay: param_usize(params, "min_frame_delay", self.min_frame_delay as usize)?
                .min(u16::MAX as usize) as u16,
            ticks_per_second: param_usize(params, "ticks_per_second", self.ticks_per_second as usize)?
                .min(u32::MAX as usize) as u32,
            seed: param_u64_opt(params, "seed", self.seed)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `params`.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        Self::default().with_overrides(params)
    }

    /// Checks the invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        if !(self.scale.is_finite() && self.scale > 0.0)
            || self.scale > self.width as f64
            || self.scale > self.height as f64
        {
            return Err(EngineError::InvalidDimensions);
        }
        if self.workers == 0 {
            return Err(EngineError::InvalidConfig("workers must be at least 1".into()));
        }
        if self.palette.is_empty() {
            return Err(EngineError::InvalidPalette("palette has no colors".into()));
        }
        let world_min = self.width.min(self.height) as f64;
        if !(self.max_velocity.is_finite() && self.max_velocity >= 0.0 && self.max_velocity < world_min) {
            return Err(EngineError::InvalidConfig(format!(
                "max_velocity must be in [0, {world_min}), got {}",
                self.max_velocity
            )));
        }
        let finite = [
            ("acceleration", self.acceleration),
            ("min_angle", self.min_angle),
            ("max_angle", self.max_angle),
            ("similarity", self.similarity),
            ("delta_z", self.delta_z),
            ("trail_opacity", self.trail_opacity),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(EngineError::InvalidConfig(format!("{name} must be finite, got {value}")));
        }
        if self.min_frame_delay < DEFAULT_MIN_FRAME_DELAY {
            return Err(EngineError::InvalidConfig(format!(
                "min_frame_delay must be at least {DEFAULT_MIN_FRAME_DELAY}, got {}",
                self.min_frame_delay
            )));
        }
        if self.ticks_per_second == 0 {
            return Err(EngineError::InvalidConfig("ticks_per_second must be at least 1".into()));
        }
        Ok(())
    }

    /// World size as a vector.
    pub fn world(&self) -> Vector2 {
        Vector2::new(self.width as f64, self.height as f64)
    }

    pub fn flow_params(&self) -> FlowParams {
        FlowParams {
            similarity: self.similarity,
            min_angle: self.min_angle,
            max_angle: self.max_angle,
            acceleration: self.acceleration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_reference_constants() {
        let c = FlowConfig::default();
        assert_eq!((c.width, c.height), (1200, 800));
        assert_eq!(c.scale, 5.0);
        assert_eq!(c.particles, 20_000);
        assert_eq!(c.workers, 10);
        assert_eq!(c.palette.len(), 5);
        assert_eq!(c.palette[0].to_hex(), "#afd2e9");
        assert_eq!(c.min_frame_delay, 2);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn from_json_applies_overrides() {
        let c = FlowConfig::from_json(&json!({
            "width": 320,
            "height": 240,
            "particles": 500,
            "palette": ["#ff0000", "#00ff00"],
            "background": "#101010",
            "seed": 7,
            "draw_field": true
        }))
        .unwrap();
        assert_eq!((c.width, c.height, c.particles), (320, 240, 500));
        assert_eq!(c.palette.len(), 2);
        assert_eq!(c.background.to_hex(), "#101010");
        assert_eq!(c.seed, Some(7));
        assert!(c.draw_field);
        assert_eq!(c.workers, 10);
    }

    #[test]
    fn from_json_rejects_bad_values() {
        assert!(FlowConfig::from_json(&json!({"workers": 0})).is_err());
        assert!(FlowConfig::from_json(&json!({"scale": 0})).is_err());
        assert!(FlowConfig::from_json(&json!({"palette": []})).is_err());
        assert!(FlowConfig::from_json(&json!({"palette": ["nope"]})).is_err());
        assert!(FlowConfig::from_json(&json!({"width": "wide"})).is_err());
        assert!(FlowConfig::from_json(&json!({"max_velocity": 5000.0})).is_err());
        assert!(FlowConfig::from_json(&json!({"ticks_per_second": 0})).is_err());
        assert!(FlowConfig::from_json(&json!({"min_frame_delay": 0, "ticks_per_second": 240})).is_err());
        assert!(matches!(
            FlowConfig::from_json(&json!({"background": 5})),
            Err(EngineError::ParamTypeMismatch { ref name, .. }) if name == "background"
        ));
    }

    #[test]
    fn serde_round_trip_with_partial_input() {
        let c: FlowConfig = serde_json::from_str(r#"{"width": 64, "height": 32}"#).unwrap();
        assert_eq!((c.width, c.height), (64, 32));
        assert_eq!(c.particles, DEFAULT_PARTICLES);
        let json = serde_json::to_string(&c).unwrap();
        let back: FlowConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.palette, c.palette);
        assert_eq!((back.width, back.height, back.seed), (64, 32, None));
    }

    #[test]
    fn flow_params_mirror_config() {
        let c = FlowConfig::default();
        let f = c.flow_params();
        assert_eq!(f.similarity, c.similarity);
        assert_eq!(f.acceleration, c.acceleration);
        assert_eq!(c.world(), Vector2::new(1200.0, 800.0));
    }
}
