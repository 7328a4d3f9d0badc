//! Simulation configuration
//!
//! Every tunable the simulation recognizes, with defaults matching the
//! shipped course. Loaded from JSON; missing fields keep their defaults.

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;

/// Simulation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === World / raster ===
    /// Edge length of the square world covered by the raster (world units)
    pub world_size: f32,
    /// Raster grid resolution (pixels per edge)
    pub grid_resolution: u32,
    /// Mask value a pixel must exceed to mark its category present
    pub occupancy_threshold: u8,
    /// Elevation for heightmap value 0
    pub elevation_min: f32,
    /// Elevation for heightmap value 255
    pub elevation_max: f32,
    /// Flip the depth axis when mapping world z to raster rows
    pub flip_depth: bool,
    /// Per-asset load timeout
    pub asset_timeout_ms: u64,

    // === Rest detection ===
    /// Speed under which the ball may be considered at rest
    pub rest_speed: f32,
    /// Minimum time since the shot was seeded before rest is accepted
    pub rest_hold_secs: f32,
    /// Residual speed zeroed on the green
    pub putting_stop_speed: f32,

    // === Terrain damping (per tick, while touching the ground) ===
    pub bunker_damping: f32,
    pub water_damping: f32,

    // === Hole capture ===
    pub hole_near_radius: f32,
    pub hole_capture_radius: f32,
    pub hole_capture_speed: f32,
    pub hole_magnet: f32,

    // === Aerodynamics ===
    pub magnus_coefficient: f32,
    pub drag_coefficient: f32,
    /// Air velocity (world units/s)
    pub wind: Vec3,

    // === Rigid body ===
    pub gravity: f32,
    pub ball_radius: f32,
    pub ball_mass: f32,
    pub solver_iterations: u32,

    // === Course anchors (x, z) ===
    pub tee: Vec2,
    pub cup: Vec2,
    /// Drop zone used when a penalty area carries none of its own
    pub default_drop_zone: Vec2,
    /// Half width of the fairway band used when no course data exists
    pub central_band_half_width: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_size: 800.0,
            grid_resolution: 1024,
            occupancy_threshold: OCCUPANCY_THRESHOLD,
            elevation_min: -10.0,
            elevation_max: 30.0,
            flip_depth: false,
            asset_timeout_ms: 1500,

            rest_speed: 0.1,
            rest_hold_secs: 1.0,
            putting_stop_speed: 0.1,

            bunker_damping: 0.92,
            water_damping: 0.5,

            hole_near_radius: 0.1,
            hole_capture_radius: 0.03,
            hole_capture_speed: 1.0,
            hole_magnet: 10.0,

            magnus_coefficient: 1e-4,
            drag_coefficient: 0.01,
            wind: Vec3::ZERO,

            gravity: GRAVITY,
            ball_radius: BALL_RADIUS,
            ball_mass: BALL_MASS,
            solver_iterations: SOLVER_ITERATIONS,

            tee: Vec2::ZERO,
            cup: Vec2::new(0.0, -525.0),
            default_drop_zone: Vec2::new(0.0, -290.0),
            central_band_half_width: 30.0,
        }
    }
}

impl SimConfig {
    /// Parse a JSON document; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file, falling back to defaults when the file is missing
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let config = Self::from_json(&json)?;
                log::info!("Loaded simulation config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Config {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Tee position with the ball resting on flat ground
    pub fn tee_position(&self) -> Vec3 {
        Vec3::new(self.tee.x, self.ball_radius, self.tee.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json(r#"{ "rest_speed": 0.25, "wind": [1.0, 0.0, -2.0] }"#)
            .expect("valid config");
        assert_eq!(config.rest_speed, 0.25);
        assert_eq!(config.wind, Vec3::new(1.0, 0.0, -2.0));
        assert_eq!(config.grid_resolution, 1024);
        assert_eq!(config.occupancy_threshold, 128);
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = SimConfig::from_json("{ rest_speed: }").unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = SimConfig::load(dir.path().join("nope.json")).expect("defaults");
        assert_eq!(config, SimConfig::default());
    }
}
