//! AirSwing - single golf shot simulation
//!
//! Core modules:
//! - `terrain`: Terrain classification (raster masks, course polygons) and ground coefficients
//! - `sim`: Ball flight, rule resolution, hole capture and the fixed-step game tick
//! - `settings`: Data-driven simulation tuning
//! - `equipment`: Ball catalog and shot trigger shaping

pub mod equipment;
pub mod error;
pub mod settings;
pub mod sim;
pub mod terrain;

pub use equipment::{BallModel, Equipment, ShotTrigger};
pub use error::{AssetError, SimError};
pub use settings::SimConfig;

use glam::{Vec2, Vec3};

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Regulation ball (meters / kilograms)
    pub const BALL_RADIUS: f32 = 0.042;
    pub const BALL_MASS: f32 = 0.045;

    /// Vertical acceleration (m/s²)
    pub const GRAVITY: f32 = -9.81;

    /// Solver iterations handed to the rigid-body step
    pub const SOLVER_ITERATIONS: u32 = 10;

    /// Mask value (0-255) a pixel must exceed to count as occupied
    pub const OCCUPANCY_THRESHOLD: u8 = 128;
}

/// Project a world position onto the ground plane (x, z)
#[inline]
pub fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Rotate a vector about the vertical axis by `yaw` radians
#[inline]
pub fn rotate_yaw(v: Vec3, yaw: f32) -> Vec3 {
    let (sin, cos) = yaw.sin_cos();
    Vec3::new(v.x * cos + v.z * sin, v.y, -v.x * sin + v.z * cos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_yaw_quarter_turn() {
        // Straight down the range (-z) turned a quarter to the left ends up on -x
        let v = rotate_yaw(Vec3::new(0.0, 1.0, -10.0), std::f32::consts::FRAC_PI_2);
        assert!((v.x + 10.0).abs() < 1e-4);
        assert!((v.y - 1.0).abs() < 1e-6);
        assert!(v.z.abs() < 1e-4);
    }

    #[test]
    fn test_planar_drops_height() {
        assert_eq!(planar(Vec3::new(1.0, 5.0, -3.0)), Vec2::new(1.0, -3.0));
    }
}
