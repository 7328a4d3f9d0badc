//! Ball equipment and shot triggers
//!
//! A swing arrives as a `ShotTrigger` in the shot frame (forward is -z).
//! Before seeding, the equipped ball scales speed and spin, and the aim
//! rotates the velocity about the vertical axis.

use std::str::FromStr;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::rotate_yaw;

/// Ball models in the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallModel {
    /// Two-piece
    #[default]
    Standard,
    /// Three-piece tour ball
    Pro,
    /// Four-piece
    Premium,
}

impl BallModel {
    pub fn display_name(&self) -> &'static str {
        match self {
            BallModel::Standard => "Standard (2pc)",
            BallModel::Pro => "Pro V1 Style (3pc)",
            BallModel::Premium => "Golden Ball (4pc)",
        }
    }

    pub fn speed_multiplier(&self) -> f32 {
        match self {
            BallModel::Standard => 1.0,
            BallModel::Pro => 1.05,
            BallModel::Premium => 1.15,
        }
    }

    pub fn spin_multiplier(&self) -> f32 {
        match self {
            BallModel::Standard => 1.0,
            BallModel::Pro => 1.2,
            BallModel::Premium => 1.5,
        }
    }
}

impl FromStr for BallModel {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(BallModel::Standard),
            "pro" => Ok(BallModel::Pro),
            "premium" | "golden" => Ok(BallModel::Premium),
            _ => Err(SimError::UnknownBall(s.to_string())),
        }
    }
}

/// Equipment currently in play
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Equipment {
    pub ball: BallModel,
}

impl Equipment {
    /// Launch velocity and spin for a trigger: equipment multipliers, then aim.
    ///
    /// Spin stays in the shot frame (x = backspin, y = sidespin).
    pub fn shape(&self, trigger: &ShotTrigger, aim_yaw: f32) -> (Vec3, Vec3) {
        let velocity = rotate_yaw(trigger.velocity * self.ball.speed_multiplier(), aim_yaw);
        let spin = trigger.spin * self.ball.spin_multiplier();
        (velocity, spin)
    }
}

/// One detected swing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotTrigger {
    pub velocity: Vec3,
    pub spin: Vec3,
}

impl ShotTrigger {
    pub fn new(velocity: Vec3, spin: Vec3) -> Self {
        Self { velocity, spin }
    }

    /// Map a detected hand movement (normalized per frame) to a shot.
    ///
    /// Faster hands give more ball speed; launch height, lateral push and
    /// spin carry some scatter.
    pub fn from_swing(movement: f32, rng: &mut impl Rng) -> Self {
        let ball_speed = 30.0 + movement * 500.0;
        let velocity = Vec3::new(
            rng.random_range(-2.5..2.5),
            rng.random_range(15.0..25.0),
            -ball_speed,
        );
        let spin = Vec3::new(
            rng.random_range(2500.0..3500.0),
            rng.random_range(-250.0..250.0),
            0.0,
        );
        Self { velocity, spin }
    }
}
