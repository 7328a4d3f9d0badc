//! Hole capture while putting

use glam::{Vec2, Vec3};

use super::body::BallBody;
use super::flight::FlightCore;
use crate::planar;
use crate::settings::SimConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Nothing near the cup
    Idle,
    /// Slow and close: pulled toward the cup
    Assisting,
    /// In the hole
    Captured,
}

/// Two-radius capture around the cup center
#[derive(Debug, Clone, Copy)]
pub struct HoleCapture {
    pub cup: Vec2,
    pub near_radius: f32,
    pub capture_radius: f32,
    pub capture_speed: f32,
    pub magnet: f32,
}

impl HoleCapture {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            cup: config.cup,
            near_radius: config.hole_near_radius,
            capture_radius: config.hole_capture_radius,
            capture_speed: config.hole_capture_speed,
            magnet: config.hole_magnet,
        }
    }

    /// Check the ball against the cup, pulling it in when it lingers near the lip.
    ///
    /// Call before the flight step so the pull applies to that step.
    pub fn update<B: BallBody>(&self, flight: &mut FlightCore<B>) -> CaptureState {
        let offset = self.cup - planar(flight.position());
        let distance = offset.length();
        if distance >= self.near_radius || flight.velocity().length() >= self.capture_speed {
            return CaptureState::Idle;
        }
        if distance < self.capture_radius {
            return CaptureState::Captured;
        }
        log::debug!("Hole magnet engaged at {distance:.3}");
        let pull = offset * self.magnet;
        flight.apply_force(Vec3::new(pull.x, 0.0, pull.y));
        CaptureState::Assisting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::body::{PlaneWorld, SphereBody};
    use crate::sim::state::GamePhase;
    use crate::terrain::{TerrainClassifier, TerrainKind, TerrainSample};

    struct Green;

    impl TerrainClassifier for Green {
        fn name(&self) -> &'static str {
            "green"
        }
        fn classify(&self, _x: f32, _z: f32) -> TerrainSample {
            TerrainSample::of(TerrainKind::Green, 0.0)
        }
    }

    fn setup(offset: Vec2, velocity: Vec3) -> (HoleCapture, FlightCore<SphereBody>) {
        let config = SimConfig::default();
        let mut flight =
            FlightCore::new(&mut PlaneWorld::new(config.gravity), &config).expect("backend");
        let hole = HoleCapture::new(&config);
        let at = hole.cup + offset;
        flight.relocate(Vec3::new(at.x, BALL_RADIUS, at.y));
        flight.seed_shot(GamePhase::Putting, velocity, Vec3::ZERO);
        (hole, flight)
    }

    #[test]
    fn test_inside_strict_radius_captures() {
        let (hole, mut flight) = setup(Vec2::new(0.02, 0.0), Vec3::new(0.2, 0.0, 0.0));
        assert_eq!(hole.update(&mut flight), CaptureState::Captured);
    }

    #[test]
    fn test_fast_ball_lips_out() {
        let (hole, mut flight) = setup(Vec2::new(0.01, 0.0), Vec3::new(0.0, 0.0, -3.0));
        assert_eq!(hole.update(&mut flight), CaptureState::Idle);
    }

    #[test]
    fn test_far_ball_is_idle() {
        let (hole, mut flight) = setup(Vec2::new(1.0, 0.0), Vec3::ZERO);
        assert_eq!(hole.update(&mut flight), CaptureState::Idle);
    }

    #[test]
    fn test_magnet_pulls_ball_in() {
        let (hole, mut flight) = setup(Vec2::new(0.06, 0.0), Vec3::new(-0.3, 0.0, 0.0));
        assert_eq!(hole.update(&mut flight), CaptureState::Assisting);
        flight.tick(SIM_DT, &Green);
        let mut state = CaptureState::Idle;
        for _ in 0..240 {
            state = hole.update(&mut flight);
            if state == CaptureState::Captured {
                break;
            }
            flight.tick(SIM_DT, &Green);
        }
        assert_eq!(state, CaptureState::Captured);
    }
}
