//! Rigid-body backend seam
//!
//! The flight core drives the ball through [`BallBody`] and never reaches
//! into the dynamics engine directly. [`PlaneWorld`] is the bundled backend:
//! a single sphere over a horizontal ground plane, integrated in fixed
//! substeps. The flight core moves the plane to the terrain height under the
//! ball after every step, so the floor follows the heightmap.

use glam::{Quat, Vec2, Vec3};

use crate::error::SimError;

/// Construction parameters for the ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereDesc {
    pub radius: f32,
    pub mass: f32,
    pub origin: Vec3,
    pub friction: f32,
    pub restitution: f32,
}

/// Operations the flight core needs from a dynamic sphere
pub trait BallBody {
    fn position(&self) -> Vec3;
    fn orientation(&self) -> Quat;
    /// Teleport; velocities are left untouched
    fn set_position(&mut self, pos: Vec3);

    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, vel: Vec3);
    fn angular_velocity(&self) -> Vec3;
    fn set_angular_velocity(&mut self, spin: Vec3);

    /// Accumulated until the next `step`
    fn apply_central_force(&mut self, force: Vec3);
    fn set_friction(&mut self, friction: f32);
    fn set_restitution(&mut self, restitution: f32);
    /// Height of the ground directly under the ball
    fn set_ground_height(&mut self, height: f32);

    /// Wake the body so the next step integrates it
    fn activate(&mut self);
    /// Touching the ground after the last step
    fn in_contact(&self) -> bool;

    fn step(&mut self, dt: f32, solver_iterations: u32);
}

/// Creates the ball body
pub trait DynamicsBackend {
    type Body: BallBody;

    fn name(&self) -> &'static str;

    fn create_sphere(&mut self, desc: &SphereDesc) -> Result<Self::Body, SimError>;
}

/// Vertical speed below which an impact does not bounce
const BOUNCE_THRESHOLD: f32 = 0.5;
/// Height above the ground still treated as contact
const CONTACT_SLOP: f32 = 1e-3;
/// Spin loss per unit friction per second while rolling
const SPIN_DECAY: f32 = 2.0;

/// Bundled backend: ground plane under uniform gravity
#[derive(Debug, Clone, Copy)]
pub struct PlaneWorld {
    pub gravity: f32,
    pub ground_height: f32,
}

impl PlaneWorld {
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity,
            ground_height: 0.0,
        }
    }
}

impl DynamicsBackend for PlaneWorld {
    type Body = SphereBody;

    fn name(&self) -> &'static str {
        "plane-world"
    }

    fn create_sphere(&mut self, desc: &SphereDesc) -> Result<SphereBody, SimError> {
        if !(desc.radius > 0.0 && desc.mass > 0.0) {
            return Err(SimError::BackendUnavailable(format!(
                "sphere needs positive radius and mass (got r={}, m={})",
                desc.radius, desc.mass
            )));
        }
        Ok(SphereBody {
            pos: desc.origin,
            orientation: Quat::IDENTITY,
            vel: Vec3::ZERO,
            spin: Vec3::ZERO,
            force: Vec3::ZERO,
            radius: desc.radius,
            inv_mass: 1.0 / desc.mass,
            friction: desc.friction,
            restitution: desc.restitution,
            gravity: self.gravity,
            ground_height: self.ground_height,
            active: false,
            contact: desc.origin.y - desc.radius <= self.ground_height + CONTACT_SLOP,
        })
    }
}

/// Sphere integrated with semi-implicit Euler over the ground plane
#[derive(Debug, Clone)]
pub struct SphereBody {
    pos: Vec3,
    orientation: Quat,
    vel: Vec3,
    spin: Vec3,
    force: Vec3,
    radius: f32,
    inv_mass: f32,
    friction: f32,
    restitution: f32,
    gravity: f32,
    ground_height: f32,
    active: bool,
    contact: bool,
}

impl SphereBody {
    fn substep(&mut self, h: f32, accel: Vec3) {
        self.vel += accel * h;
        self.pos += self.vel * h;

        let floor = self.ground_height + self.radius;
        self.contact = self.pos.y <= floor + CONTACT_SLOP;
        if self.pos.y <= floor {
            self.pos.y = floor;
            if self.vel.y < 0.0 {
                let impact = -self.vel.y;
                self.vel.y = if impact > BOUNCE_THRESHOLD {
                    impact * self.restitution
                } else {
                    0.0
                };
            }
        }

        if self.contact {
            // Coulomb friction on the ground-plane component
            let planar = Vec2::new(self.vel.x, self.vel.z);
            let speed = planar.length();
            let drop = self.friction * self.gravity.abs() * h;
            if drop >= speed {
                self.vel.x = 0.0;
                self.vel.z = 0.0;
            } else {
                let scale = (speed - drop) / speed;
                self.vel.x *= scale;
                self.vel.z *= scale;
            }
            self.spin *= (1.0 - self.friction * SPIN_DECAY * h).max(0.0);
        }

        let angle = self.spin.length() * h;
        if angle > 1e-9 {
            let turn = Quat::from_axis_angle(self.spin / self.spin.length(), angle);
            self.orientation = (turn * self.orientation).normalize();
        }
    }
}

impl BallBody for SphereBody {
    fn position(&self) -> Vec3 {
        self.pos
    }

    fn orientation(&self) -> Quat {
        self.orientation
    }

    fn set_position(&mut self, pos: Vec3) {
        self.pos = pos;
        self.contact = pos.y - self.radius <= self.ground_height + CONTACT_SLOP;
    }

    fn linear_velocity(&self) -> Vec3 {
        self.vel
    }

    fn set_linear_velocity(&mut self, vel: Vec3) {
        self.vel = vel;
    }

    fn angular_velocity(&self) -> Vec3 {
        self.spin
    }

    fn set_angular_velocity(&mut self, spin: Vec3) {
        self.spin = spin;
    }

    fn apply_central_force(&mut self, force: Vec3) {
        self.force += force;
    }

    fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution;
    }

    fn set_ground_height(&mut self, height: f32) {
        self.ground_height = height;
        self.contact = self.pos.y - self.radius <= height + CONTACT_SLOP;
    }

    fn activate(&mut self) {
        self.active = true;
    }

    fn in_contact(&self) -> bool {
        self.contact
    }

    fn step(&mut self, dt: f32, solver_iterations: u32) {
        if self.active {
            let iterations = solver_iterations.max(1);
            let h = dt / iterations as f32;
            let accel = self.force * self.inv_mass + Vec3::new(0.0, self.gravity, 0.0);
            for _ in 0..iterations {
                self.substep(h, accel);
            }
        }
        self.force = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    fn ball_at(origin: Vec3) -> SphereBody {
        let mut world = PlaneWorld::new(GRAVITY);
        let mut body = world
            .create_sphere(&SphereDesc {
                radius: BALL_RADIUS,
                mass: BALL_MASS,
                origin,
                friction: 0.4,
                restitution: 0.25,
            })
            .expect("sphere");
        body.activate();
        body
    }

    #[test]
    fn test_invalid_sphere_is_backend_error() {
        let mut world = PlaneWorld::new(GRAVITY);
        let result = world.create_sphere(&SphereDesc {
            radius: 0.0,
            mass: BALL_MASS,
            origin: Vec3::ZERO,
            friction: 0.4,
            restitution: 0.25,
        });
        assert!(matches!(result, Err(SimError::BackendUnavailable(_))));
    }

    #[test]
    fn test_inactive_body_does_not_move() {
        let mut world = PlaneWorld::new(GRAVITY);
        let mut body = world
            .create_sphere(&SphereDesc {
                radius: BALL_RADIUS,
                mass: BALL_MASS,
                origin: Vec3::new(0.0, 5.0, 0.0),
                friction: 0.4,
                restitution: 0.25,
            })
            .expect("sphere");
        body.step(SIM_DT, SOLVER_ITERATIONS);
        assert_eq!(body.position(), Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_falls_and_settles_on_ground() {
        let mut body = ball_at(Vec3::new(0.0, 2.0, 0.0));
        assert!(!body.in_contact());
        for _ in 0..600 {
            body.step(SIM_DT, SOLVER_ITERATIONS);
        }
        assert!(body.in_contact());
        assert!((body.position().y - BALL_RADIUS).abs() < 1e-3);
        assert!(body.linear_velocity().length() < 1e-3);
    }

    #[test]
    fn test_bounce_uses_restitution() {
        let mut body = ball_at(Vec3::new(0.0, BALL_RADIUS + 0.001, 0.0));
        body.set_linear_velocity(Vec3::new(0.0, -10.0, 0.0));
        body.step(SIM_DT, SOLVER_ITERATIONS);
        // Bounced up at roughly a quarter of the impact speed
        assert!(body.linear_velocity().y > 2.0 && body.linear_velocity().y < 3.0);
    }

    #[test]
    fn test_rolling_friction_stops_ball() {
        let mut body = ball_at(Vec3::new(0.0, BALL_RADIUS, 0.0));
        body.set_linear_velocity(Vec3::new(0.0, 0.0, -2.0));
        for _ in 0..120 {
            body.step(SIM_DT, SOLVER_ITERATIONS);
        }
        assert_eq!(body.linear_velocity(), Vec3::ZERO);
        assert!(body.position().z < -0.1);
    }

    #[test]
    fn test_force_is_cleared_after_step() {
        let mut body = ball_at(Vec3::new(0.0, 100.0, 0.0));
        body.apply_central_force(Vec3::new(BALL_MASS, 0.0, 0.0));
        body.step(1.0, 1);
        let after_push = body.linear_velocity().x;
        assert!((after_push - 1.0).abs() < 1e-4);
        body.step(1.0, 1);
        assert!((body.linear_velocity().x - after_push).abs() < 1e-6);
    }

    #[test]
    fn test_floor_follows_ground_height() {
        let mut body = ball_at(Vec3::new(0.0, BALL_RADIUS, 0.0));
        body.set_ground_height(-10.0);
        assert!(!body.in_contact());
        body.set_position(Vec3::new(0.0, -10.0 + BALL_RADIUS, 0.0));
        assert!(body.in_contact());
        for _ in 0..60 {
            body.step(SIM_DT, SOLVER_ITERATIONS);
        }
        assert!((body.position().y - (-10.0 + BALL_RADIUS)).abs() < 1e-4);

        // Ground rising under the ball lifts it onto the new floor
        body.set_ground_height(2.0);
        assert!(body.in_contact());
        body.step(SIM_DT, SOLVER_ITERATIONS);
        assert!((body.position().y - (2.0 + BALL_RADIUS)).abs() < 1e-4);
    }

    #[test]
    fn test_spin_turns_orientation() {
        let mut body = ball_at(Vec3::new(0.0, 10.0, 0.0));
        body.set_angular_velocity(Vec3::new(0.0, 1.0, 0.0));
        body.step(SIM_DT, SOLVER_ITERATIONS);
        assert!(body.orientation().angle_between(Quat::IDENTITY) > 0.0);
    }
}
