//! Flight simulation core
//!
//! Owns the ball body for the whole session. Each tick layers drag, wind
//! and Magnus forces on the rigid-body step, then re-reads the terrain
//! under the ball and hands its coefficients and ground height to the body
//! for the next step.
//!
//! Spin is held in the shot frame: +x is backspin, +y is sidespin. Magnus
//! forces are resolved against the stroke's planar heading, so an aimed
//! shot lifts and curves the same way a straight one does.

use glam::{Quat, Vec2, Vec3};

use super::body::{BallBody, DynamicsBackend, SphereDesc};
use super::state::GamePhase;
use crate::error::SimError;
use crate::planar;
use crate::settings::SimConfig;
use crate::terrain::{TerrainClassifier, TerrainKind, TerrainSample, coefficients};

/// Ball transform after a completed step, for the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallFrame {
    pub position: Vec3,
    pub orientation: Quat,
    pub terrain: TerrainKind,
}

pub struct FlightCore<B: BallBody> {
    body: B,
    config: SimConfig,
    /// Ball position when the current stroke was seeded
    origin: Vec3,
    launch_velocity: Vec3,
    launch_spin: Vec3,
    /// Unit planar direction of the launch, (x, z)
    heading: Vec2,
    /// Seconds since the current stroke was seeded
    elapsed: f32,
    /// A stroke has been seeded and not yet resolved
    live: bool,
    terrain: TerrainSample,
}

impl<B: BallBody> FlightCore<B> {
    /// Create the ball on the tee. Backend failure is fatal and returned.
    pub fn new<D>(backend: &mut D, config: &SimConfig) -> Result<Self, SimError>
    where
        D: DynamicsBackend<Body = B>,
    {
        let fairway = coefficients(TerrainKind::Fairway);
        let origin = config.tee_position();
        let body = backend
            .create_sphere(&SphereDesc {
                radius: config.ball_radius,
                mass: config.ball_mass,
                origin,
                friction: fairway.friction,
                restitution: fairway.restitution,
            })
            .inspect_err(|e| log::error!("Dynamics backend '{}' failed: {e}", backend.name()))?;
        Ok(Self {
            body,
            config: config.clone(),
            origin,
            launch_velocity: Vec3::ZERO,
            launch_spin: Vec3::ZERO,
            heading: Vec2::NEG_Y,
            elapsed: 0.0,
            live: false,
            terrain: TerrainSample::of(TerrainKind::Tee, 0.0),
        })
    }

    /// Start a stroke. Ignored (returns false) unless the phase accepts a
    /// swing and no earlier stroke is still unresolved.
    ///
    /// `velocity` and `spin` already carry aim and equipment adjustments.
    pub fn seed_shot(&mut self, phase: GamePhase, velocity: Vec3, spin: Vec3) -> bool {
        let eligible = phase.accepts_shot() || phase == GamePhase::Putting;
        if !eligible || self.live {
            log::debug!("Shot trigger ignored in {phase:?} (stroke live: {})", self.live);
            return false;
        }
        self.origin = self.body.position();
        self.launch_velocity = velocity;
        self.launch_spin = spin;
        // Straight up or dead still: keep the shot frame's forward
        self.heading = planar(velocity).try_normalize().unwrap_or(Vec2::NEG_Y);
        self.elapsed = 0.0;
        self.live = true;
        self.body.set_linear_velocity(velocity);
        self.body.set_angular_velocity(spin);
        self.body.activate();
        log::debug!("Seeded shot from {:?}: v={velocity:?} spin={spin:?}", self.origin);
        true
    }

    /// Advance one fixed step
    pub fn tick(&mut self, dt: f32, terrain: &dyn TerrainClassifier) {
        let v = self.body.linear_velocity();
        let spin = self.body.angular_velocity();

        let drag = (self.config.wind - v) * self.config.drag_coefficient;
        // Backspin lifts, sidespin curves to the right of the heading
        let forward = planar(v).dot(self.heading);
        let right = Vec2::new(-self.heading.y, self.heading.x);
        let k = self.config.magnus_coefficient;
        let curve = right * (spin.y * forward * k);
        let magnus = Vec3::new(curve.x, spin.x * forward * k, curve.y);
        self.body.apply_central_force(drag + magnus);

        self.body.step(dt, self.config.solver_iterations);
        if self.live {
            self.elapsed += dt;
        }

        let pos = self.body.position();
        self.terrain = terrain.classify(pos.x, pos.z);
        self.body.set_friction(self.terrain.friction);
        self.body.set_restitution(self.terrain.restitution);
        self.body.set_ground_height(self.terrain.elevation);

        if !self.body.in_contact() {
            return;
        }
        let damping = if self.terrain.custom_damping {
            self.terrain.damping_factor
        } else {
            match self.terrain.kind {
                TerrainKind::Bunker => self.config.bunker_damping,
                TerrainKind::Water | TerrainKind::WaterLateral => self.config.water_damping,
                _ => self.terrain.damping_factor,
            }
        };
        if damping < 1.0 {
            self.body
                .set_linear_velocity(self.body.linear_velocity() * damping);
        }
        if self.terrain.kind == TerrainKind::Green
            && self.body.linear_velocity().length() < self.config.putting_stop_speed
        {
            self.body.set_linear_velocity(Vec3::ZERO);
        }
    }

    /// Slow, grounded and past the hold time since seeding
    pub fn is_at_rest(&self) -> bool {
        self.body.linear_velocity().length() < self.config.rest_speed
            && self.elapsed >= self.config.rest_hold_secs
            && self.body.in_contact()
    }

    /// Terrain under the ball right now
    pub fn current_terrain(&self, terrain: &dyn TerrainClassifier) -> TerrainSample {
        let pos = self.body.position();
        terrain.classify(pos.x, pos.z)
    }

    /// Set the ball down, stopped, on the ground at planar point `at`.
    /// Returns where it ended up.
    pub fn place(&mut self, at: Vec2, terrain: &dyn TerrainClassifier) -> Vec3 {
        self.terrain = terrain.classify(at.x, at.y);
        self.body.set_ground_height(self.terrain.elevation);
        let pos = Vec3::new(at.x, self.terrain.elevation + self.config.ball_radius, at.y);
        self.relocate(pos);
        pos
    }

    /// Move the ball and stop it dead. The ground height is left as is.
    pub fn relocate(&mut self, pos: Vec3) {
        self.body.set_position(pos);
        self.body.set_linear_velocity(Vec3::ZERO);
        self.body.set_angular_velocity(Vec3::ZERO);
    }

    pub fn set_wind(&mut self, wind: Vec3) {
        self.config.wind = wind;
    }

    /// Close the current stroke; the next trigger may seed again
    pub fn finish_stroke(&mut self) {
        self.live = false;
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn launch_velocity(&self) -> Vec3 {
        self.launch_velocity
    }

    pub fn launch_spin(&self) -> Vec3 {
        self.launch_spin
    }

    pub fn position(&self) -> Vec3 {
        self.body.position()
    }

    pub fn velocity(&self) -> Vec3 {
        self.body.linear_velocity()
    }

    pub fn apply_force(&mut self, force: Vec3) {
        self.body.apply_central_force(force);
    }

    pub fn frame(&self) -> BallFrame {
        BallFrame {
            position: self.body.position(),
            orientation: self.body.orientation(),
            terrain: self.terrain.kind,
        }
    }

    #[cfg(test)]
    pub(crate) fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }
}
