//! Fixed timestep simulation tick
//!
//! One call advances the whole game by one step: host inputs first, then
//! physics for the live phase, then hole capture or rule resolution.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::body::{BallBody, DynamicsBackend};
use super::flight::{BallFrame, FlightCore};
use super::hole::{CaptureState, HoleCapture};
use super::rules::{begin_stroke, finish_hole, resolve_rest};
use super::state::{GameEvent, GamePhase, Session};
use crate::equipment::{BallModel, ShotTrigger};
use crate::error::SimError;
use crate::planar;
use crate::settings::SimConfig;
use crate::terrain::{CentralBand, ClassifierChain, CourseLayout, TerrainClassifier, WorldBounds};

/// Host events for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player signed in
    pub login: bool,
    /// Swing detector sees the player at address
    pub address: bool,
    /// Detected swing
    pub shot: Option<ShotTrigger>,
    /// Re-tee without a stroke
    pub mulligan: bool,
    /// Change ball
    pub equip: Option<BallModel>,
    /// Change ball by catalog id, as sent by the inventory screen
    pub equip_id: Option<String>,
    /// New air velocity
    pub wind: Option<glam::Vec3>,
    /// Aim rotation (radians about the vertical axis)
    pub aim_yaw: Option<f32>,
}

/// Everything the tick loop owns
pub struct Game<B: BallBody> {
    pub session: Session,
    pub flight: FlightCore<B>,
    pub hole: HoleCapture,
    pub terrain: ClassifierChain,
    pub config: SimConfig,
    /// Aim carried between ticks
    pub aim_yaw: f32,
    /// Swing scatter source
    pub rng: Pcg32,
}

/// Band fallback sized to the configured world
pub fn fallback_terrain(config: &SimConfig) -> CentralBand {
    CentralBand::new(
        config.central_band_half_width,
        WorldBounds::centered(config.world_size),
    )
}

impl<B: BallBody> Game<B> {
    /// Build a game in `Loading`. Fails when the backend cannot create the ball.
    pub fn new<D>(
        backend: &mut D,
        config: SimConfig,
        terrain: ClassifierChain,
    ) -> Result<Self, SimError>
    where
        D: DynamicsBackend<Body = B>,
    {
        let mut flight = FlightCore::new(backend, &config)?;
        flight.place(config.tee, &terrain);
        log::info!(
            "Game ready on backend '{}', terrain '{}'",
            backend.name(),
            terrain.active_name()
        );
        Ok(Self {
            session: Session::new(),
            flight,
            hole: HoleCapture::new(&config),
            terrain,
            config,
            aim_yaw: 0.0,
            rng: Pcg32::seed_from_u64(0),
        })
    }

    /// Polygon course over the band fallback, clipped to the configured world
    pub fn with_course<D>(
        backend: &mut D,
        config: SimConfig,
        course: CourseLayout,
    ) -> Result<Self, SimError>
    where
        D: DynamicsBackend<Body = B>,
    {
        let world = WorldBounds::centered(config.world_size);
        let terrain = ClassifierChain::new(fallback_terrain(&config)).with(course.within(world));
        Self::new(backend, config, terrain)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg32::seed_from_u64(seed);
        self
    }

    /// Assets and backend are up; wait for the player
    pub fn finish_loading(&mut self) {
        if self.session.phase() == GamePhase::Loading {
            self.session.transition(GamePhase::WaitingLogin);
        }
    }

    /// Install a late-loading classifier (e.g. the raster) ahead of the rest.
    /// A ball at rest is set back down on the new ground.
    pub fn promote_terrain(&mut self, classifier: impl TerrainClassifier + 'static) -> bool {
        if !self.terrain.promote(classifier) {
            return false;
        }
        if !self.flight.is_live() {
            let at = planar(self.flight.position());
            self.flight.place(at, &self.terrain);
        }
        true
    }

    /// Equip a ball from its catalog id
    pub fn equip_by_id(&mut self, id: &str) -> Result<BallModel, SimError> {
        let ball = id.parse::<BallModel>()?;
        self.session.equip(ball);
        Ok(ball)
    }

    /// Map a detected hand movement to a shot trigger with this game's RNG
    pub fn swing(&mut self, movement: f32) -> ShotTrigger {
        ShotTrigger::from_swing(movement, &mut self.rng)
    }

    pub fn ball_frame(&self) -> BallFrame {
        self.flight.frame()
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase()
    }

    pub fn score(&self) -> u32 {
        self.session.score()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.session.drain_events()
    }

    fn retee(&mut self) {
        self.flight.place(self.config.tee, &self.terrain);
    }
}

/// Advance the game by one fixed timestep
pub fn tick<B: BallBody>(game: &mut Game<B>, input: &TickInput, dt: f32) {
    // Environment and equipment can change in any phase
    if let Some(wind) = input.wind {
        game.config.wind = wind;
        game.flight.set_wind(wind);
    }
    if let Some(ball) = input.equip {
        game.session.equip(ball);
    }
    if let Some(id) = &input.equip_id {
        if let Err(e) = game.equip_by_id(id) {
            log::warn!("Equip ignored: {e}");
        }
    }
    if let Some(yaw) = input.aim_yaw {
        game.aim_yaw = yaw;
    }

    if input.login && game.session.phase() == GamePhase::WaitingLogin {
        game.session.transition(GamePhase::Ready);
    }
    if input.address {
        match game.session.phase() {
            GamePhase::Ready => game.session.transition(GamePhase::Address),
            GamePhase::Result => {
                game.retee();
                game.session.transition(GamePhase::Address);
            }
            _ => {}
        }
    }
    if input.mulligan && !game.flight.is_live() {
        match game.session.phase() {
            GamePhase::Ready | GamePhase::Address | GamePhase::Putting => {
                log::info!("Mulligan, re-teeing");
                game.retee();
                game.session.transition(GamePhase::Address);
            }
            _ => {}
        }
    }
    if let Some(trigger) = &input.shot {
        begin_stroke(&mut game.session, &mut game.flight, trigger, game.aim_yaw);
    }

    match game.session.phase() {
        GamePhase::Flight => {
            game.flight.tick(dt, &game.terrain);
            if game.flight.is_at_rest() {
                resolve_rest(&mut game.session, &mut game.flight, &game.terrain, &game.config);
            }
        }
        GamePhase::Putting => {
            if game.hole.update(&mut game.flight) == CaptureState::Captured {
                finish_hole(&mut game.session, &mut game.flight);
                // Holed balls stay put
                let cup_pos = game.flight.position();
                game.flight.relocate(cup_pos);
                return;
            }
            game.flight.tick(dt, &game.terrain);
            if game.flight.is_live() && game.flight.is_at_rest() {
                resolve_rest(&mut game.session, &mut game.flight, &game.terrain, &game.config);
            }
        }
        _ => {}
    }
}
