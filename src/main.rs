//! AirSwing headless driver
//!
//! Usage: `airswing [config.json] [course.json] [terrain_dir] [ball]`
//!
//! Plays one hole with seeded swings: full shots aimed at the cup, putts
//! once on the green. Terrain rasters load in the background and take over
//! from the polygon course when they arrive.

use std::process::ExitCode;

use glam::Vec3;

use airswing::consts::*;
use airswing::sim::{Game, GameEvent, GamePhase, PlaneWorld, SphereBody, TickInput, tick};
use airswing::terrain::{CourseLayout, TerrainAssets, TerrainKind, coefficients, load_raster};
use airswing::{ShotTrigger, SimConfig, planar};

/// Display refresh the driver pretends to run at
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up after this many strokes
const STROKE_LIMIT: u32 = 12;
/// Simulated seconds before giving up
const TIME_LIMIT_SECS: f32 = 1800.0;
/// Hand movement fed to the swing mapping for full shots
const SWING_MOVEMENT: f32 = 0.06;

struct Driver {
    game: Game<SphereBody>,
    accumulator: f32,
    input: TickInput,
    strokes: u32,
}

impl Driver {
    fn new(game: Game<SphereBody>) -> Self {
        Self {
            game,
            accumulator: 0.0,
            input: TickInput::default(),
            strokes: 0,
        }
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, dt: f32) {
        self.accumulator += dt.min(0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.game, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // One-shot inputs apply to a single tick
            self.input = TickInput::default();
        }
    }

    /// Decide what the player does next
    fn plan(&mut self) {
        if self.game.flight.is_live() {
            return;
        }
        match self.game.phase() {
            GamePhase::WaitingLogin => self.input.login = true,
            GamePhase::Ready => self.input.address = true,
            GamePhase::Address => {
                let to_cup = self.game.config.cup - planar(self.game.flight.position());
                self.input.aim_yaw = Some((-to_cup.x).atan2(-to_cup.y));
                self.input.shot = Some(self.game.swing(SWING_MOVEMENT));
                self.strokes += 1;
            }
            GamePhase::Putting => {
                self.input.aim_yaw = Some(0.0);
                self.input.shot = Some(self.putt());
                self.strokes += 1;
            }
            _ => {}
        }
    }

    /// Straight putt arriving at the cup at about half a unit per second
    fn putt(&self) -> ShotTrigger {
        let to_cup = self.game.config.cup - planar(self.game.flight.position());
        let distance = to_cup.length();
        let decel = coefficients(TerrainKind::Green).friction * self.game.config.gravity.abs();
        let speed = (2.0 * decel * distance + 0.25).sqrt();
        let dir = to_cup.normalize_or_zero() * speed;
        ShotTrigger::new(Vec3::new(dir.x, 0.0, dir.y), Vec3::ZERO)
    }

    fn report_events(&mut self) {
        for event in self.game.drain_events() {
            match serde_json::to_string(&event) {
                Ok(json) => log::info!("event {json}"),
                Err(e) => log::warn!("Could not encode event {event:?}: {e}"),
            }
            if let GameEvent::ShotCompleted(record) = &event {
                log::info!(
                    "Carry {:.1}, speed {:.1}, launch {:.1} deg, {} coins",
                    record.distance,
                    record.ball_speed,
                    record.launch_angle,
                    record.reward_coins
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("AirSwing (headless) starting...");

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "airswing.json".to_string());
    let course_path = args.next();
    let terrain_dir = args.next().unwrap_or_else(|| "assets/terrain".to_string());
    let ball = args.next();

    let config = match SimConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid config {config_path}: {e}");
            return ExitCode::FAILURE;
        }
    };
    let course = match course_path {
        Some(path) => match CourseLayout::load(&path) {
            Ok(course) => course,
            Err(e) => {
                log::error!("Invalid course {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => CourseLayout::default_course(),
    };
    log::info!("Course '{}' with {} areas", course.name(), course.areas().len());

    // Rasters load while the game is already stepping on the polygon course
    let mut raster_task = Some(tokio::spawn(load_raster(
        TerrainAssets::new(terrain_dir),
        config.clone(),
    )));

    let mut world = PlaneWorld::new(config.gravity);
    let game = match Game::with_course(&mut world, config, course) {
        Ok(game) => game.with_seed(0x5EED),
        Err(e) => {
            log::error!("Simulation unavailable: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut driver = Driver::new(game);
    driver.game.finish_loading();
    // Applied on the first tick like any inventory change
    driver.input.equip_id = ball;

    let mut sim_time = 0.0;
    while driver.game.phase() != GamePhase::Result {
        if raster_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = raster_task.take() {
                match task.await {
                    Ok(raster) => {
                        driver.game.promote_terrain(raster);
                    }
                    Err(e) => log::warn!("Terrain loading task failed: {e}"),
                }
            }
        }

        driver.plan();
        driver.update(FRAME_DT);
        driver.report_events();

        sim_time += FRAME_DT;
        if driver.strokes > STROKE_LIMIT || sim_time > TIME_LIMIT_SECS {
            log::warn!(
                "Stopping after {} strokes and {:.0}s without holing out",
                driver.strokes,
                sim_time
            );
            break;
        }
        if raster_task.is_some() {
            // Let the loader make progress between frames
            tokio::task::yield_now().await;
        }
    }

    log::info!(
        "Final score {} in phase {:?} ({} holes completed)",
        driver.game.score(),
        driver.game.phase(),
        driver.game.session.holes_completed
    );
    ExitCode::SUCCESS
}
