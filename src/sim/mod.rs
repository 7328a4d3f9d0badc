//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Single writer: the tick loop owns the ball and the score
//! - No rendering or platform dependencies

pub mod body;
pub mod flight;
pub mod hole;
pub mod rules;
pub mod state;
pub mod tick;

pub use body::{BallBody, DynamicsBackend, PlaneWorld, SphereBody, SphereDesc};
pub use flight::{BallFrame, FlightCore};
pub use hole::{CaptureState, HoleCapture};
pub use rules::{Outcome, begin_stroke, finish_hole, resolve_rest};
pub use state::{CameraMode, GameEvent, GamePhase, Session, ShotRecord, SpinSummary};
pub use tick::{Game, TickInput, fallback_terrain, tick};
