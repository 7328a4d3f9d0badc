//! Session state and the records it produces
//!
//! The `Session` is the single owner of phase and score. Phase changes go
//! through `Session::transition`, which also queues the event the host
//! uses for camera and UI switching.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::equipment::{BallModel, Equipment};
use crate::terrain::TerrainKind;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Assets and backend starting up
    Loading,
    /// Waiting for the player to sign in
    WaitingLogin,
    /// Player standing over the ball
    Address,
    /// Ball teed or lying, waiting for a swing
    Ready,
    /// Ball in motion after a full shot
    Flight,
    /// On the green, hole capture active
    Putting,
    /// Hole finished
    Result,
}

impl GamePhase {
    /// Phases in which a new full shot may be seeded
    pub fn accepts_shot(self) -> bool {
        matches!(self, GamePhase::Ready | GamePhase::Address)
    }

    /// Camera the renderer should switch to on entering this phase
    pub fn camera(self) -> CameraMode {
        match self {
            GamePhase::Loading | GamePhase::WaitingLogin | GamePhase::Result => CameraMode::Overview,
            GamePhase::Address | GamePhase::Ready => CameraMode::BehindBall,
            GamePhase::Flight => CameraMode::Follow,
            GamePhase::Putting => CameraMode::Green,
        }
    }
}

/// Renderer camera hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    Overview,
    BehindBall,
    Follow,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinSummary {
    pub backspin: f32,
    pub sidespin: f32,
    pub total: f32,
}

impl SpinSummary {
    pub fn from_spin(spin: Vec3) -> Self {
        Self {
            backspin: spin.x,
            sidespin: spin.y,
            total: spin.length(),
        }
    }
}

/// Completed shot, handed to sync/telemetry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    /// Depth-axis displacement from the shot origin
    pub distance: f32,
    pub ball_speed: f32,
    /// Degrees above the ground plane
    pub launch_angle: f32,
    pub spin: SpinSummary,
    pub reward_coins: u64,
    /// Session score after this shot
    pub stroke_score: u32,
    /// Unix time (ms)
    pub timestamp_ms: u64,
}

/// Events for the host (renderer, UI, sync)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PhaseChanged {
        from: GamePhase,
        to: GamePhase,
        camera: CameraMode,
    },
    ShotStarted {
        velocity: Vec3,
        spin: Vec3,
    },
    ShotCompleted(ShotRecord),
    OutOfBounds {
        score: u32,
    },
    PenaltyArea {
        kind: TerrainKind,
        drop: Vec3,
        score: u32,
    },
    OnGreen {
        score: u32,
    },
    HoleCompleted {
        score: u32,
    },
    EquipmentChanged {
        ball: BallModel,
    },
}

/// One play session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    phase: GamePhase,
    /// Strokes including penalties
    score: u32,
    pub holes_completed: u32,
    pub equipment: Equipment,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Loading,
            score: 0,
            holes_completed: 0,
            equipment: Equipment::default(),
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Score only ever grows
    pub fn add_strokes(&mut self, strokes: u32) -> u32 {
        self.score = self.score.saturating_add(strokes);
        self.score
    }

    pub fn transition(&mut self, to: GamePhase) {
        let from = self.phase;
        self.phase = to;
        log::info!("[GameState] {:?} -> {:?}", from, to);
        self.events.push(GameEvent::PhaseChanged {
            from,
            to,
            camera: to.camera(),
        });
    }

    pub fn equip(&mut self, ball: BallModel) {
        if self.equipment.ball == ball {
            return;
        }
        self.equipment.ball = ball;
        log::info!("Equipped {}", ball.display_name());
        self.events.push(GameEvent::EquipmentChanged { ball });
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every queued event, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_queues_camera_hint() {
        let mut session = Session::new();
        session.transition(GamePhase::Ready);
        session.transition(GamePhase::Flight);
        let events = session.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            GameEvent::PhaseChanged {
                from: GamePhase::Ready,
                to: GamePhase::Flight,
                camera: CameraMode::Follow,
            }
        );
        assert!(session.pending_events().is_empty());
    }

    #[test]
    fn test_add_strokes_saturates() {
        let mut session = Session::new();
        assert_eq!(session.add_strokes(2), 2);
        session.score = u32::MAX - 1;
        assert_eq!(session.add_strokes(5), u32::MAX);
    }

    #[test]
    fn test_equip_acknowledges_changes_only() {
        let mut session = Session::new();
        session.equip(BallModel::Standard);
        assert!(session.pending_events().is_empty());
        session.equip(BallModel::Pro);
        assert_eq!(
            session.drain_events(),
            vec![GameEvent::EquipmentChanged { ball: BallModel::Pro }]
        );
    }

    #[test]
    fn test_shot_record_serializes_for_sync() {
        let record = ShotRecord {
            distance: 12.5,
            ball_speed: 60.8,
            launch_angle: 9.5,
            spin: SpinSummary::from_spin(Vec3::new(3000.0, 0.0, 0.0)),
            reward_coins: 125,
            stroke_score: 1,
            timestamp_ms: 0,
        };
        let json = serde_json::to_value(GameEvent::ShotCompleted(record)).expect("serialize");
        assert_eq!(json["type"], "shot_completed");
        assert_eq!(json["reward_coins"], 125);
    }
}
