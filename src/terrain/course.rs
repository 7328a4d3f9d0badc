//! Course area model
//!
//! A course is a list of labeled polygons tested in priority order (OB
//! first, then penalty areas, bunkers, green, tee, fairway). Overlaps are
//! legal: the first match wins. Anything inside the world but outside every
//! polygon is rough.
//!
//! Containment is the standard even-odd ray cast. A point lying exactly on
//! an edge may land on either side; that ambiguity is accepted.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::Coefficients;
use super::{TerrainClassifier, TerrainKind, TerrainSample, WorldBounds};
use crate::error::SimError;

/// A labeled region of the course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseArea {
    pub id: u32,
    pub kind: TerrainKind,
    /// Vertices in (x, z), either winding
    pub polygon: Vec<Vec2>,
    /// Replaces the table coefficients for this area
    #[serde(default)]
    pub overrides: Option<Coefficients>,
    #[serde(default)]
    pub stroke_penalty: Option<u32>,
    /// Relief point for penalty areas
    #[serde(default)]
    pub drop_zone: Option<Vec2>,
}

impl CourseArea {
    pub fn new(id: u32, kind: TerrainKind, polygon: Vec<Vec2>) -> Self {
        Self {
            id,
            kind,
            polygon,
            overrides: None,
            stroke_penalty: None,
            drop_zone: None,
        }
    }

    /// Axis-aligned rectangle
    pub fn rect(id: u32, kind: TerrainKind, x: (f32, f32), z: (f32, f32)) -> Self {
        Self::new(
            id,
            kind,
            vec![
                Vec2::new(x.0, z.0),
                Vec2::new(x.1, z.0),
                Vec2::new(x.1, z.1),
                Vec2::new(x.0, z.1),
            ],
        )
    }

    pub fn with_drop_zone(mut self, drop: Vec2) -> Self {
        self.drop_zone = Some(drop);
        self
    }

    pub fn with_penalty(mut self, strokes: u32) -> Self {
        self.stroke_penalty = Some(strokes);
        self
    }

    pub fn contains(&self, x: f32, z: f32) -> bool {
        point_in_polygon(Vec2::new(x, z), &self.polygon)
    }

    fn sample(&self) -> TerrainSample {
        let mut sample = TerrainSample::of(self.kind, 0.0);
        if let Some(c) = self.overrides {
            sample.friction = c.friction;
            sample.restitution = c.restitution;
            sample.damping_factor = c.damping_factor;
            sample.custom_damping = true;
        }
        sample.stroke_penalty = self.stroke_penalty;
        sample.drop_zone = self.drop_zone;
        sample
    }
}

/// Even-odd ray cast along +x
pub fn point_in_polygon(p: Vec2, vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (vi, vj) = (vertices[i], vertices[j]);
        if (vi.y > p.y) != (vj.y > p.y) {
            let cross_x = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
            if p.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[derive(Deserialize)]
struct CourseFile {
    name: String,
    bounds: WorldBounds,
    areas: Vec<CourseArea>,
}

impl TryFrom<CourseFile> for CourseLayout {
    type Error = SimError;

    fn try_from(file: CourseFile) -> Result<Self, Self::Error> {
        CourseLayout::new(file.name, file.bounds, file.areas)
    }
}

/// Immutable course description, areas sorted by priority
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CourseFile")]
pub struct CourseLayout {
    name: String,
    bounds: WorldBounds,
    areas: Vec<CourseArea>,
}

impl CourseLayout {
    /// Validate and order areas. Areas of equal priority keep their listed order.
    pub fn new(
        name: impl Into<String>,
        bounds: WorldBounds,
        mut areas: Vec<CourseArea>,
    ) -> Result<Self, SimError> {
        if let Some(bad) = areas.iter().find(|a| a.polygon.len() < 3) {
            return Err(SimError::InvalidPolygon {
                id: bad.id,
                vertices: bad.polygon.len(),
            });
        }
        areas.sort_by_key(|a| a.kind);
        Ok(Self {
            name: name.into(),
            bounds,
            areas,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let layout = Self::from_json(&json)?;
        log::info!(
            "Loaded course '{}' ({} areas) from {}",
            layout.name,
            layout.areas.len(),
            path.as_ref().display()
        );
        Ok(layout)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Clip the course to the simulated world; nothing outside it is playable
    pub fn within(mut self, world: WorldBounds) -> Self {
        let clipped = self.bounds.intersect(&world);
        if clipped != self.bounds {
            log::warn!(
                "Course '{}' bounds {:?} exceed the world, clipped to {:?}",
                self.name,
                self.bounds,
                clipped
            );
            self.bounds = clipped;
        }
        self
    }

    /// Areas in test order
    pub fn areas(&self) -> &[CourseArea] {
        &self.areas
    }

    /// The par-5 practice hole
    pub fn default_course() -> Self {
        let mut areas = vec![
            CourseArea::rect(1, TerrainKind::Fairway, (-30.0, 30.0), (-500.0, -40.0)),
            CourseArea::rect(2, TerrainKind::Green, (-20.0, 20.0), (-550.0, -500.0)),
            CourseArea::rect(3, TerrainKind::Water, (-80.0, 80.0), (-350.0, -300.0))
                .with_drop_zone(Vec2::new(0.0, -290.0))
                .with_penalty(1),
            CourseArea::rect(4, TerrainKind::WaterLateral, (40.0, 70.0), (-480.0, -400.0))
                .with_drop_zone(Vec2::new(35.0, -440.0))
                .with_penalty(1),
            CourseArea::rect(5, TerrainKind::Bunker, (20.0, 35.0), (-200.0, -160.0)),
            CourseArea::rect(6, TerrainKind::Bunker, (-35.0, -20.0), (-400.0, -360.0)),
            CourseArea::rect(7, TerrainKind::Ob, (-160.0, -150.0), (-600.0, 100.0)),
            CourseArea::rect(8, TerrainKind::Ob, (150.0, 160.0), (-600.0, 100.0)),
            CourseArea::rect(9, TerrainKind::Tee, (-3.0, 3.0), (-3.0, 3.0)),
        ];
        areas.sort_by_key(|a| a.kind);
        // Every rect has four vertices, nothing to validate
        Self {
            name: "practice".to_string(),
            bounds: WorldBounds::new(Vec2::new(-160.0, -600.0), Vec2::new(160.0, 100.0)),
            areas,
        }
    }
}

impl TerrainClassifier for CourseLayout {
    fn name(&self) -> &'static str {
        "course"
    }

    fn classify(&self, x: f32, z: f32) -> TerrainSample {
        if !self.bounds.contains(x, z) {
            return TerrainSample::of(TerrainKind::Ob, 0.0);
        }
        self.areas
            .iter()
            .find(|area| area.contains(x, z))
            .map(CourseArea::sample)
            .unwrap_or_else(|| TerrainSample::of(TerrainKind::Rough, 0.0))
    }

    fn elevation(&self, _x: f32, _z: f32) -> f32 {
        0.0
    }
}
