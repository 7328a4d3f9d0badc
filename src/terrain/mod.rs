//! Terrain classification
//!
//! Answers "what is under the ball at (x, z)" from one of several sources:
//! - `raster`: heightmap plus per-category occupancy masks
//! - `course`: priority-ordered labeled polygons
//! - `CentralBand`: last resort when no course data is available
//!
//! All sources implement [`TerrainClassifier`] and are composed by
//! [`ClassifierChain`], which answers from the first source that is ready.

pub mod course;
pub mod loader;
pub mod physics;
pub mod raster;

pub use course::{CourseArea, CourseLayout};
pub use loader::{TerrainAssets, load_raster};
pub use physics::{Coefficients, coefficients};
pub use raster::{Grid, RasterTerrain};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Terrain categories
///
/// Variants are declared in classification priority order: when several
/// sources claim the same point, the lowest variant wins. Both classifiers
/// rely on the derived `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerrainKind {
    Ob,
    Water,
    WaterLateral,
    Bunker,
    Green,
    Tee,
    Fairway,
    Rough,
}

impl TerrainKind {
    /// Every category, highest priority first
    pub const ALL: [TerrainKind; 8] = [
        TerrainKind::Ob,
        TerrainKind::Water,
        TerrainKind::WaterLateral,
        TerrainKind::Bunker,
        TerrainKind::Green,
        TerrainKind::Tee,
        TerrainKind::Fairway,
        TerrainKind::Rough,
    ];

    /// Penalty areas cost a stroke and a drop
    pub fn is_penalty_area(self) -> bool {
        matches!(self, TerrainKind::Water | TerrainKind::WaterLateral)
    }

    /// Asset name fragment (`mask_<name>.png`)
    pub fn mask_name(self) -> &'static str {
        match self {
            TerrainKind::Ob => "ob",
            TerrainKind::Water => "water",
            TerrainKind::WaterLateral => "water_lateral",
            TerrainKind::Bunker => "bunker",
            TerrainKind::Green => "green",
            TerrainKind::Tee => "tee",
            TerrainKind::Fairway => "fairway",
            TerrainKind::Rough => "rough",
        }
    }
}

/// Ground interaction at a query point. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainSample {
    pub kind: TerrainKind,
    pub friction: f32,
    pub restitution: f32,
    /// Multiplicative velocity factor per tick while on this ground
    pub damping_factor: f32,
    /// `damping_factor` was set by the area itself rather than the table
    pub custom_damping: bool,
    pub elevation: f32,
    /// Penalty strokes charged by the area that produced this sample
    pub stroke_penalty: Option<u32>,
    /// Where to drop after landing in the area that produced this sample
    pub drop_zone: Option<Vec2>,
}

impl TerrainSample {
    /// Sample carrying the table coefficients for `kind`
    pub fn of(kind: TerrainKind, elevation: f32) -> Self {
        let c = coefficients(kind);
        Self {
            kind,
            friction: c.friction,
            restitution: c.restitution,
            damping_factor: c.damping_factor,
            custom_damping: false,
            elevation,
            stroke_penalty: None,
            drop_zone: None,
        }
    }
}

/// Axis-aligned playable region in the ground plane.
///
/// Half-open like the raster grid: `min` is inside, `max` is not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl WorldBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Square of edge `size` centered on the origin
    pub fn centered(size: f32) -> Self {
        let half = size / 2.0;
        Self::new(Vec2::splat(-half), Vec2::splat(half))
    }

    #[inline]
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x < self.max.x && z >= self.min.y && z < self.max.y
    }

    /// Overlap of two regions; empty overlaps contain nothing
    pub fn intersect(&self, other: &WorldBounds) -> WorldBounds {
        WorldBounds::new(self.min.max(other.min), self.max.min(other.max))
    }
}

/// Point query against some terrain representation
pub trait TerrainClassifier: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Exactly one category per point
    fn classify(&self, x: f32, z: f32) -> TerrainSample;

    /// Ground height at (x, z)
    fn elevation(&self, x: f32, z: f32) -> f32 {
        self.classify(x, z).elevation
    }

    /// Whether the backing data is usable
    fn is_ready(&self) -> bool {
        true
    }
}

/// Fairway within a band around the center line, rough elsewhere, OB outside the world
#[derive(Debug, Clone, Copy)]
pub struct CentralBand {
    pub half_width: f32,
    pub bounds: WorldBounds,
}

impl CentralBand {
    pub fn new(half_width: f32, bounds: WorldBounds) -> Self {
        Self { half_width, bounds }
    }
}

impl TerrainClassifier for CentralBand {
    fn name(&self) -> &'static str {
        "central-band"
    }

    fn classify(&self, x: f32, z: f32) -> TerrainSample {
        let kind = if !self.bounds.contains(x, z) {
            TerrainKind::Ob
        } else if x.abs() < self.half_width {
            TerrainKind::Fairway
        } else {
            TerrainKind::Rough
        };
        TerrainSample::of(kind, 0.0)
    }
}

/// Ordered fallback over classifiers; the first ready link answers
pub struct ClassifierChain {
    links: Vec<Box<dyn TerrainClassifier>>,
    fallback: CentralBand,
}

impl ClassifierChain {
    pub fn new(fallback: CentralBand) -> Self {
        Self {
            links: Vec::new(),
            fallback,
        }
    }

    /// Append a lower-priority link
    pub fn with(mut self, link: impl TerrainClassifier + 'static) -> Self {
        self.links.push(Box::new(link));
        self
    }

    /// Install a classifier ahead of every existing link.
    ///
    /// Returns false (and installs nothing) when the classifier is not ready.
    pub fn promote(&mut self, link: impl TerrainClassifier + 'static) -> bool {
        if !link.is_ready() {
            log::warn!("Terrain source '{}' has no usable data, keeping fallback", link.name());
            return false;
        }
        log::info!("Terrain source '{}' promoted to primary classifier", link.name());
        self.links.insert(0, Box::new(link));
        true
    }

    fn active(&self) -> &dyn TerrainClassifier {
        self.links
            .iter()
            .find(|link| link.is_ready())
            .map(|link| link.as_ref())
            .unwrap_or(&self.fallback)
    }

    /// Name of the classifier currently answering queries
    pub fn active_name(&self) -> &'static str {
        self.active().name()
    }
}

impl TerrainClassifier for ClassifierChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn classify(&self, x: f32, z: f32) -> TerrainSample {
        self.active().classify(x, z)
    }

    fn elevation(&self, x: f32, z: f32) -> f32 {
        self.active().elevation(x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NotReady;

    impl TerrainClassifier for NotReady {
        fn name(&self) -> &'static str {
            "not-ready"
        }
        fn classify(&self, _x: f32, _z: f32) -> TerrainSample {
            TerrainSample::of(TerrainKind::Bunker, 0.0)
        }
        fn is_ready(&self) -> bool {
            false
        }
    }

    fn band() -> CentralBand {
        CentralBand::new(30.0, WorldBounds::centered(800.0))
    }

    #[test]
    fn test_priority_order_is_declaration_order() {
        let mut sorted = TerrainKind::ALL;
        sorted.reverse();
        sorted.sort();
        assert_eq!(sorted, TerrainKind::ALL);
        assert!(TerrainKind::Ob < TerrainKind::Water);
        assert!(TerrainKind::Bunker < TerrainKind::Fairway);
        assert!(TerrainKind::Fairway < TerrainKind::Rough);
    }

    #[test]
    fn test_central_band() {
        let band = band();
        assert_eq!(band.classify(0.0, -100.0).kind, TerrainKind::Fairway);
        assert_eq!(band.classify(29.9, -100.0).kind, TerrainKind::Fairway);
        assert_eq!(band.classify(30.0, -100.0).kind, TerrainKind::Rough);
        assert_eq!(band.classify(-45.0, 10.0).kind, TerrainKind::Rough);
        assert_eq!(band.classify(0.0, -401.0).kind, TerrainKind::Ob);
    }

    #[test]
    fn test_world_edge_matches_raster_grid() {
        let band = band();
        for flip_depth in [false, true] {
            let config = crate::SimConfig {
                grid_resolution: 4,
                flip_depth,
                ..crate::SimConfig::default()
            };
            let raster =
                RasterTerrain::new(&config).with_mask(TerrainKind::Fairway, Grid::filled(4, 255));
            for (x, z) in [(-400.0, 0.0), (0.0, -400.0), (399.9, 399.9)] {
                assert_eq!(raster.classify(x, z).kind, TerrainKind::Fairway);
            }
            for (x, z) in [(400.0, 0.0), (0.0, 400.0), (-400.1, 0.0)] {
                assert_eq!(raster.classify(x, z).kind, TerrainKind::Ob);
            }
        }
        for (x, z) in [(-400.0, 0.0), (0.0, -400.0), (399.9, 399.9)] {
            assert_ne!(band.classify(x, z).kind, TerrainKind::Ob);
        }
        for (x, z) in [(400.0, 0.0), (0.0, 400.0), (-400.1, 0.0)] {
            assert_eq!(band.classify(x, z).kind, TerrainKind::Ob);
        }
    }

    #[test]
    fn test_bounds_intersection() {
        let wide = WorldBounds::new(Vec2::new(-1000.0, -50.0), Vec2::new(1000.0, 50.0));
        let overlap = wide.intersect(&WorldBounds::centered(800.0));
        assert_eq!(overlap, WorldBounds::new(Vec2::new(-400.0, -50.0), Vec2::new(400.0, 50.0)));
        let apart = WorldBounds::centered(2.0).intersect(&WorldBounds::new(
            Vec2::new(10.0, 10.0),
            Vec2::new(20.0, 20.0),
        ));
        assert!(!apart.contains(10.0, 10.0));
        assert!(!apart.contains(0.0, 0.0));
    }

    #[test]
    fn test_chain_skips_unready_links() {
        let chain = ClassifierChain::new(band()).with(NotReady);
        assert_eq!(chain.active_name(), "central-band");
        assert_eq!(chain.classify(0.0, 0.0).kind, TerrainKind::Fairway);
    }

    #[test]
    fn test_promote_takes_precedence() {
        let mut chain = ClassifierChain::new(band());
        let course = CourseLayout::default_course();
        assert!(chain.promote(course));
        assert_eq!(chain.active_name(), "course");
        assert!(!chain.promote(NotReady));
        assert_eq!(chain.active_name(), "course");
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&TerrainKind::WaterLateral).expect("serialize");
        assert_eq!(json, "\"WATER_LATERAL\"");
        let kind: TerrainKind = serde_json::from_str("\"OB\"").expect("deserialize");
        assert_eq!(kind, TerrainKind::Ob);
    }
}
