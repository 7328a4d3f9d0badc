//! Ground interaction coefficients per terrain category

use serde::{Deserialize, Serialize};

use super::TerrainKind;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub friction: f32,
    pub restitution: f32,
    pub damping_factor: f32,
}

const FAIRWAY: Coefficients = Coefficients {
    friction: 0.4,
    restitution: 0.25,
    damping_factor: 1.0,
};

/// Table lookup. Pure: same category, same answer.
pub const fn coefficients(kind: TerrainKind) -> Coefficients {
    match kind {
        TerrainKind::Fairway | TerrainKind::Tee => FAIRWAY,
        TerrainKind::Rough => Coefficients {
            friction: 0.9,
            restitution: 0.1,
            damping_factor: 1.0,
        },
        TerrainKind::Green => Coefficients {
            friction: 0.15,
            restitution: 0.1,
            damping_factor: 1.0,
        },
        // Sand: the ball plugs
        TerrainKind::Bunker => Coefficients {
            friction: 3.0,
            restitution: 0.0,
            damping_factor: 0.92,
        },
        TerrainKind::Water | TerrainKind::WaterLateral => Coefficients {
            friction: 0.0,
            restitution: 0.0,
            damping_factor: 0.5,
        },
        TerrainKind::Ob => Coefficients {
            friction: 0.5,
            restitution: 0.5,
            damping_factor: 1.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_every_category_defined() {
        for kind in TerrainKind::ALL {
            let c = coefficients(kind);
            assert!(c.friction >= 0.0);
            assert!((0.0..=1.0).contains(&c.restitution));
            assert!(c.damping_factor > 0.0 && c.damping_factor <= 1.0);
        }
    }

    #[test]
    fn test_tee_plays_like_fairway() {
        assert_eq!(coefficients(TerrainKind::Tee), coefficients(TerrainKind::Fairway));
    }

    #[test]
    fn test_hazards_slow_harder_than_grass() {
        let sand = coefficients(TerrainKind::Bunker);
        let grass = coefficients(TerrainKind::Fairway);
        assert!(sand.friction > grass.friction);
        assert!(sand.damping_factor < grass.damping_factor);
        assert_eq!(coefficients(TerrainKind::Water).damping_factor, 0.5);
    }

    proptest! {
        #[test]
        fn prop_lookup_is_pure(idx in 0usize..TerrainKind::ALL.len()) {
            let kind = TerrainKind::ALL[idx];
            prop_assert_eq!(coefficients(kind), coefficients(kind));
        }
    }
}
