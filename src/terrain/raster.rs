//! Raster terrain: heightmap plus one occupancy mask per category
//!
//! World (x, z) maps onto a square grid through a fixed world-to-grid ratio.
//! The heightmap and every mask share that mapping, including the optional
//! depth-axis flip. Anything off the grid is OB.

use std::collections::BTreeMap;

use super::{TerrainClassifier, TerrainKind, TerrainSample, WorldBounds};
use crate::settings::SimConfig;

/// Square 8-bit grid, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    size: u32,
    data: Vec<u8>,
}

impl Grid {
    /// Returns None unless `data` holds exactly `size * size` values
    pub fn new(size: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == (size as usize) * (size as usize)).then_some(Self { size, data })
    }

    pub fn filled(size: u32, value: u8) -> Self {
        Self {
            size,
            data: vec![value; (size as usize) * (size as usize)],
        }
    }

    pub fn from_fn(size: u32, mut f: impl FnMut(u32, u32) -> u8) -> Self {
        let mut data = Vec::with_capacity((size as usize) * (size as usize));
        for py in 0..size {
            for px in 0..size {
                data.push(f(px, py));
            }
        }
        Self { size, data }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn value(&self, px: u32, py: u32) -> Option<u8> {
        if px >= self.size || py >= self.size {
            return None;
        }
        self.data.get((py * self.size + px) as usize).copied()
    }
}

/// Raster classifier
#[derive(Debug, Clone)]
pub struct RasterTerrain {
    world_size: f32,
    resolution: u32,
    threshold: u8,
    elevation_min: f32,
    elevation_max: f32,
    flip_depth: bool,
    heightmap: Option<Grid>,
    /// Keyed by kind so iteration follows classification priority
    masks: BTreeMap<TerrainKind, Grid>,
}

impl RasterTerrain {
    /// Empty raster (no heightmap, no masks) using the config's mapping
    pub fn new(config: &SimConfig) -> Self {
        Self {
            world_size: config.world_size,
            resolution: config.grid_resolution,
            threshold: config.occupancy_threshold,
            elevation_min: config.elevation_min,
            elevation_max: config.elevation_max,
            flip_depth: config.flip_depth,
            heightmap: None,
            masks: BTreeMap::new(),
        }
    }

    pub fn with_heightmap(mut self, grid: Grid) -> Self {
        self.heightmap = Some(grid);
        self
    }

    pub fn with_mask(mut self, kind: TerrainKind, grid: Grid) -> Self {
        self.masks.insert(kind, grid);
        self
    }

    pub fn set_heightmap(&mut self, grid: Option<Grid>) {
        self.heightmap = grid;
    }

    /// Install or clear one category mask
    pub fn set_mask(&mut self, kind: TerrainKind, grid: Option<Grid>) {
        match grid {
            Some(grid) => {
                self.masks.insert(kind, grid);
            }
            None => {
                self.masks.remove(&kind);
            }
        }
    }

    /// Categories with mask data
    pub fn loaded_masks(&self) -> impl Iterator<Item = TerrainKind> + '_ {
        self.masks.keys().copied()
    }

    pub fn has_heightmap(&self) -> bool {
        self.heightmap.is_some()
    }

    /// Map world (x, z) to grid pixel; None when off the grid.
    ///
    /// The grid covers the same half-open square as [`WorldBounds::centered`],
    /// whichever way the depth axis runs.
    pub fn world_to_pixel(&self, x: f32, z: f32) -> Option<(u32, u32)> {
        if self.resolution == 0 || !WorldBounds::centered(self.world_size).contains(x, z) {
            return None;
        }
        let half = self.world_size / 2.0;
        let u = (x + half) / self.world_size;
        let mut v = (z + half) / self.world_size;
        if self.flip_depth {
            v = 1.0 - v;
        }
        let last = (self.resolution - 1) as f32;
        let px = (u * self.resolution as f32).floor().clamp(0.0, last);
        let py = (v * self.resolution as f32).floor().clamp(0.0, last);
        Some((px as u32, py as u32))
    }

    fn height_at(&self, pixel: Option<(u32, u32)>) -> f32 {
        let Some((px, py)) = pixel else {
            return 0.0;
        };
        match self.heightmap.as_ref().and_then(|h| h.value(px, py)) {
            Some(raw) => {
                self.elevation_min + (raw as f32 / 255.0) * (self.elevation_max - self.elevation_min)
            }
            None => 0.0,
        }
    }
}

impl TerrainClassifier for RasterTerrain {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn classify(&self, x: f32, z: f32) -> TerrainSample {
        let Some((px, py)) = self.world_to_pixel(x, z) else {
            return TerrainSample::of(TerrainKind::Ob, 0.0);
        };
        let kind = self
            .masks
            .iter()
            .find(|(_, mask)| mask.value(px, py).is_some_and(|v| v > self.threshold))
            .map(|(kind, _)| *kind)
            .unwrap_or(TerrainKind::Rough);
        TerrainSample::of(kind, self.height_at(Some((px, py))))
    }

    fn elevation(&self, x: f32, z: f32) -> f32 {
        self.height_at(self.world_to_pixel(x, z))
    }

    fn is_ready(&self) -> bool {
        self.heightmap.is_some() || !self.masks.is_empty()
    }
}
