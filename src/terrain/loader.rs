//! Asynchronous raster asset loading
//!
//! Each image (heightmap and one mask per category) loads as its own task
//! under a timeout. A missing, slow or corrupt image never fails the load:
//! it is logged and that layer stays absent, so its category is never hot.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::imageops::FilterType;

use super::raster::{Grid, RasterTerrain};
use super::TerrainKind;
use crate::error::AssetError;
use crate::settings::SimConfig;

/// Location of the terrain images
#[derive(Debug, Clone)]
pub struct TerrainAssets {
    pub dir: PathBuf,
}

impl TerrainAssets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn heightmap_path(&self) -> PathBuf {
        self.dir.join("heightmap.png")
    }

    pub fn mask_path(&self, kind: TerrainKind) -> PathBuf {
        self.dir.join(format!("mask_{}.png", kind.mask_name()))
    }
}

/// Decode an image into a square grid of its red channel, resampled to `resolution`
fn decode_grid(bytes: &[u8], resolution: u32) -> Result<Grid, image::ImageError> {
    let rgba = image::load_from_memory(bytes)?
        .resize_exact(resolution, resolution, FilterType::Triangle)
        .to_rgba8();
    Ok(Grid::from_fn(resolution, |px, py| rgba.get_pixel(px, py)[0]))
}

async fn read_and_decode(path: PathBuf, resolution: u32) -> Result<Grid, AssetError> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| AssetError::Io {
            path: path.clone(),
            source,
        })?;
    let decode_path = path.clone();
    tokio::task::spawn_blocking(move || {
        decode_grid(&bytes, resolution).map_err(|source| AssetError::Decode {
            path: decode_path,
            source,
        })
    })
    .await
    .map_err(|source| AssetError::Join { path, source })?
}

async fn with_timeout<T>(
    path: &Path,
    limit: Duration,
    fut: impl Future<Output = Result<T, AssetError>>,
) -> Result<T, AssetError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| AssetError::Timeout {
            path: path.to_path_buf(),
            ms: limit.as_millis() as u64,
        })?
}

/// Load one grid; any failure resolves to None
pub async fn load_grid(path: PathBuf, resolution: u32, limit: Duration) -> Option<Grid> {
    match with_timeout(&path, limit, read_and_decode(path.clone(), resolution)).await {
        Ok(grid) => {
            log::debug!("Loaded terrain layer {}", path.display());
            Some(grid)
        }
        Err(e) => {
            log::warn!("Terrain layer unavailable, treating as absent: {e}");
            None
        }
    }
}

/// Load the heightmap and every category mask concurrently.
///
/// The result may be empty (`is_ready() == false`) when nothing loaded.
pub async fn load_raster(assets: TerrainAssets, config: SimConfig) -> RasterTerrain {
    let limit = Duration::from_millis(config.asset_timeout_ms);
    let resolution = config.grid_resolution;

    let heightmap = tokio::spawn(load_grid(assets.heightmap_path(), resolution, limit));
    let masks: Vec<_> = TerrainKind::ALL
        .iter()
        .map(|&kind| {
            let task = tokio::spawn(load_grid(assets.mask_path(kind), resolution, limit));
            (kind, task)
        })
        .collect();

    let mut raster = RasterTerrain::new(&config);
    match heightmap.await {
        Ok(grid) => raster.set_heightmap(grid),
        Err(e) => log::warn!("Heightmap task failed: {e}"),
    }
    for (kind, task) in masks {
        match task.await {
            Ok(grid) => raster.set_mask(kind, grid),
            Err(e) => log::warn!("Mask task for {kind:?} failed: {e}"),
        }
    }

    let loaded: Vec<_> = raster.loaded_masks().collect();
    log::info!(
        "Terrain raster loaded: heightmap={}, masks={:?}",
        raster.has_heightmap(),
        loaded
    );
    raster
}
