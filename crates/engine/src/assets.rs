//! Asset loading: PNG sprites and JSON tile-grid maps, addressed by
//! extension-less keys relative to the asset root.
//!
//! Every loader either returns a fully validated value or an error; callers
//! never observe a partially populated sprite or grid.

use std::fs;
use std::io;
use std::path::PathBuf;

use image::ImageReader;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::app::{TileGrid, TileGridError, TileInfo};
use crate::asset_keys::{validate_asset_key, AssetKeyError};

pub const MAP_FORMAT_VERSION: &str = "0.1";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid asset key '{key}': {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: AssetKeyError,
    },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to parse map {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("map {path} has unsupported version '{version}'")]
    UnsupportedMapVersion { path: PathBuf, version: String },
    #[error("map {path} is invalid: {source}")]
    InvalidTileGrid {
        path: PathBuf,
        #[source]
        source: TileGridError,
    },
    #[error("sprite buffer for {width}x{height} must be {expected} bytes, got {actual}")]
    SpriteBufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Decoded RGBA8 image, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Sprite {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(AssetError::SpriteBufferSize {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(out)
    }
}

#[derive(Debug, Deserialize)]
struct MapFile {
    version: String,
    tile_size: u32,
    width: u32,
    height: u32,
    tilesheet: String,
    tile_info: Vec<MapTileInfo>,
    tiles: Vec<u16>,
}

#[derive(Debug, Deserialize)]
struct MapTileInfo {
    sheet_x: u32,
    sheet_y: u32,
    #[serde(default)]
    has_alpha: bool,
    #[serde(default = "default_walkable")]
    walkable: bool,
}

const fn default_walkable() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct AssetLoader {
    root: PathBuf,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn load_sprite(&self, key: &str) -> Result<Sprite, AssetError> {
        let path = self.resolve(key, "png")?;
        let reader = ImageReader::open(&path).map_err(|source| AssetError::Read {
            path: path.clone(),
            source,
        })?;
        let decoded = reader.decode().map_err(|source| AssetError::Decode {
            path: path.clone(),
            source,
        })?;
        let image = decoded.to_rgba8();
        debug!(
            key,
            width = image.width(),
            height = image.height(),
            "sprite_loaded"
        );
        Sprite::from_rgba(image.width(), image.height(), image.into_raw())
    }

    pub fn load_tile_grid(&self, key: &str) -> Result<TileGrid, AssetError> {
        let path = self.resolve(key, "json")?;
        let raw = fs::read_to_string(&path).map_err(|source| AssetError::Read {
            path: path.clone(),
            source,
        })?;
        let map: MapFile = serde_json::from_str(&raw).map_err(|source| AssetError::Parse {
            path: path.clone(),
            source,
        })?;
        if map.version != MAP_FORMAT_VERSION {
            return Err(AssetError::UnsupportedMapVersion {
                path,
                version: map.version,
            });
        }

        let tilesheet = self.load_sprite(&map.tilesheet)?;
        let tile_info = map
            .tile_info
            .iter()
            .map(|info| TileInfo {
                sheet_x: info.sheet_x,
                sheet_y: info.sheet_y,
                has_alpha: info.has_alpha,
                walkable: info.walkable,
            })
            .collect();
        let grid = TileGrid::new(
            map.tile_size,
            map.width,
            map.height,
            map.tiles,
            tile_info,
            tilesheet,
        )
        .map_err(|source| AssetError::InvalidTileGrid {
            path: path.clone(),
            source,
        })?;
        debug!(
            key,
            width = grid.width(),
            height = grid.height(),
            tile_size = grid.tile_size(),
            "tile_grid_loaded"
        );
        Ok(grid)
    }

    fn resolve(&self, key: &str, extension: &str) -> Result<PathBuf, AssetError> {
        validate_asset_key(key).map_err(|source| AssetError::InvalidKey {
            key: key.to_string(),
            source,
        })?;
        Ok(self.root.join(format!("{key}.{extension}")))
    }
}
