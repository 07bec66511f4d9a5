use thiserror::Error;

use crate::assets::Sprite;

/// Side-table entry for a nonzero tile index. Tile `n` uses entry `n - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileInfo {
    pub sheet_x: u32,
    pub sheet_y: u32,
    pub has_alpha: bool,
    pub walkable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileDrawInfo {
    pub sheet_x: u32,
    pub sheet_y: u32,
    pub has_alpha: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileGridError {
    #[error("tile size must be > 0")]
    ZeroTileSize,
    #[error("grid dimensions must be > 0, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("tile index {tile} at ({x}, {y}) has no side-table entry ({entries} entries)")]
    MissingTileInfo {
        tile: u16,
        x: u32,
        y: u32,
        entries: usize,
    },
    #[error(
        "tile info {index} sheet offset ({sheet_x}, {sheet_y}) does not fit a {tile_size}px tile \
in the {sheet_width}x{sheet_height} tilesheet"
    )]
    SheetOffsetOutOfBounds {
        index: usize,
        sheet_x: u32,
        sheet_y: u32,
        tile_size: u32,
        sheet_width: u32,
        sheet_height: u32,
    },
}

/// Immutable tile grid: row-major tile indices (0 = empty), the per-index
/// side table and the tilesheet the side table points into.
///
/// Construction validates everything up front, so a `TileGrid` that exists
/// can be queried without further checks.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    tile_size: u32,
    width: u32,
    height: u32,
    tiles: Vec<u16>,
    tile_info: Vec<TileInfo>,
    tilesheet: Sprite,
}

impl TileGrid {
    pub fn new(
        tile_size: u32,
        width: u32,
        height: u32,
        tiles: Vec<u16>,
        tile_info: Vec<TileInfo>,
        tilesheet: Sprite,
    ) -> Result<Self, TileGridError> {
        if tile_size == 0 {
            return Err(TileGridError::ZeroTileSize);
        }
        if width == 0 || height == 0 {
            return Err(TileGridError::ZeroDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        if tiles.len() != expected {
            return Err(TileGridError::TileCountMismatch {
                expected,
                actual: tiles.len(),
            });
        }
        for (index, info) in tile_info.iter().enumerate() {
            let fits_x = info.sheet_x.saturating_add(tile_size) <= tilesheet.width();
            let fits_y = info.sheet_y.saturating_add(tile_size) <= tilesheet.height();
            if !fits_x || !fits_y {
                return Err(TileGridError::SheetOffsetOutOfBounds {
                    index,
                    sheet_x: info.sheet_x,
                    sheet_y: info.sheet_y,
                    tile_size,
                    sheet_width: tilesheet.width(),
                    sheet_height: tilesheet.height(),
                });
            }
        }
        for (offset, &tile) in tiles.iter().enumerate() {
            if tile != 0 && tile as usize > tile_info.len() {
                return Err(TileGridError::MissingTileInfo {
                    tile,
                    x: (offset % width as usize) as u32,
                    y: (offset / width as usize) as u32,
                    entries: tile_info.len(),
                });
            }
        }

        Ok(Self {
            tile_size,
            width,
            height,
            tiles,
            tile_info,
            tilesheet,
        })
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tilesheet(&self) -> &Sprite {
        &self.tilesheet
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<u16> {
        if !self.contains(x, y) {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.tiles.get(index).copied()
    }

    /// Out-of-range cells are never walkable. Empty cells (index 0) take no
    /// part in collision and are walkable.
    pub fn walkable(&self, x: i32, y: i32) -> bool {
        match self.tile_at(x, y) {
            None => false,
            Some(0) => true,
            Some(tile) => self.info(tile).map(|info| info.walkable).unwrap_or(false),
        }
    }

    pub fn draw_info(&self, tile: u16) -> Option<TileDrawInfo> {
        self.info(tile).map(|info| TileDrawInfo {
            sheet_x: info.sheet_x,
            sheet_y: info.sheet_y,
            has_alpha: info.has_alpha,
        })
    }

    /// Cell coordinate containing world pixel `px`. Floors toward negative
    /// infinity so that `-0.5` lands in cell `-1`, not cell `0`.
    pub fn world_to_cell(&self, px: f32) -> i32 {
        (px.floor() as i32).div_euclid(self.tile_size as i32)
    }

    /// True when every cell touched by the world-space box is inside the grid
    /// and walkable.
    pub fn is_area_walkable(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> bool {
        let sx = self.world_to_cell(min_x);
        let sy = self.world_to_cell(min_y);
        let ex = self.world_to_cell(max_x);
        let ey = self.world_to_cell(max_y);

        if sx < 0 || sy < 0 || ex >= self.width as i32 || ey >= self.height as i32 {
            return false;
        }

        (sx..=ex).all(|x| (sy..=ey).all(|y| self.walkable(x, y)))
    }

    fn info(&self, tile: u16) -> Option<&TileInfo> {
        let index = (tile as usize).checked_sub(1)?;
        self.tile_info.get(index)
    }
}
