use engine::{Canvas, SpriteRect, TileGrid};

use super::movable::Vec2;

/// Half of the 412x360 playfield left of the HUD panel.
pub(crate) const PLAYFIELD_HALF_WIDTH: i32 = 206;
pub(crate) const PLAYFIELD_HALF_HEIGHT: i32 = 180;

/// Rounds a world coordinate to the nearest pixel, truncating `v + 0.5`.
pub(crate) fn round_px(value: f32) -> i32 {
    (value + 0.5) as i32
}

/// World pixel shown at the top-left corner of the playfield.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Camera {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl Camera {
    pub(crate) fn follow(target: Vec2) -> Self {
        Self {
            x: round_px(target.x) - PLAYFIELD_HALF_WIDTH,
            y: round_px(target.y) - PLAYFIELD_HALF_HEIGHT,
        }
    }

    /// First visible cell. Floors, so a camera left of or above the grid
    /// yields negative cells.
    pub(crate) fn coarse(&self, tile_size: u32) -> (i32, i32) {
        let size = tile_size as i32;
        (self.x.div_euclid(size), self.y.div_euclid(size))
    }

    /// Sub-tile offset in `0..tile_size` by which the first cell is scrolled
    /// off the top-left corner.
    pub(crate) fn fine(&self, tile_size: u32) -> (i32, i32) {
        let size = tile_size as i32;
        (self.x.rem_euclid(size), self.y.rem_euclid(size))
    }

    pub(crate) fn to_screen(&self, position: Vec2) -> (i32, i32) {
        (round_px(position.x) - self.x, round_px(position.y) - self.y)
    }
}

/// Draws the visible part of the grid starting at the camera's coarse cell,
/// stopping once a row or column starts past the canvas edge.
pub(crate) fn draw_tiles(canvas: &mut dyn Canvas, grid: &TileGrid, camera: Camera) {
    let tile_size = grid.tile_size();
    let step = tile_size as i32;
    let (first_x, first_y) = camera.coarse(tile_size);
    let (fine_x, fine_y) = camera.fine(tile_size);
    let screen_width = canvas.width() as i32;
    let screen_height = canvas.height() as i32;
    let sheet = grid.tilesheet();

    let mut sy = -fine_y;
    for y in first_y..grid.height() as i32 {
        let mut sx = -fine_x;
        for x in first_x..grid.width() as i32 {
            let info = grid
                .tile_at(x, y)
                .filter(|tile| *tile != 0)
                .and_then(|tile| grid.draw_info(tile));
            if let Some(info) = info {
                let src = SpriteRect::new(info.sheet_x, info.sheet_y, tile_size, tile_size);
                if info.has_alpha {
                    canvas.blend_partial_sprite(sx, sy, sheet, src, 255);
                } else {
                    canvas.draw_partial_sprite(sx, sy, sheet, src);
                }
            }

            sx += step;
            if sx >= screen_width {
                break;
            }
        }

        sy += step;
        if sy >= screen_height {
            break;
        }
    }
}
