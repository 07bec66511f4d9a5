use crate::assets::Sprite;

/// Source rectangle inside a sprite, in sprite pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SpriteRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full(sprite: &Sprite) -> Self {
        Self::new(0, 0, sprite.width(), sprite.height())
    }
}

/// Axis-aligned blit primitives a scene draws with. Destination coordinates
/// are the top-left corner in frame pixels and may lie partly or fully
/// outside the frame.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn clear(&mut self, color: [u8; 4]);
    fn draw_sprite(&mut self, x: i32, y: i32, sprite: &Sprite);
    fn draw_partial_sprite(&mut self, x: i32, y: i32, sprite: &Sprite, src: SpriteRect);
    fn blend_sprite(&mut self, x: i32, y: i32, sprite: &Sprite, alpha: u8);
    fn blend_partial_sprite(&mut self, x: i32, y: i32, sprite: &Sprite, src: SpriteRect, alpha: u8);
}

#[derive(Debug, Clone, Copy)]
enum BlitMode {
    Opaque,
    Blend(u8),
}

/// `Canvas` over a borrowed RGBA8 frame.
pub struct FrameBuffer<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameBuffer<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        let max_rows = if width == 0 {
            0
        } else {
            (frame.len() / (width as usize * 4)) as u32
        };
        Self {
            frame,
            width,
            height: height.min(max_rows),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.frame[offset..offset + 4]);
        Some(out)
    }

    fn blit(&mut self, x: i32, y: i32, sprite: &Sprite, src: SpriteRect, mode: BlitMode) {
        if let BlitMode::Blend(0) = mode {
            return;
        }
        let src_w = src.width.min(sprite.width().saturating_sub(src.x)) as i32;
        let src_h = src.height.min(sprite.height().saturating_sub(src.y)) as i32;
        if src_w <= 0 || src_h <= 0 || self.width == 0 || self.height == 0 {
            return;
        }

        let draw_left = x.max(0);
        let draw_top = y.max(0);
        let draw_right = x.saturating_add(src_w).min(self.width as i32);
        let draw_bottom = y.saturating_add(src_h).min(self.height as i32);
        if draw_left >= draw_right || draw_top >= draw_bottom {
            return;
        }

        let frame_width = self.width as usize;
        let sprite_width = sprite.width() as usize;
        let rgba = sprite.rgba();

        for out_y in draw_top..draw_bottom {
            let src_y = src.y as usize + (out_y - y) as usize;
            let src_row_offset = src_y * sprite_width * 4;
            let dst_row_offset = out_y as usize * frame_width * 4;

            for out_x in draw_left..draw_right {
                let src_x = src.x as usize + (out_x - x) as usize;
                let src_offset = src_row_offset + src_x * 4;
                let src_alpha = rgba[src_offset + 3];
                if src_alpha == 0 {
                    continue;
                }
                let dst_offset = dst_row_offset + out_x as usize * 4;
                let dst = &mut self.frame[dst_offset..dst_offset + 4];
                match mode {
                    BlitMode::Opaque => {
                        dst[..3].copy_from_slice(&rgba[src_offset..src_offset + 3]);
                        dst[3] = 255;
                    }
                    BlitMode::Blend(alpha) => {
                        let a = src_alpha as u32 * alpha as u32 / 255;
                        for channel in 0..3 {
                            dst[channel] = mix(rgba[src_offset + channel], dst[channel], a);
                        }
                        dst[3] = 255;
                    }
                }
            }
        }
    }
}

fn mix(src: u8, dst: u8, alpha: u32) -> u8 {
    ((src as u32 * alpha + dst as u32 * (255 - alpha) + 127) / 255) as u8
}

impl Canvas for FrameBuffer<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: [u8; 4]) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    fn draw_sprite(&mut self, x: i32, y: i32, sprite: &Sprite) {
        self.blit(x, y, sprite, SpriteRect::full(sprite), BlitMode::Opaque);
    }

    fn draw_partial_sprite(&mut self, x: i32, y: i32, sprite: &Sprite, src: SpriteRect) {
        self.blit(x, y, sprite, src, BlitMode::Opaque);
    }

    fn blend_sprite(&mut self, x: i32, y: i32, sprite: &Sprite, alpha: u8) {
        let src = SpriteRect::full(sprite);
        self.blit(x, y, sprite, src, BlitMode::Blend(alpha));
    }

    fn blend_partial_sprite(
        &mut self,
        x: i32,
        y: i32,
        sprite: &Sprite,
        src: SpriteRect,
        alpha: u8,
    ) {
        self.blit(x, y, sprite, src, BlitMode::Blend(alpha));
    }
}
