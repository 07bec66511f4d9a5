use engine::{Canvas, Sprite, SpriteRect};

/// A draw call as seen by [`RecordingCanvas`]. Sprites are identified by
/// their top-left pixel, so tests give each sprite a distinct solid color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DrawCall {
    Clear([u8; 4]),
    Draw {
        x: i32,
        y: i32,
        tag: [u8; 4],
        src: SpriteRect,
    },
    Blend {
        x: i32,
        y: i32,
        tag: [u8; 4],
        src: SpriteRect,
        alpha: u8,
    },
}

pub(crate) struct RecordingCanvas {
    width: u32,
    height: u32,
    pub(crate) calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    pub(crate) fn calls_tagged(&self, tag: [u8; 4]) -> Vec<DrawCall> {
        self.calls
            .iter()
            .copied()
            .filter(|call| match call {
                DrawCall::Clear(_) => false,
                DrawCall::Draw { tag: t, .. } | DrawCall::Blend { tag: t, .. } => *t == tag,
            })
            .collect()
    }
}

fn tag_of(sprite: &Sprite) -> [u8; 4] {
    sprite.pixel(0, 0).unwrap_or([0, 0, 0, 0])
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: [u8; 4]) {
        self.calls.push(DrawCall::Clear(color));
    }

    fn draw_sprite(&mut self, x: i32, y: i32, sprite: &Sprite) {
        self.draw_partial_sprite(x, y, sprite, SpriteRect::full(sprite));
    }

    fn draw_partial_sprite(&mut self, x: i32, y: i32, sprite: &Sprite, src: SpriteRect) {
        self.calls.push(DrawCall::Draw {
            x,
            y,
            tag: tag_of(sprite),
            src,
        });
    }

    fn blend_sprite(&mut self, x: i32, y: i32, sprite: &Sprite, alpha: u8) {
        self.blend_partial_sprite(x, y, sprite, SpriteRect::full(sprite), alpha);
    }

    fn blend_partial_sprite(
        &mut self,
        x: i32,
        y: i32,
        sprite: &Sprite,
        src: SpriteRect,
        alpha: u8,
    ) {
        self.calls.push(DrawCall::Blend {
            x,
            y,
            tag: tag_of(sprite),
            src,
            alpha,
        });
    }
}
