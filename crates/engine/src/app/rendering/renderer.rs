use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use winit::window::Window;

use super::FrameBuffer;

/// Logical frame size in buffer pixels. The window surface is an integer
/// multiple of this and `pixels` scales the buffer up on present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn scaled(&self, scale: u32) -> (u32, u32) {
        (
            self.width.saturating_mul(scale.max(1)),
            self.height.saturating_mul(scale.max(1)),
        )
    }
}

pub struct Renderer {
    pixels: Pixels<'static>,
    viewport: Viewport,
    surface_visible: bool,
}

impl Renderer {
    pub fn new(window: Arc<Window>, viewport: Viewport) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, window);
        let pixels = Pixels::new(viewport.width, viewport.height, surface)?;
        Ok(Self {
            pixels,
            viewport,
            surface_visible: size.width > 0 && size.height > 0,
        })
    }

    /// Resizes the presentation surface only. The logical frame keeps its
    /// size, so scene coordinates never depend on the window.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            self.surface_visible = false;
            return Ok(());
        }
        self.pixels.resize_surface(width, height)?;
        self.surface_visible = true;
        Ok(())
    }

    pub fn frame(&mut self) -> FrameBuffer<'_> {
        let Viewport { width, height } = self.viewport;
        FrameBuffer::new(self.pixels.frame_mut(), width, height)
    }

    pub fn present(&mut self) -> Result<(), Error> {
        if !self.surface_visible {
            return Ok(());
        }
        self.pixels.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_scales_by_integer_factor() {
        let viewport = Viewport::new(640, 360);
        assert_eq!(viewport.scaled(2), (1280, 720));
        assert_eq!(viewport.scaled(0), (640, 360));
    }
}
