mod canvas;
mod renderer;

pub use canvas::{Canvas, FrameBuffer, SpriteRect};
pub use renderer::{Renderer, Viewport};
