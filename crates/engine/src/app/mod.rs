mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;
mod tilemap;

pub use input::{InputAction, KeyState};
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use rendering::{Canvas, FrameBuffer, Renderer, SpriteRect, Viewport};
pub use scene::{
    AppContext, FrameContext, InputSnapshot, Scene, SceneError, SceneFactory, SceneKey,
    SceneManager,
};
pub use tilemap::{TileDrawInfo, TileGrid, TileGridError, TileInfo};
