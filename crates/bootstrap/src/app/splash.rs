use engine::{AppContext, Canvas, FrameContext, InputAction, Scene, SceneError, SceneKey, Sprite};
use tracing::info;

const SPLASH_KEY: &str = "gui/splash";
const SPLASH_SECONDS: f32 = 2.0;
const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// Title card shown once before gameplay.
pub(crate) struct SplashScene {
    image: Option<Sprite>,
    elapsed: f32,
    done: bool,
}

impl SplashScene {
    pub(crate) fn new() -> Self {
        Self {
            image: None,
            elapsed: 0.0,
            done: false,
        }
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.clear(BACKGROUND);
        if let Some(image) = self.image.as_ref() {
            let x = (canvas.width() as i32 - image.width() as i32) / 2;
            let y = (canvas.height() as i32 - image.height() as i32) / 2;
            canvas.draw_sprite(x, y, image);
        }
    }
}

impl Scene for SplashScene {
    fn init(&mut self, context: &AppContext) -> Result<(), SceneError> {
        self.image = Some(context.assets().load_sprite(SPLASH_KEY)?);
        Ok(())
    }

    fn destroy(&mut self) {
        self.image = None;
    }

    fn enter(&mut self) -> Result<(), SceneError> {
        self.elapsed = 0.0;
        self.done = false;
        Ok(())
    }

    fn exit(&mut self) {}

    fn update(&mut self, delta_seconds: f32, frame: &mut FrameContext<'_>) -> bool {
        self.elapsed += delta_seconds;
        let skipped = frame.input().is_pressed(InputAction::Fire);
        if !self.done && (skipped || self.elapsed >= SPLASH_SECONDS) {
            self.done = true;
            info!(elapsed = self.elapsed, skipped, "splash_finished");
            frame.request_scene(SceneKey::Gameplay);
        }

        self.draw(frame.canvas());
        true
    }
}
