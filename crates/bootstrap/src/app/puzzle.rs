use engine::{AppContext, Canvas, FrameContext, InputAction, Scene, SceneError, SceneKey, Sprite};
use tracing::debug;

const BOARD_KEY: &str = "puzzle/board";
const BACKGROUND: [u8; 4] = [0x1F, 0x1D, 0x2C, 0xFF];

/// Puzzle board view. Tab goes back to gameplay.
pub(crate) struct PuzzleScene {
    board: Option<Sprite>,
}

impl PuzzleScene {
    pub(crate) fn new() -> Self {
        Self { board: None }
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.clear(BACKGROUND);
        if let Some(board) = self.board.as_ref() {
            let x = (canvas.width() as i32 - board.width() as i32) / 2;
            let y = (canvas.height() as i32 - board.height() as i32) / 2;
            canvas.draw_sprite(x, y, board);
        }
    }
}

impl Scene for PuzzleScene {
    fn init(&mut self, context: &AppContext) -> Result<(), SceneError> {
        let board = context.assets().load_sprite(BOARD_KEY)?;
        debug!(
            width = board.width(),
            height = board.height(),
            "puzzle_board_loaded"
        );
        self.board = Some(board);
        Ok(())
    }

    fn destroy(&mut self) {
        self.board = None;
    }

    fn enter(&mut self) -> Result<(), SceneError> {
        if self.board.is_none() {
            return Err(SceneError::Enter {
                reason: "puzzle board is not loaded".to_string(),
            });
        }
        Ok(())
    }

    fn exit(&mut self) {}

    fn update(&mut self, _delta_seconds: f32, frame: &mut FrameContext<'_>) -> bool {
        if frame.input().is_pressed(InputAction::SwitchScene) {
            frame.request_scene(SceneKey::Gameplay);
        }
        self.draw(frame.canvas());
        true
    }
}

#[cfg(test)]
mod tests {
    use engine::{AssetLoader, InputSnapshot};

    use super::*;
    use crate::app::test_support::{DrawCall, RecordingCanvas};

    const BOARD_TAG: [u8; 4] = [90, 60, 30, 255];

    fn tick(scene: &mut PuzzleScene, input: &InputSnapshot) -> (RecordingCanvas, Option<SceneKey>) {
        let mut canvas = RecordingCanvas::new(640, 360);
        let requested = {
            let mut frame = FrameContext::new(input, &mut canvas);
            assert!(scene.update(0.016, &mut frame));
            frame.requested_scene()
        };
        (canvas, requested)
    }

    #[test]
    fn init_fails_when_board_asset_is_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let context = AppContext::new(AssetLoader::new(dir.path()));
        let mut scene = PuzzleScene::new();
        assert!(matches!(scene.init(&context), Err(SceneError::Asset(_))));
        assert!(scene.enter().is_err());
    }

    #[test]
    fn draws_board_and_returns_to_gameplay_on_switch() {
        let mut scene = PuzzleScene {
            board: Some(Sprite::solid(320, 320, BOARD_TAG)),
        };
        scene.enter().expect("enter should succeed");

        let (canvas, requested) = tick(&mut scene, &InputSnapshot::empty());
        assert_eq!(requested, None);
        assert_eq!(canvas.calls.len(), 2);
        assert!(matches!(
            canvas.calls[1],
            DrawCall::Draw {
                x: 160,
                y: 20,
                tag: BOARD_TAG,
                ..
            }
        ));

        let tab = InputSnapshot::empty().with_action_pressed(InputAction::SwitchScene, true);
        let (_, requested) = tick(&mut scene, &tab);
        assert_eq!(requested, Some(SceneKey::Gameplay));
    }
}
