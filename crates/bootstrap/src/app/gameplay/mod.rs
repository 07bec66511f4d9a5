mod camera;
mod effect;
mod hud;
mod movable;

use engine::{
    AppContext, Canvas, FrameContext, InputAction, InputSnapshot, Scene, SceneError, SceneKey,
    Sprite, SpriteRect, TileGrid,
};
use tracing::{debug, info};

use camera::{draw_tiles, Camera};
use effect::NmiEffect;
use hud::{draw_hud, Registers};
use movable::{ActorSprite, Movable, Vec2};

const MAP_KEY: &str = "maps/main";
const DROID_KEY: &str = "sprites/droid";
const ILLEGAL_OPCODE_KEY: &str = "sprites/illegal_opcode";
const STATUS_PANEL_KEY: &str = "gui/status_panel";
const LEDS_KEY: &str = "gui/leds";
const NMI_DARK_KEY: &str = "fx/nmi_dark";
const NMI_SHOCK_KEY: &str = "fx/nmi_shock";

const CLEAR_COLOR: [u8; 4] = [0x1F, 0x1D, 0x2C, 0xFF];
const ACTOR_RADIUS: f32 = 11.0;
/// Spawn points in tile units, measured to the actor's center.
const PLAYER_SPAWN_TILES: (f32, f32) = (9.5, 8.5);
const FOE_SPAWN_TILES: (f32, f32) = (9.5, 28.5);

const PLAYER: usize = 0;
const FOE: usize = 1;

struct GameplayAssets {
    tiles: TileGrid,
    droid: Sprite,
    illegal_opcode: Sprite,
    status_panel: Sprite,
    leds: Sprite,
    nmi_dark: Sprite,
    nmi_shock: Sprite,
}

impl GameplayAssets {
    fn load(context: &AppContext) -> Result<Self, SceneError> {
        let assets = context.assets();
        Ok(Self {
            tiles: assets.load_tile_grid(MAP_KEY)?,
            droid: assets.load_sprite(DROID_KEY)?,
            illegal_opcode: assets.load_sprite(ILLEGAL_OPCODE_KEY)?,
            status_panel: assets.load_sprite(STATUS_PANEL_KEY)?,
            leds: assets.load_sprite(LEDS_KEY)?,
            nmi_dark: assets.load_sprite(NMI_DARK_KEY)?,
            nmi_shock: assets.load_sprite(NMI_SHOCK_KEY)?,
        })
    }

    fn sprite(&self, sprite: ActorSprite) -> &Sprite {
        match sprite {
            ActorSprite::Droid => &self.droid,
            ActorSprite::IllegalOpcode => &self.illegal_opcode,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct GameplayState {
    movables: Vec<Movable>,
    camera: Camera,
    registers: Option<Registers>,
    nmi: NmiEffect,
}

/// The droid roaming the tile map, chased by an illegal opcode, with the
/// CPU status panel on the right edge of the screen.
pub(crate) struct GameplayScene {
    assets: Option<GameplayAssets>,
    state: GameplayState,
}

impl GameplayScene {
    pub(crate) fn new() -> Self {
        Self {
            assets: None,
            state: GameplayState::default(),
        }
    }

    fn step(&mut self, delta_seconds: f32, input: &InputSnapshot) {
        let Some(assets) = self.assets.as_ref() else {
            return;
        };
        let state = &mut self.state;

        for movable in &mut state.movables {
            movable.apply_drag();
        }
        if let Some(player) = state.movables.get_mut(PLAYER) {
            player.steer(input);
        }
        for movable in &mut state.movables {
            movable.integrate(delta_seconds, &assets.tiles);
        }

        let Some(player_position) = state.movables.get(PLAYER).map(|p| p.position) else {
            return;
        };
        if let Some(foe) = state.movables.get_mut(FOE) {
            foe.face_towards(player_position.x);
        }

        let fire = input.key_state(InputAction::Fire);
        if state.nmi.update(delta_seconds, fire.pressed) {
            debug!(latch = state.nmi.latch(), "nmi_triggered");
        }

        state.camera = Camera::follow(player_position);
        if let Some(registers) = state.registers.as_mut() {
            registers.track_camera(state.camera);
        }
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.clear(CLEAR_COLOR);
        let Some(assets) = self.assets.as_ref() else {
            return;
        };
        let state = &self.state;

        draw_tiles(canvas, &assets.tiles, state.camera);

        if let Some(player) = state.movables.get(PLAYER) {
            let (sx, sy) = state.camera.to_screen(player.position);
            let alphas = state.nmi.alphas();
            if alphas.dark > 0 {
                blend_centered(canvas, &assets.nmi_dark, sx, sy, alphas.dark);
            }
            if alphas.zap > 0 {
                blend_centered(canvas, &assets.nmi_shock, sx, sy, alphas.zap);
            }
        }

        for movable in &state.movables {
            draw_movable(canvas, assets.sprite(movable.sprite), movable, state.camera);
        }

        if let Some(registers) = state.registers.as_ref() {
            draw_hud(canvas, &assets.status_panel, &assets.leds, registers);
        }
    }
}

fn blend_centered(canvas: &mut dyn Canvas, sprite: &Sprite, x: i32, y: i32, alpha: u8) {
    let left = x - (sprite.width() / 2) as i32;
    let top = y - (sprite.height() / 2) as i32;
    canvas.blend_sprite(left, top, sprite, alpha);
}

/// Sprite sheets are a row of square frames as tall as the sheet.
fn draw_movable(canvas: &mut dyn Canvas, sheet: &Sprite, movable: &Movable, camera: Camera) {
    let size = sheet.height();
    let half = (size / 2) as i32;
    let (sx, sy) = camera.to_screen(movable.position);
    let src = SpriteRect::new(movable.frame * size, 0, size, size);
    canvas.blend_partial_sprite(sx - half, sy - half, sheet, src, 255);
}

impl Scene for GameplayScene {
    fn init(&mut self, context: &AppContext) -> Result<(), SceneError> {
        let assets = GameplayAssets::load(context)?;
        info!(
            map_width = assets.tiles.width(),
            map_height = assets.tiles.height(),
            tile_size = assets.tiles.tile_size(),
            "gameplay_assets_loaded"
        );
        self.assets = Some(assets);
        Ok(())
    }

    fn destroy(&mut self) {
        self.assets = None;
        self.state = GameplayState::default();
    }

    fn enter(&mut self) -> Result<(), SceneError> {
        let Some(assets) = self.assets.as_ref() else {
            return Err(SceneError::Enter {
                reason: "gameplay assets are not loaded".to_string(),
            });
        };

        let tile_size = assets.tiles.tile_size() as f32;
        let spawn = |(x, y): (f32, f32)| Vec2::new(x * tile_size, y * tile_size);
        let movables = vec![
            Movable::at_rest(spawn(PLAYER_SPAWN_TILES), ACTOR_RADIUS, ActorSprite::Droid),
            Movable::at_rest(
                spawn(FOE_SPAWN_TILES),
                ACTOR_RADIUS,
                ActorSprite::IllegalOpcode,
            ),
        ];
        let camera = Camera::follow(movables[PLAYER].position);
        self.state = GameplayState {
            movables,
            camera,
            registers: Some(Registers::power_on()),
            nmi: NmiEffect::default(),
        };
        Ok(())
    }

    fn exit(&mut self) {
        self.state = GameplayState::default();
    }

    fn update(&mut self, delta_seconds: f32, frame: &mut FrameContext<'_>) -> bool {
        let input = frame.input();
        if input.key_state(InputAction::SwitchScene).pressed {
            frame.request_scene(SceneKey::Puzzle);
        }

        self.step(delta_seconds, input);
        self.draw(frame.canvas());
        true
    }
}
