use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{info, warn};

use super::input::{ActionStates, InputAction, KeyState};
use super::rendering::Canvas;
use crate::assets::{AssetError, AssetLoader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SceneKey {
    Splash,
    Gameplay,
    Puzzle,
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("scene {key:?} is already registered")]
    AlreadyRegistered { key: SceneKey },
    #[error("scene refused to enter: {reason}")]
    Enter { reason: String },
}

/// Long-lived services handed to every scene's `init`.
#[derive(Debug, Clone)]
pub struct AppContext {
    assets: AssetLoader,
}

impl AppContext {
    pub fn new(assets: AssetLoader) -> Self {
        Self { assets }
    }

    pub fn assets(&self) -> &AssetLoader {
        &self.assets
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(actions: ActionStates) -> Self {
        Self { actions }
    }

    pub fn key_state(&self, action: InputAction) -> KeyState {
        KeyState {
            down: self.actions.is_down(action),
            pressed: self.actions.is_pressed(action),
        }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// True only on the first frame after the key went down.
    pub fn is_pressed(&self, action: InputAction) -> bool {
        self.actions.is_pressed(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction, pressed: bool) -> Self {
        self.actions.set_pressed(action, pressed);
        self
    }
}

/// Per-frame view a scene gets during `update`: this frame's input, the
/// canvas to draw into and a slot for a transition request.
pub struct FrameContext<'a> {
    input: &'a InputSnapshot,
    canvas: &'a mut dyn Canvas,
    requested_scene: Option<SceneKey>,
}

impl<'a> FrameContext<'a> {
    pub fn new(input: &'a InputSnapshot, canvas: &'a mut dyn Canvas) -> Self {
        Self {
            input,
            canvas,
            requested_scene: None,
        }
    }

    pub fn input(&self) -> &'a InputSnapshot {
        self.input
    }

    pub fn canvas(&mut self) -> &mut dyn Canvas {
        &mut *self.canvas
    }

    /// Queues a transition. It is applied before the next frame's update;
    /// the last request made within a frame wins.
    pub fn request_scene(&mut self, key: SceneKey) {
        self.requested_scene = Some(key);
    }

    pub fn requested_scene(&self) -> Option<SceneKey> {
        self.requested_scene
    }
}

pub trait Scene {
    /// Loads everything the scene needs. Called once, before the scene is
    /// installed; an error keeps the scene out of the registry.
    fn init(&mut self, context: &AppContext) -> Result<(), SceneError>;
    fn destroy(&mut self) {}
    fn enter(&mut self) -> Result<(), SceneError>;
    fn exit(&mut self);
    fn suspend(&mut self) {}
    fn resume(&mut self) {}
    /// Advances one frame. Returning `false` ends the scene.
    fn update(&mut self, delta_seconds: f32, frame: &mut FrameContext<'_>) -> bool;
}

pub type SceneFactory = Box<dyn FnMut(SceneKey) -> Option<Box<dyn Scene>>>;

/// Owns every registered scene and drives the single entered one.
///
/// `current` is `Some` exactly while a scene has been entered successfully
/// and has not been exited since. The active scene is always looked up from
/// the registry through `current`; nothing else holds a reference to it.
pub struct SceneManager {
    context: AppContext,
    registry: BTreeMap<SceneKey, Box<dyn Scene>>,
    current: Option<SceneKey>,
    pending: Option<SceneKey>,
    factory: Option<SceneFactory>,
}

impl SceneManager {
    pub fn new(context: AppContext) -> Self {
        Self {
            context,
            registry: BTreeMap::new(),
            current: None,
            pending: None,
            factory: None,
        }
    }

    /// Scenes requested before they are registered are built by `factory`
    /// and initialized on first use.
    pub fn with_factory(mut self, factory: SceneFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn register(&mut self, key: SceneKey, mut scene: Box<dyn Scene>) -> Result<(), SceneError> {
        if self.registry.contains_key(&key) {
            return Err(SceneError::AlreadyRegistered { key });
        }
        if let Err(error) = scene.init(&self.context) {
            warn!(scene = ?key, error = %error, "scene_init_failed");
            return Err(error);
        }
        self.registry.insert(key, scene);
        info!(scene = ?key, "scene_registered");
        Ok(())
    }

    pub fn is_registered(&self, key: SceneKey) -> bool {
        self.registry.contains_key(&key)
    }

    pub fn current(&self) -> Option<SceneKey> {
        self.current
    }

    pub fn pending(&self) -> Option<SceneKey> {
        self.pending
    }

    pub fn request_transition(&mut self, key: SceneKey) {
        self.pending = Some(key);
    }

    /// Runs one frame: applies a queued transition, then updates the active
    /// scene. Returns whether a scene is still active afterwards.
    ///
    /// A frame that applies a transition always hands the entered scene a
    /// delta of zero.
    pub fn update(
        &mut self,
        delta_seconds: f32,
        input: &InputSnapshot,
        canvas: &mut dyn Canvas,
    ) -> bool {
        let mut delta_seconds = delta_seconds;
        if let Some(next) = self.pending.take() {
            delta_seconds = 0.0;
            if !self.apply_transition(next) {
                return false;
            }
        }

        let Some(key) = self.current else {
            return false;
        };
        let Some(scene) = self.registry.get_mut(&key) else {
            self.current = None;
            return false;
        };

        let mut frame = FrameContext::new(input, canvas);
        let running = scene.update(delta_seconds, &mut frame);
        if let Some(requested) = frame.requested_scene() {
            self.pending = Some(requested);
        }

        if !running {
            scene.exit();
            self.current = None;
            info!(scene = ?key, "scene_finished");
            return false;
        }
        true
    }

    pub fn suspend(&mut self) {
        if let Some((key, scene)) = self.active_mut() {
            scene.suspend();
            info!(scene = ?key, "scene_suspended");
        }
    }

    pub fn resume(&mut self) {
        if let Some((key, scene)) = self.active_mut() {
            scene.resume();
            info!(scene = ?key, "scene_resumed");
        }
    }

    /// Exits the active scene, then destroys every registered scene.
    pub fn shutdown(&mut self) {
        if let Some((key, scene)) = self.active_mut() {
            scene.exit();
            info!(scene = ?key, "scene_exited");
        }
        self.current = None;
        self.pending = None;
        let registry = std::mem::take(&mut self.registry);
        let destroyed = registry.len();
        for (_, mut scene) in registry {
            scene.destroy();
        }
        info!(destroyed, "scenes_destroyed");
    }

    fn apply_transition(&mut self, next: SceneKey) -> bool {
        let previous = self.current.take();
        if let Some(key) = previous {
            if let Some(scene) = self.registry.get_mut(&key) {
                scene.exit();
            }
            info!(scene = ?key, "scene_exited");
        }

        if !self.registry.contains_key(&next) && !self.install_from_factory(next) {
            warn!(scene = ?next, "scene_transition_unregistered");
            return false;
        }
        let Some(scene) = self.registry.get_mut(&next) else {
            return false;
        };

        match scene.enter() {
            Ok(()) => {
                self.current = Some(next);
                info!(from = ?previous, to = ?next, "scene_transition_applied");
                true
            }
            Err(error) => {
                warn!(scene = ?next, error = %error, "scene_enter_failed");
                false
            }
        }
    }

    fn install_from_factory(&mut self, key: SceneKey) -> bool {
        let Some(factory) = self.factory.as_mut() else {
            return false;
        };
        let Some(mut scene) = factory(key) else {
            return false;
        };
        if let Err(error) = scene.init(&self.context) {
            warn!(scene = ?key, error = %error, "scene_init_failed");
            return false;
        }
        self.registry.insert(key, scene);
        info!(scene = ?key, lazy = true, "scene_registered");
        true
    }

    fn active_mut(&mut self) -> Option<(SceneKey, &mut Box<dyn Scene>)> {
        let key = self.current?;
        self.registry.get_mut(&key).map(|scene| (key, scene))
    }
}
