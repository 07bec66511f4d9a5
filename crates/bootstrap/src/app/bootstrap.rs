use engine::{
    resolve_app_paths, AppContext, AppError, AssetLoader, LoopConfig, Scene, SceneKey, SceneManager,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay::GameplayScene;
use super::puzzle::PuzzleScene;
use super::splash::SplashScene;

/// Scenes loaded at startup. Anything else is built on first transition.
const EAGER_SCENES: [SceneKey; 2] = [SceneKey::Splash, SceneKey::Gameplay];

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scenes: SceneManager,
    pub(crate) initial_scene: SceneKey,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Bootstrap Startup ===");

    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        asset_root = %app_paths.asset_root.display(),
        "startup"
    );

    let config = LoopConfig {
        window_title: window_title(),
        ..LoopConfig::default()
    };
    let context = AppContext::new(AssetLoader::new(app_paths.asset_root));
    let mut scenes = SceneManager::new(context).with_factory(Box::new(build_scene));
    for key in EAGER_SCENES {
        let Some(scene) = build_scene(key) else {
            continue;
        };
        scenes
            .register(key, scene)
            .map_err(|source| AppError::SceneInit { key, source })?;
    }

    Ok(AppWiring {
        config,
        scenes,
        initial_scene: SceneKey::Splash,
    })
}

pub(crate) fn build_scene(key: SceneKey) -> Option<Box<dyn Scene>> {
    let scene: Box<dyn Scene> = match key {
        SceneKey::Splash => Box::new(SplashScene::new()),
        SceneKey::Gameplay => Box::new(GameplayScene::new()),
        SceneKey::Puzzle => Box::new(PuzzleScene::new()),
    };
    Some(scene)
}

fn window_title() -> String {
    format!("Bootstrap ({})", env!("CARGO_PKG_VERSION"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_title_carries_package_version() {
        assert_eq!(
            window_title(),
            format!("Bootstrap ({})", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn every_scene_key_has_a_builder() {
        for key in [SceneKey::Splash, SceneKey::Gameplay, SceneKey::Puzzle] {
            assert!(build_scene(key).is_some(), "{key:?}");
        }
    }
}
