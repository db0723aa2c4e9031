//=========================================================================
// Disc Throw
//=========================================================================
//
// Throw a disc toward a distant fire. A launch signal (click, tap,
// Space) throws the ready disc along the camera's forward direction;
// it arcs under gravity, fades with distance, and a fresh disc appears
// once it is gone.
//
// Initialization is asynchronous: the optional fire texture is read on
// a loader thread and the scene becomes active when it arrives.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

use futures::channel::oneshot;
use glam::Vec3;
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::core::command::SceneSignal;
use crate::core::scene::{
    CameraConfig, Lighting, Scene, SceneConfig, SceneError, SceneFrame, SceneInit, SceneMetadata,
};
use crate::core::simulation::{
    Projectile, ProjectileLauncher, ProjectileParams, Simulation, SimulationContext,
};

//=== DiscThrowScene ======================================================

pub struct DiscThrowScene {
    params: ProjectileParams,
    seed: u64,
    fire_texture: Option<PathBuf>,
    loading: Arc<Mutex<Option<DiscAssets>>>,
    state: Option<DiscState>,
}

/// Output of the loader thread.
struct DiscAssets {
    fire_texture: Option<Arc<[u8]>>,
}

/// Everything owned by one activation.
struct DiscState {
    context: SimulationContext,
    launcher: ProjectileLauncher,
    fire_texture: Option<Arc<[u8]>>,
}

impl DiscThrowScene {
    pub const ID: &'static str = "disc-throw";

    pub fn new() -> Self {
        Self::with_params(ProjectileParams::default())
    }

    pub fn with_params(params: ProjectileParams) -> Self {
        Self {
            params,
            seed: rand::random(),
            fire_texture: None,
            loading: Arc::new(Mutex::new(None)),
            state: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Image file read during initialization and handed to the renderer.
    pub fn with_fire_texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.fire_texture = Some(path.into());
        self
    }

    /// Current disc, once initialization has completed.
    pub fn disc(&self) -> Option<&Projectile> {
        self.state.as_ref().map(|state| state.launcher.projectile())
    }

    pub fn launcher(&self) -> Option<&ProjectileLauncher> {
        self.state.as_ref().map(|state| &state.launcher)
    }

    /// Raw fire texture bytes, if one was configured and loaded.
    pub fn fire_texture(&self) -> Option<&[u8]> {
        self.state.as_ref()?.fire_texture.as_deref()
    }

    /// Moves loaded assets into a fresh activation state.
    fn take_loaded(&mut self) -> Result<(), SceneError> {
        let assets = self
            .loading
            .lock()
            .map_err(|_| SceneError::Unavailable(Self::ID.into()))?
            .take();

        if let Some(assets) = assets {
            self.state = Some(DiscState {
                context: SimulationContext::new(self.seed),
                launcher: ProjectileLauncher::new(self.params),
                fire_texture: assets.fire_texture,
            });
        }
        Ok(())
    }
}

impl Default for DiscThrowScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for DiscThrowScene {
    fn metadata(&self) -> SceneMetadata {
        SceneMetadata::new(Self::ID, "Disc Throw")
            .with_description("Launch a spinning disc that arcs under gravity and fades into the distance")
            .with_tags(["interactive", "physics", "game"])
    }

    fn config(&self) -> SceneConfig {
        SceneConfig {
            camera: CameraConfig {
                position: Vec3::new(0.0, 2.0, 8.0),
                fov: 60.0,
                ..Default::default()
            },
            lighting: Lighting::Studio,
            ..Default::default()
        }
    }

    fn init(&mut self) -> SceneInit {
        let (tx, rx) = oneshot::channel();
        let path = self.fire_texture.clone();

        let spawned = thread::Builder::new()
            .name("disc-throw-loader".into())
            .spawn(move || {
                let result = match path {
                    Some(path) => std::fs::read(&path)
                        .map(|bytes| Some(Arc::<[u8]>::from(bytes)))
                        .map_err(|err| SceneError::init(format!("{}: {}", path.display(), err))),
                    None => Ok(None),
                };
                let _ = tx.send(result);
            });

        if let Err(err) = spawned {
            return SceneInit::Failed(SceneError::init(format!("loader thread: {}", err)));
        }

        let slot = Arc::clone(&self.loading);
        SceneInit::pending(async move {
            let fire_texture = rx
                .await
                .map_err(|_| SceneError::init("loader thread exited early"))??;

            *slot
                .lock()
                .map_err(|_| SceneError::init("asset slot poisoned"))? = Some(DiscAssets { fire_texture });
            debug!(target: "scene", "Disc throw assets loaded");
            Ok::<(), SceneError>(())
        })
    }

    fn cleanup(&mut self) {
        self.state = None;
        if let Ok(mut slot) = self.loading.lock() {
            slot.take();
        }
    }

    fn frame(&mut self, frame: &mut SceneFrame<'_>) {
        if self.state.is_none() {
            if let Err(err) = self.take_loaded() {
                frame.fail(err);
                return;
            }
        }

        let Some(state) = &mut self.state else {
            frame.fail(SceneError::Unavailable(Self::ID.into()));
            return;
        };

        if frame.is_active {
            let delta = state.context.advance(frame.tick.delta);
            if frame.has_signal(SceneSignal::Launch)
                && !state.launcher.launch(frame.camera.forward(), &mut state.context)
            {
                warn!(target: "scene", "Disc already in flight, launch ignored");
            }
            state.launcher.step(&mut state.context, delta);
        }
        frame.ready();
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FrameTick;
    use crate::core::scene::{responsive_camera, Viewport};
    use futures::executor::block_on;

    fn init_blocking(scene: &mut DiscThrowScene) -> Result<(), SceneError> {
        match scene.init() {
            SceneInit::Pending(future) => block_on(future),
            other => panic!("expected pending init, got {:?}", other),
        }
    }

    fn run_frame(scene: &mut DiscThrowScene, signals: &[SceneSignal]) -> (bool, Option<SceneError>) {
        let camera = responsive_camera(&scene.config(), &Viewport::default());
        let tick = FrameTick { elapsed: 0.0, delta: 1.0 / 60.0, frame: 1 };
        let mut frame = SceneFrame::new(tick, true, camera, signals);
        scene.frame(&mut frame);
        frame.into_report()
    }

    #[test]
    fn metadata_and_config() {
        let scene = DiscThrowScene::new();
        assert_eq!(scene.metadata().id, "disc-throw");
        assert!(scene.metadata().has_tag("physics"));
        assert_eq!(scene.config().camera.fov, 60.0);
        assert_eq!(scene.config().lighting, Lighting::Studio);
    }

    #[test]
    fn async_init_then_launch() {
        let mut scene = DiscThrowScene::new().with_seed(5);
        init_blocking(&mut scene).unwrap();

        let (ready, error) = run_frame(&mut scene, &[]);
        assert!(ready);
        assert!(error.is_none());
        assert!(scene.launcher().is_some_and(ProjectileLauncher::is_ready));

        run_frame(&mut scene, &[SceneSignal::Launch]);
        let disc = scene.disc().copied().unwrap();
        assert!(disc.active);
        assert!(disc.velocity.z < 0.0);
        assert!(disc.position.length() > 0.0);
    }

    #[test]
    fn thrown_disc_is_spent_and_replaced() {
        let mut scene = DiscThrowScene::new().with_seed(5);
        init_blocking(&mut scene).unwrap();
        run_frame(&mut scene, &[SceneSignal::Launch]);

        let mut frames = 0;
        while scene.disc().is_some_and(|disc| disc.active) {
            run_frame(&mut scene, &[]);
            frames += 1;
            assert!(frames < 10_000);
        }
        let disc = *scene.disc().unwrap();
        assert_eq!(disc.opacity, 0.0);
        assert!(disc.position.length() >= 25.0);

        run_frame(&mut scene, &[]);
        assert!(scene.launcher().is_some_and(ProjectileLauncher::is_ready));
    }

    #[test]
    fn missing_texture_rejects_init() {
        let mut scene = DiscThrowScene::new().with_fire_texture("/nonexistent/fire.png");
        let err = init_blocking(&mut scene).unwrap_err();
        assert!(matches!(err, SceneError::Init(_)));
        assert!(scene.disc().is_none());
    }

    #[test]
    fn cleanup_discards_activation() {
        let mut scene = DiscThrowScene::new();
        init_blocking(&mut scene).unwrap();
        run_frame(&mut scene, &[]);
        assert!(scene.disc().is_some());

        scene.cleanup();
        assert!(scene.disc().is_none());
        let (ready, error) = run_frame(&mut scene, &[]);
        assert!(!ready);
        assert!(error.is_some());
    }
}
