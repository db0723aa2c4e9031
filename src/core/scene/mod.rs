//=========================================================================
// Scene System
//=========================================================================
//
// Scene contract, registry and single-active-scene manager.
//
// Architecture:
//   SceneRegistry
//     ├─ entries: HashMap<String, SceneRegistryEntry>  (Box<dyn Scene>)
//     └─ observers: notified on every mutation
//   SceneManager
//     └─ phase: Idle → Initializing → Active ⇄ Transitioning
//
// Flow:
//   update() → advance transition → Scene::frame() → relay ready/error
//
//=========================================================================

//=== External Dependencies ===============================================

use futures::future::BoxFuture;

//=== Internal Dependencies ===============================================

use crate::core::clock::FrameTick;
use crate::core::command::SceneSignal;

//=== Module Declarations =================================================

mod error;
mod manager;
mod metadata;
mod registry;
mod transition;
mod viewport;

//=== Public API ==========================================================

pub use error::SceneError;
pub use manager::{Lifecycle, SceneManager, SwitchOutcome};
pub use metadata::{CameraConfig, Lighting, PerformanceConfig, SceneConfig, SceneMetadata};
pub use registry::{
    Registration, SceneListing, SceneRegistry, SceneRegistryEntry, SceneStatus, SubscriptionId,
};
pub use transition::{Easing, TransitionConfig, TransitionKind};
pub use viewport::{responsive_camera, CameraRig, Viewport, ViewportClass};

//=== SceneInit ===========================================================

/// Future returned by a scene whose initialization completes later.
pub type InitFuture = BoxFuture<'static, Result<(), SceneError>>;

/// Outcome of [`Scene::init`].
pub enum SceneInit {
    /// Initialization finished synchronously.
    Ready,

    /// Initialization failed synchronously.
    Failed(SceneError),

    /// Initialization continues asynchronously.
    ///
    /// The manager polls the future once per tick and keeps the scene
    /// inactive until it resolves.
    Pending(InitFuture),
}

impl SceneInit {
    /// Wraps an async block or other future.
    pub fn pending<F>(future: F) -> Self
    where
        F: std::future::Future<Output = Result<(), SceneError>> + Send + 'static,
    {
        Self::Pending(Box::pin(future))
    }
}

impl From<Result<(), SceneError>> for SceneInit {
    fn from(result: Result<(), SceneError>) -> Self {
        match result {
            Ok(()) => Self::Ready,
            Err(err) => Self::Failed(err),
        }
    }
}

impl std::fmt::Debug for SceneInit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => f.write_str("Ready"),
            Self::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

//=== SceneFrame ==========================================================

/// Per-frame input handed to the active scene, plus its report channel.
///
/// The scene calls [`SceneFrame::ready`] once it has produced a visible
/// frame and [`SceneFrame::fail`] on unrecoverable failure; the manager
/// relays both into the registry.
pub struct SceneFrame<'a> {
    /// Clock tick for this frame.
    pub tick: FrameTick,
    /// False while a transition is running; scenes pause their simulation.
    pub is_active: bool,
    /// Camera resolved for the current viewport.
    pub camera: CameraRig,
    /// Signals raised since the previous frame.
    pub signals: &'a [SceneSignal],
    ready: bool,
    error: Option<SceneError>,
}

impl<'a> SceneFrame<'a> {
    pub fn new(
        tick: FrameTick,
        is_active: bool,
        camera: CameraRig,
        signals: &'a [SceneSignal],
    ) -> Self {
        Self {
            tick,
            is_active,
            camera,
            signals,
            ready: false,
            error: None,
        }
    }

    /// Reports that a first visible frame exists.
    pub fn ready(&mut self) {
        self.ready = true;
    }

    /// Reports an unrecoverable failure.
    pub fn fail(&mut self, error: SceneError) {
        self.error = Some(error);
    }

    /// Returns `true` if `signal` was raised this frame.
    pub fn has_signal(&self, signal: SceneSignal) -> bool {
        self.signals.contains(&signal)
    }

    pub(crate) fn into_report(self) -> (bool, Option<SceneError>) {
        (self.ready, self.error)
    }
}

//=== Scene Trait =========================================================

/// Contract every gallery scene implements.
///
/// Scenes are registered in a [`SceneRegistry`] and activated one at a
/// time by the [`SceneManager`]. Anything the scene allocates in `init`
/// belongs to the current activation and must be released in `cleanup`.
///
/// # Minimal Implementation
///
/// Only `metadata()` and `frame()` are required:
///
/// ```rust
/// # use vignette_engine::prelude::*;
/// struct Spinner;
///
/// impl Scene for Spinner {
///     fn metadata(&self) -> SceneMetadata {
///         SceneMetadata::new("spinner", "Spinner")
///     }
///
///     fn frame(&mut self, frame: &mut SceneFrame<'_>) {
///         frame.ready();
///     }
/// }
/// ```
pub trait Scene: Send {
    /// Identity record, captured once at registration.
    fn metadata(&self) -> SceneMetadata;

    /// Rendering hints.
    fn config(&self) -> SceneConfig {
        SceneConfig::default()
    }

    /// Called before the scene becomes active.
    ///
    /// Default implementation finishes immediately.
    fn init(&mut self) -> SceneInit {
        SceneInit::Ready
    }

    /// Called when the scene stops being active.
    ///
    /// Must not panic; a panic here propagates, because skipping cleanup
    /// would leak resources into the next scene.
    fn cleanup(&mut self) {}

    /// Advances the scene by one frame.
    fn frame(&mut self, frame: &mut SceneFrame<'_>);
}
