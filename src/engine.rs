//=========================================================================
// Vignette Engine
//
// Main entry point and coordinator for the gallery.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run()──>  [Runtime]
//         │                          │
//         ├─ with_tps()              ├─ init(): register scenes
//         ├─ with_channel_capacity() └─ run(): spawns core thread,
//         ├─ with_transition()                 runs platform,
//         ├─ with_initial_scene()              blocks until exit
//         └─ with_title()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::core::scene::{SceneManager, SceneRegistry, TransitionConfig};
use crate::core::{CoreSystemsOrchestrator, GlobalSystems};
use crate::platform::{Platform, PlatformError, PlatformEvent};

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (logic updates per second)
/// - **Channel capacity**: 128 events
/// - **Transition**: 300 ms fade, ease-in-out
/// - **Initial scene**: first registered scene
/// - **Title**: "Vignette"
///
/// # Examples
///
/// Simple usage with the built-in scenes:
/// ```no_run
/// use vignette_engine::EngineBuilder;
/// use vignette_engine::scenes;
///
/// EngineBuilder::new()
///     .build()
///     .init(|systems| scenes::register_all(&mut systems.registry))
///     .run()
///     .unwrap();
/// ```
///
/// Advanced configuration:
/// ```no_run
/// # use vignette_engine::EngineBuilder;
/// use std::time::Duration;
/// use vignette_engine::core::scene::TransitionConfig;
///
/// EngineBuilder::new()
///     .with_tps(120.0)
///     .with_transition(TransitionConfig::fade(Duration::from_millis(500)))
///     .with_initial_scene("ember-field")
///     .build()
///     .run()
///     .unwrap();
/// ```
pub struct EngineBuilder {
    tps: f64,
    channel_capacity: usize,
    transition: TransitionConfig,
    initial_scene: Option<String>,
    title: String,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            transition: TransitionConfig::default(),
            initial_scene: None,
            title: "Vignette".to_owned(),
        }
    }

    /// Sets the target ticks per second for the logic thread.
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the channel capacity for platform → core communication.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Sets the transition used when switching scenes.
    ///
    /// Default: 300 ms fade, ease-in-out. Use [`TransitionConfig::none`]
    /// for instant switches.
    pub fn with_transition(mut self, transition: TransitionConfig) -> Self {
        self.transition = transition;
        self
    }

    /// Sets the scene activated at startup.
    ///
    /// Falls back to the first registered scene if the id is unknown.
    pub fn with_initial_scene(mut self, id: impl Into<String>) -> Self {
        self.initial_scene = Some(id.into());
        self
    }

    /// Sets the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builds the engine instance.
    ///
    /// Consumes the builder and produces a configured [`Engine`]. Call
    /// [`Engine::init`] to register scenes before running.
    pub fn build(self) -> Engine {
        info!(
            "Building engine (TPS: {}, channel: {}, transition: {:?})",
            self.tps, self.channel_capacity, self.transition
        );

        let systems = GlobalSystems {
            registry: SceneRegistry::new(),
            manager: SceneManager::with_transition(self.transition),
        };

        Engine {
            orchestrator: CoreSystemsOrchestrator::new(systems, self.initial_scene),
            tps: self.tps,
            channel_capacity: self.channel_capacity,
            title: self.title,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Vignette gallery runtime.
///
/// Create via [`EngineBuilder`] with `EngineBuilder::new().build()`.
///
/// # Architecture
///
/// ```text
/// Engine (Main Thread)
///   ├─► CoreSystemsOrchestrator (Logic Thread @ TPS)
///   │     └─► SceneRegistry, SceneManager, active Scene
///   │
///   └─► Platform (Event Loop)
///         └─► Window, key/click → GalleryCommand
///
/// Communication: crossbeam channel (PlatformEvent)
/// ```
pub struct Engine {
    orchestrator: CoreSystemsOrchestrator,
    tps: f64,
    channel_capacity: usize,
    title: String,
}

impl Engine {
    //--- Initialization ---------------------------------------------------

    /// Configures the gallery systems before execution.
    ///
    /// Provides mutable access to [`GlobalSystems`] for registering
    /// scenes, subscribing to the registry and installing a scene-change
    /// callback.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use vignette_engine::EngineBuilder;
    /// use vignette_engine::scenes::{DiscThrowScene, EmberFieldScene};
    ///
    /// EngineBuilder::new()
    ///     .build()
    ///     .init(|systems| {
    ///         systems.registry.register(DiscThrowScene::new());
    ///         systems.registry.register(EmberFieldScene::new());
    ///         systems.manager.on_scene_change(|id| println!("now showing {id}"));
    ///     })
    ///     .run()
    ///     .unwrap();
    /// ```
    pub fn init<F>(mut self, init_fn: F) -> Self
    where
        F: FnOnce(&mut GlobalSystems),
    {
        info!("Initializing engine systems");

        self.orchestrator.init_systems(init_fn);

        info!("Engine initialization complete");
        self
    }

    //--- Execution --------------------------------------------------------

    /// Starts the engine runtime and blocks until the application exits.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the channel for platform → core communication
    /// 2. Spawns the logic thread running at the configured TPS
    /// 3. Runs the platform event loop (blocks here)
    /// 4. On window close: the core thread cleans up the active scene
    ///    and terminates
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop fails. The core thread
    /// is still joined before returning.
    pub fn run(self) -> Result<(), PlatformError> {
        info!("Starting engine runtime (TPS: {})", self.tps);

        //--- 1. Create communication channel -----------------------------
        let (tx, rx): (Sender<PlatformEvent>, Receiver<PlatformEvent>) =
            bounded(self.channel_capacity);

        info!("Channel created (capacity: {})", self.channel_capacity);

        //--- 2. Spawn the core logic thread -------------------------------
        let core_handle = self.orchestrator.spawn_core_thread(rx, self.tps);
        info!("Core logic thread spawned");

        //--- 3. Launch the platform subsystem -----------------------------
        let platform = Platform::new(tx, self.title);
        info!("Platform initialized, entering event loop");

        let result = platform.run();
        if let Err(e) = &result {
            error!("Platform error: {}", e);
        }

        info!("Platform event loop exited");

        //--- 4. Cleanup: Wait for logic thread to terminate --------------
        match core_handle.join() {
            Ok(()) => {
                info!("Core thread terminated cleanly");
            }
            Err(e) => {
                error!("Core thread panicked: {:?}", e);
            }
        }

        info!("Engine shutdown complete");
        result
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::TransitionKind;
    use std::time::Duration;

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = EngineBuilder::new();
        assert_eq!(builder.tps, 60.0);
        assert_eq!(builder.channel_capacity, 128);
        assert_eq!(builder.transition.kind, TransitionKind::Fade);
        assert_eq!(builder.transition.duration, Duration::from_millis(300));
        assert_eq!(builder.initial_scene, None);
        assert_eq!(builder.title, "Vignette");
    }

    #[test]
    fn builder_with_tps() {
        let builder = EngineBuilder::new().with_tps(120.0);
        assert_eq!(builder.tps, 120.0);
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn builder_with_tps_panics_on_zero() {
        EngineBuilder::new().with_tps(0.0);
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn builder_with_tps_panics_on_negative() {
        EngineBuilder::new().with_tps(-60.0);
    }

    #[test]
    fn builder_with_channel_capacity() {
        let builder = EngineBuilder::new().with_channel_capacity(256);
        assert_eq!(builder.channel_capacity, 256);
    }

    #[test]
    #[should_panic(expected = "Channel capacity must be positive")]
    fn builder_with_channel_capacity_panics_on_zero() {
        EngineBuilder::new().with_channel_capacity(0);
    }

    #[test]
    fn builder_scene_options() {
        let builder = EngineBuilder::new()
            .with_transition(TransitionConfig::none())
            .with_initial_scene("ember-field")
            .with_title("Gallery");

        assert_eq!(builder.transition.kind, TransitionKind::None);
        assert_eq!(builder.initial_scene.as_deref(), Some("ember-field"));
        assert_eq!(builder.title, "Gallery");
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let engine = EngineBuilder::new()
            .with_tps(120.0)
            .with_channel_capacity(256)
            .with_title("Gallery")
            .build();

        assert_eq!(engine.tps, 120.0);
        assert_eq!(engine.channel_capacity, 256);
        assert_eq!(engine.title, "Gallery");
    }

    #[test]
    fn init_runs_against_systems() {
        let mut registered = 0;
        let _engine = EngineBuilder::new().build().init(|systems| {
            crate::scenes::register_all(&mut systems.registry);
            registered = systems.registry.len();
        });
        assert_eq!(registered, 2);
    }
}
