//=========================================================================
// Core Systems Orchestrator
//
// Central coordinator for the gallery running on the logic
// (non-platform) thread.
//
// Responsibilities:
// - Own the scene registry, the scene manager and the shared context
// - Receive and process platform events via the crossbeam channel
// - Maintain deterministic pacing using a fixed tick rate (TPS)
// - Clean up the active scene when the window closes
//
// Notes:
// The orchestrator runs independently from the platform layer.
// Communication with the platform occurs only through message passing,
// so scenes never run concurrently with themselves.
//
//=========================================================================

//=== Standard Library Imports ============================================
use std::thread;
use std::time::{Duration, Instant};

//=== External Crates =====================================================
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, info};

//=== Internal Modules ====================================================
use crate::platform::PlatformEvent;

pub mod clock;
pub mod command;
pub mod globals;
pub mod scene;
pub mod simulation;

pub use globals::{GlobalContext, GlobalSystems};

//=== TickControl =========================================================
//
// Defines control flow for the core update loop.
// Each tick can signal either to continue or terminate the loop.
//
pub(crate) enum TickControl {
    Continue,
    Exit,
}

//=== CoreSystemsOrchestrator =============================================
//
// Owns the gallery systems and the shared context and ticks them at a
// fixed rate on a background thread.
//
pub(crate) struct CoreSystemsOrchestrator {
    systems: GlobalSystems,
    context: GlobalContext,
    initial_scene: Option<String>,
}

impl CoreSystemsOrchestrator {
    //--- Construction -----------------------------------------------------
    //
    // Creates the systems but does not yet start the logic thread.
    //
    pub fn new(systems: GlobalSystems, initial_scene: Option<String>) -> Self {
        Self {
            systems,
            context: GlobalContext::new(),
            initial_scene,
        }
    }

    //--- init_systems() --------------------------------------------------
    //
    // Gives the caller mutable access to the systems before the thread
    // starts (scene registration, observers, scene-change callbacks).
    //
    pub fn init_systems<F>(&mut self, init_fn: F)
    where
        F: FnOnce(&mut GlobalSystems),
    {
        init_fn(&mut self.systems);
    }

    //--- spawn_core_thread() ---------------------------------------------
    //
    // Spawns the logic thread ticking the gallery at a fixed update
    // frequency (TPS - ticks per second).
    //
    // Each tick:
    //  1. Collects platform events (commands, resize, close)
    //  2. Advances the clock by the measured frame time
    //  3. Updates the registry/manager and the active scene
    //  4. Sleeps to maintain fixed pacing
    //  5. Cleans up the active scene and exits on shutdown
    //
    pub fn spawn_core_thread(
        self,
        receiver: Receiver<PlatformEvent>,
        tps: f64,
    ) -> thread::JoinHandle<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / tps);

        thread::spawn(move || {
            let Self {
                mut systems,
                mut context,
                initial_scene,
            } = self;

            systems.start(initial_scene.as_deref());
            let mut last_tick = Instant::now();

            loop {
                let frame_start = Instant::now();

                //--- Step 1: Gather platform events ------------------------
                if let TickControl::Exit =
                    Self::collect_platform_events(&receiver, &mut context, frame_duration)
                {
                    info!("Core thread exiting.");
                    break;
                }

                //--- Step 2: Advance the clock -----------------------------
                let now = Instant::now();
                context.advance_by(now - last_tick);
                last_tick = now;

                //--- Step 3: Update systems --------------------------------
                systems.update(&mut context);

                //--- Step 4: Maintain deterministic pacing ----------------
                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }

            //--- Step 5: Release the active scene --------------------------
            systems.shutdown();
        })
    }

    //--- collect_platform_events() ---------------------------------------
    //
    // Applies every platform event received during this frame to the
    // context. Returns a TickControl indicating whether to continue or exit.
    //
    fn collect_platform_events(
        receiver: &Receiver<PlatformEvent>,
        context: &mut GlobalContext,
        frame_duration: Duration,
    ) -> TickControl {
        // Wait for at least one event this frame
        match receiver.recv_timeout(frame_duration) {
            Ok(event) => {
                if let TickControl::Exit = Self::apply_event(event, context) {
                    return TickControl::Exit;
                }
            }
            Err(RecvTimeoutError::Disconnected) => return TickControl::Exit,
            Err(RecvTimeoutError::Timeout) => {}
        }

        // Drain additional events queued during this frame
        while let Ok(event) = receiver.try_recv() {
            if let TickControl::Exit = Self::apply_event(event, context) {
                return TickControl::Exit;
            }
        }

        TickControl::Continue
    }

    fn apply_event(event: PlatformEvent, context: &mut GlobalContext) -> TickControl {
        match event {
            PlatformEvent::Commands(batch) => context.commands.extend(batch),
            PlatformEvent::Resized { width, height } => {
                debug!("Viewport resized to {}x{}", width, height);
                context.resize(width, height);
            }
            PlatformEvent::WindowClosed => return TickControl::Exit,
        }
        TickControl::Continue
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::GalleryCommand;
    use crate::core::scene::{
        Scene, SceneFrame, SceneManager, SceneMetadata, SceneRegistry, TransitionConfig,
    };
    use crossbeam_channel::unbounded;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const FRAME: Duration = Duration::from_millis(1);

    #[test]
    fn collects_commands_and_resizes() {
        let (tx, rx) = unbounded();
        let mut context = GlobalContext::new();

        tx.send(PlatformEvent::Commands(vec![GalleryCommand::Next])).unwrap();
        tx.send(PlatformEvent::Resized { width: 375, height: 812 }).unwrap();
        tx.send(PlatformEvent::Commands(vec![GalleryCommand::Previous])).unwrap();

        let control = CoreSystemsOrchestrator::collect_platform_events(&rx, &mut context, FRAME);
        assert!(matches!(control, TickControl::Continue));
        assert_eq!(context.commands.take(), vec![GalleryCommand::Next, GalleryCommand::Previous]);
        assert_eq!(context.viewport.width, 375);
    }

    #[test]
    fn window_closed_exits() {
        let (tx, rx) = unbounded();
        let mut context = GlobalContext::new();
        tx.send(PlatformEvent::WindowClosed).unwrap();

        let control = CoreSystemsOrchestrator::collect_platform_events(&rx, &mut context, FRAME);
        assert!(matches!(control, TickControl::Exit));
    }

    #[test]
    fn disconnected_channel_exits() {
        let (tx, rx) = unbounded::<PlatformEvent>();
        drop(tx);
        let mut context = GlobalContext::new();

        let control = CoreSystemsOrchestrator::collect_platform_events(&rx, &mut context, FRAME);
        assert!(matches!(control, TickControl::Exit));
    }

    #[test]
    fn idle_frame_times_out() {
        let (_tx, rx) = unbounded::<PlatformEvent>();
        let mut context = GlobalContext::new();

        let control = CoreSystemsOrchestrator::collect_platform_events(&rx, &mut context, FRAME);
        assert!(matches!(control, TickControl::Continue));
        assert!(context.commands.is_empty());
    }

    #[test]
    fn init_systems_exposes_registry() {
        let mut orchestrator = CoreSystemsOrchestrator::new(GlobalSystems::new(), None);
        orchestrator.init_systems(|systems| crate::scenes::register_all(&mut systems.registry));
        assert!(!orchestrator.systems.registry.is_empty());
    }

    struct Counted {
        id: &'static str,
        cleanups: Arc<AtomicUsize>,
    }

    impl Scene for Counted {
        fn metadata(&self) -> SceneMetadata {
            SceneMetadata::new(self.id, self.id)
        }

        fn cleanup(&mut self) {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
        }

        fn frame(&mut self, frame: &mut SceneFrame<'_>) {
            frame.ready();
        }
    }

    #[test]
    fn core_thread_cleans_up_on_close() {
        let (tx, rx) = unbounded();
        let cleanups = Arc::new(AtomicUsize::new(0));
        let systems = GlobalSystems {
            registry: SceneRegistry::new(),
            manager: SceneManager::with_transition(TransitionConfig::none()),
        };
        let mut orchestrator = CoreSystemsOrchestrator::new(systems, Some("b".into()));
        orchestrator.init_systems(|systems| {
            for id in ["a", "b"] {
                systems.registry.register(Counted {
                    id,
                    cleanups: Arc::clone(&cleanups),
                });
            }
        });

        let handle = orchestrator.spawn_core_thread(rx, 240.0);
        tx.send(PlatformEvent::WindowClosed).unwrap();
        assert!(handle.join().is_ok());
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn core_thread_cleans_up_active_scene_on_disconnect() {
        let (tx, rx) = unbounded::<PlatformEvent>();
        let cleanups = Arc::new(AtomicUsize::new(0));
        let mut orchestrator = CoreSystemsOrchestrator::new(GlobalSystems::new(), None);
        orchestrator.init_systems(|systems| {
            systems.registry.register(Counted {
                id: "only",
                cleanups: Arc::clone(&cleanups),
            });
        });

        let handle = orchestrator.spawn_core_thread(rx, 240.0);
        drop(tx);
        assert!(handle.join().is_ok());
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }
}
