//=========================================================================
// Global Context
//=========================================================================
//
// Shared per-tick data for the gallery.
//
// Contains state data that systems and scenes read:
// - tick: clock reading for the current frame
// - viewport: latest window size, used for camera adaptation
// - commands: queue of gallery commands for the next tick boundary
// - signals: scene signals routed from this tick's commands
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::clock::{FrameClock, FrameTick};
use crate::core::command::{CommandQueue, SceneSignal};
use crate::core::scene::Viewport;

//=== GlobalContext =======================================================

/// Shared context data read by the scene manager and the active scene.
pub struct GlobalContext {
    /// Clock reading for the current tick.
    pub tick: FrameTick,

    /// Current viewport size.
    pub viewport: Viewport,

    /// Commands queued for the next tick boundary.
    ///
    /// Filled by the core thread from platform batches, drained by
    /// [`GlobalSystems::update`](super::GlobalSystems::update).
    pub commands: CommandQueue,

    /// Signals delivered to the active scene this tick.
    ///
    /// Rebuilt every tick from the command queue.
    pub signals: Vec<SceneSignal>,

    clock: FrameClock,
}

impl GlobalContext {
    /// Creates a new context at time zero with the default viewport.
    pub fn new() -> Self {
        Self::with_clock(FrameClock::new())
    }

    pub fn with_clock(clock: FrameClock) -> Self {
        Self {
            tick: clock.tick(),
            viewport: Viewport::default(),
            commands: CommandQueue::new(),
            signals: Vec::new(),
            clock,
        }
    }

    //--- Clock ------------------------------------------------------------

    /// Advances the clock by a measured wall-clock duration.
    pub fn advance_by(&mut self, elapsed: Duration) -> FrameTick {
        self.tick = self.clock.advance(elapsed);
        self.tick
    }

    /// Advances the clock by `secs` seconds.
    pub fn advance(&mut self, secs: f32) -> FrameTick {
        self.tick = self.clock.advance_secs(secs);
        self.tick
    }

    //--- Viewport ---------------------------------------------------------

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
    }
}

impl Default for GlobalContext {
    fn default() -> Self {
        Self::new()
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_updates_tick() {
        let mut context = GlobalContext::new();
        assert_eq!(context.tick.frame, 0);

        context.advance(0.05);
        let tick = context.advance_by(Duration::from_millis(20));
        assert_eq!(tick.frame, 2);
        assert_eq!(context.tick, tick);
        assert!((tick.elapsed - 0.07).abs() < 1e-6);
    }

    #[test]
    fn resize_replaces_viewport() {
        let mut context = GlobalContext::new();
        context.resize(375, 812);
        assert_eq!(context.viewport, Viewport::new(375, 812));
    }
}
