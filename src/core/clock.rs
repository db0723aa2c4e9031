//=========================================================================
// Frame Clock
//=========================================================================
//
// Turns wall-clock durations into the per-frame tick consumed by the
// scene manager and every scene simulation.
//
// The clock never reads time itself: the orchestrator measures real
// elapsed time and feeds it in, and tests feed fixed steps.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== FrameTick ===========================================================

/// Snapshot of the clock for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTick {
    /// Seconds accumulated since the clock started.
    pub elapsed: f32,
    /// Seconds since the previous frame (already clamped).
    pub delta: f32,
    /// Frame counter, starting at 1 for the first advanced frame.
    pub frame: u64,
}

//=== FrameClock ==========================================================

/// Monotonic frame clock with a delta ceiling.
///
/// A long stall (window drag, debugger break) would otherwise hand the
/// integrators one enormous step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    tick: FrameTick,
    max_delta: f32,
}

impl FrameClock {
    /// Default delta ceiling in seconds.
    pub const DEFAULT_MAX_DELTA: f32 = 0.1;

    pub fn new() -> Self {
        Self {
            tick: FrameTick::default(),
            max_delta: Self::DEFAULT_MAX_DELTA,
        }
    }

    /// Overrides the delta ceiling.
    ///
    /// # Panics
    ///
    /// Panics if `max_delta` is not positive.
    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        let secs = max_delta.as_secs_f32();
        assert!(secs > 0.0, "Max delta must be positive");
        self.max_delta = secs;
        self
    }

    /// Advances the clock by `dt` and returns the new tick.
    pub fn advance(&mut self, dt: Duration) -> FrameTick {
        let delta = dt.as_secs_f32().min(self.max_delta);
        self.tick = FrameTick {
            elapsed: self.tick.elapsed + delta,
            delta,
            frame: self.tick.frame + 1,
        };
        self.tick
    }

    /// Advances by a fractional number of seconds.
    ///
    /// Negative or non-finite input is treated as zero; anything above the
    /// ceiling is clamped before conversion.
    pub fn advance_secs(&mut self, secs: f32) -> FrameTick {
        let secs = if secs.is_finite() { secs.clamp(0.0, self.max_delta) } else { 0.0 };
        self.advance(Duration::from_secs_f32(secs))
    }

    /// Most recent tick.
    pub fn tick(&self) -> FrameTick {
        self.tick
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

//=== Tests ===============================================================
