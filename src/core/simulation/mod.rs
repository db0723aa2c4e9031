//=========================================================================
// Simulation Model
//=========================================================================
//
// Scene-local, per-tick entity updates. Knows nothing about the registry
// or the manager.
//
// Each activation of a scene owns one `SimulationContext` (seeded RNG,
// scene-local time). It is created in `init` and dropped in `cleanup`,
// so nothing leaks from one activation into the next.
//
//=========================================================================

//=== External Dependencies ===============================================

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

//=== Module Declarations =================================================

mod particles;
mod projectile;

//=== Public API ==========================================================

pub use particles::{Particle, ParticleField, ParticleFieldParams};
pub use projectile::{Projectile, ProjectileEvent, ProjectileLauncher, ProjectileParams, ProjectilePhase};

//=== SimulationContext ===================================================

/// State shared by every simulation of one scene activation.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    rng: ChaCha8Rng,
    elapsed: f32,
    frame: u64,
}

impl SimulationContext {
    /// Creates a context whose random stream is fully determined by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Advances scene-local time and returns the sanitized delta.
    pub fn advance(&mut self, delta: f32) -> f32 {
        let delta = sanitize_delta(delta);
        self.elapsed += delta;
        self.frame += 1;
        delta
    }

    /// Seconds since this activation started.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

//=== Simulation Trait ====================================================

/// Scene-local entity state advanced once per tick.
pub trait Simulation {
    /// Per-step summary returned to the caller.
    type Report;

    /// Advances the state by `delta` seconds.
    ///
    /// `context.elapsed()` already includes `delta`.
    fn step(&mut self, context: &mut SimulationContext, delta: f32) -> Self::Report;
}

//=== Numeric Helpers =====================================================

/// Clamps to `[0, 1]`; NaN becomes 0.
pub fn saturate(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Non-finite or negative deltas become 0.
pub(crate) fn sanitize_delta(delta: f32) -> f32 {
    if delta.is_finite() && delta > 0.0 {
        delta
    } else {
        0.0
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn saturate_clamps_and_rejects_nan() {
        assert_eq!(saturate(-0.5), 0.0);
        assert_eq!(saturate(0.25), 0.25);
        assert_eq!(saturate(3.0), 1.0);
        assert_eq!(saturate(f32::NAN), 0.0);
        assert_eq!(saturate(f32::INFINITY), 1.0);
    }

    #[test]
    fn context_accumulates_time() {
        let mut context = SimulationContext::new(7);
        assert_eq!(context.advance(0.5), 0.5);
        assert_eq!(context.advance(-1.0), 0.0);
        assert_eq!(context.advance(f32::NAN), 0.0);
        assert_eq!(context.elapsed(), 0.5);
        assert_eq!(context.frame(), 3);
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimulationContext::new(42);
        let mut b = SimulationContext::new(42);
        let xs: Vec<f32> = (0..8).map(|_| a.rng().gen()).collect();
        let ys: Vec<f32> = (0..8).map(|_| b.rng().gen()).collect();
        assert_eq!(xs, ys);
    }
}
