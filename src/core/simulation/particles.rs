//=========================================================================
// Particle Field
//=========================================================================
//
// Fixed-size particle pool with in-place recycling.
//
// Every tick each particle's lifetime fraction grows by `rate * delta`.
// A particle that reaches the end of its life is re-sampled where it
// sits in the pool; the live count never changes and nothing is
// allocated after construction.
//
// Spawn distribution: uniform direction on a spherical shell whose
// radius lies in `[inner, outer)`, with a small random drift velocity.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::f32::consts::TAU;
use std::ops::Range;

use glam::Vec3;
use log::trace;
use rand::Rng;

//=== Internal Dependencies ===============================================

use super::{sanitize_delta, saturate, Simulation, SimulationContext};

/// Lifetimes within this distance of 1.0 count as expired, so float
/// accumulation cannot delay a reset by a tick.
const LIFETIME_EPSILON: f32 = 1e-4;

//=== Particle ============================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Fraction of life used, always in `[0, 1)`.
    pub lifetime: f32,
    pub size: f32,
    /// Turbulence phase offset, fixed per spawn.
    pub phase: f32,
}

//=== ParticleFieldParams =================================================

/// Tunables for a [`ParticleField`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleFieldParams {
    pub count: usize,
    /// Lifetime fraction gained per second.
    pub lifetime_rate: f32,
    /// Spawn shell radius range.
    pub shell: Range<f32>,
    /// Maximum drift speed per axis.
    pub drift: f32,
    pub size: Range<f32>,
    /// Turbulence displacement speed.
    pub turbulence: f32,
    /// Spread initial lifetimes so the pool does not expire in lockstep.
    pub stagger: bool,
}

impl Default for ParticleFieldParams {
    fn default() -> Self {
        Self {
            count: 2000,
            lifetime_rate: 0.2,
            shell: 2.0..10.0,
            drift: 0.3,
            size: 0.02..0.08,
            turbulence: 0.15,
            stagger: true,
        }
    }
}

//=== ParticleField =======================================================

#[derive(Debug, Clone)]
pub struct ParticleField {
    params: ParticleFieldParams,
    particles: Vec<Particle>,
    recycled_total: u64,
}

impl ParticleField {
    /// Allocates and spawns the whole pool.
    ///
    /// # Panics
    ///
    /// Panics if the shell or size range is empty or the lifetime rate is
    /// not positive.
    pub fn new(params: ParticleFieldParams, context: &mut SimulationContext) -> Self {
        assert!(params.lifetime_rate > 0.0, "Lifetime rate must be positive");
        assert!(!params.shell.is_empty(), "Spawn shell must not be empty");
        assert!(!params.size.is_empty(), "Size range must not be empty");

        let rng = context.rng();
        let particles = (0..params.count)
            .map(|_| {
                let mut particle = spawn(&params, rng);
                if params.stagger {
                    particle.lifetime = rng.gen_range(0.0..1.0);
                }
                particle
            })
            .collect();

        Self {
            params,
            particles,
            recycled_total: 0,
        }
    }

    pub fn params(&self) -> &ParticleFieldParams {
        &self.params
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Resets since construction.
    pub fn recycled_total(&self) -> u64 {
        self.recycled_total
    }

    /// Remaining-life fade for rendering: 1 at spawn, 0 at expiry.
    pub fn alpha(particle: &Particle) -> f32 {
        saturate(1.0 - particle.lifetime)
    }
}

impl Simulation for ParticleField {
    /// Number of particles recycled this step.
    type Report = usize;

    fn step(&mut self, context: &mut SimulationContext, delta: f32) -> usize {
        let delta = sanitize_delta(delta);
        let time = context.elapsed();
        let params = &self.params;
        let rng = context.rng();
        let mut recycled = 0;

        for particle in &mut self.particles {
            let wobble = Vec3::new(
                (time + particle.phase).sin(),
                (time * 0.8 + particle.phase).cos(),
                (time * 1.3 + particle.phase).sin(),
            );
            particle.position += (particle.velocity + wobble * params.turbulence) * delta;
            particle.lifetime += params.lifetime_rate * delta;

            if particle.lifetime >= 1.0 - LIFETIME_EPSILON {
                *particle = spawn(params, rng);
                recycled += 1;
            }
        }

        if recycled > 0 {
            trace!(target: "simulation", "Recycled {} particles", recycled);
        }
        self.recycled_total += recycled as u64;
        recycled
    }
}

//=== Spawning ============================================================

fn spawn<R: Rng + ?Sized>(params: &ParticleFieldParams, rng: &mut R) -> Particle {
    let radius = rng.gen_range(params.shell.clone());
    let theta = rng.gen_range(0.0..TAU);
    let phi = (rng.gen_range(-1.0f32..1.0)).acos();

    let position = Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    );

    let drift = params.drift;
    let velocity = if drift > 0.0 {
        Vec3::new(
            rng.gen_range(-drift..drift),
            rng.gen_range(-drift..drift),
            rng.gen_range(-drift..drift),
        )
    } else {
        Vec3::ZERO
    };

    Particle {
        position,
        velocity,
        lifetime: 0.0,
        size: rng.gen_range(params.size.clone()),
        phase: rng.gen_range(0.0..TAU),
    }
}

//=== Tests ===============================================================
