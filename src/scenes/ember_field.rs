//=========================================================================
// Ember Field
//=========================================================================
//
// A slowly turning shell of glowing embers. Each ember drifts, wobbles
// and is recycled in place when its lifetime runs out.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec3;
use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::scene::{
    CameraConfig, Lighting, PerformanceConfig, Scene, SceneConfig, SceneError, SceneFrame,
    SceneInit, SceneMetadata,
};
use crate::core::simulation::{ParticleField, ParticleFieldParams, Simulation, SimulationContext};

/// Field rotation speed in radians per second around x and y.
const SPIN: Vec3 = Vec3::new(0.05, 0.1, 0.0);

//=== EmberFieldScene =====================================================

pub struct EmberFieldScene {
    params: ParticleFieldParams,
    seed: u64,
    state: Option<EmberState>,
}

/// Everything owned by one activation.
struct EmberState {
    context: SimulationContext,
    field: ParticleField,
    rotation: Vec3,
}

impl EmberFieldScene {
    pub const ID: &'static str = "ember-field";

    pub fn new() -> Self {
        Self::with_params(ParticleFieldParams::default())
    }

    pub fn with_params(params: ParticleFieldParams) -> Self {
        Self {
            params,
            seed: rand::random(),
            state: None,
        }
    }

    /// Fixes the random seed so every activation replays the same field.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Live particle pool while the scene is initialized.
    pub fn field(&self) -> Option<&ParticleField> {
        self.state.as_ref().map(|state| &state.field)
    }

    /// Accumulated field rotation in radians.
    pub fn rotation(&self) -> Option<Vec3> {
        self.state.as_ref().map(|state| state.rotation)
    }
}

impl Default for EmberFieldScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for EmberFieldScene {
    fn metadata(&self) -> SceneMetadata {
        SceneMetadata::new(Self::ID, "Ember Field")
            .with_description("Embers drifting outward from a spherical shell, recycled in place")
            .with_tags(["particles", "3d", "abstract"])
    }

    fn config(&self) -> SceneConfig {
        SceneConfig {
            camera: CameraConfig {
                position: Vec3::new(0.0, 0.0, 12.0),
                fov: 75.0,
                ..Default::default()
            },
            lighting: Lighting::Minimal,
            performance: PerformanceConfig {
                max_pixel_ratio: Some(2.0),
                ..Default::default()
            },
        }
    }

    fn init(&mut self) -> SceneInit {
        let mut context = SimulationContext::new(self.seed);
        let field = ParticleField::new(self.params.clone(), &mut context);
        debug!(target: "scene", "Ember field spawned {} particles", field.len());

        self.state = Some(EmberState {
            context,
            field,
            rotation: Vec3::ZERO,
        });
        SceneInit::Ready
    }

    fn cleanup(&mut self) {
        self.state = None;
    }

    fn frame(&mut self, frame: &mut SceneFrame<'_>) {
        let Some(state) = &mut self.state else {
            frame.fail(SceneError::Unavailable(Self::ID.into()));
            return;
        };

        if frame.is_active {
            let delta = state.context.advance(frame.tick.delta);
            state.rotation += SPIN * delta;
            state.field.step(&mut state.context, delta);
        }
        frame.ready();
    }
}

//=== Tests ===============================================================
