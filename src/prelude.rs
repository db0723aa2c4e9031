//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use vignette_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{Engine, EngineBuilder};

// Global systems and context
pub use crate::core::globals::{GlobalContext, GlobalSystems};

// Commands
pub use crate::core::command::{GalleryCommand, SceneSignal};

// Scene system
pub use crate::core::scene::{
    CameraConfig, Lighting, PerformanceConfig, Scene, SceneConfig, SceneError, SceneFrame,
    SceneInit, SceneManager, SceneMetadata, SceneRegistry, SwitchOutcome, TransitionConfig,
    Viewport, ViewportClass,
};

// Simulation
pub use crate::core::simulation::{
    ParticleField, ParticleFieldParams, ProjectileLauncher, ProjectileParams, Simulation,
    SimulationContext,
};
