//=========================================================================
// Global Gallery State
//=========================================================================
//
// Separates systems (logic components) from context (shared data).
//
// Architecture:
//   GlobalSystems: SceneRegistry + SceneManager (owned by orchestrator)
//   GlobalContext: FrameTick + Viewport + CommandQueue (read by scenes)
//
//=========================================================================

//=== Module Declarations =================================================

mod global_context;
mod global_systems;

//=== Public API ==========================================================

pub use global_context::GlobalContext;
pub use global_systems::GlobalSystems;
