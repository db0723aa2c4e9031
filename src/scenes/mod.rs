//=========================================================================
// Built-in Scenes
//=========================================================================
//
// Reference scenes shipped with the gallery.
//
// - EmberFieldScene: particle recycling on a spherical shell
// - DiscThrowScene:  projectile throw with asynchronous init
//
//=========================================================================

//=== Module Declarations =================================================

mod disc_throw;
mod ember_field;

//=== Public API ==========================================================

pub use disc_throw::DiscThrowScene;
pub use ember_field::EmberFieldScene;

//=== Internal Dependencies ===============================================

use crate::core::scene::{Scene, SceneRegistry};

/// Registers every built-in scene, in gallery order.
///
/// Call once at startup. Calling it again replaces the existing entries
/// (with a duplicate-registration warning for each).
pub fn register_all(registry: &mut SceneRegistry) {
    let scenes: Vec<Box<dyn Scene>> = vec![
        Box::new(DiscThrowScene::new()),
        Box::new(EmberFieldScene::new()),
    ];
    registry.register_many(scenes);
}

//=== Tests ===============================================================
