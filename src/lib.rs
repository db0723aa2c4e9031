//=========================================================================
// Vignette Engine — Library Root
//
// This crate defines the public API surface of the Vignette gallery.
//
// Responsibilities:
// - Expose the gallery entry point (`Engine`, `EngineBuilder`)
// - Expose the scene contract, registry and manager for custom scenes
// - Keep OS integration (`platform`) hidden from end users
//
// Typical usage:
// ```no_run
// use vignette_engine::{scenes, EngineBuilder};
//
// fn main() {
//     EngineBuilder::new()
//         .build()
//         .init(|systems| scenes::register_all(&mut systems.registry))
//         .run()
//         .unwrap();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the scene registry, scene manager, simulation models
// and the logic-thread orchestration. `scenes` ships the built-in scenes.
//
pub mod core;
pub mod prelude;
pub mod scenes;

//--- Internal Modules ----------------------------------------------------
//
// `platform` contains the window, winit integration and input mapping
// and is kept private, as it is not part of the public API surface.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
pub use platform::PlatformError;
