//=========================================================================
// Vignette — Gallery Binary
//
// Opens the gallery window with every built-in scene registered.
//
// Log level is controlled through `RUST_LOG` (default: info).
//
//=========================================================================

use log::info;
use vignette_engine::{scenes, EngineBuilder, PlatformError};

fn main() -> Result<(), PlatformError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    EngineBuilder::new()
        .with_title("Vignette")
        .build()
        .init(|systems| {
            scenes::register_all(&mut systems.registry);
            systems
                .manager
                .on_scene_change(|id| info!(target: "gallery", "Now showing '{}'", id));
        })
        .run()
}
