//=========================================================================
// Global Systems
//=========================================================================
//
// Container for the gallery systems with logic.
//
// Holds the scene registry and the scene manager, and routes the
// context's command queue between them at each tick boundary.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::GlobalContext;
use crate::core::command::{GalleryCommand, SceneSignal};
use crate::core::scene::{SceneManager, SceneRegistry};

//=== GlobalSystems =======================================================

/// Container for the gallery's logic systems.
///
/// # Available Systems
///
/// - `registry`: catalog of every known scene and its load/error status
/// - `manager`: single-active-scene manager and transition state machine
#[derive(Debug, Default)]
pub struct GlobalSystems {
    /// Scene catalog.
    ///
    /// Register scenes here before the engine starts; selector UIs
    /// subscribe to it for listing changes.
    pub registry: SceneRegistry,

    /// Active scene manager.
    pub manager: SceneManager,
}

impl GlobalSystems {
    /// Creates an empty registry and an idle manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates `initial`, or the first registered scene.
    pub fn start(&mut self, initial: Option<&str>) {
        self.manager.start(&mut self.registry, initial);
    }

    //--- Update Loop ------------------------------------------------------

    /// Updates all gallery systems for the current tick.
    ///
    /// # Processing Pipeline
    ///
    /// 1. **Command routing**: switch requests go to the manager, signals
    ///    are collected for the active scene
    /// 2. **Scene update**: transitions advance and the active scene runs
    ///    one frame
    pub fn update(&mut self, context: &mut GlobalContext) {
        // 1. Route queued commands
        context.signals.clear();
        for command in context.commands.take() {
            self.apply(command, &mut context.signals);
        }

        // 2. Advance the manager and the active scene
        self.manager.update(&mut self.registry, context);
    }

    /// Cleans up the active scene.
    pub fn shutdown(&mut self) {
        self.manager.shutdown(&mut self.registry);
    }

    //--- Internal Helpers -------------------------------------------------

    fn apply(&mut self, command: GalleryCommand, signals: &mut Vec<SceneSignal>) {
        debug!(target: "scene", "Applying command {:?}", command);

        let registry = &mut self.registry;
        match command {
            GalleryCommand::SwitchTo(id) => {
                self.manager.switch_scene(registry, &id);
            }
            GalleryCommand::SelectIndex(index) => {
                self.manager.select_index(registry, index);
            }
            GalleryCommand::Next => {
                self.manager.next_scene(registry);
            }
            GalleryCommand::Previous => {
                self.manager.previous_scene(registry);
            }
            GalleryCommand::Signal(signal) => signals.push(signal),
        }
    }
}

//=== Tests ===============================================================
