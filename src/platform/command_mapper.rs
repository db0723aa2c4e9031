//=========================================================================
// Command Mapper
//=========================================================================
//
// Converts winit keyboard and mouse events into gallery commands.
//
// Architecture:
//   Winit Events → CommandMapper → GalleryCommand → CommandBuffer
//
// Bindings:
//   1-9            select scene by position
//   → / ↓          next scene
//   ← / ↑          previous scene
//   Space, click   launch
//
// Only presses map to commands; releases and key repeats are ignored.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::{
    event::{ElementState, KeyEvent, MouseButton},
    keyboard::{KeyCode, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::command::{GalleryCommand, SceneSignal};

//=== CommandMapper =======================================================

/// Stateless mapping from winit input to [`GalleryCommand`]s.
pub(crate) struct CommandMapper;

impl CommandMapper {
    //--- Event Processing -------------------------------------------------

    /// Maps a winit key event (filters releases, repeats, unbound keys).
    pub(crate) fn process_key_event(key_event: &KeyEvent) -> Option<GalleryCommand> {
        match key_event.physical_key {
            PhysicalKey::Code(code) => Self::map_key(code, key_event.state, key_event.repeat),
            _ => None,
        }
    }

    /// Maps a key press to its command.
    pub(crate) fn map_key(code: KeyCode, state: ElementState, repeat: bool) -> Option<GalleryCommand> {
        if state != ElementState::Pressed || repeat {
            return None;
        }

        use KeyCode::*;
        let command = match code {
            //--- Scene selection ------------------------------------------

            Digit1 => GalleryCommand::SelectIndex(0),
            Digit2 => GalleryCommand::SelectIndex(1),
            Digit3 => GalleryCommand::SelectIndex(2),
            Digit4 => GalleryCommand::SelectIndex(3),
            Digit5 => GalleryCommand::SelectIndex(4),
            Digit6 => GalleryCommand::SelectIndex(5),
            Digit7 => GalleryCommand::SelectIndex(6),
            Digit8 => GalleryCommand::SelectIndex(7),
            Digit9 => GalleryCommand::SelectIndex(8),

            //--- Cycling --------------------------------------------------

            ArrowRight | ArrowDown => GalleryCommand::Next,
            ArrowLeft | ArrowUp => GalleryCommand::Previous,

            //--- Scene signals --------------------------------------------

            Space => GalleryCommand::Signal(SceneSignal::Launch),

            _ => return None,
        };
        Some(command)
    }

    /// Maps a mouse button press; only the left button launches.
    pub(crate) fn process_mouse_button(button: MouseButton, state: ElementState) -> Option<GalleryCommand> {
        match (button, state) {
            (MouseButton::Left, ElementState::Pressed) => {
                Some(GalleryCommand::Signal(SceneSignal::Launch))
            }
            _ => None,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
