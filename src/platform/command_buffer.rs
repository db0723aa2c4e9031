//=========================================================================
// Command Buffer
//
// Collects gallery commands and viewport changes between two frame
// boundaries. Acts as a transient aggregator between the winit event
// handlers and the channel to the core thread.
//
// Responsibilities:
// - Store commands in arrival order
// - Drop immediate repeats of the same command (key bounce, double
//   delivery)
// - Coalesce resizes so only the latest size is sent
// - Hand everything over atomically via `drain()`
//
//=========================================================================

//=== Internal Modules ====================================================
use crate::core::command::GalleryCommand;

//=== CommandBuffer Struct ================================================
//
// Transient store for one frame of platform output.
//
// Internally maintains:
// - `commands`: discrete, order-significant gallery commands
// - `viewport`: last-known logical window size, if it changed
//
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<GalleryCommand>,
    viewport: Option<(u32, u32)>,
}

/// Contents of one drained frame.
#[derive(Debug, PartialEq, Eq)]
pub struct FrameBatch {
    pub commands: Vec<GalleryCommand>,
    pub viewport: Option<(u32, u32)>,
}

impl CommandBuffer {
    //--- Construction -----------------------------------------------------
    //
    // Preallocates for a typical frame.
    //
    pub fn new() -> Self {
        const COMMAND_BASE: usize = 16;

        Self {
            commands: Vec::with_capacity(COMMAND_BASE),
            viewport: None,
        }
    }

    //--- Command Handling -------------------------------------------------
    //
    // Appends a command. A command identical to the previous one in the
    // same frame is ignored.
    //
    pub fn push(&mut self, command: GalleryCommand) {
        if self.commands.last() != Some(&command) {
            self.commands.push(command);
        }
    }

    //--- Viewport Handling ------------------------------------------------
    //
    // Records the latest viewport size, replacing any earlier one.
    //
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Some((width, height));
    }

    //--- Drain ------------------------------------------------------------
    //
    // Returns everything collected this frame and clears the buffer, or
    // None if nothing happened.
    //
    pub fn drain(&mut self) -> Option<FrameBatch> {
        if self.is_empty() {
            return None;
        }

        Some(FrameBatch {
            commands: std::mem::take(&mut self.commands),
            viewport: self.viewport.take(),
        })
    }

    //--- Utilities --------------------------------------------------------
    pub fn len(&self) -> usize {
        self.commands.len() + usize::from(self.viewport.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.viewport.is_none()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
