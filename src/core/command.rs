//=========================================================================
// Gallery Commands
//=========================================================================
//
// Requests from the platform (or the host) to the core systems.
//
// Commands are queued during a frame and drained at the tick boundary.
// Scene-switching commands go to the scene manager; signals are handed
// to the active scene's frame.
//
//=========================================================================

//=== SceneSignal =========================================================

/// One-shot trigger delivered to the active scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneSignal {
    /// Launch the scene's ready projectile (click, tap, Space).
    Launch,
}

//=== GalleryCommand ======================================================

/// Request processed by the core at the next tick boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GalleryCommand {
    /// Switch to the scene with this id.
    SwitchTo(String),

    /// Switch to the n-th scene in listing order (zero based).
    SelectIndex(usize),

    /// Switch to the next scene, wrapping around.
    Next,

    /// Switch to the previous scene, wrapping around.
    Previous,

    /// Forward a signal to the active scene.
    Signal(SceneSignal),
}

//=== CommandQueue ========================================================

/// Queue of commands waiting for the next tick boundary.
#[derive(Debug, Default)]
pub struct CommandQueue {
    queue: Vec<GalleryCommand>,
}

impl CommandQueue {
    /// Creates a new empty command queue.
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Queues a command to be processed at the next tick boundary.
    pub fn push(&mut self, command: GalleryCommand) {
        self.queue.push(command);
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of queued commands.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Takes all commands from the queue, leaving it empty.
    pub fn take(&mut self) -> Vec<GalleryCommand> {
        std::mem::take(&mut self.queue)
    }
}

impl Extend<GalleryCommand> for CommandQueue {
    fn extend<T: IntoIterator<Item = GalleryCommand>>(&mut self, iter: T) {
        self.queue.extend(iter);
    }
}

//=== Tests ===============================================================
