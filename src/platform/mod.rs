//=========================================================================
// Platform Subsystem
//
// Bridges winit (OS-level events) with the gallery's core thread via a
// crossbeam channel.
//
// Architecture:
// ```text
//  Main Thread:                     Logic Thread:
//  ┌──────────────────────────┐    ┌──────────────────┐
//  │  Winit Event Loop        │    │  Core Systems    │
//  │   ↓                      │    │                  │
//  │  CommandMapper           │    │  GlobalSystems   │
//  │   └─ keys/clicks → cmds  │    │  ↓               │
//  │   ↓                      │    │  SceneManager    │
//  │  CommandBuffer           │    │  ↓               │
//  │   ├─ commands: Vec<>     │    │  Active Scene    │
//  │   └─ viewport: latest    │    │                  │
//  │   ↓                      │    └──────────────────┘
//  │  RedrawRequested         │             ↑
//  │   ↓ (flush)              │             │
//  │  Channel ────────────────┼─────────────┘
//  └──────────────────────────┘    PlatformEvent
//
//  Frame Boundary: RedrawRequested
//    → Resize (if any) sent before the frame's commands
//    → Core processes at fixed TPS (independent of refresh rate)
//    → Empty buffers NOT sent
// ```
//
// Key Design Decisions:
// - **RedrawRequested = frame boundary**: batches commands atomically
// - **Logical pixels**: viewport sizes are sent in logical pixels, which
//   is what the viewport breakpoints are expressed in
// - **Graceful channel disconnect**: if the core thread dies, the
//   platform logs a warning but keeps running so the window can close
// - **Main thread requirement**: winit mandates the main thread on
//   macOS/iOS, so this runs on the thread that called `Engine::run()`
//
//=========================================================================

//=== Submodules ==========================================================

mod command_buffer;
mod command_mapper;

//=== External Crates =====================================================

use crossbeam_channel::Sender;
use log::*;
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes},
};

//=== Internal Imports ====================================================

use crate::core::command::GalleryCommand;
use command_buffer::CommandBuffer;
use command_mapper::CommandMapper;

//=== PlatformEvent =======================================================

/// Events sent from the platform layer to the core thread.
///
/// These are the only messages that cross the thread boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlatformEvent {
    /// Gallery commands collected during one frame, in arrival order.
    ///
    /// **Note**: empty batches are NOT sent.
    Commands(Vec<GalleryCommand>),

    /// Window resized; size in logical pixels.
    Resized { width: u32, height: u32 },

    /// Window close requested by user or OS.
    ///
    /// Core thread cleans up the active scene and terminates.
    WindowClosed,
}

//=== PlatformError =======================================================

/// Platform initialization and runtime errors.
///
/// These are fatal: if the event loop can't be created, the gallery
/// cannot run.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Failed to create event loop (rare, indicates OS-level issue).
    #[error("Event loop creation failed: {0}")]
    EventLoopCreation(#[source] winit::error::EventLoopError),

    /// Event loop execution error.
    #[error("Event loop error: {0}")]
    EventLoopExecution(#[source] winit::error::EventLoopError),
}

//=== Platform ============================================================

/// Window manager and command aggregator.
///
/// Runs on the main thread (winit requirement on macOS/iOS) and sends
/// batched events to the core thread.
///
/// # Lifecycle
///
/// 1. **Construction**: `Platform::new(sender, title)`
/// 2. **Execution**: `platform.run()` starts the event loop
/// 3. **Event processing**: winit calls `ApplicationHandler` methods
/// 4. **Shutdown**: user closes window → sends `WindowClosed` → exits
///
/// # Fields
///
/// - `window`: created lazily in `resumed()` (mobile compatibility)
/// - `buffer`: accumulates commands until `RedrawRequested`
/// - `event_sender`: channel to the core thread
pub(crate) struct Platform {
    /// OS window handle (None until `resumed()` called).
    window: Option<Window>,

    /// Window title.
    title: String,

    /// Buffers commands and resizes until the frame boundary.
    buffer: CommandBuffer,

    /// Channel to send events to core thread.
    event_sender: Sender<PlatformEvent>,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    /// Creates a new platform instance with the given event sender.
    ///
    /// Does not create the window yet; that happens in `resumed()`.
    pub fn new(event_sender: Sender<PlatformEvent>, title: impl Into<String>) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window: None,
            title: title.into(),
            buffer: CommandBuffer::new(),
            event_sender,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the winit event loop until the window closes.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop cannot be created or
    /// exits with an error.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread (macOS/iOS winit requirement).
    pub fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;

        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)
    }

    //--- Internal Helpers -------------------------------------------------

    /// Records a resize in logical pixels.
    fn record_resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        let logical: LogicalSize<u32> = size.to_logical(scale_factor);
        trace!(target: "platform", "Resized to {}x{} (logical)", logical.width, logical.height);
        self.buffer.set_viewport(logical.width, logical.height);
    }

    /// Flushes buffered commands to the core thread.
    ///
    /// If the channel is disconnected (core thread panicked or exited
    /// early), logs a warning and drops the batch so the platform thread
    /// keeps running until the user closes the window.
    fn flush_command_buffer(&mut self) {
        let Some(batch) = self.buffer.drain() else {
            return;
        };

        if let Some((width, height)) = batch.viewport {
            if self.event_sender.send(PlatformEvent::Resized { width, height }).is_err() {
                warn!(target: "platform", "Channel disconnected, dropping resize");
            }
        }

        if !batch.commands.is_empty() {
            let count = batch.commands.len();
            trace!(target: "platform", "Flushing {} commands", count);

            if self.event_sender.send(PlatformEvent::Commands(batch.commands)).is_err() {
                warn!(target: "platform", "Channel disconnected, dropping {} commands", count);
            }
        }
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    /// Called when app becomes active (startup or mobile resume).
    ///
    /// Creates the window if it doesn't exist yet and reports its size.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(1280, 720));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                self.record_resize(window.inner_size(), window.scale_factor());
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                let _ = self.event_sender.send(PlatformEvent::WindowClosed);
                event_loop.exit();
            }
        }
    }

    /// Handles per-window events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                let _ = self.event_sender.send(PlatformEvent::WindowClosed);
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                let scale_factor = self.window.as_ref().map_or(1.0, Window::scale_factor);
                self.record_resize(*size, scale_factor);
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                match CommandMapper::process_key_event(key_event) {
                    Some(command) => self.buffer.push(command),
                    None => trace!(target: "platform", "Unbound key ignored"),
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(command) = CommandMapper::process_mouse_button(*button, *state) {
                    self.buffer.push(command);
                }
            }

            WindowEvent::RedrawRequested => {
                // Frame boundary: flush all buffered commands
                self.flush_command_buffer();

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {
                // Ignore: Focused, CursorMoved, etc.
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::SceneSignal;
    use crossbeam_channel::unbounded;

    //=====================================================================
    // PlatformEvent Tests
    //=====================================================================

    #[test]
    fn platform_event_is_debug() {
        let event = PlatformEvent::WindowClosed;
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("WindowClosed"));
    }

    //=====================================================================
    // Platform Tests
    //=====================================================================

    #[test]
    fn platform_creation() {
        let (tx, _rx) = unbounded();
        let platform = Platform::new(tx, "Vignette");
        assert!(platform.window().is_none(), "Window should be created lazily");
    }

    #[test]
    fn flush_empty_buffer_is_noop() {
        let (tx, rx) = unbounded();
        let mut platform = Platform::new(tx, "Vignette");

        platform.flush_command_buffer();

        assert!(rx.try_recv().is_err(), "No events should be sent for empty buffer");
    }

    #[test]
    fn flush_sends_resize_before_commands() {
        let (tx, rx) = unbounded();
        let mut platform = Platform::new(tx, "Vignette");

        platform.buffer.push(GalleryCommand::Signal(SceneSignal::Launch));
        platform.record_resize(PhysicalSize::new(1600, 1200), 2.0);
        platform.flush_command_buffer();

        assert_eq!(rx.try_recv(), Ok(PlatformEvent::Resized { width: 800, height: 600 }));
        assert_eq!(
            rx.try_recv(),
            Ok(PlatformEvent::Commands(vec![GalleryCommand::Signal(SceneSignal::Launch)]))
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn flush_handles_disconnected_channel() {
        let (tx, rx) = unbounded();
        let mut platform = Platform::new(tx, "Vignette");
        platform.buffer.push(GalleryCommand::Next);

        drop(rx);

        // Should not panic, just log warning
        platform.flush_command_buffer();
        assert!(platform.buffer.is_empty());
    }

    //=====================================================================
    // PlatformError Tests
    //=====================================================================

    #[test]
    fn platform_error_is_error_trait() {
        fn assert_error<T: std::error::Error + 'static>() {}
        assert_error::<PlatformError>();
    }
}
