//=========================================================================
// Scene Errors
//=========================================================================
//
// Failures a scene can report back to the registry.
//
// Errors are stored on registry entries and surfaced to observers, so
// they carry owned messages and are cheap to clone.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== SceneError ==========================================================

/// Error recorded against a registry entry.
///
/// Registration conflicts and unknown ids are not errors (they are logged
/// and ignored); only failures raised by a scene itself end up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// `Scene::init` failed or its pending future resolved to an error.
    #[error("scene initialization failed: {0}")]
    Init(String),

    /// The scene hit an unrecoverable failure while producing a frame.
    #[error("scene render failed: {0}")]
    Render(String),

    /// A resource the scene depends on could not be acquired.
    #[error("scene resource unavailable: {0}")]
    Unavailable(String),
}

impl SceneError {
    /// Shorthand for [`SceneError::Init`].
    pub fn init(message: impl Into<String>) -> Self {
        Self::Init(message.into())
    }

    /// Shorthand for [`SceneError::Render`].
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = SceneError::init("texture missing");
        assert_eq!(err.to_string(), "scene initialization failed: texture missing");

        let err = SceneError::render("lost context");
        assert_eq!(err.to_string(), "scene render failed: lost context");
    }

    #[test]
    fn is_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<SceneError>();
    }
}
