//=========================================================================
// Scene Metadata & Configuration
//=========================================================================
//
// Identity record and rendering hints attached to every scene.
//
// Metadata is captured once at registration and never changes afterwards.
// Configuration is read-only and interpreted by the external renderer;
// the core only uses the camera block (viewport adaptation) and the
// pixel ratio cap.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeSet;

use glam::Vec3;

//=== SceneMetadata =======================================================

/// Identity and catalog information for a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneMetadata {
    /// Unique registry key.
    pub id: String,
    /// Display name shown by selector UIs.
    pub name: String,
    pub description: Option<String>,
    pub tags: BTreeSet<String>,
    pub author: Option<String>,
    /// Thumbnail URL or asset path.
    pub thumbnail: Option<String>,
}

impl SceneMetadata {
    /// Creates metadata with the given id and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            tags: BTreeSet::new(),
            author: None,
            thumbnail: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds tags; duplicates collapse.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// Returns `true` if the scene carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

//=== Lighting ============================================================

/// Lighting preset requested from the renderer.
///
/// Opaque to the core; passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lighting {
    #[default]
    Default,
    Studio,
    Dramatic,
    Minimal,
    None,
}

//=== CameraConfig ========================================================

/// Initial camera placement for a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

//=== PerformanceConfig ===================================================

/// Renderer performance hints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceConfig {
    pub shadows: bool,
    pub antialias: bool,
    /// Upper bound for the device pixel ratio, if any.
    pub max_pixel_ratio: Option<f32>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            shadows: false,
            antialias: true,
            max_pixel_ratio: None,
        }
    }
}

impl PerformanceConfig {
    /// Device pixel ratio after applying the configured cap.
    pub fn pixel_ratio(&self, device_ratio: f32) -> f32 {
        match self.max_pixel_ratio {
            Some(cap) => device_ratio.min(cap),
            None => device_ratio,
        }
    }
}

//=== SceneConfig =========================================================

/// Optional rendering hints supplied by a scene.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub lighting: Lighting,
    pub performance: PerformanceConfig,
}

//=== Tests ===============================================================
