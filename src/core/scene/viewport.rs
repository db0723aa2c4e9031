//=========================================================================
// Viewport Adaptation
//=========================================================================
//
// Pure mapping from viewport metrics and scene camera config to the
// camera the renderer should use. No hidden state: same input, same rig.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec3;

//=== Internal Dependencies ===============================================

use super::metadata::SceneConfig;

//=== Viewport ============================================================

/// Logical viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const MOBILE_BREAKPOINT: u32 = 768;
    pub const DESKTOP_BREAKPOINT: u32 = 1024;

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_portrait(&self) -> bool {
        self.width <= self.height
    }

    pub fn class(&self) -> ViewportClass {
        ViewportClass::classify(self)
    }

    /// Width over height; 1.0 for a degenerate viewport.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

//=== ViewportClass =======================================================

/// Coarse device bucket used for camera adaptation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportClass {
    MobilePortrait,
    MobileLandscape,
    Tablet,
    Desktop,
}

impl ViewportClass {
    pub fn classify(viewport: &Viewport) -> Self {
        if viewport.width < Viewport::MOBILE_BREAKPOINT {
            if viewport.is_portrait() {
                Self::MobilePortrait
            } else {
                Self::MobileLandscape
            }
        } else if viewport.width < Viewport::DESKTOP_BREAKPOINT {
            Self::Tablet
        } else {
            Self::Desktop
        }
    }

    /// Field of view override for this class; desktop keeps the scene's own.
    fn fov_override(self) -> Option<f32> {
        match self {
            Self::MobilePortrait => Some(70.0),
            Self::MobileLandscape => Some(60.0),
            Self::Tablet => Some(65.0),
            Self::Desktop => None,
        }
    }
}

//=== CameraRig ===========================================================

/// Resolved camera for the current viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl CameraRig {
    /// Unit vector from the camera toward the scene origin.
    ///
    /// Falls back to `-Z` when the camera sits on the origin.
    pub fn forward(&self) -> Vec3 {
        let toward_origin = -self.position;
        if toward_origin.length_squared() > f32::EPSILON {
            toward_origin.normalize()
        } else {
            Vec3::NEG_Z
        }
    }
}

/// Camera pull-back applied in mobile portrait.
const PORTRAIT_PULL_BACK: f32 = 1.3;

/// Resolves the camera for a scene config on the given viewport.
pub fn responsive_camera(config: &SceneConfig, viewport: &Viewport) -> CameraRig {
    let class = viewport.class();
    let camera = &config.camera;

    let mut position = camera.position;
    if class == ViewportClass::MobilePortrait {
        position.z *= PORTRAIT_PULL_BACK;
    }

    CameraRig {
        position,
        fov: class.fov_override().unwrap_or(camera.fov),
        near: camera.near,
        far: camera.far,
        aspect: viewport.aspect(),
    }
}

//=== Tests ===============================================================
