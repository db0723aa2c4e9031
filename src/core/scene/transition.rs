//=========================================================================
// Scene Transitions
//=========================================================================
//
// Visual configuration for switching between two active scenes.
//
// The manager only needs to know whether a transition is timed and how
// long each half lasts; kind and easing are forwarded to the renderer
// through `SceneManager::opacity()`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== TransitionKind ======================================================

/// Transition style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionKind {
    #[default]
    Fade,
    Slide,
    Zoom,
    /// Instant swap, no waiting.
    None,
}

//=== Easing ==============================================================

/// Easing curve applied to transition progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
}

impl Easing {
    /// Maps linear progress `t` to eased progress, both in `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

//=== TransitionConfig ====================================================

/// Full transition description.
///
/// `duration` applies to each half: fade-out of the outgoing scene and
/// fade-in of the incoming one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionConfig {
    pub kind: TransitionKind,
    pub duration: Duration,
    pub easing: Easing,
}

impl TransitionConfig {
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(300);

    /// Instant transition.
    pub fn none() -> Self {
        Self {
            kind: TransitionKind::None,
            duration: Duration::ZERO,
            easing: Easing::Linear,
        }
    }

    /// Fade with the given half-duration and default easing.
    pub fn fade(duration: Duration) -> Self {
        Self {
            kind: TransitionKind::Fade,
            duration,
            easing: Easing::default(),
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Whether switching waits on a clock-driven phase.
    pub fn is_timed(&self) -> bool {
        self.kind != TransitionKind::None && !self.duration.is_zero()
    }

    pub(crate) fn duration_secs(&self) -> f32 {
        self.duration.as_secs_f32()
    }

    /// Linear progress of a phase that has run for `elapsed` seconds.
    pub(crate) fn progress(&self, elapsed: f32) -> f32 {
        let total = self.duration_secs();
        if total <= 0.0 {
            1.0
        } else {
            (elapsed / total).clamp(0.0, 1.0)
        }
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self::fade(Self::DEFAULT_DURATION)
    }
}

//=== Tests ===============================================================
