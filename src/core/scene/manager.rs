//=========================================================================
// Scene Manager
//=========================================================================
//
// Owns the single active scene and the transition between two of them.
//
// The manager is tick driven: `switch_scene` only starts a transition,
// and `update` advances it (fade timers, polling a pending `init`) before
// driving the active scene's frame. At most one transition is in flight;
// requests made during a transition are dropped.
//
// Switch sequence:
//   FadingOut(target) → cleanup outgoing → init target → FadingIn → Active
//
// A failed init records the error on the registry entry and falls back
// to re-initializing the last good scene, or to "no active scene".
//
// The registry holds a lease on the active entry. If the host overwrites
// or removes that entry, the registry cleans the scene up immediately and
// the manager stops reporting it; the next call reconciles the phase.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::task::{Context, Poll};

use futures::task::noop_waker_ref;
use futures::FutureExt;
use log::{debug, error, info, trace, warn};

//=== Internal Dependencies ===============================================

use super::registry::ActiveLease;
use super::viewport::responsive_camera;
use super::{InitFuture, SceneError, SceneFrame, SceneInit, SceneRegistry, TransitionConfig};
use crate::core::globals::GlobalContext;

//=== Lifecycle ===========================================================

/// Externally visible manager state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Nothing requested yet.
    Idle,
    /// First scene is initializing; nothing is visible yet.
    Initializing,
    /// A scene is active and no transition is running.
    Active,
    /// Switching between scenes.
    Transitioning,
    /// No scene could be activated; show the placeholder.
    Error,
}

//=== SwitchOutcome =======================================================

/// Result of a switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchOutcome {
    /// A transition toward the requested scene started.
    Started,
    /// The requested scene is already active; nothing changed.
    AlreadyActive,
    /// Another transition is running; the request was dropped.
    InProgress,
    /// No such scene in the registry; nothing changed.
    UnknownScene,
}

//=== Internal State ======================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitOrigin {
    /// First activation; no fade-in.
    Startup,
    /// User-requested switch.
    Switch,
    /// Re-activating the last good scene after a failed switch.
    Fallback,
}

struct PendingInit {
    target: String,
    revision: u64,
    origin: InitOrigin,
    future: InitFuture,
}

enum Phase {
    Idle,
    Active,
    Failed,
    FadingOut { target: String, elapsed: f32 },
    Initializing(PendingInit),
    FadingIn { elapsed: f32 },
}

#[derive(Debug, Clone)]
struct ActiveScene {
    id: String,
    revision: u64,
    lease: ActiveLease,
    ready_reported: bool,
}

impl ActiveScene {
    fn is_current(&self) -> bool {
        !self.lease.is_displaced()
    }
}

type SceneChangeCallback = Box<dyn FnMut(&str) + Send>;

//=== Scene Manager =======================================================

/// Tracks exactly one active scene and mediates switching.
///
/// The registry is passed into every call rather than owned, so the
/// same registry can be observed and mutated by other collaborators
/// between ticks.
pub struct SceneManager {
    transition: TransitionConfig,
    phase: Phase,
    active: Option<ActiveScene>,
    last_good: Option<String>,
    last_error: Option<(String, SceneError)>,
    on_change: Option<SceneChangeCallback>,
}

impl SceneManager {
    //--- Construction -----------------------------------------------------

    /// Creates an idle manager with the default fade transition.
    pub fn new() -> Self {
        Self::with_transition(TransitionConfig::default())
    }

    pub fn with_transition(transition: TransitionConfig) -> Self {
        Self {
            transition,
            phase: Phase::Idle,
            active: None,
            last_good: None,
            last_error: None,
            on_change: None,
        }
    }

    /// Replaces the transition used by subsequent switches.
    pub fn set_transition(&mut self, transition: TransitionConfig) {
        self.transition = transition;
    }

    /// Registers a callback invoked with the id of each newly active scene.
    pub fn on_scene_change<F>(&mut self, callback: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_change = Some(Box::new(callback));
    }

    //--- Queries ----------------------------------------------------------

    pub fn lifecycle(&self) -> Lifecycle {
        match &self.phase {
            Phase::Idle => Lifecycle::Idle,
            Phase::Active => Lifecycle::Active,
            Phase::Failed => Lifecycle::Error,
            Phase::Initializing(init) if init.origin == InitOrigin::Startup => {
                Lifecycle::Initializing
            }
            Phase::Initializing(_) | Phase::FadingOut { .. } | Phase::FadingIn { .. } => {
                Lifecycle::Transitioning
            }
        }
    }

    /// Id of the scene currently shown, if any.
    ///
    /// Becomes `None` as soon as the active entry is removed from or
    /// replaced in the registry.
    pub fn active_scene_id(&self) -> Option<&str> {
        self.active
            .as_ref()
            .filter(|active| active.is_current())
            .map(|active| active.id.as_str())
    }

    /// Id of the scene a running transition is heading to.
    pub fn pending_scene_id(&self) -> Option<&str> {
        match &self.phase {
            Phase::FadingOut { target, .. } => Some(target),
            Phase::Initializing(init) => Some(&init.target),
            _ => None,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(
            self.phase,
            Phase::FadingOut { .. } | Phase::Initializing(_) | Phase::FadingIn { .. }
        )
    }

    /// Most recent initialization failure, cleared when a new switch starts.
    pub fn last_error(&self) -> Option<(&str, &SceneError)> {
        self.last_error.as_ref().map(|(id, err)| (id.as_str(), err))
    }

    /// Opacity the renderer should apply to the scene layer.
    pub fn opacity(&self) -> f32 {
        let easing = self.transition.easing;
        match &self.phase {
            Phase::FadingOut { elapsed, .. } => 1.0 - easing.apply(self.transition.progress(*elapsed)),
            Phase::Initializing(init) if init.origin != InitOrigin::Startup && self.transition.is_timed() => 0.0,
            Phase::FadingIn { elapsed } => easing.apply(self.transition.progress(*elapsed)),
            _ => 1.0,
        }
    }

    //--- Scene Selection --------------------------------------------------

    /// Activates the initial scene.
    ///
    /// Uses `initial` if registered, otherwise the first registered scene.
    /// Does nothing unless the manager is idle or showing the placeholder.
    pub fn start(&mut self, registry: &mut SceneRegistry, initial: Option<&str>) {
        self.reconcile(registry);
        if !matches!(self.phase, Phase::Idle | Phase::Failed) {
            debug!(target: "scene", "Scene manager already started");
            return;
        }

        let requested = initial.filter(|id| {
            let known = registry.has(id);
            if !known {
                warn!(target: "scene", "Initial scene {:?} not registered, using first scene", id);
            }
            known
        });

        let Some(id) = requested.or_else(|| registry.ids().first().map(String::as_str)) else {
            info!(target: "scene", "No scenes registered, showing placeholder");
            return;
        };

        debug!(target: "scene", "Starting scene manager with initial scene: {:?}", id);
        let id = id.to_owned();
        self.begin_init(registry, id, InitOrigin::Startup);
    }

    /// Requests a switch to `id`.
    ///
    /// No-op if `id` is already active, a transition is running, or `id`
    /// is unknown. Otherwise starts the transition; with an untimed
    /// transition and a synchronous `init` it completes before returning.
    pub fn switch_scene(&mut self, registry: &mut SceneRegistry, id: &str) -> SwitchOutcome {
        self.reconcile(registry);

        if self.active_scene_id() == Some(id) {
            debug!(target: "scene", "Scene {:?} is already active", id);
            return SwitchOutcome::AlreadyActive;
        }

        if self.is_transitioning() {
            debug!(target: "scene", "Transition in progress, dropping switch to {:?}", id);
            return SwitchOutcome::InProgress;
        }

        if !registry.has(id) {
            warn!(target: "scene", "Scene {:?} not found in registry", id);
            return SwitchOutcome::UnknownScene;
        }

        self.last_error = None;

        if self.active.is_none() {
            self.begin_init(registry, id.to_owned(), InitOrigin::Startup);
        } else if self.transition.is_timed() {
            debug!(target: "scene", "Fading out toward {:?}", id);
            self.phase = Phase::FadingOut {
                target: id.to_owned(),
                elapsed: 0.0,
            };
        } else {
            self.release_active(registry);
            self.begin_init(registry, id.to_owned(), InitOrigin::Switch);
        }

        SwitchOutcome::Started
    }

    /// Switches to the scene at `index` in listing order.
    pub fn select_index(&mut self, registry: &mut SceneRegistry, index: usize) -> SwitchOutcome {
        match registry.ids().get(index).cloned() {
            Some(id) => self.switch_scene(registry, &id),
            None => {
                warn!(target: "scene", "No scene at index {}", index);
                SwitchOutcome::UnknownScene
            }
        }
    }

    /// Switches to the scene after the active one, wrapping around.
    pub fn next_scene(&mut self, registry: &mut SceneRegistry) -> Option<SwitchOutcome> {
        self.step_scene(registry, 1)
    }

    /// Switches to the scene before the active one, wrapping around.
    pub fn previous_scene(&mut self, registry: &mut SceneRegistry) -> Option<SwitchOutcome> {
        self.step_scene(registry, -1)
    }

    fn step_scene(&mut self, registry: &mut SceneRegistry, step: isize) -> Option<SwitchOutcome> {
        let count = registry.ids().len();
        if count <= 1 {
            return None;
        }

        let current = self.active_scene_id()?;
        let index = registry.ids().iter().position(|id| id == current)?;
        let next = (index as isize + step).rem_euclid(count as isize) as usize;
        Some(self.select_index(registry, next))
    }

    //--- Update Loop ------------------------------------------------------

    /// Advances the transition and drives the active scene for one frame.
    pub fn update(&mut self, registry: &mut SceneRegistry, context: &GlobalContext) {
        self.reconcile(registry);
        self.advance(registry, context.tick.delta);
        self.drive_active(registry, context);
    }

    /// Cleans up the active scene and returns to idle.
    ///
    /// A pending initialization is abandoned.
    pub fn shutdown(&mut self, registry: &mut SceneRegistry) {
        debug!(target: "scene", "Shutting down scene manager");
        self.release_active(registry);
        self.phase = Phase::Idle;
    }

    //--- Internal Helpers -------------------------------------------------

    /// Forgets an active scene the registry displaced (its cleanup already
    /// ran), then goes idle if it was unregistered or initializes the new
    /// instance if it was re-registered under the same id.
    fn reconcile(&mut self, registry: &mut SceneRegistry) {
        if self.active.as_ref().map_or(true, ActiveScene::is_current) {
            return;
        }
        let Some(active) = self.active.take() else {
            return;
        };

        if !registry.has(&active.id) && self.last_good.as_deref() == Some(active.id.as_str()) {
            self.last_good = None;
        }

        // A fade-out keeps heading to its target.
        if !matches!(self.phase, Phase::Active | Phase::FadingIn { .. }) {
            return;
        }

        if registry.has(&active.id) {
            info!(target: "scene", "Active scene {:?} was re-registered, re-initializing", active.id);
            self.begin_init(registry, active.id, InitOrigin::Startup);
        } else {
            warn!(target: "scene", "Active scene {:?} was unregistered", active.id);
            self.phase = Phase::Idle;
        }
    }

    fn advance(&mut self, registry: &mut SceneRegistry, mut dt: f32) {
        let duration = self.transition.duration_secs();

        loop {
            match &mut self.phase {
                Phase::FadingOut { target, elapsed } => {
                    *elapsed += dt;
                    dt = 0.0;
                    if *elapsed < duration {
                        return;
                    }
                    let target = std::mem::take(target);
                    self.release_active(registry);
                    self.begin_init(registry, target, InitOrigin::Switch);
                }
                Phase::Initializing(_) => {
                    if !self.poll_init(registry) {
                        return;
                    }
                }
                Phase::FadingIn { elapsed } => {
                    *elapsed += dt;
                    dt = 0.0;
                    if *elapsed < duration {
                        return;
                    }
                    debug!(target: "scene", "Transition complete");
                    self.phase = Phase::Active;
                }
                Phase::Idle | Phase::Active | Phase::Failed => return,
            }
        }
    }

    /// Runs the outgoing scene's cleanup.
    ///
    /// A panic inside `cleanup` propagates to the caller.
    fn release_active(&mut self, registry: &mut SceneRegistry) {
        let Some(active) = self.active.take() else {
            return;
        };
        if !active.is_current() {
            debug!(target: "scene", "Scene {:?} was already cleaned up by the registry", active.id);
            return;
        }

        registry.clear_active();
        if let Some(entry) = registry.entry_mut(&active.id) {
            debug!(target: "scene", "Cleaning up scene {:?}", active.id);
            entry.scene_mut().cleanup();
        }
    }

    fn begin_init(&mut self, registry: &mut SceneRegistry, target: String, origin: InitOrigin) {
        let Some(entry) = registry.entry_mut(&target) else {
            warn!(target: "scene", "Scene {:?} vanished before initialization", target);
            self.fall_back(registry, &target);
            return;
        };

        debug!(target: "scene", "Initializing scene {:?}", target);
        let revision = entry.revision();
        match entry.scene_mut().init() {
            SceneInit::Ready => self.activate(registry, target, revision, origin),
            SceneInit::Failed(err) => self.init_failed(registry, target, err),
            SceneInit::Pending(future) => {
                self.phase = Phase::Initializing(PendingInit {
                    target,
                    revision,
                    origin,
                    future,
                });
            }
        }
    }

    /// Polls a pending init once. Returns `false` while it is still pending.
    fn poll_init(&mut self, registry: &mut SceneRegistry) -> bool {
        let Phase::Initializing(init) = &mut self.phase else {
            return true;
        };

        let mut cx = Context::from_waker(noop_waker_ref());
        let result = match init.future.poll_unpin(&mut cx) {
            Poll::Pending => return false,
            Poll::Ready(result) => result,
        };

        if let Phase::Initializing(init) = std::mem::replace(&mut self.phase, Phase::Idle) {
            let still_registered = registry
                .get(&init.target)
                .is_some_and(|entry| entry.revision() == init.revision);

            match result {
                _ if !still_registered => {
                    warn!(target: "scene", "Scene {:?} changed during initialization", init.target);
                    self.fall_back(registry, &init.target);
                }
                Ok(()) => self.activate(registry, init.target, init.revision, init.origin),
                Err(err) => self.init_failed(registry, init.target, err),
            }
        }
        true
    }

    fn activate(&mut self, registry: &mut SceneRegistry, id: String, revision: u64, origin: InitOrigin) {
        info!(target: "scene", "Scene {:?} is now active", id);
        let lease = registry.set_active(&id);

        if let Some(callback) = &mut self.on_change {
            callback(&id);
        }

        self.last_good = Some(id.clone());
        self.active = Some(ActiveScene {
            id,
            revision,
            lease,
            ready_reported: false,
        });

        self.phase = if origin != InitOrigin::Startup && self.transition.is_timed() {
            Phase::FadingIn { elapsed: 0.0 }
        } else {
            Phase::Active
        };
    }

    fn init_failed(&mut self, registry: &mut SceneRegistry, id: String, err: SceneError) {
        error!(target: "scene", "Error initializing scene {:?}: {}", id, err);
        registry.mark_as_error(&id, err.clone());
        self.last_error = Some((id.clone(), err));
        self.fall_back(registry, &id);
    }

    /// Re-activates the last good scene, or shows the placeholder.
    fn fall_back(&mut self, registry: &mut SceneRegistry, failed: &str) {
        if self.last_good.as_deref() == Some(failed) {
            self.last_good = None;
        }

        match self.last_good.clone().filter(|id| registry.has(id)) {
            Some(previous) => {
                info!(target: "scene", "Falling back to scene {:?}", previous);
                self.begin_init(registry, previous, InitOrigin::Fallback);
            }
            None => {
                warn!(target: "scene", "No scene could be activated");
                self.active = None;
                self.phase = Phase::Failed;
            }
        }
    }

    /// Runs the active scene's frame and relays its ready/error report.
    fn drive_active(&mut self, registry: &mut SceneRegistry, context: &GlobalContext) {
        let is_active = matches!(self.phase, Phase::Active);
        let Some(active) = self.active.as_mut().filter(|active| active.is_current()) else {
            return;
        };
        let Some(entry) = registry.entry_mut(&active.id) else {
            return;
        };
        if entry.revision() != active.revision {
            return;
        }

        let camera = responsive_camera(entry.config(), &context.viewport);
        let mut frame = SceneFrame::new(context.tick, is_active, camera, &context.signals);
        entry.scene_mut().frame(&mut frame);
        let (ready, failure) = frame.into_report();

        trace!(target: "scene", "Frame {} for {:?} (active: {})", context.tick.frame, active.id, is_active);

        if ready && !active.ready_reported {
            active.ready_reported = true;
            registry.mark_as_loaded(&active.id);
        }
        if let Some(err) = failure {
            error!(target: "scene", "Scene {:?} reported an error: {}", active.id, err);
            registry.mark_as_error(&active.id, err);
        }
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneManager")
            .field("lifecycle", &self.lifecycle())
            .field("active", &self.active_scene_id())
            .field("pending", &self.pending_scene_id())
            .field("transition", &self.transition)
            .finish()
    }
}

//=== Tests ===============================================================
