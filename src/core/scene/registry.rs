//=========================================================================
// Scene Registry
//=========================================================================
//
// Single source of truth for every known scene and its load/error state.
//
// Entries are stored in a HashMap keyed by scene id, with a separate
// insertion-order list so listings are stable. Observers are plain
// closures called after each mutation; they cannot reach back into the
// registry, so notification never re-enters a mutating call.
//
// Misuse (duplicate ids, unknown ids) is logged and ignored. The registry
// stays usable after anything a caller does to it.
//
// The registry also remembers which entry the scene manager has active.
// Overwriting or removing that entry runs the displaced scene's cleanup
// on the spot and flips the manager's lease, so an active id always
// names a registered scene.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::{Scene, SceneConfig, SceneError, SceneMetadata};

//=== Registration ========================================================

/// Result of [`SceneRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The id was new.
    Inserted,
    /// An entry with the same id existed and was overwritten.
    Replaced,
}

//=== SceneStatus =========================================================

/// Load state as shown to selector UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneStatus {
    /// Registered, never produced a frame.
    Pending,
    /// Produced at least one frame, no error recorded.
    Loaded,
    /// An error is recorded; listings should flag or disable the scene.
    Failed,
}

//=== SceneRegistryEntry ==================================================

/// A registered scene plus its mutable load/error state.
pub struct SceneRegistryEntry {
    metadata: SceneMetadata,
    config: SceneConfig,
    scene: Box<dyn Scene>,
    is_loaded: bool,
    error: Option<SceneError>,
    revision: u64,
}

impl SceneRegistryEntry {
    pub fn metadata(&self) -> &SceneMetadata {
        &self.metadata
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub fn error(&self) -> Option<&SceneError> {
        self.error.as_ref()
    }

    /// Errors take precedence over the loaded flag.
    pub fn status(&self) -> SceneStatus {
        if self.error.is_some() {
            SceneStatus::Failed
        } else if self.is_loaded {
            SceneStatus::Loaded
        } else {
            SceneStatus::Pending
        }
    }

    /// Registration counter; changes whenever the id is re-registered.
    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn scene_mut(&mut self) -> &mut dyn Scene {
        self.scene.as_mut()
    }
}

impl fmt::Debug for SceneRegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneRegistryEntry")
            .field("metadata", &self.metadata)
            .field("is_loaded", &self.is_loaded)
            .field("error", &self.error)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

//=== SceneListing ========================================================

/// Owned summary of an entry for selector UIs.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneListing {
    pub metadata: SceneMetadata,
    pub status: SceneStatus,
}

//=== Subscriptions =======================================================

/// Handle returned by [`SceneRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut() + Send>;

//=== Active Lease ========================================================

/// Manager-side handle on the registry's active entry.
///
/// Reports `is_displaced()` once the entry was overwritten or removed and
/// its scene already cleaned up by the registry.
#[derive(Debug, Clone)]
pub(crate) struct ActiveLease {
    displaced: Arc<AtomicBool>,
}

impl ActiveLease {
    pub(crate) fn is_displaced(&self) -> bool {
        self.displaced.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct ActiveMark {
    id: String,
    displaced: Arc<AtomicBool>,
}

//=== SceneRegistry =======================================================

/// Keyed catalog of scenes with change notification.
///
/// Constructed explicitly and passed by reference to the manager and any
/// observers, so tests can run isolated instances.
#[derive(Default)]
pub struct SceneRegistry {
    entries: HashMap<String, SceneRegistryEntry>,
    order: Vec<String>,
    observers: Vec<(SubscriptionId, Observer)>,
    active: Option<ActiveMark>,
    next_subscription: u64,
    next_revision: u64,
}

impl SceneRegistry {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Registers a scene under its metadata id.
    ///
    /// An existing entry with the same id is overwritten (keeping its
    /// listing position) and a warning is logged. Load and error state
    /// start fresh either way. Overwriting the active entry cleans up the
    /// displaced scene first.
    pub fn register<T>(&mut self, scene: T) -> Registration
    where
        T: Scene + 'static,
    {
        self.register_boxed(Box::new(scene))
    }

    /// Registers an already boxed scene.
    pub fn register_boxed(&mut self, scene: Box<dyn Scene>) -> Registration {
        let metadata = scene.metadata();
        let config = scene.config();
        let id = metadata.id.clone();

        self.next_revision += 1;
        let entry = SceneRegistryEntry {
            metadata,
            config,
            scene,
            is_loaded: false,
            error: None,
            revision: self.next_revision,
        };

        let outcome = if let Some(mut previous) = self.entries.insert(id.clone(), entry) {
            warn!(target: "registry", "Scene {:?} is already registered. Overwriting.", id);
            self.displace(&id, &mut previous);
            Registration::Replaced
        } else {
            debug!(target: "registry", "Registered scene {:?}", id);
            self.order.push(id);
            Registration::Inserted
        };

        self.notify();
        outcome
    }

    /// Registers each scene in order; later duplicates win.
    pub fn register_many<I>(&mut self, scenes: I)
    where
        I: IntoIterator<Item = Box<dyn Scene>>,
    {
        for scene in scenes {
            self.register_boxed(scene);
        }
    }

    /// Removes a scene. Returns whether anything was removed.
    ///
    /// Removing the active scene runs its cleanup.
    pub fn unregister(&mut self, id: &str) -> bool {
        let Some(mut removed) = self.entries.remove(id) else {
            return false;
        };

        self.displace(id, &mut removed);
        self.order.retain(|key| key != id);
        debug!(target: "registry", "Unregistered scene {:?}", id);
        self.notify();
        true
    }

    /// Removes every scene with a single notification.
    pub fn clear(&mut self) {
        if let Some(id) = self.active_id().map(str::to_owned) {
            if let Some(mut removed) = self.entries.remove(&id) {
                self.displace(&id, &mut removed);
            }
        }
        self.entries.clear();
        self.order.clear();
        debug!(target: "registry", "Registry cleared");
        self.notify();
    }

    //--- Queries ----------------------------------------------------------

    pub fn get(&self, id: &str) -> Option<&SceneRegistryEntry> {
        self.entries.get(id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// All entries in insertion order.
    pub fn get_all(&self) -> Vec<&SceneRegistryEntry> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .collect()
    }

    /// Entries carrying `tag`, in insertion order.
    pub fn get_by_tag(&self, tag: &str) -> Vec<&SceneRegistryEntry> {
        self.get_all()
            .into_iter()
            .filter(|entry| entry.metadata.has_tag(tag))
            .collect()
    }

    /// Owned snapshot for selector UIs.
    pub fn listing(&self) -> Vec<SceneListing> {
        self.get_all()
            .into_iter()
            .map(|entry| SceneListing {
                metadata: entry.metadata.clone(),
                status: entry.status(),
            })
            .collect()
    }

    /// Scene ids in listing order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entry_mut(&mut self, id: &str) -> Option<&mut SceneRegistryEntry> {
        self.entries.get_mut(id)
    }

    //--- Active Entry -----------------------------------------------------

    /// Id of the scene the manager currently shows, if any.
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(|mark| mark.id.as_str())
    }

    /// Records `id` as the active entry and hands back the lease.
    pub(crate) fn set_active(&mut self, id: &str) -> ActiveLease {
        let displaced = Arc::new(AtomicBool::new(false));
        self.active = Some(ActiveMark {
            id: id.to_owned(),
            displaced: Arc::clone(&displaced),
        });
        ActiveLease { displaced }
    }

    /// Forgets the active entry without touching its scene.
    pub(crate) fn clear_active(&mut self) {
        self.active = None;
    }

    /// Cleans up `entry` if it is the active one and releases the lease.
    fn displace(&mut self, id: &str, entry: &mut SceneRegistryEntry) {
        if self.active_id() != Some(id) {
            return;
        }
        let Some(mark) = self.active.take() else {
            return;
        };

        info!(target: "registry", "Active scene {:?} displaced, cleaning up", id);
        entry.scene_mut().cleanup();
        mark.displaced.store(true, Ordering::Release);
    }

    //--- Status -----------------------------------------------------------

    /// Marks a scene as having produced a frame. No-op for unknown ids.
    pub fn mark_as_loaded(&mut self, id: &str) {
        let Some(entry) = self.entries.get_mut(id) else {
            warn!(target: "registry", "Cannot mark unknown scene {:?} as loaded", id);
            return;
        };

        entry.is_loaded = true;
        self.notify();
    }

    /// Records an error on a scene. No-op for unknown ids.
    pub fn mark_as_error(&mut self, id: &str, error: SceneError) {
        let Some(entry) = self.entries.get_mut(id) else {
            warn!(target: "registry", "Cannot record error for unknown scene {:?}: {}", id, error);
            return;
        };

        entry.error = Some(error);
        self.notify();
    }

    //--- Observers --------------------------------------------------------

    /// Registers an observer called after every mutation.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut() + Send + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns whether it was subscribed.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(id, _)| *id != subscription);
        self.observers.len() != before
    }

    fn notify(&mut self) {
        for (_, observer) in &mut self.observers {
            observer();
        }
    }
}

impl fmt::Debug for SceneRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneRegistry")
            .field("scenes", &self.order)
            .field("active", &self.active_id())
            .field("observers", &self.observers.len())
            .finish()
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::SceneFrame;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Stub {
        id: &'static str,
        tags: Vec<&'static str>,
        cleanups: Arc<AtomicUsize>,
    }

    impl Stub {
        fn new(id: &'static str) -> Self {
            Self::tagged(id, &[])
        }

        fn tagged(id: &'static str, tags: &[&'static str]) -> Self {
            Self {
                id,
                tags: tags.to_vec(),
                cleanups: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn counting(id: &'static str, cleanups: &Arc<AtomicUsize>) -> Self {
            Self {
                cleanups: Arc::clone(cleanups),
                ..Self::new(id)
            }
        }
    }

    impl Scene for Stub {
        fn metadata(&self) -> SceneMetadata {
            SceneMetadata::new(self.id, self.id.to_uppercase()).with_tags(self.tags.iter().copied())
        }

        fn cleanup(&mut self) {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
        }

        fn frame(&mut self, _frame: &mut SceneFrame<'_>) {}
    }

    fn counting_observer(registry: &mut SceneRegistry) -> (SubscriptionId, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let id = registry.subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (id, count)
    }

    //--- Registration Tests -----------------------------------------------

    #[test]
    fn register_and_lookup() {
        let mut registry = SceneRegistry::new();
        assert_eq!(registry.register(Stub::new("a")), Registration::Inserted);

        assert!(registry.has("a"));
        assert!(!registry.has("b"));
        let entry = registry.get("a").unwrap();
        assert_eq!(entry.metadata().name, "A");
        assert!(!entry.is_loaded());
        assert!(entry.error().is_none());
        assert_eq!(entry.status(), SceneStatus::Pending);
    }

    #[test]
    fn duplicate_registration_overwrites_with_last_tags() {
        let mut registry = SceneRegistry::new();
        registry.register(Stub::tagged("x", &["first"]));
        let outcome = registry.register(Stub::tagged("x", &["second"]));

        assert_eq!(outcome, Registration::Replaced);
        let all = registry.get_all();
        assert_eq!(all.len(), 1);
        assert!(all[0].metadata().has_tag("second"));
        assert!(!all[0].metadata().has_tag("first"));
    }

    #[test]
    fn reregistration_resets_status_and_bumps_revision() {
        let mut registry = SceneRegistry::new();
        registry.register(Stub::new("x"));
        registry.mark_as_loaded("x");
        registry.mark_as_error("x", SceneError::init("boom"));
        let first = registry.get("x").unwrap().revision();

        registry.register(Stub::new("x"));
        let entry = registry.get("x").unwrap();
        assert!(!entry.is_loaded());
        assert!(entry.error().is_none());
        assert!(entry.revision() > first);
    }

    #[test]
    fn len_counts_distinct_ids() {
        let mut registry = SceneRegistry::new();
        for id in ["a", "b", "a", "c", "b", "a"] {
            registry.register(Stub::new(id));
        }
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get_all().len(), 3);
    }

    #[test]
    fn listing_order_is_insertion_order_and_survives_overwrite() {
        let mut registry = SceneRegistry::new();
        registry.register_many(vec![
            Box::new(Stub::new("c")) as Box<dyn Scene>,
            Box::new(Stub::new("a")),
            Box::new(Stub::new("b")),
            Box::new(Stub::new("c")),
        ]);

        let ids: Vec<&str> = registry.get_all().iter().map(|e| e.id()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
        assert_eq!(registry.ids(), ["c", "a", "b"]);
    }

    #[test]
    fn get_by_tag_filters() {
        let mut registry = SceneRegistry::new();
        registry.register(Stub::tagged("a", &["physics"]));
        registry.register(Stub::tagged("b", &["particles"]));
        registry.register(Stub::tagged("c", &["physics", "game"]));

        let ids: Vec<&str> = registry.get_by_tag("physics").iter().map(|e| e.id()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert!(registry.get_by_tag("missing").is_empty());
    }

    //--- Removal Tests ----------------------------------------------------

    #[test]
    fn unregister_reports_removal() {
        let mut registry = SceneRegistry::new();
        registry.register(Stub::new("a"));
        registry.register(Stub::new("b"));

        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert_eq!(registry.ids(), ["b"]);
    }

    #[test]
    fn clear_notifies_once() {
        let mut registry = SceneRegistry::new();
        registry.register(Stub::new("a"));
        registry.register(Stub::new("b"));
        let (_, count) = counting_observer(&mut registry);

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    //--- Status Tests -----------------------------------------------------

    #[test]
    fn loaded_then_errored_is_failed() {
        let mut registry = SceneRegistry::new();
        registry.register(Stub::new("a"));

        registry.mark_as_loaded("a");
        assert_eq!(registry.get("a").unwrap().status(), SceneStatus::Loaded);

        registry.mark_as_error("a", SceneError::render("lost"));
        let entry = registry.get("a").unwrap();
        assert!(entry.is_loaded());
        assert_eq!(entry.status(), SceneStatus::Failed);
        assert_eq!(registry.listing()[0].status, SceneStatus::Failed);
    }

    #[test]
    fn unknown_ids_are_silent_noops() {
        let mut registry = SceneRegistry::new();
        let (_, count) = counting_observer(&mut registry);

        registry.mark_as_loaded("ghost");
        registry.mark_as_error("ghost", SceneError::init("x"));
        assert!(!registry.unregister("ghost"));

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(registry.is_empty());
    }

    //--- Active Entry Tests -----------------------------------------------

    #[test]
    fn unregistering_active_entry_cleans_it_up() {
        let cleanups = Arc::new(AtomicUsize::new(0));
        let mut registry = SceneRegistry::new();
        registry.register(Stub::counting("a", &cleanups));
        let lease = registry.set_active("a");

        assert!(registry.unregister("a"));
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
        assert!(lease.is_displaced());
        assert_eq!(registry.active_id(), None);
    }

    #[test]
    fn overwriting_active_entry_cleans_up_old_instance() {
        let old = Arc::new(AtomicUsize::new(0));
        let new = Arc::new(AtomicUsize::new(0));
        let mut registry = SceneRegistry::new();
        registry.register(Stub::counting("a", &old));
        let lease = registry.set_active("a");

        registry.register(Stub::counting("a", &new));
        assert_eq!(old.load(Ordering::SeqCst), 1);
        assert_eq!(new.load(Ordering::SeqCst), 0);
        assert!(lease.is_displaced());
    }

    #[test]
    fn clear_cleans_up_active_entry_only() {
        let active = Arc::new(AtomicUsize::new(0));
        let idle = Arc::new(AtomicUsize::new(0));
        let mut registry = SceneRegistry::new();
        registry.register(Stub::counting("a", &active));
        registry.register(Stub::counting("b", &idle));
        let lease = registry.set_active("a");

        registry.clear();
        assert_eq!(active.load(Ordering::SeqCst), 1);
        assert_eq!(idle.load(Ordering::SeqCst), 0);
        assert!(lease.is_displaced());
    }

    #[test]
    fn inactive_entries_drop_without_cleanup() {
        let cleanups = Arc::new(AtomicUsize::new(0));
        let mut registry = SceneRegistry::new();
        registry.register(Stub::counting("a", &cleanups));
        registry.register(Stub::new("b"));
        let lease = registry.set_active("b");

        registry.unregister("a");
        registry.clear_active();
        registry.unregister("b");
        assert_eq!(cleanups.load(Ordering::SeqCst), 0);
        assert!(!lease.is_displaced());
    }

    //--- Observer Tests ---------------------------------------------------

    #[test]
    fn every_mutation_notifies() {
        let mut registry = SceneRegistry::new();
        let (_, count) = counting_observer(&mut registry);

        registry.register(Stub::new("a"));
        registry.register(Stub::new("a"));
        registry.mark_as_loaded("a");
        registry.mark_as_error("a", SceneError::init("x"));
        registry.unregister("a");

        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn lookups_do_not_notify() {
        let mut registry = SceneRegistry::new();
        registry.register(Stub::tagged("a", &["t"]));
        let (_, count) = counting_observer(&mut registry);

        let _ = registry.get("a");
        let _ = registry.has("a");
        let _ = registry.get_all();
        let _ = registry.get_by_tag("t");
        let _ = registry.listing();

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribe_stops_only_that_observer() {
        let mut registry = SceneRegistry::new();
        let (first, first_count) = counting_observer(&mut registry);
        let (_, second_count) = counting_observer(&mut registry);

        registry.register(Stub::new("a"));
        assert!(registry.unsubscribe(first));
        assert!(!registry.unsubscribe(first));

        registry.register(Stub::new("b"));
        registry.clear();

        assert_eq!(first_count.load(Ordering::SeqCst), 1);
        assert_eq!(second_count.load(Ordering::SeqCst), 3);
    }
}
