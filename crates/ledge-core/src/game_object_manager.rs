//! Game Object Manager
//!
//! Top of the object tree. Publishes the player snapshot, updates every
//! object near enough to the camera focus, and at the commit point returns
//! removed objects (and removed components) to the factory's pools.

use crate::factory::GameObjectFactory;
use crate::game_object::GameObject;
use crate::manager::{CommitSummary, ObjectManager, Removal};
use crate::object::ObjectHandle;
use crate::registry::{PlayerSnapshot, SystemRegistry};
use crate::CoreResult;

/// Owns the live game objects of one simulation
pub struct GameObjectManager {
    objects: ObjectManager<GameObject>,
    player: Option<ObjectHandle>,
    /// Objects updated during the last frame
    last_active: usize,
}

impl GameObjectManager {
    /// Create a manager holding up to `capacity` objects
    pub fn new(capacity: usize) -> Self {
        Self {
            objects: ObjectManager::new(capacity),
            player: None,
            last_active: 0,
        }
    }

    /// Queue an object; the first player object added becomes the tracked player
    ///
    /// # Panics
    /// Panics when the manager is out of capacity.
    pub fn add(&mut self, object: GameObject) -> ObjectHandle {
        let is_player = object.state.is_player;
        let handle = self.objects.add(object);
        self.track_if_player(handle, is_player);
        handle
    }

    /// Queue an object, failing when out of capacity
    pub fn try_add(&mut self, object: GameObject) -> CoreResult<ObjectHandle> {
        let is_player = object.state.is_player;
        let handle = self.objects.try_add(object)?;
        self.track_if_player(handle, is_player);
        Ok(handle)
    }

    fn track_if_player(&mut self, handle: ObjectHandle, is_player: bool) {
        if is_player && self.player.is_none() {
            self.player = Some(handle);
        }
    }

    /// Request removal of an object
    ///
    /// A withdrawn object is handed back and must be released to the factory
    /// by the caller.
    pub fn remove(&mut self, handle: ObjectHandle) -> Removal<GameObject> {
        let removal = self.objects.remove(handle);
        if matches!(removal, Removal::Withdrawn(_)) && self.player == Some(handle) {
            self.player = None;
        }
        removal
    }

    /// Track a different object as the player
    pub fn set_player(&mut self, handle: Option<ObjectHandle>) {
        self.player = handle;
    }

    /// Handle of the tracked player
    pub fn player(&self) -> Option<ObjectHandle> {
        self.player
    }

    /// Run one frame of every object within activation range
    ///
    /// The player snapshot is published first so every object sees the same
    /// player state. Objects that mark themselves for removal during the
    /// frame are queued for the next commit.
    pub fn update(&mut self, time_delta: f32, systems: &mut SystemRegistry) {
        systems.player = self
            .player
            .and_then(|handle| self.objects.get(handle))
            .map(|player| PlayerSnapshot {
                position: player.state.position,
                facing_direction: player.state.facing_direction,
                action: player.state.current_action,
                life: player.state.life,
            });

        let focus = systems.camera_focus();
        let mut active = 0;
        for object in self.objects.iter_mut() {
            let radius = object.state.activation_radius;
            if radius < 0.0 || object.state.position.distance_squared(focus) <= radius * radius {
                object.update(time_delta, systems);
                active += 1;
            }
        }
        self.last_active = active;

        let queued = self.objects.remove_where(|object| object.state.marked_for_removal);
        if queued > 0 {
            log::trace!("{queued} object(s) queued for removal");
        }
    }

    /// Apply every queued structural change in the object tree
    ///
    /// Component changes inside each object (pending ones included) are
    /// committed first, then object additions and removals. Everything
    /// removed goes back to `factory`.
    pub fn commit_updates(&mut self, factory: &mut GameObjectFactory) -> CommitSummary {
        for object in self.objects.iter_mut() {
            object.commit_updates_with(|component| factory.release_component(component));
        }
        for object in self.objects.pending_iter_mut() {
            object.commit_updates_with(|component| factory.release_component(component));
        }

        let summary = self
            .objects
            .commit_updates_with(|object| factory.release_object(object));

        if let Some(handle) = self.player {
            if self.objects.get(handle).is_none() {
                log::debug!("Player object removed");
                self.player = None;
            }
        }
        summary
    }

    /// Release every object, active and pending, to `factory`
    pub fn clear(&mut self, factory: &mut GameObjectFactory) {
        self.objects.clear_with(|object| factory.release_object(object));
        self.player = None;
        self.last_active = 0;
    }

    /// Look up an active or pending object
    pub fn get(&self, handle: ObjectHandle) -> Option<&GameObject> {
        self.objects.get(handle)
    }

    /// Look up an active or pending object mutably
    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut GameObject> {
        self.objects.get_mut(handle)
    }

    /// Active objects in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.iter()
    }

    /// Number of active objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if no object is active
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects waiting for the next commit
    pub fn pending_len(&self) -> usize {
        self.objects.pending_len()
    }

    /// Objects updated during the last frame
    pub fn last_active(&self) -> usize {
        self.last_active
    }
}
