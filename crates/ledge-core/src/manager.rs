//! Object Managers
//!
//! [`ObjectManager`] owns membership of a set of objects and updates them
//! once per frame. Structural changes never touch the active set directly:
//! additions and removals are queued and applied together at the commit
//! point between frames, so the set visible to an update pass is always
//! exactly the set as of the last commit.
//!
//! [`PhasedObjectManager`] additionally keeps the active set ordered by
//! [`Phase`], breaking ties by insertion order, so a plain iteration runs
//! members in a deterministic phase order.

use std::cmp::Ordering;

use crate::container::FixedCapacityContainer;
use crate::object::{ObjectHandle, Phase, Phased, Updatable};
use crate::{CoreError, CoreResult};

/// A managed object together with its membership handle
#[derive(Debug)]
struct Member<T> {
    handle: ObjectHandle,
    object: T,
}

/// Outcome of [`ObjectManager::remove`]
#[derive(Debug, PartialEq, Eq)]
pub enum Removal<T> {
    /// The object is active and will leave at the next commit
    Queued,
    /// The object had not been committed yet; it is handed straight back
    Withdrawn(T),
    /// No such member
    NotFound,
}

/// What a commit changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitSummary {
    /// Objects moved from pending into the active set
    pub added: usize,
    /// Objects taken out of the active set
    pub removed: usize,
}

impl CommitSummary {
    /// Whether the commit changed anything
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Active set plus deferred additions and removals
pub struct ObjectManager<T> {
    active: FixedCapacityContainer<Member<T>>,
    pending_additions: FixedCapacityContainer<Member<T>>,
    pending_removals: FixedCapacityContainer<ObjectHandle>,
    next_handle: u64,
}

impl<T> ObjectManager<T> {
    /// Create a manager holding up to `capacity` objects, any of which may be pending
    pub fn new(capacity: usize) -> Self {
        Self::with_capacities(capacity, capacity)
    }

    /// Create a manager with separate active and pending-addition capacities
    pub fn with_capacities(active_capacity: usize, pending_capacity: usize) -> Self {
        Self {
            active: FixedCapacityContainer::new(active_capacity),
            pending_additions: FixedCapacityContainer::new(pending_capacity),
            pending_removals: FixedCapacityContainer::new(active_capacity),
            next_handle: 0,
        }
    }

    /// Maximum number of active objects
    pub fn capacity(&self) -> usize {
        self.active.capacity()
    }

    /// Number of active objects
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Check if the active set is empty
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of additions waiting for the next commit
    pub fn pending_len(&self) -> usize {
        self.pending_additions.len()
    }

    /// Number of removals waiting for the next commit
    pub fn pending_removal_len(&self) -> usize {
        self.pending_removals.len()
    }

    /// Queue an object for addition at the next commit
    ///
    /// Fails when the pending queue is full or when the active set could
    /// not absorb every queued change at commit time.
    pub fn try_add(&mut self, object: T) -> CoreResult<ObjectHandle> {
        let committed = self.active.len() - self.pending_removals.len();
        if committed + self.pending_additions.len() >= self.active.capacity() {
            return Err(CoreError::CapacityExceeded {
                capacity: self.active.capacity(),
            });
        }

        let handle = ObjectHandle::new(self.next_handle);
        self.pending_additions.try_add(Member { handle, object })?;
        self.next_handle += 1;
        Ok(handle)
    }

    /// Queue an object for addition at the next commit
    ///
    /// # Panics
    /// Panics when the manager is out of capacity.
    pub fn add(&mut self, object: T) -> ObjectHandle {
        match self.try_add(object) {
            Ok(handle) => handle,
            Err(err) => {
                log::error!("ObjectManager::add: {err}");
                panic!("ObjectManager::add: {err}");
            }
        }
    }

    /// Request removal of a member
    ///
    /// Active members are queued for the next commit (queuing twice is a
    /// no-op). Members still waiting to be added are withdrawn immediately.
    pub fn remove(&mut self, handle: ObjectHandle) -> Removal<T> {
        if self.active_index(handle).is_some() {
            if !self.pending_removals.contains(&handle) {
                // Removals are a subset of active members, so this cannot overflow
                self.pending_removals.add(handle);
            }
            return Removal::Queued;
        }

        match self.pending_additions.iter().position(|m| m.handle == handle) {
            Some(index) => Removal::Withdrawn(self.pending_additions.remove(index, true).object),
            None => Removal::NotFound,
        }
    }

    /// Queue every active member matching `predicate` for removal
    ///
    /// Returns how many members were newly queued.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let mut queued = 0;
        for member in self.active.iter() {
            if predicate(&member.object) && !self.pending_removals.contains(&member.handle) {
                self.pending_removals.add(member.handle);
                queued += 1;
            }
        }
        queued
    }

    /// Check if an active member is waiting to be removed
    pub fn is_removal_pending(&self, handle: ObjectHandle) -> bool {
        self.pending_removals.contains(&handle)
    }

    /// Apply queued structural changes
    ///
    /// Queued removals leave the active set first (each removed object is
    /// passed to `on_removed`, typically to return it to its pool), then every
    /// pending addition joins. Active order is otherwise preserved.
    pub fn commit_updates_with(&mut self, mut on_removed: impl FnMut(T)) -> CommitSummary {
        let mut summary = CommitSummary::default();

        for handle in self.pending_removals.drain() {
            if let Some(index) = self.active.iter().position(|m| m.handle == handle) {
                on_removed(self.active.remove(index, true).object);
                summary.removed += 1;
            }
        }

        for member in self.pending_additions.drain() {
            self.active.add(member);
            summary.added += 1;
        }

        summary
    }

    /// Apply queued structural changes, dropping removed objects
    pub fn commit_updates(&mut self) -> CommitSummary {
        self.commit_updates_with(drop)
    }

    /// Update every active member in current order
    pub fn update<P: ?Sized>(&mut self, time_delta: f32, parent: &mut P)
    where
        T: Updatable<P>,
    {
        for member in self.active.iter_mut() {
            member.object.update(time_delta, parent);
        }
    }

    /// Iterate over active members
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.active.iter().map(|m| &m.object)
    }

    /// Iterate over active members with their handles
    pub fn iter_with_handles(&self) -> impl Iterator<Item = (ObjectHandle, &T)> {
        self.active.iter().map(|m| (m.handle, &m.object))
    }

    /// Iterate mutably over active members
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.active.iter_mut().map(|m| &mut m.object)
    }

    /// Iterate mutably over members waiting to be added
    pub fn pending_iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.pending_additions.iter_mut().map(|m| &mut m.object)
    }

    /// Look up an active or pending member
    pub fn get(&self, handle: ObjectHandle) -> Option<&T> {
        self.active
            .iter()
            .chain(self.pending_additions.iter())
            .find(|m| m.handle == handle)
            .map(|m| &m.object)
    }

    /// Look up an active or pending member mutably
    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut T> {
        self.active
            .iter_mut()
            .chain(self.pending_additions.iter_mut())
            .find(|m| m.handle == handle)
            .map(|m| &mut m.object)
    }

    /// Take every active and pending member out, passing each to `on_removed`
    pub fn clear_with(&mut self, mut on_removed: impl FnMut(T)) {
        self.pending_removals.clear();
        for member in self.active.drain() {
            on_removed(member.object);
        }
        for member in self.pending_additions.drain() {
            on_removed(member.object);
        }
    }

    fn active_index(&self, handle: ObjectHandle) -> Option<usize> {
        self.active.iter().position(|m| m.handle == handle)
    }
}

/// Active-set order for phased members: phase first, then insertion order
fn by_phase<T: Phased>(a: &Member<T>, b: &Member<T>) -> Ordering {
    a.object
        .phase()
        .cmp(&b.object.phase())
        .then(a.handle.cmp(&b.handle))
}

/// Object manager whose active set iterates in ascending phase order
///
/// Members with equal phases keep their insertion order.
pub struct PhasedObjectManager<T: Phased> {
    inner: ObjectManager<T>,
}

impl<T: Phased> PhasedObjectManager<T> {
    /// Create a manager holding up to `capacity` members
    pub fn new(capacity: usize) -> Self {
        Self::with_capacities(capacity, capacity)
    }

    /// Create a manager with separate active and pending-addition capacities
    pub fn with_capacities(active_capacity: usize, pending_capacity: usize) -> Self {
        let mut inner = ObjectManager::with_capacities(active_capacity, pending_capacity);
        inner.active.set_comparator(by_phase::<T>);
        Self { inner }
    }

    /// Maximum number of active members
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Number of active members
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the active set is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of additions waiting for the next commit
    pub fn pending_len(&self) -> usize {
        self.inner.pending_len()
    }

    /// Queue a member for addition at the next commit
    pub fn try_add(&mut self, object: T) -> CoreResult<ObjectHandle> {
        self.inner.try_add(object)
    }

    /// Queue a member for addition at the next commit
    ///
    /// # Panics
    /// Panics when the manager is out of capacity.
    pub fn add(&mut self, object: T) -> ObjectHandle {
        self.inner.add(object)
    }

    /// Request removal of a member; see [`ObjectManager::remove`]
    pub fn remove(&mut self, handle: ObjectHandle) -> Removal<T> {
        self.inner.remove(handle)
    }

    /// Queue every active member matching `predicate` for removal
    pub fn remove_where(&mut self, predicate: impl FnMut(&T) -> bool) -> usize {
        self.inner.remove_where(predicate)
    }

    /// Apply queued changes and restore phase order if anything joined
    pub fn commit_updates_with(&mut self, on_removed: impl FnMut(T)) -> CommitSummary {
        let summary = self.inner.commit_updates_with(on_removed);
        // Ordered removal keeps the set sorted; only additions dirty it
        self.inner.active.sort(false);
        summary
    }

    /// Apply queued changes, dropping removed members
    pub fn commit_updates(&mut self) -> CommitSummary {
        self.commit_updates_with(drop)
    }

    /// Update every active member in phase order
    pub fn update<P: ?Sized>(&mut self, time_delta: f32, parent: &mut P)
    where
        T: Updatable<P>,
    {
        self.inner.update(time_delta, parent);
    }

    /// First member in `phase`, searching active members then pending ones
    pub fn find(&self, phase: Phase) -> Option<&T> {
        let probe = |m: &Member<T>| m.object.phase().cmp(&phase);
        if let Some(index) = self.inner.active.find_by(false, probe) {
            return self.inner.active.get(index).map(|m| &m.object);
        }
        self.inner
            .pending_additions
            .iter()
            .find(|m| m.object.phase() == phase)
            .map(|m| &m.object)
    }

    /// Iterate over active members in phase order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.inner.iter()
    }

    /// Iterate over active members with their handles
    pub fn iter_with_handles(&self) -> impl Iterator<Item = (ObjectHandle, &T)> {
        self.inner.iter_with_handles()
    }

    /// Iterate mutably over active members
    ///
    /// Members must not change phase through this reference.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.inner.iter_mut()
    }

    /// Look up an active or pending member
    pub fn get(&self, handle: ObjectHandle) -> Option<&T> {
        self.inner.get(handle)
    }

    /// Look up an active or pending member mutably
    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut T> {
        self.inner.get_mut(handle)
    }

    /// Take every member out, passing each to `on_removed`
    pub fn clear_with(&mut self, on_removed: impl FnMut(T)) {
        self.inner.clear_with(on_removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Probe {
        name: char,
        phase: Phase,
    }

    impl Probe {
        fn new(name: char, phase: Phase) -> Self {
            Self { name, phase }
        }
    }

    impl Phased for Probe {
        fn phase(&self) -> Phase {
            self.phase
        }
    }

    impl Updatable<Vec<char>> for Probe {
        fn update(&mut self, _time_delta: f32, seen: &mut Vec<char>) {
            seen.push(self.name);
        }
    }

    fn names<'a>(iter: impl Iterator<Item = &'a Probe>) -> Vec<char> {
        iter.map(|p| p.name).collect()
    }

    #[test]
    fn test_additions_wait_for_commit() {
        let mut manager = ObjectManager::new(4);
        manager.add(Probe::new('a', Phase::Think));

        let mut seen = Vec::new();
        manager.update(0.016, &mut seen);
        assert!(seen.is_empty());
        assert_eq!(manager.pending_len(), 1);

        let summary = manager.commit_updates();
        assert_eq!(summary, CommitSummary { added: 1, removed: 0 });

        manager.update(0.016, &mut seen);
        assert_eq!(seen, vec!['a']);
    }

    #[test]
    fn test_removal_is_deferred() {
        let mut manager = ObjectManager::new(4);
        let a = manager.add(Probe::new('a', Phase::Think));
        manager.add(Probe::new('b', Phase::Think));
        manager.commit_updates();

        assert_eq!(manager.remove(a), Removal::Queued);
        assert_eq!(manager.remove(a), Removal::Queued);
        assert_eq!(manager.pending_removal_len(), 1);

        // Still part of the frame until the commit point
        let mut seen = Vec::new();
        manager.update(0.016, &mut seen);
        assert_eq!(seen, vec!['a', 'b']);

        let mut released = Vec::new();
        let summary = manager.commit_updates_with(|p| released.push(p.name));
        assert_eq!(summary.removed, 1);
        assert_eq!(released, vec!['a']);
        assert_eq!(names(manager.iter()), vec!['b']);
        assert_eq!(manager.remove(a), Removal::NotFound);
    }

    #[test]
    fn test_remove_pending_withdraws_immediately() {
        let mut manager = ObjectManager::new(4);
        let a = manager.add(Probe::new('a', Phase::Think));

        match manager.remove(a) {
            Removal::Withdrawn(probe) => assert_eq!(probe.name, 'a'),
            other => panic!("expected withdrawal, got {other:?}"),
        }
        assert_eq!(manager.pending_len(), 0);
        assert!(manager.commit_updates().is_empty());
    }

    #[test]
    fn test_update_sees_last_committed_set() {
        let mut manager = ObjectManager::new(8);
        let a = manager.add(Probe::new('a', Phase::Think));
        manager.add(Probe::new('b', Phase::Think));
        manager.commit_updates();

        // Interleave structural requests with updates
        manager.add(Probe::new('c', Phase::Think));
        manager.remove(a);
        let mut seen = Vec::new();
        manager.update(0.016, &mut seen);
        assert_eq!(seen, vec!['a', 'b']);

        manager.commit_updates();
        seen.clear();
        manager.update(0.016, &mut seen);
        assert_eq!(seen, vec!['b', 'c']);
    }

    #[test]
    fn test_capacity_accounts_for_pending_changes() {
        let mut manager = ObjectManager::new(2);
        let a = manager.add(Probe::new('a', Phase::Think));
        manager.add(Probe::new('b', Phase::Think));
        assert!(matches!(
            manager.try_add(Probe::new('c', Phase::Think)),
            Err(CoreError::CapacityExceeded { capacity: 2 })
        ));

        manager.commit_updates();
        manager.remove(a);
        // The queued removal frees a slot at commit time
        assert!(manager.try_add(Probe::new('c', Phase::Think)).is_ok());
        manager.commit_updates();
        assert_eq!(names(manager.iter()), vec!['b', 'c']);
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn test_add_panics_when_exhausted() {
        let mut manager = ObjectManager::new(1);
        manager.add(Probe::new('a', Phase::Think));
        manager.add(Probe::new('b', Phase::Think));
    }

    #[test]
    fn test_remove_where() {
        let mut manager = ObjectManager::new(4);
        manager.add(Probe::new('a', Phase::Think));
        manager.add(Probe::new('b', Phase::Draw));
        manager.add(Probe::new('c', Phase::Draw));
        manager.commit_updates();

        assert_eq!(manager.remove_where(|p| p.phase == Phase::Draw), 2);
        assert_eq!(manager.remove_where(|p| p.phase == Phase::Draw), 0);
        manager.commit_updates();
        assert_eq!(names(manager.iter()), vec!['a']);
    }

    #[test]
    fn test_phased_sort_with_insertion_tie_break() {
        let mut manager = PhasedObjectManager::new(4);
        manager.add(Probe::new('A', Phase::PostPhysics));
        manager.add(Probe::new('B', Phase::Physics));
        manager.add(Probe::new('C', Phase::Movement));
        manager.add(Probe::new('D', Phase::Physics));
        manager.commit_updates();

        assert_eq!(names(manager.iter()), vec!['B', 'D', 'A', 'C']);
    }

    #[test]
    fn test_phased_order_survives_churn() {
        let mut manager = PhasedObjectManager::new(16);
        let mut handles = Vec::new();
        for (i, phase) in [Phase::Draw, Phase::Think, Phase::Animation, Phase::Movement]
            .into_iter()
            .enumerate()
        {
            handles.push(manager.add(Probe::new(char::from(b'a' + i as u8), phase)));
        }
        manager.commit_updates();

        manager.remove(handles[1]);
        manager.add(Probe::new('x', Phase::Physics));
        manager.add(Probe::new('y', Phase::FrameEnd));
        manager.add(Probe::new('z', Phase::Think));
        manager.commit_updates();

        let phases: Vec<Phase> = manager.iter().map(|p| p.phase).collect();
        assert!(phases.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(names(manager.iter()), vec!['z', 'x', 'd', 'c', 'a', 'y']);

        let mut seen = Vec::new();
        manager.update(0.016, &mut seen);
        assert_eq!(seen, vec!['z', 'x', 'd', 'c', 'a', 'y']);
    }

    #[test]
    fn test_phased_find_checks_active_and_pending() {
        let mut manager = PhasedObjectManager::new(8);
        manager.add(Probe::new('a', Phase::Movement));
        manager.add(Probe::new('b', Phase::Think));
        manager.add(Probe::new('c', Phase::Think));
        manager.commit_updates();
        manager.add(Probe::new('d', Phase::Draw));

        assert_eq!(manager.find(Phase::Think).map(|p| p.name), Some('b'));
        assert_eq!(manager.find(Phase::Movement).map(|p| p.name), Some('a'));
        assert_eq!(manager.find(Phase::Draw).map(|p| p.name), Some('d'));
        assert!(manager.find(Phase::Animation).is_none());
    }

    #[test]
    fn test_clear_with_returns_everything() {
        let mut manager = ObjectManager::new(4);
        manager.add(Probe::new('a', Phase::Think));
        manager.commit_updates();
        manager.add(Probe::new('b', Phase::Think));

        let mut released = Vec::new();
        manager.clear_with(|p| released.push(p.name));
        assert_eq!(released, vec!['a', 'b']);
        assert!(manager.is_empty());
        assert_eq!(manager.pending_len(), 0);
    }
}
