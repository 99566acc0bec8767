//! Fixed-Capacity Container
//!
//! The array-backed sequence every manager, pool and queue in the engine is
//! built on. Storage is reserved once at construction and never grows, so
//! steady-state frames run without touching the allocator.
//!
//! Ordering and equality are delegated to an injected [`Comparator`]; the
//! container itself knows nothing about its element type.

use std::cmp::Ordering;
use std::fmt;

use crate::sort::{Comparator, SortAlgorithm};
use crate::{CoreError, CoreResult};

/// Pre-allocated, bounded, sortable sequence
pub struct FixedCapacityContainer<T> {
    /// Elements `[0, len)`; the backing allocation holds `capacity` slots
    items: Vec<T>,
    /// Hard upper bound on `items.len()`
    capacity: usize,
    /// Ordering used by `sort` and binary `find`
    comparator: Option<Comparator<T>>,
    /// Whether `items` is known to be ordered by `comparator`
    sorted: bool,
    /// Algorithm used by `sort`
    algorithm: SortAlgorithm,
}

impl<T> FixedCapacityContainer<T> {
    /// Create an empty container that can hold `capacity` elements
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            comparator: None,
            sorted: false,
            algorithm: SortAlgorithm::default(),
        }
    }

    /// Create an empty container ordered by `comparator`
    pub fn with_comparator(capacity: usize, comparator: Comparator<T>) -> Self {
        let mut container = Self::new(capacity);
        container.comparator = Some(comparator);
        container
    }

    /// Maximum number of elements
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of valid elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the container holds no elements
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if another element would exceed capacity
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Free slots left
    pub fn remaining(&self) -> usize {
        self.capacity - self.items.len()
    }

    /// Append an element, failing without side effects when full
    pub fn try_add(&mut self, item: T) -> CoreResult<()> {
        if self.is_full() {
            return Err(CoreError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        self.sorted = false;
        Ok(())
    }

    /// Append an element
    ///
    /// # Panics
    /// Panics if the container is full. Capacities are sized up front, so
    /// running out is a programmer error rather than a runtime condition.
    pub fn add(&mut self, item: T) {
        if let Err(err) = self.try_add(item) {
            log::error!("FixedCapacityContainer::add: {err}");
            panic!("FixedCapacityContainer::add: {err}");
        }
    }

    /// Remove and return the last element
    pub fn remove_last(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Remove the element at `index`
    ///
    /// With `preserve_order` the tail shifts down one slot; otherwise the last
    /// element is swapped into the hole in O(1).
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn remove(&mut self, index: usize, preserve_order: bool) -> T {
        if preserve_order {
            self.items.remove(index)
        } else {
            let last = self.items.len() - 1;
            if index != last {
                self.sorted = false;
            }
            self.items.swap_remove(index)
        }
    }

    /// Get the element at `index`
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Get the element at `index` mutably
    ///
    /// Changing an element's sort key through this reference requires a
    /// forced [`sort`](Self::sort) afterwards.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// First element
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Last element
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Swap two elements
    pub fn swap(&mut self, a: usize, b: usize) {
        if a != b {
            self.items.swap(a, b);
            self.sorted = false;
        }
    }

    /// Drop every element; the reserved storage is kept
    pub fn clear(&mut self) {
        self.items.clear();
        self.sorted = false;
    }

    /// Iterate over the valid elements
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterate mutably over the valid elements
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// View the valid elements as a slice
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Remove every element for which `keep` returns false, preserving order
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }

    /// Remove and yield every element in order
    pub fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.sorted = false;
        self.items.drain(..)
    }

    /// Install the ordering used by `sort` and `find`
    pub fn set_comparator(&mut self, comparator: Comparator<T>) {
        self.comparator = Some(comparator);
        self.sorted = false;
    }

    /// Currently installed comparator
    pub fn comparator(&self) -> Option<Comparator<T>> {
        self.comparator
    }

    /// Choose the algorithm used by `sort`
    pub fn set_sort_algorithm(&mut self, algorithm: SortAlgorithm) {
        self.algorithm = algorithm;
    }

    /// Whether the elements are known to be ordered by the comparator
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Sort by the installed comparator
    ///
    /// A no-op when already sorted unless `force` is set, and when no
    /// comparator is installed.
    pub fn sort(&mut self, force: bool) {
        let Some(comparator) = self.comparator else {
            return;
        };
        if self.sorted && !force {
            return;
        }
        self.algorithm.sort(&mut self.items, comparator);
        self.sorted = true;
    }

    /// Locate the first element matching `probe`
    ///
    /// `probe` reports how an element orders relative to the sought key.
    /// Uses a lower-bound binary search when the container is sorted (or
    /// `sorted_hint` vouches for it), otherwise scans linearly.
    pub fn find_by(&self, sorted_hint: bool, probe: impl Fn(&T) -> Ordering) -> Option<usize> {
        if self.sorted || sorted_hint {
            let index = self
                .items
                .partition_point(|item| probe(item) == Ordering::Less);
            (index < self.items.len() && probe(&self.items[index]) == Ordering::Equal)
                .then_some(index)
        } else {
            self.items
                .iter()
                .position(|item| probe(item) == Ordering::Equal)
        }
    }
}

impl<T: PartialEq> FixedCapacityContainer<T> {
    /// Locate `target`, returning its index or `None` on a miss
    ///
    /// Binary search when sorted (or `sorted_hint` is set) and a comparator is
    /// installed; a comparator-driven linear scan otherwise; plain equality when
    /// there is no comparator at all. Equal keys resolve to the first match in
    /// every mode.
    pub fn find(&self, target: &T, sorted_hint: bool) -> Option<usize> {
        match self.comparator {
            Some(comparator) => self.find_by(sorted_hint, |item| comparator(item, target)),
            None => self.items.iter().position(|item| item == target),
        }
    }

    /// Remove the first element equal to `target`
    pub fn remove_item(&mut self, target: &T, preserve_order: bool) -> Option<T> {
        let index = self.find(target, false)?;
        Some(self.remove(index, preserve_order))
    }

    /// Check if `target` is present
    pub fn contains(&self, target: &T) -> bool {
        self.find(target, false).is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for FixedCapacityContainer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedCapacityContainer")
            .field("len", &self.items.len())
            .field("capacity", &self.capacity)
            .field("sorted", &self.sorted)
            .field("items", &self.items)
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a FixedCapacityContainer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut FixedCapacityContainer<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascending(a: &i32, b: &i32) -> Ordering {
        a.cmp(b)
    }

    #[test]
    fn test_add_and_get() {
        let mut container = FixedCapacityContainer::new(4);
        container.add(10);
        container.add(20);

        assert_eq!(container.len(), 2);
        assert_eq!(container.capacity(), 4);
        assert_eq!(container.get(1), Some(&20));
        assert_eq!(container.get(2), None);
        assert_eq!(container.remaining(), 2);
    }

    #[test]
    fn test_add_beyond_capacity_keeps_contents() {
        let mut container = FixedCapacityContainer::new(2);
        container.add(1);
        container.add(2);

        let result = container.try_add(3);
        assert!(matches!(result, Err(CoreError::CapacityExceeded { capacity: 2 })));
        assert_eq!(container.as_slice(), &[1, 2]);
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn test_add_panics_when_full() {
        let mut container = FixedCapacityContainer::new(1);
        container.add(1);
        container.add(2);
    }

    #[test]
    fn test_storage_never_reallocates() {
        let mut container = FixedCapacityContainer::new(8);
        let before = container.items.as_ptr();
        for i in 0..8 {
            container.add(i);
        }
        assert_eq!(container.items.as_ptr(), before);
    }

    #[test]
    fn test_remove_swap_and_ordered() {
        let mut container = FixedCapacityContainer::new(5);
        for value in [1, 2, 3, 4, 5] {
            container.add(value);
        }

        assert_eq!(container.remove(0, false), 1);
        assert_eq!(container.as_slice(), &[5, 2, 3, 4]);

        assert_eq!(container.remove(1, true), 2);
        assert_eq!(container.as_slice(), &[5, 3, 4]);

        assert_eq!(container.remove_last(), Some(4));
        assert_eq!(container.as_slice(), &[5, 3]);
    }

    #[test]
    fn test_find_without_comparator_uses_equality() {
        let mut container = FixedCapacityContainer::new(4);
        container.add("b");
        container.add("a");

        assert_eq!(container.find(&"a", false), Some(1));
        assert_eq!(container.find(&"z", false), None);
    }

    #[test]
    fn test_sort_and_binary_find() {
        let mut container = FixedCapacityContainer::with_comparator(16, ascending);
        for value in [9, 3, 7, 3, 1, 8, 3, 2] {
            container.add(value);
        }
        assert!(!container.is_sorted());

        container.sort(false);
        assert!(container.is_sorted());
        assert_eq!(container.as_slice(), &[1, 2, 3, 3, 3, 7, 8, 9]);

        // First of the duplicates
        assert_eq!(container.find(&3, false), Some(2));
        assert_eq!(container.find(&4, false), None);
    }

    #[test]
    fn test_binary_find_matches_linear_scan() {
        let mut sorted = FixedCapacityContainer::with_comparator(64, ascending);
        let mut unsorted = FixedCapacityContainer::with_comparator(64, ascending);
        for value in [5, 1, 4, 4, 9, 0, 2, 2, 2, 7, 6, 1] {
            sorted.add(value);
        }
        sorted.sort(false);
        for &value in sorted.iter() {
            unsorted.add(value);
        }
        assert!(!unsorted.is_sorted());

        for key in -1..11 {
            assert_eq!(sorted.find(&key, false), unsorted.find(&key, false), "key {key}");
        }
    }

    #[test]
    fn test_sortedness_tracking() {
        let mut container = FixedCapacityContainer::with_comparator(8, ascending);
        container.add(2);
        container.add(1);
        container.sort(false);
        assert!(container.is_sorted());

        container.remove(0, true);
        assert!(container.is_sorted());

        container.add(0);
        assert!(!container.is_sorted());

        container.sort(false);
        container.set_comparator(|a: &i32, b: &i32| b.cmp(a));
        assert!(!container.is_sorted());
        container.sort(false);
        assert_eq!(container.as_slice(), &[2, 0]);
    }

    #[test]
    fn test_sort_without_comparator_is_noop() {
        let mut container = FixedCapacityContainer::new(4);
        container.add(3);
        container.add(1);
        container.sort(true);
        assert_eq!(container.as_slice(), &[3, 1]);
        assert!(!container.is_sorted());
    }

    #[test]
    fn test_selectable_algorithms() {
        for algorithm in [SortAlgorithm::Quick, SortAlgorithm::Shell, SortAlgorithm::Insertion] {
            let mut container = FixedCapacityContainer::with_comparator(32, ascending);
            container.set_sort_algorithm(algorithm);
            for value in (0..32).rev() {
                container.add(value);
            }
            container.sort(false);
            assert!(container.as_slice().windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_remove_item_and_clear() {
        let mut container = FixedCapacityContainer::new(4);
        container.add(1);
        container.add(2);
        container.add(3);

        assert_eq!(container.remove_item(&2, true), Some(2));
        assert_eq!(container.remove_item(&2, true), None);
        assert!(container.contains(&3));

        container.clear();
        assert!(container.is_empty());
        assert_eq!(container.capacity(), 4);
    }
}
