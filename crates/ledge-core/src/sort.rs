//! In-place Sorting
//!
//! Comparator-driven sorts used by [`FixedCapacityContainer`](crate::container::FixedCapacityContainer).
//! None of the in-house algorithms touch the heap, so a container can be
//! re-sorted in the middle of a frame without allocating.

use std::cmp::Ordering;

/// Ordering function injected into a container
pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// Partitions at or below this size fall back to insertion sort
const INSERTION_CUTOFF: usize = 12;

/// Sort algorithm used by a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortAlgorithm {
    /// Median-of-three quicksort with an insertion-sort cut-off (unstable, allocation free)
    Quick,
    /// Shell sort over Knuth's gap sequence (unstable, allocation free)
    Shell,
    /// Plain insertion sort (stable, allocation free, quadratic)
    Insertion,
    /// The standard library's stable merge sort (may allocate a scratch buffer)
    #[default]
    Standard,
}

impl SortAlgorithm {
    /// Sort `items` in place with the given comparator
    pub fn sort<T>(self, items: &mut [T], cmp: Comparator<T>) {
        match self {
            Self::Quick => quick_sort(items, cmp),
            Self::Shell => shell_sort(items, cmp),
            Self::Insertion => insertion_sort(items, cmp),
            Self::Standard => items.sort_by(cmp),
        }
    }
}

fn insertion_sort<T>(items: &mut [T], cmp: Comparator<T>) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && cmp(&items[j], &items[j - 1]) == Ordering::Less {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
}

fn shell_sort<T>(items: &mut [T], cmp: Comparator<T>) {
    let len = items.len();
    let mut gap = 1;
    while gap < len / 3 {
        gap = gap * 3 + 1;
    }

    while gap >= 1 {
        for i in gap..len {
            let mut j = i;
            while j >= gap && cmp(&items[j], &items[j - gap]) == Ordering::Less {
                items.swap(j, j - gap);
                j -= gap;
            }
        }
        gap /= 3;
    }
}

fn quick_sort<T>(items: &mut [T], cmp: Comparator<T>) {
    let mut items = items;
    loop {
        if items.len() <= INSERTION_CUTOFF {
            insertion_sort(items, cmp);
            return;
        }

        let (lt, gt) = partition(items, cmp);
        let (left, rest) = std::mem::take(&mut items).split_at_mut(lt);
        let right = &mut rest[gt - lt..];

        // Recurse into the smaller side so stack depth stays logarithmic
        if left.len() < right.len() {
            quick_sort(left, cmp);
            items = right;
        } else {
            quick_sort(right, cmp);
            items = left;
        }
    }
}

/// Three-way partition around a median-of-three pivot
///
/// Returns `(lt, gt)`: `[0, lt)` sorts before the pivot, `[lt, gt)` equals
/// it and `[gt, len)` sorts after it. Runs of equal keys end up in the
/// middle band and are never visited again.
fn partition<T>(items: &mut [T], cmp: Comparator<T>) -> (usize, usize) {
    let last = items.len() - 1;
    let mid = last / 2;

    if cmp(&items[mid], &items[0]) == Ordering::Less {
        items.swap(mid, 0);
    }
    if cmp(&items[last], &items[0]) == Ordering::Less {
        items.swap(last, 0);
    }
    if cmp(&items[last], &items[mid]) == Ordering::Less {
        items.swap(last, mid);
    }
    // Pivot parks at index 0 and moves with the equal band
    items.swap(0, mid);

    let mut lt = 0;
    let mut i = 1;
    let mut gt = items.len();
    while i < gt {
        match cmp(&items[i], &items[lt]) {
            Ordering::Less => {
                items.swap(i, lt);
                lt += 1;
                i += 1;
            }
            Ordering::Greater => {
                gt -= 1;
                items.swap(i, gt);
            }
            Ordering::Equal => i += 1,
        }
    }
    (lt, gt)
}
