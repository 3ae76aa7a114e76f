//! Within-region cursor logic and debounce gates

use super::types::NavInput;
use crate::debounce::Debouncer;
use crate::settings::NavTiming;

/// Step an index by `delta`, wrapping at both ends
pub fn wrap_index(current: usize, delta: i32, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    let total = total as i64;
    ((current as i64 + delta as i64).rem_euclid(total)) as usize
}

/// Clamp an index after applying a delta
pub fn apply_index_delta(current: usize, delta: i32, max: usize) -> usize {
    if delta < 0 {
        current.saturating_sub(delta.unsigned_abs() as usize)
    } else {
        (current + delta as usize).min(max.saturating_sub(1))
    }
}

/// Pick the region focus should rest in.
///
/// `chain` is ordered root first. An empty region falls back to its nearest
/// non-empty ancestor; if none has items, the first non-empty region wins,
/// and with everything empty focus sits at the root.
pub fn settle_region<R: Copy + PartialEq>(chain: &[R], current: R, has_items: impl Fn(R) -> bool) -> R {
    if has_items(current) {
        return current;
    }
    let pos = chain.iter().position(|r| *r == current).unwrap_or(0);
    chain[..pos]
        .iter()
        .rev()
        .chain(chain.iter())
        .copied()
        .find(|r| has_items(*r))
        .or_else(|| chain.first().copied())
        .unwrap_or(current)
}

/// Index into one region's items. Always `< len` unless the region is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionCursor {
    index: usize,
    len: usize,
}

impl RegionCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn at_start(&self) -> bool {
        self.index == 0
    }

    pub fn at_end(&self) -> bool {
        self.index + 1 >= self.len
    }

    /// Resize; an index that would fall out of range resets to 0
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.index >= len {
            self.index = 0;
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Wrapping move. Returns whether the index changed.
    pub fn wrap(&mut self, delta: i32) -> bool {
        self.update(wrap_index(self.index, delta, self.len))
    }

    /// Clamped move. Returns whether the index changed.
    pub fn step(&mut self, delta: i32) -> bool {
        self.update(apply_index_delta(self.index, delta, self.len))
    }

    fn update(&mut self, next: usize) -> bool {
        let moved = next != self.index;
        self.index = next;
        moved
    }
}

/// Separate windows for held directions and discrete buttons
#[derive(Debug, Clone)]
pub struct NavDebounce {
    direction: Debouncer,
    action: Debouncer,
}

impl NavDebounce {
    pub fn new(timing: &NavTiming) -> Self {
        Self {
            direction: Debouncer::new(timing.direction()),
            action: Debouncer::new(timing.action()),
        }
    }

    pub fn gate(&mut self, input: NavInput) -> &mut Debouncer {
        if input.is_direction() {
            &mut self.direction
        } else {
            &mut self.action
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::types::NavDirection;
    use std::time::{Duration, Instant};

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(0, -1, 5), 4);
        assert_eq!(wrap_index(4, 1, 5), 0);
        assert_eq!(wrap_index(2, -1, 5), 1);
        assert_eq!(wrap_index(0, 1, 0), 0);
    }

    #[test]
    fn test_apply_delta() {
        assert_eq!(apply_index_delta(5, -1, 10), 4);
        assert_eq!(apply_index_delta(0, -1, 10), 0);
        assert_eq!(apply_index_delta(8, 5, 10), 9);
        assert_eq!(apply_index_delta(0, 3, 0), 0);
    }

    #[test]
    fn test_cursor_resets_when_shrunk_past_index() {
        let mut cursor = RegionCursor::new(5);
        cursor.step(4);
        assert_eq!(cursor.index(), 4);

        cursor.set_len(6);
        assert_eq!(cursor.index(), 4);

        cursor.set_len(3);
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_wrap_on_single_item_does_not_move() {
        let mut cursor = RegionCursor::new(1);
        assert!(!cursor.wrap(1));
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_settle_region() {
        let chain = [1, 2, 3];
        assert_eq!(settle_region(&chain, 3, |r| r != 3), 2);
        assert_eq!(settle_region(&chain, 3, |r| r == 1), 1);
        // Root empty: first populated region
        assert_eq!(settle_region(&chain, 1, |r| r == 3), 3);
        assert_eq!(settle_region(&chain, 2, |_| false), 1);
    }

    #[test]
    fn test_separate_gates() {
        let mut debounce = NavDebounce::new(&NavTiming::default());
        let now = Instant::now();

        assert!(debounce.gate(NavInput::Direction(NavDirection::Up)).trigger(now));
        assert!(debounce.gate(NavInput::Confirm).trigger(now));
        assert!(!debounce.gate(NavInput::Direction(NavDirection::Down)).trigger(now));
        assert!(!debounce.gate(NavInput::Cancel).trigger(now + Duration::from_millis(200)));
        assert!(debounce.gate(NavInput::Direction(NavDirection::Down)).trigger(now + Duration::from_millis(200)));
    }
}
