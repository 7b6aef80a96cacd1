//! Frame-pacing state shared between the presenter and its tests.
//!
//! The GPU consumes recorded commands long after the CPU has moved on, so
//! every per-frame resource (command allocator, constant region, overlay
//! vertices) exists once per back buffer and is only reused after the fence
//! the GPU signals for that frame has been observed. The bookkeeping here is
//! pure state; `d3d12::device::Device` drives it against the real queue,
//! fence and swapchain.

/// Number of back buffers cycled by the swapchain (triple buffering).
pub const FRAME_BUFFER_COUNT: usize = 3;

/// Constant-buffer views must start on 256-byte boundaries. This is imposed
/// by the hardware's constant read granularity, not a tunable.
pub const CONSTANT_ALIGNMENT: usize = 256;

/// Rounds `size` up to the next constant-buffer boundary.
pub fn aligned_size(size: usize) -> usize {
    (size + (CONSTANT_ALIGNMENT - 1)) & !(CONSTANT_ALIGNMENT - 1)
}

/// Byte offset of the `object`-th aligned copy of a `size`-byte constant
/// block inside a frame slot's upload region.
pub fn object_offset(object: usize, size: usize) -> usize {
    object * aligned_size(size)
}

/// A point on the queue's monotonically increasing fence timeline.
///
/// The queue owns a single counter; every submission snapshots the freshly
/// incremented value as its completion target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[must_use]
pub struct FenceValue {
    v: u64,
}

impl FenceValue {
    pub const ZERO: FenceValue = FenceValue { v: 0 };

    pub fn raw(self) -> u64 {
        self.v
    }

    /// Advances the counter and returns the new value.
    pub fn increment(&mut self) -> FenceValue {
        self.v += 1;
        *self
    }

    /// True once a completed-value read of `completed` covers this target.
    pub fn is_reached_by(self, completed: u64) -> bool {
        completed >= self.v
    }
}

/// Lifecycle of one frame slot's GPU work.
///
/// `Idle`: no outstanding work, recording may begin. `Submitted`: commands
/// are enqueued and the fence has not yet reached the stored target. The
/// third state of the cycle, complete (fence at or above target), is
/// observed on the fence itself rather than stored: the slot returns to
/// `Idle` when it is next acquired, after the caller finishes the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    Submitted(FenceValue),
}

/// Round-robin ring of frame slots, one per back buffer.
pub struct FrameRing {
    slots: [SlotState; FRAME_BUFFER_COUNT],
    current: usize,
}

impl FrameRing {
    /// `first` is the back-buffer index the swapchain starts on.
    pub fn new(first: usize) -> Self {
        debug_assert!(first < FRAME_BUFFER_COUNT);
        Self {
            slots: [SlotState::Idle; FRAME_BUFFER_COUNT],
            current: first,
        }
    }

    /// Index of the slot currently safe to record into.
    pub fn current(&self) -> usize {
        self.current
    }

    /// The index a flip-model swapchain will report after the next present.
    pub fn next_index(&self) -> usize {
        (self.current + 1) % FRAME_BUFFER_COUNT
    }

    /// Marks the current slot's work as enqueued with the given fence
    /// target. The slot must not already have outstanding work.
    pub fn submit(&mut self, target: FenceValue) {
        debug_assert_eq!(
            self.slots[self.current],
            SlotState::Idle,
            "slot {} submitted twice without reacquisition",
            self.current
        );
        self.slots[self.current] = SlotState::Submitted(target);
    }

    /// Adopts `index` (reported by the swapchain after a present) as the
    /// current slot and returns the fence target that must be observed
    /// complete before the slot's resources are touched again. `None` means
    /// the slot has no outstanding work and recording may begin at once.
    ///
    /// The caller owns the wait; once it returns, the slot is idle again.
    pub fn acquire(&mut self, index: usize) -> Option<FenceValue> {
        debug_assert!(index < FRAME_BUFFER_COUNT);
        self.current = index;
        match std::mem::replace(&mut self.slots[index], SlotState::Idle) {
            SlotState::Submitted(target) => Some(target),
            SlotState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_values_are_ordered() {
        let mut counter = FenceValue::ZERO;
        let first = counter.increment();
        let second = counter.increment();

        assert_eq!(first.raw(), 1);
        assert_eq!(second.raw(), 2);
        assert!(first < second);
        assert!(first.is_reached_by(1));
        assert!(!second.is_reached_by(1));
    }

    #[test]
    fn aligned_size_rounds_to_constant_boundary() {
        assert_eq!(aligned_size(1), 256);
        assert_eq!(aligned_size(16), 256);
        assert_eq!(aligned_size(256), 256);
        assert_eq!(aligned_size(257), 512);
    }

    #[test]
    fn buffered_object_copies_do_not_overlap() {
        // 16-byte constant block, three buffered copies
        let offsets: Vec<usize> = (0..3).map(|i| object_offset(i, 16)).collect();
        assert_eq!(offsets, vec![0, 256, 512]);

        for pair in offsets.windows(2) {
            assert!(pair[0] + aligned_size(16) <= pair[1]);
        }
    }

    #[test]
    fn indices_cycle_back_after_a_full_round() {
        let mut ring = FrameRing::new(0);
        let start = ring.current();

        for _ in 0..FRAME_BUFFER_COUNT {
            let next = ring.next_index();
            ring.submit(FenceValue { v: 1 });
            ring.acquire(next);
        }
        assert_eq!(ring.current(), start);
    }

    #[test]
    fn acquire_of_untouched_slot_needs_no_wait() {
        let mut ring = FrameRing::new(0);
        assert_eq!(ring.acquire(1), None);
        assert_eq!(ring.current(), 1);
    }

    /// Three slots, frames submitted with targets 1, 2, 3. Reusing slot 0
    /// for the fourth frame must require the fence to have reached 1.
    #[test]
    fn slot_reuse_waits_for_its_prior_submission() {
        let mut counter = FenceValue::ZERO;
        let mut ring = FrameRing::new(0);

        // GPU progress, as a completed-value the "hardware" has reached
        let mut completed: u64 = 0;

        for expected_target in 1..=3u64 {
            let target = counter.increment();
            assert_eq!(target.raw(), expected_target);
            ring.submit(target);

            let next = ring.next_index();
            if let Some(pending) = ring.acquire(next) {
                // block until the fence passes the slot's target
                while !pending.is_reached_by(completed) {
                    completed += 1;
                }
            }
        }

        // Back on slot 0; its submission targeted fence value 1, which the
        // simulated wait above must have observed before recording resumed.
        assert_eq!(ring.current(), 0);
        assert!(completed >= 1);
    }

    #[test]
    #[should_panic(expected = "submitted twice")]
    #[cfg(debug_assertions)]
    fn double_submit_is_rejected() {
        let mut ring = FrameRing::new(0);
        ring.submit(FenceValue { v: 1 });
        ring.submit(FenceValue { v: 2 });
    }
}
