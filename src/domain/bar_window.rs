//! Bounded FIFO window of the most recent bars.

use std::collections::VecDeque;

use super::ohlcv::OhlcvBar;

#[derive(Debug, Clone)]
pub struct BarWindow {
    capacity: usize,
    bars: VecDeque<OhlcvBar>,
}

impl BarWindow {
    /// A zero capacity is bumped to 1 so the latest bar is always visible.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            bars: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn push(&mut self, bar: OhlcvBar) {
        self.bars.push_back(bar);
        while self.bars.len() > self.capacity {
            self.bars.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&OhlcvBar> {
        self.bars.back()
    }

    /// Contiguous oldest-to-newest view, as consumed by the indicator functions.
    pub fn as_slice(&mut self) -> &[OhlcvBar] {
        self.bars.make_contiguous()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OhlcvBar> {
        self.bars.iter()
    }
}
