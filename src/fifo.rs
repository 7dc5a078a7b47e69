//! FIFO eviction queue
//!
//! One queue owns a scope of frames (a process's reservation, or the whole
//! table). It remembers frames in the order pages were loaded into them; the
//! front is always the next victim. Hits never reorder the queue.

use std::collections::VecDeque;
use std::ops::Range;

use crate::memory::{FrameTable, Residency};
use crate::process::{Page, Pid, Tick};

/// Result of presenting one access to a queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Page already resident in `frame`
    Hit { frame: usize },
    /// Page loaded into a free frame
    Loaded { frame: usize },
    /// Page loaded into `frame` after evicting its previous occupant
    Replaced { frame: usize, evicted: Residency },
}

impl Access {
    pub fn frame(&self) -> usize {
        match *self {
            Access::Hit { frame } | Access::Loaded { frame } | Access::Replaced { frame, .. } => {
                frame
            }
        }
    }

    #[inline]
    pub fn is_fault(&self) -> bool {
        !matches!(self, Access::Hit { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictionQueue {
    scope: Range<usize>,
    order: VecDeque<usize>,
}

impl EvictionQueue {
    /// Queue over `scope`; `None` for an empty scope, which could never hold a page
    pub fn new(scope: Range<usize>) -> Option<Self> {
        if scope.is_empty() {
            return None;
        }
        Some(EvictionQueue {
            order: VecDeque::with_capacity(scope.len()),
            scope,
        })
    }

    pub fn scope(&self) -> &Range<usize> {
        &self.scope
    }

    /// Frames this queue may fill
    pub fn capacity(&self) -> usize {
        self.scope.len()
    }

    /// Resident pages, equal to occupied frames in scope
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Frame that would be evicted next, if the scope were full
    pub fn next_victim(&self) -> Option<usize> {
        self.order.front().copied()
    }

    /// Frames in load order, oldest first
    pub fn load_order(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied()
    }

    /// Resolve an access to `page` of `pid` at `time` against the frame table
    pub fn access(&mut self, table: &mut FrameTable, pid: Pid, page: Page, time: Tick) -> Access {
        if let Some(frame) = table.find(&self.scope, pid, page) {
            return Access::Hit { frame };
        }

        if let Some(frame) = table.first_free(&self.scope) {
            table.load(frame, pid, page, time);
            self.order.push_back(frame);
            return Access::Loaded { frame };
        }

        let frame = match self.order.pop_front() {
            Some(frame) => frame,
            // scope is non-empty and has no free frame, so the queue holds every frame in it
            None => unreachable!("full eviction scope with an empty queue"),
        };
        let evicted = match table.evict(frame) {
            Some(resident) => resident,
            None => unreachable!("queued frame {} was not occupied", frame),
        };
        table.load(frame, pid, page, time);
        self.order.push_back(frame);
        Access::Replaced { frame, evicted }
    }
}
