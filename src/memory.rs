use std::ops::Range;

use serde::Serialize;

use crate::process::{Page, Pid, Tick};

/// What a frame holds while it is occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Residency {
    pub pid: Pid,
    pub page: Page,
    /// Time of the most recent load into the frame
    pub load_time: Tick,
}

/// One physical frame slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub index: usize,
    pub resident: Option<Residency>,
}

impl Frame {
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.resident.is_some()
    }

    /// True if this frame holds `page` of `pid`
    #[inline]
    pub fn holds(&self, pid: Pid, page: Page) -> bool {
        matches!(self.resident, Some(r) if r.pid == pid && r.page == page)
    }
}

/// Physical memory as a fixed array of frames, addressed only by index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTable {
    frames: Vec<Frame>,
}

impl FrameTable {
    /// Create `total_frames` empty frames
    pub fn new(total_frames: usize) -> Self {
        let frames = (0..total_frames)
            .map(|index| Frame {
                index,
                resident: None,
            })
            .collect();
        FrameTable { frames }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Range covering the whole table
    pub fn full_scope(&self) -> Range<usize> {
        0..self.frames.len()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Locate the frame holding `page` of `pid` within `scope`
    pub fn find(&self, scope: &Range<usize>, pid: Pid, page: Page) -> Option<usize> {
        self.frames[scope.clone()]
            .iter()
            .find(|frame| frame.holds(pid, page))
            .map(|frame| frame.index)
    }

    /// Lowest-index unoccupied frame within `scope`
    pub fn first_free(&self, scope: &Range<usize>) -> Option<usize> {
        self.frames[scope.clone()]
            .iter()
            .find(|frame| !frame.is_occupied())
            .map(|frame| frame.index)
    }

    /// Put `page` of `pid` into a frame, replacing whatever it held.
    ///
    /// Callers evict first when the frame is occupied; this does not track
    /// what it overwrites.
    pub fn load(&mut self, index: usize, pid: Pid, page: Page, time: Tick) {
        self.frames[index].resident = Some(Residency {
            pid,
            page,
            load_time: time,
        });
    }

    /// Free a frame, returning what it held
    pub fn evict(&mut self, index: usize) -> Option<Residency> {
        self.frames[index].resident.take()
    }

    /// Number of occupied frames within `scope`
    pub fn occupied_in(&self, scope: &Range<usize>) -> usize {
        self.frames[scope.clone()]
            .iter()
            .filter(|frame| frame.is_occupied())
            .count()
    }

    /// Number of free frames in the whole table
    pub fn free_count(&self) -> usize {
        self.frames.len() - self.occupied_in(&self.full_scope())
    }

    /// Snapshot of every frame, for reporting
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl Default for FrameTable {
    fn default() -> Self {
        Self::new(0)
    }
}
