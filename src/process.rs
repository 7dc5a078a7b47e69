use serde::{Deserialize, Serialize};

use crate::constants::FIRST_PAGE;

pub type Pid = u32;

/// 1-indexed page number within a process; values outside the process range are kept
/// so the engine can skip them
pub type Page = i64;

/// Simulated time in cycles
pub type Tick = u64;

/// A process descriptor as read from the input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub pid: Pid,
    pub creation_time: Tick,
    /// Total cycles the process runs before retiring
    pub execution_time: Tick,
    /// Higher runs first under the round-robin trace
    pub priority: i32,
    /// Virtual memory footprint in bytes
    pub memory_needed: u64,
    #[serde(default)]
    pub page_sequence: Vec<Page>,
    /// Chance (0..100) of an I/O request; carried for the device layer, unused here
    #[serde(default)]
    pub io_chance: u32,
}

impl Process {
    pub fn new(
        pid: Pid,
        creation_time: Tick,
        execution_time: Tick,
        memory_needed: u64,
        page_sequence: Vec<Page>,
    ) -> Self {
        Process {
            pid,
            creation_time,
            execution_time,
            priority: 0,
            memory_needed,
            page_sequence,
            io_chance: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Pages needed to hold `memory_needed` bytes (rounded up)
    pub fn num_pages(&self, page_frame_size: u64) -> u64 {
        if page_frame_size == 0 {
            return 0;
        }
        self.memory_needed.div_ceil(page_frame_size)
    }

    /// Whether `page` lies in `[1, num_pages]`
    #[inline]
    pub fn is_valid_page(&self, page: Page, page_frame_size: u64) -> bool {
        page >= FIRST_PAGE && (page as u64) <= self.num_pages(page_frame_size)
    }
}

/// An I/O device descriptor; parsed and reported, never simulated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    /// Simultaneous users the device accepts
    pub capacity: u32,
    pub access_time: u32,
}
