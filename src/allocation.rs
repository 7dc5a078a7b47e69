//! Frame allocation policy
//!
//! Under the local policy every process is given a fixed number of frames (its
//! quota) carved out of the frame table as a contiguous range. Ranges never
//! overlap; a workload whose quotas do not fit is rejected before simulation.

use std::collections::BTreeMap;
use std::ops::Range;

use log::debug;

use crate::config::SystemConfig;
use crate::constants::{MAX_ALLOCATION_PERCENTAGE, MIN_LOCAL_QUOTA};
use crate::error::ConfigError;
use crate::process::{Pid, Process};

/// Frames a process may keep resident under the local policy.
///
/// `max(1, floor(num_pages * allocation_percentage / 100))`, saturating at
/// `usize::MAX` for page counts no frame table could hold
pub fn quota(process: &Process, config: &SystemConfig) -> usize {
    let pages = u128::from(process.num_pages(config.page_frame_size));
    let share =
        pages * u128::from(config.allocation_percentage) / u128::from(MAX_ALLOCATION_PERCENTAGE);
    usize::try_from(share)
        .unwrap_or(usize::MAX)
        .max(MIN_LOCAL_QUOTA)
}

/// Disjoint per-process frame reservations
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FramePartition {
    reservations: BTreeMap<Pid, Range<usize>>,
    reserved: usize,
}

impl FramePartition {
    /// Reserve each process's quota in input order.
    ///
    /// Fails with `OverSubscribed` when the quotas add up to more than
    /// `total_frames`.
    pub fn compute(
        config: &SystemConfig,
        processes: &[Process],
        total_frames: usize,
    ) -> Result<Self, ConfigError> {
        let required = processes
            .iter()
            .map(|p| quota(p, config))
            .fold(0usize, usize::saturating_add);
        if required > total_frames {
            return Err(ConfigError::OverSubscribed {
                required,
                available: total_frames,
            });
        }

        let mut reservations = BTreeMap::new();
        let mut next = 0;
        for process in processes {
            let frames = next..next + quota(process, config);
            debug!(
                "pid {} reserves frames {}..{}",
                process.pid, frames.start, frames.end
            );
            next = frames.end;
            if reservations.insert(process.pid, frames).is_some() {
                return Err(ConfigError::DuplicatePid(process.pid));
            }
        }

        Ok(FramePartition {
            reservations,
            reserved: next,
        })
    }

    /// Frame range reserved for `pid`
    pub fn frames_for(&self, pid: Pid) -> Option<Range<usize>> {
        self.reservations.get(&pid).cloned()
    }

    /// Total frames handed out
    pub fn reserved(&self) -> usize {
        self.reserved
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pid, Range<usize>)> + '_ {
        self.reservations.iter().map(|(&pid, range)| (pid, range.clone()))
    }
}
