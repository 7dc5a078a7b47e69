//! Access trace generation
//!
//! A trace is the time-ordered list of every page access the simulation will
//! replay. Two models produce it and they disagree on interleaving, so they
//! give different eviction counts for the same workload:
//!
//! - [`RoundRobinTrace`]: a simulated clock hands out `cpu_slice` cycles at a
//!   time to the highest-priority ready process. This is the default.
//! - [`SequentialTrace`]: each process runs as if alone from its creation
//!   time; the per-process streams are merged by timestamp.
//!
//! Both emit invalid page numbers as events; the engine skips them, but they
//! still occupy their cycle.

use std::fmt;

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::config::SystemConfig;
use crate::process::{Page, Pid, Process, Tick};

/// One page access at a point in simulated time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEvent {
    pub time: Tick,
    pub pid: Pid,
    pub page: Page,
}

impl fmt::Display for AccessEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={} pid={} page={}", self.time, self.pid, self.page)
    }
}

/// Something that turns a workload into a trace. Must be deterministic.
pub trait TraceSource {
    fn name(&self) -> &'static str;

    fn generate(&self, config: &SystemConfig, processes: &[Process]) -> Vec<AccessEvent>;
}

/// Selectable trace model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraceModel {
    #[default]
    RoundRobin,
    Sequential,
}

impl TraceModel {
    pub fn source(self) -> &'static dyn TraceSource {
        match self {
            TraceModel::RoundRobin => &RoundRobinTrace,
            TraceModel::Sequential => &SequentialTrace,
        }
    }
}

impl fmt::Display for TraceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source().name())
    }
}

/// Uncontended execution: access `i` of a process happens at `creation_time + i`
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialTrace;

impl TraceSource for SequentialTrace {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn generate(&self, _config: &SystemConfig, processes: &[Process]) -> Vec<AccessEvent> {
        // Stable order by creation time so equal timestamps resolve to the
        // earlier-created process, then to input order
        let mut by_creation: Vec<&Process> = processes.iter().collect();
        by_creation.sort_by_key(|p| p.creation_time);

        // A stream ends early if its timestamps would run past Tick::MAX
        let mut events: Vec<AccessEvent> = by_creation
            .into_iter()
            .flat_map(|process| {
                let steps = usize::try_from(process.execution_time).unwrap_or(usize::MAX);
                process
                    .page_sequence
                    .iter()
                    .take(steps)
                    .enumerate()
                    .map_while(move |(i, &page)| {
                        let time = process.creation_time.checked_add(i as Tick)?;
                        Some(AccessEvent {
                            time,
                            pid: process.pid,
                            page,
                        })
                    })
            })
            .collect();

        events.sort_by_key(|event| event.time);
        events
    }
}

/// Quantum scheduling on a single simulated CPU.
///
/// On every scan the first ready process (priority descending, then pid
/// ascending) runs for `min(cpu_slice, remaining)` cycles. Each cycle advances
/// the clock by one and consumes the next entry of its page sequence, if any
/// is left. A process retires when its execution time is used up. When
/// nothing is ready the clock skips to the next creation time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinTrace;

struct RunState<'a> {
    process: &'a Process,
    remaining: Tick,
    cursor: usize,
}

impl TraceSource for RoundRobinTrace {
    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn generate(&self, config: &SystemConfig, processes: &[Process]) -> Vec<AccessEvent> {
        let mut states: Vec<RunState> = processes
            .iter()
            .map(|process| RunState {
                process,
                remaining: process.execution_time,
                cursor: 0,
            })
            .collect();
        states.sort_by(|a, b| {
            b.process
                .priority
                .cmp(&a.process.priority)
                .then(a.process.pid.cmp(&b.process.pid))
        });

        let slice = Tick::from(config.cpu_slice.max(1));
        let mut clock: Tick = 0;
        let mut events = Vec::new();

        loop {
            let ready = states
                .iter()
                .position(|s| s.remaining > 0 && s.process.creation_time <= clock);

            let Some(index) = ready else {
                let pending = states
                    .iter()
                    .filter(|s| s.remaining > 0)
                    .map(|s| s.process.creation_time)
                    .min();
                match pending {
                    Some(next) => {
                        trace!("cpu idle from {} to {}", clock, next);
                        clock = next;
                        continue;
                    }
                    None => break,
                }
            };

            // The selected process keeps winning every scan until it retires or
            // an earlier-ordered process arrives, so run all of those slices
            // at once. Preemption still lands on a slice boundary.
            let arrival = states[..index]
                .iter()
                .filter(|s| s.remaining > 0)
                .map(|s| s.process.creation_time)
                .min();
            let budget = match arrival {
                Some(at) => (at - clock).div_ceil(slice).saturating_mul(slice),
                None => Tick::MAX,
            };

            let state = &mut states[index];
            let cycles = budget.min(state.remaining);
            trace!(
                "t={} pid {} runs {} cycles ({} left)",
                clock, state.process.pid, cycles, state.remaining
            );

            // Cycles past the end of the page sequence emit nothing
            let pending = &state.process.page_sequence[state.cursor..];
            let burst = usize::try_from(cycles).map_or(pending.len(), |c| c.min(pending.len()));
            for (offset, &page) in pending[..burst].iter().enumerate() {
                let Some(time) = clock.checked_add(offset as Tick) else {
                    break;
                };
                events.push(AccessEvent {
                    time,
                    pid: state.process.pid,
                    page,
                });
            }
            state.cursor += burst;
            state.remaining -= cycles;

            match clock.checked_add(cycles) {
                Some(next) => clock = next,
                None => {
                    warn!(
                        "clock overflow while pid {} runs; trace ends at t={}",
                        state.process.pid,
                        Tick::MAX
                    );
                    break;
                }
            }
            if state.remaining == 0 {
                trace!("pid {} retired at t={}", state.process.pid, clock);
            }
        }

        events
    }
}
