//! Simulation engine
//!
//! Replays a trace against a fresh frame table under the configured memory
//! policy and counts hits, faults and evictions. Every run owns its own
//! table and queues, so results depend only on the configuration, the
//! processes and the trace.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use log::{debug, info, warn};
use serde::Serialize;

use crate::allocation::{quota, FramePartition};
use crate::config::{MemoryPolicy, SystemConfig};
use crate::error::ConfigError;
use crate::fifo::{Access, EvictionQueue};
use crate::memory::{Frame, FrameTable, Residency};
use crate::process::{Pid, Process};
use crate::trace::{AccessEvent, TraceSource};

/// Why an event did not touch the frame table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Page number outside `[1, num_pages]` for its process
    InvalidPage,
    /// Event names a pid that is not in the workload
    UnknownProcess,
    /// Physical memory holds no whole frame
    NoFrames,
}

/// What happened to one access event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOutcome {
    Hit {
        frame: usize,
    },
    /// Page fault; `evicted` is set when a resident page had to make room
    Fault {
        frame: usize,
        evicted: Option<Residency>,
    },
    Skipped {
        reason: SkipReason,
    },
}

/// Timeline entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub event: AccessEvent,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessStats {
    pub pid: Pid,
    pub faults: u64,
    pub hits: u64,
    /// Evictions this process's faults caused
    pub evictions: u64,
    pub skipped: u64,
    /// Local policy only
    pub quota: Option<usize>,
    /// Local policy only
    pub frames: Option<Range<usize>>,
}

impl ProcessStats {
    fn new(pid: Pid) -> Self {
        ProcessStats {
            pid,
            faults: 0,
            hits: 0,
            evictions: 0,
            skipped: 0,
            quota: None,
            frames: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationResult {
    pub policy: MemoryPolicy,
    pub total_frames: usize,
    /// Events consumed, skipped ones included
    pub events: usize,
    pub faults: u64,
    pub hits: u64,
    pub evictions: u64,
    pub skipped: u64,
    /// Ordered by pid
    pub processes: Vec<ProcessStats>,
    /// Final occupancy of every frame
    pub frames: Vec<Frame>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub timeline: Vec<Step>,
}

/// Occupancy of one eviction scope at a point in the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeUsage {
    /// `None` for the shared global scope
    pub owner: Option<Pid>,
    pub frames: Range<usize>,
    pub queued: usize,
    pub occupied: usize,
}

enum Queues {
    /// No frames at all; nothing can be loaded
    Empty,
    Global(EvictionQueue),
    Local(BTreeMap<Pid, EvictionQueue>),
}

pub struct Simulator<'a> {
    config: &'a SystemConfig,
    processes: HashMap<Pid, &'a Process>,
    table: FrameTable,
    queues: Queues,
    stats: BTreeMap<Pid, ProcessStats>,
    events: usize,
    faults: u64,
    hits: u64,
    evictions: u64,
    skipped: u64,
    timeline: Option<Vec<Step>>,
}

impl<'a> Simulator<'a> {
    /// Validate the workload and lay out frames for the configured policy.
    ///
    /// Fails before any access is simulated on a bad configuration, a
    /// duplicate pid, or local quotas that do not fit in memory.
    pub fn new(config: &'a SystemConfig, processes: &'a [Process]) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut by_pid = HashMap::with_capacity(processes.len());
        let mut stats = BTreeMap::new();
        for process in processes {
            if by_pid.insert(process.pid, process).is_some() {
                return Err(ConfigError::DuplicatePid(process.pid));
            }
            stats.insert(process.pid, ProcessStats::new(process.pid));
        }

        let total_frames = config.total_frames();
        let table = FrameTable::new(total_frames);

        let queues = if table.is_empty() {
            Queues::Empty
        } else {
            match config.memory_policy {
                MemoryPolicy::Global => EvictionQueue::new(table.full_scope())
                    .map_or(Queues::Empty, Queues::Global),
                MemoryPolicy::Local => {
                    let partition = FramePartition::compute(config, processes, total_frames)?;
                    let mut local = BTreeMap::new();
                    for (pid, frames) in partition.iter() {
                        if let Some(entry) = stats.get_mut(&pid) {
                            entry.frames = Some(frames.clone());
                        }
                        if let Some(queue) = EvictionQueue::new(frames) {
                            local.insert(pid, queue);
                        }
                    }
                    for process in processes {
                        if let Some(entry) = stats.get_mut(&process.pid) {
                            entry.quota = Some(quota(process, config));
                        }
                    }
                    Queues::Local(local)
                }
            }
        };

        info!(
            "simulating {} processes on {} frames ({} policy)",
            processes.len(),
            total_frames,
            config.memory_policy
        );

        Ok(Simulator {
            config,
            processes: by_pid,
            table,
            queues,
            stats,
            events: 0,
            faults: 0,
            hits: 0,
            evictions: 0,
            skipped: 0,
            timeline: None,
        })
    }

    /// Keep a per-event timeline in the result
    pub fn record_timeline(mut self, enabled: bool) -> Self {
        self.timeline = if enabled { Some(Vec::new()) } else { None };
        self
    }

    pub fn frame_table(&self) -> &FrameTable {
        &self.table
    }

    /// Current usage of every eviction scope
    pub fn scope_usage(&self) -> Vec<ScopeUsage> {
        let usage = |owner: Option<Pid>, queue: &EvictionQueue| ScopeUsage {
            owner,
            frames: queue.scope().clone(),
            queued: queue.len(),
            occupied: self.table.occupied_in(queue.scope()),
        };
        match &self.queues {
            Queues::Empty => Vec::new(),
            Queues::Global(queue) => vec![usage(None, queue)],
            Queues::Local(queues) => queues
                .iter()
                .map(|(&pid, queue)| usage(Some(pid), queue))
                .collect(),
        }
    }

    /// Apply one access event
    pub fn step(&mut self, event: &AccessEvent) -> StepOutcome {
        self.events += 1;
        let outcome = self.resolve(event);

        let stats = self.stats.get_mut(&event.pid);
        match outcome {
            StepOutcome::Hit { frame } => {
                debug!("{}: hit in frame {}", event, frame);
                self.hits += 1;
                if let Some(s) = stats {
                    s.hits += 1;
                }
            }
            StepOutcome::Fault { frame, evicted } => {
                self.faults += 1;
                let replaced = evicted.is_some();
                if let Some(victim) = evicted {
                    debug!(
                        "{}: fault, evicted pid {} page {} from frame {}",
                        event, victim.pid, victim.page, frame
                    );
                    self.evictions += 1;
                } else {
                    debug!("{}: fault, loaded into free frame {}", event, frame);
                }
                if let Some(s) = stats {
                    s.faults += 1;
                    if replaced {
                        s.evictions += 1;
                    }
                }
            }
            StepOutcome::Skipped { reason } => {
                match reason {
                    SkipReason::NoFrames => debug!("{}: skipped, no frames", event),
                    _ => warn!("{}: skipped ({:?})", event, reason),
                }
                self.skipped += 1;
                if let Some(s) = stats {
                    s.skipped += 1;
                }
            }
        }

        if let Some(timeline) = self.timeline.as_mut() {
            timeline.push(Step {
                event: *event,
                outcome,
            });
        }
        outcome
    }

    fn resolve(&mut self, event: &AccessEvent) -> StepOutcome {
        let Some(process) = self.processes.get(&event.pid) else {
            return StepOutcome::Skipped {
                reason: SkipReason::UnknownProcess,
            };
        };
        if !process.is_valid_page(event.page, self.config.page_frame_size) {
            return StepOutcome::Skipped {
                reason: SkipReason::InvalidPage,
            };
        }

        let queue = match &mut self.queues {
            Queues::Empty => {
                return StepOutcome::Skipped {
                    reason: SkipReason::NoFrames,
                };
            }
            Queues::Global(queue) => queue,
            Queues::Local(queues) => match queues.get_mut(&event.pid) {
                Some(queue) => queue,
                None => {
                    return StepOutcome::Skipped {
                        reason: SkipReason::UnknownProcess,
                    };
                }
            },
        };

        match queue.access(&mut self.table, event.pid, event.page, event.time) {
            Access::Hit { frame } => StepOutcome::Hit { frame },
            Access::Loaded { frame } => StepOutcome::Fault {
                frame,
                evicted: None,
            },
            Access::Replaced { frame, evicted } => StepOutcome::Fault {
                frame,
                evicted: Some(evicted),
            },
        }
    }

    /// Replay a whole trace and produce the result
    pub fn run(mut self, trace: &[AccessEvent]) -> SimulationResult {
        for event in trace {
            self.step(event);
        }
        self.finish()
    }

    pub fn finish(self) -> SimulationResult {
        info!(
            "{} events: {} faults, {} hits, {} evictions, {} skipped",
            self.events, self.faults, self.hits, self.evictions, self.skipped
        );
        SimulationResult {
            policy: self.config.memory_policy,
            total_frames: self.table.len(),
            events: self.events,
            faults: self.faults,
            hits: self.hits,
            evictions: self.evictions,
            skipped: self.skipped,
            processes: self.stats.into_values().collect(),
            frames: self.table.into_frames(),
            timeline: self.timeline.unwrap_or_default(),
        }
    }
}

/// Replay `trace` for the given workload
pub fn run(
    config: &SystemConfig,
    processes: &[Process],
    trace: &[AccessEvent],
) -> Result<SimulationResult, ConfigError> {
    Ok(Simulator::new(config, processes)?.run(trace))
}

/// Generate a trace with `source` and replay it
pub fn simulate(
    config: &SystemConfig,
    processes: &[Process],
    source: &dyn TraceSource,
) -> Result<SimulationResult, ConfigError> {
    let simulator = Simulator::new(config, processes)?;
    let trace = source.generate(config, processes);
    debug!("{} trace: {} events", source.name(), trace.len());
    Ok(simulator.run(&trace))
}
