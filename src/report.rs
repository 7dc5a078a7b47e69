//! Rendering of simulation results

use std::fmt;

use serde::Serialize;

use crate::config::SystemConfig;
use crate::constants::{BATCH_ALGORITHM_TAG, BATCH_PLACEHOLDER};
use crate::error::ReportError;
use crate::simulation::{SimulationResult, SkipReason, Step, StepOutcome};

/// Everything a report shows, for JSON output
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub config: &'a SystemConfig,
    pub trace_model: &'a str,
    pub result: &'a SimulationResult,
}

impl<'a> Report<'a> {
    pub fn new(config: &'a SystemConfig, trace_model: &'a str, result: &'a SimulationResult) -> Self {
        Report {
            config,
            trace_model,
            result,
        }
    }

    /// Single line for batch aggregation: `<evictions>|x|x|x|FIFO`
    pub fn batch_line(&self) -> String {
        let x = BATCH_PLACEHOLDER;
        format!(
            "{}|{x}|{x}|{x}|{}",
            self.result.evictions, BATCH_ALGORITHM_TAG
        )
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable report; see the `Display` impl
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

/// Configuration, per-event timeline (if recorded), totals, per-process
/// breakdown and final frame state
impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cfg = self.config;
        let result = self.result;

        writeln!(f, "=== Configuration ===")?;
        writeln!(f, "Scheduling algorithm: {}", cfg.scheduling_algorithm)?;
        writeln!(f, "CPU slice:            {}", cfg.cpu_slice)?;
        writeln!(f, "Memory policy:        {}", cfg.memory_policy)?;
        writeln!(f, "Memory size:          {} bytes", cfg.memory_size)?;
        writeln!(f, "Page/frame size:      {} bytes", cfg.page_frame_size)?;
        writeln!(f, "Allocation:           {}%", cfg.allocation_percentage)?;
        writeln!(f, "Total frames:         {}", result.total_frames)?;
        writeln!(f, "Trace model:          {}", self.trace_model)?;
        writeln!(f)?;

        if !result.timeline.is_empty() {
            writeln!(f, "=== Timeline ===")?;
            for step in &result.timeline {
                writeln!(f, "{}", describe_step(step))?;
            }
            writeln!(f)?;
        }

        writeln!(f, "=== FIFO Results ===")?;
        writeln!(f, "Events:      {}", result.events)?;
        writeln!(f, "Page faults: {}", result.faults)?;
        writeln!(f, "Hits:        {}", result.hits)?;
        writeln!(f, "Evictions:   {}", result.evictions)?;
        writeln!(f, "Skipped:     {}", result.skipped)?;
        writeln!(f)?;

        if !result.processes.is_empty() {
            writeln!(f, "PID\tFaults\tHits\tEvict\tSkipped\tFrames")?;
            for p in &result.processes {
                let frames = match (&p.frames, p.quota) {
                    (Some(range), Some(quota)) => {
                        format!("{}..{} (quota {})", range.start, range.end, quota)
                    }
                    _ => "shared".to_string(),
                };
                writeln!(
                    f,
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    p.pid, p.faults, p.hits, p.evictions, p.skipped, frames
                )?;
            }
            writeln!(f)?;
        }

        writeln!(f, "=== Final Frame State ===")?;
        for frame in &result.frames {
            match frame.resident {
                Some(r) => writeln!(
                    f,
                    "Frame {}: page {} (pid {}, loaded at {})",
                    frame.index, r.page, r.pid, r.load_time
                )?,
                None => writeln!(f, "Frame {}: empty", frame.index)?,
            }
        }
        Ok(())
    }
}

fn describe_step(step: &Step) -> String {
    let e = &step.event;
    let head = format!("t={} pid {} page {}", e.time, e.pid, e.page);
    match step.outcome {
        StepOutcome::Hit { frame } => format!("{head} -> hit (frame {frame})"),
        StepOutcome::Fault {
            frame,
            evicted: None,
        } => format!("{head} -> fault, loaded into free frame {frame}"),
        StepOutcome::Fault {
            frame,
            evicted: Some(victim),
        } => format!(
            "{head} -> fault, replaced pid {} page {} in frame {frame}",
            victim.pid, victim.page
        ),
        StepOutcome::Skipped { reason } => {
            let why = match reason {
                SkipReason::InvalidPage => "invalid page",
                SkipReason::UnknownProcess => "unknown process",
                SkipReason::NoFrames => "no frames",
            };
            format!("{head} -> skipped ({why})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryPolicy;
    use crate::process::Process;
    use crate::simulation::{simulate, Simulator};
    use crate::trace::{RoundRobinTrace, TraceSource};

    fn config() -> SystemConfig {
        SystemConfig {
            scheduling_algorithm: "RR".to_string(),
            cpu_slice: 2,
            memory_policy: MemoryPolicy::Global,
            memory_size: 300,
            page_frame_size: 100,
            allocation_percentage: 100,
        }
    }

    fn classic() -> Vec<Process> {
        vec![Process::new(1, 0, 12, 500, vec![1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5])]
    }

    #[test]
    fn test_batch_line() {
        let cfg = config();
        let result = simulate(&cfg, &classic(), &RoundRobinTrace).unwrap();
        let report = Report::new(&cfg, "round-robin", &result);
        assert_eq!(report.batch_line(), "6|x|x|x|FIFO");
    }

    #[test]
    fn test_text_report_sections() {
        let cfg = config();
        let result = simulate(&cfg, &classic(), &RoundRobinTrace).unwrap();
        let report = Report::new(&cfg, "round-robin", &result);
        let text = report.to_text();
        assert_eq!(text, format!("{report}"));

        assert!(text.contains("Memory policy:        global"));
        assert!(text.contains("Total frames:         3"));
        assert!(text.contains("Page faults: 9"));
        assert!(text.contains("Evictions:   6"));
        assert!(text.contains("Frame 0: page 5 (pid 1, loaded at 6)"));
        assert!(text.contains("1\t9\t3\t6\t0\tshared"));
        // No timeline unless recorded
        assert!(!text.contains("=== Timeline ==="));
    }

    #[test]
    fn test_text_report_timeline_and_empty_frames() {
        let mut cfg = config();
        cfg.memory_size = 400;
        let processes = vec![Process::new(1, 0, 3, 200, vec![1, 9, 1])];
        let trace = RoundRobinTrace.generate(&cfg, &processes);
        let result = Simulator::new(&cfg, &processes)
            .unwrap()
            .record_timeline(true)
            .run(&trace);

        let text = Report::new(&cfg, "round-robin", &result).to_text();
        assert!(text.contains("t=0 pid 1 page 1 -> fault, loaded into free frame 0"));
        assert!(text.contains("t=1 pid 1 page 9 -> skipped (invalid page)"));
        assert!(text.contains("t=2 pid 1 page 1 -> hit (frame 0)"));
        assert!(text.contains("Frame 3: empty"));
    }

    #[test]
    fn test_json_report() {
        let cfg = config();
        let result = simulate(&cfg, &classic(), &RoundRobinTrace).unwrap();
        let json = Report::new(&cfg, "sequential", &result).to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["trace_model"], "sequential");
        assert_eq!(value["config"]["memory_policy"], "global");
        assert_eq!(value["result"]["faults"], 9);
        assert_eq!(value["result"]["evictions"], 6);
        assert_eq!(value["result"]["frames"][1]["resident"]["page"], 3);
        // Empty timeline is omitted
        assert!(value["result"].get("timeline").is_none());
    }
}
