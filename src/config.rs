use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_ALLOCATION_PERCENTAGE;
use crate::error::ConfigError;

/// How physical frames are shared between processes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryPolicy {
    /// Each process owns a disjoint slice of the frame table
    Local,
    /// All processes compete for the whole frame table
    Global,
}

impl FromStr for MemoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(MemoryPolicy::Local),
            "global" => Ok(MemoryPolicy::Global),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for MemoryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryPolicy::Local => write!(f, "local"),
            MemoryPolicy::Global => write!(f, "global"),
        }
    }
}

/// System-wide settings from the first input line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Scheduler label; only echoed in reports
    pub scheduling_algorithm: String,
    /// Simulated cycles per scheduling turn
    pub cpu_slice: u32,
    pub memory_policy: MemoryPolicy,
    /// Physical memory in bytes
    pub memory_size: u64,
    /// Page and frame size in bytes
    pub page_frame_size: u64,
    /// Share of a process's pages it may keep resident under the local policy
    pub allocation_percentage: u32,
}

impl SystemConfig {
    /// Number of whole frames that fit in physical memory
    pub fn total_frames(&self) -> usize {
        if self.page_frame_size == 0 {
            return 0;
        }
        (self.memory_size / self.page_frame_size) as usize
    }

    /// Check the field ranges the engine depends on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cpu_slice == 0 {
            return Err(ConfigError::NotPositive { field: "cpu_slice" });
        }
        if self.memory_size == 0 {
            return Err(ConfigError::NotPositive { field: "memory_size" });
        }
        if self.page_frame_size == 0 {
            return Err(ConfigError::NotPositive {
                field: "page_frame_size",
            });
        }
        if self.allocation_percentage > MAX_ALLOCATION_PERCENTAGE {
            return Err(ConfigError::AllocationOutOfRange(self.allocation_percentage));
        }
        Ok(())
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            scheduling_algorithm: "FIFO".to_string(),
            cpu_slice: 1,
            memory_policy: MemoryPolicy::Global,
            memory_size: 0,
            page_frame_size: 1,
            allocation_percentage: MAX_ALLOCATION_PERCENTAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(memory_size: u64, page_frame_size: u64) -> SystemConfig {
        SystemConfig {
            memory_size,
            page_frame_size,
            ..SystemConfig::default()
        }
    }

    #[test]
    fn test_total_frames_floor_division() {
        // 1000 / 300 = 3.33 -> 3 whole frames
        assert_eq!(config(1000, 300).total_frames(), 3);
        assert_eq!(config(1200, 300).total_frames(), 4);
    }

    #[test]
    fn test_total_frames_smaller_than_one_frame() {
        assert_eq!(config(99, 100).total_frames(), 0);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("local".parse::<MemoryPolicy>(), Ok(MemoryPolicy::Local));
        assert_eq!(" Global ".parse::<MemoryPolicy>(), Ok(MemoryPolicy::Global));
        assert_eq!("shared".parse::<MemoryPolicy>(), Err("shared".to_string()));
    }

    #[test]
    fn test_validate_rejects_zero_fields() {
        let mut cfg = config(1000, 100);
        assert_eq!(cfg.validate(), Ok(()));

        cfg.cpu_slice = 0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NotPositive { field: "cpu_slice" })
        );

        let cfg = config(1000, 0);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NotPositive {
                field: "page_frame_size"
            })
        );
    }

    #[test]
    fn test_validate_rejects_percentage_above_100() {
        let mut cfg = config(1000, 100);
        cfg.allocation_percentage = 101;
        assert_eq!(cfg.validate(), Err(ConfigError::AllocationOutOfRange(101)));
    }
}
