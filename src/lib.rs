pub mod allocation;
pub mod config;
pub mod constants;
pub mod error;
pub mod fifo;
pub mod io;
pub mod memory;
pub mod process;
pub mod report;
pub mod simulation;
pub mod trace;

// Re-export commonly used items for convenience
pub use config::{MemoryPolicy, SystemConfig};
pub use error::{ConfigError, ReportError};
pub use io::Workload;
pub use process::{Device, Page, Pid, Process, Tick};
pub use report::Report;
pub use simulation::{run, simulate, SimulationResult, Simulator};
pub use trace::{AccessEvent, RoundRobinTrace, SequentialTrace, TraceModel, TraceSource};
