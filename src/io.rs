use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{MemoryPolicy, SystemConfig};
use crate::constants::*;
use crate::error::{ConfigError, ReportError};
use crate::process::{Device, Page, Process};

/// Everything read from an input file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Workload {
    pub config: SystemConfig,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub processes: Vec<Process>,
}

impl Workload {
    /// Read a workload file; `.json` files are decoded as JSON, anything else
    /// as the pipe-separated text format
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::parse(&content)
        }
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let workload: Workload =
            serde_json::from_str(content).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;
        workload.config.validate()?;
        Ok(workload)
    }

    /// Parse the text format:
    ///
    /// ```text
    /// algorithm|cpu_slice|policy|memory_size|page_frame_size|allocation_pct[|num_devices]
    /// name|capacity|access_time                       (num_devices lines)
    /// creation_time|pid|execution_time|priority|memory_needed[|pages[|io_chance]]
    /// ```
    ///
    /// Blank lines and `#` comments are ignored. Page numbers are separated by
    /// commas and/or whitespace.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with(COMMENT_PREFIX));

        let Some((first, header)) = lines.next() else {
            return Err(ConfigError::Empty);
        };
        let (config, num_devices) = Self::parse_config_line(header, first)?;
        config.validate()?;

        let mut devices = Vec::new();
        while devices.len() < num_devices {
            let Some((n, line)) = lines.next() else {
                return Err(ConfigError::MissingDevices {
                    expected: num_devices,
                    found: devices.len(),
                });
            };
            devices.push(Self::parse_device_line(line, n)?);
        }

        let processes = lines
            .map(|(n, line)| Self::parse_process_line(line, n))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "parsed workload: {} devices, {} processes",
            devices.len(),
            processes.len()
        );
        Ok(Workload {
            config,
            devices,
            processes,
        })
    }

    fn parse_config_line(line: &str, n: usize) -> Result<(SystemConfig, usize), ConfigError> {
        let fields = split_fields(line);
        if fields.len() < CONFIG_MIN_FIELDS {
            return Err(ConfigError::MissingField {
                line: n,
                expected: CONFIG_MIN_FIELDS,
                found: fields.len(),
            });
        }

        let memory_policy: MemoryPolicy =
            fields[2]
                .parse()
                .map_err(|value| ConfigError::UnknownPolicy { line: n, value })?;

        let config = SystemConfig {
            scheduling_algorithm: fields[0].to_string(),
            cpu_slice: parse_number(fields[1], n, "cpu_slice")?,
            memory_policy,
            memory_size: parse_number(fields[3], n, "memory_size")?,
            page_frame_size: parse_number(fields[4], n, "page_frame_size")?,
            allocation_percentage: parse_number(fields[5], n, "allocation_percentage")?,
        };
        let num_devices = match fields.get(6) {
            Some(field) if !field.is_empty() => parse_number(field, n, "num_devices")?,
            _ => 0,
        };
        Ok((config, num_devices))
    }

    fn parse_device_line(line: &str, n: usize) -> Result<Device, ConfigError> {
        let fields = split_fields(line);
        if fields.len() < DEVICE_FIELDS {
            return Err(ConfigError::MissingField {
                line: n,
                expected: DEVICE_FIELDS,
                found: fields.len(),
            });
        }
        Ok(Device {
            name: fields[0].to_string(),
            capacity: parse_number(fields[1], n, "device capacity")?,
            access_time: parse_number(fields[2], n, "device access_time")?,
        })
    }

    fn parse_process_line(line: &str, n: usize) -> Result<Process, ConfigError> {
        let fields = split_fields(line);
        if fields.len() < PROCESS_MIN_FIELDS {
            return Err(ConfigError::MissingField {
                line: n,
                expected: PROCESS_MIN_FIELDS,
                found: fields.len(),
            });
        }

        let page_sequence = match fields.get(5) {
            Some(field) => parse_page_sequence(field, n)?,
            None => Vec::new(),
        };
        let io_chance = match fields.get(6) {
            Some(field) if !field.is_empty() => parse_number(field, n, "io_chance")?,
            _ => 0,
        };

        Ok(Process {
            creation_time: parse_number(fields[0], n, "creation_time")?,
            pid: parse_number(fields[1], n, "pid")?,
            execution_time: parse_number(fields[2], n, "execution_time")?,
            priority: parse_number(fields[3], n, "priority")?,
            memory_needed: parse_number(fields[4], n, "memory_needed")?,
            page_sequence,
            io_chance,
        })
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(FIELD_SEPARATOR).map(str::trim).collect()
}

fn parse_number<T: std::str::FromStr>(
    token: &str,
    line: usize,
    field: &'static str,
) -> Result<T, ConfigError> {
    token.parse().map_err(|_| ConfigError::InvalidNumber {
        line,
        field,
        value: token.to_string(),
    })
}

/// Split a page list on commas and whitespace. Out-of-range numbers are kept;
/// only non-numeric tokens are rejected.
pub fn parse_page_sequence(field: &str, line: usize) -> Result<Vec<Page>, ConfigError> {
    field
        .split(&PAGE_SEPARATORS[..])
        .filter(|token| !token.is_empty())
        .map(|token| parse_number(token, line, "page number"))
        .collect()
}

pub fn write_report<P: AsRef<Path>>(path: P, content: &str) -> Result<(), ReportError> {
    let path = path.as_ref();
    fs::write(path, content).map_err(|e| ReportError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
RR|3|local|1000|100|50|2
disk|1|5
printer|2|8
0|1|6|2|300|1,2,3,1,2,3|10
# late arrival
2|2|4|1|250|2 1 2 3
";

    #[test]
    fn test_parse_full_sample() {
        let w = Workload::parse(SAMPLE).unwrap();

        assert_eq!(w.config.scheduling_algorithm, "RR");
        assert_eq!(w.config.cpu_slice, 3);
        assert_eq!(w.config.memory_policy, MemoryPolicy::Local);
        assert_eq!(w.config.memory_size, 1000);
        assert_eq!(w.config.page_frame_size, 100);
        assert_eq!(w.config.allocation_percentage, 50);
        assert_eq!(w.config.total_frames(), 10);

        assert_eq!(w.devices.len(), 2);
        assert_eq!(
            w.devices[1],
            Device {
                name: "printer".to_string(),
                capacity: 2,
                access_time: 8
            }
        );

        assert_eq!(w.processes.len(), 2);
        let p1 = &w.processes[0];
        assert_eq!((p1.creation_time, p1.pid, p1.execution_time), (0, 1, 6));
        assert_eq!(p1.priority, 2);
        assert_eq!(p1.page_sequence, vec![1, 2, 3, 1, 2, 3]);
        assert_eq!(p1.io_chance, 10);

        let p2 = &w.processes[1];
        assert_eq!(p2.page_sequence, vec![2, 1, 2, 3]);
        assert_eq!(p2.io_chance, 0);
    }

    #[test]
    fn test_parse_without_device_count() {
        let w = Workload::parse("FIFO|2|global|400|100|100\n0|7|3|0|200|1,2,1").unwrap();
        assert!(w.devices.is_empty());
        assert_eq!(w.processes[0].pid, 7);
    }

    #[test]
    fn test_parse_missing_page_sequence() {
        let w = Workload::parse("FIFO|2|global|400|100|100\n0|7|3|0|200").unwrap();
        assert!(w.processes[0].page_sequence.is_empty());

        let w = Workload::parse("FIFO|2|global|400|100|100\n0|7|3|0|200|").unwrap();
        assert!(w.processes[0].page_sequence.is_empty());
    }

    #[test]
    fn test_mixed_page_separators() {
        let pages = parse_page_sequence(" 1, 2 3,,4\t5 ", 1).unwrap();
        assert_eq!(pages, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_out_of_range_pages_are_kept() {
        let pages = parse_page_sequence("0,-3,99", 1).unwrap();
        assert_eq!(pages, vec![0, -3, 99]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(Workload::parse(""), Err(ConfigError::Empty));
        assert_eq!(Workload::parse("\n  \n# nothing\n"), Err(ConfigError::Empty));
    }

    #[test]
    fn test_malformed_number_reports_line() {
        let err = Workload::parse("FIFO|two|global|400|100|100").unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                line: 1,
                field: "cpu_slice",
                value: "two".to_string()
            }
        );

        let err = Workload::parse("FIFO|2|global|400|100|100\n\n0|1|3|0|200|1,x,2").unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                line: 3,
                field: "page number",
                value: "x".to_string()
            }
        );
    }

    #[test]
    fn test_short_lines() {
        let err = Workload::parse("FIFO|2|global|400").unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingField {
                line: 1,
                expected: 6,
                found: 4
            }
        );

        let err = Workload::parse("FIFO|2|global|400|100|100\n0|1|3").unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingField {
                line: 2,
                expected: 5,
                found: 3
            }
        );
    }

    #[test]
    fn test_unknown_policy() {
        let err = Workload::parse("FIFO|2|shared|400|100|100").unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownPolicy {
                line: 1,
                value: "shared".to_string()
            }
        );
    }

    #[test]
    fn test_missing_device_lines() {
        let err = Workload::parse("FIFO|2|global|400|100|100|2\ndisk|1|5").unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingDevices {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_huge_device_count_is_config_error() {
        let input = format!("RR|1|global|100|10|50|{}\n", usize::MAX);
        let err = Workload::parse(&input).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingDevices {
                expected: usize::MAX,
                found: 0
            }
        );
    }

    #[test]
    fn test_invalid_config_values() {
        let err = Workload::parse("FIFO|2|global|400|0|100").unwrap_err();
        assert_eq!(
            err,
            ConfigError::NotPositive {
                field: "page_frame_size"
            }
        );

        let err = Workload::parse("FIFO|2|global|400|100|150").unwrap_err();
        assert_eq!(err, ConfigError::AllocationOutOfRange(150));
    }

    #[test]
    fn test_json_workload() {
        let json = r#"{
            "config": {
                "scheduling_algorithm": "RR",
                "cpu_slice": 2,
                "memory_policy": "global",
                "memory_size": 300,
                "page_frame_size": 100,
                "allocation_percentage": 100
            },
            "processes": [
                { "pid": 1, "creation_time": 0, "execution_time": 3,
                  "priority": 0, "memory_needed": 200, "page_sequence": [1, 2, 1] }
            ]
        }"#;
        let w = Workload::from_json(json).unwrap();
        assert_eq!(w.config.memory_policy, MemoryPolicy::Global);
        assert!(w.devices.is_empty());
        assert_eq!(w.processes[0].page_sequence, vec![1, 2, 1]);
    }

    #[test]
    fn test_json_workload_rejects_garbage() {
        assert!(matches!(
            Workload::from_json("{ not json"),
            Err(ConfigError::InvalidJson(_))
        ));
    }
}
