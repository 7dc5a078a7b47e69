//! End-to-end runs from workload files on disk

use std::io::Write;

use fifo_paging_sim::io::write_report;
use fifo_paging_sim::{
    simulate, ConfigError, MemoryPolicy, Report, RoundRobinTrace, SequentialTrace, TraceModel,
    Workload,
};
use tempfile::NamedTempFile;

fn workload_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const CLASSIC_GLOBAL: &str = "\
RR|4|global|300|100|100
0|1|12|0|500|1,2,3,4,1,2,5,1,2,3,4,5
";

// Two processes, equal priority, sharing 2 frames. Round-robin lets pid 1
// finish first; sequential interleaves them cycle by cycle.
const CONTENDED: &str = "\
RR|1|global|200|100|100|1
disk|1|10
0|1|4|0|200|1 2 1 2
0|2|4|0|200|1 2 1 2
";

#[test]
fn test_classic_trace_from_file() {
    let file = workload_file(CLASSIC_GLOBAL);
    let workload = Workload::from_file(file.path()).unwrap();

    let result = simulate(&workload.config, &workload.processes, &RoundRobinTrace).unwrap();
    assert_eq!(result.faults, 9);
    assert_eq!(result.evictions, 6);

    let report = Report::new(&workload.config, "round-robin", &result);
    assert_eq!(report.batch_line(), "6|x|x|x|FIFO");
}

#[test]
fn test_models_disagree_on_contended_workload() {
    let file = workload_file(CONTENDED);
    let workload = Workload::from_file(file.path()).unwrap();
    assert_eq!(workload.devices.len(), 1);

    let rr = simulate(&workload.config, &workload.processes, &RoundRobinTrace).unwrap();
    let seq = simulate(&workload.config, &workload.processes, &SequentialTrace).unwrap();

    assert_eq!((rr.faults, rr.evictions), (4, 2));
    assert_eq!((seq.faults, seq.evictions), (8, 6));
}

#[test]
fn test_local_over_subscription_from_file() {
    // 3 frames, each process wants 2
    let file = workload_file(
        "RR|2|local|300|100|100\n0|1|4|0|200|1,2\n0|2|4|0|200|2,1\n",
    );
    let workload = Workload::from_file(file.path()).unwrap();
    assert_eq!(workload.config.memory_policy, MemoryPolicy::Local);

    for model in [TraceModel::RoundRobin, TraceModel::Sequential] {
        let err = simulate(&workload.config, &workload.processes, model.source()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::OverSubscribed {
                required: 4,
                available: 3
            }
        );
    }
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.txt");
    assert!(matches!(
        Workload::from_file(&missing),
        Err(ConfigError::Unreadable { .. })
    ));
}

#[test]
fn test_json_workload_file() {
    let text = Workload::parse(CONTENDED).unwrap();
    let json = serde_json::to_string(&text).unwrap();

    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let decoded = Workload::from_file(file.path()).unwrap();
    assert_eq!(decoded, text);
}

#[test]
fn test_report_written_to_file() {
    let workload = Workload::parse(CLASSIC_GLOBAL).unwrap();
    let result = simulate(&workload.config, &workload.processes, &SequentialTrace).unwrap();
    let rendered = Report::new(&workload.config, "sequential", &result).to_text();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.txt");
    write_report(&out, &rendered).unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains("Trace model:          sequential"));
    assert!(written.contains("Page faults: 9"));
}
