use std::fs;
use std::path::Path;
use pingpong_report::{
    render,
    run,
    Dataset,
    Error,
    LatencyWindow,
    ReportConfig,
    ThresholdOptions,
};
use tempfile::TempDir;

const HEADER: &str = "message_size,avg_send_us,avg_recv_us,rtt_us,bandwidth_mb_s\n";

fn setup(body: &str) -> (TempDir, ReportConfig) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("results.csv");
    fs::write(&input, format!("{}{}", HEADER, body)).unwrap();
    let config = ReportConfig {
        input,
        output: dir.path().join("Network_PingPong_Report.pdf"),
        ..ReportConfig::default()
    };
    (dir, config)
}

fn page_count(path: &Path) -> usize {
    lopdf::Document::load(path).unwrap().get_pages().len()
}

/// A run on one node: sizes 1 B .. 4 MB.
fn shared_memory_csv() -> String {
    let mut body = String::from("# size sweep, 1000 iterations each\n");
    let mut size = 1u64;
    while size <= 4 << 20 {
        let send = if size < 16384 { 0.1 } else { 1.0 + size as f64 / 25000.0 };
        let rtt = 0.25 + 2.0 * size as f64 / 27000.0;
        let bandwidth = size as f64 / (rtt / 2.0);
        body.push_str(&format!("{},{:.4},{:.4},{:.4},{:.2}\n", size, send, send, rtt, bandwidth));
        size *= 2;
    }
    body
}

#[test]
fn scenario_produces_two_pages() {
    let (_dir, config) = setup(concat!(
        "1,0.1,0,0.24,10\n4,0.1,0,0.20,15\n64,0.2,0,0.30,120\n",
        "1024,0.5,0,1.0,900\n131072,5.0,0,10.0,27000\n",
    ));
    let output = run(&config).unwrap();
    assert_eq!(output, config.output);
    assert_eq!(page_count(&output), 2);
}

#[test]
fn single_row_still_produces_two_pages() {
    let (_dir, config) = setup("8,0.3,0,0.9,4.0\n");
    run(&config).unwrap();
    assert_eq!(page_count(&config.output), 2);
}

#[test]
fn long_run_produces_two_pages() {
    let (_dir, config) = setup(&shared_memory_csv());
    run(&config).unwrap();
    assert_eq!(page_count(&config.output), 2);
}

#[test]
fn zero_sized_messages_are_tolerated() {
    let (_dir, config) = setup("0,0.1,0,0.3,0\n1,0.1,0,0.24,10\n2,0.1,0,0.25,20\n");
    run(&config).unwrap();
    assert_eq!(page_count(&config.output), 2);
}

#[test]
fn extreme_magnitudes_render() {
    let (_dir, config) = setup("1,0.1,0,1e-320,10\n2,0.1,0,1e300,20\n");
    run(&config).unwrap();
    assert_eq!(page_count(&config.output), 2);
}

#[test]
fn alternative_window_policy() {
    let (_dir, mut config) = setup(&shared_memory_csv());
    config.latency_window = LatencyWindow { skip: 1, len: 6 };
    config.threshold = ThresholdOptions { jump_factor: 3.0, ..ThresholdOptions::default() };
    run(&config).unwrap();
    assert_eq!(page_count(&config.output), 2);
}

#[test]
fn malformed_row_writes_nothing() {
    let (_dir, config) = setup("1,0.1,0,0.24,10\n4,0.1,0,oops,15\n");
    match run(&config) {
        Err(Error::Format { line, column, .. }) => {
            assert_eq!(line, 3);
            assert_eq!(column, "rtt");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!config.output.exists());
}

#[test]
fn missing_input_writes_nothing() {
    let (dir, mut config) = setup("");
    config.input = dir.path().join("absent.csv");
    assert!(matches!(run(&config), Err(Error::FileNotFound(_))));
    assert!(!config.output.exists());
}

#[test]
fn empty_input_writes_nothing() {
    let (_dir, config) = setup("# no data\n\n");
    assert!(matches!(run(&config), Err(Error::EmptyDataset)));
    assert!(!config.output.exists());
}

#[test]
fn render_in_memory_is_a_pdf() {
    let csv = format!("{}{}", HEADER, shared_memory_csv());
    let data = Dataset::from_reader(csv.as_bytes()).unwrap();
    let config = ReportConfig::default();
    let est = pingpong_report::estimate(&data, config.latency_window, config.threshold);
    let bytes = render::render(&data, &est, &config).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
}
