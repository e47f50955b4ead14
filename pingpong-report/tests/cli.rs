use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const DEFAULT_OUTPUT: &str = "Network_PingPong_Report.pdf";

const RESULTS: &str = "\
message_size,avg_send_us,avg_recv_us,rtt_us,bandwidth_mb_s
1,0.1,0,0.24,10
4,0.1,0,0.20,15
64,0.2,0,0.30,120
1024,0.5,0,1.0,900
131072,5.0,0,10.0,27000
";

/// Run the binary inside `dir` so the default relative paths resolve there.
fn generate_report(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_generate_report"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("run generate_report")
}

fn page_count(path: &Path) -> usize {
    lopdf::Document::load(path).unwrap().get_pages().len()
}

fn workdir() -> TempDir {
    tempfile::tempdir().unwrap()
}

#[test]
fn defaults_read_results_csv() {
    let dir = workdir();
    fs::write(dir.path().join("results.csv"), RESULTS).unwrap();

    let output = generate_report(dir.path(), &[]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        format!("Report generated: {}\n", DEFAULT_OUTPUT),
    );
    assert!(output.stderr.is_empty());
    assert_eq!(page_count(&dir.path().join(DEFAULT_OUTPUT)), 2);
}

#[test]
fn missing_input_exits_with_status_one() {
    let dir = workdir();

    let output = generate_report(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: "), "stderr: {}", stderr);
    assert!(stderr.contains("results.csv"));
    assert!(!dir.path().join(DEFAULT_OUTPUT).exists());
}

#[test]
fn malformed_input_exits_with_status_one() {
    let dir = workdir();
    fs::write(dir.path().join("results.csv"), format!("{}8,0.3,0,fast,4\n", RESULTS)).unwrap();

    let output = generate_report(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: line 7"), "stderr: {}", stderr);
    assert!(!dir.path().join(DEFAULT_OUTPUT).exists());
}

#[test]
fn config_overrides_paths() {
    let dir = workdir();
    fs::write(dir.path().join("run-42.csv"), RESULTS).unwrap();
    fs::write(
        dir.path().join("report.yaml"),
        "input: run-42.csv\noutput: run-42.pdf\nlatency_window: { skip: 1, len: 6 }\n",
    )
    .unwrap();

    let output = generate_report(dir.path(), &["--config", "report.yaml"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Report generated: run-42.pdf\n");
    assert_eq!(page_count(&dir.path().join("run-42.pdf")), 2);
    assert!(!dir.path().join(DEFAULT_OUTPUT).exists());
}

#[test]
fn bad_config_exits_with_status_one() {
    let dir = workdir();
    fs::write(dir.path().join("results.csv"), RESULTS).unwrap();
    fs::write(dir.path().join("report.yaml"), "inptu: results.csv\n").unwrap();

    let output = generate_report(dir.path(), &["-c", "report.yaml"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: failed to load config report.yaml"), "stderr: {}", stderr);
    assert!(!dir.path().join(DEFAULT_OUTPUT).exists());
}
