use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_oolong"))
}

fn repo_root() -> PathBuf {
    // crates/oolong-cli -> repo root
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").canonicalize().unwrap()
}

fn fixture_path(name: &str) -> PathBuf {
    repo_root().join("tests/fixtures").join(name)
}

fn tmp_path(filename: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("oolong_cli_{}_{}_{}", std::process::id(), nanos, filename));
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn region_integral(acc: &serde_json::Value, hist: &str, dataset: &str, region: &str) -> f64 {
    acc["hists"][hist]["bins"][dataset][region]["sumw"]
        .as_array()
        .unwrap_or_else(|| panic!("missing sumw for {hist}/{dataset}/{region}"))
        .iter()
        .map(|v| v.as_f64().unwrap())
        .sum()
}

#[test]
fn run_custom_nano_writes_expected_archive() {
    let out_path = tmp_path("custom_nano.json");
    let output = run(&[
        "run",
        "--processor",
        "custom-nano",
        "--config",
        fixture_path("hlt.yaml").to_str().unwrap(),
        "--output",
        out_path.to_str().unwrap(),
        fixture_path("batch_custom_nano.json").to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let text = std::fs::read_to_string(&out_path).unwrap();
    let acc: serde_json::Value = serde_json::from_str(&text).unwrap();

    // event 1 passes lumi + trigger, event 2 lumi only, event 3 fails lumi
    let num = region_integral(&acc, "ak4_pt0", "JetMET_Run2022C", "HLT_PFJet140_num");
    let den = region_integral(&acc, "ak4_pt0", "JetMET_Run2022C", "HLT_PFJet140_den");
    assert_eq!(num, 1.0);
    assert_eq!(den, 2.0);

    std::fs::remove_file(&out_path).ok();
}

#[test]
fn merge_doubles_an_archive() {
    let archive = tmp_path("partial.json");
    let merged = tmp_path("merged.json");

    let output = run(&[
        "run",
        "--processor",
        "custom-nano",
        "--config",
        fixture_path("hlt.yaml").to_str().unwrap(),
        "--output",
        archive.to_str().unwrap(),
        fixture_path("batch_custom_nano.json").to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let output = run(&[
        "merge",
        "--output",
        merged.to_str().unwrap(),
        archive.to_str().unwrap(),
        archive.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let acc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&merged).unwrap()).unwrap();
    let den = region_integral(&acc, "ak4_pt0", "JetMET_Run2022C", "HLT_PFJet140_den");
    assert_eq!(den, 4.0);

    std::fs::remove_file(&archive).ok();
    std::fs::remove_file(&merged).ok();
}

#[test]
fn run_accepts_empty_batch_from_yearless_dataset() {
    // Nothing to select in an empty batch, so the year (which this
    // processor otherwise insists on) is never resolved.
    let out_path = tmp_path("empty.json");
    let output = run(&[
        "run",
        "--processor",
        "custom-nano",
        "--config",
        fixture_path("hlt.yaml").to_str().unwrap(),
        "--output",
        out_path.to_str().unwrap(),
        fixture_path("batch_empty.json").to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let acc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    // identity archive: schema present, no filled categories
    assert!(acc["hists"]["ak4_pt0"]["bins"].as_object().unwrap().is_empty());

    std::fs::remove_file(&out_path).ok();
}

#[test]
fn run_rejects_missing_batch_file() {
    let output = run(&[
        "run",
        "--processor",
        "custom-nano",
        "--config",
        fixture_path("hlt.yaml").to_str().unwrap(),
        "/nonexistent/batch.json",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("batch"), "stderr: {stderr}");
}
