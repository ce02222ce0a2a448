use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fmt::Write as _;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// `rows` x `cols` table of small numbers.
fn write_table(dir: &TempDir, rows: usize, cols: usize) -> std::path::PathBuf {
    let mut s = String::from("id");
    for c in 0..cols {
        write!(s, ",c{}", c).unwrap();
    }
    s.push('\n');
    for r in 0..rows {
        write!(s, "r{}", r).unwrap();
        for c in 0..cols {
            write!(s, ",{}", (r * cols + c) % 7).unwrap();
        }
        s.push('\n');
    }
    let path = dir.path().join("data.csv");
    fs::write(&path, s).unwrap();
    path
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("rubix").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("rubix"))
        .stdout(predicate::str::contains("size"))
        .stdout(predicate::str::contains("render"));
}

#[test]
fn size_without_data_prints_fallback() {
    let mut cmd = Command::cargo_bin("rubix").unwrap();
    cmd.arg("size");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("data      (none)"))
        .stdout(predicate::str::contains("default   1000 x 500"));
}

#[test]
fn size_uses_data_shape() {
    let tmp = TempDir::new().unwrap();
    let data = write_table(&tmp, 100, 5);
    let mut cmd = Command::cargo_bin("rubix").unwrap();
    cmd.args(["size", "--data"]).arg(&data);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("100 rows x 5 columns"))
        .stdout(predicate::str::contains("default   720 x 600"));
}

#[test]
fn size_json_resolves_proportional_height() {
    let tmp = TempDir::new().unwrap();
    let data = write_table(&tmp, 20, 40);
    let out = Command::cargo_bin("rubix")
        .unwrap()
        .args(["size", "--json", "--width", "800", "--height", "proportional", "--data"])
        .arg(&data)
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["dimensions"]["width"], 800);
    assert_eq!(v["dimensions"]["height"], 400);
    assert_eq!(v["requested"]["height"], "proportional");
}

#[test]
fn size_rejects_proportional_without_data() {
    let mut cmd = Command::cargo_bin("rubix").unwrap();
    cmd.args(["size", "--width", "proportional"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("upload your data first"));
}

#[test]
fn size_reads_form_from_config_file() {
    let tmp = TempDir::new().unwrap();
    let cfg = tmp.path().join("form.json");
    fs::write(&cfg, r#"{"width": "640", "height": "480", "show_colorbar": false}"#).unwrap();
    let mut cmd = Command::cargo_bin("rubix").unwrap();
    cmd.args(["size", "--config"]).arg(&cfg);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("heatmap   640 x 480"));
}

#[test]
fn render_writes_page() {
    let tmp = TempDir::new().unwrap();
    let data = write_table(&tmp, 12, 6);
    let out_dir = tmp.path().join("out");
    let mut cmd = Command::cargo_bin("rubix").unwrap();
    cmd.args(["render", "--data"])
        .arg(&data)
        .arg("--out-dir")
        .arg(&out_dir);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("PLOT READY !"));
    assert!(out_dir.join("page.html").exists());
    assert!(out_dir.join("heatmap.html").exists());
    assert!(out_dir.join("render_config.json").exists());
}

#[test]
fn render_without_data_fails() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("rubix").unwrap();
    cmd.args(["render", "--out-dir"]).arg(tmp.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Please upload your main data file"));
}

#[test]
fn preview_shows_top_left_corner() {
    let tmp = TempDir::new().unwrap();
    let data = write_table(&tmp, 12, 6);
    let mut cmd = Command::cargo_bin("rubix").unwrap();
    cmd.args(["preview", "--rows", "2", "--cols", "3", "--data"]).arg(&data);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("main data (12 rows x 6 columns)"))
        .stdout(predicate::str::contains("\tc0\tc1\tc2\n"))
        .stdout(predicate::str::contains("r1\t6\t0\t1\n"))
        .stdout(predicate::str::contains("r2").not())
        .stdout(predicate::str::contains("..."));
}

#[test]
fn preview_without_uploads_fails() {
    let mut cmd = Command::cargo_bin("rubix").unwrap();
    cmd.arg("preview");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Please upload your main data file"));
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn docs_online_readme() {
    let mut cmd = Command::cargo_bin("rubix").unwrap();
    cmd.arg("docs");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("adrubix"));
}
