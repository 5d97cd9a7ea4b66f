use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const LEDGER: &str = "納品書
令和6年10月分
山田商店
0001 苺タルト EA
0.10
0.10 19,500.00
1,950.00
0002 国産大豆使用
無調整豆乳
CS 12.00 300.00 3,600.00
以下余白
5,550.00
\\5,994-
444
";

fn nohin() -> Command {
    Command::cargo_bin("nohin").unwrap()
}

fn write_ledger(dir: &TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, LEDGER).unwrap();
    path
}

#[test]
fn parse_outputs_json() {
    let dir = TempDir::new().unwrap();
    let input = write_ledger(&dir, "ledger.txt");

    nohin()
        .arg("parse")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""code": "0001""#))
        .stdout(predicate::str::contains(r#""unitPrice": "19,500.00""#))
        .stdout(predicate::str::contains(r#""computedBaseText": "5,550.00""#))
        .stdout(predicate::str::contains(r#""matchMark": "○""#));
}

#[test]
fn parse_reads_stdin() {
    nohin()
        .args(["parse", "-", "--format", "csv"])
        .write_stdin(LEDGER)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "vendor,code,name,spec,unit,quantity,unit_price,amount,note",
        ))
        .stdout(predicate::str::contains(
            "山田商店,0002,国産大豆使用無調整豆乳,,CS,12.00,300.00,\"3,600.00\",",
        ));
}

#[test]
fn parse_resolves_vendor_directory() {
    let dir = TempDir::new().unwrap();
    let input = write_ledger(&dir, "ledger.txt");
    let directory = dir.path().join("vendors.tsv");
    fs::write(&directory, "山田\t本社 御中\t\t\t山田商店 大阪支店\n").unwrap();

    nohin()
        .arg("parse")
        .arg(&input)
        .args(["--format", "text", "--delimiter", "tab", "--directory"])
        .arg(&directory)
        .assert()
        .success()
        .stdout(predicate::str::contains("Period: 2024-10"))
        .stdout(predicate::str::contains("山田商店 大阪支店"));
}

#[test]
fn parse_missing_file_fails() {
    nohin()
        .args(["parse", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn parse_show_warnings() {
    let text = LEDGER.replace("5,550.00\n", "5,000.00\n");
    nohin()
        .args(["parse", "-", "--show-warnings"])
        .write_stdin(text)
        .assert()
        .success()
        .stderr(predicate::str::contains("differs from line item sum"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    write_ledger(&dir, "a.txt");
    write_ledger(&dir, "b.txt");
    let out = dir.path().join("out");
    let pattern = dir.path().join("*.txt");

    nohin()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(&out)
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful"));

    assert!(out.join("a.json").exists());
    assert!(out.join("b.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,rows"));
    assert!(summary.contains("a.txt,success,2,\"5,550.00\",\"5,550.00\",○,0,"));
}

#[test]
fn batch_without_matches_fails() {
    let dir = TempDir::new().unwrap();
    let pattern = dir.path().join("*.txt");

    nohin()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    nohin()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    nohin()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.two_token_policy", "computed-amount"])
        .assert()
        .success();

    nohin()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "extraction.two_token_policy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("computed-amount"));

    nohin()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "extraction.missing"])
        .assert()
        .failure();
}

#[test]
fn config_policy_applies_to_parse() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        r#"{"extraction": {"two_token_policy": "computed-amount"}}"#,
    )
    .unwrap();

    nohin()
        .arg("--config")
        .arg(&config)
        .args(["parse", "-", "--format", "csv"])
        .write_stdin("0001 苺タルト EA\n3 250.00\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(",EA,3,250.00,750.00,"));
}
