use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use transnet_io::{load_circuits, save_dataset, DatasetBuilder, LineInput, StationInput};

/// Two 220 kV substations joined by one line, with a matching relation.
fn write_two_station_extract(path: &Path) {
    let mut builder = DatasetBuilder::new();
    builder.add_station(StationInput::substation(1, 50.0, 8.0).voltage("220000").name("Nord"));
    builder.add_station(StationInput::substation(2, 50.0, 8.1).voltage("220000").name("Süd"));
    builder.add_node(10, 50.0, 8.0).add_node(20, 50.0, 8.1);
    builder
        .add_line(LineInput::new(100, &[10, 20]).voltage("220000").reference("7"))
        .add_relation(900, &[1, 100, 2], Some("220000"));
    save_dataset(&builder.build(), path).unwrap();
}

#[test]
fn transnet_infer_prints_and_writes_circuits() {
    let dir = tempdir().unwrap();
    let extract = dir.path().join("extract.json");
    let out = dir.path().join("circuits.json");
    let dot = dir.path().join("circuits.dot");
    write_two_station_extract(&extract);

    let mut cmd = Command::cargo_bin("transnet").unwrap();
    cmd.args([
        "infer",
        extract.to_str().unwrap(),
        "--station",
        "1",
        "--overpass",
        "--out",
        out.to_str().unwrap(),
        "--dot",
        dot.to_str().unwrap(),
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Circuit 1: voltage=220000 name=- ref=7"))
    .stdout(predicate::str::contains("1 of 1 covered."))
    .stdout(predicate::str::contains(
        "overpass: (way(1);way(100);way(2););out body;>;out skel qt;",
    ));

    let circuits = load_circuits(&out).unwrap();
    assert_eq!(circuits.len(), 1);
    assert_eq!(circuits[0].accuracy, 1.0);
    let graph = fs::read_to_string(&dot).unwrap();
    assert!(graph.contains("s1 -- s2"));
    assert!(graph.contains("label=\"Nord\""));
}

#[test]
fn transnet_infer_all_stations() {
    let dir = tempdir().unwrap();
    let extract = dir.path().join("extract.json");
    write_two_station_extract(&extract);

    let mut cmd = Command::cargo_bin("transnet").unwrap();
    cmd.args(["infer", extract.to_str().unwrap(), "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1 circuit(s)"))
        .stdout(predicate::str::contains("Station#2: could not obtain any circuit"));
}

#[test]
fn transnet_infer_respects_config_file() {
    let dir = tempdir().unwrap();
    let extract = dir.path().join("extract.json");
    let config = dir.path().join("transnet.toml");
    write_two_station_extract(&extract);
    fs::write(&config, "voltage_classes = [\"380000\"]\n").unwrap();

    let mut cmd = Command::cargo_bin("transnet").unwrap();
    cmd.args([
        "infer",
        extract.to_str().unwrap(),
        "--station",
        "1",
        "--config",
        config.to_str().unwrap(),
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Total: 0 circuit(s)"));
}

#[test]
fn transnet_infer_requires_seed() {
    let dir = tempdir().unwrap();
    let extract = dir.path().join("extract.json");
    write_two_station_extract(&extract);

    let mut cmd = Command::cargo_bin("transnet").unwrap();
    cmd.args(["infer", extract.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn transnet_infer_missing_dataset_fails() {
    let mut cmd = Command::cargo_bin("transnet").unwrap();
    cmd.args(["infer", "/nonexistent/extract.json", "--all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Command failed"));
}

#[test]
fn transnet_inspect_counts_entities() {
    let dir = tempdir().unwrap();
    let extract = dir.path().join("extract.json");
    write_two_station_extract(&extract);

    let mut cmd = Command::cargo_bin("transnet").unwrap();
    cmd.args(["inspect", extract.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("stations"))
        .stdout(predicate::str::contains("ground-truth relations"));

    let mut cmd = Command::cargo_bin("transnet").unwrap();
    cmd.args(["inspect", extract.to_str().unwrap(), "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"stations\": 2"))
        .stdout(predicate::str::contains("\"lines\": 1"));
}
