use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("vendor-orders"));
    cmd.arg("tests/fixtures/orders.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "tenant,order,status,version,items,total",
        ))
        .stdout(predicate::str::contains("bakery,b1,COMPLETED,4,2,6.8"))
        .stdout(predicate::str::contains("deli,d1,CANCELLED,2,1,7.25"))
        .stderr(predicate::str::contains("Invalid transition: NEW→READY"));

    Ok(())
}

#[test]
fn test_cli_json_output() {
    let file = common::commands_file(&[
        "item, t1, o1, tea, 3, 2.00",
        "submit, t1, o1",
        "status, t1, o1, , , , in_progress",
    ]);

    let output = Command::new(cargo_bin!("vendor-orders"))
        .arg(file.path())
        .arg("--format")
        .arg("json")
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let orders: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["status"], "IN_PROGRESS");
    assert_eq!(orders[0]["version"], 2);
    let total: f64 = orders[0]["total"].as_str().unwrap().parse().unwrap();
    assert_eq!(total, 6.0);
}

#[test]
fn test_stale_version_is_rejected() {
    let file = common::commands_file(&[
        "item, t1, o1, tea, 1, 2.00",
        "submit, t1, o1",
        "status, t1, o1, , , , in_progress, 1",
        "status, t1, o1, , , , cancelled, 1",
    ]);

    let mut cmd = Command::new(cargo_bin!("vendor-orders"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Version conflict"))
        .stdout(predicate::str::contains("t1,o1,IN_PROGRESS,2,1,2"));
}

#[test]
fn test_cross_tenant_command_is_rejected() {
    let file = common::commands_file(&[
        "item, t1, o1, tea, 1, 2.00",
        "submit, t1, o1",
        "status, t2, o1, , , , cancelled",
    ]);

    let mut cmd = Command::new(cargo_bin!("vendor-orders"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("not found for tenant t2"))
        .stdout(predicate::str::contains("t1,o1,NEW,1,1,2"));
}

#[test]
fn test_missing_input_fails() {
    let mut cmd = Command::new(cargo_bin!("vendor-orders"));
    cmd.arg("tests/fixtures/does_not_exist.csv");

    cmd.assert().failure();
}
