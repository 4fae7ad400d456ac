use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn ssdtkit() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ssdtkit"));
    cmd.env_remove("SSDTKIT_OUT_DIR")
        .env_remove("SSDTKIT_OSI")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    ssdtkit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("disable"))
        .stdout(predicate::str::contains("spoof"))
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("simulate"));
}

#[test]
fn disable_writes_one_file_per_path() {
    let tmp = tempdir().unwrap();
    ssdtkit()
        .args(["disable", "--method", "off", "--out-dir"])
        .arg(tmp.path())
        .args(["\\_SB.PCI0.PEG0.PEGP", "ACPI(_SB_)#ACPI(PCI0)#ACPI(RP05)#ACPI(PXSX)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SSDT-DISABLE-OFF-1.dsl"))
        .stdout(predicate::str::contains("SSDT-DISABLE-OFF-2.dsl"));

    let first = fs::read_to_string(tmp.path().join("SSDT-DISABLE-OFF-1.dsl")).unwrap();
    assert!(first.contains("\\_SB_.PCI0.PEG0.PEGP._PS3 ()"));
    assert!(first.contains("Device (DGP1)"));
    let second = fs::read_to_string(tmp.path().join("SSDT-DISABLE-OFF-2.dsl")).unwrap();
    assert!(second.contains("\\_SB_.PCI0.RP05.PXSX._PS3 ()"));
    assert!(second.contains("Device (DGP2)"));
}

#[test]
fn out_dir_falls_back_to_the_environment() {
    let tmp = tempdir().unwrap();
    ssdtkit()
        .env("SSDTKIT_OUT_DIR", tmp.path())
        .args(["disable", "--method", "s3", "\\_SB.PCI0.GFX0"])
        .assert()
        .success();
    assert!(tmp.path().join("SSDT-DISABLE-S3-1.dsl").exists());
}

#[test]
fn unknown_disable_method_is_rejected() {
    ssdtkit()
        .args(["disable", "--method", "acpi", "\\_SB.PCI0.GFX0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown disable method"));
}

#[test]
fn relative_paths_are_rejected() {
    let tmp = tempdir().unwrap();
    ssdtkit()
        .args(["disable", "--method", "s3", "--out-dir"])
        .arg(tmp.path())
        .arg("PCI0.GFX0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be absolute"));
}

#[test]
fn spoof_writes_little_endian_id() {
    let tmp = tempdir().unwrap();
    ssdtkit()
        .args(["spoof", "--device-id", "67DF", "--model", "AMD Radeon RX 580", "--out-dir"])
        .arg(tmp.path())
        .arg("\\_SB.PCI0.PEG0.PEGP")
        .assert()
        .success();

    let source = fs::read_to_string(tmp.path().join("SSDT-SPOOF-GPU.dsl")).unwrap();
    assert!(source.contains("0xDF, 0x67, 0x00, 0x00"));
    assert!(source.contains("\"AMD Radeon RX 580\""));
}

#[test]
fn spoof_rejects_bad_ids_and_missing_models() {
    ssdtkit()
        .args(["spoof", "--device-id", "67D", "--model", "X", "\\_SB.PCI0.GFX0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("four hex digits"));

    let tmp = tempdir().unwrap();
    ssdtkit()
        .args(["spoof", "--device-id", "67DF", "--out-dir"])
        .arg(tmp.path())
        .arg("\\_SB.PCI0.GFX0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("model"));
}

#[test]
fn rx6x50_spoof_needs_pegp() {
    let tmp = tempdir().unwrap();
    ssdtkit()
        .args(["spoof", "--device-id", "73FF", "--rx6x50", "--out-dir"])
        .arg(tmp.path())
        .arg("\\_SB.PCI0.PEG0.PEGP.GFX0")
        .assert()
        .success();
    assert!(tmp.path().join("SSDT-SPOOF-RX6x50.dsl").exists());

    ssdtkit()
        .args(["spoof", "--device-id", "73FF", "--rx6x50", "--out-dir"])
        .arg(tmp.path())
        .arg("\\_SB.PCI0.RP05.PXSX")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no PEGP segment"));
}

#[test]
fn convert_prints_the_counterpart() {
    ssdtkit()
        .args(["convert", "PCIROOT(0)#PCI(0100)#PCI(0000)"])
        .assert()
        .success()
        .stdout("PciRoot(0x0)/Pci(0x1,0x0)/Pci(0x0,0x0)\n");

    ssdtkit()
        .args(["convert", "ACPI(_SB_)#ACPI(PCI0)#ACPI(PEGP)"])
        .assert()
        .success()
        .stdout("\\_SB_.PCI0.PEGP\n");

    ssdtkit()
        .args(["convert", "USB(1)"])
        .assert()
        .failure();
}

#[test]
fn simulate_prints_the_call_trace() {
    let tmp = tempdir().unwrap();
    let manifest = tmp.path().join("host.json");
    fs::write(
        &manifest,
        r#"{ "devices": [{ "path": "\\_SB.PCI0.PEG0.PEGP", "methods": ["_PS0", "_PS3", "_DSM"] }] }"#,
    )
    .unwrap();

    let output = ssdtkit()
        .args(["simulate", "--teardown", "--manifest"])
        .arg(&manifest)
        .arg("\\_SB.PCI0.PEG0.PEGP")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let trace: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(trace["teardown"], "negotiated");
    assert_eq!(trace["state"], "off");
    assert_eq!(trace["status"], 15);
    let off: Vec<&str> = trace["hooks"][2]["calls"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["method"].as_str().unwrap())
        .collect();
    assert_eq!(off, ["\\_SB_.PCI0.PEG0.PEGP._DSM", "\\_SB_.PCI0.PEG0.PEGP._PS3"]);
}

#[test]
fn simulate_honours_the_configured_identity() {
    let tmp = tempdir().unwrap();
    let manifest = tmp.path().join("host.json");
    fs::write(&manifest, r#"{ "devices": [{ "path": "\\_SB.PCI0.GFX0", "methods": ["_PS3"] }] }"#)
        .unwrap();

    ssdtkit()
        .env("SSDTKIT_OSI", "Windows 2015")
        .args(["simulate", "--manifest"])
        .arg(&manifest)
        .arg("\\_SB.PCI0.GFX0")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": 0"));
}
