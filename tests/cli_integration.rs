//! CLI integration tests for berth.
//!
//! These tests run the real binary against scripted compilers placed in a
//! temporary PATH, so no toolchain needs to be installed on the test host.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Variables that would leak the test host's toolchain into a run.
const TOOL_VARS: &[&str] = &[
    "CC", "CXX", "FC", "AR", "RANLIB", "MT", "WINRC", "LLVM_PATH", "CPPFLAGS", "CFLAGS",
    "CXXFLAGS", "FCFLAGS", "LDFLAGS", "INCLUDE", "LIB",
];

/// Get the berth binary command, isolated from the host toolchain.
fn berth(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("berth").unwrap();
    for var in TOOL_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home);
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

// ============================================================================
// berth candidates
// ============================================================================

#[test]
fn test_candidates_for_linux() {
    let tmp = temp_dir();

    berth(tmp.path())
        .args(["candidates", "--lang", "c", "--platform", "linux"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gcc clang icc"));
}

#[test]
fn test_candidates_fall_back_to_default() {
    let tmp = temp_dir();

    berth(tmp.path())
        .args(["candidates", "--lang", "fortran", "--platform", "haiku"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gfortran"));
}

#[test]
fn test_candidates_json() {
    let tmp = temp_dir();

    berth(tmp.path())
        .args(["--message-format", "json", "candidates", "--lang", "c++", "--platform", "darwin"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""candidates":["clang++","g++"]"#));
}

#[test]
fn test_unknown_language_is_rejected() {
    let tmp = temp_dir();

    berth(tmp.path())
        .args(["candidates", "--lang", "cobol"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid language"));
}

// ============================================================================
// berth configure
// ============================================================================

#[test]
fn test_configure_without_usable_compiler_fails() {
    let tmp = temp_dir();
    let empty_path = tmp.path().join("bin");
    fs::create_dir(&empty_path).unwrap();

    berth(tmp.path())
        .args(["configure", "--check-compiler", "ghost", "--no-save"])
        .env("PATH", &empty_path)
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no usable C compiler"));

    assert!(!tmp.path().join(".berth/env.json").exists());
}

#[cfg(unix)]
#[test]
fn test_configure_custom_toolchain_end_to_end() {
    let tmp = temp_dir();
    let bin = tmp.path().join("bin");
    fs::create_dir(&bin).unwrap();
    write_script(&bin, "realcc", "echo 'realcc 9.0'");
    write_script(&bin, "ar", "exit 0");

    fs::create_dir(tmp.path().join(".berth")).unwrap();
    fs::write(
        tmp.path().join(".berth/config.toml"),
        r#"
[candidates]
c = ["ghost", "realcc"]

[toolchains.realcc]
program = "realcc"
"#,
    )
    .unwrap();

    berth(tmp.path())
        .args(["configure", "--lang", "c"])
        .env("PATH", &bin)
        .env("CFLAGS", "-O2")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(
            predicate::str::is_match(
                r"(?s)Checking for 'ghost' \(C compiler\): not found\n.*Checking for 'realcc' \(C compiler\): /",
            )
            .unwrap(),
        );

    let cache = fs::read_to_string(tmp.path().join(".berth/env.json")).unwrap();
    let env: serde_json::Value = serde_json::from_str(&cache).unwrap();
    assert_eq!(env["TOOLCHAIN_NAME"], "realcc");
    assert_eq!(env["TOOLCHAIN_IDENTITY"], "realcc-9.0");
    assert_eq!(env["COMPILER_CC"], "realcc");
    assert_eq!(env["CC"], bin.join("realcc").display().to_string());
    assert_eq!(env["AR"], bin.join("ar").display().to_string());
    assert_eq!(env["CFLAGS"], serde_json::json!(["-O2"]));

    berth(tmp.path())
        .args(["env", "TOOLCHAIN_IDENTITY"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("TOOLCHAIN_IDENTITY = realcc-9.0"));
}

#[cfg(unix)]
#[test]
fn test_reconfigure_switches_compiler() {
    let tmp = temp_dir();
    let bin = tmp.path().join("bin");
    fs::create_dir(&bin).unwrap();
    write_script(&bin, "gcc", "echo 'gcc (GCC) 13.2.0'");
    write_script(&bin, "clang", "echo 'clang version 17.0.6'");
    write_script(&bin, "ar", "exit 0");

    for compiler in ["gcc", "clang"] {
        berth(tmp.path())
            .args(["configure", "--check-compiler", compiler, "--platform", "linux"])
            .env("PATH", &bin)
            .current_dir(tmp.path())
            .assert()
            .success();
    }

    let cache = fs::read_to_string(tmp.path().join(".berth/env.json")).unwrap();
    let env: serde_json::Value = serde_json::from_str(&cache).unwrap();
    assert_eq!(env["COMPILER_CC"], "clang");
    assert_eq!(env["CC"], bin.join("clang").display().to_string());
    assert_eq!(env["TOOLCHAIN_IDENTITY"], "clang-17.0.6");
}

#[cfg(unix)]
#[test]
fn test_configure_reports_json_events() {
    let tmp = temp_dir();
    let bin = tmp.path().join("bin");
    fs::create_dir(&bin).unwrap();
    write_script(&bin, "gcc", "echo 'gcc (GCC) 13.2.0'");
    write_script(&bin, "ar", "exit 0");

    berth(tmp.path())
        .args([
            "--message-format",
            "json",
            "configure",
            "--check-compiler",
            "gcc",
            "--platform",
            "linux",
            "--no-save",
        ])
        .env("PATH", &bin)
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""reason":"probe""#))
        .stdout(predicate::str::contains(r#""reason":"configured""#))
        .stdout(predicate::str::contains("gcc-13.2.0"));
}

// ============================================================================
// berth env
// ============================================================================

#[test]
fn test_env_without_configure_fails() {
    let tmp = temp_dir();

    berth(tmp.path())
        .arg("env")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("berth configure"));
}

// ============================================================================
// berth completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    berth(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("berth"));
}
