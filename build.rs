//! Exports git and toolchain facts as `PERSONA_*` env vars, consumed by
//! `src/version.rs`.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    emit(
        "PERSONA_GIT_HASH",
        &git(&["rev-parse", "--short=8", "HEAD"]).unwrap_or_else(|| "unknown".into()),
    );
    emit(
        "PERSONA_GIT_BRANCH",
        &git(&["rev-parse", "--abbrev-ref", "HEAD"]).unwrap_or_else(|| "unknown".into()),
    );
    let dirty = match git(&["status", "--porcelain"]) {
        Some(status) if status.is_empty() => "false",
        Some(_) => "true",
        None => "unknown",
    };
    emit("PERSONA_GIT_DIRTY", dirty);

    emit(
        "PERSONA_BUILD_TIMESTAMP",
        &chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );
    emit(
        "PERSONA_TARGET",
        &env::var("TARGET").unwrap_or_else(|_| "unknown".into()),
    );
    emit(
        "PERSONA_PROFILE",
        &env::var("PROFILE").unwrap_or_else(|_| "unknown".into()),
    );
    emit(
        "PERSONA_RUSTC_VERSION",
        &run("rustc", &["--version"]).unwrap_or_else(|| "unknown".into()),
    );
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

fn git(args: &[&str]) -> Option<String> {
    run("git", args)
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    Some(stdout.trim().to_string())
}
