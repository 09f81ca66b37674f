//! Utilities for running external tools with proper error handling

use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, error};

/// Resolve a program on PATH, failing with a readable message
pub fn ensure_program(program: &str) -> Result<PathBuf> {
    which::which(program).with_context(|| format!("'{}' was not found in PATH", program))
}

/// Run a command to completion and fail on a non-zero exit status
pub async fn run_command(program: &str, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
    debug!("Running command: {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .envs(envs.iter().copied())
        .stdin(Stdio::null())
        .output()
        .await
        .with_context(|| format!("Failed to execute {}", program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("Command failed: {} (exit code {:?})", program, output.status.code());
        anyhow::bail!(
            "{} failed with exit code {:?}: {}",
            program,
            output.status.code(),
            stderr.trim()
        );
    }

    Ok(output)
}

/// Run a command with its stdout streamed straight into `output_path`
///
/// The file is truncated first. On failure the partial file is removed.
pub async fn run_command_to_file(
    program: &str,
    args: &[&str],
    envs: &[(&str, &str)],
    output_path: &Path,
) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {:?}", output_path))?;

    debug!(
        "Running command: {} {} > {:?}",
        program,
        args.join(" "),
        output_path
    );

    let result = async {
        let child = Command::new(program)
            .args(args)
            .envs(envs.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::from(file))
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to execute {}", program))?;

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("Failed to wait for {}", program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "{} failed with exit code {:?}: {}",
                program,
                output.status.code(),
                stderr.trim()
            );
        }

        Ok::<(), anyhow::Error>(())
    }
    .await;

    if result.is_err() {
        if let Err(e) = std::fs::remove_file(output_path) {
            debug!("Failed to remove partial output {:?}: {}", output_path, e);
        }
    }

    result
}
