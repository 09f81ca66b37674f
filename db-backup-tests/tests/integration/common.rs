//! Common utilities for integration tests
//!
//! This module provides cleanup guards and helper functions for integration tests.

use anyhow::{bail, Context, Result};
use std::process::Command;
use std::thread;
use std::time::Duration;

/// Check if Docker is available
pub fn is_docker_available() -> bool {
    Command::new("docker")
        .args(["ps"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Check if a client tool is on PATH
pub fn has_program(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Guard that ensures Docker container cleanup on drop (even on panic)
pub struct ContainerGuard {
    name: String,
}

impl ContainerGuard {
    /// Start a detached container with its ports published on random host ports
    pub fn start(name: &str, image: &str, env: &[&str]) -> Result<Self> {
        // leftovers from an aborted run
        cleanup_container(name);

        let mut args = vec!["run", "-d", "-P", "--name", name];
        for var in env {
            args.push("-e");
            args.push(*var);
        }
        args.push(image);

        let output = Command::new("docker").args(&args).output()?;
        if !output.status.success() {
            bail!(
                "docker run {} failed: {}",
                image,
                String::from_utf8_lossy(&output.stderr)
            );
        }

        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Host port mapped to `container_port`
    pub fn host_port(&self, container_port: u16) -> Result<u16> {
        let output = Command::new("docker")
            .args(["port", &self.name, &format!("{}/tcp", container_port)])
            .output()?;
        let mapping = String::from_utf8_lossy(&output.stdout);

        mapping
            .lines()
            .next()
            .and_then(|line| line.rsplit(':').next())
            .context("No port mapping")?
            .trim()
            .parse()
            .context("Invalid port mapping")
    }

    /// Run a command inside the container
    pub fn exec(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("docker")
            .arg("exec")
            .arg(&self.name)
            .args(args)
            .output()?;
        if !output.status.success() {
            bail!(
                "docker exec {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Poll `probe` inside the container until it succeeds
    pub fn wait_until_ready(&self, probe: &[&str]) -> Result<()> {
        for _ in 0..60 {
            if self.exec(probe).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_secs(1));
        }
        bail!("Container {} failed to become ready", self.name)
    }
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        cleanup_container(&self.name);
    }
}

/// Stop and remove a Docker container
/// The -v flag also removes anonymous volumes associated with the container
fn cleanup_container(name: &str) {
    let _ = Command::new("docker").args(["stop", name]).output();
    let _ = Command::new("docker").args(["rm", "-v", name]).output();
}
