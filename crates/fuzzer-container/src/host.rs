use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::ContainerError;

/// A running exec inside a daemon container (spec §4.A `exec`). The
/// `completion_channel` of the spec becomes, in Rust, an owned
/// `tokio::process::Child` whose `wait()` future is the async
/// notification the scheduler multiplexes over — the actual trace bytes
/// are never read from this handle, only written by the executed
/// command to the mounted log volume.
#[derive(Debug)]
pub struct ExecHandle {
    pub cmd_string: String,
    child: Child,
}

impl ExecHandle {
    /// Wraps an already-spawned child as an `ExecHandle`. Exposed so test
    /// doubles for `ContainerHost` elsewhere in the workspace can produce
    /// a handle without going through `docker`.
    pub fn from_child(cmd_string: String, child: Child) -> Self {
        Self { cmd_string, child }
    }

    pub async fn wait(mut self) -> Result<ExitStatus, ContainerError> {
        self.child
            .wait()
            .await
            .map_err(|source| ContainerError::Wait(self.cmd_string.clone(), source))
    }
}

/// Container runtime abstraction (spec §4.A): start/stop/exec client
/// daemons, mounting the shared `testfiles/`/`logs/` directories.
#[async_trait]
pub trait ContainerHost: Send + Sync {
    /// Starts a detached, auto-removing daemon container running
    /// `sleep infinity`. Idempotent: kills any stale container of the
    /// same name first.
    async fn start_daemon(&self, name: &str, image: &str) -> Result<(), ContainerError>;

    /// Runs `argv` inside the named daemon container and returns a
    /// handle whose `wait()` resolves when the exec terminates.
    async fn exec(&self, name: &str, argv: &[String]) -> Result<ExecHandle, ContainerError>;

    /// Best-effort kill; "not found" is not an error (spec §4.A, §7.2).
    async fn kill(&self, name: &str) -> Result<(), ContainerError>;

    /// Force-removes a local image, ignoring "not found" (spec §4.A).
    async fn remove_image(&self, image: &str) -> Result<(), ContainerError>;
}

/// `ContainerHost` backed by shelling out to the `docker` CLI via
/// `tokio::process::Command`, the same child-process-supervision idiom
/// the interop runner in the wider pack uses for long-lived peer
/// processes.
#[derive(Debug, Clone)]
pub struct DockerHost {
    testfiles_dir: PathBuf,
    logs_dir: PathBuf,
}

impl DockerHost {
    pub fn new(testfiles_dir: PathBuf, logs_dir: PathBuf) -> Self {
        Self {
            testfiles_dir,
            logs_dir,
        }
    }

    fn mount_args(&self) -> [String; 4] {
        [
            "-v".to_string(),
            format!("{}:/testfiles", self.testfiles_dir.display()),
            "-v".to_string(),
            format!("{}:/logs", self.logs_dir.display()),
        ]
    }
}

#[async_trait]
impl ContainerHost for DockerHost {
    async fn start_daemon(&self, name: &str, image: &str) -> Result<(), ContainerError> {
        // Pre-kill any stale container of this name; swallow its own
        // not-found error, matching §4.A's idempotence requirement.
        let _ = self.kill(name).await;

        let mounts = self.mount_args();
        let mut cmd = Command::new("docker");
        cmd.arg("run")
            .arg("-d")
            .arg("--rm")
            .arg("--name")
            .arg(name)
            .args(&mounts)
            .arg(image)
            .arg("sleep")
            .arg("infinity");

        let cmd_string = format!("docker run -d --rm --name {name} ... {image} sleep infinity");
        let output = cmd
            .output()
            .await
            .map_err(|e| ContainerError::Spawn(cmd_string.clone(), e))?;

        if !output.status.success() {
            return Err(ContainerError::NonZeroExit {
                command: cmd_string,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        debug!(name, image, "started daemon container");
        Ok(())
    }

    async fn exec(&self, name: &str, argv: &[String]) -> Result<ExecHandle, ContainerError> {
        let cmd_string = format!("docker exec {name} {}", argv.join(" "));
        let mut cmd = Command::new("docker");
        cmd.arg("exec").arg(name).args(argv);
        cmd.stdout(Stdio::null()).stderr(Stdio::null());

        let child = cmd
            .spawn()
            .map_err(|e| ContainerError::Spawn(cmd_string.clone(), e))?;
        Ok(ExecHandle { cmd_string, child })
    }

    async fn kill(&self, name: &str) -> Result<(), ContainerError> {
        let output = Command::new("docker")
            .arg("kill")
            .arg(name)
            .output()
            .await
            .map_err(|e| ContainerError::Spawn(format!("docker kill {name}"), e))?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_not_found(&stderr) {
            return Ok(());
        }
        Err(ContainerError::NonZeroExit {
            command: format!("docker kill {name}"),
            status: output.status.code().unwrap_or(-1),
            stderr: stderr.into_owned(),
        })
    }

    async fn remove_image(&self, image: &str) -> Result<(), ContainerError> {
        let output = Command::new("docker")
            .args(["rmi", "-f", image])
            .output()
            .await
            .map_err(|e| ContainerError::Spawn(format!("docker rmi -f {image}"), e))?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_not_found(&stderr) {
            return Ok(());
        }
        warn!(image, stderr = %stderr, "docker rmi failed");
        Err(ContainerError::NonZeroExit {
            command: format!("docker rmi -f {image}"),
            status: output.status.code().unwrap_or(-1),
            stderr: stderr.into_owned(),
        })
    }
}

fn is_not_found(stderr: &str) -> bool {
    let lower = stderr.to_ascii_lowercase();
    lower.contains("no such container") || lower.contains("no such image")
}
