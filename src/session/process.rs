// Subprocess launch and teardown for search/select sessions

use crate::error::{ImportPickError, Result};
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};

/// Program plus arguments for one subprocess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn command(&self, cwd: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(cwd);
        command
    }
}

/// How a subprocess ended during teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Exited on its own before teardown began
    AlreadyExited,
    /// Exited within the grace period after SIGTERM
    Graceful,
    /// Needed SIGKILL
    Forced,
}

/// Launch the search subprocess: no stdin, stdout piped to the caller
pub fn spawn_search(spec: &CommandSpec, cwd: &Path) -> Result<Child> {
    let mut command = spec.command(cwd);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    spawn(spec, command)
}

/// Launch the selector subprocess: candidates on stdin, selection on stdout.
/// stderr stays attached to the terminal so the selector can draw its UI.
pub fn spawn_selector(spec: &CommandSpec, cwd: &Path) -> Result<Child> {
    let mut command = spec.command(cwd);
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);
    spawn(spec, command)
}

fn spawn(spec: &CommandSpec, mut command: Command) -> Result<Child> {
    let child = command
        .spawn()
        .map_err(|e| ImportPickError::SubprocessLaunch {
            program: spec.program.clone(),
            source: e,
        })?;
    tracing::debug!("Launched {} (pid {:?})", spec.program, child.id());
    Ok(child)
}

/// Ask `child` to stop with SIGTERM, escalating to SIGKILL when it is
/// still alive after `grace`. Safe to call on an already exited child.
pub async fn terminate(child: &mut Child, program: &str, grace: Duration) -> Result<Termination> {
    let io_err = |source: std::io::Error| ImportPickError::Io {
        source,
        context: format!("Failed to reap {}", program),
    };

    if child.try_wait().map_err(io_err)?.is_some() {
        return Ok(Termination::AlreadyExited);
    }
    let Some(pid) = child.id() else {
        return Ok(Termination::AlreadyExited);
    };

    match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        Ok(()) => tracing::debug!("Sent SIGTERM to {} (pid {})", program, pid),
        Err(Errno::ESRCH) => {
            child.wait().await.map_err(io_err)?;
            return Ok(Termination::AlreadyExited);
        }
        Err(e) => tracing::warn!("Failed to send SIGTERM to {}: {}", program, e),
    }

    let waited = tokio::time::timeout(grace, child.wait()).await;
    match waited {
        Ok(status) => {
            status.map_err(io_err)?;
            Ok(Termination::Graceful)
        }
        Err(_) => {
            tracing::warn!(
                "{} did not exit within {:?}, sending SIGKILL",
                program,
                grace
            );
            child.kill().await.map_err(io_err)?;
            Ok(Termination::Forced)
        }
    }
}
