//! Child process execution with timeouts and bounded output.
//!
//! [`exec`] runs a shell command and treats a non-zero exit as failure;
//! [`spawn`] runs a program directly and reports whatever status it exits
//! with. Both drain stdout/stderr concurrently so a chatty child cannot
//! deadlock on a full pipe.

use std::ffi::OsStr;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use super::config::ExecConfig;
use crate::core::invoke::call;

/// How to run a child process.
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Shell prefix used by [`exec`]; the command string is appended.
    pub shell: Vec<String>,
    pub timeout: Duration,
    pub output_limit_bytes: usize,
    pub cwd: Option<PathBuf>,
    /// Bytes written to the child's stdin; stdin is `/dev/null` when unset.
    pub input: Option<Vec<u8>>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self::from(&ExecConfig::default())
    }
}

impl From<&ExecConfig> for ExecOptions {
    fn from(config: &ExecConfig) -> Self {
        Self {
            shell: config.shell.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            output_limit_bytes: config.output_limit_bytes,
            cwd: None,
            input: None,
        }
    }
}

/// Captured child process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
    pub timed_out: bool,
}

/// Run `command` through the configured shell and return its stdout.
///
/// `None` if the shell cannot be spawned, the command exits non-zero, or it
/// runs past the timeout.
pub fn exec(command: &str, options: &ExecOptions) -> Option<Vec<u8>> {
    call(|| exec_checked(command, options))
}

/// Run `program` with `args`. A non-zero exit is not a failure; `None` only
/// when the program cannot be started or waited on.
pub fn spawn<I, S>(program: &str, args: I, options: &ExecOptions) -> Option<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    call(|| {
        run_command_with_timeout(
            cmd,
            options.input.as_deref(),
            options.timeout,
            options.output_limit_bytes,
        )
    })
}

fn exec_checked(command: &str, options: &ExecOptions) -> Result<Vec<u8>> {
    let (shell, shell_args) = options
        .shell
        .split_first()
        .ok_or_else(|| anyhow!("shell is empty"))?;
    let mut cmd = Command::new(shell);
    cmd.args(shell_args).arg(command);
    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    let output = run_command_with_timeout(
        cmd,
        options.input.as_deref(),
        options.timeout,
        options.output_limit_bytes,
    )?;
    if output.timed_out {
        bail!(
            "command timed out after {}ms: {command}",
            options.timeout.as_millis()
        );
    }
    if !output.status.success() {
        bail!(
            "command failed ({}): {command}\n{}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }
    Ok(output.stdout)
}

/// Run a command with a timeout and capture stdout/stderr without risking pipe deadlocks.
///
/// Output is read concurrently while the child runs. `output_limit_bytes` bounds the amount of
/// stdout/stderr stored in memory (bytes beyond this are discarded while still draining the pipe).
/// `input` is written to stdin only after both reader threads are running, so a child that fills
/// its output pipes before reading stdin cannot block the write.
#[instrument(skip_all, fields(timeout_ms = timeout.as_millis() as u64, output_limit_bytes))]
pub fn run_command_with_timeout(
    mut cmd: Command,
    stdin: Option<&[u8]>,
    timeout: Duration,
    output_limit_bytes: usize,
) -> Result<CommandOutput> {
    if stdin.is_some() {
        cmd.stdin(Stdio::piped());
    } else {
        cmd.stdin(Stdio::null());
    }
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    debug!(program = ?cmd.get_program(), "spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle = thread::spawn(move || read_stream_limited(stdout, output_limit_bytes));
    let stderr_handle = thread::spawn(move || read_stream_limited(stderr, output_limit_bytes));

    if let Some(input) = stdin {
        let mut child_stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("stdin was not piped"))?;
        // A child that exits without reading closes the pipe; that is not our failure.
        if let Err(e) = child_stdin.write_all(input)
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(e).context("write stdin");
        }
    }

    let mut timed_out = false;
    let status = match child.wait_timeout(timeout).context("wait for command")? {
        Some(status) => status,
        None => {
            warn!(
                timeout_ms = timeout.as_millis() as u64,
                "command timed out, killing"
            );
            timed_out = true;
            child.kill().context("kill command")?;
            child.wait().context("wait command after kill")?
        }
    };

    let (stdout, stdout_truncated) = join_output(stdout_handle).context("join stdout")?;
    let (stderr, stderr_truncated) = join_output(stderr_handle).context("join stderr")?;

    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
        timed_out,
    })
}

fn join_output(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}
