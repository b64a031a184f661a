//! Forking and wiring of pipeline stages.

use crate::command::{ExitCode, exit_code};
use crate::error::ShellError;
use crate::external::ExternalCommand;
use crate::redirect::Redirection;
use log::{debug, warn};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::{Signal, kill};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, fork, pipe2};
use std::os::fd::{AsRawFd, OwnedFd};

/// Retries a system call interrupted by a signal.
fn retry_on_eintr<F, T>(f: F) -> nix::Result<T>
where
    F: Fn() -> nix::Result<T>,
{
    loop {
        match f() {
            Err(Errno::EINTR) => (),
            result => return result,
        }
    }
}

/// The children of one pipeline, in stage order.
#[derive(Debug)]
pub struct Job {
    pids: Vec<Pid>,
    background: bool,
}

impl Job {
    /// Forks every stage left to right and wires them together.
    ///
    /// Stage `i` reads from the pipe written by stage `i - 1` and writes to a fresh pipe read
    /// by stage `i + 1`; the first stage reads `redirection.input` and the last one writes
    /// `redirection.output`. The parent drops each descriptor as soon as the child that needs
    /// it has been forked, so readers see end-of-file once their writers exit.
    ///
    /// If a pipe or a fork fails, the stages already running are killed and reaped before the
    /// error is returned.
    pub fn spawn(
        commands: &[ExternalCommand],
        redirection: Redirection,
        background: bool,
    ) -> Result<Self, ShellError> {
        let mut job = Job {
            pids: Vec::with_capacity(commands.len()),
            background,
        };
        let Some((last, init)) = commands.split_last() else {
            return Ok(job);
        };

        let mut stage_input = redirection.input;
        for command in init {
            let (read_end, write_end) = match pipe2(OFlag::O_CLOEXEC) {
                Ok(link) => link,
                Err(errno) => return Err(job.abort(ShellError::Pipe(errno))),
            };
            job.fork_stage(command, &stage_input, &write_end)?;
            stage_input = read_end;
        }
        job.fork_stage(last, &stage_input, &redirection.output)?;

        Ok(job)
    }

    fn fork_stage(
        &mut self,
        command: &ExternalCommand,
        input: &OwnedFd,
        output: &OwnedFd,
    ) -> Result<(), ShellError> {
        // SAFETY: the child only duplicates descriptors, execs and `_exit`s.
        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => {
                debug!("forked {:?} as {child}", command.name());
                self.pids.push(child);
                Ok(())
            }
            Ok(ForkResult::Child) => command.exec_child(input.as_raw_fd(), output.as_raw_fd()),
            Err(errno) => Err(self.abort(ShellError::Fork(errno))),
        }
    }

    /// Kills and reaps the stages started so far.
    fn abort(&mut self, error: ShellError) -> ShellError {
        warn!("aborting pipeline: {error}");
        for &pid in &self.pids {
            let _ = kill(pid, Signal::SIGKILL);
        }
        for pid in self.pids.drain(..) {
            let _ = retry_on_eintr(|| waitpid(pid, None));
        }
        error
    }

    pub fn pids(&self) -> &[Pid] {
        &self.pids
    }

    /// Waits for a foreground job and returns the exit code of its last stage.
    ///
    /// A background job is left running and reports success immediately.
    pub fn wait(self) -> Result<ExitCode, ShellError> {
        if self.background {
            debug!("running in background: {:?}", self.pids());
            return Ok(0);
        }
        let mut code = 0;
        for pid in self.pids {
            code = exit_code(wait_for_exit(pid)?);
        }
        Ok(code)
    }
}

fn wait_for_exit(pid: Pid) -> Result<WaitStatus, ShellError> {
    loop {
        match retry_on_eintr(|| waitpid(pid, None)).map_err(ShellError::Wait)? {
            status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..)) => return Ok(status),
            _ => continue,
        }
    }
}

/// Reaps background children that have finished, without blocking.
pub fn reap_finished() {
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
            Ok(status) => debug!("reaped {status:?}"),
            Err(Errno::EINTR) => continue,
            Err(errno) => {
                warn!("failed to reap background children: {errno}");
                break;
            }
        }
    }
}
