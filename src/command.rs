use nix::sys::wait::WaitStatus;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Exit code reported by a child that could not find its program.
pub const NOT_FOUND: ExitCode = 127;

/// Exit code reported by a child whose program was found but could not be executed.
pub const NOT_EXECUTABLE: ExitCode = 126;

/// Shell-style exit code of a reaped child: its exit status, or `128 + signal` when it was
/// killed by a signal.
pub fn exit_code(status: WaitStatus) -> ExitCode {
    match status {
        WaitStatus::Exited(_, code) => code,
        WaitStatus::Signaled(_, signal, _) => 128 + signal as i32,
        _ => -1,
    }
}
