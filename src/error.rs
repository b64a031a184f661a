use nix::errno::Errno;
use std::ffi::NulError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can make the shell give up on a line.
///
/// None of these terminate the shell itself: the read loop reports them and prompts again.
#[derive(Debug, Error)]
pub enum ShellError {
    /// A `<`, `>` or `>>` with nothing to redirect to.
    #[error("file name expected after {operator}")]
    FileNameExpected { operator: &'static str },

    #[error("{}: file not found", path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("couldn't open {}: {source}", path.display())]
    OutputOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to fork a child process: {0}")]
    Fork(#[source] Errno),

    #[error("failed to create a pipe: {0}")]
    Pipe(#[source] Errno),

    #[error("failed to duplicate a standard stream: {0}")]
    Dup(#[source] io::Error),

    #[error("failed to wait for a child process: {0}")]
    Wait(#[source] Errno),

    #[error("argument contains a NUL byte: {0}")]
    InvalidArgument(#[from] NulError),

    #[error("empty command")]
    EmptyCommand,

    #[error("cd: {}: {source}", path.display())]
    DirectoryChange {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cd: HOME not set")]
    HomeNotSet,

    #[error("cd: no previous directory")]
    NoPreviousDirectory,
}
