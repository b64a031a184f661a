use crate::command::{ExitCode, NOT_EXECUTABLE, NOT_FOUND};
use crate::env::Environment;
use crate::error::ShellError;
use nix::libc;
use nix::unistd::{dup2, execv, write};
use std::borrow::Cow;
use std::ffi::{CStr, CString, OsStr};
use std::io;
use std::os::fd::RawFd;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// One pipeline stage: a program outside the shell and its argument vector.
///
/// Everything the child needs is prepared before forking, so the child only rewires its
/// standard streams and replaces its image.
#[derive(Debug)]
pub struct ExternalCommand {
    /// Resolved executable, `None` when the name could not be found.
    program: Option<CString>,
    /// `argv[0]` is the name as typed.
    argv: Vec<CString>,
}

impl ExternalCommand {
    /// Builds a stage from an argument vector, resolving `args[0]` against `PATH`.
    ///
    /// A program that cannot be found is not an error here: the stage is still forked so the
    /// pipes around it close normally, and the child reports it.
    pub fn new(env: &Environment, args: Vec<String>) -> Result<Self, ShellError> {
        let name = args.first().ok_or(ShellError::EmptyCommand)?;
        let search_paths = env.get_var("PATH").unwrap_or_default();
        let program = find_command_path(OsStr::new(&search_paths), Path::new(name))
            .map(|path| CString::new(path.as_os_str().as_bytes()))
            .transpose()?;
        let argv = args
            .into_iter()
            .map(CString::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { program, argv })
    }

    pub fn name(&self) -> &CStr {
        &self.argv[0]
    }

    pub fn is_resolved(&self) -> bool {
        self.program.is_some()
    }

    /// Runs the stage in a freshly forked child and never returns.
    ///
    /// `stdin` and `stdout` are duplicated onto descriptors 0 and 1. All other pipeline
    /// descriptors are close-on-exec and vanish with the exec.
    pub fn exec_child(&self, stdin: RawFd, stdout: RawFd) -> ! {
        let code = self.try_exec(stdin, stdout);
        // SAFETY: `_exit` skips atexit handlers and stdio flushing that belong to the parent.
        unsafe { libc::_exit(code) }
    }

    fn try_exec(&self, stdin: RawFd, stdout: RawFd) -> ExitCode {
        for (fd, target) in [(stdin, libc::STDIN_FILENO), (stdout, libc::STDOUT_FILENO)] {
            if let Err(errno) = dup2(fd, target) {
                self.report(errno.desc());
                return NOT_EXECUTABLE;
            }
        }
        let Some(program) = &self.program else {
            self.report("command not found");
            return NOT_FOUND;
        };
        match execv(program, &self.argv) {
            Ok(never) => match never {},
            Err(errno) => {
                self.report(errno.desc());
                NOT_EXECUTABLE
            }
        }
    }

    /// Writes `<name>: <message>` to stderr without allocating or taking the stderr lock.
    fn report(&self, message: &str) {
        let parts: [&[u8]; 4] = [self.name().to_bytes(), b": ", message.as_bytes(), b"\n"];
        for part in parts {
            let _ = write(io::stderr(), part);
        }
    }
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it is an executable file.
/// - `./foo` or a relative path with several components (e.g. `bin/sh`): resolved against
///   the current directory.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first executable match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() || path.starts_with("./") {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, _) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|path| find_by_path(path).is_some())
}

fn find_by_path(path: &Path) -> Option<&Path> {
    let metadata = path.metadata().ok()?;
    let executable = metadata.is_file() && metadata.permissions().mode() & 0o111 != 0;
    executable.then_some(path)
}
