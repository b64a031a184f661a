use crate::env::Environment;
use crate::error::ShellError;
use crate::lexer::is_blank;
use crate::text::{find_next, strip};
use log::debug;
use std::env;
use std::path::PathBuf;

/// The `cd` built-in.
///
/// Runs inside the shell process: it never forks and takes no part in pipes or redirection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cd {
    /// Directory to switch to; `-` is the previous directory and `None` the home directory.
    pub target: Option<String>,
}

/// Recognizes a built-in by the first token of a stripped, tilde-expanded line.
pub fn match_builtin(line: &str) -> Option<Cd> {
    let end = [' ', '\t']
        .into_iter()
        .filter_map(|blank| find_next(line, blank, 0))
        .min();
    let (name, rest) = match end {
        Some(i) => line.split_at(i),
        None => (line, ""),
    };
    match name {
        "cd" => Some(Cd::new(rest)),
        _ => None,
    }
}

impl Cd {
    /// The whole remainder of the line is the path, so `cd my dir` targets `my dir`.
    fn new(argument: &str) -> Self {
        let target = strip(argument.trim_matches(is_blank), ' ');
        Self {
            target: (!target.is_empty()).then_some(target),
        }
    }

    /// Changes the process working directory.
    ///
    /// On success the directory that was left becomes the previous directory. On failure
    /// neither the working directory nor the previous directory change.
    pub fn execute(self, env: &mut Environment) -> Result<(), ShellError> {
        let target = match self.target.as_deref() {
            None => PathBuf::from(env.home().ok_or(ShellError::HomeNotSet)?),
            Some("-") => env
                .previous_dir
                .clone()
                .ok_or(ShellError::NoPreviousDirectory)?,
            Some(path) => PathBuf::from(path),
        };

        let leaving = env::current_dir().ok();
        env::set_current_dir(&target).map_err(|source| ShellError::DirectoryChange {
            path: target.clone(),
            source,
        })?;
        debug!("cd {} (from {:?})", target.display(), leaving);

        if let Some(dir) = leaving {
            env.previous_dir = Some(dir);
        }
        Ok(())
    }
}
