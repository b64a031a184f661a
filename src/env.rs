use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Session state of the interpreter.
///
/// The environment contains:
/// - `vars`: variables consulted by the shell itself (`HOME`, `PATH`).
/// - `previous_dir`: the directory left by the last successful `cd`, used by `cd -`.
/// - `should_exit`: set once the user asked the read loop to terminate.
///
/// Children inherit the real process environment; `vars` is only the shell's view of it.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub vars: HashMap<String, String>,
    pub previous_dir: Option<PathBuf>,
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process environment.
    pub fn new() -> Self {
        Self {
            vars: stdenv::vars().collect(),
            previous_dir: None,
            should_exit: false,
        }
    }

    /// Get the value of a variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    pub fn home(&self) -> Option<String> {
        self.get_var("HOME")
    }
}
