//! Input/output redirection of a whole pipeline.
//!
//! Redirections are found on the full line before it is split into stages: `<` rebinds the
//! first stage's input and `>`/`>>` rebind the last stage's output. Scanning is pure, opening
//! happens afterwards, so a malformed line never creates a file.

use crate::error::ShellError;
use crate::text::{QuoteState, shift, strip};
use log::debug;
use std::fs::OpenOptions;
use std::io;
use std::os::fd::{AsFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;

/// Permission bits of files created by `>` and `>>`, before the umask.
const CREATE_MODE: u32 = 0o644;

/// Kind of redirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// `<`: read standard input from a file.
    Input,
    /// `>`: write standard output to a file, truncating it.
    Output,
    /// `>>`: write standard output to the end of a file.
    Append,
}

impl RedirectKind {
    pub fn operator(self) -> &'static str {
        match self {
            RedirectKind::Input => "<",
            RedirectKind::Output => ">",
            RedirectKind::Append => ">>",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub kind: RedirectKind,
    pub target: PathBuf,
}

fn ends_file_name(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '<' | '>' | '|' | '&')
}

fn skip_blanks(line: &str, from: usize) -> usize {
    let rest = &line[from..];
    from + rest.len() - rest.trim_start_matches([' ', '\t']).len()
}

fn file_name_end(line: &str, from: usize) -> usize {
    let mut quote = QuoteState::default();
    for (offset, ch) in line[from..].char_indices() {
        if !quote.is_quoted() && ends_file_name(ch) {
            return from + offset;
        }
        quote = quote.advance(ch);
    }
    line.len()
}

/// Removes every unquoted redirection from `line`.
///
/// Returns the cleaned line, with whitespace left by the removals collapsed, and the
/// redirections in the order they appeared. A redirection operator without a file name is an
/// error.
pub fn scan(line: &str) -> Result<(String, Vec<Redirect>), ShellError> {
    let mut line = line.to_owned();
    let mut redirects = Vec::new();
    let mut quote = QuoteState::default();
    let mut i = 0;

    while let Some(ch) = line[i..].chars().next() {
        if quote.is_quoted() || !matches!(ch, '<' | '>') {
            quote = quote.advance(ch);
            i += ch.len_utf8();
            continue;
        }

        let (kind, operator_len) = match ch {
            '<' => (RedirectKind::Input, 1),
            _ if line[i + 1..].starts_with('>') => (RedirectKind::Append, 2),
            _ => (RedirectKind::Output, 1),
        };
        let name_start = skip_blanks(&line, i + operator_len);
        let name_end = file_name_end(&line, name_start);
        if name_start == name_end {
            return Err(ShellError::FileNameExpected {
                operator: kind.operator(),
            });
        }

        redirects.push(Redirect {
            kind,
            target: PathBuf::from(&line[name_start..name_end]),
        });
        line = shift(&line, i, name_end - i);
    }

    Ok((strip(&line, ' '), redirects))
}

/// Where the first stage of a pipeline reads from and where the last one writes to.
///
/// Both descriptors are close-on-exec, so only the copies a child `dup2`s onto its standard
/// streams survive into the executed program.
#[derive(Debug)]
pub struct Redirection {
    pub input: OwnedFd,
    pub output: OwnedFd,
}

impl Redirection {
    /// Duplicates of the shell's own standard input and output.
    pub fn inherit() -> Result<Self, ShellError> {
        let input = io::stdin()
            .as_fd()
            .try_clone_to_owned()
            .map_err(ShellError::Dup)?;
        let output = io::stdout()
            .as_fd()
            .try_clone_to_owned()
            .map_err(ShellError::Dup)?;
        Ok(Self { input, output })
    }

    /// Inherited streams with `redirects` applied in order.
    pub fn open(redirects: &[Redirect]) -> Result<Self, ShellError> {
        let mut redirection = Self::inherit()?;
        for redirect in redirects {
            redirection.apply(redirect)?;
        }
        Ok(redirection)
    }

    /// Opens the target of `redirect` and rebinds the matching end.
    ///
    /// The descriptor it replaces is closed, so the last redirection of each direction wins.
    pub fn apply(&mut self, redirect: &Redirect) -> Result<(), ShellError> {
        let mut options = OpenOptions::new();
        match redirect.kind {
            RedirectKind::Input => {
                options.read(true);
            }
            RedirectKind::Output => {
                options.write(true).create(true).truncate(true);
            }
            RedirectKind::Append => {
                options.append(true).create(true);
            }
        }
        options.mode(CREATE_MODE);

        let path = &redirect.target;
        let file = options.open(path).map_err(|source| match redirect.kind {
            RedirectKind::Input => ShellError::InputNotFound {
                path: path.clone(),
                source,
            },
            RedirectKind::Output | RedirectKind::Append => ShellError::OutputOpen {
                path: path.clone(),
                source,
            },
        })?;
        debug!("{} {}", redirect.kind.operator(), path.display());

        match redirect.kind {
            RedirectKind::Input => self.input = file.into(),
            RedirectKind::Output | RedirectKind::Append => self.output = file.into(),
        }
        Ok(())
    }
}
