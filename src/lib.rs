//! A small interactive shell for pipelines of external programs.
//!
//! A line is interpreted in a fixed sequence of passes, each producing a new owned value:
//! whitespace stripping, tilde expansion, the `cd` built-in, redirection scanning (`<`, `>`,
//! `>>`), pipeline splitting on `|` with an optional trailing `&`, and tokenizing of every
//! stage. The stages are then forked left to right with their standard streams wired to
//! pipes or to the redirected files.
//!
//! Quotes only protect delimiters: they are kept verbatim in the arguments and nothing inside
//! them is interpreted. There is no globbing, no variable substitution and no job control.
//!
//! The main entry point is [`Interpreter`]; [`Interpreter::interpret_line`] runs one line and
//! [`Interpreter::repl`] drives an interactive session.

mod builtin;
pub mod command;
pub mod env;
pub mod error;
mod executor;
mod external;
mod interpreter;
mod lexer;
mod parser;
mod redirect;
mod text;
mod tilde;

pub use error::ShellError;
pub use interpreter::Interpreter;
