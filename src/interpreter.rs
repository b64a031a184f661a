use crate::builtin;
use crate::command::ExitCode;
use crate::env::Environment;
use crate::error::ShellError;
use crate::executor::{self, Job};
use crate::external::ExternalCommand;
use crate::lexer;
use crate::parser;
use crate::redirect::{self, Redirection};
use crate::text::strip;
use crate::tilde;
use log::debug;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// An interactive command interpreter for pipelines of external programs.
///
/// The interpreter owns the session [`Environment`]; each line goes through tilde expansion,
/// the `cd` built-in, redirection scanning and pipeline splitting before its stages are forked.
///
/// Example
/// ```no_run
/// use pipesh::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.interpret_line("printf b\\na\\n | sort > sorted.txt").unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
}

impl Interpreter {
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Whether the line `exit` has been interpreted.
    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Interprets one line of input.
    ///
    /// Returns once the foreground pipeline has finished, with the exit code of its last stage,
    /// or as soon as a background pipeline has been started. Parse and redirection errors abort
    /// the line before anything is spawned.
    pub fn interpret_line(&mut self, line: &str) -> Result<ExitCode, ShellError> {
        let line = strip(line.trim(), ' ');
        if line.is_empty() {
            return Ok(0);
        }
        if line == "exit" {
            self.env.should_exit = true;
            return Ok(0);
        }

        let line = tilde::expand(&line, self.env.home().as_deref());
        debug!("expanded: {line:?}");

        if let Some(cd) = builtin::match_builtin(&line) {
            cd.execute(&mut self.env)?;
            return Ok(0);
        }

        let (line, redirects) = redirect::scan(&line)?;
        let pipeline = parser::split_pipeline(&line);
        debug!("redirects: {redirects:?}, pipeline: {pipeline:?}");

        let mut commands = Vec::with_capacity(pipeline.segments.len());
        for segment in &pipeline.segments {
            let args = lexer::split_into_args(segment);
            if args.is_empty() {
                debug!("skipping empty command {segment:?}");
                continue;
            }
            let command = ExternalCommand::new(&self.env, args)?;
            if !command.is_resolved() {
                debug!("{:?} not found in PATH", command.name());
            }
            commands.push(command);
        }

        let redirection = Redirection::open(&redirects)?;
        if commands.is_empty() {
            return Ok(0);
        }
        Job::spawn(&commands, redirection, pipeline.background)?.wait()
    }

    fn prompt(&self) -> String {
        let cwd = std::env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        format!("pipesh: {cwd}$ ")
    }

    /// Read-eval-print loop until `exit` or end of input.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new()?;

        while !self.env.should_exit {
            executor::reap_finished();
            match rl.readline(&self.prompt()) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str())?;
                    if let Err(err) = self.interpret_line(&line) {
                        eprintln!("pipesh: {err}");
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Environment::new())
    }
}
