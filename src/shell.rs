use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::environment::{Env, Environment};
use crate::evaluator::Evaluator;
use crate::object::ObjectRef;
use crate::parser::{ParseError, parse_str};

/// Extension that marks a shell line as a script to load.
pub const SCRIPT_EXTENSION: &str = "baby";

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("could not read script `{}`: {source}", .path.display())]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// How parse errors are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorStyle {
    /// One tab-indented message per line.
    #[default]
    Plain,
    /// `ariadne` reports pointing into the source.
    Fancy,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ShellConfig {
    pub error_style: ErrorStyle,
}

/// What evaluating one chunk of source produced.
#[derive(Debug)]
pub enum Outcome {
    /// The source ran but left no value, e.g. only `let` statements.
    Empty,
    Value(ObjectRef),
    /// Parsing failed; nothing was evaluated.
    ParseErrors {
        source: String,
        errors: Vec<ParseError>,
    },
}

/// A shell session: one persistent environment that every line or script is
/// evaluated against.
pub struct Session {
    env: Env,
    evaluator: Evaluator,
    config: ShellConfig,
}

impl Session {
    pub fn new(config: ShellConfig) -> Self {
        Session::with_evaluator(config, Evaluator::new())
    }

    pub fn with_evaluator(config: ShellConfig, evaluator: Evaluator) -> Self {
        Session {
            env: Environment::new(),
            evaluator,
            config,
        }
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Parses and evaluates `source` in the session environment.
    pub fn eval_source(&mut self, source: &str) -> Outcome {
        let (program, errors) = parse_str(source);
        if !errors.is_empty() {
            return Outcome::ParseErrors {
                source: source.to_string(),
                errors,
            };
        }
        match self.evaluator.eval_program(&program, &self.env) {
            Some(value) => Outcome::Value(value),
            None => Outcome::Empty,
        }
    }

    /// Evaluates one shell line. A line naming a single `.baby` file runs
    /// the file's contents instead.
    pub fn eval_line(&mut self, line: &str) -> Result<Outcome, ShellError> {
        match script_path(line) {
            Some(path) => self.eval_file(path),
            None => Ok(self.eval_source(line)),
        }
    }

    pub fn eval_file(&mut self, path: &Path) -> Result<Outcome, ShellError> {
        tracing::debug!(path = %path.display(), "loading script");
        let source = fs::read_to_string(path).map_err(|source| ShellError::ScriptRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.eval_source(&source))
    }

    /// Writes the user-facing form of `outcome` to `out`.
    pub fn render(&self, outcome: &Outcome, out: &mut dyn Write) -> io::Result<()> {
        match outcome {
            Outcome::Empty => Ok(()),
            Outcome::Value(value) => writeln!(out, "{}", value.borrow()),
            Outcome::ParseErrors { source, errors } => {
                for error in errors {
                    match self.config.error_style {
                        ErrorStyle::Plain => writeln!(out, "\t{}", error)?,
                        ErrorStyle::Fancy => error.report("REPL", source, true, out)?,
                    }
                }
                Ok(())
            }
        }
    }
}

/// The script path named by `line`, if the trimmed line is exactly one path
/// ending in `.baby`.
pub fn script_path(line: &str) -> Option<&Path> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return None;
    }
    let path = Path::new(trimmed);
    (path.extension()? == SCRIPT_EXTENSION).then_some(path)
}
