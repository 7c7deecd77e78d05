// Declare modules publicly so they are part of the library interface
pub mod ast;
pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod pretty_print;
pub mod shell;
pub mod source;

#[cfg(test)]
mod test_support;

use std::sync::Once;

pub use ast::Program;
pub use environment::{Env, EnvError, Environment, Slot};
pub use evaluator::{EvalError, EvalResult, Evaluator};
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use object::{Object, ObjectKind, ObjectRef};
pub use parser::{ParseError, Parser, parse_str};
pub use shell::{ErrorStyle, Outcome, Session, ShellConfig, ShellError};
pub use source::Span;

static TRACING_INIT: Once = Once::new();

/// Installs a `tracing` subscriber writing to stderr, filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, and only runs once per process.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(filter)
                .init();
        }
    });
}
