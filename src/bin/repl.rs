use std::borrow::Cow;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, EditMode, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{Helper, Highlighter, Hinter, Validator};

use baby::shell::SCRIPT_EXTENSION;
use baby::{Env, ErrorStyle, Outcome, Session, ShellConfig, ShellError, TokenKind, tokenize};

const KEYWORDS: &[&str] = &["let", "fun", "if", "else", "while", "return", "true", "false"];

#[derive(Parser, Debug)]
#[command(name = "baby", version, about = "Interactive shell for the baby scripting language")]
struct Args {
    /// Scripts to run before the prompt starts
    scripts: Vec<PathBuf>,

    /// Use vi key bindings instead of emacs
    #[arg(long)]
    vi: bool,

    /// File the line history is loaded from and saved to
    #[arg(long, default_value = "baby_history.txt")]
    history: PathBuf,

    /// Show parse errors as annotated source reports
    #[arg(long)]
    fancy_errors: bool,
}

struct BabyCompleter {
    env: Env,
}

impl BabyCompleter {
    fn new(env: Env) -> Self {
        BabyCompleter { env }
    }
}

impl rustyline::completion::Completer for BabyCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        // Only complete an identifier that ends right at the cursor
        let prefix = match tokenize(&line[..pos]).last() {
            Some(token) if token.kind == TokenKind::Ident && token.span.end == pos => {
                token.literal.clone()
            }
            _ => return Ok((pos, vec![])),
        };

        let mut candidates: Vec<String> = self
            .env
            .borrow()
            .get_identifiers()
            .into_iter()
            .chain(baby::builtins::names().map(str::to_string))
            .chain(KEYWORDS.iter().map(|k| k.to_string()))
            .filter(|id| id.starts_with(&prefix) && id.len() > prefix.len())
            .map(|id| id[prefix.len()..].to_string())
            .collect();
        candidates.sort();
        candidates.dedup();
        Ok((pos, candidates))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct InputHelper {
    #[rustyline(Validator)]
    validator: BracketValidator,
    #[rustyline(Highlighter)]
    highlighter: BracketHighlighter,
    #[rustyline(Completer)]
    completer: BabyCompleter,
}

fn is_pair(opening: char, closing: char) -> bool {
    matches!((opening, closing), ('(', ')') | ('[', ']') | ('{', '}'))
}

// Keeps reading lines while brackets or a string are left open
struct BracketValidator;

impl Validator for BracketValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let mut stack = Vec::new();
        let mut in_string = false;

        for (i, c) in ctx.input().chars().enumerate() {
            if in_string {
                // Strings have no escapes
                in_string = c != '"';
                continue;
            }
            match c {
                '"' => in_string = true,
                '(' | '[' | '{' => stack.push(c),
                ')' | ']' | '}' => match stack.pop() {
                    Some(opening) if is_pair(opening, c) => {}
                    _ => {
                        return Ok(ValidationResult::Invalid(Some(format!(
                            "  - Unmatched '{}' at position {}",
                            c, i
                        ))));
                    }
                },
                _ => {}
            }
        }

        if in_string || !stack.is_empty() {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

struct BracketHighlighter;

impl Highlighter for BracketHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        // (bracket, char index, byte offset in `highlighted`)
        let mut stack: Vec<(char, usize, usize)> = Vec::new();
        let mut highlighted = String::new();
        let mut in_string = false;
        let cursor = pos.checked_sub(1);

        for (i, c) in line.chars().enumerate() {
            if in_string || c == '"' {
                if c == '"' {
                    in_string = !in_string;
                }
                highlighted.push_str(&format!("\x1b[32m{}\x1b[0m", c)); // Green for strings
                continue;
            }

            match c {
                '(' | '[' | '{' => {
                    stack.push((c, i, highlighted.len()));
                    highlighted.push(c);
                }
                ')' | ']' | '}' => match stack.pop() {
                    Some((opening, opening_index, matching_pos)) if is_pair(opening, c) => {
                        if cursor == Some(i) || cursor == Some(opening_index) {
                            // Blue for the bracket pair under the cursor
                            highlighted.push_str(&format!("\x1b[34m{}\x1b[0m", c));
                            highlighted.replace_range(
                                matching_pos..=matching_pos,
                                &format!("\x1b[1;34m{}\x1b[0m", opening),
                            );
                        } else {
                            highlighted.push(c);
                        }
                    }
                    Some((opening, _, matching_pos)) => {
                        // Red for mismatched pairs
                        highlighted.push_str(&format!("\x1b[31m{}\x1b[0m", c));
                        highlighted.replace_range(
                            matching_pos..=matching_pos,
                            &format!("\x1b[1;31m{}\x1b[0m", opening),
                        );
                    }
                    None => highlighted.push_str(&format!("\x1b[31m{}\x1b[0m", c)),
                },
                _ => highlighted.push(c),
            }
        }

        Cow::Owned(highlighted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn print_outcome(session: &Session, outcome: &Outcome) {
    if let Err(err) = session.render(outcome, &mut io::stdout()) {
        eprintln!("Could not write result: {}", err);
    }
}

fn main() -> Result<(), ShellError> {
    baby::init_tracing();
    let args = Args::parse();

    let error_style = if args.fancy_errors {
        ErrorStyle::Fancy
    } else {
        ErrorStyle::Plain
    };
    let mut session = Session::new(ShellConfig { error_style });

    for script in &args.scripts {
        let outcome = session.eval_file(script)?;
        print_outcome(&session, &outcome);
    }

    println!("baby REPL v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Type 'exit' or press Ctrl-D to quit. Enter a path ending in .{} to run a script.",
        SCRIPT_EXTENSION
    );

    let helper = InputHelper {
        validator: BracketValidator,
        highlighter: BracketHighlighter,
        completer: BabyCompleter::new(Rc::clone(session.env())),
    };
    let edit_mode = if args.vi { EditMode::Vi } else { EditMode::Emacs };
    let config = rustyline::config::Config::builder()
        .edit_mode(edit_mode)
        .build();
    let mut rl: Editor<InputHelper, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(helper));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if rl.load_history(&args.history).is_err() {
        println!("No previous history.");
    }

    let mut failure = None;
    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.eq_ignore_ascii_case("exit") {
                    break;
                }

                match session.eval_line(trimmed) {
                    Ok(outcome) => print_outcome(&session, &outcome),
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                failure = Some(err.into());
                break;
            }
        }
    }

    rl.save_history(&args.history)?;
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
