use std::io::{self, Write};

use ariadne::{Config, Label, Report, ReportKind, Source};

use crate::ParseError;

impl ParseError {
    /// Writes an `ariadne` report for this error, labelled with its span in
    /// `source`.
    pub fn report(
        &self,
        source_id: &str,
        source: &str,
        color: bool,
        writer: &mut dyn Write,
    ) -> io::Result<()> {
        let span = self.span().to_range();
        let (title, label) = match self {
            ParseError::UnexpectedToken { expected, found } => (
                format!("Unexpected token `{}`", found.kind),
                format!("Expected {} here", expected),
            ),
            ParseError::UnexpectedEof { expected, .. } => (
                "Unexpected end of input".to_string(),
                format!("Expected {}", expected),
            ),
            ParseError::NoPrefixParseFn(token) => (
                format!("No prefix parse function for `{}`", token.kind),
                "An expression cannot start with this token".to_string(),
            ),
            ParseError::IllegalToken(token) => (
                format!("Illegal token `{}`", token.literal),
                "This character is not part of the language".to_string(),
            ),
            ParseError::InvalidInteger(token) => (
                format!("Could not parse `{}` as integer", token.literal),
                "This literal does not fit in a 64-bit integer".to_string(),
            ),
        };

        Report::build(ReportKind::Error, (source_id, span.clone()))
            .with_config(Config::default().with_color(color))
            .with_message(title)
            .with_label(Label::new((source_id, span)).with_message(label))
            .finish()
            .write((source_id, Source::from(source)), writer)
    }
}
