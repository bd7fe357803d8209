
use ariadne::{Label, Report, ReportKind, Source};
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum DiagnosticError {
    #[error("Failed to render diagnostic: {0}")]
    Render(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// Line is 1-based, column is 0-based (counted in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    TypeMismatch,
    SyntaxError,
    UnrecognizedNode,
}

/// The type names on both sides of a failed compatibility test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub expected: String,
    pub found: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Option<Span>,
    pub location: Option<Location>,
    pub mismatch: Option<Mismatch>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn syntax_error(message: impl Into<String>, location: Location, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::SyntaxError,
            message: message.into(),
            span: Some(span),
            location: Some(location),
            mismatch: None,
            help: None,
        }
    }

    pub fn type_mismatch(expected: impl Into<String>, found: Vec<String>, span: Span) -> Self {
        let expected = expected.into();
        let found_text = found
            .iter()
            .map(|name| format!("'{}'", name))
            .collect::<Vec<_>>()
            .join(" and ");

        Self {
            kind: DiagnosticKind::TypeMismatch,
            message: format!("expected '{}' but found {}", expected, found_text),
            span: Some(span),
            location: None,
            mismatch: Some(Mismatch { expected, found }),
            help: None,
        }
    }

    pub fn unrecognized_node(text: &str, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::UnrecognizedNode,
            message: format!("unrecognized node '{}'", text),
            span: Some(span),
            location: None,
            mismatch: None,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_syntax_error(&self) -> bool {
        self.kind == DiagnosticKind::SyntaxError
    }

    /// Render a rich report to stderr.
    pub fn report(&self, filename: &str, source: &str) -> Result<(), DiagnosticError> {
        let offset = self.span.map(|span| span.start).unwrap_or(0);
        let title = match self.kind {
            DiagnosticKind::SyntaxError => "Syntax error",
            DiagnosticKind::TypeMismatch => "Type mismatch",
            DiagnosticKind::UnrecognizedNode => "Unrecognized node",
        };

        let mut builder = Report::build(ReportKind::Error, filename, offset)
            .with_message(title);

        if let Some(span) = self.span {
            builder = builder.with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(&self.message)
            );
        } else {
            builder = builder.with_note(&self.message);
        }

        if let Some(help) = &self.help {
            builder = builder.with_help(help);
        }

        builder
            .finish()
            .eprint((filename, Source::from(source)))?;
        Ok(())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.location) {
            (DiagnosticKind::SyntaxError, Some(location)) => write!(
                f,
                "syntax error at line {}, column {}: {}",
                location.line, location.column, self.message
            ),
            (DiagnosticKind::SyntaxError, None) => write!(f, "syntax error: {}", self.message),
            (DiagnosticKind::TypeMismatch, _) => write!(f, "type error: {}", self.message),
            (DiagnosticKind::UnrecognizedNode, _) => write!(f, "error: {}", self.message),
        }
    }
}

/// Listener interface shared by the parser's syntax-error reporting and the checker.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics in emission order. Nothing is deduplicated or dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    pub fn syntax_error_count(&self) -> usize {
        self.count(DiagnosticKind::SyntaxError)
    }

    pub fn has_syntax_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_syntax_error)
    }
}

impl DiagnosticSink for Diagnostics {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Closest candidate by edit distance, if it is near enough to be a plausible typo.
/// Ties go to the lexicographically smaller name so the result does not depend on
/// iteration order. Single-character names never get a suggestion.
pub fn closest_match<'a, I>(target: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let length = target.chars().count();
    let max_distance = (length / 3).max(2).min(length.saturating_sub(1));

    candidates
        .into_iter()
        .map(|candidate| (strsim::levenshtein(target, candidate), candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .min()
        .map(|(_, candidate)| candidate)
}
