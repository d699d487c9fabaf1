use crate::parser::tokenizer::Span;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Kind of tokenizer error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnterminatedComment,
    UnterminatedTag,
    UnterminatedAttributeValue,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnterminatedComment => "Unterminated comment",
            ErrorKind::UnterminatedTag => "Unterminated tag",
            ErrorKind::UnterminatedAttributeValue => "Unterminated attribute value",
        }
    }
}

/// Error raised while tokenizing source markup
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    pub related_span: Option<Span>,
    pub related_label: Option<String>,
    pub help: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            related_span: None,
            related_label: None,
            help: None,
        }
    }

    /// Add a related span (e.g., where the construct was opened)
    pub fn with_related(mut self, span: Span) -> Self {
        self.related_span = Some(span);
        self
    }

    /// Set the label for the related span
    pub fn with_related_label(mut self, label: impl Into<String>) -> Self {
        self.related_label = Some(label.into());
        self
    }

    /// Add help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the error with source context
    pub fn render(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, false)
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, true)
    }

    fn render_inner(&self, source: &str, filename: &str, color: bool) -> String {
        let red = if color { "\x1b[1;31m" } else { "" };
        let dim = if color { "\x1b[2m" } else { "" };
        let cyan = if color { "\x1b[1;38;5;73m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let mut output = String::new();
        output.push('\n');

        let line = self.span.start.line + 1;
        let col = self.span.start.col + 1;
        output.push_str(&format!(" {}file:{} {}:{}:{}\n", dim, reset, filename, line, col));
        output.push_str(&format!(
            "{}error:{} {}: {}\n",
            red,
            reset,
            self.kind.as_str(),
            self.message
        ));

        output.push_str(&render_excerpt(source, &self.span, None, red, dim, reset));

        if let Some(ref related) = self.related_span {
            let label = self.related_label.as_deref().unwrap_or("opened here");
            output.push_str(&render_excerpt(source, related, Some(label), dim, dim, reset));
        }

        if let Some(ref help) = self.help {
            output.push('\n');
            for (i, help_line) in help.lines().enumerate() {
                if i == 0 {
                    output.push_str(&format!(" {}help:{} {}\n", cyan, reset, help_line));
                } else {
                    output.push_str(&format!("       {}\n", help_line));
                }
            }
        }

        output.push('\n');
        output
    }
}

/// Source line plus caret underline for a span
fn render_excerpt(
    source: &str,
    span: &Span,
    label: Option<&str>,
    caret_color: &str,
    dim: &str,
    reset: &str,
) -> String {
    let Some(source_line) = source.lines().nth(span.start.line) else {
        return String::new();
    };

    let line_number = span.start.line + 1;
    let width = format!("{}", line_number).len().max(2);
    let underline_start = span.start.col;
    let underline_len = if span.end.line == span.start.line {
        span.end.col.saturating_sub(span.start.col).max(1)
    } else {
        source_line
            .chars()
            .count()
            .saturating_sub(underline_start)
            .max(1)
    };

    let mut out = String::new();
    out.push_str(&format!("{}{:>width$} |{}\n", dim, "", reset, width = width));
    out.push_str(&format!(
        "{}{:>width$} |{} {}\n",
        dim,
        line_number,
        reset,
        source_line,
        width = width
    ));
    out.push_str(&format!(
        "{}{:>width$} |{} {}{}{}{}{}\n",
        dim,
        "",
        reset,
        " ".repeat(underline_start),
        caret_color,
        "^".repeat(underline_len),
        label.map(|l| format!(" {}", l)).unwrap_or_default(),
        reset,
        width = width
    ));
    out
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}: {}",
            self.kind.as_str(),
            self.span.start.line + 1,
            self.span.start.col + 1,
            self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Error during compilation (tokenizing or reading input)
#[derive(Debug)]
pub enum CompileError {
    Parse(ParseError),
    Io { path: PathBuf, source: io::Error },
}

impl CompileError {
    /// Render the error with source context (no color)
    pub fn render(&self, source: &str, filename: &str) -> String {
        match self {
            CompileError::Parse(err) => err.render(source, filename),
            CompileError::Io { path, source } => {
                format!("error: failed to read {}: {}\n", path.display(), source)
            }
        }
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        match self {
            CompileError::Parse(err) => err.render_color(source, filename),
            CompileError::Io { path, source } => format!(
                "\x1b[1;31merror\x1b[0m: \x1b[1mfailed to read {}: {}\x1b[0m\n",
                path.display(),
                source
            ),
        }
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        CompileError::Parse(err)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(err) => write!(f, "{}", err),
            CompileError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Parse(err) => Some(err),
            CompileError::Io { source, .. } => Some(source),
        }
    }
}
