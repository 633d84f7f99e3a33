use serde::Serialize;

use crate::position::RawPosition;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub position: RawPosition,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, position: RawPosition) -> Self {
        Self {
            message: message.into(),
            position,
            severity,
        }
    }
}

/// Diagnostics for one analyzed template, partitioned by severity so a UI
/// layer can route them without re-filtering. Within each bucket entries
/// stay in encounter order; that order is part of the output contract.
///
/// Information-severity entries travel in `hints`: they are positive
/// inlay-style feedback and share that consumer surface. The severity on
/// each entry keeps the distinction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub hints: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
            Severity::Information | Severity::Hint => self.hints.push(diagnostic),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.hints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.hints.len()
    }
}

pub fn diagnostics_have_errors(diagnostics: &Diagnostics) -> bool {
    !diagnostics.errors.is_empty()
}

// ANSI color codes
const RED: &str = "\x1b[1;31m";
const YELLOW: &str = "\x1b[1;33m";
const CYAN: &str = "\x1b[1;36m";
const DARK_GRAY: &str = "\x1b[90m";
const WHITE: &str = "\x1b[97m";
const RESET: &str = "\x1b[0m";

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Information => "info",
        Severity::Hint => "hint",
    }
}

fn caret_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => RED,
        Severity::Warning => YELLOW,
        Severity::Information | Severity::Hint => CYAN,
    }
}

/// Render a diagnostics bundle for a terminal, with a caret frame under each
/// diagnostic pointing at its span in `source`. Errors first, then warnings,
/// then hints, preserving encounter order inside each bucket.
pub fn render_diagnostics(
    path: &str,
    source: &str,
    diagnostics: &Diagnostics,
    use_color: bool,
) -> String {
    let mut output = String::new();
    let ordered = diagnostics
        .errors
        .iter()
        .chain(diagnostics.warnings.iter())
        .chain(diagnostics.hints.iter());
    for (index, diagnostic) in ordered.enumerate() {
        if index > 0 {
            output.push('\n');
        }
        output.push_str(&render_diagnostic(path, source, diagnostic, use_color));
    }
    output
}

fn render_diagnostic(path: &str, source: &str, diagnostic: &Diagnostic, use_color: bool) -> String {
    let mut output = String::new();
    let pos = &diagnostic.position;
    let label = severity_label(diagnostic.severity);
    if use_color {
        output.push_str(&format!(
            "{YELLOW}{label}{RESET} {DARK_GRAY}{}:{}:{}{RESET}\n  {WHITE}{}{RESET}\n",
            path, pos.line, pos.column, diagnostic.message
        ));
    } else {
        output.push_str(&format!(
            "{label} {}:{}:{}\n  {}\n",
            path, pos.line, pos.column, diagnostic.message
        ));
    }
    if let Some(frame) = render_source_frame(source, pos, use_color, diagnostic.severity) {
        output.push_str(&frame);
    }
    output.trim_end().to_string()
}

fn render_source_frame(
    source: &str,
    position: &RawPosition,
    use_color: bool,
    severity: Severity,
) -> Option<String> {
    let line_index = (position.line as usize).checked_sub(1)?;
    let line = source.lines().nth(line_index)?;
    let line_no = position.line;
    let width = line_no.to_string().len();

    let mut output = String::new();
    if use_color {
        output.push_str(&format!("{DARK_GRAY}{:>width$} |{RESET}\n", ""));
        output.push_str(&format!("{DARK_GRAY}{line_no:>width$} |{RESET} {line}\n"));
    } else {
        output.push_str(&format!("{:>width$} |\n", ""));
        output.push_str(&format!("{line_no:>width$} | {line}\n"));
    }

    let line_len = line.chars().count();
    let mut start_col = position.column as usize;
    if start_col == 0 {
        start_col = 1;
    }
    if start_col > line_len + 1 {
        start_col = line_len + 1;
    }
    // Clamp multi-line spans to the first line of the frame.
    let span_chars = match position.text.find('\n') {
        Some(index) => position.text[..index].chars().count(),
        None => position.text.chars().count(),
    };
    let caret_len = span_chars.clamp(1, line_len + 1 - start_col.saturating_sub(1));

    let padding = " ".repeat(start_col.saturating_sub(1));
    let carets = "^".repeat(caret_len);
    if use_color {
        let cc = caret_color(severity);
        output.push_str(&format!(
            "{DARK_GRAY}{:>width$} |{RESET} {padding}{cc}{carets}{RESET}\n",
            ""
        ));
    } else {
        output.push_str(&format!("{:>width$} | {padding}{carets}\n", ""));
    }
    Some(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(text: &str, offset: usize, line: u32, column: u32) -> RawPosition {
        RawPosition::new(text, offset, line, column)
    }

    #[test]
    fn push_partitions_by_severity() {
        let mut bundle = Diagnostics::default();
        bundle.push(Diagnostic::new(Severity::Error, "bad", pos("x", 0, 1, 1)));
        bundle.push(Diagnostic::new(Severity::Warning, "meh", pos("x", 0, 1, 1)));
        bundle.push(Diagnostic::new(Severity::Hint, "Type: string", pos("x", 0, 1, 1)));
        bundle.push(Diagnostic::new(Severity::Information, "loaded", pos("x", 0, 1, 1)));
        assert_eq!(bundle.errors.len(), 1);
        assert_eq!(bundle.warnings.len(), 1);
        assert_eq!(bundle.hints.len(), 2);
        assert_eq!(bundle.len(), 4);
        assert!(diagnostics_have_errors(&bundle));
    }

    #[test]
    fn renders_caret_frame_without_color() {
        let source = "hello {{ .Name }}\n";
        let mut bundle = Diagnostics::default();
        bundle.push(Diagnostic::new(
            Severity::Error,
            "field Name not found",
            pos(".Name", 9, 1, 10),
        ));
        let rendered = render_diagnostics("greeting.tmpl", source, &bundle, false);
        assert!(rendered.starts_with("error greeting.tmpl:1:10\n"));
        assert!(rendered.contains("1 | hello {{ .Name }}"));
        let caret_line = format!(" | {}{}", " ".repeat(9), "^".repeat(5));
        assert!(rendered.contains(&caret_line), "got: {rendered}");
    }
}
