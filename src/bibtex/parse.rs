//! BibTeX format parsing implementation.
//!
//! This module handles the low-level scanning of `.bib` text into raw entry
//! blocks. Brace nesting is tracked explicitly: abstracts and titles may
//! contain unescaped braces, so a field value or entry only ends at the
//! closing brace that balances its opening one. A structural error aborts
//! the whole parse, since misaligned braces would corrupt every entry that
//! follows.

use crate::BibError;
use crate::bibtex::structure::RawBibEntry;
use std::iter::Peekable;
use std::str::Chars;

/// Parse the content of a `.bib` file, returning raw entry blocks in source
/// order.
pub(crate) fn bibtex_parse(input: &str) -> Result<Vec<RawBibEntry>, BibError> {
    if input.trim().is_empty() {
        return Err(BibError::InvalidFormat("empty input".into()));
    }

    let mut scanner = Scanner::new(input);
    let mut entries = Vec::new();

    while let Some(c) = scanner.peek() {
        match c {
            '@' => {
                scanner.bump();
                if let Some(raw) = parse_block(&mut scanner)? {
                    entries.push(raw);
                }
            }
            // Comment line between entries
            '%' => scanner.skip_line(),
            c if c.is_whitespace() => {
                scanner.bump();
            }
            // Standard BibTeX treats stray text between entries as comment
            _ => scanner.skip_line(),
        }
    }

    if entries.is_empty() {
        return Err(BibError::InvalidFormat("no entries found".into()));
    }

    Ok(entries)
}

/// Parse one `@...{...}` block. Returns `None` for non-entry blocks
/// (`@comment`, `@string`, `@preamble`), which are consumed and skipped.
fn parse_block(scanner: &mut Scanner) -> Result<Option<RawBibEntry>, BibError> {
    let entry_line = scanner.line;

    let entry_type = scanner.take_identifier().to_lowercase();
    if entry_type.is_empty() {
        return Err(malformed("expected entry type after '@'", entry_line));
    }

    scanner.skip_whitespace();
    if scanner.peek() != Some('{') {
        return Err(malformed(
            &format!("expected '{{' after entry type '{entry_type}'"),
            scanner.line,
        ));
    }
    scanner.bump();

    if matches!(entry_type.as_str(), "comment" | "string" | "preamble") {
        skip_balanced(scanner, entry_line)?;
        return Ok(None);
    }

    scanner.skip_whitespace();
    let citation_key = scanner.take_while(|c| c != ',' && c != '}' && !c.is_whitespace());
    if citation_key.is_empty() {
        return Err(malformed("missing citation key", scanner.line));
    }

    scanner.skip_whitespace();
    let mut fields = Vec::new();
    match scanner.peek() {
        Some(',') => {
            scanner.bump();
        }
        Some('}') => {
            scanner.bump();
            return Ok(Some(RawBibEntry {
                entry_type,
                citation_key,
                fields,
            }));
        }
        _ => {
            return Err(malformed(
                &format!("expected ',' or '}}' after citation key '{citation_key}'"),
                scanner.line,
            ));
        }
    }

    loop {
        scanner.skip_whitespace();
        match scanner.peek() {
            Some('}') => {
                scanner.bump();
                break;
            }
            None => {
                return Err(malformed(
                    &format!("unbalanced braces in entry '{citation_key}'"),
                    entry_line,
                ));
            }
            Some(_) => {}
        }

        let field_line = scanner.line;
        let name = scanner.take_identifier();
        if name.is_empty() {
            return Err(malformed(
                &format!("expected field name in entry '{citation_key}'"),
                field_line,
            ));
        }

        scanner.skip_whitespace();
        if scanner.peek() != Some('=') {
            return Err(malformed(
                &format!("expected '=' after field name '{name}'"),
                scanner.line,
            ));
        }
        scanner.bump();
        scanner.skip_whitespace();

        let value = parse_value(scanner)?;
        fields.push((name, value));

        scanner.skip_whitespace();
        match scanner.peek() {
            Some(',') => {
                scanner.bump();
            }
            Some('}') => {
                scanner.bump();
                break;
            }
            None => {
                return Err(malformed(
                    &format!("unbalanced braces in entry '{citation_key}'"),
                    entry_line,
                ));
            }
            Some(c) => {
                return Err(malformed(
                    &format!("expected ',' or '}}' after field value, found '{c}'"),
                    scanner.line,
                ));
            }
        }
    }

    Ok(Some(RawBibEntry {
        entry_type,
        citation_key,
        fields,
    }))
}

/// Parse a single field value: braced, quoted, or bare.
fn parse_value(scanner: &mut Scanner) -> Result<String, BibError> {
    match scanner.peek() {
        Some('{') => {
            let start_line = scanner.line;
            scanner.bump();
            read_braced(scanner, start_line)
        }
        Some('"') => {
            let start_line = scanner.line;
            scanner.bump();
            read_quoted(scanner, start_line)
        }
        Some(_) => Ok(scanner
            .take_while(|c| c != ',' && c != '}' && c != '\n')
            .trim()
            .to_string()),
        None => Err(malformed("unexpected end of input in field value", scanner.line)),
    }
}

/// Read a braced value, tracking nesting depth. Inner braces are kept
/// verbatim; only the outer pair is stripped.
fn read_braced(scanner: &mut Scanner, start_line: usize) -> Result<String, BibError> {
    let mut depth = 1usize;
    let mut value = String::new();
    while let Some(c) = scanner.bump() {
        match c {
            '{' => {
                depth += 1;
                value.push(c);
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(value);
                }
                value.push(c);
            }
            _ => value.push(c),
        }
    }
    Err(malformed("unbalanced braces in field value", start_line))
}

/// Read a quoted value. Braces may nest inside quotes; a quote character at
/// brace depth zero terminates the value.
fn read_quoted(scanner: &mut Scanner, start_line: usize) -> Result<String, BibError> {
    let mut depth = 0usize;
    let mut value = String::new();
    while let Some(c) = scanner.bump() {
        match c {
            '{' => {
                depth += 1;
                value.push(c);
            }
            '}' => {
                if depth == 0 {
                    return Err(malformed(
                        "unbalanced braces in quoted field value",
                        start_line,
                    ));
                }
                depth -= 1;
                value.push(c);
            }
            '"' if depth == 0 => return Ok(value),
            _ => value.push(c),
        }
    }
    Err(malformed("unterminated quoted field value", start_line))
}

/// Consume a balanced-brace block whose opening brace was already consumed.
fn skip_balanced(scanner: &mut Scanner, start_line: usize) -> Result<(), BibError> {
    let mut depth = 1usize;
    while let Some(c) = scanner.bump() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            _ => {}
        }
    }
    Err(malformed("unbalanced braces in block", start_line))
}

fn malformed(message: &str, line: usize) -> BibError {
    BibError::MalformedInput {
        message: message.to_string(),
        line,
    }
}

/// Character scanner with line tracking for error locators.
struct Scanner<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    /// Entry types and field names: ASCII alphanumerics plus `_` and `-`.
    fn take_identifier(&mut self) -> String {
        self.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }
}
