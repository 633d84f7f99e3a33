use gotempl_base::RawPosition;

use crate::parser::{ParseError, ParseErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Literal template text between actions.
    Text,
    /// `{{` or `{{-`.
    LeftDelim,
    /// `}}` or `-}}`.
    RightDelim,
    /// `/*...*/`, including the `gotype` hint form.
    Comment,
    /// Bare identifier, keyword, or `true`/`false`.
    Ident,
    /// Dotted field chain starting with `.`, possibly just `.`.
    Field,
    /// `$name`.
    Variable,
    /// Quoted or backquoted string literal, quotes included in the text.
    String,
    Number,
    Pipe,
    LeftParen,
    RightParen,
    /// `:=`.
    Declare,
    Comma,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub position: RawPosition,
}

struct Scanner<'a> {
    src: &'a str,
    offset: usize,
    line: u32,
    column: u32,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.offset..].chars().next()
    }

    fn peek_at(&self, chars_ahead: usize) -> Option<char> {
        self.src[self.offset..].chars().nth(chars_ahead)
    }

    fn starts_with(&self, pattern: &str) -> bool {
        self.src[self.offset..].starts_with(pattern)
    }

    fn at_end(&self) -> bool {
        self.offset >= self.src.len()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn bump_str(&mut self, pattern: &str) {
        debug_assert!(self.starts_with(pattern));
        for _ in pattern.chars() {
            self.bump();
        }
    }

    fn mark(&self) -> (usize, u32, u32) {
        (self.offset, self.line, self.column)
    }

    fn token_from(&self, kind: TokenKind, mark: (usize, u32, u32)) -> Token {
        let (offset, line, column) = mark;
        Token {
            kind,
            position: RawPosition::new(&self.src[offset..self.offset], offset, line, column),
        }
    }

    fn position_from(&self, mark: (usize, u32, u32)) -> RawPosition {
        let (offset, line, column) = mark;
        RawPosition::new(&self.src[offset..self.offset], offset, line, column)
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Tokenize template source. Byte offsets are exact: every token's
/// `position.text` is the untouched slice it was scanned from. A lex-level
/// failure (unclosed action, unterminated string) aborts the whole file.
pub fn lex(src: &str) -> Result<Vec<Token>, ParseError> {
    let mut scanner = Scanner::new(src);
    let mut tokens = Vec::new();

    while !scanner.at_end() {
        // Literal text up to the next action.
        let mark = scanner.mark();
        while !scanner.at_end() && !scanner.starts_with("{{") {
            scanner.bump();
        }
        if scanner.offset > mark.0 {
            tokens.push(scanner.token_from(TokenKind::Text, mark));
        }
        if scanner.at_end() {
            break;
        }

        let delim_mark = scanner.mark();
        scanner.bump_str("{{");
        if scanner.peek() == Some('-') && scanner.peek_at(1).is_some_and(|ch| ch.is_whitespace()) {
            scanner.bump();
        }
        let delim_position = scanner.position_from(delim_mark);
        tokens.push(scanner.token_from(TokenKind::LeftDelim, delim_mark));

        lex_action(&mut scanner, &mut tokens, &delim_position)?;
    }

    Ok(tokens)
}

/// Lex tokens inside one action, up to and including the closing delimiter.
fn lex_action(
    scanner: &mut Scanner<'_>,
    tokens: &mut Vec<Token>,
    open_position: &RawPosition,
) -> Result<(), ParseError> {
    loop {
        while scanner.peek().is_some_and(|ch| ch.is_whitespace()) {
            scanner.bump();
        }
        let Some(ch) = scanner.peek() else {
            return Err(ParseError::new(
                ParseErrorKind::UnclosedAction,
                open_position.clone(),
            ));
        };

        let mark = scanner.mark();
        match ch {
            '-' if scanner.starts_with("-}}") => {
                scanner.bump_str("-}}");
                tokens.push(scanner.token_from(TokenKind::RightDelim, mark));
                return Ok(());
            }
            '}' if scanner.starts_with("}}") => {
                scanner.bump_str("}}");
                tokens.push(scanner.token_from(TokenKind::RightDelim, mark));
                return Ok(());
            }
            '/' if scanner.starts_with("/*") => {
                scanner.bump_str("/*");
                while !scanner.at_end() && !scanner.starts_with("*/") {
                    scanner.bump();
                }
                if scanner.at_end() {
                    return Err(ParseError::new(
                        ParseErrorKind::UnclosedAction,
                        scanner.position_from(mark),
                    ));
                }
                scanner.bump_str("*/");
                tokens.push(scanner.token_from(TokenKind::Comment, mark));
            }
            '"' => {
                scanner.bump();
                loop {
                    match scanner.peek() {
                        Some('\\') => {
                            scanner.bump();
                            scanner.bump();
                        }
                        Some('"') => {
                            scanner.bump();
                            break;
                        }
                        Some('\n') | None => {
                            return Err(ParseError::new(
                                ParseErrorKind::UnterminatedString,
                                scanner.position_from(mark),
                            ));
                        }
                        Some(_) => {
                            scanner.bump();
                        }
                    }
                }
                tokens.push(scanner.token_from(TokenKind::String, mark));
            }
            '`' => {
                scanner.bump();
                while scanner.peek().is_some_and(|c| c != '`') {
                    scanner.bump();
                }
                if scanner.at_end() {
                    return Err(ParseError::new(
                        ParseErrorKind::UnterminatedString,
                        scanner.position_from(mark),
                    ));
                }
                scanner.bump();
                tokens.push(scanner.token_from(TokenKind::String, mark));
            }
            '.' => {
                scanner.bump();
                loop {
                    while scanner.peek().is_some_and(is_ident_char) {
                        scanner.bump();
                    }
                    if scanner.peek() == Some('.') && scanner.peek_at(1).is_some_and(is_ident_start)
                    {
                        scanner.bump();
                        continue;
                    }
                    break;
                }
                tokens.push(scanner.token_from(TokenKind::Field, mark));
            }
            '$' => {
                scanner.bump();
                while scanner.peek().is_some_and(is_ident_char) {
                    scanner.bump();
                }
                tokens.push(scanner.token_from(TokenKind::Variable, mark));
            }
            '|' => {
                scanner.bump();
                tokens.push(scanner.token_from(TokenKind::Pipe, mark));
            }
            '(' => {
                scanner.bump();
                tokens.push(scanner.token_from(TokenKind::LeftParen, mark));
            }
            ')' => {
                scanner.bump();
                tokens.push(scanner.token_from(TokenKind::RightParen, mark));
            }
            ',' => {
                scanner.bump();
                tokens.push(scanner.token_from(TokenKind::Comma, mark));
            }
            ':' if scanner.starts_with(":=") => {
                scanner.bump_str(":=");
                tokens.push(scanner.token_from(TokenKind::Declare, mark));
            }
            '0'..='9' => {
                lex_number(scanner);
                tokens.push(scanner.token_from(TokenKind::Number, mark));
            }
            '-' if scanner.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                scanner.bump();
                lex_number(scanner);
                tokens.push(scanner.token_from(TokenKind::Number, mark));
            }
            _ if is_ident_start(ch) => {
                scanner.bump();
                while scanner.peek().is_some_and(is_ident_char) {
                    scanner.bump();
                }
                tokens.push(scanner.token_from(TokenKind::Ident, mark));
            }
            _ => {
                // Operators the analyzer has no use for (`=`, `!`, ...);
                // skip the character rather than failing the file.
                scanner.bump();
            }
        }
    }
}

fn lex_number(scanner: &mut Scanner<'_>) {
    while scanner.peek().is_some_and(|c| c.is_ascii_digit()) {
        scanner.bump();
    }
    if scanner.peek() == Some('.') && scanner.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
        scanner.bump();
        while scanner.peek().is_some_and(|c| c.is_ascii_digit()) {
            scanner.bump();
        }
    }
}
