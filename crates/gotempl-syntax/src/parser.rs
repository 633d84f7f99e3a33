use gotempl_base::RawPosition;

use crate::ast::{
    BlockInfo, LiteralKind, ParsedTemplateFile, PipeArgument, TypeHint, VariableLocation,
};
use crate::lexer::{lex, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnclosedAction,
    UnclosedBlock,
    UnmatchedEnd,
    DuplicateTypeHint,
    MalformedTypeHint(String),
    UnterminatedString,
}

/// Terminal parse failure. Parsing aborts the whole file; no partial
/// `ParsedTemplateFile` is produced for a file that failed to parse.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: RawPosition,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: RawPosition) -> Self {
        Self { kind, position }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            ParseErrorKind::UnclosedAction => "unclosed action".to_string(),
            ParseErrorKind::UnclosedBlock => "missing {{end}} for open block".to_string(),
            ParseErrorKind::UnmatchedEnd => "unexpected {{end}} with no open block".to_string(),
            ParseErrorKind::DuplicateTypeHint => "duplicate type hint in block".to_string(),
            ParseErrorKind::MalformedTypeHint(path) => {
                format!("malformed type hint `{path}`: expected <import-path>.<TypeName>")
            }
            ParseErrorKind::UnterminatedString => "unterminated string literal".to_string(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message(), self.position)
    }
}

impl std::error::Error for ParseError {}

/// Parse template source into its block structure.
pub fn parse(source: &str, filename: &str) -> Result<ParsedTemplateFile, ParseError> {
    let tokens = lex(source)?;
    Parser::new(tokens, filename).parse_file()
}

/// Constructs that consume a matching `{{end}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NestKind {
    Define,
    Range,
    With,
    If,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    filename: String,
    blocks: Vec<BlockInfo>,
    block_stack: Vec<usize>,
    nesting: Vec<NestKind>,
}

impl Parser {
    fn new(tokens: Vec<Token>, filename: &str) -> Self {
        Self {
            tokens,
            pos: 0,
            filename: filename.to_string(),
            blocks: vec![BlockInfo::new("", RawPosition::new("", 0, 1, 1))],
            block_stack: vec![0],
            nesting: Vec::new(),
        }
    }

    fn parse_file(mut self) -> Result<ParsedTemplateFile, ParseError> {
        while self.pos < self.tokens.len() {
            let token = self.tokens[self.pos].clone();
            self.pos += 1;
            if token.kind != TokenKind::LeftDelim {
                continue;
            }
            let action = self.collect_action();
            self.parse_action(&action, &token.position)?;
        }
        if !self.nesting.is_empty() {
            // Any still-open construct at EOF is a missing `{{end}}`.
            let position = self
                .blocks
                .last()
                .map(|block| block.position.clone())
                .unwrap_or_else(|| RawPosition::new("", 0, 1, 1));
            return Err(ParseError::new(ParseErrorKind::UnclosedBlock, position));
        }
        Ok(ParsedTemplateFile {
            filename: self.filename,
            blocks: self.blocks,
        })
    }

    /// Tokens of the current action, up to the closing delimiter. The lexer
    /// guarantees every `{{` has a matching `}}` in the stream.
    fn collect_action(&mut self) -> Vec<Token> {
        let mut action = Vec::new();
        while self.pos < self.tokens.len() {
            let token = self.tokens[self.pos].clone();
            self.pos += 1;
            if token.kind == TokenKind::RightDelim {
                break;
            }
            action.push(token);
        }
        action
    }

    fn current_block(&mut self) -> &mut BlockInfo {
        let index = *self.block_stack.last().unwrap_or(&0);
        &mut self.blocks[index]
    }

    fn scope(&self) -> String {
        // A define opens a fresh block; its top level is unscoped even when
        // the define itself sits inside a range or with.
        let start = self
            .nesting
            .iter()
            .rposition(|kind| *kind == NestKind::Define)
            .map_or(0, |index| index + 1);
        let parts: Vec<&str> = self.nesting[start..]
            .iter()
            .filter_map(|kind| match kind {
                NestKind::Range => Some("range"),
                NestKind::With => Some("with"),
                NestKind::Define | NestKind::If => None,
            })
            .collect();
        parts.join(".")
    }

    fn parse_action(
        &mut self,
        action: &[Token],
        delim_position: &RawPosition,
    ) -> Result<(), ParseError> {
        let Some(first) = action.first() else {
            return Ok(());
        };

        if first.kind == TokenKind::Comment {
            return self.parse_comment(first);
        }

        if first.kind == TokenKind::Ident {
            match first.position.text.as_str() {
                "define" | "block" => {
                    let name = action
                        .iter()
                        .find(|token| token.kind == TokenKind::String)
                        .map(|token| strip_quotes(&token.position.text).to_string())
                        .unwrap_or_default();
                    let index = self.blocks.len();
                    self.blocks
                        .push(BlockInfo::new(name, delim_position.clone()));
                    self.block_stack.push(index);
                    self.nesting.push(NestKind::Define);
                    return Ok(());
                }
                "end" => {
                    return match self.nesting.pop() {
                        Some(NestKind::Define) => {
                            self.block_stack.pop();
                            Ok(())
                        }
                        Some(_) => Ok(()),
                        None => Err(ParseError::new(
                            ParseErrorKind::UnmatchedEnd,
                            first.position.clone(),
                        )),
                    };
                }
                "range" => {
                    self.parse_pipeline(&action[1..]);
                    self.nesting.push(NestKind::Range);
                    return Ok(());
                }
                "with" => {
                    self.parse_pipeline(&action[1..]);
                    self.nesting.push(NestKind::With);
                    return Ok(());
                }
                "if" => {
                    self.parse_pipeline(&action[1..]);
                    self.nesting.push(NestKind::If);
                    return Ok(());
                }
                "else" => {
                    // `{{else if <pipeline>}}` re-enters the condition.
                    if action.get(1).is_some_and(|token| {
                        token.kind == TokenKind::Ident && token.position.text == "if"
                    }) {
                        self.parse_pipeline(&action[2..]);
                    }
                    return Ok(());
                }
                _ => {}
            }
        }

        self.parse_pipeline(action);
        Ok(())
    }

    fn parse_comment(&mut self, token: &Token) -> Result<(), ParseError> {
        let body = token
            .position
            .text
            .trim_start_matches("/*")
            .trim_end_matches("*/");
        let Some(rest) = body.trim_start().strip_prefix("gotype:") else {
            return Ok(());
        };
        let path = rest.trim();
        let path_index = token
            .position
            .text
            .find(path)
            .unwrap_or(token.position.text.len());
        let position = sub_position(&token.position, path_index, path.len());
        if !type_path_is_valid(path) {
            return Err(ParseError::new(
                ParseErrorKind::MalformedTypeHint(path.to_string()),
                position,
            ));
        }
        let hint = TypeHint {
            type_path: path.to_string(),
            position: position.clone(),
        };
        let block = self.current_block();
        if block.type_hint.is_some() {
            return Err(ParseError::new(ParseErrorKind::DuplicateTypeHint, position));
        }
        block.type_hint = Some(hint);
        Ok(())
    }

    /// Parse a pipeline expression: stages separated by `|`, each stage a
    /// head (field chain, function name, variable, or literal) followed by
    /// its explicit arguments. Each stage's occurrence is threaded into the
    /// next stage's `pipe_arguments` as the leading receiver.
    fn parse_pipeline(&mut self, tokens: &[Token]) {
        let scope = self.scope();
        let mut previous: Option<PipeArgument> = None;

        for stage in tokens.split(|token| token.kind == TokenKind::Pipe) {
            let stage = skip_declaration(stage);
            let Some(head) = stage.first() else {
                continue;
            };

            // Literal-headed stage, e.g. `{{"x" | printf "%s"}}`.
            if let Some(kind) = literal_kind(head) {
                previous = Some(PipeArgument::Literal(kind));
                continue;
            }

            let name = match head.kind {
                TokenKind::Field => {
                    let name = head.position.text.trim_start_matches('.');
                    if name.is_empty() {
                        // A lone dot is the current context, not a reference
                        // that can be validated.
                        previous = None;
                        continue;
                    }
                    name.to_string()
                }
                TokenKind::Variable => head.position.text.trim_start_matches('$').to_string(),
                TokenKind::Ident => head.position.text.clone(),
                _ => continue,
            };

            let mut occurrence = VariableLocation {
                name,
                position: head.position.clone(),
                scope: scope.clone(),
                pipe_arguments: Vec::new(),
                method_arguments: Vec::new(),
            };
            if let Some(receiver) = previous.take() {
                occurrence.pipe_arguments.push(receiver);
            }

            for argument in &stage[1..] {
                match argument.kind {
                    TokenKind::Field | TokenKind::Variable => {
                        let Some(reference) = self.record_argument(argument, &scope) else {
                            continue;
                        };
                        occurrence
                            .pipe_arguments
                            .push(PipeArgument::Variable(Box::new(reference)));
                    }
                    TokenKind::Ident
                        if argument.position.text != "true" && argument.position.text != "false" =>
                    {
                        // Nested call, e.g. `printf "%d" (len .Items)`; the
                        // inner function is recorded as its own occurrence.
                        let inner = VariableLocation {
                            name: argument.position.text.clone(),
                            position: argument.position.clone(),
                            scope: scope.clone(),
                            pipe_arguments: Vec::new(),
                            method_arguments: Vec::new(),
                        };
                        self.current_block().functions.push(inner.clone());
                        occurrence
                            .pipe_arguments
                            .push(PipeArgument::Variable(Box::new(inner)));
                    }
                    _ => {
                        if let Some(kind) = literal_kind(argument) {
                            occurrence.pipe_arguments.push(PipeArgument::Literal(kind));
                            occurrence.method_arguments.push(kind);
                        }
                    }
                }
            }

            previous = Some(PipeArgument::Variable(Box::new(occurrence.clone())));
            let block = self.current_block();
            match head.kind {
                TokenKind::Ident => block.functions.push(occurrence),
                _ => block.variables.push(occurrence),
            }
        }
    }

    /// Record a field/variable argument as an occurrence of its own and
    /// return the snapshot referenced from the enclosing call.
    fn record_argument(&mut self, token: &Token, scope: &str) -> Option<VariableLocation> {
        let name = match token.kind {
            TokenKind::Field => token.position.text.trim_start_matches('.'),
            TokenKind::Variable => token.position.text.trim_start_matches('$'),
            _ => return None,
        };
        if name.is_empty() {
            return None;
        }
        let occurrence = VariableLocation {
            name: name.to_string(),
            position: token.position.clone(),
            scope: scope.to_string(),
            pipe_arguments: Vec::new(),
            method_arguments: Vec::new(),
        };
        self.current_block().variables.push(occurrence.clone());
        Some(occurrence)
    }
}

/// `$x := ...` binds a local; occurrences before the `:=` are declarations,
/// not references, so the stage starts after it.
fn skip_declaration(stage: &[Token]) -> &[Token] {
    match stage
        .iter()
        .position(|token| token.kind == TokenKind::Declare)
    {
        Some(index) => &stage[index + 1..],
        None => stage,
    }
}

fn literal_kind(token: &Token) -> Option<LiteralKind> {
    match token.kind {
        TokenKind::String => Some(LiteralKind::String),
        TokenKind::Number => {
            if token.position.text.contains('.') {
                Some(LiteralKind::Float)
            } else {
                Some(LiteralKind::Int)
            }
        }
        TokenKind::Ident if token.position.text == "true" || token.position.text == "false" => {
            Some(LiteralKind::Bool)
        }
        _ => None,
    }
}

fn strip_quotes(text: &str) -> &str {
    text.trim_matches(|ch| ch == '"' || ch == '`')
}

/// A hint path must split into `<import-path>.<TypeName>` where the import
/// path part actually looks like one (contains `.` or `/`). `invalid.Type`
/// is rejected; `example.com/app.Type` is accepted.
fn type_path_is_valid(path: &str) -> bool {
    let Some((package, type_name)) = path.rsplit_once('.') else {
        return false;
    };
    if package.is_empty() || type_name.is_empty() {
        return false;
    }
    package.contains('.') || package.contains('/')
}

/// Position of a slice of `parent.text`, with line/column re-derived from
/// any newlines before the slice.
fn sub_position(parent: &RawPosition, byte_index: usize, len: usize) -> RawPosition {
    let prefix = &parent.text[..byte_index.min(parent.text.len())];
    let newlines = prefix.bytes().filter(|b| *b == b'\n').count() as u32;
    let column = match prefix.rfind('\n') {
        Some(last) => prefix[last + 1..].chars().count() as u32 + 1,
        None => parent.column + prefix.chars().count() as u32,
    };
    let end = (byte_index + len).min(parent.text.len());
    RawPosition::new(
        &parent.text[byte_index.min(parent.text.len())..end],
        parent.offset + byte_index,
        parent.line + newlines,
        column,
    )
}
