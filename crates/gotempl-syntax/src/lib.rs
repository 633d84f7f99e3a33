mod ast;
mod lexer;
mod parser;
#[cfg(test)]
mod tests;

pub use ast::{
    BlockInfo, LiteralKind, ParsedTemplateFile, PipeArgument, TypeHint, VariableLocation,
};
pub use lexer::{lex, Token, TokenKind};
pub use parser::{parse, ParseError, ParseErrorKind};
