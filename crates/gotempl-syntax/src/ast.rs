use serde::Serialize;

use gotempl_base::RawPosition;

/// The `{{/*gotype: <import-path>.<TypeName>*/}}` binding for one block.
/// `position.text` is the path exactly as written inside the comment.
#[derive(Debug, Clone, Serialize)]
pub struct TypeHint {
    pub type_path: String,
    pub position: RawPosition,
}

/// Go type of a literal pipeline argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LiteralKind {
    String,
    Int,
    Float,
    Bool,
}

impl LiteralKind {
    pub fn go_name(self) -> &'static str {
        match self {
            LiteralKind::String => "string",
            LiteralKind::Int => "int",
            LiteralKind::Float => "float64",
            LiteralKind::Bool => "bool",
        }
    }
}

impl std::fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.go_name())
    }
}

/// One argument flowing into a pipeline stage. Either a snapshot of another
/// occurrence in the same block (the piped-in receiver or a field argument)
/// or a literal with a known Go type. Exactly one variant by construction;
/// consumers match exhaustively.
#[derive(Debug, Clone, Serialize)]
pub enum PipeArgument {
    Variable(Box<VariableLocation>),
    Literal(LiteralKind),
}

/// A parsed reference to a variable (dotted field chain, `$name`) or a
/// function/method call at an exact source position.
///
/// `name` is `position.text` with the leading `.` or `$` stripped; the text
/// itself is the untouched source slice. `scope` is the dot-joined chain of
/// enclosing `range`/`with` constructs, empty at a block's top level.
///
/// For pipeline stages, `pipe_arguments` lists the piped-in receiver first
/// and then the explicit arguments left to right, so a hover renderer can
/// walk the chain without re-parsing. `method_arguments` keeps just the
/// literal argument types for signature checks.
#[derive(Debug, Clone, Serialize)]
pub struct VariableLocation {
    pub name: String,
    pub position: RawPosition,
    pub scope: String,
    pub pipe_arguments: Vec<PipeArgument>,
    pub method_arguments: Vec<LiteralKind>,
}

impl VariableLocation {
    /// The first stage of the pipeline this occurrence terminates, i.e. the
    /// leftmost receiver reached by following piped-in arguments.
    pub fn pipeline_root(&self) -> &VariableLocation {
        match self.pipe_arguments.first() {
            Some(PipeArgument::Variable(previous)) => previous.pipeline_root(),
            _ => self,
        }
    }
}

/// One template definition/body: the file's top level or a `{{define}}`.
/// A block owns at most one type hint and all occurrences found in it.
#[derive(Debug, Clone, Serialize)]
pub struct BlockInfo {
    pub name: String,
    pub position: RawPosition,
    pub type_hint: Option<TypeHint>,
    pub variables: Vec<VariableLocation>,
    pub functions: Vec<VariableLocation>,
}

impl BlockInfo {
    pub(crate) fn new(name: impl Into<String>, position: RawPosition) -> Self {
        Self {
            name: name.into(),
            position,
            type_hint: None,
            variables: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.type_hint.is_none() && self.variables.is_empty() && self.functions.is_empty()
    }
}

/// Immutable result of one parse call.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedTemplateFile {
    pub filename: String,
    pub blocks: Vec<BlockInfo>,
}

impl ParsedTemplateFile {
    /// Cursor query: the smallest occurrence covering `offset`, if any.
    pub fn occurrence_at(&self, offset: usize) -> Option<&VariableLocation> {
        let mut best: Option<&VariableLocation> = None;
        for block in &self.blocks {
            for occurrence in block.variables.iter().chain(block.functions.iter()) {
                if !occurrence.position.contains_offset(offset) {
                    continue;
                }
                match best {
                    Some(previous)
                        if previous.position.text.len() <= occurrence.position.text.len() => {}
                    _ => best = Some(occurrence),
                }
            }
        }
        best
    }
}
