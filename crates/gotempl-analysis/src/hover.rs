use gotempl_base::RawPosition;
use gotempl_syntax::{PipeArgument, VariableLocation};
use gotempl_typing::{GoType, MethodInfo};

/// Precondition failures of the hover formatter. These are caller bugs,
/// not document problems, so they are errors rather than diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverError {
    NilOccurrence,
    NothingToRender,
}

impl std::fmt::Display for HoverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoverError::NilOccurrence => f.write_str("hover requested for a nil occurrence"),
            HoverError::NothingToRender => {
                f.write_str("hover occurrence carries neither a method nor a type description")
            }
        }
    }
}

impl std::error::Error for HoverError {}

/// Markdown sections for one hover popup, in display order, plus the span
/// the popup is anchored to. The transport layer joins and encodes them.
#[derive(Debug, Clone)]
pub struct HoverInfo {
    pub content: Vec<String>,
    pub position: RawPosition,
}

impl HoverInfo {
    pub fn markdown(&self) -> String {
        self.content.join("\n\n")
    }
}

/// Render a hover popup for one occurrence.
///
/// A call site (`method` supplied) gets a vertical pipeline diagram, a
/// Go-style signature block, and a reconstructed usage line. A plain field
/// access gets the supplied struct description instead, with no diagram.
/// Output depends only on the arguments, so identical inputs render
/// identical bytes.
pub fn format_hover_response(
    occurrence: Option<&VariableLocation>,
    method: Option<&MethodInfo>,
    type_description: Option<&str>,
) -> Result<HoverInfo, HoverError> {
    let Some(occurrence) = occurrence else {
        return Err(HoverError::NilOccurrence);
    };

    if let Some(method) = method {
        let mut content = Vec::with_capacity(3);
        content.push(pipeline_diagram(occurrence));
        content.push(format!("```go\n{}\n```", signature(method)));
        content.push(format!(
            "Template Usage\n```gotemplate\n{}\n```",
            usage(occurrence)
        ));
        return Ok(HoverInfo {
            content,
            position: occurrence.position.clone(),
        });
    }

    let Some(description) = type_description else {
        return Err(HoverError::NothingToRender);
    };
    Ok(HoverInfo {
        content: vec![format!("```go\n{description}\n```")],
        position: occurrence.position.clone(),
    })
}

/// The stages feeding this occurrence, leftmost first, ending with the
/// occurrence itself. Each stage is its exact source text; a literal stage
/// shows its Go type name instead.
fn stage_texts(occurrence: &VariableLocation) -> Vec<String> {
    let mut stages = vec![occurrence.position.text.clone()];
    let mut current = occurrence;
    while let Some(first) = current.pipe_arguments.first() {
        match first {
            PipeArgument::Variable(previous) => {
                stages.push(previous.position.text.clone());
                current = previous;
            }
            PipeArgument::Literal(kind) => {
                stages.push(kind.go_name().to_string());
                break;
            }
        }
    }
    stages.reverse();
    stages
}

/// Vertical data-flow diagram: one line per stage, joined by connector
/// lines. A receiver-less call renders as its bare name.
fn pipeline_diagram(occurrence: &VariableLocation) -> String {
    stage_texts(occurrence).join("\n    │\n    ▼\n")
}

fn usage(occurrence: &VariableLocation) -> String {
    stage_texts(occurrence).join(" | ")
}

/// Go-style signature with positional `argN` parameter names. A single
/// result is bare, multiple results form a parenthesized tuple.
fn signature(method: &MethodInfo) -> String {
    let params = method
        .parameters
        .iter()
        .enumerate()
        .map(|(index, ty)| format!("arg{} {ty}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let mut rendered = format!("func {}({params})", method.name);
    match method.results.as_slice() {
        [] => {}
        [single] => {
            rendered.push(' ');
            rendered.push_str(&single.to_string());
        }
        many => {
            let results = many
                .iter()
                .map(GoType::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            rendered.push_str(&format!(" ({results})"));
        }
    }
    rendered
}
