use gotempl_base::{AnalysisContext, Diagnostic, Diagnostics, Severity};
use gotempl_syntax::{BlockInfo, ParsedTemplateFile};
use gotempl_typing::{GoType, Resolver, TypeRegistry};

/// Validate every block of a parsed template against the registry and
/// return positioned diagnostics.
///
/// Output order is a contract: blocks in file order, and inside a block the
/// type hint first, then variables, then functions, each in encounter
/// order. Per-occurrence resolution failures become error diagnostics and
/// analysis of the block continues; only an unresolvable hint or a registry
/// failure stops the block, and sibling blocks still run.
pub fn generate(
    ctx: &AnalysisContext,
    parsed: &ParsedTemplateFile,
    registry: &dyn TypeRegistry,
) -> Diagnostics {
    let resolver = Resolver::new(registry);
    let mut diagnostics = Diagnostics::default();
    for (index, block) in parsed.blocks.iter().enumerate() {
        // A file made only of `{{define}}` blocks has an empty implicit
        // top-level block; warning about its missing hint would be noise.
        if index == 0 && block.is_empty() && parsed.blocks.len() > 1 {
            continue;
        }
        generate_for_block(ctx, &resolver, block, &mut diagnostics);
    }
    diagnostics
}

fn generate_for_block(
    ctx: &AnalysisContext,
    resolver: &Resolver<'_>,
    block: &BlockInfo,
    diagnostics: &mut Diagnostics,
) {
    let Some(hint) = &block.type_hint else {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "No type hint found in template",
            block.position.clone(),
        ));
        return;
    };

    let info = match resolver.build_type_info(ctx, &hint.type_path) {
        Ok(info) => info,
        Err(error) => {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                format!("failed to load type hint `{}`: {error}", hint.type_path),
                hint.position.clone(),
            ));
            return;
        }
    };
    diagnostics.push(Diagnostic::new(
        Severity::Information,
        format!("type hint successfully loaded: {}", hint.type_path),
        hint.position.clone(),
    ));

    for variable in &block.variables {
        // `$` locals are bound inside the template, not on the hinted type.
        if variable.position.text.starts_with('$') {
            continue;
        }
        match resolver.resolve_field_path(ctx, &info, &variable.name) {
            Ok(field) => {
                let message = match &field.method {
                    Some(method) => format!("Returns: {}", render_results(&method.results)),
                    None => format!("Type: {}", field.ty),
                };
                diagnostics.push(Diagnostic::new(
                    Severity::Hint,
                    message,
                    variable.position.clone(),
                ));
            }
            Err(error) => {
                let stop = error.is_registry_failure();
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    error.to_string(),
                    variable.position.clone(),
                ));
                if stop {
                    return;
                }
            }
        }
    }

    for function in &block.functions {
        // `{{template "name"}}` invokes another block, not a function.
        if function.name == "template" {
            continue;
        }
        match resolver.resolve_method(&function.name) {
            Ok(method) => {
                diagnostics.push(Diagnostic::new(
                    Severity::Hint,
                    format!("Returns: {}", render_results(&method.results)),
                    function.position.clone(),
                ));
            }
            Err(error) => {
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    error.to_string(),
                    function.position.clone(),
                ));
            }
        }
    }
}

fn render_results(results: &[GoType]) -> String {
    match results {
        [] => "()".to_string(),
        [single] => single.to_string(),
        many => {
            let joined = many
                .iter()
                .map(|ty| ty.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!("({joined})")
        }
    }
}
