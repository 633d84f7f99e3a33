use std::fmt::Write as _;

use gotempl_base::AnalysisContext;

use crate::errors::ResolveError;
use crate::registry::{MethodDef, TypeDef};
use crate::resolve::Resolver;
use crate::types::GoType;

const INDENT: &str = "    ";

impl Resolver<'_> {
    /// Render a hinted type as a Go-style declaration with nested structs
    /// expanded inline, in declaration order. Recursive types are cut off
    /// at the repeated name and shown by reference instead.
    pub fn describe_type(
        &self,
        ctx: &AnalysisContext,
        type_path: &str,
    ) -> Result<String, ResolveError> {
        let def = self.type_def(ctx, type_path)?;
        if !def.is_struct {
            return Err(ResolveError::NotAStruct {
                type_path: type_path.to_string(),
            });
        }
        let mut out = String::new();
        let mut visited = vec![type_path.to_string()];
        let _ = write!(out, "type {} struct {{", def.name);
        self.describe_body(ctx, &def, 1, &mut visited, &mut out);
        out.push_str("\n}");
        Ok(out)
    }

    fn describe_body(
        &self,
        ctx: &AnalysisContext,
        def: &TypeDef,
        depth: usize,
        visited: &mut Vec<String>,
        out: &mut String,
    ) {
        let indent = INDENT.repeat(depth);
        for field in &def.fields {
            let _ = write!(out, "\n{indent}{} ", field.name);
            self.describe_field_type(ctx, &field.ty, depth, visited, out);
        }
        for method in &def.methods {
            let _ = write!(out, "\n{indent}{}", method_signature(method));
        }
    }

    /// Write one field's type, expanding a named struct inline behind its
    /// slice/array/pointer wrappers unless it is already on the path from
    /// the root (which would recurse forever).
    fn describe_field_type(
        &self,
        ctx: &AnalysisContext,
        ty: &GoType,
        depth: usize,
        visited: &mut Vec<String>,
        out: &mut String,
    ) {
        let mut inner = ty;
        let mut prefix = String::new();
        loop {
            match inner {
                GoType::Slice(elem) => {
                    prefix.push_str("[]");
                    inner = elem;
                }
                GoType::Array(len, elem) => {
                    let _ = write!(prefix, "[{len}]");
                    inner = elem;
                }
                GoType::Pointer(elem) => {
                    prefix.push('*');
                    inner = elem;
                }
                _ => break,
            }
        }
        if let GoType::Named { path, name } = inner {
            let type_path = format!("{path}.{name}");
            if !visited.contains(&type_path) {
                if let Ok(def) = self.type_def(ctx, &type_path) {
                    if def.is_struct {
                        visited.push(type_path);
                        let _ = write!(out, "{prefix}struct {{");
                        self.describe_body(ctx, &def, depth + 1, visited, out);
                        let _ = write!(out, "\n{}}}", INDENT.repeat(depth));
                        visited.pop();
                        return;
                    }
                }
            }
        }
        let _ = write!(out, "{prefix}{inner}");
    }
}

fn method_signature(method: &MethodDef) -> String {
    let params = method
        .parameters
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    match method.results.as_slice() {
        [] => format!("{}({params})", method.name),
        [single] => format!("{}({params}) {single}", method.name),
        many => {
            let results = many
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}({params}) ({results})", method.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use gotempl_base::AnalysisContext;

    use crate::registry::{MemoryRegistry, TypeDef};
    use crate::resolve::Resolver;
    use crate::types::GoType;

    #[test]
    fn nested_structs_expand_with_indentation() {
        let mut registry = MemoryRegistry::new();
        let package = registry.package_mut("example.com/app/models");
        package.insert(
            TypeDef::strukt("User")
                .field("Name", GoType::basic("string"))
                .field(
                    "Address",
                    GoType::named("example.com/app/models", "Address"),
                )
                .method("GetJob", vec![], vec![GoType::basic("string")]),
        );
        package.insert(TypeDef::strukt("Address").field("Street", GoType::basic("string")));

        let resolver = Resolver::new(&registry);
        let ctx = AnalysisContext::new();
        let description = resolver
            .describe_type(&ctx, "example.com/app/models.User")
            .expect("describe");
        let expected = "type User struct {\n    Name string\n    Address struct {\n        Street string\n    }\n    GetJob() string\n}";
        assert_eq!(description, expected);
    }

    #[test]
    fn recursive_types_fall_back_to_the_reference() {
        let mut registry = MemoryRegistry::new();
        registry.package_mut("example.com/app/models").insert(
            TypeDef::strukt("Node")
                .field("Value", GoType::basic("int"))
                .field(
                    "Children",
                    GoType::slice(GoType::named("example.com/app/models", "Node")),
                ),
        );

        let resolver = Resolver::new(&registry);
        let ctx = AnalysisContext::new();
        let description = resolver
            .describe_type(&ctx, "example.com/app/models.Node")
            .expect("describe");
        let expected =
            "type Node struct {\n    Value int\n    Children []models.Node\n}";
        assert_eq!(description, expected);
    }

    #[test]
    fn non_struct_target_is_rejected() {
        let mut registry = MemoryRegistry::new();
        registry
            .package_mut("example.com/app/models")
            .insert(TypeDef::opaque("UserID"));
        let resolver = Resolver::new(&registry);
        let ctx = AnalysisContext::new();
        assert!(resolver
            .describe_type(&ctx, "example.com/app/models.UserID")
            .is_err());
    }
}
