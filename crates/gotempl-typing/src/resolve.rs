use std::cell::RefCell;

use rustc_hash::FxHashMap;

use gotempl_base::AnalysisContext;

use crate::builtins::builtin_function;
use crate::errors::{RegistryError, ResolveError};
use crate::registry::{TypeDef, TypeRegistry};
use crate::types::{FieldInfo, GoType, MethodInfo, TypeInfo};

/// Cross-reference engine for one analysis call.
///
/// Expansion is lazy: a type's field/method surface is computed only when a
/// path actually visits it, and memoized per resolver so a document touching
/// the same type many times pays for it once. Caching across calls is the
/// registry's concern, not ours.
pub struct Resolver<'a> {
    registry: &'a dyn TypeRegistry,
    expanded: RefCell<FxHashMap<String, TypeInfo>>,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a dyn TypeRegistry) -> Self {
        Self {
            registry,
            expanded: RefCell::new(FxHashMap::default()),
        }
    }

    /// Resolve `<import-path>.<TypeName>` to its merged field/method
    /// surface. The named type must be a struct.
    pub fn build_type_info(
        &self,
        ctx: &AnalysisContext,
        type_path: &str,
    ) -> Result<TypeInfo, ResolveError> {
        if let Some(info) = self.expanded.borrow().get(type_path) {
            return Ok(info.clone());
        }
        let def = self.type_def(ctx, type_path)?;
        if !def.is_struct {
            return Err(ResolveError::NotAStruct {
                type_path: type_path.to_string(),
            });
        }
        let info = type_info_from_def(&def);
        self.expanded
            .borrow_mut()
            .insert(type_path.to_string(), info.clone());
        Ok(info)
    }

    /// Walk a dotted field path against a resolved type. Non-terminal
    /// slice/array segments substitute their element type (`range`
    /// semantics); non-terminal named structs are expanded on demand.
    pub fn resolve_field_path(
        &self,
        ctx: &AnalysisContext,
        root: &TypeInfo,
        path: &str,
    ) -> Result<FieldInfo, ResolveError> {
        let segments: Vec<&str> = path.split('.').collect();
        let mut current = root.clone();
        for (index, segment) in segments.iter().enumerate() {
            let field = current.fields.get(*segment).cloned().ok_or_else(|| {
                ResolveError::FieldNotFound {
                    segment: segment.to_string(),
                    type_name: current.name.clone(),
                }
            })?;
            if index + 1 == segments.len() {
                return Ok(field);
            }
            current = self.navigate(ctx, segment, &field.ty)?;
        }
        // Unreachable for non-empty paths; an empty path has one empty
        // segment and fails the lookup above.
        Err(ResolveError::FieldNotFound {
            segment: String::new(),
            type_name: root.name.clone(),
        })
    }

    /// Resolve a receiver-less call site against the builtin table. Struct
    /// methods are terminal fields of `resolve_field_path` instead, and a
    /// struct field always wins inside a hinted block.
    pub fn resolve_method(&self, name: &str) -> Result<&'static MethodInfo, ResolveError> {
        builtin_function(name).ok_or_else(|| ResolveError::UnknownMethod {
            name: name.to_string(),
        })
    }

    /// The surface to continue navigating through after a non-terminal
    /// segment of type `ty`.
    fn navigate(
        &self,
        ctx: &AnalysisContext,
        segment: &str,
        ty: &GoType,
    ) -> Result<TypeInfo, ResolveError> {
        let mut ty = ty;
        loop {
            match ty {
                GoType::Slice(elem) | GoType::Array(_, elem) | GoType::Pointer(elem) => {
                    ty = elem;
                }
                _ => break,
            }
        }
        match ty {
            GoType::Named { path, name } => {
                let type_path = format!("{path}.{name}");
                self.build_type_info(ctx, &type_path)
                    .map_err(|error| match error {
                        ResolveError::NotAStruct { .. } => ResolveError::NotNavigable {
                            segment: segment.to_string(),
                        },
                        other => other,
                    })
            }
            _ => Err(ResolveError::NotNavigable {
                segment: segment.to_string(),
            }),
        }
    }

    /// Declared form of a named type, straight from the registry.
    pub(crate) fn type_def(
        &self,
        ctx: &AnalysisContext,
        type_path: &str,
    ) -> Result<TypeDef, ResolveError> {
        if ctx.is_cancelled() {
            return Err(RegistryError::Cancelled.into());
        }
        let Some((package_path, type_name)) = type_path.rsplit_once('.') else {
            return Err(RegistryError::NotFound(type_path.to_string()).into());
        };
        let package = self.registry.package(ctx, package_path)?;
        package
            .lookup(type_name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(type_path.to_string()).into())
    }
}

/// Merge declared fields and methods into one lookup surface. A method with
/// exactly one result contributes that result as its navigable type; other
/// arities contribute a func type and stay terminal.
fn type_info_from_def(def: &TypeDef) -> TypeInfo {
    let mut fields = FxHashMap::default();
    for field in &def.fields {
        fields.insert(
            field.name.clone(),
            FieldInfo {
                name: field.name.clone(),
                ty: field.ty.clone(),
                method: None,
            },
        );
    }
    for method in &def.methods {
        let info = MethodInfo::new(&method.name, method.parameters.clone(), method.results.clone());
        let ty = match info.single_result() {
            Some(result) => result.clone(),
            None => GoType::Func {
                params: method.parameters.clone(),
                results: method.results.clone(),
            },
        };
        fields.insert(
            method.name.clone(),
            FieldInfo {
                name: method.name.clone(),
                ty,
                method: Some(info),
            },
        );
    }
    TypeInfo {
        name: def.name.to_string(),
        fields,
    }
}
