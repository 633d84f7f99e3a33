use rustc_hash::FxHashMap;
use serde::Serialize;

/// Textual model of a Go type as the registry reports it. Rendering is the
/// contract: diagnostics and hovers print exactly what `Display` yields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum GoType {
    /// Predeclared types: `string`, `int`, `bool`, `float64`, ...
    Basic(String),
    /// A named type in some package, rendered `pkg.Name` with the short
    /// package name.
    Named { path: String, name: String },
    Slice(Box<GoType>),
    Array(usize, Box<GoType>),
    Map(Box<GoType>, Box<GoType>),
    Pointer(Box<GoType>),
    Func {
        params: Vec<GoType>,
        results: Vec<GoType>,
    },
    /// `any` / `interface{}`, used by builtin signatures.
    Any,
}

impl GoType {
    pub fn basic(name: &str) -> Self {
        GoType::Basic(name.to_string())
    }

    pub fn named(path: &str, name: &str) -> Self {
        GoType::Named {
            path: path.to_string(),
            name: name.to_string(),
        }
    }

    pub fn slice(elem: GoType) -> Self {
        GoType::Slice(Box::new(elem))
    }

    pub fn pointer(elem: GoType) -> Self {
        GoType::Pointer(Box::new(elem))
    }

    /// Short package qualifier: the last segment of an import path.
    fn short_package(path: &str) -> &str {
        path.rsplit('/').next().unwrap_or(path)
    }
}

impl std::fmt::Display for GoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoType::Basic(name) => f.write_str(name),
            GoType::Named { path, name } => {
                write!(f, "{}.{}", GoType::short_package(path), name)
            }
            GoType::Slice(elem) => write!(f, "[]{elem}"),
            GoType::Array(len, elem) => write!(f, "[{len}]{elem}"),
            GoType::Map(key, value) => write!(f, "map[{key}]{value}"),
            GoType::Pointer(elem) => write!(f, "*{elem}"),
            GoType::Func { params, results } => {
                f.write_str("func(")?;
                for (index, param) in params.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                f.write_str(")")?;
                match results.len() {
                    0 => Ok(()),
                    1 => write!(f, " {}", results[0]),
                    _ => {
                        f.write_str(" (")?;
                        for (index, result) in results.iter().enumerate() {
                            if index > 0 {
                                f.write_str(", ")?;
                            }
                            write!(f, "{result}")?;
                        }
                        f.write_str(")")
                    }
                }
            }
            GoType::Any => f.write_str("any"),
        }
    }
}

/// Signature of a struct method or a builtin template function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodInfo {
    pub name: String,
    pub parameters: Vec<GoType>,
    pub results: Vec<GoType>,
}

impl MethodInfo {
    pub fn new(name: &str, parameters: Vec<GoType>, results: Vec<GoType>) -> Self {
        Self {
            name: name.to_string(),
            parameters,
            results,
        }
    }

    /// The single result type, when the signature has exactly one.
    pub fn single_result(&self) -> Option<&GoType> {
        match self.results.as_slice() {
            [result] => Some(result),
            _ => None,
        }
    }
}

/// One entry of a type's field/method surface. Methods are fields whose
/// `method` is set; for a single-result method `ty` is that result type so
/// path navigation treats `.Foo` uniformly.
#[derive(Debug, Clone, Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub ty: GoType,
    pub method: Option<MethodInfo>,
}

impl FieldInfo {
    pub fn is_method(&self) -> bool {
        self.method.is_some()
    }
}

/// Resolved field/method surface of one struct type.
#[derive(Debug, Clone, Serialize)]
pub struct TypeInfo {
    pub name: String,
    pub fields: FxHashMap<String, FieldInfo>,
}
