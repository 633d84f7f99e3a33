/// Failures of the external registry collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    NotFound(String),
    Transport(String),
    Timeout,
    Cancelled,
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::NotFound(path) => write!(f, "package or type `{path}` not found"),
            RegistryError::Transport(message) => {
                write!(f, "type registry transport failure: {message}")
            }
            RegistryError::Timeout => f.write_str("type registry timed out"),
            RegistryError::Cancelled => f.write_str("analysis cancelled"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Failures of the cross-reference engine: a path or name could not be
/// mapped onto the resolved type surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    NotAStruct { type_path: String },
    FieldNotFound { segment: String, type_name: String },
    NotNavigable { segment: String },
    UnknownMethod { name: String },
    Registry(RegistryError),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::NotAStruct { type_path } => {
                write!(f, "type `{type_path}` is not a struct")
            }
            ResolveError::FieldNotFound { segment, type_name } => {
                write!(f, "field `{segment}` not found in type `{type_name}`")
            }
            ResolveError::NotNavigable { segment } => {
                write!(f, "cannot navigate into `{segment}`: not a struct or slice")
            }
            ResolveError::UnknownMethod { name } => {
                write!(f, "unknown function or method `{name}`")
            }
            ResolveError::Registry(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<RegistryError> for ResolveError {
    fn from(error: RegistryError) -> Self {
        ResolveError::Registry(error)
    }
}

impl ResolveError {
    /// Registry-level failures (transport, cancellation, missing package)
    /// stop a whole block's analysis; resolution failures only mark the one
    /// occurrence.
    pub fn is_registry_failure(&self) -> bool {
        matches!(self, ResolveError::Registry(_))
    }
}
