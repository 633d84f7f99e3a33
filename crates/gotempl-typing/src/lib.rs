mod builtins;
mod describe;
mod errors;
mod registry;
mod resolve;
mod types;

pub use builtins::{builtin_function, builtin_functions};
pub use errors::{RegistryError, ResolveError};
pub use registry::{
    FieldDef, MemoryPackage, MemoryRegistry, MethodDef, PackageHandle, TypeDef, TypeRegistry,
};
pub use resolve::Resolver;
pub use types::{FieldInfo, GoType, MethodInfo, TypeInfo};
