use rustc_hash::FxHashMap;

use gotempl_base::AnalysisContext;

use crate::errors::RegistryError;
use crate::types::GoType;

/// A struct field as declared.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub ty: GoType,
}

/// A method as declared on a named type.
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: String,
    pub parameters: Vec<GoType>,
    pub results: Vec<GoType>,
}

/// Declared surface of one named type, in declaration order. `is_struct`
/// is false for named non-struct types (aliases of basics, interfaces),
/// which are not valid hint targets.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
    pub is_struct: bool,
}

impl TypeDef {
    pub fn strukt(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
            methods: Vec::new(),
            is_struct: true,
        }
    }

    pub fn opaque(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
            methods: Vec::new(),
            is_struct: false,
        }
    }

    pub fn field(mut self, name: &str, ty: GoType) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            ty,
        });
        self
    }

    pub fn method(mut self, name: &str, parameters: Vec<GoType>, results: Vec<GoType>) -> Self {
        self.methods.push(MethodDef {
            name: name.to_string(),
            parameters,
            results,
        });
        self
    }
}

/// One resolved package: named types by name.
pub trait PackageHandle {
    fn import_path(&self) -> &str;
    fn lookup(&self, name: &str) -> Option<&TypeDef>;
}

/// The external type-intelligence collaborator. The production
/// implementation fronts a real Go analyzer; the core only ever talks
/// through this capability so it can be tested hermetically.
pub trait TypeRegistry {
    fn package(
        &self,
        ctx: &AnalysisContext,
        import_path: &str,
    ) -> Result<&dyn PackageHandle, RegistryError>;
}

/// In-memory package for tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct MemoryPackage {
    import_path: String,
    types: FxHashMap<String, TypeDef>,
}

impl MemoryPackage {
    pub fn insert(&mut self, def: TypeDef) -> &mut Self {
        self.types.insert(def.name.clone(), def);
        self
    }
}

impl PackageHandle for MemoryPackage {
    fn import_path(&self) -> &str {
        &self.import_path
    }

    fn lookup(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }
}

/// Hand-built registry, the hermetic stand-in for a real analyzer.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    packages: FxHashMap<String, MemoryPackage>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn package_mut(&mut self, import_path: &str) -> &mut MemoryPackage {
        self.packages
            .entry(import_path.to_string())
            .or_insert_with(|| MemoryPackage {
                import_path: import_path.to_string(),
                types: FxHashMap::default(),
            })
    }
}

impl TypeRegistry for MemoryRegistry {
    fn package(
        &self,
        ctx: &AnalysisContext,
        import_path: &str,
    ) -> Result<&dyn PackageHandle, RegistryError> {
        if ctx.is_cancelled() {
            return Err(RegistryError::Cancelled);
        }
        self.packages
            .get(import_path)
            .map(|package| package as &dyn PackageHandle)
            .ok_or_else(|| RegistryError::NotFound(import_path.to_string()))
    }
}
