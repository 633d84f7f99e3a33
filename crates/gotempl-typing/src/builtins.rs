use std::collections::HashMap;
use std::sync::OnceLock;

use crate::types::{GoType, MethodInfo};

static BUILTINS: OnceLock<HashMap<&'static str, MethodInfo>> = OnceLock::new();

/// The fixed table of builtin template functions. Seeded on first use and
/// immutable afterwards, so concurrent analyses share it without locking.
pub fn builtin_functions() -> &'static HashMap<&'static str, MethodInfo> {
    BUILTINS.get_or_init(|| {
        let string = || GoType::basic("string");
        let int = || GoType::basic("int");
        let boolean = || GoType::basic("bool");

        let mut table = HashMap::new();
        let mut insert = |name: &'static str, parameters: Vec<GoType>, results: Vec<GoType>| {
            table.insert(name, MethodInfo::new(name, parameters, results));
        };

        insert("upper", vec![string()], vec![string()]);
        insert("and", vec![GoType::Any, GoType::Any], vec![GoType::Any]);
        insert("call", vec![GoType::Any], vec![GoType::Any]);
        insert("html", vec![GoType::Any], vec![string()]);
        insert("index", vec![GoType::Any, GoType::Any], vec![GoType::Any]);
        insert("slice", vec![GoType::Any, int(), int()], vec![GoType::Any]);
        insert("js", vec![GoType::Any], vec![string()]);
        insert("len", vec![GoType::Any], vec![int()]);
        insert("not", vec![GoType::Any], vec![boolean()]);
        insert("or", vec![GoType::Any, GoType::Any], vec![GoType::Any]);
        insert("print", vec![GoType::Any], vec![string()]);
        insert("printf", vec![string(), GoType::Any], vec![string()]);
        insert("println", vec![GoType::Any], vec![string()]);
        insert("urlquery", vec![GoType::Any], vec![string()]);
        insert("eq", vec![GoType::Any, GoType::Any], vec![boolean()]);
        insert("ge", vec![GoType::Any, GoType::Any], vec![boolean()]);
        insert("gt", vec![GoType::Any, GoType::Any], vec![boolean()]);
        insert("le", vec![GoType::Any, GoType::Any], vec![boolean()]);
        insert("lt", vec![GoType::Any, GoType::Any], vec![boolean()]);
        insert("ne", vec![GoType::Any, GoType::Any], vec![boolean()]);
        table
    })
}

pub fn builtin_function(name: &str) -> Option<&'static MethodInfo> {
    builtin_functions().get(name)
}
