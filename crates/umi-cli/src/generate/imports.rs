//! Turns import contributions into `import` statements.
//!
//! A contribution is either a module path or `{source, specifier?}`.

use serde_json::Value;

use crate::error::GenerateError;

pub fn import_to_str(import: &Value) -> Result<String, GenerateError> {
    match import {
        Value::String(source) => Ok(format!("import '{source}';")),
        Value::Object(map) => {
            let source = map.get("source").and_then(Value::as_str).ok_or_else(|| {
                GenerateError::InvalidImport(format!("missing 'source' in {import}"))
            })?;
            match map.get("specifier").and_then(Value::as_str) {
                Some(specifier) => Ok(format!("import {specifier} from '{source}';")),
                None => Ok(format!("import '{source}';")),
            }
        }
        other => Err(GenerateError::InvalidImport(format!(
            "expected a string or {{source, specifier}}, got {other}"
        ))),
    }
}

pub fn imports_to_str(imports: &[Value]) -> Result<Vec<String>, GenerateError> {
    imports.iter().map(import_to_str).collect()
}
