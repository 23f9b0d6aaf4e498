//! Templates of the generated files, embedded in the binary.

use minijinja::{AutoEscape, Environment};
use rust_embed::RustEmbed;
use serde::Serialize;

use crate::error::GenerateError;

#[derive(RustEmbed)]
#[folder = "templates/"]
struct Templates;

/// Environment with every embedded template loaded.
///
/// Output is JavaScript assembled from plugin contributions, so nothing is
/// escaped.
pub fn environment() -> Result<Environment<'static>, GenerateError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_keep_trailing_newline(true);

    for name in Templates::iter() {
        let file = Templates::get(&name).ok_or_else(|| GenerateError::MissingTemplate {
            name: name.to_string(),
        })?;
        let source = String::from_utf8_lossy(file.data.as_ref()).into_owned();
        env.add_template_owned(name.to_string(), source)?;
    }
    Ok(env)
}

/// Renders one embedded template.
pub fn render<S: Serialize>(name: &str, ctx: S) -> Result<String, GenerateError> {
    let env = environment()?;
    render_with(&env, name, ctx)
}

pub(crate) fn render_with<S: Serialize>(
    env: &Environment<'_>,
    name: &str,
    ctx: S,
) -> Result<String, GenerateError> {
    let template = env.get_template(name).map_err(|e| match e.kind() {
        minijinja::ErrorKind::TemplateNotFound => GenerateError::MissingTemplate {
            name: name.to_string(),
        },
        _ => GenerateError::Render(e),
    })?;
    Ok(template.render(ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_templates_embedded() {
        let env = environment().unwrap();
        for name in ["router.js.j2", "umi.js.j2", "history.js.j2", "page.js.j2"] {
            assert!(env.get_template(name).is_ok(), "{name} missing");
        }
    }

    #[test]
    fn test_no_html_escaping() {
        let out = render(
            "history.js.j2",
            json!({"creator": "createHashHistory", "history": "createHashHistory({ a: '<b>' })"}),
        )
        .unwrap();
        assert!(out.contains("createHashHistory({ a: '<b>' })"));
    }

    #[test]
    fn test_missing_template() {
        let err = render("nope.j2", json!({})).unwrap_err();
        assert!(matches!(err, GenerateError::MissingTemplate { .. }));
    }
}
