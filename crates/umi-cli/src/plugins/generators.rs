//! Scaffolding generators available through `umi g`.

use anyhow::{bail, Context};
use serde_json::{json, Value};
use umi_hooks::{GeneratedFile, GeneratorContext, GeneratorSpec, PluginApi};

use crate::generate::templates;

pub fn apply(api: &mut PluginApi<'_>, _opts: &Value) -> anyhow::Result<()> {
    api.register_generator(
        "page",
        GeneratorSpec::new("Create a page component under the pages directory", generate_page),
    )?;
    Ok(())
}

fn generate_page(ctx: &GeneratorContext<'_>) -> anyhow::Result<Vec<GeneratedFile>> {
    let name = ctx.name.trim_matches('/');
    validate_page_name(name)?;

    let component = component_name(name);
    let contents = templates::render("page.js.j2", json!({ "component": component }))
        .with_context(|| format!("failed to render page '{name}'"))?;

    let path = ctx.paths.abs_pages_path.join(format!("{name}.js"));
    Ok(vec![GeneratedFile::new(path, contents)])
}

fn validate_page_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty() {
        bail!("page name must not be empty");
    }
    for segment in name.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            bail!("invalid page name '{name}'");
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '$')
        {
            bail!("page name '{name}' may only contain letters, digits, '-', '_' and '$'");
        }
    }
    Ok(())
}

/// `users/order-list` → `OrderList`.
fn component_name(name: &str) -> String {
    let last = name.rsplit('/').next().unwrap_or(name);
    let mut out = String::with_capacity(last.len());
    let mut upper = true;
    for c in last.chars() {
        if c.is_ascii_alphanumeric() {
            if upper {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
            upper = false;
        } else {
            upper = true;
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "Page");
    }
    out
}
