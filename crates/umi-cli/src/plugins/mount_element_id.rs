//! Registers the `mountElementId` config key and its default.

use serde_json::{json, Value};
use umi_hooks::{Modifier, PluginApi};

use crate::config::DEFAULT_MOUNT_ELEMENT_ID;

pub fn apply(api: &mut PluginApi<'_>, _opts: &Value) -> anyhow::Result<()> {
    api._register_config(json!({
        "name": "mountElementId",
        "schema": { "type": "string", "minLength": 1 },
        "onChange": "regenerate",
    }))?;

    api.modify_default_config(Modifier::apply(|mut memo, _| {
        if let Some(config) = memo.as_object_mut() {
            config
                .entry("mountElementId")
                .or_insert_with(|| json!(DEFAULT_MOUNT_ELEMENT_ID));
        }
        Ok(memo)
    }))?;

    Ok(())
}
