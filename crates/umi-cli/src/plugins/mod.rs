//! Plugins that ship with the CLI.

pub mod generators;
pub mod mock;
pub mod mount_element_id;

use umi_hooks::PluginDescriptor;

/// Built-in plugins in load order.
pub fn builtin_plugins() -> Vec<PluginDescriptor> {
    vec![
        PluginDescriptor::new("built-in:mountElementId", mount_element_id::apply),
        PluginDescriptor::new("built-in:mock", mock::apply),
        PluginDescriptor::new("built-in:generators", generators::apply),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_use_reserved_prefix() {
        let plugins = builtin_plugins();
        assert_eq!(plugins.len(), 3);
        assert!(plugins.iter().all(|p| p.id.starts_with("built-in:")));
    }
}
