//! Built-in extension points and their typed facade methods.
//!
//! One table drives both the list installed on every [`PluginApi`] at
//! construction and the strongly typed registration methods plugins call.
//! Entries marked `as Kind` carry an explicit kind; all others are
//! classified from their name when installed.

use crate::api::PluginApi;
use crate::catalog::BuiltinMethod;
use crate::error::Result;
use crate::handler::{CallArgs, Contribution, HookArgs, Listener, Modifier};
use crate::kind::CompositionKind;

macro_rules! builtin_methods {
    (@declared) => { None };
    (@declared $kind:ident) => { Some(CompositionKind::$kind) };

    (@shape contribute) => { CompositionKind::Accumulate };
    (@shape modify) => { CompositionKind::Transform };
    (@shape listen) => { CompositionKind::Notify };

    (@method $(#[$meta:meta])* $method:ident, $name:literal, contribute) => {
        $(#[$meta])*
        pub fn $method(&mut self, contribution: impl Into<Contribution>) -> Result<()> {
            self.call_method($name, HookArgs::Contribute(contribution.into()))
        }
    };
    (@method $(#[$meta:meta])* $method:ident, $name:literal, modify) => {
        $(#[$meta])*
        pub fn $method(&mut self, modifier: impl Into<Modifier>) -> Result<()> {
            self.call_method($name, HookArgs::Modify(modifier.into()))
        }
    };
    (@method $(#[$meta:meta])* $method:ident, $name:literal, listen) => {
        $(#[$meta])*
        pub fn $method<F>(&mut self, listener: F) -> Result<()>
        where
            F: Fn(&CallArgs<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
        {
            self.call_method($name, HookArgs::Listen(Listener::new(listener)))
        }
    };

    ($( $(#[$meta:meta])* $method:ident => $name:literal : $shape:ident $(as $declared:ident)? ; )*) => {
        /// Built-in points in installation order.
        pub const BUILTIN_METHODS: &[BuiltinMethod] = &[
            $(
                BuiltinMethod {
                    name: $name,
                    declared: builtin_methods!(@declared $($declared)?),
                    shape: builtin_methods!(@shape $shape),
                },
            )*
        ];

        impl PluginApi<'_> {
            $(
                builtin_methods!(@method $(#[$meta])* $method, $name, $shape);
            )*
        }
    };
}

builtin_methods! {
    /// Notified with the bundler config chain. Declared explicitly since the
    /// name has no recognizable prefix.
    chain_webpack_config => "chainWebpackConfig": listen as Notify;
    /// Contributes `{name, schema, onChange?}` config validators.
    _register_config => "_registerConfig": contribute as Accumulate;
    on_start => "onStart": listen;
    on_dev_compile_done => "onDevCompileDone": listen;
    on_build_success => "onBuildSuccess": listen;
    on_build_fail => "onBuildFail": listen;
    add_page_watcher => "addPageWatcher": contribute;
    /// Code appended to the generated entry file.
    add_entry_code => "addEntryCode": contribute;
    /// Code prepended to the generated entry file.
    add_entry_code_ahead => "addEntryCodeAhead": contribute;
    add_entry_import => "addEntryImport": contribute;
    add_entry_import_ahead => "addEntryImportAhead": contribute;
    add_entry_polyfill_imports => "addEntryPolyfillImports": contribute;
    add_renderer_wrapper_with_component => "addRendererWrapperWithComponent": contribute;
    add_renderer_wrapper_with_module => "addRendererWrapperWithModule": contribute;
    add_router_import => "addRouterImport": contribute;
    add_router_import_ahead => "addRouterImportAhead": contribute;
    add_version_info => "addVersionInfo": contribute;
    add_ui_plugin => "addUIPlugin": contribute;
    modify_af_webpack_opts => "modifyAFWebpackOpts": modify;
    /// Replaces the expression that mounts the app.
    modify_entry_render => "modifyEntryRender": modify;
    modify_entry_history => "modifyEntryHistory": modify;
    modify_route_component => "modifyRouteComponent": modify;
    modify_router_root_component => "modifyRouterRootComponent": modify;
    modify_webpack_config => "modifyWebpackConfig": modify;
    /// Notified with `{host, port}` right before the dev server binds.
    _before_server_with_app => "_beforeServerWithApp": listen;
    before_dev_server => "beforeDevServer": listen;
    _before_dev_server_async => "_beforeDevServerAsync": listen;
    after_dev_server => "afterDevServer": listen;
    add_middleware_ahead => "addMiddlewareAhead": contribute;
    /// Contributes middleware descriptors (`{kind: ...}`) to the dev server.
    add_middleware => "addMiddleware": contribute;
    add_middleware_before_mock => "addMiddlewareBeforeMock": contribute;
    add_middleware_after_mock => "addMiddlewareAfterMock": contribute;
    modify_routes => "modifyRoutes": modify;
    on_patch_route => "onPatchRoute": listen;
    modify_html_context => "modifyHTMLContext": modify;
    add_html_meta => "addHTMLMeta": contribute;
    add_html_link => "addHTMLLink": contribute;
    add_html_script => "addHTMLScript": contribute;
    add_html_style => "addHTMLStyle": contribute;
    add_html_head_script => "addHTMLHeadScript": contribute;
    modify_html_chunks => "modifyHTMLChunks": modify;
    on_generate_files => "onGenerateFiles": listen;
    on_html_rebuild => "onHTMLRebuild": listen;
    /// Adjusts the default config before user config is merged over it.
    modify_default_config => "modifyDefaultConfig": modify;
    _modify_config => "_modifyConfig": modify;
    modify_html_with_ast => "modifyHTMLWithAST": modify;
    _modify_help_info => "_modifyHelpInfo": modify;
    add_runtime_plugin => "addRuntimePlugin": contribute;
    add_runtime_plugin_key => "addRuntimePluginKey": contribute;
    before_block_writing => "beforeBlockWriting": listen;
    _modify_block_package_json_path => "_modifyBlockPackageJSONPath": modify;
    _modify_block_dependencies => "_modifyBlockDependencies": modify;
    _modify_block_file => "_modifyBlockFile": modify;
    _modify_block_target => "_modifyBlockTarget": modify;
    _modify_command => "_modifyCommand": modify;
    _modify_block_new_route_config => "_modifyBlockNewRouteConfig": modify;
}
