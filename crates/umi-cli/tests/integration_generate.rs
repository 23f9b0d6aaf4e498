//! Integration tests for plugin loading and file generation.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;
use umi_cli::commands::external::run_command;
use umi_cli::commands::generator::run_generator;
use umi_cli::generate::FilesGenerator;
use umi_cli::service::{Service, ServiceOptions};
use umi_cli::{CliError, GenerateError};
use umi_hooks::{
    CommandSpec, CompositionKind, Contribution, HookError, MethodOptions, Modifier,
    PluginDescriptor,
};

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "export default () => null;\n").unwrap();
}

fn service_with(root: &Path, plugins: Vec<PluginDescriptor>) -> Service {
    Service::new(
        root,
        ServiceOptions {
            plugins,
            ..ServiceOptions::default()
        },
    )
}

fn generate(service: &Service) -> umi_cli::generate::GenerateReport {
    let mut generator = FilesGenerator::new(service.host(), service.config()).unwrap();
    generator.generate().unwrap()
}

fn read_tmp(service: &Service, name: &str) -> String {
    fs::read_to_string(service.paths().abs_tmp_dir_path.join(name)).unwrap()
}

#[test]
fn test_generate_writes_entry_router_and_history() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "src/pages/index.js");
    touch(temp.path(), "src/pages/users/$id.js");

    let mut service = service_with(temp.path(), Vec::new());
    service.init().unwrap();
    let report = generate(&service);

    let tmp = temp.path().join("src/pages/.umi");
    assert_eq!(
        report.written,
        vec![tmp.join("router.js"), tmp.join("umi.js"), tmp.join("history.js")]
    );

    let router = read_tmp(&service, "router.js");
    assert!(router.contains("\"path\": \"/users/:id\""));
    assert!(router.contains("require('../index.js').default"));
    assert!(router.contains("let Router = DefaultRouter;"));

    let entry = read_tmp(&service, "umi.js");
    assert!(entry.contains("document.getElementById('root')"));

    let history = read_tmp(&service, "history.js");
    assert!(history.contains("createBrowserHistory({ basename: window.routerBase })"));
}

#[test]
fn test_second_generation_leaves_files_untouched() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "src/pages/index.js");

    let mut service = service_with(temp.path(), Vec::new());
    service.init().unwrap();
    let mut generator = FilesGenerator::new(service.host(), service.config()).unwrap();

    let first = generator.generate().unwrap();
    assert_eq!(first.written.len(), 3);
    let second = generator.generate().unwrap();
    assert!(second.written.is_empty());
    assert_eq!(second.unchanged.len(), 3);

    let mut fresh = FilesGenerator::new(service.host(), service.config()).unwrap();
    assert!(fresh.generate().unwrap().written.is_empty());
}

#[test]
fn test_plugin_contributions_reach_the_entry() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "src/pages/index.js");

    let plugin = PluginDescriptor::new("user:antd", |api, _opts| {
        api.add_entry_import(json!({"source": "antd", "specifier": "{ Button }"}))?;
        api.add_entry_polyfill_imports(json!("core-js/stable"))?;
        api.add_entry_code(json!("window.ready = true;"))?;
        api.add_version_info(json!("antd: 4.0.0"))?;
        api.add_runtime_plugin_key(json!("dva"))?;
        api.add_renderer_wrapper_with_component(json!("antd/es/config-provider"))?;
        api.modify_entry_render(Modifier::apply(|render, _| {
            Ok(json!(format!("console.log('render');\n  {}", render.as_str().unwrap_or_default())))
        }))?;
        api.modify_router_root_component(Modifier::replace(json!("require('dva/router').Router")))?;
        Ok(())
    });

    let mut service = service_with(temp.path(), vec![plugin]);
    service.init().unwrap();
    generate(&service);

    let entry = read_tmp(&service, "umi.js");
    assert!(entry.starts_with("import 'core-js/stable';"));
    assert!(entry.contains("import { Button } from 'antd';"));
    assert!(entry.contains("window.ready = true;"));
    assert!(entry.contains("// antd: 4.0.0"));
    assert!(entry.contains("\"dva\""));
    assert!(entry.contains("console.log('render');"));

    let router = read_tmp(&service, "router.js");
    assert!(router.contains("import RendererWrapper0 from 'antd/es/config-provider';"));
    assert!(router.contains("<RendererWrapper0>"));
    assert!(router.contains("let Router = require('dva/router').Router;"));
}

#[test]
fn test_config_drives_mount_element_history_and_routes() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".umirc.toml"),
        r#"
mountElementId = "app"
history = "hash"

[[routes]]
path = "/"
component = "./home"
"#,
    )
    .unwrap();

    let mut service = service_with(temp.path(), Vec::new());
    service.init().unwrap();
    generate(&service);

    assert!(read_tmp(&service, "umi.js").contains("document.getElementById('app')"));
    assert!(read_tmp(&service, "history.js").contains("createHashHistory"));
    assert!(read_tmp(&service, "router.js").contains("require('../home').default"));
}

#[test]
fn test_modify_routes_sees_scanned_routes() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "src/pages/index.js");

    let plugin = PluginDescriptor::new("user:routes", |api, _| {
        api.modify_routes(Modifier::apply(|routes, _| {
            let mut routes = routes.as_array().cloned().unwrap_or_default();
            routes.push(json!({"path": "/login", "component": "./login-page"}));
            Ok(Value::Array(routes))
        }))?;
        Ok(())
    });

    let mut service = service_with(temp.path(), vec![plugin]);
    service.init().unwrap();
    generate(&service);

    let router = read_tmp(&service, "router.js");
    assert!(router.contains("\"path\": \"/login\""));
    assert!(router.contains("require('./login-page').default"));
}

#[test]
fn test_production_uses_its_own_tmp_dir() {
    let temp = TempDir::new().unwrap();
    let mut service = Service::new(
        temp.path(),
        ServiceOptions {
            production: true,
            ..ServiceOptions::default()
        },
    );
    service.init().unwrap();
    generate(&service);
    assert!(temp.path().join("pages/.umi-production/umi.js").is_file());
}

#[test]
fn test_registered_plugins_load_after_their_parent() {
    let temp = TempDir::new().unwrap();
    let order = Arc::new(Mutex::new(Vec::new()));

    let child_order = Arc::clone(&order);
    let parent_order = Arc::clone(&order);
    let parent = PluginDescriptor::new("user:parent", move |api, _| {
        parent_order.lock().push(api.id().to_string());
        let child_order = Arc::clone(&child_order);
        api.register_plugin(
            PluginDescriptor::new("parent-child", move |api, opts| {
                child_order.lock().push(format!("{}:{}", api.id(), opts["flag"]));
                Ok(())
            })
            .with_opts(json!({"flag": true})),
        )?;
        Ok(())
    });

    let mut service = service_with(temp.path(), vec![parent]);
    service.init_plugins().unwrap();

    assert_eq!(*order.lock(), vec!["user:parent", "parent-child:true"]);
    assert_eq!(
        service.plugin_ids(),
        [
            "built-in:mountElementId",
            "built-in:mock",
            "built-in:generators",
            "user:parent",
            "parent-child",
        ]
    );
}

#[test]
fn test_loaded_plugin_cannot_be_queued_again() {
    let temp = TempDir::new().unwrap();
    let x_runs = Arc::new(Mutex::new(0));

    let runs = Arc::clone(&x_runs);
    let parent = PluginDescriptor::new("user:parent", move |api, _| {
        let runs = Arc::clone(&runs);
        api.register_plugin(PluginDescriptor::new("x", move |api, _| {
            *runs.lock() += 1;
            api.register_plugin(PluginDescriptor::new("y", |api, _| {
                api.register_plugin(PluginDescriptor::new("x", |_, _| Ok(())))?;
                Ok(())
            }))?;
            Ok(())
        }))?;
        Ok(())
    });

    let mut service = service_with(temp.path(), vec![parent]);
    let err = service.init_plugins().unwrap_err();

    assert_eq!(*x_runs.lock(), 1);
    match err {
        CliError::PluginSetup { id, source } => {
            assert_eq!(id, "y");
            assert!(matches!(
                source.downcast_ref::<HookError>(),
                Some(HookError::DuplicatePlugin { id }) if id == "x"
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_plugin_queueing_itself_fails_instead_of_looping() {
    fn requeue(api: &mut umi_hooks::PluginApi<'_>, _: &Value) -> anyhow::Result<()> {
        api.register_plugin(PluginDescriptor::new("again", requeue))?;
        Ok(())
    }

    let temp = TempDir::new().unwrap();
    let parent = PluginDescriptor::new("user:parent", |api, _| {
        api.register_plugin(PluginDescriptor::new("again", requeue))?;
        Ok(())
    });

    let mut service = service_with(temp.path(), vec![parent]);
    let err = service.init_plugins().unwrap_err();
    assert!(matches!(err, CliError::PluginSetup { ref id, .. } if id == "again"));
}

#[test]
fn test_duplicate_user_plugin_ids_are_rejected() {
    let temp = TempDir::new().unwrap();
    let plugin = || PluginDescriptor::new("user:twice", |_, _| Ok(()));

    let mut service = service_with(temp.path(), vec![plugin(), plugin()]);
    let err = service.init_plugins().unwrap_err();
    assert!(matches!(err, CliError::Hook(HookError::DuplicatePlugin { .. })));
}

#[test]
fn test_failing_plugin_setup_names_the_plugin() {
    let temp = TempDir::new().unwrap();
    let plugin = PluginDescriptor::new("user:broken", |_, _| anyhow::bail!("missing peer dependency"));

    let mut service = service_with(temp.path(), vec![plugin]);
    let err = service.init().unwrap_err();
    match err {
        CliError::PluginSetup { id, source } => {
            assert_eq!(id, "user:broken");
            assert!(source.to_string().contains("missing peer dependency"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_handler_failure_aborts_generation() {
    let temp = TempDir::new().unwrap();
    let plugin = PluginDescriptor::new("user:faulty", |api, _| {
        api.add_entry_code(Contribution::computed(|_, _| anyhow::bail!("boom")))?;
        Ok(())
    });

    let mut service = service_with(temp.path(), vec![plugin]);
    service.init().unwrap();
    let mut generator = FilesGenerator::new(service.host(), service.config()).unwrap();
    let err = generator.generate().unwrap_err();

    match err {
        GenerateError::Hook(HookError::HandlerExecution { point, plugin, .. }) => {
            assert_eq!(point, "addEntryCode");
            assert_eq!(plugin, "user:faulty");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!service.paths().abs_tmp_dir_path.join("umi.js").exists());
}

#[test]
fn test_custom_method_shared_between_plugins() {
    let temp = TempDir::new().unwrap();
    let owner = PluginDescriptor::new("user:owner", |api, _| {
        api.register_method("addLocale", MethodOptions::kind(CompositionKind::Accumulate))?;
        api.call_method("addLocale", Contribution::literal(json!("en-US")))?;
        Ok(())
    });
    let consumer = PluginDescriptor::new("user:consumer", |api, _| {
        api.register_method("addLocale", MethodOptions::kind(CompositionKind::Accumulate))?;
        api.call_method("addLocale", Contribution::literal(json!("zh-CN")))?;
        Ok(())
    });

    let mut service = service_with(temp.path(), vec![owner, consumer]);
    service.init().unwrap();
    let locales = service.host().collect("addLocale", Value::Null).unwrap();
    assert_eq!(locales, vec![json!("en-US"), json!("zh-CN")]);
}

#[test]
fn test_page_generator_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    let mut service = service_with(temp.path(), Vec::new());
    service.init().unwrap();

    let written = run_generator(&service, "page", "users/list", &[]).unwrap();
    assert_eq!(written, vec![temp.path().join("pages/users/list.js")]);
    assert!(fs::read_to_string(&written[0]).unwrap().contains("function List()"));

    let err = run_generator(&service, "page", "users/list", &[]).unwrap_err();
    assert!(matches!(err, CliError::Generate(GenerateError::AlreadyExists(_))));

    let err = run_generator(&service, "layout", "x", &[]).unwrap_err();
    match err {
        CliError::UnknownGenerator { name, available } => {
            assert_eq!(name, "layout");
            assert_eq!(available, "page");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_plugin_command_through_modify_command() {
    let temp = TempDir::new().unwrap();
    let calls = Arc::new(Mutex::new(Vec::new()));

    let seen = Arc::clone(&calls);
    let plugin = PluginDescriptor::new("user:hello", move |api, _| {
        let seen = Arc::clone(&seen);
        api.register_command(
            "hello",
            CommandSpec::new("Say hello", move |ctx| {
                seen.lock().push(ctx.args.join(" "));
                Ok(())
            }),
        )?;
        api._modify_command(Modifier::apply(|mut invocation, _| {
            if invocation["name"] == "hi" {
                invocation["name"] = json!("hello");
            }
            Ok(invocation)
        }))?;
        Ok(())
    });

    let mut service = service_with(temp.path(), vec![plugin]);
    service.init().unwrap();

    run_command(&service, vec!["hi".into(), "there".into()]).unwrap();
    assert_eq!(*calls.lock(), vec!["there"]);

    let err = run_command(&service, vec!["bye".into()]).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("unknown command 'bye'"));
    assert!(message.contains("hello"));
    assert!(message.contains("Say hello"));
}
