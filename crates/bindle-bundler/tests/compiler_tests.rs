//! End-to-end runs of the compiler against an in-memory runtime.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bindle_bundler::{
    BoxError, BuildError, Compiler, Error, GraphError, HookError, HookKind, Loader, LoaderRule,
    Module, ModuleId, Phase, Plugin, PluginApi, Registrar, hooks,
};
use helpers::{EventLog, test_config, test_runtime};

fn id(path: &str) -> ModuleId {
    ModuleId::new(path).unwrap()
}

#[tokio::test]
async fn test_scenario_index_imports_a() {
    let runtime = test_runtime(&[
        ("/src/index", "require('./a');\n"),
        ("/src/a", "module.exports = 'a';\n"),
    ]);
    let captured = Arc::new(parking_lot::Mutex::new(None));
    let sink = Arc::clone(&captured);

    let config = test_config(&runtime, "/src/index")
        .rule(LoaderRule::extension(
            "txt",
            Loader::new("uppercase", |text| Ok(text.to_uppercase())),
        ))
        .plugin(Plugin::callable("capture", move |api| {
            let sink = Arc::clone(&sink);
            api.tap(hooks::COMPILATION, |c| {
                assert_eq!(c.phase(), Phase::GraphAssembled);
                assert_eq!(c.graph().len(), 1);
                Ok(())
            })?;
            api.tap(hooks::EMIT, move |c| {
                *sink.lock() = Some(serde_json::to_value(c.graph().snapshot())?);
                Ok(())
            })?;
            Ok(())
        }));

    let outcome = Compiler::new(config).unwrap().run().await.unwrap();

    assert_eq!(outcome.entry, id("/src/index"));
    assert_eq!(outcome.module_count, 2);
    assert_eq!(outcome.artifact.path, std::path::PathBuf::from("/dist/main.js"));

    let graph = captured.lock().take().unwrap();
    assert_eq!(graph["/src/index"]["dependencies"], serde_json::json!({ "./a": "/src/a" }));
    assert_eq!(graph["/src/a"]["dependencies"], serde_json::json!({}));

    let code = runtime.file_contents("/dist/main.js").unwrap();
    assert_eq!(code.len(), outcome.artifact.size);
    assert!(code.contains("\"/src/index\": {\n  dependencies: {\"./a\":\"/src/a\"},"));
}

#[tokio::test]
async fn test_generate_waits_for_every_make_listener() {
    let runtime = test_runtime(&[("/src/index.js", "module.exports = 1;\n")]);
    let log = EventLog::default();

    let mut config = test_config(&runtime, "/src/index.js");
    for (name, delay) in [("slow", 40u64), ("fast", 5)] {
        let log = log.clone();
        config = config.plugin(Plugin::callable(name, move |api| {
            let log = log.clone();
            api.tap_async(hooks::MAKE, move |c| {
                let log = log.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    assert!(c.artifact().is_none(), "artifact written during make");
                    assert!(!c.runtime().exists(&c.output_path()));
                    log.push(format!("make:{name}"));
                    Ok::<_, BoxError>(())
                }
            })?;
            Ok(())
        }));
    }
    let emit_log = log.clone();
    config = config.plugin(Plugin::callable("observer", move |api| {
        let log = emit_log.clone();
        api.tap(hooks::EMIT, move |c| {
            assert!(c.artifact().is_some());
            log.push("emit");
            Ok(())
        })?;
        Ok(())
    }));

    Compiler::new(config).unwrap().run().await.unwrap();

    let emit = log.position("emit").unwrap();
    assert!(log.position("make:slow").unwrap() < emit);
    assert!(log.position("make:fast").unwrap() < emit);
}

#[tokio::test]
async fn test_emit_completes_before_after_emit_starts() {
    let runtime = test_runtime(&[("/src/index.js", "")]);
    let log = EventLog::default();
    let plugin_log = log.clone();

    let config = test_config(&runtime, "/src/index.js").plugin(Plugin::callable(
        "ordering",
        move |api| {
            for (hook, tag, delay) in [
                (hooks::EMIT, "emit-1", 30u64),
                (hooks::EMIT, "emit-2", 5),
                (hooks::AFTER_EMIT, "after", 0),
            ] {
                let log = plugin_log.clone();
                api.tap_async(hook, move |_| {
                    let log = log.clone();
                    async move {
                        log.push(format!("{tag}:start"));
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        log.push(format!("{tag}:end"));
                        Ok::<_, BoxError>(())
                    }
                })?;
            }
            Ok(())
        },
    ));

    Compiler::new(config).unwrap().run().await.unwrap();

    assert_eq!(
        log.events(),
        vec![
            "emit-1:start",
            "emit-1:end",
            "emit-2:start",
            "emit-2:end",
            "after:start",
            "after:end",
        ]
    );
}

#[tokio::test]
async fn test_missing_dependency_writes_nothing() {
    let runtime = test_runtime(&[("/src/index.js", "require('./missing.js');\n")]);
    let emitted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&emitted);

    let config = test_config(&runtime, "/src/index.js").plugin(Plugin::callable(
        "counter",
        move |api| {
            let counter = Arc::clone(&counter);
            api.tap(hooks::EMIT, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })?;
            Ok(())
        },
    ));

    let err = Compiler::new(config).unwrap().run().await.unwrap_err();
    assert!(
        matches!(err, Error::Build(BuildError::FileNotFound { ref path }) if path.ends_with("missing.js")),
        "unexpected error: {err:?}"
    );
    assert!(runtime.file_contents("/dist/main.js").is_none());
    assert_eq!(emitted.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_emit_failure_is_post_process() {
    let runtime = test_runtime(&[("/src/index.js", "")]);
    let log = EventLog::default();
    let plugin_log = log.clone();

    let config = test_config(&runtime, "/src/index.js").plugin(Plugin::callable(
        "flaky",
        move |api| {
            api.tap(hooks::EMIT, |_| Err("disk quota".into()))?;
            let log = plugin_log.clone();
            api.tap(hooks::AFTER_EMIT, move |_| {
                log.push("after");
                Ok(())
            })?;
            Ok(())
        },
    ));

    let err = Compiler::new(config).unwrap().run().await.unwrap_err();
    match &err {
        Error::PostProcess { artifact, source } => {
            assert_eq!(artifact, &std::path::PathBuf::from("/dist/main.js"));
            assert!(matches!(source, HookError::Listener { listener, .. } if listener == "flaky"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.artifact_written());
    assert!(runtime.file_contents("/dist/main.js").is_some());
    assert!(log.events().is_empty());
}

#[tokio::test]
async fn test_make_listener_failure_aborts_before_generate() {
    let runtime = test_runtime(&[("/src/index.js", "")]);
    let config = test_config(&runtime, "/src/index.js").plugin(Plugin::callable(
        "broken",
        |api| {
            api.tap(hooks::MAKE, |_| Err("nope".into()))?;
            Ok(())
        },
    ));

    let err = Compiler::new(config).unwrap().run().await.unwrap_err();
    assert!(matches!(err, Error::Hook(HookError::Listener { .. })));
    assert!(runtime.file_contents("/dist/main.js").is_none());
}

#[tokio::test]
async fn test_make_listener_appending_dangling_module() {
    let runtime = test_runtime(&[("/src/index.js", "")]);
    let config = test_config(&runtime, "/src/index.js").plugin(Plugin::callable(
        "virtual",
        |api| {
            api.tap(hooks::MAKE, |c| {
                let mut deps = bindle_bundler::DependencyMap::new();
                deps.insert("./ghost".to_string(), id("/src/ghost"));
                c.graph().insert(Module::new(id("/src/virtual"), deps, ""))?;
                Ok(())
            })?;
            Ok(())
        },
    ));

    let err = Compiler::new(config).unwrap().run().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Graph(GraphError::DanglingDependency { ref from, .. }) if *from == id("/src/virtual")
    ));
}

#[tokio::test]
async fn test_listener_cannot_replace_existing_module() {
    let runtime = test_runtime(&[("/src/index.js", "")]);
    let config = test_config(&runtime, "/src/index.js").plugin(Plugin::callable(
        "clobber",
        |api| {
            api.tap(hooks::MAKE, |c| {
                let replacement = Module::new(c.entry().clone(), Default::default(), "hacked");
                c.graph().insert(replacement)?;
                Ok(())
            })?;
            Ok(())
        },
    ));

    let err = Compiler::new(config).unwrap().run().await.unwrap_err();
    match &err {
        Error::Hook(HookError::Listener { listener, source, .. }) => {
            assert_eq!(listener, "clobber");
            assert!(source.to_string().contains("already in the graph"));
            assert!(matches!(
                source.downcast_ref::<GraphError>(),
                Some(GraphError::DuplicateModule(existing)) if *existing == id("/src/index.js")
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_hook_fails_plugin_setup() {
    let runtime = test_runtime(&[("/src/index.js", "")]);
    let config = test_config(&runtime, "/src/index.js").plugin(Plugin::callable(
        "typo",
        |api| {
            api.tap("compile", |_| Ok(()))?;
            Ok(())
        },
    ));

    let err = Compiler::new(config).unwrap_err();
    match err {
        Error::PluginSetup { plugin, source } => {
            assert_eq!(plugin, "typo");
            assert!(matches!(
                source.downcast_ref::<HookError>(),
                Some(HookError::UnknownHook(name)) if name == "compile"
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

struct Optimizer {
    log: EventLog,
}

impl Registrar for Optimizer {
    fn name(&self) -> &str {
        "optimizer"
    }

    fn register(&self, api: &mut PluginApi<'_>) -> Result<(), BoxError> {
        api.declare("optimize", HookKind::AsyncSeries)?;

        let log = self.log.clone();
        api.tap("optimize", move |c| {
            log.push(format!("optimize:{}", c.graph().len()));
            Ok(())
        })?;

        api.tap_async(hooks::MAKE, |c| async move {
            c.hooks().invoke_async("optimize", Arc::clone(&c)).await?;
            Ok::<_, BoxError>(())
        })?;
        Ok(())
    }
}

#[tokio::test]
async fn test_registrar_declares_and_invokes_custom_hook() {
    let runtime = test_runtime(&[("/src/index.js", "require('./a.js');"), ("/src/a.js", "")]);
    let log = EventLog::default();
    let config = test_config(&runtime, "/src/index.js")
        .plugin(Plugin::registrar(Optimizer { log: log.clone() }));

    let compiler = Compiler::new(config).unwrap();
    assert_eq!(compiler.plugin_names(), ["optimizer"]);
    assert_eq!(compiler.hooks().kind("optimize"), Some(HookKind::AsyncSeries));

    compiler.run().await.unwrap();
    assert_eq!(log.events(), vec!["optimize:2"]);
}

#[tokio::test]
async fn test_each_run_gets_fresh_state() {
    let runtime = test_runtime(&[("/src/index.js", "require('./a.js');"), ("/src/a.js", "")]);
    let seen = EventLog::default();
    let plugin_seen = seen.clone();

    let config = test_config(&runtime, "/src/index.js").plugin(Plugin::callable(
        "counter",
        move |api| {
            let seen = plugin_seen.clone();
            api.tap(hooks::COMPILATION, move |c| {
                seen.push(c.graph().len().to_string());
                Ok(())
            })?;
            Ok(())
        },
    ));

    let compiler = Compiler::new(config).unwrap();
    let first = compiler.run().await.unwrap();
    let second = compiler.run().await.unwrap();

    assert_eq!(first.module_count, 2);
    assert_eq!(second.module_count, 2);
    assert_eq!(seen.events(), vec!["1", "1"]);
}

#[tokio::test]
async fn test_banner_and_relative_paths() {
    let runtime = Arc::new(bindle_bundler::TestRuntime::with_files(
        "/project",
        [("src/index.js", "module.exports = 1;")],
    ));
    let config = bindle_bundler::BundleConfig::new("src/index.js")
        .output_dir("build")
        .output_filename("app.js")
        .banner("/* bindle */")
        .runtime(runtime.clone());

    let outcome = config.build().await.unwrap();
    assert_eq!(outcome.entry, id("/project/src/index.js"));
    assert_eq!(
        outcome.artifact.path,
        std::path::PathBuf::from("/project/build/app.js")
    );
    let code = runtime.file_contents("/project/build/app.js").unwrap();
    assert!(code.starts_with("/* bindle */\n"));
}
