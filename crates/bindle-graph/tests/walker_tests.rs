//! Graph expansion against real files on disk.

mod helpers;

use bindle_graph::{
    BuildError, DependencyGraphBuilder, Loader, LoaderPipeline, LoaderRule, ModuleGraph,
};
use helpers::{id_in, native_builder, project};

#[tokio::test]
async fn test_acyclic_graph_contains_exactly_reachable_modules() {
    let dir = project(&[
        ("src/index.js", "import a from './a.js';\nimport { b } from './lib/b.js';\n"),
        ("src/a.js", "const c = require('./lib/c.js');\nmodule.exports = c;\n"),
        ("src/lib/b.js", "export const b = require('./c.js');\n"),
        ("src/lib/c.js", "module.exports = 3;\n"),
        ("src/unused.js", "module.exports = 'never imported';\n"),
    ]);
    let root = dir.path();

    let builder = native_builder();
    let entry = builder.build(&id_in(root, "src/index.js")).await.unwrap();
    let graph = DependencyGraphBuilder::new(builder).expand(entry).await.unwrap();

    let ids: Vec<_> = graph.ids().cloned().collect();
    assert_eq!(
        ids,
        vec![
            id_in(root, "src/index.js"),
            id_in(root, "src/a.js"),
            id_in(root, "src/lib/b.js"),
            id_in(root, "src/lib/c.js"),
        ]
    );
    graph.validate(&id_in(root, "src/index.js")).unwrap();
}

#[tokio::test]
async fn test_cycle_between_two_modules() {
    let dir = project(&[
        ("src/a.js", "require('./b.js');\nmodule.exports = 'a';\n"),
        ("src/b.js", "require('./a.js');\nmodule.exports = 'b';\n"),
    ]);
    let root = dir.path();

    let builder = native_builder();
    let entry = builder.build(&id_in(root, "src/a.js")).await.unwrap();
    let graph = DependencyGraphBuilder::new(builder).expand(entry).await.unwrap();

    assert_eq!(graph.len(), 2);
    let b = graph.get(&id_in(root, "src/b.js")).unwrap();
    assert_eq!(b.resolve("./a.js"), Some(&id_in(root, "src/a.js")));
}

#[tokio::test]
async fn test_two_specifiers_for_one_file_build_once() {
    let dir = project(&[
        ("src/index.js", "require('./shared.js');\nrequire('./nested/../shared.js');\n"),
        ("src/shared.js", "module.exports = {};\n"),
    ]);
    let root = dir.path();

    let builder = native_builder();
    let entry = builder.build(&id_in(root, "src/index.js")).await.unwrap();
    assert_eq!(entry.dependencies.len(), 2);

    let graph = DependencyGraphBuilder::new(builder).expand(entry).await.unwrap();
    assert_eq!(graph.len(), 2);
}

#[tokio::test]
async fn test_uppercase_rule_scenario() {
    let dir = project(&[
        ("src/index", "require('./a');\n"),
        ("src/a", "module.exports = 'a';\n"),
        ("src/notes.txt", "not reachable\n"),
    ]);
    let root = dir.path();

    let builder = native_builder().with_loaders(LoaderPipeline::new(vec![LoaderRule::extension(
        "txt",
        Loader::new("uppercase", |text| Ok(text.to_uppercase())),
    )]));
    let entry = builder.build(&id_in(root, "src/index")).await.unwrap();
    let graph = DependencyGraphBuilder::new(builder).expand(entry).await.unwrap();

    let index = graph.get(&id_in(root, "src/index")).unwrap();
    assert_eq!(index.resolve("./a"), Some(&id_in(root, "src/a")));
    let a = graph.get(&id_in(root, "src/a")).unwrap();
    assert!(a.dependencies.is_empty());
    assert_eq!(graph.len(), 2);
}

#[tokio::test]
async fn test_missing_dependency_aborts_expansion() {
    let dir = project(&[("src/index.js", "require('./missing.js');\n")]);
    let root = dir.path();

    let builder = native_builder();
    let entry = builder.build(&id_in(root, "src/index.js")).await.unwrap();
    let shared = ModuleGraph::new();
    let err = DependencyGraphBuilder::new(builder)
        .expand_into(entry, &shared)
        .await
        .unwrap_err();

    assert!(
        matches!(err, BuildError::FileNotFound { ref path } if path.ends_with("missing.js")),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_extension_probing_on_disk() {
    let dir = project(&[
        ("src/index.js", "require('./util');\n"),
        ("src/util.js", "module.exports = 1;\n"),
    ]);
    let root = dir.path();

    let builder = native_builder().with_extensions([".js"]);
    let entry = builder.build(&id_in(root, "src/index.js")).await.unwrap();
    let graph = DependencyGraphBuilder::new(builder).expand(entry).await.unwrap();

    assert!(graph.contains(&id_in(root, "src/util.js")));
}
