//! ESM → CommonJS rewriter on top of the oxc parser.
//!
//! Static `import`/`export` statements become `require` calls and
//! `exports.*` assignments, dynamic `import("x")` becomes a promise around
//! `require`. Edits are spliced into the original text by span, so comments,
//! formatting and untouched statements come through byte for byte.
//!
//! Dependencies are the sources of static imports and re-exports, literal
//! dynamic imports, and every `require("...")` call whose single argument is
//! a string literal, in source order. Text inside comments, strings and
//! templates never counts.

use std::path::Path;

use indexmap::IndexMap;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, CallExpression, Declaration, ExportAllDeclaration, ExportDefaultDeclaration,
    ExportDefaultDeclarationKind, ExportNamedDeclaration, Expression, ImportDeclaration,
    ImportDeclarationSpecifier, ImportExpression, ModuleDeclaration, ModuleExportName, Program,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};

use super::{SourceTransformer, TransformError, TransformOutput};

const INTEROP_HELPER: &str =
    "var __bindle_interop = function (m) { return m && m.__esModule ? m.default : m; };\n";
const ESM_MARKER: &str = "Object.defineProperty(exports, \"__esModule\", { value: true });\n";
const EXPORT_STAR: &str = "(function (m) { for (var k in m) if (k !== \"default\" && k !== \"__esModule\") exports[k] = m[k]; })";

/// Default [`SourceTransformer`]: parses with oxc, rewrites module syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportRewriter;

impl ImportRewriter {
    pub fn new() -> Self {
        Self
    }
}

/// Replace `start..end` of the source with `text`. Empty ranges insert.
struct Edit {
    start: u32,
    end: u32,
    text: String,
}

#[derive(Default)]
struct Rewrite {
    edits: Vec<Edit>,
    /// `(offset, specifier)`, sorted by offset before use
    dependencies: Vec<(u32, String)>,
    /// `(property accessor, local)` assigned before the module body runs
    hoisted_exports: Vec<(String, String)>,
    /// `(property accessor, local)` assigned after the module body
    trailing_exports: Vec<(String, String)>,
    uses_interop: bool,
    is_esm: bool,
    temp_counter: usize,
}

fn line_of(source: &str, offset: usize) -> usize {
    let offset = offset.min(source.len());
    source.as_bytes()[..offset]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

fn quote(specifier: &str) -> String {
    serde_json::Value::String(specifier.to_string()).to_string()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// `.name`, or `["not an identifier"]`
fn property(name: &str) -> String {
    if is_identifier(name) {
        format!(".{name}")
    } else {
        format!("[{}]", quote(name))
    }
}

fn export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

fn destructure(bindings: &[(String, String)]) -> String {
    let fields: Vec<String> = bindings
        .iter()
        .map(|(imported, local)| {
            if imported == local {
                imported.clone()
            } else if is_identifier(imported) {
                format!("{imported}: {local}")
            } else {
                format!("{}: {local}", quote(imported))
            }
        })
        .collect();
    format!("{{ {} }}", fields.join(", "))
}

/// `require("x")` with exactly one string literal argument.
fn require_specifier(call: &CallExpression<'_>) -> Option<String> {
    let Expression::Identifier(callee) = &call.callee else {
        return None;
    };
    if callee.name.as_str() != "require" || call.arguments.len() != 1 {
        return None;
    }
    match &call.arguments[0] {
        Argument::StringLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

impl Rewrite {
    fn temp(&mut self) -> String {
        let name = format!("__bindle_import{}", self.temp_counter);
        self.temp_counter += 1;
        name
    }

    fn replace(&mut self, span: Span, text: String) {
        self.edits.push(Edit {
            start: span.start,
            end: span.end,
            text,
        });
    }

    /// Drop the `export ` / `export default ` prefix in front of `inner`.
    fn strip_prefix(&mut self, statement: Span, inner: Span, text: &str) {
        self.edits.push(Edit {
            start: statement.start,
            end: inner.start,
            text: text.to_string(),
        });
    }

    fn require(&mut self, offset: u32, specifier: &str) -> String {
        self.dependencies.push((offset, specifier.to_string()));
        format!("require({})", quote(specifier))
    }

    fn module_declarations(&mut self, program: &Program<'_>) {
        for statement in &program.body {
            let Some(declaration) = statement.as_module_declaration() else {
                continue;
            };
            match declaration {
                ModuleDeclaration::ImportDeclaration(import) => self.import(import),
                ModuleDeclaration::ExportAllDeclaration(all) => self.export_all(all),
                ModuleDeclaration::ExportDefaultDeclaration(default) => {
                    self.export_default(default)
                }
                ModuleDeclaration::ExportNamedDeclaration(named) => self.export_named(named),
                _ => {}
            }
        }
    }

    fn import(&mut self, decl: &ImportDeclaration<'_>) {
        let require = self.require(decl.span.start, decl.source.value.as_str());

        let mut default = None;
        let mut namespace = None;
        let mut named = Vec::new();
        for specifier in decl.specifiers.iter().flatten() {
            match specifier {
                ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
                    default = Some(spec.local.name.to_string());
                }
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => {
                    namespace = Some(spec.local.name.to_string());
                }
                ImportDeclarationSpecifier::ImportSpecifier(spec) => {
                    named.push((export_name(&spec.imported), spec.local.name.to_string()));
                }
            }
        }

        let mut parts = Vec::new();
        let holder = match namespace {
            Some(ns) => {
                parts.push(format!("const {ns} = {require};"));
                Some(ns)
            }
            None if default.is_some() && !named.is_empty() => {
                let temp = self.temp();
                parts.push(format!("const {temp} = {require};"));
                Some(temp)
            }
            None => None,
        };
        let source = holder.unwrap_or_else(|| require.clone());

        if let Some(name) = default {
            self.uses_interop = true;
            parts.push(format!("const {name} = __bindle_interop({source});"));
        }
        if !named.is_empty() {
            parts.push(format!("const {} = {source};", destructure(&named)));
        }
        if parts.is_empty() {
            parts.push(format!("{require};"));
        }
        self.replace(decl.span, parts.join(" "));
    }

    fn export_all(&mut self, decl: &ExportAllDeclaration<'_>) {
        self.is_esm = true;
        let require = self.require(decl.span.start, decl.source.value.as_str());
        let text = match &decl.exported {
            Some(name) => format!("exports{} = {require};", property(&export_name(name))),
            None => format!("{EXPORT_STAR}({require});"),
        };
        self.replace(decl.span, text);
    }

    fn export_named(&mut self, decl: &ExportNamedDeclaration<'_>) {
        self.is_esm = true;

        if let Some(source) = &decl.source {
            let require = self.require(decl.span.start, source.value.as_str());
            let assignments: Vec<String> = decl
                .specifiers
                .iter()
                .map(|spec| {
                    format!(
                        "exports{} = m{};",
                        property(&export_name(&spec.exported)),
                        property(&export_name(&spec.local))
                    )
                })
                .collect();
            self.replace(
                decl.span,
                format!("(function (m) {{ {} }})({require});", assignments.join(" ")),
            );
            return;
        }

        if let Some(declaration) = &decl.declaration {
            self.strip_prefix(decl.span, declaration.span(), "");
            match declaration {
                Declaration::FunctionDeclaration(func) => {
                    if let Some(id) = &func.id {
                        let name = id.name.to_string();
                        self.hoisted_exports.push((property(&name), name));
                    }
                }
                Declaration::ClassDeclaration(class) => {
                    if let Some(id) = &class.id {
                        let name = id.name.to_string();
                        self.trailing_exports.push((property(&name), name));
                    }
                }
                Declaration::VariableDeclaration(var) => {
                    for declarator in &var.declarations {
                        for id in declarator.id.get_binding_identifiers() {
                            let name = id.name.to_string();
                            self.trailing_exports.push((property(&name), name));
                        }
                    }
                }
                _ => {}
            }
            return;
        }

        for spec in &decl.specifiers {
            self.trailing_exports.push((
                property(&export_name(&spec.exported)),
                export_name(&spec.local),
            ));
        }
        self.replace(decl.span, String::new());
    }

    fn export_default(&mut self, decl: &ExportDefaultDeclaration<'_>) {
        self.is_esm = true;
        let inner = decl.declaration.span();

        let (named, anonymous_declaration) = match &decl.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => (
                func.id.as_ref().map(|id| (id.name.to_string(), true)),
                true,
            ),
            ExportDefaultDeclarationKind::ClassDeclaration(class) => (
                class.id.as_ref().map(|id| (id.name.to_string(), false)),
                true,
            ),
            _ => (None, false),
        };

        match named {
            Some((name, hoisted)) => {
                self.strip_prefix(decl.span, inner, "");
                let export = (property("default"), name);
                if hoisted {
                    self.hoisted_exports.push(export);
                } else {
                    self.trailing_exports.push(export);
                }
            }
            None => {
                self.strip_prefix(decl.span, inner, "exports.default = ");
                if anonymous_declaration {
                    // now an assignment expression, which needs its own terminator
                    self.replace(Span::new(decl.span.end, decl.span.end), ";".to_string());
                }
            }
        }
    }

    fn finish(mut self, source: &str, path: &Path) -> TransformOutput {
        self.edits.sort_by_key(|edit| (edit.start, edit.end));

        let mut code = String::with_capacity(source.len() + 256);
        if self.is_esm {
            code.push_str(ESM_MARKER);
        }
        if self.uses_interop {
            code.push_str(INTEROP_HELPER);
        }
        for (property, local) in &self.hoisted_exports {
            code.push_str(&format!("exports{property} = {local};\n"));
        }

        let mut cursor = 0;
        for edit in &self.edits {
            let start = edit.start as usize;
            code.push_str(&source[cursor..start]);
            code.push_str(&edit.text);
            cursor = edit.end as usize;
        }
        code.push_str(&source[cursor..]);

        if !self.trailing_exports.is_empty() {
            if !code.ends_with('\n') {
                code.push('\n');
            }
            for (property, local) in &self.trailing_exports {
                code.push_str(&format!("exports{property} = {local};\n"));
            }
        }

        self.dependencies.sort_by_key(|(offset, _)| *offset);
        let importer_dir = path.parent().unwrap_or(Path::new("/"));
        let mut dependencies = IndexMap::new();
        for (_, specifier) in self.dependencies {
            if !dependencies.contains_key(&specifier) {
                let resolved = importer_dir.join(&specifier).to_string_lossy().into_owned();
                dependencies.insert(specifier, resolved);
            }
        }

        TransformOutput { dependencies, code }
    }
}

impl<'a> Visit<'a> for Rewrite {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Some(specifier) = require_specifier(call) {
            self.dependencies.push((call.span.start, specifier));
        }
        walk::walk_call_expression(self, call);
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(lit) = &expr.source {
            let require = self.require(expr.span.start, lit.value.as_str());
            self.replace(
                expr.span,
                format!("Promise.resolve().then(function () {{ return {require}; }})"),
            );
        } else {
            walk::walk_import_expression(self, expr);
        }
    }
}

impl SourceTransformer for ImportRewriter {
    fn transform(&self, source: &str, path: &Path) -> Result<TransformOutput, TransformError> {
        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, source, SourceType::mjs()).parse();

        if let Some(error) = parsed.errors.first() {
            let line = error
                .labels
                .as_ref()
                .and_then(|labels| labels.first())
                .map_or(1, |label| line_of(source, label.offset()));
            return Err(TransformError::new(error.message.to_string(), line));
        }

        let mut rewrite = Rewrite::default();
        rewrite.module_declarations(&parsed.program);
        rewrite.visit_program(&parsed.program);
        Ok(rewrite.finish(source, path))
    }
}
