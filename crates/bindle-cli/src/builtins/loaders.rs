//! Built-in loaders.
//!
//! | name        | effect                                              |
//! |-------------|-----------------------------------------------------|
//! | `raw`       | file text becomes `module.exports = "<text>";`      |
//! | `json`      | validated JSON becomes `module.exports = <value>;`  |
//! | `uppercase` | upper-cases the text                                |
//! | `trim`      | strips leading and trailing whitespace              |

use bindle_bundler::Loader;

/// Names accepted by [`lookup`], in documentation order.
pub const NAMES: &[&str] = &["raw", "json", "uppercase", "trim"];

/// Built-in loader registered under `name`.
pub fn lookup(name: &str) -> Option<Loader> {
    let loader = match name {
        "raw" => Loader::new("raw", raw),
        "json" => Loader::new("json", json),
        "uppercase" => Loader::new("uppercase", |text: String| Ok(text.to_uppercase())),
        "trim" => Loader::new("trim", |text: String| Ok(text.trim().to_string())),
        _ => return None,
    };
    Some(loader)
}

fn raw(text: String) -> Result<String, String> {
    let literal = serde_json::to_string(&text).map_err(|e| e.to_string())?;
    Ok(format!("module.exports = {literal};"))
}

fn json(text: String) -> Result<String, String> {
    let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| e.to_string())?;
    Ok(format!("module.exports = {value};"))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use bindle_bundler::{LoaderPipeline, LoaderRule};

    use super::*;

    fn run(name: &str, text: &str) -> Result<String, String> {
        let pipeline = LoaderPipeline::new(vec![LoaderRule::extension(
            "txt",
            lookup(name).unwrap(),
        )]);
        pipeline
            .apply(Path::new("/src/a.txt"), text.to_string())
            .map_err(|e| e.message)
    }

    #[test]
    fn test_every_name_resolves() {
        for name in NAMES {
            let loader = lookup(name).unwrap();
            assert_eq!(loader.name(), *name);
        }
        assert!(lookup("sass").is_none());
    }

    #[test]
    fn test_raw_escapes_text() {
        let out = run("raw", "say \"hi\"\nbye").unwrap();
        assert_eq!(out, r#"module.exports = "say \"hi\"\nbye";"#);
    }

    #[test]
    fn test_json_validates() {
        assert_eq!(run("json", r#"{ "a": [1, 2] }"#).unwrap(), r#"module.exports = {"a":[1,2]};"#);
        assert!(run("json", "{ broken").is_err());
    }

    #[test]
    fn test_text_loaders() {
        assert_eq!(run("uppercase", "abc").unwrap(), "ABC");
        assert_eq!(run("trim", "  abc \n").unwrap(), "abc");
    }
}
