//! Loading JSON/TOML data modules by path.
//!
//! `require("conf/app")` tries, in order: the path itself (when it already has
//! a `.json`/`.toml` extension), `conf/app.json`, `conf/app.toml`,
//! `conf/app/index.json`, `conf/app/index.toml`.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::debug;

use crate::core::invoke::call;

const EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Load the module at `path` as a JSON value, or `None` if it cannot be
/// resolved, read, or parsed.
pub fn require(path: impl AsRef<Path>) -> Option<Value> {
    call(|| load(path.as_ref()))
}

/// Find the file `require` would load for `path`.
pub fn resolve(path: &Path) -> Result<PathBuf> {
    if module_format(path).is_some() && path.is_file() {
        return Ok(path.to_path_buf());
    }
    let candidates = EXTENSIONS
        .iter()
        .map(|ext| with_appended_extension(path, ext))
        .chain(EXTENSIONS.iter().map(|ext| path.join(format!("index.{ext}"))));
    for candidate in candidates {
        if candidate.is_file() {
            debug!(path = %candidate.display(), "resolved module");
            return Ok(candidate);
        }
    }
    bail!("cannot find module {}", path.display())
}

fn load(path: &Path) -> Result<Value> {
    let resolved = resolve(path)?;
    let contents = fs::read_to_string(&resolved)
        .with_context(|| format!("read module {}", resolved.display()))?;
    match module_format(&resolved) {
        Some("toml") => toml::from_str(&contents)
            .with_context(|| format!("parse toml module {}", resolved.display())),
        _ => serde_json::from_str(&contents)
            .with_context(|| format!("parse json module {}", resolved.display())),
    }
}

fn module_format(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    EXTENSIONS.into_iter().find(|known| *known == ext)
}

/// `a/b.v1` + `json` → `a/b.v1.json` (unlike `with_extension`, keeps `.v1`).
fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw = OsString::from(path.as_os_str());
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::invoke::last_error_message;
    use crate::test_support::{scratch_dir, write_json_file};
    use serde_json::json;

    #[test]
    fn loads_json_by_exact_path() {
        let temp = scratch_dir();
        let path = write_json_file(temp.path(), "data.json", &json!({ "a": 1 }));
        assert_eq!(require(&path), Some(json!({ "a": 1 })));
    }

    #[test]
    fn resolves_extension_and_index() {
        let temp = scratch_dir();
        write_json_file(temp.path(), "settings.v1.json", &json!({ "v": 1 }));
        fs::create_dir(temp.path().join("pkg")).expect("mkdir");
        fs::write(temp.path().join("pkg").join("index.toml"), "name = \"pkg\"\n[deps]\nx = 2\n")
            .expect("write toml");

        assert_eq!(require(temp.path().join("settings.v1")), Some(json!({ "v": 1 })));
        assert_eq!(
            require(temp.path().join("pkg")),
            Some(json!({ "name": "pkg", "deps": { "x": 2 } }))
        );
    }

    #[test]
    fn missing_module_returns_none() {
        let temp = scratch_dir();
        assert!(require(temp.path().join("nothing")).is_none());
        let message = last_error_message().expect("error recorded");
        assert!(message.contains("cannot find module"));
    }

    #[test]
    fn malformed_module_returns_none() {
        let temp = scratch_dir();
        fs::write(temp.path().join("broken.json"), "{ nope").expect("write");
        assert!(require(temp.path().join("broken")).is_none());
        let message = last_error_message().expect("error recorded");
        assert!(message.contains("parse json module"));
    }
}
