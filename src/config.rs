//! Options file loading.
//!
//! The file is JSON with comments and trailing commas allowed:
//!
//! ```json
//! {
//!   "extends": "../base.json",
//!   "inference": {
//!     "nilStrict": "true",
//!     "constructorNames": ["new", "create"],
//!   }
//! }
//! ```
//!
//! A file's keys override those of the file it extends.

use anyhow::{Context, Result, anyhow, bail};
use lty_checker::InferenceOptions;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;

/// Boolean that may also be spelled as a string (`"true"`, `"off"`, ...).
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(value)) => Ok(Some(value)),
        Some(Flag::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{text}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LtyConfig {
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub inference: Option<InferenceConfig>,
}

/// Inference keys as written in the file; absent keys are `None`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub nil_strict: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub recognize_global_name_as_type: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub enable_generic: Option<bool>,
    #[serde(default)]
    pub constructor_names: Option<Vec<String>>,
    #[serde(default)]
    pub max_inference_depth: Option<u32>,
}

impl InferenceConfig {
    /// `self` over `base`, key by key.
    fn over(self, base: InferenceConfig) -> InferenceConfig {
        InferenceConfig {
            nil_strict: self.nil_strict.or(base.nil_strict),
            recognize_global_name_as_type: self
                .recognize_global_name_as_type
                .or(base.recognize_global_name_as_type),
            enable_generic: self.enable_generic.or(base.enable_generic),
            constructor_names: self.constructor_names.or(base.constructor_names),
            max_inference_depth: self.max_inference_depth.or(base.max_inference_depth),
        }
    }

    pub fn resolve(self) -> InferenceOptions {
        let defaults = InferenceOptions::default();
        InferenceOptions {
            nil_strict: self.nil_strict.unwrap_or(defaults.nil_strict),
            recognize_global_name_as_type: self
                .recognize_global_name_as_type
                .unwrap_or(defaults.recognize_global_name_as_type),
            enable_generic: self.enable_generic.unwrap_or(defaults.enable_generic),
            constructor_names: self.constructor_names.unwrap_or(defaults.constructor_names),
            max_inference_depth: self
                .max_inference_depth
                .filter(|&depth| depth > 0)
                .unwrap_or(defaults.max_inference_depth),
        }
    }
}

pub fn parse_config(source: &str) -> Result<LtyConfig> {
    let cleaned = strip_jsonc(source);
    serde_json::from_str(&cleaned).context("failed to parse options JSON")
}

/// Read `path` (following `extends`) into resolved options.
pub fn load_options(path: &Path) -> Result<InferenceOptions> {
    let config = load_config(path)?;
    Ok(config.inference.unwrap_or_default().resolve())
}

pub fn load_config(path: &Path) -> Result<LtyConfig> {
    let mut visited = HashSet::new();
    load_config_inner(path, &mut visited)
}

fn load_config_inner(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<LtyConfig> {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical.clone()) {
        bail!("options extends cycle detected at {}", canonical.display());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read options file: {}", path.display()))?;
    let mut config = parse_config(&source)
        .with_context(|| format!("failed to parse options file: {}", path.display()))?;

    if let Some(extends) = config.extends.take() {
        let base_path = resolve_extends_path(path, &extends)?;
        let base = load_config_inner(&base_path, visited)?;
        config.inference = match (config.inference.take(), base.inference) {
            (Some(own), Some(base)) => Some(own.over(base)),
            (own, base) => own.or(base),
        };
    }

    visited.remove(&canonical);
    Ok(config)
}

fn resolve_extends_path(current: &Path, extends: &str) -> Result<PathBuf> {
    let dir = current
        .parent()
        .ok_or_else(|| anyhow!("options file has no parent directory"))?;
    let mut candidate = PathBuf::from(extends);
    if candidate.extension().is_none() {
        candidate.set_extension("json");
    }
    Ok(if candidate.is_absolute() {
        candidate
    } else {
        dir.join(candidate)
    })
}

/// Drop `//` and `/* */` comments and trailing commas outside strings.
fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    if skipped == '\n' {
                        out.push('\n');
                    }
                    prev = skipped;
                }
            }
            ',' => {
                if !matches!(next_significant(chars.clone()), Some('}' | ']')) {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

/// First character after whitespace and comments.
fn next_significant(mut chars: Peekable<Chars<'_>>) -> Option<char> {
    while let Some(ch) = chars.next() {
        match ch {
            c if c.is_whitespace() => {}
            '/' if chars.peek() == Some(&'/') => {
                chars.find(|&c| c == '\n');
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                chars.find(|&c| {
                    let closed = prev == '*' && c == '/';
                    prev = c;
                    closed
                });
            }
            other => return Some(other),
        }
    }
    None
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
