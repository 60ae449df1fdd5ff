//! `${dotted.path}` substitution over config trees.
//!
//! Unresolvable placeholders are left in place verbatim. This keeps
//! references to optional environment variables harmless, and lets a
//! self-reference survive the environment pass so the self pass can
//! resolve it.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ffi::OsString;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, trace};

use super::node::{Mapping, Node};
use super::path;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Expand every string leaf of `tree` against `context`.
///
/// Single pass; substituted text is not expanded again.
pub fn expand(tree: &mut Node, context: &Node) {
    match tree {
        Node::String(text) => {
            if text.contains("${") {
                let expanded = expand_str(text, context).into_owned();
                *text = expanded;
            }
        }
        Node::Sequence(items) => {
            for item in items {
                expand(item, context);
            }
        }
        Node::Mapping(map) => {
            for value in map.values_mut() {
                expand(value, context);
            }
        }
        _ => {}
    }
}

/// Expand placeholders in a single string.
///
/// Only scalar targets substitute; a placeholder pointing at a missing
/// path, `Null`, a collection or a deferred value is kept as written.
pub fn expand_str<'a>(input: &'a str, context: &Node) -> Cow<'a, str> {
    PLACEHOLDER.replace_all(input, |caps: &Captures| {
        let reference = caps[1].trim();
        match path::resolve(context, reference).ok().and_then(Node::scalar_text) {
            Some(value) => value,
            None => {
                trace!(reference, "unresolved placeholder left as-is");
                caps[0].to_string()
            }
        }
    })
}

/// Build a flat substitution context from environment variables.
pub fn env_context(vars: &BTreeMap<String, String>) -> Node {
    let map: Mapping = vars
        .iter()
        .map(|(key, value)| (key.clone(), Node::String(value.clone())))
        .collect();
    Node::Mapping(map)
}

/// Keep the variables whose name and value are valid UTF-8.
///
/// Anything else cannot be substituted into config text and is skipped.
pub fn utf8_vars<I>(vars: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
            (Ok(name), Ok(value)) => Some((name, value)),
            (Ok(name), Err(_)) => {
                debug!(name = %name, "skipping environment variable with non-UTF-8 value");
                None
            }
            (Err(name), _) => {
                debug!(name = %name.to_string_lossy(), "skipping environment variable with non-UTF-8 name");
                None
            }
        })
        .collect()
}
