//! Dotted-path lookup over config trees.

use super::node::Node;
use crate::error::ConfigError;

/// Resolve a dotted path (`app.context.key`) against a tree.
///
/// Each segment must be an own key of the current mapping, or an in-bounds
/// index of the current sequence. Reaching a `Null` node ends the walk early
/// and returns it, so a key configured as `~` is distinguishable from a key
/// that was never configured.
///
/// # Errors
///
/// Returns `ConfigError::PathNotFound` naming the full path as soon as a
/// segment does not exist.
pub fn resolve<'a>(tree: &'a Node, path: &str) -> Result<&'a Node, ConfigError> {
    let mut node = tree;
    for segment in path.split('.') {
        if node.is_null() {
            break;
        }

        let next = match node {
            Node::Mapping(map) => map.get(segment),
            Node::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };

        node = next.ok_or_else(|| ConfigError::PathNotFound(path.to_string()))?;
    }
    Ok(node)
}
