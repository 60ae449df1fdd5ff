//! Deep merge of config trees.

use super::node::Node;

/// Merge `sources` into `target` in order; later sources win.
pub fn merge<'a, I>(target: &mut Node, sources: I)
where
    I: IntoIterator<Item = &'a Node>,
{
    for source in sources {
        merge_into(target, source);
    }
}

/// Merge one source into `target`.
///
/// Mappings merge key by key, recursively. Anything else (scalars,
/// sequences, mismatched types) replaces the target value wholesale;
/// sequences are never concatenated.
pub fn merge_into(target: &mut Node, source: &Node) {
    let Node::Mapping(source_map) = source else {
        *target = source.clone();
        return;
    };

    match target {
        Node::Mapping(target_map) => {
            for (key, value) in source_map {
                match target_map.get_mut(key) {
                    Some(slot) if matches!(value, Node::Mapping(_)) => merge_into(slot, value),
                    _ => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        other => *other = source.clone(),
    }
}
