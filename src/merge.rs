//! Deterministic deep merge of parsed trees (`spec.md` §4.7).

use crate::tree::Tree;

/// Merge an ordered list of trees, last-wins.
///
/// An empty list returns an empty object; a single-element list returns that element unchanged.
/// Otherwise trees are folded left to right with [`merge_two`]: every field whose incoming value
/// is an array replaces the accumulator's field wholesale (arrays are never element-merged);
/// every other field is deep-merged recursively (objects merge, scalars overwrite).
pub fn merge(trees: Vec<Tree>) -> Tree {
    let mut iter = trees.into_iter();
    let Some(first) = iter.next() else {
        return Tree::empty_object();
    };
    iter.fold(first, merge_two)
}

fn merge_two(accumulator: Tree, incoming: Tree) -> Tree {
    match (accumulator, incoming) {
        (Tree::Object(mut acc), Tree::Object(inc)) => {
            for (key, incoming_value) in inc {
                if matches!(incoming_value, Tree::Array(_)) {
                    acc.insert(key, incoming_value);
                    continue;
                }
                match acc.get_mut(&key) {
                    Some(existing) => {
                        let existing_value = std::mem::replace(existing, Tree::Null);
                        *existing = merge_two(existing_value, incoming_value);
                    }
                    None => {
                        acc.insert(key, incoming_value);
                    }
                }
            }
            Tree::Object(acc)
        }
        // A non-object overriding an object (or vice versa), or two scalars: last wins outright.
        (_, incoming) => incoming,
    }
}
