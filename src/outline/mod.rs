//! Pure operations over the outline forest.
//!
//! Every function borrows the forest and returns a new one; the input is never
//! touched. A target id that cannot be found is not an error: the operation
//! returns a forest equal to its input, and callers that care compare the two.
//! This keeps batches of edits composable without error handling at each step.

mod tree_render;

pub use tree_render::render_tree;

use crate::models::{MoveTarget, OutlineNode, OutlineUpdate};

/// Depth-first, parent-before-children search.
pub fn find<'a>(forest: &'a [OutlineNode], id: &str) -> Option<&'a OutlineNode> {
    for node in forest {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find(&node.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn contains(forest: &[OutlineNode], id: &str) -> bool {
    find(forest, id).is_some()
}

/// Whether `id` is `node` itself or anywhere below it.
pub fn is_within(node: &OutlineNode, id: &str) -> bool {
    node.id == id || contains(&node.children, id)
}

/// Ids of every node in the forest, in search order.
pub fn ids(forest: &[OutlineNode]) -> Vec<String> {
    let mut out = Vec::new();
    collect_ids(forest, &mut out);
    out
}

fn collect_ids(forest: &[OutlineNode], out: &mut Vec<String>) {
    for node in forest {
        out.push(node.id.clone());
        collect_ids(&node.children, out);
    }
}

/// Number of nodes in the forest.
pub fn count(forest: &[OutlineNode]) -> usize {
    forest.iter().map(|n| 1 + count(&n.children)).sum()
}

pub fn rename(forest: &[OutlineNode], id: &str, title: &str) -> Vec<OutlineNode> {
    update_node(forest, id, |node| node.title = title.to_string())
}

pub fn set_content(forest: &[OutlineNode], id: &str, content: &str) -> Vec<OutlineNode> {
    update_node(forest, id, |node| node.content = content.to_string())
}

/// Merge every `Some` field of `update` into the matching node.
pub fn set_fields(forest: &[OutlineNode], id: &str, update: &OutlineUpdate) -> Vec<OutlineNode> {
    update_node(forest, id, |node| {
        if let Some(title) = &update.title {
            node.title = title.clone();
        }
        if let Some(content) = &update.content {
            node.content = content.clone();
        }
        if let Some(illustration) = &update.illustration {
            node.illustration = Some(illustration.clone());
        }
        if let Some(include) = update.include_in_export {
            node.include_in_export = Some(include);
        }
    })
}

/// Append `node` as the last child of `parent_id`.
///
/// If the parent is absent the forest comes back unchanged; callers that must
/// know should check [`contains`] first.
pub fn insert_child(forest: &[OutlineNode], parent_id: &str, node: OutlineNode) -> Vec<OutlineNode> {
    update_node(forest, parent_id, |parent| parent.children.push(node))
}

pub fn insert_root(forest: &[OutlineNode], node: OutlineNode) -> Vec<OutlineNode> {
    let mut next = forest.to_vec();
    next.push(node);
    next
}

/// Delete the node and its entire subtree.
pub fn remove(forest: &[OutlineNode], id: &str) -> Vec<OutlineNode> {
    let mut next = forest.to_vec();
    extract(&mut next, id);
    next
}

/// Flip the export flag. A missing flag counts as `true`, so the first toggle
/// excludes the node.
pub fn toggle_flag(forest: &[OutlineNode], id: &str) -> Vec<OutlineNode> {
    update_node(forest, id, |node| {
        node.include_in_export = Some(!node.is_included());
    })
}

/// Add `character_id` to the section's associations, or remove it if present.
pub fn toggle_character(forest: &[OutlineNode], section_id: &str, character_id: &str) -> Vec<OutlineNode> {
    update_node(forest, section_id, |node| {
        let ids = node.character_ids.get_or_insert_with(Vec::new);
        match ids.iter().position(|id| id == character_id) {
            Some(pos) => {
                ids.remove(pos);
            }
            None => ids.push(character_id.to_string()),
        }
    })
}

/// Remove `character_id` from every association set, at every depth.
pub fn strip_character(forest: &[OutlineNode], character_id: &str) -> Vec<OutlineNode> {
    forest
        .iter()
        .map(|node| {
            let mut node = node.clone();
            strip_in_place(&mut node, character_id);
            node
        })
        .collect()
}

fn strip_in_place(node: &mut OutlineNode, character_id: &str) {
    if let Some(ids) = node.character_ids.as_mut() {
        ids.retain(|id| id != character_id);
    }
    for child in &mut node.children {
        strip_in_place(child, character_id);
    }
}

/// Move the subtree rooted at `id` to `target`.
///
/// The subtree is extracted first, then the target is checked against the
/// *extracted* subtree: anchoring on the moved node itself or on one of its
/// descendants would create a cycle, so the original forest is returned. An
/// anchor that does not exist also leaves the forest untouched.
pub fn move_node(forest: &[OutlineNode], id: &str, target: &MoveTarget) -> Vec<OutlineNode> {
    let mut next = forest.to_vec();
    let Some(subtree) = extract(&mut next, id) else {
        return forest.to_vec();
    };

    if let Some(anchor) = target.anchor() {
        if is_within(&subtree, anchor) {
            tracing::warn!("Rejected move of section {} under or beside itself ({})", id, anchor);
            return forest.to_vec();
        }
    }

    let placed = match target {
        MoveTarget::Root => {
            next.push(subtree);
            true
        }
        MoveTarget::Parent(parent_id) => match find_mut(&mut next, parent_id) {
            Some(parent) => {
                parent.children.push(subtree);
                true
            }
            None => false,
        },
        MoveTarget::Before(sibling_id) => insert_beside(&mut next, sibling_id, subtree, 0).is_none(),
        MoveTarget::After(sibling_id) => insert_beside(&mut next, sibling_id, subtree, 1).is_none(),
    };

    if placed {
        next
    } else {
        forest.to_vec()
    }
}

fn update_node(forest: &[OutlineNode], id: &str, apply: impl FnOnce(&mut OutlineNode)) -> Vec<OutlineNode> {
    let mut next = forest.to_vec();
    if let Some(node) = find_mut(&mut next, id) {
        apply(node);
    }
    next
}

fn find_mut<'a>(forest: &'a mut [OutlineNode], id: &str) -> Option<&'a mut OutlineNode> {
    for node in forest.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Cut the node out of wherever it sits and hand it back.
fn extract(forest: &mut Vec<OutlineNode>, id: &str) -> Option<OutlineNode> {
    if let Some(pos) = forest.iter().position(|n| n.id == id) {
        return Some(forest.remove(pos));
    }
    forest.iter_mut().find_map(|node| extract(&mut node.children, id))
}

/// Insert `node` next to `sibling_id` (`offset` 0 = before, 1 = after).
/// Gives the node back if the sibling was not found.
fn insert_beside(
    forest: &mut Vec<OutlineNode>,
    sibling_id: &str,
    node: OutlineNode,
    offset: usize,
) -> Option<OutlineNode> {
    if let Some(pos) = forest.iter().position(|n| n.id == sibling_id) {
        forest.insert(pos + offset, node);
        return None;
    }
    let mut node = node;
    for child in forest.iter_mut() {
        match insert_beside(&mut child.children, sibling_id, node, offset) {
            None => return None,
            Some(back) => node = back,
        }
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str) -> OutlineNode {
        OutlineNode::with_id(id, id.to_uppercase(), "")
    }

    fn branch(id: &str, children: Vec<OutlineNode>) -> OutlineNode {
        leaf(id).with_children(children)
    }

    /// a
    /// ├── b
    /// │   └── c
    /// └── d
    /// e
    fn sample() -> Vec<OutlineNode> {
        vec![
            branch("a", vec![branch("b", vec![leaf("c")]), leaf("d")]),
            leaf("e"),
        ]
    }

    fn top_ids(forest: &[OutlineNode]) -> Vec<&str> {
        forest.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_find_searches_depth_first() {
        let forest = sample();
        assert_eq!(find(&forest, "c").map(|n| n.title.as_str()), Some("C"));
        assert!(find(&forest, "zz").is_none());
        assert_eq!(ids(&forest), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(count(&forest), 5);
    }

    #[test]
    fn test_rename_deep_node_leaves_input_untouched() {
        let forest = sample();
        let renamed = rename(&forest, "c", "Climax");
        assert_eq!(find(&renamed, "c").unwrap().title, "Climax");
        assert_eq!(find(&forest, "c").unwrap().title, "C");
    }

    #[test]
    fn test_unknown_id_is_a_no_op() {
        let forest = sample();
        assert_eq!(rename(&forest, "missing", "x"), forest);
        assert_eq!(set_content(&forest, "missing", "x"), forest);
        assert_eq!(insert_child(&forest, "missing", leaf("n")), forest);
        assert_eq!(remove(&forest, "missing"), forest);
        assert_eq!(toggle_flag(&forest, "missing"), forest);
    }

    #[test]
    fn test_set_fields_merges_only_given_fields() {
        let forest = sample();
        let update = OutlineUpdate {
            content: Some("Body".to_string()),
            ..Default::default()
        };
        let next = set_fields(&forest, "b", &update);
        let node = find(&next, "b").unwrap();
        assert_eq!(node.title, "B");
        assert_eq!(node.content, "Body");
    }

    #[test]
    fn test_insert_root_then_remove_round_trips() {
        let forest = sample();
        let node = branch("n", vec![leaf("n1")]);
        let inserted = insert_root(&forest, node);
        assert_eq!(count(&inserted), 7);
        assert_eq!(remove(&inserted, "n"), forest);
    }

    #[test]
    fn test_remove_drops_whole_subtree() {
        let next = remove(&sample(), "b");
        assert!(find(&next, "b").is_none());
        assert!(find(&next, "c").is_none());
        assert_eq!(ids(&next), vec!["a", "d", "e"]);
    }

    #[test]
    fn test_toggle_flag_twice_returns_to_included() {
        let forest = sample();
        let once = toggle_flag(&forest, "d");
        assert!(!find(&once, "d").unwrap().is_included());
        let twice = toggle_flag(&once, "d");
        assert!(find(&twice, "d").unwrap().is_included());
    }

    #[test]
    fn test_toggle_character_adds_then_removes() {
        let forest = sample();
        let added = toggle_character(&forest, "c", "hero");
        assert!(find(&added, "c").unwrap().has_character("hero"));
        let removed = toggle_character(&added, "c", "hero");
        assert!(!find(&removed, "c").unwrap().has_character("hero"));
    }

    #[test]
    fn test_strip_character_reaches_every_depth() {
        let mut forest = sample();
        for id in ["a", "c", "e"] {
            forest = toggle_character(&forest, id, "hero");
        }
        forest = toggle_character(&forest, "c", "villain");
        let stripped = strip_character(&forest, "hero");
        for id in ids(&stripped) {
            assert!(!find(&stripped, &id).unwrap().has_character("hero"));
        }
        assert!(find(&stripped, "c").unwrap().has_character("villain"));
    }

    #[test]
    fn test_move_under_new_parent() {
        let next = move_node(&sample(), "d", &MoveTarget::Parent("e".to_string()));
        assert_eq!(ids(&next), vec!["a", "b", "c", "e", "d"]);
        assert_eq!(top_ids(&find(&next, "e").unwrap().children), vec!["d"]);
    }

    #[test]
    fn test_move_before_and_after_sibling() {
        let before = move_node(&sample(), "e", &MoveTarget::Before("a".to_string()));
        assert_eq!(top_ids(&before), vec!["e", "a"]);

        let after = move_node(&sample(), "e", &MoveTarget::After("b".to_string()));
        assert_eq!(top_ids(&find(&after, "a").unwrap().children), vec!["b", "e", "d"]);
    }

    #[test]
    fn test_move_to_root_promotes() {
        let next = move_node(&sample(), "c", &MoveTarget::Root);
        assert_eq!(top_ids(&next), vec!["a", "e", "c"]);
        assert!(find(&next, "b").unwrap().children.is_empty());
    }

    #[test]
    fn test_move_into_own_descendant_is_rejected() {
        let forest = sample();
        assert_eq!(move_node(&forest, "a", &MoveTarget::Parent("c".to_string())), forest);
        assert_eq!(move_node(&forest, "a", &MoveTarget::Parent("a".to_string())), forest);
        assert_eq!(move_node(&forest, "a", &MoveTarget::After("b".to_string())), forest);
    }

    #[test]
    fn test_move_to_missing_anchor_keeps_node() {
        let forest = sample();
        assert_eq!(move_node(&forest, "d", &MoveTarget::Parent("zz".to_string())), forest);
        assert_eq!(move_node(&forest, "d", &MoveTarget::Before("zz".to_string())), forest);
        assert_eq!(move_node(&forest, "zz", &MoveTarget::Root), forest);
    }

    #[test]
    fn test_two_level_cycle_scenario() {
        let forest = vec![branch("A", vec![leaf("B")])];
        assert_eq!(move_node(&forest, "A", &MoveTarget::Parent("B".to_string())), forest);
    }
}
