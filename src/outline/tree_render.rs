//! ASCII tree rendering for the outline forest.

use crate::models::OutlineNode;

const INCLUDED: char = '●';
const EXCLUDED: char = '○';

/// Render the outline as ASCII art, marking sections left out of exports.
///
/// Example output:
/// ```text
/// ● Act I
/// ├── ● The Harbour
/// ├── ○ Cut Prologue
/// │   └── ● Storm Notes
/// └── ● The Map
/// ○ Act II
/// ```
///
/// With `with_ids`, each line carries the section id in brackets so an agent
/// can address sections by id.
pub fn render_tree(nodes: &[OutlineNode], with_ids: bool) -> String {
    let mut output = String::new();
    for node in nodes {
        push_line(&mut output, "", node, with_ids);
        render_children(&mut output, &node.children, "", with_ids);
    }
    output
}

fn render_children(output: &mut String, children: &[OutlineNode], prefix: &str, with_ids: bool) {
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let (branch, continuation) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };

        push_line(output, &format!("{}{}", prefix, branch), child, with_ids);
        render_children(output, &child.children, &format!("{}{}", prefix, continuation), with_ids);
    }
}

fn push_line(output: &mut String, lead: &str, node: &OutlineNode, with_ids: bool) {
    output.push_str(lead);
    output.push(if node.is_included() { INCLUDED } else { EXCLUDED });
    output.push(' ');
    output.push_str(&node.title);
    if with_ids {
        output.push_str(&format!(" [{}]", node.id));
    }
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, included: bool, children: Vec<OutlineNode>) -> OutlineNode {
        let mut node = OutlineNode::with_id(title.to_lowercase(), title, "").with_children(children);
        if !included {
            node.include_in_export = Some(false);
        }
        node
    }

    #[test]
    fn single_root() {
        let tree = vec![section("Act I", true, vec![])];
        assert_eq!(render_tree(&tree, false), "● Act I\n");
    }

    #[test]
    fn excluded_root_is_marked() {
        let tree = vec![section("Act I", true, vec![]), section("Cut Act", false, vec![])];
        assert_eq!(render_tree(&tree, false), "● Act I\n○ Cut Act\n");
    }

    #[test]
    fn nested_children() {
        let tree = vec![section(
            "Act I",
            true,
            vec![
                section("The Harbour", true, vec![]),
                section("Cut Prologue", false, vec![section("Storm Notes", true, vec![])]),
                section("The Map", true, vec![]),
            ],
        )];
        let expected = "● Act I\n├── ● The Harbour\n├── ○ Cut Prologue\n│   └── ● Storm Notes\n└── ● The Map\n";
        assert_eq!(render_tree(&tree, false), expected);
    }

    #[test]
    fn ids_are_appended() {
        let tree = vec![section("Act I", true, vec![section("Dawn", true, vec![])])];
        assert_eq!(render_tree(&tree, true), "● Act I [act i]\n└── ● Dawn [dawn]\n");
    }

    #[test]
    fn empty_forest_renders_nothing() {
        assert_eq!(render_tree(&[], true), "");
    }
}
