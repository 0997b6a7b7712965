//! Token trees: the flattening target for expressions.
//!
//! An expression lowers to a tree of atoms (rendered leaves) and nodes
//! (ordered children). Flattening concatenates the atoms left to right,
//! ignoring node boundaries, which is how predicates and grouping terms are
//! spelled in the emitted script.

/// A closed atom/node tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenTree {
    Atom(String),
    Node(Vec<TokenTree>),
}

impl TokenTree {
    pub fn atom(text: impl ToString) -> Self {
        TokenTree::Atom(text.to_string())
    }

    pub fn node(children: impl IntoIterator<Item = TokenTree>) -> Self {
        TokenTree::Node(children.into_iter().collect())
    }

    /// Leaves in left-to-right order.
    pub fn flatten(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TokenTree::Atom(text) => out.push(text),
            TokenTree::Node(children) => {
                for child in children {
                    child.collect(out);
                }
            }
        }
    }

    /// Flattened leaves joined by single spaces.
    pub fn render(&self) -> String {
        self.flatten().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_skips_node_boundaries() {
        let tree = TokenTree::node([
            TokenTree::node([TokenTree::atom("c"), TokenTree::atom("="), TokenTree::atom(1)]),
            TokenTree::atom("AND"),
            TokenTree::node([
                TokenTree::atom("b"),
                TokenTree::atom("="),
                TokenTree::node([TokenTree::atom(2)]),
            ]),
        ]);
        assert_eq!(tree.flatten(), vec!["c", "=", "1", "AND", "b", "=", "2"]);
        assert_eq!(tree.render(), "c = 1 AND b = 2");
    }

    #[test]
    fn test_empty_node_renders_empty() {
        assert_eq!(TokenTree::Node(vec![]).render(), "");
    }
}
