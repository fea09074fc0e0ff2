//! Layer hierarchy built from dotted layer names.
//!
//! Nodes live in an arena; a child is always stored after its parent, so a
//! reverse sweep visits children before parents.

use crate::group::{ChannelGroup, Layer};
use std::collections::BTreeMap;

/// Index of a node in a [`LayerTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// One path segment of the layer hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerNode {
    /// Path segment, empty for the root.
    pub name: String,
    /// Parent node, `None` for the root.
    pub parent: Option<NodeId>,
    /// Children keyed by path segment.
    pub children: BTreeMap<String, NodeId>,
    /// Layer whose full path ends at this node.
    pub leaf_layer: Option<usize>,
    /// Visible groups at and below this node.
    pub visible_groups: usize,
    /// Hidden groups at and below this node.
    pub hidden_groups: usize,
}

impl LayerNode {
    fn new(name: &str, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: BTreeMap::new(),
            leaf_layer: None,
            visible_groups: 0,
            hidden_groups: 0,
        }
    }
}

/// Tree of layers keyed by successive path segments.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerTree {
    nodes: Vec<LayerNode>,
}

impl Default for LayerTree {
    fn default() -> Self {
        Self { nodes: vec![LayerNode::new("", None)] }
    }
}

impl LayerTree {
    /// Root node id.
    pub const ROOT: NodeId = NodeId(0);

    /// Builds the tree for `layers`. The unnamed layer sits on the root.
    pub fn build(layers: &[Layer]) -> Self {
        let mut tree = Self::default();
        for (idx, layer) in layers.iter().enumerate() {
            let mut node = Self::ROOT;
            for segment in layer.path() {
                node = match tree.nodes[node.0].children.get(segment) {
                    Some(&child) => child,
                    None => {
                        let child = NodeId(tree.nodes.len());
                        tree.nodes.push(LayerNode::new(segment, Some(node)));
                        tree.nodes[node.0].children.insert(segment.to_string(), child);
                        child
                    }
                };
            }
            tree.nodes[node.0].leaf_layer = Some(idx);
        }
        tree
    }

    /// The root node.
    pub fn root(&self) -> &LayerNode {
        &self.nodes[0]
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> Option<&LayerNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Node reached by following `path` from the root.
    pub fn find<'a>(&self, path: impl IntoIterator<Item = &'a str>) -> Option<NodeId> {
        path.into_iter()
            .try_fold(Self::ROOT, |node, seg| self.nodes[node.0].children.get(seg).copied())
    }

    /// Full dotted path of `id`, without a trailing dot.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur.and_then(|id| self.nodes.get(id.0)) {
            if n.parent.is_some() {
                segments.push(n.name.as_str());
            }
            cur = n.parent;
        }
        segments.reverse();
        segments.join(".")
    }

    /// Refreshes visible/hidden group counts from group visibility.
    pub fn recompute(&mut self, layers: &[Layer], groups: &[ChannelGroup]) {
        for i in (0..self.nodes.len()).rev() {
            let (mut visible, mut hidden) = self.own_counts(i, layers, groups);
            for &child in self.nodes[i].children.values() {
                visible += self.nodes[child.0].visible_groups;
                hidden += self.nodes[child.0].hidden_groups;
            }
            let node = &mut self.nodes[i];
            node.visible_groups = visible;
            node.hidden_groups = hidden;
        }
    }

    /// Checks that every node's counts equal its leaf layer's plus its
    /// children's. Returns the first offending node.
    pub fn verify(&self, layers: &[Layer], groups: &[ChannelGroup]) -> Result<(), NodeId> {
        for (i, node) in self.nodes.iter().enumerate() {
            let (mut visible, mut hidden) = self.own_counts(i, layers, groups);
            for &child in node.children.values() {
                visible += self.nodes[child.0].visible_groups;
                hidden += self.nodes[child.0].hidden_groups;
            }
            if visible != node.visible_groups || hidden != node.hidden_groups {
                return Err(NodeId(i));
            }
        }
        Ok(())
    }

    /// Visits nodes depth-first in name order, passing the depth.
    pub fn walk(&self, mut f: impl FnMut(NodeId, &LayerNode, usize)) {
        let mut stack = vec![(Self::ROOT, 0)];
        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id.0];
            f(id, node, depth);
            stack.extend(node.children.values().rev().map(|&c| (c, depth + 1)));
        }
    }

    fn own_counts(&self, i: usize, layers: &[Layer], groups: &[ChannelGroup]) -> (usize, usize) {
        let Some(layer) = self.nodes[i].leaf_layer.and_then(|l| layers.get(l)) else {
            return (0, 0);
        };
        let visible = layer.groups.iter().filter(|&&g| groups[g].visible).count();
        (visible, layer.groups.len() - visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::group::build_layers_and_groups;

    fn setup() -> (Vec<Layer>, Vec<ChannelGroup>, LayerTree) {
        let chs: Vec<_> = ["R", "G", "B", "a.R", "a.G", "a.B", "a.b.Z", "a.b.c.Y", "d.Y"]
            .iter()
            .map(|n| Channel::new(*n, 1, 1))
            .collect();
        let (layers, groups) = build_layers_and_groups(&chs);
        let tree = LayerTree::build(&layers);
        (layers, groups, tree)
    }

    #[test]
    fn structure() {
        let (_, _, tree) = setup();
        let root = tree.root();
        assert_eq!(root.leaf_layer, Some(0));
        assert_eq!(root.children.keys().collect::<Vec<_>>(), ["a", "d"]);
        let c = tree.find(["a", "b", "c"]).unwrap();
        assert_eq!(tree.path_of(c), "a.b.c");
        assert!(tree.find(["a", "x"]).is_none());
        for (i, n) in tree.nodes.iter().enumerate() {
            if let Some(p) = n.parent {
                assert!(p.0 < i);
            }
        }
    }

    #[test]
    fn counts_follow_visibility() {
        let (layers, mut groups, mut tree) = setup();
        tree.recompute(&layers, &groups);
        assert_eq!(tree.root().visible_groups, groups.len());
        assert!(tree.verify(&layers, &groups).is_ok());

        // hide a.b.Z
        let z = groups.iter().position(|g| g.name == "Z").unwrap();
        groups[z].visible = false;
        assert!(tree.verify(&layers, &groups).is_err());
        tree.recompute(&layers, &groups);
        assert!(tree.verify(&layers, &groups).is_ok());

        let a = tree.find(["a"]).unwrap();
        let node = tree.node(a).unwrap();
        assert_eq!(node.visible_groups, 2);
        assert_eq!(node.hidden_groups, 1);
        assert_eq!(tree.root().visible_groups, groups.len() - 1);
    }

    #[test]
    fn walk_is_depth_first() {
        let (_, _, tree) = setup();
        let mut order = Vec::new();
        tree.walk(|id, _, depth| order.push((tree.path_of(id), depth)));
        let expected = [("", 0), ("a", 1), ("a.b", 2), ("a.b.c", 3), ("d", 1)];
        let expected: Vec<_> = expected.iter().map(|(p, d)| (p.to_string(), *d)).collect();
        assert_eq!(order, expected);
    }
}
