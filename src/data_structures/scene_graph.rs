//! Scene graph and hierarchical scene organization.
//!
//! The imported hierarchy is stored as an arena: every [`SceneNode`] lives in one
//! `Vec` and refers to its children by [`NodeId`]. Children can only be attached to
//! nodes that already exist, so the graph is always a tree rooted at
//! [`SceneGraph::root`].

use cgmath::{Matrix4, SquareMatrix};
use thiserror::Error;

/// Index of a node inside its [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One entry of the imported hierarchy.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    /// Node-space transform, relative to the parent.
    pub transform: Matrix4<f32>,
    /// Indices into the flat GPU mesh list.
    pub meshes: Vec<usize>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, transform: Matrix4<f32>) -> Self {
        Self {
            name: name.into(),
            transform,
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A node with an identity transform.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, Matrix4::identity())
    }

    pub fn with_meshes(mut self, meshes: impl IntoIterator<Item = usize>) -> Self {
        self.meshes.extend(meshes);
        self
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Raised when a node points at a mesh the scene does not contain.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("node {node:?} references mesh {mesh}, but the scene only has {mesh_count} meshes")]
pub struct InvalidMeshReference {
    pub node: String,
    pub mesh: usize,
    pub mesh_count: usize,
}

#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    root: NodeId,
}

impl SceneGraph {
    pub fn new(root: SceneNode) -> Self {
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Attach `node` as the last child of `parent` and return its id.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this graph.
    pub fn add_child(&mut self, parent: NodeId, node: SceneNode) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "unknown parent node {:?}", parent);
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order walk from the root, children in declared order, with each node's depth.
    pub fn depth_first(&self) -> Vec<(NodeId, usize)> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, 0)];
        while let Some((id, depth)) = stack.pop() {
            order.push((id, depth));
            for &child in self.node(id).children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        order
    }

    /// Total number of mesh references over all nodes.
    pub fn mesh_reference_count(&self) -> usize {
        self.nodes.iter().map(|node| node.meshes.len()).sum()
    }

    /// Check every mesh reference against the length of the flat mesh list.
    pub fn validate(&self, mesh_count: usize) -> Result<(), InvalidMeshReference> {
        for node in &self.nodes {
            if let Some(&mesh) = node.meshes.iter().find(|&&mesh| mesh >= mesh_count) {
                return Err(InvalidMeshReference {
                    node: node.name.clone(),
                    mesh,
                    mesh_count,
                });
            }
        }
        Ok(())
    }
}
