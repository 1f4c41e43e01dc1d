//! Scene graph traversal and draw recording.
//!
//! [`render_node`] walks the node tree depth first, accumulating node transforms.
//! Each node is spun in place about its own world-space origin by the shared spin
//! angle, gets a normal matrix for view-space lighting, and draws every mesh it
//! references. The traversal talks to a [`DrawTarget`], so the same walk feeds the
//! GPU frame ([`FrameRecorder`] replayed by [`FrameRecorder::replay`]) and tests.
//!
//! # Key types
//!
//! - [`DrawTarget`] receives per-node matrices and mesh draws
//! - [`FrameRecorder`] records a frame's object slots and draws for later replay
//! - [`SceneRenderer`] owns the GPU meshes and drives one frame

use cgmath::{Deg, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3};
use thiserror::Error;

use crate::{
    data_structures::{
        model::GpuMesh,
        scene_graph::{NodeId, SceneGraph, SceneNode},
    },
    pipelines::uniforms::{ObjectUniform, UniformResources},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("node {node:?} references mesh {mesh}, but only {mesh_count} meshes are loaded")]
    UnknownMesh {
        node: String,
        mesh: usize,
        mesh_count: usize,
    },
}

/// Receives the output of one traversal.
pub trait DrawTarget {
    /// Matrices for the draws that follow, until the next call.
    fn set_object(&mut self, uniform: ObjectUniform);
    /// Draw one mesh of the flat mesh list with the current object matrices.
    fn draw_mesh(&mut self, node: &str, mesh: usize) -> Result<(), RenderError>;
}

/// Rotation about world Z by `angle`, pivoting on the translation column of `model`.
pub fn spin_about_origin(model: &Matrix4<f32>, angle: Deg<f32>) -> Matrix4<f32> {
    let origin = Vector3::new(model.w.x, model.w.y, model.w.z);
    Matrix4::from_translation(origin)
        * Matrix4::from_angle_z(angle)
        * Matrix4::from_translation(-origin)
}

/// `transpose(inverse(mat3(view * model)))`.
///
/// A singular upper 3x3 (a node scaled to zero) has no inverse; identity is used
/// instead and a warning is logged.
pub fn normal_matrix(view: &Matrix4<f32>, model: &Matrix4<f32>) -> Matrix3<f32> {
    let model_view = view * model;
    let upper = Matrix3::from_cols(
        model_view.x.truncate(),
        model_view.y.truncate(),
        model_view.z.truncate(),
    );
    match upper.invert() {
        Some(inverse) => inverse.transpose(),
        None => {
            log::warn!("singular model-view matrix, using identity normal matrix");
            Matrix3::identity()
        }
    }
}

/// Traverse the subtree at `id`.
///
/// `parent` is the accumulated, pre-spin transform of the parent. Children inherit
/// the pre-spin transform of this node, so the spin is applied fresh per node and
/// never compounds down the tree.
pub fn render_node<T: DrawTarget + ?Sized>(
    graph: &SceneGraph,
    id: NodeId,
    parent: &Matrix4<f32>,
    view: &Matrix4<f32>,
    spin: Deg<f32>,
    target: &mut T,
) -> Result<(), RenderError> {
    let mut traversal = Traversal {
        graph,
        view,
        spin,
        target,
        dump: false,
    };
    traversal.visit(id, parent, 0)
}

struct Traversal<'a, T: DrawTarget + ?Sized> {
    graph: &'a SceneGraph,
    view: &'a Matrix4<f32>,
    spin: Deg<f32>,
    target: &'a mut T,
    dump: bool,
}

impl<T: DrawTarget + ?Sized> Traversal<'_, T> {
    fn visit(
        &mut self,
        id: NodeId,
        parent: &Matrix4<f32>,
        depth: usize,
    ) -> Result<(), RenderError> {
        let node = self.graph.node(id);
        let node_model = parent * node.transform;
        if self.dump {
            dump_node(node, parent, &node_model, depth);
        }

        let model = spin_about_origin(&node_model, self.spin) * node_model;
        let normal = normal_matrix(self.view, &model);
        self.target.set_object(ObjectUniform::new(model, normal));
        for &mesh in &node.meshes {
            self.target.draw_mesh(&node.name, mesh)?;
        }

        for &child in node.children() {
            self.visit(child, &node_model, depth + 1)?;
        }
        Ok(())
    }
}

fn dump_node(node: &SceneNode, parent: &Matrix4<f32>, accumulated: &Matrix4<f32>, depth: usize) {
    let indent = "\t".repeat(depth);
    let cols = |m: &Matrix4<f32>| -> [[f32; 4]; 4] { (*m).into() };
    log::debug!("{}Node name: {}", indent, node.name);
    log::debug!("{}Mesh count: {}", indent, node.meshes.len());
    log::debug!("{}Child count: {}", indent, node.children().len());
    log::debug!("{}Parent model matrix: {:?}", indent, cols(parent));
    log::debug!("{}Node transform: {:?}", indent, cols(&node.transform));
    log::debug!("{}Current model matrix: {:?}", indent, cols(accumulated));
}

/// One recorded mesh draw: which object slot to bind and which mesh to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordedDraw {
    pub slot: usize,
    pub mesh: usize,
}

/// Collects a frame so it can be uploaded and replayed inside one render pass.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    mesh_count: usize,
    objects: Vec<ObjectUniform>,
    draws: Vec<RecordedDraw>,
}

impl FrameRecorder {
    pub fn new(mesh_count: usize) -> Self {
        Self {
            mesh_count,
            ..Default::default()
        }
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.draws.clear();
    }

    pub fn objects(&self) -> &[ObjectUniform] {
        &self.objects
    }

    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    /// Issue the recorded draws. Group 2 is rebound with each draw's slot offset.
    pub fn replay(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        uniforms: &UniformResources,
        meshes: &[GpuMesh],
    ) {
        for draw in &self.draws {
            if draw.slot >= uniforms.object_capacity {
                continue;
            }
            render_pass.set_bind_group(
                2,
                &uniforms.object_bind_group,
                &[uniforms.dynamic_offset(draw.slot)],
            );
            if let Some(mesh) = meshes.get(draw.mesh) {
                mesh.draw(render_pass);
            }
        }
    }
}

impl DrawTarget for FrameRecorder {
    fn set_object(&mut self, uniform: ObjectUniform) {
        self.objects.push(uniform);
    }

    fn draw_mesh(&mut self, node: &str, mesh: usize) -> Result<(), RenderError> {
        if mesh >= self.mesh_count {
            return Err(RenderError::UnknownMesh {
                node: node.to_string(),
                mesh,
                mesh_count: self.mesh_count,
            });
        }
        // set_object always runs before a node's draws
        let slot = self.objects.len().saturating_sub(1);
        self.draws.push(RecordedDraw { slot, mesh });
        Ok(())
    }
}

/// Owns the uploaded meshes of a scene and records/replays its frames.
pub struct SceneRenderer {
    pub graph: SceneGraph,
    pub meshes: Vec<GpuMesh>,
    recorder: FrameRecorder,
    dump_next_frame: bool,
}

impl SceneRenderer {
    pub fn new(graph: SceneGraph, meshes: Vec<GpuMesh>, debug_scene: bool) -> Self {
        let recorder = FrameRecorder::new(meshes.len());
        Self {
            graph,
            meshes,
            recorder,
            dump_next_frame: debug_scene,
        }
    }

    /// Number of object slots one frame needs: one per node.
    pub fn object_slots(&self) -> usize {
        self.graph.len()
    }

    /// Walk the graph from its root with an identity parent and record the frame.
    pub fn record(
        &mut self,
        view: &Matrix4<f32>,
        spin: Deg<f32>,
    ) -> Result<&FrameRecorder, RenderError> {
        self.recorder.clear();
        let mut traversal = Traversal {
            graph: &self.graph,
            view,
            spin,
            target: &mut self.recorder,
            dump: std::mem::take(&mut self.dump_next_frame),
        };
        traversal.visit(self.graph.root(), &Matrix4::identity(), 0)?;
        Ok(&self.recorder)
    }

    pub fn recorder(&self) -> &FrameRecorder {
        &self.recorder
    }

    /// Free every mesh; safe to call more than once.
    pub fn release(&mut self) {
        for mesh in &mut self.meshes {
            mesh.release();
        }
    }
}

impl Drop for SceneRenderer {
    fn drop(&mut self) {
        self.release();
    }
}
