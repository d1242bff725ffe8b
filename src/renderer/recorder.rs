//! Headless backend
//!
//! Records every submission instead of drawing it. Used to drive the frame
//! loop without a GPU.

use glam::Mat4;

use super::{FrameUniforms, InstancedDraw, MeshDraw, MeshKind, ParticleInstance, RenderBackend};

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Begin(FrameUniforms),
    Mesh(MeshKind, MeshDraw),
    Particles(Vec<ParticleInstance>),
    Instanced(MeshKind, InstancedDraw),
    End,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    commands: Vec<DrawCommand>,
    instances: Vec<Mat4>,
    uploads: usize,
    frames: usize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands since the last `clear`
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Latest uploaded instance matrices
    pub fn instances(&self) -> &[Mat4] {
        &self.instances
    }

    /// Number of `upload_instances` calls so far
    pub fn upload_count(&self) -> usize {
        self.uploads
    }

    /// Completed frames
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Mesh draws of one shape
    pub fn meshes(&self, kind: MeshKind) -> impl Iterator<Item = &MeshDraw> {
        self.commands.iter().filter_map(move |c| match c {
            DrawCommand::Mesh(k, draw) if *k == kind => Some(draw),
            _ => None,
        })
    }
}

impl RenderBackend for RecordingBackend {
    fn begin_frame(&mut self, frame: &FrameUniforms) {
        self.commands.push(DrawCommand::Begin(*frame));
    }

    fn draw_mesh(&mut self, mesh: MeshKind, draw: &MeshDraw) {
        self.commands.push(DrawCommand::Mesh(mesh, *draw));
    }

    fn draw_particles(&mut self, particles: &[ParticleInstance]) {
        self.commands.push(DrawCommand::Particles(particles.to_vec()));
    }

    fn upload_instances(&mut self, matrices: &[Mat4]) {
        self.instances = matrices.to_vec();
        self.uploads += 1;
    }

    fn draw_instanced(&mut self, mesh: MeshKind, draw: &InstancedDraw) {
        self.commands.push(DrawCommand::Instanced(mesh, *draw));
    }

    fn end_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.commands.push(DrawCommand::End);
        self.frames += 1;
        Ok(())
    }
}
