//! Rendering
//!
//! The frame loop talks to a `RenderBackend`; `WgpuRenderer` draws to a
//! window surface and `RecordingBackend` just remembers the commands.

pub mod pipeline;
pub mod recorder;
pub mod shapes;
pub mod texture;
pub mod vertex;

use glam::{Mat3, Mat4, Vec3, Vec4};

pub use pipeline::WgpuRenderer;
pub use recorder::{DrawCommand, RecordingBackend};
pub use vertex::ParticleInstance;

use crate::settings::MaterialParams;

/// Illumination model used by the lit pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadingModel {
    #[default]
    Lambert,
    Phong,
    BlinnPhong,
    Ggx,
}

impl ShadingModel {
    pub const ALL: [ShadingModel; 4] = [
        ShadingModel::Lambert,
        ShadingModel::Phong,
        ShadingModel::BlinnPhong,
        ShadingModel::Ggx,
    ];

    /// Variant for a 0-based selection index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Value passed to the shader
    pub fn index(self) -> u32 {
        self as u32
    }
}

/// Mesh shapes the renderer knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Cube,
    Sphere,
}

/// Texture bound for a lit draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Pin,
    Floor,
    Ball,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 3] = [TextureSlot::Pin, TextureSlot::Floor, TextureSlot::Ball];
}

/// Per-frame state shared by every draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_pos: Vec3,
    pub lights: [Vec3; 3],
    pub shading: ShadingModel,
    pub wireframe: bool,
    pub clear_color: Vec4,
}

/// One lit, textured mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshDraw {
    pub model: Mat4,
    pub normal: Mat3,
    pub texture: TextureSlot,
    /// UV repeat factor
    pub repeat: f32,
    pub material: MaterialParams,
}

/// The background batch: one shared model applied on top of the uploaded
/// per-instance matrices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstancedDraw {
    pub model: Mat4,
    pub color: Vec4,
    pub count: u32,
}

/// Draw submission interface used by the frame loop
pub trait RenderBackend {
    fn begin_frame(&mut self, frame: &FrameUniforms);

    fn draw_mesh(&mut self, mesh: MeshKind, draw: &MeshDraw);

    /// Additively blended point sprites
    fn draw_particles(&mut self, particles: &[ParticleInstance]);

    /// Replace the per-instance matrices (once per scene initialization)
    fn upload_instances(&mut self, matrices: &[Mat4]);

    fn draw_instanced(&mut self, mesh: MeshKind, draw: &InstancedDraw);

    /// Submit and present everything recorded since `begin_frame`
    fn end_frame(&mut self) -> Result<(), wgpu::SurfaceError>;
}
