//! Mesh generation
//!
//! Both shapes are unit sized: the cube spans [-1, 1] on every axis and the
//! sphere has radius 1, so a body's half extents scale them directly.

use std::f32::consts::PI;

use glam::Vec3;

use super::vertex::MeshVertex;

/// Indexed triangle list
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Cube with flat per-face normals and a full texture on each face
pub fn cube() -> MeshData {
    // (normal, u axis, v axis)
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

    let mut mesh = MeshData {
        vertices: Vec::with_capacity(24),
        indices: Vec::with_capacity(36),
    };

    for (normal, u_axis, v_axis) in FACES {
        let base = mesh.vertices.len() as u32;
        for (u, v) in CORNERS {
            let position = normal + u_axis * u + v_axis * v;
            mesh.vertices.push(MeshVertex::new(
                position.to_array(),
                normal.to_array(),
                [(u + 1.0) / 2.0, (1.0 - v) / 2.0],
            ));
        }
        // Counter-clockwise seen from outside
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// Latitude/longitude sphere
pub fn uv_sphere(segments: u32, rings: u32) -> MeshData {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut mesh = MeshData {
        vertices: Vec::with_capacity(((segments + 1) * (rings + 1)) as usize),
        indices: Vec::with_capacity((segments * rings * 6) as usize),
    };

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * PI;
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let theta = u * 2.0 * PI;
            let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), -phi.sin() * theta.sin());
            mesh.vertices
                .push(MeshVertex::new(normal.to_array(), normal.to_array(), [u, v]));
        }
    }

    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(mesh: &MeshData, tri: usize) -> Vec3 {
        let i = &mesh.indices[tri * 3..tri * 3 + 3];
        let p = |k: usize| Vec3::from_array(mesh.vertices[i[k] as usize].position);
        (p(1) - p(0)).cross(p(2) - p(0))
    }

    #[test]
    fn test_cube_counts_and_extent() {
        let mesh = cube();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.index_count(), 36);
        for v in &mesh.vertices {
            assert!(v.position.iter().all(|c| c.abs() == 1.0));
        }
    }

    #[test]
    fn test_cube_winding_faces_outward() {
        let mesh = cube();
        for tri in 0..12 {
            let geometric = face_normal(&mesh, tri);
            let stored = Vec3::from_array(mesh.vertices[mesh.indices[tri * 3] as usize].normal);
            assert!(geometric.dot(stored) > 0.0, "triangle {tri}");
        }
    }

    #[test]
    fn test_sphere_is_unit_radius() {
        let mesh = uv_sphere(16, 8);
        assert_eq!(mesh.vertices.len(), 17 * 9);
        assert_eq!(mesh.index_count(), 16 * 8 * 6);
        for v in &mesh.vertices {
            assert!((Vec3::from_array(v.position).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sphere_winding_faces_outward() {
        let mesh = uv_sphere(12, 6);
        for tri in 0..mesh.indices.len() / 3 {
            let geometric = face_normal(&mesh, tri);
            if geometric.length() < 1e-6 {
                // Degenerate at the poles
                continue;
            }
            let centroid: Vec3 = mesh.indices[tri * 3..tri * 3 + 3]
                .iter()
                .map(|&i| Vec3::from_array(mesh.vertices[i as usize].position))
                .sum();
            assert!(geometric.dot(centroid) > 0.0, "triangle {tri}");
        }
    }
}
