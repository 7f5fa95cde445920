use bytemuck::{NoUninit, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, NoUninit, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Append another mesh, transforming its vertices by `transform`.
    pub fn append_transformed(&mut self, other: &Mesh, transform: Mat4) {
        let base = self.vertices.len() as u32;
        let normal_matrix = transform.inverse().transpose();
        self.vertices.extend(other.vertices.iter().map(|v| {
            let pos = transform.transform_point3(Vec3::from(v.pos));
            let normal = normal_matrix
                .transform_vector3(Vec3::from(v.normal))
                .normalize_or_zero();
            Vertex {
                pos: pos.into(),
                normal: normal.into(),
                ..*v
            }
        }));
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Axis-aligned bounds as (min, max), `None` when there are no vertices.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from(v.pos));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Solid box centered at the origin (triangle list).
pub fn create_box_mesh(half: Vec3, color: [f32; 4]) -> Mesh {
    // (normal, u axis, v axis) per face
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut mesh = Mesh::empty();
    for (normal, u, v) in faces {
        let base = mesh.vertices.len() as u32;
        let center = normal * half;
        let du = u * half;
        let dv = v * half;
        let corners = [
            (center - du - dv, [0.0, 0.0]),
            (center + du - dv, [1.0, 0.0]),
            (center + du + dv, [1.0, 1.0]),
            (center - du + dv, [0.0, 1.0]),
        ];
        for (p, uv) in corners {
            mesh.vertices.push(Vertex {
                pos: p.into(),
                normal: normal.into(),
                color,
                uv,
            });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// Horizontal square at y = 0 facing up, uv.y runs along +Z.
pub fn create_ground_mesh(size: f32, color: [f32; 4]) -> Mesh {
    let h = size / 2.0;
    let n = [0.0, 1.0, 0.0];
    let verts = vec![
        Vertex { pos: [-h, 0.0, h], normal: n, color, uv: [0.0, 0.0] },
        Vertex { pos: [h, 0.0, h], normal: n, color, uv: [1.0, 0.0] },
        Vertex { pos: [h, 0.0, -h], normal: n, color, uv: [1.0, 1.0] },
        Vertex { pos: [-h, 0.0, -h], normal: n, color, uv: [0.0, 1.0] },
    ];
    Mesh {
        vertices: verts,
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// Grid of lines on the ground plane (line list), center lines highlighted.
pub fn create_grid_mesh(size: f32, divisions: u32) -> Mesh {
    let center_color = [0.27, 0.27, 0.27, 1.0];
    let line_color = [0.53, 0.53, 0.53, 1.0];
    let divisions = divisions.max(1);
    let half = size / 2.0;
    let step = size / divisions as f32;
    let n = [0.0, 1.0, 0.0];

    let mut mesh = Mesh::empty();
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if i == divisions / 2 { center_color } else { line_color };
        for (a, b) in [([-half, 0.0, k], [half, 0.0, k]), ([k, 0.0, -half], [k, 0.0, half])] {
            let base = mesh.vertices.len() as u32;
            mesh.vertices.push(Vertex { pos: a, normal: n, color, uv: [0.0, 0.0] });
            mesh.vertices.push(Vertex { pos: b, normal: n, color, uv: [1.0, 0.0] });
            mesh.indices.extend_from_slice(&[base, base + 1]);
        }
    }
    mesh
}

/// Small wire diamond marking a point light (line list).
pub fn create_light_helper_mesh(center: Vec3, radius: f32, color: [f32; 4]) -> Mesh {
    let axes = [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z];
    let top = center + Vec3::Y * radius;
    let bottom = center - Vec3::Y * radius;
    let ring: Vec<Vec3> = axes.iter().map(|a| center + *a * radius).collect();

    let mut mesh = Mesh::empty();
    let mut line = |a: Vec3, b: Vec3| {
        let base = mesh.vertices.len() as u32;
        for p in [a, b] {
            mesh.vertices.push(Vertex { pos: p.into(), normal: [0.0, 1.0, 0.0], color, uv: [0.0, 0.0] });
        }
        mesh.indices.extend_from_slice(&[base, base + 1]);
    };
    for p in &ring {
        line(top, *p);
        line(bottom, *p);
    }
    for (a, b) in [(0, 2), (2, 1), (1, 3), (3, 0)] {
        line(ring[a], ring[b]);
    }
    mesh
}
