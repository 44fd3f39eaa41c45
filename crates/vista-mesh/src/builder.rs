//! Heightfield triangulation at a given level of detail.
//!
//! The height grid carries one extra ring of samples on every side. Those
//! border samples become vertices that are never emitted; they only
//! contribute triangles to the normal accumulation so that lighting matches
//! across chunk edges.
//!
//! Inside the border the first rendered ring (mesh edge) is always at full
//! resolution. The second ring (edge connection) is also full resolution, but
//! vertices that do not coincide with a coarse vertex get their height
//! interpolated along the ring between the two nearest coarse ("main")
//! vertices. The coarse interior therefore meets a full-resolution edge
//! without cracks, and any two LODs meet along identical edges.

use glam::{Vec2, Vec3};
use vista_lod::LevelOfDetail;
use vista_terrain::{HeightCurve, HeightGrid};

use crate::vertex::{TerrainMesh, TerrainVertex};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VertexClass {
    OutOfMesh,
    Skipped,
    MeshEdge,
    Main,
    EdgeConnection,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VertexRef {
    Mesh(u32),
    Border(u32),
}

/// Classify grid sample `(x, y)` of a `size x size` grid meshed with `stride`.
fn classify(x: usize, y: usize, size: usize, stride: usize) -> VertexClass {
    let last = size - 1;
    if x == 0 || y == 0 || x == last || y == last {
        return VertexClass::OutOfMesh;
    }
    let on_stride = x >= 2 && y >= 2 && (x - 2) % stride == 0 && (y - 2) % stride == 0;
    let interior = x > 2 && x < size - 3 && y > 2 && y < size - 3;
    if interior && !on_stride {
        return VertexClass::Skipped;
    }
    if x == 1 || y == 1 || x == size - 2 || y == size - 2 {
        return VertexClass::MeshEdge;
    }
    if on_stride {
        return VertexClass::Main;
    }
    VertexClass::EdgeConnection
}

/// Vertex and triangle accumulation, split into rendered and border parts.
struct MeshData {
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
    border_positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    border_triangles: Vec<[VertexRef; 3]>,
}

impl MeshData {
    fn with_capacity(mesh_vertices: usize, border_vertices: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; mesh_vertices],
            uvs: vec![Vec2::ZERO; mesh_vertices],
            border_positions: vec![Vec3::ZERO; border_vertices],
            triangles: Vec::with_capacity(mesh_vertices * 2),
            border_triangles: Vec::with_capacity(border_vertices * 2),
        }
    }

    fn add_vertex(&mut self, vertex: VertexRef, position: Vec3, uv: Vec2) {
        match vertex {
            VertexRef::Mesh(i) => {
                self.positions[i as usize] = position;
                self.uvs[i as usize] = uv;
            }
            VertexRef::Border(i) => self.border_positions[i as usize] = position,
        }
    }

    fn add_triangle(&mut self, a: VertexRef, b: VertexRef, c: VertexRef) {
        match (a, b, c) {
            (VertexRef::Mesh(a), VertexRef::Mesh(b), VertexRef::Mesh(c)) => {
                self.triangles.push([a, b, c]);
            }
            _ => self.border_triangles.push([a, b, c]),
        }
    }

    fn position(&self, vertex: VertexRef) -> Vec3 {
        match vertex {
            VertexRef::Mesh(i) => self.positions[i as usize],
            VertexRef::Border(i) => self.border_positions[i as usize],
        }
    }

    fn face_normal(&self, [a, b, c]: [VertexRef; 3]) -> Vec3 {
        let (a, b, c) = (self.position(a), self.position(b), self.position(c));
        (b - a).cross(c - a).normalize_or_zero()
    }

    fn smooth_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for &[a, b, c] in &self.triangles {
            let corners = [VertexRef::Mesh(a), VertexRef::Mesh(b), VertexRef::Mesh(c)];
            let normal = self.face_normal(corners);
            normals[a as usize] += normal;
            normals[b as usize] += normal;
            normals[c as usize] += normal;
        }
        for &corners in &self.border_triangles {
            let normal = self.face_normal(corners);
            for corner in corners {
                if let VertexRef::Mesh(i) = corner {
                    normals[i as usize] += normal;
                }
            }
        }
        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }
        normals
    }

    fn into_smooth_mesh(self, lod: LevelOfDetail) -> TerrainMesh {
        let normals = self.smooth_normals();
        let vertices = self
            .positions
            .iter()
            .zip(&self.uvs)
            .zip(&normals)
            .map(|((position, uv), normal)| TerrainVertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: uv.to_array(),
            })
            .collect();
        let indices = self.triangles.iter().flatten().copied().collect();
        TerrainMesh {
            vertices,
            indices,
            lod,
            flat_shaded: false,
        }
    }

    /// One vertex per triangle corner, each carrying the face normal.
    fn into_flat_mesh(self, lod: LevelOfDetail) -> TerrainMesh {
        let mut vertices = Vec::with_capacity(self.triangles.len() * 3);
        for &[a, b, c] in &self.triangles {
            let normal = self
                .face_normal([VertexRef::Mesh(a), VertexRef::Mesh(b), VertexRef::Mesh(c)])
                .to_array();
            for i in [a, b, c] {
                vertices.push(TerrainVertex {
                    position: self.positions[i as usize].to_array(),
                    normal,
                    uv: self.uvs[i as usize].to_array(),
                });
            }
        }
        let indices = (0..vertices.len() as u32).collect();
        TerrainMesh {
            vertices,
            indices,
            lod,
            flat_shaded: true,
        }
    }
}

/// Build the mesh of one chunk.
///
/// `heights` is the chunk's `(chunk_size + 5)`-square normalised height grid.
/// Vertex heights are `curve(h) * height_multiplier`; horizontal positions are
/// centred on the chunk so the rendered span is `±(chunk_size + 2) / 2`.
///
/// # Panics
///
/// Panics if the grid is not square, is smaller than 6 samples, or if
/// `lod`'s stride does not divide `grid size - 5`. Sizes from
/// [`crate::SUPPORTED_CHUNK_SIZES`] always satisfy this.
pub fn build_terrain_mesh(
    heights: &HeightGrid,
    height_multiplier: f32,
    curve: &HeightCurve,
    lod: LevelOfDetail,
    flat_shading: bool,
) -> TerrainMesh {
    assert!(heights.is_square(), "terrain height grid must be square");
    let size = heights.width();
    assert!(size >= 6, "terrain height grid must be at least 6 samples wide");
    let stride = lod.stride();
    assert!(
        (size - 5) % stride == 0,
        "stride {stride} of {lod} does not divide chunk size {}",
        size - 5
    );

    let mut refs: Vec<Option<VertexRef>> = vec![None; size * size];
    let mut mesh_count = 0u32;
    let mut border_count = 0u32;
    for y in 0..size {
        for x in 0..size {
            refs[y * size + x] = match classify(x, y, size, stride) {
                VertexClass::OutOfMesh => {
                    border_count += 1;
                    Some(VertexRef::Border(border_count - 1))
                }
                VertexClass::Skipped => None,
                _ => {
                    mesh_count += 1;
                    Some(VertexRef::Mesh(mesh_count - 1))
                }
            };
        }
    }

    let surface = |x: usize, y: usize| curve.evaluate(heights.get(x, y)) * height_multiplier;
    let at = |x: usize, y: usize| refs[y * size + x];
    let half = (size - 1) as f32 / 2.0;
    let rendered_span = (size - 3) as f32;
    let mut data = MeshData::with_capacity(mesh_count as usize, border_count as usize);

    for y in 0..size {
        for x in 0..size {
            let Some(vertex) = at(x, y) else {
                continue;
            };
            let class = classify(x, y, size, stride);

            let height = if class == VertexClass::EdgeConnection {
                connection_height(x, y, size, stride, &surface)
            } else {
                surface(x, y)
            };
            let position = Vec3::new(x as f32 - half, height, y as f32 - half);
            let uv = Vec2::new(x as f32 - 1.0, y as f32 - 1.0) / rendered_span;
            data.add_vertex(vertex, position, uv);

            let starts_quad = x < size - 1
                && y < size - 1
                && (class != VertexClass::EdgeConnection || (x != 2 && y != 2));
            if !starts_quad {
                continue;
            }
            let step = if class == VertexClass::Main && x != size - 3 && y != size - 3 {
                stride
            } else {
                1
            };
            if let (Some(a), Some(b), Some(c), Some(d)) =
                (at(x, y), at(x + step, y), at(x, y + step), at(x + step, y + step))
            {
                data.add_triangle(a, c, d);
                data.add_triangle(d, b, a);
            }
        }
    }

    let mesh = if flat_shading {
        data.into_flat_mesh(lod)
    } else {
        data.into_smooth_mesh(lod)
    };
    tracing::trace!(
        %lod,
        flat_shading,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "built terrain mesh"
    );
    mesh
}

/// Height of an edge-connection vertex, interpolated between the coarse
/// vertices on either side of it along the ring.
fn connection_height(
    x: usize,
    y: usize,
    size: usize,
    stride: usize,
    surface: &impl Fn(usize, usize) -> f32,
) -> f32 {
    let vertical = x == 2 || x == size - 3;
    let along = if vertical { y - 2 } else { x - 2 };
    let to_a = along % stride;
    let to_b = stride - to_a;
    let t = to_a as f32 / stride as f32;
    let (height_a, height_b) = if vertical {
        (surface(x, y - to_a), surface(x, y + to_b))
    } else {
        (surface(x - to_a, y), surface(x + to_b, y))
    };
    height_a * (1.0 - t) + height_b * t
}
