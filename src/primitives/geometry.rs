/*
MIT License

Copyright (c) 2021, 2022, 2024, 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use std::collections::BTreeSet;
use std::f32::consts::PI;

use anyhow::ensure;
use cgmath::{InnerSpace, Vector3};
use rand::Rng;

/// Vertex data kept on the CPU until a mesh uploads it. `normals` and `uvs`
/// are either empty or have one entry per position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Option<Vec<u32>>,
}

impl Geometry {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of vertices a triangle list draw call consumes.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.indices
            .as_ref()
            .map_or(self.positions.len(), Vec::len)
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.draw_count() / 3
    }

    /// Builds a non-indexed triangle list out of a flat coordinate buffer:
    /// every 3 values are one vertex, every 9 values one triangle.
    pub fn from_flat_positions(buffer: &[f32]) -> anyhow::Result<Self> {
        ensure!(
            buffer.len() % 9 == 0,
            "Flat position buffer of {} values does not hold whole triangles",
            buffer.len()
        );
        let positions = buffer
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Ok(Self {
            positions,
            ..Self::default()
        })
    }

    /// Line list indices covering every edge of every triangle, shared edges
    /// included once.
    pub fn wireframe_edges(&self) -> anyhow::Result<Vec<u32>> {
        let triangles: Vec<u32> = match &self.indices {
            Some(indices) => indices.clone(),
            None => (0..u32::try_from(self.positions.len())?).collect(),
        };
        let mut seen = BTreeSet::new();
        let mut lines = Vec::with_capacity(triangles.len() * 2);
        for triangle in triangles.chunks_exact(3) {
            for (a, b) in [
                (triangle[0], triangle[1]),
                (triangle[1], triangle[2]),
                (triangle[2], triangle[0]),
            ] {
                if seen.insert((a.min(b), a.max(b))) {
                    lines.extend([a, b]);
                }
            }
        }
        Ok(lines)
    }
}

#[derive(Clone, Copy)]
enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

struct PlaneParams {
    u: Axis,
    v: Axis,
    w: Axis,
    u_dir: f32,
    v_dir: f32,
    width: f32,
    height: f32,
    depth: f32,
}

/// Appends the 4 vertices of one face, `first` being the index of the first.
fn push_box_face(geometry: &mut Geometry, indices: &mut Vec<u32>, plane: &PlaneParams, first: u32) {
    let normal_w = if plane.depth > 0.0 { 1.0 } else { -1.0 };
    for iy in 0..2u8 {
        let y = f32::from(iy) * plane.height - plane.height / 2.0;
        for ix in 0..2u8 {
            let x = f32::from(ix) * plane.width - plane.width / 2.0;
            let mut position = [0.0; 3];
            position[plane.u as usize] = x * plane.u_dir;
            position[plane.v as usize] = y * plane.v_dir;
            position[plane.w as usize] = plane.depth / 2.0;
            let mut normal = [0.0; 3];
            normal[plane.w as usize] = normal_w;
            geometry.positions.push(position);
            geometry.normals.push(normal);
            geometry.uvs.push([f32::from(ix), 1.0 - f32::from(iy)]);
        }
    }
    let (a, b, c, d) = (first, first + 2, first + 3, first + 1);
    indices.extend([a, b, d, b, c, d]);
}

/// Axis aligned box centered on the origin, 4 vertices per face so that each
/// face gets its own normal and full texture.
#[must_use]
pub fn box_geometry(width: f32, height: f32, depth: f32) -> Geometry {
    use Axis::{X, Y, Z};
    let mut geometry = Geometry::default();
    let mut indices = Vec::with_capacity(36);
    #[rustfmt::skip]
    let faces = [
        PlaneParams { u: Z, v: Y, w: X, u_dir: -1., v_dir: -1., width: depth, height, depth: width },
        PlaneParams { u: Z, v: Y, w: X, u_dir: 1., v_dir: -1., width: depth, height, depth: -width },
        PlaneParams { u: X, v: Z, w: Y, u_dir: 1., v_dir: 1., width, height: depth, depth: height },
        PlaneParams { u: X, v: Z, w: Y, u_dir: 1., v_dir: -1., width, height: depth, depth: -height },
        PlaneParams { u: X, v: Y, w: Z, u_dir: 1., v_dir: -1., width, height, depth },
        PlaneParams { u: X, v: Y, w: Z, u_dir: -1., v_dir: -1., width, height, depth: -depth },
    ];
    for (face, first) in faces.iter().zip((0u32..).step_by(4)) {
        push_box_face(&mut geometry, &mut indices, face, first);
    }
    geometry.indices = Some(indices);
    geometry
}

/// UV sphere centered on the origin. Rows at the poles collapse to a single
/// point, so they only produce one triangle per segment.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sphere_geometry(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut geometry = Geometry::default();
    let mut grid = Vec::with_capacity(height_segments as usize + 1);
    let mut index = 0u32;
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        // Center the pole texture coordinate on its segment
        let u_offset = if iy == 0 {
            0.5 / width_segments as f32
        } else if iy == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };
        let mut row = Vec::with_capacity(width_segments as usize + 1);
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * 2.0 * PI;
            let theta = v * PI;
            let position = Vector3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            );
            let normal = if position.magnitude2() > 0.0 {
                position.normalize()
            } else {
                Vector3::unit_y()
            };
            geometry.positions.push(position.into());
            geometry.normals.push(normal.into());
            geometry.uvs.push([u + u_offset, 1.0 - v]);
            row.push(index);
            index += 1;
        }
        grid.push(row);
    }
    let mut indices = Vec::new();
    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                indices.extend([a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                indices.extend([b, c, d]);
            }
        }
    }
    geometry.indices = Some(indices);
    geometry
}

pub const RANDOM_TRIANGLE_COUNT: usize = 50;
pub const RANDOM_TRIANGLE_SPREAD: f32 = 3.0;

/// Flat buffer of `count` triangles (`count * 3 * 3` values) whose
/// coordinates are uniformly spread in `[-spread / 2, spread / 2)`.
pub fn random_triangles<R: Rng + ?Sized>(count: usize, spread: f32, rng: &mut R) -> Vec<f32> {
    (0..count * 3 * 3)
        .map(|_| (rng.r#gen::<f32>() - 0.5) * spread)
        .collect()
}

/// Segments from the origin along each positive axis, colored red, green
/// and blue for X, Y and Z.
#[must_use]
pub fn axes_helper(size: f32) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
    use super::color::{COLOR_BLUE, COLOR_GREEN, COLOR_RED};
    let positions = vec![
        [0., 0., 0.],
        [size, 0., 0.],
        [0., 0., 0.],
        [0., size, 0.],
        [0., 0., 0.],
        [0., 0., size],
    ];
    let colors = vec![
        COLOR_RED, COLOR_RED, COLOR_GREEN, COLOR_GREEN, COLOR_BLUE, COLOR_BLUE,
    ];
    (positions, colors)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn face_normal(geometry: &Geometry, triangle: &[u32]) -> Vector3<f32> {
        let p = |i: u32| Vector3::from(geometry.positions[i as usize]);
        (p(triangle[1]) - p(triangle[0]))
            .cross(p(triangle[2]) - p(triangle[0]))
            .normalize()
    }

    #[test]
    fn box_has_four_vertices_and_two_triangles_per_face() {
        let geometry = box_geometry(1.0, 2.0, 1.0);
        assert_eq!(geometry.vertex_count(), 24);
        assert_eq!(geometry.normals.len(), 24);
        assert_eq!(geometry.uvs.len(), 24);
        assert_eq!(geometry.draw_count(), 36);
        assert_eq!(geometry.triangle_count(), 12);
    }

    #[test]
    fn box_extent_matches_dimensions() {
        let geometry = box_geometry(1.0, 2.0, 3.0);
        for axis in 0..3 {
            let max = geometry
                .positions
                .iter()
                .map(|p| p[axis])
                .fold(f32::MIN, f32::max);
            let min = geometry
                .positions
                .iter()
                .map(|p| p[axis])
                .fold(f32::MAX, f32::min);
            let expected = [1.0, 2.0, 3.0][axis];
            assert_abs_diff_eq!(max - min, expected);
        }
    }

    #[test]
    fn box_triangles_wind_counter_clockwise_outwards() {
        let geometry = box_geometry(1.0, 1.0, 1.0);
        let indices = geometry.indices.as_ref().expect("box is indexed");
        for triangle in indices.chunks_exact(3) {
            let normal = Vector3::from(geometry.normals[triangle[0] as usize]);
            assert_abs_diff_eq!(face_normal(&geometry, triangle), normal, epsilon = 1e-5);
        }
    }

    #[test]
    fn sphere_layout() {
        let geometry = sphere_geometry(1.0, 32, 32);
        assert_eq!(geometry.vertex_count(), 33 * 33);
        // Poles rows only contribute one triangle per segment
        assert_eq!(geometry.triangle_count(), 32 * (2 * 32 - 2));
        for (position, normal) in geometry.positions.iter().zip(&geometry.normals) {
            let position = Vector3::from(*position);
            assert_abs_diff_eq!(position.magnitude(), 1.0, epsilon = 1e-5);
            assert_abs_diff_eq!(Vector3::from(*normal), position, epsilon = 1e-5);
        }
    }

    #[test]
    fn sphere_triangles_face_outwards() {
        let geometry = sphere_geometry(2.0, 8, 6);
        let indices = geometry.indices.as_ref().expect("sphere is indexed");
        for triangle in indices.chunks_exact(3) {
            let centroid = triangle
                .iter()
                .map(|&i| Vector3::from(geometry.positions[i as usize]))
                .sum::<Vector3<f32>>();
            assert!(face_normal(&geometry, triangle).dot(centroid) > 0.0);
        }
    }

    #[test]
    fn sphere_segments_have_a_floor() {
        let geometry = sphere_geometry(1.0, 0, 0);
        assert_eq!(geometry.vertex_count(), 4 * 3);
        assert!(geometry.triangle_count() > 0);
    }

    #[test]
    fn random_triangles_fill_a_flat_buffer_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let buffer = random_triangles(RANDOM_TRIANGLE_COUNT, RANDOM_TRIANGLE_SPREAD, &mut rng);
        assert_eq!(buffer.len(), 450);
        assert!(buffer.iter().all(|v| (-1.5..1.5).contains(v)));
        let geometry = Geometry::from_flat_positions(&buffer).expect("whole triangles");
        assert_eq!(geometry.vertex_count(), 150);
        assert_eq!(geometry.triangle_count(), 50);
        assert_eq!(geometry.positions[1], [buffer[3], buffer[4], buffer[5]]);
    }

    #[test]
    fn random_triangles_depend_on_seed() {
        let first = random_triangles(2, 3.0, &mut StdRng::seed_from_u64(1));
        let again = random_triangles(2, 3.0, &mut StdRng::seed_from_u64(1));
        let other = random_triangles(2, 3.0, &mut StdRng::seed_from_u64(2));
        assert_eq!(first, again);
        assert_ne!(first, other);
    }

    #[test]
    fn partial_triangles_are_rejected() {
        assert!(Geometry::from_flat_positions(&[0.0; 10]).is_err());
        assert!(Geometry::from_flat_positions(&[]).is_ok());
    }

    #[test]
    fn wireframe_of_loose_triangles_draws_three_edges_each() {
        let geometry = Geometry::from_flat_positions(&[0.0; 18]).expect("two triangles");
        let lines = geometry.wireframe_edges().expect("small geometry");
        assert_eq!(lines, vec![0, 1, 1, 2, 2, 0, 3, 4, 4, 5, 5, 3]);
    }

    #[test]
    fn wireframe_of_box_shares_diagonal_edges() {
        let geometry = box_geometry(1.0, 1.0, 1.0);
        // Per face: 4 border edges plus the shared diagonal
        assert_eq!(geometry.wireframe_edges().expect("small geometry").len(), 6 * 5 * 2);
    }

    #[test]
    fn axes_are_colored_per_axis() {
        let (positions, colors) = axes_helper(3.0);
        assert_eq!(positions.len(), 6);
        assert_eq!(positions[3], [0., 3., 0.]);
        assert_eq!(colors[0], [1., 0., 0.]);
        assert_eq!(colors[5], [0., 0., 1.]);
    }
}
