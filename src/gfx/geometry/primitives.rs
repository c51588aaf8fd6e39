//! # Primitive Shape Generation
//!
//! All shapes are generated with unit normals and texture coordinates in
//! [0, 1]. UV `v` runs bottom to top.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate a UV sphere centered at the origin
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `width_segments` - Number of segments around the Y axis (min 3)
/// * `height_segments` - Number of segments from pole to pole (min 2)
///
/// Pole quads collapse to single triangles, so the index count is
/// `6 * w * h - 3 * w * 2`.
pub fn generate_sphere(radius: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(3);
    let h_segs = height_segments.max(2);

    for iy in 0..=h_segs {
        let v = iy as f32 / h_segs as f32;
        let theta = v * PI; // 0 at the north pole, PI at the south pole

        for ix in 0..=w_segs {
            let u = ix as f32 / w_segs as f32;
            let phi = u * 2.0 * PI;

            let x = -radius * phi.cos() * theta.sin();
            let y = radius * theta.cos();
            let z = radius * phi.sin() * theta.sin();

            data.vertices.push([x, y, z]);
            data.normals.push(normalize([x, y, z]));
            data.tex_coords.push([u, 1.0 - v]);
        }
    }

    let row = w_segs + 1;
    for iy in 0..h_segs {
        for ix in 0..w_segs {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            if iy != 0 {
                data.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h_segs - 1 {
                data.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    data
}

/// Generate a plane in the XY plane
///
/// # Arguments
/// * `width` - Width of the plane (X direction)
/// * `height` - Height of the plane (Y direction)
/// * `width_segments` - Number of subdivisions along width
/// * `height_segments` - Number of subdivisions along height
///
/// Returns a plane centered at the origin with its normal along +Z.
pub fn generate_plane(
    width: f32,
    height: f32,
    width_segments: u32,
    height_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let h_segs = height_segments.max(1);

    let half_width = width * 0.5;
    let half_height = height * 0.5;
    let segment_width = width / w_segs as f32;
    let segment_height = height / h_segs as f32;

    // Rows run top to bottom
    for iy in 0..=h_segs {
        let y = iy as f32 * segment_height - half_height;

        for ix in 0..=w_segs {
            let x = ix as f32 * segment_width - half_width;

            data.vertices.push([x, -y, 0.0]);
            data.normals.push([0.0, 0.0, 1.0]);
            data.tex_coords.push([
                ix as f32 / w_segs as f32,
                1.0 - iy as f32 / h_segs as f32,
            ]);
        }
    }

    let row = w_segs + 1;
    for iy in 0..h_segs {
        for ix in 0..w_segs {
            let a = ix + row * iy;
            let b = ix + row * (iy + 1);
            let c = (ix + 1) + row * (iy + 1);
            let d = (ix + 1) + row * iy;

            data.indices.extend_from_slice(&[a, b, d]);
            data.indices.extend_from_slice(&[b, c, d]);
        }
    }

    data
}

/// Generate a torus lying in the XY plane, centered at the origin
///
/// # Arguments
/// * `radius` - Distance from the center to the middle of the tube
/// * `tube` - Radius of the tube
/// * `radial_segments` - Segments around the tube cross-section (min 3)
/// * `tubular_segments` - Segments around the ring (min 3)
pub fn generate_torus(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * 2.0 * PI;

        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * 2.0 * PI;

            let x = (radius + tube * v.cos()) * u.cos();
            let y = (radius + tube * v.cos()) * u.sin();
            let z = tube * v.sin();

            let center = [radius * u.cos(), radius * u.sin(), 0.0];

            data.vertices.push([x, y, z]);
            data.normals
                .push(normalize([x - center[0], y - center[1], z - center[2]]));
            data.tex_coords
                .push([i as f32 / tubular as f32, j as f32 / radial as f32]);
        }
    }

    let row = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;

            data.indices.extend_from_slice(&[a, b, d]);
            data.indices.extend_from_slice(&[b, c, d]);
        }
    }

    data
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if length > 0.0 {
        [v[0] / length, v[1] / length, v[2] / length]
    } else {
        [0.0, 1.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_unit_normals(data: &GeometryData) {
        for n in &data.normals {
            let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((length - 1.0).abs() < 1e-4, "normal {:?} not unit length", n);
        }
    }

    fn assert_indices_in_range(data: &GeometryData) {
        let count = data.vertex_count() as u32;
        assert!(data.indices.iter().all(|&i| i < count));
        assert_eq!(data.indices.len() % 3, 0);
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(0.5, 16, 16);
        assert_eq!(sphere.vertex_count(), 17 * 17);
        assert_eq!(sphere.indices.len(), 6 * 16 * 16 - 3 * 16 * 2);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        assert_eq!(sphere.vertices.len(), sphere.tex_coords.len());
        assert_unit_normals(&sphere);
        assert_indices_in_range(&sphere);

        for v in &sphere.vertices {
            let r = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((r - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(1.0, 2.0, 3, 3);
        assert_eq!(plane.vertex_count(), 16); // 4x4 grid
        assert_eq!(plane.indices.len(), 54); // 9 quads * 2 triangles * 3 indices
        assert_indices_in_range(&plane);

        let max_x = plane.vertices.iter().map(|v| v[0]).fold(f32::MIN, f32::max);
        let max_y = plane.vertices.iter().map(|v| v[1]).fold(f32::MIN, f32::max);
        assert!((max_x - 0.5).abs() < 1e-6);
        assert!((max_y - 1.0).abs() < 1e-6);
        assert!(plane.vertices.iter().all(|v| v[2] == 0.0));
    }

    #[test]
    fn test_plane_faces_positive_z() {
        let plane = generate_plane(1.0, 1.0, 1, 1);
        let tri = &plane.indices[0..3];
        let p = |i: u32| plane.vertices[i as usize];
        let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
        let e1 = [b[0] - a[0], b[1] - a[1]];
        let e2 = [c[0] - a[0], c[1] - a[1]];
        // z component of the face normal
        assert!(e1[0] * e2[1] - e1[1] * e2[0] > 0.0);
    }

    #[test]
    fn test_torus_generation() {
        let torus = generate_torus(0.5, 0.2, 16, 32);
        assert_eq!(torus.vertex_count(), 17 * 33);
        assert_eq!(torus.triangle_count(), 16 * 32 * 2);
        assert_unit_normals(&torus);
        assert_indices_in_range(&torus);

        let max_extent = torus
            .vertices
            .iter()
            .map(|v| (v[0] * v[0] + v[1] * v[1]).sqrt())
            .fold(0.0_f32, f32::max);
        assert!((max_extent - 0.7).abs() < 1e-4);
    }

    #[test]
    fn segment_counts_are_clamped() {
        let sphere = generate_sphere(1.0, 0, 0);
        assert_eq!(sphere.vertex_count(), 4 * 3);
        let torus = generate_torus(1.0, 0.1, 1, 1);
        assert_eq!(torus.vertex_count(), 4 * 4);
    }
}
