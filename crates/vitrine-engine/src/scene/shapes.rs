//! CPU geometry builders.
//!
//! All builders are centered on the origin, Y up, counter-clockwise front faces.

use glam::Vec3;

use super::{DrawGroup, Geometry, Topology, Vertex};

/// Axis-aligned box with one draw group per face, in +X, -X, +Y, -Y, +Z, -Z order.
///
/// Pair it with a six-entry `MaterialSlot::Multi` to texture faces separately.
pub fn box_geometry(width: f32, height: f32, depth: f32) -> Geometry {
    let half = Vec3::new(width, height, depth) * 0.5;

    // (normal, u axis, v axis), with u x v == normal
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    let mut groups = Vec::with_capacity(6);

    for (material_index, (n, u, v)) in faces.into_iter().enumerate() {
        let base = vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (n + u * su + v * sv) * half;
            vertices.push(Vertex::new(p.to_array(), [(su + 1.0) * 0.5, (1.0 - sv) * 0.5]));
        }
        groups.push(DrawGroup {
            start: indices.len() as u32,
            count: 6,
            material_index,
        });
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Geometry::new("box", Topology::Triangles, vertices, Some(indices)).with_groups(groups)
}

/// Quad in the XY plane facing +Z.
pub fn plane_geometry(width: f32, height: f32) -> Geometry {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let vertices = vec![
        Vertex::new([-hw, -hh, 0.0], [0.0, 1.0]),
        Vertex::new([hw, -hh, 0.0], [1.0, 1.0]),
        Vertex::new([hw, hh, 0.0], [1.0, 0.0]),
        Vertex::new([-hw, hh, 0.0], [0.0, 0.0]),
    ];
    Geometry::new("plane", Topology::Triangles, vertices, Some(vec![0, 1, 2, 0, 2, 3]))
}

/// Point cloud with per-point colors.
pub fn points(label: &str, positions: &[Vec3], colors: &[[f32; 3]]) -> Geometry {
    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, p)| Vertex::colored(p.to_array(), colors.get(i).copied().unwrap_or([1.0; 3])))
        .collect();
    Geometry::new(label, Topology::Points, vertices, None)
}

/// Independent line segments; each pair of endpoints is one segment.
pub fn lines(label: &str, segments: &[(Vec3, Vec3, [f32; 3])]) -> Geometry {
    let vertices = segments
        .iter()
        .flat_map(|&(a, b, color)| {
            [Vertex::colored(a.to_array(), color), Vertex::colored(b.to_array(), color)]
        })
        .collect();
    Geometry::new(label, Topology::Lines, vertices, None)
}
