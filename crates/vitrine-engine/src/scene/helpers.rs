//! Debug helper nodes: ground grid and axis gizmo.

use glam::Vec3;

use super::{shapes, Material, Node};
use crate::paint::Color;

const CENTER_LINE: u32 = 0x444444;
const GRID_LINE: u32 = 0x888888;

fn rgb(hex: u32) -> [f32; 3] {
    let c = Color::from_hex(hex);
    [c.r, c.g, c.b]
}

/// Square grid on the XZ plane, `size` wide with `divisions` cells per side.
pub fn grid(size: f32, divisions: u32) -> Node {
    let divisions = divisions.max(1);
    let half = size * 0.5;
    let step = size / divisions as f32;
    let center = divisions / 2;

    let mut segments = Vec::with_capacity((divisions as usize + 1) * 2);
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if divisions % 2 == 0 && i == center {
            rgb(CENTER_LINE)
        } else {
            rgb(GRID_LINE)
        };
        segments.push((Vec3::new(-half, 0.0, k), Vec3::new(half, 0.0, k), color));
        segments.push((Vec3::new(k, 0.0, -half), Vec3::new(k, 0.0, half), color));
    }

    Node::mesh(
        "grid",
        shapes::lines("grid", &segments).shared(),
        Material::new("grid", Color::WHITE).shared(),
    )
}

/// Red/green/blue lines along +X/+Y/+Z.
pub fn axes(size: f32) -> Node {
    let segments = [
        (Vec3::ZERO, Vec3::X * size, [1.0, 0.0, 0.0]),
        (Vec3::ZERO, Vec3::Y * size, [0.0, 1.0, 0.0]),
        (Vec3::ZERO, Vec3::Z * size, [0.0, 0.0, 1.0]),
    ];
    Node::mesh(
        "axes",
        shapes::lines("axes", &segments).shared(),
        Material::new("axes", Color::WHITE).shared(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_two_lines_per_division_boundary() {
        let node = grid(10.0, 10);
        let geo = &node.mesh_ref().unwrap().geometry;
        assert_eq!(geo.element_count(), 11 * 2 * 2);
        assert!(geo.vertices().iter().all(|v| v.position[1] == 0.0));
    }

    #[test]
    fn grid_center_line_is_darker() {
        let node = grid(4.0, 2);
        let vertices = node.mesh_ref().unwrap().geometry.vertices();
        // Line pairs at i = 0, 1, 2; the middle pair starts at vertex 4.
        assert_eq!(vertices[4].color, rgb(CENTER_LINE));
        assert_eq!(vertices[0].color, rgb(GRID_LINE));
    }
}
